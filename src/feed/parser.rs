use chrono::{DateTime, Utc};
use serde::Deserialize;
use crate::error::{Error, Result};
use crate::types::{RateEntry, RateSnapshot};

#[derive(Deserialize)]
struct ValCurs {
    #[serde(rename = "@Date", default)]
    date: String,
    #[serde(rename = "Valute", default)]
    valutes: Vec<Valute>,
}

#[derive(Deserialize)]
struct Valute {
    #[serde(rename = "CharCode")]
    char_code: Option<String>,
    #[serde(rename = "Nominal")]
    nominal: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Value")]
    value: Option<String>,
}

/// Parse the daily rates document into a snapshot.
///
/// A malformed document is an error. Individual currencies with missing or
/// invalid fields are skipped, so the result only ever holds complete entries.
pub fn parse_daily_xml(xml: &str, taken_at: DateTime<Utc>) -> Result<RateSnapshot> {
    let doc: ValCurs = quick_xml::de::from_str(xml)
        .map_err(|e| Error::Parse(e.to_string()))?;

    let mut rates = Vec::with_capacity(doc.valutes.len());
    for valute in doc.valutes {
        match parse_valute(valute) {
            Some((code, entry)) => {
                tracing::trace!(code = %code, rate = entry.rate_per_unit(), "Parsed currency");
                rates.push((code, entry));
            }
            None => continue,
        }
    }

    let snapshot = RateSnapshot::from_feed_order(taken_at, doc.date, rates);
    tracing::debug!(currencies = snapshot.len(), date = %snapshot.source_date(), "Feed document parsed");
    Ok(snapshot)
}

fn parse_valute(valute: Valute) -> Option<(String, RateEntry)> {
    let (code, nominal_text, name, value_text) = match (
        non_empty(valute.char_code),
        non_empty(valute.nominal),
        non_empty(valute.name),
        non_empty(valute.value),
    ) {
        (Some(code), Some(nominal), Some(name), Some(value)) => (code, nominal, name, value),
        (code, ..) => {
            tracing::warn!(code = ?code, "Skipping currency with missing fields");
            return None;
        }
    };

    let value = match value_text.replace(',', ".").parse::<f64>() {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(code = %code, value = %value_text, "Unparsable value: {}", e);
            return None;
        }
    };
    let nominal = match nominal_text.parse::<i64>() {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(code = %code, nominal = %nominal_text, "Unparsable nominal: {}", e);
            return None;
        }
    };

    match RateEntry::new(&code, name, nominal, value, value_text) {
        Ok(entry) => Some((code, entry)),
        Err(e) => {
            tracing::warn!("Skipping currency: {}", e);
            None
        }
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
