//! Field-level decoders for provider payloads. A field that cannot be read
//! as its declared type decodes as absent instead of failing the payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any optional field. `null` and wrongly typed values become `None`.
pub fn opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    match T::deserialize(raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable provider field");
            Ok(None)
        }
    }
}

/// Optional amount. Numeric strings such as `"12.50"` are accepted.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Null => None,
        other => {
            tracing::debug!(value = %other, "ignoring non-numeric provider amount");
            None
        }
    })
}

/// Nested object or flag that falls back to its default when missing,
/// `null` or malformed.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(opt(deserializer)?.unwrap_or_default())
}

/// List whose unreadable entries are skipped one by one. Anything other than
/// an array decodes as empty.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(items) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable provider entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "opt")]
        id: Option<String>,
        #[serde(default, deserialize_with = "number")]
        amount: Option<f64>,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Page {
        #[serde(default, deserialize_with = "list")]
        rows: Vec<Row>,
        #[serde(default, deserialize_with = "or_default")]
        more: bool,
    }

    #[test]
    fn test_wrong_types_become_absent() {
        let row: Row = serde_json::from_str(r#"{"id":42,"amount":"n/a"}"#).unwrap();
        assert!(row.id.is_none());
        assert!(row.amount.is_none());
    }

    #[test]
    fn test_numeric_strings_are_amounts() {
        let row: Row = serde_json::from_str(r#"{"id":"t2","amount":" 12.50 "}"#).unwrap();
        assert_eq!(row.amount, Some(12.5));
    }

    #[test]
    fn test_list_skips_bad_entries_and_nulls_default() {
        let page: Page = serde_json::from_str(r#"{"rows":[{"id":"a"},"junk",{"id":"b"}],"more":null}"#).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert!(!page.more);

        let page: Page = serde_json::from_str(r#"{"rows":null,"more":"yes"}"#).unwrap();
        assert!(page.rows.is_empty());
        assert!(!page.more);
    }
}
