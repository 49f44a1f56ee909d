//! 🎬 *[the records arrive. they are JSON. they want an envelope with their name on it.]*
//!
//! 📦 **JsonRecords** — mode `json-array`. Wraps a group as `{"Records":[rec1,rec2,...]}`.
//!
//! 🧠 Knowledge graph:
//! - Each record is parsed as a `RawValue`: validated as JSON, then embedded verbatim as a JSON
//!   value (an object stays an object, not a string full of backslashes).
//! - Verbatim means the capacity estimate `14 + Σ len + (n − 1)` is exact. Surrounding
//!   whitespace is the only thing the parser trims, which can only make us smaller.
//! - A record that is not UTF-8, or not JSON, fails the whole group with
//!   `InvalidRecordEncoding`. Other groups are none the wiser.

use serde::Serialize;
use serde_json::value::RawValue;

use super::Collapser;
use crate::common::Record;
use crate::errors::CollapseError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct JsonRecords;

/// ✉️ The envelope. One field. Capital R. Consumers depend on that capital R.
#[derive(Serialize)]
struct RecordsEnvelope<'a> {
    #[serde(rename = "Records")]
    records: Vec<&'a RawValue>,
}

fn parse_record(index: usize, record: &Record) -> Result<&RawValue, CollapseError> {
    let invalid = |reason: String| CollapseError::InvalidRecordEncoding { index, reason };
    let text = std::str::from_utf8(&record.data).map_err(|e| invalid(e.to_string()))?;
    serde_json::from_str::<&RawValue>(text).map_err(|e| invalid(e.to_string()))
}

impl Collapser for JsonRecords {
    fn materialize(&self, records: &[Record], group: &[usize]) -> Result<Vec<u8>, CollapseError> {
        let parsed = group
            .iter()
            .map(|&index| parse_record(index, &records[index]))
            .collect::<Result<Vec<_>, _>>()?;

        serde_json::to_vec(&RecordsEnvelope { records: parsed }).map_err(|e| {
            CollapseError::InvalidRecordEncoding {
                index: group.first().copied().unwrap_or_default(),
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn the_one_where_two_objects_get_an_envelope() -> anyhow::Result<()> {
        let records = vec![Record::new(r#"{"a":1}"#), Record::new(r#"{"b":2}"#)];
        let payload = JsonRecords.materialize(&records, &[0, 1])?;
        assert_eq!(String::from_utf8(payload)?, r#"{"Records":[{"a":1},{"b":2}]}"#);
        Ok(())
    }

    #[test]
    fn the_one_where_nested_values_survive_the_round_trip() -> anyhow::Result<()> {
        let originals = [
            r#"{"order":{"id":7,"lines":[{"sku":"A","qty":2},{"sku":"B","qty":[1,[2,3]]}]}}"#,
            r#"[1,"two",{"three":null}]"#,
            r#""just a string""#,
            "42",
        ];
        let records: Vec<Record> = originals.iter().map(|s| Record::new(*s)).collect();
        let payload = JsonRecords.materialize(&records, &[0, 1, 2, 3])?;

        let envelope: Value = serde_json::from_slice(&payload)?;
        let expected: Vec<Value> = originals
            .iter()
            .map(|s| serde_json::from_str(s))
            .collect::<Result<_, _>>()?;
        assert_eq!(envelope, json!({ "Records": expected }));
        Ok(())
    }

    #[test]
    fn the_one_where_the_key_stays_home() -> anyhow::Result<()> {
        let records = vec![Record::with_key("secret-partition", r#"{"a":1}"#)];
        let payload = String::from_utf8(JsonRecords.materialize(&records, &[0])?)?;
        assert!(!payload.contains("secret-partition"));
        Ok(())
    }

    #[test]
    fn the_one_where_surrounding_whitespace_is_trimmed_not_counted() -> anyhow::Result<()> {
        let records = vec![Record::new("  {\"a\": 1}\n")];
        let payload = JsonRecords.materialize(&records, &[0])?;
        assert_eq!(payload, br#"{"Records":[{"a": 1}]}"#);
        Ok(())
    }

    #[test]
    fn the_one_where_not_json_names_the_guilty_record() {
        let records = vec![
            Record::new(r#"{"fine":true}"#),
            Record::new("definitely { not json"),
        ];
        match JsonRecords.materialize(&records, &[0, 1]) {
            Err(CollapseError::InvalidRecordEncoding { index, .. }) => assert_eq!(index, 1),
            other => panic!("💀 expected InvalidRecordEncoding for record 1, got {other:?}"),
        }
    }

    #[test]
    fn the_one_where_invalid_utf8_is_invalid_json_too() {
        let records = vec![Record::new(vec![b'"', 0xff, b'"'])];
        assert!(matches!(
            JsonRecords.materialize(&records, &[0]),
            Err(CollapseError::InvalidRecordEncoding { index: 0, .. })
        ));
    }
}
