//! Slot text <-> records. Decoding validates each stored record on its own.

use lens_types::{AuditRecord, StoreError};
use std::collections::HashSet;

/// Serialize the collection as one JSON array.
pub fn encode_history(records: &[AuditRecord]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(records)?)
}

/// Parse slot text. Anything other than a JSON array yields an empty collection;
/// inside an array, unreadable, invalid, or duplicate-id records are dropped one by one.
pub fn decode_history(raw: &str) -> Vec<AuditRecord> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let items = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) => {
            tracing::warn!("stored history is not a list, starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse stored history, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let record: AuditRecord = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(index, error = %e, "dropping unreadable history record");
                continue;
            }
        };
        if let Err(e) = record.validate() {
            tracing::warn!(index, error = %e, "dropping invalid history record");
            continue;
        }
        if !seen.insert(record.id.clone()) {
            tracing::warn!(index, id = %record.id, "dropping duplicate history record");
            continue;
        }
        out.push(record);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;
    use lens_types::RiskLevel;

    #[test]
    fn encode_then_decode_keeps_order() {
        let records = vec![
            record("a", RiskLevel::High, "Proj A"),
            record("b", RiskLevel::Low, "Proj B"),
        ];
        let raw = encode_history(&records).unwrap();
        assert_eq!(decode_history(&raw), records);
    }

    #[test]
    fn garbage_and_non_lists_decode_empty() {
        assert!(decode_history("").is_empty());
        assert!(decode_history("{not json").is_empty());
        assert!(decode_history(r#"{"id":"a"}"#).is_empty());
        assert!(decode_history("42").is_empty());
    }

    #[test]
    fn bad_records_are_dropped_individually() {
        let good = serde_json::to_value(record("a", RiskLevel::Medium, "Proj A")).unwrap();
        let blank_name = serde_json::to_value(record("b", RiskLevel::Low, " ")).unwrap();
        let dup = serde_json::to_value(record("a", RiskLevel::High, "Again")).unwrap();
        let later = serde_json::to_value(record("c", RiskLevel::High, "Proj C")).unwrap();
        let raw = serde_json::json!([good, {"id": "x", "riskLevel": "Severe"}, blank_name, dup, later])
            .to_string();

        let ids: Vec<String> = decode_history(&raw).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
