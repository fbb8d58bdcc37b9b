//! Flattening of the question-generation payload.
//!
//! The server groups questions per chunk and has used several shapes for the
//! individual entries over time:
//!
//! ```json
//! [{"document_id": "d", "chunk_id": "0", "questions": [
//!     {"midm_questions": "..."}, {"question": "..."}, "..."
//! ]}]
//! ```
//!
//! Everything is mapped into [`GeneratedQuestion`] here so callers see one shape.

use serde_json::Value;

use crate::types::GeneratedQuestion;

const UNKNOWN: &str = "unknown";

/// Flatten a raw `generate-questions` response.
///
/// Ids are assigned sequentially over the emitted questions. Blank entries and
/// groups without a `questions` array are skipped; a non-array payload yields
/// nothing.
#[must_use]
pub fn normalize_questions(payload: &Value) -> Vec<GeneratedQuestion> {
    let Some(groups) = payload.as_array() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for group in groups {
        let Some(entries) = group.get("questions").and_then(Value::as_array) else {
            continue;
        };
        let chunk_id = id_field(group, "chunk_id");
        let document_id = id_field(group, "document_id");

        for entry in entries {
            let Some(text) = question_text(entry) else {
                continue;
            };
            out.push(GeneratedQuestion {
                id: out.len(),
                question: text,
                chunk_id: chunk_id.clone(),
                document_id: document_id.clone(),
            });
        }
    }
    out
}

fn question_text(entry: &Value) -> Option<String> {
    let raw = match entry {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("midm_questions")
            .or_else(|| map.get("question"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn id_field(group: &Value, key: &str) -> String {
    match group.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn flattens_all_entry_shapes() {
        let payload = json!([
            {"document_id": "d_청크", "chunk_id": "0", "questions": [
                {"midm_questions": "What is the deadline?"},
                {"question": "Who can apply?"},
                "How much is the grant?"
            ]},
            {"document_id": "d_청크", "chunk_id": 1, "questions": [{"midm_questions": "Where to apply?"}]}
        ]);
        let qs = normalize_questions(&payload);
        assert_eq!(qs.len(), 4);
        assert_eq!(qs[0].question, "What is the deadline?");
        assert_eq!(qs[1].question, "Who can apply?");
        assert_eq!(qs[2].question, "How much is the grant?");
        assert_eq!(qs[3].chunk_id, "1");
        let ids: Vec<usize> = qs.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn blank_entries_are_dropped_without_gaps() {
        let payload = json!([{"chunk_id": "0", "questions": ["  ", {"question": ""}, " kept "]}]);
        let qs = normalize_questions(&payload);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].id, 0);
        assert_eq!(qs[0].question, "kept");
    }

    #[test]
    fn missing_ids_become_unknown() {
        let payload = json!([{"questions": ["q"]}]);
        let qs = normalize_questions(&payload);
        assert_eq!(qs[0].chunk_id, "unknown");
        assert_eq!(qs[0].document_id, "unknown");
    }

    #[test]
    fn empty_and_malformed_payloads() {
        assert!(normalize_questions(&json!([])).is_empty());
        assert!(normalize_questions(&json!({"questions": ["q"]})).is_empty());
        assert!(normalize_questions(&json!([{"chunk_id": "0"}])).is_empty());
        assert!(normalize_questions(&json!([{"questions": [1, null, {"other": "x"}]}])).is_empty());
    }

    proptest! {
        #[test]
        fn every_non_blank_string_survives(texts in prop::collection::vec(".{0,40}", 0..20)) {
            let payload = json!([{"chunk_id": "0", "document_id": "d", "questions": texts.clone()}]);
            let qs = normalize_questions(&payload);
            let expected = texts.iter().filter(|t| !t.trim().is_empty()).count();
            prop_assert_eq!(qs.len(), expected);
            for (i, q) in qs.iter().enumerate() {
                prop_assert_eq!(q.id, i);
                prop_assert!(!q.question.is_empty());
            }
        }
    }
}
