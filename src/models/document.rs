//! The persisted posture history document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Format a timestamp the way the history file stores them
/// (ISO-8601, UTC, millisecond precision, `Z` suffix).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Deserialize a field that may be present with a `null` value.
///
/// Combined with `#[serde(default)]`, an absent key stays `None` while an
/// explicit `null` becomes `Some(Value::Null)`, so both survive a rewrite.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Status flag carried by the reference endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    Set,
    NotSet,
}

fn status_set() -> ReferenceStatus {
    ReferenceStatus::Set
}

/// The saved "good posture" snapshot.
///
/// Older files may lack `timestamp` or `measurements`; missing keys stay
/// missing and unknown keys are kept as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodPostureReference {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    /// Caller-supplied measurement payload, stored as-is
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Value>,
    #[serde(default = "status_set")]
    pub status: ReferenceStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One persisted posture evaluation.
///
/// Every field is the caller's JSON verbatim. Records are never rewritten,
/// so integer scores, explicit nulls and unknown keys round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostureCheckRecord {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub current_posture: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub differences: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostureCheckRecord {
    /// The score as a number, if it is one.
    pub fn score_value(&self) -> Option<f64> {
        self.score.as_ref().and_then(Value::as_f64)
    }
}

/// Bookkeeping derived from the rest of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub created: String,
    pub last_updated: String,
    pub total_checks: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn new(now: &str) -> Self {
        Self {
            created: now.to_string(),
            last_updated: now.to_string(),
            ..Self::default()
        }
    }
}

/// Top-level shape of the history file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostureDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_posture_reference: Option<GoodPostureReference>,
    #[serde(default)]
    pub posture_history: Vec<PostureCheckRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Top-level keys this server does not manage
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostureDocument {
    /// Replace the reference snapshot. Any previous reference is discarded.
    pub fn set_reference(&mut self, measurements: Value, now: &str) -> &GoodPostureReference {
        let metadata = self.metadata_mut(now);
        metadata.created = now.to_string();
        metadata.last_updated = now.to_string();

        self.good_posture_reference.insert(GoodPostureReference {
            timestamp: Some(Value::String(now.to_string())),
            measurements: Some(measurements),
            status: ReferenceStatus::Set,
            extra: Map::new(),
        })
    }

    /// Append a check record and refresh the derived metadata.
    pub fn append_check(&mut self, record: PostureCheckRecord, now: &str) {
        self.posture_history.push(record);
        let total = self.posture_history.len();

        let metadata = self.metadata_mut(now);
        metadata.last_updated = now.to_string();
        metadata.total_checks = total;
    }

    /// Make the document self-consistent before it is written.
    ///
    /// Metadata always exists after this call and `total_checks` equals the
    /// history length.
    pub fn prepare_for_write(&mut self, now: &str) {
        let total = self.posture_history.len();
        let metadata = self.metadata_mut(now);
        if metadata.created.is_empty() {
            metadata.created = now.to_string();
        }
        if metadata.last_updated.is_empty() {
            metadata.last_updated = now.to_string();
        }
        metadata.total_checks = total;
    }

    pub fn reference_view(&self) -> ReferenceView {
        match &self.good_posture_reference {
            Some(reference) => ReferenceView::Set(reference.clone()),
            None => ReferenceView::not_set(),
        }
    }

    fn metadata_mut(&mut self, now: &str) -> &mut Metadata {
        self.metadata.get_or_insert_with(|| Metadata::new(now))
    }
}

/// Marker value of an unset reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotSetStatus {
    #[serde(rename = "not_set")]
    NotSet,
}

/// Response of the reference read: the stored snapshot or a `not_set` marker.
///
/// `NotSet` is listed first so that `{"status": "not_set"}` never parses as a
/// reference with every optional field missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceView {
    NotSet { status: NotSetStatus },
    Set(GoodPostureReference),
}

impl ReferenceView {
    pub fn not_set() -> Self {
        ReferenceView::NotSet {
            status: NotSetStatus::NotSet,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, ReferenceView::Set(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const T0: &str = "2024-03-01T10:00:00.000Z";
    const T1: &str = "2024-03-01T10:05:00.000Z";

    fn record(score: Value) -> PostureCheckRecord {
        PostureCheckRecord {
            timestamp: Some(json!(T0)),
            current_posture: Some(json!({ "eyeShoulderParallelism": 2.0 })),
            differences: Some(json!({ "eyeShoulderParallelism": 1.0 })),
            score: Some(score),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_iso_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(iso_timestamp(at), T0);
    }

    #[test]
    fn test_set_reference_on_fresh_document_initializes_metadata() {
        let mut doc = PostureDocument::default();
        doc.set_reference(json!({ "eyeShoulderParallelism": 0.5 }), T0);

        let metadata = doc.metadata.as_ref().unwrap();
        assert_eq!(metadata.created, T0);
        assert_eq!(metadata.last_updated, T0);
        assert_eq!(metadata.total_checks, 0);

        let reference = doc.good_posture_reference.as_ref().unwrap();
        assert_eq!(reference.status, ReferenceStatus::Set);
        assert_eq!(
            reference.measurements.as_ref().unwrap()["eyeShoulderParallelism"],
            0.5
        );
    }

    #[test]
    fn test_set_reference_overwrites_previous() {
        let mut doc = PostureDocument::default();
        doc.set_reference(json!({ "v": 1 }), T0);
        doc.set_reference(json!({ "v": 2 }), T1);

        let reference = doc.good_posture_reference.as_ref().unwrap();
        assert_eq!(reference.measurements, Some(json!({ "v": 2 })));
        assert_eq!(reference.timestamp, Some(json!(T1)));
        assert_eq!(doc.metadata.as_ref().unwrap().created, T1);
    }

    #[test]
    fn test_append_check_keeps_total_in_sync() {
        let mut doc = PostureDocument::default();
        for i in 0..5u32 {
            doc.append_check(record(json!(i * 10)), T1);
        }

        assert_eq!(doc.posture_history.len(), 5);
        assert_eq!(doc.metadata.as_ref().unwrap().total_checks, 5);
        assert_eq!(doc.metadata.as_ref().unwrap().last_updated, T1);
        let scores: Vec<Option<f64>> = doc
            .posture_history
            .iter()
            .map(PostureCheckRecord::score_value)
            .collect();
        assert_eq!(
            scores,
            vec![Some(0.0), Some(10.0), Some(20.0), Some(30.0), Some(40.0)]
        );
    }

    #[test]
    fn test_prepare_for_write_repairs_partial_metadata() {
        let mut doc: PostureDocument = serde_json::from_value(json!({
            "posture_history": [
                { "timestamp": T0, "current_posture": {}, "score": 80 },
                { "timestamp": T0, "current_posture": {}, "score": 90 }
            ],
            "metadata": { "created": T0 }
        }))
        .unwrap();

        doc.prepare_for_write(T1);

        let metadata = doc.metadata.as_ref().unwrap();
        assert_eq!(metadata.created, T0);
        assert_eq!(metadata.last_updated, T1);
        assert_eq!(metadata.total_checks, 2);
    }

    #[test]
    fn test_reference_view() {
        let mut doc = PostureDocument::default();
        assert_eq!(
            serde_json::to_value(doc.reference_view()).unwrap(),
            json!({ "status": "not_set" })
        );

        doc.set_reference(json!({ "a": 1 }), T0);
        let view = doc.reference_view();
        assert!(view.is_set());
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            json!({ "timestamp": T0, "measurements": { "a": 1 }, "status": "set" })
        );
    }

    #[test]
    fn test_reference_view_deserializes_both_shapes() {
        let not_set: ReferenceView =
            serde_json::from_value(json!({ "status": "not_set" })).unwrap();
        assert_eq!(not_set, ReferenceView::not_set());

        let set: ReferenceView = serde_json::from_value(
            json!({ "timestamp": T0, "measurements": null, "status": "set" }),
        )
        .unwrap();
        assert!(set.is_set());
    }

    #[test]
    fn test_serialized_layout_uses_snake_case_keys() {
        let mut doc = PostureDocument::default();
        doc.set_reference(json!({}), T0);
        doc.append_check(record(json!(75.0)), T1);

        let value = serde_json::to_value(&doc).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["good_posture_reference", "posture_history", "metadata"]
        );
        assert_eq!(value["metadata"]["total_checks"], 1);
        assert_eq!(value["posture_history"][0]["score"], 75.0);
    }

    #[test]
    fn test_missing_differences_is_omitted() {
        let mut r = record(json!(50));
        r.differences = None;
        let value = serde_json::to_value(&r).unwrap();
        assert!(value.get("differences").is_none());
    }

    #[test]
    fn test_records_with_missing_or_null_fields_parse() {
        let doc: PostureDocument = serde_json::from_value(json!({
            "good_posture_reference": { "timestamp": T0, "status": "set" },
            "posture_history": [
                { "current_posture": {}, "differences": {}, "score": 70 },
                { "timestamp": T0, "current_posture": {}, "score": null },
                { "timestamp": 1709287200000u64 }
            ]
        }))
        .unwrap();

        let reference = doc.good_posture_reference.as_ref().unwrap();
        assert!(reference.measurements.is_none());

        assert!(doc.posture_history[0].timestamp.is_none());
        assert_eq!(doc.posture_history[1].score, Some(Value::Null));
        assert_eq!(doc.posture_history[1].score_value(), None);
        assert_eq!(doc.posture_history[2].timestamp, Some(json!(1709287200000u64)));
    }

    #[test]
    fn test_stored_records_are_written_back_verbatim() {
        let stored = json!({
            "timestamp": "t",
            "current_posture": {},
            "differences": null,
            "score": 90,
            "note": "from an older client"
        });
        let record: PostureCheckRecord = serde_json::from_value(stored.clone()).unwrap();

        let written = serde_json::to_string(&record).unwrap();
        assert_eq!(
            written,
            r#"{"timestamp":"t","current_posture":{},"differences":null,"score":90,"note":"from an older client"}"#
        );
        assert_eq!(serde_json::to_value(&record).unwrap(), stored);
    }

    #[test]
    fn test_unknown_top_level_keys_survive() {
        let mut doc: PostureDocument = serde_json::from_value(json!({
            "posture_history": [],
            "metadata": { "created": T0, "last_updated": T0, "total_checks": 0, "app": "v1" },
            "settings": { "alerts": true }
        }))
        .unwrap();

        doc.append_check(record(json!(88)), T1);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["settings"], json!({ "alerts": true }));
        assert_eq!(value["metadata"]["app"], "v1");
        assert_eq!(value["metadata"]["total_checks"], 1);
    }
}
