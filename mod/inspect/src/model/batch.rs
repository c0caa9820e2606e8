use serde::{Deserialize, Serialize};

/// Batch lifecycle status. Serialized as its integer code.
///
/// The workflow only ever moves status forward:
/// NotStarted → InProgress → AllScored → Summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BatchStatus {
    NotStarted,
    InProgress,
    AllScored,
    Summarized,
}

impl Default for BatchStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl From<BatchStatus> for u8 {
    fn from(s: BatchStatus) -> u8 {
        match s {
            BatchStatus::NotStarted => 0,
            BatchStatus::InProgress => 1,
            BatchStatus::AllScored => 2,
            BatchStatus::Summarized => 3,
        }
    }
}

impl TryFrom<u8> for BatchStatus {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(BatchStatus::NotStarted),
            1 => Ok(BatchStatus::InProgress),
            2 => Ok(BatchStatus::AllScored),
            3 => Ok(BatchStatus::Summarized),
            other => Err(format!("unknown batch status {}", other)),
        }
    }
}

impl BatchStatus {
    pub fn as_i64(self) -> i64 {
        u8::from(self) as i64
    }
}

/// Batch — one inspection round of a hospital against a set of categories.
///
/// Status is mutated only by the scoring workflow (score create/update)
/// and by the explicit complete operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// Inspected hospital id.
    pub hospital_id: String,

    /// Linked category ids (mirrored in the batch_categories table).
    #[serde(default)]
    pub category_ids: Vec<String>,

    /// RFC 3339 inspection start.
    pub start_time: String,

    /// RFC 3339 inspection end, set when the batch is summarized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(default)]
    pub status: BatchStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarize_problem: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarize_highlight: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarize_need_improve: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Lead inspector, if assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_id: Option<String>,

    /// User who summarized the batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarize_person_id: Option<String>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_integer_codes() {
        assert_eq!(u8::from(BatchStatus::NotStarted), 0);
        assert_eq!(u8::from(BatchStatus::InProgress), 1);
        assert_eq!(u8::from(BatchStatus::AllScored), 2);
        assert_eq!(u8::from(BatchStatus::Summarized), 3);
        assert_eq!(BatchStatus::try_from(2).unwrap(), BatchStatus::AllScored);
        assert!(BatchStatus::try_from(4).is_err());
    }

    #[test]
    fn status_ordering_never_lowers() {
        // max() is how the completion check avoids lowering status.
        assert_eq!(
            BatchStatus::Summarized.max(BatchStatus::AllScored),
            BatchStatus::Summarized
        );
        assert!(BatchStatus::NotStarted < BatchStatus::InProgress);
        assert!(BatchStatus::InProgress < BatchStatus::AllScored);
    }

    #[test]
    fn batch_json_roundtrip() {
        let b = Batch {
            id: "batch001".into(),
            name: "2025 Q1 inspection".into(),
            hospital_id: "hosp001".into(),
            category_ids: vec!["cat001".into()],
            start_time: "2025-01-06T08:00:00+00:00".into(),
            end_time: None,
            status: BatchStatus::InProgress,
            summarize_problem: None,
            summarize_highlight: None,
            summarize_need_improve: None,
            note: None,
            inspector_id: None,
            summarize_person_id: None,
            deleted: false,
            create_at: None,
            update_at: None,
        };
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"status\":1"));
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
