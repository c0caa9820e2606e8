use serde::{Deserialize, Serialize};

/// Score — the recorded result of scoring one item inside one batch.
///
/// At most one non-deleted score exists per (batch_id, item_id); rows are
/// created once and then only mutated (value, comment) or soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    pub batch_id: String,

    pub item_id: String,

    /// Final recorded score value.
    pub value: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// RFC 3339 timestamp of the original recording.
    pub date: String,

    /// User who recorded the score.
    pub user_id: String,

    #[serde(default)]
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_json_roundtrip() {
        let s = Score {
            id: "score001".into(),
            batch_id: "batch001".into(),
            item_id: "item001".into(),
            value: 42,
            comment: Some("two findings".into()),
            date: "2025-01-06T09:30:00+00:00".into(),
            user_id: "user001".into(),
            deleted: false,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"batchId\":\"batch001\""));
        let back: Score = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
