use serde::{Deserialize, Serialize};

/// Hospital — the inspected organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Soft-delete flag. Deleted rows are hidden, never removed.
    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Category — top of the inspection hierarchy. Linked to batches via
/// the batch_categories association.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Region — belongs to exactly one category, owns items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning category id.
    pub category_id: String,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Item — a single inspection checkpoint.
///
/// An item with one or more associated score levels is "leveled": scores
/// are derived from a problem count. An item with none is "direct-scored":
/// the raw value is recorded, capped at `score`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Maximum raw score for direct-scored items.
    pub score: i64,

    /// Owning region id.
    pub region_id: String,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// ScoreLevel — maps an inclusive problem-count range to a fixed score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLevel {
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// Fixed score recorded when this level matches.
    pub score: i64,

    /// Inclusive lower bound on the problem count.
    pub lower_bound: i64,

    /// Inclusive upper bound on the problem count.
    pub upper_bound: i64,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

impl ScoreLevel {
    /// Whether a problem count falls inside this level's inclusive range.
    pub fn contains(&self, problem_count: i64) -> bool {
        problem_count >= self.lower_bound && problem_count <= self.upper_bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_level_bounds_are_inclusive() {
        let level = ScoreLevel {
            id: "l1".into(),
            name: "minor".into(),
            score: 10,
            lower_bound: 0,
            upper_bound: 2,
            deleted: false,
            create_at: None,
            update_at: None,
        };
        assert!(level.contains(0));
        assert!(level.contains(2));
        assert!(!level.contains(3));
        assert!(!level.contains(-1));
    }

    #[test]
    fn item_json_roundtrip() {
        let item = Item {
            id: "item001".into(),
            name: "Hand hygiene compliance".into(),
            description: Some("Spot check of ward staff".into()),
            score: 50,
            region_id: "region001".into(),
            deleted: false,
            create_at: None,
            update_at: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"regionId\":\"region001\""));
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
