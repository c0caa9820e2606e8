//! End-to-end scoring workflow over an in-memory SQLite store.

use std::sync::Arc;

use qis_core::ServiceError;
use qis_sql::SqliteStore;

use inspect::model::{Batch, BatchStatus};
use inspect::service::InspectService;
use inspect::service::batch::{CompleteBatchInput, CreateBatchInput};
use inspect::service::catalog::{
    CreateCategoryInput, CreateHospitalInput, CreateRegionInput, CreateScoreLevelInput,
};
use inspect::service::item::CreateItemInput;
use inspect::service::scoring::{CreateScoreInput, UpdateScoreInput};

fn service() -> InspectService {
    let store = SqliteStore::open_in_memory().unwrap();
    InspectService::new(Arc::new(store)).unwrap()
}

/// A hospital, one category with one region, and a batch over that
/// category. Returns (service, batch id, region id).
fn setup_batch(svc: &InspectService) -> (String, String) {
    let hospital = svc
        .create_hospital(CreateHospitalInput {
            name: "First Municipal".into(),
            address: None,
        })
        .unwrap();
    let category = svc
        .create_category(CreateCategoryInput {
            name: "Infection Control".into(),
            description: None,
        })
        .unwrap();
    let region = svc
        .create_region(CreateRegionInput {
            name: "ICU".into(),
            description: None,
            category_id: category.id.clone(),
        })
        .unwrap();
    let batch = svc
        .create_batch(CreateBatchInput {
            name: "2025 Q1 inspection".into(),
            hospital_id: hospital.id,
            category_ids: vec![category.id],
            start_time: None,
            note: None,
            inspector_id: None,
        })
        .unwrap();
    (batch.id, region.id)
}

fn add_direct_item(svc: &InspectService, region_id: &str, name: &str, max: i64) -> String {
    svc.create_item(CreateItemInput {
        name: name.into(),
        description: None,
        score: max,
        region_id: region_id.into(),
        score_level_ids: vec![],
    })
    .unwrap()
    .id
}

fn add_leveled_item(svc: &InspectService, region_id: &str, name: &str) -> String {
    let l1 = svc
        .create_score_level(CreateScoreLevelInput {
            name: "minor".into(),
            score: 10,
            lower_bound: 0,
            upper_bound: 3,
        })
        .unwrap();
    let l2 = svc
        .create_score_level(CreateScoreLevelInput {
            name: "major".into(),
            score: 20,
            lower_bound: 4,
            upper_bound: 5,
        })
        .unwrap();
    svc.create_item(CreateItemInput {
        name: name.into(),
        description: None,
        score: 100,
        region_id: region_id.into(),
        score_level_ids: vec![l1.id, l2.id],
    })
    .unwrap()
    .id
}

fn score_input(batch_id: &str, item_id: &str) -> CreateScoreInput {
    CreateScoreInput {
        batch_id: batch_id.into(),
        item_id: item_id.into(),
        score_value: None,
        problem_count: 0,
        comment: None,
        user_id: "inspector01".into(),
    }
}

fn batch_status(svc: &InspectService, batch_id: &str) -> BatchStatus {
    svc.get_batch(batch_id).unwrap().batch.status
}

#[test]
fn leveled_item_scores_by_problem_count() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let item_id = add_leveled_item(&svc, &region_id, "hand hygiene");

    let score = svc
        .create_score(CreateScoreInput {
            problem_count: 2,
            ..score_input(&batch_id, &item_id)
        })
        .unwrap();
    assert_eq!(score.value, 10);

    let updated = svc
        .update_score(
            &score.id,
            UpdateScoreInput {
                score_value: None,
                problem_count: 4,
                comment: None,
            },
        )
        .unwrap();
    assert_eq!(updated.value, 20);
}

#[test]
fn leveled_item_rejects_uncovered_problem_count() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let item_id = add_leveled_item(&svc, &region_id, "hand hygiene");

    let err = svc
        .create_score(CreateScoreInput {
            problem_count: 6,
            ..score_input(&batch_id, &item_id)
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn direct_item_enforces_maximum_only() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let item_id = add_direct_item(&svc, &region_id, "signage", 50);

    let err = svc
        .create_score(CreateScoreInput {
            score_value: Some(51),
            ..score_input(&batch_id, &item_id)
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let score = svc
        .create_score(CreateScoreInput {
            score_value: Some(50),
            ..score_input(&batch_id, &item_id)
        })
        .unwrap();
    assert_eq!(score.value, 50);
}

#[test]
fn duplicate_score_is_a_conflict() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let item_id = add_direct_item(&svc, &region_id, "signage", 50);

    svc.create_score(score_input(&batch_id, &item_id)).unwrap();
    let err = svc
        .create_score(score_input(&batch_id, &item_id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn out_of_scope_item_is_rejected() {
    let svc = service();
    let (batch_id, _region_id) = setup_batch(&svc);

    // Item under a category the batch does not cover.
    let other_category = svc
        .create_category(CreateCategoryInput {
            name: "Pharmacy".into(),
            description: None,
        })
        .unwrap();
    let other_region = svc
        .create_region(CreateRegionInput {
            name: "Dispensary".into(),
            description: None,
            category_id: other_category.id,
        })
        .unwrap();
    let item_id = add_direct_item(&svc, &other_region.id, "storage", 10);

    let err = svc
        .create_score(score_input(&batch_id, &item_id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn status_advances_as_items_are_scored() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let a = add_direct_item(&svc, &region_id, "a", 10);
    let b = add_direct_item(&svc, &region_id, "b", 10);

    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::NotStarted);

    svc.create_score(score_input(&batch_id, &a)).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::InProgress);

    svc.create_score(score_input(&batch_id, &b)).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::AllScored);
}

#[test]
fn deleting_a_score_does_not_lower_status() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let a = add_direct_item(&svc, &region_id, "a", 10);

    let score = svc.create_score(score_input(&batch_id, &a)).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::AllScored);

    svc.delete_score(&score.id).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::AllScored);
}

#[test]
fn complete_requires_all_scored() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let a = add_direct_item(&svc, &region_id, "a", 10);

    let input = || CompleteBatchInput {
        summarize_problem: Some("two findings".into()),
        summarize_highlight: None,
        summarize_need_improve: None,
        note: None,
        summarize_person_id: "supervisor01".into(),
    };

    // Not started yet.
    let err = svc.complete_batch(&batch_id, input()).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    svc.create_score(score_input(&batch_id, &a)).unwrap();

    let completed: Batch = svc.complete_batch(&batch_id, input()).unwrap();
    assert_eq!(completed.status, BatchStatus::Summarized);
    assert!(completed.end_time.is_some());
    assert_eq!(completed.summarize_problem.as_deref(), Some("two findings"));
    assert_eq!(completed.summarize_person_id.as_deref(), Some("supervisor01"));

    // Completing twice is rejected; the batch already left AllScored.
    let err = svc.complete_batch(&batch_id, input()).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[test]
fn scoring_after_completion_is_still_allowed() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let a = add_direct_item(&svc, &region_id, "a", 10);

    svc.create_score(score_input(&batch_id, &a)).unwrap();
    svc.complete_batch(
        &batch_id,
        CompleteBatchInput {
            summarize_problem: None,
            summarize_highlight: None,
            summarize_need_improve: None,
            note: None,
            summarize_person_id: "supervisor01".into(),
        },
    )
    .unwrap();

    // A late-added item can still receive a score, and the batch never
    // drops back below Summarized.
    let b = add_direct_item(&svc, &region_id, "b", 10);
    svc.create_score(score_input(&batch_id, &b)).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::Summarized);
}

#[test]
fn deleted_items_do_not_block_completion() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let a = add_direct_item(&svc, &region_id, "a", 10);
    let b = add_direct_item(&svc, &region_id, "b", 10);

    svc.create_score(score_input(&batch_id, &a)).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::InProgress);

    // Removing the unscored item shrinks the expected set; the next
    // scoring event resolves the batch as fully scored.
    svc.delete_item(&b).unwrap();
    let c = add_direct_item(&svc, &region_id, "c", 10);
    svc.create_score(score_input(&batch_id, &c)).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::AllScored);
}

#[test]
fn update_score_re_resolves_completion() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let a = add_direct_item(&svc, &region_id, "a", 10);
    let b = add_direct_item(&svc, &region_id, "b", 10);

    let score = svc.create_score(score_input(&batch_id, &a)).unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::InProgress);

    // With the last unscored item gone, updating the remaining score
    // re-runs the completion check and advances the batch.
    svc.delete_item(&b).unwrap();
    svc.update_score(
        &score.id,
        UpdateScoreInput {
            score_value: Some(5),
            problem_count: 0,
            comment: None,
        },
    )
    .unwrap();
    assert_eq!(batch_status(&svc, &batch_id), BatchStatus::AllScored);
}

#[test]
fn item_view_reflects_scoring_state() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let a = add_direct_item(&svc, &region_id, "a", 10);
    let b = add_direct_item(&svc, &region_id, "b", 10);

    svc.create_score(CreateScoreInput {
        score_value: Some(7),
        ..score_input(&batch_id, &a)
    })
    .unwrap();

    let result = svc
        .list_items(
            &qis_core::ListParams::default(),
            &inspect::service::item::ItemFilters {
                region_id: Some(region_id),
                batch_id: Some(batch_id),
            },
        )
        .unwrap();
    assert_eq!(result.total, 2);

    for view in &result.items {
        if view.item.id == a {
            assert_eq!(view.is_scored, Some(true));
            assert_eq!(view.score_value, Some(7));
        } else if view.item.id == b {
            assert_eq!(view.is_scored, Some(false));
            assert_eq!(view.score_value, None);
        }
    }
}

#[test]
fn score_view_joins_item_and_region() {
    let svc = service();
    let (batch_id, region_id) = setup_batch(&svc);
    let item_id = add_direct_item(&svc, &region_id, "signage", 50);

    let score = svc
        .create_score(CreateScoreInput {
            score_value: Some(30),
            ..score_input(&batch_id, &item_id)
        })
        .unwrap();

    let view = svc.get_score(&score.id).unwrap();
    assert_eq!(view.item_name, "signage");
    assert_eq!(view.item_score, 50);
    assert_eq!(view.region_name, "ICU");
    assert_eq!(view.category_name, "Infection Control");
}
