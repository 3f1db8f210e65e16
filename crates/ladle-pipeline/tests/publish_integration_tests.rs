//! End-to-end submission attempts against in-memory stores
//!
//! These tests drive the full pipeline through its public surface: open the
//! gate, resolve a selection, publish, inspect what each store committed.
//! One test swaps in the real filesystem-backed object store to confirm the
//! pipeline is agnostic to the backend.

use std::sync::Arc;
use std::time::Duration;

use ladle_core::{Attachment, Draft, TaxonomySelection};
use ladle_pipeline::test_helpers::{MockObjectStore, MockRecipeStore};
use ladle_pipeline::{
    CommitCoordinator, GateError, PublishError, SubmissionResult, TaxonomyGate,
};
use ladle_storage::LocalObjectStore;
use uuid::Uuid;

fn khmer_soup_draft() -> Draft {
    Draft {
        owner_id: Uuid::new_v4(),
        title: "Khmer Soup".to_string(),
        overview: "Sour chicken soup with lemongrass".to_string(),
        prep_time: Duration::from_secs(15 * 60),
        cook_time: Duration::from_secs(40 * 60),
        ingredients: "chicken, lemongrass, lime leaves, fish sauce".to_string(),
        instructions: "Simmer the chicken, then season to taste.".to_string(),
        note: Some("Family recipe".to_string()),
        attachments: vec![
            Some(Attachment::new(
                b"front photo bytes".to_vec(),
                "front.jpg",
            )),
            Some(Attachment::new(b"side photo bytes".to_vec(), "side.jpg")),
        ],
    }
}

fn selection() -> TaxonomySelection {
    TaxonomySelection {
        category_id: 3,
        occasion_id: 7,
    }
}

fn coordinator(objects: &MockObjectStore, recipes: &MockRecipeStore) -> CommitCoordinator {
    CommitCoordinator::new(
        Arc::new(objects.clone()),
        Arc::new(recipes.clone()),
        Duration::from_secs(5),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn publishes_recipe_with_assets_end_to_end() {
    let objects = MockObjectStore::new();
    let recipes = MockRecipeStore::new();
    let coordinator = Arc::new(coordinator(&objects, &recipes));

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();

    // Publish on its own task, then resolve from the outside, the way a
    // selection surface would.
    let handle = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.publish(khmer_soup_draft(), permit).await }
    });
    tokio::task::yield_now().await;
    assert!(gate.resolve(selection()));

    let result = handle.await.unwrap();
    let recipe_id = match result {
        SubmissionResult::Success { recipe_id } => recipe_id,
        other => panic!("expected success, got {other:?}"),
    };

    // Both blobs landed under the recipe's prefix.
    let keys = objects.stored_keys();
    assert_eq!(keys.len(), 2);
    let prefix = format!("{recipe_id}/images/");
    for key in &keys {
        assert!(key.starts_with(&prefix), "key {key} missing prefix");
    }

    // Exactly one recipe row, carrying the frozen selection.
    let rows = recipes.recipes();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, recipe_id);
    assert_eq!(rows[0].title, "Khmer Soup");
    assert_eq!(rows[0].category_id, 3);
    assert_eq!(rows[0].occasion_id, 7);
    assert_eq!(rows[0].prep_time, Duration::from_secs(900));

    // One association per uploaded asset, pointing at the stored blobs.
    let urls = recipes.association_urls();
    assert_eq!(urls.len(), 2);
    for key in &keys {
        assert!(urls.contains(&format!("http://mock.storage/{key}")));
    }
}

#[tokio::test]
async fn upload_failure_aborts_before_any_relational_write() {
    let objects = MockObjectStore::new();
    objects.fail_puts_containing("side.jpg");
    let recipes = MockRecipeStore::new();
    let coordinator = coordinator(&objects, &recipes);

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();
    gate.resolve(selection());

    let result = coordinator.publish(khmer_soup_draft(), permit).await;
    match result {
        SubmissionResult::Failure {
            error: PublishError::Upload(error),
        } => assert_eq!(error.failed_slots(), vec![1]),
        other => panic!("expected upload failure, got {other:?}"),
    }

    assert_eq!(recipes.insert_recipe_call_count(), 0);
    assert_eq!(recipes.association_call_count(), 0);
}

#[tokio::test]
async fn association_failure_is_partial_and_names_the_slot() {
    let objects = MockObjectStore::new();
    let recipes = MockRecipeStore::new();
    recipes.fail_associations_containing("side.jpg");
    let coordinator = coordinator(&objects, &recipes);

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();
    gate.resolve(selection());

    let result = coordinator.publish(khmer_soup_draft(), permit).await;
    let (recipe_id, failed_slots) = match result {
        SubmissionResult::PartialFailure {
            recipe_id,
            failed_slots,
        } => (recipe_id, failed_slots),
        other => panic!("expected partial failure, got {other:?}"),
    };

    assert_eq!(failed_slots, vec![1]);

    // The recipe row and the sibling association stayed committed.
    let rows = recipes.recipes();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, recipe_id);
    let urls = recipes.association_urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].contains("front.jpg"));
}

#[tokio::test]
async fn one_failed_association_of_three_leaves_the_others_committed() {
    let objects = MockObjectStore::new();
    let recipes = MockRecipeStore::new();
    recipes.fail_associations_containing("middle.jpg");
    let coordinator = coordinator(&objects, &recipes);

    let mut draft = khmer_soup_draft();
    draft.attachments = vec![
        Some(Attachment::new(b"a".to_vec(), "first.jpg")),
        Some(Attachment::new(b"b".to_vec(), "middle.jpg")),
        Some(Attachment::new(b"c".to_vec(), "last.jpg")),
    ];

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();
    gate.resolve(selection());

    let result = coordinator.publish(draft, permit).await;
    match result {
        SubmissionResult::PartialFailure { failed_slots, .. } => {
            assert_eq!(failed_slots, vec![1]);
        }
        other => panic!("expected partial failure, got {other:?}"),
    }

    assert_eq!(recipes.association_call_count(), 3);
    let urls = recipes.association_urls();
    assert_eq!(urls.len(), 2);
    assert!(urls.iter().any(|url| url.contains("first.jpg")));
    assert!(urls.iter().any(|url| url.contains("last.jpg")));
}

#[tokio::test]
async fn attachment_free_draft_skips_the_object_store_entirely() {
    let objects = MockObjectStore::new();
    let recipes = MockRecipeStore::new();
    let coordinator = coordinator(&objects, &recipes);

    let mut draft = khmer_soup_draft();
    draft.attachments = Vec::new();

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();
    gate.resolve(selection());

    let result = coordinator.publish(draft, permit).await;
    assert!(result.is_success());

    assert_eq!(objects.put_call_count(), 0);
    assert_eq!(recipes.insert_recipe_call_count(), 1);
    assert_eq!(recipes.association_call_count(), 0);
}

#[tokio::test]
async fn duplicate_confirmation_produces_exactly_one_recipe() {
    let objects = MockObjectStore::new();
    let recipes = MockRecipeStore::new();
    let coordinator = coordinator(&objects, &recipes);

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();

    // A second submission of the same draft is refused while the first
    // attempt holds the permit.
    assert!(matches!(gate.open(), Err(GateError::AttemptInFlight)));

    // Double-clicking the confirm button: the first resolve wins, the
    // second finds nobody waiting.
    assert!(gate.resolve(selection()));
    assert!(!gate.resolve(TaxonomySelection {
        category_id: 9,
        occasion_id: 9,
    }));

    let result = coordinator.publish(khmer_soup_draft(), permit).await;
    assert!(result.is_success());

    let rows = recipes.recipes();
    assert_eq!(recipes.insert_recipe_call_count(), 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category_id, 3);
    assert_eq!(rows[0].occasion_id, 7);

    // The finished attempt released the gate.
    assert!(gate.open().is_ok());
}

#[tokio::test]
async fn abandoned_selection_commits_nothing() {
    let objects = MockObjectStore::new();
    let recipes = MockRecipeStore::new();
    let coordinator = coordinator(&objects, &recipes);

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();
    assert!(gate.cancel());

    let result = coordinator.publish(khmer_soup_draft(), permit).await;
    match result {
        SubmissionResult::Failure {
            error: PublishError::Gate(GateError::SelectionAbandoned),
        } => {}
        other => panic!("expected abandoned selection, got {other:?}"),
    }

    assert_eq!(objects.put_call_count(), 0);
    assert_eq!(recipes.insert_recipe_call_count(), 0);
}

#[tokio::test]
async fn publishes_through_the_filesystem_backend() {
    let dir = tempfile::tempdir().unwrap();
    let objects = LocalObjectStore::new(dir.path(), "http://localhost:8000/storage".to_string())
        .await
        .unwrap();
    let recipes = MockRecipeStore::new();
    let coordinator = CommitCoordinator::new(
        Arc::new(objects),
        Arc::new(recipes.clone()),
        Duration::from_secs(5),
        Duration::from_secs(5),
    );

    let gate = TaxonomyGate::new();
    let permit = gate.open().unwrap();
    gate.resolve(selection());

    let result = coordinator.publish(khmer_soup_draft(), permit).await;
    let recipe_id = match result {
        SubmissionResult::Success { recipe_id } => recipe_id,
        other => panic!("expected success, got {other:?}"),
    };

    // Blobs are on disk under the recipe's prefix.
    let images_dir = dir.path().join(recipe_id.to_string()).join("images");
    let mut on_disk: Vec<_> = std::fs::read_dir(&images_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    on_disk.sort();
    assert_eq!(on_disk.len(), 2);
    assert!(on_disk[0].ends_with(".jpg"));

    // Associations point at URLs under the configured base.
    let urls = recipes.association_urls();
    assert_eq!(urls.len(), 2);
    for url in &urls {
        assert!(url.starts_with("http://localhost:8000/storage/"));
        assert!(url.contains(&recipe_id.to_string()));
    }
}
