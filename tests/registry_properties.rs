//! Behavioural properties of the registry over a real SQLite file.

use std::collections::HashSet;

use tempfile::TempDir;

use stall_registry::{
    ingest, IdGenerator, NewReview, NewStall, RandomIds, SqliteStore, StallError, StallRegistry,
    CURRENT_USER,
};

/// Creates a registry backed by a fresh database in a temp dir.
fn create_registry() -> (StallRegistry, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join(".stalls.db");
    let registry = StallRegistry::open(&db_path).expect("Failed to open registry");
    (registry, temp_dir)
}

fn test_stall(name: &str, price: f64) -> NewStall {
    NewStall::new(
        name,
        "Night Market",
        "Late night snacks",
        "Fried chicken",
        price,
        "https://example.com/stall.jpg",
    )
}

// ============================================================================
// Initialization
// ============================================================================

mod initialize {
    use super::*;

    #[test]
    fn test_empty_store_gets_three_seed_stalls() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();

        let stalls = registry.all_stalls().unwrap();
        let names: Vec<&str> = stalls.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Joe's Street Tacos", "Mei's Dumplings", "Curry Express"]
        );

        let ratings: Vec<Option<f64>> = stalls.iter().map(|s| s.rating).collect();
        assert_eq!(ratings, vec![Some(4.5), Some(4.8), Some(4.2)]);

        let prices: Vec<f64> = stalls.iter().map(|s| s.approximate_price).collect();
        assert_eq!(prices, vec![8.0, 12.0, 10.0]);

        let ids: HashSet<&str> = stalls.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 3);

        assert!(registry.all_reviews().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();
        let once = registry.all_stalls().unwrap();

        registry.initialize().unwrap();
        assert_eq!(registry.all_stalls().unwrap(), once);
    }

    #[test]
    fn test_non_empty_store_is_not_reseeded() {
        let (registry, _temp_dir) = create_registry();
        let stall = registry.add_stall(test_stall("Only Stall", 3.0)).unwrap();

        let report = registry.initialize().unwrap();
        assert_eq!(report.seeded, 0);
        assert_eq!(registry.all_stalls().unwrap(), vec![stall]);
    }

    #[test]
    fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join(".stalls.db");

        let id = {
            let registry = StallRegistry::open(&db_path).unwrap();
            registry.initialize().unwrap();
            registry.add_stall(test_stall("Persisted", 4.0)).unwrap().id
        };

        let registry = StallRegistry::open(&db_path).unwrap();
        let report = registry.initialize().unwrap();
        assert_eq!(report.seeded, 0);
        assert!(registry.stall_by_id(&id).unwrap().is_some());
        assert_eq!(registry.all_stalls().unwrap().len(), 4);
    }
}

// ============================================================================
// Stalls
// ============================================================================

mod stalls {
    use super::*;

    #[test]
    fn test_add_then_lookup_returns_input_plus_identity() {
        let (registry, _temp_dir) = create_registry();
        let input = test_stall("Test Stall", 5.50);

        let created = registry.add_stall(input.clone()).unwrap();
        let found = registry.stall_by_id(&created.id).unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.name, input.name);
        assert_eq!(found.location, input.location);
        assert_eq!(found.description, input.description);
        assert_eq!(found.must_try_dish, input.must_try_dish);
        assert_eq!(found.image_url, input.image_url);
        assert_eq!(found.approximate_price, 5.50);
        assert_eq!(found.rating, None);
        assert!(!found.id.is_empty());
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();
        assert_eq!(registry.stall_by_id("does-not-exist").unwrap(), None);
    }

    #[test]
    fn test_default_ids_distinct_across_rapid_calls() {
        let ids = RandomIds;
        let issued: HashSet<String> = (0..10_000).map(|_| ids.next_id()).collect();
        assert_eq!(issued.len(), 10_000);
    }

    #[test]
    fn test_registry_ids_distinct_across_rapid_calls() {
        // Collections are cleared between batches to keep each whole-array
        // rewrite small; ids must stay distinct across all 10,000 calls.
        let registry = StallRegistry::in_memory();
        let mut ids = HashSet::new();
        for batch in 0..20 {
            for i in 0..250 {
                let stall = registry
                    .add_stall(test_stall(&format!("Stall {}-{}", batch, i), 1.0))
                    .unwrap();
                assert!(ids.insert(stall.id.clone()));
                let review = registry
                    .add_review(NewReview::new(
                        &stall.id,
                        &CURRENT_USER,
                        (i % 5 + 1) as u8,
                        "fast",
                    ))
                    .unwrap();
                assert!(ids.insert(review.id));
            }
            registry.clear().unwrap();
        }
        assert_eq!(ids.len(), 10_000);
    }
}

// ============================================================================
// Reviews and ratings
// ============================================================================

mod reviews {
    use super::*;

    #[test]
    fn test_two_reviews_average_to_four_and_a_half() {
        let (registry, _temp_dir) = create_registry();
        let stall = registry.add_stall(test_stall("Average Joe", 6.0)).unwrap();

        registry
            .add_review(NewReview::new(&stall.id, &CURRENT_USER, 4, "Solid"))
            .unwrap();
        registry
            .add_review(NewReview::new(&stall.id, &CURRENT_USER, 5, "Great"))
            .unwrap();

        let stall = registry.stall_by_id(&stall.id).unwrap().unwrap();
        assert_eq!(stall.rating, Some(4.5));
    }

    #[test]
    fn test_rating_tracks_mean_after_every_addition() {
        let (registry, _temp_dir) = create_registry();
        let stall = registry.add_stall(test_stall("Moving Target", 6.0)).unwrap();
        let other = registry.add_stall(test_stall("Bystander", 6.0)).unwrap();

        let ratings = [5u8, 1, 3, 4, 4, 2, 5];
        let mut seen = Vec::new();
        for (i, rating) in ratings.iter().enumerate() {
            registry
                .add_review(NewReview::new(&stall.id, &CURRENT_USER, *rating, "again"))
                .unwrap();
            registry
                .add_review(NewReview::new(&other.id, &CURRENT_USER, 1, "noise"))
                .unwrap();
            seen.push(*rating as f64);

            let expected = seen.iter().sum::<f64>() / seen.len() as f64;
            let actual = registry.stall_by_id(&stall.id).unwrap().unwrap().rating.unwrap();
            assert!(
                (actual - expected).abs() < 1e-9,
                "after review {}: expected {}, got {}",
                i,
                expected,
                actual
            );
        }

        let other = registry.stall_by_id(&other.id).unwrap().unwrap();
        assert_eq!(other.rating, Some(1.0));
    }

    #[test]
    fn test_seed_rating_replaced_by_first_review() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();
        let tacos = registry.all_stalls().unwrap().remove(0);
        assert_eq!(tacos.rating, Some(4.5));

        registry
            .add_review(NewReview::new(&tacos.id, &CURRENT_USER, 2, "Off night"))
            .unwrap();
        assert_eq!(
            registry.stall_by_id(&tacos.id).unwrap().unwrap().rating,
            Some(2.0)
        );
    }

    #[test]
    fn test_reviews_by_stall_never_leak_other_stalls() {
        let (registry, _temp_dir) = create_registry();
        let a = registry.add_stall(test_stall("A", 1.0)).unwrap();
        let b = registry.add_stall(test_stall("B", 1.0)).unwrap();

        for i in 0..6u8 {
            let target = if i % 2 == 0 { &a.id } else { &b.id };
            registry
                .add_review(NewReview::new(target, &CURRENT_USER, i % 5 + 1, "mixed"))
                .unwrap();
        }

        for stall_id in [&a.id, &b.id] {
            let reviews = registry.reviews_by_stall_id(stall_id).unwrap();
            assert_eq!(reviews.len(), 3);
            assert!(reviews.iter().all(|r| &r.stall_id == stall_id));
        }
        assert!(registry.reviews_by_stall_id("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_reviews_by_user() {
        let (registry, _temp_dir) = create_registry();
        let stall = registry.add_stall(test_stall("Mine", 2.0)).unwrap();
        let review = registry
            .add_review(NewReview::new(&stall.id, &CURRENT_USER, 3, "Mine"))
            .unwrap();

        assert_eq!(registry.reviews_by_user_id("1").unwrap(), vec![review.clone()]);
        assert!(registry.reviews_by_user_id("2").unwrap().is_empty());

        let joined = registry.reviews_with_stalls("1").unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].review, review);
        assert_eq!(joined[0].stall.as_ref().map(|s| s.name.as_str()), Some("Mine"));
    }
}

// ============================================================================
// Failure handling
// ============================================================================

mod failures {
    use super::*;
    use stall_registry::KeyValueStore;

    #[test]
    fn test_corrupt_stalls_surface_as_error() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join(".stalls.db");
        {
            let store = SqliteStore::new(&db_path).unwrap();
            store
                .set("foodStalls", r#"[{"id": "1", "name": "Half a stall"}]"#)
                .unwrap();
        }

        let registry = StallRegistry::open(&db_path).unwrap();
        assert!(matches!(
            registry.all_stalls(),
            Err(StallError::CorruptData { .. })
        ));
        assert!(matches!(
            registry.initialize(),
            Err(StallError::CorruptData { .. })
        ));
        assert!(registry.add_stall(test_stall("Blocked", 1.0)).is_err());
    }

    #[test]
    fn test_invalid_input_leaves_collections_readable() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();
        let stall = registry.all_stalls().unwrap().remove(0);

        assert!(registry
            .add_review(NewReview::new(&stall.id, &CURRENT_USER, 0, "zero"))
            .is_err());
        assert!(registry.add_stall(test_stall("Priceless", f64::NAN)).is_err());

        assert_eq!(registry.all_stalls().unwrap().len(), 3);
        assert!(registry.all_reviews().unwrap().is_empty());
        assert_eq!(registry.initialize().unwrap().seeded, 0);
        registry.add_stall(test_stall("After", 2.0)).unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_image_writes_nothing() {
        let (registry, temp_dir) = create_registry();
        registry.initialize().unwrap();
        let before = registry.all_stalls().unwrap();

        let missing = temp_dir.path().join("no-such-photo.jpg");
        let result = ingest(&missing, 1024).await;

        let err = result.unwrap_err();
        assert!(matches!(err, StallError::UnreadableFile { .. }));
        assert_eq!(registry.all_stalls().unwrap(), before);
        assert!(registry.all_reviews().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingested_image_is_stored_inline() {
        let (registry, temp_dir) = create_registry();
        let path = temp_dir.path().join("dumpling.gif");
        std::fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();

        let image_url = ingest(&path, 1024).await.unwrap();
        let stall = registry
            .add_stall(NewStall {
                image_url,
                ..test_stall("Gif Stall", 3.0)
            })
            .unwrap();

        let stored = registry.stall_by_id(&stall.id).unwrap().unwrap();
        assert!(stored.image_url.starts_with("data:image/gif;base64,"));
    }
}

// ============================================================================
// Listing
// ============================================================================

mod listing {
    use super::*;
    use stall_registry::{StallFilter, StallSort};

    #[test]
    fn test_seed_stalls_by_rating_and_name() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();

        let by_rating = registry.list_stalls(&StallFilter::default()).unwrap();
        let names: Vec<&str> = by_rating.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Mei's Dumplings", "Joe's Street Tacos", "Curry Express"]
        );

        let by_name = registry
            .list_stalls(&StallFilter::default().sorted_by(StallSort::Name))
            .unwrap();
        let names: Vec<&str> = by_name.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Curry Express", "Joe's Street Tacos", "Mei's Dumplings"]
        );
    }

    #[test]
    fn test_location_filter_and_locations() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();
        registry.add_stall(test_stall("Late Bites", 4.0)).unwrap();

        assert_eq!(
            registry.locations().unwrap(),
            vec!["Chinatown", "Downtown", "Little India", "Night Market"]
        );

        let downtown = registry.list_stalls(&StallFilter::at("Downtown")).unwrap();
        assert_eq!(downtown.len(), 1);
        assert_eq!(downtown[0].name, "Joe's Street Tacos");
    }

    #[test]
    fn test_name_taken_is_case_insensitive() {
        let (registry, _temp_dir) = create_registry();
        registry.initialize().unwrap();
        assert!(registry.is_name_taken("curry express").unwrap());
        assert!(!registry.is_name_taken("Curry Palace").unwrap());
    }
}
