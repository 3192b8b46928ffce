mod common;

use std::sync::Arc;

use common::*;
use elif_remote::*;
use serde_json::json;

fn profiles_and_posts() -> Arc<RecordingClient> {
    Arc::new(
        RecordingClient::new()
            .with_entity("Profile", json!({"id": 101, "author_id": 1}))
            .with_entity("Profile", json!({"id": 102, "author_id": 2}))
            .with_entity("Profile", json!({"id": 109, "author_id": 9}))
            .with_entity("Post", json!({"id": 201, "author_id": 1}))
            .with_entity("Post", json!({"id": 202, "author_id": 2}))
            .with_entity("Post", json!({"id": 203, "author_id": 1})),
    )
}

fn authors(ids: &[i64]) -> Vec<Author> {
    ids.iter().copied().map(Author::new).collect()
}

#[tokio::test]
async fn test_one_request_for_duplicate_keys() {
    let client = profiles_and_posts();
    let mut records = authors(&[1, 2, 2]);

    BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["profile"])
        .await
        .unwrap();

    assert_eq!(
        client.calls(),
        vec![Call {
            target_type: "Profile".to_string(),
            scope: Scope::All,
            params: QueryParams::from([(
                "author_id".to_string(),
                ParamValue::Set(vec![FieldValue::Integer(1), FieldValue::Integer(2)]),
            )]),
        }]
    );

    let profile_of = |author: &Author| {
        author
            .associations
            .get("profile")
            .and_then(|value| value.as_one().cloned())
            .unwrap()
    };
    assert_eq!(id_of(&profile_of(&records[0])), 101);
    assert_eq!(id_of(&profile_of(&records[1])), 102);
    assert!(Arc::ptr_eq(&profile_of(&records[1]), &profile_of(&records[2])));
    assert!(records
        .iter()
        .all(|author| author.associations.is_prefetched("profile")));
}

#[tokio::test]
async fn test_each_record_gets_only_its_own_entities() {
    let client = profiles_and_posts();
    let mut records = authors(&[1, 2, 3]);

    BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["posts"])
        .await
        .unwrap();

    let ids: Vec<Vec<i64>> = records
        .iter()
        .map(|author| {
            author
                .associations
                .get("posts")
                .and_then(ResolutionResult::as_many)
                .unwrap()
                .iter()
                .map(|post| id_of(post))
                .collect()
        })
        .collect();

    assert_eq!(ids, vec![vec![201, 203], vec![202], vec![]]);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_one_request_per_association_in_order() {
    let client = profiles_and_posts();
    let mut records = authors(&[1, 2, 3, 4, 5]);

    BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["posts", "profile"])
        .await
        .unwrap();

    let targets: Vec<String> = client.calls().into_iter().map(|c| c.target_type).collect();
    assert_eq!(targets, vec!["Post", "Profile"]);
}

#[tokio::test]
async fn test_singular_access_after_batch_does_not_fetch() {
    let client = profiles_and_posts();
    let registry = author_registry();
    let mut records = authors(&[1, 3]);

    BatchResolver::new(registry.clone(), client.clone())
        .resolve_all(&mut records, &["profile", "posts"])
        .await
        .unwrap();
    assert_eq!(client.call_count(), 2);

    let singular = SingularResolver::new(registry, client.clone());
    let batched = records[0].associations.get("profile").cloned().unwrap();
    let resolved = singular.resolve(&mut records[0], "profile").await.unwrap();
    let missing = singular.one(&mut records[1], "profile").await.unwrap();
    let no_posts = singular.many(&mut records[1], "posts").await.unwrap();

    assert_eq!(resolved, batched);
    assert!(missing.is_none());
    assert!(no_posts.is_empty());
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_unregistered_association_fails_without_request() {
    let client = profiles_and_posts();
    let mut records = authors(&[1, 2]);

    let err = BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["avatar"])
        .await
        .unwrap_err();

    assert!(matches!(err, AssociationError::NotFound { ref name, .. } if name == "avatar"));
    assert!(err.to_string().contains("avatar"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_earlier_associations_stay_applied_when_a_later_name_fails() {
    let client = profiles_and_posts();
    let mut records = authors(&[1, 2]);

    let result = BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["profile", "avatar", "posts"])
        .await;

    assert!(result.is_err());
    assert_eq!(client.calls_for("Profile"), 1);
    assert_eq!(client.calls_for("Post"), 0);
    assert!(records[0].associations.is_prefetched("profile"));
    assert!(!records[0].associations.is_loaded("posts"));
}

#[tokio::test]
async fn test_remote_failure_propagates_and_keeps_prior_results() {
    let client = Arc::new(
        RecordingClient::new()
            .with_entity("Profile", json!({"id": 101, "author_id": 1}))
            .failing("Post", Failure::Network),
    );
    let mut records = authors(&[1]);

    let err = BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["profile", "posts"])
        .await
        .unwrap_err();

    assert!(matches!(err, AssociationError::Remote(RemoteError::Network { .. })));
    assert!(records[0].associations.is_prefetched("profile"));
    assert!(!records[0].associations.is_prefetched("posts"));
}

#[tokio::test]
async fn test_empty_records_make_no_requests() {
    let client = profiles_and_posts();
    let mut records: Vec<Author> = Vec::new();

    let resolved = BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["profile", "avatar"])
        .await
        .unwrap();

    assert!(resolved.is_empty());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_empty_remote_result_still_marks_prefetched() {
    let client = Arc::new(RecordingClient::new());
    let mut records = authors(&[1, 2]);

    BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["profile", "posts"])
        .await
        .unwrap();

    for author in &records {
        assert_eq!(author.associations.get("profile"), Some(&ResolutionResult::One(None)));
        assert_eq!(
            author.associations.get("posts"),
            Some(&ResolutionResult::Many(Vec::new()))
        );
        assert!(author.associations.is_prefetched("profile"));
        assert!(author.associations.is_prefetched("posts"));
    }
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_null_keys_are_not_sent() {
    let client = profiles_and_posts();
    let mut records = vec![Author::unsaved(), Author::new(2)];

    BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["profile"])
        .await
        .unwrap();

    assert_eq!(
        client.calls()[0].params.get("author_id"),
        Some(&ParamValue::Set(vec![FieldValue::Integer(2)]))
    );
    assert_eq!(records[0].associations.get("profile"), Some(&ResolutionResult::One(None)));
    assert!(records[0].associations.is_prefetched("profile"));
}

#[tokio::test]
async fn test_only_null_keys_skip_the_request() {
    let client = profiles_and_posts();
    let mut records = vec![Author::unsaved(), Author::unsaved()];

    BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["posts"])
        .await
        .unwrap();

    assert_eq!(client.call_count(), 0);
    assert!(records.iter().all(|a| a.associations.is_prefetched("posts")));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let client = profiles_and_posts();
    let resolver = BatchResolver::new(author_registry(), client.clone());
    let mut records = authors(&[1, 2]);

    resolver.resolve_all(&mut records, &["posts"]).await.unwrap();
    let first: Vec<usize> = records
        .iter()
        .map(|a| a.associations.get("posts").unwrap().len())
        .collect();

    resolver.resolve_all(&mut records, &["posts"]).await.unwrap();
    let second: Vec<usize> = records
        .iter()
        .map(|a| a.associations.get("posts").unwrap().len())
        .collect();

    assert_eq!(first, second);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_returns_records_for_chaining() {
    let client = profiles_and_posts();
    let mut records = authors(&[1]);

    let resolved = BatchResolver::new(author_registry(), client)
        .resolve_all(&mut records, &["profile"])
        .await
        .unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].associations.loaded_names(), vec!["profile"]);
}

#[tokio::test]
async fn test_max_batch_size_splits_requests() {
    let client = profiles_and_posts();
    let mut records = authors(&[1, 2, 9]);

    BatchResolver::new(author_registry(), client.clone())
        .with_config(BatchConfig::new().with_max_batch_size(2))
        .resolve_all(&mut records, &["profile"])
        .await
        .unwrap();

    assert_eq!(client.call_count(), 2);
    assert!(records
        .iter()
        .all(|a| a.associations.get("profile").unwrap().as_one().is_some()));
}

#[tokio::test]
async fn test_parallel_execution_matches_sequential() {
    let client = profiles_and_posts();
    let mut records = authors(&[1, 2, 3]);

    BatchResolver::new(author_registry(), client.clone())
        .with_config(BatchConfig::new().with_parallel_execution(true))
        .resolve_all(&mut records, &["profile", "posts"])
        .await
        .unwrap();

    assert_eq!(client.calls_for("Profile"), 1);
    assert_eq!(client.calls_for("Post"), 1);
    assert_eq!(records[0].associations.get("posts").unwrap().len(), 2);
    assert_eq!(records[2].associations.get("profile"), Some(&ResolutionResult::One(None)));
}

#[tokio::test]
async fn test_parallel_execution_checks_every_name_first() {
    let client = profiles_and_posts();
    let mut records = authors(&[1]);

    let err = BatchResolver::new(author_registry(), client.clone())
        .with_config(BatchConfig::new().with_parallel_execution(true))
        .resolve_all(&mut records, &["profile", "avatar"])
        .await
        .unwrap_err();

    assert!(matches!(err, AssociationError::NotFound { .. }));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_zero_batch_size_outside_builder_sends_one_request() {
    let literal = BatchConfig {
        max_batch_size: Some(0),
        parallel_execution: false,
    };
    let deserialized: BatchConfig =
        serde_json::from_str(r#"{"max_batch_size": 0, "parallel_execution": false}"#).unwrap();

    for config in [literal, deserialized] {
        let client = profiles_and_posts();
        let mut records = authors(&[1, 2]);

        BatchResolver::new(author_registry(), client.clone())
            .with_config(config)
            .resolve_all(&mut records, &["posts"])
            .await
            .unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(records[0].associations.get("posts").unwrap().len(), 2);
        assert_eq!(records[1].associations.get("posts").unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_last_scoped_one_agrees_with_singular_resolution() {
    let registry = Arc::new(
        AssociationRegistry::builder()
            .has_one::<Author>(
                "latest_post",
                AssociationOptions::new().class_name("Post").scope(Scope::Last),
            )
            .unwrap()
            .build(),
    );
    let client = Arc::new(
        RecordingClient::new()
            .with_entity("Post", json!({"id": 10, "author_id": 1}))
            .with_entity("Post", json!({"id": 11, "author_id": 1}))
            .with_entity("Post", json!({"id": 12, "author_id": 2})),
    );

    let mut single = Author::new(1);
    let lazy = SingularResolver::new(registry.clone(), client.clone())
        .one(&mut single, "latest_post")
        .await
        .unwrap()
        .unwrap();

    let mut records = authors(&[1, 2]);
    BatchResolver::new(registry, client)
        .resolve_all(&mut records, &["latest_post"])
        .await
        .unwrap();

    let latest_of = |author: &Author| {
        author
            .associations
            .get("latest_post")
            .and_then(|value| value.as_one().cloned())
            .unwrap()
    };
    assert_eq!(id_of(&lazy), 11);
    assert_eq!(id_of(&latest_of(&records[0])), 11);
    assert_eq!(id_of(&latest_of(&records[1])), 12);
}

#[tokio::test]
async fn test_not_found_batch_assigns_empty() {
    let client = Arc::new(
        RecordingClient::new()
            .with_entity("Post", json!({"id": 201, "author_id": 1}))
            .failing("Profile", Failure::NotFound),
    );
    let mut records = authors(&[1, 2]);

    BatchResolver::new(author_registry(), client.clone())
        .resolve_all(&mut records, &["profile", "posts"])
        .await
        .unwrap();

    assert_eq!(client.call_count(), 2);
    for author in &records {
        assert_eq!(
            author.associations.get("profile"),
            Some(&ResolutionResult::One(None))
        );
        assert!(author.associations.is_prefetched("profile"));
    }
    assert_eq!(records[0].associations.get("posts").unwrap().len(), 1);
}
