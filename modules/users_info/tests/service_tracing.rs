//! Tests to verify that the service layer runs cleanly under a tracing subscriber

use std::sync::Arc;

use listing::ListQuery;
use serde_json::Value;
use tracing_test::traced_test;

use users_info::contract::model::{Gender, NewUser, UserPatch};
use users_info::domain::error::DomainError;
use users_info::domain::ids::SeededIdGenerator;
use users_info::domain::ports::RandomUserSource;
use users_info::domain::service::Service;
use users_info::domain::store::UserStore;

// Upstream that always fails, to exercise the error paths
struct DownSource;

#[async_trait::async_trait]
impl RandomUserSource for DownSource {
    async fn fetch(&self, _count: u32) -> Result<Vec<Value>, DomainError> {
        Err(DomainError::gateway("connection refused"))
    }
}

fn service() -> Service {
    Service::new(
        Arc::new(UserStore::new()),
        Arc::new(DownSource),
        Arc::new(SeededIdGenerator::new(3)),
    )
}

fn new_user() -> NewUser {
    NewUser {
        id: None,
        title: "Ser".to_string(),
        first_name: "Jaime".to_string(),
        last_name: "Lannister".to_string(),
        gender: Gender::Male,
        age: 40,
        address: "1 Lion Gate Casterly Rock".to_string(),
        country: "Westeros".to_string(),
        email: "jaime@lannister.io".to_string(),
        phone: "555-0001".to_string(),
        picture: "https://img.example.com/l/7.jpg".to_string(),
        thumbnail: "https://img.example.com/t/7.jpg".to_string(),
    }
}

#[traced_test]
#[tokio::test]
async fn crud_operations_emit_spans() {
    let service = service();

    let created = service.create_user(new_user()).await.unwrap();
    let fetched = service.get_user(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = service
        .update_user(
            &created.id,
            UserPatch {
                title: Some("Lord".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Lord");

    let listed = service.list_users(ListQuery::default()).await.unwrap();
    assert_eq!(listed.len(), 1);

    service.delete_user(&created.id).await.unwrap();
    assert!(service.store().is_empty());
}

#[traced_test]
#[tokio::test]
async fn failures_are_reported_not_panicked() {
    let service = service();

    assert_eq!(
        service.get_user("missing").await.unwrap_err(),
        DomainError::user_not_found("missing")
    );
    assert!(matches!(
        service.create_random_user().await,
        Err(DomainError::Gateway { .. })
    ));
    assert!(service.seed_from_source(10).await.is_err());
    assert!(service.store().is_empty());
}
