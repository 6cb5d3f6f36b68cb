use super::*;
use std::sync::Arc;

use serde_json::json;

use crate::embedding::{EmbeddingAccessor, EmbeddingError, MockEmbedder};
use crate::propagation::RecordingJobQueue;
use crate::store::{CompanyRecord, MemoryRecordStore};

struct Harness {
    service: RecommendationService,
    store: Arc<MemoryRecordStore>,
    queue: Arc<RecordingJobQueue>,
    embedder: Arc<MockEmbedder>,
}

fn harness(records: Vec<CompanyRecord>) -> Harness {
    let embedder = Arc::new(
        MockEmbedder::new(2)
            .with_vector("robots", vec![1.0, 0.0])
            .with_vector("bread", vec![0.0, 1.0]),
    );
    let store = Arc::new(MemoryRecordStore::with_records(records));
    let queue = Arc::new(RecordingJobQueue::new());
    let engine = Arc::new(RankingEngine::new(Arc::new(EmbeddingAccessor::new(
        embedder.clone(),
    ))));
    let service = RecommendationService::new(store.clone(), engine, queue.clone());

    Harness {
        service,
        store,
        queue,
        embedder,
    }
}

fn profile(value: serde_json::Value) -> CompanyProfile {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_register_first_company() {
    let h = harness(vec![]);

    let registration = h
        .service
        .register_company(CompanyProfile::new("Acme", "robots"))
        .await
        .unwrap();

    assert!(registration.recommendations.is_empty());
    assert_eq!(registration.company.company_name, "Acme");

    let stored = h.store.get("Acme").await.unwrap().unwrap();
    assert_eq!(stored.embedding, Some(vec![1.0, 0.0]));
    assert_eq!(h.queue.company_ids(), vec!["Acme"]);
}

#[tokio::test]
async fn test_register_returns_ranked_existing_companies() {
    let h = harness(vec![
        CompanyRecord::new("Bakery", "bread").with_embedding(vec![0.0, 1.0]),
        CompanyRecord::new("RoboCo", "robots").with_embedding(vec![1.0, 0.0]),
    ]);

    let registration = h
        .service
        .register_company(CompanyProfile::new("Acme", "robots"))
        .await
        .unwrap();

    let names: Vec<&str> = registration
        .recommendations
        .iter()
        .map(|r| r.company.company_name.as_str())
        .collect();
    assert_eq!(names, vec!["RoboCo", "Bakery"]);
    assert!(registration.recommendations[0].score > registration.recommendations[1].score);

    // propagation is queued, not run inline
    let bakery = h.store.get("Bakery").await.unwrap().unwrap();
    assert!(bakery.cached_recommendations.is_none());
    let acme = h.store.get("Acme").await.unwrap().unwrap();
    assert!(acme.cached_recommendations.is_none());
}

#[tokio::test]
async fn test_register_validation() {
    let h = harness(vec![]);

    let err = h
        .service
        .register_company(profile(json!({"companyProfile": "robots"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::MissingField { field: "companyName" }));
    assert!(err.is_validation());

    let err = h
        .service
        .register_company(profile(json!({"companyName": "Acme", "companyProfile": "   "})))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::MissingField { field: "companyProfile" }));

    assert_eq!(h.store.count().await.unwrap(), 0);
    assert!(h.queue.jobs().is_empty());
    assert_eq!(h.embedder.call_count(), 0);
}

#[tokio::test]
async fn test_register_keeps_extra_fields_and_drops_reserved() {
    let h = harness(vec![]);

    let registration = h
        .service
        .register_company(profile(json!({
            "companyName": "Acme",
            "companyProfile": "robots",
            "businessKeywords": ["ai"],
            "gives": "yes",
            "vector": [9.0, 9.0],
            "recommendations": [],
            "country": {"$oid": "64b0"}
        })))
        .await
        .unwrap();

    let stored = h.store.get("Acme").await.unwrap().unwrap();
    assert_eq!(stored.embedding, Some(vec![1.0, 0.0]));
    assert!(stored.gives);
    assert!(stored.cached_recommendations.is_none());
    assert_eq!(stored.auxiliary.len(), 1);
    assert_eq!(stored.auxiliary["country"], json!({"$oid": "64b0"}));

    assert_eq!(registration.company.auxiliary["country"], json!("64b0"));
}

#[tokio::test]
async fn test_register_survives_queue_failure() {
    let h = harness(vec![]);
    h.queue.close();

    let registration = h
        .service
        .register_company(CompanyProfile::new("Acme", "robots"))
        .await;

    assert!(registration.is_ok());
    assert!(h.store.get("Acme").await.unwrap().is_some());
}

#[tokio::test]
async fn test_register_embedding_outage() {
    let h = harness(vec![]);
    h.embedder.fail_next(1);

    let err = h
        .service
        .register_company(CompanyProfile::new("Acme", "robots"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Embedding(EmbeddingError::Unavailable { .. })));
    assert!(err.is_retryable());
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_same_name_replaces_record() {
    let h = harness(vec![]);
    h.service
        .register_company(CompanyProfile::new("Acme", "robots"))
        .await
        .unwrap();
    h.service
        .register_company(CompanyProfile::new("Acme", "bread"))
        .await
        .unwrap();

    assert_eq!(h.store.count().await.unwrap(), 1);
    let stored = h.store.get("Acme").await.unwrap().unwrap();
    assert_eq!(stored.profile_text.as_deref(), Some("bread"));
    assert_eq!(h.queue.jobs().len(), 2);
}

#[tokio::test]
async fn test_query_is_read_only() {
    let h = harness(vec![
        CompanyRecord::new("RoboCo", "robots").with_embedding(vec![1.0, 0.0]),
        CompanyRecord::new("Bakery", "bread").with_embedding(vec![0.0, 1.0]),
    ]);

    let recommendations = h
        .service
        .query_recommendations(profile(json!({"companyProfile": "bread"})))
        .await
        .unwrap();

    assert_eq!(recommendations[0].company.company_name, "Bakery");
    assert_eq!(h.store.count().await.unwrap(), 2);
    assert!(h.queue.jobs().is_empty());
}

#[tokio::test]
async fn test_query_excludes_same_name() {
    let h = harness(vec![
        CompanyRecord::new("RoboCo", "robots").with_embedding(vec![1.0, 0.0]),
        CompanyRecord::new("Bakery", "bread").with_embedding(vec![0.0, 1.0]),
    ]);

    let recommendations = h
        .service
        .query_recommendations(CompanyProfile::new("RoboCo", "robots"))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].company.company_name, "Bakery");
}

#[tokio::test]
async fn test_query_requires_profile() {
    let h = harness(vec![]);

    let err = h
        .service
        .query_recommendations(profile(json!({"companyName": "Acme"})))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::MissingField { field: "companyProfile" }));
}

#[test]
fn test_profile_deserialize_defaults() {
    let p = profile(json!({"companyProfile": "x", "top10Customers": 1}));

    assert!(p.company_name.is_none());
    assert!(p.business_keywords.is_empty());
    assert!(!p.gives);
    assert!(p.top10_customers);
}
