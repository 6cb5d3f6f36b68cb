use super::*;
use std::sync::Arc;

use serde_json::json;

use crate::embedding::{EmbeddingAccessor, EmbeddingError, MockEmbedder};
use crate::scoring::ScoringError;
use crate::store::{CompanyRecord, CompanyView};

const EPS: f32 = 1e-6;

fn engine_with(mock: Arc<MockEmbedder>) -> RankingEngine {
    RankingEngine::new(Arc::new(EmbeddingAccessor::new(mock)))
}

fn stub_engine() -> RankingEngine {
    engine_with(Arc::new(MockEmbedder::new(3)))
}

fn names(recommendations: &[crate::store::Recommendation]) -> Vec<&str> {
    recommendations
        .iter()
        .map(|r| r.company.company_name.as_str())
        .collect()
}

#[tokio::test]
async fn test_rank_excludes_self_and_orders_by_score() {
    let query = CompanyRecord::new("Q", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool = vec![
        query.clone(),
        CompanyRecord::new("far", "").with_embedding(vec![0.0, 1.0, 0.0]),
        CompanyRecord::new("near", "").with_embedding(vec![1.0, 0.1, 0.0]),
        CompanyRecord::new("mid", "").with_embedding(vec![1.0, 1.0, 0.0]),
    ];

    let ranked = stub_engine().rank(&query, &pool).await.unwrap();

    assert_eq!(names(&ranked), vec!["near", "mid", "far"]);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_rank_truncates_to_top_five() {
    let query = CompanyRecord::new("Q", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool: Vec<CompanyRecord> = (0..9)
        .map(|i| {
            CompanyRecord::new(format!("c{i}"), "").with_embedding(vec![1.0, i as f32, 0.0])
        })
        .collect();

    let ranked = stub_engine().rank(&query, &pool).await.unwrap();

    assert_eq!(ranked.len(), 5);
    assert_eq!(names(&ranked), vec!["c0", "c1", "c2", "c3", "c4"]);
}

#[tokio::test]
async fn test_rank_small_pool_returns_all() {
    let query = CompanyRecord::new("Q", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool = vec![
        CompanyRecord::new("a", "").with_embedding(vec![0.0, 1.0, 0.0]),
        CompanyRecord::new("b", "").with_embedding(vec![0.0, 0.0, 1.0]),
    ];

    assert_eq!(stub_engine().rank(&query, &pool).await.unwrap().len(), 2);
    assert!(stub_engine().rank(&query, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rank_ties_keep_pool_order() {
    let query = CompanyRecord::new("Q", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool: Vec<CompanyRecord> = ["first", "second", "third"]
        .iter()
        .map(|name| CompanyRecord::new(*name, "").with_embedding(vec![0.5, 0.5, 0.0]))
        .collect();

    let ranked = stub_engine().rank(&query, &pool).await.unwrap();
    assert_eq!(names(&ranked), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_rank_bonuses_and_keywords_combine() {
    let query = CompanyRecord::new("Q", "")
        .with_embedding(vec![1.0, 0.0, 0.0])
        .with_keywords(["ai", "fintech"])
        .with_gives(true)
        .with_top10_customers(true);
    let pool = vec![
        CompanyRecord::new("plain", "").with_embedding(vec![1.0, 0.0, 0.0]),
        CompanyRecord::new("bonus", "")
            .with_embedding(vec![1.0, 0.0, 0.0])
            .with_keywords(["ai"])
            .with_gives(true)
            .with_top10_customers(true),
    ];

    let ranked = stub_engine().rank(&query, &pool).await.unwrap();

    assert_eq!(names(&ranked), vec!["bonus", "plain"]);
    assert!((ranked[0].score - (0.4 + 0.15 + 0.1 + 0.1)).abs() < EPS);
    assert!((ranked[1].score - 0.4).abs() < EPS);
}

#[tokio::test]
async fn test_anonymous_query_excludes_nothing() {
    let query = CompanyRecord::new("", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool = vec![
        CompanyRecord::new("", "").with_embedding(vec![1.0, 0.0, 0.0]),
        CompanyRecord::new("named", "").with_embedding(vec![1.0, 0.0, 0.0]),
    ];

    assert_eq!(stub_engine().rank(&query, &pool).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rank_computes_missing_embeddings() {
    let mock = Arc::new(
        MockEmbedder::new(3)
            .with_vector("robotics", vec![1.0, 0.0, 0.0])
            .with_vector("bakery", vec![0.0, 1.0, 0.0]),
    );
    let engine = engine_with(Arc::clone(&mock));
    let query = CompanyRecord::new("Q", "robotics");
    let pool = vec![
        CompanyRecord::new("Bakery", "bakery"),
        CompanyRecord::new("Robots", "robotics"),
    ];

    let ranked = engine.rank(&query, &pool).await.unwrap();

    assert_eq!(names(&ranked), vec!["Robots", "Bakery"]);
    assert!((ranked[0].score - 0.4).abs() < EPS);
    // query and "Robots" share one memoised vector
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_rank_reembeds_empty_stored_vector() {
    let mock = Arc::new(MockEmbedder::new(3).with_vector("robotics", vec![1.0, 0.0, 0.0]));
    let engine = engine_with(Arc::clone(&mock));
    let query = CompanyRecord::new("Q", "robotics");
    let pool = vec![CompanyRecord::new("legacy", "robotics").with_embedding(vec![])];

    let ranked = engine.rank(&query, &pool).await.unwrap();

    assert_eq!(names(&ranked), vec!["legacy"]);
    assert!((ranked[0].score - 0.4).abs() < EPS);
}

#[tokio::test]
async fn test_rank_runs_on_spawned_task() {
    let engine = Arc::new(stub_engine());
    let query = CompanyRecord::new("Q", "robotics");
    let pool = vec![
        CompanyRecord::new("a", "robotics"),
        CompanyRecord::new("b", "").with_embedding(vec![0.0, 1.0, 0.0]),
    ];

    let ranked = tokio::spawn(async move { engine.rank(&query, &pool).await })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ranked.len(), 2);
}

#[tokio::test]
async fn test_rank_dimension_mismatch_fails_whole_call() {
    let query = CompanyRecord::new("Q", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool = vec![
        CompanyRecord::new("ok", "").with_embedding(vec![1.0, 0.0, 0.0]),
        CompanyRecord::new("legacy", "").with_embedding(vec![1.0, 0.0]),
    ];

    let err = stub_engine().rank(&query, &pool).await.unwrap_err();
    assert!(matches!(
        err,
        RankingError::Scoring(ScoringError::DimensionMismatch { left: 3, right: 2 })
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_rank_embedding_outage_is_retryable() {
    let mock = Arc::new(MockEmbedder::new(3));
    mock.fail_next(1);
    let engine = engine_with(mock);

    let err = engine
        .rank(&CompanyRecord::new("Q", "needs embedding"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, RankingError::Embedding(EmbeddingError::Unavailable { .. })));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_score_candidates_is_unsorted_and_complete() {
    let query = CompanyRecord::new("Q", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool: Vec<CompanyRecord> = (0..7)
        .map(|i| {
            CompanyRecord::new(format!("c{i}"), "").with_embedding(vec![i as f32, 1.0, 0.0])
        })
        .collect();

    let scored = stub_engine().score_candidates(&query, &pool).await.unwrap();

    assert_eq!(scored.len(), 7);
    assert_eq!(scored[0].record.identifier, "c0");
    assert!(scored[0].breakdown.total < scored[6].breakdown.total);
}

#[tokio::test]
async fn test_with_top_k() {
    let engine = stub_engine().with_top_k(2);
    let query = CompanyRecord::new("Q", "").with_embedding(vec![1.0, 0.0, 0.0]);
    let pool: Vec<CompanyRecord> = (0..4)
        .map(|i| CompanyRecord::new(format!("c{i}"), "").with_embedding(vec![1.0, 0.0, 0.0]))
        .collect();

    assert_eq!(engine.top_k(), 2);
    assert_eq!(engine.rank(&query, &pool).await.unwrap().len(), 2);
}

#[test]
fn test_projection_strips_internal_fields() {
    let mut record = CompanyRecord::new("Acme", "robots")
        .with_embedding(vec![1.0])
        .with_auxiliary("website", json!("acme.example"))
        .with_auxiliary("score", json!(99));
    record.cached_recommendations = Some(vec![]);

    let view = CompanyView::project(&record);
    let value = serde_json::to_value(&view).unwrap();

    assert_eq!(value["companyName"], "Acme");
    assert_eq!(value["companyProfile"], "robots");
    assert_eq!(value["website"], "acme.example");
    assert!(value.get("vector").is_none());
    assert!(value.get("recommendations").is_none());
    assert!(value.get("score").is_none());
}

#[test]
fn test_projection_canonicalises_references() {
    let record = CompanyRecord::new("Acme", "")
        .with_auxiliary("_id", json!({"$oid": "64b0c0ffee"}))
        .with_auxiliary("country", json!("DE"))
        .with_auxiliary("exhibitionId", json!(42))
        .with_auxiliary("registeredByEventPartner", json!(null))
        .with_auxiliary("buisnessCategory", json!(["a", "b"]))
        .with_auxiliary("bwebCategory", json!({"name": "tools"}))
        .with_auxiliary("employees", json!(120));

    let view = CompanyView::project(&record);

    assert_eq!(view.auxiliary["_id"], json!("64b0c0ffee"));
    assert_eq!(view.auxiliary["country"], json!("DE"));
    assert_eq!(view.auxiliary["exhibitionId"], json!("42"));
    assert_eq!(view.auxiliary["registeredByEventPartner"], json!(null));
    assert_eq!(view.auxiliary["buisnessCategory"], json!(r#"["a","b"]"#));
    assert_eq!(view.auxiliary["bwebCategory"], json!(r#"{"name":"tools"}"#));
    // not a reference field
    assert_eq!(view.auxiliary["employees"], json!(120));
}

#[test]
fn test_canonical_string_bool() {
    assert_eq!(canonical_string(&json!(true)), json!("true"));
    assert_eq!(
        canonical_string(&json!({"$oid": 7})),
        json!(r#"{"$oid":7}"#)
    );
}
