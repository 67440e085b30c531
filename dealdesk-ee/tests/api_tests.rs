//! Integration tests for dealdesk-ee API endpoints
//!
//! Routers are exercised with `tower::ServiceExt::oneshot` over an
//! in-memory database and stub research providers, so the full
//! request-to-persistence path runs without the network.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

use dealdesk_common::criteria::FundType;
use dealdesk_common::db::models::{Deal, Fund};
use dealdesk_common::events::EventBus;
use dealdesk_ee::services::providers::{
    ProviderError, ProviderSet, ResearchOutput, ResearchProvider,
};
use dealdesk_ee::{build_router, AppState};

/// Research stub; optionally fails on prompts containing a marker
struct StubResearch {
    fail_on: Option<&'static str>,
}

#[async_trait]
impl ResearchProvider for StubResearch {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn research(&self, prompt: &str) -> Result<ResearchOutput, ProviderError> {
        if let Some(marker) = self.fail_on {
            if prompt.contains(marker) {
                return Err(ProviderError::Api(503, "upstream unavailable".to_string()));
            }
        }
        Ok(ResearchOutput {
            text: "The company targets a $12 billion TAM, growing at 22% CAGR. \
                   It competes with Stripe, Adyen. The founders previously built a payments startup."
                .to_string(),
            citations: vec!["https://example.com/report".to_string()],
            prompt_tokens: 100,
            completion_tokens: 200,
        })
    }
}

async fn setup_app(fail_on: Option<&'static str>) -> (axum::Router, SqlitePool, Deal, Fund) {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    dealdesk_common::db::init_tables(&pool).await.unwrap();

    let providers = ProviderSet {
        research: Arc::new(StubResearch { fail_on }),
        synthesis: Arc::new(StubResearch { fail_on: None }),
        search: None,
    };

    let fund = Fund {
        id: Uuid::new_v4(),
        name: "Meridian Ventures I".to_string(),
        fund_type: FundType::Vc,
        focus_industries: vec!["Financial Services".to_string()],
        created_at: chrono::Utc::now(),
    };
    let deal = Deal {
        id: Uuid::new_v4(),
        fund_id: fund.id,
        name: "Acme Payments".to_string(),
        industry: "fintech".to_string(),
        stage: "Series A".to_string(),
        geography: "US".to_string(),
        description: Some("Embedded payments for SMBs".to_string()),
        website: None,
        financials: None,
        created_at: chrono::Utc::now(),
    };
    dealdesk_ee::db::deals::insert_fund(&pool, &fund).await.unwrap();
    dealdesk_ee::db::deals::insert_deal(&pool, &deal).await.unwrap();

    let state = AppState::new(pool.clone(), EventBus::new(64), providers);
    (build_router(state), pool, deal, fund)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_module_and_uptime() {
    let (app, _pool, _deal, _fund) = setup_app(None).await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["module"], "dealdesk-ee");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn criteria_defaults_return_validated_blueprint() {
    let (app, _pool, _deal, _fund) = setup_app(None).await;
    let response = app.oneshot(get("/criteria/defaults/vc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["template"]["fund_type"], "vc");
    assert_eq!(body["template"]["categories"].as_array().unwrap().len(), 5);
    assert!(!body["target_parameters"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_fund_type_is_bad_request() {
    let (app, _pool, _deal, _fund) = setup_app(None).await;
    let response = app.oneshot(get("/criteria/defaults/hedge")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_failures_are_values_not_errors() {
    let (app, _pool, _deal, _fund) = setup_app(None).await;

    let mut template = dealdesk_common::criteria::default_template(FundType::Vc);
    template.categories[0].weight = 90.0; // category sum now 165

    let response = app
        .oneshot(json_request("POST", "/criteria/validate", json!({ "template": template })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "invalid weights still 200");

    let body = body_json(response).await;
    assert_eq!(body["is_valid"], false);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors[0].as_str().unwrap().contains("165.0"));
}

#[tokio::test]
async fn criteria_save_rejects_invalid_weights_without_saving() {
    let (app, pool, _deal, fund) = setup_app(None).await;

    let mut template = dealdesk_common::criteria::default_template(FundType::Vc);
    template.categories[0].weight = 90.0;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/funds/{}/criteria", fund.id),
            json!({ "template": template }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["saved"], false);
    assert!(dealdesk_ee::db::strategies::load_strategy(&pool, fund.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn criteria_save_and_reload_round_trip() {
    let (app, _pool, _deal, fund) = setup_app(None).await;

    let mut template = dealdesk_common::criteria::default_template(FundType::Vc);
    template.categories[0].weight = 30.0;
    template.categories[1].weight = 20.0;

    let save = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/funds/{}/criteria", fund.id),
            json!({ "template": template }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(save).await["saved"], true);

    let reload = app.oneshot(get(&format!("/funds/{}/criteria", fund.id))).await.unwrap();
    let body = body_json(reload).await;
    assert_eq!(body["template"]["categories"][0]["weight"], 30.0);
}

#[tokio::test]
async fn enrich_returns_success_with_all_pack_results() {
    let (app, pool, deal, fund) = setup_app(None).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/enrich",
            json!({ "deal_id": deal.id, "fund_id": fund.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["results"].as_array().unwrap().len(), 5);

    let stored = dealdesk_ee::db::enrichment::load_results(&pool, deal.id).await.unwrap();
    assert_eq!(stored.len(), 5);
}

#[tokio::test]
async fn enrich_degrades_failing_pack_but_still_succeeds() {
    let (app, _pool, deal, fund) = setup_app(Some("Market Opportunity")).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/enrich",
            json!({ "deal_id": deal.id, "fund_id": fund.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "degraded pack never fails the request");

    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let results = body["results"].as_array().unwrap();
    let market = results
        .iter()
        .find(|r| r["pack_name"] == "vc_market_opportunity")
        .unwrap();
    assert!(market["confidence"].as_f64().unwrap() <= 25.0);
    assert_eq!(market["sources"][0], "error-fallback");

    let healthy = results
        .iter()
        .filter(|r| r["sources"][0] != "error-fallback" && r["sources"][0] != "fallback")
        .count();
    assert_eq!(healthy, 4);
}

#[tokio::test]
async fn enrich_unknown_deal_is_not_found() {
    let (app, _pool, _deal, fund) = setup_app(None).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/enrich",
            json!({ "deal_id": Uuid::new_v4(), "fund_id": fund.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn enrich_respects_ops_control_switch() {
    let (app, pool, deal, fund) = setup_app(None).await;
    dealdesk_ee::db::switches::set_switch(&pool, "enrichment_enabled", false).await.unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/enrich",
            json!({ "deal_id": deal.id, "fund_id": fund.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn analyze_then_fetch_analysis_and_memo() {
    let (app, _pool, deal, _fund) = setup_app(None).await;

    let analyze = app
        .clone()
        .oneshot(json_request("POST", &format!("/deals/{}/analyze", deal.id), json!({})))
        .await
        .unwrap();
    assert_eq!(analyze.status(), StatusCode::OK);
    let analysis = body_json(analyze).await;
    assert_eq!(analysis["resolved_industry"], "Financial Services");
    assert_eq!(analysis["category_scores"].as_array().unwrap().len(), 5);

    let fetched = app
        .clone()
        .oneshot(get(&format!("/deals/{}/analysis", deal.id)))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);

    let memo = app.oneshot(get(&format!("/deals/{}/memo", deal.id))).await.unwrap();
    assert_eq!(memo.status(), StatusCode::OK);
    let memo = body_json(memo).await;
    assert!(memo["summary"].as_str().unwrap().contains("Acme Payments"));
    assert!(memo["alignment"].as_str().unwrap().contains("Financial Services"));
}

#[tokio::test]
async fn analysis_for_unknown_deal_is_not_found() {
    let (app, _pool, _deal, _fund) = setup_app(None).await;
    let response = app
        .oneshot(get(&format!("/deals/{}/analysis", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn switches_list_and_flip() {
    let (app, _pool, _deal, _fund) = setup_app(None).await;

    let set = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/switches",
            json!({ "name": "enrichment_enabled", "enabled": false }),
        ))
        .await
        .unwrap();
    assert_eq!(set.status(), StatusCode::OK);

    let list = app.oneshot(get("/switches")).await.unwrap();
    let body = body_json(list).await;
    assert_eq!(body[0]["name"], "enrichment_enabled");
    assert_eq!(body[0]["enabled"], false);
}
