//! HTTP Handler Tests
//!
//! Exercises the handlers against state wired by `build_state`, checking
//! response payloads and the status codes errors map to.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use greencert_core::{CertifierKeyPair, NewCertificate, Norm, SustainabilityCriteria};
use greencert_plane::api::handlers::{self, IssueCertificateRequest};
use greencert_plane::{build_state, AppState, MemoryLedger, MemoryStore, PlaneConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

// =============================================================================
// Test Helpers
// =============================================================================

async fn test_state() -> Arc<AppState> {
    let state = build_state(
        PlaneConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryLedger::new()),
    )
    .await
    .expect("state should build");
    Arc::new(state)
}

async fn register_entity(state: &Arc<AppState>, collection: &str, record: Value) -> Uuid {
    let (status, Json(response)) = handlers::register_entity(
        State(state.clone()),
        Path(collection.to_string()),
        Json(record),
    )
    .await
    .expect("entity registration");
    assert_eq!(status, StatusCode::CREATED);
    response.id
}

async fn seed_certificate(state: &Arc<AppState>) -> NewCertificate {
    let product_id = register_entity(
        state,
        "products",
        json!({
            "name": "Acai pulp",
            "category": "fruit",
            "quantity": {"value": 120, "unit": "kg"},
            "origin": {"country": "BR", "coordinates": {"latitude": -1.45, "longitude": -48.5}}
        }),
    )
    .await;
    let producer_id = register_entity(
        state,
        "producers",
        json!({
            "name": "Ilha das Oncas",
            "document": {"document_type": "CPF", "number": "123.456.789-00"},
            "car_code": "PA-1500800-YYYY",
            "address": {
                "country": "BR",
                "state": "PA",
                "city": "Belem",
                "coordinates": {"latitude": -1.45, "longitude": -48.5}
            }
        }),
    )
    .await;
    let certifier_id = register_entity(
        state,
        "certifiers",
        json!({
            "name": "Certifica Norte",
            "document": {"document_type": "CNPJ", "number": "99.888.777/0001-66"}
        }),
    )
    .await;

    NewCertificate {
        version: "2.1".into(),
        product_id,
        producer_id,
        certifier_id,
        norms_complied: vec![Norm::Iso14001],
        sustainability_criteria: vec![SustainabilityCriteria::Organic],
        notes: None,
    }
}

async fn issued_certificate(state: &Arc<AppState>, keys: &CertifierKeyPair) -> Value {
    let input = seed_certificate(state).await;
    let (_, Json(view)) = handlers::register_certificate(State(state.clone()), Json(input))
        .await
        .unwrap();
    let signature = keys.sign_digest(&view.pre_issued_hash.unwrap()).unwrap();

    let Json(issued) = handlers::issue_certificate(
        State(state.clone()),
        Path(view.record.id.to_string()),
        Json(IssueCertificateRequest {
            certifier_signature: signature,
            certifier_address: keys.address().to_string().to_uppercase(),
        }),
    )
    .await
    .expect("issuance should succeed");
    serde_json::to_value(issued).unwrap()
}

// =============================================================================
// Lifecycle endpoints
// =============================================================================

#[tokio::test]
async fn test_health() {
    let Json(health) = greencert_plane::api::health().await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_register_and_list() {
    let state = test_state().await;
    let input = seed_certificate(&state).await;

    let (status, Json(view)) = handlers::register_certificate(State(state.clone()), Json(input))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let body = serde_json::to_value(&view).unwrap();
    assert_eq!(body["is_pre_issued"], json!(true));
    assert_eq!(body["norms_complied"], json!(["ISO 14001"]));
    assert!(body["pre_issued_hash"].is_string());
    assert!(body["canonical_hash"].is_null());

    let Json(pending) = handlers::list_pre_certificates(State(state.clone()))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let Json(ready) = greencert_plane::api::ready(State(state)).await;
    assert!(ready.ready);
    assert_eq!(ready.pre_issued_count, 1);
}

#[tokio::test]
async fn test_issue_flow_and_verify() {
    let state = test_state().await;
    let keys = CertifierKeyPair::generate();
    let issued = issued_certificate(&state, &keys).await;

    assert_eq!(issued["is_pre_issued"], json!(false));
    assert!(issued.get("pre_issued_hash").is_none());
    assert_eq!(
        issued["authenticity_proof"]["certifier_address"],
        json!(keys.address().to_string())
    );

    let hash = issued["canonical_hash"].as_str().unwrap().to_string();
    let Json(verification) =
        handlers::verify_hash(State(state.clone()), Path(format!("0x{}", hash.to_uppercase())))
            .await
            .unwrap();
    assert!(verification.is_valid);

    let id = issued["id"].as_str().unwrap().to_string();
    handlers::revoke_certificate(State(state.clone()), Path(id))
        .await
        .unwrap();
    let Json(verification) = handlers::verify_hash(State(state), Path(hash))
        .await
        .unwrap();
    assert!(!verification.is_valid);
    assert!(verification.certificate.is_some());
}

#[tokio::test]
async fn test_verify_unknown_hash_is_not_valid() {
    let state = test_state().await;
    let Json(verification) = handlers::verify_hash(State(state), Path("ab".repeat(32)))
        .await
        .expect("unknown hash is an answer, not an error");
    assert!(!verification.is_valid);
    assert!(verification.certificate.is_none());

    let body = serde_json::to_value(&verification).unwrap();
    assert_eq!(body, json!({"certificate": null, "is_valid": false}));
}

#[tokio::test]
async fn test_qr_artifact_served() {
    let state = test_state().await;
    let keys = CertifierKeyPair::generate();
    let issued = issued_certificate(&state, &keys).await;

    let url = issued["authenticity_proof"]["qr_code_url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8080/v1/qr/"));
    let key = url.rsplit('/').next().unwrap().to_string();

    let response = handlers::get_qr(State(state), Path(key)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["canonical_hash"], issued["canonical_hash"]);
    assert_eq!(payload["certificate_id"], issued["id"]);
}

#[tokio::test]
async fn test_pdf_attach_and_verify() {
    let state = test_state().await;
    let keys = CertifierKeyPair::generate();
    let issued = issued_certificate(&state, &keys).await;
    let id = issued["id"].as_str().unwrap().to_string();
    let pdf = Bytes::from_static(b"%PDF-1.4 certificate");

    let Json(view) = handlers::attach_pdf(State(state.clone()), Path(id.clone()), pdf.clone())
        .await
        .unwrap();
    assert!(view.record.authenticity_proof.unwrap().pdf_hash().is_some());

    let err = handlers::attach_pdf(State(state.clone()), Path(id.clone()), pdf.clone())
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let Json(found) = handlers::verify_pdf(State(state.clone()), pdf).await.unwrap();
    assert_eq!(found.record.id.to_string(), id);

    let err = handlers::verify_pdf(State(state), Bytes::new()).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn test_unknown_certificate_is_404() {
    let state = test_state().await;
    let err = handlers::get_certificate(State(state), Path(Uuid::new_v4().to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let state = test_state().await;
    let err = handlers::audit_certificate(State(state), Path("not-a-uuid".into()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_signature_is_401() {
    let state = test_state().await;
    let input = seed_certificate(&state).await;
    let (_, Json(view)) = handlers::register_certificate(State(state.clone()), Json(input))
        .await
        .unwrap();

    let keys = CertifierKeyPair::generate();
    let err = handlers::issue_certificate(
        State(state),
        Path(view.record.id.to_string()),
        Json(IssueCertificateRequest {
            certifier_signature: "0xdeadbeef".into(),
            certifier_address: keys.address().to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_second_issue_is_409() {
    let state = test_state().await;
    let keys = CertifierKeyPair::generate();
    let issued = issued_certificate(&state, &keys).await;

    let err = handlers::issue_certificate(
        State(state),
        Path(issued["id"].as_str().unwrap().to_string()),
        Json(IssueCertificateRequest {
            certifier_signature: "0x00".into(),
            certifier_address: keys.address().to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let response = err.into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_invalid_directory_record_is_422() {
    let state = test_state().await;
    let err = handlers::register_entity(
        State(state.clone()),
        Path("products".into()),
        Json(json!({"name": "missing everything else"})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let err = handlers::register_entity(State(state), Path("farms".into()), Json(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_reference_on_register_is_404() {
    let state = test_state().await;
    let mut input = seed_certificate(&state).await;
    input.certifier_id = Uuid::new_v4();

    let err = handlers::register_certificate(State(state), Json(input))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}
