//! Route table and OpenAPI document of the REST API.

use api_shared::dto;
use api_shared::HealthRes;
use axum::routing::{get, post, put};
use axum::Router;
use shs_core::AppContext;
use tower_http::cors::CorsLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{self, accounts, catalogue, patients, session, visits};

/// Application state for the REST API server.
///
/// Every handler builds the core service it needs from the shared context.
#[derive(Clone)]
pub struct AppState {
    pub ctx: AppContext,
}

struct SessionTokenScheme;

impl Modify for SessionTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        session::login,
        session::me,
        session::logout,
        accounts::create_secretary,
        accounts::create_admin,
        accounts::list_accounts,
        accounts::get_account,
        accounts::update_account,
        accounts::delete_account,
        catalogue::create_blood_test,
        catalogue::list_blood_tests,
        catalogue::get_blood_test,
        catalogue::delete_blood_test,
        catalogue::create_virus,
        catalogue::list_viruses,
        catalogue::delete_virus,
        catalogue::create_medicine,
        catalogue::list_medicines,
        catalogue::get_medicine,
        catalogue::update_medicine,
        catalogue::delete_medicine,
        catalogue::create_diagnosis,
        catalogue::list_diagnoses,
        catalogue::delete_diagnosis,
        patients::create_patient,
        patients::list_recent_patients,
        patients::find_patients,
        patients::get_patient,
        patients::get_patient_summary,
        patients::delete_patient,
        patients::create_blood_test_result,
        patients::complete_blood_test_result,
        patients::create_joints_evaluation,
        patients::create_diagnosis_result,
        visits::create_visit,
        visits::list_visits,
        visits::last_visit,
        visits::use_medicine,
    ),
    components(schemas(
        HealthRes,
        dto::SuccessRes,
        dto::ErrorRes,
        dto::ErrorDetail,
        dto::LoginReq,
        dto::LoginRes,
        dto::AccountRes,
        dto::CreateAccountReq,
        dto::UpdateAccountReq,
        dto::BloodTestFieldReq,
        dto::BloodTestReq,
        dto::BloodTestFieldRes,
        dto::BloodTestRes,
        dto::VirusReq,
        dto::VirusRes,
        dto::MedicineReq,
        dto::MedicineRes,
        dto::DiagnosisReq,
        dto::DiagnosisRes,
        dto::AddressReq,
        dto::AddressRes,
        dto::FilledFieldReq,
        dto::FilledFieldRes,
        dto::BloodTestResultReq,
        dto::BloodTestResultRes,
        dto::CompleteBloodTestResultReq,
        dto::CreatePatientReq,
        dto::CreatePatientRes,
        dto::PatientSummaryRes,
        dto::PatientRes,
        dto::JointsEvaluationReq,
        dto::JointsEvaluationRes,
        dto::DiagnosisResultReq,
        dto::DiagnosisResultRes,
        dto::CreateVisitReq,
        dto::CreateVisitRes,
        dto::PrescribedMedicineRes,
        dto::VisitRes,
        dto::UsedMedicineRes,
    )),
    modifiers(&SessionTokenScheme)
)]
pub struct ApiDoc;

/// Builds the full router: `/health`, the `/v1` API and Swagger UI.
pub fn router(ctx: AppContext) -> Router {
    let v1 = Router::new()
        .route("/login", post(session::login))
        .route("/me", get(session::me))
        .route("/me/logout", post(session::logout))
        .route("/me/last-visit", get(visits::last_visit))
        .route("/me/medicines/:id/use", post(visits::use_medicine))
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/secretary", post(accounts::create_secretary))
        .route("/accounts/admin", post(accounts::create_admin))
        .route(
            "/accounts/:id",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route(
            "/blood-tests",
            get(catalogue::list_blood_tests).post(catalogue::create_blood_test),
        )
        .route(
            "/blood-tests/:id",
            get(catalogue::get_blood_test).delete(catalogue::delete_blood_test),
        )
        .route(
            "/viruses",
            get(catalogue::list_viruses).post(catalogue::create_virus),
        )
        .route("/viruses/:id", axum::routing::delete(catalogue::delete_virus))
        .route(
            "/medicines",
            get(catalogue::list_medicines).post(catalogue::create_medicine),
        )
        .route(
            "/medicines/:id",
            get(catalogue::get_medicine)
                .put(catalogue::update_medicine)
                .delete(catalogue::delete_medicine),
        )
        .route(
            "/diagnoses",
            get(catalogue::list_diagnoses).post(catalogue::create_diagnosis),
        )
        .route(
            "/diagnoses/:id",
            axum::routing::delete(catalogue::delete_diagnosis),
        )
        .route(
            "/patients",
            get(patients::list_recent_patients).post(patients::create_patient),
        )
        .route("/patients/search", get(patients::find_patients))
        .route(
            "/patients/:id",
            get(patients::get_patient).delete(patients::delete_patient),
        )
        .route("/patients/:id/summary", get(patients::get_patient_summary))
        .route(
            "/patients/:id/blood-tests",
            post(patients::create_blood_test_result),
        )
        .route(
            "/patients/:id/blood-tests/:result_id",
            put(patients::complete_blood_test_result),
        )
        .route(
            "/patients/:id/joints-evaluations",
            post(patients::create_joints_evaluation),
        )
        .route(
            "/patients/:id/diagnoses",
            post(patients::create_diagnosis_result),
        )
        .route(
            "/patients/:id/visits",
            get(visits::list_visits).post(visits::create_visit),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/v1", v1)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(AppState { ctx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use shs_core::{AuthService, CoreConfig, MemorySessionCache, MemoryStore, Pbkdf2Hasher};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let ctx = AppContext::new(
            Arc::new(CoreConfig::default()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemorySessionCache::new()),
            Arc::new(Pbkdf2Hasher::new(1_000)),
        );
        AuthService::new(ctx.clone())
            .seed_super_admin("root", "toor")
            .unwrap();
        router(ctx)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(app: &Router, username: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/v1/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_owned()
    }

    async fn secretary_token(app: &Router, root: &str) -> String {
        let (status, _) = send(
            app,
            "POST",
            "/v1/accounts/secretary",
            Some(root),
            Some(json!({ "display_name": "Rana", "username": "rana", "password": "s3cret" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        login(app, "rana", "s3cret").await
    }

    fn patient_body(national_id: &str) -> Value {
        json!({
            "national_id": national_id,
            "nationality": "Syrian",
            "first_name": "Sami",
            "last_name": "Haddad",
            "father_name": "Khaled",
            "mother_name": "Mona",
            "place_of_birth": { "governorate": "Aleppo", "suburb": "Aziziyeh" },
            "residency": { "governorate": "Damascus", "suburb": "Mezzeh", "street": "Autostrad" },
            "date_of_birth": "2012-04-09",
            "gender": "male",
            "phone_number": "+963 944 123 456",
            "bat_score": 3,
            "family_history_exists": true,
            "first_visit_reason": "family_history",
        })
    }

    #[tokio::test]
    async fn health_needs_no_session() {
        let app = test_app();
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn missing_or_unknown_tokens_are_rejected() {
        let app = test_app();

        let (status, body) = send(&app, "GET", "/v1/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["id"], "authentication-required");

        let (status, body) = send(&app, "GET", "/v1/me", Some("deadbeef"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["id"], "invalid-session-token");
    }

    #[tokio::test]
    async fn login_me_and_logout() {
        let app = test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/v1/login",
            None,
            Some(json!({ "username": "root", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["id"], "invalid-login-credentials");

        let token = login(&app, "root", "toor").await;
        let (status, body) = send(&app, "GET", "/v1/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["account_type"], "super_admin");
        assert!(body.get("password_hash").is_none());

        let (status, _) = send(&app, "POST", "/v1/me/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", "/v1/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn secretary_cannot_manage_accounts() {
        let app = test_app();
        let root = login(&app, "root", "toor").await;
        let secretary = secretary_token(&app, &root).await;

        let (status, body) = send(&app, "GET", "/v1/accounts", Some(&secretary), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["id"], "permission-denied");
    }

    #[tokio::test]
    async fn composite_permission_values_are_bad_requests() {
        let app = test_app();
        let root = login(&app, "root", "toor").await;

        let (status, body) = send(
            &app,
            "POST",
            "/v1/accounts/secretary",
            Some(&root),
            Some(json!({
                "display_name": "Rana",
                "username": "rana",
                "password": "s3cret",
                "permissions": [3],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["id"], "validation-failed");
    }

    #[tokio::test]
    async fn malformed_public_ids_name_no_patient() {
        let app = test_app();
        let root = login(&app, "root", "toor").await;

        let (status, body) = send(&app, "GET", "/v1/patients/not-an-id", Some(&root), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["id"], "patient-not-found");
    }

    #[tokio::test]
    async fn visit_flow_from_registration_to_consumption() {
        let app = test_app();
        let root = login(&app, "root", "toor").await;
        let secretary = secretary_token(&app, &root).await;

        let (status, medicine) = send(
            &app,
            "POST",
            "/v1/medicines",
            Some(&secretary),
            Some(json!({ "name": "Factor VIII", "dose": 250.0, "unit": "IU", "amount": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let medicine_id = medicine["id"].as_u64().unwrap();

        let (status, created) = send(
            &app,
            "POST",
            "/v1/patients",
            Some(&secretary),
            Some(patient_body("0101")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let public_id = created["public_id"].as_str().unwrap().to_owned();

        let (status, visit) = send(
            &app,
            "POST",
            &format!("/v1/patients/{public_id}/visits"),
            Some(&secretary),
            Some(json!({ "reason": "prophylaxis", "medicine_ids": [medicine_id, 999, medicine_id] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(visit["prescribed_medicine_ids"].as_array().unwrap().len(), 1);
        assert_eq!(visit["dropped_medicine_ids"], json!([999]));

        let (_, stock) = send(
            &app,
            "GET",
            &format!("/v1/medicines/{medicine_id}"),
            Some(&secretary),
            None,
        )
        .await;
        assert_eq!(stock["amount"], 2);

        let patient = login(&app, &public_id, "0101").await;
        let (status, last) = send(&app, "GET", "/v1/me/last-visit", Some(&patient), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(last["reason"], "prophylaxis");
        let line = last["medicines"][0]["id"].as_u64().unwrap();

        let uri = format!("/v1/me/medicines/{line}/use");
        let (status, used) = send(&app, "POST", &uri, Some(&patient), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(used["used_at"].is_string());
        let (status, _) = send(&app, "POST", &uri, Some(&patient), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/v1/accounts", Some(&patient), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn insufficient_stock_is_unprocessable() {
        let app = test_app();
        let root = login(&app, "root", "toor").await;

        let (_, medicine) = send(
            &app,
            "POST",
            "/v1/medicines",
            Some(&root),
            Some(json!({ "name": "Factor IX", "dose": 500.0, "unit": "IU", "amount": 0 })),
        )
        .await;
        let medicine_id = medicine["id"].as_u64().unwrap();
        let (_, created) = send(&app, "POST", "/v1/patients", Some(&root), Some(patient_body("0202"))).await;
        let public_id = created["public_id"].as_str().unwrap().to_owned();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/v1/patients/{public_id}/visits"),
            Some(&root),
            Some(json!({ "reason": "surgery", "medicine_ids": [medicine_id] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["id"], "insufficient-medicine-amount");
        assert_eq!(body["error"]["extra"]["left_packages"], 0);
        assert_eq!(body["error"]["extra"]["exceeding_amount"], 1);
    }

    #[tokio::test]
    async fn full_record_includes_joints_and_diagnoses() {
        let app = test_app();
        let root = login(&app, "root", "toor").await;

        let (_, diagnosis) = send(
            &app,
            "POST",
            "/v1/diagnoses",
            Some(&root),
            Some(json!({ "group_name": "Hemophilia", "title": "Hemophilia A, severe" })),
        )
        .await;
        let (_, created) = send(&app, "POST", "/v1/patients", Some(&root), Some(patient_body("0303"))).await;
        let public_id = created["public_id"].as_str().unwrap().to_owned();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/v1/patients/{public_id}/joints-evaluations"),
            Some(&root),
            Some(json!({ "right_knee": 4, "left_ankle": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(
            &app,
            "POST",
            &format!("/v1/patients/{public_id}/diagnoses"),
            Some(&root),
            Some(json!({ "diagnosis_id": diagnosis["id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, record) =
            send(&app, "GET", &format!("/v1/patients/{public_id}"), Some(&root), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["patient"]["residency"]["governorate"], "Damascus");
        assert_eq!(record["joints_evaluations"][0]["total"], 6);
        assert_eq!(record["diagnosis_results"][0]["title"], "Hemophilia A, severe");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = test_app();
        let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"].get("/v1/patients/{id}/visits").is_some());
    }
}
