//! End-to-end HTTP flow over the real services with in-memory adapters.
//!
//! Login, analyse, read back, format for PDF and page through history, all
//! through the production handlers and middleware.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use locaai::Trace;
use locaai::domain::ports::{
    FixtureBusinessTypeRepository, FixtureCoordinateProjector, FixtureGeocoder,
    FixtureLoginService, FixtureSpatialDataSource,
};
use locaai::domain::{
    AnalysisQueryService, ContractPolicy, FeatureContract, LayerCatalogue, LockRetryPolicy,
    SiteAnalysisPorts, SiteAnalysisService, SpatialAggregator, SurvivalPredictor,
    TRACE_ID_HEADER,
};
use locaai::inbound::http::analysis::{
    analyze_business, get_pdf_data, get_result, list_analyses,
};
use locaai::inbound::http::business_types::list_business_types;
use locaai::inbound::http::state::HttpState;
use locaai::inbound::http::users::{login, logout};
use locaai::test_support::{
    FixedClock, FixedSurvivalModel, ImmediateSleeper, InMemoryAnalysisRepository,
};

struct Harness {
    state: web::Data<HttpState>,
    repository: Arc<InMemoryAnalysisRepository>,
    key: Key,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryAnalysisRepository::default());
    let business_types = Arc::new(FixtureBusinessTypeRepository);
    let aggregator = Arc::new(SpatialAggregator::with_sleeper(
        Arc::new(FixtureSpatialDataSource),
        Arc::new(LayerCatalogue::preferred()),
        LockRetryPolicy::default(),
        Arc::new(ImmediateSleeper),
    ));
    let analysis = SiteAnalysisService::new(
        SiteAnalysisPorts {
            geocoder: Arc::new(FixtureGeocoder),
            projector: Arc::new(FixtureCoordinateProjector),
            business_types: business_types.clone(),
            repository: repository.clone(),
        },
        aggregator,
        SurvivalPredictor::new(
            Arc::new(FixedSurvivalModel::new(0.7351, FeatureContract::Full)),
            ContractPolicy::Auto,
        ),
        Arc::new(FixedClock::march_first()),
    );
    let analyses = AnalysisQueryService::new(repository.clone(), business_types);
    let state = web::Data::new(HttpState::new(
        Arc::new(FixtureLoginService),
        Arc::new(analysis),
        Arc::new(analyses),
    ));
    Harness {
        state,
        repository,
        key: Key::generate(),
    }
}

fn app(
    harness: &Harness,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), harness.key.clone())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(harness.state.clone())
        .wrap(session)
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(logout)
                .service(list_analyses)
                .service(list_business_types),
        )
        .service(analyze_business)
        .service(get_result)
        .service(get_pdf_data)
}

fn session_cookie(response: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

fn analyze_body(address: &str) -> Value {
    json!({
        "address": address,
        "area": 50.0,
        "businessTypeId": 7,
        "serviceType": 1
    })
}

#[rstest]
#[actix_web::test]
async fn signed_in_user_analyses_and_reads_back(harness: Harness) {
    let app = test::init_service(app(&harness)).await;

    let login_response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": "admin", "password": "password"}))
            .to_request(),
    )
    .await;
    assert_eq!(login_response.status(), StatusCode::OK);
    let cookie = session_cookie(&login_response);

    let analyzed = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/analyze-business/")
            .cookie(cookie.clone())
            .set_json(analyze_body("서울특별시 중구 세종대로 110"))
            .to_request(),
    )
    .await;
    assert_eq!(analyzed.status(), StatusCode::OK);
    let analysis: Value = test::read_body_json(analyzed).await;
    let id = analysis["requestId"].as_str().expect("id").to_owned();
    assert_eq!(analysis["survivalPercentage"], json!(73.5));
    assert_eq!(analysis["featureContract"], json!("full"));
    assert_eq!(analysis["longitude"], json!(126.9784));
    assert_eq!(analysis["unavailableMetrics"], json!([]));
    assert_eq!(harness.repository.len(), 1);

    let stored = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/result/{id}/"))
            .to_request(),
    )
    .await;
    assert_eq!(stored.status(), StatusCode::OK);
    let stored: Value = test::read_body_json(stored).await;
    assert_eq!(stored["requestId"], json!(id));
    assert_eq!(stored["createdAt"], analysis["createdAt"]);

    let pdf = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/pdf-data/{id}/"))
            .to_request(),
    )
    .await;
    assert_eq!(pdf.status(), StatusCode::OK);
    let pdf: Value = test::read_body_json(pdf).await;
    assert_eq!(pdf["businessTypeName"], json!("커피전문점"));
    assert_eq!(pdf["createdAt"], json!("2026-03-02 00:30"));
    assert_eq!(pdf["survivalPercentage"], json!("73.5%"));

    let history = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/analyses")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(history.status(), StatusCode::OK);
    let history: Value = test::read_body_json(history).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["id"], json!(id));
}

#[rstest]
#[actix_web::test]
async fn anonymous_analyses_stay_out_of_history(harness: Harness) {
    let app = test::init_service(app(&harness)).await;

    let analyzed = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/analyze-business/")
            .set_json(analyze_body("부산광역시 해운대구 우동 1394"))
            .to_request(),
    )
    .await;
    assert_eq!(analyzed.status(), StatusCode::OK);

    let login_response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": "admin", "password": "password"}))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&login_response);

    let history = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/analyses")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let history: Value = test::read_body_json(history).await;
    assert_eq!(history, json!([]));
    assert_eq!(harness.repository.len(), 1);
}

#[rstest]
#[actix_web::test]
async fn unknown_business_type_is_rejected_with_trace_id(harness: Harness) {
    let app = test::init_service(app(&harness)).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/analyze-business/")
            .set_json(json!({
                "address": "서울특별시 중구 세종대로 110",
                "area": 50.0,
                "businessTypeId": 99,
                "serviceType": 0
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["traceId"], json!(header));
    assert_eq!(body["details"]["field"], json!("businessTypeId"));
    assert!(harness.repository.is_empty());
}

#[rstest]
#[actix_web::test]
async fn business_types_and_missing_results(harness: Harness) {
    let app = test::init_service(app(&harness)).await;

    let types = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/business-types")
            .to_request(),
    )
    .await;
    assert_eq!(types.status(), StatusCode::OK);
    let types: Value = test::read_body_json(types).await;
    assert_eq!(types[2], json!({"id": 7, "name": "커피전문점"}));

    let missing = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/result/00000000-0000-0000-0000-000000000000/")
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
