//! OpenAPI documentation.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the shared error envelope
//! ([`ErrorSchema`], [`ErrorCodeSchema`]) and the session cookie security
//! scheme. Swagger UI serves it in debug builds; `openapi-dump` prints it.

use crate::inbound::http::analysis::{
    AnalysisResponseBody, AnalysisSummaryBody, AnalyzeRequestBody, PdfReportBody,
};
use crate::inbound::http::business_types::BusinessTypeBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::LoginRequest;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "LocaAI site analysis API",
        description = "Geocoding, PostGIS buffer aggregation and survival prediction for restaurant sites.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::analysis::analyze_business,
        crate::inbound::http::analysis::get_result,
        crate::inbound::http::analysis::get_pdf_data,
        crate::inbound::http::analysis::list_analyses,
        crate::inbound::http::business_types::list_business_types,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AnalyzeRequestBody,
        AnalysisResponseBody,
        AnalysisSummaryBody,
        PdfReportBody,
        BusinessTypeBody,
        LoginRequest,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "analysis", description = "Site analysis and stored results"),
        (name = "users", description = "Session login and logout"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get(ERROR_SCHEMA_NAME).expect("Error schema"));

        assert!(fields.iter().any(|f| f == "code"));
        assert!(fields.iter().any(|f| f == "message"));
    }

    #[rstest]
    #[case("/analyze-business/")]
    #[case("/api/result/{id}/")]
    #[case("/pdf-data/{id}/")]
    #[case("/api/v1/analyses")]
    #[case("/api/v1/business-types")]
    #[case("/api/v1/login")]
    #[case("/api/v1/logout")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn analysis_response_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get("AnalysisResponseBody").expect("response schema"));

        assert!(fields.iter().any(|f| f == "survivalPercentage"));
        assert!(fields.iter().any(|f| f == "unavailableMetrics"));
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
