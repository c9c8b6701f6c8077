//! Business type lookup.
//!
//! ```text
//! GET /api/v1/business-types
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::BusinessType;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// One restaurant category.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessTypeBody {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "커피전문점")]
    pub name: String,
}

impl From<BusinessType> for BusinessTypeBody {
    fn from(value: BusinessType) -> Self {
        Self {
            id: value.id().get(),
            name: value.name().to_owned(),
        }
    }
}

/// Every business category, ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/business-types",
    responses(
        (status = 200, description = "Business types", body = [BusinessTypeBody]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["analysis"],
    operation_id = "listBusinessTypes",
    security([])
)]
#[get("/business-types")]
pub async fn list_business_types(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<BusinessTypeBody>>> {
    let types = state.analyses.business_types().await?;
    Ok(web::Json(types.into_iter().map(BusinessTypeBody::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAnalysisQuery, MockSiteAnalysisCommand};
    use crate::domain::{BusinessTypeId, Error};
    use crate::inbound::http::test_utils::state_with_analysis;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    fn business_type(id: i64, name: &str) -> BusinessType {
        BusinessType::new(BusinessTypeId::new(id).expect("valid id"), name).expect("valid name")
    }

    #[actix_web::test]
    async fn lists_types_as_camel_case_json() {
        let mut analyses = MockAnalysisQuery::new();
        analyses
            .expect_business_types()
            .times(1)
            .return_once(|| Ok(vec![business_type(1, "한식"), business_type(7, "커피전문점")]));
        let state = state_with_analysis(MockSiteAnalysisCommand::new(), analyses);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(list_business_types)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/business-types")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!([{"id": 1, "name": "한식"}, {"id": 7, "name": "커피전문점"}])
        );
    }

    #[actix_web::test]
    async fn store_outage_is_service_unavailable() {
        let mut analyses = MockAnalysisQuery::new();
        analyses
            .expect_business_types()
            .return_once(|| Err(Error::service_unavailable("업종 정보를 불러올 수 없습니다.")));
        let state = state_with_analysis(MockSiteAnalysisCommand::new(), analyses);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(list_business_types)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/business-types")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
