//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error};
use std::sync::Arc;

use crate::domain::ports::{
    FixtureLoginService, LoginService, MockAnalysisQuery, MockSiteAnalysisCommand,
};
use crate::inbound::http::state::HttpState;

/// Session middleware with a fresh key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Empty app wrapped in [`test_session_middleware`].
pub fn session_test_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = Error,
        InitError = (),
    >,
> {
    App::new().wrap(test_session_middleware())
}

/// The `session` cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// State whose analysis ports are strict mocks with no expectations.
pub fn state_with_login(login: Arc<dyn LoginService>) -> HttpState {
    HttpState::new(
        login,
        Arc::new(MockSiteAnalysisCommand::new()),
        Arc::new(MockAnalysisQuery::new()),
    )
}

/// State with the fixture login service and the given analysis ports.
pub fn state_with_analysis(
    analysis: MockSiteAnalysisCommand,
    analyses: MockAnalysisQuery,
) -> HttpState {
    HttpState::new(
        Arc::new(FixtureLoginService),
        Arc::new(analysis),
        Arc::new(analyses),
    )
}
