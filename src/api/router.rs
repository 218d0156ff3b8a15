//! HTTP router.
//!
//! Every route is mounted under the configured API prefix. Tokens travel as
//! the last path segment. Layers (outermost → innermost):
//! CORS → `Cache-Control: no-store` → access log (per matched route).

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints::{admin, appointments, doctors, health, patients, prescriptions};
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the clinic API router mounted at `api_path` (`/` or `/prefix/`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7). Params at
/// the same depth under a shared prefix must share a name.
pub fn clinic_router(ctx: ApiContext, api_path: &str) -> Router {
    let routes = Router::new()
        .route("/health", get(health::check))
        .route("/admin/login", post(admin::login))
        .route("/patient", post(patients::signup))
        .route("/patient/login", post(patients::login))
        .route("/patient/filter/:condition/:name/:token", get(patients::filter))
        .route("/patient/:key", get(patients::details))
        .route("/patient/:key/:user/:token", get(patients::appointments))
        .route("/doctor", get(doctors::list))
        .route("/doctor/login", post(doctors::login))
        .route(
            "/doctor/availability/:user/:doctor_id/:date/:token",
            get(doctors::availability),
        )
        .route("/doctor/filter/:name/:time/:speciality", get(doctors::filter))
        .route("/doctor/:key", post(doctors::create).put(doctors::update))
        .route("/doctor/:key/:token", delete(doctors::delete))
        .route(
            "/appointments/:key",
            post(appointments::book).put(appointments::update),
        )
        .route("/appointments/:key/:arg", delete(appointments::cancel))
        .route("/appointments/:key/:arg/:token", get(appointments::doctor_day))
        .route("/prescription/:key", post(prescriptions::save))
        .route("/prescription/:key/:token", get(prescriptions::for_appointment))
        .route_layer(axum::middleware::from_fn(middleware::audit::log_access))
        .with_state(ctx);

    let prefix = api_path.trim_end_matches('/');
    let app = if prefix.is_empty() {
        Router::new().merge(routes)
    } else {
        Router::new().nest(prefix, routes)
    };

    app.layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    ))
    .layer(CorsLayer::permissive())
}
