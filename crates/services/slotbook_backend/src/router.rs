// --- File: crates/services/slotbook_backend/src/router.rs ---
use crate::app_state::AppState;
use axum::{routing::get, Router};
use http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Builds the full application: every API router under `/api`, plus CORS and tracing.
pub fn build_router(state: &AppState) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Slotbook API!" }))
        .merge(slotbook_booking::routes::routes(state.workflow.clone()))
        .merge(slotbook_admin::routes::routes(
            state.sessions.clone(),
            state.workflow.clone(),
            state.config.schedule.clone(),
        ));

    #[allow(unused_mut)] // only mutated with the stripe feature
    let mut api_router = api_router;
    #[cfg(feature = "stripe")]
    {
        if let Some(secret) = state.webhook_secret.clone() {
            api_router = api_router.merge(slotbook_stripe::routes::routes(
                state.workflow.clone(),
                secret,
            ));
        }
    }

    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Slotbook API",
                version = "0.1.0",
                description = "Appointment slots, reservations and administration",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(slotbook_booking::doc::BookingApiDoc::openapi());
        openapi_doc.merge(slotbook_admin::doc::AdminApiDoc::openapi());
        #[cfg(feature = "stripe")]
        openapi_doc.merge(slotbook_stripe::doc::StripeApiDoc::openapi());

        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    let mut app = app.layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(&state.config.server.allowed_origins) {
        app = app.layer(cors);
    }
    app
}

/// CORS for the configured origins; `None` keeps the API same-origin only.
fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}
