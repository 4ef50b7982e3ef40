use crate::{controller::health_check_controller, params, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::controller::{
    deliverable_controller, recording_controller, zoom_connection_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Momentum API"
        ),
        paths(
            health_check_controller::health_check,
            zoom_connection_controller::authorize,
            zoom_connection_controller::callback,
            zoom_connection_controller::status,
            zoom_connection_controller::disconnect,
            recording_controller::index,
            recording_controller::process,
            deliverable_controller::generate,
            deliverable_controller::index,
            deliverable_controller::read,
        ),
        components(
            schemas(
                domain::zoom_connection::ConnectionStatus,
                domain::recording::RecordingListing,
                domain::recording::RecordingDescriptor,
                domain::recording::RecordingFileDescriptor,
                domain::pipeline::ProcessRequest,
                domain::pipeline::PipelineOutcome,
                domain::deliverable::Deliverable,
                domain::deliverable::DeliverableSummary,
                params::deliverable::GenerateParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "momentum", description = "Momentum Session Deliverables API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the proxy-asserted identity header requirement for gaining access
// to our API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-user-id",
                    "Caller identity asserted by the authenticating reverse proxy",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(zoom_oauth_routes(app_state.clone()))
        .merge(zoom_connection_routes(app_state.clone()))
        .merge(recording_routes(app_state.clone()))
        .merge(deliverable_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn zoom_oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/oauth/zoom/authorize",
            get(zoom_connection_controller::authorize),
        )
        .route(
            "/oauth/zoom/callback",
            get(zoom_connection_controller::callback),
        )
        .with_state(app_state)
}

fn zoom_connection_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/zoom/status", get(zoom_connection_controller::status))
        .route(
            "/zoom/connection",
            delete(zoom_connection_controller::disconnect),
        )
        .with_state(app_state)
}

fn recording_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/zoom/recordings", get(recording_controller::index))
        .route(
            "/zoom/recordings/{meeting_id}/files/{file_id}/process",
            post(recording_controller::process),
        )
        .with_state(app_state)
}

fn deliverable_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/deliverables/generate",
            post(deliverable_controller::generate),
        )
        .route("/deliverables", get(deliverable_controller::index))
        .route("/deliverables/{id}", get(deliverable_controller::read))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The whole schema set must render, including the annotated
    // chrono timestamp fields on deliverables and connection status
    #[test]
    fn test_openapi_document_renders_timestamps_as_date_time_strings() {
        let doc = ApiDoc::openapi().to_json().unwrap();

        assert!(doc.contains("\"Deliverable\""));
        assert!(doc.contains("\"DeliverableSummary\""));
        assert!(doc.contains("\"ConnectionStatus\""));
        assert!(doc.contains("\"format\":\"date-time\""));
    }
}
