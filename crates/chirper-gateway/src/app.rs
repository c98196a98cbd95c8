use std::fmt::{Display, Formatter};

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Uri};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use clap::ValueEnum;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{count_chirps_handler, create_chirp_handler, list_chirps_handler};
use crate::middleware::{authorize, handle_panic, redirect_slashes, require_role};
use crate::state::AppState;

pub const API_PREFIX: &str = "/v1/api";
pub const ADMIN_ROLE: &str = "admin";

/// Which part of the API a process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Deployment {
    /// Reads, writes and the admin endpoints.
    #[value(name = "standalone")]
    Standalone,
    /// Chirp listing only.
    #[value(name = "reader")]
    Reader,
}

impl Deployment {
    /// Method and full path of every route mounted for this deployment.
    pub fn routes(&self) -> Vec<(&'static str, String)> {
        let mut routes = vec![("GET", format!("{API_PREFIX}/chirps"))];
        if *self == Deployment::Standalone {
            routes.push(("POST", format!("{API_PREFIX}/chirps")));
            routes.push(("GET", format!("{API_PREFIX}/admin/chirps/count")));
        }
        routes
    }
}

impl Display for Deployment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Deployment::Standalone => write!(f, "standalone"),
            Deployment::Reader => write!(f, "reader"),
        }
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

pub struct App {}

impl App {
    pub fn router(state: AppState, deployment: Deployment) -> Router {
        let api = match deployment {
            Deployment::Standalone => Router::new()
                .route(
                    "/chirps",
                    get(list_chirps_handler).post(create_chirp_handler),
                )
                .nest(
                    "/admin",
                    Router::new()
                        .route("/chirps/count", get(count_chirps_handler))
                        .route_layer(from_fn_with_state(ADMIN_ROLE, require_role)),
                ),
            Deployment::Reader => Router::new().route("/chirps", get(list_chirps_handler)),
        };

        Router::new()
            .nest(API_PREFIX, api)
            .fallback(not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetResponseHeaderLayer::if_not_present(
                        CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    ))
                    .layer(TraceLayer::new_for_http())
                    .layer(CompressionLayer::new())
                    .layer(from_fn(redirect_slashes))
                    .layer(CatchPanicLayer::custom(handle_panic))
                    .layer(from_fn(authorize)),
            )
    }
}
