//! HTTP trigger surface.
//!
//! `POST /scrape` runs the pipeline in ingest mode, guarded by an optional
//! bearer secret. Error detail chains only leave the process when
//! `server.expose_errors` is set.

use crate::config::Config;
use crate::db::Pool;
use crate::model::RunReport;
use crate::pipeline::{run_pipeline, RunMode};
use crate::render::PageRenderer;
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub cfg: Arc<Config>,
    pub renderer: Arc<dyn PageRenderer>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/scrape", post(trigger_scrape))
        .with_state(state)
}

fn authorized(headers: &HeaderMap, api_key: Option<&str>) -> bool {
    let Some(key) = api_key else {
        return true;
    };
    let expected = format!("Bearer {key}");
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}

async fn trigger_scrape(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers, state.cfg.server.api_key.as_deref()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        );
    }

    match run_pipeline(
        state.renderer.as_ref(),
        RunMode::Ingest(&state.pool),
        &state.cfg,
    )
    .await
    {
        Ok(report) => {
            let body = match report {
                RunReport::Ingested {
                    inserted,
                    skipped,
                    errors,
                } => json!({
                    "success": true,
                    "message": "scraping completed successfully",
                    "inserted": inserted,
                    "skipped": skipped,
                    "errors": errors,
                }),
                RunReport::DryRun { count } => json!({
                    "success": true,
                    "message": "dry run completed successfully",
                    "count": count,
                }),
            };
            (StatusCode::OK, Json(body))
        }
        Err(err) => {
            error!(%err, "scrape run failed");
            let mut body = json!({
                "success": false,
                "error": err.to_string(),
            });
            if state.cfg.server.expose_errors {
                body["detail"] = json!(format!("{err:?}"));
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_is_open_without_configured_key() {
        let headers = HeaderMap::new();
        assert!(authorized(&headers, None));
    }

    #[test]
    fn auth_requires_exact_bearer_value() {
        let mut headers = HeaderMap::new();
        assert!(!authorized(&headers, Some("secret")));

        headers.insert(AUTHORIZATION, "Bearer secret".parse().unwrap());
        assert!(authorized(&headers, Some("secret")));

        headers.insert(AUTHORIZATION, "Bearer wrong".parse().unwrap());
        assert!(!authorized(&headers, Some("secret")));

        headers.insert(AUTHORIZATION, "secret".parse().unwrap());
        assert!(!authorized(&headers, Some("secret")));
    }
}
