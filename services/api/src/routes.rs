use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use land_valuation::calculator::{calculator_router, CalculatorState};
use land_valuation::projects::{project_router, ProjectRepository};
use serde_json::json;

/// Calculator, project, and operational endpoints on one router.
pub(crate) fn with_service_routes<R>(state: CalculatorState<R>) -> axum::Router
where
    R: ProjectRepository + 'static,
{
    let projects = project_router(state.projects.clone());

    calculator_router(state)
        .merge(projects)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::default_engine;
    use axum::body::Body;
    use axum::http::Request;
    use land_valuation::projects::{InMemoryProjectRepository, ProjectService};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> axum::Router {
        let repository = Arc::new(InMemoryProjectRepository::default());
        with_service_routes(CalculatorState {
            engine: Arc::new(default_engine()),
            projects: Arc::new(ProjectService::new(repository)),
        })
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn form_submissions_show_up_as_projects() {
        let router = router();

        let submitted = router
            .clone()
            .oneshot(
                Request::post("/calculator")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("acres=10&base_value=100000&debris_level=heavy"))
                    .expect("request builds"),
            )
            .await
            .expect("form responds");
        assert_eq!(submitted.status(), StatusCode::OK);

        let listed = router
            .oneshot(
                Request::get("/api/v1/projects")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("list responds");
        assert_eq!(listed.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(listed.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let projects: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(projects.as_array().map(Vec::len), Some(1));
        assert_eq!(projects[0]["project"]["calculations"]["final_value"], "95000");
        assert_eq!(projects[0]["project"]["calculations"]["site_prep_cost"], "5000");
    }
}
