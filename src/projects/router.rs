use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::comps::CompsAnalysisRequest;
use super::domain::{ActionId, CrmActionDraft, ParcelDraft, ProjectDraft, ProjectId, ProjectUpdate};
use super::repository::{ProjectRepository, RepositoryError};
use super::service::{ProjectService, ProjectServiceError};

type SharedService<R> = State<Arc<ProjectService<R>>>;

/// Router exposing project, parcel, and CRM action endpoints.
pub fn project_router<R>(service: Arc<ProjectService<R>>) -> Router
where
    R: ProjectRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id",
            get(fetch_handler::<R>)
                .patch(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/parcels",
            post(add_parcel_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/parcels/import",
            post(import_parcels_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/comps-analysis",
            post(analyze_comps_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/crm-actions",
            post(schedule_action_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/crm-actions/:action_id/complete",
            post(complete_action_handler::<R>),
        )
        .with_state(service)
}

pub(crate) fn error_response(error: ProjectServiceError) -> Response {
    let status = match &error {
        ProjectServiceError::Repository(RepositoryError::NotFound)
        | ProjectServiceError::ActionNotFound(_) => StatusCode::NOT_FOUND,
        ProjectServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ProjectServiceError::Repository(RepositoryError::Unavailable(_))
        | ProjectServiceError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ProjectServiceError::InvalidParcel(_)
        | ProjectServiceError::Import(_)
        | ProjectServiceError::InvalidDocument(_)
        | ProjectServiceError::Comps(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    outcome: Result<T, ProjectServiceError>,
) -> Response {
    match outcome {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): SharedService<R>,
    Json(draft): Json<ProjectDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(StatusCode::CREATED, service.create(draft))
}

pub(crate) async fn list_handler<R>(State(service): SharedService<R>) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(StatusCode::OK, service.list())
}

pub(crate) async fn fetch_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(StatusCode::OK, service.get(&ProjectId(project_id)))
}

pub(crate) async fn update_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(update): Json<ProjectUpdate>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(StatusCode::OK, service.update(&ProjectId(project_id), update))
}

pub(crate) async fn delete_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.delete(&ProjectId(project_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_parcel_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(draft): Json<ParcelDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_parcel(&ProjectId(project_id), draft),
    )
}

pub(crate) async fn import_parcels_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    body: String,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.import_parcels(&ProjectId(project_id), body.as_bytes()),
    )
}

pub(crate) async fn analyze_comps_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(request): Json<CompsAnalysisRequest>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.analyze_comps(&ProjectId(project_id), request),
    )
}

pub(crate) async fn schedule_action_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(draft): Json<CrmActionDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.schedule_action(&ProjectId(project_id), draft),
    )
}

pub(crate) async fn complete_action_handler<R>(
    State(service): SharedService<R>,
    Path((project_id, action_id)): Path<(String, String)>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.complete_action(&ProjectId(project_id), &ActionId(action_id)),
    )
}
