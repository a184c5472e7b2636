//! Web front end over the valuation engine: the calculator form and a JSON endpoint.

pub mod form;
mod page;

pub use form::{calculations_document, CalculatorForm, FormError, INVALID_INPUT_MESSAGE};

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::AppError;
use crate::projects::{ProjectRepository, ProjectService};
use crate::valuation::{ValuationEngine, ValuationInput, ValuationResult, ValueImpact};
use page::PageOutcome;

/// Shared handles for the calculator routes.
pub struct CalculatorState<R> {
    pub engine: Arc<ValuationEngine>,
    pub projects: Arc<ProjectService<R>>,
}

impl<R> Clone for CalculatorState<R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            projects: Arc::clone(&self.projects),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResponse {
    pub result: ValuationResult,
    pub impact: ValueImpact,
}

pub fn calculator_router<R>(state: CalculatorState<R>) -> Router
where
    R: ProjectRepository + 'static,
{
    Router::new()
        .route(
            "/calculator",
            get(calculator_page::<R>).post(calculator_submit::<R>),
        )
        .route("/api/v1/valuations", post(valuation_endpoint::<R>))
        .with_state(state)
}

pub(crate) async fn calculator_page<R>(State(state): State<CalculatorState<R>>) -> Html<String>
where
    R: ProjectRepository + 'static,
{
    let counties = state.engine.rules().major_county_labels();
    Html(page::render(
        &CalculatorForm::default(),
        &counties,
        PageOutcome::Blank,
    ))
}

/// Runs a form submission through the engine and stores it as a draft project.
pub(crate) async fn calculator_submit<R>(
    State(state): State<CalculatorState<R>>,
    Form(form): Form<CalculatorForm>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    let counties = state.engine.rules().major_county_labels();

    let evaluated = form.to_input().and_then(|input| {
        let result = state.engine.evaluate(&input)?;
        Ok((input, result))
    });
    let (input, result) = match evaluated {
        Ok(evaluated) => evaluated,
        Err(err) => {
            warn!(error = %err, "calculator submission rejected");
            let html = page::render(
                &form,
                &counties,
                PageOutcome::Rejected(&[INVALID_INPUT_MESSAGE]),
            );
            return (StatusCode::BAD_REQUEST, Html(html)).into_response();
        }
    };

    let stored = state
        .projects
        .record_calculation(form.subject_data(&input), calculations_document(&result));

    match stored {
        Ok(record) => {
            let html = page::render(
                &form,
                &counties,
                PageOutcome::Calculated {
                    result: &result,
                    project_id: record.id(),
                },
            );
            Html(html).into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to store calculation");
            let html = page::render(
                &form,
                &counties,
                PageOutcome::Rejected(&["The calculation could not be saved. Please try again."]),
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
        }
    }
}

pub(crate) async fn valuation_endpoint<R>(
    State(state): State<CalculatorState<R>>,
    Json(input): Json<ValuationInput>,
) -> Result<Json<ValuationResponse>, AppError>
where
    R: ProjectRepository + 'static,
{
    let result = state.engine.evaluate(&input)?;
    let impact = result.impact();
    Ok(Json(ValuationResponse { result, impact }))
}
