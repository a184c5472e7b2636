use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::io::Read;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use super::comps::{self, CompsAnalysis, CompsAnalysisRequest, CompsError, SubjectSize};
use super::domain::{
    ActionId, CrmAction, CrmActionDraft, LandCompProject, Parcel, ParcelDraft,
    ParcelValidationError, ProjectDraft, ProjectId, ProjectStatus, ProjectUpdate,
};
use super::import::{parse_parcels, ParcelImportError};
use super::repository::{ProjectRecord, ProjectRepository, RepositoryError};

/// Service owning project lifecycle: creation, edits, parcels, CRM follow-ups, and deletion.
pub struct ProjectService<R> {
    repository: Arc<R>,
    project_sequence: AtomicU64,
    action_sequence: AtomicU64,
}

impl<R> ProjectService<R>
where
    R: ProjectRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            project_sequence: AtomicU64::new(1),
            action_sequence: AtomicU64::new(1),
        }
    }

    fn next_project_id(&self) -> ProjectId {
        let id = self.project_sequence.fetch_add(1, Ordering::Relaxed);
        ProjectId(format!("proj-{id:06}"))
    }

    fn next_action_id(&self) -> ActionId {
        let id = self.action_sequence.fetch_add(1, Ordering::Relaxed);
        ActionId(format!("act-{id:06}"))
    }

    /// Store a calculator submission as a new draft project.
    pub fn record_calculation(
        &self,
        subject_data: Map<String, Value>,
        calculations: Map<String, Value>,
    ) -> Result<ProjectRecord, ProjectServiceError> {
        let now = Utc::now();
        let project = LandCompProject {
            id: self.next_project_id(),
            subject_data,
            calculations,
            comps: Vec::new(),
            status: ProjectStatus::Draft,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(ProjectRecord::new(project))?;
        info!(project_id = %stored.id(), "calculation recorded");
        Ok(stored)
    }

    pub fn create(&self, draft: ProjectDraft) -> Result<ProjectRecord, ProjectServiceError> {
        let subject_data = into_object("subject_data", draft.subject_data)?;
        let calculations = match draft.calculations {
            Some(value) => into_object("calculations", value)?,
            None => Map::new(),
        };

        let now = Utc::now();
        let project = LandCompProject {
            id: self.next_project_id(),
            subject_data,
            calculations,
            comps: draft.comps,
            status: ProjectStatus::Draft,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(ProjectRecord::new(project))?;
        info!(project = %stored.project, "project created");
        Ok(stored)
    }

    pub fn get(&self, id: &ProjectId) -> Result<ProjectRecord, ProjectServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<ProjectRecord>, ProjectServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn update(
        &self,
        id: &ProjectId,
        update: ProjectUpdate,
    ) -> Result<ProjectRecord, ProjectServiceError> {
        self.repository.modify(id, |record| {
            let project = &mut record.project;

            if let Some(status) = update.status {
                project.status = status;
            }
            if let Some(notes) = update.notes {
                project.notes = notes;
            }
            if let Some(comps) = update.comps {
                project.comps = comps;
            }
            if let Some(calculations) = update.calculations {
                project.calculations = into_object("calculations", calculations)?;
            }
            project.updated_at = Utc::now();

            Ok::<_, ProjectServiceError>(record.clone())
        })
    }

    pub fn add_parcel(
        &self,
        id: &ProjectId,
        draft: ParcelDraft,
    ) -> Result<Parcel, ProjectServiceError> {
        let parcel = self.repository.modify(id, |record| {
            let parcel = draft.into_parcel(id.clone())?;
            record.parcels.push(parcel.clone());
            record.project.updated_at = Utc::now();
            Ok::<_, ProjectServiceError>(parcel)
        })?;

        info!(%parcel, "parcel added");
        Ok(parcel)
    }

    /// Import every row of a parcel CSV; a single bad row rejects the whole file.
    pub fn import_parcels<Rd: Read>(
        &self,
        id: &ProjectId,
        reader: Rd,
    ) -> Result<Vec<Parcel>, ProjectServiceError> {
        let drafts = parse_parcels(reader)?;
        let parcels = self.repository.modify(id, |record| {
            let parcels = drafts
                .into_iter()
                .map(|draft| draft.into_parcel(id.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            record.parcels.extend(parcels.iter().cloned());
            record.project.updated_at = Utc::now();
            Ok::<_, ProjectServiceError>(parcels)
        })?;

        info!(project_id = %id, count = parcels.len(), "parcels imported");
        Ok(parcels)
    }

    pub fn schedule_action(
        &self,
        id: &ProjectId,
        draft: CrmActionDraft,
    ) -> Result<CrmAction, ProjectServiceError> {
        let action = self.repository.modify(id, |record| {
            let action = CrmAction {
                id: self.next_action_id(),
                project_id: id.clone(),
                action_type: draft.action_type,
                scheduled_time: draft.scheduled_time,
                notes: draft.notes,
                completed: false,
            };
            record.crm_actions.push(action.clone());
            Ok::<_, ProjectServiceError>(action)
        })?;

        info!(%action, scheduled_time = %action.scheduled_time, "crm action scheduled");
        Ok(action)
    }

    pub fn complete_action(
        &self,
        id: &ProjectId,
        action_id: &ActionId,
    ) -> Result<CrmAction, ProjectServiceError> {
        self.repository.modify(id, |record| {
            let action = record
                .action_mut(action_id)
                .ok_or_else(|| ProjectServiceError::ActionNotFound(action_id.clone()))?;
            action.completed = true;
            Ok::<_, ProjectServiceError>(action.clone())
        })
    }

    /// Price the project from its comparable sales and store the result in `calculations`.
    ///
    /// Subject acreage comes from the request, then `subject_data.acres`, then the
    /// parcel total. Square footage comes from the request, then `subject_data.sq_ft`.
    pub fn analyze_comps(
        &self,
        id: &ProjectId,
        request: CompsAnalysisRequest,
    ) -> Result<CompsAnalysis, ProjectServiceError> {
        let analysis = self.repository.modify(id, |record| {
            let subject = SubjectSize {
                acres: request
                    .subject_acres
                    .or_else(|| subject_figure(&record.project.subject_data, "acres"))
                    .unwrap_or_else(|| record.parcels.iter().map(|parcel| parcel.acres).sum()),
                sq_ft: request
                    .subject_sq_ft
                    .or_else(|| subject_figure(&record.project.subject_data, "sq_ft")),
            };
            let analysis = comps::analyze(&record.project.comps, &subject, &request.adjustments)?;

            let calculations = &mut record.project.calculations;
            calculations.insert(
                "comps_analysis".to_string(),
                serde_json::to_value(&analysis)?,
            );
            calculations.insert(
                "offer_price".to_string(),
                Value::String(analysis.offer_price.to_string()),
            );
            record.project.updated_at = Utc::now();
            Ok::<_, ProjectServiceError>(analysis)
        })?;

        info!(
            project_id = %id,
            comps_used = analysis.comps_used,
            offer_price = %analysis.offer_price,
            "comparable sales analyzed"
        );
        Ok(analysis)
    }

    /// Remove a project along with its parcels and CRM actions.
    pub fn delete(&self, id: &ProjectId) -> Result<ProjectRecord, ProjectServiceError> {
        let removed = self.repository.delete(id)?;
        info!(
            project_id = %id,
            parcels = removed.parcels.len(),
            crm_actions = removed.crm_actions.len(),
            "project deleted"
        );
        Ok(removed)
    }
}

// Accepts figures stored either as JSON numbers or as decimal strings.
fn subject_figure(subject_data: &Map<String, Value>, key: &str) -> Option<Decimal> {
    match subject_data.get(key)? {
        Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
}

fn into_object(
    field: &'static str,
    value: Value,
) -> Result<Map<String, Value>, ProjectServiceError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ProjectServiceError::InvalidDocument(field)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    InvalidParcel(#[from] ParcelValidationError),
    #[error(transparent)]
    Import(#[from] ParcelImportError),
    #[error("{0} must be a JSON object")]
    InvalidDocument(&'static str),
    #[error("crm action {0} not found")]
    ActionNotFound(ActionId),
    #[error(transparent)]
    Comps(#[from] CompsError),
    #[error("failed to encode calculations: {0}")]
    Encoding(#[from] serde_json::Error),
}
