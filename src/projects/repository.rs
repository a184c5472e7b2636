use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{ActionId, CrmAction, LandCompProject, Parcel, ProjectId};

/// A project together with the parcels and CRM actions it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project: LandCompProject,
    #[serde(default)]
    pub parcels: Vec<Parcel>,
    #[serde(default)]
    pub crm_actions: Vec<CrmAction>,
}

impl ProjectRecord {
    pub fn new(project: LandCompProject) -> Self {
        Self {
            project,
            parcels: Vec::new(),
            crm_actions: Vec::new(),
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.project.id
    }

    pub fn action_mut(&mut self, id: &ActionId) -> Option<&mut CrmAction> {
        self.crm_actions.iter_mut().find(|action| &action.id == id)
    }
}

/// Storage abstraction so the service can run against memory or a database.
///
/// Deleting a project removes its parcels and CRM actions with it.
pub trait ProjectRepository: Send + Sync {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError>;
    /// Applies `change` to the stored record with no other writer interleaving.
    /// A failed change leaves the record as it was.
    fn modify<T, E, F>(&self, id: &ProjectId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut ProjectRecord) -> Result<T, E>,
        E: From<RepositoryError>;
    fn fetch(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError>;
    fn delete(&self, id: &ProjectId) -> Result<ProjectRecord, RepositoryError>;
    fn list(&self) -> Result<Vec<ProjectRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local repository used by the CLI, the server, and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectRepository {
    records: Arc<Mutex<BTreeMap<ProjectId, ProjectRecord>>>,
}

impl InMemoryProjectRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<ProjectId, ProjectRecord>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn modify<T, E, F>(&self, id: &ProjectId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut ProjectRecord) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.lock()?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;

        let mut working = stored.clone();
        let outcome = change(&mut working)?;
        *stored = working;
        Ok(outcome)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn delete(&self, id: &ProjectId) -> Result<ProjectRecord, RepositoryError> {
        self.lock()?.remove(id).ok_or(RepositoryError::NotFound)
    }

    fn list(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        Ok(self.lock()?.values().cloned().collect())
    }
}
