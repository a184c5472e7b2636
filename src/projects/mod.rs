//! Land comparison projects with their parcels, comparable sales, and CRM follow-ups.

pub mod comps;
pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

pub use comps::{
    analyze, ComparableSale, CompsAnalysis, CompsAnalysisRequest, CompsError, OfferAdjustments,
    OfferTier, SubjectSize, OFFER_TIER_PERCENTAGES,
};
pub use domain::{
    ActionId, CrmAction, CrmActionDraft, CrmActionType, LandCompProject, Parcel, ParcelDraft,
    ParcelValidationError, ProjectDraft, ProjectId, ProjectStatus, ProjectUpdate,
    SQUARE_FEET_PER_ACRE,
};
pub use import::{parse_parcels, ParcelImportError};
pub use repository::{InMemoryProjectRepository, ProjectRecord, ProjectRepository, RepositoryError};
pub use router::project_router;
pub use service::{ProjectService, ProjectServiceError};
