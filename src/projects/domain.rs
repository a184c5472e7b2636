use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::comps::ComparableSale;

pub const SQUARE_FEET_PER_ACRE: u32 = 43_560;
pub const MAX_PARCEL_ID_LEN: usize = 50;
pub const MAX_COORDINATES_LEN: usize = 50;

/// Stored precision of parcel figures as `(max_digits, decimal_places)`.
pub const ACRES_PRECISION: (u32, u32) = (8, 4);
pub const AMOUNT_PRECISION: (u32, u32) = (12, 2);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    NeedsReview,
    Completed,
    OfferAccepted,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::NeedsReview => "Needs Review",
            Self::Completed => "Completed",
            Self::OfferAccepted => "Offer Accepted",
        }
    }
}

/// Land comparison project holding the subject property and its calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandCompProject {
    pub id: ProjectId,
    pub subject_data: Map<String, Value>,
    #[serde(default)]
    pub calculations: Map<String, Value>,
    #[serde(default)]
    pub comps: Vec<ComparableSale>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LandCompProject {
    pub fn property_address(&self) -> Option<&str> {
        self.subject_data
            .get("property_address")
            .and_then(Value::as_str)
    }
}

impl fmt::Display for LandCompProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Project {} - {}",
            self.id,
            self.property_address().unwrap_or("Unnamed")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub project_id: ProjectId,
    pub parcel_id: String,
    pub acres: Decimal,
    pub sq_ft: Decimal,
    pub county_value: Decimal,
    pub legal_description: String,
    pub coordinates: String,
}

impl fmt::Display for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parcel {} for Project {}", self.parcel_id, self.project_id)
    }
}

/// Unvalidated parcel details as submitted by a caller or a CSV row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelDraft {
    pub parcel_id: String,
    pub acres: Decimal,
    #[serde(default)]
    pub sq_ft: Option<Decimal>,
    #[serde(default)]
    pub county_value: Decimal,
    #[serde(default)]
    pub legal_description: String,
    #[serde(default)]
    pub coordinates: String,
}

impl ParcelDraft {
    /// Checks field limits and rounds figures to their stored precision.
    pub fn into_parcel(self, project_id: ProjectId) -> Result<Parcel, ParcelValidationError> {
        let parcel_id = self.parcel_id.trim().to_string();
        if parcel_id.is_empty() {
            return Err(ParcelValidationError::MissingParcelId);
        }
        if parcel_id.chars().count() > MAX_PARCEL_ID_LEN {
            return Err(ParcelValidationError::ParcelIdTooLong(parcel_id));
        }

        let coordinates = self.coordinates.trim().to_string();
        if coordinates.chars().count() > MAX_COORDINATES_LEN {
            return Err(ParcelValidationError::CoordinatesTooLong(coordinates));
        }

        let acres = stored("acres", self.acres, ACRES_PRECISION)?;
        let sq_ft = match self.sq_ft {
            Some(sq_ft) => sq_ft,
            None => acres
                .checked_mul(Decimal::from(SQUARE_FEET_PER_ACRE))
                .ok_or(ParcelValidationError::OutOfRange {
                    field: "sq_ft",
                    max_digits: AMOUNT_PRECISION.0,
                    decimal_places: AMOUNT_PRECISION.1,
                })?,
        };
        let sq_ft = stored("sq_ft", sq_ft, AMOUNT_PRECISION)?;
        let county_value = stored("county_value", self.county_value, AMOUNT_PRECISION)?;

        Ok(Parcel {
            project_id,
            parcel_id,
            acres,
            sq_ft,
            county_value,
            legal_description: self.legal_description.trim().to_string(),
            coordinates,
        })
    }
}

// Rejects negatives, rounds to the stored scale, then checks the digit budget.
fn stored(
    field: &'static str,
    value: Decimal,
    (max_digits, decimal_places): (u32, u32),
) -> Result<Decimal, ParcelValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ParcelValidationError::Negative { field, value });
    }

    let rounded =
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);
    let limit = Decimal::from(10_u64.pow(max_digits - decimal_places));
    if rounded >= limit {
        return Err(ParcelValidationError::OutOfRange {
            field,
            max_digits,
            decimal_places,
        });
    }
    Ok(rounded)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParcelValidationError {
    #[error("parcel_id is required")]
    MissingParcelId,
    #[error("parcel_id '{0}' exceeds 50 characters")]
    ParcelIdTooLong(String),
    #[error("coordinates '{0}' exceed 50 characters")]
    CoordinatesTooLong(String),
    #[error("{field} must be zero or greater (got {value})")]
    Negative { field: &'static str, value: Decimal },
    #[error("{field} exceeds {max_digits} digits with {decimal_places} decimal places")]
    OutOfRange {
        field: &'static str,
        max_digits: u32,
        decimal_places: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmActionType {
    Call,
    Email,
    Task,
    Offer,
}

impl CrmActionType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Call => "Schedule Call",
            Self::Email => "Send Email",
            Self::Task => "Create Task",
            Self::Offer => "Generate Offer",
        }
    }
}

/// Follow-up scheduled against a project in the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmAction {
    pub id: ActionId,
    pub project_id: ProjectId,
    pub action_type: CrmActionType,
    pub scheduled_time: DateTime<Utc>,
    pub notes: String,
    pub completed: bool,
}

impl fmt::Display for CrmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for Project {}",
            self.action_type.label(),
            self.project_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmActionDraft {
    pub action_type: CrmActionType,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

/// Fields accepted when opening a new project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub subject_data: Value,
    #[serde(default)]
    pub calculations: Option<Value>,
    #[serde(default)]
    pub comps: Vec<ComparableSale>,
    #[serde(default)]
    pub notes: String,
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub comps: Option<Vec<ComparableSale>>,
    #[serde(default)]
    pub calculations: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("valid decimal literal")
    }

    fn project_id() -> ProjectId {
        ProjectId("proj-000001".to_string())
    }

    #[test]
    fn parcel_derives_square_feet_from_acres() {
        let parcel = ParcelDraft {
            parcel_id: " R000123 ".to_string(),
            acres: dec("2.5"),
            county_value: dec("48000.456"),
            ..ParcelDraft::default()
        }
        .into_parcel(project_id())
        .expect("valid parcel");

        assert_eq!(parcel.parcel_id, "R000123");
        assert_eq!(parcel.sq_ft, dec("108900"));
        assert_eq!(parcel.county_value, dec("48000.46"));
        assert_eq!(parcel.to_string(), "Parcel R000123 for Project proj-000001");
    }

    #[test]
    fn parcel_acres_are_rounded_to_four_places() {
        let parcel = ParcelDraft {
            parcel_id: "R1".to_string(),
            acres: dec("1.234567"),
            sq_ft: Some(dec("53776.1")),
            ..ParcelDraft::default()
        }
        .into_parcel(project_id())
        .expect("valid parcel");

        assert_eq!(parcel.acres, dec("1.2346"));
        assert_eq!(parcel.sq_ft, dec("53776.1"));
    }

    #[test]
    fn parcel_validation_rejects_bad_fields() {
        let missing = ParcelDraft::default().into_parcel(project_id());
        assert_eq!(missing, Err(ParcelValidationError::MissingParcelId));

        let negative = ParcelDraft {
            parcel_id: "R2".to_string(),
            acres: dec("-1"),
            ..ParcelDraft::default()
        }
        .into_parcel(project_id());
        assert!(matches!(
            negative,
            Err(ParcelValidationError::Negative { field: "acres", .. })
        ));

        let long_id = ParcelDraft {
            parcel_id: "x".repeat(51),
            acres: dec("1"),
            ..ParcelDraft::default()
        }
        .into_parcel(project_id());
        assert!(matches!(
            long_id,
            Err(ParcelValidationError::ParcelIdTooLong(_))
        ));
    }

    #[test]
    fn parcel_figures_respect_stored_digit_limits() {
        let huge_acres = ParcelDraft {
            parcel_id: "R3".to_string(),
            acres: Decimal::from_i128_with_scale(10_i128.pow(27), 0),
            ..ParcelDraft::default()
        }
        .into_parcel(project_id());
        assert_eq!(
            huge_acres,
            Err(ParcelValidationError::OutOfRange {
                field: "acres",
                max_digits: 8,
                decimal_places: 4,
            })
        );

        let huge_value = ParcelDraft {
            parcel_id: "R4".to_string(),
            acres: dec("9999.9999"),
            county_value: dec("10000000000"),
            ..ParcelDraft::default()
        }
        .into_parcel(project_id());
        assert!(matches!(
            huge_value,
            Err(ParcelValidationError::OutOfRange {
                field: "county_value",
                ..
            })
        ));

        let largest = ParcelDraft {
            parcel_id: "R5".to_string(),
            acres: dec("9999.9999"),
            county_value: dec("9999999999.99"),
            ..ParcelDraft::default()
        }
        .into_parcel(project_id())
        .expect("values at the limit are stored");
        assert_eq!(largest.sq_ft, dec("435599995.64"));
    }

    #[test]
    fn project_display_falls_back_to_unnamed() {
        let now = Utc::now();
        let mut project = LandCompProject {
            id: project_id(),
            subject_data: Map::new(),
            calculations: Map::new(),
            comps: Vec::new(),
            status: ProjectStatus::default(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(project.to_string(), "Project proj-000001 - Unnamed");

        project
            .subject_data
            .insert("property_address".to_string(), json!("12 Ranch Rd"));
        assert_eq!(project.to_string(), "Project proj-000001 - 12 Ranch Rd");
        assert_eq!(project.status.label(), "Draft");
    }

    #[test]
    fn crm_action_display_uses_label() {
        let action = CrmAction {
            id: ActionId("act-000001".to_string()),
            project_id: project_id(),
            action_type: CrmActionType::Offer,
            scheduled_time: Utc::now(),
            notes: String::new(),
            completed: false,
        };
        assert_eq!(action.to_string(), "Generate Offer for Project proj-000001");
    }
}
