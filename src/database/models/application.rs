use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::validation::{FieldEnum, FieldReader, ValidationErrors};
use crate::database::repository::{Document, Timestamps};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    #[serde(rename = "In-Review")]
    InReview,
    Approved,
    Rejected,
}

impl FieldEnum for ApplicationStatus {
    const ALLOWED: &'static [Self] = &[
        ApplicationStatus::Submitted,
        ApplicationStatus::InReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::InReview => "In-Review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

/// Adoption application for one pet. `pet_id` is not checked against the
/// pets collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub pet_id: Uuid,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Application {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new("Application", fields);
        let application = Application {
            id: Uuid::new_v4(),
            applicant_name: reader.required_string("applicantName"),
            applicant_email: reader.required_string("applicantEmail"),
            applicant_phone: reader.required_string("applicantPhone"),
            message: reader.optional_string("message"),
            status: reader.enumeration("status"),
            pet_id: reader.required_reference("petId"),
            timestamps: Timestamps::now(),
        };
        reader.finish(application)
    }
}

impl Document for Application {
    const COLLECTION: &'static str = "applications";

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}
