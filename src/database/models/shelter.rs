use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::validation::{FieldReader, ValidationErrors};
use crate::database::repository::{Document, Timestamps};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Shelter {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new("Shelter", fields);
        let shelter = Shelter {
            id: Uuid::new_v4(),
            name: reader.required_string("name"),
            location: reader.required_string("location"),
            contact_email: reader.optional_string("contactEmail"),
            contact_phone: reader.optional_string("contactPhone"),
            timestamps: Timestamps::now(),
        };
        reader.finish(shelter)
    }
}

impl Document for Shelter {
    const COLLECTION: &'static str = "shelters";

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}
