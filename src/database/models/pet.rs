use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use super::validation::{FieldEnum, FieldReader, ValidationErrors};
use crate::database::repository::{Document, Timestamps};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl FieldEnum for Gender {
    const ALLOWED: &'static [Self] = &[Gender::Male, Gender::Female, Gender::Unknown];

    fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl FieldEnum for Size {
    const ALLOWED: &'static [Self] = &[Size::Small, Size::Medium, Size::Large];

    fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetStatus {
    #[default]
    Available,
    Pending,
    Adopted,
}

impl FieldEnum for PetStatus {
    const ALLOWED: &'static [Self] = &[PetStatus::Available, PetStatus::Pending, PetStatus::Adopted];

    fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Available => "Available",
            PetStatus::Pending => "Pending",
            PetStatus::Adopted => "Adopted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Number>,
    pub gender: Gender,
    pub size: Size,
    pub description: String,
    pub image_url: String,
    pub status: PetStatus,
    #[serde(default)]
    pub shelter_id: Option<Uuid>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Keys a client can never overwrite through an update. `imageUrl` only
/// ever comes from an upload.
const FIXED_FIELDS: &[&str] = &["_id", "createdAt", "updatedAt", "imageUrl"];

impl Pet {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new("Pet", fields);
        let pet = Pet {
            id: Uuid::new_v4(),
            name: reader.required_string("name"),
            species: reader.required_string("species"),
            breed: reader.optional_string("breed"),
            age: reader.optional_number("age"),
            gender: reader.enumeration("gender"),
            size: reader.enumeration("size"),
            description: reader.required_string("description"),
            image_url: reader.required_string("imageUrl"),
            status: reader.enumeration("status"),
            shelter_id: reader.optional_reference("shelterId"),
            timestamps: Timestamps::now(),
        };
        reader.finish(pet)
    }

    /// Merges `changes` over this record and re-validates the result.
    /// Identity and timestamps are carried over untouched.
    pub fn merged_with(&self, changes: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for (key, value) in changes {
            if !FIXED_FIELDS.contains(&key.as_str()) {
                fields.insert(key.clone(), value.clone());
            }
        }
        let mut merged = Self::from_fields(&fields)?;
        merged.id = self.id;
        merged.timestamps = self.timestamps.clone();
        Ok(merged)
    }
}

impl Document for Pet {
    const COLLECTION: &'static str = "pets";

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}
