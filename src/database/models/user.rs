use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::validation::{FieldEnum, FieldReader, ValidationErrors};
use crate::database::repository::{Document, Timestamps};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "shelter-admin")]
    ShelterAdmin,
    #[serde(rename = "super-admin")]
    SuperAdmin,
}

impl FieldEnum for Role {
    const ALLOWED: &'static [Self] = &[Role::ShelterAdmin, Role::SuperAdmin];

    fn as_str(&self) -> &'static str {
        match self {
            Role::ShelterAdmin => "shelter-admin",
            Role::SuperAdmin => "super-admin",
        }
    }
}

/// Shelter administrator account. `password` only ever holds a PHC hash
/// string produced by the credential service.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub shelter_ref: Uuid,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("shelter_ref", &self.shelter_ref)
            .finish_non_exhaustive()
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

/// Validated registration input still carrying the plaintext password
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub shelter_ref: Uuid,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("shelter_ref", &self.shelter_ref)
            .finish()
    }
}

impl NewUser {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new("User", fields);
        let user = NewUser {
            email: reader.required_string("email"),
            password: reader.required_string("password"),
            role: reader.enumeration("role"),
            shelter_ref: reader.required_reference("shelterRef"),
        };
        reader.finish(user)
    }

    /// Consumes the plaintext, keeping only the supplied hash
    pub fn into_user(self, password_hash: String) -> User {
        User {
            id: Uuid::new_v4(),
            email: self.email,
            password: password_hash,
            role: self.role,
            shelter_ref: self.shelter_ref,
            timestamps: Timestamps::now(),
        }
    }
}
