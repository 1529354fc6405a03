pub mod application;
pub mod pet;
pub mod shelter;
pub mod user;
pub mod validation;

pub use application::{Application, ApplicationStatus};
pub use pet::{Gender, Pet, PetStatus, Size};
pub use shelter::Shelter;
pub use user::{NewUser, Role, User};
pub use validation::{FieldEnum, FieldReader, FieldViolation, ValidationErrors};
