pub mod credentials;
pub mod session;

pub use credentials::{CredentialError, CredentialService};
pub use session::{Claims, SessionError, SessionIssuer};
