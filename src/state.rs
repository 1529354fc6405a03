use std::sync::Arc;

use crate::auth::{CredentialError, CredentialService, SessionIssuer};
use crate::config::AppConfig;
use crate::database::models::{Application, Pet, Shelter, User};
use crate::database::{DocumentStore, Repository, StoreError};
use crate::media::MediaIntake;

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub shelters: Repository<Shelter>,
    pub users: Repository<User>,
    pub pets: Repository<Pet>,
    pub applications: Repository<Application>,
    pub credentials: CredentialService,
    pub sessions: SessionIssuer,
    pub media: Arc<MediaIntake>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, CredentialError> {
        let credentials = CredentialService::from_config(&config.security)?;
        let sessions = SessionIssuer::from_config(&config.security);
        let media = Arc::new(MediaIntake::new(config.media.upload_dir.clone()));

        Ok(Self {
            shelters: Repository::new(Arc::clone(&store)),
            users: Repository::new(Arc::clone(&store)),
            pets: Repository::new(Arc::clone(&store)),
            applications: Repository::new(Arc::clone(&store)),
            config: Arc::new(config),
            store,
            credentials,
            sessions,
            media,
        })
    }

    /// Creates every collection and its unique indexes
    pub async fn ensure_collections(&self) -> Result<(), StoreError> {
        futures::try_join!(
            self.shelters.ensure_collection(),
            self.users.ensure_collection(),
            self.pets.ensure_collection(),
            self.applications.ensure_collection(),
        )?;
        Ok(())
    }
}
