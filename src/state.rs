use std::sync::Arc;

use crate::auth::UserDirectory;
use crate::config::{AppConfig, PagingConfig};
use crate::database::RecordStore;

/// Settings the Basic auth layer needs on every request
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub realm: String,
    pub required_role: String,
}

/// Shared handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub users: Arc<dyn UserDirectory>,
    pub paging: PagingConfig,
    pub auth: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, users: Arc<dyn UserDirectory>, config: &AppConfig) -> Self {
        Self {
            store,
            users,
            paging: config.paging(),
            auth: Arc::new(AuthSettings {
                realm: config.security.realm.clone(),
                required_role: config.security.required_role.clone(),
            }),
        }
    }
}
