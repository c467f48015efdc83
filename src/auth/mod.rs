use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info};
use validator::Validate;

pub mod handler;
pub mod jwt;
pub mod store;

use store::SessionStore;

/// Identifier of a pet profile, as issued by the backend.
pub type PetId = String;

/// The two persisted slots that make up a signed-in session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "authToken", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "selectedPetId", skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<PetId>,
}

/// Shared handle on the current session.
///
/// Created at start-up from the persisted store, mutated only by the
/// sign-in, profile selection and sign-out flows, read by everything else.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Session>>,
    store: Option<Arc<SessionStore>>,
}

impl SessionContext {
    /// A session that lives only in memory.
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
            store: None,
        }
    }

    /// Restores the session persisted in `store` and keeps it in sync.
    pub fn restore(store: SessionStore) -> anyhow::Result<Self> {
        let session = store.load()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(session)),
            store: Some(Arc::new(store)),
        })
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn active_profile(&self) -> Option<PetId> {
        self.read().active_profile.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn sign_in(&self, token: String) {
        let mut session = self.write();
        session.token = Some(token);
        info!("session signed in");
        self.persist(&session);
    }

    /// Fails when nobody is signed in.
    pub fn select_profile(&self, pet_id: PetId) -> Result<(), SessionError> {
        let mut session = self.write();
        if session.token.is_none() {
            return Err(SessionError::NotSignedIn);
        }
        info!("active profile set to {}", pet_id);
        session.active_profile = Some(pet_id);
        self.persist(&session);
        Ok(())
    }

    pub fn sign_out(&self) {
        let mut session = self.write();
        *session = Session::default();
        info!("session signed out");
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                error!("Failed to clear persisted session: {:?}", e);
            }
        }
    }

    fn persist(&self, session: &Session) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(session) {
                error!("Failed to persist session: {:?}", e);
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("sign in before selecting a profile")]
    NotSignedIn,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectProfile {
    pub pet_id: PetId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub signed_in: bool,
    pub user_id: Option<String>,
    pub active_profile_id: Option<PetId>,
}
