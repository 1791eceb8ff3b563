use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::{QuizApi, User};
use crate::app_dirs::AppDirs;
use crate::error::VocquizError;
use crate::storage::{JsonFileStore, SnapshotStore};

/// Backend session persisted between runs, like the browser client kept its
/// token and user in localStorage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub session_token: String,
    pub user: User,
}

/// File-backed holder for the stored session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: JsonFileStore,
}

impl SessionStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::auth_session_path().unwrap_or_else(|| PathBuf::from("vocquiz_session.json"));
        Self::with_path(path)
    }

    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            store: JsonFileStore::new(path.into()),
        }
    }

    pub fn load(&self) -> Option<StoredSession> {
        self.store.load()
    }

    pub fn save(&self, session: &StoredSession) -> io::Result<()> {
        self.store.save(&Some(session.clone()))
    }

    pub fn clear(&self) -> io::Result<()> {
        self.store.save(&None::<StoredSession>)
    }
}

/// Log in against the backend, persist the session, and arm the client with
/// the new token.
pub fn login(
    api: &mut QuizApi,
    store: &SessionStore,
    username: &str,
    password: &str,
) -> Result<User, VocquizError> {
    let response = api.login(username, password)?;
    let session = StoredSession {
        session_token: response.session_token,
        user: response.user.clone(),
    };
    store.save(&session)?;
    api.set_token(Some(session.session_token));
    Ok(response.user)
}

/// Invalidate the session server-side if possible; local state is cleared
/// either way.
pub fn logout(api: &mut QuizApi, store: &SessionStore) -> Result<(), VocquizError> {
    if api.has_token() {
        let _ = api.logout();
    }
    api.set_token(None);
    store.clear()?;
    Ok(())
}

/// Restore a persisted session at startup: arm the client with the stored
/// token and validate it against the backend. An invalid or expired token
/// clears the stored session and leaves the client unauthenticated.
pub fn restore(api: &mut QuizApi, store: &SessionStore) -> Option<User> {
    let session = store.load()?;
    api.set_token(Some(session.session_token));
    match api.me() {
        Ok(user) => Some(user),
        Err(_) => {
            api.set_token(None);
            let _ = store.clear();
            None
        }
    }
}
