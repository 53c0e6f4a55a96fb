//! Login session state.
//!
//! A login is a two-step exchange with the catalog: the username is looked up
//! in the user list (the demo API's credential endpoint does not say who a
//! token belongs to), then the credentials are posted for a token. The
//! resulting [`Session`] and the last error message are persisted under
//! [`AUTH_KEY`] and rehydrated by [`AuthStore::open`].

use std::sync::Arc;

use fakestore_catalog::{CatalogClient, CatalogError};
use fakestore_core::{Session, User};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StateError;
use crate::storage::{load_json, save_json, StateStorage, AUTH_KEY};

/// Message shown when the catalog rejects credentials without saying why.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
/// Message shown when the catalog could not be reached.
pub const NETWORK_ERROR: &str =
    "Network error: Please check your internet connection and try again.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    /// The credential check was rejected. Carries the server's message or
    /// [`INVALID_CREDENTIALS`].
    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("Network error: Please check your internet connection and try again.")]
    Network(#[source] CatalogError),

    #[error("{0}")]
    Catalog(#[source] CatalogError),

    #[error("could not persist session: {0}")]
    Storage(#[from] StateError),
}

impl AuthError {
    fn from_lookup(err: CatalogError) -> Self {
        if err.is_transport() {
            AuthError::Network(err)
        } else {
            AuthError::Catalog(err)
        }
    }

    fn from_credential_check(err: CatalogError) -> Self {
        match err {
            CatalogError::Rejected { message, .. } => AuthError::InvalidCredentials { message },
            CatalogError::NotFound { .. } => AuthError::InvalidCredentials {
                message: INVALID_CREDENTIALS.to_owned(),
            },
            err if err.is_transport() => AuthError::Network(err),
            err => AuthError::Catalog(err),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthRecord {
    #[serde(default)]
    session: Option<Session>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug)]
pub struct AuthStore {
    session: Option<Session>,
    error: Option<String>,
    storage: Arc<dyn StateStorage>,
}

impl AuthStore {
    /// Opens the store, restoring the persisted session if there is one.
    ///
    /// An unreadable record is logged and treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if storage cannot be read.
    pub fn open(storage: Arc<dyn StateStorage>) -> Result<Self, StateError> {
        let record = match load_json::<AuthRecord>(storage.as_ref(), AUTH_KEY) {
            Ok(record) => record.unwrap_or_default(),
            Err(StateError::Decode { key, source }) => {
                tracing::warn!(%key, error = %source, "persisted session is unreadable, signing out");
                AuthRecord::default()
            }
            Err(e) => return Err(e),
        };
        if let Some(session) = &record.session {
            tracing::debug!(username = %session.user.username, "session restored");
        }
        Ok(Self {
            session: record.session,
            error: record.error,
            storage,
        })
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The message of the last failed login, if it has not been cleared.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Signs in as `username`.
    ///
    /// On failure the session is cleared, the error message is recorded and
    /// persisted, and the error is returned. A session the catalog granted
    /// but that could not be written to storage counts as a failure.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UserNotFound`] if no catalog user has that exact
    ///   username.
    /// - [`AuthError::InvalidCredentials`] if the credential check is
    ///   rejected.
    /// - [`AuthError::Network`] if the catalog cannot be reached.
    /// - [`AuthError::Storage`] if the session cannot be persisted.
    pub async fn login(
        &mut self,
        catalog: &CatalogClient,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let result = match authenticate(catalog, username, password).await {
            Ok(session) => {
                self.session = Some(session);
                self.error = None;
                self.persist().map_err(AuthError::from)
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                if let Some(user) = self.user() {
                    tracing::info!(user_id = user.id, %username, "signed in");
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%username, error = %err, "sign in failed");
                self.session = None;
                self.error = Some(err.to_string());
                if let Err(persist_err) = self.persist() {
                    tracing::error!(error = %persist_err, "could not persist failed sign in");
                }
                Err(err)
            }
        }
    }

    /// Clears the session and any recorded error.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the cleared state cannot be persisted.
    pub fn logout(&mut self) -> Result<(), StateError> {
        self.session = None;
        self.error = None;
        tracing::info!("signed out");
        self.persist()
    }

    /// Replaces the profile held by the current session and clears the
    /// recorded error. Ignored when signed out, since there is no token to
    /// attach the profile to.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the session cannot be persisted.
    pub fn set_user(&mut self, user: User) -> Result<(), StateError> {
        let Some(session) = self.session.as_mut() else {
            tracing::warn!(user_id = user.id, "set_user called while signed out, ignoring");
            return Ok(());
        };
        session.user = user;
        self.error = None;
        self.persist()
    }

    /// # Errors
    ///
    /// Returns a [`StateError`] if the cleared state cannot be persisted.
    pub fn clear_error(&mut self) -> Result<(), StateError> {
        if self.error.take().is_none() {
            return Ok(());
        }
        self.persist()
    }

    fn persist(&self) -> Result<(), StateError> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            session: Option<&'a Session>,
            error: Option<&'a str>,
        }
        save_json(
            self.storage.as_ref(),
            AUTH_KEY,
            &Borrowed {
                session: self.session.as_ref(),
                error: self.error.as_deref(),
            },
        )
    }
}

async fn authenticate(
    catalog: &CatalogClient,
    username: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let users = catalog.list_users().await.map_err(AuthError::from_lookup)?;
    let account = users
        .iter()
        .find(|account| account.username == username)
        .ok_or(AuthError::UserNotFound)?;

    let token = catalog
        .login(username, password)
        .await
        .map_err(AuthError::from_credential_check)?;

    Ok(Session::new(account.to_user(), token))
}
