//! User administration against the remote catalog.
//!
//! Unlike the cart and session, this state is never persisted; it is a cache
//! of what the catalog last returned.

use fakestore_catalog::{CatalogClient, CatalogError};
use fakestore_core::{NewUser, UserAccount, UserUpdate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("{0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: Vec<UserAccount>,
    current_user: Option<UserAccount>,
    error: Option<String>,
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn users(&self) -> &[UserAccount] {
        &self.users
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&UserAccount> {
        self.current_user.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the cached list with the catalog's. Failures are recorded in
    /// [`UserStore::error`] and leave the list unchanged.
    pub async fn fetch_users(&mut self, catalog: &CatalogClient) {
        self.error = None;
        match catalog.list_users().await {
            Ok(users) => {
                tracing::debug!(count = users.len(), "users loaded");
                self.users = users;
            }
            Err(e) => self.record(&e),
        }
    }

    /// Loads one account into [`UserStore::current_user`]. Failures are
    /// recorded in [`UserStore::error`].
    pub async fn fetch_user(&mut self, catalog: &CatalogClient, id: i64) {
        self.error = None;
        match catalog.get_user(id).await {
            Ok(user) => self.current_user = Some(user),
            Err(e) => self.record(&e),
        }
    }

    /// Registers a new account and appends it to the cached list.
    ///
    /// # Errors
    ///
    /// Returns [`UserStoreError::UsernameTaken`] if the catalog already has an
    /// account with that username, or [`UserStoreError::Catalog`] if either
    /// request fails. The message is also recorded in [`UserStore::error`].
    pub async fn create_user(
        &mut self,
        catalog: &CatalogClient,
        new_user: &NewUser,
    ) -> Result<UserAccount, UserStoreError> {
        self.error = None;
        let result = register(catalog, new_user).await;
        match result {
            Ok(account) => {
                tracing::info!(user_id = account.id, username = %account.username, "user created");
                self.users.push(account.clone());
                Ok(account)
            }
            Err(e) => {
                self.record(&e);
                Err(e)
            }
        }
    }

    /// Sends the fields present in `update` and merges the catalog's echo
    /// into the cached list and the current user.
    ///
    /// # Errors
    ///
    /// Returns [`UserStoreError::Catalog`] if the request fails. The message
    /// is also recorded in [`UserStore::error`].
    pub async fn update_user(
        &mut self,
        catalog: &CatalogClient,
        id: i64,
        update: &UserUpdate,
    ) -> Result<(), UserStoreError> {
        self.error = None;
        let echo = match catalog.update_user(id, update).await {
            Ok(echo) => echo,
            Err(e) => {
                let e = UserStoreError::from(e);
                self.record(&e);
                return Err(e);
            }
        };

        for account in self.users.iter_mut().filter(|account| account.id == id) {
            account.apply(&echo);
        }
        if let Some(current) = self.current_user.as_mut().filter(|u| u.id == id) {
            current.apply(&echo);
        }
        tracing::info!(user_id = id, "user updated");
        Ok(())
    }

    /// Deletes the account and drops it from the cached state.
    ///
    /// # Errors
    ///
    /// Returns [`UserStoreError::Catalog`] if the request fails. The message
    /// is also recorded in [`UserStore::error`].
    pub async fn delete_user(
        &mut self,
        catalog: &CatalogClient,
        id: i64,
    ) -> Result<(), UserStoreError> {
        self.error = None;
        if let Err(e) = catalog.delete_user(id).await {
            let e = UserStoreError::from(e);
            self.record(&e);
            return Err(e);
        }

        self.users.retain(|account| account.id != id);
        if self.current_user.as_ref().is_some_and(|u| u.id == id) {
            self.current_user = None;
        }
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    pub fn set_current_user(&mut self, user: Option<UserAccount>) {
        self.current_user = user;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn record(&mut self, err: &dyn std::fmt::Display) {
        tracing::warn!(error = %err, "user request failed");
        self.error = Some(err.to_string());
    }
}

async fn register(
    catalog: &CatalogClient,
    new_user: &NewUser,
) -> Result<UserAccount, UserStoreError> {
    let existing = catalog.list_users().await?;
    if existing
        .iter()
        .any(|account| account.username == new_user.username)
    {
        return Err(UserStoreError::UsernameTaken);
    }
    Ok(catalog.create_user(new_user).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i64, username: &str) -> UserAccount {
        UserAccount {
            id,
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password: None,
            name: None,
            address: None,
            phone: None,
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = UserStore::new();
        assert!(store.users().is_empty());
        assert!(store.current_user().is_none());
        assert!(store.error().is_none());
    }

    #[test]
    fn set_current_user_and_clear() {
        let mut store = UserStore::new();
        store.set_current_user(Some(account(4, "kevinryan")));
        assert_eq!(store.current_user().map(|u| u.id), Some(4));
        store.set_current_user(None);
        assert!(store.current_user().is_none());
    }

    #[test]
    fn clear_error_resets_message() {
        let mut store = UserStore::new();
        store.record(&UserStoreError::UsernameTaken);
        assert_eq!(store.error(), Some("Username already exists"));
        store.clear_error();
        assert!(store.error().is_none());
    }
}
