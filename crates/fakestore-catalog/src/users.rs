//! User and credential endpoints for the catalog client.

use fakestore_core::{NewUser, UserAccount, UserUpdate};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::CatalogClient;
use crate::error::CatalogError;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Body of `PUT /users/{id}`: the id plus whichever fields are changing.
#[derive(Serialize)]
struct UpdateRequest<'a> {
    id: i64,
    #[serde(flatten)]
    update: &'a UserUpdate,
}

/// Fields the catalog echoes back from an update. Anything absent is left
/// alone when merged.
#[derive(Debug, Default, Deserialize)]
struct UpdateEcho {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    name: Option<fakestore_core::PersonName>,
    #[serde(default)]
    phone: Option<String>,
}

impl From<UpdateEcho> for UserUpdate {
    fn from(echo: UpdateEcho) -> Self {
        Self {
            username: echo.username,
            email: echo.email,
            password: echo.password,
            name: echo.name,
            phone: echo.phone,
        }
    }
}

impl CatalogClient {
    /// Fetches every user account.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Rejected`] / [`CatalogError::NotFound`] on non-2xx.
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::Deserialize`] if the body is not a user array.
    pub async fn list_users(&self) -> Result<Vec<UserAccount>, CatalogError> {
        let url = self.endpoint("users")?;
        self.get_json(&url, "Failed to fetch users").await
    }

    /// Fetches a single user account.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::list_users`]; unknown ids yield
    /// [`CatalogError::NotFound`].
    pub async fn get_user(&self, id: i64) -> Result<UserAccount, CatalogError> {
        let url = self.endpoint(&format!("users/{id}"))?;
        self.get_json(&url, "Failed to fetch user").await
    }

    /// Registers a new account and returns the stored record.
    ///
    /// The demo catalog sometimes answers with only `{"id": n}`; the returned
    /// record is then completed from `new_user`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Rejected`] with the server message or
    ///   `"Failed to create user"`.
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::Malformed`] if the reply carries no id.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<UserAccount, CatalogError> {
        let url = self.endpoint("users")?;
        let body: serde_json::Value = self
            .send_json(Method::POST, &url, new_user, "Failed to create user")
            .await?;

        if let Ok(account) = serde_json::from_value::<UserAccount>(body.clone()) {
            return Ok(account);
        }

        let id = body
            .get("id")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| CatalogError::Malformed {
                context: "create_user".to_owned(),
                reason: "response has no id".to_owned(),
            })?;

        Ok(UserAccount {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password: Some(new_user.password.clone()),
            name: Some(new_user.name.clone()),
            address: Some(new_user.address.clone()),
            phone: Some(new_user.phone.clone()),
        })
    }

    /// Applies a partial update and returns the fields the server echoed.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Rejected`] with the server message or
    ///   `"Failed to update user"`.
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::Deserialize`] if the echo is not a JSON object.
    pub async fn update_user(
        &self,
        id: i64,
        update: &UserUpdate,
    ) -> Result<UserUpdate, CatalogError> {
        let url = self.endpoint(&format!("users/{id}"))?;
        let echo: UpdateEcho = self
            .send_json(
                Method::PUT,
                &url,
                &UpdateRequest { id, update },
                "Failed to update user",
            )
            .await?;
        Ok(echo.into())
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Rejected`] with the server message or
    ///   `"Failed to delete user"`.
    /// - [`CatalogError::Http`] on network failure.
    pub async fn delete_user(&self, id: i64) -> Result<(), CatalogError> {
        let url = self.endpoint(&format!("users/{id}"))?;
        self.send_empty(Method::DELETE, &url, "Failed to delete user")
            .await
    }

    /// Checks credentials and returns the issued token.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Rejected`] with the server message or
    ///   `"Invalid credentials"` when the credentials are refused.
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::Malformed`] if the reply carries no token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, CatalogError> {
        let url = self.endpoint("auth/login")?;
        let response: LoginResponse = self
            .send_json(
                Method::POST,
                &url,
                &LoginRequest { username, password },
                "Invalid credentials",
            )
            .await?;

        response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CatalogError::Malformed {
                context: "login".to_owned(),
                reason: "response has no token".to_owned(),
            })
    }
}
