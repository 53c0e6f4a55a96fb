use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identity kept in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// A full user record as stored by the remote catalog.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// The demo catalog returns passwords in clear text. Redacted in `Debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PersonName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("name", &self.name)
            .field("address", &self.address)
            .field("phone", &self.phone)
            .finish()
    }
}

impl UserAccount {
    /// The session identity derived from this account.
    #[must_use]
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    /// Overlays the fields present in `update` onto this record.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(username) = &update.username {
            self.username.clone_from(username);
        }
        if let Some(email) = &update.email {
            self.email.clone_from(email);
        }
        if let Some(password) = &update.password {
            self.password = Some(password.clone());
        }
        if let Some(name) = &update.name {
            self.name = Some(name.clone());
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub geolocation: Geolocation,
}

/// Coordinates as the catalog encodes them: decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geolocation {
    pub lat: String,
    pub long: String,
}

/// Payload for registering a new account.
///
/// The demo catalog requires a name, address and phone; [`NewUser::new`]
/// fills them with placeholders derived from the username.
#[derive(Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub name: PersonName,
    pub address: Address,
    pub phone: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("phone", &self.phone)
            .finish()
    }
}

impl NewUser {
    #[must_use]
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            name: PersonName {
                firstname: username.to_string(),
                lastname: "User".to_string(),
            },
            address: Address {
                city: "City".to_string(),
                street: "Street".to_string(),
                number: 1,
                zipcode: "12345".to_string(),
                geolocation: Geolocation {
                    lat: "0".to_string(),
                    long: "0".to_string(),
                },
            },
            phone: "1234567890".to_string(),
        }
    }
}

/// Partial update for an existing account. Absent fields are left unchanged.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<PersonName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("name", &self.name)
            .field("phone", &self.phone)
            .finish()
    }
}

impl UserUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.phone.is_none()
    }
}

/// A locally held login: who is signed in and the token the catalog issued.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(user: User, token: String) -> Self {
        Self {
            user,
            token,
            authenticated_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[redacted]")
            .field("authenticated_at", &self.authenticated_at)
            .finish()
    }
}
