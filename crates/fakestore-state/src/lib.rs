//! Client-side state for the storefront: cart, filter criteria, login
//! session and user administration, plus the local storage they persist to.
//!
//! Stores are plain values owned by the caller. Collaborators (the storage
//! handle, the catalog client) are passed in rather than reached through
//! globals.

pub mod auth;
pub mod cart;
pub mod error;
pub mod filter;
pub mod storage;
pub mod users;

pub use auth::{AuthError, AuthStore};
pub use cart::CartStore;
pub use error::StateError;
pub use filter::{FilterCriteria, FilterStore};
pub use storage::{FileStorage, MemoryStorage, StateStorage};
pub use users::{UserStore, UserStoreError};
