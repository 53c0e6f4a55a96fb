pub mod client;
pub mod error;
pub mod products;
pub mod users;

pub use client::CatalogClient;
pub use error::CatalogError;
