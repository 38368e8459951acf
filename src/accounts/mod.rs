pub mod crypto;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repo;

pub use memory::MemoryCredentialStore;
pub use models::Account;
pub use postgres::PgCredentialStore;
pub use repo::{CreateError, CredentialStore};
