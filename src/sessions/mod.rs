pub mod memory;
pub mod postgres;
pub mod repo;
pub mod token;

pub use memory::MemorySessionStore;
pub use postgres::PgSessionStore;
pub use repo::SessionStore;
pub use token::SessionId;
