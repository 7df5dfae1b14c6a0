pub mod repository;
pub mod storage;
pub mod store;

pub use repository::SessionRepository;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::SessionStore;
