#![forbid(unsafe_code)]

pub mod layout;
pub mod repository;
pub mod sqlite;

pub use layout::PracticeState;
pub use repository::{InMemoryRepository, PracticeStateRepository, Storage, StorageError};
