//! Credential lifecycle: types, storage, encryption, and refresh management.

pub mod encryption;
mod manager;
mod memory;
mod storage;
mod tokens;

pub use manager::Manager;
pub use memory::EncryptedMemoryStorage;
pub use storage::Storage;
pub use tokens::{Credential, RefreshResult, Tokens, EXPIRY_MARGIN_MINUTES};
