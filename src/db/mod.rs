pub mod task_repository;
pub mod user_repository;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode record: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Process-wide handle to the embedded document store. Opened once in
/// `main` and cloned into each repository; `sled::Db` is internally
/// reference-counted so clones share the same store.
#[derive(Clone)]
pub struct Database {
    db: sled::Db,
}

impl Database {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Ok(Database {
            db: sled::open(path)?,
        })
    }

    /// Temporary store for tests, removed when the handle is dropped.
    #[allow(dead_code)]
    pub fn temporary() -> Result<Self, StoreError> {
        Ok(Database {
            db: sled::Config::new().temporary(true).open()?,
        })
    }

    pub(crate) fn tree(&self, name: &str) -> Result<sled::Tree, StoreError> {
        Ok(self.db.open_tree(name)?)
    }
}
