//! Document store access.
//!
//! Handlers talk to the store only through [`RecordStore`], so the MongoDB
//! backend can be swapped for [`MemoryStore`] in tests or local runs.
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Document};
use thiserror::Error;

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("{0}")]
    Unexpected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The operations the handlers need from a collection-oriented store.
///
/// Every call is attempted once; implementations do not retry.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a document and return the id the store assigned to it.
    async fn insert_one(&self, collection: &str, doc: Document) -> StoreResult<ObjectId>;

    async fn find_one(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>>;

    /// Every document in the collection, in store order.
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Apply `$set` to the document with `id` and return it as it is after
    /// the update, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        collection: &str,
        id: ObjectId,
        set: Document,
    ) -> StoreResult<Option<Document>>;

    /// Delete the document with `id`, returning how many were removed.
    async fn delete_one(&self, collection: &str, id: ObjectId) -> StoreResult<u64>;
}
