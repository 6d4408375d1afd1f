use std::{future::Future, time::Duration};

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Client, Collection, Database,
};
use tracing::{debug, info};

use super::{RecordStore, StoreError, StoreResult};

/// MongoDB-backed store. One client per process; the driver pools
/// connections internally.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
    timeout: Duration,
}

impl MongoStore {
    /// Connect and ping the server. Both steps are bounded by `timeout`.
    pub async fn connect(uri: &str, database: &str, timeout: Duration) -> StoreResult<Self> {
        let client = bounded(timeout, Client::with_uri_str(uri)).await?;
        let db = client.database(database);

        bounded(timeout, async { db.run_command(doc! { "ping": 1 }).await }).await?;
        info!("Connected to MongoDB database {database}");

        Ok(Self {
            client,
            db,
            timeout,
        })
    }

    /// Shut the driver down. Call once the server has stopped serving.
    pub async fn close(&self) {
        info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

async fn bounded<T, F>(timeout: Duration, op: F) -> StoreResult<T>
where
    F: Future<Output = mongodb::error::Result<T>>,
{
    match tokio::time::timeout(timeout, op).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StoreError::Timeout(timeout)),
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> StoreResult<ObjectId> {
        let result = bounded(self.timeout, async {
            self.collection(collection).insert_one(doc).await
        })
        .await?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::Unexpected(format!(
                "inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })
    }

    async fn find_one(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        bounded(self.timeout, async {
            self.collection(collection)
                .find_one(doc! { "_id": id })
                .await
        })
        .await
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        // the timeout covers the whole scan, cursor batches included
        let docs = bounded(self.timeout, async {
            let mut cursor = self.collection(collection).find(doc! {}).await?;
            let mut results = Vec::new();
            while let Some(doc) = cursor.try_next().await? {
                results.push(doc);
            }
            Ok(results)
        })
        .await?;

        debug!("{collection}: scanned {} documents", docs.len());
        Ok(docs)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        id: ObjectId,
        set: Document,
    ) -> StoreResult<Option<Document>> {
        bounded(self.timeout, async {
            self.collection(collection)
                .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
                .return_document(ReturnDocument::After)
                .await
        })
        .await
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> StoreResult<u64> {
        let result = bounded(self.timeout, async {
            self.collection(collection)
                .delete_one(doc! { "_id": id })
                .await
        })
        .await?;

        Ok(result.deleted_count)
    }
}
