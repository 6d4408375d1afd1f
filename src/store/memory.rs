use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use super::{RecordStore, StoreResult};

/// In-process store keeping each collection as an insertion-ordered list.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw document straight into a collection, bypassing validation.
    /// Assigns an `_id` when the document has none.
    pub fn seed(&self, collection: &str, mut doc: Document) -> ObjectId {
        let id = match doc.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        };
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        id
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn has_id(doc: &Document, id: &ObjectId) -> bool {
    matches!(doc.get("_id"), Some(Bson::ObjectId(oid)) if oid == id)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_one(&self, collection: &str, mut doc: Document) -> StoreResult<ObjectId> {
        doc.remove("_id");
        Ok(self.seed(collection, doc))
    }

    async fn find_one(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| has_id(doc, &id)).cloned()))
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default())
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        id: ObjectId,
        set: Document,
    ) -> StoreResult<Option<Document>> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(doc) = docs.iter_mut().find(|doc| has_id(doc, &id)) else {
            return Ok(None);
        };
        for (key, value) in set {
            doc.insert(key, value);
        }
        Ok(Some(doc.clone()))
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> StoreResult<u64> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| has_id(doc, &id)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
