use mongodb::bson::{self, Document};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// A record type served as a REST collection.
///
/// Everything the generic handlers need to know about a collection lives
/// here: where it is stored, where it is routed, and which fields an update
/// is allowed to overwrite.
pub trait Resource:
    Serialize + DeserializeOwned + Validate + Default + Send + Sync + 'static
{
    /// Human readable name used in confirmation and not-found messages.
    const NAME: &'static str;
    const COLLECTION: &'static str;
    /// Path of the single-record routes, `{id}` is appended.
    const ITEM_PATH: &'static str;
    /// Path of the list route.
    const LIST_PATH: &'static str;
    /// Fields written by an update. Anything else in the body is validated
    /// but never persisted.
    const EDITABLE: &'static [&'static str];

    /// `$set` payload for an update, restricted to [`Resource::EDITABLE`].
    fn update_document(&self) -> Result<Document, bson::ser::Error> {
        let mut full = bson::to_document(self)?;
        let mut set = Document::new();
        for &field in Self::EDITABLE {
            if let Some(value) = full.remove(field) {
                set.insert(field, value);
            }
        }
        Ok(set)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Category {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

impl Resource for Category {
    const NAME: &'static str = "Category";
    const COLLECTION: &'static str = "categorys";
    const ITEM_PATH: &'static str = "/category";
    const LIST_PATH: &'static str = "/categorys";
    const EDITABLE: &'static [&'static str] = &["name"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MenuItem {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    // free text, not checked against the categorys collection
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "price is required"))]
    pub price: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
}

impl Resource for MenuItem {
    const NAME: &'static str = "Menu";
    const COLLECTION: &'static str = "menus";
    const ITEM_PATH: &'static str = "/menu";
    const LIST_PATH: &'static str = "/menus";
    const EDITABLE: &'static [&'static str] = &["name", "price", "description"];
}

/// A record as it leaves the store: the store-assigned id next to its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<R> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub record: R,
}

impl<R: Resource> Stored<R> {
    /// Decode a raw store document, lifting `_id` out as a hex string.
    pub fn from_document(mut doc: Document) -> Result<Self, bson::de::Error> {
        let id = match doc.remove("_id") {
            Some(bson::Bson::ObjectId(oid)) => Some(oid.to_hex()),
            Some(bson::Bson::String(s)) => Some(s),
            _ => None,
        };
        let record = bson::from_document(doc)?;
        Ok(Self { id, record })
    }

    /// The placeholder returned when an update matched nothing.
    pub fn empty() -> Self {
        Self {
            id: None,
            record: R::default(),
        }
    }
}

/// Flatten validator output into one line, one entry per failing field,
/// sorted so the message is stable.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter()
                .map(|e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: failed {}", e.code),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    lines.sort();
    lines.join("; ")
}
