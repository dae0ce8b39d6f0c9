use mongodb::bson::{Bson, Document};
use serde_json::Value;

/// Convert BSON Document → JSON Value (relaxed Extended JSON, so ObjectIds
/// and dates stay readable instead of collapsing to strings).
pub fn bson_to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}
