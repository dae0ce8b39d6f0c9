use mongodb::{Cursor, bson::Document};
use futures::TryStreamExt;

/// Pulls every remaining document off the cursor. The first server or
/// decode error ends the drain and is returned as-is.
pub async fn drain(cursor: Cursor<Document>) -> mongodb::error::Result<Vec<Document>> {
    cursor.try_collect().await
}
