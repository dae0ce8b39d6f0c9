use mongodb::{Collection, bson::Document};

use crate::mongo::cursor_engine;

pub async fn aggregate(
    collection: &Collection<Document>,
    pipeline: Vec<Document>,
) -> mongodb::error::Result<Vec<Document>> {
    let cursor = collection.aggregate(pipeline, None).await?;
    cursor_engine::drain(cursor).await
}
