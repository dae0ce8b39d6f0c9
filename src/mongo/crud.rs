use mongodb::{Collection, bson::Document, results::{DeleteResult, InsertManyResult, UpdateResult}};
use serde::Serialize;

pub async fn insert_many<T>(
    collection: &Collection<T>,
    documents: &[T],
) -> mongodb::error::Result<InsertManyResult>
where
    T: Serialize + Send + Sync,
{
    collection.insert_many(documents, None).await
}

pub async fn update_one(
    collection: &Collection<Document>,
    filter: Document,
    update: Document,
) -> mongodb::error::Result<UpdateResult> {
    collection.update_one(filter, update, None).await
}

pub async fn delete_one(
    collection: &Collection<Document>,
    filter: Document,
) -> mongodb::error::Result<DeleteResult> {
    collection.delete_one(filter, None).await
}
