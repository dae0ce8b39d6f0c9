use mongodb::{Collection, IndexModel, bson::Document};

/// Creates an index with server-generated defaults and returns its name
/// (`title_1`, `author_1_published_year_1`, ...).
pub async fn create_index(
    collection: &Collection<Document>,
    keys: Document,
) -> mongodb::error::Result<String> {
    let index_model = IndexModel::builder()
        .keys(keys)
        .build();

    let created = collection
        .create_index(index_model, None)
        .await?;

    Ok(created.index_name)
}

pub async fn list_index_names(
    collection: &Collection<Document>,
) -> mongodb::error::Result<Vec<String>> {
    collection.list_index_names().await
}
