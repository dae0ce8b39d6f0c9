use mongodb::{bson::Document, options::FindOptions, Collection};

use crate::mongo::cursor_engine;

/// Everything a `find` call in the plan can carry besides the collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindSpec {
    pub filter: Document,
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindSpec {
    pub fn filter(filter: Document) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn options(&self) -> FindOptions {
        let mut options = FindOptions::default();
        options.projection = self.projection.clone();
        options.sort = self.sort.clone();
        options.skip = self.skip;
        options.limit = self.limit;
        options
    }
}

pub async fn find_with_options(
    collection: &Collection<Document>,
    spec: &FindSpec,
) -> mongodb::error::Result<Vec<Document>> {
    let cursor = collection
        .find(spec.filter.clone(), spec.options())
        .await?;
    cursor_engine::drain(cursor).await
}
