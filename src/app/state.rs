use mongodb::{Client, Collection, Database, bson::Document};

use crate::config::Config;

/// One open connection and the handles the sequence works on.
pub struct Session {
    pub client: Client,
    pub database: Database,
    pub books: Collection<Document>,
}

impl Session {
    pub fn new(client: Client, config: &Config) -> Self {
        let database = client.database(&config.db_name);
        let books = database.collection::<Document>(&config.collection);
        Self { client, database, books }
    }

    pub fn collection_name(&self) -> &str {
        self.books.name()
    }
}
