//! The fixed sequence of bookstore operations.
//!
//! Every step is plain data: a label to print and the filter, update,
//! pipeline or index keys to hand to the driver. Nothing here talks to
//! the database, so the whole sequence can be inspected (`plan`) and
//! tested without a server.

use std::fmt;

use clap::ValueEnum;
use mongodb::bson::{doc, Document};

use crate::config::Settings;
use crate::mongo::query::FindSpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Section {
    /// Finds by genre, year and author; one update; one delete.
    Crud,
    /// Compound filters, projection, sorting and pagination.
    Queries,
    /// Group/sort/limit pipelines.
    Aggregation,
    /// Index creation and an explained find.
    Indexing,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Crud,
        Section::Queries,
        Section::Aggregation,
        Section::Indexing,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Crud => "crud",
            Section::Queries => "queries",
            Section::Aggregation => "aggregation",
            Section::Indexing => "indexing",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Find(FindSpec),
    UpdateOne { filter: Document, update: Document },
    DeleteOne { filter: Document },
    Aggregate(Vec<Document>),
    CreateIndex(Document),
    Explain { filter: Document },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Find(_) => "find",
            Operation::UpdateOne { .. } => "updateOne",
            Operation::DeleteOne { .. } => "deleteOne",
            Operation::Aggregate(_) => "aggregate",
            Operation::CreateIndex(_) => "createIndex",
            Operation::Explain { .. } => "explain",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub section: Section,
    pub label: String,
    pub operation: Operation,
}

impl Step {
    fn new(section: Section, label: impl Into<String>, operation: Operation) -> Self {
        Self {
            section,
            label: label.into(),
            operation,
        }
    }
}

/// Picks the sections to run. An empty selection means all of them.
/// Output keeps canonical order and drops duplicates.
pub fn select_sections(requested: &[Section]) -> Vec<Section> {
    if requested.is_empty() {
        return Section::ALL.to_vec();
    }
    Section::ALL
        .into_iter()
        .filter(|section| requested.contains(section))
        .collect()
}

pub fn plan(settings: &Settings, sections: &[Section]) -> Vec<Step> {
    select_sections(sections)
        .into_iter()
        .flat_map(|section| match section {
            Section::Crud => crud_steps(),
            Section::Queries => query_steps(settings),
            Section::Aggregation => aggregation_steps(),
            Section::Indexing => indexing_steps(),
        })
        .collect()
}

fn crud_steps() -> Vec<Step> {
    let s = Section::Crud;
    vec![
        Step::new(
            s,
            r#"Books in genre "Fiction":"#,
            Operation::Find(FindSpec::filter(doc! { "genre": "Fiction" })),
        ),
        Step::new(
            s,
            "Books published after 1950:",
            Operation::Find(FindSpec::filter(doc! { "published_year": { "$gt": 1950 } })),
        ),
        Step::new(
            s,
            "Books by George Orwell:",
            Operation::Find(FindSpec::filter(doc! { "author": "George Orwell" })),
        ),
        Step::new(
            s,
            r#"Updated price of "1984":"#,
            Operation::UpdateOne {
                filter: doc! { "title": "1984" },
                update: doc! { "$set": { "price": 15.99 } },
            },
        ),
        Step::new(
            s,
            r#"Deleted "The Hobbit":"#,
            Operation::DeleteOne {
                filter: doc! { "title": "The Hobbit" },
            },
        ),
    ]
}

fn query_steps(settings: &Settings) -> Vec<Step> {
    let s = Section::Queries;
    let mut steps = vec![
        Step::new(
            s,
            "In-stock books published after 2010:",
            Operation::Find(FindSpec::filter(doc! {
                "in_stock": true,
                "published_year": { "$gt": 2010 },
            })),
        ),
        Step::new(
            s,
            "Projection (title, author, price):",
            Operation::Find(FindSpec {
                projection: Some(doc! { "title": 1, "author": 1, "price": 1, "_id": 0 }),
                ..FindSpec::default()
            }),
        ),
        Step::new(
            s,
            "Books sorted by price (ascending):",
            Operation::Find(FindSpec {
                projection: Some(doc! { "title": 1, "price": 1, "_id": 0 }),
                sort: Some(doc! { "price": 1 }),
                ..FindSpec::default()
            }),
        ),
        Step::new(
            s,
            "Books sorted by price (descending):",
            Operation::Find(FindSpec {
                projection: Some(doc! { "title": 1, "price": 1, "_id": 0 }),
                sort: Some(doc! { "price": -1 }),
                ..FindSpec::default()
            }),
        ),
    ];

    steps.extend((1..=settings.page_count).map(|page| {
        Step::new(
            s,
            format!("Page {} of books:", page),
            Operation::Find(page_spec(page, settings.page_size)),
        )
    }));
    steps
}

/// Pages are 1-based: page 1 skips nothing.
pub fn page_spec(page: u64, page_size: u64) -> FindSpec {
    FindSpec {
        projection: Some(doc! { "title": 1, "author": 1, "_id": 0 }),
        skip: Some(page.saturating_sub(1).saturating_mul(page_size)),
        limit: Some(i64::try_from(page_size).unwrap_or(i64::MAX)),
        ..FindSpec::default()
    }
}

fn aggregation_steps() -> Vec<Step> {
    let s = Section::Aggregation;
    vec![
        Step::new(
            s,
            "Average price by genre:",
            Operation::Aggregate(vec![
                doc! { "$group": { "_id": "$genre", "avgPrice": { "$avg": "$price" } } },
            ]),
        ),
        Step::new(
            s,
            "Author with most books:",
            Operation::Aggregate(vec![
                doc! { "$group": { "_id": "$author", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1 } },
                doc! { "$limit": 1 },
            ]),
        ),
        Step::new(
            s,
            "Books grouped by decade:",
            Operation::Aggregate(vec![
                doc! {
                    "$group": {
                        "_id": { "$multiply": [ { "$floor": { "$divide": ["$published_year", 10] } }, 10 ] },
                        "count": { "$sum": 1 },
                    }
                },
                doc! { "$sort": { "_id": 1 } },
            ]),
        ),
    ]
}

fn indexing_steps() -> Vec<Step> {
    let s = Section::Indexing;
    vec![
        Step::new(
            s,
            "Index on title created:",
            Operation::CreateIndex(doc! { "title": 1 }),
        ),
        Step::new(
            s,
            "Compound index on author + published_year created:",
            Operation::CreateIndex(doc! { "author": 1, "published_year": 1 }),
        ),
        Step::new(
            s,
            "Explain query with index:",
            Operation::Explain {
                filter: doc! { "title": "1984" },
            },
        ),
    ]
}
