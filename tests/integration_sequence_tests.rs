//! Runs the query sequence against a throwaway MongoDB container.
//! Needs Docker: `cargo test --features test-utils`.
#![cfg(feature = "test-utils")]

use mongodb::bson::{doc, Bson};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mongo::Mongo;

use bookstore_queries::{
    app::{
        commands::{insert_sample_books, run_with_reporter},
        report::{Reporter, StepOutcome},
        runner,
        state::Session,
    },
    catalog::{self, Operation, Section, Step},
    config::{Config, Settings},
    mongo::{client, query::FindSpec},
};

async fn start_session(db_name: &str) -> (ContainerAsync<Mongo>, Session, Config) {
    let container = Mongo::default().start().await.expect("mongo container should start");
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();
    let uri = format!("mongodb://{}:{}", host, port);

    let config = Config::from_lookup(Some(uri), Some(db_name.to_string()), |_| None).unwrap();
    let mongo = client::connect(&config.mongo_uri, &config.app_name).await.unwrap();
    let session = Session::new(mongo, &config);
    insert_sample_books(&session, true).await.unwrap();

    (container, session, config)
}

fn documents(outcome: StepOutcome) -> Vec<mongodb::bson::Document> {
    match outcome {
        StepOutcome::Documents(docs) => docs,
        other => panic!("expected documents, got {:?}", other),
    }
}

#[tokio::test]
async fn crud_section_reads_and_mutates_the_catalogue() {
    let (_container, session, config) = start_session("crud_section").await;
    let steps = catalog::plan(&config.settings, &[Section::Crud]);

    let fiction = documents(runner::execute(&session, &steps[0].operation).await.unwrap());
    assert_eq!(fiction.len(), 4);
    assert!(fiction.iter().all(|b| b.get_str("genre").unwrap() == "Fiction"));

    let after_1950 = documents(runner::execute(&session, &steps[1].operation).await.unwrap());
    assert_eq!(after_1950.len(), 4);

    let orwell = documents(runner::execute(&session, &steps[2].operation).await.unwrap());
    assert_eq!(orwell.len(), 2);

    assert_eq!(
        runner::execute(&session, &steps[3].operation).await.unwrap(),
        StepOutcome::Modified(1)
    );
    assert_eq!(
        runner::execute(&session, &steps[4].operation).await.unwrap(),
        StepOutcome::Deleted(1)
    );
    // Second delete finds nothing left to remove.
    assert_eq!(
        runner::execute(&session, &steps[4].operation).await.unwrap(),
        StepOutcome::Deleted(0)
    );

    let repriced = session.books.find_one(doc! { "title": "1984" }, None).await.unwrap().unwrap();
    assert_eq!(repriced.get_f64("price").unwrap(), 15.99);

    client::disconnect(session.client).await;
}

#[tokio::test]
async fn queries_section_projects_sorts_and_pages() {
    let (_container, session, _config) = start_session("queries_section").await;
    let steps = catalog::plan(&Settings { page_size: 5, page_count: 3 }, &[Section::Queries]);

    let recent = documents(runner::execute(&session, &steps[0].operation).await.unwrap());
    assert!(recent.is_empty());

    let projected = documents(runner::execute(&session, &steps[1].operation).await.unwrap());
    assert_eq!(projected.len(), 12);
    for book in &projected {
        let keys: Vec<&str> = book.keys().map(String::as_str).collect();
        assert!(!keys.contains(&"_id"));
        assert!(keys.iter().all(|k| ["title", "author", "price"].contains(k)));
    }

    let ascending = documents(runner::execute(&session, &steps[2].operation).await.unwrap());
    let prices: Vec<f64> = ascending.iter().map(|b| b.get_f64("price").unwrap()).collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(ascending[0].get_str("title").unwrap(), "Pride and Prejudice");

    let descending = documents(runner::execute(&session, &steps[3].operation).await.unwrap());
    assert_eq!(descending[0].get_str("title").unwrap(), "The Lord of the Rings");

    let page_sizes: Vec<usize> = {
        let mut sizes = Vec::new();
        for step in &steps[4..] {
            sizes.push(documents(runner::execute(&session, &step.operation).await.unwrap()).len());
        }
        sizes
    };
    assert_eq!(page_sizes, vec![5, 5, 2]);

    client::disconnect(session.client).await;
}

#[tokio::test]
async fn aggregation_section_groups_inside_the_server() {
    let (_container, session, config) = start_session("aggregation_section").await;
    let steps = catalog::plan(&config.settings, &[Section::Aggregation]);

    let by_genre = documents(runner::execute(&session, &steps[0].operation).await.unwrap());
    assert_eq!(by_genre.len(), 7);
    let fiction = by_genre
        .iter()
        .find(|d| d.get_str("_id").ok() == Some("Fiction"))
        .unwrap();
    let avg = fiction.get_f64("avgPrice").unwrap();
    assert!((avg - (12.99 + 9.99 + 8.99 + 10.99) / 4.0).abs() < 1e-9);

    let top = documents(runner::execute(&session, &steps[1].operation).await.unwrap());
    assert_eq!(top.len(), 1);
    // Orwell and Tolkien tie at two books each.
    assert_eq!(top[0].get("count"), Some(&Bson::Int32(2)));

    let decades = documents(runner::execute(&session, &steps[2].operation).await.unwrap());
    let first = decades.first().unwrap().get("_id").and_then(Bson::as_f64).unwrap();
    assert_eq!(first, 1810.0);
    let total: i32 = decades.iter().map(|d| d.get_i32("count").unwrap()).sum();
    assert_eq!(total, 12);

    client::disconnect(session.client).await;
}

#[tokio::test]
async fn indexing_section_creates_named_indexes_and_explains() {
    let (_container, session, config) = start_session("indexing_section").await;
    let steps = catalog::plan(&config.settings, &[Section::Indexing]);

    assert_eq!(
        runner::execute(&session, &steps[0].operation).await.unwrap(),
        StepOutcome::IndexCreated("title_1".to_string())
    );
    assert_eq!(
        runner::execute(&session, &steps[1].operation).await.unwrap(),
        StepOutcome::IndexCreated("author_1_published_year_1".to_string())
    );

    assert!(matches!(steps[2].operation, Operation::Explain { .. }));
    match runner::execute(&session, &steps[2].operation).await.unwrap() {
        StepOutcome::Explain(stats) => {
            assert!(stats.get("nReturned").is_some());
            assert!(stats.get("totalDocsExamined").is_some());
        }
        other => panic!("expected explain output, got {:?}", other),
    }

    client::disconnect(session.client).await;
}

#[tokio::test]
async fn full_run_prints_every_label_in_order() {
    let (_container, session, config) = start_session("full_run").await;
    let steps = catalog::plan(&config.settings, &[]);

    let mut reporter = Reporter::new(Vec::new(), None);
    let completed = runner::run_plan(&session, &steps, &mut reporter).await.unwrap();
    assert_eq!(completed, steps.len());

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let mut cursor = 0;
    for step in &steps {
        let found = out[cursor..]
            .find(&step.label)
            .unwrap_or_else(|| panic!("missing or out of order: {}", step.label));
        cursor += found + step.label.len();
    }
    assert!(out.contains("Updated price of \"1984\": 1"));
    assert!(out.contains("Index on title created: title_1"));
    assert!(out.starts_with("Books in genre \"Fiction\": "));
    assert!(!out.contains("==="));

    client::disconnect(session.client).await;
}

fn failing_plan() -> Vec<Step> {
    vec![
        Step {
            section: Section::Crud,
            label: "Books by George Orwell:".to_string(),
            operation: Operation::Find(FindSpec::filter(doc! { "author": "George Orwell" })),
        },
        Step {
            section: Section::Aggregation,
            label: "Broken pipeline:".to_string(),
            operation: Operation::Aggregate(vec![doc! { "$bogus": 1 }]),
        },
        Step {
            section: Section::Indexing,
            label: "Index on title created:".to_string(),
            operation: Operation::CreateIndex(doc! { "title": 1 }),
        },
    ]
}

#[tokio::test]
async fn failing_step_stops_the_plan() {
    let (_container, session, _config) = start_session("failing_step").await;
    let steps = failing_plan();

    let mut reporter = Reporter::new(Vec::new(), None);
    let err = runner::run_plan(&session, &steps, &mut reporter).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to run step Broken pipeline:"));

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(out.starts_with("Books by George Orwell: "));
    assert!(!out.contains("Broken pipeline:"));
    assert!(!out.contains("Index on title created:"));

    // Nothing after the failure touched the server.
    let indexes = session.books.list_index_names().await.unwrap();
    assert_eq!(indexes, vec!["_id_".to_string()]);

    client::disconnect(session.client).await;
}

#[tokio::test]
async fn failing_step_still_closes_the_connection() {
    let (_container, session, config) = start_session("failing_close").await;
    client::disconnect(session.client).await;

    let mut reporter = Reporter::new(Vec::new(), None);
    let err = run_with_reporter(&config, &failing_plan(), &mut reporter).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to run step"));

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(out.starts_with("Connected to MongoDB\n"));
    assert_eq!(out.lines().last(), Some("Connection closed"));
    assert!(!out.contains("Index on title created:"));
}
