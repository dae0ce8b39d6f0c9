use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::app::report::{ExportTarget, Reporter};
use crate::app::runner;
use crate::app::state::Session;
use crate::books::{self, Book};
use crate::catalog::{self, Step};
use crate::cli::{PlanArgs, RunArgs, SeedArgs};
use crate::config::{Config, Settings};
use crate::mongo::{client, crud, index};

/// Connects, runs the selected sections, and closes the connection
/// whether or not a step failed.
pub async fn run_sequence(config: &Config, args: RunArgs) -> Result<()> {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id, db = %config.db_name, collection = %config.collection);

    async move {
        info!(started_at = %Utc::now().to_rfc3339(), "starting query sequence");

        let steps = catalog::plan(&config.settings, &args.sections);
        let export = args.export_dir.map(|dir| ExportTarget { dir, format: args.format });
        let mut reporter = Reporter::new(io::stdout().lock(), export);

        let completed = run_with_reporter(config, &steps, &mut reporter).await?;
        info!(steps = completed, "query sequence finished");
        Ok(())
    }
    .instrument(span)
    .await
}

/// Connect, run, close. `Connection closed` is always the last line
/// written, including when the connect itself fails; the first error
/// wins.
pub async fn run_with_reporter<W: Write>(
    config: &Config,
    steps: &[Step],
    reporter: &mut Reporter<W>,
) -> Result<usize> {
    let mut session: Option<Session> = None;

    let outcome: Result<usize> = async {
        let mongo = client::connect(&config.mongo_uri, &config.app_name).await?;
        let session = session.insert(Session::new(mongo, config));
        reporter.line("Connected to MongoDB")?;
        runner::run_plan(session, steps, &mut *reporter).await
    }
    .await;

    if let Err(err) = &outcome {
        error!(error = %format!("{:#}", err), "query sequence aborted");
    }

    if let Some(session) = session {
        client::disconnect(session.client).await;
    }
    let closed = reporter.line("Connection closed");

    let completed = outcome?;
    closed?;
    Ok(completed)
}

pub async fn seed(config: &Config, args: SeedArgs) -> Result<()> {
    let mongo = client::connect(&config.mongo_uri, &config.app_name).await?;
    let session = Session::new(mongo, config);

    let result = insert_sample_books(&session, args.drop).await;

    client::disconnect(session.client).await;

    let inserted = result?;
    let mut out = io::stdout().lock();
    writeln!(out, "Inserted {} books into {}.{}", inserted, config.db_name, config.collection)?;
    Ok(())
}

pub async fn insert_sample_books(session: &Session, drop_first: bool) -> Result<usize> {
    if drop_first {
        session
            .books
            .drop(None)
            .await
            .with_context(|| format!("Failed to drop collection {}", session.collection_name()))?;
        info!(collection = session.collection_name(), "dropped collection");
    }

    let typed = session.books.clone_with_type::<Book>();
    let catalogue = books::sample_books();
    let result = crud::insert_many(&typed, &catalogue)
        .await
        .context("Failed to insert sample books")?;

    let indexes = index::list_index_names(&session.books)
        .await
        .context("Failed to list indexes")?;
    info!(inserted = result.inserted_ids.len(), ?indexes, "seeded books collection");

    Ok(result.inserted_ids.len())
}

/// Prints the steps without touching the database.
pub fn show_plan<W: Write>(out: &mut W, settings: &Settings, args: &PlanArgs) -> Result<()> {
    let steps = catalog::plan(settings, &args.sections);
    for (i, step) in steps.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. [{}] {} {}",
            i + 1,
            step.section,
            step.operation.kind(),
            step.label
        )?;
    }
    Ok(())
}
