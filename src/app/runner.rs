use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info_span, Instrument};

use crate::app::report::{Reporter, StepOutcome};
use crate::app::state::Session;
use crate::catalog::{Operation, Step};
use crate::mongo::{aggregation, crud, index, performance, query};

pub async fn execute(session: &Session, operation: &Operation) -> mongodb::error::Result<StepOutcome> {
    let outcome = match operation {
        Operation::Find(spec) => {
            StepOutcome::Documents(query::find_with_options(&session.books, spec).await?)
        }
        Operation::UpdateOne { filter, update } => {
            let result = crud::update_one(&session.books, filter.clone(), update.clone()).await?;
            debug!(matched = result.matched_count, "updateOne finished");
            StepOutcome::Modified(result.modified_count)
        }
        Operation::DeleteOne { filter } => {
            let result = crud::delete_one(&session.books, filter.clone()).await?;
            StepOutcome::Deleted(result.deleted_count)
        }
        Operation::Aggregate(pipeline) => {
            StepOutcome::Documents(aggregation::aggregate(&session.books, pipeline.clone()).await?)
        }
        Operation::CreateIndex(keys) => {
            StepOutcome::IndexCreated(index::create_index(&session.books, keys.clone()).await?)
        }
        Operation::Explain { filter } => StepOutcome::Explain(
            performance::explain_find(&session.database, session.collection_name(), filter.clone()).await?,
        ),
    };
    Ok(outcome)
}

/// Runs the steps in order and reports each one. Stops at the first
/// failure; earlier results have already been written by then.
pub async fn run_plan<W: Write>(
    session: &Session,
    steps: &[Step],
    reporter: &mut Reporter<W>,
) -> Result<usize> {
    for (i, step) in steps.iter().enumerate() {
        let span = info_span!(
            "step",
            number = i + 1,
            section = %step.section,
            op = step.operation.kind(),
            label = %step.label,
        );

        let started = Instant::now();
        let outcome = execute(session, &step.operation)
            .instrument(span.clone())
            .await
            .with_context(|| format!("Failed to run step {} ({})", step.label, step.operation.kind()))?;

        span.in_scope(|| {
            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                result = %outcome.summary(),
                "step finished"
            );
        });

        reporter.step(&step.label, &outcome).await?;
    }

    Ok(steps.len())
}
