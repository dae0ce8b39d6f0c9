use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use mongodb::bson::Document;
use serde_json::Value;
use tracing::info;

use crate::utils::export::{self, ExportFormat};
use crate::utils::json::bson_to_json;

/// What a step produced, reduced to the part worth printing.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Documents(Vec<Document>),
    Modified(u64),
    Deleted(u64),
    IndexCreated(String),
    Explain(Document),
}

impl StepOutcome {
    pub fn summary(&self) -> String {
        match self {
            StepOutcome::Documents(docs) => format!("{} document(s)", docs.len()),
            StepOutcome::Modified(n) => format!("{} modified", n),
            StepOutcome::Deleted(n) => format!("{} deleted", n),
            StepOutcome::IndexCreated(name) => format!("index {}", name),
            StepOutcome::Explain(_) => "execution stats".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExportTarget {
    pub dir: PathBuf,
    pub format: ExportFormat,
}

/// Writes labelled step results, the way the console sees them.
pub struct Reporter<W: Write> {
    out: W,
    export: Option<ExportTarget>,
    step_number: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, export: Option<ExportTarget>) -> Self {
        Self {
            out,
            export,
            step_number: 0,
        }
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text).context("Failed to write to output")
    }

    pub async fn step(&mut self, label: &str, outcome: &StepOutcome) -> Result<()> {
        self.step_number += 1;

        let rendered = render(outcome)?;
        writeln!(self.out, "{} {}", label, rendered).context("Failed to write to output")?;

        if let (Some(target), StepOutcome::Documents(docs)) = (&self.export, outcome) {
            let values: Vec<Value> = docs.iter().cloned().map(bson_to_json).collect();
            let path = export::write_export(&target.dir, self.step_number, label, &values, target.format)
                .await
                .with_context(|| format!("Failed to export results of {}", label))?;
            info!(path = %path.display(), "exported step results");
        }

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn render(outcome: &StepOutcome) -> Result<String> {
    let rendered = match outcome {
        StepOutcome::Documents(docs) => {
            let values: Vec<Value> = docs.iter().cloned().map(bson_to_json).collect();
            export::to_json(&values, true)?
        }
        StepOutcome::Modified(n) | StepOutcome::Deleted(n) => n.to_string(),
        StepOutcome::IndexCreated(name) => name.clone(),
        StepOutcome::Explain(stats) => {
            serde_json::to_string_pretty(&bson_to_json(stats.clone()))?
        }
    };
    Ok(rendered)
}
