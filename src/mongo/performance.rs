use mongodb::{Database, bson::{doc, Document}};
use tracing::warn;

pub const EXPLAIN_VERBOSITY: &str = "executionStats";

/// Runs `explain` for a find and hands back its `executionStats` section.
/// Servers that leave the section out get their whole reply returned.
pub async fn explain_find(
    database: &Database,
    coll_name: &str,
    filter: Document,
) -> mongodb::error::Result<Document> {
    let reply = database.run_command(
        doc! {
            "explain": {
                "find": coll_name,
                "filter": filter
            },
            "verbosity": EXPLAIN_VERBOSITY
        },
        None,
    ).await?;

    Ok(execution_stats(reply))
}

fn execution_stats(mut reply: Document) -> Document {
    match reply.remove(EXPLAIN_VERBOSITY) {
        Some(mongodb::bson::Bson::Document(stats)) => stats,
        _ => {
            warn!("explain reply has no executionStats; returning the full reply");
            reply
        }
    }
}
