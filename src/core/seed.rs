//! Demo data bundled into the binary

use rust_embed::Embed;
use thiserror::Error;

use crate::core::entity::Record;
use crate::core::store::{EntityStore, KeyValueBackend, StoreError};
use crate::entities::{Client, WorkOrder};

#[derive(Embed)]
#[folder = "seed/"]
struct EmbeddedSeed;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed file not found: {0}")]
    NotFound(String),

    #[error("seed file {file} is invalid: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a seeding run wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub clients: usize,
    pub work_orders: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        self.clients == 0 && self.work_orders == 0
    }
}

fn embedded<R: Record>() -> Result<Vec<R>, SeedError> {
    let file = format!("{}.json", R::KEY);
    let content = EmbeddedSeed::get(&file).ok_or_else(|| SeedError::NotFound(file.clone()))?;
    serde_json::from_slice(&content.data).map_err(|source| SeedError::Parse { file, source })
}

/// Write `R`'s demo collection unless the store already holds that key
fn seed_collection<R: Record, B: KeyValueBackend>(
    store: &mut EntityStore<B>,
) -> Result<usize, SeedError> {
    if store.contains(R::KEY) {
        tracing::debug!(key = R::KEY, "seed skipped, key present");
        return Ok(0);
    }
    let records: Vec<R> = embedded()?;
    store.save(&records)?;
    Ok(records.len())
}

/// Load the demo clients and work orders into an empty store
pub fn seed_demo_data<B: KeyValueBackend>(store: &mut EntityStore<B>) -> Result<SeedSummary, SeedError> {
    let summary = SeedSummary {
        clients: seed_collection::<Client, B>(store)?,
        work_orders: seed_collection::<WorkOrder, B>(store)?,
    };
    tracing::info!(clients = summary.clients, work_orders = summary.work_orders, "seeded demo data");
    Ok(summary)
}
