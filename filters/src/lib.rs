//! Concurrency-safe management of dashboard native filters.
//!
//! A dashboard stores all of its native filters as one JSON array inside the
//! `json_metadata` string field. This crate adds, replaces and removes single
//! filters in that array without losing concurrent edits and without
//! reporting changes that are only formatting.

pub mod client;
pub mod config;
pub mod engine;
pub mod equivalence;
pub mod errors;
pub mod metrics_defs;
pub mod projector;
pub mod resource;
pub mod tree;
pub mod types;

#[cfg(test)]
mod testutils;

pub use client::{DocumentClient, HttpDocumentClient};
pub use engine::{FilterEngine, UpsertLock};
pub use errors::{DecodeError, FilterError, RemoteError};
pub use resource::FilterResource;
pub use types::{DashboardFilter, DashboardId, FilterDefinition, FilterId};

use std::sync::Arc;

/// Builds a resource for `config` that talks HTTP and shares the
/// process-wide upsert lock.
pub fn from_config(config: &config::Config) -> Result<FilterResource, RemoteError> {
    let client = HttpDocumentClient::new(&config.api)?;
    let engine = FilterEngine::new(Arc::new(client), UpsertLock::process_wide())
        .with_deadline(config.upsert.deadline());
    Ok(FilterResource::new(engine))
}
