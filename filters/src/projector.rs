//! Moves native filters in and out of a dashboard's `json_metadata`.
//!
//! On the wire every entry of `native_filter_configuration` is a flat object
//! carrying `id`, `name` and the rest of the filter definition inline. The
//! projector strips `id` when extracting, keeping the remaining object as the
//! filter's `config` text, and stamps it back when injecting. Everything in
//! the metadata outside the collection is carried through untouched.

use crate::errors::DecodeError;
use crate::tree::{Tree, display_path};
use crate::types::{DashboardFilter, DashboardId, FilterId};
use serde_json::Value;

pub const FILTER_COLLECTION_PATH: &[&str] = &["native_filter_configuration"];

const ID_KEY: &str = "id";
const NAME_KEY: &str = "name";

/// The filters found in a dashboard, plus the metadata tree they came from.
///
/// `tree` is `None` only when the dashboard had no metadata at all; writing
/// back then starts from an empty object.
#[derive(Debug, Default)]
pub struct Projection {
    pub filters: Vec<DashboardFilter>,
    pub tree: Option<Tree>,
}

/// Parses raw `json_metadata` text and extracts its filters.
///
/// Absent or blank metadata yields an empty projection rather than an error.
pub fn extract_metadata(
    dashboard_id: DashboardId,
    metadata: Option<&str>,
) -> Result<Projection, DecodeError> {
    match metadata.filter(|text| !text.trim().is_empty()) {
        Some(text) => extract(dashboard_id, Tree::parse(text)?),
        None => Ok(Projection::default()),
    }
}

pub fn extract(dashboard_id: DashboardId, tree: Tree) -> Result<Projection, DecodeError> {
    let entries = match tree.get(FILTER_COLLECTION_PATH) {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(_) => {
            return Err(DecodeError::UnexpectedType {
                path: display_path(FILTER_COLLECTION_PATH),
                expected: "array",
            });
        }
    };

    let filters = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| extract_entry(dashboard_id, index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Projection {
        filters,
        tree: Some(tree),
    })
}

fn extract_entry(
    dashboard_id: DashboardId,
    index: usize,
    entry: &Value,
) -> Result<DashboardFilter, DecodeError> {
    let id = required_str(entry, ID_KEY, index)?;
    let name = required_str(entry, NAME_KEY, index)?;

    let mut config = Tree::from_value(entry.clone());
    config.delete(&[ID_KEY]);

    Ok(DashboardFilter {
        id: FilterId::new(id),
        dashboard_id,
        name: name.to_string(),
        config: config.serialize(),
    })
}

fn required_str<'a>(
    entry: &'a Value,
    key: &'static str,
    index: usize,
) -> Result<&'a str, DecodeError> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingKey { key, index })
}

/// Rebuilds `native_filter_configuration` from `filters` on top of `base`.
///
/// The collection is always written as a new array of exactly
/// `filters.len()` entries. A config without a `name` gets the filter's name,
/// so the result can always be extracted again.
pub fn inject(base: Option<Tree>, filters: &[DashboardFilter]) -> Result<Tree, DecodeError> {
    let mut tree = base.unwrap_or_default();
    tree.array_of_size(filters.len(), FILTER_COLLECTION_PATH)?;

    for (index, filter) in filters.iter().enumerate() {
        let mut config = Tree::parse(&filter.config)?;
        config.set(&[ID_KEY], Value::String(filter.id.to_string()))?;
        if config.get(&[NAME_KEY]).is_none() {
            config.set(&[NAME_KEY], Value::String(filter.name.clone()))?;
        }
        tree.set_index(FILTER_COLLECTION_PATH, index, config.into_value())?;
    }

    Ok(tree)
}
