use serde::{Deserialize, Serialize};
use std::fmt;

pub type DashboardId = i64;

/// Prefix the dashboarding platform uses for native filter identifiers.
const FILTER_ID_PREFIX: &str = "NATIVE_FILTER-";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(String);

impl FilterId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        FilterId(id.into())
    }

    /// Random v4 UUID under the native filter prefix. Ids are never assigned by
    /// the remote side, so creating callers must draw one of these first.
    pub fn generate() -> Self {
        FilterId(format!("{FILTER_ID_PREFIX}{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterId {
    fn from(id: &str) -> Self {
        FilterId(id.to_string())
    }
}

impl From<String> for FilterId {
    fn from(id: String) -> Self {
        FilterId(id)
    }
}

/// One native filter as stored in a dashboard's `json_metadata`.
///
/// `config` is the serialized filter definition without its `id` key. The id
/// is re-stamped into the definition whenever the collection is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilter {
    pub id: FilterId,
    pub dashboard_id: DashboardId,
    pub name: String,
    pub config: String,
}

/// Desired content of a filter, as supplied by a caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub name: String,
    pub config: String,
}

impl FilterDefinition {
    pub fn new<N, C>(name: N, config: C) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        FilterDefinition {
            name: name.into(),
            config: config.into(),
        }
    }

    pub fn into_filter(self, id: FilterId, dashboard_id: DashboardId) -> DashboardFilter {
        DashboardFilter {
            id,
            dashboard_id,
            name: self.name,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<FilterId> = (0..1000).map(|_| FilterId::generate()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.as_str().starts_with("NATIVE_FILTER-")));
    }

    #[test]
    fn test_filter_id_serializes_as_string() {
        let id = FilterId::from("NATIVE_FILTER-abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""NATIVE_FILTER-abc""#);
    }
}
