//! Parsing of execution payloads returned by the job runner.
//!
//! The runner does not use one shape everywhere: a just-created execution and
//! a listed execution put their identifier in different places, and listings
//! come either bare or wrapped. Each known shape is tried in priority order
//! and the first structured match wins.

use serde::Deserialize;
use serde_json::{Map, Value};

use concierge_core::ExecutionId;

/// Where an execution identifier may live, in priority order.
#[derive(Debug, Clone, Copy)]
enum IdLocation {
    TopLevel(&'static str),
    Metadata(&'static str),
}

const ID_LOCATIONS: [IdLocation; 6] = [
    IdLocation::TopLevel("execution_id"),
    IdLocation::TopLevel("executionId"),
    IdLocation::TopLevel("id"),
    IdLocation::Metadata("execution_id"),
    IdLocation::Metadata("executionId"),
    IdLocation::Metadata("id"),
];

impl IdLocation {
    fn lookup(self, object: &Map<String, Value>) -> Option<String> {
        let value = match self {
            Self::TopLevel(field) => object.get(field),
            Self::Metadata(field) => object
                .get("metadata")
                .and_then(Value::as_object)
                .and_then(|metadata| metadata.get(field)),
        }?;

        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// The latest known state of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSnapshot {
    pub execution_id: ExecutionId,
    /// Raw, provider-specific status. `None` when the payload carried none.
    pub status: Option<String>,
}

impl ExecutionSnapshot {
    /// Parse a single execution object. Returns `None` if no identifier is found.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let execution_id = ID_LOCATIONS
            .iter()
            .find_map(|location| location.lookup(object))?;

        let status = object
            .get("status")
            .and_then(Value::as_str)
            .or_else(|| {
                object
                    .get("metadata")
                    .and_then(|metadata| metadata.get("status"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string);

        Some(Self {
            execution_id: ExecutionId::new(execution_id),
            status,
        })
    }
}

/// Accepted shapes of an execution listing, tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExecutionListing {
    Bare(Vec<Value>),
    Items { items: Vec<Value> },
    Executions { executions: Vec<Value> },
}

impl ExecutionListing {
    /// Parse a listing payload, if it matches any known shape.
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    fn entries(&self) -> &[Value] {
        match self {
            Self::Bare(entries) => entries,
            Self::Items { items } => items,
            Self::Executions { executions } => executions,
        }
    }

    /// Linear scan for the execution with `execution_id`.
    pub fn find(&self, execution_id: &ExecutionId) -> Option<ExecutionSnapshot> {
        self.entries()
            .iter()
            .filter_map(ExecutionSnapshot::from_value)
            .find(|snapshot| &snapshot.execution_id == execution_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_fields_in_priority_order() {
        let snapshot =
            ExecutionSnapshot::from_value(&json!({ "id": "wrong", "execution_id": "E1" }))
                .unwrap();
        assert_eq!(snapshot.execution_id.as_str(), "E1");

        let snapshot =
            ExecutionSnapshot::from_value(&json!({ "executionId": "E2", "status": "RUNNING" }))
                .unwrap();
        assert_eq!(snapshot.execution_id.as_str(), "E2");
        assert_eq!(snapshot.status.as_deref(), Some("RUNNING"));
    }

    #[test]
    fn test_metadata_shape() {
        let snapshot = ExecutionSnapshot::from_value(&json!({
            "metadata": { "id": "E3", "status": "SUCCEEDED" }
        }))
        .unwrap();
        assert_eq!(snapshot.execution_id.as_str(), "E3");
        assert_eq!(snapshot.status.as_deref(), Some("SUCCEEDED"));
    }

    #[test]
    fn test_no_identifier() {
        assert!(ExecutionSnapshot::from_value(&json!({ "status": "RUNNING" })).is_none());
        assert!(ExecutionSnapshot::from_value(&json!({ "id": "" })).is_none());
        assert!(ExecutionSnapshot::from_value(&json!(["E1"])).is_none());
    }

    #[test]
    fn test_listing_shapes() {
        let target = ExecutionId::new("E1");
        let entry = json!({ "id": "E1", "status": "DONE" });

        for payload in [
            json!([{ "id": "E0" }, entry.clone()]),
            json!({ "items": [entry.clone()] }),
            json!({ "executions": [entry.clone()] }),
        ] {
            let listing = ExecutionListing::from_value(payload).unwrap();
            let found = listing.find(&target).unwrap();
            assert_eq!(found.status.as_deref(), Some("DONE"));
        }
    }

    #[test]
    fn test_listing_miss_and_unknown_shape() {
        let listing = ExecutionListing::from_value(json!([{ "id": "E0" }])).unwrap();
        assert!(listing.find(&ExecutionId::new("E1")).is_none());

        assert!(ExecutionListing::from_value(json!({ "data": [] })).is_none());
    }
}
