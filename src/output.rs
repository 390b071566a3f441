//! JSON output for graphs and indices.

use crate::types::TsConfigGraph;
use serde::Serialize;

/// Serialize an artifact, with two-space indentation when `pretty`.
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Parse a graph previously written by [`to_json`].
pub fn graph_from_json(text: &str) -> serde_json::Result<TsConfigGraph> {
    serde_json::from_str(text)
}
