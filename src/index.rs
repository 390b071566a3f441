//! Reverse lookups derived from a finished graph.

use crate::types::{
    ConfigFileName, FilesToConfigs, ReferencesToConfigs, TsConfigGraph, TsConfigGraphNode,
};
use std::collections::BTreeMap;

/// Build a mapping of files to the tsconfigs that own them.
pub fn map_files(graph: &TsConfigGraph) -> FilesToConfigs {
    invert(graph, |node| &node.files)
}

/// Build a mapping of referenced tsconfigs to the tsconfigs that reference them.
pub fn map_references(graph: &TsConfigGraph) -> ReferencesToConfigs {
    invert(graph, |node| &node.references)
}

/// Append each config under every key it lists, then sort each bucket.
///
/// No dedup pass: a node's own lists are already unique, so a repeated
/// entry can only come from distinct configs.
fn invert<F>(graph: &TsConfigGraph, keys: F) -> BTreeMap<String, Vec<ConfigFileName>>
where
    F: Fn(&TsConfigGraphNode) -> &Vec<String>,
{
    let mut inverted: BTreeMap<String, Vec<ConfigFileName>> = BTreeMap::new();

    for (config_file_name, node) in graph {
        for key in keys(node) {
            inverted
                .entry(key.clone())
                .or_default()
                .push(config_file_name.clone());
        }
    }

    for configs in inverted.values_mut() {
        configs.sort();
    }

    inverted
}
