//! Dependency ordering over master-detail relationships.

use std::collections::{BTreeMap, BTreeSet};

use super::ObjectClassification;

/// Order object types so master-detail targets come before dependents.
///
/// A dependent record cannot be created until its master-detail target has
/// been migrated, so targets must sort first. Edges pointing at objects
/// outside the given set (and self-references) are ignored. Ties and cycles
/// are broken by name, so the order is stable for a fixed input set.
pub fn migration_order(classifications: &[ObjectClassification]) -> Vec<String> {
    let names: BTreeSet<&str> = classifications.iter().map(|c| c.object.as_str()).collect();

    // Remaining master-detail targets each object is still waiting on.
    let mut waiting: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for c in classifications {
        let deps: BTreeSet<&str> = c
            .master_detail
            .values()
            .map(String::as_str)
            .filter(|target| names.contains(target) && *target != c.object)
            .collect();
        waiting.insert(c.object.as_str(), deps);
    }

    let mut order = Vec::with_capacity(waiting.len());
    while !waiting.is_empty() {
        let ready: Vec<&str> = waiting
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(name, _)| *name)
            .collect();

        // A cycle leaves nothing ready; release the first name to break it.
        let batch: Vec<&str> = if ready.is_empty() {
            waiting.keys().next().copied().into_iter().collect()
        } else {
            ready
        };

        for name in batch {
            waiting.remove(name);
            for deps in waiting.values_mut() {
                deps.remove(name);
            }
            order.push(name.to_string());
        }
    }

    order
}
