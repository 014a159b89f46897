//! Pure max-plus frontier relaxation (§4.E step 3/4).
//!
//! Kept free of storage so the Bellman-style relaxation can be unit
//! tested against a synthetic edge list instead of a live graph.

use std::collections::HashMap;

use crate::memory::NodeRef;

/// Propose next-hop activations from one active node's outgoing edges.
/// `edges` is expected to already be the top strongest edges (the
/// per-node cap is a `Storage::get_outgoing` contract, not this
/// function's concern). Proposals at or below `threshold` are dropped.
pub fn propose_from_node(
    source_activation: f32,
    edges: &[(NodeRef, f32)],
    decay_per_hop: f32,
    threshold: f32,
) -> Vec<(NodeRef, f32)> {
    edges
        .iter()
        .filter_map(|(target, strength)| {
            let proposed = source_activation * strength * decay_per_hop;
            if proposed > threshold {
                Some((target.clone(), proposed))
            } else {
                None
            }
        })
        .collect()
}

/// Merge proposals into a frontier map, keeping the maximum proposed
/// activation per target — the "max-plus" part of the relaxation.
pub fn merge_max(frontier: &mut HashMap<NodeRef, f32>, proposals: Vec<(NodeRef, f32)>) {
    for (node, value) in proposals {
        frontier
            .entry(node)
            .and_modify(|existing| {
                if value > *existing {
                    *existing = value;
                }
            })
            .or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::NodeKind;

    fn node(id: &str) -> NodeRef {
        NodeRef {
            id: id.to_string(),
            kind: NodeKind::Memory,
        }
    }

    #[test]
    fn proposal_below_threshold_is_dropped() {
        let edges = vec![(node("m"), 0.2)];
        let proposals = propose_from_node(0.5, &edges, 0.5, 0.3);
        // 0.5 * 0.2 * 0.5 = 0.05, not > 0.3
        assert!(proposals.is_empty());
    }

    #[test]
    fn proposal_above_threshold_is_kept() {
        let edges = vec![(node("m"), 0.9)];
        let proposals = propose_from_node(0.8, &edges, 0.5, 0.3);
        // 0.8 * 0.9 * 0.5 = 0.36 > 0.3
        assert_eq!(proposals.len(), 1);
        assert!((proposals[0].1 - 0.36).abs() < 1e-6);
    }

    #[test]
    fn merge_max_keeps_larger_value() {
        let mut frontier = HashMap::new();
        merge_max(&mut frontier, vec![(node("m"), 0.4)]);
        merge_max(&mut frontier, vec![(node("m"), 0.6)]);
        merge_max(&mut frontier, vec![(node("m"), 0.1)]);
        assert_eq!(frontier[&node("m")], 0.6);
    }

    #[test]
    fn decay_strictly_less_than_one_shrinks_each_hop() {
        let edges = vec![(node("m"), 1.0)];
        let hop1 = propose_from_node(1.0, &edges, 0.5, 0.0);
        let hop2 = propose_from_node(hop1[0].1, &edges, 0.5, 0.0);
        assert!(hop2[0].1 < hop1[0].1);
    }
}
