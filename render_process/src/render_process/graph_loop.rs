/// Cycle witness search over step ordering constraints

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ids::StepId;

/// Find one cycle reachable from `frontier` through `forward` edges
///
/// `forward[a]` holds every step `a` comes before. A breadth-first search is
/// run from each frontier step in turn, recording for each visited step the
/// step it was reached from; when an edge leads back to the origin, that
/// path is the cycle. The chain is returned in forward order, origin first.
/// A step ordered before itself yields a single-element chain.
///
/// `frontier` should be the set of steps left unresolved by wave assembly,
/// every one of which lies on or behind a cycle. If no cycle is reachable
/// the whole frontier is returned.
pub fn detect_graph_loop(
    forward: &BTreeMap<StepId, BTreeSet<StepId>>,
    frontier: &BTreeSet<StepId>,
) -> Vec<StepId> {
    let mut queue = VecDeque::new();
    let mut parent: FxHashMap<StepId, StepId> = FxHashMap::default();
    let mut visited: FxHashSet<StepId> = FxHashSet::default();

    for &origin in frontier {
        queue.clear();
        parent.clear();
        visited.clear();
        queue.push_back(origin);
        visited.insert(origin);

        while let Some(current) = queue.pop_front() {
            let Some(successors) = forward.get(&current) else { continue };
            for &next in successors {
                if next == current && current == origin {
                    return vec![origin];
                }
                if next == origin {
                    let mut chain = vec![current];
                    let mut step = current;
                    while step != origin {
                        step = parent[&step];
                        chain.push(step);
                    }
                    chain.reverse();
                    return chain;
                }
                if visited.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
    }

    frontier.iter().copied().collect()
}
