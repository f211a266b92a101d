//! Grid-based pathfinding using the A* algorithm.
//!
//! Movement is 4-directional with a uniform step cost of 1 and a
//! Manhattan heuristic. Among open nodes with equal `f`, the one created
//! first is expanded first, so results are deterministic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::grid::{neighbors, Field, Walkable};

/// A search record. Lives for one [`find_path`] call.
#[derive(Debug, Clone, Copy)]
struct Node {
    /// Index of the parent node in the arena.
    parent: Option<usize>,
    x: u32,
    y: u32,
    /// Steps from the start.
    g: u32,
    /// `g` plus the heuristic.
    f: u32,
    /// Linear key `x + y * width`.
    value: usize,
}

impl Node {
    const fn field(&self) -> Field {
        Field::new(self.x, self.y)
    }
}

/// An entry in the open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct OpenEntry {
    f: u32,
    /// Arena index; doubles as the creation order for tie-breaking.
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so we reverse the comparison for min-heap behavior.
        match other.f.cmp(&self.f) {
            // Earlier nodes win ties.
            Ordering::Equal => other.index.cmp(&self.index),
            ord => ord,
        }
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Manhattan distance heuristic (admissible for 4-directional movement).
#[inline]
fn manhattan_heuristic(from: Field, to: Field) -> u32 {
    from.manhattan(to)
}

/// Find a path from `start` to `goal`, both inclusive.
///
/// Returns an empty vector when the goal cannot be reached, when the goal
/// is blocked, or when either endpoint lies outside the map. The start
/// field itself is not checked for walkability. `start == goal` yields a
/// single-element path.
pub fn find_path<M: Walkable + ?Sized>(map: &M, start: Field, goal: Field) -> Vec<Field> {
    if !map.in_bounds(start.x, start.y) || !map.in_bounds(goal.x, goal.y) {
        tracing::debug!(?start, ?goal, "Path endpoint outside map");
        return Vec::new();
    }

    if start == goal {
        return vec![start];
    }

    let path = search(map, start, goal);

    #[cfg(feature = "debug-validation")]
    debug_assert!(
        path.windows(2).all(|w| w[0].is_adjacent(w[1])),
        "A* produced a non-contiguous path"
    );

    tracing::debug!(?start, ?goal, steps = path_length(&path), "Path search finished");
    path
}

fn search<M: Walkable + ?Sized>(map: &M, start: Field, goal: Field) -> Vec<Field> {
    let width = map.width();
    let goal_value = goal.linear_key(width);

    let mut nodes = vec![Node {
        parent: None,
        x: start.x,
        y: start.y,
        g: 0,
        f: manhattan_heuristic(start, goal),
        value: start.linear_key(width),
    }];
    let mut open = BinaryHeap::new();
    let mut visited: HashMap<usize, u32> = HashMap::new();
    let mut closed: HashSet<usize> = HashSet::new();

    open.push(OpenEntry {
        f: nodes[0].f,
        index: 0,
    });
    visited.insert(nodes[0].value, 0);

    while let Some(entry) = open.pop() {
        let current = nodes[entry.index];

        // Superseded by a cheaper entry that was already expanded.
        if closed.contains(&current.value) {
            continue;
        }

        if current.value == goal_value {
            return reconstruct_path(&nodes, entry.index);
        }

        closed.insert(current.value);

        for next in neighbors(map, current.field()) {
            if !map.is_walkable_field(next) {
                continue;
            }

            let value = next.linear_key(width);
            if closed.contains(&value) {
                continue;
            }

            let g = current.g + current.field().manhattan(next);
            if visited.get(&value).is_some_and(|&known| known <= g) {
                continue;
            }
            visited.insert(value, g);

            let f = g + manhattan_heuristic(next, goal);
            nodes.push(Node {
                parent: Some(entry.index),
                x: next.x,
                y: next.y,
                g,
                f,
                value,
            });
            open.push(OpenEntry {
                f,
                index: nodes.len() - 1,
            });
        }
    }

    Vec::new()
}

/// Walk parent links from `index` back to the start.
fn reconstruct_path(nodes: &[Node], index: usize) -> Vec<Field> {
    let mut path = Vec::new();
    let mut current = Some(index);

    while let Some(i) = current {
        path.push(nodes[i].field());
        current = nodes[i].parent;
    }

    path.reverse();
    path
}

/// Number of steps in a path (fields minus one; zero for empty paths).
#[must_use]
pub fn path_length(path: &[Field]) -> usize {
    path.len().saturating_sub(1)
}
