// Path planning: breadth-first search over whole-snake states.
//
// Nodes are full snake configurations (head plus ordered body), not head
// positions, because self-collision depends on the entire shape — the cell a
// tail segment vacates this move is legal to enter, and a growth move keeps
// it occupied. States are deduplicated by a canonical serialization of the
// ordered body so the same spatial shape is never expanded twice.

use log::debug;
use std::collections::{HashSet, VecDeque};

use crate::config::Config;
use crate::types::{Cell, Direction};

/// What the search is steering toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Reach the food; the head standing on the target at depth 0 counts.
    Food,
    /// Chase the current tail position; requires at least one move, since
    /// "reaching" your own tail at zero moves is trivially true and useless.
    Tail,
}

/// One node of the search arena. Ownership is transient, scoped to a single
/// planning call.
struct SearchState {
    body: Vec<Cell>,
    parent: usize,
    move_taken: Option<Direction>,
}

pub struct Planner {
    grid: usize,
    node_cap: usize,
}

impl Planner {
    pub fn new(config: &Config) -> Self {
        Planner {
            grid: config.grid.size,
            node_cap: config.planner.node_cap,
        }
    }

    /// Caller-level planning policy: food-seeking search first, tail-chase
    /// fallback to keep circulating safely when food is unreachable or not
    /// currently perceptible, then a single-step safety heuristic. An empty
    /// plan means every fallback failed and the tick takes no action.
    pub fn plan(&self, body: &[Cell], food: Option<Cell>) -> Vec<Direction> {
        if let Some(target) = food {
            if let Some(path) = self.search(body, target, SearchMode::Food) {
                debug!("planner: food path of {} moves", path.len());
                return path;
            }
        }

        if let Some(tail) = body.last() {
            if let Some(path) = self.search(body, *tail, SearchMode::Tail) {
                debug!("planner: tail-chase path of {} moves", path.len());
                return path;
            }
        }

        match self.safe_turn(body) {
            Some(dir) => {
                debug!("planner: safety fallback {}", dir.as_str());
                vec![dir]
            }
            None => Vec::new(),
        }
    }

    /// BFS from the given body to the target. Returns the move sequence, or
    /// `None` when the node cap is exhausted or no state reaches the target.
    pub fn search(&self, body: &[Cell], target: Cell, mode: SearchMode) -> Option<Vec<Direction>> {
        if body.is_empty() {
            return None;
        }

        if mode == SearchMode::Food && body[0] == target {
            // Already standing on the food.
            return Some(Vec::new());
        }

        let mut arena = vec![SearchState {
            body: body.to_vec(),
            parent: 0,
            move_taken: None,
        }];
        let mut seen: HashSet<Vec<u16>> = HashSet::new();
        seen.insert(self.body_key(body));

        let mut frontier: VecDeque<usize> = VecDeque::new();
        frontier.push_back(0);
        let mut expanded = 0usize;

        while let Some(state_idx) = frontier.pop_front() {
            expanded += 1;
            if expanded > self.node_cap {
                debug!("planner: node cap {} exhausted", self.node_cap);
                return None;
            }

            for dir in &Direction::all() {
                let current = &arena[state_idx].body;
                let head = dir.apply(&current[0]);
                if !head.in_bounds(self.grid) {
                    continue;
                }

                let grows = mode == SearchMode::Food && head == target;

                // The last segment vacates as the snake advances, unless the
                // move grows the snake.
                let check_len = if grows { current.len() } else { current.len() - 1 };
                if current[..check_len].contains(&head) {
                    continue;
                }

                let mut next_body = Vec::with_capacity(current.len() + 1);
                next_body.push(head);
                let keep = if grows { current.len() } else { current.len() - 1 };
                next_body.extend_from_slice(&current[..keep]);

                if head == target {
                    // Tail mode goals found here are at least one move deep
                    // by construction.
                    return Some(self.reconstruct(&arena, state_idx, *dir));
                }

                let key = self.body_key(&next_body);
                if seen.insert(key) {
                    arena.push(SearchState {
                        body: next_body,
                        parent: state_idx,
                        move_taken: Some(*dir),
                    });
                    frontier.push_back(arena.len() - 1);
                }
            }
        }

        None
    }

    /// Last-resort single-step heuristic: prefer directions perpendicular to
    /// the current heading (useful when an imminent wall forces a turn),
    /// never reverse into the neck, and never step off-grid or into the
    /// non-vacating body. Returns the first direction surviving all checks.
    pub fn safe_turn(&self, body: &[Cell]) -> Option<Direction> {
        if body.is_empty() {
            return None;
        }
        let head = body[0];
        let heading = if body.len() > 1 {
            Direction::between(&body[1], &body[0])
        } else {
            None
        };

        let mut candidates: Vec<Direction> = Vec::with_capacity(4);
        if let Some(h) = heading {
            candidates.extend(Direction::all().iter().filter(|d| d.is_perpendicular_to(h)));
            candidates.extend(Direction::all().iter().filter(|d| !d.is_perpendicular_to(h)));
        } else {
            candidates.extend(Direction::all().iter());
        }

        for dir in candidates {
            // Reversing into one's own neck is always fatal.
            if body.len() > 1 && Some(dir) == heading.map(|h| h.opposite()) {
                continue;
            }
            let next = dir.apply(&head);
            if !next.in_bounds(self.grid) {
                continue;
            }
            // The tail cell vacates, so it is excluded from the check.
            if body[..body.len() - 1].contains(&next) {
                continue;
            }
            return Some(dir);
        }

        None
    }

    /// Walks parent pointers from the state preceding the goal back to the
    /// root, then appends the goal move.
    fn reconstruct(&self, arena: &[SearchState], mut idx: usize, last: Direction) -> Vec<Direction> {
        let mut moves = vec![last];
        while let Some(dir) = arena[idx].move_taken {
            moves.push(dir);
            idx = arena[idx].parent;
        }
        moves.reverse();
        moves
    }

    fn body_key(&self, body: &[Cell]) -> Vec<u16> {
        body.iter().map(|c| c.key(self.grid)).collect()
    }
}
