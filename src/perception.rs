// Perception: reconstructs the snake and the food from the sampled metric
// grid. This is where all the ambiguity lives — anti-aliased pixels, fading
// tail segments, clusters merging when the snake closes on the food — so
// every stage is anchored to the only ground truth available: temporal
// continuity with the previous tick and the score-implied expected length.

use log::debug;
use std::collections::HashSet;

use crate::cluster::build_clusters;
use crate::config::Config;
use crate::types::{Cell, CellMetric, Cluster, Direction, Observation, PerceptionFailure};

/// Cross-tick context the perception stage reconciles against.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerceptionContext<'a> {
    /// Body observed (or extrapolated) on the previous tick, head first.
    pub prev_body: Option<&'a [Cell]>,
    /// Head position from the previous tick.
    pub prev_head: Option<Cell>,
    /// Where the last dispatched command should have moved the head.
    pub predicted_head: Option<Cell>,
}

/// Runs the full perception pipeline over one tick's metric grid.
pub fn perceive(
    metrics: &[CellMetric],
    expected_len: usize,
    ctx: &PerceptionContext,
    config: &Config,
) -> Result<Observation, PerceptionFailure> {
    let grid = config.grid.size;
    let clusters = build_clusters(metrics, grid);
    if clusters.is_empty() {
        return Err(PerceptionFailure::NoBrightCells);
    }

    let snake_idx =
        identify_snake(&clusters, ctx.prev_body, grid).ok_or(PerceptionFailure::NoSnakeCluster)?;

    let (refined, members) = refine_cluster(&clusters[snake_idx], metrics, expected_len, config);
    debug!(
        "perception: cluster {} of {} ({} cells, {} after refine, expected {})",
        snake_idx,
        clusters.len(),
        clusters[snake_idx].len(),
        refined.len(),
        expected_len
    );

    let body = walk_body(&refined, &members, expected_len, ctx, config)?;
    let food = locate_food(&clusters, snake_idx, metrics, grid);

    Ok(Observation {
        head: body[0],
        tail: *body.last().unwrap(),
        body,
        food,
    })
}

/// Picks the cluster that is the snake.
///
/// With a previous body known, clusters are scored by cell overlap against
/// it and the maximum wins; an equal-overlap tie resolves to the first
/// cluster in traversal order (a documented tie-break, not true
/// disambiguation — distinct clusters rarely tie in practice). Without one
/// (first tick, post-reset), the cluster containing the spawn cell at the
/// board center wins, then the largest cluster.
pub fn identify_snake(
    clusters: &[Cluster],
    prev_body: Option<&[Cell]>,
    grid: usize,
) -> Option<usize> {
    if clusters.is_empty() {
        return None;
    }

    if let Some(prev) = prev_body {
        let prev_keys: HashSet<Cell> = prev.iter().copied().collect();
        let mut best = 0;
        let mut best_overlap = 0;
        for (i, cluster) in clusters.iter().enumerate() {
            let overlap = cluster.cells.iter().filter(|c| prev_keys.contains(c)).count();
            if overlap > best_overlap {
                best = i;
                best_overlap = overlap;
            }
        }
        return Some(best);
    }

    let center = Cell::center(grid);
    if let Some(i) = clusters.iter().position(|c| c.contains(&center)) {
        return Some(i);
    }

    clusters
        .iter()
        .enumerate()
        .max_by_key(|(_, c)| c.len())
        .map(|(i, _)| i)
}

/// Refine phase: discards faint compression/anti-aliasing artifacts that
/// would inflate the detected body past its true length, while never
/// dropping more cells than the expected length allows.
fn refine_cluster(
    cluster: &Cluster,
    metrics: &[CellMetric],
    expected_len: usize,
    config: &Config,
) -> (Vec<Cell>, HashSet<Cell>) {
    let grid = config.grid.size;
    let mut ranked: Vec<(Cell, f32)> = cluster
        .cells
        .iter()
        .map(|c| (*c, metrics[c.index(grid)].value))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let keep_cap = (expected_len + config.reconstruction.refine_extra_keep)
        .max(cluster.len().min(expected_len * 2));
    ranked.truncate(keep_cap);

    // Dynamic cutoff: the brighter of the fixed floor and the brightness at
    // the expected-length rank.
    let mut cutoff = config.reconstruction.brightness_floor;
    if expected_len >= 1 && expected_len - 1 < ranked.len() {
        cutoff = cutoff.max(ranked[expected_len - 1].1);
    }

    let mut cells = Vec::new();
    let mut members = HashSet::new();
    for (rank, (cell, value)) in ranked.iter().enumerate() {
        if *value > cutoff || rank < expected_len {
            cells.push(*cell);
            members.insert(*cell);
        }
    }

    (cells, members)
}

/// Head selection priority over the refined cluster.
fn pick_head(
    cells: &[Cell],
    members: &HashSet<Cell>,
    ctx: &PerceptionContext,
    grid: usize,
) -> Cell {
    // 1. The predicted head, when it is still a member.
    if let Some(predicted) = ctx.predicted_head {
        if members.contains(&predicted) {
            return predicted;
        }
    }

    // 2. A member one step from the previous head (and not the previous
    //    head itself): the snake advanced exactly one cell.
    if let Some(prev) = ctx.prev_head {
        if let Some(cell) = cells
            .iter()
            .find(|c| c.manhattan_to(&prev) == 1 && **c != prev)
        {
            return *cell;
        }
    }

    let endpoints: Vec<Cell> = cells
        .iter()
        .filter(|c| {
            let neighbors = Direction::all()
                .iter()
                .filter(|d| members.contains(&d.apply(c)))
                .count();
            neighbors <= 1
        })
        .copied()
        .collect();

    // 3. A unique endpoint is the head (the tail faded or the snake is
    //    straight out of spawn).
    if endpoints.len() == 1 {
        return endpoints[0];
    }

    let reference = ctx.prev_head.unwrap_or_else(|| Cell::center(grid));

    // 4./5. Multiple endpoints (or none, on degenerate shapes): closest to
    //       the previous head, or to the spawn center absent that.
    if !endpoints.is_empty() {
        return *endpoints
            .iter()
            .min_by_key(|c| c.manhattan_to(&reference))
            .unwrap();
    }

    *cells
        .iter()
        .min_by_key(|c| c.manhattan_to(&reference))
        .unwrap()
}

/// Walk phase: orders the refined cluster into a head-to-tail body and
/// reconciles its length against the expected length.
fn walk_body(
    cells: &[Cell],
    members: &HashSet<Cell>,
    expected_len: usize,
    ctx: &PerceptionContext,
    config: &Config,
) -> Result<Vec<Cell>, PerceptionFailure> {
    if cells.is_empty() {
        return Err(PerceptionFailure::NoSnakeCluster);
    }

    let head = pick_head(cells, members, ctx, config.grid.size);
    let guard = cells.len() + config.reconstruction.walk_guard_slack;

    let mut body = vec![head];
    let mut visited: HashSet<Cell> = HashSet::new();
    visited.insert(head);

    loop {
        let current = *body.last().unwrap();
        let next = Direction::all()
            .iter()
            .map(|d| d.apply(&current))
            .find(|n| members.contains(n) && !visited.contains(n));

        match next {
            Some(cell) => {
                body.push(cell);
                visited.insert(cell);
            }
            None => break,
        }

        // Degenerate cluster shapes (a loop) defeat single-path walking.
        if body.len() > guard {
            return Err(PerceptionFailure::WalkLoop {
                steps: body.len(),
                cluster_size: cells.len(),
            });
        }
    }

    body.truncate(expected_len);

    // A temporarily-undetected tail (rendering fade) is compensated from the
    // previous tick's known body. When the head advanced one cell, current
    // index i lines up with previous index i - 1.
    if body.len() < expected_len {
        if let Some(prev) = ctx.prev_body {
            let advanced = ctx.prev_head.map_or(true, |p| body[0] != p);
            let mut idx = if advanced {
                body.len().saturating_sub(1)
            } else {
                body.len()
            };
            while body.len() < expected_len && idx < prev.len() {
                let cell = prev[idx];
                if !body.contains(&cell) {
                    body.push(cell);
                }
                idx += 1;
            }
        }
    }

    if body.len() < expected_len {
        return Err(PerceptionFailure::ShortBody {
            got: body.len(),
            expected: expected_len,
        });
    }

    Ok(body)
}

/// Picks the food cell among the clusters the snake does not own: the
/// cluster with the highest mean brightness (ties to the smaller cluster,
/// preferring the single-cell food blob over a larger residual blob), then
/// its single brightest cell.
pub fn locate_food(
    clusters: &[Cluster],
    snake_idx: usize,
    metrics: &[CellMetric],
    grid: usize,
) -> Option<Cell> {
    let mut best: Option<(usize, f32)> = None;
    for (i, cluster) in clusters.iter().enumerate() {
        if i == snake_idx || cluster.is_empty() {
            continue;
        }
        let mean = cluster
            .cells
            .iter()
            .map(|c| metrics[c.index(grid)].value)
            .sum::<f32>()
            / cluster.len() as f32;

        let better = match best {
            None => true,
            Some((best_i, best_mean)) => {
                mean > best_mean
                    || (mean == best_mean && cluster.len() < clusters[best_i].len())
            }
        };
        if better {
            best = Some((i, mean));
        }
    }

    let (food_idx, _) = best?;
    clusters[food_idx]
        .cells
        .iter()
        .max_by(|a, b| {
            metrics[a.index(grid)]
                .value
                .partial_cmp(&metrics[b.index(grid)].value)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .copied()
}
