// Cluster building: groups adjacent bright cells into 4-connected clusters
// via flood fill. The fill uses an explicit stack rather than recursion so a
// worst-case fully-bright grid cannot overflow the call stack.

use std::collections::HashSet;

use crate::types::{Cell, CellMetric, Cluster, Direction};

/// Partitions all bright cells of the metric grid into maximal 4-connected
/// clusters. Every bright cell lands in exactly one cluster; cell order
/// within a cluster is traversal order.
pub fn build_clusters(metrics: &[CellMetric], grid: usize) -> Vec<Cluster> {
    let mut visited = vec![false; grid * grid];
    let mut clusters = Vec::new();

    for start_idx in 0..grid * grid {
        if visited[start_idx] || !metrics[start_idx].bright {
            continue;
        }

        let start = Cell::new((start_idx % grid) as i32, (start_idx / grid) as i32);
        let mut cells = Vec::new();
        let mut members = HashSet::new();
        let mut stack = vec![start];
        visited[start_idx] = true;

        while let Some(cell) = stack.pop() {
            cells.push(cell);
            members.insert(cell);

            for dir in &Direction::all() {
                let neighbor = dir.apply(&cell);
                if !neighbor.in_bounds(grid) {
                    continue;
                }
                let idx = neighbor.index(grid);
                if !visited[idx] && metrics[idx].bright {
                    visited[idx] = true;
                    stack.push(neighbor);
                }
            }
        }

        clusters.push(Cluster { cells, members });
    }

    clusters
}
