// Replay module for analyzing historical tick logs and debugging
// decision-making.
//
// This module provides functionality to:
// 1. Parse JSONL tick logs
// 2. Re-run the planner on logged observations
// 3. Compare expected vs actual moves
// 4. Generate analysis reports

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::planner::Planner;
use crate::tick_logger::TickLogEntry;
use crate::types::Direction;

/// Result of replaying a single tick
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub tick: u64,
    pub original_move: Option<Direction>,
    pub replayed_move: Option<Direction>,
    pub matches: bool,
    pub plan_len: usize,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_ticks: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing tick logs
pub struct ReplayEngine {
    planner: Planner,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: &Config, verbose: bool) -> Self {
        ReplayEngine {
            planner: Planner::new(config),
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<TickLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: TickLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Re-runs the planner on a single logged observation and compares the
    /// first move of the fresh plan against the logged one.
    pub fn replay_entry(&self, entry: &TickLogEntry) -> Result<ReplayResult, String> {
        let original_move = match &entry.chosen_move {
            Some(s) => Some(Self::parse_direction(s)?),
            None => None,
        };

        let start_time = Instant::now();
        let plan = self.planner.plan(&entry.body, entry.food);
        let computation_time = start_time.elapsed().as_millis();

        let replayed_move = plan.first().copied();
        let matches = original_move == replayed_move;

        if self.verbose {
            if matches {
                info!(
                    "Tick {}: MATCH - {:?} (plan: {} moves, time: {}ms)",
                    entry.tick,
                    replayed_move.map(|d| d.as_str()),
                    plan.len(),
                    computation_time
                );
            } else {
                warn!(
                    "Tick {}: MISMATCH - Original: {:?}, Replayed: {:?} (plan: {} moves, time: {}ms)",
                    entry.tick,
                    original_move.map(|d| d.as_str()),
                    replayed_move.map(|d| d.as_str()),
                    plan.len(),
                    computation_time
                );
            }
        }

        Ok(ReplayResult {
            tick: entry.tick,
            original_move,
            replayed_move,
            matches,
            plan_len: plan.len(),
            computation_time_ms: computation_time,
        })
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[TickLogEntry]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay tick {}: {}", entry.tick, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_ticks = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_ticks - matches;
        let match_rate = if total_ticks > 0 {
            (matches as f64 / total_ticks as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_ticks,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Ticks:    {}", stats.total_ticks);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            let avg_plan: f64 =
                results.iter().map(|r| r.plan_len as f64).sum::<f64>() / results.len() as f64;

            println!("Average Plan Length:        {:.1}", avg_plan);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Tick {}: {:?} → {:?} (plan: {} moves, time: {}ms)",
                    result.tick,
                    result.original_move.map(|d| d.as_str()),
                    result.replayed_move.map(|d| d.as_str()),
                    result.plan_len,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Helper to parse direction string
    fn parse_direction(s: &str) -> Result<Direction, String> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}
