// Tick logging: one JSONL line per tick with the observation and the chosen
// move, for offline replay and debugging. The control loop is single-
// threaded, so writes are plain buffered file IO; a write failure is logged
// and never interrupts the tick.

use log::error;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};

use crate::types::{Cell, Direction, Observation};

/// A single tick log entry.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TickLogEntry {
    pub tick: u64,
    pub score: u32,
    pub head: Cell,
    pub body: Vec<Cell>,
    pub food: Option<Cell>,
    pub chosen_move: Option<String>,
    pub timestamp: String,
}

pub struct TickLogger {
    file: Option<BufWriter<std::fs::File>>,
    enabled: bool,
}

impl TickLogger {
    /// Creates a new tick logger. If enabled, initializes the log file
    /// (truncating if it exists); on failure the logger degrades to a no-op.
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Tick logging enabled: {}", log_file_path);
                TickLogger {
                    file: Some(BufWriter::new(file)),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create tick log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled tick logger (no-op)
    pub fn disabled() -> Self {
        TickLogger {
            file: None,
            enabled: false,
        }
    }

    /// Logs one tick's observation and decision.
    pub fn log_tick(
        &mut self,
        tick: u64,
        score: u32,
        observation: &Observation,
        chosen_move: Option<Direction>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = TickLogEntry {
            tick,
            score,
            head: observation.head,
            body: observation.body.clone(),
            food: observation.food,
            chosen_move: chosen_move.map(|d| d.as_str().to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if let Some(file) = self.file.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    if let Err(e) = writeln!(file, "{}", json_line) {
                        error!("Failed to write tick log entry: {}", e);
                    } else if let Err(e) = file.flush() {
                        error!("Failed to flush tick log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize tick log entry: {}", e);
                }
            }
        }
    }
}
