// Replay tool: re-runs the planner over a recorded tick log and reports how
// often a fresh plan agrees with the logged decisions.
//
// Usage: replay <log-file.jsonl> [--verbose]

use log::error;
use std::env;
use std::process;

use snakesight::config::Config;
use snakesight::replay::ReplayEngine;

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <log-file.jsonl> [--verbose]", args[0]);
        process::exit(2);
    }
    let log_path = &args[1];
    let verbose = args.iter().any(|a| a == "--verbose");

    let config = Config::load_or_default();
    let engine = ReplayEngine::new(&config, verbose);

    let entries = match engine.load_log_file(log_path) {
        Ok(entries) => entries,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let results = match engine.replay_all(&entries) {
        Ok(results) => results,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    engine.print_report(&results);
}
