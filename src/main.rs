use log::{error, info};
use std::env;

use snakesight::bot::Bot;
use snakesight::config::Config;
use snakesight::sim::SimSurface;
use snakesight::types::GameSurface;

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment
    // variable is set, we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    info!("Starting snakesight...");

    // Load configuration once at startup
    let config = Config::load_or_default();

    let frames: u64 = env::var("SNAKESIGHT_FRAMES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2000);
    let seed: u64 = env::var("SNAKESIGHT_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(42);

    let mut surface = SimSurface::new(&config, seed);
    let mut sink = surface.input_queue();
    let mut bot = Bot::new(config);

    if let Err(e) = bot.start(&surface) {
        error!("Failed to start bot: {}", e);
        return;
    }

    for _ in 0..frames {
        if !bot.is_running() || surface.is_game_over() {
            break;
        }
        if bot.tick(&surface, &mut sink).is_err() {
            break;
        }
        surface.step();
    }

    info!(
        "Finished: score {}, snake length {}, game over: {}",
        surface.current_score(),
        surface.snake_len(),
        surface.is_game_over()
    );
}
