// Library exports for the snakesight bot
// This allows the replay tool and the test suites to use the core logic

pub mod bot;
pub mod cluster;
pub mod config;
pub mod perception;
pub mod planner;
pub mod replay;
pub mod sampler;
pub mod sim;
pub mod tick_logger;
pub mod types;
