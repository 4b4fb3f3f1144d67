// The control loop: one tick per host render frame.
//
// Each tick runs perception (or extrapolates through a bad frame),
// reconciles the previously dispatched command against the observed head,
// plans when out of queued moves, and dispatches at most one directional
// command. All cross-tick state lives on this instance and is touched only
// by the tick function; the host drives ticks strictly one at a time.

use log::{error, info, warn};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::perception::{perceive, PerceptionContext};
use crate::planner::Planner;
use crate::sampler;
use crate::tick_logger::TickLogger;
use crate::types::{ActionSink, Cell, Direction, GameSurface, Observation};

pub struct Bot {
    config: Config,
    planner: Planner,
    logger: TickLogger,
    running: bool,
    tick_count: u64,
    // Cross-tick perception state.
    prev_head: Option<Cell>,
    prev_body: Option<Vec<Cell>>,
    prev_food: Option<Cell>,
    // Command reconciliation state.
    predicted_head: Option<Cell>,
    command_pending: bool,
    plan: VecDeque<Direction>,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration. The bot
    /// holds no global state; the bootstrap constructs exactly one and
    /// drives it through `start`/`tick`/`stop`.
    pub fn new(config: Config) -> Self {
        let planner = Planner::new(&config);
        let logger = TickLogger::new(config.debug.enabled, &config.debug.log_file_path);
        Bot {
            config,
            planner,
            logger,
            running: false,
            tick_count: 0,
            prev_head: None,
            prev_body: None,
            prev_food: None,
            predicted_head: None,
            command_pending: false,
            plan: VecDeque::new(),
        }
    }

    /// Polls for the game surface to become available, then marks the loop
    /// running. This is the only place the bot ever blocks.
    pub fn start(&mut self, surface: &dyn GameSurface) -> Result<(), String> {
        let interval = Duration::from_millis(self.config.timing.startup_poll_interval_ms);
        let deadline = Instant::now() + Duration::from_millis(self.config.timing.startup_timeout_ms);

        while !surface.is_ready() {
            if Instant::now() >= deadline {
                return Err(format!(
                    "game surface not ready within {}ms",
                    self.config.timing.startup_timeout_ms
                ));
            }
            std::thread::sleep(interval);
        }

        self.running = true;
        info!("Bot started");
        Ok(())
    }

    /// Stops the loop; the host stops scheduling ticks once this is set.
    pub fn stop(&mut self) {
        self.running = false;
        info!("Bot stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Runs one tick. An error is fail-stop: perception and planning bugs
    /// recur every tick, so the loop halts instead of spinning on them.
    pub fn tick(&mut self, surface: &dyn GameSurface, sink: &mut dyn ActionSink) -> Result<(), String> {
        if !self.running {
            return Ok(());
        }

        match self.tick_inner(surface, sink) {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("Tick {} failed, stopping: {}", self.tick_count, e);
                self.running = false;
                Err(e)
            }
        }
    }

    fn tick_inner(
        &mut self,
        surface: &dyn GameSurface,
        sink: &mut dyn ActionSink,
    ) -> Result<(), String> {
        self.tick_count += 1;

        if surface.is_game_over() || !surface.is_playing() {
            self.reset_game_state();
            return Ok(());
        }

        let score = surface.score()?;
        let expected_len = score as usize + 1;

        let observation = {
            let frame = surface.frame()?;
            let metrics = sampler::sample_grid(&frame, &self.config);
            let ctx = PerceptionContext {
                prev_body: self.prev_body.as_deref(),
                prev_head: self.prev_head,
                predicted_head: self.predicted_head,
            };
            match perceive(&metrics, expected_len, &ctx, &self.config) {
                Ok(obs) => obs,
                Err(failure) => {
                    warn!("Tick {}: perception failed ({}), extrapolating", self.tick_count, failure);
                    match self.extrapolate() {
                        Some(obs) => obs,
                        // Nothing to extrapolate from; skip the tick.
                        None => return Ok(()),
                    }
                }
            }
        };

        self.reconcile(&observation);

        self.prev_head = Some(observation.head);
        self.prev_body = Some(observation.body.clone());
        self.prev_food = observation.food;

        if self.command_pending {
            // The last command has not taken effect yet; dispatching another
            // would desynchronize us from the game's own tick rate.
            return Ok(());
        }

        if self.plan.is_empty() {
            self.plan = self
                .planner
                .plan(&observation.body, observation.food)
                .into_iter()
                .collect();
        }

        let chosen = self.plan.pop_front();
        if let Some(dir) = chosen {
            sink.press(dir);
            self.command_pending = true;
            self.predicted_head = Some(dir.apply(&observation.head));
            info!(
                "Tick {}: {} (head {:?}, score {}, plan {} left)",
                self.tick_count,
                dir.as_str(),
                observation.head,
                score,
                self.plan.len()
            );
        } else {
            warn!("Tick {}: no safe move available", self.tick_count);
        }
        self.logger.log_tick(self.tick_count, score, &observation, chosen);

        Ok(())
    }

    /// Checks the observed head against the predicted one. A match confirms
    /// the in-flight command; a head that moved somewhere else means the
    /// game ticked differently than assumed, so queued moves are worthless
    /// and perception-derived truth takes over.
    fn reconcile(&mut self, observation: &Observation) {
        if let Some(predicted) = self.predicted_head {
            if observation.head == predicted {
                self.command_pending = false;
                self.predicted_head = None;
            } else if Some(observation.head) != self.prev_head {
                info!(
                    "Tick {}: desync (head {:?}, predicted {:?}), discarding plan",
                    self.tick_count, observation.head, predicted
                );
                self.plan.clear();
                self.command_pending = false;
                self.predicted_head = None;
            }
            // Otherwise the head has not moved yet and the command is still
            // in flight.
        }
    }

    /// Synthesizes this tick's observation from the previous tick's state:
    /// the body advances one step toward the predicted head, dropping the
    /// tail unless the predicted head sits on the last seen food.
    fn extrapolate(&self) -> Option<Observation> {
        let prev_body = self.prev_body.as_ref()?;
        if prev_body.is_empty() {
            return None;
        }

        match self.predicted_head {
            Some(predicted) if Some(predicted) != self.prev_head => {
                let grows = self.prev_food == Some(predicted);
                let keep = if grows {
                    prev_body.len()
                } else {
                    prev_body.len() - 1
                };
                let mut body = Vec::with_capacity(keep + 1);
                body.push(predicted);
                body.extend_from_slice(&prev_body[..keep]);

                let food = if grows { None } else { self.prev_food };
                Some(Observation {
                    head: predicted,
                    tail: *body.last().unwrap(),
                    body,
                    food,
                })
            }
            // No command in flight: assume the snake held still.
            _ => Some(Observation {
                head: prev_body[0],
                tail: *prev_body.last().unwrap(),
                body: prev_body.clone(),
                food: self.prev_food,
            }),
        }
    }

    /// Clears per-game state so the next game starts from the spawn
    /// fallback, exactly like the first tick.
    fn reset_game_state(&mut self) {
        self.prev_head = None;
        self.prev_body = None;
        self.prev_food = None;
        self.predicted_head = None;
        self.command_pending = false;
        self.plan.clear();
    }
}
