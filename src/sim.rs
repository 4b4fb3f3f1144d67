// Simulated game surface: a genuine snake game rendered into an RGBA
// buffer, used by the demo binary and the end-to-end tests. The bot never
// sees any of this state — it reads the pixels, the score and the flags
// through the same `GameSurface` trait a live capture would implement, and
// its input lands in a queue the game consumes one entry per step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::Config;
use crate::types::{ActionSink, Cell, Direction, FrameBuffer, GameSurface};

const BODY_RGB: (u8, u8, u8) = (40, 180, 90);
const HEAD_RGB: (u8, u8, u8) = (70, 220, 120);
// Dimmer than the body so a food cell adjoining the snake is discarded by
// cluster refinement instead of being mistaken for a body segment.
const FOOD_RGB: (u8, u8, u8) = (120, 120, 120);

/// Handle through which the bot injects synthetic directional input.
pub struct InputQueue {
    queue: Rc<RefCell<VecDeque<Direction>>>,
}

impl ActionSink for InputQueue {
    fn press(&mut self, direction: Direction) {
        self.queue.borrow_mut().push_back(direction);
    }
}

pub struct SimSurface {
    config: Config,
    /// Head-first snake body.
    snake: VecDeque<Cell>,
    heading: Direction,
    food: Option<Cell>,
    score: u32,
    game_over: bool,
    pixels: Vec<u8>,
    inputs: Rc<RefCell<VecDeque<Direction>>>,
    rng: StdRng,
}

impl SimSurface {
    /// Spawns the snake at the board center, three segments long, heading
    /// right, with the score matching its length.
    pub fn new(config: &Config, seed: u64) -> Self {
        let center = Cell::center(config.grid.size);
        let snake: VecDeque<Cell> = (0..3)
            .map(|i| Cell::new(center.x - i, center.y))
            .collect();
        let score = snake.len() as u32 - 1;

        let mut sim = SimSurface {
            config: config.clone(),
            snake,
            heading: Direction::Right,
            food: None,
            score,
            game_over: false,
            pixels: Vec::new(),
            inputs: Rc::new(RefCell::new(VecDeque::new())),
            rng: StdRng::seed_from_u64(seed),
        };
        sim.place_food();
        sim.render();
        sim
    }

    /// A sink handle sharing this surface's input queue.
    pub fn input_queue(&self) -> InputQueue {
        InputQueue {
            queue: self.inputs.clone(),
        }
    }

    pub fn snake_len(&self) -> usize {
        self.snake.len()
    }

    pub fn current_score(&self) -> u32 {
        self.score
    }

    /// Advances the game one step: consumes at most one queued input,
    /// moves the snake, handles eating and collisions, re-renders.
    pub fn step(&mut self) {
        if self.game_over {
            return;
        }

        if let Some(input) = self.inputs.borrow_mut().pop_front() {
            // Reversal input is ignored, as snake games do.
            if input != self.heading.opposite() {
                self.heading = input;
            }
        }

        let head = *self.snake.front().unwrap();
        let next = self.heading.apply(&head);

        if !next.in_bounds(self.config.grid.size) {
            self.game_over = true;
            return;
        }

        let eats = self.food == Some(next);
        if !eats {
            self.snake.pop_back();
        }
        if self.snake.contains(&next) {
            self.game_over = true;
            return;
        }
        self.snake.push_front(next);

        if eats {
            self.score += 1;
            self.place_food();
        }

        self.render();
    }

    fn place_food(&mut self) {
        let grid = self.config.grid.size as i32;
        if self.snake.len() >= (grid * grid) as usize {
            self.food = None;
            return;
        }
        loop {
            let candidate = Cell::new(
                self.rng.random_range(0..grid),
                self.rng.random_range(0..grid),
            );
            if !self.snake.contains(&candidate) {
                self.food = Some(candidate);
                return;
            }
        }
    }

    fn render(&mut self) {
        let body: Vec<Cell> = self.snake.iter().copied().collect();
        render_frame(&body, self.food, &self.config, &mut self.pixels);
    }
}

impl GameSurface for SimSurface {
    fn is_ready(&self) -> bool {
        true
    }

    fn is_playing(&self) -> bool {
        !self.game_over
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn score(&self) -> Result<u32, String> {
        Ok(self.score)
    }

    fn frame(&self) -> Result<FrameBuffer<'_>, String> {
        let side = self.config.grid.frame_px();
        if self.pixels.len() != side * side * 4 {
            return Err(format!(
                "frame buffer has {} bytes, expected {}",
                self.pixels.len(),
                side * side * 4
            ));
        }
        Ok(FrameBuffer {
            data: &self.pixels,
            width: side,
            height: side,
        })
    }
}

/// Paints a frame the way the game renders: cell interiors filled, a
/// one-pixel dark grid line left around every cell, the head brighter than
/// the body. Also used by tests to script frames directly.
pub fn render_frame(body: &[Cell], food: Option<Cell>, config: &Config, pixels: &mut Vec<u8>) {
    let side = config.grid.frame_px();
    pixels.clear();
    pixels.resize(side * side * 4, 0);
    // Opaque black background.
    for i in (3..pixels.len()).step_by(4) {
        pixels[i] = 255;
    }

    for (i, cell) in body.iter().enumerate() {
        let rgb = if i == 0 { HEAD_RGB } else { BODY_RGB };
        fill_cell(pixels, side, cell, rgb, config.grid.cell_px);
    }
    if let Some(cell) = food {
        fill_cell(pixels, side, &cell, FOOD_RGB, config.grid.cell_px);
    }
}

fn fill_cell(pixels: &mut [u8], side: usize, cell: &Cell, rgb: (u8, u8, u8), cell_px: usize) {
    let x0 = cell.x as usize * cell_px;
    let y0 = cell.y as usize * cell_px;
    for y in y0 + 1..y0 + cell_px - 1 {
        for x in x0 + 1..x0 + cell_px - 1 {
            let i = (y * side + x) * 4;
            pixels[i] = rgb.0;
            pixels[i + 1] = rgb.1;
            pixels[i + 2] = rgb.2;
            pixels[i + 3] = 255;
        }
    }
}
