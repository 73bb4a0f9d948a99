use tracing::{trace, warn};

use crate::{
    adapter::GameAdapter,
    entity::AgentId,
    error::GameError,
    game::{Game, GameState},
};

/// On-screen position of a mouse, in pixels.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Sprite {
    pub x: i32,
    pub y: i32,
}

/// Drives a game the way a front end would: every tick each sprite slides toward its mouse's
/// target cell and reports its position; arrivals fetch and apply the next move.
pub struct Simulation<A: GameAdapter> {
    game: Game<A>,
    sprites: Vec<Sprite>,
    ticks: u64,
}

impl<A: GameAdapter> Simulation<A> {
    pub fn new(game: Game<A>) -> Self {
        Simulation {
            game,
            sprites: Vec::new(),
            ticks: 0,
        }
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        self.game.start()?;
        self.sprites = self
            .game
            .agents()
            .iter()
            .map(|agent| {
                let (x, y) = self.game.pixel_of(agent.target());
                Sprite { x, y }
            })
            .collect();
        Ok(())
    }

    /// Advances every mouse by one tick. Returns false once the game is no longer running.
    pub fn tick(&mut self) -> bool {
        if self.game.state() != GameState::Running {
            return false;
        }
        self.ticks += 1;
        let speed = self.game.config().sprite_speed;

        for index in 0..self.sprites.len() {
            let id = AgentId(index);
            let Some(target) = self.game.agent(id).map(|a| a.target()) else {
                continue;
            };
            let (goal_x, goal_y) = self.game.pixel_of(target);
            let sprite = &mut self.sprites[index];
            sprite.x = approach(sprite.x, goal_x, speed);
            sprite.y = approach(sprite.y, goal_y, speed);
            let (x, y) = (sprite.x, sprite.y);

            match self.game.report(id, x, y) {
                Some(cell) => {
                    let outcome = self
                        .game
                        .next_move(id, cell)
                        .and_then(|mv| self.game.apply_move(id, mv));
                    match outcome {
                        Ok(outcome) => trace!(?id, ?cell, ?outcome, "move applied"),
                        Err(err) => warn!(?id, %err, "move discarded"),
                    }
                }
                None => {
                    // A target that changed during the report means the mouse was blown up.
                    let landing = self.game.agent(id).map(|a| a.target());
                    if let Some(landing) = landing.filter(|l| *l != target) {
                        let (x, y) = self.game.pixel_of(landing);
                        self.sprites[index] = Sprite { x, y };
                    }
                }
            }

            if self.game.state() != GameState::Running {
                return false;
            }
        }
        true
    }

    /// Ticks until the game ends or `max_ticks` have run, returning the final state.
    pub fn run_until_end(&mut self, max_ticks: u64) -> GameState {
        let mut remaining = max_ticks;
        while remaining > 0 && self.tick() {
            remaining -= 1;
        }
        self.game.state()
    }

    pub fn game(&self) -> &Game<A> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game<A> {
        &mut self.game
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn approach(from: i32, to: i32, speed: i32) -> i32 {
    from + (to - from).clamp(-speed, speed)
}
