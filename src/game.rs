use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::{
    adapter::GameAdapter,
    config::GameConfig,
    entity::{AgentId, Bomb, Cheese},
    error::GameError,
    grid::{Coord, Maze},
    policy::Move,
    registry::AgentRegistry,
    runtime::AgentRuntime,
};

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum GameState {
    NotStarted,
    Running,
    Ended,
}

/// What applying a move did to the agent.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum MoveOutcome {
    Moved(Coord),
    /// The requested side is walled off; the target is unchanged.
    Blocked,
    Planted(Coord),
    /// A live bomb already sits on the cell, or the agent has none left.
    PlantDropped,
    Held,
}

/// Owns the maze, the cheese, the bombs and every mouse, and resolves their turns.
///
/// A front end drives it: each tick it reports where every mouse is drawn, and on a confirmed
/// arrival asks for the mouse's next move and applies it.
pub struct Game<A: GameAdapter> {
    config: GameConfig,
    maze: Maze,
    registry: AgentRegistry,
    adapter: A,
    rng: StdRng,
    state: GameState,
    cheese: Option<Cheese>,
    bombs: Vec<Bomb>,
    agents: Vec<AgentRuntime>,
    cheese_taken: u32,
}

impl<A: GameAdapter> Game<A> {
    pub fn new(
        config: GameConfig,
        maze: Maze,
        registry: AgentRegistry,
        adapter: A,
        rng: StdRng,
    ) -> Game<A> {
        Game {
            config,
            maze,
            registry,
            adapter,
            rng,
            state: GameState::NotStarted,
            cheese: None,
            bombs: Vec::new(),
            agents: Vec::new(),
            cheese_taken: 0,
        }
    }

    /// Loads every registered mouse, places the cheese and puts all mice on the origin.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.state != GameState::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        self.adapter.clear_agents();
        self.load_agents();
        self.randomize_cheese();

        for agent in self.agents.iter_mut() {
            agent.set_target(Coord::ORIGIN);
            self.adapter.new_agent(agent);
        }

        self.state = GameState::Running;
        info!(
            agents = self.agents.len(),
            goal = self.config.number_of_cheese,
            width = self.maze.width(),
            height = self.maze.height(),
            "game started"
        );
        self.adapter.start();
        Ok(())
    }

    /// Resolves a mouse drawn at (`field_x`, `field_y`).
    ///
    /// Returns the target cell when the mouse has arrived there, `None` when it is still on
    /// its way, was blown up on arrival, or the report could not be resolved.
    pub fn report(&mut self, id: AgentId, field_x: i32, field_y: i32) -> Option<Coord> {
        if self.state != GameState::Running {
            return None;
        }
        self.resolve_report(id, field_x, field_y)
            .unwrap_or_else(|err| {
                debug!(?id, %err, "report ignored");
                None
            })
    }

    fn resolve_report(
        &mut self,
        id: AgentId,
        field_x: i32,
        field_y: i32,
    ) -> Result<Option<Coord>, GameError> {
        let target = self
            .agents
            .get(id.0)
            .ok_or(GameError::UnknownAgent(id))?
            .target();
        if !self.within_leeway(target, field_x, field_y) {
            return Ok(None);
        }

        if let Some(bomb) = self.bombs.iter_mut().find(|b| b.triggers_for(target, id)) {
            bomb.detonate();
            self.adapter.detonate_bomb(bomb);
            let owner = bomb.owner();

            let landing = self.respawn_point(target);
            let agent = &mut self.agents[id.0];
            agent.set_target(landing);
            self.adapter.reposition_agent(agent, landing);
            agent.respawned();
            info!(agent = agent.name(), ?owner, ?target, ?landing, "bomb detonated");
            return Ok(None);
        }

        let cheese = self.cheese.ok_or(GameError::NotRunning)?;
        if cheese.coord() == target {
            let agent = &mut self.agents[id.0];
            agent.collect_cheese();
            self.cheese_taken += 1;
            info!(
                agent = agent.name(),
                taken = self.cheese_taken,
                goal = self.config.number_of_cheese,
                "cheese taken"
            );

            if self.cheese_taken >= self.config.number_of_cheese {
                self.state = GameState::Ended;
                info!(winner = agent.name(), "goal reached, game over");
                self.adapter.stop();
            } else {
                self.randomize_cheese();
            }
        }

        Ok(Some(target))
    }

    /// Asks the mouse's policy where to go from `cell`.
    pub fn next_move(&mut self, id: AgentId, cell: Coord) -> Result<Move, GameError> {
        self.ensure_running()?;
        let cell = *self.maze.cell(cell).ok_or(GameError::OutsideMaze(cell))?;
        let cheese = self.cheese.ok_or(GameError::NotRunning)?;
        let agent = self
            .agents
            .get_mut(id.0)
            .ok_or(GameError::UnknownAgent(id))?;
        Ok(agent.next_move(&cell, &cheese, &mut self.rng))
    }

    /// Applies a decided move to the mouse's target. On error the move is discarded and the
    /// target left as it was.
    pub fn apply_move(&mut self, id: AgentId, mv: Move) -> Result<MoveOutcome, GameError> {
        self.ensure_running()?;
        let agent = self
            .agents
            .get_mut(id.0)
            .ok_or(GameError::UnknownAgent(id))?;
        let target = agent.target();
        let cell = self
            .maze
            .cell(target)
            .ok_or(GameError::OutsideMaze(target))?;

        match mv {
            Move::Step(direction) => match cell.neighbor(direction) {
                Some(next) => {
                    agent.advance(next);
                    Ok(MoveOutcome::Moved(next))
                }
                None => Ok(MoveOutcome::Blocked),
            },
            Move::PlantBomb => {
                if self.bombs.iter().any(|b| b.is_live_at(target)) {
                    return Ok(MoveOutcome::PlantDropped);
                }
                match agent.make_bomb() {
                    Some(bomb) => {
                        debug!(agent = agent.name(), ?target, "bomb planted");
                        self.adapter.new_bomb(&bomb);
                        self.bombs.push(bomb);
                        Ok(MoveOutcome::Planted(target))
                    }
                    None => Ok(MoveOutcome::PlantDropped),
                }
            }
            Move::Hold => Ok(MoveOutcome::Held),
        }
    }

    /// Replaces the cheese at `coord`, notifying every mouse and the adapter.
    pub fn place_cheese(&mut self, coord: Coord) -> Result<(), GameError> {
        self.ensure_running()?;
        if !self.maze.contains(coord) {
            return Err(GameError::OutsideMaze(coord));
        }
        self.set_cheese(coord);
        Ok(())
    }

    /// Ends the game on the adapter's behalf. The adapter is not notified back.
    pub fn shutdown(&mut self) {
        if self.state == GameState::Running {
            self.state = GameState::Ended;
            info!(taken = self.cheese_taken, "game shut down");
        }
    }

    pub fn grid_left(&self, x: i32) -> i32 {
        x * self.config.cell_size
    }

    /// Row 0 is the bottom row on screen, so the vertical axis is flipped.
    pub fn grid_top(&self, y: i32) -> i32 {
        (self.maze.height() - y - 1) * self.config.cell_size
    }

    pub fn column_at(&self, left: i32) -> i32 {
        left.div_euclid(self.config.cell_size)
    }

    pub fn row_at(&self, top: i32) -> i32 {
        self.maze.height() - 1 - top.div_euclid(self.config.cell_size)
    }

    /// Screen position of a cell's top-left corner.
    pub fn pixel_of(&self, coord: Coord) -> (i32, i32) {
        (self.grid_left(coord.x), self.grid_top(coord.y))
    }

    pub fn within_leeway(&self, target: Coord, field_x: i32, field_y: i32) -> bool {
        let (left, top) = self.pixel_of(target);
        let leeway = self.config.pixels_on_target_leeway.max(0).unsigned_abs();
        field_x.abs_diff(left) <= leeway && field_y.abs_diff(top) <= leeway
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn cheese(&self) -> Option<&Cheese> {
        self.cheese.as_ref()
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn agents(&self) -> &[AgentRuntime] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentRuntime> {
        self.agents.get(id.0)
    }

    pub fn cheese_taken(&self) -> u32 {
        self.cheese_taken
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        match self.state {
            GameState::Running => Ok(()),
            _ => Err(GameError::NotRunning),
        }
    }

    fn load_agents(&mut self) {
        self.agents.clear();
        let bombs = self.config.bomb_allowance();
        for (name, built) in self.registry.instantiate() {
            match built {
                Ok(policy) => {
                    let id = AgentId(self.agents.len());
                    self.agents.push(AgentRuntime::new(id, policy, bombs));
                }
                Err(err) => warn!(agent = name, %err, "failed to load mouse"),
            }
        }
    }

    fn randomize_cheese(&mut self) {
        let coord = self.maze.random_coord(&mut self.rng);
        self.set_cheese(coord);
    }

    fn set_cheese(&mut self, coord: Coord) {
        let cheese = Cheese::new(coord);
        self.cheese = Some(cheese);
        for agent in self.agents.iter_mut() {
            agent.new_cheese();
        }
        self.adapter.new_cheese(&cheese);
    }

    /// A random cell other than `avoid`, unless the maze has no other cell.
    fn respawn_point(&mut self, avoid: Coord) -> Coord {
        loop {
            let coord = self.maze.random_coord(&mut self.rng);
            if coord != avoid || self.maze.len() <= 1 {
                return coord;
            }
        }
    }
}
