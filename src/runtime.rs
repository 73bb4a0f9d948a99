use rand::RngCore;

use crate::{
    entity::{AgentId, Bomb, Cheese},
    grid::{Cell, Coord},
    policy::{DecisionPolicy, Move},
};

/// Session state for one mouse: its policy plus everything the game tracks about it.
pub struct AgentRuntime {
    id: AgentId,
    policy: Box<dyn DecisionPolicy>,
    target: Coord,
    steps: u64,
    explored: u64,
    cheese_taken: u32,
    bombs_left: u32,
}

impl std::fmt::Debug for AgentRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("id", &self.id)
            .field("name", &self.policy.name())
            .field("target", &self.target)
            .field("steps", &self.steps)
            .field("explored", &self.explored)
            .field("cheese_taken", &self.cheese_taken)
            .field("bombs_left", &self.bombs_left)
            .finish()
    }
}

impl AgentRuntime {
    pub fn new(id: AgentId, policy: Box<dyn DecisionPolicy>, bombs: u32) -> AgentRuntime {
        AgentRuntime {
            id,
            policy,
            target: Coord::ORIGIN,
            steps: 0,
            explored: 0,
            cheese_taken: 0,
            bombs_left: bombs,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.policy.name()
    }

    pub fn target(&self) -> Coord {
        self.target
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn explored(&self) -> u64 {
        self.explored
    }

    pub fn cheese_taken(&self) -> u32 {
        self.cheese_taken
    }

    pub fn bombs_left(&self) -> u32 {
        self.bombs_left
    }

    pub fn coverage(&self) -> Option<usize> {
        self.policy.coverage()
    }

    pub(crate) fn set_target(&mut self, target: Coord) {
        self.target = target;
    }

    /// Moves the target one cell; counts as a step only when the target changes.
    pub(crate) fn advance(&mut self, next: Coord) {
        if next != self.target {
            self.target = next;
            self.steps += 1;
        }
    }

    pub(crate) fn next_move(
        &mut self,
        cell: &Cell,
        cheese: &Cheese,
        rng: &mut dyn RngCore,
    ) -> Move {
        let decision = self.policy.decide(cell, cheese, rng);
        if decision.explored {
            self.explored += 1;
        }
        decision.action
    }

    pub(crate) fn collect_cheese(&mut self) {
        self.cheese_taken += 1;
    }

    /// Spends one unit of the allowance on a bomb at the current target.
    pub(crate) fn make_bomb(&mut self) -> Option<Bomb> {
        if self.bombs_left == 0 {
            return None;
        }
        self.bombs_left -= 1;
        Some(Bomb::new(self.target, self.id))
    }

    pub(crate) fn new_cheese(&mut self) {
        self.policy.on_new_cheese();
    }

    pub(crate) fn respawned(&mut self) {
        self.policy.on_respawn();
    }
}
