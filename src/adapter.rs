use crate::{
    entity::{AgentId, Bomb, Cheese},
    grid::Coord,
    runtime::AgentRuntime,
};

/// Receives lifecycle events from the game. The game is the only caller.
pub trait GameAdapter {
    fn clear_agents(&mut self);
    fn new_agent(&mut self, agent: &AgentRuntime);
    fn start(&mut self);
    fn stop(&mut self);
    fn new_cheese(&mut self, cheese: &Cheese);
    fn new_bomb(&mut self, bomb: &Bomb);
    fn detonate_bomb(&mut self, bomb: &Bomb);
    fn reposition_agent(&mut self, agent: &AgentRuntime, cell: Coord);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    AgentsCleared,
    NewAgent { id: AgentId, name: String },
    Started,
    Stopped,
    NewCheese(Coord),
    NewBomb { coord: Coord, owner: AgentId },
    Detonated { coord: Coord, owner: AgentId },
    Repositioned { id: AgentId, cell: Coord },
}

/// Adapter that records every event in order.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }

    /// Events recorded since `mark`, an earlier `len()`.
    pub fn since(&self, mark: usize) -> &[GameEvent] {
        &self.events[mark.min(self.events.len())..]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl GameAdapter for EventLog {
    fn clear_agents(&mut self) {
        self.events.push(GameEvent::AgentsCleared);
    }

    fn new_agent(&mut self, agent: &AgentRuntime) {
        self.events.push(GameEvent::NewAgent {
            id: agent.id(),
            name: agent.name().to_string(),
        });
    }

    fn start(&mut self) {
        self.events.push(GameEvent::Started);
    }

    fn stop(&mut self) {
        self.events.push(GameEvent::Stopped);
    }

    fn new_cheese(&mut self, cheese: &Cheese) {
        self.events.push(GameEvent::NewCheese(cheese.coord()));
    }

    fn new_bomb(&mut self, bomb: &Bomb) {
        self.events.push(GameEvent::NewBomb {
            coord: bomb.coord(),
            owner: bomb.owner(),
        });
    }

    fn detonate_bomb(&mut self, bomb: &Bomb) {
        self.events.push(GameEvent::Detonated {
            coord: bomb.coord(),
            owner: bomb.owner(),
        });
    }

    fn reposition_agent(&mut self, agent: &AgentRuntime, cell: Coord) {
        self.events.push(GameEvent::Repositioned {
            id: agent.id(),
            cell,
        });
    }
}
