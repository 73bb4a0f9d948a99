use crate::grid::Coord;

/// Index of an agent in the game roster.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

/// The collectible. Replaced wholesale on every pickup.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Cheese {
    coord: Coord,
}

impl Cheese {
    pub fn new(coord: Coord) -> Cheese {
        Cheese { coord }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bomb {
    coord: Coord,
    owner: AgentId,
    detonated: bool,
}

impl Bomb {
    pub fn new(coord: Coord, owner: AgentId) -> Bomb {
        Bomb {
            coord,
            owner,
            detonated: false,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn owner(&self) -> AgentId {
        self.owner
    }

    pub fn has_detonated(&self) -> bool {
        self.detonated
    }

    pub fn is_live_at(&self, coord: Coord) -> bool {
        !self.detonated && self.coord == coord
    }

    /// Whether `agent` stepping on `coord` sets this bomb off.
    pub fn triggers_for(&self, coord: Coord, agent: AgentId) -> bool {
        self.is_live_at(coord) && self.owner != agent
    }

    pub(crate) fn detonate(&mut self) {
        self.detonated = true;
    }
}
