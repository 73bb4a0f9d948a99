use std::collections::{HashMap, HashSet};

use rand::{seq::SliceRandom, Rng, RngCore};
use tracing::info;

use crate::{
    entity::Cheese,
    grid::{Cell, Coord, Direction},
};

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Move {
    Step(Direction),
    PlantBomb,
    Hold,
}

/// What a policy asks for, plus whether the step enters a cell it had not seen this cycle.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Decision {
    pub action: Move,
    pub explored: bool,
}

impl Decision {
    pub fn explore(direction: Direction) -> Decision {
        Decision {
            action: Move::Step(direction),
            explored: true,
        }
    }

    pub fn walk(action: Move) -> Decision {
        Decision {
            action,
            explored: false,
        }
    }
}

/// Per-mouse strategy. `decide` is called once per confirmed arrival and must not panic;
/// inconsistent internal state falls back to wandering.
pub trait DecisionPolicy: Send {
    fn name(&self) -> &str;

    fn decide(&mut self, cell: &Cell, cheese: &Cheese, rng: &mut dyn RngCore) -> Decision;

    /// The cheese moved.
    fn on_new_cheese(&mut self) {}

    /// The mouse hit a bomb and was teleported.
    fn on_respawn(&mut self) {}

    /// Distinct cells seen over the whole game, for policies that keep count.
    fn coverage(&self) -> Option<usize> {
        None
    }
}

/// How unexplored neighbours are ranked.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CandidateOrder {
    /// Uniformly random pick among the unexplored neighbours.
    Unordered,
    /// First unexplored neighbour in clockwise order starting from the left.
    Priority,
}

/// What to do once the trail is empty and nothing new is reachable.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Fallback {
    /// Any cardinal direction, open or not.
    Random,
    /// First open direction out of LEFT, UP, RIGHT, DOWN.
    Rigid,
    /// A random open direction that does not lead straight back, else any open one.
    AvoidReversal,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ResetPolicy {
    pub on_new_cheese: bool,
    pub on_respawn: bool,
}

impl ResetPolicy {
    pub const ALWAYS: ResetPolicy = ResetPolicy {
        on_new_cheese: true,
        on_respawn: true,
    };
}

/// Depth-first maze exploration with backtracking.
///
/// Every visited cell is memoised; each step into an unexplored neighbour is pushed on the
/// trail, and when no unexplored neighbour is left the last step is undone. Once the trail is
/// empty the reachable component has been covered and the explorer falls back to wandering.
#[derive(Debug)]
pub struct Explorer {
    name: String,
    order: CandidateOrder,
    fallback: Fallback,
    depth_limit: Option<usize>,
    resets: ResetPolicy,
    visited: HashMap<Coord, Cell>,
    trail: Vec<Direction>,
    previous: Option<Coord>,
    lifetime: Option<HashSet<Coord>>,
    announced_exhausted: bool,
}

impl Explorer {
    pub fn new(name: impl Into<String>, order: CandidateOrder) -> Explorer {
        Explorer {
            name: name.into(),
            order,
            fallback: Fallback::Random,
            depth_limit: None,
            resets: ResetPolicy::ALWAYS,
            visited: HashMap::new(),
            trail: Vec::new(),
            previous: None,
            lifetime: None,
            announced_exhausted: false,
        }
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Explorer {
        self.fallback = fallback;
        self
    }

    /// Stops taking unexplored branches once the trail holds `limit` steps.
    pub fn with_depth_limit(mut self, limit: usize) -> Explorer {
        self.depth_limit = Some(limit);
        self
    }

    pub fn with_resets(mut self, resets: ResetPolicy) -> Explorer {
        self.resets = resets;
        self
    }

    pub fn tracking_coverage(mut self) -> Explorer {
        self.lifetime = Some(HashSet::new());
        self
    }

    /// Random branch choice, unbounded.
    pub fn scout() -> Explorer {
        Explorer::new("scout", CandidateOrder::Unordered)
    }

    /// Clockwise branch choice with a shallow depth limit. Keeps its memory across respawns.
    pub fn bounded() -> Explorer {
        Explorer::new("bounded", CandidateOrder::Priority)
            .with_depth_limit(10)
            .with_resets(ResetPolicy {
                on_new_cheese: true,
                on_respawn: false,
            })
    }

    pub fn thorough() -> Explorer {
        Explorer::new("thorough", CandidateOrder::Priority)
            .with_depth_limit(200)
            .with_fallback(Fallback::Rigid)
            .tracking_coverage()
    }

    pub fn drifter() -> Explorer {
        Explorer::new("drifter", CandidateOrder::Priority).with_fallback(Fallback::AvoidReversal)
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn has_visited(&self, coord: Coord) -> bool {
        self.visited.contains_key(&coord)
    }

    fn reset(&mut self) {
        self.visited.clear();
        self.trail.clear();
        self.previous = None;
    }

    fn unexplored(&self, cell: &Cell) -> Vec<Direction> {
        if self.depth_limit.is_some_and(|limit| self.trail.len() >= limit) {
            return Vec::new();
        }
        let order = match self.order {
            CandidateOrder::Unordered => Direction::ALL,
            CandidateOrder::Priority => Direction::CLOCKWISE,
        };
        order
            .into_iter()
            .filter(|d| {
                cell.neighbor(*d)
                    .is_some_and(|next| !self.visited.contains_key(&next))
            })
            .collect()
    }

    fn pick(&self, candidates: &[Direction], rng: &mut dyn RngCore) -> Option<Direction> {
        match self.order {
            CandidateOrder::Unordered => candidates.choose(rng).copied(),
            CandidateOrder::Priority => candidates.first().copied(),
        }
    }

    fn wander(&mut self, cell: &Cell, previous: Option<Coord>, rng: &mut dyn RngCore) -> Move {
        if !self.announced_exhausted {
            self.announced_exhausted = true;
            info!(agent = %self.name, cells = self.visited.len(), "explored every reachable cell");
        }

        match self.fallback {
            Fallback::Random => Move::Step(Direction::ALL[rng.gen_range(0..Direction::ALL.len())]),
            Fallback::Rigid => Direction::CLOCKWISE
                .into_iter()
                .find(|d| cell.can_go(*d))
                .map_or(Move::Hold, Move::Step),
            Fallback::AvoidReversal => {
                let open: Vec<Direction> = Direction::CLOCKWISE
                    .into_iter()
                    .filter(|d| cell.can_go(*d))
                    .collect();
                let onward: Vec<Direction> = open
                    .iter()
                    .copied()
                    .filter(|d| cell.neighbor(*d) != previous)
                    .collect();
                let choice = if onward.is_empty() {
                    open.choose(rng)
                } else {
                    onward.choose(rng)
                };
                choice.copied().map_or(Move::Hold, Move::Step)
            }
        }
    }
}

impl DecisionPolicy for Explorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, cell: &Cell, _cheese: &Cheese, rng: &mut dyn RngCore) -> Decision {
        self.visited.insert(cell.coord(), *cell);
        if let Some(seen) = self.lifetime.as_mut() {
            seen.insert(cell.coord());
        }
        let previous = self.previous.replace(cell.coord());

        let candidates = self.unexplored(cell);
        if let Some(direction) = self.pick(&candidates, rng) {
            self.trail.push(direction);
            return Decision::explore(direction);
        }

        if let Some(last) = self.trail.pop() {
            return Decision::walk(Move::Step(last.opposite()));
        }

        Decision::walk(self.wander(cell, previous, rng))
    }

    fn on_new_cheese(&mut self) {
        if self.resets.on_new_cheese {
            self.reset();
        }
    }

    fn on_respawn(&mut self) {
        if self.resets.on_respawn {
            self.reset();
        }
    }

    fn coverage(&self) -> Option<usize> {
        self.lifetime.as_ref().map(HashSet::len)
    }
}

/// Always asks to go up. Useful as a stand-in opponent.
#[derive(Debug, Default)]
pub struct Idle;

impl DecisionPolicy for Idle {
    fn name(&self) -> &str {
        "idle"
    }

    fn decide(&mut self, _cell: &Cell, _cheese: &Cheese, _rng: &mut dyn RngCore) -> Decision {
        Decision::walk(Move::Step(Direction::Up))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::grid::Maze;

    fn cheese() -> Cheese {
        Cheese::new(Coord::new(99, 99))
    }

    fn decide_at(explorer: &mut Explorer, maze: &Maze, at: Coord, rng: &mut StdRng) -> Decision {
        let cell = *maze.cell(at).unwrap();
        explorer.decide(&cell, &cheese(), rng)
    }

    /// Walks until the explorer has nothing left to explore or backtrack, returning the cells
    /// entered on the way.
    fn explore_until_lost(explorer: &mut Explorer, maze: &Maze, rng: &mut StdRng) -> HashSet<Coord> {
        let mut at = Coord::ORIGIN;
        let mut entered = HashSet::from([at]);
        for turn in 0..10_000 {
            let trail_before = explorer.trail_len();
            let cell = *maze.cell(at).unwrap();
            let decision = explorer.decide(&cell, &cheese(), rng);
            if turn > 0 && trail_before == 0 && !decision.explored {
                return entered;
            }
            if let Move::Step(d) = decision.action {
                if let Some(next) = cell.neighbor(d) {
                    at = next;
                    entered.insert(at);
                }
            }
        }
        panic!("explorer never exhausted the maze");
    }

    #[test]
    fn test_priority_order() {
        let maze = Maze::open(3, 3);
        let mut rng = StdRng::seed_from_u64(0);
        let mut explorer = Explorer::new("p", CandidateOrder::Priority);

        let d = decide_at(&mut explorer, &maze, Coord::new(1, 1), &mut rng);
        assert_eq!(d, Decision::explore(Direction::Left));
        // (0, 1) has no left side, so up is next in clockwise order.
        let d = decide_at(&mut explorer, &maze, Coord::new(0, 1), &mut rng);
        assert_eq!(d, Decision::explore(Direction::Up));
        assert_eq!(explorer.trail_len(), 2);
    }

    #[test]
    fn test_unordered_picks_only_new_cells() {
        let maze = Maze::open(3, 1);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let mut explorer = Explorer::scout();
            decide_at(&mut explorer, &maze, Coord::new(0, 0), &mut rng);
            let d = decide_at(&mut explorer, &maze, Coord::new(1, 0), &mut rng);
            assert_eq!(d, Decision::explore(Direction::Right));
        }
    }

    #[test]
    fn test_backtrack_returns_opposite() {
        let mut maze = Maze::sealed(2, 1);
        maze.carve(Coord::ORIGIN, Direction::Right);
        let mut rng = StdRng::seed_from_u64(0);
        let mut explorer = Explorer::thorough();

        let d = decide_at(&mut explorer, &maze, Coord::ORIGIN, &mut rng);
        assert_eq!(d.action, Move::Step(Direction::Right));
        let d = decide_at(&mut explorer, &maze, Coord::new(1, 0), &mut rng);
        assert_eq!(d, Decision::walk(Move::Step(Direction::Left)));
        assert_eq!(explorer.trail_len(), 0);
    }

    #[test]
    fn test_depth_limit_forces_backtrack() {
        let maze = Maze::open(6, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let mut explorer = Explorer::new("short", CandidateOrder::Priority).with_depth_limit(2);

        assert!(decide_at(&mut explorer, &maze, Coord::new(0, 0), &mut rng).explored);
        assert!(decide_at(&mut explorer, &maze, Coord::new(1, 0), &mut rng).explored);
        let d = decide_at(&mut explorer, &maze, Coord::new(2, 0), &mut rng);
        assert_eq!(d, Decision::walk(Move::Step(Direction::Left)));
        assert!(!explorer.has_visited(Coord::new(3, 0)));
    }

    #[test]
    fn test_unbounded_explorers_cover_maze() {
        let mut rng = StdRng::seed_from_u64(11);
        let maze = Maze::generate(9, 7, &mut rng);
        for mut explorer in [Explorer::scout(), Explorer::thorough(), Explorer::drifter()] {
            let entered = explore_until_lost(&mut explorer, &maze, &mut rng);
            assert_eq!(entered.len(), maze.len(), "{}", explorer.name());
            assert_eq!(explorer.visited_len(), maze.len(), "{}", explorer.name());
            assert_eq!(explorer.trail_len(), 0);
        }
    }

    #[test]
    fn test_reset_hooks() {
        let maze = Maze::open(4, 4);
        let mut rng = StdRng::seed_from_u64(5);
        let walk = |explorer: &mut Explorer, rng: &mut StdRng| {
            decide_at(explorer, &maze, Coord::new(0, 0), rng);
            decide_at(explorer, &maze, Coord::new(0, 1), rng);
            assert!(explorer.visited_len() > 0 && explorer.trail_len() > 0);
        };

        for mut explorer in [
            Explorer::scout(),
            Explorer::bounded(),
            Explorer::thorough(),
            Explorer::drifter(),
        ] {
            walk(&mut explorer, &mut rng);
            explorer.on_new_cheese();
            assert_eq!(explorer.visited_len(), 0);
            assert_eq!(explorer.trail_len(), 0);
        }

        for mut explorer in [Explorer::scout(), Explorer::thorough(), Explorer::drifter()] {
            walk(&mut explorer, &mut rng);
            explorer.on_respawn();
            assert_eq!(explorer.visited_len(), 0);
            assert_eq!(explorer.trail_len(), 0);
        }

        let mut bounded = Explorer::bounded();
        walk(&mut bounded, &mut rng);
        bounded.on_respawn();
        assert_eq!(bounded.visited_len(), 2);
        assert_eq!(bounded.trail_len(), 2);
    }

    #[test]
    fn test_coverage_survives_reset() {
        let maze = Maze::open(3, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let mut explorer = Explorer::thorough();
        decide_at(&mut explorer, &maze, Coord::new(0, 0), &mut rng);
        decide_at(&mut explorer, &maze, Coord::new(1, 0), &mut rng);
        explorer.on_new_cheese();
        decide_at(&mut explorer, &maze, Coord::new(2, 0), &mut rng);
        assert_eq!(explorer.coverage(), Some(3));
        assert_eq!(explorer.visited_len(), 1);
        assert_eq!(Explorer::scout().coverage(), None);
    }

    #[test]
    fn test_fallbacks() {
        let mut rng = StdRng::seed_from_u64(9);
        let sealed = Maze::sealed(1, 1);

        let mut rigid = Explorer::thorough();
        assert_eq!(
            decide_at(&mut rigid, &sealed, Coord::ORIGIN, &mut rng),
            Decision::walk(Move::Hold)
        );

        // Random fallback ignores walls entirely.
        let mut random = Explorer::scout();
        let d = decide_at(&mut random, &sealed, Coord::ORIGIN, &mut rng);
        assert!(matches!(d.action, Move::Step(_)));

        // Once a corridor is exhausted the rigid order takes the first open side.
        let corridor = Maze::open(2, 1);
        let mut rigid = Explorer::thorough();
        decide_at(&mut rigid, &corridor, Coord::new(0, 0), &mut rng);
        decide_at(&mut rigid, &corridor, Coord::new(1, 0), &mut rng);
        assert_eq!(
            decide_at(&mut rigid, &corridor, Coord::new(0, 0), &mut rng),
            Decision::walk(Move::Step(Direction::Right))
        );
    }

    #[test]
    fn test_avoid_reversal() {
        // A ring of four cells: once explored, the drifter keeps circling instead of
        // turning back toward the cell it came from.
        let maze = Maze::open(2, 2);
        let mut rng = StdRng::seed_from_u64(2);
        let mut explorer = Explorer::drifter();
        let mut at = Coord::ORIGIN;
        let mut previous = None;
        for turn in 0..40 {
            let cell = *maze.cell(at).unwrap();
            let trail_before = explorer.trail_len();
            let d = explorer.decide(&cell, &cheese(), &mut rng);
            let Move::Step(dir) = d.action else {
                panic!("drifter held on an open maze");
            };
            let next = cell.neighbor(dir).unwrap();
            if turn > 4 && trail_before == 0 && !d.explored {
                assert_ne!(Some(next), previous);
            }
            previous = Some(at);
            at = next;
        }
    }

    #[test]
    fn test_idle() {
        let maze = Maze::open(2, 2);
        let mut rng = StdRng::seed_from_u64(0);
        let cell = *maze.cell(Coord::ORIGIN).unwrap();
        let d = Idle.decide(&cell, &cheese(), &mut rng);
        assert_eq!(d, Decision::walk(Move::Step(Direction::Up)));
    }
}
