use std::collections::VecDeque;

use mouserun::{
    AgentId, AgentRegistry, Cell, Cheese, Coord, Decision, DecisionPolicy, EventLog, Explorer,
    Game, GameConfig, GameEvent, GameState, Maze, Move, Simulation, Sprite,
};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Plays a fixed list of moves, then holds.
struct Script(VecDeque<Move>);

impl DecisionPolicy for Script {
    fn name(&self) -> &str {
        "script"
    }

    fn decide(&mut self, _cell: &Cell, _cheese: &Cheese, _rng: &mut dyn RngCore) -> Decision {
        Decision::walk(self.0.pop_front().unwrap_or(Move::Hold))
    }
}

fn simulation(config: GameConfig, maze: Maze, registry: AgentRegistry) -> Simulation<EventLog> {
    let game = Game::new(
        config,
        maze,
        registry,
        EventLog::new(),
        StdRng::seed_from_u64(2024),
    );
    let mut sim = Simulation::new(game);
    sim.start().unwrap();
    sim
}

#[test]
fn test_lone_mouse_reaches_far_corner() {
    let config = GameConfig {
        width: 10,
        height: 10,
        ratio_bombs_to_cheese: 0.0,
        number_of_cheese: 2,
        ..GameConfig::default()
    };
    let maze = Maze::generate(10, 10, &mut StdRng::seed_from_u64(99));
    let mut registry = AgentRegistry::new();
    registry.register_policy("thorough", Explorer::thorough);
    let mut sim = simulation(config, maze, registry);

    sim.game_mut().place_cheese(Coord::new(9, 9)).unwrap();
    let mark = sim.game().adapter().len();

    assert_eq!(sim.run_until_end(200_000), GameState::Ended);
    let game = sim.game();
    assert_eq!(game.cheese_taken(), 2);
    assert_eq!(game.agents()[0].cheese_taken(), 2);
    assert!(game.agents()[0].steps() >= 18);

    let after = game.adapter().since(mark);
    let fresh = after
        .iter()
        .filter(|e| matches!(e, GameEvent::NewCheese(_)))
        .count();
    assert_eq!(fresh, 1);
    assert_eq!(game.adapter().count(|e| *e == GameEvent::Stopped), 1);
    assert_eq!(after.last(), Some(&GameEvent::Stopped));

    // The game is over; further ticks change nothing.
    assert!(!sim.tick());
}

#[test]
fn test_rival_bomb_throws_mouse() {
    let config = GameConfig {
        width: 3,
        height: 3,
        ratio_bombs_to_cheese: 1.0,
        number_of_cheese: 5,
        ..GameConfig::default()
    };
    let mut registry = AgentRegistry::new();
    registry.register_policy("sapper", || Script(VecDeque::from([Move::PlantBomb])));
    registry.register_policy("victim", || Script(VecDeque::new()));
    let mut sim = simulation(config, Maze::open(3, 3), registry);
    sim.game_mut().place_cheese(Coord::new(2, 2)).unwrap();
    let mark = sim.game().adapter().len();

    // Both start on the origin: the sapper mines it, then the victim's arrival sets it off.
    assert!(sim.tick());

    let game = sim.game();
    let victim = game.agent(AgentId(1)).unwrap();
    let landing = victim.target();
    assert_ne!(landing, Coord::ORIGIN);
    assert_eq!(
        game.adapter().since(mark),
        &[
            GameEvent::NewBomb {
                coord: Coord::ORIGIN,
                owner: AgentId(0)
            },
            GameEvent::Detonated {
                coord: Coord::ORIGIN,
                owner: AgentId(0)
            },
            GameEvent::Repositioned {
                id: AgentId(1),
                cell: landing
            },
        ]
    );
    assert_eq!(game.cheese_taken(), 0);
    assert_eq!(victim.cheese_taken(), 0);

    let (x, y) = game.pixel_of(landing);
    assert_eq!(sim.sprites()[1], Sprite { x, y });

    // The sapper stands on its own spent bomb without harm.
    sim.tick();
    assert_eq!(sim.game().agent(AgentId(0)).unwrap().target(), Coord::ORIGIN);
    assert_eq!(
        sim.game()
            .adapter()
            .count(|e| matches!(e, GameEvent::Detonated { .. })),
        1
    );
}

#[test]
fn test_standard_roster_finishes() {
    let config = GameConfig {
        width: 8,
        height: 6,
        number_of_cheese: 4,
        ..GameConfig::default()
    };
    let maze = Maze::generate(8, 6, &mut StdRng::seed_from_u64(5));
    let mut sim = simulation(config, maze, AgentRegistry::standard());
    assert_eq!(sim.game().agents().len(), 5);

    assert_eq!(sim.run_until_end(500_000), GameState::Ended);
    let game = sim.game();
    assert_eq!(game.cheese_taken(), 4);
    let per_agent: u32 = game.agents().iter().map(|a| a.cheese_taken()).sum();
    assert_eq!(per_agent, 4);
    assert_eq!(game.adapter().count(|e| *e == GameEvent::Stopped), 1);
    assert!(game.bombs().is_empty());
}
