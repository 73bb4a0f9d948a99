use std::{collections::HashMap, path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre::eyre;
use mouserun::{
    AgentRegistry, Coord, EventLog, Game, GameConfig, GameEvent, GameState, Maze, Simulation,
};
use rand::{rngs::StdRng, thread_rng, Rng, SeedableRng};
use ratatui::{
    crossterm::event::{self, Event, KeyCode},
    layout::{Constraint, Layout},
    style::{Color, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    DefaultTerminal, Frame,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Mice race through a maze for cheese, planting bombs on each other along the way.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with game settings. Flags below override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "CELLS")]
    width: Option<i32>,
    #[arg(long, value_name = "CELLS")]
    height: Option<i32>,
    /// Cheese pickups that end the game.
    #[arg(long, value_name = "COUNT")]
    cheese: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Mice to race, comma separated. Defaults to every built-in mouse.
    #[arg(short, long, value_delimiter = ',')]
    mice: Vec<String>,
    /// Run without the terminal UI and log a summary at the end.
    #[arg(long)]
    headless: bool,
    /// Give up after this many ticks in headless mode.
    #[arg(long, default_value_t = 500_000)]
    max_ticks: u64,
    /// Milliseconds between frames in the terminal UI.
    #[arg(long, value_name = "MILLISECONDS", default_value_t = 15)]
    frame_ms: u64,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.headless)?;

    let config = load_config(&cli)?;
    let seed = config.seed.unwrap_or_else(|| thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    let maze = Maze::generate(config.width, config.height, &mut rng);
    let registry = if cli.mice.is_empty() {
        AgentRegistry::standard()
    } else {
        AgentRegistry::select(cli.mice.as_slice())?
    };
    info!(seed, mice = ?registry, "setting up game");

    let mut sim = Simulation::new(Game::new(config, maze, registry, EventLog::new(), rng));
    sim.start()?;

    if cli.headless {
        run_headless(&mut sim, cli.max_ticks);
    } else {
        let mut term = ratatui::init();
        let result = run_tui(&mut term, &mut sim, Duration::from_millis(cli.frame_ms));
        ratatui::restore();
        result?;
    }

    sim.game_mut().shutdown();
    summarize(&sim);
    Ok(())
}

fn init_tracing(headless: bool) -> color_eyre::Result<()> {
    // Log lines would tear the terminal UI, so it stays quiet unless RUST_LOG asks.
    let default = if headless { "info" } else { "off" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {err}"))
}

fn load_config(cli: &Cli) -> color_eyre::Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    if let Some(cheese) = cli.cheese {
        config.number_of_cheese = cheese;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate()?;
    Ok(config)
}

fn run_headless(sim: &mut Simulation<EventLog>, max_ticks: u64) {
    let state = sim.run_until_end(max_ticks);
    if state != GameState::Ended {
        warn!(ticks = sim.ticks(), "tick budget exhausted before the goal was reached");
    }
}

fn run_tui(
    term: &mut DefaultTerminal,
    sim: &mut Simulation<EventLog>,
    frame: Duration,
) -> color_eyre::Result<()> {
    let mut paused = false;
    loop {
        if !paused {
            sim.tick();
        }
        term.draw(|f| render(f, sim, paused))?;

        if event::poll(frame)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') => paused = !paused,
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn summarize(sim: &Simulation<EventLog>) {
    let game = sim.game();
    info!(
        ticks = sim.ticks(),
        taken = game.cheese_taken(),
        goal = game.config().number_of_cheese,
        "game finished"
    );
    for agent in game.agents() {
        info!(
            mouse = agent.name(),
            cheese = agent.cheese_taken(),
            steps = agent.steps(),
            explored = agent.explored(),
            bombs_left = agent.bombs_left(),
            "final score"
        );
    }
}

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Blue,
    Color::LightRed,
    Color::White,
];

fn agent_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

fn marker(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn render(frame: &mut Frame, sim: &Simulation<EventLog>, paused: bool) {
    let [board, side] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(48)]).areas(frame.area());
    frame.render_widget(maze_canvas(sim), board);
    frame.render_widget(scoreboard(sim, paused), side);
}

fn maze_canvas(sim: &Simulation<EventLog>) -> Paragraph<'static> {
    let game = sim.game();
    let maze = game.maze();
    let half = game.config().cell_size / 2;

    let mut occupants: HashMap<Coord, Span<'static>> = HashMap::new();
    for bomb in game.bombs().iter().filter(|b| !b.has_detonated()) {
        occupants.insert(bomb.coord(), "*".red().bold());
    }
    if let Some(cheese) = game.cheese() {
        occupants.insert(cheese.coord(), "C".yellow().bold());
    }
    for (index, (agent, sprite)) in game.agents().iter().zip(sim.sprites()).enumerate() {
        let at = Coord::new(game.column_at(sprite.x + half), game.row_at(sprite.y + half));
        occupants.insert(at, marker(agent.name()).fg(agent_color(index)).bold());
    }

    let wall = || "█".dark_gray();
    let mut lines: Vec<Line> = Vec::new();
    for y in (0..maze.height()).rev() {
        let mut ceiling = Vec::new();
        let mut floor = Vec::new();
        for x in 0..maze.width() {
            let coord = Coord::new(x, y);
            let cell = maze.cell(coord);
            ceiling.push(wall());
            ceiling.push(if cell.is_some_and(|c| c.can_go_up()) {
                " ".into()
            } else {
                wall()
            });
            floor.push(if cell.is_some_and(|c| c.can_go_left()) {
                " ".into()
            } else {
                wall()
            });
            floor.push(occupants.get(&coord).cloned().unwrap_or_else(|| " ".into()));
        }
        ceiling.push(wall());
        floor.push(wall());
        lines.push(Line::from(ceiling));
        lines.push(Line::from(floor));
    }
    lines.push(Line::from(vec![wall(); (2 * maze.width() + 1) as usize]));

    Paragraph::new(lines).block(Block::bordered().title(" maze "))
}

fn scoreboard(sim: &Simulation<EventLog>, paused: bool) -> Paragraph<'static> {
    let game = sim.game();
    let status = match (game.state(), paused) {
        (GameState::Ended, _) => "over".to_string(),
        (_, true) => "paused".to_string(),
        (state, false) => format!("{:?}", state).to_lowercase(),
    };
    let mut lines = vec![
        Line::from(format!(
            "Tick: {} Cheese: {}/{} [{}]",
            sim.ticks(),
            game.cheese_taken(),
            game.config().number_of_cheese,
            status
        )),
        Line::from(""),
    ];

    for (index, agent) in game.agents().iter().enumerate() {
        let coverage = agent
            .coverage()
            .map(|c| format!(" seen {}/{}", c, game.maze().len()))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            marker(agent.name()).fg(agent_color(index)).bold(),
            Span::raw(format!(
                " {:<9} cheese {:>2} steps {:>5} explored {:>4} bombs {}{}",
                agent.name(),
                agent.cheese_taken(),
                agent.steps(),
                agent.explored(),
                agent.bombs_left(),
                coverage
            )),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from("Events:".bold()));
    let events = game.adapter().events();
    for event in events.iter().rev().take(12) {
        lines.push(Line::from(describe(event, game)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("space: pause  q: quit".dark_gray()));

    Paragraph::new(lines).block(Block::bordered().title(" mice "))
}

fn describe(event: &GameEvent, game: &Game<EventLog>) -> String {
    let name = |id| game.agent(id).map(|a| a.name()).unwrap_or("?");
    match event {
        GameEvent::AgentsCleared => "board cleared".to_string(),
        GameEvent::NewAgent { name, .. } => format!("{} joined", name),
        GameEvent::Started => "race started".to_string(),
        GameEvent::Stopped => "goal reached".to_string(),
        GameEvent::NewCheese(c) => format!("cheese at ({}, {})", c.x, c.y),
        GameEvent::NewBomb { coord, owner } => {
            format!("{} mined ({}, {})", name(*owner), coord.x, coord.y)
        }
        GameEvent::Detonated { coord, owner } => {
            format!("{}'s bomb went off at ({}, {})", name(*owner), coord.x, coord.y)
        }
        GameEvent::Repositioned { id, cell } => {
            format!("{} thrown to ({}, {})", name(*id), cell.x, cell.y)
        }
    }
}
