//! Number Bomber headless driver
//!
//! Runs the simulation under a random autopilot and reports what happened.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::{Rng, SeedableRng};

use number_bomber::sim::{
    CellPos, Direction, GameEvent, GameState, SimRng, Tile, TickInput, tick,
};
use number_bomber::{ConfigError, GameConfig, Preset};

/// Number Bomber: match the monster's number with a chain of bombs
#[derive(Parser, Debug)]
#[command(name = "number-bomber")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RNG seed (random when omitted)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Layout preset (open, classic); overrides the config file's layout
    #[arg(short = 'p', long = "preset")]
    preset: Option<String>,

    /// JSON config file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short = 'n', long = "ticks", default_value_t = 2000)]
    ticks: u32,

    /// Game time per tick in milliseconds
    #[arg(long = "tick-ms", default_value_t = 50)]
    tick_ms: u64,

    /// Print every event as a JSON line
    #[arg(short = 't', long = "trace")]
    trace: bool,

    /// Print the effective config as JSON and exit
    #[arg(long = "dump-config")]
    dump_config: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Config file (or defaults), with `--preset` applied on top when given
fn build_config(args: &Args) -> Result<GameConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(name) = &args.preset {
        let preset = parse_preset(name)?;
        config.apply_preset(preset);
        log::info!("Using {} layout", preset.as_str());
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let config = build_config(args)?;

    if args.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    log::info!(
        "Number Bomber starting with seed {seed} (block chance {})",
        config.destructible_chance
    );

    let mut state = GameState::new(config, seed);
    let mut pilot = Autopilot::new(seed);
    let mut episodes = 1;
    let mut kills = 0;

    for _ in 0..args.ticks {
        let input = pilot.next_input(&state);
        let _ = tick(&mut state, &input, args.tick_ms);

        for event in state.drain_events() {
            if matches!(event, GameEvent::MonsterDestroyed { .. }) {
                kills += 1;
            }
            if args.trace {
                println!("{}", serde_json::to_string(&event)?);
            }
        }

        if state.is_over() {
            log::info!("Episode {episodes} over ({:?})", state.phase);
            state = state.restart();
            episodes += 1;
        }
    }

    println!("{}", render_board(&state));
    println!(
        "episodes: {episodes}  kills: {kills}  level: {}  score: {}  lives: {}",
        state.episode.game_level, state.episode.success_count, state.episode.player_lives
    );
    Ok(())
}

fn parse_preset(name: &str) -> Result<Preset, ConfigError> {
    Preset::from_str(name).ok_or_else(|| ConfigError::Invalid(format!("unknown preset '{name}'")))
}

/// Random player: wanders, drops bombs now and then
struct Autopilot {
    rng: SimRng,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: SimRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
        }
    }

    fn next_input(&mut self, state: &GameState) -> TickInput {
        let mut input = TickInput::default();
        if state.player.moving {
            return input;
        }
        if self.rng.random_bool(0.05) {
            input.bomb_key = Some(self.rng.random_range(1..=9));
        }
        let dir = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
        input.direction = Some(dir);
        input
    }
}

/// ASCII snapshot: `#` solid, `+` block, `o` bomb, `M` monster, `P` player
fn render_board(state: &GameState) -> String {
    let mut out = String::new();
    for row in 0..state.grid.rows() {
        for col in 0..state.grid.cols() {
            let cell = CellPos::new(row, col);
            let c = if state.player.cell == cell {
                'P'
            } else if state.monsters.is_at(cell) {
                'M'
            } else if state.bombs.is_bomb_at(cell) {
                'o'
            } else {
                match state.grid.tile(cell) {
                    Some(Tile::Solid) => '#',
                    Some(Tile::Destructible) => '+',
                    _ => '.',
                }
            };
            out.push(c);
        }
        out.push('\n');
    }
    if let Some(monster) = state.monster() {
        out.push_str(&format!("monster value: {}", monster.value));
    }
    out
}
