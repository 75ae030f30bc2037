use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use naval_combat::{
    init_logging, play_turn, AiPlayer, AiSettings, Battle, BattleConfig, Difficulty, GamePhase, Player, PlayerId,
    Script,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Turns after which a local game is abandoned.
const MAX_TURNS: u32 = 1000;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Level {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Beginner => Difficulty::Beginner,
            Level::Intermediate => Difficulty::Intermediate,
            Level::Advanced => Difficulty::Advanced,
            Level::Expert => Difficulty::Expert,
        }
    }
}

#[derive(Parser)]
enum Commands {
    /// Watch two AI admirals fight on the local machine.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, value_enum)]
        difficulty: Option<Level>,
        #[arg(long, help = "Only print the final result")]
        quiet: bool,
        #[arg(long, help = "Battle configuration file (JSON)")]
        config: Option<String>,
    },
    /// Replay a scripted battle and print every outcome as JSON.
    Script {
        file: String,
        #[arg(long, help = "Battle configuration file (JSON), overriding the script's own")]
        config: Option<String>,
    },
    /// Print the default battle configuration.
    Config,
}

fn seeded_rng(seed: Option<u64>, offset: u64) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s.wrapping_add(offset)),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<Option<BattleConfig>> {
    path.map(|p| BattleConfig::from_path(p).map_err(|e| anyhow!(e))).transpose()
}

fn run_local(seed: Option<u64>, difficulty: Option<Level>, quiet: bool, config: BattleConfig) -> anyhow::Result<()> {
    println!("Starting local AI vs AI battle...");
    if let Some(s) = seed {
        println!("Using fixed seed: {} (battle will be reproducible)", s);
    }
    let mut settings: AiSettings = config.ai;
    if let Some(level) = difficulty {
        settings.difficulty = level.into();
    }

    let ids = [PlayerId(1), PlayerId(2)];
    let mut battle = Battle::new(config.clone(), ids).map_err(|e| anyhow!(e))?;
    let mut players = [AiPlayer::new(ids[0], settings), AiPlayer::new(ids[1], settings)];
    let mut rngs = [seeded_rng(seed, 0), seeded_rng(seed, 1)];

    for (player, rng) in players.iter_mut().zip(rngs.iter_mut()) {
        let placements = player.place_fleet(rng, &config.fleet, config.width, config.height);
        let verdict = battle.deploy(player.id(), &placements);
        if !verdict.is_valid() {
            return Err(anyhow!("{} could not deploy: {:?}", player.id(), verdict.errors));
        }
    }
    let verdict = battle.start();
    if !verdict.is_valid() {
        return Err(anyhow!("battle could not start: {:?}", verdict.errors));
    }

    while battle.phase() == GamePhase::Active && battle.turn() <= MAX_TURNS {
        let idx = usize::from(battle.current_player() != ids[0]);
        let outcomes = play_turn(&mut players[idx], &mut rngs[idx], &mut battle);
        if quiet {
            continue;
        }
        if let Some(result) = players[idx].last_result() {
            println!("Turn {} {}: {} ({:.2})", battle.turn(), ids[idx], result.reasoning, result.confidence);
        }
        for outcome in &outcomes {
            println!("  {}", serde_json::to_string(outcome)?);
        }
    }

    for id in ids {
        if let Some(board) = battle.board(id) {
            println!("\n{} fleet:\n{}", id, board.render(true));
        }
    }
    match battle.winner() {
        Some(winner) => println!("{} wins after {} turns.", winner, battle.turn()),
        None => println!("No winner after {} turns.", battle.turn()),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local {
            seed,
            difficulty,
            quiet,
            config,
        } => {
            let config = load_config(config.as_deref())?.unwrap_or_default();
            run_local(seed, difficulty, quiet, config)?;
        }
        Commands::Script { file, config } => {
            let script = Script::from_path(&file).map_err(|e| anyhow!(e))?;
            let (battle, outcomes) = script.run(load_config(config.as_deref())?).map_err(|e| anyhow!(e))?;
            let report = serde_json::json!({
                "outcomes": outcomes,
                "phase": battle.phase(),
                "turn": battle.turn(),
                "winner": battle.winner(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config => {
            let json = BattleConfig::default().to_json().map_err(|e| anyhow!(e))?;
            println!("{}", json);
        }
    }
    Ok(())
}
