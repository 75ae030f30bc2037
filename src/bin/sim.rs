use anyhow::anyhow;
use clap::Parser;
use log::LevelFilter;
use naval_combat::host::{self, BattleApi, GameHandle};
use naval_combat::{init_logging_with, ActionOutcome, AiPlayer, BattleConfig, GameHost, GameStatus, Player, PlayerId};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

/// Player-turns after which a simulated game is called a draw.
const TURN_CAP: usize = 1000;

#[derive(Parser)]
#[command(about = "Run seeded AI vs AI battles concurrently and print a JSON summary")]
struct Args {
    seed1: u64,
    seed2: u64,
    #[arg(long, default_value_t = 1)]
    games: u64,
}

async fn simulate(handle: GameHandle, config: BattleConfig, seeds: [u64; 2]) -> anyhow::Result<serde_json::Value> {
    let ids = [PlayerId(1), PlayerId(2)];
    let mut players = [AiPlayer::new(ids[0], config.ai), AiPlayer::new(ids[1], config.ai)];
    let mut rngs = [SmallRng::seed_from_u64(seeds[0]), SmallRng::seed_from_u64(seeds[1])];

    for (player, rng) in players.iter_mut().zip(rngs.iter_mut()) {
        let placements = player.place_fleet(rng, &config.fleet, config.width, config.height);
        let verdict = handle.deploy(player.id(), placements).await?;
        if !verdict.is_valid() {
            return Err(anyhow!("{} could not deploy: {:?}", player.id(), verdict.errors));
        }
    }
    let verdict = handle.start().await?;
    if !verdict.is_valid() {
        return Err(anyhow!("game {} could not start: {:?}", handle.id(), verdict.errors));
    }

    let mut attacks = [0usize; 2];
    let mut turns = 0;
    while handle.status(ids[0]).await? == GameStatus::InProgress && turns < TURN_CAP {
        for i in 0..2 {
            let outcomes = host::play_turn(&handle, &mut players[i], &mut rngs[i]).await?;
            attacks[i] += outcomes
                .iter()
                .filter(|o| matches!(o, ActionOutcome::Attack(_)))
                .count();
        }
        turns += 1;
    }

    let snapshot = handle.snapshot().await?;
    Ok(json!({
        "game": handle.id(),
        "seeds": seeds,
        "turns": snapshot.turn(),
        "player1": {"status": handle.status(ids[0]).await?, "attacks": attacks[0]},
        "player2": {"status": handle.status(ids[1]).await?, "attacks": attacks[1]},
        "winner": snapshot.winner(),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the JSON summary only
    init_logging_with(LevelFilter::Warn);
    let args = Args::parse();
    let config = BattleConfig::default();
    let mut host = GameHost::new(config.clone())?;

    let mut tasks = Vec::new();
    for g in 0..args.games {
        let handle = host.create_game([PlayerId(1), PlayerId(2)])?;
        let seeds = [args.seed1.wrapping_add(g), args.seed2.wrapping_add(g)];
        tasks.push(tokio::spawn(simulate(handle, config.clone(), seeds)));
    }

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await??);
    }

    let wins = |id: u32| {
        results
            .iter()
            .filter(|r| r["winner"] == json!(PlayerId(id)))
            .count()
    };
    let summary = json!({
        "games": results.len(),
        "player1_wins": wins(1),
        "player2_wins": wins(2),
        "results": results,
    });
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
