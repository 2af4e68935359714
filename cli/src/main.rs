//! 命令列戰鬥示範：載入名冊，玩家角色由終端機操作，其餘自動行動
mod constants;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use constants::{DEMO_ROSTER, DEMO_ROSTER_NAME};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{Stdout, StdinLock};
use std::path::PathBuf;
use std::rc::Rc;
use whfrp_core::{
    load_roster, AutomatedProvider, Battle, BattleConfig, DecisionProvider, InteractiveProvider,
    TextPrompt,
};

type TerminalProvider = InteractiveProvider<TextPrompt<StdinLock<'static>, Stdout>>;

/// Round-based melee battle between the combatants of a roster
#[derive(Parser, Debug)]
#[command(name = "whfrp-battle")]
struct Args {
    /// Roster TOML file (defaults to the bundled Aldric vs Goblin demo)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Random seed for deterministic runs (overrides the roster's seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many rounds (overrides the roster's limit)
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Let the AI control player characters too
    #[arg(long)]
    auto: bool,

    /// Write the end-of-battle snapshot as JSON
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (source, name) = match &args.roster {
        Some(path) => (
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read roster {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (DEMO_ROSTER.to_string(), DEMO_ROSTER_NAME.to_string()),
    };
    let roster = load_roster(&source).with_context(|| format!("failed to load {name}"))?;

    let seed = args
        .seed
        .or(roster.battle.seed)
        .unwrap_or_else(rand::random);
    tracing::info!("Using seed {seed}");

    let mut config = roster.battle.battle_config();
    if args.max_rounds.is_some() {
        config = BattleConfig {
            max_rounds: args.max_rounds,
        };
    }

    // 所有玩家角色共用同一個終端機
    let terminal: Rc<TerminalProvider> = Rc::new(InteractiveProvider::new(TextPrompt::new(
        std::io::stdin().lock(),
        std::io::stdout(),
    )));
    let automated: Rc<dyn DecisionProvider> = Rc::new(AutomatedProvider);
    let auto = args.auto;
    let units = roster.into_units(|character| -> Rc<dyn DecisionProvider> {
        if character.is_player_character() && !auto {
            terminal.clone()
        } else {
            automated.clone()
        }
    });

    let mut battle = Battle::new(units, StdRng::seed_from_u64(seed)).with_config(config);
    let outcome = battle.start_battle()?;

    println!();
    println!("{}", report::outcome_line(&outcome));
    report::print_roster(battle.combatants());

    if let Some(path) = &args.save {
        let json = battle.snapshot().to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        tracing::info!("Snapshot saved to {}", path.display());
    }

    Ok(())
}
