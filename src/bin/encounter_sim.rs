//! Encounter Headless Simulator
//!
//! Plays encounters with a simple autopilot player and reports how they end.
//! Uses the same `Encounter` controller a front end would drive.
//!
//! Usage:
//!   cargo run --bin encounter-sim -- [OPTIONS]
//!
//! Options:
//!   --turns N       Turn limit per run (default: 200)
//!   --seed N        RNG seed (default: 42)
//!   --runs N        Number of runs with incrementing seeds (default: 1)
//!   --depth N       Combat search depth (default: 3)
//!   --config FILE   Load an encounter config (JSON)
//!   --verbose       Debug logging and the full narrative of every run
//!   --quiet         Only the final summary line

use encounter::character::NpcRole;
use encounter::combat::NpcAction;
use encounter::core::config::EncounterConfig;
use encounter::encounter::{Encounter, EncounterPhase, PlayerChoice};
use encounter::quest::QuestType;
use tracing_subscriber::EnvFilter;

// ── CLI Configuration ────────────────────────────────────────────────

struct SimConfig {
    turns: u32,
    seed: u64,
    runs: u32,
    depth: Option<u32>,
    config_path: Option<String>,
    verbose: bool,
    quiet: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            turns: 200,
            seed: 42,
            runs: 1,
            depth: None,
            config_path: None,
            verbose: false,
            quiet: false,
        }
    }
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i)
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{flag} requires a number");
            std::process::exit(1);
        })
}

fn parse_args() -> SimConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--turns" => {
                i += 1;
                config.turns = parse_number(&args, i, "--turns");
            }
            "--seed" => {
                i += 1;
                config.seed = parse_number(&args, i, "--seed");
            }
            "--runs" => {
                i += 1;
                config.runs = parse_number(&args, i, "--runs");
            }
            "--depth" => {
                i += 1;
                config.depth = Some(parse_number(&args, i, "--depth"));
            }
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config.config_path = Some(path.clone()),
                    None => {
                        eprintln!("--config requires a path");
                        std::process::exit(1);
                    }
                }
            }
            "--verbose" => config.verbose = true,
            "--quiet" => config.quiet = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    config
}

fn print_usage() {
    eprintln!(
        "Encounter Headless Simulator\n\
         \n\
         Usage: encounter-sim [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --turns N       Turn limit per run (default: 200)\n\
         \x20 --seed N        RNG seed (default: 42)\n\
         \x20 --runs N        Number of runs with incrementing seeds (default: 1)\n\
         \x20 --depth N       Combat search depth (default: 3)\n\
         \x20 --config FILE   Load an encounter config (JSON)\n\
         \x20 --verbose       Debug logging and full narrative\n\
         \x20 --quiet         Only final summary line\n\
         \x20 --help, -h      Show this help"
    );
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Autopilot ────────────────────────────────────────────────────────

/// Non-combat quests finished before the autopilot goes looking for a fight.
const SOCIAL_QUEST_LIMIT: usize = 2;

fn enemies_remain(encounter: &Encounter) -> bool {
    encounter
        .state()
        .living_npcs()
        .iter()
        .any(|n| n.role == NpcRole::Enemy)
}

/// Heal when hurt, chase the quest target for a while, then hunt enemies.
fn autopilot(encounter: &Encounter) -> PlayerChoice {
    let state = encounter.state();
    let choices = encounter.available_choices();
    let Some(focus) = state.focused() else {
        return PlayerChoice::Move;
    };

    if choices.contains(&PlayerChoice::Trade) && state.player.health_fraction() < 0.5 {
        return PlayerChoice::Trade;
    }

    let quest = state.current_quest.as_ref();
    let on_target = quest.is_some_and(|q| q.targets(focus.id));
    let hunting = enemies_remain(encounter)
        && state.player.quest_log.completed.len() >= SOCIAL_QUEST_LIMIT
        && !quest.is_some_and(|q| state.npc(q.target).is_some_and(|t| t.role == NpcRole::Enemy));

    if hunting {
        return match focus.role {
            NpcRole::Enemy => PlayerChoice::Attack,
            NpcRole::Merchant | NpcRole::QuestGiver => PlayerChoice::Move,
        };
    }

    if quest.is_some() && !on_target && state.living_count() > 1 {
        return PlayerChoice::Move;
    }

    match focus.role {
        NpcRole::Enemy => match quest {
            Some(q) if on_target && q.quest_type == QuestType::Talk => PlayerChoice::Interact,
            _ => PlayerChoice::Attack,
        },
        NpcRole::QuestGiver if quest.is_none() => PlayerChoice::AcceptQuest,
        NpcRole::Merchant | NpcRole::QuestGiver => PlayerChoice::Talk,
    }
}

// ── Simulation Statistics ────────────────────────────────────────────

/// How a run ended. `Cleared` means every enemy is down but friendly NPCs
/// remain, which the encounter itself never scores as a victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Victory,
    Cleared,
    Defeat,
    Unfinished,
}

#[derive(Debug, Default)]
struct SimStats {
    victories: u32,
    cleared: u32,
    defeats: u32,
    unfinished: u32,
    total_turns: u64,
    quests_completed: u64,
    npc_attacks: u64,
    npc_defends: u64,
    npc_flees: u64,
}

impl SimStats {
    fn npc_actions(&self) -> u64 {
        self.npc_attacks + self.npc_defends + self.npc_flees
    }
}

struct RunResult {
    outcome: Outcome,
    turns: u32,
    quests_completed: usize,
}

fn run_once(base: &EncounterConfig, seed: u64, sim: &SimConfig, stats: &mut SimStats) -> RunResult {
    let config = EncounterConfig {
        seed: Some(seed),
        search_depth: sim.depth.unwrap_or(base.search_depth),
        ..base.clone()
    };
    let mut encounter = Encounter::new(config);

    let mut turns = 0;
    while encounter.phase() == EncounterPhase::Playing
        && enemies_remain(&encounter)
        && turns < sim.turns
    {
        let choice = autopilot(&encounter);
        let report = encounter.handle_choice(choice);
        match report.npc_action {
            Some(NpcAction::Attack) => stats.npc_attacks += 1,
            Some(NpcAction::Defend) => stats.npc_defends += 1,
            Some(NpcAction::Flee) => stats.npc_flees += 1,
            None => {}
        }
        turns += 1;
    }

    if sim.verbose {
        for line in &encounter.state().narrative {
            println!("  {line}");
        }
    }

    let outcome = match encounter.phase() {
        EncounterPhase::Victory => Outcome::Victory,
        EncounterPhase::GameOver => Outcome::Defeat,
        EncounterPhase::Playing if !enemies_remain(&encounter) => Outcome::Cleared,
        EncounterPhase::Playing => Outcome::Unfinished,
    };
    RunResult {
        outcome,
        turns,
        quests_completed: encounter.state().player.quest_log.completed.len(),
    }
}

fn main() {
    let sim = parse_args();
    init_logging(sim.verbose);

    let base = match &sim.config_path {
        Some(path) => EncounterConfig::from_file(path).unwrap_or_else(|err| {
            eprintln!("Failed to load {path}: {err}");
            std::process::exit(1);
        }),
        None => EncounterConfig::default(),
    };

    let mut stats = SimStats::default();
    for run in 0..sim.runs {
        let seed = sim.seed + run as u64;
        let result = run_once(&base, seed, &sim, &mut stats);
        match result.outcome {
            Outcome::Victory => stats.victories += 1,
            Outcome::Cleared => stats.cleared += 1,
            Outcome::Defeat => stats.defeats += 1,
            Outcome::Unfinished => stats.unfinished += 1,
        }
        stats.total_turns += result.turns as u64;
        stats.quests_completed += result.quests_completed as u64;

        if !sim.quiet {
            println!(
                "run {:>3} seed {:>6}: {:?} after {} turns, {} quests completed",
                run + 1,
                seed,
                result.outcome,
                result.turns,
                result.quests_completed
            );
        }
    }

    let runs = sim.runs.max(1) as f64;
    println!(
        "{} runs: {} victories, {} cleared, {} defeats, {} unfinished | avg turns {:.1} | avg quests {:.2} | npc actions A/D/F {}/{}/{}",
        sim.runs,
        stats.victories,
        stats.cleared,
        stats.defeats,
        stats.unfinished,
        stats.total_turns as f64 / runs,
        stats.quests_completed as f64 / runs,
        stats.npc_attacks,
        stats.npc_defends,
        stats.npc_flees
    );
}
