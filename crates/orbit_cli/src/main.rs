use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use orbit_core::{Action, ActionEnvelope, GameState, PlayerId};
use orbit_store::SnapshotStore;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "orbit_cli", about = "Orbital ring skirmish turn runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a scripted sequence of turn batches and print the log.
    Run {
        /// JSON script: player roster plus per-turn action batches.
        #[arg(long)]
        script: String,
        /// RNG seed; random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Content directory; the built-in tables when omitted.
        #[arg(long)]
        content_dir: Option<String>,
        /// Print every log entry instead of a per-turn summary line.
        #[arg(long)]
        verbose: bool,
        /// Save the final snapshot into this directory.
        #[arg(long)]
        snapshot_dir: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Script format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScriptFile {
    players: Vec<String>,
    turns: Vec<Vec<ScriptAction>>,
}

/// Script actions reference players by display name; ids are generated at
/// state construction and resolved here.
#[derive(Deserialize)]
struct ScriptAction {
    player: String,
    sequence: Option<u32>,
    action: Action,
}

fn resolve_action(state: &GameState, scripted: &ScriptAction) -> Result<ActionEnvelope> {
    let resolve = |name: &str| -> Result<PlayerId> {
        state
            .players
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id.clone())
            .with_context(|| format!("script references unknown player '{name}'"))
    };
    let mut action = scripted.action.clone();
    // Fire targets are also authored by name.
    if let Action::FireWeapon { target, .. } = &mut action {
        *target = resolve(&target.0)?;
    }
    Ok(ActionEnvelope {
        player_id: resolve(&scripted.player)?,
        sequence: scripted.sequence,
        action,
    })
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(
    script_path: &str,
    seed: Option<u64>,
    content_dir: Option<&str>,
    verbose: bool,
    snapshot_dir: Option<&str>,
) -> Result<()> {
    let script: ScriptFile = serde_json::from_str(
        &std::fs::read_to_string(script_path)
            .with_context(|| format!("reading script: {script_path}"))?,
    )
    .with_context(|| format!("parsing script: {script_path}"))?;
    if script.players.is_empty() {
        bail!("script declares no players");
    }

    let content = match content_dir {
        Some(dir) => orbit_world::load_content(dir)?,
        None => orbit_world::default_content(),
    };

    let resolved_seed = seed.unwrap_or_else(rand::random);
    let (mut state, mut rng) = orbit_world::new_session(&script.players, &content, resolved_seed);

    println!(
        "Starting skirmish: players={} turns={} seed={resolved_seed} content_version={}",
        script.players.len(),
        script.turns.len(),
        content.content_version,
    );
    println!("{}", "-".repeat(80));

    for (turn_index, batch) in script.turns.iter().enumerate() {
        let actions: Vec<ActionEnvelope> = batch
            .iter()
            .map(|scripted| resolve_action(&state, scripted))
            .collect::<Result<_>>()?;

        let outcome = orbit_core::execute_turn(&state, &actions, &content, &mut rng);
        if outcome.errors.is_empty() {
            if verbose {
                for entry in &outcome.log {
                    println!(
                        "[turn {:03}] {} {}: {}",
                        entry.turn, entry.player_name, entry.action, entry.result,
                    );
                }
            } else {
                println!(
                    "[turn {turn_index:03}] committed: {} actions, {} log entries",
                    batch.len(),
                    outcome.log.len(),
                );
            }
        } else {
            println!("[turn {turn_index:03}] REJECTED, snapshot kept:");
            for error in &outcome.errors {
                println!("  - {error}");
            }
        }
        state = outcome.state;
    }

    println!("{}", "-".repeat(80));
    println!("Final state after turn {}:", state.meta.turn);
    print_status(&state);

    if let Some(dir) = snapshot_dir {
        let store = orbit_store::JsonDirStore::new(dir)?;
        let session_id = format!("session_{}", orbit_core::seeded_uuid(&mut rng));
        store.save(&session_id, &state)?;
        println!("Snapshot saved as {session_id} in {dir}");
    }

    Ok(())
}

fn print_status(state: &GameState) {
    for player in &state.players {
        let ship = &player.ship;
        let status = if player.alive { "" } else { "  [DESTROYED]" };
        println!(
            "  {name:<12} ring {ring} sector {sector:<3} {facing:<10} \
             hull {hull}/{max_hull}  mass {mass}  heat {heat}  pool {pool}/{capacity}{status}",
            name = player.name,
            ring = ship.ring,
            sector = ship.sector,
            facing = ship.facing.label(),
            hull = ship.hull,
            max_hull = ship.max_hull,
            mass = ship.reaction_mass,
            heat = ship.heat.current_heat,
            pool = ship.reactor.available_energy,
            capacity = ship.reactor.total_capacity,
        );
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            script,
            seed,
            content_dir,
            verbose,
            snapshot_dir,
        } => run(
            &script,
            seed,
            content_dir.as_deref(),
            verbose,
            snapshot_dir.as_deref(),
        ),
    }
}
