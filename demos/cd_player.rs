//! CD Player Automaton
//!
//! This example demonstrates a hierarchical automaton driving a CD player.
//!
//! Key concepts:
//! - Grouping states whose transitions are inherited by their children
//! - History targets that resume the last active leaf
//! - Guards over the model and event data
//! - Model updates returned by actions
//!
//! Run with: RUST_LOG=syncflow=debug cargo run --example cd_player

use serde_json::json;
use syncflow::automaton::{ActionResult, Automaton, AutomatonError};
use syncflow::builder::{simple_transition, AutomatonBuilder, BuildError, TransitionBuilder};
use syncflow::core::{Target, INIT_EVENT, ROOT_STATE};
use syncflow::patch::UpdateOperation;
use syncflow::state_tree;
use tracing_subscriber::EnvFilter;

const TRACKS: i64 = 5;

/// Settings shared by every guard and action.
struct Disc {
    title: &'static str,
}

fn track(model: &serde_json::Value) -> i64 {
    model["track"].as_i64().unwrap_or(1)
}

fn set_track(track: i64) -> Vec<UpdateOperation> {
    vec![UpdateOperation::replace("/track", json!(track))]
}

fn build_player() -> Result<Automaton<Disc, Option<i64>, String>, BuildError> {
    AutomatonBuilder::new()
        .states(state_tree! {
            NoCd,
            CdLoaded => {
                Stopped,
                Active => { Playing, Paused },
            },
        })
        .events(["insert", "eject", "play", "pause", "stop", "resume", "skip"])
        .initial_model(json!({ "track": 1 }))
        .transition(TransitionBuilder::new().from(ROOT_STATE).on(INIT_EVENT).to("NoCd"))?
        .add_transition(simple_transition("NoCd", "insert", "Stopped"))
        .transition(
            TransitionBuilder::new()
                .from("CdLoaded")
                .on("eject")
                .to("NoCd")
                .action(|_, _, disc: &Disc| {
                    ActionResult::update(set_track(1)).with_output(format!("ejected {}", disc.title))
                }),
        )?
        .transition(
            TransitionBuilder::new()
                .from("Stopped")
                .on("play")
                .to("Playing")
                .action(|model, _, disc: &Disc| {
                    ActionResult::output(format!("{}: track {}", disc.title, track(model)))
                }),
        )?
        .add_transition(simple_transition("Playing", "pause", "Paused"))
        .add_transition(simple_transition("Paused", "pause", "Playing"))
        .add_transition(simple_transition("Active", "stop", "Stopped"))
        .add_transition(simple_transition("Stopped", "resume", Target::history("Active")))
        .transition(
            TransitionBuilder::new()
                .from("Active")
                .on("skip")
                .to(Target::history("Active"))
                .when(|_, requested: &Option<i64>, _| {
                    requested.is_some_and(|n| (1..=TRACKS).contains(&n))
                })
                .action(|_, requested, disc: &Disc| {
                    let next = requested.unwrap_or(1);
                    ActionResult::update(set_track(next))
                        .with_output(format!("{}: track {}", disc.title, next))
                }),
        )?
        .build(Disc {
            title: "Kind of Blue",
        })
}

fn send(player: &mut Automaton<Disc, Option<i64>, String>, event: &str, data: Option<i64>) -> Result<(), AutomatonError> {
    let output = player.yield_event(event, data)?;
    match output {
        Some(text) => println!("  {event:<8} -> {:<10} {text}", player.current_state()),
        None => println!("  {event:<8} -> {}", player.current_state()),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== CD Player Automaton ===\n");

    let mut player = build_player()?;
    player.start()?;
    println!("Started in {}\n", player.current_state());

    println!("Event sequence:");
    send(&mut player, "play", None)?;
    send(&mut player, "insert", None)?;
    send(&mut player, "play", None)?;
    send(&mut player, "skip", Some(3))?;
    send(&mut player, "skip", Some(42))?;
    send(&mut player, "pause", None)?;
    send(&mut player, "stop", None)?;
    send(&mut player, "resume", None)?;
    send(&mut player, "eject", None)?;

    println!("\nDropped events: {}", player.dropped_events());
    println!("Path: {}", player.trace().get_path().join(" -> "));

    println!("\n=== Example Complete ===");
    Ok(())
}
