//! End-to-end scenarios for signals and automata.

use serde_json::{json, Value};
use syncflow::automaton::{ActionResult, Automaton};
use syncflow::builder::{AutomatonBuilder, TransitionBuilder};
use syncflow::core::{Target, INIT_EVENT, ROOT_STATE};
use syncflow::patch::UpdateOperation;
use syncflow::signal::{
    combine, from_behavior, from_fn, BehaviorSubject, Emission, FromBehaviorSettings,
    FromFnSettings, Signal,
};
use syncflow::state_tree;

const FAILURE: &str = "Some error occurred while executing the function!";
const SUBSEQUENT_FAILURE: &str = "subsequent pull > error while executing generating function: \
                                  Some error occurred while executing the function!";

/// A generator replaying `commands`, failing when it reaches `"ERROR"`.
fn scripted(commands: Vec<Value>) -> impl FnMut() -> Result<Value, String> {
    let mut commands = commands.into_iter();
    move || match commands.next() {
        Some(Value::String(s)) if s == "ERROR" => Err(FAILURE.to_string()),
        Some(value) => Ok(value),
        None => Err("exhausted".to_string()),
    }
}

fn concat(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn numbers() -> Vec<Value> {
    vec![json!(0), json!(1), json!(1), json!(2), json!(2), json!("DONE"), json!(4)]
}

fn pull_n(signal: &mut impl Signal, n: usize) -> Vec<Emission> {
    (0..n)
        .map(|_| {
            signal.pull();
            signal.get().clone()
        })
        .collect()
}

#[test]
fn generator_signal_reports_changes_and_completion() {
    let mut signal = from_fn(scripted(numbers()), FromFnSettings::new().done(json!("DONE")));

    let sequence = pull_n(&mut signal, 7);

    assert_eq!(
        sequence,
        vec![
            Emission::new(json!(0)),
            Emission::new(json!(1)),
            Emission::same(json!(1)),
            Emission::new(json!(2)),
            Emission::same(json!(2)),
            Emission::done(),
            Emission::done(),
        ]
    );
}

#[test]
fn combined_error_beats_completion() {
    let letters = vec![json!("A"), json!("A"), json!("B"), json!("C"), json!("C"), json!("ERROR"), json!("D")];
    let iterator1 = from_fn(scripted(numbers()), FromFnSettings::new().done(json!("DONE")));
    let iterator2 = from_fn(scripted(letters), FromFnSettings::new());

    let mut combined = combine(
        |values: &[Value]| json!(concat(&[values[1].clone(), values[0].clone()])),
        vec![Box::new(iterator1), Box::new(iterator2)],
    );

    assert_eq!(
        pull_n(&mut combined, 7),
        vec![
            Emission::new(json!("A0")),
            Emission::new(json!("A1")),
            Emission::new(json!("B1")),
            Emission::new(json!("C2")),
            Emission::same(json!("C2")),
            Emission::error(SUBSEQUENT_FAILURE),
            Emission::error(SUBSEQUENT_FAILURE),
        ]
    );
}

#[test]
fn combined_error_beats_a_plain_value() {
    let letters = vec![json!("A"), json!("A"), json!("B"), json!("C"), json!("C"), json!("ERROR"), json!("D")];
    let iterator1 = from_fn(scripted(letters), FromFnSettings::new().done(json!("DONE")));
    // No sentinel here, so "DONE" is just another value.
    let iterator2 = from_fn(scripted(numbers()), FromFnSettings::new());

    let mut combined = combine(
        |values: &[Value]| json!(concat(values)),
        vec![Box::new(iterator1), Box::new(iterator2)],
    );

    let sequence = pull_n(&mut combined, 7);

    assert_eq!(sequence[0], Emission::new(json!("A0")));
    assert_eq!(sequence[4], Emission::same(json!("C2")));
    assert_eq!(sequence[5], Emission::error(SUBSEQUENT_FAILURE));
    assert_eq!(sequence[6], Emission::error(SUBSEQUENT_FAILURE));
}

#[test]
fn combined_completion_beats_same() {
    let letters = vec![json!("A"), json!("A"), json!("B"), json!("C"), json!("C"), json!("C"), json!("D")];
    let iterator1 = from_fn(scripted(numbers()), FromFnSettings::new().done(json!("DONE")));
    let iterator2 = from_fn(scripted(letters), FromFnSettings::new());

    let mut combined = combine(
        |values: &[Value]| json!(concat(&[values[1].clone(), values[0].clone()])),
        vec![Box::new(iterator1), Box::new(iterator2)],
    );

    let sequence = pull_n(&mut combined, 7);

    assert_eq!(sequence[3], Emission::new(json!("C2")));
    assert_eq!(sequence[4], Emission::same(json!("C2")));
    assert_eq!(&sequence[5..], &[Emission::done(), Emission::done()]);
}

enum Step {
    Pull,
    Push(i64),
}

/// Pushes and pulls shared by the behavior scenarios; returns what each
/// pull observed.
fn drive_behavior(subject: &BehaviorSubject, signal: &mut impl Signal) -> Vec<Emission> {
    use Step::{Pull, Push};
    let steps = [
        Pull, Push(1), Pull, Push(1), Push(2), Pull, Pull, Push(3), Pull, Push(3), Pull,
        Push(4), Pull, Push(5), Push(6),
    ];

    let mut seen = Vec::new();
    for step in steps {
        match step {
            Pull => {
                signal.pull();
                seen.push(signal.get().clone());
            }
            Push(n) => subject.next(json!(n)),
        }
    }
    seen
}

fn behavior_prefix() -> Vec<Emission> {
    vec![
        Emission::new(json!(0)),
        Emission::new(json!(1)),
        Emission::new(json!(2)),
        Emission::same(json!(2)),
        Emission::new(json!(3)),
        Emission::new(json!(3)),
        Emission::new(json!(4)),
    ]
}

#[test]
fn behavior_signal_samples_the_latest_push_then_completes() {
    let subject = BehaviorSubject::with_value(json!(0));
    let mut signal = from_behavior(&subject, FromBehaviorSettings::new());

    let mut seen = drive_behavior(&subject, &mut signal);
    subject.complete();
    signal.pull();
    seen.push(signal.get().clone());

    let mut expected = behavior_prefix();
    expected.push(Emission::done());
    assert_eq!(seen, expected);
}

#[test]
fn behavior_signal_reports_source_errors() {
    let subject = BehaviorSubject::with_value(json!(0));
    let mut signal = from_behavior(&subject, FromBehaviorSettings::new());

    let mut seen = drive_behavior(&subject, &mut signal);
    subject.error("some error");
    signal.pull();
    seen.push(signal.get().clone());

    let mut expected = behavior_prefix();
    expected.push(Emission::error(
        "behavior > error emitted by the source behavior: some error",
    ));
    assert_eq!(seen, expected);
}

/// A player with a nested `Active` group, a track counter in the model and
/// a `resume` that returns to wherever playback was left.
fn cd_player() -> Automaton<(), (), String> {
    AutomatonBuilder::new()
        .states(state_tree! {
            NoCd,
            Stopped,
            Active => { Playing, Paused },
        })
        .events(["insert", "eject", "play", "pause", "stop", "resume", "next_track"])
        .initial_model(json!({"track": 1}))
        .transition(TransitionBuilder::new().from(ROOT_STATE).on(INIT_EVENT).to("NoCd"))
        .unwrap()
        .transition(TransitionBuilder::new().from("NoCd").on("insert").to("Stopped"))
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("Stopped")
                .on("play")
                .to("Playing")
                .action(|model, _, _| ActionResult::output(format!("playing track {}", model["track"]))),
        )
        .unwrap()
        .transition(TransitionBuilder::new().from("Playing").on("pause").to("Paused"))
        .unwrap()
        .transition(TransitionBuilder::new().from("Stopped").on("resume").to(Target::history("Active")))
        .unwrap()
        .transition(TransitionBuilder::new().from("Active").on("stop").to("Stopped"))
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("Playing")
                .on("next_track")
                .to("Playing")
                .when(|model, _, _| model["track"].as_i64().unwrap_or(0) < 3)
                .action(|model, _, _| {
                    let track = model["track"].as_i64().unwrap_or(0) + 1;
                    ActionResult::update(vec![UpdateOperation::replace("/track", json!(track))])
                        .with_output(format!("playing track {track}"))
                }),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("Stopped")
                .on("eject")
                .to("NoCd")
                .action(|_, _, _| ActionResult::update(vec![UpdateOperation::replace("/track", json!(1))])),
        )
        .unwrap()
        .build(())
        .unwrap()
}

#[test]
fn cd_player_session() {
    let mut player = cd_player();
    player.start().unwrap();
    assert_eq!(player.current_state(), "NoCd");

    player.yield_event("insert", ()).unwrap();
    assert_eq!(player.yield_event("play", ()).unwrap().as_deref(), Some("playing track 1"));
    assert_eq!(player.yield_event("next_track", ()).unwrap().as_deref(), Some("playing track 2"));
    assert_eq!(player.yield_event("next_track", ()).unwrap().as_deref(), Some("playing track 3"));
    assert_eq!(player.yield_event("next_track", ()).unwrap(), None);
    assert_eq!(player.current_state(), "Playing");

    player.yield_event("pause", ()).unwrap();
    player.yield_event("stop", ()).unwrap();
    assert_eq!(player.current_state(), "Stopped");

    player.yield_event("resume", ()).unwrap();
    assert_eq!(player.current_state(), "Paused");
    assert!(player.is_active("Paused"));

    // eject is only handled while stopped
    assert_eq!(player.yield_event("eject", ()).unwrap(), None);
    assert_eq!(player.dropped_events(), 1);

    player.yield_event("stop", ()).unwrap();
    player.yield_event("eject", ()).unwrap();
    assert_eq!(player.current_state(), "NoCd");
    assert_eq!(
        player.trace().get_path(),
        vec![
            ROOT_STATE, "NoCd", "Stopped", "Playing", "Playing", "Playing", "Paused", "Stopped",
            "Paused", "Stopped", "NoCd",
        ]
    );
}
