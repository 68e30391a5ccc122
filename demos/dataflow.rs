//! Pull-Based Dataflow
//!
//! This example demonstrates a render loop that only redraws when something
//! it depends on changed.
//!
//! Key concepts:
//! - Generator signals sampled on every pull
//! - A behavior fed from another thread
//! - Combining signals, with `SAME` short-circuiting recomputation
//!
//! Run with: RUST_LOG=syncflow=debug cargo run --example dataflow

use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use syncflow::signal::{
    combine, from_behavior, from_fn, BehaviorSubject, ControlState, FromBehaviorSettings,
    FromFnSettings, Signal, SignalExt,
};
use tracing_subscriber::EnvFilter;

fn screen_type(sides: &[Value]) -> Value {
    let height = sides[0].as_f64().unwrap_or(0.0);
    let width = sides[1].as_f64().unwrap_or(1.0);
    let kind = if height / width > 0.5 && width > 280.0 {
        "desktop"
    } else if height / width > 0.5 {
        "tablet"
    } else {
        "mobile"
    };
    json!(kind)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Pull-Based Dataflow ===\n");

    let window_width = Arc::new(AtomicI64::new(1024));
    let width = {
        let window_width = Arc::clone(&window_width);
        from_fn(
            move || Ok::<_, String>(json!(window_width.load(Ordering::Relaxed))),
            FromFnSettings::new(),
        )
    };
    let height = from_fn(|| Ok::<_, String>(json!(768)), FromFnSettings::new());
    let screen = combine(screen_type, vec![height.boxed(), width.boxed()]);

    let keys = BehaviorSubject::with_value(json!("-"));
    let typed = from_behavior(&keys, FromBehaviorSettings::new());

    let mut typed_so_far = String::new();
    let user_name = typed.map(move |key: &Value| {
        if let Some(key) = key.as_str().filter(|k| *k != "-") {
            typed_so_far.push_str(key);
        }
        json!(typed_so_far.clone())
    });

    let mut display = combine(
        |parts: &[Value]| json!(format!("screen type: {} | user name: {}", parts[0], parts[1])),
        vec![screen.boxed(), user_name.boxed()],
    );

    let typist = {
        let keys = keys.clone();
        thread::spawn(move || {
            for key in ["a", "d", "a"] {
                thread::sleep(Duration::from_millis(15));
                keys.next(json!(key));
            }
        })
    };

    let mut history = Vec::new();
    for frame in 0..12 {
        if frame == 8 {
            window_width.store(200, Ordering::Relaxed);
        }

        display.pull();
        let emission = display.get();
        history.push(emission.control_state);

        // nothing to redraw
        if emission.control_state == ControlState::Same {
            continue;
        }
        println!("  frame {frame:>2}: [{}] {}", emission.control_state, emission.output);

        thread::sleep(Duration::from_millis(10));
    }
    let _ = typist.join();
    keys.complete();

    display.pull();
    println!("\nAfter the keyboard closed: {}", display.get().control_state);

    let redraws = history.iter().filter(|s| **s != ControlState::Same).count();
    println!("Redrew {redraws} of {} frames", history.len());

    println!("\n=== Example Complete ===");
}
