//! Test fixtures for ctlmap integration tests.
//!
//! A small synth whose parameters cover every bindable value type, plus
//! recorders for the error and message callbacks.

#![allow(dead_code)]

pub mod tolerances;

use ctlmap::prelude::*;
use std::sync::{Arc, Mutex};

/// Route tracing output to the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Parameter state written by port handlers.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Synth {
    pub volume: f32,
    pub pan: f32,
    pub cutoff: f32,
    pub resonance: f32,
    pub voices: i32,
    pub bypass: bool,
    pub writes: usize,
}

fn float_port(name: &str, set: fn(&mut Synth, f32), meta: Metadata) -> Port<Synth> {
    Port::leaf(name, move |msg: &Message<'_>, s: &mut Synth| {
        if let Some(v) = msg.arg(0).and_then(Arg::as_f32) {
            set(s, v);
            s.writes += 1;
        }
    })
    .with_metadata(meta)
}

/// `/volume`, `/pan`, `/voices`, `/bypass`, `/label`, `/filter/cutoff`,
/// `/filter/resonance`.
pub fn synth_ports() -> Arc<PortTree<Synth>> {
    let filter = PortTree::new()
        .with(float_port(
            "cutoff::f",
            |s, v| s.cutoff = v,
            ctlmap::metadata! { "min" => 20, "max" => 20000, "scale" => "logarithmic" },
        ))
        .expect("cutoff")
        .with(float_port(
            "resonance::f",
            |s, v| s.resonance = v,
            ctlmap::metadata! { "min" => 0, "max" => 1, "scale" => "linear" },
        ))
        .expect("resonance");

    let tree = PortTree::new()
        .with(float_port(
            "volume::f",
            |s, v| s.volume = v,
            ctlmap::metadata! { "min" => 0, "max" => 1, "scale" => "linear" },
        ))
        .expect("volume")
        .with(float_port(
            "pan::f",
            |s, v| s.pan = v,
            ctlmap::metadata! { "min" => -1, "max" => 1, "scale" => "linear" },
        ))
        .expect("pan")
        .with(
            Port::leaf("voices::i", |msg: &Message<'_>, s: &mut Synth| {
                if let Some(v) = msg.arg(0).and_then(Arg::as_i32) {
                    s.voices = v;
                    s.writes += 1;
                }
            })
            .with_metadata(ctlmap::metadata! { "min" => 1, "max" => 16 }),
        )
        .expect("voices")
        .with(Port::leaf("bypass::T:F", |msg: &Message<'_>, s: &mut Synth| {
            if let Some(v) = msg.arg(0).and_then(Arg::as_bool) {
                s.bypass = v;
                s.writes += 1;
            }
        }))
        .expect("bypass")
        .with(Port::leaf("label::s", |_: &Message<'_>, _: &mut Synth| {}))
        .expect("label")
        .with(Port::dir("filter", filter))
        .expect("filter");

    Arc::new(tree)
}

/// Shared log of `(kind, path)` error reports.
pub type ErrorLog = Arc<Mutex<Vec<(ErrorKind, String)>>>;

pub fn error_log() -> (ErrorLog, impl FnMut(ErrorKind, &str) + Send + 'static) {
    let log: ErrorLog = Arc::default();
    let sink = log.clone();
    (log, move |kind, path: &str| {
        sink.lock().unwrap().push((kind, path.to_string()))
    })
}

/// Shared log of outbound messages, rendered with `Display`.
pub type MessageLog = Arc<Mutex<Vec<String>>>;

pub fn message_log() -> (MessageLog, impl FnMut(&Message<'_>) + Send + 'static) {
    let log: MessageLog = Arc::default();
    let sink = log.clone();
    (log, move |msg: &Message<'_>| {
        sink.lock().unwrap().push(msg.to_string())
    })
}

/// Apply logged table messages to a synth, the way a host would.
pub fn apply(ports: &PortTree<Synth>, synth: &mut Synth, log: &MessageLog) {
    // Logged messages are strings; re-parse the single float/int/bool argument
    for line in log.lock().unwrap().drain(..) {
        let mut parts = line.splitn(3, ' ');
        let (Some(path), Some(tags), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let arg = match tags {
            ",f" => Arg::Float(value.parse().unwrap()),
            ",i" => Arg::Int(value.parse().unwrap()),
            ",T" => Arg::Bool(true),
            ",F" => Arg::Bool(false),
            _ => continue,
        };
        ports.dispatch(&Message::new(path, arg), synth);
    }
}
