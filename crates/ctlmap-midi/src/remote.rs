//! Remote `learn` / `register` operations.
//!
//! These let a UI drive the table through the same message dispatch it uses
//! for parameters. The host context must give mutable access to the table.

use crate::table::MidiTable;
use ctlmap_core::{Arg, Message, Port, PortTree};

impl MidiTable {
    /// `learn:s`: start (or complete) a MIDI learn for the path argument.
    pub fn learn_port<C>() -> Port<C>
    where
        C: AsMut<MidiTable> + 'static,
    {
        Port::leaf("learn:s", |msg: &Message<'_>, ctx: &mut C| {
            match msg.arg(0).and_then(Arg::as_str) {
                Some(path) => {
                    let _ = ctx.as_mut().begin_learn(path);
                }
                None => tracing::warn!("learn expects a path argument"),
            }
        })
    }

    /// `register:iis`: bind `(channel, controller, path)` directly, skipping learn.
    pub fn register_port<C>() -> Port<C>
    where
        C: AsMut<MidiTable> + 'static,
    {
        Port::leaf("register:iis", |msg: &Message<'_>, ctx: &mut C| {
            let channel = msg.arg(0).and_then(Arg::as_i32).and_then(|v| u8::try_from(v).ok());
            let controller = msg.arg(1).and_then(Arg::as_i32).and_then(|v| u8::try_from(v).ok());
            let path = msg.arg(2).and_then(Arg::as_str);
            match (channel, controller, path) {
                (Some(channel), Some(controller), Some(path)) => {
                    let _ = ctx.as_mut().bind(channel, controller, path);
                }
                _ => tracing::warn!("register expects (channel, controller, path)"),
            }
        })
    }

    /// Both remote operations in a tree, ready to mount under a directory.
    pub fn remote_ports<C>() -> PortTree<C>
    where
        C: AsMut<MidiTable> + 'static,
    {
        let mut tree = PortTree::new();
        for port in [Self::learn_port(), Self::register_port()] {
            if let Err(e) = tree.add(port) {
                tracing::error!("Failed to add remote port: {}", e);
            }
        }
        tree
    }
}
