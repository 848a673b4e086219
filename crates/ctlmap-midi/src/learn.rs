//! Pending MIDI-learn record.
//!
//! A learn needs two halves: a controller (from an unbound CC event) and a
//! path (from the UI). Either may arrive first; the binding commits once both
//! are present. One learn is in flight per table.

use ctlmap_core::{copy_path, INVALID_MIDI};

/// Observable state of the pending learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnState<'a> {
    Idle,
    /// A CC arrived first; waiting for a path.
    AwaitingPath { channel: u8, controller: u8 },
    /// A path arrived first; waiting for a CC.
    AwaitingController { path: &'a str },
}

#[derive(Debug)]
pub(crate) struct PendingLearn {
    pub(crate) channel: u8,
    pub(crate) controller: u8,
    pub(crate) path: String,
    capacity: usize,
}

impl PendingLearn {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            channel: INVALID_MIDI,
            controller: INVALID_MIDI,
            path: String::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn set_controller(&mut self, channel: u8, controller: u8) {
        self.channel = channel;
        self.controller = controller;
    }

    /// `false` if `path` does not fit the buffer.
    pub(crate) fn set_path(&mut self, path: &str) -> bool {
        copy_path(&mut self.path, path, self.capacity)
    }

    /// Both halves present: the (channel, controller) to commit.
    pub(crate) fn ready(&self) -> Option<(u8, u8)> {
        (self.controller != INVALID_MIDI && !self.path.is_empty())
            .then_some((self.channel, self.controller))
    }

    pub(crate) fn reset(&mut self) {
        self.channel = INVALID_MIDI;
        self.controller = INVALID_MIDI;
        self.path.clear();
    }

    pub(crate) fn state(&self) -> LearnState<'_> {
        match (self.controller != INVALID_MIDI, self.path.is_empty()) {
            (true, true) => LearnState::AwaitingPath {
                channel: self.channel,
                controller: self.controller,
            },
            (false, false) => LearnState::AwaitingController { path: &self.path },
            _ => LearnState::Idle,
        }
    }
}
