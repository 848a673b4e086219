//! A single (channel, controller) → parameter path binding.

use ctlmap_core::{CcAddress, Metadata, ValueType, INVALID_MIDI};
use std::sync::Arc;

/// One entry of the [`MidiTable`](crate::MidiTable).
///
/// Entries are pre-allocated when the table is built. A free entry has the
/// sentinel [`INVALID_MIDI`] as channel and controller; entries are never
/// removed, only reset to that state.
#[derive(Debug, Clone)]
pub struct MidiBinding {
    channel: u8,
    controller: u8,
    path: String,
    value_type: ValueType,
    /// Scaling metadata, only cached for float parameters.
    metadata: Option<Arc<Metadata>>,
}

impl MidiBinding {
    pub(crate) fn free(path_capacity: usize) -> Self {
        Self {
            channel: INVALID_MIDI,
            controller: INVALID_MIDI,
            path: String::with_capacity(path_capacity),
            value_type: ValueType::Float,
            metadata: None,
        }
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.channel
    }

    #[inline]
    pub fn controller(&self) -> u8 {
        self.controller
    }

    /// `None` for a free entry.
    pub fn address(&self) -> Option<CcAddress> {
        (!self.is_free()).then(|| CcAddress::new(self.channel, self.controller))
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn metadata(&self) -> Option<&Arc<Metadata>> {
        self.metadata.as_ref()
    }

    /// Override the cached scaling metadata.
    pub fn set_metadata(&mut self, metadata: Option<Arc<Metadata>>) {
        self.metadata = metadata;
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.channel == INVALID_MIDI || self.controller == INVALID_MIDI
    }

    #[inline]
    pub(crate) fn matches(&self, channel: u8, controller: u8) -> bool {
        !self.is_free() && self.channel == channel && self.controller == controller
    }

    /// Caller has already checked `path` against the buffer capacity.
    pub(crate) fn assign(
        &mut self,
        channel: u8,
        controller: u8,
        path: &str,
        value_type: ValueType,
        metadata: Option<Arc<Metadata>>,
    ) {
        self.path.clear();
        self.path.push_str(path);
        self.channel = channel;
        self.controller = controller;
        self.value_type = value_type;
        self.metadata = match value_type {
            ValueType::Float => metadata,
            _ => None,
        };
    }

    pub(crate) fn invalidate(&mut self) {
        self.channel = INVALID_MIDI;
        self.controller = INVALID_MIDI;
        self.metadata = None;
    }
}
