//! MIDI Control Change addressing and raw-message parsing.

use crate::error::Result;
use midly::live::LiveEvent;
use midly::MidiMessage;
use serde::{Deserialize, Serialize};

/// MIDI CC number (0-127)
pub type CCNumber = u8;

/// MIDI channel (0-15, where 0 = channel 1)
pub type MidiChannel = u8;

/// A (channel, controller) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CcAddress {
    pub channel: MidiChannel,
    pub controller: CCNumber,
}

impl CcAddress {
    pub const fn new(channel: MidiChannel, controller: CCNumber) -> Self {
        Self {
            channel,
            controller,
        }
    }

    #[inline]
    pub fn matches(&self, channel: MidiChannel, controller: CCNumber) -> bool {
        self.channel == channel && self.controller == controller
    }
}

/// A decoded Control Change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlChange {
    pub channel: MidiChannel,
    pub controller: CCNumber,
    pub value: u8,
}

impl ControlChange {
    /// Parse a raw MIDI 1.0 message.
    ///
    /// Returns `Ok(None)` for well-formed messages that are not Control Change.
    pub fn parse(bytes: &[u8]) -> Result<Option<Self>> {
        match LiveEvent::parse(bytes)? {
            LiveEvent::Midi {
                channel,
                message: MidiMessage::Controller { controller, value },
            } => Ok(Some(Self {
                channel: channel.as_int(),
                controller: controller.as_int(),
                value: value.as_int(),
            })),
            _ => Ok(None),
        }
    }

    #[inline]
    pub fn address(&self) -> CcAddress {
        CcAddress::new(self.channel, self.controller)
    }
}
