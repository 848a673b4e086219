//! Core types for ctlmap.
//!
//! # Primary API
//!
//! - [`PortResolver`] / [`PortDispatch`]: the parameter registry adapter
//! - [`PortTree`]: exact-match registry for hosts without their own dispatch tree
//! - [`Message`] / [`Arg`]: typed, allocation-free messages
//! - [`Metadata`] / [`Scaling`]: parameter range and response description
//! - [`ControlChange`] / [`CcAddress`]: raw MIDI CC decoding
//! - [`ErrorKind`]: recoverable failure kinds reported through callbacks
//!
//! # Example
//!
//! ```
//! use ctlmap_core::{metadata, Arg, Message, Port, PortDispatch, PortTree};
//!
//! struct Synth { gain: f32 }
//!
//! let ports = PortTree::new()
//!     .with(
//!         Port::leaf("gain::f", |msg: &Message<'_>, synth: &mut Synth| {
//!             synth.gain = msg.arg(0).and_then(Arg::as_f32).unwrap_or(0.0);
//!         })
//!         .with_metadata(metadata! { "min" => 0.0, "max" => 2.0, "scale" => "linear" }),
//!     )
//!     .unwrap();
//!
//! let mut synth = Synth { gain: 1.0 };
//! ports.dispatch(&Message::new("/gain", Arg::Float(0.5)), &mut synth);
//! assert_eq!(synth.gain, 0.5);
//! ```

pub mod callback;
pub mod cc;
pub mod error;
pub mod message;
pub mod metadata;
pub mod port;
pub mod scale;

pub use cc::{CCNumber, CcAddress, ControlChange, MidiChannel};
pub use callback::{ErrorCallback, ErrorReporter, MessageCallback, MessageSink};
pub use error::{Error, ErrorKind, Result};
pub use message::{Arg, Message, ValueType};
pub use metadata::Metadata;
pub use port::{Port, PortDispatch, PortHandler, PortInfo, PortNode, PortResolver, PortTree};
pub use scale::{normalize_cc, Scale, Scaling, MIDI_CENTER};

/// Sentinel channel/controller value marking a free or unset MIDI address.
pub const INVALID_MIDI: u8 = 255;

/// Default fixed capacity for path buffers, in bytes.
pub const DEFAULT_PATH_CAPACITY: usize = 128;

/// Copy `src` into a pre-allocated path buffer without growing it.
///
/// Returns `false` (leaving `dst` untouched) if `src` exceeds `capacity`.
#[inline]
pub fn copy_path(dst: &mut String, src: &str, capacity: usize) -> bool {
    if src.len() > capacity {
        return false;
    }
    dst.clear();
    dst.push_str(src);
    true
}
