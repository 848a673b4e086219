//! MIDI CC binding table for ctlmap.
//!
//! Binds (channel, controller) pairs to parameter paths, translates CC values
//! into each parameter's native type, and runs an order-independent MIDI learn.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ctlmap_core::{metadata, Message, Port, PortTree};
//! use ctlmap_midi::MidiTable;
//!
//! let ports = PortTree::new()
//!     .with(
//!         Port::leaf("volume::f", |_: &Message<'_>, _: &mut ()| {})
//!             .with_metadata(metadata! { "min" => 0, "max" => 1, "scale" => "linear" }),
//!     )
//!     .unwrap();
//!
//! let mut table = MidiTable::builder(Arc::new(ports))
//!     .on_message(|msg| println!("{msg}"))
//!     .build()
//!     .unwrap();
//!
//! // Twist a knob nobody has bound yet, then pick the parameter
//! table.process(0, 7, 0);
//! table.begin_learn("/volume").unwrap();
//! assert!(table.is_bound(0, 7));
//! ```

mod binding;
mod learn;
mod remote;
mod snapshot;
mod table;
mod translate;

pub use binding::MidiBinding;
pub use learn::LearnState;
pub use snapshot::BindingSnapshot;
pub use table::{MidiTable, MidiTableBuilder, ProcessOutcome, TableConfig, DEFAULT_TABLE_CAPACITY};
pub use translate::{translate, try_translate};

pub use ctlmap_core::{Error, ErrorKind, Result};
