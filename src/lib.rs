//! # ctlmap - Real-time control mapping
//!
//! Maps hardware controls onto path-addressed parameters.
//!
//! ## Architecture
//!
//! ctlmap is an umbrella crate that coordinates:
//! - **ctlmap-core** - Registry adapter, typed messages, scaling metadata
//! - **ctlmap-midi** - MIDI CC binding table with order-independent MIDI learn
//! - **ctlmap-automation** - Macro slots driving many parameters through curves
//!
//! ## Quick Start
//!
//! ```ignore
//! use ctlmap::prelude::*;
//!
//! let mut router = ControlRouter::builder(ports)
//!     .instance(synth)
//!     .on_error(|kind, path| eprintln!("{kind}: {path}"))
//!     .build()?;
//!
//! // Plain CC binding
//! router.table_mut().bind(0, 7, "/volume")?;
//!
//! // Macro: one knob, two parameters, learned from the next CC
//! router.automation_mut().create_binding(0, "/filter/cutoff", true)?;
//! router.automation_mut().create_binding(0, "/filter/resonance", false)?;
//!
//! router.handle_raw(&[0xB0, 21, 0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Everything enabled (`full`)
//! - `midi` - MIDI CC binding table
//! - `automation` - Automation macro slots
//!
//! [`ControlRouter`] needs both `midi` and `automation`.

/// Re-export of ctlmap-core for direct access
pub use ctlmap_core as core;

pub use ctlmap_core::{
    metadata,
    Arg,
    CcAddress,
    ControlChange,
    ErrorKind,
    Message,
    Metadata,

    // Registry adapter
    Port,
    PortDispatch,
    PortInfo,
    PortResolver,
    PortTree,

    // Scaling
    Scale,
    Scaling,
    ValueType,
};

mod error;

pub use error::{Error, Result};

// MIDI binding table
#[cfg(feature = "midi")]
pub use ctlmap_midi as midi;

#[cfg(feature = "midi")]
pub use ctlmap_midi::{
    BindingSnapshot, LearnState, MidiBinding, MidiTable, MidiTableBuilder, ProcessOutcome,
    TableConfig,
};

// Automation
#[cfg(feature = "automation")]
pub use ctlmap_automation as automation;

#[cfg(feature = "automation")]
pub use ctlmap_automation::{
    AutomationBinding, AutomationConfig, AutomationCurve, AutomationManager,
    AutomationManagerBuilder, AutomationSlot, CurveShape,
};

#[cfg(all(feature = "midi", feature = "automation"))]
mod builder;
#[cfg(all(feature = "midi", feature = "automation"))]
mod router;

#[cfg(all(feature = "midi", feature = "automation"))]
pub use builder::ControlRouterBuilder;
#[cfg(all(feature = "midi", feature = "automation"))]
pub use router::{ControlRouter, Route};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Arg, ErrorKind, Message, Metadata, Port, PortDispatch, PortTree};

    #[cfg(all(feature = "midi", feature = "automation"))]
    pub use crate::{ControlRouter, Route};

    // MIDI
    #[cfg(feature = "midi")]
    pub use crate::midi::{MidiTable, ProcessOutcome};

    // Automation
    #[cfg(feature = "automation")]
    pub use crate::automation::{AutomationManager, CurveShape};
}
