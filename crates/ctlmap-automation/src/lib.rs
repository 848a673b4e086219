//! Automation macros for ctlmap.
//!
//! An [`AutomationManager`] owns a fixed set of slots. Each slot drives up to
//! N parameters through per-binding response curves and can follow a learned
//! MIDI CC.
//!
//! ```
//! use std::sync::Arc;
//! use ctlmap_automation::AutomationManager;
//! use ctlmap_core::{metadata, Arg, Message, Port, PortTree};
//!
//! #[derive(Default)]
//! struct Synth {
//!     gain: f32,
//! }
//!
//! let ports = PortTree::new()
//!     .with(
//!         Port::leaf("gain::f", |msg: &Message<'_>, s: &mut Synth| {
//!             s.gain = msg.arg(0).and_then(Arg::as_f32).unwrap_or_default();
//!         })
//!         .with_metadata(metadata! { "min" => 0, "max" => 2 }),
//!     )
//!     .unwrap();
//!
//! let mut automation = AutomationManager::<Synth>::builder()
//!     .ports(Arc::new(ports))
//!     .instance(Synth::default())
//!     .build()
//!     .unwrap();
//!
//! automation.create_binding(0, "/gain", false).unwrap();
//! automation.set_slot(0, 0.5);
//! assert_eq!(automation.instance().unwrap().gain, 1.0);
//! ```

mod binding;
mod curve;
mod manager;
mod slot;

pub use binding::AutomationBinding;
pub use curve::{AutomationCurve, CurveShape, MIN_CONTROL_POINTS};
pub use manager::{
    AutomationConfig, AutomationManager, AutomationManagerBuilder, SharedPorts,
    DEFAULT_BINDINGS_PER_SLOT, DEFAULT_CONTROL_POINTS, DEFAULT_SLOTS,
};
pub use slot::AutomationSlot;

pub use ctlmap_core::{Error, ErrorKind, Result};
