//! One entry point for incoming control changes.

use crate::builder::ControlRouterBuilder;
use ctlmap_automation::AutomationManager;
use ctlmap_core::{ControlChange, PortDispatch};
use ctlmap_midi::{MidiTable, ProcessOutcome};
use std::sync::Arc;

/// Where a control change ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Consumed by the automation manager (learned or applied to a slot).
    Automation,
    /// Passed to the binding table.
    Table(ProcessOutcome),
}

/// Binding table and automation manager over one registry.
///
/// Automation has priority: a learning slot or a slot bound to the CC takes
/// the event, everything else reaches the binding table.
pub struct ControlRouter<C> {
    pub(crate) table: MidiTable,
    pub(crate) automation: AutomationManager<C>,
}

impl<C> ControlRouter<C> {
    pub fn builder<P>(ports: Arc<P>) -> ControlRouterBuilder<C>
    where
        P: PortDispatch<C> + Send + Sync + 'static,
    {
        ControlRouterBuilder::new(ports)
    }

    pub fn table(&self) -> &MidiTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut MidiTable {
        &mut self.table
    }

    pub fn automation(&self) -> &AutomationManager<C> {
        &self.automation
    }

    pub fn automation_mut(&mut self) -> &mut AutomationManager<C> {
        &mut self.automation
    }

    /// Route one control change.
    pub fn handle_cc(&mut self, channel: u8, controller: u8, value: u8) -> Route {
        if self.automation.handle_midi(channel, controller, value) {
            Route::Automation
        } else {
            Route::Table(self.table.process(channel, controller, value))
        }
    }

    /// Route a raw MIDI 1.0 message. `None` for non-CC or malformed input.
    pub fn handle_raw(&mut self, bytes: &[u8]) -> Option<Route> {
        match ControlChange::parse(bytes) {
            Ok(Some(cc)) => Some(self.handle_cc(cc.channel, cc.controller, cc.value)),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("Ignoring MIDI message: {}", e);
                None
            }
        }
    }
}

impl<C> std::fmt::Debug for ControlRouter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlRouter")
            .field("table", &self.table)
            .field("automation", &self.automation)
            .finish()
    }
}
