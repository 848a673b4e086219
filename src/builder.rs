//! Builder for configuring and constructing a `ControlRouter`.

use crate::router::ControlRouter;
use crate::Result;
use ctlmap_automation::{AutomationConfig, AutomationManager, SharedPorts};
use ctlmap_core::{ErrorKind, Message, PortDispatch, PortResolver};
use ctlmap_midi::{MidiTable, TableConfig};
use std::sync::{Arc, Mutex};

type SharedErrorCallback = Arc<Mutex<dyn FnMut(ErrorKind, &str) + Send>>;

/// Both subsystems share the registry and, when set, the error callback.
///
/// # Example
///
/// ```ignore
/// let router = ControlRouter::builder(Arc::new(ports))
///     .table(TableConfig { capacity: 64, ..Default::default() })
///     .automation(AutomationConfig { slots: 8, ..Default::default() })
///     .instance(synth)
///     .on_message(|msg| outbound.push(msg.to_string()))
///     .build()?;
/// ```
pub struct ControlRouterBuilder<C> {
    resolver: Arc<dyn PortResolver + Send + Sync>,
    dispatcher: SharedPorts<C>,
    table: TableConfig,
    automation: AutomationConfig,
    instance: Option<C>,
    on_error: Option<SharedErrorCallback>,
    on_message: Option<Box<dyn FnMut(&Message<'_>) + Send>>,
}

impl<C> ControlRouterBuilder<C> {
    pub(crate) fn new<P>(ports: Arc<P>) -> Self
    where
        P: PortDispatch<C> + Send + Sync + 'static,
    {
        Self {
            resolver: ports.clone(),
            dispatcher: ports,
            table: TableConfig::default(),
            automation: AutomationConfig::default(),
            instance: None,
            on_error: None,
            on_message: None,
        }
    }

    pub fn table(mut self, config: TableConfig) -> Self {
        self.table = config;
        self
    }

    pub fn automation(mut self, config: AutomationConfig) -> Self {
        self.automation = config;
        self
    }

    /// Host context handed to automation dispatches.
    pub fn instance(mut self, instance: C) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Called with `(kind, path)` on every recovered failure in either subsystem.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ErrorKind, &str) + Send + 'static,
    {
        self.on_error = Some(Arc::new(Mutex::new(callback)));
        self
    }

    /// Receives every message built by the binding table.
    pub fn on_message<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Message<'_>) + Send + 'static,
    {
        self.on_message = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<ControlRouter<C>> {
        let mut table = MidiTable::builder(self.resolver).config(self.table);
        if let Some(sink) = self.on_message {
            table = table.on_message(sink);
        }

        let mut automation = AutomationManager::builder()
            .config(self.automation)
            .ports(self.dispatcher);
        if let Some(instance) = self.instance {
            automation = automation.instance(instance);
        }

        if let Some(callback) = self.on_error {
            let shared = callback.clone();
            table = table.on_error(move |kind, path: &str| forward(&shared, kind, path));
            automation = automation.on_error(move |kind, path: &str| forward(&callback, kind, path));
        }

        Ok(ControlRouter {
            table: table.build()?,
            automation: automation.build()?,
        })
    }
}

fn forward(callback: &SharedErrorCallback, kind: ErrorKind, path: &str) {
    match callback.lock() {
        Ok(mut cb) => cb(kind, path),
        Err(_) => tracing::warn!("Error callback poisoned, dropping {}: '{}'", kind, path),
    }
}
