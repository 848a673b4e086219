//! Automation macro slots.
//!
//! A slot holds one normalized value. Setting it evaluates every active
//! binding's curve and dispatches the result to the bound parameter, so a
//! single knob (or learned MIDI CC) can drive several parameters at once.

use crate::binding::{AutomationBinding, ParamRange};
use crate::slot::AutomationSlot;
use ctlmap_core::{
    CcAddress, ControlChange, Error, ErrorCallback, ErrorKind, ErrorReporter, Message,
    PortDispatch, Result, DEFAULT_PATH_CAPACITY,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_SLOTS: usize = 16;
pub const DEFAULT_BINDINGS_PER_SLOT: usize = 4;
pub const DEFAULT_CONTROL_POINTS: usize = 8;

/// Registry handle used by the manager.
pub type SharedPorts<C> = Arc<dyn PortDispatch<C> + Send + Sync>;

/// Sizing of an [`AutomationManager`], fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub slots: usize,
    pub bindings_per_slot: usize,
    /// `(x, y)` points per curve (at least 2).
    pub control_points: usize,
    /// Maximum path length in bytes.
    pub path_capacity: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            bindings_per_slot: DEFAULT_BINDINGS_PER_SLOT,
            control_points: DEFAULT_CONTROL_POINTS,
            path_capacity: DEFAULT_PATH_CAPACITY,
        }
    }
}

impl AutomationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.slots == 0 {
            return Err(Error::InvalidConfig("slot count must be > 0".into()));
        }
        if self.bindings_per_slot == 0 {
            return Err(Error::InvalidConfig("bindings per slot must be > 0".into()));
        }
        if self.control_points < crate::curve::MIN_CONTROL_POINTS {
            return Err(Error::InvalidConfig(format!(
                "control points must be >= {}",
                crate::curve::MIN_CONTROL_POINTS
            )));
        }
        if self.path_capacity == 0 {
            return Err(Error::InvalidConfig("path capacity must be > 0".into()));
        }
        Ok(())
    }

    fn slots(&self) -> Vec<AutomationSlot> {
        (0..self.slots)
            .map(|_| AutomationSlot::new(self.bindings_per_slot, self.path_capacity, self.control_points))
            .collect()
    }
}

/// Builder for [`AutomationManager`].
pub struct AutomationManagerBuilder<C> {
    config: AutomationConfig,
    ports: Option<SharedPorts<C>>,
    instance: Option<C>,
    on_error: Option<ErrorCallback>,
}

impl<C> AutomationManagerBuilder<C> {
    pub fn slots(mut self, slots: usize) -> Self {
        self.config.slots = slots;
        self
    }

    pub fn bindings_per_slot(mut self, bindings: usize) -> Self {
        self.config.bindings_per_slot = bindings;
        self
    }

    pub fn control_points(mut self, points: usize) -> Self {
        self.config.control_points = points;
        self
    }

    pub fn path_capacity(mut self, path_capacity: usize) -> Self {
        self.config.path_capacity = path_capacity;
        self
    }

    pub fn config(mut self, config: AutomationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ports(mut self, ports: SharedPorts<C>) -> Self {
        self.ports = Some(ports);
        self
    }

    pub fn instance(mut self, instance: C) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Called with `(kind, path)` on every recovered failure.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ErrorKind, &str) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<AutomationManager<C>> {
        self.config.validate()?;
        Ok(AutomationManager {
            slots: self.config.slots(),
            path_capacity: self.config.path_capacity,
            ports: self.ports,
            instance: self.instance,
            errors: ErrorReporter::new(self.on_error),
        })
    }
}

/// Fixed array of automation slots bound to a parameter registry.
///
/// `C` is the host context handed to every parameter dispatch. Both the
/// registry and the context must be set before values reach parameters;
/// until then slot values are stored but not applied.
///
/// # Example
///
/// ```ignore
/// let mut automation = AutomationManager::builder()
///     .ports(ports)
///     .instance(synth)
///     .build()?;
///
/// automation.create_binding(0, "/filter/cutoff", true)?;
/// automation.create_binding(0, "/filter/resonance", false)?;
/// automation.simple_slope(0, 1, -1.0, 1.0);
///
/// // First CC learns the slot, the rest move both parameters
/// automation.handle_midi(0, 21, 0);
/// automation.handle_midi(0, 21, 96);
/// ```
pub struct AutomationManager<C> {
    slots: Vec<AutomationSlot>,
    path_capacity: usize,
    ports: Option<SharedPorts<C>>,
    instance: Option<C>,
    errors: ErrorReporter,
}

impl<C> AutomationManager<C> {
    pub fn builder() -> AutomationManagerBuilder<C> {
        AutomationManagerBuilder {
            config: AutomationConfig::default(),
            ports: None,
            instance: None,
            on_error: None,
        }
    }

    /// Manager with `slots` slots of `bindings_per_slot` bindings, each curve
    /// holding `control_points` points. Zero sizes are raised to the minimum.
    pub fn new(slots: usize, bindings_per_slot: usize, control_points: usize) -> Self {
        let config = AutomationConfig {
            slots: slots.max(1),
            bindings_per_slot: bindings_per_slot.max(1),
            control_points: control_points.max(crate::curve::MIN_CONTROL_POINTS),
            path_capacity: DEFAULT_PATH_CAPACITY,
        };
        Self {
            slots: config.slots(),
            path_capacity: config.path_capacity,
            ports: None,
            instance: None,
            errors: ErrorReporter::default(),
        }
    }

    pub fn set_ports(&mut self, ports: SharedPorts<C>) {
        self.ports = Some(ports);
    }

    pub fn set_instance(&mut self, instance: C) {
        self.instance = Some(instance);
    }

    pub fn instance(&self) -> Option<&C> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut C> {
        self.instance.as_mut()
    }

    pub fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.errors.set(callback);
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot: usize) -> Option<&AutomationSlot> {
        self.slots.get(slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = &AutomationSlot> {
        self.slots.iter()
    }

    pub fn binding(&self, slot: usize, binding: usize) -> Option<&AutomationBinding> {
        self.slots.get(slot).and_then(|s| s.binding(binding))
    }

    fn binding_mut(&mut self, slot: usize, binding: usize) -> Option<&mut AutomationBinding> {
        let found = self.slots.get_mut(slot).and_then(|s| s.binding_mut(binding));
        if found.is_none() {
            tracing::warn!("No automation binding {} in slot {}", binding, slot);
        }
        found
    }

    // ==================== Bindings ====================

    /// Bind `path` into the first unused binding of `slot`.
    ///
    /// Returns the binding index. With `start_midi_learn`, the next CC seen by
    /// [`handle_midi`](Self::handle_midi) is assigned to the slot.
    pub fn create_binding(
        &mut self,
        slot: usize,
        path: &str,
        start_midi_learn: bool,
    ) -> std::result::Result<usize, ErrorKind> {
        if slot >= self.slots.len() {
            tracing::warn!("Automation slot {} out of range ({} slots)", slot, self.slots.len());
            self.errors.report(ErrorKind::CapacityExhausted, path);
            return Err(ErrorKind::CapacityExhausted);
        }

        let Some(ports) = self.ports.as_ref() else {
            tracing::warn!("Automation ports not set");
            self.errors.report(ErrorKind::BadPath, path);
            return Err(ErrorKind::BadPath);
        };

        let resolved = ports
            .resolve(path)
            .filter(|port| port.is_leaf())
            .map(|port| (port.value_type(), port.meta()));
        let (value_type, (range, scale_problem)) = match resolved {
            Some((Some(value_type), meta)) => (value_type, ParamRange::from_metadata(value_type, meta)),
            Some((None, _)) => {
                self.errors.report(ErrorKind::UnreadableMetadata, path);
                return Err(ErrorKind::UnreadableMetadata);
            }
            None => {
                self.errors.report(ErrorKind::BadPath, path);
                return Err(ErrorKind::BadPath);
            }
        };

        if path.len() > self.path_capacity {
            self.errors.report(ErrorKind::PathTooLong, path);
            return Err(ErrorKind::PathTooLong);
        }

        let target = &mut self.slots[slot];
        let Some((index, binding)) = target.free_binding() else {
            tracing::warn!("Automation slot {} has no free binding", slot);
            self.errors.report(ErrorKind::CapacityExhausted, path);
            return Err(ErrorKind::CapacityExhausted);
        };

        binding.assign(path, value_type, range);
        target.refresh_active();
        if start_midi_learn {
            target.set_learning(true);
        }
        // Bound with a linear fallback
        if let Some(kind) = scale_problem {
            self.errors.report(kind, path);
        }
        tracing::debug!(
            "Automation slot {} binding {} -> {} ({:?}, {}..{})",
            slot,
            index,
            path,
            value_type,
            range.min,
            range.max
        );
        Ok(index)
    }

    /// Free one binding. The slot deactivates once its last binding goes.
    pub fn clear_binding(&mut self, slot: usize, binding: usize) {
        if let Some(b) = self.binding_mut(slot, binding) {
            b.reset();
            self.slots[slot].refresh_active();
        }
    }

    /// Free every binding, forget the CC and stop learning.
    pub fn clear_slot(&mut self, slot: usize) {
        match self.slots.get_mut(slot) {
            Some(s) => s.reset(),
            None => tracing::warn!("Automation slot {} out of range", slot),
        }
    }

    /// Offset a binding from `base` instead of the parameter minimum.
    pub fn set_relative(&mut self, slot: usize, binding: usize, relative: bool, base: f32) {
        if let Some(b) = self.binding_mut(slot, binding) {
            b.set_relative(relative, base);
        }
    }

    /// Pause or resume a binding without freeing it.
    pub fn set_binding_active(&mut self, slot: usize, binding: usize, active: bool) {
        if let Some(b) = self.binding_mut(slot, binding) {
            b.set_active(active);
        }
    }

    // ==================== Curves ====================

    /// Linear two-point curve `(0, offset) -> (1, offset + slope)`, in
    /// parameter units.
    pub fn simple_slope(&mut self, slot: usize, binding: usize, slope: f32, offset: f32) {
        if let Some(b) = self.binding_mut(slot, binding) {
            b.curve_mut().set_slope(slope, offset);
        }
    }

    /// Replace a binding's control points and switch it to piecewise linear.
    pub fn set_curve(
        &mut self,
        slot: usize,
        binding: usize,
        points: &[(f32, f32)],
    ) -> std::result::Result<(), ErrorKind> {
        let Some(b) = self.binding_mut(slot, binding) else {
            return Err(ErrorKind::CapacityExhausted);
        };
        let result = b.curve_mut().set_points(points);
        if result.is_err() {
            // Split the borrow so the path can be reported
            let b = &self.slots[slot].bindings()[binding];
            self.errors.report(ErrorKind::CapacityExhausted, b.path());
        }
        result
    }

    /// Overwrite control-point float `sub` of the slot's first used binding.
    ///
    /// Does not push a new value to the parameter.
    pub fn set_slot_sub(&mut self, slot: usize, sub: usize, value: f32) {
        let Some(primary) = self.slots.get_mut(slot).and_then(AutomationSlot::primary_mut) else {
            tracing::debug!("Automation slot {} has no binding to edit", slot);
            return;
        };
        if !primary.curve_mut().set_raw(sub, value) {
            tracing::warn!("Control point index {} out of range in slot {}", sub, slot);
        }
    }

    // ==================== Values ====================

    /// Set a slot to `value` (clamped to `[0, 1]`) and apply it to every
    /// active binding.
    pub fn set_slot(&mut self, slot: usize, value: f32) {
        let Some(target) = self.slots.get_mut(slot) else {
            tracing::warn!("Automation slot {} out of range", slot);
            return;
        };
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        target.set_state(value);

        let (Some(ports), Some(instance)) = (self.ports.as_ref(), self.instance.as_mut()) else {
            tracing::debug!("Automation slot {} stored, ports or instance not set", slot);
            return;
        };

        for binding in target.active_bindings() {
            let msg = Message::new(binding.path(), binding.arg_at(value));
            if !ports.dispatch(&msg, instance) {
                tracing::warn!("Automation target {} not handled", binding.path());
            }
        }
    }

    /// Current value of a slot (`0.0` if out of range).
    pub fn get_slot(&self, slot: usize) -> f32 {
        self.slots.get(slot).map_or(0.0, AutomationSlot::current_state)
    }

    // ==================== MIDI ====================

    /// Put a slot into learn mode; the next CC is assigned to it.
    pub fn start_learn(&mut self, slot: usize) {
        match self.slots.get_mut(slot) {
            Some(s) => s.set_learning(true),
            None => tracing::warn!("Automation slot {} out of range", slot),
        }
    }

    pub fn cancel_learn(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.set_learning(false);
        }
    }

    /// Assign (or with `None`, remove) a slot's CC without learning.
    ///
    /// Any other slot holding the same CC loses it.
    pub fn set_midi_cc(&mut self, slot: usize, cc: Option<CcAddress>) {
        if slot >= self.slots.len() {
            tracing::warn!("Automation slot {} out of range", slot);
            return;
        }
        if let Some(cc) = cc {
            self.release_cc(cc);
        }
        self.slots[slot].set_midi_cc(cc);
    }

    fn release_cc(&mut self, cc: CcAddress) {
        for s in self.slots.iter_mut().filter(|s| s.midi_cc() == Some(cc)) {
            s.set_midi_cc(None);
        }
    }

    /// Route a CC event.
    ///
    /// A learning slot takes the CC and consumes the event without applying
    /// it. Otherwise the active slot bound to the CC is set to `val / 127`.
    /// Returns `false` if nothing used the event.
    pub fn handle_midi(&mut self, channel: u8, cc: u8, val: u8) -> bool {
        let address = CcAddress::new(channel, cc);

        if let Some(index) = self.slots.iter().position(AutomationSlot::is_learning) {
            self.release_cc(address);
            let slot = &mut self.slots[index];
            slot.set_midi_cc(Some(address));
            slot.set_learning(false);
            tracing::debug!("Automation slot {} learned CC {} on channel {}", index, cc, channel);
            return true;
        }

        let bound = self.slots.iter().position(|s| {
            s.is_active() && s.midi_cc().is_some_and(|a| a.matches(channel, cc))
        });
        match bound {
            Some(index) => {
                self.set_slot(index, f32::from(val) / 127.0);
                true
            }
            None => false,
        }
    }

    /// Route a raw MIDI 1.0 message. Non-CC and malformed input is ignored.
    pub fn handle_raw(&mut self, bytes: &[u8]) -> bool {
        match ControlChange::parse(bytes) {
            Ok(Some(cc)) => self.handle_midi(cc.channel, cc.controller, cc.value),
            Ok(None) => false,
            Err(e) => {
                tracing::debug!("Ignoring MIDI message: {}", e);
                false
            }
        }
    }
}

impl<C> std::fmt::Debug for AutomationManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationManager")
            .field("slots", &self.slots.len())
            .field("active", &self.slots.iter().filter(|s| s.is_active()).count())
            .field("ports", &self.ports.is_some())
            .field("instance", &self.instance.is_some())
            .field("errors", &self.errors)
            .finish()
    }
}
