use crate::binding::AutomationBinding;
use ctlmap_core::CcAddress;

/// A macro control: one value in `[0, 1]` fanned out to several bindings.
#[derive(Debug, Clone)]
pub struct AutomationSlot {
    active: bool,
    learning: bool,
    midi_cc: Option<CcAddress>,
    current_state: f32,
    bindings: Vec<AutomationBinding>,
}

impl AutomationSlot {
    pub(crate) fn new(bindings: usize, path_capacity: usize, control_points: usize) -> Self {
        Self {
            active: false,
            learning: false,
            midi_cc: None,
            current_state: 0.0,
            bindings: (0..bindings)
                .map(|_| AutomationBinding::free(path_capacity, control_points))
                .collect(),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_learning(&self) -> bool {
        self.learning
    }

    /// CC driving this slot, if one was learned or assigned.
    pub fn midi_cc(&self) -> Option<CcAddress> {
        self.midi_cc
    }

    pub fn current_state(&self) -> f32 {
        self.current_state
    }

    pub fn bindings(&self) -> &[AutomationBinding] {
        &self.bindings
    }

    pub fn binding(&self, index: usize) -> Option<&AutomationBinding> {
        self.bindings.get(index)
    }

    /// Bindings that currently receive values.
    pub fn active_bindings(&self) -> impl Iterator<Item = &AutomationBinding> {
        self.bindings.iter().filter(|b| b.is_active())
    }

    /// First used binding; its curve is the one edited by sub-value changes.
    pub fn primary(&self) -> Option<&AutomationBinding> {
        self.bindings.iter().find(|b| b.is_used())
    }

    pub(crate) fn primary_mut(&mut self) -> Option<&mut AutomationBinding> {
        self.bindings.iter_mut().find(|b| b.is_used())
    }

    pub(crate) fn binding_mut(&mut self, index: usize) -> Option<&mut AutomationBinding> {
        self.bindings.get_mut(index)
    }

    pub(crate) fn free_binding(&mut self) -> Option<(usize, &mut AutomationBinding)> {
        self.bindings.iter_mut().enumerate().find(|(_, b)| !b.is_used())
    }

    pub(crate) fn set_state(&mut self, value: f32) {
        self.current_state = value;
    }

    pub(crate) fn set_learning(&mut self, learning: bool) {
        self.learning = learning;
    }

    pub(crate) fn set_midi_cc(&mut self, cc: Option<CcAddress>) {
        self.midi_cc = cc;
    }

    /// Active while at least one binding is used.
    pub(crate) fn refresh_active(&mut self) {
        self.active = self.bindings.iter().any(|b| b.is_used());
    }

    pub(crate) fn reset(&mut self) {
        self.bindings.iter_mut().for_each(AutomationBinding::reset);
        self.active = false;
        self.learning = false;
        self.midi_cc = None;
        self.current_state = 0.0;
    }
}
