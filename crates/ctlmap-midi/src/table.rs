//! Fixed-capacity MIDI CC binding table with MIDI learn.

use crate::binding::MidiBinding;
use crate::learn::{LearnState, PendingLearn};
use crate::translate::try_translate;
use ctlmap_core::{
    Arg, ControlChange, Error, ErrorCallback, ErrorKind, ErrorReporter, Message, MessageCallback,
    MessageSink, PortResolver, Result, ValueType, DEFAULT_PATH_CAPACITY, INVALID_MIDI,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of table entries.
pub const DEFAULT_TABLE_CAPACITY: usize = 128;

/// Sizing of a [`MidiTable`], fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of bindings.
    pub capacity: usize,
    /// Maximum path length in bytes.
    pub path_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TABLE_CAPACITY,
            path_capacity: DEFAULT_PATH_CAPACITY,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("table capacity must be > 0".into()));
        }
        if self.path_capacity == 0 {
            return Err(Error::InvalidConfig("path capacity must be > 0".into()));
        }
        Ok(())
    }
}

/// What [`MidiTable::process`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Bound: a message went to the sink.
    Delivered,
    /// Unbound: recorded as the pending learn controller.
    Pending,
    /// Unbound: completed a pending learn (the bind itself may have failed).
    Committed,
}

/// Builder for [`MidiTable`].
pub struct MidiTableBuilder {
    ports: Arc<dyn PortResolver + Send + Sync>,
    config: TableConfig,
    on_error: Option<ErrorCallback>,
    on_message: Option<MessageCallback>,
}

impl MidiTableBuilder {
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn path_capacity(mut self, path_capacity: usize) -> Self {
        self.config.path_capacity = path_capacity;
        self
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
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

    /// Receives every message built by [`MidiTable::process`].
    pub fn on_message<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Message<'_>) + Send + 'static,
    {
        self.on_message = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<MidiTable> {
        self.config.validate()?;
        let TableConfig {
            capacity,
            path_capacity,
        } = self.config;

        Ok(MidiTable {
            ports: self.ports,
            entries: (0..capacity)
                .map(|_| MidiBinding::free(path_capacity))
                .collect(),
            path_capacity,
            pending: PendingLearn::new(path_capacity),
            errors: ErrorReporter::new(self.on_error),
            sink: MessageSink::new(self.on_message),
        })
    }
}

/// Maps (channel, controller) pairs to parameter paths.
///
/// All storage is allocated in the builder. `process`, `bind` and the learn
/// operations reuse pre-sized buffers and do linear scans over the table.
/// Callers serialize access; the table holds no locks.
///
/// # Example
///
/// ```ignore
/// let mut table = MidiTable::builder(ports)
///     .on_message(|msg| synth_queue.push(msg))
///     .build()?;
///
/// table.bind(0, 7, "/synth/volume")?;
/// table.process(0, 7, 100);
///
/// // MIDI learn: path first, then twist a knob (or the other way around)
/// table.begin_learn("/synth/filter/cutoff")?;
/// table.process(0, 74, 12);
/// assert!(table.is_bound(0, 74));
/// ```
pub struct MidiTable {
    ports: Arc<dyn PortResolver + Send + Sync>,
    entries: Vec<MidiBinding>,
    path_capacity: usize,
    pending: PendingLearn,
    errors: ErrorReporter,
    sink: MessageSink,
}

impl MidiTable {
    pub fn builder(ports: Arc<dyn PortResolver + Send + Sync>) -> MidiTableBuilder {
        MidiTableBuilder {
            ports,
            config: TableConfig::default(),
            on_error: None,
            on_message: None,
        }
    }

    /// Table with the default sizing and no callbacks.
    pub fn new(ports: Arc<dyn PortResolver + Send + Sync>) -> Self {
        let TableConfig {
            capacity,
            path_capacity,
        } = TableConfig::default();
        Self {
            ports,
            entries: (0..capacity)
                .map(|_| MidiBinding::free(path_capacity))
                .collect(),
            path_capacity,
            pending: PendingLearn::new(path_capacity),
            errors: ErrorReporter::default(),
            sink: MessageSink::default(),
        }
    }

    pub fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.errors.set(callback);
    }

    pub fn set_message_callback(&mut self, callback: MessageCallback) {
        self.sink.set(callback);
    }

    pub fn ports(&self) -> &Arc<dyn PortResolver + Send + Sync> {
        &self.ports
    }

    // ==================== Bindings ====================

    /// Bind `(channel, controller)` to `path`.
    ///
    /// Re-binding an existing pair overwrites it in place. Failures are
    /// reported to the error callback and returned.
    pub fn bind(&mut self, channel: u8, controller: u8, path: &str) -> std::result::Result<(), ErrorKind> {
        let resolved = self
            .ports
            .resolve(path)
            .filter(|port| port.is_leaf())
            .map(|port| (port.value_type(), port.metadata.cloned()));

        let Some((value_type, metadata)) = resolved else {
            self.errors.report(ErrorKind::BadPath, path);
            return Err(ErrorKind::BadPath);
        };

        if channel == INVALID_MIDI || controller == INVALID_MIDI {
            self.errors.report(ErrorKind::BadPath, path);
            return Err(ErrorKind::BadPath);
        }

        if path.len() > self.path_capacity {
            self.errors.report(ErrorKind::PathTooLong, path);
            return Err(ErrorKind::PathTooLong);
        }

        let existing = self.entries.iter().position(|e| e.matches(channel, controller));
        let Some(index) = existing.or_else(|| self.entries.iter().position(MidiBinding::is_free))
        else {
            self.errors.report(ErrorKind::CapacityExhausted, path);
            return Err(ErrorKind::CapacityExhausted);
        };

        let entry = &mut self.entries[index];
        match value_type {
            Some(value_type) => {
                entry.assign(channel, controller, path, value_type, metadata);
                tracing::debug!(
                    "Bound CC {} on channel {} to {} ({:?})",
                    controller,
                    channel,
                    path,
                    value_type
                );
                Ok(())
            }
            None => {
                // Only a re-bound entry holds state worth clearing
                if existing.is_some() {
                    entry.invalidate();
                }
                self.errors.report(ErrorKind::UnreadableMetadata, path);
                Err(ErrorKind::UnreadableMetadata)
            }
        }
    }

    /// Reset a binding to free. Returns `false` if it was not bound.
    pub fn unbind(&mut self, channel: u8, controller: u8) -> bool {
        match self.lookup_mut(channel, controller) {
            Some(entry) => {
                entry.invalidate();
                true
            }
            None => false,
        }
    }

    /// Free every entry. The pending learn is left alone.
    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(MidiBinding::invalidate);
    }

    pub fn is_bound(&self, channel: u8, controller: u8) -> bool {
        self.entries.iter().any(|e| e.matches(channel, controller))
    }

    pub fn lookup(&self, channel: u8, controller: u8) -> Option<&MidiBinding> {
        self.entries.iter().find(|e| e.matches(channel, controller))
    }

    pub fn lookup_mut(&mut self, channel: u8, controller: u8) -> Option<&mut MidiBinding> {
        self.entries.iter_mut().find(|e| e.matches(channel, controller))
    }

    /// Live (non-free) bindings in table order.
    pub fn iter(&self) -> impl Iterator<Item = &MidiBinding> {
        self.entries.iter().filter(|e| !e.is_free())
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(MidiBinding::is_free)
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn path_capacity(&self) -> usize {
        self.path_capacity
    }

    // ==================== MIDI Learn ====================

    /// Supply the path half of a MIDI learn.
    ///
    /// Commits immediately if a controller is already pending.
    pub fn begin_learn(&mut self, path: &str) -> std::result::Result<(), ErrorKind> {
        if !self.pending.set_path(path) {
            self.errors.report(ErrorKind::PathTooLong, path);
            return Err(ErrorKind::PathTooLong);
        }
        self.check_learn();
        Ok(())
    }

    /// Drop whatever half of a learn is pending.
    pub fn cancel_learn(&mut self) {
        self.pending.reset();
    }

    pub fn pending_learn(&self) -> LearnState<'_> {
        self.pending.state()
    }

    pub fn is_learning(&self) -> bool {
        !matches!(self.pending.state(), LearnState::Idle)
    }

    /// Commit the pending learn if both halves are present.
    fn check_learn(&mut self) -> bool {
        let Some((channel, controller)) = self.pending.ready() else {
            return false;
        };

        // Borrow the path buffer out so `bind` can take `&mut self`
        let path = std::mem::take(&mut self.pending.path);
        if self.bind(channel, controller, &path).is_ok() {
            tracing::debug!("MIDI learn completed: CC {} on channel {} -> {}", controller, channel, path);
        }
        self.pending.path = path;
        self.pending.reset();
        true
    }

    // ==================== Processing ====================

    /// Handle a CC event. Real-time safe.
    ///
    /// Bound pairs are translated to the parameter's native type and handed to
    /// the message sink. Unbound pairs feed the pending MIDI learn.
    pub fn process(&mut self, channel: u8, controller: u8, value: u8) -> ProcessOutcome {
        let Some(entry) = self.entries.iter().find(|e| e.matches(channel, controller)) else {
            self.pending.set_controller(channel, controller);
            return if self.check_learn() {
                ProcessOutcome::Committed
            } else {
                ProcessOutcome::Pending
            };
        };

        let arg = match entry.value_type() {
            ValueType::Float => {
                let translated = match entry.metadata() {
                    Some(meta) => try_translate(value, meta),
                    None => Err(ErrorKind::UnreadableMetadata),
                };
                match translated {
                    Ok(v) => Arg::Float(v),
                    Err(ErrorKind::UnknownScale) => {
                        tracing::debug!("Unknown scale for {}, sending 0.0", entry.path());
                        Arg::Float(0.0)
                    }
                    Err(kind) => {
                        self.errors.report(kind, entry.path());
                        Arg::Float(0.0)
                    }
                }
            }
            ValueType::Int => Arg::Int(value as i32),
            ValueType::Bool => Arg::Bool(value >= 64),
            ValueType::Char => Arg::Char(value as char),
        };

        self.sink.deliver(&Message::new(entry.path(), arg));
        ProcessOutcome::Delivered
    }

    /// Parse a raw MIDI message and process it if it is a Control Change.
    ///
    /// Returns `None` for other or malformed messages.
    pub fn process_raw(&mut self, bytes: &[u8]) -> Option<ProcessOutcome> {
        match ControlChange::parse(bytes) {
            Ok(Some(cc)) => Some(self.process(cc.channel, cc.controller, cc.value)),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("Ignoring MIDI message: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for MidiTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiTable")
            .field("bound", &self.len())
            .field("capacity", &self.capacity())
            .field("pending", &self.pending.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctlmap_core::{Metadata, Port, PortTree};
    use std::sync::Mutex;

    type Sent = Arc<Mutex<Vec<(String, String)>>>;
    type Errors = Arc<Mutex<Vec<(ErrorKind, String)>>>;

    fn ports() -> Arc<PortTree<()>> {
        let noop = |_: &Message<'_>, _: &mut ()| {};
        Arc::new(
            PortTree::new()
                .with(Port::leaf("volume::f", noop).with_metadata(
                    Metadata::new().with("min", -1).with("max", 1).with("scale", "linear"),
                ))
                .unwrap()
                .with(Port::leaf("program::i", noop))
                .unwrap()
                .with(Port::leaf("bypass::T:F", noop))
                .unwrap()
                .with(Port::leaf("key::c", noop))
                .unwrap()
                .with(Port::leaf("name::s", noop))
                .unwrap()
                .with(Port::leaf("raw::f", noop))
                .unwrap()
                .with(Port::dir("filter", PortTree::new()))
                .unwrap(),
        )
    }

    fn table(capacity: usize) -> (MidiTable, Sent, Errors) {
        let sent: Sent = Arc::default();
        let errors: Errors = Arc::default();
        let sent_cb = Arc::clone(&sent);
        let errors_cb = Arc::clone(&errors);
        let table = MidiTable::builder(ports())
            .capacity(capacity)
            .on_message(move |msg| sent_cb.lock().unwrap().push((msg.path().to_string(), msg.to_string())))
            .on_error(move |kind, path| errors_cb.lock().unwrap().push((kind, path.to_string())))
            .build()
            .unwrap();
        (table, sent, errors)
    }

    #[test]
    fn test_bind_and_lookup() {
        let (mut table, _, _) = table(8);
        table.bind(0, 7, "/volume").unwrap();

        assert!(table.is_bound(0, 7));
        assert!(!table.is_bound(1, 7));
        let entry = table.lookup(0, 7).unwrap();
        assert_eq!(entry.path(), "/volume");
        assert_eq!(entry.value_type(), ValueType::Float);
        assert!(entry.metadata().is_some());
    }

    #[test]
    fn test_value_types_from_signature() {
        let (mut table, _, _) = table(8);
        table.bind(0, 1, "/program").unwrap();
        table.bind(0, 2, "/bypass").unwrap();
        table.bind(0, 3, "/key").unwrap();

        assert_eq!(table.lookup(0, 1).unwrap().value_type(), ValueType::Int);
        assert_eq!(table.lookup(0, 2).unwrap().value_type(), ValueType::Bool);
        assert_eq!(table.lookup(0, 3).unwrap().value_type(), ValueType::Char);
        assert!(table.lookup(0, 1).unwrap().metadata().is_none());
    }

    #[test]
    fn test_rebind_in_place() {
        let (mut table, _, _) = table(8);
        for _ in 0..5 {
            table.bind(2, 10, "/volume").unwrap();
        }
        table.bind(2, 10, "/program").unwrap();

        assert_eq!(table.len(), 1);
        let entry = table.lookup(2, 10).unwrap();
        assert_eq!(entry.path(), "/program");
        assert_eq!(entry.value_type(), ValueType::Int);
    }

    #[test]
    fn test_bad_paths() {
        let (mut table, _, errors) = table(8);
        assert_eq!(table.bind(0, 1, "/missing"), Err(ErrorKind::BadPath));
        assert_eq!(table.bind(0, 1, "/filter"), Err(ErrorKind::BadPath));
        assert!(table.is_empty());

        let errors = errors.lock().unwrap();
        assert_eq!(errors[0], (ErrorKind::BadPath, "/missing".to_string()));
        assert_eq!(errors[1], (ErrorKind::BadPath, "/filter".to_string()));
    }

    #[test]
    fn test_unreadable_signature_invalidates_rebind() {
        let (mut table, _, errors) = table(8);
        assert_eq!(table.bind(0, 1, "/name"), Err(ErrorKind::UnreadableMetadata));
        assert!(table.is_empty());

        table.bind(0, 1, "/volume").unwrap();
        assert_eq!(table.bind(0, 1, "/name"), Err(ErrorKind::UnreadableMetadata));
        assert!(!table.is_bound(0, 1));
        assert_eq!(errors.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_capacity_exhausted() {
        let (mut table, _, errors) = table(2);
        table.bind(0, 1, "/volume").unwrap();
        table.bind(0, 2, "/program").unwrap();

        assert_eq!(table.bind(0, 3, "/key"), Err(ErrorKind::CapacityExhausted));
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(0, 1).unwrap().path(), "/volume");
        assert_eq!(table.lookup(0, 2).unwrap().path(), "/program");
        assert!(!table.is_bound(0, 3));
        assert_eq!(
            errors.lock().unwrap().last(),
            Some(&(ErrorKind::CapacityExhausted, "/key".to_string()))
        );

        // Re-binding an existing pair still works when full
        table.bind(0, 2, "/key").unwrap();
        assert_eq!(table.lookup(0, 2).unwrap().value_type(), ValueType::Char);
    }

    #[test]
    fn test_process_float_scenario() {
        let (mut table, sent, _) = table(8);
        table.bind(0, 7, "/volume").unwrap();

        assert_eq!(table.process(0, 7, 64), ProcessOutcome::Delivered);
        assert_eq!(table.process(0, 7, 127), ProcessOutcome::Delivered);

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].1, "/volume ,f 0");
        assert_eq!(sent[1].1, "/volume ,f 1");
    }

    #[test]
    fn test_process_bool_threshold() {
        let (mut table, sent, _) = table(8);
        table.bind(0, 64, "/bypass").unwrap();
        table.process(0, 64, 63);
        table.process(0, 64, 64);

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].1, "/bypass ,F false");
        assert_eq!(sent[1].1, "/bypass ,T true");
    }

    #[test]
    fn test_process_int_and_char_pass_through() {
        let (mut table, sent, _) = table(8);
        table.bind(0, 1, "/program").unwrap();
        table.bind(0, 2, "/key").unwrap();
        table.process(0, 1, 42);
        table.process(0, 2, 65);

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].1, "/program ,i 42");
        assert_eq!(sent[1].1, "/key ,c 'A'");
    }

    #[test]
    fn test_float_without_scaling_reports() {
        let (mut table, sent, errors) = table(8);
        table.bind(0, 5, "/raw").unwrap();
        table.process(0, 5, 100);

        assert_eq!(sent.lock().unwrap()[0].1, "/raw ,f 0");
        assert_eq!(
            errors.lock().unwrap()[0],
            (ErrorKind::UnreadableMetadata, "/raw".to_string())
        );
    }

    #[test]
    fn test_unknown_scale_is_not_reported() {
        let (mut table, sent, errors) = table(8);
        table.bind(0, 7, "/volume").unwrap();
        table.lookup_mut(0, 7).unwrap().set_metadata(Some(Arc::new(
            Metadata::new().with("min", 0).with("max", 1).with("scale", "cubic"),
        )));
        table.process(0, 7, 127);

        // Falls back to zero without reaching the error callback
        assert_eq!(sent.lock().unwrap()[0].1, "/volume ,f 0");
        assert!(errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_learn_cc_first() {
        let (mut table, sent, _) = table(8);
        assert_eq!(table.process(3, 20, 10), ProcessOutcome::Pending);
        assert_eq!(
            table.pending_learn(),
            LearnState::AwaitingPath {
                channel: 3,
                controller: 20
            }
        );
        assert!(sent.lock().unwrap().is_empty());

        table.begin_learn("/volume").unwrap();
        assert_eq!(table.pending_learn(), LearnState::Idle);
        assert_eq!(table.lookup(3, 20).unwrap().path(), "/volume");
    }

    #[test]
    fn test_learn_path_first() {
        let (mut table, _, _) = table(8);
        table.begin_learn("/program").unwrap();
        assert_eq!(
            table.pending_learn(),
            LearnState::AwaitingController { path: "/program" }
        );
        assert!(table.is_learning());

        assert_eq!(table.process(3, 20, 10), ProcessOutcome::Committed);
        assert!(!table.is_learning());
        assert_eq!(table.lookup(3, 20).unwrap().value_type(), ValueType::Int);
    }

    #[test]
    fn test_learn_path_too_long() {
        let (mut table, _, errors) = table(8);
        let long = format!("/{}", "x".repeat(DEFAULT_PATH_CAPACITY));
        assert_eq!(table.begin_learn(&long), Err(ErrorKind::PathTooLong));
        assert_eq!(table.pending_learn(), LearnState::Idle);
        assert_eq!(errors.lock().unwrap()[0].0, ErrorKind::PathTooLong);
    }

    #[test]
    fn test_failed_learn_commit_still_resets() {
        let (mut table, _, errors) = table(8);
        table.begin_learn("/missing").unwrap();
        assert_eq!(table.process(0, 1, 0), ProcessOutcome::Committed);
        assert_eq!(table.pending_learn(), LearnState::Idle);
        assert!(table.is_empty());
        assert_eq!(errors.lock().unwrap()[0].0, ErrorKind::BadPath);
    }

    #[test]
    fn test_cancel_learn() {
        let (mut table, _, _) = table(8);
        table.begin_learn("/volume").unwrap();
        table.cancel_learn();
        assert_eq!(table.process(0, 1, 0), ProcessOutcome::Pending);
        assert!(table.is_empty());
    }

    #[test]
    fn test_unbind_and_clear() {
        let (mut table, _, _) = table(8);
        table.bind(0, 1, "/volume").unwrap();
        table.bind(0, 2, "/program").unwrap();

        assert!(table.unbind(0, 1));
        assert!(!table.unbind(0, 1));
        assert_eq!(table.len(), 1);

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 8);
    }

    #[test]
    fn test_sentinel_is_never_bound() {
        let (mut table, _, _) = table(8);
        assert!(!table.is_bound(INVALID_MIDI, INVALID_MIDI));
        assert_eq!(table.bind(INVALID_MIDI, 1, "/volume"), Err(ErrorKind::BadPath));
        assert!(table.is_empty());
    }

    #[test]
    fn test_process_raw() {
        let (mut table, sent, _) = table(8);
        table.bind(1, 7, "/volume").unwrap();

        assert_eq!(table.process_raw(&[0xB1, 7, 127]), Some(ProcessOutcome::Delivered));
        assert_eq!(table.process_raw(&[0x91, 60, 100]), None);
        assert_eq!(table.process_raw(&[]), None);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(MidiTable::builder(ports()).capacity(0).build().is_err());
        assert!(MidiTable::builder(ports()).path_capacity(0).build().is_err());
    }
}
