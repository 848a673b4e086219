//! Injected callbacks for error reporting and outbound messages.
//!
//! Both callbacks are optional. An unset callback is a true no-op; failures are
//! still logged through `tracing` so nothing is lost silently.

use crate::error::ErrorKind;
use crate::message::Message;

/// Receives `(kind, detail)` for every recovered failure. `detail` is usually the path.
pub type ErrorCallback = Box<dyn FnMut(ErrorKind, &str) + Send>;

/// Receives every outbound message built by the binding table.
pub type MessageCallback = Box<dyn FnMut(&Message<'_>) + Send>;

/// Optional error callback plus logging.
#[derive(Default)]
pub struct ErrorReporter {
    callback: Option<ErrorCallback>,
}

impl ErrorReporter {
    pub fn new(callback: Option<ErrorCallback>) -> Self {
        Self { callback }
    }

    pub fn set(&mut self, callback: ErrorCallback) {
        self.callback = Some(callback);
    }

    pub fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    /// Log and forward a failure.
    pub fn report(&mut self, kind: ErrorKind, detail: &str) {
        tracing::warn!("{}: '{}'", kind, detail);
        if let Some(cb) = self.callback.as_mut() {
            cb(kind, detail);
        }
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Optional outbound message sink.
#[derive(Default)]
pub struct MessageSink {
    callback: Option<MessageCallback>,
}

impl MessageSink {
    pub fn new(callback: Option<MessageCallback>) -> Self {
        Self { callback }
    }

    pub fn set(&mut self, callback: MessageCallback) {
        self.callback = Some(callback);
    }

    #[inline]
    pub fn deliver(&mut self, message: &Message<'_>) {
        if let Some(cb) = self.callback.as_mut() {
            cb(message);
        }
    }
}

impl std::fmt::Debug for MessageSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSink")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
