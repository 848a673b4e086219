//! Parameter registry adapter.
//!
//! The binding table and automation manager only ever talk to a registry
//! through these two traits: resolve a path to a descriptor, and dispatch a
//! typed message with a caller-supplied context. [`PortTree`] is a small
//! exact-match implementation for hosts without their own dispatch tree.

mod tree;

pub use tree::{Port, PortHandler, PortNode, PortTree};

use crate::message::{Message, ValueType};
use crate::metadata::Metadata;
use std::sync::Arc;

/// Descriptor of a resolved port.
#[derive(Debug, Clone, Copy)]
pub struct PortInfo<'a> {
    /// Name without the argument signature (`volume` for `volume::f`).
    pub name: &'a str,
    /// Argument signature, everything after the first `:` (may be empty).
    pub signature: &'a str,
    pub metadata: Option<&'a Arc<Metadata>>,
    /// Directory (container) ports cannot be bound.
    pub is_dir: bool,
}

impl<'a> PortInfo<'a> {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.is_dir
    }

    /// Value type derived from the signature.
    pub fn value_type(&self) -> Option<ValueType> {
        ValueType::from_signature(self.signature)
    }

    pub fn meta(&self) -> Option<&'a Metadata> {
        self.metadata.map(|m| m.as_ref())
    }
}

/// Resolve a parameter path to its descriptor.
pub trait PortResolver {
    fn resolve(&self, path: &str) -> Option<PortInfo<'_>>;
}

/// Invoke parameters with a typed message.
///
/// `C` is whatever the host passes through to its parameter setters.
pub trait PortDispatch<C>: PortResolver {
    /// Returns `false` if no leaf port handled the message.
    fn dispatch(&self, msg: &Message<'_>, ctx: &mut C) -> bool;
}
