//! Exact-match port tree.

use super::{PortDispatch, PortInfo, PortResolver};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::metadata::Metadata;
use std::sync::Arc;

/// Setter invoked when a message reaches a leaf port.
pub type PortHandler<C> = Box<dyn Fn(&Message<'_>, &mut C) + Send + Sync>;

/// Leaf handler or nested directory.
pub enum PortNode<C> {
    Leaf(PortHandler<C>),
    Dir(PortTree<C>),
}

/// A named port. The name carries the argument signature: `volume::f`.
pub struct Port<C> {
    name: String,
    base_len: usize,
    metadata: Option<Arc<Metadata>>,
    node: PortNode<C>,
}

impl<C> Port<C> {
    /// Leaf port with a setter.
    ///
    /// # Example
    /// ```ignore
    /// let port = Port::leaf("volume::f", |msg, synth: &mut Synth| {
    ///     if let Some(v) = msg.arg(0).and_then(|a| a.as_f32()) {
    ///         synth.volume = v;
    ///     }
    /// });
    /// ```
    pub fn leaf<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Message<'_>, &mut C) + Send + Sync + 'static,
    {
        Self::with_node(name.into(), PortNode::Leaf(Box::new(handler)))
    }

    /// Directory port holding a subtree.
    pub fn dir(name: impl Into<String>, tree: PortTree<C>) -> Self {
        Self::with_node(name.into(), PortNode::Dir(tree))
    }

    fn with_node(name: String, node: PortNode<C>) -> Self {
        let base_len = name.find(':').unwrap_or(name.len());
        Self {
            name,
            base_len,
            metadata: None,
            node,
        }
    }

    /// Attach metadata (`min`, `max`, `scale`, ...).
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Full declared name, signature included.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_name(&self) -> &str {
        &self.name[..self.base_len]
    }

    pub fn signature(&self) -> &str {
        self.name
            .get(self.base_len + 1..)
            .unwrap_or_default()
    }

    pub fn metadata(&self) -> Option<&Arc<Metadata>> {
        self.metadata.as_ref()
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.node, PortNode::Dir(_))
    }

    fn info(&self) -> PortInfo<'_> {
        PortInfo {
            name: self.base_name(),
            signature: self.signature(),
            metadata: self.metadata.as_ref(),
            is_dir: self.is_dir(),
        }
    }
}

/// Ordered collection of ports, resolved by exact path segment.
///
/// Paths look like `/synth/filter/cutoff`; a leading `/` is optional and a
/// trailing `/` addresses a directory itself.
pub struct PortTree<C> {
    ports: Vec<Port<C>>,
}

impl<C> Default for PortTree<C> {
    fn default() -> Self {
        Self { ports: Vec::new() }
    }
}

impl<C> PortTree<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a port. Names must be non-empty, contain no `/`, and be unique.
    pub fn add(&mut self, port: Port<C>) -> Result<()> {
        let base = port.base_name();
        if base.is_empty() || base.contains('/') {
            return Err(Error::InvalidPortName(port.name));
        }
        if self.ports.iter().any(|p| p.base_name() == base) {
            return Err(Error::DuplicatePort(port.name));
        }
        self.ports.push(port);
        Ok(())
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, port: Port<C>) -> Result<Self> {
        self.add(port)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port<C>> {
        self.ports.iter()
    }

    /// Find the port addressed by `path`.
    pub fn find(&self, path: &str) -> Option<&Port<C>> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let (segment, rest) = match path.split_once('/') {
            Some((segment, rest)) => (segment, rest),
            None => (path, ""),
        };
        let port = self.ports.iter().find(|p| p.base_name() == segment)?;
        if rest.is_empty() {
            return Some(port);
        }
        match &port.node {
            PortNode::Dir(tree) => tree.find(rest),
            PortNode::Leaf(_) => None,
        }
    }
}

impl<C> PortResolver for PortTree<C> {
    fn resolve(&self, path: &str) -> Option<PortInfo<'_>> {
        self.find(path).map(Port::info)
    }
}

impl<C> PortDispatch<C> for PortTree<C> {
    fn dispatch(&self, msg: &Message<'_>, ctx: &mut C) -> bool {
        match self.find(msg.path()).map(|p| &p.node) {
            Some(PortNode::Leaf(handler)) => {
                handler(msg, ctx);
                true
            }
            _ => {
                tracing::debug!("No leaf port for {}", msg.path());
                false
            }
        }
    }
}
