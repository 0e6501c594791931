//! fOS DOM - Document Object Model
//!
//! Arena DOM tree with selector queries, `dataset` access and
//! mutation observers. This is the host-side model that fOS components
//! attach to.

mod node;
mod tree;
mod document;
mod selector;
mod dataset;
mod observer;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children, Descendants};
pub use document::Document;
pub use selector::{Selector, ComplexSelector, CompoundSelector, Combinator, AttrSelector};
pub use dataset::DOMStringMap;
pub use observer::{MutationObserver, MutationObserverInit, MutationRecord, MutationType, ObserverId};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} is not a child of the given parent")]
    NotAChild(NodeId),

    #[error("Hierarchy request error")]
    HierarchyRequest,

    #[error("Unknown mutation observer: {0}")]
    UnknownObserver(u32),
}
