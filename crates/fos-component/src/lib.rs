//! fOS Components
//!
//! Binds stateful component objects to DOM elements. Attaching a component
//! to a selector creates at most one instance per element, caches it in the
//! [`Registry`], and starts a mutation watcher so that matching elements
//! inserted later are wired up automatically.
//!
//! # Example
//! ```rust,ignore
//! use fos_component::{Registry, Options};
//!
//! let mut registry = Registry::new();
//! let tabs = registry.attach::<Tabs>(&mut doc, Some(".tabs"), Options::new(), None)?;
//! // ... later, after the page inserts more `.tabs` elements
//! registry.deliver_mutations(&mut doc)?;
//! ```

mod component;
mod config;
mod emitter;
mod id;
mod options;
mod registry;
mod surface;
mod watcher;

pub use component::{Component, ComponentBase, ElementRef, Method, dispatch};
pub use config::Config;
pub use emitter::{EventEmitter, ListenerId};
pub use id::generate_id;
pub use options::{OptionValue, Options};
pub use registry::Registry;
pub use surface::{DispatchSurface, Dispatched};
pub use watcher::WatcherState;

// Re-export the DOM crate for hosts
pub use fos_dom as dom;

use fos_dom::DomError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component errors
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("An invalid selector or non-DOM node has been provided for {component}: {target}")]
    InvalidTarget {
        component: &'static str,
        target: String,
    },

    #[error("No method named \"{method}\" on {component}")]
    NoSuchMethod {
        component: &'static str,
        method: String,
    },

    #[error("{component} instance is already borrowed; re-entrant dispatch is not supported")]
    InstanceBorrowed { component: &'static str },

    #[error(transparent)]
    Dom(#[from] DomError),
}
