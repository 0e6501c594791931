//! Mutation Watcher
//!
//! One watcher per (component, selector). Once observing it stays observing;
//! there is no stop operation.

use fos_dom::{Document, DomResult, MutationObserverInit, NodeId, ObserverId, Selector};

use crate::{Component, ComponentError, Options, Registry};

/// Watcher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Inactive,
    Observing,
}

/// Type-erased insertion handler for one component type
pub(crate) type InsertionHandler =
    fn(&mut Registry, &Document, &WatchTarget, NodeId) -> Result<usize, ComponentError>;

/// What a watcher re-attaches
#[derive(Debug, Clone)]
pub(crate) struct WatchTarget {
    pub selector: String,
    pub parsed: Selector,
    pub options: Options,
}

pub(crate) struct Watcher {
    pub target: WatchTarget,
    pub state: WatcherState,
    pub observer: Option<ObserverId>,
    pub handler: InsertionHandler,
}

impl Watcher {
    pub fn new<C: Component>(selector: &str, parsed: Selector, options: Options) -> Self {
        Self {
            target: WatchTarget {
                selector: selector.to_string(),
                parsed,
                options,
            },
            state: WatcherState::Inactive,
            observer: None,
            handler: handle_insertion::<C>,
        }
    }

    /// Inactive -> Observing; later calls are no-ops
    pub fn start(&mut self, doc: &mut Document, subtree: bool) -> DomResult<()> {
        if self.state == WatcherState::Observing {
            return Ok(());
        }
        let observer = doc.create_mutation_observer();
        doc.observe(observer, doc.root(), MutationObserverInit::child_list(subtree))?;
        self.observer = Some(observer);
        self.state = WatcherState::Observing;
        Ok(())
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("selector", &self.target.selector)
            .field("state", &self.state)
            .field("observer", &self.observer)
            .finish()
    }
}

fn handle_insertion<C: Component>(
    registry: &mut Registry,
    doc: &Document,
    target: &WatchTarget,
    inserted: NodeId,
) -> Result<usize, ComponentError> {
    let before = registry.instance_count(C::NAME);
    registry.bind_inserted_with::<C>(doc, &target.parsed, &target.selector, &target.options, inserted)?;
    Ok(registry.instance_count(C::NAME) - before)
}
