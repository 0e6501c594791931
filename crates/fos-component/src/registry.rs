//! Attachment Registry
//!
//! Owns every element-to-instance binding (a side table keyed by component
//! name and element) plus the selectors each component already watches.
//! `attach` and the watchers' insertion path both funnel into
//! `resolve_and_bind`, which never constructs twice for one element.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use fos_dom::{Document, NodeId, Selector};

use crate::watcher::{WatchTarget, Watcher};
use crate::{Component, ComponentBase, ComponentError, Config, DispatchSurface, ElementRef, Options, WatcherState};

#[derive(Debug, Default)]
struct RegistryEntry {
    observed_selectors: HashSet<String>,
    watchers: Vec<Watcher>,
    bindings: HashMap<NodeId, Rc<dyn Any>>,
}

/// Component registry
#[derive(Debug, Default)]
pub struct Registry {
    config: Config,
    entries: HashMap<&'static str, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind `C` to every element matching `selector` under `root`
    /// (default: the whole document) and start watching the selector.
    ///
    /// Returns one instance per matched element, in document order. A
    /// `None` selector is a no-op.
    pub fn attach<C: Component>(
        &mut self,
        doc: &mut Document,
        selector: Option<&str>,
        options: Options,
        root: Option<NodeId>,
    ) -> Result<Vec<Rc<RefCell<C>>>, ComponentError> {
        let Some(selector) = selector else {
            return Ok(Vec::new());
        };
        let parsed = Selector::parse(selector)?;
        let root = root.unwrap_or_else(|| doc.root());

        let elements: Vec<NodeId> = doc
            .tree()
            .descendants(root)
            .filter(|&id| parsed.matches(doc.tree(), id))
            .collect();
        let instances = self.resolve_and_bind::<C>(doc, &elements, selector, &options)?;

        self.entries.entry(C::NAME).or_default();
        self.observe_parsed::<C>(doc, selector, parsed, options);

        Ok(instances)
    }

    /// Start the watcher for (`C`, `selector`) unless one was already
    /// requested. Returns whether a watcher started.
    ///
    /// The selector counts as observed even when the document cannot be
    /// observed, so later calls stay no-ops.
    pub fn observe_dom<C: Component>(
        &mut self,
        doc: &mut Document,
        selector: &str,
        options: Options,
    ) -> Result<bool, ComponentError> {
        let parsed = Selector::parse(selector)?;
        Ok(self.observe_parsed::<C>(doc, selector, parsed, options))
    }

    fn observe_parsed<C: Component>(
        &mut self,
        doc: &mut Document,
        selector: &str,
        parsed: Selector,
        options: Options,
    ) -> bool {
        let entry = self.entries.entry(C::NAME).or_default();
        if !entry.observed_selectors.insert(selector.to_string()) {
            return false;
        }

        if !self.config.observe_dom {
            tracing::debug!("DOM observation disabled; not watching {} for {}", selector, C::NAME);
            return false;
        }
        if !doc.supports_observation() {
            tracing::warn!("Document cannot be observed; not watching {} for {}", selector, C::NAME);
            return false;
        }

        let mut watcher = Watcher::new::<C>(selector, parsed, options);
        if let Err(err) = watcher.start(doc, self.config.subtree) {
            tracing::warn!("Failed to watch {} for {}: {}", selector, C::NAME, err);
            return false;
        }
        tracing::debug!("Watching {} for {}", selector, C::NAME);
        entry.watchers.push(watcher);
        true
    }

    /// Construct `C` on `target`, or return the instance already bound there
    pub fn construct<C: Component>(
        &mut self,
        doc: &Document,
        target: impl Into<ElementRef>,
        options: Options,
    ) -> Result<Rc<RefCell<C>>, ComponentError> {
        let target = target.into();
        let element = target
            .resolve(doc, doc.root())?
            .ok_or_else(|| ComponentError::InvalidTarget {
                component: C::NAME,
                target: target.to_string(),
            })?;
        self.bind_one::<C>(doc, element, options)
    }

    /// Bind `C` to an inserted node and every matching descendant.
    ///
    /// This is the path watchers take for each inserted node. Unlike
    /// `attach`, the inserted node itself is a candidate.
    pub fn bind_inserted<C: Component>(
        &mut self,
        doc: &Document,
        selector: &str,
        options: &Options,
        inserted: NodeId,
    ) -> Result<Vec<Rc<RefCell<C>>>, ComponentError> {
        let parsed = Selector::parse(selector)?;
        self.bind_inserted_with::<C>(doc, &parsed, selector, options, inserted)
    }

    pub(crate) fn bind_inserted_with<C: Component>(
        &mut self,
        doc: &Document,
        parsed: &Selector,
        selector: &str,
        options: &Options,
        inserted: NodeId,
    ) -> Result<Vec<Rc<RefCell<C>>>, ComponentError> {
        let tree = doc.tree();
        let elements: Vec<NodeId> = std::iter::once(inserted)
            .chain(tree.descendants(inserted))
            .filter(|&id| parsed.matches(tree, id))
            .collect();
        self.resolve_and_bind::<C>(doc, &elements, selector, options)
    }

    /// Reuse or create one instance per element, injecting `selector`
    fn resolve_and_bind<C: Component>(
        &mut self,
        doc: &Document,
        elements: &[NodeId],
        selector: &str,
        options: &Options,
    ) -> Result<Vec<Rc<RefCell<C>>>, ComponentError> {
        let mut call_site = options.clone();
        if !call_site.contains("selector") {
            call_site.set("selector", selector);
        }

        elements
            .iter()
            .map(|&element| self.bind_one::<C>(doc, element, call_site.clone()))
            .collect()
    }

    fn bind_one<C: Component>(
        &mut self,
        doc: &Document,
        element: NodeId,
        options: Options,
    ) -> Result<Rc<RefCell<C>>, ComponentError> {
        if let Some(existing) = self.instance::<C>(element) {
            tracing::trace!("Reusing {} on {}", C::NAME, element);
            return Ok(existing);
        }

        let base = ComponentBase::new_in::<C>(doc, element, options, doc.root(), &self.config)?;
        let instance = Rc::new(RefCell::new(C::from_base(base)));
        let erased: Rc<dyn Any> = instance.clone();
        self.entries
            .entry(C::NAME)
            .or_default()
            .bindings
            .insert(element, erased);
        Ok(instance)
    }

    /// Deliver pending mutation records to every watcher.
    ///
    /// Stands in for the host's mutation-observer checkpoint. Returns the
    /// number of instances created.
    pub fn deliver_mutations(&mut self, doc: &mut Document) -> Result<usize, ComponentError> {
        let pending: Vec<(&'static str, usize)> = self
            .entries
            .iter()
            .flat_map(|(name, entry)| (0..entry.watchers.len()).map(move |i| (*name, i)))
            .collect();

        let mut created = 0;
        for (name, index) in pending {
            let Some(watcher) = self.entries.get(name).and_then(|e| e.watchers.get(index)) else {
                continue;
            };
            let Some(observer) = watcher.observer else {
                continue;
            };
            let handler = watcher.handler;
            let target: WatchTarget = watcher.target.clone();

            let records = doc.take_records(observer)?;
            if records.is_empty() {
                continue;
            }
            tracing::debug!(
                "Delivering {} mutation record(s) to {} watcher for {}",
                records.len(),
                name,
                target.selector
            );

            for node in records.into_iter().flat_map(|r| r.added_nodes) {
                if !self.entries.contains_key(name) {
                    break;
                }
                created += handler(self, doc, &target, node)?;
            }
        }
        Ok(created)
    }

    /// The instance of `C` bound to `element`
    pub fn instance<C: Component>(&self, element: NodeId) -> Option<Rc<RefCell<C>>> {
        let erased = self.entries.get(C::NAME)?.bindings.get(&element)?;
        Rc::clone(erased).downcast::<RefCell<C>>().ok()
    }

    /// Dispatch surface of the `C` instance bound to `element`
    pub fn surface<C: Component>(&self, element: NodeId) -> Option<DispatchSurface<C>> {
        self.instance::<C>(element).map(DispatchSurface::new)
    }

    /// Whether a component named `name` is bound to `element`
    pub fn is_bound(&self, name: &str, element: NodeId) -> bool {
        self.entries
            .get(name)
            .is_some_and(|e| e.bindings.contains_key(&element))
    }

    /// Number of elements bound for `name`
    pub fn instance_count(&self, name: &str) -> usize {
        self.entries.get(name).map_or(0, |e| e.bindings.len())
    }

    /// Selectors recorded as observed for `name`, sorted
    pub fn observed_selectors(&self, name: &str) -> Vec<&str> {
        let mut selectors: Vec<&str> = self
            .entries
            .get(name)
            .map(|e| e.observed_selectors.iter().map(String::as_str).collect())
            .unwrap_or_default();
        selectors.sort_unstable();
        selectors
    }

    /// Number of watchers activated for `name`
    pub fn watcher_count(&self, name: &str) -> usize {
        self.entries.get(name).map_or(0, |e| e.watchers.len())
    }

    pub fn watcher_state(&self, name: &str, selector: &str) -> WatcherState {
        self.entries
            .get(name)
            .and_then(|e| e.watchers.iter().find(|w| w.target.selector == selector))
            .map_or(WatcherState::Inactive, |w| w.state)
    }
}
