//! Component base
//!
//! Per-element identity, option resolution and method dispatch.

use std::fmt;

use fos_dom::{Document, DomError, NodeId};

use crate::{ComponentError, Config, EventEmitter, OptionValue, Options, generate_id};

/// A dispatchable component method
pub type Method<C> = fn(&mut C, &Options) -> OptionValue;

/// A concrete component type
///
/// Implementors embed a [`ComponentBase`] and expose it through
/// `base`/`base_mut`. `NAME` keys bindings and registry entries, so it must
/// be unique per component type.
pub trait Component: Sized + 'static {
    /// Immutable component tag
    const NAME: &'static str;

    /// Defaults; also the set of keys read from `data-*` overrides
    fn default_options() -> Options {
        Options::new()
    }

    /// Build the component around an already resolved base
    fn from_base(base: ComponentBase) -> Self;

    fn base(&self) -> &ComponentBase;

    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Look up a method by name for dispatch
    fn method(name: &str) -> Option<Method<Self>> {
        let _ = name;
        None
    }

    fn id(&self) -> &str {
        &self.base().id
    }

    fn element(&self) -> NodeId {
        self.base().element
    }

    fn options(&self) -> &Options {
        &self.base().options
    }

    fn events(&mut self) -> &mut EventEmitter {
        &mut self.base_mut().events
    }
}

/// Dispatch `method` on `instance`
pub fn dispatch<C: Component>(instance: &mut C, method: &str, options: &Options) -> Result<OptionValue, ComponentError> {
    let method_fn = C::method(method).ok_or_else(|| ComponentError::NoSuchMethod {
        component: C::NAME,
        method: method.to_string(),
    })?;
    Ok(method_fn(instance, options))
}

/// What a component is constructed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRef {
    Node(NodeId),
    Selector(String),
}

impl ElementRef {
    /// Resolve to an element under `root`
    pub fn resolve(&self, doc: &Document, root: NodeId) -> Result<Option<NodeId>, DomError> {
        match self {
            Self::Node(id) => Ok(doc.tree().is_element(*id).then_some(*id)),
            Self::Selector(selector) => doc.query_selector(root, selector),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node {id}"),
            Self::Selector(s) => write!(f, "selector \"{s}\""),
        }
    }
}

impl From<NodeId> for ElementRef {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&str> for ElementRef {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for ElementRef {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// State shared by every component
#[derive(Debug)]
pub struct ComponentBase {
    /// Component name (`Component::NAME`)
    pub name: &'static str,
    /// Unique instance id, `<name><separator><ulid>`
    pub id: String,
    /// Owning element
    pub element: NodeId,
    /// Resolved options
    pub options: Options,
    /// Instance event listeners
    pub events: EventEmitter,
}

impl ComponentBase {
    /// Resolve `target` against the document root and compute options
    pub fn new<C: Component>(
        doc: &Document,
        target: impl Into<ElementRef>,
        options: Options,
    ) -> Result<Self, ComponentError> {
        Self::new_in::<C>(doc, target, options, doc.root(), &Config::default())
    }

    /// Resolve `target` under `root` and compute options
    ///
    /// Options resolve as defaults, then `options` (with `name` set to the
    /// component name), then the element's `data-*` overrides. The id uses
    /// `config.id_prefix_separator`.
    pub fn new_in<C: Component>(
        doc: &Document,
        target: impl Into<ElementRef>,
        mut options: Options,
        root: NodeId,
        config: &Config,
    ) -> Result<Self, ComponentError> {
        let target = target.into();
        let element = target
            .resolve(doc, root)?
            .ok_or_else(|| ComponentError::InvalidTarget {
                component: C::NAME,
                target: target.to_string(),
            })?;

        let defaults = C::default_options();
        options.set("name", C::NAME);
        let overrides = doc
            .dataset(element)
            .map(|dataset| Options::from_dataset(&defaults, &dataset))
            .unwrap_or_default();

        let base = Self {
            name: C::NAME,
            id: generate_id(C::NAME, config.id_prefix_separator),
            element,
            options: Options::merged([&defaults, &options, &overrides]),
            events: EventEmitter::new(),
        };
        tracing::debug!("Constructed {} on {}", base.id, element);
        Ok(base)
    }
}
