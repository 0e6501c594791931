//! Attach tests for fos-component
//!
//! Deduplication, option precedence, construction and dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use fos_component::{
    Component, ComponentBase, ComponentError, Config, Dispatched, Method, OptionValue, Options,
    Registry,
};
use fos_dom::{Document, DomError, NodeId};

#[derive(Debug)]
struct Toggle {
    base: ComponentBase,
    open: bool,
}

impl Toggle {
    fn toggle(&mut self, _options: &Options) -> OptionValue {
        self.open = !self.open;
        let state = OptionValue::Bool(self.open);
        self.events().emit("toggled", &state);
        state
    }

    fn label(&mut self, options: &Options) -> OptionValue {
        let prefix = options.get_str("prefix").unwrap_or("");
        let label = self.options().get_str("label").unwrap_or_default();
        OptionValue::String(format!("{prefix}{label}"))
    }
}

impl Component for Toggle {
    const NAME: &'static str = "toggle";

    fn default_options() -> Options {
        Options::new()
            .with("open", false)
            .with("speed", 100)
            .with("label", "Toggle")
    }

    fn from_base(base: ComponentBase) -> Self {
        let open = base.options.get_bool("open").unwrap_or(false);
        Self { base, open }
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn method(name: &str) -> Option<Method<Self>> {
        match name {
            "toggle" => Some(Self::toggle),
            "label" => Some(Self::label),
            _ => None,
        }
    }
}

fn add(doc: &mut Document, parent: NodeId, attrs: &[(&str, &str)]) -> NodeId {
    let el = doc.create_element_with("div", attrs).unwrap();
    doc.append_child(parent, el).unwrap();
    el
}

fn page() -> (Document, Vec<NodeId>) {
    let mut doc = Document::default();
    let body = doc.body();
    let a = add(&mut doc, body, &[("class", "toggle"), ("id", "first")]);
    let b = add(&mut doc, body, &[("class", "toggle"), ("data-speed", "300")]);
    let c = add(&mut doc, a, &[("class", "toggle")]);
    (doc, vec![a, c, b])
}

#[test]
fn test_attach_without_selector_is_noop() {
    let (mut doc, _) = page();
    let mut registry = Registry::new();

    let instances = registry
        .attach::<Toggle>(&mut doc, None, Options::new(), None)
        .unwrap();

    assert!(instances.is_empty());
    assert!(registry.observed_selectors(Toggle::NAME).is_empty());
    assert_eq!(registry.watcher_count(Toggle::NAME), 0);
}

#[test]
fn test_attach_binds_in_document_order() {
    let (mut doc, expected) = page();
    let mut registry = Registry::new();

    let instances = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();

    let elements: Vec<NodeId> = instances.iter().map(|i| i.borrow().element()).collect();
    assert_eq!(elements, expected);
    for element in expected {
        assert!(registry.is_bound(Toggle::NAME, element));
    }
    assert!(instances[0].borrow().id().starts_with("toggle-"));
}

#[test]
fn test_attach_is_idempotent() {
    let (mut doc, _) = page();
    let mut registry = Registry::new();

    let first = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();
    let second = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert!(Rc::ptr_eq(a, b));
        assert_eq!(a.borrow().id(), b.borrow().id());
    }
    assert_eq!(registry.instance_count(Toggle::NAME), 3);
}

#[test]
fn test_overlapping_selectors_share_instances() {
    let (mut doc, elements) = page();
    let mut registry = Registry::new();

    let by_class = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();
    let by_id = registry
        .attach::<Toggle>(&mut doc, Some("#first"), Options::new(), None)
        .unwrap();

    assert_eq!(by_id.len(), 1);
    assert!(Rc::ptr_eq(&by_class[0], &by_id[0]));
    // First binding keeps the selector it was created with
    assert_eq!(by_id[0].borrow().options().get_str("selector"), Some(".toggle"));
    let bound: Rc<RefCell<Toggle>> = registry.instance(elements[0]).unwrap();
    assert!(Rc::ptr_eq(&bound, &by_class[0]));
}

#[test]
fn test_options_precedence() {
    let (mut doc, elements) = page();
    let mut registry = Registry::new();

    let call_site = Options::new().with("speed", 200).with("open", true);
    registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), call_site, None)
        .unwrap();

    let overridden = registry.instance::<Toggle>(elements[2]).unwrap();
    let plain = registry.instance::<Toggle>(elements[0]).unwrap();

    // element dataset > call site > defaults
    assert_eq!(overridden.borrow().options().get_number("speed"), Some(300.0));
    assert_eq!(plain.borrow().options().get_number("speed"), Some(200.0));
    assert_eq!(plain.borrow().options().get_str("label"), Some("Toggle"));
    assert!(plain.borrow().open);

    let options = plain.borrow().options().clone();
    assert_eq!(options.get_str("selector"), Some(".toggle"));
    assert_eq!(options.get_str("name"), Some("toggle"));
}

#[test]
fn test_call_site_selector_is_kept() {
    let (mut doc, _) = page();
    let mut registry = Registry::new();

    let instances = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new().with("selector", "custom"), None)
        .unwrap();
    assert_eq!(instances[0].borrow().options().get_str("selector"), Some("custom"));
}

#[test]
fn test_exactly_one_watcher_per_selector() {
    let (mut doc, _) = page();
    let mut registry = Registry::new();

    for _ in 0..5 {
        registry
            .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
            .unwrap();
    }
    assert_eq!(registry.watcher_count(Toggle::NAME), 1);
    assert_eq!(registry.observed_selectors(Toggle::NAME), vec![".toggle"]);

    registry
        .attach::<Toggle>(&mut doc, Some("#first"), Options::new(), None)
        .unwrap();
    assert_eq!(registry.watcher_count(Toggle::NAME), 2);

    let started = registry
        .observe_dom::<Toggle>(&mut doc, "#first", Options::new())
        .unwrap();
    assert!(!started);
    assert_eq!(registry.watcher_count(Toggle::NAME), 2);
}

#[test]
fn test_attach_scoped_to_root() {
    let (mut doc, elements) = page();
    let mut registry = Registry::new();

    let scoped = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), Some(elements[0]))
        .unwrap();

    // Descendants only; the root itself is not a candidate
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].borrow().element(), elements[1]);
    assert!(!registry.is_bound(Toggle::NAME, elements[0]));
}

#[test]
fn test_missing_target() {
    let (mut doc, _) = page();
    let mut registry = Registry::new();

    let err = registry
        .construct::<Toggle>(&doc, "#missing", Options::new())
        .unwrap_err();
    assert!(matches!(err, ComponentError::InvalidTarget { component: "toggle", .. }));

    let text = doc.create_text("not an element");
    let err = ComponentBase::new::<Toggle>(&doc, text, Options::new()).unwrap_err();
    assert!(matches!(err, ComponentError::InvalidTarget { .. }));

    // At the attach level an empty match is not an error
    let instances = registry
        .attach::<Toggle>(&mut doc, Some("#missing"), Options::new(), None)
        .unwrap();
    assert!(instances.is_empty());
    assert_eq!(registry.instance_count(Toggle::NAME), 0);
}

#[test]
fn test_invalid_selector_propagates() {
    let (mut doc, _) = page();
    let mut registry = Registry::new();

    let err = registry
        .attach::<Toggle>(&mut doc, Some("div >"), Options::new(), None)
        .unwrap_err();
    assert!(matches!(err, ComponentError::Dom(DomError::InvalidSelector(_))));
    assert!(registry.observed_selectors(Toggle::NAME).is_empty());
}

#[test]
fn test_construct_reuses_binding() {
    let (mut doc, elements) = page();
    let mut registry = Registry::new();

    let direct = registry
        .construct::<Toggle>(&doc, "#first", Options::new())
        .unwrap();
    assert_eq!(direct.borrow().element(), elements[0]);
    assert_eq!(direct.borrow().options().get_str("selector"), None);

    let attached = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();
    assert!(Rc::ptr_eq(&direct, &attached[0]));

    let again = registry
        .construct::<Toggle>(&doc, elements[0], Options::new())
        .unwrap();
    assert!(Rc::ptr_eq(&direct, &again));
}

#[test]
fn test_dispatch_surface() {
    let (mut doc, elements) = page();
    let mut registry = Registry::new();
    registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();

    let surface = registry.surface::<Toggle>(elements[0]).unwrap();
    assert_eq!(surface.constructor(), "toggle");

    let prefix = Options::new().with("prefix", "> ");
    let via_surface = surface.invoke("label", &prefix).unwrap();
    let direct = surface.instance().borrow_mut().label(&prefix);
    assert_eq!(via_surface, direct);
    assert_eq!(via_surface, OptionValue::from("> Toggle"));

    let value = surface.call(Some("toggle"), &Options::new()).unwrap();
    assert_eq!(value.into_value(), Some(OptionValue::Bool(true)));

    let instance = surface.call(None, &Options::new()).unwrap().into_instance().unwrap();
    assert!(Rc::ptr_eq(&instance, &registry.instance::<Toggle>(elements[0]).unwrap()));
    assert!(instance.borrow().open);

    let err = surface.call(Some("bar"), &Options::new()).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::NoSuchMethod { component: "toggle", ref method } if method == "bar"
    ));
    assert!(matches!(surface.call(None, &Options::new()), Ok(Dispatched::Instance(_))));
}

#[test]
fn test_instance_events() {
    let (mut doc, elements) = page();
    let mut registry = Registry::new();
    registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let instance = registry.instance::<Toggle>(elements[1]).unwrap();
    let sink = seen.clone();
    instance
        .borrow_mut()
        .events()
        .on("toggled", move |state| sink.borrow_mut().push(state.clone()));

    let surface = registry.surface::<Toggle>(elements[1]).unwrap();
    surface.invoke("toggle", &Options::new()).unwrap();
    surface.invoke("toggle", &Options::new()).unwrap();

    assert_eq!(*seen.borrow(), vec![OptionValue::Bool(true), OptionValue::Bool(false)]);
}

#[test]
fn test_reentrant_dispatch_is_an_error() {
    let (mut doc, elements) = page();
    let mut registry = Registry::new();
    registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();

    let surface = registry.surface::<Toggle>(elements[0]).unwrap();
    let inner = surface.clone();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = errors.clone();
    surface
        .instance()
        .borrow_mut()
        .events()
        .on("toggled", move |_| {
            if let Err(err) = inner.invoke("label", &Options::new()) {
                sink.borrow_mut().push(err);
            }
        });

    // The outer call still completes
    let state = surface.invoke("toggle", &Options::new()).unwrap();
    assert_eq!(state, OptionValue::Bool(true));
    assert!(matches!(
        errors.borrow().as_slice(),
        [ComponentError::InstanceBorrowed { component: "toggle" }]
    ));

    // Outside a method call the instance is free again
    assert_eq!(surface.invoke("label", &Options::new()).unwrap(), OptionValue::from("Toggle"));
}

#[test]
fn test_id_separator_from_config() {
    let (mut doc, elements) = page();
    let mut registry = Registry::with_config(Config {
        id_prefix_separator: '_',
        ..Config::default()
    });

    let attached = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), Options::new(), None)
        .unwrap();
    for instance in &attached {
        let instance = instance.borrow();
        let (prefix, ulid) = instance.id().split_once('_').unwrap();
        assert_eq!(prefix, "toggle");
        assert_eq!(ulid.len(), 26);
    }

    // Direct construction outside a registry keeps the default separator
    let base = ComponentBase::new::<Toggle>(&doc, elements[0], Options::new()).unwrap();
    assert!(base.id.starts_with("toggle-"));
}

#[test]
fn test_attach_with_quoted_attribute_selector() {
    let (mut doc, _) = page();
    let body = doc.body();
    let tagged = add(&mut doc, body, &[("data-role", "tag input")]);
    add(&mut doc, body, &[("data-role", "tag")]);
    let listed = add(&mut doc, body, &[("data-role", "a,b")]);
    let mut registry = Registry::new();

    let instances = registry
        .attach::<Toggle>(&mut doc, Some(r#"[data-role="tag input"], [data-role="a,b"]"#), Options::new(), None)
        .unwrap();
    let bound: Vec<NodeId> = instances.iter().map(|i| i.borrow().element()).collect();
    assert_eq!(bound, vec![tagged, listed]);
    assert_eq!(
        registry.observed_selectors(Toggle::NAME),
        vec![r#"[data-role="tag input"], [data-role="a,b"]"#]
    );
}

#[test]
fn test_options_from_json() {
    let (mut doc, _) = page();
    let mut registry = Registry::new();

    let options: Options = serde_json::from_str(r#"{"speed": 50, "label": "Menu", "open": null}"#).unwrap();
    let instances = registry
        .attach::<Toggle>(&mut doc, Some(".toggle"), options, None)
        .unwrap();

    let instance = instances[0].borrow();
    assert_eq!(instance.options().get_number("speed"), Some(50.0));
    assert_eq!(instance.options().get_str("label"), Some("Menu"));
    assert!(instance.options().get("open").unwrap().is_null());
}
