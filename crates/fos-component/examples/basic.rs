//! Example: attaching a component and picking up late insertions

use fos_component::{Component, ComponentBase, Method, OptionValue, Options, Registry};
use fos_dom::Document;
use tracing_subscriber::EnvFilter;

struct Accordion {
    base: ComponentBase,
    expanded: bool,
}

impl Accordion {
    fn toggle(&mut self, _options: &Options) -> OptionValue {
        self.expanded = !self.expanded;
        OptionValue::Bool(self.expanded)
    }
}

impl Component for Accordion {
    const NAME: &'static str = "accordion";

    fn default_options() -> Options {
        Options::new().with("expanded", false).with("duration", 200)
    }

    fn from_base(base: ComponentBase) -> Self {
        let expanded = base.options.get_bool("expanded").unwrap_or(false);
        Self { base, expanded }
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
            _ => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut doc = Document::new("https://example.com");
    let body = doc.body();
    let first = doc.create_element_with("section", &[("class", "accordion")])?;
    doc.append_child(body, first)?;

    let mut registry = Registry::new();
    let attached = registry.attach::<Accordion>(&mut doc, Some(".accordion"), Options::new(), None)?;
    println!("fOS components v{}: attached {} accordion(s)", fos_component::VERSION, attached.len());

    // The page adds another accordion later
    let late = doc.create_element_with("section", &[("class", "accordion"), ("data-expanded", "true")])?;
    doc.append_child(body, late)?;
    let created = registry.deliver_mutations(&mut doc)?;
    println!("Auto-attached {created} new accordion(s)");

    if let Some(surface) = registry.surface::<Accordion>(late) {
        let state = surface.invoke("toggle", &Options::new())?;
        println!("Toggled {} -> expanded = {}", surface.instance().borrow().id(), state);
    }

    Ok(())
}
