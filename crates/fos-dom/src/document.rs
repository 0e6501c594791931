//! Document - High-level document API
//!
//! All tree mutations go through the document so registered mutation
//! observers see them.

use crate::{
    DOMStringMap, DomError, DomResult, DomTree, MutationObserver, MutationObserverInit,
    MutationRecord, NodeId, ObserverId, Selector,
};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    observers: Vec<MutationObserver>,
    observation: bool,
}

impl Document {
    /// Create a live document with `html > (head, body)`
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);

        let html = doc.tree.create_element("html");
        let head = doc.tree.create_element("head");
        let body = doc.tree.create_element("body");

        // Freshly created nodes cannot violate hierarchy rules
        let _ = doc.tree.append_child(NodeId::ROOT, html);
        let _ = doc.tree.append_child(html, head);
        let _ = doc.tree.append_child(html, body);

        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create a live document with no structure
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            observers: Vec::new(),
            observation: true,
        }
    }

    /// Create a document that never delivers mutation records
    /// (parsed snapshots, template contents)
    pub fn detached(url: &str) -> Self {
        Self {
            observation: false,
            ..Self::new(url)
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    // ---- Node creation -------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    /// Create an element with attributes in one call
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> DomResult<NodeId> {
        let id = self.tree.create_element(tag);
        for (name, value) in attrs {
            self.tree.set_attribute(id, name, value)?;
        }
        Ok(id)
    }

    // ---- Mutations -----------------------------------------------------

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        let old = self.tree.set_attribute(element, name, value)?;
        self.queue(MutationRecord::attributes(element, &name.to_ascii_lowercase(), old));
        Ok(())
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        if let Some(old) = self.tree.remove_attribute(element, name)? {
            self.queue(MutationRecord::attributes(element, &name.to_ascii_lowercase(), Some(old)));
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        let old_parent = self
            .tree
            .get(child)
            .ok_or(DomError::NodeNotFound(child))?
            .parent;

        self.tree.insert_before(parent, child, reference)?;
        if reference == Some(child) {
            return Ok(());
        }

        if old_parent.is_valid() && old_parent != parent {
            self.queue(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
        }

        let node = self.tree.get(child).ok_or(DomError::NodeNotFound(child))?;
        let mut record = MutationRecord::child_list(parent, vec![child], Vec::new());
        record.previous_sibling = Some(node.prev_sibling).filter(|n| n.is_valid());
        record.next_sibling = Some(node.next_sibling).filter(|n| n.is_valid());
        self.queue(record);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        // Record before detaching so subtree observers still see the parent
        self.tree.get(child).ok_or(DomError::NodeNotFound(child))?;
        if self.tree.get(child).map(|n| n.parent) != Some(parent) {
            return Err(DomError::NotAChild(child));
        }
        self.queue(MutationRecord::child_list(parent, Vec::new(), vec![child]));
        self.tree.remove_child(parent, child)
    }

    fn queue(&mut self, record: MutationRecord) {
        if !self.observation {
            return;
        }
        let tree = &self.tree;
        let mut delivered = 0;
        for observer in &mut self.observers {
            if observer.enqueue(tree, &record) {
                delivered += 1;
            }
        }
        if delivered > 0 {
            tracing::trace!(
                "Queued {:?} record on {} for {} observer(s)",
                record.mutation_type,
                record.target,
                delivered
            );
        }
    }

    // ---- Queries -------------------------------------------------------

    /// First element under `root` (exclusive) matching `selector`
    pub fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .tree
            .descendants(root)
            .find(|&id| selector.matches(&self.tree, id)))
    }

    /// All elements under `root` (exclusive) matching `selector`, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .tree
            .descendants(root)
            .filter(|&id| selector.matches(&self.tree, id))
            .collect())
    }

    /// Check if element matches selector
    pub fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool> {
        Ok(Selector::parse(selector)?.matches(&self.tree, element))
    }

    /// The element's data-* attributes
    pub fn dataset(&self, element: NodeId) -> Option<DOMStringMap> {
        let elem = self.tree.get(element)?.as_element()?;
        Some(DOMStringMap::from_attributes(&elem.attrs))
    }

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.root()).find(|&node| {
            self.tree
                .get(node)
                .and_then(|n| n.as_element())
                .is_some_and(|e| e.id.as_deref() == Some(id))
        })
    }

    // ---- Mutation observers -------------------------------------------

    /// Whether this document delivers mutation records at all
    pub fn supports_observation(&self) -> bool {
        self.observation
    }

    pub fn create_mutation_observer(&mut self) -> ObserverId {
        let id = ObserverId(self.observers.len() as u32);
        self.observers.push(MutationObserver::new(id));
        id
    }

    pub fn observe(&mut self, observer: ObserverId, target: NodeId, options: MutationObserverInit) -> DomResult<()> {
        self.tree.get(target).ok_or(DomError::NodeNotFound(target))?;
        self.observer_mut(observer)?.observe(target, options);
        Ok(())
    }

    pub fn take_records(&mut self, observer: ObserverId) -> DomResult<Vec<MutationRecord>> {
        Ok(self.observer_mut(observer)?.take_records())
    }

    pub fn disconnect(&mut self, observer: ObserverId) -> DomResult<()> {
        self.observer_mut(observer)?.disconnect();
        Ok(())
    }

    /// Whether any observer has undelivered records
    pub fn has_pending_records(&self) -> bool {
        self.observers.iter().any(MutationObserver::has_records)
    }

    fn observer_mut(&mut self, id: ObserverId) -> DomResult<&mut MutationObserver> {
        self.observers
            .get_mut(id.0 as usize)
            .ok_or(DomError::UnknownObserver(id.0))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
