//! Mutation Observers
//!
//! Record queues fed by `Document` mutations. Delivery is pull based: the
//! host drains `take_records` at its own checkpoint.

use crate::{DomTree, NodeId};

/// Observer handle issued by a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

impl ObserverId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Mutation observer
#[derive(Debug)]
pub struct MutationObserver {
    id: ObserverId,
    observed: Vec<(NodeId, MutationObserverInit)>,
    records: Vec<MutationRecord>,
}

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    ChildList,
}

impl MutationRecord {
    /// Record for nodes inserted under `target`
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            old_value: None,
        }
    }

    /// Record for an attribute change on `target`
    pub fn attributes(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }
}

impl MutationObserver {
    pub fn new(id: ObserverId) -> Self {
        Self {
            id,
            observed: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Start (or re-configure) observation of `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        match self.observed.iter_mut().find(|(t, _)| *t == target) {
            Some(entry) => entry.1 = options,
            None => self.observed.push((target, options)),
        }
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.records.clear();
    }

    pub fn is_observing(&self) -> bool {
        !self.observed.is_empty()
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Queue a record if any registration covers it
    pub fn enqueue(&mut self, tree: &DomTree, record: &MutationRecord) -> bool {
        let wanted = self.observed.iter().any(|(target, init)| {
            let in_scope = *target == record.target
                || (init.subtree && tree.is_inclusive_ancestor(*target, record.target));
            in_scope && init.accepts(record)
        });

        if wanted {
            let mut record = record.clone();
            if record.mutation_type == MutationType::Attributes && !self.wants_old_value(tree, &record) {
                record.old_value = None;
            }
            self.records.push(record);
        }
        wanted
    }

    fn wants_old_value(&self, tree: &DomTree, record: &MutationRecord) -> bool {
        self.observed.iter().any(|(target, init)| {
            init.attribute_old_value
                && (*target == record.target || (init.subtree && tree.is_inclusive_ancestor(*target, record.target)))
        })
    }
}

impl MutationObserverInit {
    /// Options used by component watchers
    pub fn child_list(subtree: bool) -> Self {
        Self {
            child_list: true,
            subtree,
            ..Default::default()
        }
    }

    fn accepts(&self, record: &MutationRecord) -> bool {
        match record.mutation_type {
            MutationType::ChildList => self.child_list,
            MutationType::Attributes => {
                self.attributes
                    && match (&self.attribute_filter, &record.attribute_name) {
                        (Some(filter), Some(name)) => filter.iter().any(|f| f == name),
                        _ => true,
                    }
            }
        }
    }
}
