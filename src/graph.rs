//! Resolver graph arena.
//!
//! Nodes are addressed by stable identifiers that survive removals, so
//! working sets held across mutation rounds never dangle. The graph minus
//! derive edges is the ownership tree of the document; derive edges form an
//! overlay that must stay acyclic.

use crate::ir;
use crate::svd;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::rc::Rc;

/// Stable handle of a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EdgeKind {
    ChildUnresolved,
    ChildResolved,
    Placeholder,
    Derive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Level {
    Device,
    Peripheral,
    Cluster,
    Register,
    Field,
    EnumContainer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Status {
    Unprocessed,
    Processed,
}

/// Parsed payload of an element node. Replicas share the record.
#[derive(Clone, Debug)]
pub(crate) enum Parsed {
    Device(Rc<svd::Device>),
    Peripheral(Rc<svd::Peripheral>),
    Cluster(Rc<svd::Cluster>),
    Register(Rc<svd::Register>),
    Field(Rc<svd::Field>),
    EnumContainer(Rc<svd::EnumeratedValues>),
}

#[derive(Clone, Debug)]
pub(crate) struct ElementNode {
    pub(crate) name: Option<String>,
    pub(crate) level: Level,
    pub(crate) status: Status,
    pub(crate) parsed: Parsed,
    pub(crate) processed: Option<ir::Element>,
    pub(crate) is_dim_template: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct PlaceholderNode {
    pub(crate) derive_path: String,
}

#[derive(Clone, Debug)]
pub(crate) enum Node {
    Element(ElementNode),
    Placeholder(PlaceholderNode),
}

impl Node {
    fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(element) => Some(element),
            Node::Placeholder(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Graph {
    nodes: IndexMap<NodeId, Node>,
    out_edges: IndexMap<NodeId, Vec<(NodeId, EdgeKind)>>,
    in_edges: IndexMap<NodeId, Vec<(NodeId, EdgeKind)>>,
    placeholders: Vec<NodeId>,
    next_id: u64,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        self.out_edges.insert(id, Vec::new());
        self.in_edges.insert(id, Vec::new());
        id
    }

    pub(crate) fn add_root(&mut self, root: ElementNode) -> NodeId {
        self.insert(Node::Element(root))
    }

    pub(crate) fn add_element_child(
        &mut self,
        parent: NodeId,
        child: ElementNode,
        kind: EdgeKind,
    ) -> NodeId {
        let id = self.insert(Node::Element(child));
        self.add_edge(parent, id, kind);
        id
    }

    /// Inserts a placeholder with its edge to the consuming element.
    pub(crate) fn add_placeholder(&mut self, derive_path: String, consumer: NodeId) -> NodeId {
        let id = self.insert(Node::Placeholder(PlaceholderNode { derive_path }));
        self.add_edge(id, consumer, EdgeKind::Placeholder);
        self.placeholders.push(id);
        id
    }

    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) {
        self.out_edges[&from].push((to, kind));
        self.in_edges[&to].push((from, kind));
    }

    /// Inserts a derive edge, refusing edges that would close a cycle.
    pub(crate) fn try_add_derive_edge(&mut self, base: NodeId, consumer: NodeId) -> bool {
        if self.is_reachable(consumer, base) {
            return false;
        }
        self.add_edge(base, consumer, EdgeKind::Derive);
        true
    }

    fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            for &(next, _) in &self.out_edges[&id] {
                stack.push(next);
            }
        }
        false
    }

    /// Removes one edge of the given kind; parallel edges of other kinds
    /// between the same pair (a node deriving from its own parent) stay.
    pub(crate) fn remove_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) {
        let out = &mut self.out_edges[&from];
        if let Some(position) =
            out.iter().position(|&(target, edge_kind)| target == to && edge_kind == kind)
        {
            out.remove(position);
        }
        let incoming = &mut self.in_edges[&to];
        if let Some(position) =
            incoming.iter().position(|&(source, edge_kind)| source == from && edge_kind == kind)
        {
            incoming.remove(position);
        }
    }

    pub(crate) fn remove_node(&mut self, id: NodeId) {
        let incoming: Vec<NodeId> = self.in_edges[&id].iter().map(|&(source, _)| source).collect();
        let outgoing: Vec<NodeId> = self.out_edges[&id].iter().map(|&(target, _)| target).collect();
        for source in incoming {
            self.out_edges[&source].retain(|&(target, _)| target != id);
        }
        for target in outgoing {
            self.in_edges[&target].retain(|&(source, _)| source != id);
        }
        self.nodes.remove(&id);
        self.out_edges.remove(&id);
        self.in_edges.remove(&id);
        self.placeholders.retain(|&placeholder| placeholder != id);
    }

    pub(crate) fn element(&self, id: NodeId) -> &ElementNode {
        match &self.nodes[&id] {
            Node::Element(element) => element,
            Node::Placeholder(_) => unreachable!("node {id:?} is a placeholder"),
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> &mut ElementNode {
        match self.nodes.get_mut(&id).unwrap() {
            Node::Element(element) => element,
            Node::Placeholder(_) => unreachable!("node {id:?} is a placeholder"),
        }
    }

    pub(crate) fn placeholder(&self, id: NodeId) -> &PlaceholderNode {
        match &self.nodes[&id] {
            Node::Placeholder(placeholder) => placeholder,
            Node::Element(_) => unreachable!("node {id:?} is an element"),
        }
    }

    pub(crate) fn placeholders(&self) -> Vec<NodeId> {
        self.placeholders.clone()
    }

    /// The element consuming the placeholder's derivation.
    pub(crate) fn placeholder_consumer(&self, placeholder: NodeId) -> NodeId {
        self.out_edges[&placeholder]
            .iter()
            .find(|&&(target, kind)| {
                kind == EdgeKind::Placeholder && self.nodes[&target].as_element().is_some()
            })
            .map(|&(target, _)| target)
            .expect("placeholder without consumer")
    }

    /// The element gating the placeholder, once the co-parent edge exists.
    pub(crate) fn placeholder_parent(&self, placeholder: NodeId) -> Option<NodeId> {
        self.in_edges[&placeholder]
            .iter()
            .find(|&&(_, kind)| kind == EdgeKind::Placeholder)
            .map(|&(source, _)| source)
    }

    pub(crate) fn element_parents(&self, id: NodeId) -> Vec<NodeId> {
        self.in_edges[&id]
            .iter()
            .filter(|&&(source, kind)| {
                matches!(kind, EdgeKind::ChildUnresolved | EdgeKind::ChildResolved)
                    && self.nodes[&source].as_element().is_some()
            })
            .map(|&(source, _)| source)
            .collect()
    }

    pub(crate) fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.out_edges[&id]
            .iter()
            .filter(|&&(target, kind)| {
                matches!(kind, EdgeKind::ChildUnresolved | EdgeKind::ChildResolved)
                    && self.nodes[&target].as_element().is_some()
            })
            .map(|&(target, _)| target)
            .collect()
    }

    /// Siblings of `id` under its first element parent, excluding `id`.
    ///
    /// Concrete dim instances may carry several parents, but all of them
    /// hold the same children, so the first parent suffices.
    pub(crate) fn element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&parent) = self.element_parents(id).first() else {
            return Vec::new();
        };
        self.element_children(parent).into_iter().filter(|&sibling| sibling != id).collect()
    }

    pub(crate) fn has_in_edge_of(&self, id: NodeId, kind: EdgeKind) -> bool {
        self.in_edges[&id].iter().any(|&(_, edge_kind)| edge_kind == kind)
    }

    /// The base element of a derive edge pointing at `id`.
    pub(crate) fn derive_base(&self, id: NodeId) -> Option<NodeId> {
        self.in_edges[&id]
            .iter()
            .find(|&&(_, kind)| kind == EdgeKind::Derive)
            .map(|&(source, _)| source)
    }

    /// Rewrites outgoing child edges of a freshly processed node.
    pub(crate) fn mark_child_edges_resolved(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.out_edges[&id]
            .iter()
            .filter(|&&(_, kind)| kind == EdgeKind::ChildUnresolved)
            .map(|&(target, _)| target)
            .collect();
        for child in children {
            for entry in self.out_edges[&id].iter_mut() {
                if entry.0 == child && entry.1 == EdgeKind::ChildUnresolved {
                    entry.1 = EdgeKind::ChildResolved;
                }
            }
            for entry in self.in_edges[&child].iter_mut() {
                if entry.0 == id && entry.1 == EdgeKind::ChildUnresolved {
                    entry.1 = EdgeKind::ChildResolved;
                }
            }
        }
    }

    pub(crate) fn unprocessed_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter_map(|(&id, node)| match node {
                Node::Element(element) if element.status == Status::Unprocessed => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Deterministic processing order over `set`: Kahn's algorithm with the
    /// priority `(is_derived, id)`, so non-derived nodes run first at equal
    /// rank and ties break on the stable identifier.
    pub(crate) fn topological_order(&self, set: &[NodeId]) -> Vec<NodeId> {
        use std::cmp::Reverse;
        use std::collections::BinaryHeap;

        let members: HashSet<NodeId> = set.iter().copied().collect();
        let mut pending: IndexMap<NodeId, usize> = IndexMap::new();
        for &id in set {
            let in_degree = self.in_edges[&id]
                .iter()
                .filter(|&&(source, _)| members.contains(&source))
                .count();
            pending.insert(id, in_degree);
        }

        let mut heap = BinaryHeap::new();
        for (&id, &in_degree) in &pending {
            if in_degree == 0 {
                heap.push(Reverse((self.has_in_edge_of(id, EdgeKind::Derive), id)));
            }
        }

        let mut order = Vec::with_capacity(set.len());
        while let Some(Reverse((_, id))) = heap.pop() {
            order.push(id);
            for &(target, _) in &self.out_edges[&id] {
                if let Some(in_degree) = pending.get_mut(&target) {
                    *in_degree -= 1;
                    if *in_degree == 0 {
                        heap.push(Reverse((
                            self.has_in_edge_of(target, EdgeKind::Derive),
                            target,
                        )));
                    }
                }
            }
        }
        order
    }

    /// Deep-copies the derive-independent subgraph below `base` and hangs it
    /// under `target`. Immediate children whose name appears in
    /// `overridden` — and anything below them, including their pending
    /// placeholders — are not replicated: the consumer's own child shadows
    /// them.
    pub(crate) fn replicate_descendants(
        &mut self,
        base: NodeId,
        target: NodeId,
        overridden: &HashSet<String>,
    ) {
        let mut skipped_children: HashSet<NodeId> = HashSet::new();
        let mut immediate: Vec<NodeId> = Vec::new();
        for &(child, kind) in &self.out_edges[&base] {
            if kind == EdgeKind::Derive {
                continue;
            }
            match &self.nodes[&child] {
                Node::Element(element) => {
                    if element.name.as_deref().is_some_and(|name| overridden.contains(name)) {
                        skipped_children.insert(child);
                    } else {
                        immediate.push(child);
                    }
                }
                Node::Placeholder(_) => immediate.push(child),
            }
        }
        // A placeholder of a shadowed child must not survive the shadowing.
        immediate.retain(|&child| match &self.nodes[&child] {
            Node::Placeholder(_) => !skipped_children.contains(&self.placeholder_consumer(child)),
            Node::Element(_) => true,
        });

        let mut to_replicate: Vec<NodeId> = Vec::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = immediate.clone();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            to_replicate.push(id);
            for &(child, kind) in &self.out_edges[&id] {
                if kind == EdgeKind::Derive {
                    continue;
                }
                stack.push(child);
            }
        }

        let mut replica_of: IndexMap<NodeId, NodeId> = IndexMap::new();
        for &id in &to_replicate {
            let clone = self.nodes[&id].clone();
            let is_placeholder = matches!(clone, Node::Placeholder(_));
            let replica = self.insert(clone);
            if is_placeholder {
                self.placeholders.push(replica);
            }
            replica_of.insert(id, replica);
        }

        let replicated: HashSet<NodeId> = to_replicate.iter().copied().collect();
        for &id in &to_replicate {
            let out: Vec<(NodeId, EdgeKind)> = self.out_edges[&id].clone();
            for (child, kind) in out {
                if replicated.contains(&child) {
                    self.add_edge(replica_of[&id], replica_of[&child], kind);
                }
            }
            let incoming: Vec<(NodeId, EdgeKind)> = self.in_edges[&id].clone();
            for (source, kind) in incoming {
                if kind == EdgeKind::Derive && !replicated.contains(&source) {
                    self.add_edge(source, replica_of[&id], kind);
                }
            }
        }

        let base_processed = self.element(base).status == Status::Processed;
        for child in immediate {
            let replica = replica_of[&child];
            let kind = match &self.nodes[&replica] {
                Node::Placeholder(_) => EdgeKind::Placeholder,
                Node::Element(_) if base_processed => EdgeKind::ChildResolved,
                Node::Element(_) => EdgeKind::ChildUnresolved,
            };
            self.add_edge(target, replica, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, level: Level, status: Status) -> ElementNode {
        ElementNode {
            name: Some(name.to_string()),
            level,
            status,
            parsed: Parsed::EnumContainer(Rc::new(crate::svd::EnumeratedValues {
                derived_from: None,
                name: None,
                header_enum_name: None,
                usage: None,
                values: Vec::new(),
            })),
            processed: None,
            is_dim_template: false,
        }
    }

    #[test]
    fn derive_cycle_is_refused() {
        let mut graph = Graph::new();
        let root = graph.add_root(element("root", Level::Device, Status::Processed));
        let a = graph.add_element_child(
            root,
            element("A", Level::Peripheral, Status::Unprocessed),
            EdgeKind::ChildResolved,
        );
        let b = graph.add_element_child(
            root,
            element("B", Level::Peripheral, Status::Unprocessed),
            EdgeKind::ChildResolved,
        );
        assert!(graph.try_add_derive_edge(b, a));
        assert!(!graph.try_add_derive_edge(a, b));
    }

    #[test]
    fn topological_order_demotes_derived_nodes() {
        let mut graph = Graph::new();
        let root = graph.add_root(element("root", Level::Device, Status::Processed));
        let a = graph.add_element_child(
            root,
            element("A", Level::Peripheral, Status::Unprocessed),
            EdgeKind::ChildResolved,
        );
        let b = graph.add_element_child(
            root,
            element("B", Level::Peripheral, Status::Unprocessed),
            EdgeKind::ChildResolved,
        );
        // A derives from B, so B must come first despite its larger id.
        assert!(graph.try_add_derive_edge(b, a));
        assert_eq!(graph.topological_order(&[a, b]), vec![b, a]);
    }

    #[test]
    fn replication_skips_overridden_children() {
        let mut graph = Graph::new();
        let root = graph.add_root(element("root", Level::Device, Status::Processed));
        let base = graph.add_element_child(
            root,
            element("BASE", Level::Peripheral, Status::Processed),
            EdgeKind::ChildResolved,
        );
        graph.add_element_child(
            base,
            element("KEEP", Level::Register, Status::Processed),
            EdgeKind::ChildResolved,
        );
        graph.add_element_child(
            base,
            element("SHADOWED", Level::Register, Status::Processed),
            EdgeKind::ChildResolved,
        );
        let target = graph.add_element_child(
            root,
            element("DERIVED", Level::Peripheral, Status::Unprocessed),
            EdgeKind::ChildResolved,
        );

        let overridden: HashSet<String> = ["SHADOWED".to_string()].into_iter().collect();
        graph.replicate_descendants(base, target, &overridden);

        let names: Vec<String> = graph
            .element_children(target)
            .into_iter()
            .map(|id| graph.element(id).name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["KEEP".to_string()]);
    }
}
