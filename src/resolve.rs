//! The resolver pipeline: graph construction, placeholder resolution, the
//! fixed-point processing loop, and assembly of the intermediate tree.
//!
//! The loop alternates two passes until nothing is left: resolve the
//! placeholders whose gating parent is processed, then convert every
//! eligible element in deterministic topological order. A round that makes
//! no progress while unprocessed nodes remain is a hard failure.

use crate::diag::Diagnostics;
use crate::dim::DimKind;
use crate::error::Error;
use crate::graph::{EdgeKind, ElementNode, Graph, Level, NodeId, Parsed, Status};
use crate::ir;
use crate::process::{
    extract_dimension, process_cluster, process_device, process_enumerated_values, process_field,
    process_peripheral, process_register, DimRequest,
};
use crate::svd;
use std::collections::HashSet;
use std::rc::Rc;

/// Runs stages A through C and assembles the intermediate device tree.
pub(crate) fn resolve(parsed: svd::Device, diag: &mut Diagnostics) -> Result<ir::Device, Error> {
    let mut resolver = Resolver::build(parsed);
    let mut round = 0u32;
    loop {
        round += 1;
        let resolved = resolver.resolve_placeholders(diag)?;
        let eligible = resolver.processable_nodes();
        let ordered = resolver.graph.topological_order(&eligible);
        tracing::debug!(round, resolved, eligible = ordered.len(), "resolver round");
        for &id in &ordered {
            resolver.process_node(id, diag)?;
        }
        if resolver.graph.unprocessed_ids().is_empty() {
            break;
        }
        if resolved == 0 && ordered.is_empty() {
            let path = resolver
                .graph
                .placeholders()
                .first()
                .map(|&placeholder| resolver.graph.placeholder(placeholder).derive_path.clone())
                .unwrap_or_else(|| "<unknown>".to_string());
            return Err(Error::UnresolvedDerivation { path });
        }
    }
    resolver.assemble(diag)
}

struct Resolver {
    graph: Graph,
    root: NodeId,
    device: ir::Device,
}

impl Resolver {
    // Stage A: mirror the parse tree as a graph, one node per element, a
    // placeholder per derivedFrom, and a gating edge from each consumer's
    // parent to its placeholder.
    fn build(mut parsed: svd::Device) -> Self {
        let mut graph = Graph::new();
        let peripherals = std::mem::take(&mut parsed.peripherals);
        let device = process_device(&parsed);
        let root = graph.add_root(ElementNode {
            name: Some(parsed.name.clone()),
            level: Level::Device,
            status: Status::Processed,
            parsed: Parsed::Device(Rc::new(parsed)),
            processed: None,
            is_dim_template: false,
        });

        let mut resolver = Self { graph, root, device };
        for mut peripheral in peripherals {
            let children = std::mem::take(&mut peripheral.registers);
            let derived_from = peripheral.derived_from.clone();
            let node = resolver.add_element(
                root,
                peripheral.name.clone(),
                Level::Peripheral,
                Parsed::Peripheral(Rc::new(peripheral)),
                derived_from,
            );
            resolver.build_register_tree(children, node);
        }
        for placeholder in resolver.graph.placeholders() {
            let consumer = resolver.graph.placeholder_consumer(placeholder);
            if let Some(&parent) = resolver.graph.element_parents(consumer).first() {
                resolver.graph.add_edge(parent, placeholder, EdgeKind::Placeholder);
            }
        }
        resolver
    }

    fn build_register_tree(&mut self, children: Vec<svd::RegisterTree>, parent: NodeId) {
        for child in children {
            match child {
                svd::RegisterTree::Register(mut register) => {
                    let fields = std::mem::take(&mut register.fields);
                    let derived_from = register.derived_from.clone();
                    let node = self.add_element(
                        parent,
                        register.name.clone(),
                        Level::Register,
                        Parsed::Register(Rc::new(register)),
                        derived_from,
                    );
                    self.build_fields(fields, node);
                }
                svd::RegisterTree::Cluster(mut cluster) => {
                    let grandchildren = cluster.take_children();
                    let derived_from = cluster.derived_from.clone();
                    let node = self.add_element(
                        parent,
                        cluster.name.clone(),
                        Level::Cluster,
                        Parsed::Cluster(Rc::new(cluster)),
                        derived_from,
                    );
                    self.build_register_tree(grandchildren, node);
                }
            }
        }
    }

    fn build_fields(&mut self, fields: Vec<svd::Field>, parent: NodeId) {
        for mut field in fields {
            let containers = std::mem::take(&mut field.enumerated_values);
            let derived_from = field.derived_from.clone();
            let node = self.add_element(
                parent,
                field.name.clone(),
                Level::Field,
                Parsed::Field(Rc::new(field)),
                derived_from,
            );
            for container in containers {
                let derived_from = container.derived_from.clone();
                let name = container.name.clone().unwrap_or_default();
                self.add_element(
                    node,
                    name,
                    Level::EnumContainer,
                    Parsed::EnumContainer(Rc::new(container)),
                    derived_from,
                );
            }
        }
    }

    fn add_element(
        &mut self,
        parent: NodeId,
        name: String,
        level: Level,
        parsed: Parsed,
        derived_from: Option<String>,
    ) -> NodeId {
        let kind = if self.graph.element(parent).status == Status::Processed {
            EdgeKind::ChildResolved
        } else {
            EdgeKind::ChildUnresolved
        };
        let node = ElementNode {
            name: Some(name),
            level,
            status: Status::Unprocessed,
            parsed,
            processed: None,
            is_dim_template: false,
        };
        let id = self.graph.add_element_child(parent, node, kind);
        if let Some(path) = derived_from {
            self.graph.add_placeholder(path, id);
        }
        id
    }

    /// Dotted path of an element, for diagnostics.
    fn node_path(&self, id: NodeId) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut current = id;
        loop {
            let element = self.graph.element(current);
            if element.level == Level::Device {
                break;
            }
            parts.push(element.name.clone().unwrap_or_default());
            match self.graph.element_parents(current).first() {
                Some(&parent) => current = parent,
                None => break,
            }
        }
        parts.reverse();
        parts.join(".")
    }

    // Stage B: each placeholder whose gating parent is processed looks up
    // its target, sibling scope first, then across all peripherals.
    fn resolve_placeholders(&mut self, _diag: &mut Diagnostics) -> Result<usize, Error> {
        let mut resolved = 0;
        for placeholder in self.graph.placeholders() {
            let Some(parent) = self.graph.placeholder_parent(placeholder) else {
                continue;
            };
            if self.graph.element(parent).status != Status::Processed {
                continue;
            }
            let consumer = self.graph.placeholder_consumer(placeholder);
            let path = self.graph.placeholder(placeholder).derive_path.clone();
            let Some(base) = self.find_base_node(consumer, &path)? else {
                continue;
            };
            self.graph.remove_node(placeholder);
            if !self.graph.try_add_derive_edge(base, consumer) {
                return Err(Error::Cycle {
                    name: self
                        .graph
                        .element(consumer)
                        .name
                        .clone()
                        .unwrap_or_default(),
                    path,
                });
            }
            tracing::trace!(path = %path, "placeholder resolved");
            resolved += 1;
        }
        Ok(resolved)
    }

    fn find_base_node(&self, consumer: NodeId, path: &str) -> Result<Option<NodeId>, Error> {
        let parts: Vec<&str> = path.split('.').collect();
        let level = self.graph.element(consumer).level;

        let siblings = self.graph.element_siblings(consumer);
        if let Some(base) = self.find_in_scope(&siblings, &parts, level, consumer, path)? {
            return Ok(Some(base));
        }
        let peripherals = self.graph.element_children(self.root);
        self.find_in_scope(&peripherals, &parts, level, consumer, path)
    }

    fn find_in_scope(
        &self,
        scope: &[NodeId],
        parts: &[&str],
        level: Level,
        consumer: NodeId,
        path: &str,
    ) -> Result<Option<NodeId>, Error> {
        let mut matches = Vec::new();
        for &node in scope {
            if let Some(found) = self.match_path(node, parts, level, consumer) {
                matches.push(found);
            }
        }
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            _ => Err(Error::AmbiguousDerivation { path: path.to_string() }),
        }
    }

    fn match_path(
        &self,
        node: NodeId,
        parts: &[&str],
        level: Level,
        consumer: NodeId,
    ) -> Option<NodeId> {
        if node == consumer {
            return None;
        }
        if self.graph.element(node).name.as_deref() != Some(parts[0]) {
            return None;
        }
        if parts.len() == 1 {
            return (self.graph.element(node).level == level).then_some(node);
        }
        for child in self.graph.element_children(node) {
            if let Some(found) = self.match_path(child, &parts[1..], level, consumer) {
                return Some(found);
            }
        }
        None
    }

    // Stage C eligibility: all in-edges resolved, no placeholder gate, and
    // any derive base already processed or scheduled earlier this round.
    fn processable_nodes(&self) -> Vec<NodeId> {
        let mut candidates: Vec<NodeId> = self
            .graph
            .unprocessed_ids()
            .into_iter()
            .filter(|&id| {
                !self.graph.has_in_edge_of(id, EdgeKind::Placeholder)
                    && !self.graph.has_in_edge_of(id, EdgeKind::ChildUnresolved)
            })
            .collect();
        loop {
            let scheduled: HashSet<NodeId> = candidates.iter().copied().collect();
            let before = candidates.len();
            candidates.retain(|&id| match self.graph.derive_base(id) {
                Some(base) => {
                    self.graph.element(base).status == Status::Processed
                        || scheduled.contains(&base)
                }
                None => true,
            });
            if candidates.len() == before {
                break;
            }
        }
        candidates
    }

    fn process_node(&mut self, id: NodeId, diag: &mut Diagnostics) -> Result<(), Error> {
        let path = self.node_path(id);
        tracing::trace!(path = %path, "processing element");
        let base_id = self.graph.derive_base(id);
        if let Some(base_id) = base_id {
            if self.graph.element(base_id).level != self.graph.element(id).level {
                return Err(Error::LevelMismatch {
                    name: self.graph.element(id).name.clone().unwrap_or_default(),
                    base: self.graph.element(base_id).name.clone().unwrap_or_default(),
                });
            }
        }

        match self.graph.element(id).parsed.clone() {
            Parsed::Device(_) => unreachable!("the device root is processed at construction"),
            Parsed::EnumContainer(_) => {
                if let Some(base_id) = base_id {
                    let base_parsed = self.graph.element(base_id).parsed.clone();
                    self.graph.remove_edge(base_id, id, EdgeKind::Derive);
                    self.graph.element_mut(id).parsed = base_parsed;
                }
                self.graph.element_mut(id).status = Status::Processed;
                Ok(())
            }
            Parsed::Peripheral(parsed) => {
                let base = base_id.and_then(|base| self.base_ir(base));
                let base = match &base {
                    Some(ir::Element::Peripheral(peripheral)) => Some(peripheral),
                    _ => None,
                };
                let (is_dim, expansion) = extract_dimension(
                    DimRequest {
                        name: &parsed.name,
                        display_name: None,
                        dim: parsed.dim.or(base.and_then(|base| base.dim)),
                        dim_index: parsed
                            .dim_index
                            .as_deref()
                            .or(base.and_then(|base| base.dim_index.as_deref())),
                        kind: DimKind::Peripheral,
                    },
                    &path,
                    diag,
                )?;
                if is_dim {
                    let instances = expansion
                        .names
                        .iter()
                        .enumerate()
                        .map(|(index, name)| {
                            ir::Element::Peripheral(process_peripheral(
                                index as u32,
                                name.clone(),
                                &parsed,
                                base,
                            ))
                        })
                        .collect();
                    let template = ir::Element::Peripheral(process_peripheral(
                        0,
                        parsed.name.clone(),
                        &parsed,
                        base,
                    ));
                    self.finish_dim_element(id, base_id, instances, template);
                } else {
                    let element = ir::Element::Peripheral(process_peripheral(
                        0,
                        parsed.name.clone(),
                        &parsed,
                        base,
                    ));
                    self.finish_element(id, base_id, element);
                }
                Ok(())
            }
            Parsed::Cluster(parsed) => {
                let base = base_id.and_then(|base| self.base_ir(base));
                let base = match &base {
                    Some(ir::Element::Cluster(cluster)) => Some(cluster),
                    _ => None,
                };
                let (is_dim, expansion) = extract_dimension(
                    DimRequest {
                        name: &parsed.name,
                        display_name: None,
                        dim: parsed.dim.or(base.and_then(|base| base.dim)),
                        dim_index: parsed
                            .dim_index
                            .as_deref()
                            .or(base.and_then(|base| base.dim_index.as_deref())),
                        kind: DimKind::Cluster,
                    },
                    &path,
                    diag,
                )?;
                if is_dim {
                    let instances = expansion
                        .names
                        .iter()
                        .enumerate()
                        .map(|(index, name)| {
                            ir::Element::Cluster(process_cluster(
                                index as u32,
                                name.clone(),
                                &parsed,
                                base,
                            ))
                        })
                        .collect();
                    let template =
                        ir::Element::Cluster(process_cluster(0, parsed.name.clone(), &parsed, base));
                    self.finish_dim_element(id, base_id, instances, template);
                } else {
                    let element =
                        ir::Element::Cluster(process_cluster(0, parsed.name.clone(), &parsed, base));
                    self.finish_element(id, base_id, element);
                }
                Ok(())
            }
            Parsed::Register(parsed) => {
                let base = base_id.and_then(|base| self.base_ir(base));
                let base = match &base {
                    Some(ir::Element::Register(register)) => Some(register),
                    _ => None,
                };
                let display_name = parsed
                    .display_name
                    .clone()
                    .or_else(|| base.and_then(|base| base.display_name.clone()));
                let (is_dim, expansion) = extract_dimension(
                    DimRequest {
                        name: &parsed.name,
                        display_name: display_name.as_deref(),
                        dim: parsed.dim.or(base.and_then(|base| base.dim)),
                        dim_index: parsed
                            .dim_index
                            .as_deref()
                            .or(base.and_then(|base| base.dim_index.as_deref())),
                        kind: DimKind::Register,
                    },
                    &path,
                    diag,
                )?;
                if is_dim {
                    let instances = expansion
                        .names
                        .iter()
                        .zip(&expansion.display_names)
                        .enumerate()
                        .map(|(index, (name, display))| {
                            ir::Element::Register(process_register(
                                index as u32,
                                name.clone(),
                                display.clone(),
                                &parsed,
                                base,
                            ))
                        })
                        .collect();
                    let template = ir::Element::Register(process_register(
                        0,
                        parsed.name.clone(),
                        display_name,
                        &parsed,
                        base,
                    ));
                    self.finish_dim_element(id, base_id, instances, template);
                } else {
                    let element = ir::Element::Register(process_register(
                        0,
                        parsed.name.clone(),
                        display_name,
                        &parsed,
                        base,
                    ));
                    self.finish_element(id, base_id, element);
                }
                Ok(())
            }
            Parsed::Field(parsed) => {
                let base = base_id.and_then(|base| self.base_ir(base));
                let base = match &base {
                    Some(ir::Element::Field(field)) => Some(field),
                    _ => None,
                };
                let (is_dim, expansion) = extract_dimension(
                    DimRequest {
                        name: &parsed.name,
                        display_name: None,
                        dim: parsed.dim.or(base.and_then(|base| base.dim)),
                        dim_index: parsed
                            .dim_index
                            .as_deref()
                            .or(base.and_then(|base| base.dim_index.as_deref())),
                        kind: DimKind::Field,
                    },
                    &path,
                    diag,
                )?;
                if is_dim {
                    let instances = expansion
                        .names
                        .iter()
                        .enumerate()
                        .map(|(index, name)| {
                            process_field(index as u32, name.clone(), &parsed, base, &path, diag)
                                .map(ir::Element::Field)
                        })
                        .collect::<Result<Vec<_>, Error>>()?;
                    let template = ir::Element::Field(process_field(
                        0,
                        parsed.name.clone(),
                        &parsed,
                        base,
                        &path,
                        diag,
                    )?);
                    self.finish_dim_element(id, base_id, instances, template);
                } else {
                    let element = ir::Element::Field(process_field(
                        0,
                        parsed.name.clone(),
                        &parsed,
                        base,
                        &path,
                        diag,
                    )?);
                    self.finish_element(id, base_id, element);
                }
                Ok(())
            }
        }
    }

    fn base_ir(&self, base: NodeId) -> Option<ir::Element> {
        self.graph.element(base).processed.clone()
    }

    /// Marks a node processed. For derived nodes the derive edge is
    /// dropped and the base's descendants replicate below the consumer,
    /// except those shadowed by the consumer's own same-named children.
    fn finish_element(&mut self, id: NodeId, base_id: Option<NodeId>, processed: ir::Element) {
        if let Some(base_id) = base_id {
            self.graph.remove_edge(base_id, id, EdgeKind::Derive);
            let overridden: HashSet<String> = self
                .graph
                .element_children(id)
                .into_iter()
                .filter_map(|child| self.graph.element(child).name.clone())
                .collect();
            self.graph.replicate_descendants(base_id, id, &overridden);
        }
        let element = self.graph.element_mut(id);
        element.processed = Some(processed);
        element.status = Status::Processed;
        self.graph.mark_child_edges_resolved(id);
    }

    /// Finishes a dim template: the template node keeps its `%s` name and
    /// stays out of the final output; one processed replica per concrete
    /// instance attaches to each of the template's parents and shares the
    /// template's children.
    fn finish_dim_element(
        &mut self,
        id: NodeId,
        base_id: Option<NodeId>,
        instances: Vec<ir::Element>,
        template: ir::Element,
    ) {
        self.finish_element(id, base_id, template);
        self.graph.element_mut(id).is_dim_template = true;

        let level = self.graph.element(id).level;
        let parsed = self.graph.element(id).parsed.clone();
        let mut replicas = Vec::new();
        for parent in self.graph.element_parents(id) {
            for instance in &instances {
                let node = ElementNode {
                    name: Some(instance.name().to_string()),
                    level,
                    status: Status::Processed,
                    parsed: parsed.clone(),
                    processed: Some(instance.clone()),
                    is_dim_template: false,
                };
                let replica = self.graph.add_element_child(parent, node, EdgeKind::ChildResolved);
                replicas.push(replica);
            }
        }
        for replica in replicas {
            for child in self.graph.element_children(id) {
                self.graph.add_edge(replica, child, EdgeKind::ChildResolved);
            }
        }
    }

    // Assembly: pull the intermediate tree out of the graph, sorting
    // children and adjusting sizes bottom-up. Dim templates stay behind.
    fn assemble(mut self, diag: &mut Diagnostics) -> Result<ir::Device, Error> {
        let mut peripherals = Vec::new();
        for node in self.concrete_children(self.root) {
            peripherals.push(self.assemble_peripheral(node, diag)?);
        }
        peripherals.sort_by(|a, b| {
            (a.base_address, a.name.as_str()).cmp(&(b.base_address, b.name.as_str()))
        });
        self.device.peripherals = peripherals;
        Ok(self.device)
    }

    fn concrete_children(&self, id: NodeId) -> Vec<NodeId> {
        self.graph
            .element_children(id)
            .into_iter()
            .filter(|&child| !self.graph.element(child).is_dim_template)
            .collect()
    }

    fn assemble_peripheral(
        &self,
        id: NodeId,
        diag: &mut Diagnostics,
    ) -> Result<ir::Peripheral, Error> {
        let Some(ir::Element::Peripheral(mut peripheral)) = self.graph.element(id).processed.clone()
        else {
            unreachable!("peripheral node without processed payload");
        };
        let ancestor_size = peripheral.size.unwrap_or(self.device.size);
        let mut children = Vec::new();
        for child in self.concrete_children(id) {
            children.push(self.assemble_register_cluster(child, ancestor_size, diag)?);
        }
        children.sort_by(|a, b| {
            (a.address_offset(), a.name()).cmp(&(b.address_offset(), b.name()))
        });
        peripheral.size = Some(adjusted_size(ancestor_size, &children));
        peripheral.children = children;
        Ok(peripheral)
    }

    fn assemble_register_cluster(
        &self,
        id: NodeId,
        ancestor_size: u32,
        diag: &mut Diagnostics,
    ) -> Result<ir::RegisterCluster, Error> {
        match self.graph.element(id).processed.clone() {
            Some(ir::Element::Cluster(mut cluster)) => {
                let own_or_inherited = cluster.size.unwrap_or(ancestor_size);
                let mut children = Vec::new();
                for child in self.concrete_children(id) {
                    children.push(self.assemble_register_cluster(child, own_or_inherited, diag)?);
                }
                children.sort_by(|a, b| {
                    (a.address_offset(), a.name()).cmp(&(b.address_offset(), b.name()))
                });
                cluster.size = Some(adjusted_size(own_or_inherited, &children));
                cluster.children = children;
                Ok(ir::RegisterCluster::Cluster(cluster))
            }
            Some(ir::Element::Register(mut register)) => {
                let mut fields = Vec::new();
                for child in self.concrete_children(id) {
                    fields.push(self.assemble_field(child, diag)?);
                }
                fields.sort_by(|a, b| (a.lsb, a.name.as_str()).cmp(&(b.lsb, b.name.as_str())));
                register.fields = fields;
                Ok(ir::RegisterCluster::Register(register))
            }
            _ => unreachable!("register/cluster node without processed payload"),
        }
    }

    fn assemble_field(&self, id: NodeId, diag: &mut Diagnostics) -> Result<ir::Field, Error> {
        let Some(ir::Element::Field(mut field)) = self.graph.element(id).processed.clone() else {
            unreachable!("field node without processed payload");
        };
        let path = self.node_path(id);
        let mut containers = Vec::new();
        for child in self.concrete_children(id) {
            let Parsed::EnumContainer(parsed) = self.graph.element(child).parsed.clone() else {
                unreachable!("field child is not an enumerated-value container");
            };
            containers.push(process_enumerated_values(&parsed, field.lsb, field.msb, &path, diag)?);
        }
        field.enumerated_value_containers = containers;
        Ok(field)
    }
}

/// Size of a container element: its own (or nearest inherited) size, grown
/// to hold its largest child.
fn adjusted_size(own_or_inherited: u32, children: &[ir::RegisterCluster]) -> u32 {
    let max_child = children
        .iter()
        .filter_map(|child| match child {
            ir::RegisterCluster::Register(register) => register.size,
            ir::RegisterCluster::Cluster(cluster) => cluster.size,
        })
        .max()
        .unwrap_or(0);
    own_or_inherited.max(max_child)
}
