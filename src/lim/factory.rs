//! Node Store
//!
//! The [`Factory`] owns every node by dense id, the string table and the
//! per-node filter bits. All edge mutation goes through it so that schema
//! checks, containment back-pointers and the optional reverse index stay
//! consistent.
//!
//! Ids below [`FIRST_NODE_ID`] are never allocated. A fresh store always
//! holds the root package, the file system and the root component.
//!
//! @module lim/factory

use std::collections::{BTreeMap, HashMap};

use smallvec::SmallVec;
use tracing::trace;

use super::edges::{self, Assoc, SlotMut};
use super::node::{ClassData, MemberData, MethodData, NamedData, Node, ScopeData};
use super::reverse::ReverseEdges;
use super::strtable::StrTable;
use super::types::*;
use crate::core::error::{Error, Result};

/// Name of the root package
pub const ROOT_PACKAGE_NAME: &str = "global namespace";

/// Name of the file system root
pub const FILE_SYSTEM_NAME: &str = "FileSystem";

/// Name of the root component
pub const ROOT_COMPONENT_NAME: &str = "<System>";

// =============================================================================
// CACHES
// =============================================================================

/// Lookup tables for nodes that exist at most once per key
#[derive(Debug, Clone, Default)]
struct NodeCaches {
    simple_types: HashMap<SimpleTypeKind, NodeId>,
    pointer_formers: HashMap<PointerKind, NodeId>,
    array_former: Option<NodeId>,
    non_type_former: Option<NodeId>,
    type_formers: HashMap<NodeId, NodeId>,
    attribute_accesses: HashMap<NodeId, NodeId>,
    method_calls: HashMap<NodeId, NodeId>,
    comments: HashMap<Key, NodeId>,
    components: HashMap<Key, NodeId>,
    types: HashMap<String, NodeId>,
}

/// Canonical key of a type built from `formers` (outermost last)
fn type_signature(formers: &[NodeId]) -> String {
    let ids: Vec<String> = formers.iter().map(|id| id.to_string()).collect();
    format!("[{}]", ids.join(","))
}

// =============================================================================
// FACTORY
// =============================================================================

/// Arena of LIM nodes
#[derive(Debug, Clone)]
pub struct Factory {
    nodes: Vec<Option<Node>>,
    filtered: Vec<bool>,
    strings: StrTable,
    reverse: Option<ReverseEdges>,
    caches: NodeCaches,
    type_stack: Vec<SmallVec<[NodeId; 8]>>,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory {
    /// Create a store holding only the three root nodes
    pub fn new() -> Self {
        Self::with_strings(StrTable::new())
    }

    /// Create a store around an existing string table
    pub fn with_strings(strings: StrTable) -> Self {
        let mut factory = Self::empty(strings);
        factory.create_roots();
        factory
    }

    /// Store with no nodes at all; used when loading
    pub(crate) fn empty(strings: StrTable) -> Self {
        Self {
            nodes: vec![None; FIRST_NODE_ID as usize],
            filtered: vec![false; FIRST_NODE_ID as usize],
            strings,
            reverse: None,
            caches: NodeCaches::default(),
            type_stack: Vec::new(),
        }
    }

    fn create_roots(&mut self) {
        let package = self.push(NodeKind::Package);
        let fs = self.push(NodeKind::FileSystem);
        let component = self.push(NodeKind::Component);
        debug_assert_eq!(
            (package, fs, component),
            (ROOT_PACKAGE_ID, FILE_SYSTEM_ID, ROOT_COMPONENT_ID)
        );

        let name = self.strings.set(ROOT_PACKAGE_NAME);
        self.set_name_key(package, name);
        let name = self.strings.set(FILE_SYSTEM_NAME);
        self.set_name_key(fs, name);
        let name = self.strings.set(ROOT_COMPONENT_NAME);
        self.set_name_key(component, name);
        self.caches.components.insert(name, component);
    }

    /// Append a node of a concrete kind; abstract kinds are rejected by
    /// [`Factory::create`] before reaching here
    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(kind, id));
        self.filtered.push(false);
        id
    }

    fn set_name_key(&mut self, id: NodeId, key: Key) {
        if let Some(named) = self.node_mut(id).and_then(Node::named_mut) {
            named.name = key;
        }
    }

    // =========================================================================
    // BASIC ACCESS
    // =========================================================================

    /// Allocate a fresh node of `kind`
    pub fn create(&mut self, kind: NodeKind) -> Result<NodeId> {
        if kind.is_abstract() {
            return Err(Error::InvalidNodeKind {
                operation: "Factory::create",
                kind: kind.as_str(),
            });
        }
        let id = self.push(kind);
        trace!(id, kind = %kind, "Created node");
        Ok(id)
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize).and_then(Option::as_mut)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(Error::InvalidNode { id })
    }

    /// Mutable access for scalar fields; edges must go through the
    /// factory's edge methods
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(Error::InvalidNode { id })
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        Ok(self.get(id)?.kind())
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id the next created node will receive
    pub fn next_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    /// All nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().flatten()
    }

    /// Nodes whose filter bit is clear, in id order
    pub fn iter_unfiltered(&self) -> impl Iterator<Item = &Node> + '_ {
        self.iter().filter(move |n| !self.is_filtered(n.id()))
    }

    /// Live node count per kind
    pub fn kind_counts(&self) -> BTreeMap<NodeKind, usize> {
        let mut counts = BTreeMap::new();
        for node in self.iter() {
            *counts.entry(node.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn root(&self) -> NodeId {
        ROOT_PACKAGE_ID
    }

    pub fn file_system(&self) -> NodeId {
        FILE_SYSTEM_ID
    }

    pub fn component_root(&self) -> NodeId {
        ROOT_COMPONENT_ID
    }

    pub fn strings(&self) -> &StrTable {
        &self.strings
    }

    pub fn strings_mut(&mut self) -> &mut StrTable {
        &mut self.strings
    }

    // =========================================================================
    // LAYER ACCESS
    // =========================================================================

    fn layer_error(operation: &'static str, node: &Node) -> Error {
        Error::InvalidNodeKind {
            operation,
            kind: node.kind().as_str(),
        }
    }

    pub fn named_mut(&mut self, id: NodeId) -> Result<&mut NamedData> {
        let node = self.get_mut(id)?;
        if node.named().is_none() {
            return Err(Self::layer_error("Factory::named_mut", node));
        }
        node.named_mut().ok_or(Error::InvalidNode { id })
    }

    pub fn member(&self, id: NodeId) -> Result<&MemberData> {
        let node = self.get(id)?;
        node.member()
            .ok_or_else(|| Self::layer_error("Factory::member", node))
    }

    pub fn member_mut(&mut self, id: NodeId) -> Result<&mut MemberData> {
        let node = self.get_mut(id)?;
        if node.member().is_none() {
            return Err(Self::layer_error("Factory::member_mut", node));
        }
        node.member_mut().ok_or(Error::InvalidNode { id })
    }

    pub fn scope_mut(&mut self, id: NodeId) -> Result<&mut ScopeData> {
        let node = self.get_mut(id)?;
        if node.scope().is_none() {
            return Err(Self::layer_error("Factory::scope_mut", node));
        }
        node.scope_mut().ok_or(Error::InvalidNode { id })
    }

    pub fn class_mut(&mut self, id: NodeId) -> Result<&mut ClassData> {
        let node = self.get_mut(id)?;
        if node.class().is_none() {
            return Err(Self::layer_error("Factory::class_mut", node));
        }
        node.class_mut().ok_or(Error::InvalidNode { id })
    }

    pub fn method_mut(&mut self, id: NodeId) -> Result<&mut MethodData> {
        let node = self.get_mut(id)?;
        if node.method().is_none() {
            return Err(Self::layer_error("Factory::method_mut", node));
        }
        node.method_mut().ok_or(Error::InvalidNode { id })
    }

    /// Name of a named node (`""` for unnamed kinds)
    pub fn name(&self, id: NodeId) -> &str {
        self.node(id)
            .and_then(Node::name_key)
            .map(|key| self.strings.get(key))
            .unwrap_or("")
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        let key = self.strings.set(name);
        self.named_mut(id)?.name = key;
        Ok(())
    }

    // =========================================================================
    // FILTERING
    // =========================================================================

    pub fn set_filtered(&mut self, id: NodeId) -> Result<()> {
        self.set_filter_bit(id, true)
    }

    pub fn set_not_filtered(&mut self, id: NodeId) -> Result<()> {
        self.set_filter_bit(id, false)
    }

    pub(crate) fn set_filter_bit(&mut self, id: NodeId, value: bool) -> Result<()> {
        if !self.exists(id) {
            return Err(Error::InvalidNode { id });
        }
        self.filtered[id as usize] = value;
        Ok(())
    }

    pub fn is_filtered(&self, id: NodeId) -> bool {
        self.filtered.get(id as usize).copied().unwrap_or(false)
    }

    /// `ELIDED_ID` for filtered nodes, `id` otherwise
    pub fn effective_target(&self, id: NodeId) -> NodeId {
        if self.is_filtered(id) {
            ELIDED_ID
        } else {
            id
        }
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    /// Add a single or list edge
    pub fn add_edge(&mut self, from: NodeId, edge: EdgeKind, to: NodeId) -> Result<()> {
        self.insert_edge("Factory::add_edge", from, edge, to, None, false)
            .map(|_| ())
    }

    /// Add an association edge carrying `assoc`
    pub fn add_assoc_edge(
        &mut self,
        from: NodeId,
        edge: EdgeKind,
        to: NodeId,
        assoc: Assoc,
    ) -> Result<()> {
        self.insert_edge("Factory::add_assoc_edge", from, edge, to, Some(assoc), false)
            .map(|_| ())
    }

    /// Add a list edge unless `to` is already a target; single edges are
    /// overwritten. Returns whether the edge list changed.
    pub fn safe_edge(&mut self, from: NodeId, edge: EdgeKind, to: NodeId) -> Result<bool> {
        self.insert_edge("Factory::safe_edge", from, edge, to, None, true)
    }

    /// Add an association edge unless the identical pair is present
    pub fn safe_assoc_edge(
        &mut self,
        from: NodeId,
        edge: EdgeKind,
        to: NodeId,
        assoc: Assoc,
    ) -> Result<bool> {
        self.insert_edge("Factory::safe_assoc_edge", from, edge, to, Some(assoc), true)
    }

    fn insert_edge(
        &mut self,
        operation: &'static str,
        from: NodeId,
        edge: EdgeKind,
        to: NodeId,
        assoc: Option<Assoc>,
        unique: bool,
    ) -> Result<bool> {
        let target = self.node(to).ok_or_else(|| {
            Error::schema(operation, from, to, "The end point of the edge does not exist")
        })?;
        if !target.is_a(edge.target_kind()) {
            return Err(Error::schema(
                operation,
                from,
                to,
                format!(
                    "Invalid NodeKind ({} expects {}, got {})",
                    edge,
                    edge.target_kind(),
                    target.kind()
                ),
            ));
        }
        if edge.is_containment() {
            let owner = target.base().parent;
            if owner != NULL_ID && owner != from {
                return Err(Error::schema(
                    operation,
                    from,
                    to,
                    format!("The node already has a parent ({})", owner),
                ));
            }
        }

        let source = self.node_mut(from).ok_or(Error::InvalidNode { id: from })?;
        let source_kind = source.kind();
        let mut slot = edges::slot_mut(source, edge).ok_or_else(|| {
            Error::schema(
                operation,
                from,
                to,
                format!("{} has no {} edge", source_kind, edge),
            )
        })?;
        slot.accepts(assoc.as_ref())
            .map_err(|reason| Error::schema(operation, from, to, reason))?;

        let previous = match &slot {
            SlotMut::Single(id) => **id,
            _ => NULL_ID,
        };
        if previous == to {
            return Ok(false);
        }
        if unique {
            let duplicate = match &assoc {
                Some(a) => slot.contains_assoc(to, a),
                None => slot.contains(to),
            };
            if duplicate {
                return Ok(false);
            }
        }
        slot.insert(to, assoc);

        if edge.is_containment() {
            if let Some(child) = self.node_mut(to) {
                let base = child.base_mut();
                base.parent = from;
                base.parent_edge = Some(edge);
            }
        }
        if let Some(reverse) = self.reverse.as_mut() {
            if previous != NULL_ID {
                reverse.remove(from, edge, previous);
            }
            reverse.insert(from, edge, to);
        }
        Ok(true)
    }

    /// Remove the first `from -edge-> to` edge; returns whether one existed
    pub fn remove_edge(&mut self, from: NodeId, edge: EdgeKind, to: NodeId) -> Result<bool> {
        let source = self.get_mut(from)?;
        let source_kind = source.kind();
        let mut slot = edges::slot_mut(source, edge).ok_or_else(|| {
            Error::schema(
                "Factory::remove_edge",
                from,
                to,
                format!("{} has no {} edge", source_kind, edge),
            )
        })?;
        if !slot.remove(to) {
            return Ok(false);
        }

        if edge.is_containment() {
            if let Some(child) = self.node_mut(to) {
                let base = child.base_mut();
                if base.parent == from {
                    base.parent = NULL_ID;
                    base.parent_edge = None;
                }
            }
        }
        if let Some(reverse) = self.reverse.as_mut() {
            reverse.remove(from, edge, to);
        }
        Ok(true)
    }

    /// Detach `child` from its containment owner, if any
    pub fn remove_parent_edge(&mut self, child: NodeId) -> Result<()> {
        let base = self.get(child)?.base();
        if let (parent, Some(edge)) = (base.parent, base.parent_edge) {
            if parent != NULL_ID {
                self.remove_edge(parent, edge, child)?;
            }
        }
        Ok(())
    }

    fn slot_of(&self, operation: &'static str, id: NodeId, edge: EdgeKind) -> Result<edges::Slot<'_>> {
        let node = self.get(id)?;
        edges::slot(node, edge).ok_or_else(|| {
            Error::schema(
                operation,
                id,
                NULL_ID,
                format!("{} has no {} edge", node.kind(), edge),
            )
        })
    }

    /// Effective targets of `edge` on `id`, in insertion order
    pub fn targets(&self, id: NodeId, edge: EdgeKind) -> Result<Vec<NodeId>> {
        let slot = self.slot_of("Factory::targets", id, edge)?;
        Ok(slot
            .ids()
            .into_iter()
            .map(|t| self.effective_target(t))
            .collect())
    }

    /// Effective target of a single edge (`NULL_ID` when unset)
    pub fn target(&self, id: NodeId, edge: EdgeKind) -> Result<NodeId> {
        let slot = self.slot_of("Factory::target", id, edge)?;
        Ok(slot
            .ids()
            .first()
            .map(|t| self.effective_target(*t))
            .unwrap_or(NULL_ID))
    }

    /// Effective targets of an association edge with their tags
    pub fn assoc_targets(&self, id: NodeId, edge: EdgeKind) -> Result<Vec<(NodeId, Assoc)>> {
        let slot = self.slot_of("Factory::assoc_targets", id, edge)?;
        Ok(slot
            .assoc_pairs()
            .into_iter()
            .map(|(t, assoc)| (self.effective_target(t), assoc))
            .collect())
    }

    // =========================================================================
    // REVERSE EDGES
    // =========================================================================

    /// Build the reverse index and keep it current from now on
    pub fn enable_reverse_edges(&mut self) {
        self.reverse = Some(ReverseEdges::build(self, |_| true));
    }

    pub fn disable_reverse_edges(&mut self) {
        self.reverse = None;
    }

    pub fn reverse_edges(&self) -> Option<&ReverseEdges> {
        self.reverse.as_ref()
    }

    // =========================================================================
    // CACHED CREATORS
    // =========================================================================

    pub fn create_simple_type(&mut self, kind: SimpleTypeKind) -> Result<NodeId> {
        if let Some(&id) = self.caches.simple_types.get(&kind) {
            return Ok(id);
        }
        let id = self.create(NodeKind::SimpleType)?;
        if let Node::SimpleType(d) = self.get_mut(id)? {
            d.kind = kind;
        }
        self.caches.simple_types.insert(kind, id);
        Ok(id)
    }

    pub fn create_type_former_array(&mut self) -> Result<NodeId> {
        if let Some(id) = self.caches.array_former {
            return Ok(id);
        }
        let id = self.create(NodeKind::TypeFormerArray)?;
        self.caches.array_former = Some(id);
        Ok(id)
    }

    pub fn create_type_former_non_type(&mut self) -> Result<NodeId> {
        if let Some(id) = self.caches.non_type_former {
            return Ok(id);
        }
        let id = self.create(NodeKind::TypeFormerNonType)?;
        self.caches.non_type_former = Some(id);
        Ok(id)
    }

    pub fn create_type_former_pointer(&mut self, kind: PointerKind) -> Result<NodeId> {
        if let Some(&id) = self.caches.pointer_formers.get(&kind) {
            return Ok(id);
        }
        let id = self.create(NodeKind::TypeFormerPointer)?;
        if let Node::TypeFormerPointer(d) = self.get_mut(id)? {
            d.pointer_kind = kind;
        }
        self.caches.pointer_formers.insert(kind, id);
        Ok(id)
    }

    /// Former referring to `refers_to` (a class, generic parameter, simple type...)
    pub fn create_type_former_type(&mut self, refers_to: NodeId) -> Result<NodeId> {
        if let Some(&id) = self.caches.type_formers.get(&refers_to) {
            return Ok(id);
        }
        if !self.exists(refers_to) {
            return Err(Error::schema(
                "Factory::create_type_former_type",
                NULL_ID,
                refers_to,
                "The end point of the edge does not exist",
            ));
        }
        let id = self.create(NodeKind::TypeFormerType)?;
        self.add_edge(id, EdgeKind::TypeFormerType_RefersTo, refers_to)?;
        self.caches.type_formers.insert(refers_to, id);
        Ok(id)
    }

    pub fn create_attribute_access(&mut self, attribute: NodeId) -> Result<NodeId> {
        if let Some(&id) = self.caches.attribute_accesses.get(&attribute) {
            return Ok(id);
        }
        self.ensure_kind("Factory::create_attribute_access", attribute, NodeKind::Attribute)?;
        let id = self.create(NodeKind::AttributeAccess)?;
        self.add_edge(id, EdgeKind::AttributeAccess_Attribute, attribute)?;
        self.caches.attribute_accesses.insert(attribute, id);
        Ok(id)
    }

    pub fn create_method_call(&mut self, method: NodeId) -> Result<NodeId> {
        if let Some(&id) = self.caches.method_calls.get(&method) {
            return Ok(id);
        }
        self.ensure_kind("Factory::create_method_call", method, NodeKind::Method)?;
        let id = self.create(NodeKind::MethodCall)?;
        self.add_edge(id, EdgeKind::MethodCall_Method, method)?;
        self.caches.method_calls.insert(method, id);
        Ok(id)
    }

    pub fn create_comment(&mut self, text: &str) -> Result<NodeId> {
        let key = self.strings.set(text);
        if let Some(&id) = self.caches.comments.get(&key) {
            return Ok(id);
        }
        let id = self.create(NodeKind::Comment)?;
        if let Node::Comment(d) = self.get_mut(id)? {
            d.text = key;
        }
        self.caches.comments.insert(key, id);
        Ok(id)
    }

    pub fn create_component(&mut self, name: &str) -> Result<NodeId> {
        let key = self.strings.set(name);
        if let Some(&id) = self.caches.components.get(&key) {
            return Ok(id);
        }
        let id = self.create(NodeKind::Component)?;
        self.named_mut(id)?.name = key;
        self.caches.components.insert(key, id);
        Ok(id)
    }

    fn ensure_kind(&self, operation: &'static str, id: NodeId, kind: NodeKind) -> Result<()> {
        let node = self
            .node(id)
            .ok_or_else(|| Error::schema(operation, NULL_ID, id, "The end point of the edge does not exist"))?;
        if !node.is_a(kind) {
            return Err(Error::schema(
                operation,
                NULL_ID,
                id,
                format!("Invalid NodeKind (expected {}, got {})", kind, node.kind()),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // TYPE BUILDER
    // =========================================================================

    /// Start building a type expression
    ///
    /// Builds nest: a type started while another is open gets its own
    /// former stack and is finished first.
    pub fn begin_type(&mut self) {
        self.type_stack.push(SmallVec::new());
    }

    /// Push one former onto the innermost open type
    pub fn add_type_former(&mut self, former: NodeId) -> Result<()> {
        self.ensure_kind("Factory::add_type_former", former, NodeKind::TypeFormer)?;
        let Some(frame) = self.type_stack.last_mut() else {
            return Err(Error::schema(
                "Factory::add_type_former",
                NULL_ID,
                former,
                "No type is under construction",
            ));
        };
        frame.push(former);
        Ok(())
    }

    /// Drop the innermost open type without creating a node
    pub fn abandon_type(&mut self) {
        self.type_stack.pop();
    }

    /// Number of type builds currently open
    pub fn open_types(&self) -> usize {
        self.type_stack.len()
    }

    /// Finish the innermost open type: formers are attached last-pushed
    /// first, and an identical former sequence yields the existing `Type`
    pub fn end_type(&mut self) -> Result<NodeId> {
        let frame = self.type_stack.pop().unwrap_or_default();
        if frame.is_empty() {
            return Err(Error::schema(
                "Factory::end_type",
                NULL_ID,
                NULL_ID,
                "Type former stack is empty",
            ));
        }
        let formers: SmallVec<[NodeId; 8]> = frame.into_iter().rev().collect();
        let signature = type_signature(&formers);
        if let Some(&id) = self.caches.types.get(&signature) {
            return Ok(id);
        }

        let id = self.create(NodeKind::Type)?;
        for former in formers {
            self.add_edge(id, EdgeKind::Type_HasTypeFormer, former)?;
        }
        self.caches.types.insert(signature, id);
        Ok(id)
    }

    // =========================================================================
    // FILE SYSTEM
    // =========================================================================

    /// Find or create the `File` for `path`, creating its folder chain
    ///
    /// Both `/` and `\` separate segments. A leading separator becomes a
    /// folder named after it, so absolute paths keep their root.
    pub fn create_file(&mut self, path: &str) -> Result<NodeId> {
        let mut segments: SmallVec<[&str; 8]> = SmallVec::new();
        if let Some(first) = path.chars().next().filter(|c| *c == '/' || *c == '\\') {
            segments.push(&path[..first.len_utf8()]);
        }
        segments.extend(path.split(['/', '\\']).filter(|s| !s.is_empty()));

        let ends_with_separator = path.ends_with(['/', '\\']);
        let Some((&file_name, folders)) = segments.split_last() else {
            return Err(Error::schema(
                "Factory::create_file",
                FILE_SYSTEM_ID,
                NULL_ID,
                "Empty file path",
            ));
        };
        if ends_with_separator {
            return Err(Error::schema(
                "Factory::create_file",
                FILE_SYSTEM_ID,
                NULL_ID,
                format!("Path has no file name: {}", path),
            ));
        }

        let mut parent = FILE_SYSTEM_ID;
        let mut edge = EdgeKind::FileSystem_HasFSEntry;
        for &folder in folders {
            parent = self.fs_child(parent, edge, folder, NodeKind::Folder)?;
            edge = EdgeKind::Folder_Contains;
        }
        self.fs_child(parent, edge, file_name, NodeKind::File)
    }

    fn fs_child(
        &mut self,
        parent: NodeId,
        edge: EdgeKind,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId> {
        let key = self.strings.set(name);
        let children = edges::slot(self.get(parent)?, edge)
            .map(|slot| slot.ids())
            .unwrap_or_default();
        for child in children {
            if let Some(node) = self.node(child) {
                if node.kind() == kind && node.name_key() == Some(key) {
                    return Ok(child);
                }
            }
        }

        let id = self.create(kind)?;
        self.named_mut(id)?.name = key;
        self.add_edge(parent, edge, id)?;
        Ok(id)
    }

    // =========================================================================
    // LOADING SUPPORT
    // =========================================================================

    /// Place a decoded node at its own id
    pub(crate) fn insert_loaded(&mut self, node: Node) -> Result<()> {
        let id = node.id();
        if id < FIRST_NODE_ID {
            return Err(Error::format(format!("Reserved node id {} in stream", id)));
        }
        let index = id as usize;
        if index < self.nodes.len() && self.nodes[index].is_some() {
            return Err(Error::format(format!("Duplicate node id {} in stream", id)));
        }
        if index >= self.nodes.len() {
            self.nodes.resize(index + 1, None);
            self.filtered.resize(index + 1, false);
        }
        self.nodes[index] = Some(node);
        Ok(())
    }

    /// Re-derive containment back-pointers from the stored edge lists
    pub(crate) fn restore_parents(&mut self) {
        let mut links = Vec::new();
        for node in self.iter() {
            for (edge, child) in edges::outgoing(node) {
                if edge.is_containment() {
                    links.push((node.id(), edge, child));
                }
            }
        }
        for (parent, edge, child) in links {
            if let Some(node) = self.node_mut(child) {
                let base = node.base_mut();
                base.parent = parent;
                base.parent_edge = Some(edge);
            }
        }
    }

    /// Rebuild the keyed lookup tables after loading
    pub(crate) fn rebuild_caches(&mut self) {
        let mut caches = NodeCaches::default();
        for node in self.iter() {
            let id = node.id();
            match node {
                Node::SimpleType(d) => {
                    caches.simple_types.entry(d.kind).or_insert(id);
                }
                Node::TypeFormerPointer(d) => {
                    caches.pointer_formers.entry(d.pointer_kind).or_insert(id);
                }
                Node::TypeFormerArray(_) => {
                    caches.array_former.get_or_insert(id);
                }
                Node::TypeFormerNonType(_) => {
                    caches.non_type_former.get_or_insert(id);
                }
                Node::TypeFormerType(d) if d.refers_to != NULL_ID => {
                    caches.type_formers.entry(d.refers_to).or_insert(id);
                }
                Node::AttributeAccess(d) if d.attribute != NULL_ID => {
                    caches.attribute_accesses.entry(d.attribute).or_insert(id);
                }
                Node::MethodCall(d) if d.method != NULL_ID => {
                    caches.method_calls.entry(d.method).or_insert(id);
                }
                Node::Comment(d) => {
                    caches.comments.entry(d.text).or_insert(id);
                }
                Node::Component(d) => {
                    caches.components.entry(d.named.name).or_insert(id);
                }
                Node::Type(d) if !d.has_type_former.is_empty() => {
                    caches
                        .types
                        .entry(type_signature(&d.has_type_former))
                        .or_insert(id);
                }
                _ => {}
            }
        }
        self.caches = caches;
        self.type_stack.clear();
        if self.reverse.is_some() {
            self.enable_reverse_edges();
        }
    }
}
