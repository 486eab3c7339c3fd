//! Graph-Building Context
//!
//! All mutable state of a build in one place: the node store, the header
//! records, symbol and type maps, generic instance caches, the frame
//! stack mirroring the declaration nesting, filters and the LOC ledger.
//!
//! @module builder/context

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::core::error::Result;
use crate::filter::Filter;
use crate::frontend::SymbolRef;
use crate::lim::{
    AnalysisTimeKind, EdgeKind, Factory, Header, Key, LanguageKind, Node, NodeId,
    ROOT_COMPONENT_ID,
};

// =============================================================================
// FRAMES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FrameKind {
    Namespace,
    Class {
        is_interface: bool,
        /// Base types collected while filling; flushed into `IsSubclass`
        subclasses: Vec<NodeId>,
    },
    Method,
}

/// One open declaration scope
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame {
    pub symbol: SymbolRef,
    pub node: NodeId,
    pub kind: FrameKind,
}

// =============================================================================
// LOC LEDGER
// =============================================================================

/// Line counts of the files each component spans
#[derive(Debug, Clone, Default)]
pub struct LocLedger {
    files: BTreeMap<NodeId, BTreeMap<Key, u32>>,
}

impl LocLedger {
    /// Record `lines` for `file`; a file counts once per component
    pub fn record(&mut self, component: NodeId, file: Key, lines: u32) {
        self.files.entry(component).or_default().insert(file, lines);
    }

    pub fn total(&self, component: NodeId) -> u32 {
        self.files
            .get(&component)
            .map(|files| files.values().fold(0u32, |sum, lines| sum.saturating_add(*lines)))
            .unwrap_or(0)
    }

    pub fn file_count(&self, component: NodeId) -> usize {
        self.files.get(&component).map_or(0, BTreeMap::len)
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

pub struct BuildContext {
    pub(crate) factory: Factory,
    pub(crate) header: Header,
    pub(crate) hard_filter: Filter,
    pub(crate) soft_filter: Filter,
    pub(crate) language: LanguageKind,

    pub(crate) symbols: HashMap<SymbolRef, NodeId>,
    pub(crate) types: HashMap<SymbolRef, NodeId>,
    pub(crate) class_instances: HashMap<String, NodeId>,
    pub(crate) method_instances: HashMap<String, NodeId>,
    pub(crate) method_specializations: HashMap<String, NodeId>,

    pub(crate) frames: Vec<Frame>,
    pub(crate) component: NodeId,
    pub(crate) file_soft_filtered: bool,
    pub(crate) line_counts: HashMap<String, u32>,
    pub(crate) loc: LocLedger,
}

impl BuildContext {
    pub fn new(factory: Factory, language: LanguageKind, hard_filter: Filter, soft_filter: Filter) -> Self {
        Self {
            factory,
            header: Header::new(language),
            hard_filter,
            soft_filter,
            language,
            symbols: HashMap::new(),
            types: HashMap::new(),
            class_instances: HashMap::new(),
            method_instances: HashMap::new(),
            method_specializations: HashMap::new(),
            frames: Vec::new(),
            component: ROOT_COMPONENT_ID,
            file_soft_filtered: false,
            line_counts: HashMap::new(),
            loc: LocLedger::default(),
        }
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut Factory {
        &mut self.factory
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn loc(&self) -> &LocLedger {
        &self.loc
    }

    pub fn into_parts(self) -> (Factory, Header) {
        (self.factory, self.header)
    }

    /// Node mapped to `symbol`, if converted already
    pub fn node_of(&self, symbol: SymbolRef) -> Option<NodeId> {
        self.symbols.get(&symbol).copied()
    }

    /// Forget per-source identities; symbol refs are only unique within one
    /// front-end export. Instance caches are keyed by display text and
    /// survive.
    pub(crate) fn reset_source(&mut self) {
        self.symbols.clear();
        self.types.clear();
        self.frames.clear();
        self.line_counts.clear();
        self.file_soft_filtered = false;
    }

    // =========================================================================
    // FRAMES
    // =========================================================================

    pub(crate) fn push_frame(&mut self, symbol: SymbolRef, node: NodeId, kind: FrameKind) {
        trace!(%symbol, node, "push frame");
        self.frames.push(Frame { symbol, node, kind });
    }

    /// Close the innermost frame, wiring the base types a class collected
    pub(crate) fn pop_frame(&mut self) -> Result<()> {
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        if let FrameKind::Class { subclasses, .. } = frame.kind {
            for base in subclasses {
                self.factory
                    .safe_edge(frame.node, EdgeKind::Class_IsSubclass, base)?;
            }
        }
        Ok(())
    }

    /// Pop frames until the top one belongs to a node in `enclosing`
    pub(crate) fn unwind_to(&mut self, enclosing: &[NodeId]) -> Result<()> {
        while let Some(top) = self.frames.last() {
            if enclosing.contains(&top.node) {
                break;
            }
            self.pop_frame()?;
        }
        Ok(())
    }

    pub(crate) fn close_frames(&mut self) -> Result<()> {
        while !self.frames.is_empty() {
            self.pop_frame()?;
        }
        Ok(())
    }

    pub(crate) fn class_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames
            .iter_mut()
            .rev()
            .find(|f| matches!(f.kind, FrameKind::Class { .. }))
    }

    pub(crate) fn in_interface(&self) -> bool {
        self.frames
            .iter()
            .rev()
            .find_map(|f| match f.kind {
                FrameKind::Class { is_interface, .. } => Some(is_interface),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub(crate) fn method_frame(&self) -> Option<NodeId> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.kind == FrameKind::Method)
            .map(|f| f.node)
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Make `name` the current component, creating it under the root
    pub(crate) fn begin_component(&mut self, name: &str) -> Result<NodeId> {
        let component = self.factory.create_component(name)?;
        if component != ROOT_COMPONENT_ID {
            self.factory
                .safe_edge(ROOT_COMPONENT_ID, EdgeKind::Component_Contains, component)?;
        }
        self.component = component;
        Ok(component)
    }

    /// Settle the component totals from the ledger
    pub(crate) fn finish_component(&mut self) -> Result<()> {
        let component = self.component;
        let total = self.loc.total(component);
        if let Node::Component(data) = self.factory.get_mut(component)? {
            data.tloc = total;
            if data.analysis_time == AnalysisTimeKind::Never {
                data.analysis_time = AnalysisTimeKind::Now;
            }
        }
        Ok(())
    }
}
