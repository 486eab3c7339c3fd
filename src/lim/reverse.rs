//! Reverse Edge Index
//!
//! Answers "who points at me" for every stored edge. Built from a full
//! scan of the store and kept current by the factory once enabled.
//!
//! @module lim/reverse

use std::collections::HashMap;

use super::edges;
use super::factory::Factory;
use super::node::Node;
use super::types::{EdgeKind, NodeId};
use crate::core::error::{Error, Result};

/// Incoming edges per target node
#[derive(Debug, Clone, Default)]
pub struct ReverseEdges {
    incoming: HashMap<NodeId, HashMap<EdgeKind, Vec<NodeId>>>,
}

impl ReverseEdges {
    /// Index every node of `factory` accepted by `select`
    pub fn build(factory: &Factory, select: impl Fn(&Node) -> bool) -> Self {
        let mut index = Self::default();
        for node in factory.iter().filter(|n| select(n)) {
            for (edge, target) in edges::outgoing(node) {
                index.insert(node.id(), edge, target);
            }
        }
        index
    }

    pub(crate) fn insert(&mut self, source: NodeId, edge: EdgeKind, target: NodeId) {
        self.incoming
            .entry(target)
            .or_default()
            .entry(edge)
            .or_default()
            .push(source);
    }

    pub(crate) fn remove(&mut self, source: NodeId, edge: EdgeKind, target: NodeId) {
        if let Some(by_edge) = self.incoming.get_mut(&target) {
            if let Some(sources) = by_edge.get_mut(&edge) {
                if let Some(pos) = sources.iter().position(|s| *s == source) {
                    sources.remove(pos);
                }
                if sources.is_empty() {
                    by_edge.remove(&edge);
                }
            }
            if by_edge.is_empty() {
                self.incoming.remove(&target);
            }
        }
    }

    /// Sources pointing at `target` through `edge`
    ///
    /// Fails when `target` does not exist or can never be the end point
    /// of `edge`.
    pub fn sources(&self, factory: &Factory, target: NodeId, edge: EdgeKind) -> Result<&[NodeId]> {
        let node = factory.get(target)?;
        if !node.is_a(edge.target_kind()) {
            return Err(Error::schema(
                "ReverseEdges::sources",
                target,
                target,
                format!("{} cannot point at a {}", edge, node.kind()),
            ));
        }
        Ok(self
            .incoming
            .get(&target)
            .and_then(|by_edge| by_edge.get(&edge))
            .map(|v| v.as_slice())
            .unwrap_or(&[]))
    }

    /// Edge kinds with at least one source pointing at `target`
    pub fn existing_edges(&self, target: NodeId) -> Vec<EdgeKind> {
        let mut kinds: Vec<EdgeKind> = self
            .incoming
            .get(&target)
            .map(|by_edge| by_edge.keys().copied().collect())
            .unwrap_or_default();
        kinds.sort();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lim::types::{NodeKind, ROOT_PACKAGE_ID};

    #[test]
    fn test_reverse_edges_track_sources() {
        let mut f = Factory::new();
        let class = f.create(NodeKind::Class).unwrap();
        let method = f.create(NodeKind::Method).unwrap();
        let ty = f.create(NodeKind::Type).unwrap();
        f.add_edge(ROOT_PACKAGE_ID, EdgeKind::Scope_HasMember, class).unwrap();
        f.add_edge(class, EdgeKind::Scope_HasMember, method).unwrap();

        let index = ReverseEdges::build(&f, |_| true);
        assert_eq!(
            index.sources(&f, method, EdgeKind::Scope_HasMember).unwrap(),
            &[class]
        );
        assert_eq!(index.existing_edges(class), vec![EdgeKind::Scope_HasMember]);

        f.enable_reverse_edges();
        f.add_edge(method, EdgeKind::Method_Returns, ty).unwrap();
        let live = f.reverse_edges().unwrap();
        assert_eq!(live.sources(&f, ty, EdgeKind::Method_Returns).unwrap(), &[method]);

        f.remove_edge(method, EdgeKind::Method_Returns, ty).unwrap();
        let live = f.reverse_edges().unwrap();
        assert!(live.sources(&f, ty, EdgeKind::Method_Returns).unwrap().is_empty());
    }

    #[test]
    fn test_impossible_edge_is_error() {
        let mut f = Factory::new();
        let method = f.create(NodeKind::Method).unwrap();
        let index = ReverseEdges::build(&f, |_| true);
        assert!(index.sources(&f, method, EdgeKind::Method_Returns).is_err());
        assert!(index.sources(&f, 9999, EdgeKind::Method_Returns).is_err());
    }
}
