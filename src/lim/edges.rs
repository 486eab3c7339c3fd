//! Edge Slots
//!
//! Resolves an [`EdgeKind`] to the field that stores it on a given node.
//! The match is exhaustive over the closed edge set, so a new edge kind
//! without storage fails to compile instead of silently falling through.
//!
//! @module lim/edges

use super::node::Node;
use super::types::*;

// =============================================================================
// ASSOCIATION VALUES
// =============================================================================

/// Tag carried by one target of an association edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    TypeArgument(TypeArgumentConstraintKind),
    Position(SourcePosition),
    Parameter(ParameterKind),
}

impl Assoc {
    pub fn kind(&self) -> AssocKind {
        match self {
            Assoc::TypeArgument(_) => AssocKind::TypeArgumentConstraint,
            Assoc::Position(_) => AssocKind::SourcePosition,
            Assoc::Parameter(_) => AssocKind::Parameter,
        }
    }
}

// =============================================================================
// SLOTS
// =============================================================================

/// Read view of an edge field
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    Single(&'a NodeId),
    List(&'a Vec<NodeId>),
    TypeArgs(&'a Vec<(NodeId, TypeArgumentConstraintKind)>),
    Positions(&'a Vec<(NodeId, SourcePosition)>),
    ParamTypes(&'a Vec<(NodeId, ParameterKind)>),
}

/// Write view of an edge field
#[derive(Debug)]
pub enum SlotMut<'a> {
    Single(&'a mut NodeId),
    List(&'a mut Vec<NodeId>),
    TypeArgs(&'a mut Vec<(NodeId, TypeArgumentConstraintKind)>),
    Positions(&'a mut Vec<(NodeId, SourcePosition)>),
    ParamTypes(&'a mut Vec<(NodeId, ParameterKind)>),
}

impl Slot<'_> {
    /// Raw target ids in stored order (an empty single slot yields nothing)
    pub fn ids(&self) -> Vec<NodeId> {
        match self {
            Slot::Single(id) => {
                if **id == NULL_ID {
                    Vec::new()
                } else {
                    vec![**id]
                }
            }
            Slot::List(ids) => ids.to_vec(),
            Slot::TypeArgs(pairs) => pairs.iter().map(|(id, _)| *id).collect(),
            Slot::Positions(pairs) => pairs.iter().map(|(id, _)| *id).collect(),
            Slot::ParamTypes(pairs) => pairs.iter().map(|(id, _)| *id).collect(),
        }
    }

    /// Targets together with their association tags
    pub fn assoc_pairs(&self) -> Vec<(NodeId, Assoc)> {
        match self {
            Slot::TypeArgs(pairs) => pairs
                .iter()
                .map(|(id, tack)| (*id, Assoc::TypeArgument(*tack)))
                .collect(),
            Slot::Positions(pairs) => pairs
                .iter()
                .map(|(id, pos)| (*id, Assoc::Position(*pos)))
                .collect(),
            Slot::ParamTypes(pairs) => pairs
                .iter()
                .map(|(id, kind)| (*id, Assoc::Parameter(*kind)))
                .collect(),
            Slot::Single(_) | Slot::List(_) => Vec::new(),
        }
    }

    pub fn contains(&self, target: NodeId) -> bool {
        self.ids().contains(&target)
    }
}

impl SlotMut<'_> {
    pub fn contains(&self, target: NodeId) -> bool {
        match self {
            SlotMut::Single(id) => **id == target,
            SlotMut::List(ids) => ids.contains(&target),
            SlotMut::TypeArgs(pairs) => pairs.iter().any(|(id, _)| *id == target),
            SlotMut::Positions(pairs) => pairs.iter().any(|(id, _)| *id == target),
            SlotMut::ParamTypes(pairs) => pairs.iter().any(|(id, _)| *id == target),
        }
    }

    /// Whether this exact `(target, tag)` pair is already stored
    pub fn contains_assoc(&self, target: NodeId, assoc: &Assoc) -> bool {
        match (self, assoc) {
            (SlotMut::TypeArgs(pairs), Assoc::TypeArgument(tack)) => {
                pairs.iter().any(|p| *p == (target, *tack))
            }
            (SlotMut::Positions(pairs), Assoc::Position(pos)) => {
                pairs.iter().any(|p| *p == (target, *pos))
            }
            (SlotMut::ParamTypes(pairs), Assoc::Parameter(kind)) => {
                pairs.iter().any(|p| *p == (target, *kind))
            }
            _ => false,
        }
    }

    /// Check that `assoc` fits this slot's shape
    pub fn accepts(&self, assoc: Option<&Assoc>) -> Result<(), &'static str> {
        match (self, assoc) {
            (SlotMut::Single(_), None) | (SlotMut::List(_), None) => Ok(()),
            (SlotMut::Single(_), Some(_)) | (SlotMut::List(_), Some(_)) => {
                Err("edge does not take an association value")
            }
            (SlotMut::TypeArgs(_), Some(Assoc::TypeArgument(_)))
            | (SlotMut::Positions(_), Some(Assoc::Position(_)))
            | (SlotMut::ParamTypes(_), Some(Assoc::Parameter(_))) => Ok(()),
            (_, None) => Err("edge requires an association value"),
            (_, Some(_)) => Err("association value has the wrong kind"),
        }
    }

    /// Store `target`, overwriting a single slot or appending to a list
    ///
    /// Callers must check [`SlotMut::accepts`] first; a mismatched tag is
    /// ignored.
    pub fn insert(&mut self, target: NodeId, assoc: Option<Assoc>) {
        match (self, assoc) {
            (SlotMut::Single(id), _) => **id = target,
            (SlotMut::List(ids), _) => ids.push(target),
            (SlotMut::TypeArgs(pairs), Some(Assoc::TypeArgument(tack))) => {
                pairs.push((target, tack))
            }
            (SlotMut::Positions(pairs), Some(Assoc::Position(pos))) => pairs.push((target, pos)),
            (SlotMut::ParamTypes(pairs), Some(Assoc::Parameter(kind))) => {
                pairs.push((target, kind))
            }
            _ => {}
        }
    }

    /// Remove the first occurrence of `target`
    pub fn remove(&mut self, target: NodeId) -> bool {
        fn remove_first<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
            match items.iter().position(pred) {
                Some(pos) => {
                    items.remove(pos);
                    true
                }
                None => false,
            }
        }

        match self {
            SlotMut::Single(id) => {
                if **id == target {
                    **id = NULL_ID;
                    true
                } else {
                    false
                }
            }
            SlotMut::List(ids) => remove_first(&mut **ids, |id| *id == target),
            SlotMut::TypeArgs(pairs) => remove_first(&mut **pairs, |(id, _)| *id == target),
            SlotMut::Positions(pairs) => remove_first(&mut **pairs, |(id, _)| *id == target),
            SlotMut::ParamTypes(pairs) => remove_first(&mut **pairs, |(id, _)| *id == target),
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Field storing `edge` on `node`, or `None` when the kind has no such edge
pub fn slot(node: &Node, edge: EdgeKind) -> Option<Slot<'_>> {
    use EdgeKind::*;
    match edge {
        Named_DependsOn => node.named().map(|n| Slot::List(&n.depends_on)),

        Member_Aggregated => node.member().map(|m| Slot::Single(&m.aggregated)),
        Member_BelongsTo => node.member().map(|m| Slot::List(&m.belongs_to)),
        Member_CompilationUnit => node.member().map(|m| Slot::List(&m.compilation_unit)),
        Member_Declares => node.member().map(|m| Slot::Single(&m.declares)),
        Member_HasComment => node.member().map(|m| Slot::List(&m.has_comment)),
        Member_Instance => node.member().map(|m| Slot::List(&m.instance)),
        Member_IsContainedIn => node.member().map(|m| Slot::Positions(&m.is_contained_in)),
        Member_LanguageVariant => node.member().map(|m| Slot::Single(&m.language_variant)),
        Member_Uses => node.member().map(|m| Slot::List(&m.uses)),
        Member_Variant => node.member().map(|m| Slot::List(&m.variant)),

        Scope_HasMember => node.scope().map(|s| Slot::List(&s.has_member)),

        Class_GrantsFriendship => node.class().map(|c| Slot::List(&c.grants_friendship)),
        Class_IsSubclass => node.class().map(|c| Slot::List(&c.is_subclass)),

        Method_AccessesAttribute => node.method().map(|m| Slot::List(&m.accesses_attribute)),
        Method_Calls => node.method().map(|m| Slot::List(&m.calls)),
        Method_CanThrow => node.method().map(|m| Slot::List(&m.can_throw)),
        Method_HasControlFlowBlock => {
            node.method().map(|m| Slot::List(&m.has_control_flow_block))
        }
        Method_HasParameter => node.method().map(|m| Slot::List(&m.has_parameter)),
        Method_Instantiates => node.method().map(|m| Slot::List(&m.instantiates)),
        Method_Returns => node.method().map(|m| Slot::List(&m.returns)),
        Method_Throws => node.method().map(|m| Slot::List(&m.throws)),

        ClassGeneric_HasGenericParameter => match node {
            Node::ClassGeneric(d) => Some(Slot::List(&d.has_generic_parameter)),
            Node::ClassGenericSpec(d) => Some(Slot::List(&d.generic.has_generic_parameter)),
            _ => None,
        },
        ClassGenericInstance_HasArguments => match node {
            Node::ClassGenericInstance(d) => Some(Slot::TypeArgs(&d.has_arguments)),
            _ => None,
        },
        ClassGenericSpec_HasArguments => match node {
            Node::ClassGenericSpec(d) => Some(Slot::TypeArgs(&d.has_arguments)),
            _ => None,
        },
        ClassGenericSpec_Specialize => match node {
            Node::ClassGenericSpec(d) => Some(Slot::Single(&d.specialize)),
            _ => None,
        },
        MethodGeneric_HasGenericParameter => match node {
            Node::MethodGeneric(d) => Some(Slot::List(&d.has_generic_parameter)),
            Node::MethodGenericSpec(d) => Some(Slot::List(&d.generic.has_generic_parameter)),
            _ => None,
        },
        MethodGenericInstance_HasArguments => match node {
            Node::MethodGenericInstance(d) => Some(Slot::TypeArgs(&d.has_arguments)),
            _ => None,
        },
        MethodGenericSpec_HasArguments => match node {
            Node::MethodGenericSpec(d) => Some(Slot::TypeArgs(&d.has_arguments)),
            _ => None,
        },
        MethodGenericSpec_Specialize => match node {
            Node::MethodGenericSpec(d) => Some(Slot::Single(&d.specialize)),
            _ => None,
        },

        Component_Contains => match node {
            Node::Component(d) => Some(Slot::List(&d.contains)),
            _ => None,
        },
        Component_HasFiles => match node {
            Node::Component(d) => Some(Slot::List(&d.has_files)),
            _ => None,
        },
        ControlFlowBlock_Calls => match node {
            Node::ControlFlowBlock(d) => Some(Slot::List(&d.calls)),
            _ => None,
        },
        ControlFlowBlock_Pred => match node {
            Node::ControlFlowBlock(d) => Some(Slot::List(&d.pred)),
            _ => None,
        },
        Attribute_Calls => match node {
            Node::Attribute(d) => Some(Slot::List(&d.calls)),
            _ => None,
        },
        Attribute_HasType => match node {
            Node::Attribute(d) => Some(Slot::List(&d.has_type)),
            _ => None,
        },
        AttributeAccess_Attribute => match node {
            Node::AttributeAccess(d) => Some(Slot::Single(&d.attribute)),
            _ => None,
        },
        Friendship_Friend => match node {
            Node::Friendship(d) => Some(Slot::Single(&d.friend)),
            _ => None,
        },
        GenericParameter_HasParameterConstraint => match node {
            Node::GenericParameter(d) => Some(Slot::List(&d.has_parameter_constraint)),
            _ => None,
        },
        MethodCall_Method => match node {
            Node::MethodCall(d) => Some(Slot::Single(&d.method)),
            _ => None,
        },
        Parameter_HasType => match node {
            Node::Parameter(d) => Some(Slot::Single(&d.has_type)),
            _ => None,
        },
        File_HasComment => match node {
            Node::File(d) => Some(Slot::List(&d.has_comment)),
            _ => None,
        },
        File_Includes => match node {
            Node::File(d) => Some(Slot::List(&d.includes)),
            _ => None,
        },
        FileSystem_HasFSEntry => match node {
            Node::FileSystem(d) => Some(Slot::List(&d.has_fs_entry)),
            _ => None,
        },
        Folder_Contains => match node {
            Node::Folder(d) => Some(Slot::List(&d.contains)),
            _ => None,
        },
        Type_HasTypeFormer => match node {
            Node::Type(d) => Some(Slot::List(&d.has_type_former)),
            _ => None,
        },
        TypeFormerMethod_HasParameterType => match node {
            Node::TypeFormerMethod(d) => Some(Slot::ParamTypes(&d.has_parameter_type)),
            _ => None,
        },
        TypeFormerMethod_HasReturnType => match node {
            Node::TypeFormerMethod(d) => Some(Slot::Single(&d.has_return_type)),
            _ => None,
        },
        TypeFormerType_RefersTo => match node {
            Node::TypeFormerType(d) => Some(Slot::Single(&d.refers_to)),
            _ => None,
        },
    }
}

/// Mutable field storing `edge` on `node`
pub fn slot_mut(node: &mut Node, edge: EdgeKind) -> Option<SlotMut<'_>> {
    use EdgeKind::*;
    match edge {
        Named_DependsOn => node.named_mut().map(|n| SlotMut::List(&mut n.depends_on)),

        Member_Aggregated => node.member_mut().map(|m| SlotMut::Single(&mut m.aggregated)),
        Member_BelongsTo => node.member_mut().map(|m| SlotMut::List(&mut m.belongs_to)),
        Member_CompilationUnit => node
            .member_mut()
            .map(|m| SlotMut::List(&mut m.compilation_unit)),
        Member_Declares => node.member_mut().map(|m| SlotMut::Single(&mut m.declares)),
        Member_HasComment => node.member_mut().map(|m| SlotMut::List(&mut m.has_comment)),
        Member_Instance => node.member_mut().map(|m| SlotMut::List(&mut m.instance)),
        Member_IsContainedIn => node
            .member_mut()
            .map(|m| SlotMut::Positions(&mut m.is_contained_in)),
        Member_LanguageVariant => node
            .member_mut()
            .map(|m| SlotMut::Single(&mut m.language_variant)),
        Member_Uses => node.member_mut().map(|m| SlotMut::List(&mut m.uses)),
        Member_Variant => node.member_mut().map(|m| SlotMut::List(&mut m.variant)),

        Scope_HasMember => node.scope_mut().map(|s| SlotMut::List(&mut s.has_member)),

        Class_GrantsFriendship => node
            .class_mut()
            .map(|c| SlotMut::List(&mut c.grants_friendship)),
        Class_IsSubclass => node.class_mut().map(|c| SlotMut::List(&mut c.is_subclass)),

        Method_AccessesAttribute => node
            .method_mut()
            .map(|m| SlotMut::List(&mut m.accesses_attribute)),
        Method_Calls => node.method_mut().map(|m| SlotMut::List(&mut m.calls)),
        Method_CanThrow => node.method_mut().map(|m| SlotMut::List(&mut m.can_throw)),
        Method_HasControlFlowBlock => node
            .method_mut()
            .map(|m| SlotMut::List(&mut m.has_control_flow_block)),
        Method_HasParameter => node.method_mut().map(|m| SlotMut::List(&mut m.has_parameter)),
        Method_Instantiates => node.method_mut().map(|m| SlotMut::List(&mut m.instantiates)),
        Method_Returns => node.method_mut().map(|m| SlotMut::List(&mut m.returns)),
        Method_Throws => node.method_mut().map(|m| SlotMut::List(&mut m.throws)),

        ClassGeneric_HasGenericParameter => match node {
            Node::ClassGeneric(d) => Some(SlotMut::List(&mut d.has_generic_parameter)),
            Node::ClassGenericSpec(d) => {
                Some(SlotMut::List(&mut d.generic.has_generic_parameter))
            }
            _ => None,
        },
        ClassGenericInstance_HasArguments => match node {
            Node::ClassGenericInstance(d) => Some(SlotMut::TypeArgs(&mut d.has_arguments)),
            _ => None,
        },
        ClassGenericSpec_HasArguments => match node {
            Node::ClassGenericSpec(d) => Some(SlotMut::TypeArgs(&mut d.has_arguments)),
            _ => None,
        },
        ClassGenericSpec_Specialize => match node {
            Node::ClassGenericSpec(d) => Some(SlotMut::Single(&mut d.specialize)),
            _ => None,
        },
        MethodGeneric_HasGenericParameter => match node {
            Node::MethodGeneric(d) => Some(SlotMut::List(&mut d.has_generic_parameter)),
            Node::MethodGenericSpec(d) => {
                Some(SlotMut::List(&mut d.generic.has_generic_parameter))
            }
            _ => None,
        },
        MethodGenericInstance_HasArguments => match node {
            Node::MethodGenericInstance(d) => Some(SlotMut::TypeArgs(&mut d.has_arguments)),
            _ => None,
        },
        MethodGenericSpec_HasArguments => match node {
            Node::MethodGenericSpec(d) => Some(SlotMut::TypeArgs(&mut d.has_arguments)),
            _ => None,
        },
        MethodGenericSpec_Specialize => match node {
            Node::MethodGenericSpec(d) => Some(SlotMut::Single(&mut d.specialize)),
            _ => None,
        },

        Component_Contains => match node {
            Node::Component(d) => Some(SlotMut::List(&mut d.contains)),
            _ => None,
        },
        Component_HasFiles => match node {
            Node::Component(d) => Some(SlotMut::List(&mut d.has_files)),
            _ => None,
        },
        ControlFlowBlock_Calls => match node {
            Node::ControlFlowBlock(d) => Some(SlotMut::List(&mut d.calls)),
            _ => None,
        },
        ControlFlowBlock_Pred => match node {
            Node::ControlFlowBlock(d) => Some(SlotMut::List(&mut d.pred)),
            _ => None,
        },
        Attribute_Calls => match node {
            Node::Attribute(d) => Some(SlotMut::List(&mut d.calls)),
            _ => None,
        },
        Attribute_HasType => match node {
            Node::Attribute(d) => Some(SlotMut::List(&mut d.has_type)),
            _ => None,
        },
        AttributeAccess_Attribute => match node {
            Node::AttributeAccess(d) => Some(SlotMut::Single(&mut d.attribute)),
            _ => None,
        },
        Friendship_Friend => match node {
            Node::Friendship(d) => Some(SlotMut::Single(&mut d.friend)),
            _ => None,
        },
        GenericParameter_HasParameterConstraint => match node {
            Node::GenericParameter(d) => Some(SlotMut::List(&mut d.has_parameter_constraint)),
            _ => None,
        },
        MethodCall_Method => match node {
            Node::MethodCall(d) => Some(SlotMut::Single(&mut d.method)),
            _ => None,
        },
        Parameter_HasType => match node {
            Node::Parameter(d) => Some(SlotMut::Single(&mut d.has_type)),
            _ => None,
        },
        File_HasComment => match node {
            Node::File(d) => Some(SlotMut::List(&mut d.has_comment)),
            _ => None,
        },
        File_Includes => match node {
            Node::File(d) => Some(SlotMut::List(&mut d.includes)),
            _ => None,
        },
        FileSystem_HasFSEntry => match node {
            Node::FileSystem(d) => Some(SlotMut::List(&mut d.has_fs_entry)),
            _ => None,
        },
        Folder_Contains => match node {
            Node::Folder(d) => Some(SlotMut::List(&mut d.contains)),
            _ => None,
        },
        Type_HasTypeFormer => match node {
            Node::Type(d) => Some(SlotMut::List(&mut d.has_type_former)),
            _ => None,
        },
        TypeFormerMethod_HasParameterType => match node {
            Node::TypeFormerMethod(d) => Some(SlotMut::ParamTypes(&mut d.has_parameter_type)),
            _ => None,
        },
        TypeFormerMethod_HasReturnType => match node {
            Node::TypeFormerMethod(d) => Some(SlotMut::Single(&mut d.has_return_type)),
            _ => None,
        },
        TypeFormerType_RefersTo => match node {
            Node::TypeFormerType(d) => Some(SlotMut::Single(&mut d.refers_to)),
            _ => None,
        },
    }
}

/// Every `(edge, target)` pair stored on `node`, in edge-kind order
pub fn outgoing(node: &Node) -> Vec<(EdgeKind, NodeId)> {
    let kind = node.kind();
    let mut out = Vec::new();
    for &edge in EdgeKind::ALL {
        if !kind.is_a(edge.source_kind()) {
            continue;
        }
        if let Some(slot) = slot(node, edge) {
            out.extend(slot.ids().into_iter().map(|id| (edge, id)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_exists_iff_source_kind_matches() {
        for kind in NodeKind::ALL.iter().filter(|k| !k.is_abstract()) {
            let mut node = Node::new(*kind, 100).unwrap();
            for edge in EdgeKind::ALL {
                let expected = kind.is_a(edge.source_kind());
                assert_eq!(slot(&node, *edge).is_some(), expected, "{} {}", kind, edge);
                assert_eq!(
                    slot_mut(&mut node, *edge).is_some(),
                    expected,
                    "{} {}",
                    kind,
                    edge
                );
            }
        }
    }

    #[test]
    fn test_slot_shape_matches_multiplicity() {
        for kind in NodeKind::ALL.iter().filter(|k| !k.is_abstract()) {
            let mut node = Node::new(*kind, 100).unwrap();
            for edge in EdgeKind::ALL {
                let Some(slot) = slot_mut(&mut node, *edge) else {
                    continue;
                };
                let shape_ok = match (edge.multiplicity(), &slot) {
                    (Multiplicity::Single, SlotMut::Single(_)) => true,
                    (Multiplicity::List, SlotMut::List(_)) => true,
                    (Multiplicity::Assoc(AssocKind::TypeArgumentConstraint), SlotMut::TypeArgs(_)) => true,
                    (Multiplicity::Assoc(AssocKind::SourcePosition), SlotMut::Positions(_)) => true,
                    (Multiplicity::Assoc(AssocKind::Parameter), SlotMut::ParamTypes(_)) => true,
                    _ => false,
                };
                assert!(shape_ok, "{} {}", kind, edge);
            }
        }
    }

    #[test]
    fn test_insert_remove_and_outgoing() {
        let mut node = Node::new(NodeKind::Method, 100).unwrap();
        let mut returns = slot_mut(&mut node, EdgeKind::Method_Returns).unwrap();
        returns.insert(200, None);
        returns.insert(201, None);
        assert!(returns.remove(200));
        assert!(!returns.remove(200));

        let mut args_holder = Node::new(NodeKind::ClassGenericInstance, 101).unwrap();
        let mut args = slot_mut(&mut args_holder, EdgeKind::ClassGenericInstance_HasArguments).unwrap();
        let tag = Assoc::TypeArgument(TypeArgumentConstraintKind::UpperBounded);
        assert!(args.accepts(None).is_err());
        assert!(args.accepts(Some(&tag)).is_ok());
        args.insert(300, Some(tag));
        assert!(args.contains_assoc(300, &tag));

        assert_eq!(outgoing(&node), vec![(EdgeKind::Method_Returns, 201)]);
        assert_eq!(
            slot(&args_holder, EdgeKind::ClassGenericInstance_HasArguments)
                .unwrap()
                .assoc_pairs(),
            vec![(300, tag)]
        );
    }
}
