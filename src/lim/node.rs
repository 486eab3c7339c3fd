//! Node Data Model
//!
//! Every node kind is a tagged-union variant of [`Node`]. Shared fields
//! are layered as nested structs mirroring the kind hierarchy
//! (`ClassData { scope: ScopeData { member: MemberData { named, .. } } }`),
//! and the capability accessors on [`Node`] dispatch on the variant to
//! reach a given layer.
//!
//! Edge slots are plain `NodeId` fields (0 = absent) for single edges and
//! `Vec`s for lists. Association edges store `(NodeId, tag)` pairs.
//!
//! @module lim/node

use smallvec::SmallVec;

use super::types::*;

// =============================================================================
// LAYER STRUCTS
// =============================================================================

/// Fields shared by every node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseData {
    pub id: NodeId,
    /// Owner through a containment edge (0 = none)
    pub parent: NodeId,
    pub parent_edge: Option<EdgeKind>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedData {
    pub base: BaseData,
    pub name: Key,
    pub depends_on: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberData {
    pub named: NamedData,
    pub flags: MemberFlags,
    pub accessibility: AccessibilityKind,
    pub comment_lines: u32,
    pub demangled_name: Key,
    pub language: LanguageKind,
    pub mangled_name: Key,
    pub aggregated: NodeId,
    pub declares: NodeId,
    pub language_variant: NodeId,
    pub belongs_to: Vec<NodeId>,
    pub compilation_unit: Vec<NodeId>,
    pub has_comment: Vec<NodeId>,
    pub instance: Vec<NodeId>,
    pub is_contained_in: Vec<(NodeId, SourcePosition)>,
    pub uses: Vec<NodeId>,
    pub variant: Vec<NodeId>,
}

impl MemberData {
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::IS_STATIC)
    }

    pub fn set_static(&mut self, value: bool) {
        self.flags.set(MemberFlags::IS_STATIC, value);
    }

    pub fn is_compiler_generated(&self) -> bool {
        self.flags.contains(MemberFlags::IS_COMPILER_GENERATED)
    }

    pub fn set_compiler_generated(&mut self, value: bool) {
        self.flags.set(MemberFlags::IS_COMPILER_GENERATED, value);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopeData {
    pub member: MemberData,
    pub is_anonymous: bool,
    pub lloc: u32,
    pub loc: u32,
    pub tlloc: u32,
    pub tloc: u32,
    pub has_member: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageData {
    pub scope: ScopeData,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassData {
    pub scope: ScopeData,
    pub is_abstract: bool,
    pub class_kind: ClassKind,
    pub object_size: u32,
    pub grants_friendship: Vec<NodeId>,
    pub is_subclass: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassGenericData {
    pub class: ClassData,
    pub has_generic_parameter: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassGenericInstanceData {
    pub class: ClassData,
    pub is_real_instance: bool,
    pub has_arguments: Vec<(NodeId, TypeArgumentConstraintKind)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassGenericSpecData {
    pub generic: ClassGenericData,
    pub has_arguments: Vec<(NodeId, TypeArgumentConstraintKind)>,
    pub specialize: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodData {
    pub scope: ScopeData,
    pub distinct_operands: u32,
    pub distinct_operators: u32,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub method_kind: MethodKind,
    pub nesting_level: u16,
    pub nesting_level_else_if: u16,
    pub number_of_branches: u32,
    pub number_of_statements: u32,
    pub total_operands: u32,
    pub total_operators: u32,
    pub accesses_attribute: Vec<NodeId>,
    pub calls: Vec<NodeId>,
    pub can_throw: Vec<NodeId>,
    pub has_control_flow_block: Vec<NodeId>,
    pub has_parameter: Vec<NodeId>,
    pub instantiates: Vec<NodeId>,
    pub returns: Vec<NodeId>,
    pub throws: Vec<NodeId>,
}


#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodGenericData {
    pub method: MethodData,
    pub has_generic_parameter: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodGenericInstanceData {
    pub method: MethodData,
    pub is_real_instance: bool,
    pub has_arguments: Vec<(NodeId, TypeArgumentConstraintKind)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodGenericSpecData {
    pub generic: MethodGenericData,
    pub has_arguments: Vec<(NodeId, TypeArgumentConstraintKind)>,
    pub specialize: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeData {
    pub member: MemberData,
    pub calls: Vec<NodeId>,
    pub has_type: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterData {
    pub named: NamedData,
    pub param_kind: ParameterKind,
    pub has_type: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericParameterData {
    pub named: NamedData,
    pub kind: GenericParameterKind,
    pub has_parameter_constraint: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentData {
    pub named: NamedData,
    pub tlloc: u32,
    pub tloc: u32,
    pub analysis_time: AnalysisTimeKind,
    pub changeset_id: u32,
    pub short_name: Key,
    pub contains: Vec<NodeId>,
    pub has_files: Vec<NodeId>,
}


#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentData {
    pub base: BaseData,
    pub text: Key,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlFlowBlockData {
    pub base: BaseData,
    pub calls: Vec<NodeId>,
    pub pred: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeAccessData {
    pub base: BaseData,
    pub attribute: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodCallData {
    pub base: BaseData,
    pub method: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FriendshipData {
    pub base: BaseData,
    pub grantee: Key,
    pub friend: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileData {
    pub named: NamedData,
    pub cloc: u32,
    pub lloc: u32,
    pub loc: u32,
    pub number_of_branches: u32,
    pub has_comment: Vec<NodeId>,
    pub includes: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FolderData {
    pub named: NamedData,
    pub contains: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileSystemData {
    pub named: NamedData,
    pub has_fs_entry: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleTypeData {
    pub base: BaseData,
    pub kind: SimpleTypeKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeData {
    pub base: BaseData,
    pub has_type_former: Vec<NodeId>,
}

/// Former with no fields of its own (array and non-type formers)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeFormerData {
    pub base: BaseData,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeFormerPointerData {
    pub base: BaseData,
    pub pointer_kind: PointerKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeFormerTypeData {
    pub base: BaseData,
    pub refers_to: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeFormerMethodData {
    pub base: BaseData,
    pub has_parameter_type: Vec<(NodeId, ParameterKind)>,
    pub has_return_type: NodeId,
}

// =============================================================================
// NODE UNION
// =============================================================================

/// A concrete graph node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Comment(CommentData),
    Component(ComponentData),
    ControlFlowBlock(ControlFlowBlockData),
    Attribute(AttributeData),
    AttributeAccess(AttributeAccessData),
    Class(ClassData),
    ClassGeneric(ClassGenericData),
    ClassGenericInstance(ClassGenericInstanceData),
    ClassGenericSpec(ClassGenericSpecData),
    Friendship(FriendshipData),
    GenericParameter(GenericParameterData),
    Method(MethodData),
    MethodCall(MethodCallData),
    MethodGeneric(MethodGenericData),
    MethodGenericInstance(MethodGenericInstanceData),
    MethodGenericSpec(MethodGenericSpecData),
    Package(PackageData),
    Parameter(ParameterData),
    File(FileData),
    FileSystem(FileSystemData),
    Folder(FolderData),
    SimpleType(SimpleTypeData),
    Type(TypeData),
    TypeFormerArray(TypeFormerData),
    TypeFormerMethod(TypeFormerMethodData),
    TypeFormerNonType(TypeFormerData),
    TypeFormerPointer(TypeFormerPointerData),
    TypeFormerType(TypeFormerTypeData),
}

impl Node {
    /// Default-initialized node of a concrete kind
    pub fn new(kind: NodeKind, id: NodeId) -> Option<Node> {
        let mut node = match kind {
            NodeKind::Comment => Node::Comment(Default::default()),
            NodeKind::Component => Node::Component(Default::default()),
            NodeKind::ControlFlowBlock => Node::ControlFlowBlock(Default::default()),
            NodeKind::Attribute => Node::Attribute(Default::default()),
            NodeKind::AttributeAccess => Node::AttributeAccess(Default::default()),
            NodeKind::Class => Node::Class(Default::default()),
            NodeKind::ClassGeneric => Node::ClassGeneric(Default::default()),
            NodeKind::ClassGenericInstance => Node::ClassGenericInstance(Default::default()),
            NodeKind::ClassGenericSpec => Node::ClassGenericSpec(Default::default()),
            NodeKind::Friendship => Node::Friendship(Default::default()),
            NodeKind::GenericParameter => Node::GenericParameter(Default::default()),
            NodeKind::Method => Node::Method(Default::default()),
            NodeKind::MethodCall => Node::MethodCall(Default::default()),
            NodeKind::MethodGeneric => Node::MethodGeneric(Default::default()),
            NodeKind::MethodGenericInstance => Node::MethodGenericInstance(Default::default()),
            NodeKind::MethodGenericSpec => Node::MethodGenericSpec(Default::default()),
            NodeKind::Package => Node::Package(Default::default()),
            NodeKind::Parameter => Node::Parameter(Default::default()),
            NodeKind::File => Node::File(Default::default()),
            NodeKind::FileSystem => Node::FileSystem(Default::default()),
            NodeKind::Folder => Node::Folder(Default::default()),
            NodeKind::SimpleType => Node::SimpleType(Default::default()),
            NodeKind::Type => Node::Type(Default::default()),
            NodeKind::TypeFormerArray => Node::TypeFormerArray(Default::default()),
            NodeKind::TypeFormerMethod => Node::TypeFormerMethod(Default::default()),
            NodeKind::TypeFormerNonType => Node::TypeFormerNonType(Default::default()),
            NodeKind::TypeFormerPointer => Node::TypeFormerPointer(Default::default()),
            NodeKind::TypeFormerType => Node::TypeFormerType(Default::default()),
            NodeKind::Base
            | NodeKind::Named
            | NodeKind::Member
            | NodeKind::Scope
            | NodeKind::FSEntry
            | NodeKind::TypeFormer => return None,
        };
        node.base_mut().id = id;
        Some(node)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Comment(_) => NodeKind::Comment,
            Node::Component(_) => NodeKind::Component,
            Node::ControlFlowBlock(_) => NodeKind::ControlFlowBlock,
            Node::Attribute(_) => NodeKind::Attribute,
            Node::AttributeAccess(_) => NodeKind::AttributeAccess,
            Node::Class(_) => NodeKind::Class,
            Node::ClassGeneric(_) => NodeKind::ClassGeneric,
            Node::ClassGenericInstance(_) => NodeKind::ClassGenericInstance,
            Node::ClassGenericSpec(_) => NodeKind::ClassGenericSpec,
            Node::Friendship(_) => NodeKind::Friendship,
            Node::GenericParameter(_) => NodeKind::GenericParameter,
            Node::Method(_) => NodeKind::Method,
            Node::MethodCall(_) => NodeKind::MethodCall,
            Node::MethodGeneric(_) => NodeKind::MethodGeneric,
            Node::MethodGenericInstance(_) => NodeKind::MethodGenericInstance,
            Node::MethodGenericSpec(_) => NodeKind::MethodGenericSpec,
            Node::Package(_) => NodeKind::Package,
            Node::Parameter(_) => NodeKind::Parameter,
            Node::File(_) => NodeKind::File,
            Node::FileSystem(_) => NodeKind::FileSystem,
            Node::Folder(_) => NodeKind::Folder,
            Node::SimpleType(_) => NodeKind::SimpleType,
            Node::Type(_) => NodeKind::Type,
            Node::TypeFormerArray(_) => NodeKind::TypeFormerArray,
            Node::TypeFormerMethod(_) => NodeKind::TypeFormerMethod,
            Node::TypeFormerNonType(_) => NodeKind::TypeFormerNonType,
            Node::TypeFormerPointer(_) => NodeKind::TypeFormerPointer,
            Node::TypeFormerType(_) => NodeKind::TypeFormerType,
        }
    }

    pub fn id(&self) -> NodeId {
        self.base().id
    }

    pub fn is_a(&self, kind: NodeKind) -> bool {
        self.kind().is_a(kind)
    }

    // =========================================================================
    // CAPABILITY ACCESSORS
    // =========================================================================

    pub fn base(&self) -> &BaseData {
        match self {
            Node::Comment(d) => &d.base,
            Node::ControlFlowBlock(d) => &d.base,
            Node::AttributeAccess(d) => &d.base,
            Node::Friendship(d) => &d.base,
            Node::MethodCall(d) => &d.base,
            Node::SimpleType(d) => &d.base,
            Node::Type(d) => &d.base,
            Node::TypeFormerArray(d) | Node::TypeFormerNonType(d) => &d.base,
            Node::TypeFormerMethod(d) => &d.base,
            Node::TypeFormerPointer(d) => &d.base,
            Node::TypeFormerType(d) => &d.base,
            Node::Component(d) => &d.named.base,
            Node::GenericParameter(d) => &d.named.base,
            Node::Parameter(d) => &d.named.base,
            Node::File(d) => &d.named.base,
            Node::FileSystem(d) => &d.named.base,
            Node::Folder(d) => &d.named.base,
            Node::Attribute(d) => &d.member.named.base,
            Node::Package(d) => &d.scope.member.named.base,
            Node::Class(d) => &d.scope.member.named.base,
            Node::ClassGeneric(d) => &d.class.scope.member.named.base,
            Node::ClassGenericInstance(d) => &d.class.scope.member.named.base,
            Node::ClassGenericSpec(d) => &d.generic.class.scope.member.named.base,
            Node::Method(d) => &d.scope.member.named.base,
            Node::MethodGeneric(d) => &d.method.scope.member.named.base,
            Node::MethodGenericInstance(d) => &d.method.scope.member.named.base,
            Node::MethodGenericSpec(d) => &d.generic.method.scope.member.named.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseData {
        match self {
            Node::Comment(d) => &mut d.base,
            Node::ControlFlowBlock(d) => &mut d.base,
            Node::AttributeAccess(d) => &mut d.base,
            Node::Friendship(d) => &mut d.base,
            Node::MethodCall(d) => &mut d.base,
            Node::SimpleType(d) => &mut d.base,
            Node::Type(d) => &mut d.base,
            Node::TypeFormerArray(d) | Node::TypeFormerNonType(d) => &mut d.base,
            Node::TypeFormerMethod(d) => &mut d.base,
            Node::TypeFormerPointer(d) => &mut d.base,
            Node::TypeFormerType(d) => &mut d.base,
            Node::Component(d) => &mut d.named.base,
            Node::GenericParameter(d) => &mut d.named.base,
            Node::Parameter(d) => &mut d.named.base,
            Node::File(d) => &mut d.named.base,
            Node::FileSystem(d) => &mut d.named.base,
            Node::Folder(d) => &mut d.named.base,
            Node::Attribute(d) => &mut d.member.named.base,
            Node::Package(d) => &mut d.scope.member.named.base,
            Node::Class(d) => &mut d.scope.member.named.base,
            Node::ClassGeneric(d) => &mut d.class.scope.member.named.base,
            Node::ClassGenericInstance(d) => &mut d.class.scope.member.named.base,
            Node::ClassGenericSpec(d) => &mut d.generic.class.scope.member.named.base,
            Node::Method(d) => &mut d.scope.member.named.base,
            Node::MethodGeneric(d) => &mut d.method.scope.member.named.base,
            Node::MethodGenericInstance(d) => &mut d.method.scope.member.named.base,
            Node::MethodGenericSpec(d) => &mut d.generic.method.scope.member.named.base,
        }
    }

    pub fn named(&self) -> Option<&NamedData> {
        match self {
            Node::Component(d) => Some(&d.named),
            Node::GenericParameter(d) => Some(&d.named),
            Node::Parameter(d) => Some(&d.named),
            Node::File(d) => Some(&d.named),
            Node::FileSystem(d) => Some(&d.named),
            Node::Folder(d) => Some(&d.named),
            _ => self.member().map(|m| &m.named),
        }
    }

    pub fn named_mut(&mut self) -> Option<&mut NamedData> {
        match self {
            Node::Component(d) => Some(&mut d.named),
            Node::GenericParameter(d) => Some(&mut d.named),
            Node::Parameter(d) => Some(&mut d.named),
            Node::File(d) => Some(&mut d.named),
            Node::FileSystem(d) => Some(&mut d.named),
            Node::Folder(d) => Some(&mut d.named),
            other => other.member_mut().map(|m| &mut m.named),
        }
    }

    pub fn member(&self) -> Option<&MemberData> {
        match self {
            Node::Attribute(d) => Some(&d.member),
            _ => self.scope().map(|s| &s.member),
        }
    }

    pub fn member_mut(&mut self) -> Option<&mut MemberData> {
        match self {
            Node::Attribute(d) => Some(&mut d.member),
            other => other.scope_mut().map(|s| &mut s.member),
        }
    }

    pub fn scope(&self) -> Option<&ScopeData> {
        match self {
            Node::Package(d) => Some(&d.scope),
            _ => self
                .class()
                .map(|c| &c.scope)
                .or_else(|| self.method().map(|m| &m.scope)),
        }
    }

    pub fn scope_mut(&mut self) -> Option<&mut ScopeData> {
        match self {
            Node::Package(d) => Some(&mut d.scope),
            Node::Class(d) => Some(&mut d.scope),
            Node::ClassGeneric(d) => Some(&mut d.class.scope),
            Node::ClassGenericInstance(d) => Some(&mut d.class.scope),
            Node::ClassGenericSpec(d) => Some(&mut d.generic.class.scope),
            Node::Method(d) => Some(&mut d.scope),
            Node::MethodGeneric(d) => Some(&mut d.method.scope),
            Node::MethodGenericInstance(d) => Some(&mut d.method.scope),
            Node::MethodGenericSpec(d) => Some(&mut d.generic.method.scope),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<&ClassData> {
        match self {
            Node::Class(d) => Some(d),
            Node::ClassGeneric(d) => Some(&d.class),
            Node::ClassGenericInstance(d) => Some(&d.class),
            Node::ClassGenericSpec(d) => Some(&d.generic.class),
            _ => None,
        }
    }

    pub fn class_mut(&mut self) -> Option<&mut ClassData> {
        match self {
            Node::Class(d) => Some(d),
            Node::ClassGeneric(d) => Some(&mut d.class),
            Node::ClassGenericInstance(d) => Some(&mut d.class),
            Node::ClassGenericSpec(d) => Some(&mut d.generic.class),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&MethodData> {
        match self {
            Node::Method(d) => Some(d),
            Node::MethodGeneric(d) => Some(&d.method),
            Node::MethodGenericInstance(d) => Some(&d.method),
            Node::MethodGenericSpec(d) => Some(&d.generic.method),
            _ => None,
        }
    }

    pub fn method_mut(&mut self) -> Option<&mut MethodData> {
        match self {
            Node::Method(d) => Some(d),
            Node::MethodGeneric(d) => Some(&mut d.method),
            Node::MethodGenericInstance(d) => Some(&mut d.method),
            Node::MethodGenericSpec(d) => Some(&mut d.generic.method),
            _ => None,
        }
    }

    /// `HasArguments` list of any generic instance or specialization
    pub fn arguments(&self) -> Option<&[(NodeId, TypeArgumentConstraintKind)]> {
        match self {
            Node::ClassGenericInstance(d) => Some(&d.has_arguments),
            Node::ClassGenericSpec(d) => Some(&d.has_arguments),
            Node::MethodGenericInstance(d) => Some(&d.has_arguments),
            Node::MethodGenericSpec(d) => Some(&d.has_arguments),
            _ => None,
        }
    }

    /// Name key of a named node
    pub fn name_key(&self) -> Option<Key> {
        self.named().map(|n| n.name)
    }

    /// Every string table key this node references
    pub fn string_keys(&self) -> SmallVec<[Key; 4]> {
        let mut keys = SmallVec::new();
        if let Some(named) = self.named() {
            keys.push(named.name);
        }
        if let Some(member) = self.member() {
            keys.push(member.demangled_name);
            keys.push(member.mangled_name);
        }
        match self {
            Node::Component(d) => keys.push(d.short_name),
            Node::Comment(d) => keys.push(d.text),
            Node::Friendship(d) => keys.push(d.grantee),
            _ => {}
        }
        keys.retain(|k| *k != 0);
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abstract_kinds_have_no_node() {
        for kind in NodeKind::ALL {
            assert_eq!(Node::new(*kind, 200).is_none(), kind.is_abstract(), "{}", kind);
        }
    }

    #[test]
    fn test_new_node_kind_and_id() {
        for kind in NodeKind::ALL.iter().filter(|k| !k.is_abstract()) {
            let node = Node::new(*kind, 321).unwrap();
            assert_eq!(node.kind(), *kind);
            assert_eq!(node.id(), 321);
        }
    }

    #[test]
    fn test_layer_accessors_follow_hierarchy() {
        for kind in NodeKind::ALL.iter().filter(|k| !k.is_abstract()) {
            let node = Node::new(*kind, 100).unwrap();
            assert_eq!(node.named().is_some(), kind.is_a(NodeKind::Named), "{}", kind);
            assert_eq!(node.member().is_some(), kind.is_a(NodeKind::Member), "{}", kind);
            assert_eq!(node.scope().is_some(), kind.is_a(NodeKind::Scope), "{}", kind);
            assert_eq!(node.class().is_some(), kind.is_a(NodeKind::Class), "{}", kind);
            assert_eq!(node.method().is_some(), kind.is_a(NodeKind::Method), "{}", kind);
        }
    }

    #[test]
    fn test_member_flags() {
        let mut node = Node::new(NodeKind::Attribute, 100).unwrap();
        let member = node.member_mut().unwrap();
        member.set_static(true);
        member.set_compiler_generated(true);
        member.set_static(false);
        assert!(!member.is_static());
        assert!(member.is_compiler_generated());
    }

    #[test]
    fn test_string_keys() {
        let mut node = Node::new(NodeKind::Component, 100).unwrap();
        if let Node::Component(d) = &mut node {
            d.named.name = 7;
            d.short_name = 9;
        }
        assert_eq!(node.string_keys().as_slice(), &[7, 9]);
    }
}
