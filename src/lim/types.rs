//! LIM Schema Types
//!
//! Node kinds, edge kinds and the scalar enumerations of the
//! language-independent model. Every enum uses its declaration order as
//! the on-disk discriminant.
//!
//! @module lim/types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// =============================================================================
// IDS
// =============================================================================

/// Dense node identifier
pub type NodeId = u32;

/// String table key
pub type Key = u32;

/// "No node" marker for single-valued edges and list terminators
pub const NULL_ID: NodeId = 0;

/// Returned in place of a filtered edge target
pub const ELIDED_ID: NodeId = 1;

/// First id handed out by a fresh store
pub const FIRST_NODE_ID: NodeId = 100;

/// Root `Package` ("global namespace")
pub const ROOT_PACKAGE_ID: NodeId = 100;

/// Root `FileSystem`
pub const FILE_SYSTEM_ID: NodeId = 101;

/// Root `Component` ("<System>")
pub const ROOT_COMPONENT_ID: NodeId = 102;

// =============================================================================
// SCALAR ENUMS
// =============================================================================

macro_rules! lim_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident default $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant in discriminant order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Decode a stored discriminant
            pub fn from_u8(value: u8) -> Option<Self> {
                Self::ALL.get(value as usize).copied()
            }

            /// Stable textual name
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

lim_enum! {
    /// Member visibility
    pub enum AccessibilityKind default Internal {
        Internal => "ackInternal",
        InternalProtected => "ackInternalProtected",
        None => "ackNone",
        PackagePrivate => "ackPackagePrivate",
        Private => "ackPrivate",
        Protected => "ackProtected",
        ProtectedInternal => "ackProtectedInternal",
        Public => "ackPublic",
    }
}

lim_enum! {
    /// When a component was last analyzed
    pub enum AnalysisTimeKind default Never {
        Now => "atkNow",
        Before => "atkBefore",
        Never => "atkNever",
    }
}

lim_enum! {
    /// Structural flavor of a class
    pub enum ClassKind default Class {
        Annotation => "clkAnnotation",
        Class => "clkClass",
        Delegate => "clkDelegate",
        Enum => "clkEnum",
        Interface => "clkInterface",
        Struct => "clkStruct",
        Union => "clkUnion",
    }
}

lim_enum! {
    /// Flavor of a generic parameter
    pub enum GenericParameterKind default Type {
        Constraint => "gpkConstraint",
        NonType => "gpkNonType",
        NonTypePack => "gpkNonTypePack",
        Template => "gpkTemplate",
        TemplatePack => "gpkTemplatePack",
        Type => "gpkType",
        TypePack => "gpkTypePack",
    }
}

lim_enum! {
    /// Source language of a member
    pub enum LanguageKind default NotSet {
        NotSet => "lnkNotSet",
        C => "lnkC",
        Cpp => "lnkCpp",
        Java => "lnkJava",
        Csharp => "lnkCsharp",
        Sql => "lnkSql",
        Magic => "lnkMagic",
        Rpg => "lnkRpg",
        Python => "lnkPython",
        Javascript => "lnkJavascript",
    }
}

lim_enum! {
    /// Role of a method
    pub enum MethodKind default Normal {
        Add => "mekAdd",
        Constructor => "mekConstructor",
        Destructor => "mekDestructor",
        Get => "mekGet",
        Menu => "mekMenu",
        Normal => "mekNormal",
        Operator => "mekOperator",
        Remove => "mekRemove",
        Set => "mekSet",
        Subroutine => "mekSubroutine",
    }
}

lim_enum! {
    /// Direction of a parameter
    pub enum ParameterKind default In {
        In => "pmkIn",
        InOut => "pmkInOut",
        Out => "pmkOut",
    }
}

lim_enum! {
    /// Pointer former flavor
    pub enum PointerKind default Pointer {
        Pointer => "ptkPointer",
        Reference => "ptkReference",
    }
}

lim_enum! {
    /// Whether a position declares or defines the member
    pub enum RealizationLevel default Declares {
        Declares => "relDeclares",
        Defines => "relDefines",
    }
}

lim_enum! {
    /// Built-in primitive types
    pub enum SimpleTypeKind default Unknown {
        Boolean => "stkBoolean",
        Byte => "stkByte",
        Character => "stkCharacter",
        Decimal => "stkDecimal",
        Double => "stkDouble",
        Float => "stkFloat",
        Integer => "stkInteger",
        Long => "stkLong",
        Object => "stkObject",
        Short => "stkShort",
        Single => "stkSingle",
        String => "stkString",
        Unicode => "stkUnicode",
        Unknown => "stkUnknown",
        UnsignedCharacter => "stkUnsignedCharacter",
        UnsignedInteger => "stkUnsignedInteger",
        UnsignedLong => "stkUnsignedLong",
        UnsignedShort => "stkUnsignedShort",
        Void => "stkVoid",
    }
}

lim_enum! {
    /// Bound attached to a generic argument
    pub enum TypeArgumentConstraintKind default None {
        LowerBounded => "tackLowerBounded",
        None => "tackNone",
        Unbounded => "tackUnbounded",
        UpperBounded => "tackUpperBounded",
    }
}

impl LanguageKind {
    /// Parse a configuration-style language name (`csharp`, `java`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str()[3..].eq_ignore_ascii_case(&lower))
    }
}

bitflags! {
    /// Packed boolean attributes of a member
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[repr(transparent)]
    pub struct MemberFlags: u8 {
        /// Member is static
        const IS_STATIC = 0b0000_0001;
        /// Member was synthesized rather than written in source
        const IS_COMPILER_GENERATED = 0b0000_0010;
    }
}

impl Default for MemberFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Declaration span of a member inside a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub realization_level: RealizationLevel,
}

// =============================================================================
// NODE KINDS
// =============================================================================

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum NodeKind {
    Base,
    Comment,
    Component,
    ControlFlowBlock,
    Named,
    Attribute,
    AttributeAccess,
    Class,
    ClassGeneric,
    ClassGenericInstance,
    ClassGenericSpec,
    Friendship,
    GenericParameter,
    Member,
    Method,
    MethodCall,
    MethodGeneric,
    MethodGenericInstance,
    MethodGenericSpec,
    Package,
    Parameter,
    Scope,
    FSEntry,
    File,
    FileSystem,
    Folder,
    SimpleType,
    Type,
    TypeFormer,
    TypeFormerArray,
    TypeFormerMethod,
    TypeFormerNonType,
    TypeFormerPointer,
    TypeFormerType,
}

impl NodeKind {
    /// Every kind in discriminant order
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Base,
        NodeKind::Comment,
        NodeKind::Component,
        NodeKind::ControlFlowBlock,
        NodeKind::Named,
        NodeKind::Attribute,
        NodeKind::AttributeAccess,
        NodeKind::Class,
        NodeKind::ClassGeneric,
        NodeKind::ClassGenericInstance,
        NodeKind::ClassGenericSpec,
        NodeKind::Friendship,
        NodeKind::GenericParameter,
        NodeKind::Member,
        NodeKind::Method,
        NodeKind::MethodCall,
        NodeKind::MethodGeneric,
        NodeKind::MethodGenericInstance,
        NodeKind::MethodGenericSpec,
        NodeKind::Package,
        NodeKind::Parameter,
        NodeKind::Scope,
        NodeKind::FSEntry,
        NodeKind::File,
        NodeKind::FileSystem,
        NodeKind::Folder,
        NodeKind::SimpleType,
        NodeKind::Type,
        NodeKind::TypeFormer,
        NodeKind::TypeFormerArray,
        NodeKind::TypeFormerMethod,
        NodeKind::TypeFormerNonType,
        NodeKind::TypeFormerPointer,
        NodeKind::TypeFormerType,
    ];

    /// Decode a stored discriminant
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Direct parent in the kind hierarchy
    pub fn parent(self) -> Option<NodeKind> {
        use NodeKind::*;
        Some(match self {
            Base => return None,
            Comment | ControlFlowBlock | Named | AttributeAccess | Friendship | MethodCall
            | SimpleType | Type | TypeFormer => Base,
            Component | GenericParameter | Member | Parameter | FSEntry | FileSystem => Named,
            Attribute | Scope => Member,
            Class | Method | Package => Scope,
            ClassGeneric | ClassGenericInstance => Class,
            ClassGenericSpec => ClassGeneric,
            MethodGeneric | MethodGenericInstance => Method,
            MethodGenericSpec => MethodGeneric,
            File | Folder => FSEntry,
            TypeFormerArray | TypeFormerMethod | TypeFormerNonType | TypeFormerPointer
            | TypeFormerType => TypeFormer,
        })
    }

    /// Whether `self` is `base` or derives from it
    pub fn is_a(self, base: NodeKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == base {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Abstract kinds cannot be instantiated
    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            NodeKind::Base
                | NodeKind::Named
                | NodeKind::Member
                | NodeKind::Scope
                | NodeKind::FSEntry
                | NodeKind::TypeFormer
        )
    }

    pub fn as_str(self) -> &'static str {
        use NodeKind::*;
        match self {
            Base => "Base",
            Comment => "Comment",
            Component => "Component",
            ControlFlowBlock => "ControlFlowBlock",
            Named => "Named",
            Attribute => "Attribute",
            AttributeAccess => "AttributeAccess",
            Class => "Class",
            ClassGeneric => "ClassGeneric",
            ClassGenericInstance => "ClassGenericInstance",
            ClassGenericSpec => "ClassGenericSpec",
            Friendship => "Friendship",
            GenericParameter => "GenericParameter",
            Member => "Member",
            Method => "Method",
            MethodCall => "MethodCall",
            MethodGeneric => "MethodGeneric",
            MethodGenericInstance => "MethodGenericInstance",
            MethodGenericSpec => "MethodGenericSpec",
            Package => "Package",
            Parameter => "Parameter",
            Scope => "Scope",
            FSEntry => "FSEntry",
            File => "File",
            FileSystem => "FileSystem",
            Folder => "Folder",
            SimpleType => "SimpleType",
            Type => "Type",
            TypeFormer => "TypeFormer",
            TypeFormerArray => "TypeFormerArray",
            TypeFormerMethod => "TypeFormerMethod",
            TypeFormerNonType => "TypeFormerNonType",
            TypeFormerPointer => "TypeFormerPointer",
            TypeFormerType => "TypeFormerType",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// EDGE KINDS
// =============================================================================

/// Value carried next to each target of an association edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssocKind {
    TypeArgumentConstraint,
    SourcePosition,
    Parameter,
}

/// Storage shape of an edge slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    Single,
    List,
    Assoc(AssocKind),
}

/// Closed set of edge kinds, named `<SourceKind>_<Edge>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
#[allow(non_camel_case_types)]
pub enum EdgeKind {
    Component_Contains,
    Component_HasFiles,
    ControlFlowBlock_Calls,
    ControlFlowBlock_Pred,
    Named_DependsOn,
    Attribute_Calls,
    Attribute_HasType,
    AttributeAccess_Attribute,
    Class_GrantsFriendship,
    Class_IsSubclass,
    ClassGeneric_HasGenericParameter,
    ClassGenericInstance_HasArguments,
    ClassGenericSpec_HasArguments,
    ClassGenericSpec_Specialize,
    Friendship_Friend,
    GenericParameter_HasParameterConstraint,
    Member_Aggregated,
    Member_BelongsTo,
    Member_CompilationUnit,
    Member_Declares,
    Member_HasComment,
    Member_Instance,
    Member_IsContainedIn,
    Member_LanguageVariant,
    Member_Uses,
    Member_Variant,
    Method_AccessesAttribute,
    Method_Calls,
    Method_CanThrow,
    Method_HasControlFlowBlock,
    Method_HasParameter,
    Method_Instantiates,
    Method_Returns,
    Method_Throws,
    MethodCall_Method,
    MethodGeneric_HasGenericParameter,
    MethodGenericInstance_HasArguments,
    MethodGenericSpec_HasArguments,
    MethodGenericSpec_Specialize,
    Parameter_HasType,
    Scope_HasMember,
    File_HasComment,
    File_Includes,
    FileSystem_HasFSEntry,
    Folder_Contains,
    Type_HasTypeFormer,
    TypeFormerMethod_HasParameterType,
    TypeFormerMethod_HasReturnType,
    TypeFormerType_RefersTo,
}

impl EdgeKind {
    /// Every edge kind in discriminant order
    pub const ALL: &'static [EdgeKind] = &[
        EdgeKind::Component_Contains,
        EdgeKind::Component_HasFiles,
        EdgeKind::ControlFlowBlock_Calls,
        EdgeKind::ControlFlowBlock_Pred,
        EdgeKind::Named_DependsOn,
        EdgeKind::Attribute_Calls,
        EdgeKind::Attribute_HasType,
        EdgeKind::AttributeAccess_Attribute,
        EdgeKind::Class_GrantsFriendship,
        EdgeKind::Class_IsSubclass,
        EdgeKind::ClassGeneric_HasGenericParameter,
        EdgeKind::ClassGenericInstance_HasArguments,
        EdgeKind::ClassGenericSpec_HasArguments,
        EdgeKind::ClassGenericSpec_Specialize,
        EdgeKind::Friendship_Friend,
        EdgeKind::GenericParameter_HasParameterConstraint,
        EdgeKind::Member_Aggregated,
        EdgeKind::Member_BelongsTo,
        EdgeKind::Member_CompilationUnit,
        EdgeKind::Member_Declares,
        EdgeKind::Member_HasComment,
        EdgeKind::Member_Instance,
        EdgeKind::Member_IsContainedIn,
        EdgeKind::Member_LanguageVariant,
        EdgeKind::Member_Uses,
        EdgeKind::Member_Variant,
        EdgeKind::Method_AccessesAttribute,
        EdgeKind::Method_Calls,
        EdgeKind::Method_CanThrow,
        EdgeKind::Method_HasControlFlowBlock,
        EdgeKind::Method_HasParameter,
        EdgeKind::Method_Instantiates,
        EdgeKind::Method_Returns,
        EdgeKind::Method_Throws,
        EdgeKind::MethodCall_Method,
        EdgeKind::MethodGeneric_HasGenericParameter,
        EdgeKind::MethodGenericInstance_HasArguments,
        EdgeKind::MethodGenericSpec_HasArguments,
        EdgeKind::MethodGenericSpec_Specialize,
        EdgeKind::Parameter_HasType,
        EdgeKind::Scope_HasMember,
        EdgeKind::File_HasComment,
        EdgeKind::File_Includes,
        EdgeKind::FileSystem_HasFSEntry,
        EdgeKind::Folder_Contains,
        EdgeKind::Type_HasTypeFormer,
        EdgeKind::TypeFormerMethod_HasParameterType,
        EdgeKind::TypeFormerMethod_HasReturnType,
        EdgeKind::TypeFormerType_RefersTo,
    ];

    /// Decode a stored discriminant
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Kind that owns the edge slot
    pub fn source_kind(self) -> NodeKind {
        use EdgeKind::*;
        match self {
            Component_Contains | Component_HasFiles => NodeKind::Component,
            ControlFlowBlock_Calls | ControlFlowBlock_Pred => NodeKind::ControlFlowBlock,
            Named_DependsOn => NodeKind::Named,
            Attribute_Calls | Attribute_HasType => NodeKind::Attribute,
            AttributeAccess_Attribute => NodeKind::AttributeAccess,
            Class_GrantsFriendship | Class_IsSubclass => NodeKind::Class,
            ClassGeneric_HasGenericParameter => NodeKind::ClassGeneric,
            ClassGenericInstance_HasArguments => NodeKind::ClassGenericInstance,
            ClassGenericSpec_HasArguments | ClassGenericSpec_Specialize => {
                NodeKind::ClassGenericSpec
            }
            Friendship_Friend => NodeKind::Friendship,
            GenericParameter_HasParameterConstraint => NodeKind::GenericParameter,
            Member_Aggregated | Member_BelongsTo | Member_CompilationUnit | Member_Declares
            | Member_HasComment | Member_Instance | Member_IsContainedIn
            | Member_LanguageVariant | Member_Uses | Member_Variant => NodeKind::Member,
            Method_AccessesAttribute | Method_Calls | Method_CanThrow
            | Method_HasControlFlowBlock | Method_HasParameter | Method_Instantiates
            | Method_Returns | Method_Throws => NodeKind::Method,
            MethodCall_Method => NodeKind::MethodCall,
            MethodGeneric_HasGenericParameter => NodeKind::MethodGeneric,
            MethodGenericInstance_HasArguments => NodeKind::MethodGenericInstance,
            MethodGenericSpec_HasArguments | MethodGenericSpec_Specialize => {
                NodeKind::MethodGenericSpec
            }
            Parameter_HasType => NodeKind::Parameter,
            Scope_HasMember => NodeKind::Scope,
            File_HasComment | File_Includes => NodeKind::File,
            FileSystem_HasFSEntry => NodeKind::FileSystem,
            Folder_Contains => NodeKind::Folder,
            Type_HasTypeFormer => NodeKind::Type,
            TypeFormerMethod_HasParameterType | TypeFormerMethod_HasReturnType => {
                NodeKind::TypeFormerMethod
            }
            TypeFormerType_RefersTo => NodeKind::TypeFormerType,
        }
    }

    /// Kind every target must derive from
    pub fn target_kind(self) -> NodeKind {
        use EdgeKind::*;
        match self {
            Component_Contains | Member_BelongsTo => NodeKind::Component,
            Component_HasFiles | Member_CompilationUnit | Member_IsContainedIn
            | File_Includes => NodeKind::File,
            ControlFlowBlock_Calls | Attribute_Calls | Method_Calls => NodeKind::MethodCall,
            ControlFlowBlock_Pred | Method_HasControlFlowBlock => NodeKind::ControlFlowBlock,
            Named_DependsOn => NodeKind::Named,
            Attribute_HasType
            | Class_IsSubclass
            | ClassGenericInstance_HasArguments
            | ClassGenericSpec_HasArguments
            | GenericParameter_HasParameterConstraint
            | Member_Uses
            | Method_CanThrow
            | Method_Instantiates
            | Method_Returns
            | Method_Throws
            | MethodGenericInstance_HasArguments
            | MethodGenericSpec_HasArguments
            | Parameter_HasType
            | TypeFormerMethod_HasParameterType
            | TypeFormerMethod_HasReturnType => NodeKind::Type,
            AttributeAccess_Attribute => NodeKind::Attribute,
            Class_GrantsFriendship => NodeKind::Friendship,
            ClassGeneric_HasGenericParameter | MethodGeneric_HasGenericParameter => {
                NodeKind::GenericParameter
            }
            ClassGenericSpec_Specialize => NodeKind::ClassGeneric,
            MethodGenericSpec_Specialize => NodeKind::MethodGeneric,
            Friendship_Friend => NodeKind::Scope,
            Member_Aggregated | Member_Declares | Member_Instance | Member_LanguageVariant
            | Member_Variant | Scope_HasMember => NodeKind::Member,
            Member_HasComment | File_HasComment => NodeKind::Comment,
            Method_AccessesAttribute => NodeKind::AttributeAccess,
            Method_HasParameter => NodeKind::Parameter,
            MethodCall_Method => NodeKind::Method,
            FileSystem_HasFSEntry | Folder_Contains => NodeKind::FSEntry,
            Type_HasTypeFormer => NodeKind::TypeFormer,
            TypeFormerType_RefersTo => NodeKind::Base,
        }
    }

    /// Storage shape of the slot
    pub fn multiplicity(self) -> Multiplicity {
        use EdgeKind::*;
        match self {
            AttributeAccess_Attribute
            | ClassGenericSpec_Specialize
            | Friendship_Friend
            | Member_Aggregated
            | Member_Declares
            | Member_LanguageVariant
            | MethodCall_Method
            | MethodGenericSpec_Specialize
            | Parameter_HasType
            | TypeFormerMethod_HasReturnType
            | TypeFormerType_RefersTo => Multiplicity::Single,
            ClassGenericInstance_HasArguments
            | ClassGenericSpec_HasArguments
            | MethodGenericInstance_HasArguments
            | MethodGenericSpec_HasArguments => {
                Multiplicity::Assoc(AssocKind::TypeArgumentConstraint)
            }
            Member_IsContainedIn => Multiplicity::Assoc(AssocKind::SourcePosition),
            TypeFormerMethod_HasParameterType => Multiplicity::Assoc(AssocKind::Parameter),
            _ => Multiplicity::List,
        }
    }

    /// Containment edges give their target a unique parent
    pub fn is_containment(self) -> bool {
        matches!(
            self,
            EdgeKind::Method_HasControlFlowBlock | EdgeKind::Method_HasParameter
        )
    }

    /// Edge name without the source-kind prefix (`HasMember`)
    pub fn short_name(self) -> &'static str {
        let full = self.as_str();
        full.split_once('_').map(|(_, name)| name).unwrap_or(full)
    }

    pub fn as_str(self) -> &'static str {
        use EdgeKind::*;
        match self {
            Component_Contains => "Component_Contains",
            Component_HasFiles => "Component_HasFiles",
            ControlFlowBlock_Calls => "ControlFlowBlock_Calls",
            ControlFlowBlock_Pred => "ControlFlowBlock_Pred",
            Named_DependsOn => "Named_DependsOn",
            Attribute_Calls => "Attribute_Calls",
            Attribute_HasType => "Attribute_HasType",
            AttributeAccess_Attribute => "AttributeAccess_Attribute",
            Class_GrantsFriendship => "Class_GrantsFriendship",
            Class_IsSubclass => "Class_IsSubclass",
            ClassGeneric_HasGenericParameter => "ClassGeneric_HasGenericParameter",
            ClassGenericInstance_HasArguments => "ClassGenericInstance_HasArguments",
            ClassGenericSpec_HasArguments => "ClassGenericSpec_HasArguments",
            ClassGenericSpec_Specialize => "ClassGenericSpec_Specialize",
            Friendship_Friend => "Friendship_Friend",
            GenericParameter_HasParameterConstraint => "GenericParameter_HasParameterConstraint",
            Member_Aggregated => "Member_Aggregated",
            Member_BelongsTo => "Member_BelongsTo",
            Member_CompilationUnit => "Member_CompilationUnit",
            Member_Declares => "Member_Declares",
            Member_HasComment => "Member_HasComment",
            Member_Instance => "Member_Instance",
            Member_IsContainedIn => "Member_IsContainedIn",
            Member_LanguageVariant => "Member_LanguageVariant",
            Member_Uses => "Member_Uses",
            Member_Variant => "Member_Variant",
            Method_AccessesAttribute => "Method_AccessesAttribute",
            Method_Calls => "Method_Calls",
            Method_CanThrow => "Method_CanThrow",
            Method_HasControlFlowBlock => "Method_HasControlFlowBlock",
            Method_HasParameter => "Method_HasParameter",
            Method_Instantiates => "Method_Instantiates",
            Method_Returns => "Method_Returns",
            Method_Throws => "Method_Throws",
            MethodCall_Method => "MethodCall_Method",
            MethodGeneric_HasGenericParameter => "MethodGeneric_HasGenericParameter",
            MethodGenericInstance_HasArguments => "MethodGenericInstance_HasArguments",
            MethodGenericSpec_HasArguments => "MethodGenericSpec_HasArguments",
            MethodGenericSpec_Specialize => "MethodGenericSpec_Specialize",
            Parameter_HasType => "Parameter_HasType",
            Scope_HasMember => "Scope_HasMember",
            File_HasComment => "File_HasComment",
            File_Includes => "File_Includes",
            FileSystem_HasFSEntry => "FileSystem_HasFSEntry",
            Folder_Contains => "Folder_Contains",
            Type_HasTypeFormer => "Type_HasTypeFormer",
            TypeFormerMethod_HasParameterType => "TypeFormerMethod_HasParameterType",
            TypeFormerMethod_HasReturnType => "TypeFormerMethod_HasReturnType",
            TypeFormerType_RefersTo => "TypeFormerType_RefersTo",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_hierarchy() {
        assert!(NodeKind::ClassGenericSpec.is_a(NodeKind::Class));
        assert!(NodeKind::ClassGenericSpec.is_a(NodeKind::Member));
        assert!(NodeKind::File.is_a(NodeKind::Named));
        assert!(NodeKind::TypeFormerType.is_a(NodeKind::TypeFormer));
        assert!(!NodeKind::Method.is_a(NodeKind::Type));
        assert!(!NodeKind::Parameter.is_a(NodeKind::Member));
        assert!(NodeKind::Component.is_a(NodeKind::Base));
    }

    #[test]
    fn test_discriminants_round_trip() {
        for (i, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(*kind as u16, i as u16);
            assert_eq!(NodeKind::from_u16(i as u16), Some(*kind));
        }
        for (i, edge) in EdgeKind::ALL.iter().enumerate() {
            assert_eq!(*edge as u8, i as u8);
        }
        assert_eq!(NodeKind::from_u16(NodeKind::ALL.len() as u16), None);
        assert_eq!(SimpleTypeKind::from_u8(6), Some(SimpleTypeKind::Integer));
    }

    #[test]
    fn test_edge_prefix_matches_source_kind() {
        for edge in EdgeKind::ALL {
            let prefix = edge.as_str().split('_').next().unwrap();
            assert_eq!(prefix, edge.source_kind().as_str(), "{}", edge);
        }
    }

    #[test]
    fn test_edge_schema() {
        assert_eq!(EdgeKind::Method_Returns.target_kind(), NodeKind::Type);
        assert_eq!(
            EdgeKind::ClassGenericInstance_HasArguments.multiplicity(),
            Multiplicity::Assoc(AssocKind::TypeArgumentConstraint)
        );
        assert_eq!(EdgeKind::Parameter_HasType.multiplicity(), Multiplicity::Single);
        assert!(EdgeKind::Method_HasParameter.is_containment());
        assert!(!EdgeKind::Scope_HasMember.is_containment());
        assert_eq!(EdgeKind::Scope_HasMember.short_name(), "HasMember");
    }

    #[test]
    fn test_language_from_name() {
        assert_eq!(LanguageKind::from_name("csharp"), Some(LanguageKind::Csharp));
        assert_eq!(LanguageKind::from_name("Java"), Some(LanguageKind::Java));
        assert_eq!(LanguageKind::from_name("cobol"), None);
    }
}
