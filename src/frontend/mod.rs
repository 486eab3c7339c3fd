//! Front-End Contract
//!
//! What the graph builder needs from a language front end:
//! - Read-only symbol queries ([`SymbolData`])
//! - Declaration sites with 1-based spans ([`SiteData`])
//! - The per-unit enumeration of declarations and method bodies
//!
//! [`SymbolModel`] is a JSON-backed implementation of [`SymbolSource`].
//!
//! @module frontend

pub mod model;

use serde::{Deserialize, Serialize};

use crate::lim::{RealizationLevel, SourcePosition};

pub use model::SymbolModel;

// =============================================================================
// IDENTITIES
// =============================================================================

/// Opaque identity of a front-end symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolRef(pub u32);

/// Opaque identity of a declaration site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteRef(pub u32);

impl std::fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "symbol#{}", self.0)
    }
}

impl std::fmt::Display for SiteRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "site#{}", self.0)
    }
}

// =============================================================================
// SYMBOL ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Namespace,
    NamedType,
    ErrorType,
    ArrayType,
    PointerType,
    TypeParameter,
    DynamicType,
    Method,
    Field,
    Event,
    Property,
    Parameter,
    Local,
    #[default]
    Other,
}

impl SymbolKind {
    /// Kinds that have a node in the graph
    pub fn is_lim_compatible(self) -> bool {
        matches!(
            self,
            SymbolKind::Namespace
                | SymbolKind::NamedType
                | SymbolKind::ErrorType
                | SymbolKind::Method
                | SymbolKind::Field
                | SymbolKind::Event
                | SymbolKind::Parameter
                | SymbolKind::TypeParameter
        )
    }

    pub fn is_type(self) -> bool {
        matches!(
            self,
            SymbolKind::NamedType
                | SymbolKind::ErrorType
                | SymbolKind::ArrayType
                | SymbolKind::PointerType
                | SymbolKind::TypeParameter
                | SymbolKind::DynamicType
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Unknown,
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Array,
    Pointer,
    TypeParameter,
    Dynamic,
    Error,
}

/// Built-in types the front end recognizes by identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialType {
    #[default]
    None,
    Object,
    Void,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Decimal,
    Single,
    Double,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    NotApplicable,
    Private,
    ProtectedAndInternal,
    Protected,
    Internal,
    ProtectedOrInternal,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Ordinary,
    Constructor,
    StaticConstructor,
    Destructor,
    Conversion,
    UserDefinedOperator,
    BuiltinOperator,
    PropertyGet,
    PropertySet,
    EventAdd,
    EventRemove,
    AnonymousFunction,
    DelegateInvoke,
    LocalFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

// =============================================================================
// SYMBOLS AND SITES
// =============================================================================

/// Everything the builder may ask about one symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolData {
    pub kind: SymbolKind,
    pub name: String,
    /// Fully qualified form, e.g. `N.A<int>`
    pub display: String,
    /// Minimally qualified form, e.g. `A<int>`
    pub minimal_display: String,
    pub containing: Option<SymbolRef>,

    /// Declaring sites; empty for metadata-origin symbols
    pub declarations: Vec<SiteRef>,
    pub is_global_namespace: bool,
    pub is_tuple: bool,

    pub accessibility: Accessibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_anonymous: bool,

    pub type_kind: TypeKind,
    pub special_type: SpecialType,
    pub is_generic: bool,
    pub type_arguments: Vec<SymbolRef>,
    pub type_parameters: Vec<SymbolRef>,
    pub constraint_types: Vec<SymbolRef>,
    pub original_definition: Option<SymbolRef>,
    pub element_type: Option<SymbolRef>,
    pub pointed_at_type: Option<SymbolRef>,
    pub is_reference_type: bool,
    pub base_type: Option<SymbolRef>,
    pub interfaces: Vec<SymbolRef>,

    pub method_kind: MethodKind,
    pub return_type: Option<SymbolRef>,
    pub parameters: Vec<SymbolRef>,
    pub overridden: Option<SymbolRef>,

    pub value_type: Option<SymbolRef>,
    pub ref_kind: RefKind,
}

impl SymbolData {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            display: name.clone(),
            minimal_display: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Declared only in referenced binaries, never in analyzed source
    pub fn is_metadata(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Minimally qualified name, falling back to the display form
    pub fn minimal_name(&self) -> &str {
        if self.minimal_display.is_empty() {
            &self.display
        } else {
            &self.minimal_display
        }
    }
}

/// 1-based line/column range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceSpan {
    pub fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }

    pub fn to_position(self, level: RealizationLevel) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            end_line: self.end_line,
            end_column: self.end_column,
            realization_level: level,
        }
    }
}

/// A syntax location that declares a symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteData {
    pub path: String,
    pub span: SourceSpan,
    /// Symbol declared here, as the front end resolves it
    pub declares: Option<SymbolRef>,
    /// Documentation comment attached to the declaration
    pub documentation: Option<String>,
}

// =============================================================================
// UNITS
// =============================================================================

/// A declared symbol together with the site declaring it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub symbol: SymbolRef,
    pub site: SiteRef,
}

/// Facts collected from one method body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodBody {
    pub method: SymbolRef,
    pub calls: Vec<SymbolRef>,
    pub throws: Vec<SymbolRef>,
    pub can_throw: Vec<SymbolRef>,
    pub instantiates: Vec<SymbolRef>,
    pub accesses: Vec<SymbolRef>,
    pub nesting_level: u16,
    pub nesting_level_else_if: u16,
    pub branches: u32,
    pub statements: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFile {
    pub path: String,
    pub line_count: Option<u32>,
    pub declarations: Vec<Declaration>,
    pub bodies: Vec<MethodBody>,
}

/// One front-end project; becomes one component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisUnit {
    pub name: String,
    pub files: Vec<SourceFile>,
}

// =============================================================================
// CONTRACT
// =============================================================================

/// Read-only view of a front end's symbol information
pub trait SymbolSource {
    fn symbol(&self, id: SymbolRef) -> Option<&SymbolData>;

    fn site(&self, id: SiteRef) -> Option<&SiteData>;

    fn units(&self) -> &[AnalysisUnit];

    /// Symbol declared at `site`
    fn resolve_declared_symbol(&self, site: SiteRef) -> Option<SymbolRef> {
        self.site(site).and_then(|s| s.declares)
    }

    fn source_position(&self, site: SiteRef) -> Option<SourceSpan> {
        self.site(site).map(|s| s.span)
    }
}
