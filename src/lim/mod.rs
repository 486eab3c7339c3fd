//! LIM Graph Engine
//!
//! The language-independent model and everything needed to keep it on disk:
//! - Schema: node kinds, edge kinds, scalar enums
//! - Node store with validated edge mutation and filter bits
//! - String interning table
//! - Binary codec (string table, header records, node bodies)
//! - Reverse-edge index and LIMML text dump
//!
//! @module lim

pub mod dump;
pub mod edges;
pub mod factory;
pub mod header;
pub mod io;
pub mod node;
pub mod persist;
pub mod reverse;
pub mod storage;
pub mod strtable;
pub mod types;

// =============================================================================
// RE-EXPORTS: Schema (types.rs, node.rs, edges.rs)
// =============================================================================

pub use edges::Assoc;
pub use node::Node;
pub use types::{
    AccessibilityKind, AnalysisTimeKind, ClassKind, EdgeKind, GenericParameterKind, Key,
    LanguageKind, MethodKind, Multiplicity, NodeId, NodeKind, ParameterKind, PointerKind,
    RealizationLevel, SimpleTypeKind, SourcePosition, TypeArgumentConstraintKind, ELIDED_ID,
    FILE_SYSTEM_ID, NULL_ID, ROOT_COMPONENT_ID, ROOT_PACKAGE_ID,
};

// =============================================================================
// RE-EXPORTS: Store (factory.rs, strtable.rs, reverse.rs)
// =============================================================================

pub use factory::Factory;
pub use reverse::ReverseEdges;
pub use strtable::{StrTable, StrType};

// =============================================================================
// RE-EXPORTS: Persistence (header.rs, storage.rs, dump.rs)
// =============================================================================

pub use dump::{dump_limml, DumpOptions};
pub use header::{Header, LimOrigin, OverrideRelations, PropertyData};
pub use storage::{load, load_filter, load_streaming, save, save_filter, save_filtered};
