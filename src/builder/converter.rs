//! Symbol to Node Conversion
//!
//! Maps each front-end symbol to exactly one node and builds type
//! expressions out of type formers. Conversion is idempotent: a mapped
//! symbol returns its node without touching any edge.
//!
//! @module builder/converter

use tracing::{debug, trace};

use super::Session;
use crate::core::error::{Error, Result};
use crate::frontend::{SiteRef, SpecialType, SymbolData, SymbolKind, SymbolRef, SymbolSource};
use crate::lim::{
    EdgeKind, Node, NodeId, NodeKind, PointerKind, SimpleTypeKind, ROOT_PACKAGE_ID,
};

/// Node kind a symbol converts to, if it has one
pub fn lim_kind(data: &SymbolData) -> Option<NodeKind> {
    let kind = match data.kind {
        SymbolKind::Namespace => NodeKind::Package,
        SymbolKind::NamedType | SymbolKind::ErrorType if data.is_generic => NodeKind::ClassGeneric,
        SymbolKind::NamedType | SymbolKind::ErrorType => NodeKind::Class,
        SymbolKind::Method if data.is_generic => NodeKind::MethodGeneric,
        SymbolKind::Method => NodeKind::Method,
        SymbolKind::Field | SymbolKind::Event => NodeKind::Attribute,
        SymbolKind::Parameter => NodeKind::Parameter,
        SymbolKind::TypeParameter => NodeKind::GenericParameter,
        _ => return None,
    };
    Some(kind)
}

/// Primitive a special type maps to
pub fn simple_type_kind(special: SpecialType) -> Option<SimpleTypeKind> {
    let kind = match special {
        SpecialType::None => return None,
        SpecialType::Object => SimpleTypeKind::Object,
        SpecialType::Void => SimpleTypeKind::Void,
        SpecialType::Single => SimpleTypeKind::Single,
        SpecialType::Boolean => SimpleTypeKind::Boolean,
        SpecialType::Char => SimpleTypeKind::Character,
        SpecialType::SByte | SpecialType::Byte => SimpleTypeKind::Byte,
        SpecialType::Int16 => SimpleTypeKind::Short,
        SpecialType::UInt16 => SimpleTypeKind::UnsignedShort,
        SpecialType::Int32 => SimpleTypeKind::Integer,
        SpecialType::UInt32 => SimpleTypeKind::UnsignedInteger,
        SpecialType::Int64 => SimpleTypeKind::Long,
        SpecialType::UInt64 => SimpleTypeKind::UnsignedLong,
        SpecialType::Decimal => SimpleTypeKind::Decimal,
        SpecialType::Double => SimpleTypeKind::Double,
        SpecialType::String => SimpleTypeKind::String,
    };
    Some(kind)
}

const MAX_PARENT_DEPTH: usize = 1024;

impl<'a, S: SymbolSource + ?Sized> Session<'a, S> {
    // =========================================================================
    // IDENTITY
    // =========================================================================

    /// Node of `symbol`, created on first sight; `None` for symbols with no
    /// graph representation
    pub fn convert(&mut self, symbol: SymbolRef) -> Result<Option<NodeId>> {
        if let Some(id) = self.ctx.node_of(symbol) {
            return Ok(Some(id));
        }
        let data = self.data(symbol)?;
        if data.kind == SymbolKind::Namespace && data.is_global_namespace {
            self.ctx.symbols.insert(symbol, ROOT_PACKAGE_ID);
            return Ok(Some(ROOT_PACKAGE_ID));
        }
        let Some(kind) = lim_kind(data) else {
            return Ok(None);
        };

        let id = self.ctx.factory.create(kind)?;
        self.ctx.factory.set_name(id, &data.name)?;
        if kind.is_a(NodeKind::Member) {
            self.ctx.factory.member_mut(id)?.language = self.ctx.language;
        }
        self.ctx.symbols.insert(symbol, id);
        trace!(%symbol, id, kind = %kind, name = %data.name, "Converted symbol");
        Ok(Some(id))
    }

    /// Like [`Session::convert`], but a symbol without a node is a
    /// front-end bug
    pub(crate) fn convert_required(&mut self, symbol: SymbolRef) -> Result<NodeId> {
        self.convert(symbol)?.ok_or_else(|| {
            Error::contract(format!("{} has no graph representation", symbol))
        })
    }

    /// Definition of `symbol` as declared in analyzed source
    ///
    /// `None` means the symbol is metadata-origin. Tuples are their own
    /// definition.
    pub fn resolve_definition(&self, symbol: SymbolRef) -> Result<Option<(SymbolRef, SiteRef)>> {
        let data = self.data(symbol)?;
        let Some(&site) = data.declarations.first() else {
            return Ok(None);
        };
        if data.is_tuple {
            return Ok(Some((symbol, site)));
        }
        Ok(self.source.resolve_declared_symbol(site).map(|def| (def, site)))
    }

    /// Nearest enclosing symbol that has a graph representation
    pub fn parent(&self, symbol: SymbolRef) -> Result<Option<SymbolRef>> {
        let mut current = symbol;
        for _ in 0..MAX_PARENT_DEPTH {
            let Some(next) = self.data(current)?.containing else {
                return Ok(None);
            };
            current = next;
            if self.data(current)?.kind != SymbolKind::Namespace {
                if let Some((definition, _)) = self.resolve_definition(current)? {
                    current = definition;
                }
            }
            if self.data(current)?.kind.is_lim_compatible() {
                return Ok(Some(current));
            }
        }
        Err(Error::contract(format!("Containment cycle at {}", symbol)))
    }

    // =========================================================================
    // TYPES
    // =========================================================================

    /// Type node for `symbol`, built once per symbol
    ///
    /// `refers_to` names the generic definition when `symbol` is a
    /// constructed generic type found through source.
    pub fn get_lim_type(&mut self, symbol: SymbolRef, refers_to: Option<SymbolRef>) -> Result<NodeId> {
        if let Some(&id) = self.ctx.types.get(&symbol) {
            return Ok(id);
        }
        self.ctx.factory.begin_type();
        if let Err(e) = self.add_type_formers(symbol, refers_to) {
            self.ctx.factory.abandon_type();
            return Err(e);
        }
        let id = self.ctx.factory.end_type()?;
        self.ctx.types.insert(symbol, id);
        Ok(id)
    }

    /// `Type[TypeFormerType(SimpleType(Unknown))]`
    pub fn unknown_type(&mut self) -> Result<NodeId> {
        let factory = &mut self.ctx.factory;
        let unknown = factory.create_simple_type(SimpleTypeKind::Unknown)?;
        let former = factory.create_type_former_type(unknown)?;
        factory.begin_type();
        factory.add_type_former(former)?;
        factory.end_type()
    }

    fn push_former(&mut self, former: NodeId) -> Result<()> {
        self.ctx.factory.add_type_former(former)
    }

    fn push_refers_to(&mut self, target: NodeId) -> Result<()> {
        let former = self.ctx.factory.create_type_former_type(target)?;
        self.push_former(former)
    }

    fn push_non_type(&mut self) -> Result<()> {
        let former = self.ctx.factory.create_type_former_non_type()?;
        self.push_former(former)
    }

    fn add_type_formers(&mut self, symbol: SymbolRef, refers_to: Option<SymbolRef>) -> Result<()> {
        let data = self.data(symbol)?;
        match data.kind {
            SymbolKind::ArrayType => {
                let array = self.ctx.factory.create_type_former_array()?;
                self.push_former(array)?;
                if let Some(element) = data.element_type {
                    self.add_element_formers(element)?;
                }
                Ok(())
            }
            SymbolKind::TypeParameter => match self.convert(symbol)? {
                Some(parameter) => self.push_refers_to(parameter),
                None => self.push_non_type(),
            },
            SymbolKind::PointerType => {
                let pointee = data.pointed_at_type;
                let is_reference = match pointee {
                    Some(p) => self.data(p)?.is_reference_type,
                    None => data.is_reference_type,
                };
                let kind = if is_reference {
                    PointerKind::Reference
                } else {
                    PointerKind::Pointer
                };
                let former = self.ctx.factory.create_type_former_pointer(kind)?;
                self.push_former(former)?;
                match pointee {
                    Some(p) => self.add_type_formers(p, None),
                    None => Ok(()),
                }
            }
            SymbolKind::NamedType if data.is_generic => {
                let instance = self.get_or_create_class_instance(symbol, refers_to)?;
                self.push_refers_to(instance)
            }
            SymbolKind::NamedType => {
                if let Some(kind) = simple_type_kind(data.special_type) {
                    let simple = self.ctx.factory.create_simple_type(kind)?;
                    return self.push_refers_to(simple);
                }
                if !data.is_metadata() && self.resolve_definition(symbol)?.is_none() {
                    debug!(%symbol, display = %data.display, "Unresolvable source type");
                    return self.push_non_type();
                }
                let node = self.convert_required(symbol)?;
                if data.is_metadata() {
                    self.fill_metadata_names(symbol, node)?;
                    self.ctx.factory.set_filtered(node)?;
                }
                self.push_refers_to(node)
            }
            _ => self.push_non_type(),
        }
    }

    /// Array element: metadata elements directly, source elements through
    /// their definition so that duplicates collapse
    fn add_element_formers(&mut self, element: SymbolRef) -> Result<()> {
        let data = self.data(element)?;
        if data.is_metadata() {
            return self.add_type_formers(element, None);
        }
        match self.resolve_definition(element)? {
            Some((definition, _)) => {
                let def = self.data(definition)?;
                if def.kind != data.kind {
                    debug!(%element, "Array element resolves to a different kind");
                    return self.push_non_type();
                }
                if def.kind == SymbolKind::NamedType && def.is_generic {
                    self.add_type_formers(element, Some(definition))
                } else {
                    self.add_type_formers(definition, None)
                }
            }
            None => {
                debug!(%element, "Unresolvable array element");
                self.push_non_type()
            }
        }
    }

    // =========================================================================
    // FILES AND COMMENTS
    // =========================================================================

    /// `File` node for `path`; `None` when the hard filter excludes it
    pub fn create_file(&mut self, path: &str) -> Result<Option<NodeId>> {
        if self.ctx.hard_filter.is_excluded(path) {
            return Ok(None);
        }
        let id = self.ctx.factory.create_file(path)?;
        if let Some(&lines) = self.ctx.line_counts.get(path) {
            if let Node::File(file) = self.ctx.factory.get_mut(id)? {
                file.loc = lines;
            }
        }
        Ok(Some(id))
    }

    /// Attach a deduplicated comment to `member`
    pub fn create_comment(&mut self, member: NodeId, text: &str) -> Result<Option<NodeId>> {
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return Ok(None);
        }
        let comment = self.ctx.factory.create_comment(text)?;
        self.ctx
            .factory
            .safe_edge(member, EdgeKind::Member_HasComment, comment)?;
        Ok(Some(comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::filter::Filter;
    use crate::frontend::{SourceSpan, SymbolModel, TypeKind};
    use crate::lim::LanguageKind;

    fn builder() -> GraphBuilder {
        GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty())
    }

    #[test]
    fn test_convert_is_idempotent() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let ns = model.namespace(global, "App");
        let class = model.named_type(ns, "Widget", TypeKind::Class);
        let local = model.add_symbol(SymbolData::new(SymbolKind::Local, "tmp"));

        let mut b = builder();
        let mut s = b.session(&model);
        assert_eq!(s.convert(global).unwrap(), Some(ROOT_PACKAGE_ID));
        let first = s.convert(class).unwrap().unwrap();
        let len = s.context().factory().len();
        assert_eq!(s.convert(class).unwrap(), Some(first));
        assert_eq!(s.context().factory().len(), len);
        assert_eq!(s.convert(local).unwrap(), None);

        let factory = b.factory();
        assert_eq!(factory.kind(first).unwrap(), NodeKind::Class);
        assert_eq!(factory.name(first), "Widget");
        assert_eq!(factory.member(first).unwrap().language, LanguageKind::Csharp);
    }

    #[test]
    fn test_failed_type_build_closes_its_frame() {
        let mut model = SymbolModel::new();
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let broken = model.array_of(SymbolRef(999));

        let mut b = builder();
        let mut s = b.session(&model);
        assert!(s.get_lim_type(broken, None).is_err());
        assert_eq!(s.context().factory().open_types(), 0);

        let t = s.get_lim_type(int, None).unwrap();
        let factory = s.context().factory();
        assert_eq!(factory.targets(t, EdgeKind::Type_HasTypeFormer).unwrap().len(), 1);
        assert_eq!(factory.open_types(), 0);
    }

    #[test]
    fn test_primitive_types_share_nodes() {
        let mut model = SymbolModel::new();
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let int_again = model.metadata_type("System.Int32", SpecialType::Int32);
        let array = model.array_of(int);

        let mut b = builder();
        let mut s = b.session(&model);
        let t1 = s.get_lim_type(int, None).unwrap();
        let t2 = s.get_lim_type(int_again, None).unwrap();
        assert_eq!(t1, t2);

        let arr = s.get_lim_type(array, None).unwrap();
        let factory = s.context().factory();
        let formers = factory.targets(arr, EdgeKind::Type_HasTypeFormer).unwrap();
        assert_eq!(formers.len(), 2);
        assert_eq!(factory.kind(formers[1]).unwrap(), NodeKind::TypeFormerArray);
        let tf = factory.target(formers[0], EdgeKind::TypeFormerType_RefersTo).unwrap();
        match factory.get(tf).unwrap() {
            Node::SimpleType(d) => assert_eq!(d.kind, SimpleTypeKind::Integer),
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn test_metadata_class_type_is_filtered() {
        let mut model = SymbolModel::new();
        let stream = model.metadata_type("System.IO.Stream", SpecialType::None);

        let mut b = builder();
        let mut s = b.session(&model);
        let ty = s.get_lim_type(stream, None).unwrap();
        let class = s.convert(stream).unwrap().unwrap();
        let factory = s.context().factory();
        assert!(factory.is_filtered(class));
        assert!(factory.member(class).unwrap().is_compiler_generated());
        let former = factory.targets(ty, EdgeKind::Type_HasTypeFormer).unwrap()[0];
        assert_eq!(
            factory.target(former, EdgeKind::TypeFormerType_RefersTo).unwrap(),
            crate::lim::ELIDED_ID
        );
    }

    #[test]
    fn test_unresolvable_source_type_is_non_type() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let ghost = model.named_type(global, "Ghost", TypeKind::Class);
        let site = model.add_site(crate::frontend::SiteData {
            path: "a.cs".to_string(),
            span: SourceSpan::new(1, 1, 1, 10),
            declares: None,
            documentation: None,
        });
        model.symbol_mut(ghost).unwrap().declarations.push(site);

        let mut b = builder();
        let mut s = b.session(&model);
        let ty = s.get_lim_type(ghost, None).unwrap();
        let factory = s.context().factory();
        let former = factory.targets(ty, EdgeKind::Type_HasTypeFormer).unwrap()[0];
        assert_eq!(factory.kind(former).unwrap(), NodeKind::TypeFormerNonType);
    }

    #[test]
    fn test_parent_skips_incompatible_symbols() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let class = model.named_type(global, "Outer", TypeKind::Class);
        let mut property = SymbolData::new(SymbolKind::Property, "Value");
        property.containing = Some(class);
        let property = model.add_symbol(property);
        let mut accessor = SymbolData::new(SymbolKind::Method, "get_Value");
        accessor.containing = Some(property);
        let accessor = model.add_symbol(accessor);

        let mut b = builder();
        let s = b.session(&model);
        assert_eq!(s.parent(accessor).unwrap(), Some(class));
        assert_eq!(s.parent(class).unwrap(), Some(global));
        assert_eq!(s.parent(global).unwrap(), None);
    }

    #[test]
    fn test_create_file_and_comment() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let class = model.named_type(global, "Doc", TypeKind::Class);

        let mut b = GraphBuilder::new(
            LanguageKind::Csharp,
            Filter::parse("-generated\n"),
            Filter::empty(),
        );
        let mut s = b.session(&model);
        assert_eq!(s.create_file("src/generated/x.cs").unwrap(), None);
        assert!(s.create_file("src/x.cs").unwrap().is_some());

        let node = s.convert(class).unwrap().unwrap();
        let c1 = s.create_comment(node, "/// hello\r\n").unwrap().unwrap();
        let c2 = s.create_comment(node, "/// hello").unwrap().unwrap();
        assert_eq!(c1, c2);
        assert_eq!(s.create_comment(node, "\n").unwrap(), None);
        assert_eq!(
            s.context().factory().targets(node, EdgeKind::Member_HasComment).unwrap(),
            vec![c1]
        );
    }
}
