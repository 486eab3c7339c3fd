//! Node Filler
//!
//! Copies symbol attributes onto converted nodes and wires their structural
//! edges. Filling happens once per declaration, in declaration order; the
//! frame stack in the context tells a member which class or method it is
//! declared in.
//!
//! @module builder/filler

use tracing::{debug, trace};

use super::context::FrameKind;
use super::Session;
use crate::core::error::{Error, Result};
use crate::frontend::{
    Accessibility, MethodKind as SymbolMethodKind, RefKind, SymbolKind, SymbolRef, SymbolSource,
    TypeKind,
};
use crate::lim::{
    AccessibilityKind, Assoc, ClassKind, EdgeKind, GenericParameterKind, MethodKind, Node, NodeId,
    NodeKind, ParameterKind, RealizationLevel,
};

fn accessibility(value: Accessibility) -> Option<AccessibilityKind> {
    match value {
        Accessibility::Private => Some(AccessibilityKind::Private),
        Accessibility::ProtectedAndInternal => Some(AccessibilityKind::Internal),
        Accessibility::Protected => Some(AccessibilityKind::Protected),
        Accessibility::Internal => Some(AccessibilityKind::Internal),
        Accessibility::ProtectedOrInternal => Some(AccessibilityKind::ProtectedInternal),
        Accessibility::Public => Some(AccessibilityKind::Public),
        Accessibility::NotApplicable => None,
    }
}

fn class_kind(value: TypeKind) -> ClassKind {
    match value {
        TypeKind::Interface => ClassKind::Interface,
        TypeKind::Struct => ClassKind::Struct,
        TypeKind::Enum => ClassKind::Enum,
        TypeKind::Delegate => ClassKind::Delegate,
        _ => ClassKind::Class,
    }
}

/// Kind of a declared method, refined by its accessor-style name
fn declared_method_kind(value: SymbolMethodKind, name: &str) -> MethodKind {
    let kind = match value {
        SymbolMethodKind::Constructor => MethodKind::Constructor,
        SymbolMethodKind::Conversion | SymbolMethodKind::UserDefinedOperator => MethodKind::Operator,
        SymbolMethodKind::Destructor => MethodKind::Destructor,
        _ => MethodKind::Normal,
    };
    if name.starts_with("get") {
        MethodKind::Get
    } else if name.starts_with("set") {
        MethodKind::Set
    } else if name.starts_with("add") {
        MethodKind::Add
    } else if name.starts_with("remove") {
        MethodKind::Remove
    } else {
        kind
    }
}

/// Kind of a method known only from metadata
fn metadata_method_kind(value: SymbolMethodKind) -> MethodKind {
    match value {
        SymbolMethodKind::BuiltinOperator
        | SymbolMethodKind::UserDefinedOperator
        | SymbolMethodKind::Conversion => MethodKind::Operator,
        SymbolMethodKind::Constructor => MethodKind::Constructor,
        SymbolMethodKind::Destructor => MethodKind::Destructor,
        SymbolMethodKind::PropertyGet => MethodKind::Get,
        SymbolMethodKind::PropertySet => MethodKind::Set,
        SymbolMethodKind::EventAdd => MethodKind::Add,
        SymbolMethodKind::EventRemove => MethodKind::Remove,
        _ => MethodKind::Normal,
    }
}

fn parameter_kind(value: RefKind) -> Option<ParameterKind> {
    match value {
        RefKind::None => Some(ParameterKind::In),
        RefKind::Ref => Some(ParameterKind::InOut),
        RefKind::Out => Some(ParameterKind::Out),
        RefKind::In => None,
    }
}

impl<'a, S: SymbolSource + ?Sized> Session<'a, S> {
    /// Convert `symbol` and fill its node
    ///
    /// With `set_has_member` the node is also hooked under its enclosing
    /// scope.
    pub fn build(&mut self, symbol: SymbolRef, set_has_member: bool) -> Result<Option<NodeId>> {
        let Some(node) = self.convert(symbol)? else {
            debug!(%symbol, "Symbol has no graph representation");
            return Ok(None);
        };
        let kind = self.ctx.factory.kind(node)?;
        trace!(%symbol, node, kind = %kind, "Filling node");
        match kind {
            NodeKind::Package => self.fill_package(symbol, node, set_has_member)?,
            NodeKind::Class => self.fill_class(symbol, node, set_has_member)?,
            NodeKind::ClassGeneric => self.fill_class_generic(symbol, node, set_has_member)?,
            NodeKind::Method => self.fill_method(symbol, node, set_has_member)?,
            NodeKind::MethodGeneric => self.fill_method_generic(symbol, node, set_has_member)?,
            NodeKind::Attribute => self.fill_attribute(symbol, node, set_has_member)?,
            NodeKind::GenericParameter => self.fill_generic_parameter(symbol, node)?,
            NodeKind::Parameter => self.fill_parameter(symbol, node)?,
            _ => {}
        }

        if kind.is_a(NodeKind::Member) {
            let data = self.data(symbol)?;
            if let Some(&site) = data.declarations.first() {
                let documentation = self.source.site(site).and_then(|s| s.documentation.as_deref());
                if let Some(text) = documentation {
                    self.create_comment(node, text)?;
                }
            }
        }
        Ok(Some(node))
    }

    // =========================================================================
    // MEMBERS AND SCOPES
    // =========================================================================

    fn fill_member(
        &mut self,
        symbol: SymbolRef,
        node: NodeId,
        set_has_member: bool,
        with_positions: bool,
    ) -> Result<()> {
        let data = self.data(symbol)?;
        let language = self.ctx.language;
        let display = self.ctx.factory.strings_mut().set(&data.display);
        let member = self.ctx.factory.member_mut(node)?;
        member.language = language;
        if let Some(access) = accessibility(data.accessibility) {
            member.accessibility = access;
        }
        member.set_static(data.is_static);
        member.set_compiler_generated(false);
        member.mangled_name = display;
        member.demangled_name = display;

        // packages span files, so only their metadata origin filters them
        let soft_filtered = self.ctx.file_soft_filtered && data.kind != SymbolKind::Namespace;
        if data.is_metadata() || soft_filtered {
            self.ctx.factory.set_filtered(node)?;
        }
        if with_positions && !data.is_metadata() && !data.is_global_namespace {
            self.add_positions(symbol, node)?;
        }
        let component = self.ctx.component;
        self.ctx
            .factory
            .safe_edge(node, EdgeKind::Member_BelongsTo, component)?;

        if set_has_member {
            self.attach_to_scope(symbol, node)?;
        }
        Ok(())
    }

    /// Add `HasMember` from the nearest enclosing scope, filling the
    /// ancestors passed on the way
    fn attach_to_scope(&mut self, symbol: SymbolRef, node: NodeId) -> Result<()> {
        let mut current = symbol;
        while let Some(parent) = self.parent(current)? {
            let Some(parent_node) = self.convert(parent)? else {
                break;
            };
            let parent_data = self.data(parent)?;
            if parent_data.kind == SymbolKind::Namespace {
                self.fill_member(parent, parent_node, true, false)?;
            } else if parent_data.is_metadata() {
                self.ctx.factory.set_name(parent_node, &parent_data.display)?;
                if let Some(member) = self.ctx.factory.get_mut(parent_node)?.member_mut() {
                    member.set_compiler_generated(true);
                }
                self.ctx.factory.set_filtered(parent_node)?;
            }
            if self.ctx.factory.get(parent_node)?.scope().is_some() {
                self.ctx
                    .factory
                    .safe_edge(parent_node, EdgeKind::Scope_HasMember, node)?;
                break;
            }
            current = parent;
        }
        Ok(())
    }

    fn fill_scope(&mut self, symbol: SymbolRef, node: NodeId, set_has_member: bool) -> Result<()> {
        self.fill_member(symbol, node, set_has_member, true)?;
        let is_anonymous = self.data(symbol)?.is_anonymous;
        self.ctx.factory.scope_mut(node)?.is_anonymous = is_anonymous;
        Ok(())
    }

    /// One `IsContainedIn` per declaring site
    fn add_positions(&mut self, symbol: SymbolRef, node: NodeId) -> Result<()> {
        for &site in &self.data(symbol)?.declarations {
            let site_data = self
                .source
                .site(site)
                .ok_or_else(|| Error::contract(format!("Unknown {}", site)))?;
            let Some(file) = self.create_file(&site_data.path)? else {
                continue;
            };
            let position = site_data.span.to_position(RealizationLevel::Defines);
            self.ctx.factory.safe_assoc_edge(
                node,
                EdgeKind::Member_IsContainedIn,
                file,
                Assoc::Position(position),
            )?;
        }
        Ok(())
    }

    fn fill_package(&mut self, symbol: SymbolRef, node: NodeId, set_has_member: bool) -> Result<()> {
        self.ctx.push_frame(symbol, node, FrameKind::Namespace);
        self.fill_scope(symbol, node, set_has_member)?;

        let data = self.data(symbol)?;
        if data.is_metadata() || data.is_global_namespace {
            return Ok(());
        }
        let component = self.ctx.component;
        for &site in &data.declarations {
            let Some(site_data) = self.source.site(site) else {
                continue;
            };
            if self.ctx.hard_filter.is_excluded(&site_data.path) {
                continue;
            }
            if let Some(&lines) = self.ctx.line_counts.get(&site_data.path) {
                let key = self.ctx.factory.strings_mut().set(&site_data.path);
                self.ctx.loc.record(component, key, lines);
            }
        }
        Ok(())
    }

    // =========================================================================
    // TYPES
    // =========================================================================

    /// Type node of a referenced type
    ///
    /// Source types go through their definition, which must be of the same
    /// kind; `None` when it cannot be resolved. Metadata types other than
    /// arrays are filtered.
    pub(crate) fn reference_type(&mut self, ty: SymbolRef) -> Result<Option<NodeId>> {
        let data = self.data(ty)?;
        if data.kind == SymbolKind::TypeParameter {
            return self.get_lim_type(ty, None).map(Some);
        }
        if data.is_metadata() {
            let id = self.get_lim_type(ty, None)?;
            if data.kind != SymbolKind::ArrayType {
                self.ctx.factory.set_filtered(id)?;
            }
            return Ok(Some(id));
        }
        let Some((definition, _)) = self.resolve_definition(ty)? else {
            debug!(symbol = %ty, display = %data.display, "Unresolvable type reference");
            return Ok(None);
        };
        if self.data(definition)?.kind != data.kind {
            return Ok(None);
        }
        let id = if data.kind == SymbolKind::NamedType && data.is_generic {
            self.get_lim_type(ty, Some(definition))?
        } else {
            self.get_lim_type(definition, None)?
        };
        Ok(Some(id))
    }

    fn fill_class(&mut self, symbol: SymbolRef, node: NodeId, set_has_member: bool) -> Result<()> {
        let data = self.data(symbol)?;
        self.ctx.push_frame(
            symbol,
            node,
            FrameKind::Class {
                is_interface: data.type_kind == TypeKind::Interface,
                subclasses: Vec::new(),
            },
        );
        self.fill_scope(symbol, node, set_has_member)?;
        let class = self.ctx.factory.class_mut(node)?;
        class.class_kind = class_kind(data.type_kind);
        class.is_abstract = data.is_abstract;

        let bases = data.base_type.iter().chain(data.interfaces.iter());
        for &base in bases {
            if self.data(base)?.kind == SymbolKind::ErrorType {
                continue;
            }
            if let Some(ty) = self.reference_type(base)? {
                if let Some(FrameKind::Class { subclasses, .. }) =
                    self.ctx.class_frame_mut().map(|f| &mut f.kind)
                {
                    subclasses.push(ty);
                }
            }
        }
        Ok(())
    }

    fn fill_class_generic(&mut self, symbol: SymbolRef, node: NodeId, set_has_member: bool) -> Result<()> {
        self.fill_class(symbol, node, set_has_member)?;
        self.fill_type_parameters(symbol)
    }

    fn fill_type_parameters(&mut self, symbol: SymbolRef) -> Result<()> {
        for &argument in &self.data(symbol)?.type_arguments {
            if self.data(argument)?.kind == SymbolKind::TypeParameter {
                self.build(argument, false)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // METHODS
    // =========================================================================

    fn fill_method(&mut self, symbol: SymbolRef, node: NodeId, set_has_member: bool) -> Result<()> {
        let data = self.data(symbol)?;
        let in_interface = self.ctx.in_interface();
        self.ctx.push_frame(symbol, node, FrameKind::Method);
        self.fill_scope(symbol, node, set_has_member)?;

        if in_interface {
            self.ctx.factory.member_mut(node)?.accessibility = AccessibilityKind::Public;
        }
        let method = self.ctx.factory.method_mut(node)?;
        method.is_abstract = data.is_abstract || in_interface;
        method.method_kind = declared_method_kind(data.method_kind, &data.name);
        method.is_virtual = data.is_virtual;

        if let Some(returns) = data.return_type {
            if let Some(ty) = self.reference_type(returns)? {
                self.ctx.factory.safe_edge(node, EdgeKind::Method_Returns, ty)?;
            }
            let display = &self.data(returns)?.display;
            self.append_mangled(node, display)?;
        }

        for &parameter in &data.parameters {
            self.build(parameter, false)?;
        }

        if let Some(overridden) = data.overridden {
            if let Some(target) = self.convert(overridden)? {
                if self.data(overridden)?.is_metadata() {
                    self.fill_metadata_names(overridden, target)?;
                    self.ctx.factory.set_filtered(target)?;
                }
                self.ctx.header.overrides.add(node, target);
            }
        }
        Ok(())
    }

    fn fill_method_generic(&mut self, symbol: SymbolRef, node: NodeId, set_has_member: bool) -> Result<()> {
        self.fill_type_parameters(symbol)?;
        self.fill_method(symbol, node, set_has_member)
    }

    // =========================================================================
    // ATTRIBUTES AND PARAMETERS
    // =========================================================================

    fn fill_attribute(&mut self, symbol: SymbolRef, node: NodeId, set_has_member: bool) -> Result<()> {
        let data = self.data(symbol)?;
        if !matches!(data.kind, SymbolKind::Field | SymbolKind::Event) {
            return Err(Error::contract(format!(
                "{} ({}) cannot fill an attribute",
                symbol, data.display
            )));
        }
        self.fill_member(symbol, node, set_has_member, true)?;
        if self.ctx.in_interface() {
            self.ctx.factory.member_mut(node)?.accessibility = AccessibilityKind::Public;
        }

        let ty = match data.value_type {
            Some(value) => {
                let value_data = self.data(value)?;
                if value_data.kind == SymbolKind::TypeParameter {
                    if let Some(parameter) = self.convert(value)? {
                        self.fill_generic_parameter(value, parameter)?;
                    }
                }
                self.append_mangled(node, &format!(" {}", value_data.display))?;
                match self.reference_type(value)? {
                    Some(ty) => ty,
                    None => self.unknown_type()?,
                }
            }
            None => self.unknown_type()?,
        };
        let has_type = match self.ctx.factory.get(node)? {
            Node::Attribute(d) => !d.has_type.is_empty(),
            _ => true,
        };
        if !has_type {
            self.ctx.factory.safe_edge(node, EdgeKind::Attribute_HasType, ty)?;
        }
        Ok(())
    }

    fn fill_generic_parameter(&mut self, symbol: SymbolRef, node: NodeId) -> Result<()> {
        let data = self.data(symbol)?;
        if let Node::GenericParameter(d) = self.ctx.factory.get_mut(node)? {
            d.kind = GenericParameterKind::Type;
        }
        for &constraint in &data.constraint_types {
            if let Some(ty) = self.reference_type(constraint)? {
                self.ctx.factory.safe_edge(
                    node,
                    EdgeKind::GenericParameter_HasParameterConstraint,
                    ty,
                )?;
            }
        }

        let Some(parent) = self.parent(symbol)? else {
            return Ok(());
        };
        let Some(parent_node) = self.convert(parent)? else {
            return Ok(());
        };
        if self.data(parent)?.is_metadata() {
            self.ctx.factory.set_filtered(parent_node)?;
        }
        let edge = match self.ctx.factory.kind(parent_node)? {
            NodeKind::ClassGeneric => EdgeKind::ClassGeneric_HasGenericParameter,
            NodeKind::MethodGeneric => EdgeKind::MethodGeneric_HasGenericParameter,
            _ => return Ok(()),
        };
        self.ctx.factory.safe_edge(parent_node, edge, node)?;
        Ok(())
    }

    fn fill_parameter(&mut self, symbol: SymbolRef, node: NodeId) -> Result<()> {
        let data = self.data(symbol)?;
        if let Some(kind) = parameter_kind(data.ref_kind) {
            if let Node::Parameter(d) = self.ctx.factory.get_mut(node)? {
                d.param_kind = kind;
            }
        }

        let ty = match data.value_type {
            Some(value) => self.reference_type(value)?,
            None => None,
        };
        let ty = match ty {
            Some(ty) => ty,
            None => self.unknown_type()?,
        };
        self.ctx.factory.safe_edge(node, EdgeKind::Parameter_HasType, ty)?;

        if let Some(method) = self.ctx.method_frame() {
            self.ctx
                .factory
                .safe_edge(method, EdgeKind::Method_HasParameter, node)?;
        }
        Ok(())
    }

    // =========================================================================
    // METADATA
    // =========================================================================

    /// Names and kinds for a member only known from referenced binaries
    pub fn fill_metadata_names(&mut self, symbol: SymbolRef, node: NodeId) -> Result<()> {
        let data = self.data(symbol)?;
        if self.ctx.factory.get(node)?.member().is_none() {
            return Ok(());
        }
        let display = self.ctx.factory.strings_mut().set(&data.display);
        self.ctx.factory.set_name(node, &data.name)?;
        let member = self.ctx.factory.member_mut(node)?;
        member.mangled_name = display;
        member.demangled_name = display;
        member.set_compiler_generated(true);

        let node_data = self.ctx.factory.get_mut(node)?;
        if let Some(class) = node_data.class_mut() {
            class.class_kind = class_kind(data.type_kind);
        } else if let Some(method) = node_data.method_mut() {
            method.method_kind = metadata_method_kind(data.method_kind);
        }
        Ok(())
    }

    /// Append `suffix` to both the mangled and demangled name
    fn append_mangled(&mut self, node: NodeId, suffix: &str) -> Result<()> {
        let factory = &mut self.ctx.factory;
        let current = factory.member(node)?.mangled_name;
        let extended = format!("{}{}", factory.strings().get(current), suffix);
        let key = factory.strings_mut().set(&extended);
        let member = factory.member_mut(node)?;
        member.mangled_name = key;
        member.demangled_name = key;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::filter::Filter;
    use crate::frontend::{SourceSpan, SpecialType, SymbolData, SymbolModel};
    use crate::lim::{LanguageKind, SourcePosition};

    fn builder() -> GraphBuilder {
        GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty())
    }

    #[test]
    fn test_method_kind_heuristic() {
        assert_eq!(
            declared_method_kind(SymbolMethodKind::PropertyGet, "get_Value"),
            MethodKind::Get
        );
        assert_eq!(
            declared_method_kind(SymbolMethodKind::Ordinary, "removeAll"),
            MethodKind::Remove
        );
        assert_eq!(
            declared_method_kind(SymbolMethodKind::Ordinary, "GetValue"),
            MethodKind::Normal
        );
        assert_eq!(
            declared_method_kind(SymbolMethodKind::Conversion, "op_Implicit"),
            MethodKind::Operator
        );
        assert_eq!(
            metadata_method_kind(SymbolMethodKind::EventRemove),
            MethodKind::Remove
        );
        assert_eq!(
            accessibility(Accessibility::ProtectedAndInternal),
            Some(AccessibilityKind::Internal)
        );
    }

    #[test]
    fn test_class_members_and_positions() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let ns = model.namespace(global, "App");
        let class = model.named_type(ns, "Widget", TypeKind::Class);
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let field = model.field(class, "count", int);
        model.declare("app", "src/Widget.cs", ns, SourceSpan::new(1, 1, 20, 2));
        model.declare("app", "src/Widget.cs", class, SourceSpan::new(3, 5, 19, 6));
        model.declare("app", "src/Widget.cs", field, SourceSpan::new(4, 9, 4, 20));

        let mut b = builder();
        let mut s = b.session(&model);
        let ns_node = s.build(ns, true).unwrap().unwrap();
        let class_node = s.build(class, true).unwrap().unwrap();
        let field_node = s.build(field, true).unwrap().unwrap();

        let factory = s.context().factory();
        assert_eq!(
            factory.targets(ns_node, EdgeKind::Scope_HasMember).unwrap(),
            vec![class_node]
        );
        assert_eq!(
            factory.targets(class_node, EdgeKind::Scope_HasMember).unwrap(),
            vec![field_node]
        );
        let positions = factory
            .assoc_targets(class_node, EdgeKind::Member_IsContainedIn)
            .unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(
            positions[0].1,
            Assoc::Position(SourcePosition {
                line: 3,
                column: 5,
                end_line: 19,
                end_column: 6,
                realization_level: RealizationLevel::Defines,
            })
        );
        let member = factory.member(field_node).unwrap();
        assert_eq!(factory.strings().get(member.mangled_name), "App.Widget.count int");
        let field_types = factory.targets(field_node, EdgeKind::Attribute_HasType).unwrap();
        assert_eq!(field_types.len(), 1);
    }

    #[test]
    fn test_interface_method_is_public_abstract() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let iface = model.named_type(global, "IShape", TypeKind::Interface);
        let double = model.metadata_type("System.Double", SpecialType::Double);
        let area = model.method(iface, "Area", Some(double));
        let scale = model.parameter(area, "factor", double);
        model.symbol_mut(scale).unwrap().ref_kind = RefKind::Ref;
        model.declare("geo", "IShape.cs", iface, SourceSpan::new(1, 1, 5, 2));
        model.declare("geo", "IShape.cs", area, SourceSpan::new(3, 5, 3, 30));

        let mut b = builder();
        let mut s = b.session(&model);
        s.build(iface, true).unwrap();
        let area_node = s.build(area, true).unwrap().unwrap();
        let scale_node = s.convert(scale).unwrap().unwrap();

        let factory = s.context().factory();
        let method = factory.get(area_node).unwrap().method().unwrap();
        assert!(method.is_abstract);
        assert_eq!(method.scope.member.accessibility, AccessibilityKind::Public);
        assert_eq!(method.returns.len(), 1);
        assert_eq!(
            factory.targets(area_node, EdgeKind::Method_HasParameter).unwrap(),
            vec![scale_node]
        );
        match factory.get(scale_node).unwrap() {
            Node::Parameter(d) => assert_eq!(d.param_kind, ParameterKind::InOut),
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn test_bases_flush_on_frame_close() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let base = model.named_type(global, "Base", TypeKind::Class);
        let derived = model.named_type(global, "Derived", TypeKind::Class);
        let disposable = model.metadata_type("System.IDisposable", SpecialType::None);
        model.symbol_mut(derived).unwrap().base_type = Some(base);
        model.symbol_mut(derived).unwrap().interfaces.push(disposable);
        model.declare("lib", "a.cs", base, SourceSpan::new(1, 1, 1, 20));
        model.declare("lib", "a.cs", derived, SourceSpan::new(2, 1, 2, 40));

        let mut b = builder();
        let stats = b.add_source(&model).unwrap();
        assert_eq!(stats.declarations, 2);

        let derived_node = b.context().node_of(derived).unwrap();
        let factory = b.factory();
        let bases = factory.targets(derived_node, EdgeKind::Class_IsSubclass).unwrap();
        assert_eq!(bases.len(), 2);
        assert_ne!(bases[0], crate::lim::ELIDED_ID);
        assert_eq!(bases[1], crate::lim::ELIDED_ID);
    }

    #[test]
    fn test_attribute_requires_field() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let class = model.named_type(global, "Holder", TypeKind::Class);
        let mut property = SymbolData::new(SymbolKind::Property, "Value");
        property.containing = Some(class);
        let property = model.add_symbol(property);

        let mut b = builder();
        let mut s = b.session(&model);
        let attribute = s.ctx.factory.create(NodeKind::Attribute).unwrap();
        let err = s.fill_attribute(property, attribute, false).unwrap_err();
        assert!(matches!(err, Error::ContractViolation { .. }));
    }

    #[test]
    fn test_generic_parameters_hang_off_definition() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let (list, params) = model.generic_type(global, "List", &["T"]);
        let object = model.metadata_type("System.Object", SpecialType::Object);
        model.symbol_mut(params[0]).unwrap().constraint_types.push(object);
        model.declare("lib", "List.cs", list, SourceSpan::new(1, 1, 9, 2));

        let mut b = builder();
        let mut s = b.session(&model);
        let list_node = s.build(list, true).unwrap().unwrap();
        let param_node = s.convert(params[0]).unwrap().unwrap();
        let factory = s.context().factory();
        assert_eq!(
            factory
                .targets(list_node, EdgeKind::ClassGeneric_HasGenericParameter)
                .unwrap(),
            vec![param_node]
        );
        assert_eq!(
            factory
                .targets(param_node, EdgeKind::GenericParameter_HasParameterConstraint)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_metadata_names() {
        let mut model = SymbolModel::new();
        let mut ctor = SymbolData::new(SymbolKind::Method, ".ctor");
        ctor.display = "System.Exception.Exception()".to_string();
        ctor.method_kind = SymbolMethodKind::Constructor;
        let ctor = model.add_symbol(ctor);

        let mut b = builder();
        let mut s = b.session(&model);
        let node = s.convert(ctor).unwrap().unwrap();
        s.fill_metadata_names(ctor, node).unwrap();
        let factory = s.context().factory();
        let method = factory.get(node).unwrap().method().unwrap();
        assert_eq!(method.method_kind, MethodKind::Constructor);
        assert!(method.scope.member.is_compiler_generated());
        assert_eq!(
            factory.strings().get(method.scope.member.mangled_name),
            "System.Exception.Exception()"
        );
    }
}
