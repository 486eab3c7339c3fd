//! Generic Instantiation Cache
//!
//! Constructed generic types and methods become instance nodes keyed by
//! their display text, so `A<int>` met through different symbols resolves
//! to one node with one set of argument edges.
//!
//! @module builder/generics

use tracing::debug;

use super::Session;
use crate::core::error::Result;
use crate::frontend::{SymbolData, SymbolKind, SymbolRef, SymbolSource};
use crate::lim::{Assoc, EdgeKind, Node, NodeId, NodeKind, TypeArgumentConstraintKind};

impl<'a, S: SymbolSource + ?Sized> Session<'a, S> {
    /// `ClassGenericInstance` for a constructed type
    ///
    /// `refers_to` overrides the generic definition the instance hangs off.
    pub fn get_or_create_class_instance(
        &mut self,
        symbol: SymbolRef,
        refers_to: Option<SymbolRef>,
    ) -> Result<NodeId> {
        let data = self.data(symbol)?;
        if let Some(&id) = self.ctx.class_instances.get(&data.display) {
            return Ok(id);
        }

        let instance = self.create_instance_node(NodeKind::ClassGenericInstance, data)?;
        // cached before wiring: arguments may mention the instance itself
        self.ctx.class_instances.insert(data.display.clone(), instance);

        let Some(owner_symbol) = refers_to.or(data.original_definition) else {
            debug!(%symbol, display = %data.display, "Generic instance without a definition");
            return Ok(instance);
        };
        let owner = match self.convert(owner_symbol)? {
            Some(owner) if self.ctx.factory.kind(owner)?.is_a(NodeKind::Class) => owner,
            _ => {
                debug!(%symbol, owner = %owner_symbol, "Generic definition is not a class");
                return Ok(instance);
            }
        };
        if self.data(owner_symbol)?.is_metadata() {
            self.fill_metadata_names(owner_symbol, owner)?;
            self.ctx.factory.set_filtered(owner)?;
        }

        self.ctx
            .factory
            .safe_edge(owner, EdgeKind::Member_Instance, instance)?;
        self.add_type_arguments(
            instance,
            data,
            owner_symbol,
            EdgeKind::ClassGenericInstance_HasArguments,
        )?;
        Ok(instance)
    }

    /// `MethodGenericInstance` for a constructed method; `None` when its
    /// definition has no node
    pub fn get_or_create_method_instance(
        &mut self,
        symbol: SymbolRef,
        refers_to: Option<SymbolRef>,
    ) -> Result<Option<NodeId>> {
        let data = self.data(symbol)?;
        if let Some(&id) = self.ctx.method_instances.get(&data.display) {
            return Ok(Some(id));
        }
        let Some(owner_symbol) = refers_to.or(data.original_definition) else {
            return Ok(None);
        };
        let Some(owner) = self.convert(owner_symbol)? else {
            return Ok(None);
        };

        let instance = self.create_instance_node(NodeKind::MethodGenericInstance, data)?;
        if self.ctx.factory.kind(owner)?.is_a(NodeKind::Method) {
            self.ctx
                .factory
                .safe_edge(owner, EdgeKind::Member_Instance, instance)?;
            self.add_type_arguments(
                instance,
                data,
                owner_symbol,
                EdgeKind::MethodGenericInstance_HasArguments,
            )?;
        }
        self.ctx.method_instances.insert(data.display.clone(), instance);
        Ok(Some(instance))
    }

    /// `MethodGenericSpec` for a generic method used with type parameters
    /// as arguments
    pub fn get_or_create_method_specialization(
        &mut self,
        symbol: SymbolRef,
        generic: SymbolRef,
    ) -> Result<Option<NodeId>> {
        let data = self.data(symbol)?;
        if let Some(&id) = self.ctx.method_specializations.get(&data.display) {
            return Ok(Some(id));
        }
        let Some(target) = self.convert(generic)? else {
            return Ok(None);
        };
        if self.ctx.factory.kind(target)? != NodeKind::MethodGeneric {
            debug!(%symbol, "Specialized method is not generic");
            return Ok(None);
        }

        let spec = self.create_instance_node(NodeKind::MethodGenericSpec, data)?;
        self.ctx
            .factory
            .add_edge(spec, EdgeKind::MethodGenericSpec_Specialize, target)?;
        self.add_type_arguments(spec, data, generic, EdgeKind::MethodGenericSpec_HasArguments)?;
        self.ctx
            .method_specializations
            .insert(data.display.clone(), spec);
        Ok(Some(spec))
    }

    fn create_instance_node(&mut self, kind: NodeKind, data: &SymbolData) -> Result<NodeId> {
        let language = self.ctx.language;
        let factory = &mut self.ctx.factory;
        let id = factory.create(kind)?;
        factory.set_name(id, data.minimal_name())?;
        let display = factory.strings_mut().set(&data.display);
        let member = factory.member_mut(id)?;
        member.mangled_name = display;
        member.demangled_name = display;
        member.language = language;
        match factory.get_mut(id)? {
            Node::ClassGenericInstance(d) => d.is_real_instance = true,
            Node::MethodGenericInstance(d) => d.is_real_instance = true,
            _ => {}
        }
        Ok(id)
    }

    /// One argument edge per distinct argument type, in order
    ///
    /// An argument whose parameter carries constraints is `Unbounded`,
    /// otherwise `UpperBounded`.
    fn add_type_arguments(
        &mut self,
        id: NodeId,
        data: &SymbolData,
        definition: SymbolRef,
        edge: EdgeKind,
    ) -> Result<()> {
        let parameters = &self.data(definition)?.type_parameters;
        let parameters = if parameters.is_empty() {
            &data.type_parameters
        } else {
            parameters
        };

        for (index, &argument) in data.type_arguments.iter().enumerate() {
            let arg = self.data(argument)?;
            let mut target = argument;
            if !arg.is_metadata() && arg.kind != SymbolKind::TypeParameter {
                if let Some((definition, _)) = self.resolve_definition(argument)? {
                    if !(arg.kind == SymbolKind::NamedType && arg.is_generic) {
                        target = definition;
                    }
                }
            }
            let ty = self.get_lim_type(target, None)?;

            let constrained = match parameters.get(index) {
                Some(&p) => !self.data(p)?.constraint_types.is_empty(),
                None => false,
            };
            let tag = if constrained {
                TypeArgumentConstraintKind::Unbounded
            } else {
                TypeArgumentConstraintKind::UpperBounded
            };

            let present = self
                .ctx
                .factory
                .get(id)?
                .arguments()
                .map_or(false, |args| args.iter().any(|(t, _)| *t == ty));
            if !present {
                self.ctx
                    .factory
                    .add_assoc_edge(id, edge, ty, Assoc::TypeArgument(tag))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;
    use crate::filter::Filter;
    use crate::frontend::{SpecialType, SymbolData, SymbolKind, SymbolModel, TypeKind};
    use crate::lim::{Assoc, EdgeKind, LanguageKind, Node, NodeKind, TypeArgumentConstraintKind};

    fn builder() -> GraphBuilder {
        GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty())
    }

    #[test]
    fn test_class_instance_is_shared() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let (list, _) = model.generic_type(global, "List", &["T"]);
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let int_again = model.metadata_type("System.Int32", SpecialType::Int32);
        let a = model.construct(list, &[int]);
        let b = model.construct(list, &[int_again]);

        let mut gb = builder();
        let mut s = gb.session(&model);
        let i1 = s.get_or_create_class_instance(a, None).unwrap();
        let i2 = s.get_or_create_class_instance(b, None).unwrap();
        assert_eq!(i1, i2);

        let factory = s.context().factory();
        let args = factory
            .assoc_targets(i1, EdgeKind::ClassGenericInstance_HasArguments)
            .unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(
            args[0].1,
            Assoc::TypeArgument(TypeArgumentConstraintKind::UpperBounded)
        );
        let owner = s.convert(list).unwrap().unwrap();
        let factory = s.context().factory();
        assert_eq!(factory.kind(owner).unwrap(), NodeKind::ClassGeneric);
        assert_eq!(
            factory.targets(owner, EdgeKind::Member_Instance).unwrap(),
            vec![i1]
        );
        match factory.get(i1).unwrap() {
            Node::ClassGenericInstance(d) => assert!(d.is_real_instance),
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert_eq!(factory.name(i1), "List<int>");
    }

    #[test]
    fn test_repeated_argument_gets_one_edge() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let (pair, params) = model.generic_type(global, "Pair", &["K", "V"]);
        let string = model.metadata_type("System.String", SpecialType::String);
        model
            .symbol_mut(params[1])
            .unwrap()
            .constraint_types
            .push(string);
        let p = model.construct(pair, &[string, string]);

        let mut gb = builder();
        let mut s = gb.session(&model);
        let instance = s.get_or_create_class_instance(p, None).unwrap();
        let args = s
            .context()
            .factory()
            .assoc_targets(instance, EdgeKind::ClassGenericInstance_HasArguments)
            .unwrap();
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_constrained_parameter_is_unbounded() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let (boxed, params) = model.generic_type(global, "Box", &["T"]);
        let object = model.metadata_type("System.Object", SpecialType::Object);
        model
            .symbol_mut(params[0])
            .unwrap()
            .constraint_types
            .push(object);
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let b = model.construct(boxed, &[int]);

        let mut gb = builder();
        let mut s = gb.session(&model);
        let instance = s.get_or_create_class_instance(b, None).unwrap();
        let args = s
            .context()
            .factory()
            .assoc_targets(instance, EdgeKind::ClassGenericInstance_HasArguments)
            .unwrap();
        assert_eq!(
            args[0].1,
            Assoc::TypeArgument(TypeArgumentConstraintKind::Unbounded)
        );
    }

    #[test]
    fn test_method_instance_and_specialization() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let host = model.named_type(global, "Host", TypeKind::Class);
        let (generic, params) = model.generic_method(host, "Map", &["T"]);
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let constructed = model.construct(generic, &[int]);
        let open = model.construct(generic, &[params[0]]);

        let mut gb = builder();
        let mut s = gb.session(&model);
        let instance = s
            .get_or_create_method_instance(constructed, None)
            .unwrap()
            .unwrap();
        assert_eq!(
            s.get_or_create_method_instance(constructed, None).unwrap(),
            Some(instance)
        );
        let spec = s
            .get_or_create_method_specialization(open, generic)
            .unwrap()
            .unwrap();

        let owner = s.convert(generic).unwrap().unwrap();
        let factory = s.context().factory();
        assert_eq!(factory.kind(instance).unwrap(), NodeKind::MethodGenericInstance);
        assert_eq!(
            factory.targets(owner, EdgeKind::Member_Instance).unwrap(),
            vec![instance]
        );
        assert_eq!(
            factory.target(spec, EdgeKind::MethodGenericSpec_Specialize).unwrap(),
            owner
        );
        assert_eq!(
            factory
                .targets(spec, EdgeKind::MethodGenericSpec_HasArguments)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_unknown_definition_yields_bare_instance() {
        let mut model = SymbolModel::new();
        let mut orphan = SymbolData::new(SymbolKind::NamedType, "Orphan");
        orphan.is_generic = true;
        orphan.display = "Orphan<int>".to_string();
        let orphan = model.add_symbol(orphan);

        let mut gb = builder();
        let mut s = gb.session(&model);
        let instance = s.get_or_create_class_instance(orphan, None).unwrap();
        assert!(s
            .context()
            .factory()
            .targets(instance, EdgeKind::ClassGenericInstance_HasArguments)
            .unwrap()
            .is_empty());
        assert_eq!(s.get_or_create_method_instance(orphan, None).unwrap(), None);
    }
}
