//! Method Body Facts
//!
//! Applies what a front end saw inside a method body: calls, thrown and
//! instantiated types, attribute accesses and the size metrics.
//!
//! @module builder/collect

use tracing::debug;

use super::Session;
use crate::core::error::{Error, Result};
use crate::frontend::{MethodBody, SymbolKind, SymbolRef, SymbolSource};
use crate::lim::{EdgeKind, NodeId, NodeKind};

impl<'a, S: SymbolSource + ?Sized> Session<'a, S> {
    /// Attach the facts of one method body to its method node
    pub fn apply_method_body(&mut self, body: &MethodBody) -> Result<()> {
        let method = self.convert_required(body.method)?;
        if !self.ctx.factory.kind(method)?.is_a(NodeKind::Method) {
            return Err(Error::contract(format!(
                "Body owner {} is not a method",
                body.method
            )));
        }

        let data = self.ctx.factory.method_mut(method)?;
        data.nesting_level = body.nesting_level;
        data.nesting_level_else_if = body.nesting_level_else_if;
        data.number_of_branches = body.branches;
        data.number_of_statements = body.statements;

        for &callee in &body.calls {
            self.add_call(method, callee)?;
        }
        for (edge, types) in [
            (EdgeKind::Method_Throws, &body.throws),
            (EdgeKind::Method_CanThrow, &body.can_throw),
            (EdgeKind::Method_Instantiates, &body.instantiates),
        ] {
            for &ty in types {
                self.add_type_use(method, edge, ty)?;
            }
        }
        for &field in &body.accesses {
            self.add_access(method, field)?;
        }
        Ok(())
    }

    /// Node a call site refers to: the instance or specialization for
    /// constructed generic methods, the method itself otherwise
    fn callee_node(&mut self, callee: SymbolRef) -> Result<Option<NodeId>> {
        let data = self.data(callee)?;
        let constructed = match data.original_definition {
            Some(definition) if data.is_generic && definition != callee => definition,
            _ => return self.convert(callee),
        };

        let mut open = false;
        for &argument in &data.type_arguments {
            if self.data(argument)?.kind == SymbolKind::TypeParameter {
                open = true;
                break;
            }
        }
        if open {
            return self.get_or_create_method_specialization(callee, constructed);
        }
        let refers_to = match self.resolve_definition(constructed)? {
            Some((definition, _)) => definition,
            None => constructed,
        };
        self.get_or_create_method_instance(callee, Some(refers_to))
    }

    fn add_call(&mut self, method: NodeId, callee: SymbolRef) -> Result<()> {
        let Some(target) = self.callee_node(callee)? else {
            debug!(%callee, "Call target has no graph representation");
            return Ok(());
        };
        if !self.ctx.factory.kind(target)?.is_a(NodeKind::Method) {
            debug!(%callee, "Call target is not a method");
            return Ok(());
        }
        let call = self.ctx.factory.create_method_call(target)?;
        self.ctx.factory.safe_edge(method, EdgeKind::Method_Calls, call)?;

        let data = self.data(callee)?;
        let origin = match data.original_definition {
            Some(definition) if data.is_generic => definition,
            _ => callee,
        };
        if self.data(origin)?.is_metadata() {
            self.fill_metadata_names(callee, target)?;
            self.ctx.factory.set_filtered(target)?;
            self.ctx.factory.set_filtered(call)?;
        }
        Ok(())
    }

    fn add_type_use(&mut self, method: NodeId, edge: EdgeKind, ty: SymbolRef) -> Result<()> {
        let id = self.get_lim_type(ty, None)?;
        if self.data(ty)?.is_metadata() {
            self.ctx.factory.set_filtered(id)?;
        }
        self.ctx.factory.safe_edge(method, edge, id)?;
        Ok(())
    }

    fn add_access(&mut self, method: NodeId, field: SymbolRef) -> Result<()> {
        let Some(attribute) = self.convert(field)? else {
            return Ok(());
        };
        if self.ctx.factory.kind(attribute)? != NodeKind::Attribute {
            debug!(%field, "Accessed symbol is not an attribute");
            return Ok(());
        }
        let access = self.ctx.factory.create_attribute_access(attribute)?;
        self.ctx
            .factory
            .safe_edge(method, EdgeKind::Method_AccessesAttribute, access)?;
        if self.data(field)?.is_metadata() {
            self.ctx.factory.set_filtered(access)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;
    use crate::filter::Filter;
    use crate::frontend::{MethodBody, SourceSpan, SpecialType, SymbolModel, TypeKind};
    use crate::lim::{EdgeKind, LanguageKind, NodeKind, ELIDED_ID};

    #[test]
    fn test_body_facts() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let class = model.named_type(global, "Worker", TypeKind::Class);
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let exception = model.metadata_type("System.Exception", SpecialType::None);
        let count = model.field(class, "count", int);
        let run = model.method(class, "Run", None);
        let helper = model.method(class, "Helper", None);
        let console = model.metadata_type("System.Console", SpecialType::None);
        let write = model.method(console, "WriteLine", None);
        for symbol in [class, count, run, helper] {
            model.declare("app", "Worker.cs", symbol, SourceSpan::new(1, 1, 30, 1));
        }
        model.add_body(
            "app",
            "Worker.cs",
            MethodBody {
                method: run,
                calls: vec![helper, write, helper],
                throws: vec![exception],
                instantiates: vec![exception],
                accesses: vec![count],
                nesting_level: 2,
                branches: 3,
                statements: 11,
                ..MethodBody::default()
            },
        );

        let mut b = GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty());
        let stats = b.add_source(&model).unwrap();
        assert_eq!(stats.bodies, 1);

        let run_node = b.context().node_of(run).unwrap();
        let helper_node = b.context().node_of(helper).unwrap();
        let factory = b.factory();
        let method = factory.get(run_node).unwrap().method().unwrap();
        assert_eq!(method.nesting_level, 2);
        assert_eq!(method.number_of_branches, 3);
        assert_eq!(method.number_of_statements, 11);

        let calls = factory.targets(run_node, EdgeKind::Method_Calls).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            factory.target(calls[0], EdgeKind::MethodCall_Method).unwrap(),
            helper_node
        );
        assert_eq!(calls[1], ELIDED_ID);

        assert_eq!(factory.targets(run_node, EdgeKind::Method_Throws).unwrap(), vec![ELIDED_ID]);
        let accesses = factory
            .targets(run_node, EdgeKind::Method_AccessesAttribute)
            .unwrap();
        assert_eq!(accesses.len(), 1);
        assert_eq!(factory.kind(accesses[0]).unwrap(), NodeKind::AttributeAccess);
    }

    #[test]
    fn test_generic_call_uses_instance() {
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let class = model.named_type(global, "Util", TypeKind::Class);
        let (map, _) = model.generic_method(class, "Map", &["T"]);
        let int = model.metadata_type("System.Int32", SpecialType::Int32);
        let map_int = model.construct(map, &[int]);
        let caller = model.method(class, "Caller", None);
        for symbol in [class, map, caller] {
            model.declare("app", "Util.cs", symbol, SourceSpan::new(1, 1, 10, 1));
        }
        model.add_body(
            "app",
            "Util.cs",
            MethodBody {
                method: caller,
                calls: vec![map_int, map_int],
                ..MethodBody::default()
            },
        );

        let mut b = GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty());
        b.add_source(&model).unwrap();
        let caller_node = b.context().node_of(caller).unwrap();
        let factory = b.factory();
        let calls = factory.targets(caller_node, EdgeKind::Method_Calls).unwrap();
        assert_eq!(calls.len(), 1);
        let target = factory.target(calls[0], EdgeKind::MethodCall_Method).unwrap();
        assert_eq!(factory.kind(target).unwrap(), NodeKind::MethodGenericInstance);
    }
}
