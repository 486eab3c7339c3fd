//! Node Body Codec
//!
//! Per-level encoding of node bodies. Each level writes its parent level
//! first, then its scalars, then its edges. Lists and association lists
//! end with a `0` id; single edges are always written.
//!
//! @module lim/persist

use std::io::{Read, Seek, Write};

use super::factory::Factory;
use super::io::{BinaryReader, BinaryWriter};
use super::node::*;
use super::types::*;
use crate::core::error::{Error, Result};

// =============================================================================
// ENCODER
// =============================================================================

/// Writes node bodies, optionally replacing references to filtered nodes
/// with `ELIDED_ID`
pub(crate) struct NodeWriter<'a, 'w, W: Write + Seek> {
    w: &'w mut BinaryWriter<W>,
    factory: &'a Factory,
    elide_filtered: bool,
}

impl<'a, 'w, W: Write + Seek> NodeWriter<'a, 'w, W> {
    pub(crate) fn new(w: &'w mut BinaryWriter<W>, factory: &'a Factory, elide_filtered: bool) -> Self {
        Self {
            w,
            factory,
            elide_filtered,
        }
    }

    fn id(&self, id: NodeId) -> NodeId {
        if self.elide_filtered && id != NULL_ID {
            self.factory.effective_target(id)
        } else {
            id
        }
    }

    /// Write `(id, kind, body)` for one node
    pub(crate) fn write_node(&mut self, node: &Node) -> Result<()> {
        self.w.write_u32(node.id())?;
        self.w.write_u16(node.kind() as u16)?;
        self.write_body(node)
    }

    /// Write the `(0, 0)` end-of-nodes marker
    pub(crate) fn write_terminator(&mut self) -> Result<()> {
        self.w.write_u32(NULL_ID)?;
        self.w.write_u16(0)
    }

    fn single(&mut self, id: NodeId) -> Result<()> {
        let id = self.id(id);
        self.w.write_u32(id)
    }

    fn list(&mut self, ids: &[NodeId]) -> Result<()> {
        for &id in ids {
            self.single(id)?;
        }
        self.w.write_u32(NULL_ID)
    }

    fn type_args(&mut self, pairs: &[(NodeId, TypeArgumentConstraintKind)]) -> Result<()> {
        for &(id, tack) in pairs {
            self.single(id)?;
            self.w.write_u8(tack as u8)?;
        }
        self.w.write_u32(NULL_ID)
    }

    fn positions(&mut self, pairs: &[(NodeId, SourcePosition)]) -> Result<()> {
        for (id, pos) in pairs {
            self.single(*id)?;
            self.w.write_u32(pos.line)?;
            self.w.write_u32(pos.column)?;
            self.w.write_u32(pos.end_line)?;
            self.w.write_u32(pos.end_column)?;
            self.w.write_u8(pos.realization_level as u8)?;
        }
        self.w.write_u32(NULL_ID)
    }

    fn param_types(&mut self, pairs: &[(NodeId, ParameterKind)]) -> Result<()> {
        for &(id, kind) in pairs {
            self.single(id)?;
            self.w.write_u8(kind as u8)?;
        }
        self.w.write_u32(NULL_ID)
    }

    fn named(&mut self, d: &NamedData) -> Result<()> {
        self.w.write_u32(d.name)?;
        self.list(&d.depends_on)
    }

    fn member(&mut self, d: &MemberData) -> Result<()> {
        self.named(&d.named)?;
        self.w.write_u8(d.flags.bits())?;
        self.w.write_u8(d.accessibility as u8)?;
        self.w.write_u32(d.comment_lines)?;
        self.w.write_u32(d.demangled_name)?;
        self.w.write_u8(d.language as u8)?;
        self.w.write_u32(d.mangled_name)?;
        self.single(d.aggregated)?;
        self.single(d.declares)?;
        self.single(d.language_variant)?;
        self.list(&d.belongs_to)?;
        self.list(&d.compilation_unit)?;
        self.list(&d.has_comment)?;
        self.list(&d.instance)?;
        self.positions(&d.is_contained_in)?;
        self.list(&d.uses)?;
        self.list(&d.variant)
    }

    fn scope(&mut self, d: &ScopeData) -> Result<()> {
        self.member(&d.member)?;
        self.w.write_u8(d.is_anonymous as u8)?;
        self.w.write_u32(d.lloc)?;
        self.w.write_u32(d.loc)?;
        self.w.write_u32(d.tlloc)?;
        self.w.write_u32(d.tloc)?;
        self.list(&d.has_member)
    }

    fn class(&mut self, d: &ClassData) -> Result<()> {
        self.scope(&d.scope)?;
        self.w.write_u8(d.is_abstract as u8)?;
        self.w.write_u8(d.class_kind as u8)?;
        self.w.write_u32(d.object_size)?;
        self.list(&d.grants_friendship)?;
        self.list(&d.is_subclass)
    }

    fn class_generic(&mut self, d: &ClassGenericData) -> Result<()> {
        self.class(&d.class)?;
        self.list(&d.has_generic_parameter)
    }

    fn method(&mut self, d: &MethodData) -> Result<()> {
        self.scope(&d.scope)?;
        self.w.write_u32(d.distinct_operands)?;
        self.w.write_u32(d.distinct_operators)?;
        self.w.write_u8(((d.is_abstract as u8) << 1) | d.is_virtual as u8)?;
        self.w.write_u8(d.method_kind as u8)?;
        self.w.write_u16(d.nesting_level)?;
        self.w.write_u16(d.nesting_level_else_if)?;
        self.w.write_u32(d.number_of_branches)?;
        self.w.write_u32(d.number_of_statements)?;
        self.w.write_u32(d.total_operands)?;
        self.w.write_u32(d.total_operators)?;
        self.list(&d.accesses_attribute)?;
        self.list(&d.calls)?;
        self.list(&d.can_throw)?;
        self.list(&d.has_control_flow_block)?;
        self.list(&d.has_parameter)?;
        self.list(&d.instantiates)?;
        self.list(&d.returns)?;
        self.list(&d.throws)
    }

    fn method_generic(&mut self, d: &MethodGenericData) -> Result<()> {
        self.method(&d.method)?;
        self.list(&d.has_generic_parameter)
    }

    fn write_body(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Comment(d) => self.w.write_u32(d.text),
            Node::Component(d) => {
                self.named(&d.named)?;
                self.w.write_u32(d.tlloc)?;
                self.w.write_u32(d.tloc)?;
                self.w.write_u8(d.analysis_time as u8)?;
                self.w.write_u32(d.changeset_id)?;
                self.w.write_u32(d.short_name)?;
                self.list(&d.contains)?;
                self.list(&d.has_files)
            }
            Node::ControlFlowBlock(d) => {
                self.list(&d.calls)?;
                self.list(&d.pred)
            }
            Node::Attribute(d) => {
                self.member(&d.member)?;
                self.list(&d.calls)?;
                self.list(&d.has_type)
            }
            Node::AttributeAccess(d) => self.single(d.attribute),
            Node::Class(d) => self.class(d),
            Node::ClassGeneric(d) => self.class_generic(d),
            Node::ClassGenericInstance(d) => {
                self.class(&d.class)?;
                self.w.write_u8(d.is_real_instance as u8)?;
                self.type_args(&d.has_arguments)
            }
            Node::ClassGenericSpec(d) => {
                self.class_generic(&d.generic)?;
                self.type_args(&d.has_arguments)?;
                self.single(d.specialize)
            }
            Node::Friendship(d) => {
                self.w.write_u32(d.grantee)?;
                self.single(d.friend)
            }
            Node::GenericParameter(d) => {
                self.named(&d.named)?;
                self.w.write_u8(d.kind as u8)?;
                self.list(&d.has_parameter_constraint)
            }
            Node::Method(d) => self.method(d),
            Node::MethodCall(d) => self.single(d.method),
            Node::MethodGeneric(d) => self.method_generic(d),
            Node::MethodGenericInstance(d) => {
                self.method(&d.method)?;
                self.w.write_u8(d.is_real_instance as u8)?;
                self.type_args(&d.has_arguments)
            }
            Node::MethodGenericSpec(d) => {
                self.method_generic(&d.generic)?;
                self.type_args(&d.has_arguments)?;
                self.single(d.specialize)
            }
            Node::Package(d) => self.scope(&d.scope),
            Node::Parameter(d) => {
                self.named(&d.named)?;
                self.w.write_u8(d.param_kind as u8)?;
                self.single(d.has_type)
            }
            Node::File(d) => {
                self.named(&d.named)?;
                self.w.write_u32(d.cloc)?;
                self.w.write_u32(d.lloc)?;
                self.w.write_u32(d.loc)?;
                self.w.write_u32(d.number_of_branches)?;
                self.list(&d.has_comment)?;
                self.list(&d.includes)
            }
            Node::FileSystem(d) => {
                self.named(&d.named)?;
                self.list(&d.has_fs_entry)
            }
            Node::Folder(d) => {
                self.named(&d.named)?;
                self.list(&d.contains)
            }
            Node::SimpleType(d) => self.w.write_u8(d.kind as u8),
            Node::Type(d) => self.list(&d.has_type_former),
            Node::TypeFormerArray(_) | Node::TypeFormerNonType(_) => Ok(()),
            Node::TypeFormerMethod(d) => {
                self.param_types(&d.has_parameter_type)?;
                self.single(d.has_return_type)
            }
            Node::TypeFormerPointer(d) => self.w.write_u8(d.pointer_kind as u8),
            Node::TypeFormerType(d) => self.single(d.refers_to),
        }
    }
}

// =============================================================================
// DECODER
// =============================================================================

/// Reads node bodies written by [`NodeWriter`]
pub(crate) struct NodeReader<'r, R: Read + Seek> {
    r: &'r mut BinaryReader<R>,
}

fn bad_value(what: &str, value: u8) -> Error {
    Error::format(format!("Invalid {} value {}", what, value))
}

impl<'r, R: Read + Seek> NodeReader<'r, R> {
    pub(crate) fn new(r: &'r mut BinaryReader<R>) -> Self {
        Self { r }
    }

    /// Read the body of a node whose id and kind were already consumed
    pub(crate) fn read_node(&mut self, id: NodeId, kind: NodeKind) -> Result<Node> {
        let mut node = Node::new(kind, id).ok_or_else(|| {
            Error::format(format!("Abstract node kind {} for node {}", kind, id))
        })?;
        self.read_body(&mut node)?;
        Ok(node)
    }

    /// Read the next node, or `None` at the end-of-nodes marker
    pub(crate) fn read_next(&mut self) -> Result<Option<Node>> {
        let id = self.r.read_u32()?;
        let raw_kind = self.r.read_u16()?;
        if id == NULL_ID {
            if raw_kind != 0 {
                return Err(Error::format(format!("Bad node terminator kind {}", raw_kind)));
            }
            return Ok(None);
        }
        let kind = NodeKind::from_u16(raw_kind)
            .ok_or_else(|| Error::format(format!("Unknown node kind {} for node {}", raw_kind, id)))?;
        self.read_node(id, kind).map(Some)
    }

    fn u8_enum<T>(&mut self, what: &str, decode: fn(u8) -> Option<T>) -> Result<T> {
        let value = self.r.read_u8()?;
        decode(value).ok_or_else(|| bad_value(what, value))
    }

    fn flag(&mut self) -> Result<bool> {
        self.r.read_bool()
    }

    fn single(&mut self) -> Result<NodeId> {
        self.r.read_u32()
    }

    fn list(&mut self) -> Result<Vec<NodeId>> {
        let mut ids = Vec::new();
        loop {
            let id = self.r.read_u32()?;
            if id == NULL_ID {
                return Ok(ids);
            }
            ids.push(id);
        }
    }

    fn type_args(&mut self) -> Result<Vec<(NodeId, TypeArgumentConstraintKind)>> {
        let mut pairs = Vec::new();
        loop {
            let id = self.r.read_u32()?;
            if id == NULL_ID {
                return Ok(pairs);
            }
            let tack = self.u8_enum("type argument constraint", TypeArgumentConstraintKind::from_u8)?;
            pairs.push((id, tack));
        }
    }

    fn positions(&mut self) -> Result<Vec<(NodeId, SourcePosition)>> {
        let mut pairs = Vec::new();
        loop {
            let id = self.r.read_u32()?;
            if id == NULL_ID {
                return Ok(pairs);
            }
            let pos = SourcePosition {
                line: self.r.read_u32()?,
                column: self.r.read_u32()?,
                end_line: self.r.read_u32()?,
                end_column: self.r.read_u32()?,
                realization_level: self.u8_enum("realization level", RealizationLevel::from_u8)?,
            };
            pairs.push((id, pos));
        }
    }

    fn param_types(&mut self) -> Result<Vec<(NodeId, ParameterKind)>> {
        let mut pairs = Vec::new();
        loop {
            let id = self.r.read_u32()?;
            if id == NULL_ID {
                return Ok(pairs);
            }
            let kind = self.u8_enum("parameter kind", ParameterKind::from_u8)?;
            pairs.push((id, kind));
        }
    }

    fn named(&mut self, d: &mut NamedData) -> Result<()> {
        d.name = self.r.read_u32()?;
        d.depends_on = self.list()?;
        Ok(())
    }

    fn member(&mut self, d: &mut MemberData) -> Result<()> {
        self.named(&mut d.named)?;
        let bits = self.r.read_u8()?;
        d.flags = MemberFlags::from_bits(bits).ok_or_else(|| bad_value("member flags", bits))?;
        d.accessibility = self.u8_enum("accessibility", AccessibilityKind::from_u8)?;
        d.comment_lines = self.r.read_u32()?;
        d.demangled_name = self.r.read_u32()?;
        d.language = self.u8_enum("language", LanguageKind::from_u8)?;
        d.mangled_name = self.r.read_u32()?;
        d.aggregated = self.single()?;
        d.declares = self.single()?;
        d.language_variant = self.single()?;
        d.belongs_to = self.list()?;
        d.compilation_unit = self.list()?;
        d.has_comment = self.list()?;
        d.instance = self.list()?;
        d.is_contained_in = self.positions()?;
        d.uses = self.list()?;
        d.variant = self.list()?;
        Ok(())
    }

    fn scope(&mut self, d: &mut ScopeData) -> Result<()> {
        self.member(&mut d.member)?;
        d.is_anonymous = self.flag()?;
        d.lloc = self.r.read_u32()?;
        d.loc = self.r.read_u32()?;
        d.tlloc = self.r.read_u32()?;
        d.tloc = self.r.read_u32()?;
        d.has_member = self.list()?;
        Ok(())
    }

    fn class(&mut self, d: &mut ClassData) -> Result<()> {
        self.scope(&mut d.scope)?;
        d.is_abstract = self.flag()?;
        d.class_kind = self.u8_enum("class kind", ClassKind::from_u8)?;
        d.object_size = self.r.read_u32()?;
        d.grants_friendship = self.list()?;
        d.is_subclass = self.list()?;
        Ok(())
    }

    fn class_generic(&mut self, d: &mut ClassGenericData) -> Result<()> {
        self.class(&mut d.class)?;
        d.has_generic_parameter = self.list()?;
        Ok(())
    }

    fn method(&mut self, d: &mut MethodData) -> Result<()> {
        self.scope(&mut d.scope)?;
        d.distinct_operands = self.r.read_u32()?;
        d.distinct_operators = self.r.read_u32()?;
        let flags = self.r.read_u8()?;
        d.is_abstract = flags & 0b10 != 0;
        d.is_virtual = flags & 0b01 != 0;
        d.method_kind = self.u8_enum("method kind", MethodKind::from_u8)?;
        d.nesting_level = self.r.read_u16()?;
        d.nesting_level_else_if = self.r.read_u16()?;
        d.number_of_branches = self.r.read_u32()?;
        d.number_of_statements = self.r.read_u32()?;
        d.total_operands = self.r.read_u32()?;
        d.total_operators = self.r.read_u32()?;
        d.accesses_attribute = self.list()?;
        d.calls = self.list()?;
        d.can_throw = self.list()?;
        d.has_control_flow_block = self.list()?;
        d.has_parameter = self.list()?;
        d.instantiates = self.list()?;
        d.returns = self.list()?;
        d.throws = self.list()?;
        Ok(())
    }

    fn method_generic(&mut self, d: &mut MethodGenericData) -> Result<()> {
        self.method(&mut d.method)?;
        d.has_generic_parameter = self.list()?;
        Ok(())
    }

    fn read_body(&mut self, node: &mut Node) -> Result<()> {
        match node {
            Node::Comment(d) => d.text = self.r.read_u32()?,
            Node::Component(d) => {
                self.named(&mut d.named)?;
                d.tlloc = self.r.read_u32()?;
                d.tloc = self.r.read_u32()?;
                d.analysis_time = self.u8_enum("analysis time", AnalysisTimeKind::from_u8)?;
                d.changeset_id = self.r.read_u32()?;
                d.short_name = self.r.read_u32()?;
                d.contains = self.list()?;
                d.has_files = self.list()?;
            }
            Node::ControlFlowBlock(d) => {
                d.calls = self.list()?;
                d.pred = self.list()?;
            }
            Node::Attribute(d) => {
                self.member(&mut d.member)?;
                d.calls = self.list()?;
                d.has_type = self.list()?;
            }
            Node::AttributeAccess(d) => d.attribute = self.single()?,
            Node::Class(d) => self.class(d)?,
            Node::ClassGeneric(d) => self.class_generic(d)?,
            Node::ClassGenericInstance(d) => {
                self.class(&mut d.class)?;
                d.is_real_instance = self.flag()?;
                d.has_arguments = self.type_args()?;
            }
            Node::ClassGenericSpec(d) => {
                self.class_generic(&mut d.generic)?;
                d.has_arguments = self.type_args()?;
                d.specialize = self.single()?;
            }
            Node::Friendship(d) => {
                d.grantee = self.r.read_u32()?;
                d.friend = self.single()?;
            }
            Node::GenericParameter(d) => {
                self.named(&mut d.named)?;
                d.kind = self.u8_enum("generic parameter kind", GenericParameterKind::from_u8)?;
                d.has_parameter_constraint = self.list()?;
            }
            Node::Method(d) => self.method(d)?,
            Node::MethodCall(d) => d.method = self.single()?,
            Node::MethodGeneric(d) => self.method_generic(d)?,
            Node::MethodGenericInstance(d) => {
                self.method(&mut d.method)?;
                d.is_real_instance = self.flag()?;
                d.has_arguments = self.type_args()?;
            }
            Node::MethodGenericSpec(d) => {
                self.method_generic(&mut d.generic)?;
                d.has_arguments = self.type_args()?;
                d.specialize = self.single()?;
            }
            Node::Package(d) => self.scope(&mut d.scope)?,
            Node::Parameter(d) => {
                self.named(&mut d.named)?;
                d.param_kind = self.u8_enum("parameter kind", ParameterKind::from_u8)?;
                d.has_type = self.single()?;
            }
            Node::File(d) => {
                self.named(&mut d.named)?;
                d.cloc = self.r.read_u32()?;
                d.lloc = self.r.read_u32()?;
                d.loc = self.r.read_u32()?;
                d.number_of_branches = self.r.read_u32()?;
                d.has_comment = self.list()?;
                d.includes = self.list()?;
            }
            Node::FileSystem(d) => {
                self.named(&mut d.named)?;
                d.has_fs_entry = self.list()?;
            }
            Node::Folder(d) => {
                self.named(&mut d.named)?;
                d.contains = self.list()?;
            }
            Node::SimpleType(d) => d.kind = self.u8_enum("simple type kind", SimpleTypeKind::from_u8)?,
            Node::Type(d) => d.has_type_former = self.list()?,
            Node::TypeFormerArray(_) | Node::TypeFormerNonType(_) => {}
            Node::TypeFormerMethod(d) => {
                d.has_parameter_type = self.param_types()?;
                d.has_return_type = self.single()?;
            }
            Node::TypeFormerPointer(d) => {
                d.pointer_kind = self.u8_enum("pointer kind", PointerKind::from_u8)?
            }
            Node::TypeFormerType(d) => d.refers_to = self.single()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lim::edges::Assoc;
    use std::io::Cursor;

    fn reencode(factory: &Factory, id: NodeId, elide: bool) -> Node {
        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        NodeWriter::new(&mut w, factory, elide)
            .write_node(factory.get(id).unwrap())
            .unwrap();
        let bytes = w.into_inner().into_inner();

        let mut r = BinaryReader::new(Cursor::new(bytes));
        let id = r.read_u32().unwrap();
        let kind = NodeKind::from_u16(r.read_u16().unwrap()).unwrap();
        NodeReader::new(&mut r).read_node(id, kind).unwrap()
    }

    #[test]
    fn test_method_body_survives_encoding() {
        let mut f = Factory::new();
        let method = f.create(NodeKind::MethodGenericSpec).unwrap();
        let param = f.create(NodeKind::Parameter).unwrap();
        let ty = f.create(NodeKind::Type).unwrap();
        let file = f.create_file("src/a.cs").unwrap();
        f.set_name(method, "Run").unwrap();
        {
            let m = f.method_mut(method).unwrap();
            m.is_virtual = true;
            m.method_kind = MethodKind::Get;
            m.nesting_level_else_if = 3;
            m.scope.member.set_static(true);
            m.scope.member.accessibility = AccessibilityKind::Public;
        }
        f.add_edge(method, EdgeKind::Method_HasParameter, param).unwrap();
        f.add_edge(method, EdgeKind::Method_Returns, ty).unwrap();
        f.add_assoc_edge(
            method,
            EdgeKind::MethodGenericSpec_HasArguments,
            ty,
            Assoc::TypeArgument(TypeArgumentConstraintKind::Unbounded),
        )
        .unwrap();
        let pos = SourcePosition {
            line: 3,
            column: 5,
            end_line: 9,
            end_column: 2,
            realization_level: RealizationLevel::Defines,
        };
        f.add_assoc_edge(method, EdgeKind::Member_IsContainedIn, file, Assoc::Position(pos))
            .unwrap();

        let decoded = reencode(&f, method, false);
        assert_eq!(&decoded, f.get(method).unwrap());
    }

    #[test]
    fn test_elided_references() {
        let mut f = Factory::new();
        let class = f.create(NodeKind::Class).unwrap();
        let hidden = f.create(NodeKind::Class).unwrap();
        f.add_edge(class, EdgeKind::Scope_HasMember, hidden).unwrap();
        f.set_filtered(hidden).unwrap();

        let Node::Class(d) = reencode(&f, class, true) else {
            panic!("expected a class");
        };
        assert_eq!(d.scope.has_member, vec![ELIDED_ID]);

        let Node::Class(d) = reencode(&f, class, false) else {
            panic!("expected a class");
        };
        assert_eq!(d.scope.has_member, vec![hidden]);
    }

    #[test]
    fn test_bad_enum_byte_is_format_error() {
        let mut bytes = Vec::new();
        bytes.push(200u8);
        let mut r = BinaryReader::new(Cursor::new(bytes));
        assert!(matches!(
            NodeReader::new(&mut r).read_node(150, NodeKind::SimpleType),
            Err(Error::Format { .. })
        ));
    }
}
