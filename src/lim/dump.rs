//! LIMML Dump
//!
//! XML-like text rendering of a graph for inspection and diffing. Nodes
//! reachable through tree edges are nested under their owner; every other
//! edge becomes a `ref` element. The output is not meant to be read back.
//!
//! @module lim/dump

use std::io::Write;

use super::edges::{self, Assoc};
use super::factory::Factory;
use super::node::Node;
use super::types::*;
use crate::core::error::Result;

/// Edges whose targets are dumped nested inside their source
const TREE_EDGES: &[EdgeKind] = &[
    EdgeKind::Scope_HasMember,
    EdgeKind::Method_HasParameter,
    EdgeKind::Method_HasControlFlowBlock,
    EdgeKind::FileSystem_HasFSEntry,
    EdgeKind::Folder_Contains,
    EdgeKind::Component_Contains,
];

/// Dump switches
#[derive(Debug, Clone, Copy)]
pub struct DumpOptions {
    /// Never dump a node twice; repeated tree children become refs
    pub safe_mode: bool,
    /// After the trees, dump every node not reached through them
    pub special_nodes: bool,
    /// Dump filtered nodes instead of skipping them
    pub include_filtered: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            safe_mode: true,
            special_nodes: true,
            include_filtered: false,
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn element_name(kind: NodeKind) -> String {
    use NodeKind::*;
    let namespace = match kind {
        Comment | Component | ControlFlowBlock => "base",
        File | FileSystem | Folder => "physical",
        SimpleType | Type | TypeFormerArray | TypeFormerMethod | TypeFormerNonType
        | TypeFormerPointer | TypeFormerType => "type",
        _ => "logical",
    };
    format!("{}:{}", namespace, kind)
}

struct LimmlWriter<'a, W: Write> {
    out: W,
    factory: &'a Factory,
    options: DumpOptions,
    visited: Vec<bool>,
    depth: usize,
}

impl<'a, W: Write> LimmlWriter<'a, W> {
    fn indent(&mut self) -> Result<()> {
        for _ in 0..self.depth {
            self.out.write_all(b"  ")?;
        }
        Ok(())
    }

    fn hidden(&self, id: NodeId) -> bool {
        !self.options.include_filtered && self.factory.is_filtered(id)
    }

    fn mark(&mut self, id: NodeId) {
        if let Some(slot) = self.visited.get_mut(id as usize) {
            *slot = true;
        }
    }

    fn is_visited(&self, id: NodeId) -> bool {
        self.visited.get(id as usize).copied().unwrap_or(false)
    }

    fn attributes(&self, node: &Node) -> Vec<(&'static str, String)> {
        let strings = self.factory.strings();
        let mut attrs = vec![
            ("id", format!("id{}", node.id())),
            ("parent", format!("id{}", node.base().parent)),
        ];
        if let Some(named) = node.named() {
            attrs.push(("name", strings.get(named.name).to_string()));
        }
        if let Some(member) = node.member() {
            attrs.push(("accessibility", member.accessibility.to_string()));
            attrs.push(("commentLines", member.comment_lines.to_string()));
            attrs.push(("demangledName", strings.get(member.demangled_name).to_string()));
            attrs.push(("isCompilerGenerated", member.is_compiler_generated().to_string()));
            attrs.push(("isStatic", member.is_static().to_string()));
            attrs.push(("language", member.language.to_string()));
            attrs.push(("mangledName", strings.get(member.mangled_name).to_string()));
        }
        if let Some(scope) = node.scope() {
            attrs.push(("isAnonymous", scope.is_anonymous.to_string()));
            attrs.push(("LLOC", scope.lloc.to_string()));
            attrs.push(("LOC", scope.loc.to_string()));
            attrs.push(("TLLOC", scope.tlloc.to_string()));
            attrs.push(("TLOC", scope.tloc.to_string()));
        }
        if let Some(class) = node.class() {
            attrs.push(("isAbstract", class.is_abstract.to_string()));
            attrs.push(("classKind", class.class_kind.to_string()));
            attrs.push(("objectSize", class.object_size.to_string()));
        }
        if let Some(method) = node.method() {
            attrs.push(("isAbstract", method.is_abstract.to_string()));
            attrs.push(("isVirtual", method.is_virtual.to_string()));
            attrs.push(("methodKind", method.method_kind.to_string()));
            attrs.push(("nestingLevel", method.nesting_level.to_string()));
            attrs.push(("nestingLevelElseIf", method.nesting_level_else_if.to_string()));
            attrs.push(("numberOfBranches", method.number_of_branches.to_string()));
            attrs.push(("numberOfStatements", method.number_of_statements.to_string()));
        }
        match node {
            Node::ClassGenericInstance(d) => {
                attrs.push(("isRealInstance", d.is_real_instance.to_string()))
            }
            Node::MethodGenericInstance(d) => {
                attrs.push(("isRealInstance", d.is_real_instance.to_string()))
            }
            Node::Parameter(d) => attrs.push(("paramKind", d.param_kind.to_string())),
            Node::GenericParameter(d) => {
                attrs.push(("genericParameterKind", d.kind.to_string()))
            }
            Node::Component(d) => {
                attrs.push(("TLLOC", d.tlloc.to_string()));
                attrs.push(("TLOC", d.tloc.to_string()));
                attrs.push(("analysisTime", d.analysis_time.to_string()));
                attrs.push(("changesetID", d.changeset_id.to_string()));
                attrs.push(("shortName", strings.get(d.short_name).to_string()));
            }
            Node::Comment(d) => attrs.push(("text", strings.get(d.text).to_string())),
            Node::Friendship(d) => attrs.push(("grantee", strings.get(d.grantee).to_string())),
            Node::File(d) => {
                attrs.push(("CLOC", d.cloc.to_string()));
                attrs.push(("LLOC", d.lloc.to_string()));
                attrs.push(("LOC", d.loc.to_string()));
                attrs.push(("numberOfBranches", d.number_of_branches.to_string()));
            }
            Node::SimpleType(d) => attrs.push(("simpleTypeKind", d.kind.to_string())),
            Node::TypeFormerPointer(d) => {
                attrs.push(("pointerKind", d.pointer_kind.to_string()))
            }
            _ => {}
        }
        attrs
    }

    fn write_node(&mut self, id: NodeId) -> Result<()> {
        let factory = self.factory;
        let node = factory.get(id)?;
        self.mark(id);

        let name = element_name(node.kind());
        self.indent()?;
        write!(self.out, "<{}", name)?;
        for (key, value) in self.attributes(node) {
            write!(self.out, " {}='{}'", key, escape(&value))?;
        }
        writeln!(self.out, ">")?;

        self.depth += 1;
        for &edge in EdgeKind::ALL {
            if !node.is_a(edge.source_kind()) {
                continue;
            }
            let Some(slot) = edges::slot(node, edge) else {
                continue;
            };
            if TREE_EDGES.contains(&edge) {
                for child in slot.ids() {
                    self.write_tree_child(edge, child)?;
                }
            } else if matches!(edge.multiplicity(), Multiplicity::Assoc(_)) {
                for (target, assoc) in slot.assoc_pairs() {
                    self.write_assoc_ref(edge, target, &assoc)?;
                }
            } else {
                for target in slot.ids() {
                    self.write_ref(edge, target)?;
                }
            }
        }
        self.depth -= 1;

        self.indent()?;
        writeln!(self.out, "</{}>", name)?;
        Ok(())
    }

    fn write_tree_child(&mut self, edge: EdgeKind, child: NodeId) -> Result<()> {
        if self.hidden(child) {
            return Ok(());
        }
        if self.options.safe_mode && self.is_visited(child) {
            return self.write_ref(edge, child);
        }
        self.indent()?;
        writeln!(self.out, "<{}>", edge)?;
        self.depth += 1;
        self.write_node(child)?;
        self.depth -= 1;
        self.indent()?;
        writeln!(self.out, "</{}>", edge)?;
        Ok(())
    }

    fn write_ref(&mut self, edge: EdgeKind, target: NodeId) -> Result<()> {
        if self.hidden(target) {
            return Ok(());
        }
        self.indent()?;
        writeln!(self.out, "<{} ref='id{}'/>", edge, target)?;
        Ok(())
    }

    fn write_assoc_ref(&mut self, edge: EdgeKind, target: NodeId, assoc: &Assoc) -> Result<()> {
        if self.hidden(target) {
            return Ok(());
        }
        self.indent()?;
        match assoc {
            Assoc::TypeArgument(tack) => writeln!(
                self.out,
                "<{} ref='id{}' typeArgumentConstraint='{}'/>",
                edge, target, tack
            )?,
            Assoc::Parameter(kind) => {
                writeln!(self.out, "<{} ref='id{}' parameterKind='{}'/>", edge, target, kind)?
            }
            Assoc::Position(pos) => {
                writeln!(self.out, "<{} ref='id{}'>", edge, target)?;
                self.indent()?;
                writeln!(
                    self.out,
                    "  <SourcePosition line='{}' column='{}' endLine='{}' endColumn='{}' realizationLevel='{}'/>",
                    pos.line, pos.column, pos.end_line, pos.end_column, pos.realization_level
                )?;
                self.indent()?;
                writeln!(self.out, "</{}>", edge)?;
            }
        }
        Ok(())
    }
}

/// Write the LIMML rendering of `factory` to `out`
pub fn dump_limml<W: Write>(
    factory: &Factory,
    out: W,
    project: &str,
    options: DumpOptions,
) -> Result<()> {
    let mut writer = LimmlWriter {
        out,
        factory,
        options,
        visited: vec![false; factory.next_id() as usize],
        depth: 1,
    };

    writeln!(writer.out, "<?xml version='1.0' encoding='utf-8'?>")?;
    writeln!(writer.out, "<!DOCTYPE Project SYSTEM 'lim.dtd'>")?;
    writeln!(writer.out, "<Project name='{}'>", escape(project))?;

    for root in [ROOT_PACKAGE_ID, FILE_SYSTEM_ID, ROOT_COMPONENT_ID] {
        if factory.exists(root) && !writer.is_visited(root) {
            writer.write_node(root)?;
        }
    }

    if options.special_nodes {
        for node in factory.iter() {
            let id = node.id();
            if !writer.is_visited(id) && !writer.hidden(id) {
                writer.write_node(id)?;
            }
        }
    }

    writeln!(writer.out, "  <Filtered id='id{}'/>", ELIDED_ID)?;
    writeln!(writer.out, "</Project>")?;
    writer.out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> (Factory, NodeId, NodeId) {
        let mut f = Factory::new();
        let class = f.create(NodeKind::Class).unwrap();
        f.set_name(class, "Shape<T> & co").unwrap();
        let method = f.create(NodeKind::Method).unwrap();
        f.set_name(method, "Area").unwrap();
        f.add_edge(ROOT_PACKAGE_ID, EdgeKind::Scope_HasMember, class).unwrap();
        f.add_edge(class, EdgeKind::Scope_HasMember, method).unwrap();
        let int = f.create_simple_type(SimpleTypeKind::Double).unwrap();
        let tf = f.create_type_former_type(int).unwrap();
        f.begin_type();
        f.add_type_former(tf).unwrap();
        let ty = f.end_type().unwrap();
        f.add_edge(method, EdgeKind::Method_Returns, ty).unwrap();
        (f, class, method)
    }

    fn render(f: &Factory, options: DumpOptions) -> String {
        let mut out = Vec::new();
        dump_limml(f, &mut out, "demo", options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_dump_contains_names_and_nesting() {
        let (f, _, method) = small_graph();
        let text = render(&f, DumpOptions::default());

        assert!(text.contains("name='Shape&lt;T&gt; &amp; co'"));
        assert!(text.contains("name='Area'"));
        assert!(text.contains("<logical:Method"));
        assert!(text.contains("<Scope_HasMember>"));
        assert!(text.contains("<Method_Returns ref='id"));
        assert!(text.contains("simpleTypeKind='stkDouble'"));
        assert_eq!(text.matches(&format!("id='id{}'", method)).count(), 1);
        assert!(text.trim_end().ends_with("</Project>"));
    }

    #[test]
    fn test_filtered_nodes_are_skipped() {
        let (mut f, class, _) = small_graph();
        f.set_filtered(class).unwrap();

        let text = render(&f, DumpOptions::default());
        assert!(!text.contains("Shape"));

        let text = render(
            &f,
            DumpOptions {
                include_filtered: true,
                ..Default::default()
            },
        );
        assert!(text.contains("Shape"));
    }

    #[test]
    fn test_special_nodes_toggle() {
        let (f, _, _) = small_graph();
        let without = render(
            &f,
            DumpOptions {
                special_nodes: false,
                ..Default::default()
            },
        );
        assert!(!without.contains("<type:SimpleType"));
        assert!(render(&f, DumpOptions::default()).contains("<type:SimpleType"));
    }
}
