//! End-to-end scenarios over the public API

use limgraph::builder::GraphBuilder;
use limgraph::filter::Filter;
use limgraph::frontend::{MethodBody, SourceSpan, SpecialType, SymbolModel, SymbolRef, TypeKind};
use limgraph::lim::{
    self, dump_limml, DumpOptions, EdgeKind, Factory, LanguageKind, Node, NodeId, NodeKind,
    SimpleTypeKind, ELIDED_ID,
};
use tempfile::tempdir;

struct Project {
    model: SymbolModel,
    widget: SymbolRef,
    render: SymbolRef,
    generated: SymbolRef,
}

/// `App.Widget` with a field and two methods, plus a generated helper class
fn project() -> Project {
    let mut model = SymbolModel::new();
    let global = model.global_namespace();
    let app = model.namespace(global, "App");
    let int = model.metadata_type("System.Int32", SpecialType::Int32);
    let exception = model.metadata_type("System.Exception", SpecialType::None);

    let widget = model.named_type(app, "Widget", TypeKind::Class);
    let size = model.field(widget, "size", int);
    let render = model.method(widget, "Render", Some(int));
    let layout = model.method(widget, "Layout", None);
    for symbol in [widget, size, render, layout] {
        model.declare("app", "src/Widget.cs", symbol, SourceSpan::new(3, 1, 40, 2));
    }
    model.set_line_count("app", "src/Widget.cs", 42);
    model.add_body(
        "app",
        "src/Widget.cs",
        MethodBody {
            method: render,
            calls: vec![layout],
            throws: vec![exception],
            accesses: vec![size],
            statements: 4,
            ..MethodBody::default()
        },
    );

    let generated = model.named_type(app, "Resources", TypeKind::Class);
    model.declare("app", "obj/Generated.cs", generated, SourceSpan::new(1, 1, 9, 2));

    Project {
        model,
        widget,
        render,
        generated,
    }
}

fn build(soft: Filter) -> GraphBuilder {
    let project = project();
    let mut builder = GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), soft);
    builder.add_source(&project.model).unwrap();
    builder
}

#[test]
fn converting_twice_yields_the_same_node() {
    let p = project();
    let mut builder = GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty());
    let mut session = builder.session(&p.model);
    let first = session.convert(p.widget).unwrap().unwrap();
    let second = session.convert(p.widget).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(session.context().factory().kind(first).unwrap(), NodeKind::Class);
}

/// Node a single-former `Type` refers to, read without filter elision
fn referred(factory: &Factory, ty: NodeId) -> NodeId {
    let Node::Type(data) = factory.get(ty).unwrap() else {
        panic!("{} is not a Type", ty);
    };
    assert_eq!(data.has_type_former.len(), 1);
    match factory.get(data.has_type_former[0]).unwrap() {
        Node::TypeFormerType(former) => former.refers_to,
        other => panic!("unexpected former {:?}", other.kind()),
    }
}

#[test]
fn equal_constructions_in_two_files_share_one_instance() {
    let mut model = SymbolModel::new();
    let global = model.global_namespace();
    let (a, _) = model.generic_type(global, "A", &["T"]);
    model.declare("app", "src/A.cs", a, SourceSpan::new(1, 1, 5, 2));
    let int = model.metadata_type("System.Int32", SpecialType::Int32);
    let int32 = model.metadata_type("System.Int32", SpecialType::Int32);
    let a_int = model.construct(a, &[int]);
    let a_int32 = model.construct(a, &[int32]);

    let first = model.named_type(global, "First", TypeKind::Class);
    let first_field = model.field(first, "items", a_int);
    let second = model.named_type(global, "Second", TypeKind::Class);
    let second_field = model.field(second, "items", a_int32);
    for symbol in [first, first_field] {
        model.declare("app", "src/First.cs", symbol, SourceSpan::new(1, 1, 9, 2));
    }
    for symbol in [second, second_field] {
        model.declare("app", "src/Second.cs", symbol, SourceSpan::new(1, 1, 9, 2));
    }

    let mut builder = GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty());
    builder.add_source(&model).unwrap();
    let factory = builder.factory();

    let mut instances = Vec::new();
    for field in [first_field, second_field] {
        let node = builder.context().node_of(field).unwrap();
        let Node::Attribute(data) = factory.get(node).unwrap() else {
            panic!("field is not an Attribute");
        };
        assert_eq!(data.has_type.len(), 1);
        instances.push(referred(factory, data.has_type[0]));
    }
    assert_eq!(instances[0], instances[1]);
    assert_eq!(
        factory.kind_counts().get(&NodeKind::ClassGenericInstance),
        Some(&1)
    );

    let instance = instances[0];
    assert_eq!(factory.kind(instance).unwrap(), NodeKind::ClassGenericInstance);
    let arguments = factory.get(instance).unwrap().arguments().unwrap();
    assert_eq!(arguments.len(), 1);
    match factory.get(referred(factory, arguments[0].0)).unwrap() {
        Node::SimpleType(simple) => assert_eq!(simple.kind, SimpleTypeKind::Integer),
        other => panic!("argument refers to {:?}", other.kind()),
    }
}

#[test]
fn limml_dump_names_members() {
    let builder = build(Filter::empty());
    let mut out = Vec::new();
    dump_limml(builder.factory(), &mut out, "app", DumpOptions::default()).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("<Project name='app'>"));
    assert!(text.contains("name='Widget'"));
    assert!(text.contains("name='Render'"));
    assert!(text.contains("logical:Method"));
}

#[test]
fn soft_filtered_files_produce_filtered_nodes() {
    let p = project();
    let mut builder = GraphBuilder::new(
        LanguageKind::Csharp,
        Filter::empty(),
        Filter::parse("-Generated\\.cs$\n"),
    );
    builder.add_source(&p.model).unwrap();

    let generated = builder.context().node_of(p.generated).unwrap();
    let widget = builder.context().node_of(p.widget).unwrap();
    assert!(builder.factory().is_filtered(generated));
    assert!(!builder.factory().is_filtered(widget));
}

#[test]
fn graph_and_filter_state_survive_a_round_trip() {
    let dir = tempdir().unwrap();
    let p = project();
    let mut builder = GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty());
    builder.add_source(&p.model).unwrap();
    let render = builder.context().node_of(p.render).unwrap();
    let (mut factory, header) = builder.finish();
    let before = factory.kind_counts();
    let filtered_before: Vec<_> = factory
        .iter()
        .filter(|n| factory.is_filtered(n.id()))
        .map(|n| n.id())
        .collect();
    assert!(!filtered_before.is_empty());

    let graph = dir.path().join("app.lim");
    let state = dir.path().join("app.flim");
    lim::save(&mut factory, &header, &graph).unwrap();
    lim::save_filter(&factory, &state).unwrap();

    let (mut loaded, loaded_header) = lim::load(&graph).unwrap();
    assert_eq!(loaded.kind_counts(), before);
    assert_eq!(loaded_header.origin.len(), header.origin.len());
    assert!(loaded.iter().all(|n| !loaded.is_filtered(n.id())));

    for node in factory.iter() {
        assert_eq!(loaded.get(node.id()).unwrap(), node, "node {} differs", node.id());
    }
    assert_eq!(loaded.len(), factory.len());

    lim::load_filter(&mut loaded, &state).unwrap();
    for id in &filtered_before {
        assert!(loaded.is_filtered(*id));
    }
    assert_eq!(loaded.name(render), "Render");
    let method = loaded.get(render).unwrap().method().unwrap();
    assert_eq!(method.number_of_statements, 4);
}

#[test]
fn filtered_graph_elides_references() {
    let dir = tempdir().unwrap();
    let p = project();
    let mut builder = GraphBuilder::new(LanguageKind::Csharp, Filter::empty(), Filter::empty());
    builder.add_source(&p.model).unwrap();
    let render = builder.context().node_of(p.render).unwrap();
    let (mut factory, header) = builder.finish();
    let total = factory.len();

    let path = dir.path().join("app-filtered.lim");
    lim::save_filtered(&mut factory, &header, &path).unwrap();
    let (loaded, loaded_header) = lim::load(&path).unwrap();

    assert!(loaded.len() < total);
    assert_eq!(
        loaded_header.properties.get_bool(lim::header::PROP_FILTERED),
        Some(true)
    );
    assert_eq!(
        loaded.targets(render, EdgeKind::Method_Throws).unwrap(),
        vec![ELIDED_ID]
    );
    let calls = loaded.targets(render, EdgeKind::Method_Calls).unwrap();
    assert_eq!(calls.len(), 1);
    assert_ne!(calls[0], ELIDED_ID);
}
