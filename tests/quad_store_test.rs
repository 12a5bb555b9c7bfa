use quadgraph::graph::GraphStore;
use quadgraph::rdf::{
    BlankNode, Literal, NamedNode, Quad, QuadPattern, QuadStore, QuadStoreConfig, RdfFormat, RdfTerm, SailError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn iri(s: &str) -> NamedNode {
    NamedNode::new(&format!("http://example.org/{}", s)).unwrap()
}

fn quad(s: &str, p: &str, o: &str, c: Option<&str>) -> Quad {
    Quad::new(iri(s).into(), iri(p).into(), iri(o).into(), c.map(iri))
}

fn open() -> QuadStore {
    init_tracing();
    QuadStore::in_memory(QuadStoreConfig::default()).unwrap()
}

#[test]
fn test_add_is_idempotent() {
    let store = open();
    let mut conn = store.connection();

    assert!(conn.add_quad(&quad("a", "p", "b", None)).unwrap());
    assert!(!conn.add_quad(&quad("a", "p", "b", None)).unwrap());
    conn.commit().unwrap();

    assert_eq!(conn.size(&[]).unwrap(), 1);
    assert_eq!(store.edge_count().unwrap(), 1);
}

#[test]
fn test_same_triple_in_several_contexts() {
    let store = open();
    let mut conn = store.connection();
    conn.add_quad(&quad("a", "p", "b", None)).unwrap();
    conn.add_quad(&quad("a", "p", "b", Some("g1"))).unwrap();
    conn.add_quad(&quad("a", "p", "b", Some("g2"))).unwrap();
    conn.commit().unwrap();

    assert_eq!(conn.size(&[]).unwrap(), 3);
    assert_eq!(conn.size(&[None]).unwrap(), 1);
    assert_eq!(conn.size(&[Some(iri("g1"))]).unwrap(), 1);
    let mut contexts = conn.context_ids().unwrap();
    contexts.sort();
    assert_eq!(contexts, vec![iri("g1"), iri("g2")]);

    // Values are shared: a, b and the control vertex
    assert_eq!(store.vertex_count().unwrap(), 3);
}

#[test]
fn test_match_context_alternatives() {
    let store = open();
    let mut conn = store.connection();
    conn.add_quad(&quad("a", "p", "b", None)).unwrap();
    conn.add_quad(&quad("a", "p", "c", Some("g1"))).unwrap();
    conn.add_quad(&quad("a", "p", "d", Some("g2"))).unwrap();
    conn.commit().unwrap();

    let pattern = QuadPattern::new(Some(iri("a").into()), Some(iri("p")), None, vec![Some(iri("g1")), None]);
    let mut objects: Vec<RdfTerm> = conn.get_statements(&pattern).unwrap().map(|q| q.object.into()).collect();
    objects.sort();
    assert_eq!(objects, vec![iri("b").into(), iri("c").into()]);

    // Unknown values match nothing
    let unknown = QuadPattern::new(Some(iri("zzz").into()), None, None, vec![]);
    assert_eq!(conn.get_statements(&unknown).unwrap().count(), 0);
    let unknown_context = QuadPattern::new(None, None, None, vec![Some(iri("nope"))]);
    assert!(!conn.has_statement(&unknown_context).unwrap());
}

#[test]
fn test_match_by_contexts_only() {
    let store = open();
    let mut conn = store.connection();
    conn.add_quad(&quad("a", "p", "b", None)).unwrap();
    conn.add_quad(&quad("a", "q", "c", None)).unwrap();
    conn.add_quad(&quad("a", "p", "b", Some("g1"))).unwrap();
    conn.add_quad(&quad("d", "p", "e", Some("g1"))).unwrap();
    conn.add_quad(&quad("a", "p", "b", Some("g2"))).unwrap();
    conn.commit().unwrap();

    // Union of the named graph and the default graph, each statement once
    let pattern = QuadPattern::new(None, None, None, vec![Some(iri("g1")), None]);
    let mut matched: Vec<String> = conn.get_statements(&pattern).unwrap().map(|q| q.to_string()).collect();
    matched.sort();
    let mut expected: Vec<String> = [
        quad("a", "p", "b", None),
        quad("a", "q", "c", None),
        quad("a", "p", "b", Some("g1")),
        quad("d", "p", "e", Some("g1")),
    ]
    .iter()
    .map(|q| q.to_string())
    .collect();
    expected.sort();
    assert_eq!(matched, expected);

    let repeated = QuadPattern::new(None, None, None, vec![Some(iri("g1")), None, Some(iri("g1")), None]);
    assert_eq!(conn.get_statements(&repeated).unwrap().count(), 4);
}

#[test]
fn test_size_with_repeated_contexts() {
    let store = open();
    let mut conn = store.connection();
    conn.add_quad(&quad("a", "p", "b", None)).unwrap();
    conn.add_quad(&quad("a", "p", "b", Some("g1"))).unwrap();
    conn.add_quad(&quad("c", "p", "d", Some("g1"))).unwrap();
    conn.add_quad(&quad("a", "p", "b", Some("g2"))).unwrap();
    conn.commit().unwrap();

    assert_eq!(conn.size(&[Some(iri("g1")), Some(iri("g1")), None]).unwrap(), 3);
    assert_eq!(conn.size(&[Some(iri("g1")), Some(iri("g1"))]).unwrap(), 2);
    assert_eq!(conn.size(&[None, None]).unwrap(), 1);
    assert_eq!(conn.size(&[]).unwrap(), 4);
}

#[test]
fn test_orphan_collection() {
    let store = open();
    let mut conn = store.connection();
    conn.add_quad(&quad("a", "p", "b", None)).unwrap();
    conn.add_quad(&quad("a", "q", "b", None)).unwrap();
    conn.add_quad(&quad("a", "p", "c", None)).unwrap();
    conn.commit().unwrap();
    assert_eq!(store.vertex_count().unwrap(), 4);

    // a and b still linked by q
    conn.remove_quad(&quad("a", "p", "b", None)).unwrap();
    assert_eq!(store.vertex_count().unwrap(), 4);

    // c is left without statements
    conn.remove_quad(&quad("a", "p", "c", None)).unwrap();
    assert_eq!(store.vertex_count().unwrap(), 3);

    // both ends go
    conn.remove_quad(&quad("a", "q", "b", None)).unwrap();
    assert_eq!(store.vertex_count().unwrap(), 1);
    conn.commit().unwrap();

    assert_eq!(conn.size(&[]).unwrap(), 0);
    assert_eq!(conn.find_vertex(&iri("a").into()).unwrap(), None);
}

#[test]
fn test_clear_keeps_namespaces() {
    let store = open();
    let mut conn = store.connection();
    conn.set_namespace("ex", "http://example.org/").unwrap();
    conn.add_quad(&quad("a", "p", "b", Some("g1"))).unwrap();
    conn.add_quad(&quad("c", "p", "d", None)).unwrap();
    conn.commit().unwrap();

    assert_eq!(conn.clear(&[Some(iri("g1"))]).unwrap(), 1);
    assert_eq!(conn.size(&[]).unwrap(), 1);
    assert_eq!(conn.clear(&[]).unwrap(), 1);
    conn.commit().unwrap();

    assert_eq!(store.vertex_count().unwrap(), 1);
    assert_eq!(conn.get_namespace("ex").unwrap(), Some("http://example.org/".to_string()));
}

#[test]
fn test_blank_nodes_are_fresh_per_load() {
    let store = open();
    let mut conn = store.connection();
    let data = r#"_:x <http://example.org/name> "anonymous" ."#;

    assert_eq!(conn.load(data, RdfFormat::Turtle, None).unwrap(), 1);
    assert_eq!(conn.load(data, RdfFormat::Turtle, None).unwrap(), 1);
    conn.commit().unwrap();

    assert_eq!(conn.size(&[]).unwrap(), 2);
    // Two blank nodes share one literal, plus the control vertex
    assert_eq!(store.vertex_count().unwrap(), 4);
}

#[test]
fn test_blank_node_objects_can_be_refused() {
    init_tracing();
    let store = QuadStore::in_memory(QuadStoreConfig::new().with_blank_node_objects(false)).unwrap();
    let mut conn = store.connection();
    let result = conn.add_statement(iri("a").into(), iri("p").into(), BlankNode::new().into(), None);
    assert!(matches!(result, Err(SailError::Unsupported(_))));

    // Blank subjects are still fine
    assert!(conn.add_statement(BlankNode::new().into(), iri("p").into(), iri("a").into(), None).unwrap());
}

#[test]
fn test_literal_retyping() {
    let store = open();
    let mut conn = store.connection();
    let xsd_integer = NamedNode::new("http://www.w3.org/2001/XMLSchema#integer").unwrap();
    let plain = Literal::new_simple_literal("42");
    conn.add_statement(iri("a").into(), iri("age").into(), plain.clone().into(), None).unwrap();
    conn.add_statement(iri("b").into(), iri("age").into(), plain.clone().into(), Some(iri("g"))).unwrap();
    conn.commit().unwrap();

    let vertex = conn.find_vertex(&plain.clone().into()).unwrap().unwrap();
    let typed = conn.update_literal(vertex, Some(xsd_integer.clone()), None).unwrap();
    conn.commit().unwrap();

    assert_eq!(typed, Literal::new_typed_literal("42", xsd_integer));
    assert_eq!(conn.find_vertex(&plain.clone().into()).unwrap(), None);

    let by_typed = QuadPattern::new(None, None, Some(typed.into()), vec![]);
    assert_eq!(conn.get_statements(&by_typed).unwrap().count(), 2);
    let by_plain = QuadPattern::new(None, None, Some(plain.into()), vec![]);
    assert_eq!(conn.get_statements(&by_plain).unwrap().count(), 0);
    assert_eq!(conn.size(&[Some(iri("g"))]).unwrap(), 1);

    let iri_vertex = conn.find_vertex(&iri("a").into()).unwrap().unwrap();
    assert!(matches!(
        conn.update_literal(iri_vertex, None, Some("en")),
        Err(SailError::Unsupported(_))
    ));
}

#[test]
fn test_duplicate_statements_mode() {
    init_tracing();
    let store = QuadStore::in_memory(QuadStoreConfig::new().with_unique_statements(false)).unwrap();
    let mut conn = store.connection();
    assert!(conn.add_quad(&quad("a", "p", "b", None)).unwrap());
    assert!(conn.add_quad(&quad("a", "p", "b", None)).unwrap());
    conn.commit().unwrap();
    assert_eq!(conn.size(&[]).unwrap(), 2);

    // Removal by pattern takes every copy
    assert_eq!(conn.remove_quad(&quad("a", "p", "b", None)).unwrap(), 2);
    conn.commit().unwrap();
    assert_eq!(store.vertex_count().unwrap(), 1);
}

#[test]
fn test_invalid_index_patterns() {
    init_tracing();
    let config = QuadStoreConfig::new().with_index_patterns("s,sx");
    assert!(matches!(QuadStore::in_memory(config), Err(SailError::Config(_))));
}

#[test]
fn test_config_from_yaml() {
    init_tracing();
    let config = QuadStoreConfig::from_yaml_str("index_patterns: \"sp,o\"\n").unwrap();
    let store = QuadStore::new(GraphStore::new(), config).unwrap();
    assert_eq!(store.index_patterns().len(), 2);
    assert!(store.config().enforce_unique_statements);

    let mut conn = store.connection();
    conn.add_quad(&quad("a", "p", "b", None)).unwrap();
    conn.add_quad(&quad("c", "p", "b", None)).unwrap();
    conn.commit().unwrap();
    let by_object = QuadPattern::new(None, None, Some(iri("b").into()), vec![]);
    assert_eq!(conn.get_statements(&by_object).unwrap().count(), 2);
}

#[test]
fn test_predicate_match_without_predicate_index() {
    init_tracing();
    let store = QuadStore::in_memory(QuadStoreConfig::new().with_index_patterns("s,c")).unwrap();
    let mut conn = store.connection();
    conn.add_quad(&quad("a", "p", "b", None)).unwrap();
    conn.add_quad(&quad("c", "p", "d", Some("g1"))).unwrap();
    conn.add_quad(&quad("a", "q", "d", None)).unwrap();
    conn.commit().unwrap();

    let by_predicate = QuadPattern::new(None, Some(iri("p")), None, vec![]);
    let mut subjects: Vec<RdfTerm> = conn.get_statements(&by_predicate).unwrap().map(|q| q.subject.into()).collect();
    subjects.sort();
    assert_eq!(subjects, vec![iri("a").into(), iri("c").into()]);

    conn.remove_quad(&quad("c", "p", "d", Some("g1"))).unwrap();
    assert_eq!(conn.get_statements(&by_predicate).unwrap().count(), 1);
    conn.rollback().unwrap();
    assert_eq!(conn.get_statements(&by_predicate).unwrap().count(), 2);

    let unknown = QuadPattern::new(None, Some(iri("nope")), None, vec![]);
    assert_eq!(conn.get_statements(&unknown).unwrap().count(), 0);
}

#[test]
fn test_load_and_export() {
    let store = open();
    let mut conn = store.connection();
    let nquads = "<http://example.org/a> <http://example.org/p> \"x\"@en <http://example.org/g> .\n\
                  <http://example.org/a> <http://example.org/p> <http://example.org/b> .\n";
    assert_eq!(conn.load(nquads, RdfFormat::NQuads, Some(&iri("fallback"))).unwrap(), 2);
    conn.commit().unwrap();

    // Quads without a graph take the load context
    let mut contexts = conn.context_ids().unwrap();
    contexts.sort();
    assert_eq!(contexts, vec![iri("fallback"), iri("g")]);

    let exported = conn.export(RdfFormat::NQuads).unwrap();
    let copy = open();
    let mut copy_conn = copy.connection();
    assert_eq!(copy_conn.load(&exported, RdfFormat::NQuads, None).unwrap(), 2);
    copy_conn.commit().unwrap();
    assert_eq!(copy_conn.size(&[Some(iri("g"))]).unwrap(), 1);
}
