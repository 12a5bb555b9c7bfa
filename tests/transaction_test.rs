use quadgraph::graph::{
    Edge, EdgeId, ElementKind, GraphError, GraphFeatures, GraphResult, GraphStore, KeyIndexableGraph, PropertyValue,
    Vertex, VertexId,
};
use quadgraph::rdf::{
    NamedNode, Quad, QuadPattern, QuadStore, QuadStoreConfig, SailChangeEvent, SailChangedListener, SailError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn iri(s: &str) -> NamedNode {
    NamedNode::new(&format!("http://example.org/{}", s)).unwrap()
}

fn quad(s: &str, o: &str) -> Quad {
    Quad::new(iri(s).into(), iri("p").into(), iri(o).into(), None)
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<SailChangeEvent>>,
}

impl SailChangedListener for Recorder {
    fn statements_changed(&self, event: &SailChangeEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

impl Recorder {
    fn take(&self) -> Vec<SailChangeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

/// In-memory graph whose commits can be made to fail
struct FlakyGraph {
    inner: GraphStore,
    fail_commits: Arc<AtomicBool>,
}

impl KeyIndexableGraph for FlakyGraph {
    fn features(&self) -> GraphFeatures {
        self.inner.features()
    }

    fn add_vertex(&mut self) -> GraphResult<VertexId> {
        self.inner.add_vertex()
    }

    fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.inner.vertex(id)
    }

    fn remove_vertex(&mut self, id: VertexId) -> GraphResult<Vertex> {
        self.inner.remove_vertex(id)
    }

    fn set_vertex_property(
        &mut self,
        id: VertexId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>> {
        self.inner.set_vertex_property(id, key, value)
    }

    fn remove_vertex_property(&mut self, id: VertexId, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.inner.remove_vertex_property(id, key)
    }

    fn add_edge(&mut self, source: VertexId, target: VertexId, label: &str) -> GraphResult<EdgeId> {
        self.inner.add_edge(source, target, label)
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.inner.edge(id)
    }

    fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        self.inner.remove_edge(id)
    }

    fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>> {
        self.inner.set_edge_property(id, key, value)
    }

    fn remove_edge_property(&mut self, id: EdgeId, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.inner.remove_edge_property(id, key)
    }

    fn out_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.inner.out_edges(id)
    }

    fn in_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.inner.in_edges(id)
    }

    fn vertex_ids(&self) -> Vec<VertexId> {
        self.inner.vertex_ids()
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        self.inner.edge_ids()
    }

    fn vertex_count(&self) -> usize {
        self.inner.vertex_count()
    }

    fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    fn create_key_index(&mut self, key: &str, kind: ElementKind) -> GraphResult<()> {
        self.inner.create_key_index(key, kind)
    }

    fn has_key_index(&self, key: &str, kind: ElementKind) -> bool {
        self.inner.has_key_index(key, kind)
    }

    fn vertices_by_key(&self, key: &str, value: &PropertyValue) -> Vec<VertexId> {
        self.inner.vertices_by_key(key, value)
    }

    fn edges_by_key(&self, key: &str, value: &PropertyValue) -> Vec<EdgeId> {
        self.inner.edges_by_key(key, value)
    }

    fn commit(&mut self) -> GraphResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(GraphError::Backend("disk full".to_string()));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> GraphResult<()> {
        self.inner.rollback()
    }
}

#[test]
fn test_events_are_aggregated_per_commit() {
    let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
    let recorder = Arc::new(Recorder::default());
    store.add_listener(recorder.clone()).unwrap();

    let mut conn = store.connection();
    conn.add_quad(&quad("a", "x")).unwrap();
    conn.commit().unwrap();
    assert_eq!(recorder.take(), vec![SailChangeEvent::StatementsAdded(vec![quad("a", "x")])]);

    conn.begin().unwrap();
    conn.add_quad(&quad("b", "y")).unwrap();
    conn.add_quad(&quad("c", "z")).unwrap();
    conn.remove_quad(&quad("a", "x")).unwrap();
    // Nothing is published before commit
    assert!(recorder.take().is_empty());
    conn.commit().unwrap();

    let events = recorder.take();
    assert_eq!(events.len(), 2);
    assert!(events[0].is_addition());
    assert_eq!(events[0].statements(), &[quad("b", "y"), quad("c", "z")]);
    assert_eq!(events[1], SailChangeEvent::StatementsRemoved(vec![quad("a", "x")]));

    // Re-adding an existing statement is not a change
    conn.add_quad(&quad("b", "y")).unwrap();
    conn.commit().unwrap();
    assert!(recorder.take().is_empty());
}

#[test]
fn test_removed_listener_is_silent() {
    let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
    let recorder = Arc::new(Recorder::default());
    let id = store.add_listener(recorder.clone()).unwrap();
    assert!(store.remove_listener(id).unwrap());
    assert!(!store.remove_listener(id).unwrap());

    let mut conn = store.connection();
    conn.add_quad(&quad("a", "x")).unwrap();
    conn.commit().unwrap();
    assert!(recorder.take().is_empty());
}

#[test]
fn test_rollback_discards_changes() {
    let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
    let recorder = Arc::new(Recorder::default());
    store.add_listener(recorder.clone()).unwrap();

    let mut conn = store.connection();
    conn.add_quad(&quad("a", "x")).unwrap();
    conn.commit().unwrap();
    recorder.take();

    conn.begin().unwrap();
    assert!(matches!(conn.begin(), Err(SailError::TransactionActive)));
    conn.add_quad(&quad("b", "y")).unwrap();
    conn.remove_quad(&quad("a", "x")).unwrap();
    conn.rollback().unwrap();

    assert!(!conn.is_active());
    assert!(recorder.take().is_empty());
    let statements: Vec<Quad> = conn.get_statements(&QuadPattern::any()).unwrap().collect();
    assert_eq!(statements, vec![quad("a", "x")]);
    assert_eq!(store.vertex_count().unwrap(), 3);
}

#[test]
fn test_dropped_connection_rolls_back() {
    let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
    {
        let mut conn = store.connection();
        conn.add_quad(&quad("a", "x")).unwrap();
    }
    assert_eq!(store.connection().size(&[]).unwrap(), 0);
    assert_eq!(store.edge_count().unwrap(), 0);
}

#[test]
fn test_commit_failure_propagates() {
    let fail_commits = Arc::new(AtomicBool::new(false));
    let graph = FlakyGraph {
        inner: GraphStore::new(),
        fail_commits: fail_commits.clone(),
    };
    let store = QuadStore::new(graph, QuadStoreConfig::default()).unwrap();
    let recorder = Arc::new(Recorder::default());
    store.add_listener(recorder.clone()).unwrap();

    let mut conn = store.connection();
    conn.add_quad(&quad("a", "x")).unwrap();
    fail_commits.store(true, Ordering::SeqCst);

    assert!(matches!(conn.commit(), Err(SailError::Store(GraphError::Backend(_)))));
    assert!(conn.is_active());
    assert!(recorder.take().is_empty());

    conn.rollback().unwrap();
    assert_eq!(conn.size(&[]).unwrap(), 0);

    fail_commits.store(false, Ordering::SeqCst);
    conn.add_quad(&quad("b", "y")).unwrap();
    conn.commit().unwrap();
    assert_eq!(recorder.take(), vec![SailChangeEvent::StatementsAdded(vec![quad("b", "y")])]);
}

#[test]
fn test_connections_do_not_share_transactions() {
    let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
    let recorder = Arc::new(Recorder::default());
    store.add_listener(recorder.clone()).unwrap();

    let mut first = store.connection();
    let mut second = store.connection();

    // Only one connection at a time may hold uncommitted writes
    second.add_quad(&quad("b", "y")).unwrap();
    assert!(matches!(first.add_quad(&quad("a", "x")), Err(SailError::WriteConflict)));

    // Another connection's commit or rollback does not touch those writes
    first.begin().unwrap();
    first.rollback().unwrap();
    first.begin().unwrap();
    first.commit().unwrap();
    assert!(recorder.take().is_empty());

    second.rollback().unwrap();
    assert_eq!(first.size(&[]).unwrap(), 0);
    assert!(recorder.take().is_empty());

    // The writer slot is free again
    first.add_quad(&quad("a", "x")).unwrap();
    first.commit().unwrap();
    second.add_quad(&quad("b", "y")).unwrap();
    second.commit().unwrap();

    assert_eq!(first.size(&[]).unwrap(), 2);
    assert_eq!(
        recorder.take(),
        vec![
            SailChangeEvent::StatementsAdded(vec![quad("a", "x")]),
            SailChangeEvent::StatementsAdded(vec![quad("b", "y")]),
        ]
    );
}

#[test]
fn test_dropped_writer_frees_the_store() {
    let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
    let mut survivor = store.connection();
    {
        let mut abandoned = store.connection();
        abandoned.add_quad(&quad("b", "y")).unwrap();
        assert!(matches!(survivor.add_quad(&quad("a", "x")), Err(SailError::WriteConflict)));
    }
    assert!(survivor.add_quad(&quad("a", "x")).unwrap());
    survivor.commit().unwrap();
    let statements: Vec<Quad> = survivor.get_statements(&QuadPattern::any()).unwrap().collect();
    assert_eq!(statements, vec![quad("a", "x")]);
}
