use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use quadgraph::rdf::{Literal, NamedNode, QuadPattern, QuadStore, QuadStoreConfig, QuadStoreConnection};

fn iri(s: String) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.org/{}", s))
}

/// Store with `size` people, each with a name and a friend
fn populate(size: usize) -> QuadStoreConnection {
    let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
    let mut conn = store.connection();
    let name = iri("name".into());
    let knows = iri("knows".into());
    for i in 0..size {
        let person = iri(format!("person{}", i));
        let friend = iri(format!("person{}", (i + 1) % size));
        let context = Some(iri(format!("g{}", i % 10)));
        conn.add_statement(
            person.clone().into(),
            name.clone().into(),
            Literal::new_simple_literal(format!("Person{}", i)).into(),
            context.clone(),
        )
        .unwrap();
        conn.add_statement(person.into(), knows.clone().into(), friend.into(), context)
            .unwrap();
    }
    conn.commit().unwrap();
    conn
}

/// Benchmark statement insertion throughput
fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_insertion");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| populate(size));
        });
    }
    group.finish();
}

/// Benchmark each access path of the quad pattern matcher
fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("quad_matching");
    let conn = populate(5_000);
    let person = iri("person42".into());
    let knows = iri("knows".into());

    let patterns = [
        ("subject_index", QuadPattern::new(Some(person.clone().into()), None, None, vec![])),
        ("subject_predicate_index", QuadPattern::new(Some(person.clone().into()), Some(knows.clone()), None, vec![])),
        ("predicate_context_index", QuadPattern::new(None, Some(knows.clone()), None, vec![Some(iri("g3".into()))])),
        ("object_edges", QuadPattern::new(None, None, Some(person.into()), vec![])),
        ("full_scan", QuadPattern::any()),
    ];

    for (name, pattern) in patterns.iter() {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let count = conn.get_statements(pattern).unwrap().count();
                criterion::black_box(count);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insertion, bench_matching);
criterion_main!(benches);
