//! Statement sources for query evaluation

use crate::graph::KeyIndexableGraph;
use crate::rdf::{QuadPattern, QuadStoreConnection, Quad, SailResult, StatementIterator};

/// What the evaluator needs from a store: statements matching a pattern
///
/// The returned iterator is dropped as soon as the evaluator is done with
/// it, on every exit path.
pub trait TripleSource {
    type Statements: Iterator<Item = Quad>;

    fn statements(&self, pattern: &QuadPattern) -> SailResult<Self::Statements>;
}

impl<G: KeyIndexableGraph> TripleSource for QuadStoreConnection<G> {
    type Statements = StatementIterator;

    fn statements(&self, pattern: &QuadPattern) -> SailResult<StatementIterator> {
        self.get_statements(pattern)
    }
}

impl TripleSource for [Quad] {
    type Statements = std::vec::IntoIter<Quad>;

    fn statements(&self, pattern: &QuadPattern) -> SailResult<Self::Statements> {
        let matching: Vec<Quad> = self.iter().filter(|q| pattern.matches(q)).cloned().collect();
        Ok(matching.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{NamedNode, QuadStore, QuadStoreConfig};

    fn quad(s: &str, c: Option<&str>) -> Quad {
        let iri = |x: &str| NamedNode::new(&format!("http://example.org/{}", x)).unwrap();
        Quad::new(iri(s).into(), iri("p").into(), iri("o").into(), c.map(iri))
    }

    #[test]
    fn test_connection_source() {
        let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
        let mut conn = store.connection();
        conn.add_quad(&quad("a", None)).unwrap();
        conn.add_quad(&quad("b", Some("g"))).unwrap();
        assert_eq!(conn.statements(&QuadPattern::any()).unwrap().count(), 2);
        assert_eq!(
            conn.statements(&QuadPattern::new(None, None, None, vec![None]))
                .unwrap()
                .count(),
            1
        );
    }

    #[test]
    fn test_slice_source() {
        let quads = vec![quad("a", None), quad("b", Some("g"))];
        let source: &[Quad] = &quads;
        let pattern = QuadPattern::new(None, None, None, vec![None]);
        assert_eq!(source.statements(&pattern).unwrap().collect::<Vec<_>>(), vec![quad("a", None)]);
    }
}
