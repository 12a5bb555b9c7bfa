//! SPARQL query optimizer
//!
//! Orders the triple patterns of a basic graph pattern greedily: at each
//! step the pattern with the most bound positions goes next, counting
//! variables bound by the patterns already placed. Ties keep query order.

use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use std::collections::HashSet;

/// SPARQL query optimizer
pub struct SparqlOptimizer;

impl SparqlOptimizer {
    /// Create a new optimizer
    pub fn new() -> Self {
        Self
    }

    /// Evaluation order for `patterns`, given variables bound beforehand
    pub fn order_patterns<'a>(
        &self,
        patterns: &'a [TriplePattern],
        bound: &HashSet<String>,
    ) -> Vec<&'a TriplePattern> {
        let mut bound = bound.clone();
        let mut remaining: Vec<&TriplePattern> = patterns.iter().collect();
        let mut ordered = Vec::with_capacity(patterns.len());

        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_score = 0;
            for (i, pattern) in remaining.iter().enumerate() {
                let score = bound_positions(pattern, &bound);
                if i == 0 || score > best_score {
                    best = i;
                    best_score = score;
                }
            }
            let next = remaining.remove(best);
            bound.extend(pattern_variables(next));
            ordered.push(next);
        }
        ordered
    }
}

impl Default for SparqlOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

fn term_bound(term: &TermPattern, bound: &HashSet<String>) -> bool {
    match term {
        TermPattern::Variable(v) => bound.contains(v.as_str()),
        TermPattern::BlankNode(b) => bound.contains(&blank_variable(b.as_str())),
        _ => true,
    }
}

fn bound_positions(pattern: &TriplePattern, bound: &HashSet<String>) -> usize {
    let predicate = match &pattern.predicate {
        NamedNodePattern::NamedNode(_) => true,
        NamedNodePattern::Variable(v) => bound.contains(v.as_str()),
    };
    [term_bound(&pattern.subject, bound), predicate, term_bound(&pattern.object, bound)]
        .iter()
        .filter(|b| **b)
        .count()
}

/// Name under which a query blank node is bound like a variable
pub(crate) fn blank_variable(id: &str) -> String {
    format!("_:{}", id)
}

/// Variables (and blank nodes) a pattern binds, in position order
pub(crate) fn pattern_variables(pattern: &TriplePattern) -> Vec<String> {
    let mut vars = Vec::new();
    let push_term = |term: &TermPattern, vars: &mut Vec<String>| match term {
        TermPattern::Variable(v) => vars.push(v.as_str().to_string()),
        TermPattern::BlankNode(b) => vars.push(blank_variable(b.as_str())),
        _ => {}
    };
    push_term(&pattern.subject, &mut vars);
    if let NamedNodePattern::Variable(v) = &pattern.predicate {
        vars.push(v.as_str().to_string());
    }
    push_term(&pattern.object, &mut vars);
    vars
}
