//! SPARQL query executor
//!
//! Evaluates the algebra produced by `spargebra` bottom-up into solution
//! sequences. Basic graph patterns are matched one triple pattern at a time
//! against the [`TripleSource`], substituting variables already bound.

use super::optimizer::{blank_variable, pattern_variables, SparqlOptimizer};
use super::results::{QuerySolution, SparqlResults};
use super::source::TripleSource;
use super::{SparqlError, SparqlResult};
use crate::rdf::{Literal, NamedNode, QuadPattern, RdfTerm};
use spargebra::algebra::GraphPattern;
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern, Variable};
use spargebra::Query;
use std::collections::HashSet;
use tracing::debug;

/// Graph a pattern is evaluated against
#[derive(Clone, Copy)]
enum GraphScope<'q> {
    /// Union of every context, default graph included
    Default,
    /// One named context
    Named(&'q spargebra::term::NamedNode),
    /// Every named context, bound to a variable
    Variable(&'q Variable),
}

/// A triple pattern position after substituting the current solution
enum Slot {
    Fixed(RdfTerm),
    Free(String),
}

impl Slot {
    fn fixed(&self) -> Option<RdfTerm> {
        match self {
            Slot::Fixed(term) => Some(term.clone()),
            Slot::Free(_) => None,
        }
    }

    /// Bind `term` into `solution`; false when it conflicts
    fn bind(&self, solution: &mut QuerySolution, term: RdfTerm) -> bool {
        match self {
            Slot::Fixed(_) => true,
            Slot::Free(name) => match solution.get(name) {
                Some(existing) => existing == &term,
                None => {
                    solution.bind(name.clone(), term);
                    true
                }
            },
        }
    }
}

fn variable_slot(name: String, solution: &QuerySolution) -> Slot {
    match solution.get(&name) {
        Some(term) => Slot::Fixed(term.clone()),
        None => Slot::Free(name),
    }
}

fn term_slot(term: &TermPattern, solution: &QuerySolution) -> SparqlResult<Slot> {
    match term {
        TermPattern::NamedNode(n) => Ok(Slot::Fixed(NamedNode::from(n.clone()).into())),
        TermPattern::Literal(l) => Ok(Slot::Fixed(Literal::from(l.clone()).into())),
        TermPattern::Variable(v) => Ok(variable_slot(v.as_str().to_string(), solution)),
        TermPattern::BlankNode(b) => Ok(variable_slot(blank_variable(b.as_str()), solution)),
        #[allow(unreachable_patterns)]
        _ => Err(SparqlError::Unsupported("quoted triple patterns".to_string())),
    }
}

fn predicate_slot(predicate: &NamedNodePattern, solution: &QuerySolution) -> Slot {
    match predicate {
        NamedNodePattern::NamedNode(n) => Slot::Fixed(NamedNode::from(n.clone()).into()),
        NamedNodePattern::Variable(v) => variable_slot(v.as_str().to_string(), solution),
    }
}

fn operator_name(pattern: &GraphPattern) -> &'static str {
    match pattern {
        GraphPattern::Path { .. } => "property paths",
        GraphPattern::LeftJoin { .. } => "OPTIONAL",
        GraphPattern::Filter { .. } => "FILTER",
        GraphPattern::Union { .. } => "UNION",
        GraphPattern::Extend { .. } => "BIND",
        GraphPattern::Minus { .. } => "MINUS",
        GraphPattern::Values { .. } => "VALUES",
        GraphPattern::OrderBy { .. } => "ORDER BY",
        GraphPattern::Group { .. } => "GROUP BY",
        GraphPattern::Service { .. } => "SERVICE",
        _ => "algebra operator",
    }
}

/// SPARQL query executor
pub struct SparqlExecutor<'a, S: TripleSource + ?Sized> {
    source: &'a S,
    optimizer: SparqlOptimizer,
}

impl<'a, S: TripleSource + ?Sized> SparqlExecutor<'a, S> {
    /// Create a new executor
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            optimizer: SparqlOptimizer::new(),
        }
    }

    /// Execute a parsed query
    pub fn execute(&self, query: &Query) -> SparqlResult<SparqlResults> {
        match query {
            Query::Select {
                dataset, pattern, ..
            } => {
                if dataset.is_some() {
                    return Err(SparqlError::Unsupported("FROM clauses".to_string()));
                }
                let variables = projected_variables(pattern);
                let solutions = self.eval(pattern, GraphScope::Default)?;
                debug!("SELECT produced {} solutions", solutions.len());
                Ok(SparqlResults::Bindings {
                    variables,
                    solutions,
                })
            }
            Query::Ask {
                dataset, pattern, ..
            } => {
                if dataset.is_some() {
                    return Err(SparqlError::Unsupported("FROM clauses".to_string()));
                }
                let answer = !self.eval(pattern, GraphScope::Default)?.is_empty();
                debug!("ASK answered {}", answer);
                Ok(SparqlResults::Boolean(answer))
            }
            Query::Construct { .. } => {
                Err(SparqlError::Unsupported("CONSTRUCT queries".to_string()))
            }
            Query::Describe { .. } => {
                Err(SparqlError::Unsupported("DESCRIBE queries".to_string()))
            }
        }
    }

    fn eval(&self, pattern: &GraphPattern, scope: GraphScope<'_>) -> SparqlResult<Vec<QuerySolution>> {
        match pattern {
            GraphPattern::Bgp { patterns } => self.eval_bgp(patterns, scope),
            GraphPattern::Join { left, right } => {
                let left = self.eval(left, scope)?;
                if left.is_empty() {
                    return Ok(left);
                }
                let right = self.eval(right, scope)?;
                let mut joined = Vec::new();
                for l in &left {
                    for r in &right {
                        if l.is_compatible(r) {
                            joined.push(l.merge(r));
                        }
                    }
                }
                Ok(joined)
            }
            GraphPattern::Graph { name, inner } => match name {
                NamedNodePattern::NamedNode(n) => self.eval(inner, GraphScope::Named(n)),
                NamedNodePattern::Variable(v) => self.eval(inner, GraphScope::Variable(v)),
            },
            GraphPattern::Project { inner, variables } => {
                let names: HashSet<&str> = variables.iter().map(|v| v.as_str()).collect();
                let mut solutions = self.eval(inner, scope)?;
                for solution in &mut solutions {
                    solution.bindings.retain(|var, _| names.contains(var.as_str()));
                }
                Ok(solutions)
            }
            GraphPattern::Distinct { inner } | GraphPattern::Reduced { inner } => {
                let mut seen = HashSet::new();
                let solutions = self.eval(inner, scope)?;
                Ok(solutions
                    .into_iter()
                    .filter(|s| seen.insert(s.key()))
                    .collect())
            }
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => {
                let solutions = self.eval(inner, scope)?.into_iter().skip(*start);
                Ok(match length {
                    Some(length) => solutions.take(*length).collect(),
                    None => solutions.collect(),
                })
            }
            other => Err(SparqlError::Unsupported(operator_name(other).to_string())),
        }
    }

    fn eval_bgp(&self, patterns: &[TriplePattern], scope: GraphScope<'_>) -> SparqlResult<Vec<QuerySolution>> {
        if patterns.is_empty() {
            if let GraphScope::Variable(v) = scope {
                return self.named_contexts(v);
            }
        }

        let mut solutions = vec![QuerySolution::new()];
        for pattern in self.optimizer.order_patterns(patterns, &HashSet::new()) {
            let mut next = Vec::new();
            for solution in &solutions {
                self.extend(pattern, solution, scope, &mut next)?;
            }
            solutions = next;
            if solutions.is_empty() {
                break;
            }
        }
        Ok(solutions)
    }

    /// Every extension of `solution` by statements matching `pattern`
    fn extend(
        &self,
        pattern: &TriplePattern,
        solution: &QuerySolution,
        scope: GraphScope<'_>,
        out: &mut Vec<QuerySolution>,
    ) -> SparqlResult<()> {
        let subject = term_slot(&pattern.subject, solution)?;
        let predicate = predicate_slot(&pattern.predicate, solution);
        let object = term_slot(&pattern.object, solution)?;

        let predicate_iri = match predicate.fixed() {
            Some(RdfTerm::NamedNode(n)) => Some(n),
            Some(_) => return Ok(()),
            None => None,
        };

        let graph = match scope {
            GraphScope::Default => None,
            GraphScope::Named(n) => Some(Slot::Fixed(NamedNode::from(n.clone()).into())),
            GraphScope::Variable(v) => Some(variable_slot(v.as_str().to_string(), solution)),
        };
        let contexts = match graph.as_ref().and_then(Slot::fixed) {
            Some(RdfTerm::NamedNode(n)) => vec![Some(n)],
            Some(_) => return Ok(()),
            None => Vec::new(),
        };

        let quad_pattern = QuadPattern::new(subject.fixed(), predicate_iri, object.fixed(), contexts);
        for quad in self.source.statements(&quad_pattern)? {
            let mut candidate = solution.clone();
            let mut consistent = subject.bind(&mut candidate, quad.subject.into())
                && predicate.bind(&mut candidate, quad.predicate.as_named_node().clone().into())
                && object.bind(&mut candidate, quad.object.into());
            if let Some(graph) = &graph {
                consistent = consistent
                    && match quad.graph {
                        Some(g) => graph.bind(&mut candidate, g.into()),
                        None => false,
                    };
            }
            if consistent {
                out.push(candidate);
            }
        }
        Ok(())
    }

    /// One solution per named context, binding `variable`
    fn named_contexts(&self, variable: &Variable) -> SparqlResult<Vec<QuerySolution>> {
        let mut contexts: Vec<NamedNode> = self
            .source
            .statements(&QuadPattern::any())?
            .filter_map(|quad| quad.graph)
            .collect();
        contexts.sort();
        contexts.dedup();
        Ok(contexts
            .into_iter()
            .map(|context| {
                let mut solution = QuerySolution::new();
                solution.bind(variable.as_str().to_string(), context.into());
                solution
            })
            .collect())
    }
}

/// Result variables: those of the outermost projection, or else every
/// variable the pattern mentions, in order of appearance
fn projected_variables(pattern: &GraphPattern) -> Vec<String> {
    match pattern {
        GraphPattern::Project { variables, .. } => {
            variables.iter().map(|v| v.as_str().to_string()).collect()
        }
        GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. } => projected_variables(inner),
        _ => {
            let mut vars = Vec::new();
            collect_variables(pattern, &mut vars);
            vars
        }
    }
}

fn collect_variables(pattern: &GraphPattern, vars: &mut Vec<String>) {
    let push = |name: String, vars: &mut Vec<String>| {
        if !name.starts_with("_:") && !vars.contains(&name) {
            vars.push(name);
        }
    };
    match pattern {
        GraphPattern::Bgp { patterns } => {
            for p in patterns {
                for name in pattern_variables(p) {
                    push(name, vars);
                }
            }
        }
        GraphPattern::Join { left, right } => {
            collect_variables(left, vars);
            collect_variables(right, vars);
        }
        GraphPattern::Graph { name, inner } => {
            if let NamedNodePattern::Variable(v) = name {
                push(v.as_str().to_string(), vars);
            }
            collect_variables(inner, vars);
        }
        GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::Project { inner, .. } => collect_variables(inner, vars),
        _ => {}
    }
}
