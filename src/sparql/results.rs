//! SPARQL query results

use super::{SparqlError, SparqlResult};
use crate::rdf::RdfTerm;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// SPARQL result format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    /// SPARQL 1.1 JSON results
    Json,
    /// CSV results (plain values)
    Csv,
    /// TSV results (terms in N-Triples syntax)
    Tsv,
}

/// Query solution (variable bindings)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings
    pub bindings: HashMap<String, RdfTerm>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&RdfTerm> {
        self.bindings.get(variable)
    }

    /// Add a binding
    pub fn bind(&mut self, variable: String, term: RdfTerm) {
        self.bindings.insert(variable, term);
    }

    /// Whether both solutions agree on every shared variable
    pub fn is_compatible(&self, other: &QuerySolution) -> bool {
        self.bindings
            .iter()
            .all(|(var, term)| other.get(var).map_or(true, |t| t == term))
    }

    /// Union of two compatible solutions
    pub fn merge(&self, other: &QuerySolution) -> QuerySolution {
        let mut merged = self.clone();
        for (var, term) in &other.bindings {
            merged.bindings.entry(var.clone()).or_insert_with(|| term.clone());
        }
        merged
    }

    /// Bindings sorted by variable, usable as a deduplication key
    pub(crate) fn key(&self) -> Vec<(String, RdfTerm)> {
        let mut key: Vec<(String, RdfTerm)> = self
            .bindings
            .iter()
            .map(|(v, t)| (v.clone(), t.clone()))
            .collect();
        key.sort();
        key
    }
}

/// SPARQL query results
#[derive(Debug, Clone, PartialEq)]
pub enum SparqlResults {
    /// Bindings from SELECT query
    Bindings {
        /// Variables
        variables: Vec<String>,
        /// Solutions
        solutions: Vec<QuerySolution>,
    },

    /// Boolean result from ASK query
    Boolean(bool),
}

impl SparqlResults {
    /// Create empty bindings result
    pub fn empty() -> Self {
        SparqlResults::Bindings {
            variables: Vec::new(),
            solutions: Vec::new(),
        }
    }

    /// Number of solutions; an ASK result counts as one
    pub fn len(&self) -> usize {
        match self {
            SparqlResults::Bindings { solutions, .. } => solutions.len(),
            SparqlResults::Boolean(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize results to string
    pub fn serialize(&self, format: ResultFormat) -> SparqlResult<String> {
        match format {
            ResultFormat::Json => self.to_json(),
            ResultFormat::Csv => Ok(self.to_separated(",", "\r\n", csv_value)),
            ResultFormat::Tsv => Ok(self.to_separated("\t", "\n", |t| t.to_string())),
        }
    }

    fn to_json(&self) -> SparqlResult<String> {
        let document = match self {
            SparqlResults::Boolean(b) => json!({ "head": {}, "boolean": b }),
            SparqlResults::Bindings {
                variables,
                solutions,
            } => {
                let bindings: Vec<Value> = solutions
                    .iter()
                    .map(|solution| {
                        let mut row = Map::new();
                        for var in variables {
                            if let Some(term) = solution.get(var) {
                                row.insert(var.clone(), json_term(term));
                            }
                        }
                        Value::Object(row)
                    })
                    .collect();
                json!({
                    "head": { "vars": variables },
                    "results": { "bindings": bindings },
                })
            }
        };
        serde_json::to_string(&document).map_err(|e| SparqlError::Execution(e.to_string()))
    }

    fn to_separated(&self, separator: &str, newline: &str, render: impl Fn(&RdfTerm) -> String) -> String {
        match self {
            SparqlResults::Boolean(b) => format!("{}{}", b, newline),
            SparqlResults::Bindings {
                variables,
                solutions,
            } => {
                let mut out = String::new();
                let header: Vec<String> = if separator == "\t" {
                    variables.iter().map(|v| format!("?{}", v)).collect()
                } else {
                    variables.clone()
                };
                out.push_str(&header.join(separator));
                out.push_str(newline);
                for solution in solutions {
                    let row: Vec<String> = variables
                        .iter()
                        .map(|v| solution.get(v).map(&render).unwrap_or_default())
                        .collect();
                    out.push_str(&row.join(separator));
                    out.push_str(newline);
                }
                out
            }
        }
    }
}

fn json_term(term: &RdfTerm) -> Value {
    match term {
        RdfTerm::NamedNode(n) => json!({ "type": "uri", "value": n.as_str() }),
        RdfTerm::BlankNode(b) => json!({ "type": "bnode", "value": b.as_str() }),
        RdfTerm::Literal(l) => {
            let mut object = Map::new();
            object.insert("type".into(), "literal".into());
            object.insert("value".into(), l.value().into());
            if let Some(lang) = l.language() {
                object.insert("xml:lang".into(), lang.into());
            } else if let Some(datatype) = l.explicit_datatype() {
                object.insert("datatype".into(), datatype.as_str().into());
            }
            Value::Object(object)
        }
    }
}

fn csv_value(term: &RdfTerm) -> String {
    let raw = match term {
        RdfTerm::NamedNode(n) => n.as_str().to_string(),
        RdfTerm::BlankNode(b) => format!("_:{}", b.as_str()),
        RdfTerm::Literal(l) => l.value().to_string(),
    };
    if raw.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw
    }
}
