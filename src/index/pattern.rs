//! Index pattern specifications
//!
//! A specification is a comma-separated list of tokens over the letters
//! `s`, `p`, `o`, `c` (subject, predicate, object, context), for example
//! `"sp,p,c,pc"`. Each non-empty token names a compound edge index keyed by
//! the listed quad fields in `s p o c` order.
//!
//! Index selection is a pure function of the configured tokens and the set
//! of fields a query binds, so it can be exercised without a graph.

use std::fmt;
use thiserror::Error;

/// Default specification: subject-, predicate- and context-bound lookups plus
/// the two most common compound shapes.
pub const DEFAULT_INDEX_PATTERNS: &str = "s,p,c,sp,pc";

/// Pattern specification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Token contains a letter outside `s`, `p`, `o`, `c`
    #[error("Invalid index pattern '{token}': unexpected character '{found}'")]
    UnknownField { token: String, found: char },

    /// Token repeats a letter or lists letters out of `s p o c` order
    #[error("Invalid index pattern '{0}': letters must appear at most once, in s,p,o,c order")]
    OutOfOrder(String),
}

pub type PatternResult<T> = Result<T, PatternError>;

/// One position of a quad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuadField {
    Subject,
    Predicate,
    Object,
    Context,
}

impl QuadField {
    /// All fields in canonical order
    pub const ALL: [QuadField; 4] = [
        QuadField::Subject,
        QuadField::Predicate,
        QuadField::Object,
        QuadField::Context,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(QuadField::Subject),
            'p' => Some(QuadField::Predicate),
            'o' => Some(QuadField::Object),
            'c' => Some(QuadField::Context),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            QuadField::Subject => 's',
            QuadField::Predicate => 'p',
            QuadField::Object => 'o',
            QuadField::Context => 'c',
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Set of quad fields bound by a lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoundFields(u8);

impl BoundFields {
    pub fn empty() -> Self {
        BoundFields(0)
    }

    pub fn all() -> Self {
        QuadField::ALL.iter().copied().collect()
    }

    pub fn with(mut self, field: QuadField) -> Self {
        self.insert(field);
        self
    }

    pub fn insert(&mut self, field: QuadField) {
        self.0 |= field.bit();
    }

    pub fn contains(&self, field: QuadField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_subset_of(&self, other: &BoundFields) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<QuadField> for BoundFields {
    fn from_iter<T: IntoIterator<Item = QuadField>>(iter: T) -> Self {
        let mut set = BoundFields::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

impl fmt::Display for BoundFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in QuadField::ALL {
            if self.contains(field) {
                write!(f, "{}", field.as_char())?;
            }
        }
        Ok(())
    }
}

/// A validated, non-empty index pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPattern {
    token: String,
    fields: Vec<QuadField>,
}

impl IndexPattern {
    /// Parse a single token
    pub fn parse(token: &str) -> PatternResult<Self> {
        let mut fields = Vec::with_capacity(token.len());
        for c in token.chars() {
            let field = QuadField::from_char(c).ok_or_else(|| PatternError::UnknownField {
                token: token.to_string(),
                found: c,
            })?;
            if let Some(last) = fields.last() {
                if *last >= field {
                    return Err(PatternError::OutOfOrder(token.to_string()));
                }
            }
            fields.push(field);
        }
        Ok(Self {
            token: token.to_string(),
            fields,
        })
    }

    /// Whether a token is a repetition-free subsequence of `spoc`
    pub fn is_valid(token: &str) -> bool {
        Self::parse(token).is_ok()
    }

    /// The token text, also used as the edge property key of the index
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fields in key order
    pub fn fields(&self) -> &[QuadField] {
        &self.fields
    }

    pub fn field_set(&self) -> BoundFields {
        self.fields.iter().copied().collect()
    }
}

impl fmt::Display for IndexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

/// The ordered list of configured index patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPatterns {
    patterns: Vec<IndexPattern>,
}

impl IndexPatterns {
    /// Parse a comma-separated specification. Empty tokens are valid but
    /// create no index; repeated tokens keep their first position.
    pub fn parse(spec: &str) -> PatternResult<Self> {
        let mut patterns: Vec<IndexPattern> = Vec::new();
        for raw in spec.split(',') {
            let token = raw.trim();
            let pattern = IndexPattern::parse(token)?;
            if pattern.fields.is_empty() || patterns.iter().any(|p| p.token == pattern.token) {
                continue;
            }
            patterns.push(pattern);
        }
        Ok(Self { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pick the pattern whose field set is the largest subset of `bound`.
    ///
    /// An exact match is always the largest candidate; ties go to the
    /// pattern listed first. `None` means an unindexed scan.
    pub fn select(&self, bound: BoundFields) -> Option<&IndexPattern> {
        let mut best: Option<&IndexPattern> = None;
        for pattern in &self.patterns {
            if !pattern.field_set().is_subset_of(&bound) {
                continue;
            }
            match best {
                Some(current) if current.fields.len() >= pattern.fields.len() => {}
                _ => best = Some(pattern),
            }
        }
        best
    }
}

impl Default for IndexPatterns {
    fn default() -> Self {
        Self::parse(DEFAULT_INDEX_PATTERNS).unwrap_or(Self { patterns: Vec::new() })
    }
}

impl fmt::Display for IndexPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.patterns.iter().map(|p| p.token()).collect();
        write!(f, "{}", tokens.join(","))
    }
}
