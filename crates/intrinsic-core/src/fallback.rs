//! Prioritized field lookups.
//!
//! Provider payloads often carry the same concept under several field names.
//! A [`FieldChain`] lists named accessors in precedence order; the first one
//! yielding a usable value wins, and the winner's name is reported alongside
//! the value so the precedence stays auditable.
//!
//! ```rust
//! use intrinsic_core::FieldChain;
//!
//! struct Payload {
//!     shares: Option<f64>,
//!     diluted: Option<f64>,
//! }
//!
//! let chain = FieldChain::new("shares")
//!     .then("shares", |p: &Payload| p.shares)
//!     .then("diluted", |p: &Payload| p.diluted);
//!
//! let resolved = chain.resolve(&Payload { shares: Some(0.0), diluted: Some(12.0) }).unwrap();
//! assert_eq!(resolved.source, "diluted");
//! assert_eq!(resolved.value, 12.0);
//! ```

use std::fmt;

/// Accessor reading one candidate value from a source.
pub type Accessor<S> = fn(&S) -> Option<f64>;

/// A value produced by a [`FieldChain`] with the name of the accessor that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// Name of the winning accessor.
    pub source: &'static str,
    /// The resolved value.
    pub value: f64,
}

/// Ordered list of named accessors for one concept.
pub struct FieldChain<S> {
    name: &'static str,
    links: Vec<(&'static str, Accessor<S>)>,
    accept_zero: bool,
    positive_only: bool,
}

impl<S> FieldChain<S> {
    /// Creates an empty chain for the named concept.
    ///
    /// By default zero values are skipped, like absent ones.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            links: Vec::new(),
            accept_zero: false,
            positive_only: false,
        }
    }

    /// Appends an accessor with lower precedence than all existing ones.
    #[must_use]
    pub fn then(mut self, source: &'static str, accessor: Accessor<S>) -> Self {
        self.links.push((source, accessor));
        self
    }

    /// Treats an explicit zero as a usable value.
    #[must_use]
    pub fn accept_zero(mut self) -> Self {
        self.accept_zero = true;
        self
    }

    /// Skips negative values, like absent ones.
    #[must_use]
    pub fn positive_only(mut self) -> Self {
        self.positive_only = true;
        self
    }

    /// Concept name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Accessor names in precedence order.
    pub fn sources(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.links.iter().map(|(source, _)| *source)
    }

    fn admits(&self, value: f64) -> bool {
        value.is_finite()
            && (self.accept_zero || value != 0.0)
            && !(self.positive_only && value < 0.0)
    }

    /// First finite value not excluded by [`accept_zero`](Self::accept_zero)
    /// or [`positive_only`](Self::positive_only).
    pub fn resolve(&self, source: &S) -> Option<Resolved> {
        self.links.iter().find_map(|(name, accessor)| {
            accessor(source)
                .filter(|&v| self.admits(v))
                .map(|value| Resolved {
                    source: *name,
                    value,
                })
        })
    }

    /// Resolved value without the source name.
    pub fn value(&self, source: &S) -> Option<f64> {
        self.resolve(source).map(|r| r.value)
    }
}

impl<S> fmt::Debug for FieldChain<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldChain")
            .field("name", &self.name)
            .field("sources", &self.sources().collect::<Vec<_>>())
            .field("accept_zero", &self.accept_zero)
            .field("positive_only", &self.positive_only)
            .finish()
    }
}
