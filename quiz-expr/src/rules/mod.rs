//! The rewrite-rule registry and the arithmetic rules registered into it.
//!
//! Each rule is a function that receives the evaluated arguments of a node with a
//! particular head tag and returns `Ok(Some(expr))` with a replacement expression if it
//! applies, or `Ok(None)` if it does not. Rules for a head are tried
//! most-recently-registered first, so later modules can refine the behavior of earlier
//! ones without modifying them; arithmetic, matrix algebra and differentiation all hang
//! rules off the same `Pow` head this way.
//!
//! A rule declares the exact or open-ended range of argument counts it accepts. The
//! registry checks the range before invoking the rule body, so a call with an
//! incompatible argument count is treated as "not applicable" rather than a dispatch
//! error.

pub mod functions;
pub mod power;
pub mod product;
pub mod sum;

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::Expr;
use std::collections::{HashMap, HashSet};

/// The signature of a rewrite rule: evaluated arguments in, optional replacement out.
pub type RuleFn = fn(&Engine, &[Expr]) -> Result<Option<Expr>, EvalError>;

/// A rewrite rule attached to one head tag.
pub struct Rule {
    /// Name of the rule, for diagnostics.
    pub name: &'static str,

    /// The minimum number of arguments the rule accepts.
    pub min_args: usize,

    /// The maximum number of arguments the rule accepts, or `None` if unbounded.
    pub max_args: Option<usize>,

    /// The rule body.
    pub apply: RuleFn,
}

impl Rule {
    /// Whether the rule accepts a node with `n` arguments.
    pub fn accepts(&self, n: usize) -> bool {
        n >= self.min_args && self.max_args.map_or(true, |max| n <= max)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

/// Associates each head tag with its ordered rule list and evaluation attributes.
///
/// The table is built once when the [`Engine`] is constructed and never mutated
/// afterwards; there is no ambient global rule state.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: HashMap<String, Vec<Rule>>,
    flat: HashSet<String>,
}

impl RuleTable {
    /// Registers a rule for the given head tag. Rules registered later are tried first.
    pub fn register(&mut self, head: &str, rule: Rule) {
        self.rules.entry(head.to_string()).or_default().push(rule);
    }

    /// Marks a head as associative-flattening: nested occurrences of the head are
    /// spliced into one argument sequence before rule application.
    pub fn mark_flat(&mut self, head: &str) {
        self.flat.insert(head.to_string());
    }

    /// The rules registered for a head, in registration order.
    pub(crate) fn rules_for(&self, head: &str) -> &[Rule] {
        self.rules.get(head).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the head carries the flattening attribute.
    pub(crate) fn is_flat(&self, head: &str) -> bool {
        self.flat.contains(head)
    }
}
