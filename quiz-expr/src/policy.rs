//! Dynamically scoped rendering configuration.
//!
//! Authoring code often wants to change how expressions render (vectors as tuples,
//! derivatives with primes) for one quiz or question without the change leaking out.
//! A [`PolicyStack`] models this as a stack of override layers: lookups search the
//! layers innermost-first and fall back to hard defaults, and entering a scope with
//! [`PolicyStack::scope`] returns a guard that pops the layer when dropped, on every
//! exit path including early returns and panics.

use crate::expr::{var, Expr};

/// One layer of overrides. `None` means "inherit from the enclosing layer".
#[derive(Debug, Clone, Default)]
struct PolicyLayer {
    vector_as_tuple: Option<bool>,
    deriv_use_primes: Option<bool>,
    deriv_indep_var: Option<Expr>,
    deriv_primes_limit: Option<usize>,
}

/// The stack of rendering-policy layers. See the module docs.
#[derive(Debug, Clone)]
pub struct PolicyStack {
    layers: Vec<PolicyLayer>,
}

impl PolicyStack {
    /// A stack with a single base layer and all defaults in effect.
    pub fn new() -> Self {
        PolicyStack { layers: vec![PolicyLayer::default()] }
    }

    /// Pushes a fresh override layer, popped when the returned guard is dropped.
    pub fn scope(&mut self) -> PolicyScope<'_> {
        self.layers.push(PolicyLayer::default());
        PolicyScope { stack: self }
    }

    fn lookup<T>(&self, get: impl Fn(&PolicyLayer) -> Option<T>, default: T) -> T {
        self.layers.iter().rev().find_map(get).unwrap_or(default)
    }

    fn top(&mut self) -> &mut PolicyLayer {
        // the base layer is never popped
        let i = self.layers.len() - 1;
        &mut self.layers[i]
    }

    /// Whether single-column matrices render as parenthesized tuples rather than
    /// column matrices. Default: `false`.
    pub fn vector_as_tuple(&self) -> bool {
        self.lookup(|l| l.vector_as_tuple, false)
    }

    pub fn set_vector_as_tuple(&mut self, state: bool) {
        self.top().vector_as_tuple = Some(state);
    }

    /// Whether a single-variable derivative in the independent variable renders with
    /// prime notation. Default: `true`.
    pub fn deriv_use_primes(&self) -> bool {
        self.lookup(|l| l.deriv_use_primes, true)
    }

    pub fn set_deriv_use_primes(&mut self, state: bool) {
        self.top().deriv_use_primes = Some(state);
    }

    /// The independent variable recognized by the prime-notation feature.
    /// Default: `var("t")`.
    pub fn deriv_indep_var(&self) -> Expr {
        self.lookup(|l| l.deriv_indep_var.clone(), var("t"))
    }

    pub fn set_deriv_indep_var(&mut self, v: Expr) {
        self.top().deriv_indep_var = Some(v);
    }

    /// The highest derivative order rendered with primes; above it, parenthesized
    /// order notation is used. Default: `3`.
    pub fn deriv_primes_limit(&self) -> usize {
        self.lookup(|l| l.deriv_primes_limit, 3)
    }

    pub fn set_deriv_primes_limit(&mut self, n: usize) {
        self.top().deriv_primes_limit = Some(n);
    }
}

impl Default for PolicyStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for one policy scope. Derefs to the stack, so overrides set through the
/// guard land in the scope's own layer; dropping the guard removes the layer.
#[derive(Debug)]
pub struct PolicyScope<'a> {
    stack: &'a mut PolicyStack,
}

impl Drop for PolicyScope<'_> {
    fn drop(&mut self) {
        self.stack.layers.pop();
    }
}

impl std::ops::Deref for PolicyScope<'_> {
    type Target = PolicyStack;

    fn deref(&self) -> &PolicyStack {
        self.stack
    }
}

impl std::ops::DerefMut for PolicyScope<'_> {
    fn deref_mut(&mut self) -> &mut PolicyStack {
        self.stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let p = PolicyStack::new();
        assert!(!p.vector_as_tuple());
        assert!(p.deriv_use_primes());
        assert_eq!(p.deriv_indep_var(), var("t"));
        assert_eq!(p.deriv_primes_limit(), 3);
    }

    #[test]
    fn scope_overrides_revert_on_exit() {
        let mut p = PolicyStack::new();
        p.set_vector_as_tuple(false);
        {
            let mut scope = p.scope();
            scope.set_vector_as_tuple(true);
            assert!(scope.vector_as_tuple());
        }
        assert!(!p.vector_as_tuple());
    }

    #[test]
    fn inner_scope_inherits_outer_overrides() {
        let mut p = PolicyStack::new();
        p.set_deriv_primes_limit(5);
        let scope = p.scope();
        assert_eq!(scope.deriv_primes_limit(), 5);
    }

    #[test]
    fn scopes_nest() {
        let mut p = PolicyStack::new();
        {
            let mut outer = p.scope();
            outer.set_deriv_use_primes(false);
            {
                let mut inner = outer.scope();
                inner.set_deriv_use_primes(true);
                assert!(inner.deriv_use_primes());
            }
            assert!(!outer.deriv_use_primes());
        }
        assert!(p.deriv_use_primes());
    }

    #[test]
    fn scope_pops_on_early_exit() {
        let mut p = PolicyStack::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = p.scope();
            scope.set_vector_as_tuple(true);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!p.vector_as_tuple());
    }
}
