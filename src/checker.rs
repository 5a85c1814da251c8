//! Shared machinery for the two fixpoint checkers.
//!
//! Both checkers thread an [`EvalContext`] by `&mut` through their recursive
//! `solve`; the context owns the per-run variable states and iteration
//! counters, so a checker itself stays stateless and re-entrant: concurrent
//! `solve_formula` calls on one checker each get a fresh context.

use std::collections::HashMap;
use std::time::Duration;

use crate::graph::Graph;
use crate::stateset::StateSet;

/// Result of one `solve_formula` run.
#[derive(Debug, Clone)]
pub struct CheckerOutput {
    /// The states satisfying the formula.
    pub satisfied_states: StateSet,
    /// Fixpoint iterations performed per recursion variable. Only
    /// state-changing iterations count; the final converging recomputation
    /// does not.
    pub num_iter: HashMap<String, usize>,
    /// Wall-clock time of the run.
    pub running_time: Duration,
}

/// Mutable evaluation state for a single `solve_formula` run.
pub(crate) struct EvalContext<'g> {
    graph: &'g Graph,
    var_state: HashMap<String, StateSet>,
    num_iter: HashMap<String, usize>,
}

impl<'g> EvalContext<'g> {
    /// Creates a context with the given initial state per variable and all
    /// iteration counters at zero.
    pub fn new(graph: &'g Graph, var_state: HashMap<String, StateSet>) -> Self {
        let num_iter = var_state.keys().map(|v| (v.clone(), 0)).collect();
        Self {
            graph,
            var_state,
            num_iter,
        }
    }

    /// The set of every state.
    pub fn full(&self) -> StateSet {
        StateSet::full(self.graph.num_nodes())
    }

    /// The set of no state.
    pub fn empty(&self) -> StateSet {
        StateSet::empty(self.graph.num_nodes())
    }

    /// Current stored state of a recursion variable.
    ///
    /// # Panics
    ///
    /// Panics if the variable has no stored state. The checkers require
    /// closed formulas; a miss here means a free variable slipped through,
    /// an internal-consistency fault we never paper over with a default.
    pub fn state(&self, name: &str) -> &StateSet {
        self.var_state
            .get(name)
            .unwrap_or_else(|| panic!("recursion variable {:?} has no stored state", name))
    }

    /// Replaces the stored state of a variable.
    pub fn set_state(&mut self, name: &str, set: StateSet) {
        self.var_state.insert(name.to_string(), set);
    }

    /// Clears the stored state of a variable to the empty set, in place.
    ///
    /// # Panics
    ///
    /// Panics if the variable has no stored state.
    pub fn reset_empty(&mut self, name: &str) {
        self.var_state
            .get_mut(name)
            .unwrap_or_else(|| panic!("recursion variable {:?} has no stored state", name))
            .clear();
    }

    /// Counts one state-changing fixpoint iteration on a variable.
    pub fn bump(&mut self, name: &str) {
        *self.num_iter.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Consumes the context, yielding the iteration counters.
    pub fn into_counts(self) -> HashMap<String, usize> {
        self.num_iter
    }

    /// `[label] sub`: the states whose every `label`-successor lies in
    /// `sub`. States without `label`-edges qualify vacuously.
    pub fn box_states(&self, label: &str, sub: &StateSet) -> StateSet {
        let mut result = self.empty();
        for node in 0..self.graph.num_nodes() {
            if self.graph.outgoing(node, label).all(|dst| sub.contains(dst)) {
                result.add(node);
            }
        }
        result
    }

    /// `<label> sub`: the states with at least one `label`-successor in
    /// `sub`. States without `label`-edges never qualify.
    pub fn diamond_states(&self, label: &str, sub: &StateSet) -> StateSet {
        let mut result = self.empty();
        for node in 0..self.graph.num_nodes() {
            if self.graph.outgoing(node, label).any(|dst| sub.contains(dst)) {
                result.add(node);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond_graph() -> Graph {
        let mut g = Graph::new(4, 0);
        g.add_edge(0, "a", 1);
        g.add_edge(0, "a", 2);
        g.add_edge(1, "b", 3);
        g.add_edge(2, "a", 3);
        g
    }

    #[test]
    fn test_box_vacuous_truth() {
        let g = diamond_graph();
        let ctx = EvalContext::new(&g, HashMap::new());
        // No state is in the target set, so only a-edge-free states qualify.
        let result = ctx.box_states("a", &StateSet::empty(4));
        assert_eq!(result.to_vec(), vec![1, 3]);
    }

    #[test]
    fn test_diamond_vacuous_falsehood() {
        let g = diamond_graph();
        let ctx = EvalContext::new(&g, HashMap::new());
        // Even against the full set, a-edge-free states never qualify.
        let result = ctx.diamond_states("a", &StateSet::full(4));
        assert_eq!(result.to_vec(), vec![0, 2]);
    }

    #[test]
    fn test_box_requires_all_successors() {
        let g = diamond_graph();
        let ctx = EvalContext::new(&g, HashMap::new());
        let mut sub = StateSet::empty(4);
        sub.add(1);
        // 0 has a-successors {1, 2}; only 1 is in sub, so 0 drops out.
        let result = ctx.box_states("a", &sub);
        assert_eq!(result.to_vec(), vec![1, 3]);
    }

    #[test]
    #[should_panic(expected = "has no stored state")]
    fn test_unbound_variable_is_fatal() {
        let g = diamond_graph();
        let ctx = EvalContext::new(&g, HashMap::new());
        ctx.state("X");
    }
}
