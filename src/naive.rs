//! Naive fixpoint checker.
//!
//! Straightforward Knaster-Tarski evaluation: every visit of a `Mu` restarts
//! its variable from the empty set and every visit of a `Nu` from the full
//! set, regardless of what an earlier visit accumulated. Correct for any
//! closed, monotone formula, and the baseline the Emerson-Lei checker is
//! measured against.

use std::collections::BTreeSet;
use std::time::Instant;

use log::debug;

use crate::checker::{CheckerOutput, EvalContext};
use crate::formula::Formula;
use crate::graph::Graph;
use crate::stateset::StateSet;

/// The naive checker. Stateless apart from the graph reference; each
/// [`solve_formula`](NaiveChecker::solve_formula) call owns a fresh
/// evaluation context, so calls are re-entrant and the checker can be shared
/// read-only.
pub struct NaiveChecker<'g> {
    graph: &'g Graph,
}

impl<'g> NaiveChecker<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Computes the set of states satisfying a closed formula.
    ///
    /// `variables` is the set of recursion variables occurring in the
    /// formula, as reported by the parser. Non-monotone formulas are a
    /// documented precondition violation and may not terminate.
    pub fn solve_formula(&self, variables: &BTreeSet<String>, formula: &Formula) -> CheckerOutput {
        let start = Instant::now();
        let n = self.graph.num_nodes();
        let states = variables
            .iter()
            .map(|v| (v.clone(), StateSet::empty(n)))
            .collect();
        let mut ctx = EvalContext::new(self.graph, states);
        let satisfied_states = solve(&mut ctx, formula);
        CheckerOutput {
            satisfied_states,
            num_iter: ctx.into_counts(),
            running_time: start.elapsed(),
        }
    }
}

fn solve(ctx: &mut EvalContext, formula: &Formula) -> StateSet {
    match formula {
        Formula::Var(name) => ctx.state(name).clone(),
        Formula::True => ctx.full(),
        Formula::False => ctx.empty(),
        Formula::And(left, right) => {
            let mut result = solve(ctx, left);
            let rhs = solve(ctx, right);
            result.intersect_with(&rhs);
            result
        }
        Formula::Or(left, right) => {
            let mut result = solve(ctx, left);
            let rhs = solve(ctx, right);
            result.union_with(&rhs);
            result
        }
        Formula::Box(label, sub) => {
            let sub = solve(ctx, sub);
            ctx.box_states(label, &sub)
        }
        Formula::Diamond(label, sub) => {
            let sub = solve(ctx, sub);
            ctx.diamond_states(label, &sub)
        }
        Formula::Nu(var, sub) => {
            // Descending iteration from the top.
            let full = ctx.full();
            ctx.set_state(var, full);
            iterate(ctx, var, sub)
        }
        Formula::Mu(var, sub) => {
            // Ascending iteration from the bottom.
            let empty = ctx.empty();
            ctx.set_state(var, empty);
            iterate(ctx, var, sub)
        }
    }
}

/// Recomputes the body until the stored state stops changing. Counts only
/// the state-changing rounds.
fn iterate(ctx: &mut EvalContext, var: &str, body: &Formula) -> StateSet {
    loop {
        let previous = ctx.state(var).clone();
        let next = solve(ctx, body);
        ctx.set_state(var, next);
        if *ctx.state(var) == previous {
            break;
        }
        ctx.bump(var);
    }
    debug!("fixpoint for {} reached with {} states", var, ctx.state(var).len());
    ctx.state(var).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::parser::parse_formula;

    fn check(graph: &Graph, input: &str) -> CheckerOutput {
        let (formula, variables) = parse_formula(input).unwrap();
        NaiveChecker::new(graph).solve_formula(&variables, &formula)
    }

    /// 0 -a-> 1 -a-> 2 -b-> 0
    fn line_graph() -> Graph {
        let mut g = Graph::new(3, 0);
        g.add_edge(0, "a", 1);
        g.add_edge(1, "a", 2);
        g.add_edge(2, "b", 0);
        g
    }

    #[test]
    fn test_trivial_graph_literals() {
        let g = Graph::new(1, 0);
        assert_eq!(check(&g, "true").satisfied_states.to_vec(), vec![0]);
        assert!(check(&g, "false").satisfied_states.is_empty());
    }

    #[test]
    fn test_modal_operators() {
        let g = line_graph();
        // 2 has no a-edge: vacuously boxed, never diamonded.
        assert_eq!(check(&g, "[a] false").satisfied_states.to_vec(), vec![2]);
        assert_eq!(check(&g, "<a> true").satisfied_states.to_vec(), vec![0, 1]);
        assert_eq!(check(&g, "<b> true").satisfied_states.to_vec(), vec![2]);
    }

    #[test]
    fn test_least_fixpoint_reachability() {
        let g = line_graph();
        // Reach a state with a b-edge via a-steps.
        let out = check(&g, "mu X. (<b> true || <a> X)");
        assert_eq!(out.satisfied_states.to_vec(), vec![0, 1, 2]);
        // 3 ascending rounds: {2}, {1,2}, {0,1,2}; the 4th recomputation
        // only confirms convergence and is not counted.
        assert_eq!(out.num_iter["X"], 3);
    }

    #[test]
    fn test_greatest_fixpoint_infinite_path() {
        let g = line_graph();
        // No a-cycle anywhere, so no infinite a-path.
        assert!(check(&g, "nu X. <a> X").satisfied_states.is_empty());

        let mut cyclic = Graph::new(3, 0);
        cyclic.add_edge(0, "a", 1);
        cyclic.add_edge(1, "a", 0);
        cyclic.add_edge(1, "b", 2);
        assert_eq!(
            check(&cyclic, "nu X. <a> X").satisfied_states.to_vec(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_convergence_bound() {
        let g = line_graph();
        let out = check(&g, "mu X. <a> X");
        for (var, count) in &out.num_iter {
            assert!(
                *count <= g.num_nodes() + 1,
                "{} took {} iterations",
                var,
                count
            );
        }
    }

    #[test]
    fn test_immediate_self_reference() {
        let g = line_graph();
        assert!(check(&g, "mu X. X").satisfied_states.is_empty());
        assert_eq!(check(&g, "nu X. X").satisfied_states.len(), 3);
    }
}
