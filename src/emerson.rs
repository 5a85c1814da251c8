//! Emerson-Lei fixpoint checker.
//!
//! Variables start out at the extremum matching their fixpoint kind (full
//! for `nu`, empty for `mu`) and keep their accumulated approximation across
//! visits. A `Nu` never re-initializes; a `Mu` clears exactly the variables
//! its precomputed reset relation names, which is only required when the
//! `Mu` restarts under an enclosing greatest fixpoint. This skips the bulk
//! of the naive checker's re-initialization work without changing any
//! result.

use std::collections::BTreeSet;
use std::time::Instant;

use log::debug;

use crate::checker::{CheckerOutput, EvalContext};
use crate::formula::Formula;
use crate::graph::Graph;
use crate::reset::{ResetRelation, ResetRelationCreator};
use crate::stateset::StateSet;
use crate::tree::{FixpointKind, FixpointTree};

/// The Emerson-Lei checker. Same re-entrancy discipline as the naive
/// checker: the graph is shared read-only and every `solve_formula` call
/// owns a fresh evaluation context and freshly derived relations.
pub struct EmersonLeiChecker<'g> {
    graph: &'g Graph,
}

impl<'g> EmersonLeiChecker<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Computes the set of states satisfying a closed formula.
    ///
    /// Always returns the same `satisfied_states` as
    /// [`NaiveChecker`](crate::naive::NaiveChecker) on the same input; only
    /// the iteration counts differ.
    pub fn solve_formula(&self, variables: &BTreeSet<String>, formula: &Formula) -> CheckerOutput {
        let start = Instant::now();

        // Purely syntactic, so derived once per formula.
        let tree = FixpointTree::build(formula);
        let type_relation = tree.type_relation();
        let reset_relation = ResetRelationCreator::new(&tree).find_relation(formula);
        debug!("reset relation: {:?}", reset_relation);

        let n = self.graph.num_nodes();
        let states = variables
            .iter()
            .map(|v| {
                let initial = match type_relation.get(v) {
                    Some(FixpointKind::Greatest) => StateSet::full(n),
                    _ => StateSet::empty(n),
                };
                (v.clone(), initial)
            })
            .collect();
        let mut ctx = EvalContext::new(self.graph, states);
        let satisfied_states = solve(&mut ctx, &reset_relation, formula);
        CheckerOutput {
            satisfied_states,
            num_iter: ctx.into_counts(),
            running_time: start.elapsed(),
        }
    }
}

fn solve(ctx: &mut EvalContext, resets: &ResetRelation, formula: &Formula) -> StateSet {
    match formula {
        Formula::Var(name) => ctx.state(name).clone(),
        Formula::True => ctx.full(),
        Formula::False => ctx.empty(),
        Formula::And(left, right) => {
            let mut result = solve(ctx, resets, left);
            let rhs = solve(ctx, resets, right);
            result.intersect_with(&rhs);
            result
        }
        Formula::Or(left, right) => {
            let mut result = solve(ctx, resets, left);
            let rhs = solve(ctx, resets, right);
            result.union_with(&rhs);
            result
        }
        Formula::Box(label, sub) => {
            let sub = solve(ctx, resets, sub);
            ctx.box_states(label, &sub)
        }
        Formula::Diamond(label, sub) => {
            let sub = solve(ctx, resets, sub);
            ctx.diamond_states(label, &sub)
        }
        // No re-initialization: whatever the last visit accumulated is
        // still a valid upper approximation, the reset relation on the
        // enclosed mus has already invalidated anything stale.
        Formula::Nu(var, sub) => iterate(ctx, resets, var, sub),
        Formula::Mu(var, sub) => {
            if let Some(stale) = resets.get(var) {
                debug!("restart of {} clears {:?}", var, stale);
                for name in stale {
                    ctx.reset_empty(name);
                }
            }
            iterate(ctx, resets, var, sub)
        }
    }
}

/// Same convergence loop and counting discipline as the naive checker,
/// picking up from whatever state is currently stored.
fn iterate(ctx: &mut EvalContext, resets: &ResetRelation, var: &str, body: &Formula) -> StateSet {
    loop {
        let previous = ctx.state(var).clone();
        let next = solve(ctx, resets, body);
        ctx.set_state(var, next);
        if *ctx.state(var) == previous {
            break;
        }
        ctx.bump(var);
    }
    ctx.state(var).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::naive::NaiveChecker;
    use crate::parser::parse_formula;

    fn check(graph: &Graph, input: &str) -> CheckerOutput {
        let (formula, variables) = parse_formula(input).unwrap();
        EmersonLeiChecker::new(graph).solve_formula(&variables, &formula)
    }

    fn assert_agrees_with_naive(graph: &Graph, input: &str) -> (usize, usize) {
        let (formula, variables) = parse_formula(input).unwrap();
        let naive = NaiveChecker::new(graph).solve_formula(&variables, &formula);
        let emerson = EmersonLeiChecker::new(graph).solve_formula(&variables, &formula);
        assert_eq!(
            naive.satisfied_states, emerson.satisfied_states,
            "checkers disagree on {}",
            input
        );
        let total = |out: &CheckerOutput| out.num_iter.values().sum::<usize>();
        (total(&naive), total(&emerson))
    }

    /// Two interleaved cycles with an escape edge.
    fn test_graph() -> Graph {
        let mut g = Graph::new(5, 0);
        g.add_edge(0, "a", 1);
        g.add_edge(1, "a", 2);
        g.add_edge(2, "a", 0);
        g.add_edge(1, "b", 3);
        g.add_edge(3, "b", 1);
        g.add_edge(3, "a", 4);
        g
    }

    #[test]
    fn test_trivial_graph() {
        let g = Graph::new(1, 0);
        assert_eq!(check(&g, "true").satisfied_states.to_vec(), vec![0]);
        assert!(check(&g, "false").satisfied_states.is_empty());
    }

    #[test]
    fn test_kind_aware_initialization() {
        let g = test_graph();
        // nu from full and mu from empty converge to the same answers the
        // naive checker finds.
        assert_agrees_with_naive(&g, "nu X. <a> X");
        assert_agrees_with_naive(&g, "mu X. ([a] X && [b] X)");
    }

    #[test]
    fn test_equivalence_on_alternating_formulas() {
        let g = test_graph();
        for input in [
            "nu X. mu Y. (<a> Y || <b> X)",
            "nu X. ([a] X && mu Y. (<a> Y || <b> true))",
            "nu X. nu Y. mu Z. mu A. (X || (Y || (mu B. B && true)))",
            "nu X. nu Y. mu Z. mu A. (A || (Z || mu B. (B && X)))",
            "nu X. (mu Y. X && mu Z. X)",
            "mu X. (mu Y. (Y && X) && (mu Z. Z || <a> X))",
        ] {
            assert_agrees_with_naive(&g, input);
        }
    }

    #[test]
    fn test_reset_saves_iterations() {
        let g = test_graph();
        // Alternation is where the reset technique pays: the inner mu keeps
        // its approximation across outer nu rounds.
        let (naive_total, emerson_total) =
            assert_agrees_with_naive(&g, "nu X. mu Y. (<a> Y || <b> X)");
        assert!(
            emerson_total <= naive_total,
            "emerson took {} iterations, naive {}",
            emerson_total,
            naive_total
        );
    }

    #[test]
    fn test_counters_cover_all_variables() {
        let g = test_graph();
        let out = check(&g, "nu X. mu Y. (<a> Y || <b> X)");
        assert_eq!(out.num_iter.len(), 2);
        assert!(out.num_iter.contains_key("X"));
        assert!(out.num_iter.contains_key("Y"));
    }
}
