//! The Emerson-Lei reset relation.
//!
//! For each least-fixpoint variable nested directly inside a greatest
//! fixpoint, this analysis lists the least variables whose accumulated
//! approximations go stale when the outer iteration restarts, and must
//! therefore be cleared to empty. Only `Mu` binders ever contribute entries;
//! `Nu` accumulation never needs clearing and recurses transparently. The
//! asymmetry is intentional and pinned down by the test cases below.
//!
//! Purely syntactic: computed once per formula, before any iteration.

use std::collections::{BTreeSet, HashMap};

use crate::formula::Formula;
use crate::tree::{FixpointKind, FixpointTree, ParentRelation, TypeRelation};

/// Least-fixpoint variable → variables to clear when it restarts.
pub type ResetRelation = HashMap<String, Vec<String>>;

/// Derives the [`ResetRelation`] for a formula from its fixpoint tree.
pub struct ResetRelationCreator {
    parent_relation: ParentRelation,
    type_relation: TypeRelation,
}

impl ResetRelationCreator {
    pub fn new(tree: &FixpointTree) -> Self {
        Self {
            parent_relation: tree.parent_relation(),
            type_relation: tree.type_relation(),
        }
    }

    /// Computes the reset relation for the whole formula.
    pub fn find_relation(&self, formula: &Formula) -> ResetRelation {
        let mut relation = ResetRelation::new();
        self.collect(formula, &mut relation);
        relation
    }

    fn collect(&self, formula: &Formula, out: &mut ResetRelation) {
        match formula {
            Formula::True | Formula::False | Formula::Var(_) => {}
            Formula::And(left, right) | Formula::Or(left, right) => {
                self.collect(left, out);
                self.collect(right, out);
            }
            Formula::Box(_, sub) | Formula::Diamond(_, sub) => self.collect(sub, out),
            // Greatest fixpoints contribute no entry of their own.
            Formula::Nu(_, sub) => self.collect(sub, out),
            Formula::Mu(var, _) => {
                // Resets only pay off for a mu restarted by an enclosing nu;
                // a top-level mu has no surrounding scope to optimize
                // against, and a mu under a mu is re-run wholesale anyway.
                let parent = match self.parent_relation.get(var) {
                    Some(parent) => parent,
                    None => return,
                };
                if self.type_relation.get(parent) == Some(&FixpointKind::Greatest) {
                    let mut resets = Vec::new();
                    self.check_subformulas(formula, &mut resets);
                    out.insert(var.clone(), resets);
                }
            }
        }
    }

    /// Scans a `Mu` subformula for nested `Mu` binders, at arbitrary depth,
    /// whose body keeps a variable open beyond their own binder; those carry
    /// state across restarts and belong in the reset set.
    fn check_subformulas(&self, formula: &Formula, out: &mut Vec<String>) {
        match formula {
            Formula::True | Formula::False | Formula::Var(_) => {}
            Formula::And(left, right) | Formula::Or(left, right) => {
                self.check_subformulas(left, out);
                self.check_subformulas(right, out);
            }
            Formula::Box(_, sub) | Formula::Diamond(_, sub) => self.check_subformulas(sub, out),
            Formula::Nu(_, sub) => self.check_subformulas(sub, out),
            Formula::Mu(var, sub) => {
                let mut bound = BTreeSet::from([var.clone()]);
                let mut open = Vec::new();
                open_variables(sub, &mut bound, &mut open);
                if !open.is_empty() {
                    out.push(var.clone());
                }
                self.check_subformulas(sub, out);
            }
        }
    }
}

/// Free-variable scan: appends to `out` every variable occurrence not bound
/// by `bound` or by a binder inside `formula` itself.
pub fn open_variables(formula: &Formula, bound: &mut BTreeSet<String>, out: &mut Vec<String>) {
    match formula {
        Formula::True | Formula::False => {}
        Formula::Var(name) => {
            if !bound.contains(name) {
                out.push(name.clone());
            }
        }
        Formula::And(left, right) | Formula::Or(left, right) => {
            open_variables(left, bound, out);
            open_variables(right, bound, out);
        }
        Formula::Box(_, sub) | Formula::Diamond(_, sub) => open_variables(sub, bound, out),
        Formula::Mu(var, sub) | Formula::Nu(var, sub) => {
            let added = bound.insert(var.clone());
            open_variables(sub, bound, out);
            if added {
                bound.remove(var);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;

    fn relation_of(input: &str) -> ResetRelation {
        let (formula, _) = parse_formula(input).unwrap();
        let tree = FixpointTree::build(&formula);
        ResetRelationCreator::new(&tree).find_relation(&formula)
    }

    fn expected(entries: &[(&str, &[&str])]) -> ResetRelation {
        entries
            .iter()
            .map(|(var, resets)| {
                (
                    var.to_string(),
                    resets.iter().map(|r| r.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_self_and_sibling_reset() {
        let relation = relation_of("nu X. nu Y. mu Z. mu A. (X || (Y || (mu B. B && true)))");
        // B's body holds nothing open beyond B itself, so B stays out.
        assert_eq!(relation, expected(&[("Z", &["Z", "A"])]));
    }

    #[test]
    fn test_deeply_nested_open_mu_included() {
        let relation = relation_of("nu X. nu Y. mu Z. mu A. (X || (Y || mu B. (B && X)))");
        assert_eq!(relation, expected(&[("Z", &["Z", "A", "B"])]));
    }

    #[test]
    fn test_closed_outer_mu_excluded() {
        let relation = relation_of("nu X. nu Y. mu Z. mu A. (A || (Z || mu B. (B && true)))");
        // Z's body only mentions variables bound within it, so Z itself does
        // not carry state across restarts.
        assert_eq!(relation, expected(&[("Z", &["A"])]));
    }

    #[test]
    fn test_sibling_mus_each_get_entries() {
        let relation = relation_of("nu X. (mu Y. X && mu Z. X)");
        assert_eq!(relation, expected(&[("Z", &["Z"]), ("Y", &["Y"])]));
    }

    #[test]
    fn test_top_level_mu_contributes_nothing() {
        assert!(relation_of("mu X. mu Y. (X || Y)").is_empty());
    }

    #[test]
    fn test_mu_under_mu_parent_contributes_nothing() {
        // The enclosing binder must be a greatest fixpoint.
        assert!(relation_of("mu X. mu Y. (X || Y)").is_empty());
        assert!(relation_of("nu X. mu Y. mu Z. (Y && Z)")
            .keys()
            .eq(["Y"].iter()));
    }

    #[test]
    fn test_open_variables_scan() {
        let (formula, _) = parse_formula("mu Y. (X || nu Z. (Z && Y))").unwrap();
        let mut bound = BTreeSet::new();
        let mut open = Vec::new();
        open_variables(&formula, &mut bound, &mut open);
        assert_eq!(open, vec!["X".to_string()]);
        assert!(bound.is_empty());
    }
}
