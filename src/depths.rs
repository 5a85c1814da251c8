//! Static depth metrics over the fixpoint structure of a formula.
//!
//! These are simple tree recursions used to characterize benchmark queries,
//! not part of the fixpoint engine: nested depth counts binder nesting,
//! alternation depth counts kind changes along binder chains, and dependent
//! alternation depth additionally requires each alternating step to carry a
//! real data dependency (the outer variable occurs free in the inner body).

use std::collections::{BTreeSet, HashMap};

use crate::formula::Formula;
use crate::reset::open_variables;
use crate::tree::{FixpointKind, FixpointTree, TypeRelation};

/// The three depth metrics of one formula.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DepthMetrics {
    pub nested: usize,
    pub alternation: usize,
    pub dependent_alternation: usize,
}

/// Computes all three metrics. A fixpoint-free formula has all depths 0.
pub fn compute(formula: &Formula, tree: &FixpointTree) -> DepthMetrics {
    let parents = tree.parent_relation();
    let types = tree.type_relation();

    // Binder -> child binders, with root-level binders kept separately.
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut roots: Vec<&str> = Vec::new();
    for var in types.keys() {
        match parents.get(var) {
            Some(parent) => children.entry(parent).or_default().push(var),
            None => roots.push(var),
        }
    }

    let nested = roots
        .iter()
        .map(|root| chain_depth(root, &children))
        .max()
        .unwrap_or(0);

    // Alternating chains may start at any binder, not just a root.
    let alternation = types
        .keys()
        .map(|var| alternating_depth(var, types[var.as_str()], &children, &types, None))
        .max()
        .unwrap_or(0);

    let open = open_variable_map(formula);
    let dependent_alternation = types
        .keys()
        .map(|var| alternating_depth(var, types[var.as_str()], &children, &types, Some(&open)))
        .max()
        .unwrap_or(0);

    DepthMetrics {
        nested,
        alternation,
        dependent_alternation,
    }
}

fn kids<'a>(var: &str, children: &'a HashMap<&str, Vec<&'a str>>) -> &'a [&'a str] {
    children.get(var).map(Vec::as_slice).unwrap_or(&[])
}

fn chain_depth(var: &str, children: &HashMap<&str, Vec<&str>>) -> usize {
    1 + kids(var, children)
        .iter()
        .map(|child| chain_depth(child, children))
        .max()
        .unwrap_or(0)
}

/// Longest chain downward from `var` in which every step switches fixpoint
/// kind. With `open` given, a step into a child additionally requires the
/// parent variable to be open in the child binder's body.
fn alternating_depth(
    var: &str,
    kind: FixpointKind,
    children: &HashMap<&str, Vec<&str>>,
    types: &TypeRelation,
    open: Option<&HashMap<String, Vec<String>>>,
) -> usize {
    let deepest = kids(var, children)
        .iter()
        .copied()
        .filter(|child| types[*child] != kind)
        .filter(|child| match open {
            Some(map) => map[*child].iter().any(|name| name == var),
            None => true,
        })
        .map(|child| alternating_depth(child, types[child], children, types, open))
        .max()
        .unwrap_or(0);
    1 + deepest
}

/// For each binder, the variables occurring free in its body (its own
/// variable counted as bound).
fn open_variable_map(formula: &Formula) -> HashMap<String, Vec<String>> {
    let mut map = HashMap::new();
    collect_open(formula, &mut map);
    map
}

fn collect_open(formula: &Formula, map: &mut HashMap<String, Vec<String>>) {
    match formula {
        Formula::True | Formula::False | Formula::Var(_) => {}
        Formula::And(left, right) | Formula::Or(left, right) => {
            collect_open(left, map);
            collect_open(right, map);
        }
        Formula::Box(_, sub) | Formula::Diamond(_, sub) => collect_open(sub, map),
        Formula::Mu(var, sub) | Formula::Nu(var, sub) => {
            let mut bound = BTreeSet::from([var.clone()]);
            let mut open = Vec::new();
            open_variables(sub, &mut bound, &mut open);
            map.insert(var.clone(), open);
            collect_open(sub, map);
        }
    }
}
