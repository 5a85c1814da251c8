//! Fixpoint-nesting structure of a formula.
//!
//! The tree has one node per `Mu`/`Nu` binder; boolean and modal connectives
//! are transparent, except that an `And`/`Or` whose branches both carry
//! fixpoints introduces an unlabeled *join* node holding the branch roots as
//! siblings. A binder sitting directly above a join *contracts*: it relabels
//! the join instead of wrapping it, so no spurious intermediate node appears.
//!
//! Nodes live in an arena and reference their parent by index; the
//! [`ParentRelation`] and [`TypeRelation`] derived here are what the reset
//! analysis and the depth metrics consume.

use std::collections::HashMap;

use crate::formula::Formula;

/// Whether a binder is a least (`mu`) or greatest (`nu`) fixpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FixpointKind {
    Least,
    Greatest,
}

impl std::fmt::Display for FixpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixpointKind::Least => write!(f, "least"),
            FixpointKind::Greatest => write!(f, "greatest"),
        }
    }
}

/// Variable name → name of the nearest enclosing binder. Root-level binders
/// are absent.
pub type ParentRelation = HashMap<String, String>;

/// Variable name → fixpoint kind of its binder.
pub type TypeRelation = HashMap<String, FixpointKind>;

/// Index of a node in the tree arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct TreeNode {
    /// `None` marks a structural join introduced for an `And`/`Or`.
    binder: Option<(String, FixpointKind)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The fixpoint-operator nesting tree of one formula.
///
/// Built once per formula, never mutated afterwards. A formula without
/// fixpoint operators yields a tree without a root.
#[derive(Debug)]
pub struct FixpointTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
}

impl FixpointTree {
    /// Builds the tree for a formula.
    pub fn build(formula: &Formula) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: None,
        };
        tree.root = tree.visit(formula);
        tree
    }

    /// The root node, absent for fixpoint-free formulas. The root may be a
    /// join when the formula combines top-level fixpoints under `And`/`Or`.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The binder label of a node, or `None` for a join.
    pub fn binder(&self, id: NodeId) -> Option<(&str, FixpointKind)> {
        self.nodes[id.0]
            .binder
            .as_ref()
            .map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Child nodes, in formula order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    fn alloc(&mut self, binder: Option<(String, FixpointKind)>, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        for &child in &children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(TreeNode {
            binder,
            parent: None,
            children,
        });
        id
    }

    fn visit(&mut self, formula: &Formula) -> Option<NodeId> {
        match formula {
            Formula::True | Formula::False | Formula::Var(_) => None,
            Formula::And(left, right) | Formula::Or(left, right) => {
                let left_root = self.visit(left);
                let right_root = self.visit(right);
                // Branches without fixpoints contribute no child, and a
                // single fixpoint-bearing branch is spliced in directly; a
                // join only appears when both branches carry fixpoints.
                let mut children: Vec<NodeId> =
                    [left_root, right_root].into_iter().flatten().collect();
                match children.len() {
                    0 => None,
                    1 => children.pop(),
                    _ => Some(self.alloc(None, children)),
                }
            }
            Formula::Box(_, sub) | Formula::Diamond(_, sub) => self.visit(sub),
            Formula::Mu(var, sub) => self.visit_binder(var, FixpointKind::Least, sub),
            Formula::Nu(var, sub) => self.visit_binder(var, FixpointKind::Greatest, sub),
        }
    }

    fn visit_binder(&mut self, var: &str, kind: FixpointKind, sub: &Formula) -> Option<NodeId> {
        let label = (var.to_string(), kind);
        match self.visit(sub) {
            None => Some(self.alloc(Some(label), Vec::new())),
            Some(child) if self.nodes[child.0].binder.is_none() => {
                // Contraction: take over the join produced by the body.
                self.nodes[child.0].binder = Some(label);
                Some(child)
            }
            Some(child) => Some(self.alloc(Some(label), vec![child])),
        }
    }

    /// Walks up from a node to its nearest binder-labeled ancestor.
    fn labeled_ancestor(&self, id: NodeId) -> Option<&(String, FixpointKind)> {
        let mut current = self.nodes[id.0].parent;
        while let Some(p) = current {
            if let Some(binder) = &self.nodes[p.0].binder {
                return Some(binder);
            }
            current = self.nodes[p.0].parent;
        }
        None
    }

    /// Derives the variable → enclosing-variable relation. Joins are
    /// skipped on the way up; only binder nodes count as parents.
    pub fn parent_relation(&self) -> ParentRelation {
        let mut relation = ParentRelation::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Some((name, _)) = &node.binder {
                if let Some((parent, _)) = self.labeled_ancestor(NodeId(idx)) {
                    relation.insert(name.clone(), parent.clone());
                }
            }
        }
        relation
    }

    /// Derives the variable → fixpoint-kind relation.
    pub fn type_relation(&self) -> TypeRelation {
        self.nodes
            .iter()
            .filter_map(|node| node.binder.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;

    fn build(input: &str) -> FixpointTree {
        let (formula, _) = parse_formula(input).unwrap();
        FixpointTree::build(&formula)
    }

    #[test]
    fn test_fixpoint_free_formula_has_no_tree() {
        assert!(build("true").root().is_none());
        assert!(build("[a] (X || <b> false)").root().is_none());
    }

    #[test]
    fn test_single_binder_is_a_leaf() {
        let tree = build("mu X. X");
        let root = tree.root().unwrap();
        assert_eq!(tree.binder(root), Some(("X", FixpointKind::Least)));
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_contraction_absorbs_join() {
        // nu X over an And of two fixpoint branches: the join contracts
        // into X, which ends up with exactly two children.
        let tree = build("nu X. (mu Y. Y && mu Z. Z)");
        let root = tree.root().unwrap();
        assert_eq!(tree.binder(root), Some(("X", FixpointKind::Greatest)));
        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.binder(children[0]), Some(("Y", FixpointKind::Least)));
        assert_eq!(tree.binder(children[1]), Some(("Z", FixpointKind::Least)));
    }

    #[test]
    fn test_top_level_join_stays_unlabeled() {
        let tree = build("(mu X. X && nu Y. Y)");
        let root = tree.root().unwrap();
        assert_eq!(tree.binder(root), None);
        assert_eq!(tree.children(root).len(), 2);
        assert!(tree.parent_relation().is_empty());
    }

    #[test]
    fn test_parent_and_type_relations() {
        let tree = build("nu X. (mu Y. Y && (mu Z. Z || nu Q. (mu V. Q && mu T. T)))");

        let parents = tree.parent_relation();
        let expected: ParentRelation = [
            ("Y", "X"),
            ("Z", "X"),
            ("Q", "X"),
            ("V", "Q"),
            ("T", "Q"),
        ]
        .into_iter()
        .map(|(c, p)| (c.to_string(), p.to_string()))
        .collect();
        assert_eq!(parents, expected);

        let types = tree.type_relation();
        let expected: TypeRelation = [
            ("X", FixpointKind::Greatest),
            ("Y", FixpointKind::Least),
            ("Z", FixpointKind::Least),
            ("Q", FixpointKind::Greatest),
            ("V", FixpointKind::Least),
            ("T", FixpointKind::Least),
        ]
        .into_iter()
        .map(|(v, k)| (v.to_string(), k))
        .collect();
        assert_eq!(types, expected);
    }

    #[test]
    fn test_chained_binders() {
        let tree = build("nu X. nu Y. mu Z. (X || (Y || Z))");
        let parents = tree.parent_relation();
        assert_eq!(parents.get("Y").map(String::as_str), Some("X"));
        assert_eq!(parents.get("Z").map(String::as_str), Some("Y"));
        assert_eq!(parents.get("X"), None);
    }
}
