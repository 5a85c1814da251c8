//! # mucalc-rs: modal mu-calculus model checking in Rust
//!
//! **`mucalc-rs`** is an explicit-state model checker for the modal
//! mu-calculus: given a labeled transition graph and a fixpoint formula, it
//! computes the set of graph states satisfying the formula.
//!
//! ## How it works
//!
//! Formulas combine boolean connectives, the modal operators `[a]`/`<a>`
//! over action labels, and least (`mu`) / greatest (`nu`) fixpoint binders.
//! Fixpoints are solved by Knaster-Tarski iteration over dense bit-vector
//! state sets, either naively (every binder restarts from scratch on every
//! visit) or with the Emerson-Lei optimization, which precomputes a *reset
//! relation* from the formula's fixpoint-nesting structure and only clears
//! the approximations that alternation actually invalidates. Both checkers
//! always compute the same answer; the optimized one iterates less.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mucalc_rs::graph::Graph;
//! use mucalc_rs::naive::NaiveChecker;
//! use mucalc_rs::parser::parse_formula;
//!
//! // A tiny machine: 0 -a-> 1 -b-> 0
//! let mut graph = Graph::new(2, 0);
//! graph.add_edge(0, "a", 1);
//! graph.add_edge(1, "b", 0);
//!
//! // "Along a/b steps, a b-step is always reachable."
//! let (formula, variables) = parse_formula("mu X. (<b> true || <a> X)").unwrap();
//!
//! let checker = NaiveChecker::new(&graph);
//! let output = checker.solve_formula(&variables, &formula);
//! assert_eq!(output.satisfied_states.to_vec(), vec![0, 1]);
//! ```
//!
//! ## Core Components
//!
//! - **[`formula`]**: the `Formula` AST and its `.mcf` surface syntax.
//! - **[`graph`]**: labeled transition graphs and the Aldebaran (`.aut`) loader.
//! - **[`stateset`]**: the packed bit-vector state sets both checkers iterate on.
//! - **[`tree`]** / **[`reset`]**: the fixpoint-nesting analysis feeding Emerson-Lei.
//! - **[`naive`]** / **[`emerson`]**: the two checkers.
//! - **[`depths`]**: nesting/alternation depth metrics for characterizing queries.

pub mod checker;
pub mod depths;
pub mod emerson;
pub mod formula;
pub mod graph;
pub mod naive;
pub mod parser;
pub mod reset;
pub mod stateset;
pub mod tree;
