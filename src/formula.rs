//! Modal mu-calculus formulas.
//!
//! A [`Formula`] is an immutable tree: boolean connectives, the modal
//! operators box/diamond over an action label, and least (`mu`) / greatest
//! (`nu`) fixpoint binders over recursion variables. The checkers assume the
//! formula is closed (every variable is bound by an enclosing binder of the
//! same name) and that binder names are unique; neither is re-validated here.

use std::fmt;

/// A mu-calculus formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// `true`: satisfied by every state.
    True,
    /// `false`: satisfied by no state.
    False,
    /// A recursion variable bound by an enclosing `Mu`/`Nu`.
    Var(String),
    /// Conjunction.
    And(Box<Formula>, Box<Formula>),
    /// Disjunction.
    Or(Box<Formula>, Box<Formula>),
    /// `[label] f`: every `label`-successor satisfies `f`.
    Box(String, Box<Formula>),
    /// `<label> f`: some `label`-successor satisfies `f`.
    Diamond(String, Box<Formula>),
    /// Least fixpoint binder `mu X. f`.
    Mu(String, Box<Formula>),
    /// Greatest fixpoint binder `nu X. f`.
    Nu(String, Box<Formula>),
}

impl Formula {
    pub fn var(name: impl Into<String>) -> Self {
        Formula::Var(name.into())
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Formula::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Formula::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn box_(label: impl Into<String>, f: Self) -> Self {
        Formula::Box(label.into(), Box::new(f))
    }

    pub fn diamond(label: impl Into<String>, f: Self) -> Self {
        Formula::Diamond(label.into(), Box::new(f))
    }

    pub fn mu(var: impl Into<String>, f: Self) -> Self {
        Formula::Mu(var.into(), Box::new(f))
    }

    pub fn nu(var: impl Into<String>, f: Self) -> Self {
        Formula::Nu(var.into(), Box::new(f))
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "true"),
            Formula::False => write!(f, "false"),
            Formula::Var(name) => write!(f, "{}", name),
            Formula::And(lhs, rhs) => write!(f, "({} && {})", lhs, rhs),
            Formula::Or(lhs, rhs) => write!(f, "({} || {})", lhs, rhs),
            Formula::Box(label, sub) => write!(f, "[{}] {}", label, sub),
            Formula::Diamond(label, sub) => write!(f, "<{}> {}", label, sub),
            Formula::Mu(var, sub) => write!(f, "mu {}. {}", var, sub),
            Formula::Nu(var, sub) => write!(f, "nu {}. {}", var, sub),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_roundtrips_surface_syntax() {
        let f = Formula::nu(
            "X",
            Formula::and(
                Formula::mu("Y", Formula::var("Y")),
                Formula::box_("tau", Formula::or(Formula::True, Formula::False)),
            ),
        );
        assert_eq!(f.to_string(), "nu X. (mu Y. Y && [tau] (true || false))");
    }

    #[test]
    fn test_diamond_display() {
        let f = Formula::diamond("send", Formula::var("X"));
        assert_eq!(f.to_string(), "<send> X");
    }
}
