//! Parser for the `.mcf` formula surface syntax.
//!
//! Grammar (recursion variables are single uppercase letters, action labels
//! run to the closing bracket):
//!
//! ```text
//! f ::= true | false | X
//!     | (f && f) | (f || f)
//!     | mu X. f | nu X. f
//!     | [label] f | <label> f
//! ```
//!
//! Query files may contain `%` comment lines and arbitrary line breaks;
//! [`parse_query`] strips those before parsing.

use std::collections::BTreeSet;

use crate::formula::Formula;

/// Parses a query file's contents: drops `%` comment lines, collapses
/// whitespace, and parses the remaining text as one formula.
///
/// Returns the formula together with the set of recursion variables it uses,
/// which the checkers take as the domain of their evaluation state.
pub fn parse_query(text: &str) -> Result<(Formula, BTreeSet<String>), String> {
    let cleaned: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('%'))
        .collect();
    let joined = cleaned.join(" ");
    let normalized: Vec<&str> = joined.split_whitespace().collect();
    parse_formula(&normalized.join(" "))
}

/// Parses a single formula from an already-normalized string.
pub fn parse_formula(input: &str) -> Result<(Formula, BTreeSet<String>), String> {
    let mut parser = Parser::new(input);
    let formula = parser.parse()?;
    parser.skip_whitespace();
    if parser.index < parser.chars.len() {
        return Err(format!(
            "trailing input at position {}: {:?}",
            parser.index,
            parser.rest()
        ));
    }
    Ok((formula, parser.variables))
}

struct Parser {
    chars: Vec<char>,
    index: usize,
    variables: BTreeSet<String>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
            variables: BTreeSet::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn rest(&self) -> String {
        self.chars[self.index..].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(' ') {
            self.index += 1;
        }
    }

    fn expect(&mut self, expected: &str) -> Result<(), String> {
        for c in expected.chars() {
            if self.peek() != Some(c) {
                return Err(format!(
                    "expected {:?} at position {}, found {:?}",
                    expected,
                    self.index,
                    self.rest()
                ));
            }
            self.index += 1;
        }
        Ok(())
    }

    fn parse(&mut self) -> Result<Formula, String> {
        match self.peek() {
            Some('t') => self.parse_literal("true", Formula::True),
            Some('f') => self.parse_literal("false", Formula::False),
            Some(c) if c.is_ascii_uppercase() => Ok(Formula::Var(self.parse_variable()?)),
            Some('(') => self.parse_logic(),
            Some('m') => self.parse_binder("mu"),
            Some('n') => self.parse_binder("nu"),
            Some('[') => self.parse_modal('[', ']'),
            Some('<') => self.parse_modal('<', '>'),
            Some(c) => Err(format!(
                "unexpected character {:?} at position {}",
                c, self.index
            )),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn parse_literal(&mut self, keyword: &str, value: Formula) -> Result<Formula, String> {
        self.expect(keyword)?;
        self.skip_whitespace();
        Ok(value)
    }

    fn parse_variable(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(c) if c.is_ascii_uppercase() => {
                self.index += 1;
                self.skip_whitespace();
                let name = c.to_string();
                // Closed formulas are assumed, so every occurrence is a
                // variable the checkers must track.
                self.variables.insert(name.clone());
                Ok(name)
            }
            _ => Err(format!(
                "expected recursion variable at position {}, found {:?}",
                self.index,
                self.rest()
            )),
        }
    }

    fn parse_logic(&mut self) -> Result<Formula, String> {
        self.expect("(")?;
        self.skip_whitespace();
        let first = self.parse()?;
        self.skip_whitespace();
        let is_and = match self.peek() {
            Some('&') => {
                self.expect("&&")?;
                true
            }
            Some('|') => {
                self.expect("||")?;
                false
            }
            _ => {
                return Err(format!(
                    "expected \"&&\" or \"||\" at position {}, found {:?}",
                    self.index,
                    self.rest()
                ))
            }
        };
        self.skip_whitespace();
        let second = self.parse()?;
        self.skip_whitespace();
        self.expect(")")?;
        self.skip_whitespace();
        if is_and {
            Ok(Formula::and(first, second))
        } else {
            Ok(Formula::or(first, second))
        }
    }

    fn parse_binder(&mut self, keyword: &str) -> Result<Formula, String> {
        self.expect(keyword)?;
        self.skip_whitespace();
        let var = self.parse_variable()?;
        self.expect(".")?;
        self.skip_whitespace();
        let body = self.parse()?;
        if keyword == "mu" {
            Ok(Formula::mu(var, body))
        } else {
            Ok(Formula::nu(var, body))
        }
    }

    fn parse_modal(&mut self, open: char, close: char) -> Result<Formula, String> {
        self.expect(&open.to_string())?;
        let mut label = String::new();
        loop {
            match self.peek() {
                Some(c) if c == close => break,
                Some(c) => {
                    label.push(c);
                    self.index += 1;
                }
                None => {
                    return Err(format!(
                        "unterminated action label, missing {:?}",
                        close
                    ))
                }
            }
        }
        self.expect(&close.to_string())?;
        self.skip_whitespace();
        let sub = self.parse()?;
        if open == '[' {
            Ok(Formula::box_(label, sub))
        } else {
            Ok(Formula::diamond(label, sub))
        }
    }
}
