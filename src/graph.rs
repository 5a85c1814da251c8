//! Labeled transition graphs and the Aldebaran (`.aut`) loader.
//!
//! Aldebaran format:
//!
//! ```text
//! des (first_state, nr_of_edges, nr_of_states)
//! (src, "label", dst)
//! (src, "label", dst)
//! ...
//! ```
//!
//! The checkers only need `num_nodes` plus exact-label successor lookup;
//! everything else about the file format stays in this module.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A single labeled edge out of some source state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub destination: usize,
    pub label: String,
}

/// A labeled transition graph over states `0..num_nodes`.
///
/// Immutable after construction. Read-only sharing across checkers is safe.
#[derive(Debug, Clone)]
pub struct Graph {
    num_nodes: usize,
    first_state: usize,
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    /// Creates a graph with no edges.
    ///
    /// # Panics
    ///
    /// Panics if `first_state` is not a valid state (except for the empty
    /// graph, where it must be 0).
    pub fn new(num_nodes: usize, first_state: usize) -> Self {
        assert!(
            first_state < num_nodes || (num_nodes == 0 && first_state == 0),
            "first state {} out of range",
            first_state
        );
        Self {
            num_nodes,
            first_state,
            adjacency: vec![Vec::new(); num_nodes],
        }
    }

    /// Number of states.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// The initial state named in the `.aut` header.
    #[inline]
    pub fn first_state(&self) -> usize {
        self.first_state
    }

    /// Adds a labeled edge.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is out of range.
    pub fn add_edge(&mut self, src: usize, label: impl Into<String>, dst: usize) {
        assert!(src < self.num_nodes, "source state {} out of range", src);
        assert!(dst < self.num_nodes, "destination state {} out of range", dst);
        self.adjacency[src].push(Edge {
            destination: dst,
            label: label.into(),
        });
    }

    /// Iterates over the destinations of `label`-edges out of `node`.
    ///
    /// Exact string match on the label, no wildcarding. A `(node, label)`
    /// pair with no edges yields an empty iterator; that is a normal
    /// condition, not an error.
    pub fn outgoing<'a>(&'a self, node: usize, label: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.adjacency[node]
            .iter()
            .filter(move |edge| edge.label == label)
            .map(|edge| edge.destination)
    }

    /// Loads a graph from an `.aut` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Graph, String> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
        Self::from_reader(file)
    }

    /// Loads a graph from a reader holding Aldebaran-format text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Graph, String> {
        let mut lines = BufReader::new(reader).lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line.map_err(|e| format!("IO error: {}", e))?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err("missing \"des\" header".to_string()),
            }
        };
        let (first_state, _num_edges, num_states) = parse_header(header.trim())?;
        let mut graph = Graph::new(num_states, first_state);

        for (lineno, line) in lines {
            let line = line.map_err(|e| format!("IO error: {}", e))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (src, label, dst) = parse_edge(line)
                .ok_or_else(|| format!("line {}: malformed edge {:?}", lineno + 1, line))?;
            if src >= num_states || dst >= num_states {
                return Err(format!(
                    "line {}: edge ({},{:?},{}) outside declared state range 0..{}",
                    lineno + 1,
                    src,
                    label,
                    dst,
                    num_states
                ));
            }
            graph.add_edge(src, label, dst);
        }
        Ok(graph)
    }
}

/// Parses `des (first, edges, states)`.
fn parse_header(line: &str) -> Result<(usize, usize, usize), String> {
    let inner = line
        .strip_prefix("des")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| format!("malformed header {:?}", line))?;
    let fields: Vec<&str> = inner.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(format!("malformed header {:?}", line));
    }
    let parse = |s: &str| {
        s.parse::<usize>()
            .map_err(|_| format!("malformed header field {:?}", s))
    };
    Ok((parse(fields[0])?, parse(fields[1])?, parse(fields[2])?))
}

/// Parses `(src, "label", dst)`. Labels may contain commas and parentheses.
fn parse_edge(line: &str) -> Option<(usize, String, usize)> {
    let inner = line.strip_prefix('(')?.strip_suffix(')')?;
    let (src, rest) = inner.split_once(',')?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('"')?;
    let (label, rest) = rest.rsplit_once('"')?;
    let dst = rest.trim_start().strip_prefix(',')?;
    let src = src.trim().parse().ok()?;
    let dst = dst.trim().parse().ok()?;
    Some((src, label.to_string(), dst))
}
