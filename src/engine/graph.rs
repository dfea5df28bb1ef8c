//! Filter-graph IR: labeled nodes serialized once into `-filter_complex` syntax

use std::collections::HashSet;
use std::fmt;

use crate::streams::StreamRef;

/// One filter statement: `[in]...filter[out]...`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    pub inputs: Vec<StreamRef>,
    pub filter: String,
    pub outputs: Vec<StreamRef>,
}

impl FilterNode {
    pub fn new(inputs: Vec<StreamRef>, filter: impl Into<String>, outputs: Vec<StreamRef>) -> Self {
        Self {
            inputs,
            filter: filter.into(),
            outputs,
        }
    }

    /// Source filter with no inputs, e.g. `color` or `anullsrc`
    pub fn source(filter: impl Into<String>, output: StreamRef) -> Self {
        Self::new(Vec::new(), filter, vec![output])
    }

    /// Single input, single output
    pub fn chain(input: StreamRef, filter: impl Into<String>, output: StreamRef) -> Self {
        Self::new(vec![input], filter, vec![output])
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{}", input)?;
        }
        write!(f, "{}", self.filter)?;
        for output in &self.outputs {
            write!(f, "{}", output)?;
        }
        Ok(())
    }
}

/// Ordered filter statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: FilterNode) {
        self.nodes.push(node);
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = FilterNode>) {
        self.nodes.extend(nodes);
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Serialize as a `;`-separated graph description
    pub fn render(&self) -> String {
        self.nodes
            .iter()
            .map(FilterNode::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Labels consumed before any node produced them
    ///
    /// Input-file streams such as `0:v` are always defined. Anything else
    /// listed here would make FFmpeg reject the graph.
    pub fn undefined_references(&self) -> Vec<String> {
        let mut defined: HashSet<&str> = HashSet::new();
        let mut missing = Vec::new();

        for node in &self.nodes {
            for input in &node.inputs {
                let label = input.label.as_str();
                if !is_input_stream(label) && !defined.contains(label) {
                    missing.push(label.to_string());
                }
            }
            for output in &node.outputs {
                defined.insert(output.label.as_str());
            }
        }

        missing
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// `N:v` / `N:a` references point at `-i` inputs, not graph labels
fn is_input_stream(label: &str) -> bool {
    label
        .split_once(':')
        .map(|(index, _)| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}
