//! Score explanation trees.
//!
//! An [`Explanation`] records how a score was derived. Leaves describe a raw input
//! (a similarity value, a term frequency, a boost) and each internal node describes
//! one arithmetic step combining its children. Nodes are never mutated after
//! construction, so subtrees that do not depend on the candidate (such as the
//! per-clause query weight) are shared between matches through [`Arc`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One node of a score explanation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// The value this node contributes.
    #[serde(with = "float_repr")]
    pub value: f64,

    /// Description of the arithmetic step.
    pub message: String,

    /// Inputs to the step, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Explanation>>,
}

impl Explanation {
    /// Create a leaf explanation.
    pub fn new<S: Into<String>>(value: f64, message: S) -> Self {
        Explanation {
            value,
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Create an explanation combining the given children.
    pub fn with_children<S, I>(value: f64, message: S, children: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Arc<Explanation>>,
    {
        Explanation {
            value,
            message: message.into(),
            children: children.into_iter().collect(),
        }
    }

    /// Get the value of this node.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Get the message of this node.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the children of this node.
    pub fn children(&self) -> &[Arc<Explanation>] {
        &self.children
    }

    /// Check whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth of the tree rooted at this node (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Total number of nodes in the tree rooted at this node.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} = {}", "", self.value, self.message, indent = depth * 2)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

fn non_finite_name(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("+Inf")
    } else if value == f64::NEG_INFINITY {
        Some("-Inf")
    } else {
        None
    }
}

/// Format a float the way explanation messages print numbers (six decimals).
///
/// Infinities and NaN print as `+Inf`, `-Inf` and `NaN`.
pub fn format_float(value: f64) -> String {
    match non_finite_name(value) {
        Some(name) => name.to_string(),
        None => format!("{value:.6}"),
    }
}

/// Serde codec for score values.
///
/// JSON has no literal for infinity or NaN, so those are written as the strings
/// `"+Inf"`, `"-Inf"` and `"NaN"`. Finite values stay plain numbers.
pub mod float_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::non_finite_name;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        match non_finite_name(*value) {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_f64(*value),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "+Inf" => Ok(f64::INFINITY),
                "-Inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid score value: {other}"))),
            },
        }
    }
}

/// Format a query vector as `[v0 v1 ...]` with six decimals per component.
pub fn format_vector(vector: &[f32]) -> String {
    let components: Vec<String> = vector.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", components.join(" "))
}
