use serde::{Deserialize, Serialize};

use crate::error::LearnerError;

/// A node of a tree stored in pre-order.
///
/// Children are addressed by offsets relative to the node's own index:
/// the left child always sits right after its parent, and the right child
/// follows the whole left subtree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Terminal node carrying a prediction.
    Leaf { value: f64 },
    /// Interior node. Rows with `x[feature_index] <= threshold` go left.
    Split {
        feature_index: usize,
        threshold: f64,
        left_offset: usize,
        right_offset: usize,
    },
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Prediction value, for leaves only.
    pub fn value(&self) -> Option<f64> {
        match self {
            Node::Leaf { value } => Some(*value),
            Node::Split { .. } => None,
        }
    }
}

/// Checks that `nodes` is a single well-formed pre-order tree over
/// `n_features` columns: every right offset equals one plus the size of the
/// left subtree and every node is reachable from index 0.
pub fn check_layout(nodes: &[Node], n_features: usize) -> Result<(), LearnerError> {
    if nodes.is_empty() {
        return Err(LearnerError::CorruptTree {
            index: 0,
            reason: "tree has no nodes".into(),
        });
    }
    let size = subtree_size(nodes, 0, n_features)?;
    if size != nodes.len() {
        return Err(LearnerError::CorruptTree {
            index: size,
            reason: format!("{} trailing nodes after the root subtree", nodes.len() - size),
        });
    }
    Ok(())
}

/// Number of nodes in the subtree rooted at `index`.
pub fn subtree_size(nodes: &[Node], index: usize, n_features: usize) -> Result<usize, LearnerError> {
    let corrupt = |reason: String| LearnerError::CorruptTree { index, reason };

    match nodes.get(index) {
        None => Err(corrupt("index past the end of the node sequence".into())),
        Some(Node::Leaf { .. }) => Ok(1),
        Some(&Node::Split {
            feature_index,
            left_offset,
            right_offset,
            ..
        }) => {
            if feature_index >= n_features {
                return Err(corrupt(format!(
                    "feature {feature_index} out of range for {n_features} features"
                )));
            }
            if left_offset != 1 {
                return Err(corrupt(format!("left offset is {left_offset}, expected 1")));
            }
            let left = subtree_size(nodes, index + 1, n_features)?;
            if right_offset != left + 1 {
                return Err(corrupt(format!(
                    "right offset is {right_offset}, expected {}",
                    left + 1
                )));
            }
            let right = subtree_size(nodes, index + right_offset, n_features)?;
            Ok(1 + left + right)
        }
    }
}
