//! Decision tree with a flat, pre-order node layout.
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::node::{check_layout, Node};
use super::params::TreeParams;
use super::split::{CorrelationSplit, RandomSplit, SplitSelector};
use crate::data::dataset::Dataset;
use crate::error::LearnerError;
use crate::learner::Learner;
use crate::metrics::{confusion::ClassificationMetrics, errors::RegressionMetrics};

/// Tree that splits on the feature most correlated with the labels.
pub type CorrelationTree = DecisionTree<CorrelationSplit>;
/// Tree that splits on a randomly drawn feature.
pub type RandomTree = DecisionTree<RandomSplit>;

/// Binary decision tree stored as a pre-order sequence of [`Node`]s.
///
/// The split strategy `S` decides where each interior node splits; the
/// stopping rules and the layout are the same for every strategy. The
/// strategy is not serialized: a decoded tree gets `S::default()`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionTree<S = CorrelationSplit> {
    nodes: Option<Vec<Node>>,
    n_features: usize,
    n_samples: usize,
    tree_params: TreeParams,
    #[serde(skip)]
    splitter: S,
}

impl<S: SplitSelector + Default> Default for DecisionTree<S> {
    fn default() -> Self {
        Self::with_splitter(TreeParams::new(), S::default())
    }
}

impl<S: SplitSelector> RegressionMetrics for DecisionTree<S> {}
impl<S: SplitSelector> ClassificationMetrics for DecisionTree<S> {}

impl CorrelationTree {
    pub fn new(tree_params: TreeParams) -> Self {
        Self::with_splitter(tree_params, CorrelationSplit)
    }
}

impl RandomTree {
    /// Creates a random tree whose feature draws come from `seed`, or from
    /// system entropy when `None`.
    pub fn new(tree_params: TreeParams, seed: Option<u64>) -> Self {
        Self::with_splitter(tree_params, RandomSplit::new(seed))
    }
}

impl<S: SplitSelector> DecisionTree<S> {
    /// Creates an untrained tree with an explicit split strategy.
    pub fn with_splitter(tree_params: TreeParams, splitter: S) -> Self {
        Self {
            nodes: None,
            n_features: 0,
            n_samples: 0,
            tree_params,
            splitter,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.tree_params
    }

    /// The trained node sequence, root first.
    pub fn nodes(&self) -> Option<&[Node]> {
        self.nodes.as_deref()
    }

    /// Number of feature columns seen at training time.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of rows the tree was trained on.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn is_trained(&self) -> bool {
        self.nodes.is_some()
    }

    /// Builds the tree from a dataset, replacing any previous tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty, has no feature columns, or if
    /// features and labels have different row counts. The previous tree is
    /// kept in that case.
    #[instrument(skip_all, fields(n_samples = dataset.nrows(), n_features = dataset.ncols()))]
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), LearnerError> {
        dataset.validate()?;

        let mut nodes = Vec::new();
        Self::build_tree(&mut self.splitter, &self.tree_params, dataset, &mut nodes);
        debug!(n_nodes = nodes.len(), "tree built");

        self.n_features = dataset.ncols();
        self.n_samples = dataset.nrows();
        self.nodes = Some(nodes);
        Ok(())
    }

    /// Predicts a single point.
    ///
    /// # Errors
    ///
    /// [`LearnerError::NotTrained`] before `fit`, and
    /// [`LearnerError::FeatureCountMismatch`] if `point` has the wrong length.
    pub fn query_point(&self, point: &[f64]) -> Result<f64, LearnerError> {
        let nodes = self.trained_nodes(point.len())?;
        Self::traverse(nodes, |feature| point[feature])
    }

    /// Predicts every row of `features`.
    ///
    /// # Errors
    ///
    /// [`LearnerError::NotTrained`] before `fit`, and
    /// [`LearnerError::FeatureCountMismatch`] if the column count differs from
    /// the training data.
    pub fn predict(&self, features: &DMatrix<f64>) -> Result<DVector<f64>, LearnerError> {
        let nodes = self.trained_nodes(features.ncols())?;
        let predictions = (0..features.nrows())
            .map(|row| Self::traverse(nodes, |feature| features[(row, feature)]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DVector::from_vec(predictions))
    }

    fn trained_nodes(&self, n_features: usize) -> Result<&[Node], LearnerError> {
        let nodes = self.nodes.as_deref().ok_or(LearnerError::NotTrained)?;
        if n_features != self.n_features {
            return Err(LearnerError::FeatureCountMismatch {
                expected: self.n_features,
                got: n_features,
            });
        }
        Ok(nodes)
    }

    fn traverse(nodes: &[Node], value_at: impl Fn(usize) -> f64) -> Result<f64, LearnerError> {
        let mut index = 0;
        // Every step moves forward, so a well-formed tree needs fewer steps
        // than it has nodes.
        for _ in 0..nodes.len() {
            match nodes.get(index) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(&Node::Split {
                    feature_index,
                    threshold,
                    left_offset,
                    right_offset,
                }) => {
                    index += if value_at(feature_index) <= threshold {
                        left_offset
                    } else {
                        right_offset
                    };
                }
                None => break,
            }
        }
        Err(LearnerError::CorruptTree {
            index,
            reason: "traversal did not reach a leaf".into(),
        })
    }

    /// Appends the subtree for `dataset` to `nodes` in pre-order.
    fn build_tree(
        splitter: &mut S,
        tree_params: &TreeParams,
        dataset: &Dataset,
        nodes: &mut Vec<Node>,
    ) {
        let labels = dataset.y.as_slice();
        let aggregation = tree_params.aggregation();

        if dataset.nrows() <= tree_params.leaf_size() {
            nodes.push(Node::Leaf {
                value: aggregation.reduce(labels),
            });
            return;
        }
        if labels.iter().all(|&label| label == labels[0]) {
            nodes.push(Node::Leaf { value: labels[0] });
            return;
        }

        let (feature_index, threshold) = splitter.select_split(dataset);
        let (left, right) = dataset.split_on_threshold(feature_index, threshold);

        // Everything went one way: the chosen feature cannot separate these rows.
        if left.nrows() == 0 || right.nrows() == 0 {
            nodes.push(Node::Leaf {
                value: aggregation.reduce(labels),
            });
            return;
        }

        let root = nodes.len();
        nodes.push(Node::Leaf { value: f64::NAN });
        Self::build_tree(splitter, tree_params, &left, nodes);
        let left_size = nodes.len() - root - 1;
        Self::build_tree(splitter, tree_params, &right, nodes);

        nodes[root] = Node::Split {
            feature_index,
            threshold,
            left_offset: 1,
            right_offset: left_size + 1,
        };
    }
}

impl<S: SplitSelector> Learner for DecisionTree<S> {
    fn fit(&mut self, dataset: &Dataset) -> Result<(), LearnerError> {
        DecisionTree::fit(self, dataset)
    }

    fn predict(&self, features: &DMatrix<f64>) -> Result<DVector<f64>, LearnerError> {
        DecisionTree::predict(self, features)
    }

    fn is_trained(&self) -> bool {
        DecisionTree::is_trained(self)
    }

    fn validate(&self) -> Result<(), LearnerError> {
        if self.tree_params.leaf_size() < 1 {
            return Err(LearnerError::InvalidLeafSize {
                leaf_size: self.tree_params.leaf_size(),
            });
        }
        match &self.nodes {
            Some(nodes) => check_layout(nodes, self.n_features),
            None => Ok(()),
        }
    }
}
