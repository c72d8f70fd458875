//! Bootstrap aggregation over any [`Learner`].
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::params::BagParams;
use crate::data::dataset::Dataset;
use crate::error::LearnerError;
use crate::learner::Learner;
use crate::metrics::{confusion::ClassificationMetrics, errors::RegressionMetrics};
use crate::seeded_rng;
use crate::trees::decision_tree::{CorrelationTree, RandomTree};
use crate::trees::params::{Aggregation, TreeParams};

/// Ensemble of independently trained learners of one type.
///
/// Every member is trained on its own bootstrap resample of the training
/// data, and predictions are reduced member-wise with the configured
/// [`Aggregation`]. Members share nothing, so training and prediction fan out
/// across threads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BagLearner<L> {
    learners: Vec<L>,
    bag_params: BagParams,
    trained: bool,
    #[serde(skip, default = "StdRng::from_entropy")]
    rng: StdRng,
}

impl<L: Learner> RegressionMetrics for BagLearner<L> {}
impl<L: Learner> ClassificationMetrics for BagLearner<L> {}

impl BagLearner<CorrelationTree> {
    /// Bag of correlation-split trees sharing `tree_params`.
    pub fn correlation_trees(
        bag_params: BagParams,
        tree_params: TreeParams,
    ) -> Result<Self, LearnerError> {
        Self::with_factory(bag_params, |_| Ok(CorrelationTree::new(tree_params.clone())))
    }
}

impl BagLearner<RandomTree> {
    /// Bag of random-split trees sharing `tree_params`, each with its own
    /// seed drawn from the bag's generator.
    pub fn random_trees(bag_params: BagParams, tree_params: TreeParams) -> Result<Self, LearnerError> {
        Self::with_factory(bag_params, |seed| {
            Ok(RandomTree::new(tree_params.clone(), Some(seed)))
        })
    }
}

impl<L: Learner> BagLearner<BagLearner<L>> {
    /// Bag whose members are themselves bags built from `factory`.
    ///
    /// Every inner bag trains on the full dataset and does its own
    /// resampling; the outer bag only aggregates. Each inner bag gets its own
    /// seed drawn from the outer bag's generator, overriding the seed in
    /// `inner_params`.
    pub fn nested<F>(
        mut outer_params: BagParams,
        inner_params: BagParams,
        mut factory: F,
    ) -> Result<Self, LearnerError>
    where
        F: FnMut(u64) -> Result<L, LearnerError>,
    {
        outer_params.set_bootstrap(false);
        Self::with_factory(outer_params, |seed| {
            let mut params = inner_params.clone();
            params.set_seed(Some(seed));
            BagLearner::with_factory(params, &mut factory)
        })
    }
}

impl<L: Learner> BagLearner<L> {
    /// Creates `bag_count` untrained members by calling `factory` once per
    /// member with a seed drawn from the bag's generator.
    ///
    /// # Errors
    ///
    /// The first factory error is returned and no ensemble is created.
    pub fn with_factory<F>(bag_params: BagParams, mut factory: F) -> Result<Self, LearnerError>
    where
        F: FnMut(u64) -> Result<L, LearnerError>,
    {
        let mut rng = seeded_rng(bag_params.seed());
        let learners = (0..bag_params.bag_count())
            .map(|_| factory(rng.gen()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            learners,
            bag_params,
            trained: false,
            rng,
        })
    }

    pub fn params(&self) -> &BagParams {
        &self.bag_params
    }

    pub fn members(&self) -> &[L] {
        &self.learners
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Trains every member on its own bootstrap resample of `dataset`, or on
    /// `dataset` itself when bootstrapping is turned off.
    ///
    /// # Errors
    ///
    /// Fails on invalid datasets like a single tree does. If any member fails
    /// the ensemble is left untrained and refuses queries until the next
    /// successful `fit`.
    #[instrument(skip_all, fields(bag_count = self.learners.len(), n_samples = dataset.nrows()))]
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), LearnerError> {
        dataset.validate()?;
        self.trained = false;

        // Seeds are drawn up front so the resamples do not depend on thread
        // scheduling.
        let seeds: Vec<u64> = (0..self.learners.len()).map(|_| self.rng.gen()).collect();
        let bootstrap = self.bag_params.bootstrap();
        info!(
            bag_count = self.learners.len(),
            n_samples = dataset.nrows(),
            n_features = dataset.ncols(),
            bootstrap,
            "training bagging ensemble"
        );

        self.learners
            .par_iter_mut()
            .zip(seeds.par_iter())
            .enumerate()
            .try_for_each(|(member, (learner, &seed))| {
                if !bootstrap {
                    debug!(member, "training bag member on full dataset");
                    return learner.fit(dataset);
                }
                let mut rng = StdRng::seed_from_u64(seed);
                let resample = dataset.bootstrap(&mut rng);
                debug!(member, n_samples = resample.nrows(), "training bag member");
                learner.fit(&resample)
            })?;

        self.trained = true;
        info!("bagging ensemble training complete");
        Ok(())
    }

    /// Queries every member with `features` and reduces the per-member
    /// predictions row by row.
    ///
    /// # Errors
    ///
    /// [`LearnerError::NotTrained`] before a successful `fit`; otherwise the
    /// first member error, such as a feature count mismatch.
    pub fn predict(&self, features: &DMatrix<f64>) -> Result<DVector<f64>, LearnerError> {
        if !self.trained {
            return Err(LearnerError::NotTrained);
        }
        let grid = self
            .learners
            .par_iter()
            .map(|learner| learner.predict(features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(aggregate(&grid, features.nrows(), self.bag_params.aggregation()))
    }
}

/// Reduces a grid of per-member predictions, one vector per member, into one
/// value per query row.
pub fn aggregate(grid: &[DVector<f64>], n_rows: usize, aggregation: Aggregation) -> DVector<f64> {
    let mut column = Vec::with_capacity(grid.len());
    DVector::from_fn(n_rows, |row, _| {
        column.clear();
        column.extend(grid.iter().map(|predictions| predictions[row]));
        aggregation.reduce(&column)
    })
}

impl<L: Learner> Learner for BagLearner<L> {
    fn fit(&mut self, dataset: &Dataset) -> Result<(), LearnerError> {
        BagLearner::fit(self, dataset)
    }

    fn predict(&self, features: &DMatrix<f64>) -> Result<DVector<f64>, LearnerError> {
        BagLearner::predict(self, features)
    }

    fn is_trained(&self) -> bool {
        BagLearner::is_trained(self)
    }

    fn validate(&self) -> Result<(), LearnerError> {
        if self.learners.is_empty() {
            return Err(LearnerError::InvalidBagCount { bag_count: 0 });
        }
        if self.learners.len() != self.bag_params.bag_count() {
            return Err(LearnerError::InvalidParameter {
                name: "bag_count",
                reason: format!(
                    "{} members stored but bag_count is {}",
                    self.learners.len(),
                    self.bag_params.bag_count()
                ),
            });
        }
        for learner in &self.learners {
            learner.validate()?;
            if self.trained && !learner.is_trained() {
                return Err(LearnerError::NotTrained);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;

    /// Predicts the same value for every row.
    #[derive(Clone, Debug)]
    struct ConstantLearner {
        value: f64,
        trained: bool,
        seen_rows: usize,
    }

    impl ConstantLearner {
        fn new(value: f64) -> Self {
            Self {
                value,
                trained: false,
                seen_rows: 0,
            }
        }
    }

    impl Learner for ConstantLearner {
        fn fit(&mut self, dataset: &Dataset) -> Result<(), LearnerError> {
            dataset.validate()?;
            self.seen_rows = dataset.nrows();
            self.trained = true;
            Ok(())
        }

        fn predict(&self, features: &DMatrix<f64>) -> Result<DVector<f64>, LearnerError> {
            Ok(DVector::from_element(features.nrows(), self.value))
        }

        fn is_trained(&self) -> bool {
            self.trained
        }
    }

    fn constant_bag(values: &[f64], aggregation: Aggregation) -> BagLearner<ConstantLearner> {
        let params = BagParams::with_params(values.len(), aggregation, Some(1)).unwrap();
        let mut next = values.iter().copied();
        BagLearner::with_factory(params, |_| {
            Ok(ConstantLearner::new(next.next().unwrap_or_default()))
        })
        .unwrap()
    }

    fn dataset() -> Dataset {
        let x = DMatrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let y = DVector::from_vec(vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
        Dataset::new(x, y)
    }

    #[test]
    fn test_mean_aggregation() {
        let mut bag = constant_bag(&[1.0, 2.0, 6.0], Aggregation::Mean);
        bag.fit(&dataset()).unwrap();
        let predictions = bag.predict(&DMatrix::zeros(2, 1)).unwrap();
        assert_relative_eq!(predictions[0], 3.0);
        assert_relative_eq!(predictions[1], 3.0);
    }

    #[test]
    fn test_mode_aggregation_with_tie() {
        let mut bag = constant_bag(&[1.0, -1.0, 0.0, 1.0, -1.0], Aggregation::Mode);
        bag.fit(&dataset()).unwrap();
        let predictions = bag.predict(&DMatrix::zeros(1, 1)).unwrap();
        assert_eq!(predictions[0], -1.0);

        let mut bag = constant_bag(&[1.0, 0.0, 1.0], Aggregation::Mode);
        bag.fit(&dataset()).unwrap();
        assert_eq!(bag.predict(&DMatrix::zeros(1, 1)).unwrap()[0], 1.0);
    }

    #[test]
    fn test_members_see_full_size_resamples() {
        let mut bag = constant_bag(&[0.0; 4], Aggregation::Mean);
        bag.fit(&dataset()).unwrap();
        assert!(bag.members().iter().all(|member| member.seen_rows == 6));
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let bag = constant_bag(&[1.0, 2.0], Aggregation::Mean);
        let err = bag.predict(&DMatrix::zeros(1, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotTrained);
    }

    #[test]
    fn test_failed_fit_leaves_bag_untrained() {
        let mut bag = constant_bag(&[1.0, 2.0], Aggregation::Mean);
        bag.fit(&dataset()).unwrap();
        assert!(bag.is_trained());

        let bad = Dataset::new(DMatrix::zeros(3, 1), DVector::zeros(2));
        assert!(bag.fit(&bad).is_err());
        assert!(!bag.is_trained());
        assert!(bag.predict(&DMatrix::zeros(1, 1)).is_err());
    }

    #[test]
    fn test_factory_error_aborts_construction() {
        let params = BagParams::with_params(3, Aggregation::Mean, Some(2)).unwrap();
        let mut built = 0;
        let result = BagLearner::with_factory(params, |_| {
            built += 1;
            if built == 2 {
                Err(LearnerError::InvalidLeafSize { leaf_size: 0 })
            } else {
                Ok(ConstantLearner::new(0.0))
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_seeded_random_bags_agree() {
        let tree_params = TreeParams::with_params(1, Aggregation::Mode).unwrap();
        let bag_params = BagParams::with_params(5, Aggregation::Mode, Some(9)).unwrap();

        let mut first = BagLearner::random_trees(bag_params.clone(), tree_params.clone()).unwrap();
        let mut second = BagLearner::random_trees(bag_params, tree_params).unwrap();
        first.fit(&dataset()).unwrap();
        second.fit(&dataset()).unwrap();

        for (a, b) in first.members().iter().zip(second.members()) {
            assert_eq!(a.nodes(), b.nodes());
        }
        let queries = DMatrix::from_vec(3, 1, vec![0.0, 3.5, 10.0]);
        assert_eq!(
            first.predict(&queries).unwrap(),
            second.predict(&queries).unwrap()
        );
    }

    /// Remembers the feature values of the rows it was trained on.
    #[derive(Clone, Debug, Default)]
    struct RowRecorder {
        rows: Vec<f64>,
    }

    impl Learner for RowRecorder {
        fn fit(&mut self, dataset: &Dataset) -> Result<(), LearnerError> {
            self.rows = dataset.x.column(0).iter().copied().collect();
            Ok(())
        }

        fn predict(&self, features: &DMatrix<f64>) -> Result<DVector<f64>, LearnerError> {
            Ok(DVector::zeros(features.nrows()))
        }

        fn is_trained(&self) -> bool {
            !self.rows.is_empty()
        }
    }

    /// 100 rows with distinct feature values.
    fn distinct_rows() -> Dataset {
        let x = DMatrix::from_fn(100, 1, |row, _| row as f64);
        let y = DVector::from_fn(100, |row, _| (row % 3) as f64);
        Dataset::new(x, y)
    }

    #[test]
    fn test_without_bootstrap_members_see_every_row() {
        let dataset = distinct_rows();
        let mut params = BagParams::with_params(3, Aggregation::Mean, Some(4)).unwrap();
        params.set_bootstrap(false);
        let mut bag = BagLearner::with_factory(params, |_| Ok(RowRecorder::default())).unwrap();
        bag.fit(&dataset).unwrap();

        let expected: Vec<f64> = dataset.x.column(0).iter().copied().collect();
        assert!(bag.members().iter().all(|member| member.rows == expected));
    }

    #[test]
    fn test_nested_inner_bags_resample_the_full_dataset() {
        let dataset = distinct_rows();
        let outer = BagParams::with_params(3, Aggregation::Mean, Some(11)).unwrap();
        let inner = BagParams::with_params(50, Aggregation::Mean, None).unwrap();
        let mut nested =
            BagLearner::nested(outer, inner, |_| Ok(RowRecorder::default())).unwrap();
        assert!(!nested.params().bootstrap());
        nested.fit(&dataset).unwrap();

        for inner_bag in nested.members() {
            assert!(inner_bag.params().bootstrap());
            let mut seen: Vec<u64> = inner_bag
                .members()
                .iter()
                .flat_map(|member| member.rows.iter().map(|row| *row as u64))
                .collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), dataset.nrows());
        }
    }

    #[test]
    fn test_validate_rejects_member_count_mismatch() {
        let mut bag = constant_bag(&[1.0, 2.0, 3.0], Aggregation::Mean);
        assert!(bag.validate().is_ok());
        bag.learners.pop();
        let err = bag.validate().unwrap_err();
        assert!(matches!(err, LearnerError::InvalidParameter { name: "bag_count", .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_aggregate_grid() {
        let grid = vec![
            DVector::from_vec(vec![1.0, 0.0]),
            DVector::from_vec(vec![1.0, 2.0]),
            DVector::from_vec(vec![-1.0, 2.0]),
        ];
        let mode = aggregate(&grid, 2, Aggregation::Mode);
        assert_eq!(mode.as_slice(), &[1.0, 2.0]);
        let mean = aggregate(&grid, 2, Aggregation::Mean);
        assert_relative_eq!(mean[0], 1.0 / 3.0);
        assert_relative_eq!(mean[1], 4.0 / 3.0);
    }
}
