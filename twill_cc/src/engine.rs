//! The feature reassignment engine
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

use twill_stats::{scores_to_likelihoods, PitmanYor};
use twill_utils::Matrix;

use crate::error::{InferAssignmentsError, InitMixturesError, LoadError};
use crate::feature::Schema;
use crate::sampler::BlockPitmanYorSampler;
use crate::traits::{KindMixture, ProductModel};

/// Cross-categorization state as supplied by the surrounding system: the
/// declared schema, the clustering hyperparameters, and one parameter
/// fragment per kind.
#[derive(Clone, Debug)]
pub struct CrossCat<Mdl> {
    pub schema: Schema,
    pub clustering: PitmanYor,
    pub kinds: Vec<KindModel<Mdl>>,
}

/// One kind's contribution to a [`CrossCat`]: the parameters of the
/// features it currently holds and the group count of its row mixture.
#[derive(Clone, Debug)]
pub struct KindModel<Mdl> {
    pub model: Mdl,
    pub n_groups: usize,
}

/// Reassigns features to kinds under a Pitman-Yor prior over the feature
/// partition and a product-of-mixtures likelihood.
///
/// The engine is constructed empty. [`load`](KindEngine::load) installs the
/// immutable per-kind parameter sets,
/// [`init_empty_mixtures`](KindEngine::init_empty_mixtures) creates the
/// per-kind mixture workspaces, and
/// [`infer_assignments`](KindEngine::infer_assignments) mutates an
/// assignment vector in place.
pub struct KindEngine<M: KindMixture> {
    model: M::Model,
    clustering: PitmanYor,
    kinds: Vec<M>,
}

impl<M: KindMixture> Default for KindEngine<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: KindMixture> KindEngine<M> {
    pub fn new() -> Self {
        KindEngine {
            model: M::Model::default(),
            clustering: PitmanYor::default(),
            kinds: Vec::new(),
        }
    }

    /// Forget all installed parameters and mixture workspaces.
    pub fn clear(&mut self) {
        self.model.clear();
        self.clustering = PitmanYor::default();
        self.kinds.clear();
    }

    /// Install the parameter fragments of every kind.
    ///
    /// The schema composed from the fragments must cover the same features
    /// as the declared schema; the comparison is by per-type counts because
    /// composition visits features grouped by kind, not in declared order.
    pub fn load(
        &mut self,
        cross_cat: &CrossCat<M::Model>,
    ) -> Result<(), LoadError> {
        self.clear();
        for kind in &cross_cat.kinds {
            self.model.extend(&kind.model);
        }
        self.clustering = cross_cat.clustering.clone();

        let composed = self.model.schema();
        if composed.part_counts() != cross_cat.schema.part_counts() {
            return Err(LoadError::SchemaMismatch {
                declared: cross_cat.schema.clone(),
                composed,
            });
        }
        Ok(())
    }

    /// Create one empty mixture workspace per kind, each seeded with the
    /// group count its row mixture reports.
    pub fn init_empty_mixtures<R: Rng>(
        &mut self,
        cross_cat: &CrossCat<M::Model>,
        rng: &mut R,
    ) -> Result<(), InitMixturesError> {
        if cross_cat.kinds.is_empty() {
            return Err(InitMixturesError::EmptyDomain);
        }
        self.kinds = cross_cat
            .kinds
            .iter()
            .map(|kind| M::init_empty(&self.model, kind.n_groups, rng))
            .collect();
        Ok(())
    }

    /// The number of features covered by the installed parameters.
    pub fn n_features(&self) -> usize {
        self.model.schema().len()
    }

    /// The number of kind workspaces.
    pub fn n_kinds(&self) -> usize {
        self.kinds.len()
    }

    /// Score every feature under every kind in parallel and normalize each
    /// row into likelihoods.
    ///
    /// Each row is computed by a task owning an rng seeded from a single
    /// draw off the caller's rng plus the feature id, so the result is
    /// independent of how the tasks are scheduled.
    pub fn feature_likelihoods<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<Matrix<f64>, InferAssignmentsError> {
        let n_features = self.n_features();
        let n_kinds = self.kinds.len();
        if n_features == 0 || n_kinds == 0 {
            return Err(InferAssignmentsError::EmptyDomain);
        }

        let seed: u64 = rng.gen();
        let mut values = vec![0.0; n_features * n_kinds];

        values
            .par_chunks_mut(n_kinds)
            .enumerate()
            .try_for_each(|(feature_ix, row)| {
                let mut task_rng = Xoshiro256Plus::seed_from_u64(
                    seed.wrapping_add(feature_ix as u64),
                );
                for (kind_ix, kind) in self.kinds.iter().enumerate() {
                    let score = kind.score_feature(
                        &self.model,
                        feature_ix,
                        &mut task_rng,
                    );
                    if !score.is_finite() {
                        return Err(InferAssignmentsError::NumericError {
                            feature_ix,
                            kind_ix,
                            score,
                        });
                    }
                    row[kind_ix] = score;
                }
                scores_to_likelihoods(row);
                Ok(())
            })?;

        Ok(Matrix::from_raw_parts(values, n_features))
    }

    /// Draw a new feature-to-kind assignment, mutating `assignments` in
    /// place.
    pub fn infer_assignments<R: Rng>(
        &self,
        assignments: &mut [usize],
        iterations: usize,
        rng: &mut R,
    ) -> Result<(), InferAssignmentsError> {
        let n_features = self.n_features();
        if assignments.len() != n_features {
            return Err(InferAssignmentsError::AssignmentLengthMismatch {
                n_features,
                n_assignments: assignments.len(),
            });
        }

        let likelihoods = self.feature_likelihoods(rng)?;

        let mut sampler = BlockPitmanYorSampler::new(
            &self.clustering,
            &likelihoods,
            assignments,
        )?;
        sampler.run(iterations, rng)?;
        Ok(())
    }
}
