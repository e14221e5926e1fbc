//! Block Pitman-Yor reassignment of features to kinds
//!
//! The sampler performs single-feature Gibbs sweeps over a fixed number of
//! kinds. The Pitman-Yor new-table mass is spread uniformly across the
//! currently-empty kinds, so the weight of every empty kind depends on how
//! many of them there are and must be refreshed whenever that number
//! changes.
use std::collections::BTreeSet;

use rand::Rng;
use twill_stats::{sample_from_likelihoods, PitmanYor};
use twill_utils::{bincount, Matrix, Shape};

use crate::error::{BuildSamplerError, RunSamplerError};

pub struct BlockPitmanYorSampler<'a> {
    process: PitmanYor,
    n_features: usize,
    n_kinds: usize,
    /// Normalized likelihood of each feature under each kind, one row per
    /// feature.
    likelihoods: &'a Matrix<f64>,
    assignments: &'a mut [usize],
    counts: Vec<usize>,
    empty_kinds: BTreeSet<usize>,
    n_empty: usize,
    prior: Vec<f64>,
    posterior: Vec<f64>,
    validate_steps: bool,
}

impl<'a> BlockPitmanYorSampler<'a> {
    /// Create a sampler over `likelihoods` that will mutate `assignments`
    /// in place.
    pub fn new(
        clustering: &PitmanYor,
        likelihoods: &'a Matrix<f64>,
        assignments: &'a mut [usize],
    ) -> Result<Self, BuildSamplerError> {
        clustering.validate()?;

        let n_features = likelihoods.n_rows();
        let n_kinds = likelihoods.n_cols();
        if n_features == 0 || n_kinds == 0 {
            return Err(BuildSamplerError::EmptyDomain);
        }
        if assignments.len() != n_features {
            return Err(BuildSamplerError::AssignmentLengthMismatch {
                n_features,
                n_assignments: assignments.len(),
            });
        }

        let mut counts = vec![0_usize; n_kinds];
        for (ix, &kind) in assignments.iter().enumerate() {
            if kind >= n_kinds {
                return Err(BuildSamplerError::BadAssignment {
                    ix,
                    kind,
                    n_kinds,
                });
            }
            counts[kind] += 1;
        }

        let empty_kinds: BTreeSet<usize> = counts
            .iter()
            .enumerate()
            .filter(|(_, &ct)| ct == 0)
            .map(|(k, _)| k)
            .collect();
        let n_empty = empty_kinds.len();

        let process = clustering.clone();
        let empty_weight =
            process.empty_kind_weight(n_kinds - n_empty, n_empty);
        let prior: Vec<f64> = counts
            .iter()
            .map(|&ct| {
                if ct > 0 {
                    process.gibbs_weight(ct)
                } else {
                    empty_weight
                }
            })
            .collect();

        Ok(BlockPitmanYorSampler {
            process,
            n_features,
            n_kinds,
            likelihoods,
            assignments,
            counts,
            empty_kinds,
            n_empty,
            prior,
            posterior: vec![0.0; n_kinds],
            validate_steps: false,
        })
    }

    /// Verify the internal bookkeeping after every reassignment step.
    ///
    /// The checks only run in builds with debug assertions; release builds
    /// ignore the flag.
    pub fn with_validation(mut self, validate_steps: bool) -> Self {
        self.validate_steps = validate_steps;
        self
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn n_kinds(&self) -> usize {
        self.n_kinds
    }

    /// The number of features currently assigned to each kind.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// The unnormalized Pitman-Yor weight of each kind.
    #[inline]
    pub fn prior(&self) -> &[f64] {
        &self.prior
    }

    #[inline]
    pub fn empty_kinds(&self) -> &BTreeSet<usize> {
        &self.empty_kinds
    }

    #[inline]
    pub fn n_empty(&self) -> usize {
        self.n_empty
    }

    #[inline]
    pub fn assignments(&self) -> &[usize] {
        self.assignments
    }

    /// Run `iterations` sweeps. Each sweep visits every feature in
    /// ascending order.
    pub fn run<R: Rng>(
        &mut self,
        iterations: usize,
        rng: &mut R,
    ) -> Result<(), RunSamplerError> {
        if iterations == 0 {
            return Err(RunSamplerError::EmptyDomain);
        }

        for _ in 0..iterations {
            for feature_ix in 0..self.n_features {
                self.step(feature_ix, rng)?;

                if cfg!(debug_assertions) && self.validate_steps {
                    assert!(
                        self.validate().is_valid(),
                        "sampler bookkeeping diverged at feature {feature_ix}"
                    );
                }
            }
        }
        Ok(())
    }

    /// Reassign one feature.
    fn step<R: Rng>(
        &mut self,
        feature_ix: usize,
        rng: &mut R,
    ) -> Result<(), RunSamplerError> {
        let total = self.compute_posterior(feature_ix);
        if !total.is_finite() || total <= 0.0 {
            return Err(RunSamplerError::NumericError { feature_ix, total });
        }

        let k_new = sample_from_likelihoods(rng, &self.posterior, total);
        let k_old = self.assignments[feature_ix];
        if k_new != k_old {
            self.move_feature(feature_ix, k_old, k_new);
        }
        Ok(())
    }

    /// `posterior[k] = prior[k] * likelihood[k]`; returns the total mass.
    fn compute_posterior(&mut self, feature_ix: usize) -> f64 {
        let likelihood = self.likelihoods.row(feature_ix);
        let mut total = 0.0;
        self.posterior
            .iter_mut()
            .zip(self.prior.iter().zip(likelihood.iter()))
            .for_each(|(post, (&pr, &lk))| {
                *post = pr * lk;
                total += *post;
            });
        total
    }

    fn move_feature(&mut self, feature_ix: usize, k_old: usize, k_new: usize) {
        let old_n_empty = self.n_empty;
        // The weight a kind emptied by this move receives reflects the
        // state at the moment of departure.
        let old_empty_weight = self
            .process
            .empty_kind_weight(self.n_kinds - old_n_empty, old_n_empty);

        self.assignments[feature_ix] = k_new;

        self.counts[k_old] -= 1;
        if self.counts[k_old] == 0 {
            self.prior[k_old] = old_empty_weight;
            self.empty_kinds.insert(k_old);
            self.n_empty += 1;
        } else {
            self.prior[k_old] =
                self.process.gibbs_weight(self.counts[k_old]);
        }

        if self.counts[k_new] == 0 {
            self.empty_kinds.remove(&k_new);
            self.n_empty -= 1;
        }
        self.counts[k_new] += 1;
        self.prior[k_new] = self.process.gibbs_weight(self.counts[k_new]);

        // Empty-kind weights are coupled through the number of empty kinds,
        // so a change in that number invalidates every one of them.
        if self.n_empty != old_n_empty {
            let empty_weight = self
                .process
                .empty_kind_weight(self.n_kinds - self.n_empty, self.n_empty);
            for &k in &self.empty_kinds {
                self.prior[k] = empty_weight;
            }
        }
    }

    /// Recompute every derived quantity from the assignment vector and
    /// compare with the incrementally-maintained state.
    pub fn validate(&self) -> SamplerDiagnostics {
        let expected_counts = bincount(&*self.assignments, self.n_kinds);
        let empty_weight = self
            .process
            .empty_kind_weight(self.n_kinds - self.n_empty, self.n_empty);

        SamplerDiagnostics {
            counts_sum_to_n_features: {
                self.counts.iter().sum::<usize>() == self.n_features
            },
            counts_agree_with_assignments: self.counts == expected_counts,
            empty_kinds_match_zero_counts: {
                (0..self.n_kinds).all(|k| {
                    self.empty_kinds.contains(&k) == (self.counts[k] == 0)
                })
            },
            n_empty_matches_empty_kinds: {
                self.n_empty == self.empty_kinds.len()
            },
            prior_agrees_with_counts: {
                self.counts.iter().zip(self.prior.iter()).all(
                    |(&ct, &weight)| {
                        let expected = if ct > 0 {
                            self.process.gibbs_weight(ct)
                        } else {
                            empty_weight
                        };
                        close(weight, expected)
                    },
                )
            },
        }
    }
}

/// The possible ways the sampler's incremental bookkeeping can go wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerDiagnostics {
    /// The occupancy counts should sum to the number of features
    counts_sum_to_n_features: bool,
    /// Each count should equal the number of features assigned to its kind
    counts_agree_with_assignments: bool,
    /// A kind should be in the empty set iff its count is zero
    empty_kinds_match_zero_counts: bool,
    /// The cached empty-kind count should equal the size of the empty set
    n_empty_matches_empty_kinds: bool,
    /// Each prior weight should match the value derived from its count
    prior_agrees_with_counts: bool,
}

impl SamplerDiagnostics {
    /// `true` if none of the diagnostics was violated
    pub fn is_valid(&self) -> bool {
        self.counts_sum_to_n_features
            && self.counts_agree_with_assignments
            && self.empty_kinds_match_zero_counts
            && self.n_empty_matches_empty_kinds
            && self.prior_agrees_with_counts
    }
}

#[inline]
fn close(x: f64, y: f64) -> bool {
    (x - y).abs() <= 1E-8 * (x.abs() + y.abs() + 1E-20)
}
