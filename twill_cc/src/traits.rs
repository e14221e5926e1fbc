//! Capability traits connecting the engine to the mixture layer
use rand::Rng;

use crate::feature::Schema;

/// The composed, read-only parameter store for every feature.
///
/// One fragment per kind is merged into a single product model at load time;
/// the composed schema is validated against the model the fragments came
/// from.
pub trait ProductModel: Default + Sync {
    /// Forget all installed parameters.
    fn clear(&mut self);

    /// Merge the parameters of one kind's fragment.
    fn extend(&mut self, fragment: &Self);

    /// The schema covered by the currently-installed parameters.
    fn schema(&self) -> Schema;
}

/// A per-kind mixture workspace.
///
/// The engine needs only two capabilities from the mixture layer: creating
/// an empty workspace with a given number of groups, and scoring one
/// feature's data under the workspace. Everything else about the mixture is
/// opaque.
pub trait KindMixture: Send + Sync + Sized {
    type Model: ProductModel;

    /// Create an empty mixture workspace with `n_groups` groups.
    fn init_empty<R: Rng>(
        model: &Self::Model,
        n_groups: usize,
        rng: &mut R,
    ) -> Self;

    /// The log likelihood of feature `feature_ix`'s data under this
    /// workspace.
    ///
    /// Pure up to the entropy consumed from `rng`.
    fn score_feature<R: Rng>(
        &self,
        model: &Self::Model,
        feature_ix: usize,
        rng: &mut R,
    ) -> f64;
}
