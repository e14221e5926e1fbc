use thiserror::Error;
use twill_stats::ClusteringError;

use crate::feature::Schema;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error(
        "the schema composed from the kind fragments ({composed}) does not \
         match the declared schema ({declared})"
    )]
    SchemaMismatch { declared: Schema, composed: Schema },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitMixturesError {
    #[error("cannot initialize mixture workspaces without any kinds")]
    EmptyDomain,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildSamplerError {
    #[error(transparent)]
    OutOfRangeHyperparameter(#[from] ClusteringError),
    #[error("the likelihood matrix must have at least one feature and kind")]
    EmptyDomain,
    #[error(
        "the likelihood matrix covers {n_features} features but the \
         assignment has {n_assignments} entries"
    )]
    AssignmentLengthMismatch {
        n_features: usize,
        n_assignments: usize,
    },
    #[error(
        "assignment entry {ix} names kind {kind}, but there are only \
         {n_kinds} kinds"
    )]
    BadAssignment {
        ix: usize,
        kind: usize,
        n_kinds: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunSamplerError {
    #[error("at least one sweep must be requested")]
    EmptyDomain,
    #[error(
        "the posterior mass for feature {feature_ix} is not positive and \
         finite (total = {total})"
    )]
    NumericError { feature_ix: usize, total: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferAssignmentsError {
    #[error("the engine holds no kind workspaces or features")]
    EmptyDomain,
    #[error(
        "the model covers {n_features} features but the assignment has \
         {n_assignments} entries"
    )]
    AssignmentLengthMismatch {
        n_features: usize,
        n_assignments: usize,
    },
    #[error(
        "feature {feature_ix} scored a non-finite log likelihood ({score}) \
         under kind {kind_ix}"
    )]
    NumericError {
        feature_ix: usize,
        kind_ix: usize,
        score: f64,
    },
    #[error(transparent)]
    Sampler(#[from] BuildSamplerError),
    #[error(transparent)]
    Run(#[from] RunSamplerError),
}
