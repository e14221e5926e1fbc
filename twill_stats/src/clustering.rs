//! Pitman-Yor clustering descriptor and partition probabilities
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A two-parameter Pitman-Yor process descriptor.
///
/// `alpha` is the concentration and `d` the discount. With `d` = 0 the
/// process reduces to the Chinese Restaurant Process with concentration
/// `alpha`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PitmanYor {
    pub alpha: f64,
    pub d: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusteringError {
    #[error("alpha ({alpha}) must be a positive, finite number")]
    AlphaNotPositive { alpha: f64 },
    #[error("discount ({d}) must be in [0, 1)")]
    DiscountOutOfRange { d: f64 },
}

impl Default for PitmanYor {
    fn default() -> Self {
        PitmanYor { alpha: 1.0, d: 0.0 }
    }
}

impl PitmanYor {
    /// Create a new descriptor, validating the hyperparameters.
    pub fn new(alpha: f64, d: f64) -> Result<Self, ClusteringError> {
        let clustering = PitmanYor { alpha, d };
        clustering.validate()?;
        Ok(clustering)
    }

    /// Create a new descriptor without validating the hyperparameters.
    pub fn new_unchecked(alpha: f64, d: f64) -> Self {
        PitmanYor { alpha, d }
    }

    /// Err if `alpha` is not positive and finite or `d` is outside [0, 1).
    pub fn validate(&self) -> Result<(), ClusteringError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            Err(ClusteringError::AlphaNotPositive { alpha: self.alpha })
        } else if !(0.0..1.0).contains(&self.d) {
            Err(ClusteringError::DiscountOutOfRange { d: self.d })
        } else {
            Ok(())
        }
    }

    /// Unnormalized weight of reassigning an item to a component that
    /// currently holds `ct` items.
    #[inline]
    pub fn gibbs_weight(&self, ct: usize) -> f64 {
        ct as f64 - self.d
    }

    /// Unnormalized weight of each currently-empty component when the
    /// new-table mass is spread uniformly over `n_empty` empty components.
    ///
    /// Returns 0 when there are no empty components.
    #[inline]
    pub fn empty_kind_weight(&self, n_nonempty: usize, n_empty: usize) -> f64 {
        if n_empty == 0 {
            0.0
        } else {
            self.d.mul_add(n_nonempty as f64, self.alpha) / n_empty as f64
        }
    }

    /// Log probability of a partition with occupied-component sizes `counts`.
    ///
    /// Computed by seating items sequentially: after the first item, the
    /// j<sup>th</sup> new component opens with weight `alpha + j * d`, an
    /// occupied component grows from size m with weight `m - d`, and each
    /// seating is normalized by `alpha + (items seated so far)`. Equivalent
    /// to the exchangeable partition probability function in Pitman, Jim.
    /// "Exchangeable and partially exchangeable random partitions."
    /// Probability theory and related fields 102.2 (1995): 145-158.
    ///
    /// All entries of `counts` must be positive.
    pub fn ln_f_partition(&self, counts: &[usize]) -> f64 {
        let mut ln_p = 0.0;
        let mut n: usize = 0;

        for (j, &ct) in counts.iter().enumerate() {
            if j > 0 {
                ln_p += self.d.mul_add(j as f64, self.alpha).ln();
            }
            for m in 1..ct {
                ln_p += (m as f64 - self.d).ln();
            }
            n += ct;
        }

        for i in 1..n {
            ln_p -= (self.alpha + i as f64).ln();
        }

        ln_p
    }
}
