use serde::{Deserialize, Serialize};

use crate::feature::{FType, FTypeParts};

/// An ordered list of feature types, one tag per feature.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema(Vec<FType>);

impl Schema {
    pub fn new(ftypes: Vec<FType>) -> Self {
        Schema(ftypes)
    }

    /// The number of features.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The type tag of the feature at `ix`.
    pub fn ftype(&self, ix: usize) -> FType {
        self.0[ix]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FType> {
        self.0.iter()
    }

    /// Append every tag of `other`.
    pub fn extend(&mut self, other: &Schema) {
        self.0.extend_from_slice(&other.0);
    }

    /// The number of features of each type.
    pub fn part_counts(&self) -> FTypeParts<usize> {
        let mut counts = FTypeParts::default();
        self.0.iter().for_each(|&ftype| {
            *counts.get_mut(ftype) += 1;
        });
        counts
    }
}

impl From<Vec<FType>> for Schema {
    fn from(ftypes: Vec<FType>) -> Self {
        Schema(ftypes)
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts = self.part_counts();
        let mut sep = "";
        for (ftype, ct) in counts.iter() {
            write!(f, "{sep}{ftype}: {ct}")?;
            sep = ", ";
        }
        Ok(())
    }
}
