//! One container per feature type
use serde::{Deserialize, Serialize};

use crate::feature::FType;

/// A struct-of-five holding one `T` per feature type.
///
/// The fields can be addressed directly or by [`FType`] value through
/// [`FTypeParts::get`]. Iteration always visits the parts in
/// [`FType::ALL`] order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FTypeParts<T> {
    pub dd16: T,
    pub dd256: T,
    pub dpd: T,
    pub gp: T,
    pub nich: T,
}

impl<T> FTypeParts<T> {
    pub fn get(&self, ftype: FType) -> &T {
        match ftype {
            FType::Dd16 => &self.dd16,
            FType::Dd256 => &self.dd256,
            FType::Dpd => &self.dpd,
            FType::Gp => &self.gp,
            FType::Nich => &self.nich,
        }
    }

    pub fn get_mut(&mut self, ftype: FType) -> &mut T {
        match ftype {
            FType::Dd16 => &mut self.dd16,
            FType::Dd256 => &mut self.dd256,
            FType::Dpd => &mut self.dpd,
            FType::Gp => &mut self.gp,
            FType::Nich => &mut self.nich,
        }
    }

    /// Visit each part with its tag in the canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (FType, &T)> {
        FType::ALL.iter().map(move |&ftype| (ftype, self.get(ftype)))
    }
}
