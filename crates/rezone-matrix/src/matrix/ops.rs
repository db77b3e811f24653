//! Element-wise arithmetic and trip filtering on OD matrices.
//!
//! Binary operations align the two matrices over the union of their cells,
//! treating absent cells as zero.

use rezone_core::errors::MatrixError;
use rezone_core::types::collections::{fx_set_with_capacity, FxHashSet};
use rezone_core::Zone;

use super::od::ODMatrix;

impl<Z: Zone> ODMatrix<Z> {
    /// Cell-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for ((o, d), v) in other.cells() {
            *out.cells_mut().entry((o.clone(), d.clone())).or_insert(0.0) += v;
        }
        out
    }

    /// Cell-wise difference. Cells that fall to zero or below are removed.
    pub fn sub(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for ((o, d), v) in other.cells() {
            *out.cells_mut().entry((o.clone(), d.clone())).or_insert(0.0) -= v;
        }
        out.cells_mut().retain(|_, v| *v > 0.0);
        out
    }

    /// Multiply every cell by a non-negative factor.
    pub fn scale(&self, factor: f64) -> Result<Self, MatrixError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(MatrixError::InvalidFactor { factor });
        }
        let mut out = self.clone();
        for v in out.cells_mut().values_mut() {
            *v *= factor;
        }
        out.cells_mut().retain(|_, v| *v > 0.0);
        Ok(out)
    }

    /// Cell-wise product; only cells present in both matrices survive.
    pub fn multiply(&self, other: &Self) -> Self {
        self.iter()
            .filter_map(|(o, d, v)| {
                let w = other.cells().get(&(o.clone(), d.clone()))?;
                Some((o.clone(), d.clone(), v * w))
            })
            .collect()
    }

    /// Drop external-to-external trips: cells whose origin and destination
    /// are both in `external`.
    pub fn remove_external_trips<'a, I>(&self, external: I) -> Self
    where
        I: IntoIterator<Item = &'a Z>,
        Z: 'a,
    {
        let external = external.into_iter();
        let mut set: FxHashSet<&Z> = fx_set_with_capacity(external.size_hint().0);
        set.extend(external);
        self.iter()
            .filter(|(o, d, _)| !(set.contains(o) && set.contains(d)))
            .map(|(o, d, v)| (o.clone(), d.clone(), v))
            .collect()
    }
}
