//! # rezone-bench
//!
//! Deterministic synthetic fixtures for the rezoning benchmarks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rezone_core::config::DEFAULT_TOLERANCE;
use rezone_core::errors::{CorrespondenceError, MatrixError};
use rezone_matrix::{CorrespondenceTable, ODMatrix};

/// Fine-to-coarse correspondence: `old_zones` fine zones, each split between
/// its home coarse zone and the next one. Every fifth zone is wholly
/// contained. All groups are balanced.
pub fn nested_correspondence(
    old_zones: u32,
    zones_per_parent: u32,
) -> Result<CorrespondenceTable<u32, u32>, CorrespondenceError> {
    let per_parent = zones_per_parent.max(1);
    let parents = old_zones.div_ceil(per_parent).max(1);
    let mut rows = Vec::with_capacity(old_zones as usize * 2);
    for zone in 0..old_zones {
        let parent = zone / per_parent;
        if zone % 5 == 0 || parents == 1 {
            rows.push((zone, parent, 1.0));
        } else {
            let share = f64::from(zone % 4 + 1) / 5.0;
            rows.push((zone, parent, 1.0 - share));
            rows.push((zone, (parent + 1) % parents, share));
        }
    }
    CorrespondenceTable::from_triples(rows, DEFAULT_TOLERANCE)
}

/// Sparse matrix over `zones` zones with roughly `density` of all cells filled.
///
/// The same seed always yields the same matrix.
pub fn synthetic_matrix(zones: u32, density: f64, seed: u64) -> Result<ODMatrix<u32>, MatrixError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cells = Vec::with_capacity((f64::from(zones).powi(2) * density) as usize);
    for o in 0..zones {
        for d in 0..zones {
            if rng.gen::<f64>() < density {
                cells.push((o, d, rng.gen_range(1.0f64..100.0)));
            }
        }
    }
    ODMatrix::from_cells(cells)
}

/// `count` matrices sharing one zoning system, for batch runs.
pub fn synthetic_batch(
    count: usize,
    zones: u32,
    density: f64,
) -> Result<Vec<(String, ODMatrix<u32>)>, MatrixError> {
    (0..count)
        .map(|i| Ok((format!("period_{i}"), synthetic_matrix(zones, density, i as u64 + 1)?)))
        .collect()
}
