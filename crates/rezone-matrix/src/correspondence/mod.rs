//! Zone correspondence: validated old-zone → new-zone splitting factors.

pub mod spatial;
pub mod table;
pub mod types;

pub use spatial::{SpatialCorrespondence, SpatialRow};
pub use table::CorrespondenceTable;
pub use types::{CorrespondenceRecord, Splits};
