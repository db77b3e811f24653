//! Delimited-file loaders and writers for matrices and correspondence lookups.

mod delimited;
pub mod lookup_io;
pub mod matrix_io;

pub use lookup_io::{read_correspondence, LookupColumns};
pub use matrix_io::{read_od_matrix, write_od_matrix, write_od_matrix_dense, write_zone_vector};
