pub mod dense;
pub mod eigen;

pub use dense::{dot, DenseMatrix};
pub use eigen::{EigenConfig, SymmetricEigen};
