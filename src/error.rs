use thiserror::Error;

/// Errors returned by the analysis core
///
/// All shape problems are detected before any arithmetic happens,
/// so a failed call never yields a partial projection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    /// Reduction requested on a matrix with no rows
    #[error("shape error: matrix has no rows")]
    EmptyMatrix,

    /// A row whose length differs from the first row
    #[error("shape error: row {row} ({id}) has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        id: String,
        expected: usize,
        found: usize,
    },

    /// Rows exist but carry no columns
    #[error("shape error: matrix rows have zero columns")]
    ZeroWidth,

    #[error("eigen solver expects a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("eigen solver expects a symmetric matrix, ({row}, {col}) differs from its transpose")]
    NotSymmetric { row: usize, col: usize },
}

impl AnalyzeError {
    /// shape系のエラーかどうか
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            AnalyzeError::EmptyMatrix | AnalyzeError::RaggedRow { .. } | AnalyzeError::ZeroWidth
        )
    }
}
