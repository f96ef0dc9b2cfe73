use num::Num;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analyzer::document::Document;
use crate::analyzer::feature::{build_feature_vector, FeatureVector};
use crate::error::AnalyzeError;
use crate::utils::math::DenseMatrix;

/// One matrix row: document id plus its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow<N = u32> {
    pub id: String,
    pub data: Vec<N>,
}

impl From<FeatureVector> for MatrixRow<u32> {
    fn from(fv: FeatureVector) -> Self {
        MatrixRow {
            id: fv.id,
            data: fv.counts.to_vec(),
        }
    }
}

/// Ordered rows keyed by document id.
///
/// The row order is the join key back to document identity and is never
/// re-sorted. Rows built by `assemble` always share the same width; rows
/// pushed or deserialized by a caller may not, which is why the reducer
/// validates the shape before doing anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMatrix<N = u32> {
    pub rows: Vec<MatrixRow<N>>,
}

impl<N> Default for DocumentMatrix<N> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl DocumentMatrix<u32> {
    /// Feature vector per document, in input order.
    /// Per-document work is spread over rayon; `collect` keeps the order.
    pub fn assemble(documents: &[Document]) -> Self {
        let rows = documents
            .par_iter()
            .map(|doc| MatrixRow {
                id: doc.id.clone(),
                data: build_feature_vector(&doc.content).to_vec(),
            })
            .collect();
        Self { rows }
    }
}

impl<N> DocumentMatrix<N>
where
    N: Num + Copy + Into<f64>,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>, data: Vec<N>) -> &mut Self {
        self.rows.push(MatrixRow { id: id.into(), data });
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.id.as_str())
    }

    /// Column count shared by every row.
    ///
    /// # Errors
    /// * `EmptyMatrix` - no rows
    /// * `RaggedRow` - first row whose width differs from row 0
    /// * `ZeroWidth` - rows have no columns
    pub fn validate(&self) -> Result<usize, AnalyzeError> {
        let first = self.rows.first().ok_or(AnalyzeError::EmptyMatrix)?;
        let width = first.data.len();
        if let Some((row, bad)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.data.len() != width)
        {
            return Err(AnalyzeError::RaggedRow {
                row,
                id: bad.id.clone(),
                expected: width,
                found: bad.data.len(),
            });
        }
        if width == 0 {
            return Err(AnalyzeError::ZeroWidth);
        }
        Ok(width)
    }

    /// 検証してから f64 の密行列へ変換
    pub fn to_dense(&self) -> Result<DenseMatrix, AnalyzeError> {
        let width = self.validate()?;
        Ok(DenseMatrix::from_fn(self.rows.len(), width, |r, c| {
            self.rows[r].data[c].into()
        }))
    }
}
