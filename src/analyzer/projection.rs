use std::fmt::{self, Debug};

use num::Num;
use serde::{Deserialize, Serialize};

use crate::analyzer::matrix::DocumentMatrix;
use crate::error::AnalyzeError;
use crate::utils::math::{dot, EigenConfig, SymmetricEigen};

/// Output dimensionality of the projection
pub const COMPONENTS: usize = 2;

/// 2次元座標付きの文書
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub id: String,
    pub coordinates: (f64, f64),
}

/// Chosen principal axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub eigenvalue: f64,
    /// unit vector, sign canonicalized
    pub axis: Vec<f64>,
}

/// Result of one reduction.
///
/// `degenerate` is set when every column has zero variance. This is not
/// an error: every point is then (0, 0) and callers may warn about it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub points: Vec<ProjectedPoint>,
    pub components: Vec<Component>,
    pub column_means: Vec<f64>,
    /// trace of the scatter matrix (= sum of all eigenvalues), 0 when degenerate
    pub total_variance: f64,
    pub degenerate: bool,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.id.as_str())
    }

    /// Share of `total_variance` carried by each chosen component.
    /// All zeros for degenerate input.
    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        let total = self.total_variance;
        self.components
            .iter()
            .map(|c| if total > 0.0 { c.eigenvalue / total } else { 0.0 })
            .collect()
    }
}

impl Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Projection (degenerate: {}) [", self.degenerate)?;
            for p in &self.points {
                writeln!(f, "    {:?}: ({:.6}, {:.6})", p.id, p.coordinates.0, p.coordinates.1)?;
            }
            write!(f, "]")
        } else {
            f.debug_struct("Projection")
                .field("points", &self.points)
                .field("components", &self.components)
                .field("column_means", &self.column_means)
                .field("total_variance", &self.total_variance)
                .field("degenerate", &self.degenerate)
                .finish()
        }
    }
}

/// PCA style reduction to two dimensions.
///
/// 1. validate shape (non-empty, rectangular, non-zero width)
/// 2. mean-center every column
/// 3. scatter matrix C = Mᵀ·M (no normalization, only ordering matters)
/// 4. Jacobi eigen-decomposition of C
/// 5. top-2 eigenpairs by eigenvalue desc, ties by index
/// 6. project the centered rows, keep the input row order
pub fn reduce<N>(matrix: &DocumentMatrix<N>, config: &EigenConfig) -> Result<Projection, AnalyzeError>
where
    N: Num + Copy + Into<f64>,
{
    let mut centered = matrix.to_dense()?;
    let column_means = centered.column_means();
    centered.center_columns(&column_means);

    let scatter = centered.gram();
    let eigen = SymmetricEigen::decompose(&scatter, config)?;
    let degenerate = eigen.spectral_radius() == 0.0;
    let total_variance: f64 = if degenerate { 0.0 } else { scatter.diagonal().iter().sum() };

    let mut components: Vec<Component> = eigen
        .leading(COMPONENTS)
        .into_iter()
        .map(|(eigenvalue, axis)| Component { eigenvalue, axis })
        .collect();
    if degenerate {
        // 分散ゼロ: 軸は意味を持たないので全点 (0, 0)
        components.iter_mut().for_each(|c| c.eigenvalue = 0.0);
    }

    tracing::debug!(
        rows = centered.rows(),
        cols = centered.cols(),
        sweeps = eigen.sweeps,
        degenerate,
        eigenvalues = ?eigen.eigenvalues,
        "reduced document matrix"
    );

    let points = matrix
        .rows
        .iter()
        .zip(centered.row_iter())
        .map(|(row, values)| {
            let coordinate = |axis: usize| -> f64 {
                match components.get(axis) {
                    Some(c) if !degenerate => dot(values, &c.axis),
                    _ => 0.0,
                }
            };
            ProjectedPoint {
                id: row.id.clone(),
                coordinates: (coordinate(0), coordinate(1)),
            }
        })
        .collect();

    Ok(Projection {
        points,
        components,
        column_means,
        total_variance,
        degenerate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::document::Document;

    const EPS: f64 = 1e-9;

    fn project<N: Num + Copy + Into<f64>>(m: &DocumentMatrix<N>) -> Projection {
        reduce(m, &EigenConfig::default()).unwrap()
    }

    #[test]
    fn two_document_scenario() {
        let docs = vec![
            Document::new("d1", "John visited Location42 on 2024-01-05"),
            Document::new("d2", "no entities here at all"),
        ];
        let m = DocumentMatrix::assemble(&docs);
        let p = project(&m);

        assert!(!p.degenerate);
        assert_eq!(p.column_means, vec![0.5, 0.5, 0.5, 0.0]);
        assert!((p.components[0].eigenvalue - 1.5).abs() < EPS);
        assert_eq!(p.components[1].eigenvalue, 0.0);

        let (a, b) = (p.points[0].coordinates, p.points[1].coordinates);
        let half_sqrt3 = 3f64.sqrt() / 2.0;
        assert!((a.0 - half_sqrt3).abs() < EPS, "{a:?}");
        assert!((b.0 + half_sqrt3).abs() < EPS, "{b:?}");
        assert!(a.1.abs() < EPS && b.1.abs() < EPS);
    }

    #[test]
    fn single_document_projects_to_origin() {
        let mut m = DocumentMatrix::<u32>::new();
        m.push("only", vec![3, 1, 4, 1]);
        let p = project(&m);
        assert!(p.degenerate);
        assert_eq!(p.points, vec![ProjectedPoint { id: "only".into(), coordinates: (0.0, 0.0) }]);
    }

    #[test]
    fn identical_rows_project_identically() {
        let mut m = DocumentMatrix::<u32>::new();
        for id in ["x", "y", "z"] {
            m.push(id, vec![2, 0, 1, 5]);
        }
        let p = project(&m);
        assert!(p.degenerate);
        assert!(p.points.iter().all(|pt| pt.coordinates == (0.0, 0.0)));
        assert_eq!(p.total_variance, 0.0);
        assert!(p.explained_variance_ratio().iter().all(|&r| r == 0.0));
    }

    #[test]
    fn row_order_is_preserved() {
        let docs = vec![
            Document::new("a", "Alice organizationX"),
            Document::new("b", "Bob Location 2020-01-01"),
            Document::new("c", "nothing"),
        ];
        let p = project(&DocumentMatrix::assemble(&docs));
        assert_eq!(p.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn constant_column_has_no_weight() {
        let mut m = DocumentMatrix::<f64>::new();
        m.push("a", vec![1.0, 7.0]).push("b", vec![3.0, 7.0]).push("c", vec![5.0, 7.0]);
        let p = project(&m);
        assert_eq!(p.components[0].axis, vec![1.0, 0.0]);
        let xs: Vec<f64> = p.points.iter().map(|pt| pt.coordinates.0).collect();
        assert_eq!(xs, vec![-2.0, 0.0, 2.0]);
        assert!(p.points.iter().all(|pt| pt.coordinates.1 == 0.0));
    }

    #[test]
    fn single_column_pads_second_axis() {
        let mut m = DocumentMatrix::<u32>::new();
        m.push("a", vec![0]).push("b", vec![2]);
        let p = project(&m);
        assert_eq!(p.components.len(), 1);
        assert_eq!(p.points[0].coordinates, (-1.0, 0.0));
        assert_eq!(p.points[1].coordinates, (1.0, 0.0));
    }

    #[test]
    fn projection_matches_known_principal_axes() {
        // 2列目の分散が大きい
        let mut m = DocumentMatrix::<f64>::new();
        m.push("a", vec![1.0, 0.0])
            .push("b", vec![-1.0, 0.0])
            .push("c", vec![0.0, 3.0])
            .push("d", vec![0.0, -3.0]);
        let p = project(&m);
        assert!((p.components[0].eigenvalue - 18.0).abs() < EPS);
        assert!((p.components[1].eigenvalue - 2.0).abs() < EPS);
        assert_eq!(p.points[2].coordinates, (3.0, 0.0));
        assert_eq!(p.points[0].coordinates, (0.0, 1.0));
        assert!((p.total_variance - 20.0).abs() < EPS);
        let ratio = p.explained_variance_ratio();
        assert!((ratio[0] - 0.9).abs() < EPS);
        assert!((ratio[1] - 0.1).abs() < EPS);
    }

    #[test]
    fn shape_errors_produce_no_output() {
        let cfg = EigenConfig::default();
        let empty = DocumentMatrix::<u32>::new();
        assert_eq!(reduce(&empty, &cfg).unwrap_err(), AnalyzeError::EmptyMatrix);

        let mut jagged = DocumentMatrix::<u32>::new();
        jagged.push("a", vec![1, 2, 3, 4]).push("b", vec![1, 2]);
        let err = reduce(&jagged, &cfg).unwrap_err();
        assert!(err.is_shape_error());
        assert!(matches!(err, AnalyzeError::RaggedRow { row: 1, .. }));
    }
}
