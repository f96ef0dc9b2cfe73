use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;
use crate::utils::math::dense::DenseMatrix;
use crate::utils::sort::argsort_desc;

/// Jacobi solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EigenConfig {
    /// Relative tolerance.
    /// Used for the symmetry check, the convergence test and for clamping
    /// eigenvalues that are numerically zero.
    pub tolerance: f64,
    /// Upper bound on full Jacobi sweeps
    pub max_sweeps: usize,
}

impl Default for EigenConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_sweeps: 64,
        }
    }
}

/// 実対称行列の固有分解結果
///
/// `eigenvectors[i]` は `eigenvalues[i]` に対応する単位ベクトル。
/// 並び順は対角要素の元のインデックス順 (ソートはしない)。
/// Jacobi 法なので値は常に実数で、複素数は出てこない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetricEigen {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Vec<Vec<f64>>,
    /// number of sweeps actually performed
    pub sweeps: usize,
}

impl SymmetricEigen {
    /// Cyclic Jacobi eigen-decomposition of a real symmetric matrix.
    ///
    /// # Errors
    /// * `NotSquare` - the matrix is not n x n
    /// * `NotSymmetric` - an off-diagonal pair differs beyond `config.tolerance`
    pub fn decompose(matrix: &DenseMatrix, config: &EigenConfig) -> Result<Self, AnalyzeError> {
        let n = matrix.rows();
        if n != matrix.cols() {
            return Err(AnalyzeError::NotSquare { rows: n, cols: matrix.cols() });
        }
        if let Some((row, col)) = matrix.first_asymmetry(config.tolerance) {
            return Err(AnalyzeError::NotSymmetric { row, col });
        }

        let mut a = matrix.clone();
        let mut v = DenseMatrix::identity(n);
        let scale = a.frobenius_norm_sq();
        let threshold = config.tolerance * config.tolerance * scale;

        let mut sweeps = 0;
        // 零行列はそのまま (固有値0, 単位ベクトル)
        while scale > 0.0 && sweeps < config.max_sweeps {
            if a.off_diagonal_norm_sq() <= threshold {
                break;
            }
            for p in 0..n {
                for q in (p + 1)..n {
                    rotate(&mut a, &mut v, p, q);
                }
            }
            sweeps += 1;
        }
        if sweeps == config.max_sweeps && a.off_diagonal_norm_sq() > threshold {
            tracing::debug!(
                sweeps,
                residual = a.off_diagonal_norm_sq(),
                "jacobi stopped before convergence"
            );
        }

        // 数値誤差レベルの固有値は0に丸める
        let zero_band = config.tolerance * scale.sqrt();
        let eigenvalues = a
            .diagonal()
            .into_iter()
            .map(|l| if l.abs() <= zero_band { 0.0 } else { l })
            .collect();
        let eigenvectors = (0..n).map(|c| v.column(c)).collect();

        Ok(Self { eigenvalues, eigenvectors, sweeps })
    }

    /// Indices of the eigenpairs by eigenvalue descending, ties by index.
    pub fn descending_order(&self) -> Vec<usize> {
        argsort_desc(&self.eigenvalues)
    }

    /// The `k` leading eigenpairs with a canonical sign.
    /// Returns fewer than `k` pairs when the matrix is smaller than `k`.
    pub fn leading(&self, k: usize) -> Vec<(f64, Vec<f64>)> {
        self.descending_order()
            .into_iter()
            .take(k)
            .map(|i| {
                let mut vector = self.eigenvectors[i].clone();
                canonicalize_sign(&mut vector);
                (self.eigenvalues[i], vector)
            })
            .collect()
    }

    /// Largest eigenvalue magnitude, 0.0 when empty
    pub fn spectral_radius(&self) -> f64 {
        self.eigenvalues.iter().fold(0.0, |acc: f64, l| acc.max(l.abs()))
    }
}

/// Jacobi rotation zeroing `a[p][q]`, accumulated into `v`.
fn rotate(a: &mut DenseMatrix, v: &mut DenseMatrix, p: usize, q: usize) {
    let apq = a.get(p, q);
    let app = a.get(p, p);
    let aqq = a.get(q, q);
    // 対角に比べて無視できる大きさなら回転せずに0にする
    if apq.abs() <= f64::EPSILON * 0.5 * (app.abs() + aqq.abs()) {
        a.set(p, q, 0.0);
        a.set(q, p, 0.0);
        return;
    }

    let theta = (aqq - app) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    let n = a.rows();
    // A <- A·J
    for k in 0..n {
        let akp = a.get(k, p);
        let akq = a.get(k, q);
        a.set(k, p, c * akp - s * akq);
        a.set(k, q, s * akp + c * akq);
    }
    // A <- Jᵀ·A
    for k in 0..n {
        let apk = a.get(p, k);
        let aqk = a.get(q, k);
        a.set(p, k, c * apk - s * aqk);
        a.set(q, k, s * apk + c * aqk);
    }
    a.set(p, q, 0.0);
    a.set(q, p, 0.0);
    // V <- V·J
    for k in 0..n {
        let vkp = v.get(k, p);
        let vkq = v.get(k, q);
        v.set(k, p, c * vkp - s * vkq);
        v.set(k, q, s * vkp + c * vkq);
    }
}

/// Flip `vector` so its largest-magnitude component (first on ties) is positive.
pub fn canonicalize_sign(vector: &mut [f64]) {
    let mut pivot = 0;
    for (i, x) in vector.iter().enumerate() {
        if x.abs() > vector[pivot].abs() {
            pivot = i;
        }
    }
    if vector.get(pivot).is_some_and(|x| *x < 0.0) {
        vector.iter_mut().for_each(|x| *x = -*x);
    }
}
