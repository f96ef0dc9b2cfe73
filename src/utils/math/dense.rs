use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

/// 行優先の密行列
/// 特徴量は列数が小さい(4列)ので疎表現にはしない
///
/// rows x cols の要素を `data` に連続して保持します
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// 全要素0の行列を作成
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// 単位行列を作成
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build a matrix element by element
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols, "index out of range");
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.rows && col < self.cols, "index out of range");
        self.data[row * self.cols + col] = value;
    }

    /// 行のスライスを取得
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// 列を新しいVecとして取得
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> {
        // cols == 0 のとき chunks_exact(0) は panic するので空で返す
        let chunk = self.cols.max(1);
        self.data.chunks_exact(chunk).take(if self.cols == 0 { 0 } else { self.rows })
    }

    /// Arithmetic mean of every column.
    /// An empty matrix yields all zeros.
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.cols];
        if self.rows == 0 {
            return means;
        }
        for row in self.row_iter() {
            for (m, v) in means.iter_mut().zip(row) {
                *m += *v;
            }
        }
        let n = self.rows as f64;
        means.iter_mut().for_each(|m| *m /= n);
        means
    }

    /// 各列から `means` を引く
    pub fn center_columns(&mut self, means: &[f64]) {
        debug_assert_eq!(means.len(), self.cols, "means length must match column count");
        let cols = self.cols;
        if cols == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(cols) {
            for (v, m) in row.iter_mut().zip(means) {
                *v -= *m;
            }
        }
    }

    /// Scatter matrix Mᵀ·M (cols x cols).
    /// Only the upper triangle is computed, the lower is mirrored so the
    /// result is exactly symmetric.
    pub fn gram(&self) -> DenseMatrix {
        let n = self.cols;
        let mut out = DenseMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let mut sum = 0.0;
                for row in self.row_iter() {
                    sum += row[i] * row[j];
                }
                out.set(i, j, sum);
                out.set(j, i, sum);
            }
        }
        out
    }

    /// 二乗フロベニウスノルム
    pub fn frobenius_norm_sq(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Sum of squares of the off-diagonal elements
    pub fn off_diagonal_norm_sq(&self) -> f64 {
        let mut sum = 0.0;
        for r in 0..self.rows {
            for c in 0..self.cols {
                if r != c {
                    let v = self.get(r, c);
                    sum += v * v;
                }
            }
        }
        sum
    }

    /// 最初に見つかった非対称な位置 (row, col) を返す
    /// 正方部分しか見ないので、正方かどうかは呼び出し側で確認すること
    pub fn first_asymmetry(&self, tolerance: f64) -> Option<(usize, usize)> {
        for r in 0..self.rows {
            for c in (r + 1)..self.cols.min(self.rows) {
                let a = self.get(r, c);
                let b = self.get(c, r);
                let scale = a.abs().max(b.abs()).max(1.0);
                if (a - b).abs() > tolerance * scale {
                    return Some((r, c));
                }
            }
        }
        None
    }

    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }
}

impl Debug for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "DenseMatrix {}x{} [", self.rows, self.cols)?;
            for row in self.row_iter() {
                writeln!(f, "    {:?}", row)?;
            }
            write!(f, "]")
        } else {
            f.debug_struct("DenseMatrix")
                .field("rows", &self.rows)
                .field("cols", &self.cols)
                .field("data", &self.data)
                .finish()
        }
    }
}

/// 密ベクトルのドット積
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(
        a.len(),
        b.len(),
        "Vectors must be of the same length to compute dot product."
    );
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
