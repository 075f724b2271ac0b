use std::cmp::Ordering;

use candle_core::{Device, Tensor};

use heritage_core::error::{Error, Result};
use heritage_core::types::Document;

/// Exact inner-product index over unit-length vectors.
///
/// `matrix` is a `[len, dim]` f32 tensor on the CPU; row `i` belongs to
/// `documents[i]` and the pairing never changes after construction.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    matrix: Tensor,
    documents: Vec<Document>,
}

impl FlatIndex {
    /// Pair `vectors` with `documents`, normalizing each row to unit length.
    pub fn new(dim: usize, vectors: Vec<Vec<f32>>, documents: Vec<Document>) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::Operation("cannot build an index from an empty corpus".into()));
        }
        if vectors.len() != documents.len() {
            return Err(Error::IndexMismatch(format!(
                "{} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }
        let rows = vectors.len();
        let mut flat = Vec::with_capacity(dim * rows);
        for (i, mut v) in vectors.into_iter().enumerate() {
            if v.len() != dim {
                return Err(Error::IndexMismatch(format!(
                    "vector {} has dim {} (expected {})",
                    i,
                    v.len(),
                    dim
                )));
            }
            l2_normalize(&mut v);
            flat.extend_from_slice(&v);
        }
        let matrix = Tensor::from_vec(flat, (rows, dim), &Device::Cpu).map_err(candle_err)?;
        Ok(Self { dim, matrix, documents })
    }

    /// Rebuild from a persisted `[len, dim]` tensor; rows are taken as stored.
    pub(crate) fn from_parts(matrix: Tensor, documents: Vec<Document>) -> Result<Self> {
        let (rows, dim) = matrix.dims2().map_err(|e| Error::IndexMismatch(e.to_string()))?;
        if dim == 0 || rows != documents.len() {
            return Err(Error::IndexMismatch(format!(
                "[{}, {}] tensor cannot hold {} documents",
                rows,
                dim,
                documents.len()
            )));
        }
        Ok(Self { dim, matrix, documents })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub(crate) fn matrix(&self) -> &Tensor {
        &self.matrix
    }

    /// Top `k` rows by inner product with `query`, best first.
    ///
    /// Ties keep index order. Scores are clamped to [-1, 1].
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(Error::IndexMismatch(format!(
                "query has dim {} (index dim {})",
                query.len(),
                self.dim
            )));
        }
        let q = Tensor::from_slice(query, (self.dim, 1), &Device::Cpu).map_err(candle_err)?;
        let scores = self
            .matrix
            .matmul(&q)
            .and_then(|s| s.squeeze(1))
            .and_then(|s| s.to_vec1::<f32>())
            .map_err(candle_err)?;
        let mut scored: Vec<(usize, f32)> = scores
            .into_iter()
            .map(|s| if s.is_nan() { -1.0 } else { s.clamp(-1.0, 1.0) })
            .enumerate()
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

pub(crate) fn candle_err(e: candle_core::Error) -> Error {
    Error::Operation(format!("tensor op: {}", e))
}

/// Scale `v` to unit length in place; zero vectors stay zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document {
                title: format!("项目{}", i),
                content: String::new(),
                metadata: Default::default(),
            })
            .collect()
    }

    #[test]
    fn scores_are_inner_products_of_normalized_rows() {
        let index = FlatIndex::new(
            2,
            vec![vec![3.0, 0.0], vec![0.0, 2.0], vec![1.0, 1.0], vec![-5.0, 0.0]],
            docs(4),
        )
        .unwrap();
        let hits = index.search(&[1.0, 0.0], 4).unwrap();
        let order: Vec<usize> = hits.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, [0, 2, 1, 3]);
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
        assert!((hits[1].1 - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((hits[3].1 + 1.0).abs() < 1e-6);
    }

    #[test]
    fn ties_keep_row_order_and_zero_rows_score_zero() {
        let index = FlatIndex::new(2, vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]], docs(3))
            .unwrap();
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits, vec![(0, 0.0), (1, 0.0), (2, 0.0)]);
    }

    #[test]
    fn query_dim_must_match() {
        let index = FlatIndex::new(2, vec![vec![1.0, 0.0]], docs(1)).unwrap();
        assert!(matches!(index.search(&[1.0, 0.0, 0.0], 1), Err(Error::IndexMismatch(_))));
    }
}
