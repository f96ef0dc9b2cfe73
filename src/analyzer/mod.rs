pub mod cluster;
pub mod config;
pub mod document;
pub mod entity;
pub mod feature;
pub mod matrix;
pub mod projection;

use num::Num;

use crate::analyzer::{
    cluster::{cluster_documents, Cluster},
    config::AnalyzerConfig,
    document::{Document, DocumentSource},
    entity::{EntityExtractor, EntityMention},
    matrix::DocumentMatrix,
    projection::{reduce, Projection},
};
use crate::error::AnalyzeError;
use crate::utils::math::EigenConfig;

/// Entry point of the pipeline.
///
/// Holds only immutable settings; every call builds its results from
/// scratch and nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct EntityAnalyzer {
    extractor: EntityExtractor,
    eigen: EigenConfig,
}

impl Default for EntityAnalyzer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl EntityAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            extractor: EntityExtractor::new(config.stopwords.as_slice()),
            eigen: config.eigen,
        }
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Entity strings of `text` in order, duplicates kept
    pub fn extract_entities(&self, text: &str) -> Vec<String> {
        self.extractor.extract_tokens(text)
    }

    /// Same as `extract_entities` with the matched categories
    pub fn extract_mentions(&self, text: &str) -> Vec<EntityMention> {
        self.extractor.extract(text)
    }

    /// One `[PersonName, Location, Date, Organization]` row per document
    pub fn build_document_entity_matrix(&self, documents: &[Document]) -> DocumentMatrix {
        DocumentMatrix::assemble(documents)
    }

    pub fn cluster_documents(&self, documents: &[Document]) -> Vec<Cluster> {
        cluster_documents(&self.extractor, documents)
    }

    /// 2次元射影
    ///
    /// # Errors
    /// Shape errors for empty or jagged matrices. No partial result.
    pub fn compute_projection<N>(&self, matrix: &DocumentMatrix<N>) -> Result<Projection, AnalyzeError>
    where
        N: Num + Copy + Into<f64>,
    {
        reduce(matrix, &self.eigen)
    }

    /// Matrix of every document of `source`, in the source's order
    pub fn matrix_from_source<S>(&self, source: &S) -> Result<DocumentMatrix, S::Error>
    where
        S: DocumentSource + ?Sized,
    {
        let documents = source.list_documents()?;
        Ok(self.build_document_entity_matrix(&documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_end_to_end() {
        let analyzer = EntityAnalyzer::default();
        let docs = vec![
            Document::new("a", "Alice works at organizationA"),
            Document::new("b", "Bob moved to Location7 on 2023-03-03"),
            Document::new("c", "Alice and Bob met"),
        ];

        let matrix = analyzer.matrix_from_source(&docs).unwrap();
        assert_eq!(matrix.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(matrix.rows[1].data, vec![1, 1, 1, 0]);

        let projection = analyzer.compute_projection(&matrix).unwrap();
        assert_eq!(projection.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        // 中心化後の行の和は0なので座標の和も0
        let sum: f64 = projection.points.iter().map(|p| p.coordinates.0).sum();
        assert!(sum.abs() < 1e-9);

        let clusters = analyzer.cluster_documents(&docs);
        let alice = clusters.iter().find(|c| c.key == "Alice").unwrap();
        assert_eq!(alice.members.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn configured_stopwords_apply_to_extraction_only() {
        let config = AnalyzerConfig {
            stopwords: vec!["alice".into()],
            ..AnalyzerConfig::default()
        };
        let analyzer = EntityAnalyzer::new(&config);
        assert_eq!(analyzer.extract_entities("Alice The"), vec!["The"]);
        let m = analyzer.build_document_entity_matrix(&[Document::new("x", "Alice The")]);
        assert_eq!(m.rows[0].data, vec![2, 0, 0, 0]);
    }

    #[test]
    fn empty_batch_is_rejected_by_projection() {
        let analyzer = EntityAnalyzer::default();
        let m = analyzer.build_document_entity_matrix(&[]);
        assert_eq!(analyzer.compute_projection(&m).unwrap_err(), AnalyzeError::EmptyMatrix);
    }
}
