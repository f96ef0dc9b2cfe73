/// This crate is a small Document Analysis Engine built around entity-count vectors.
pub mod analyzer;
pub mod error;
pub mod utils;

/// Entity Analyzer
/// The top-level struct of this crate, giving access to the whole pipeline:
/// - entity extraction from raw text
/// - document x entity-category matrix construction
/// - clustering of documents by shared entity strings
/// - 2-D PCA style projection of the matrix
///
/// It only holds immutable settings (`AnalyzerConfig`), so one instance can
/// be shared freely. Nothing is cached: every call recomputes its result.
///
/// The analyzer performs no I/O. Documents are supplied directly or through
/// a `DocumentSource`.
pub use analyzer::EntityAnalyzer;

/// Analyzer Configuration
/// Stopword list and eigen solver settings.
/// Serializable; every field has a default so partial configs are accepted.
pub use analyzer::config::AnalyzerConfig;

/// Document and Document Source
/// - `Document`: an `(id, content)` pair owned by the caller
/// - `DocumentSource`: injected provider of the canonical document sequence
pub use analyzer::document::{Document, DocumentSource};

/// Entity Extraction
/// Whitespace tokenization plus four independent predicates:
/// - PersonName: one or more capitalized ASCII words
/// - Location: contains "location" (case-insensitive)
/// - Date: `YYYY-MM-DD` shape, no calendar validation
/// - Organization: contains "organization" (case-insensitive)
///
/// The Location / Organization predicates are substring heuristics, not
/// gazetteer lookups. This is a known limitation kept for compatibility.
pub use analyzer::entity::{CategorySet, EntityCategory, EntityExtractor, EntityMention};

/// Feature Vector
/// Per-document counts in fixed column order
/// `[PersonName, Location, Date, Organization]`.
pub use analyzer::feature::{build_feature_vector, FeatureVector, FEATURE_DIM};

/// Document Matrix
/// Ordered rows of `(id, data)`. Row order is input order and is the join
/// key back to document identity.
pub use analyzer::matrix::{DocumentMatrix, MatrixRow};

/// Entity Clusters
/// Inverted index from exact entity string to the documents mentioning it,
/// insertion ordered on both levels.
pub use analyzer::cluster::{Cluster, EntityIndex};

/// Projection
/// Result of the dimensionality reduction:
/// - `ProjectedPoint`: document id and its `(x, y)`
/// - `Component`: chosen eigenvalue and unit axis
/// - `Projection`: points, components, column means, total variance and the `degenerate` flag
///
/// A matrix whose columns all have zero variance (for example a single
/// document) is not an error: every point is `(0, 0)` and `degenerate` is set.
pub use analyzer::projection::{Component, ProjectedPoint, Projection};

/// Error type of the analysis core
pub use error::AnalyzeError;

/// Symmetric eigen solver settings and result
pub use utils::math::{EigenConfig, SymmetricEigen};
