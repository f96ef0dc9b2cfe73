use serde::{Deserialize, Serialize};

use crate::analyzer::entity::{CategorySet, EntityCategory};

/// Number of feature columns
pub const FEATURE_DIM: usize = EntityCategory::ALL.len();

/// カテゴリ別の出現数
/// 列順は [PersonName, Location, Date, Organization] で固定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub id: String,
    pub counts: [u32; FEATURE_DIM],
}

impl FeatureVector {
    pub fn new(id: impl Into<String>, text: &str) -> Self {
        Self {
            id: id.into(),
            counts: build_feature_vector(text),
        }
    }

    #[inline]
    pub fn count(&self, category: EntityCategory) -> u32 {
        self.counts[category.column()]
    }
}

/// Count raw predicate hits over every whitespace token of `text`.
///
/// Stopwords are not applied here and a token may bump several columns,
/// so the counts can exceed the length of the extraction list.
pub fn build_feature_vector(text: &str) -> [u32; FEATURE_DIM] {
    let mut counts = [0u32; FEATURE_DIM];
    for token in text.split_whitespace() {
        let categories = CategorySet::classify(token);
        for category in categories.iter() {
            counts[category.column()] += 1;
        }
    }
    counts
}
