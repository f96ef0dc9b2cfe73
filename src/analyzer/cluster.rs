use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::analyzer::document::Document;
use crate::analyzer::entity::EntityExtractor;

/// Documents sharing one extracted entity string.
/// Wire names are `clusterName` / `documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(rename = "clusterName")]
    pub key: String,
    #[serde(rename = "documents")]
    pub members: Vec<Document>,
}

/// 逆インデックス: entity文字列 -> 文書のインデックス列
///
/// キーは初出順、各キーの文書も初出順。
/// 同じ文書が同じキーに二度入ることはない。
#[derive(Debug, Default, Clone)]
pub struct EntityIndex {
    postings: IndexMap<String, Vec<usize>>,
}

impl EntityIndex {
    pub fn build(extractor: &EntityExtractor, documents: &[Document]) -> Self {
        let mut index = Self::default();
        for (doc_idx, doc) in documents.iter().enumerate() {
            // 文書内で重複するentityは一度だけ数える
            let distinct: IndexSet<String> = extractor.extract_tokens(&doc.content).into_iter().collect();
            for key in distinct {
                index.postings.entry(key).or_default().push(doc_idx);
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Documents (by batch index) mentioning `key`. Keys are case-sensitive.
    pub fn get(&self, key: &str) -> Option<&[usize]> {
        self.postings.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Materialize clusters with owned copies of the member documents
    pub fn into_clusters(self, documents: &[Document]) -> Vec<Cluster> {
        self.postings
            .into_iter()
            .map(|(key, members)| Cluster {
                key,
                members: members.into_iter().map(|i| documents[i].clone()).collect(),
            })
            .collect()
    }
}

/// Group documents by every distinct entity they mention.
/// Documents without entities appear in no cluster.
pub fn cluster_documents(extractor: &EntityExtractor, documents: &[Document]) -> Vec<Cluster> {
    EntityIndex::build(extractor, documents).into_clusters(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(clusters: &[Cluster]) -> Vec<&str> {
        clusters.iter().map(|c| c.key.as_str()).collect()
    }

    fn member_ids(cluster: &Cluster) -> Vec<&str> {
        cluster.members.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn scenario_documents() {
        let docs = vec![
            Document::new("d1", "John Smith visited Location42 on 2024-01-05"),
            Document::new("d2", "no entities here at all"),
        ];
        let clusters = cluster_documents(&EntityExtractor::default(), &docs);
        assert_eq!(keys(&clusters), vec!["John", "Smith", "Location42"]);
        for c in &clusters {
            assert_eq!(member_ids(c), vec!["d1"]);
        }
    }

    #[test]
    fn insertion_order_of_keys_and_members() {
        let docs = vec![
            Document::new("a", "Bob Alice"),
            Document::new("b", "Alice Carol"),
            Document::new("c", "Carol Bob Alice"),
        ];
        let clusters = cluster_documents(&EntityExtractor::default(), &docs);
        assert_eq!(keys(&clusters), vec!["Bob", "Alice", "Carol"]);
        assert_eq!(member_ids(&clusters[0]), vec!["a", "c"]);
        assert_eq!(member_ids(&clusters[1]), vec!["a", "b", "c"]);
        assert_eq!(member_ids(&clusters[2]), vec!["b", "c"]);
    }

    #[test]
    fn repeated_mentions_count_once_per_document() {
        let docs = vec![Document::new("a", "Alice Alice Alice")];
        let clusters = cluster_documents(&EntityExtractor::default(), &docs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(member_ids(&clusters[0]), vec!["a"]);
    }

    #[test]
    fn keys_are_exact_strings() {
        let docs = vec![
            Document::new("a", "Location"),
            Document::new("b", "location"),
        ];
        let index = EntityIndex::build(&EntityExtractor::default(), &docs);
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["Location", "location"]);
        assert_eq!(index.get("Location"), Some(&[0][..]));
        assert_eq!(index.get("LOCATION"), None);
    }

    #[test]
    fn empty_inputs() {
        let ex = EntityExtractor::default();
        assert!(cluster_documents(&ex, &[]).is_empty());
        let docs = vec![Document::new("x", "nothing to see")];
        assert!(EntityIndex::build(&ex, &docs).is_empty());
    }

    #[test]
    fn wire_shape_uses_cluster_name() {
        let docs = vec![Document::new("d1", "Alice")];
        let clusters = cluster_documents(&EntityExtractor::default(), &docs);
        let json = serde_json::to_value(&clusters).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "clusterName": "Alice",
                "documents": [{ "id": "d1", "content": "Alice" }]
            }])
        );
    }
}
