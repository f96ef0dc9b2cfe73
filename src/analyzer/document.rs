use serde::{Deserialize, Serialize};

/// Input document. `id` is unique within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Provider of the canonical document sequence.
///
/// The analysis core never touches the file system; whoever owns the
/// documents (a directory walker, a request body, a test fixture)
/// implements this trait. The returned order is the row order of every
/// matrix built from "all documents".
pub trait DocumentSource {
    type Error;

    fn list_documents(&self) -> Result<Vec<Document>, Self::Error>;
}

/// 既にメモリ上にある文書列
impl DocumentSource for [Document] {
    type Error = std::convert::Infallible;

    fn list_documents(&self) -> Result<Vec<Document>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl DocumentSource for Vec<Document> {
    type Error = std::convert::Infallible;

    fn list_documents(&self) -> Result<Vec<Document>, Self::Error> {
        Ok(self.clone())
    }
}
