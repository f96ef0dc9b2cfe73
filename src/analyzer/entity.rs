use std::collections::HashSet;
use std::fmt;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

/// Coarse entity category.
/// The discriminant is the feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    PersonName = 0,
    Location = 1,
    Date = 2,
    Organization = 3,
}

impl EntityCategory {
    /// Fixed column order of feature vectors
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::PersonName,
        EntityCategory::Location,
        EntityCategory::Date,
        EntityCategory::Organization,
    ];

    #[inline]
    pub fn column(self) -> usize {
        self as usize
    }

    /// このカテゴリの判定関数をトークンに適用
    #[inline]
    pub fn matches(self, token: &str) -> bool {
        match self {
            EntityCategory::PersonName => is_person_name(token),
            EntityCategory::Location => is_location(token),
            EntityCategory::Date => is_date(token),
            EntityCategory::Organization => is_organization(token),
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityCategory::PersonName => "PersonName",
            EntityCategory::Location => "Location",
            EntityCategory::Date => "Date",
            EntityCategory::Organization => "Organization",
        };
        f.write_str(name)
    }
}

/// 4bit のカテゴリ集合
/// 1トークンが複数カテゴリに同時に入ることがある
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet {
    bits: u8,
}

impl CategorySet {
    pub const EMPTY: CategorySet = CategorySet { bits: 0 };

    /// PersonName | Location | Organization.
    /// Date alone does not make a token an extractable entity.
    pub const EXTRACTABLE: CategorySet = CategorySet {
        bits: (1 << EntityCategory::PersonName as u8)
            | (1 << EntityCategory::Location as u8)
            | (1 << EntityCategory::Organization as u8),
    };

    /// Evaluate every predicate independently
    pub fn classify(token: &str) -> Self {
        EntityCategory::ALL
            .iter()
            .filter(|c| c.matches(token))
            .fold(Self::EMPTY, |set, c| set | Self::from(*c))
    }

    #[inline]
    pub fn contains(self, category: EntityCategory) -> bool {
        self.bits & (1 << category as u8) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> impl Iterator<Item = EntityCategory> {
        EntityCategory::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<EntityCategory> for CategorySet {
    fn from(category: EntityCategory) -> Self {
        CategorySet { bits: 1 << category as u8 }
    }
}

impl BitOr for CategorySet {
    type Output = CategorySet;

    fn bitor(self, rhs: Self) -> Self::Output {
        CategorySet { bits: self.bits | rhs.bits }
    }
}

impl BitAnd for CategorySet {
    type Output = CategorySet;

    fn bitand(self, rhs: Self) -> Self::Output {
        CategorySet { bits: self.bits & rhs.bits }
    }
}

/// One classified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    pub token: String,
    pub categories: CategorySet,
}

impl EntityMention {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            categories: CategorySet::classify(token),
        }
    }
}

/// `^[A-Z][a-z]+( [A-Z][a-z]+)*$`
/// The whole token must match, not a sub-span.
pub fn is_person_name(token: &str) -> bool {
    !token.is_empty() && token.split(' ').all(is_capitalized_word)
}

#[inline]
fn is_capitalized_word(word: &str) -> bool {
    let bytes = word.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => {
            first.is_ascii_uppercase() && !rest.is_empty() && rest.iter().all(u8::is_ascii_lowercase)
        }
        None => false,
    }
}

/// Substring heuristic, not a gazetteer lookup
pub fn is_location(token: &str) -> bool {
    token.to_lowercase().contains("location")
}

/// `YYYY-MM-DD` shape only.
/// "9999-99-99" passes, there is no calendar check.
pub fn is_date(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Substring heuristic, not a registry lookup
pub fn is_organization(token: &str) -> bool {
    token.to_lowercase().contains("organization")
}

/// Function words dropped from the extraction list
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "at", "the", "it", "you", "this", "his", "our", "let", "he", "on", "they", "later", "will",
    "we", "my", "very", "can", "new", "in", "these", "also", "how", "end", "first", "then", "but",
    "what", "do", "type", "while", "like", "she", "all", "an",
];

/// Whitespace tokenizer plus category predicates plus stopword filter
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    stopwords: HashSet<String>,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS)
    }
}

impl EntityExtractor {
    /// stopwords は小文字化して保持する
    pub fn new<T>(stopwords: &[T]) -> Self
    where
        T: AsRef<str>,
    {
        Self {
            stopwords: stopwords.iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(&token.to_lowercase())
    }

    /// Every token with its categories, in input order, nothing filtered
    pub fn classify<'a>(&self, text: &'a str) -> impl Iterator<Item = (&'a str, CategorySet)> + 'a {
        text.split_whitespace().map(|tok| (tok, CategorySet::classify(tok)))
    }

    /// Retained mentions in input order, duplicates kept
    pub fn extract(&self, text: &str) -> Vec<EntityMention> {
        self.classify(text)
            .filter(|(tok, cats)| self.qualifies(tok, *cats))
            .map(|(tok, categories)| EntityMention { token: tok.to_string(), categories })
            .collect()
    }

    /// Same as `extract` but only the token strings
    pub fn extract_tokens(&self, text: &str) -> Vec<String> {
        self.classify(text)
            .filter(|(tok, cats)| self.qualifies(tok, *cats))
            .map(|(tok, _)| tok.to_string())
            .collect()
    }

    #[inline]
    fn qualifies(&self, token: &str, categories: CategorySet) -> bool {
        !(categories & CategorySet::EXTRACTABLE).is_empty() && !self.is_stopword(token)
    }
}
