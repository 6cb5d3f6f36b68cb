use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque reference-typed fields that must leave the core as canonical strings.
///
/// `buisnessCategory` is spelled the way it is stored.
pub const REFERENCE_FIELDS: [&str; 6] = [
    "_id",
    "country",
    "registeredByEventPartner",
    "exhibitionId",
    "buisnessCategory",
    "bwebCategory",
];

/// Keys that never pass through as auxiliary data.
pub const RESERVED_FIELDS: [&str; 8] = [
    "companyName",
    "companyProfile",
    "vector",
    "businessKeywords",
    "gives",
    "top10Customers",
    "recommendations",
    "score",
];

/// A registered company as stored in the record store.
///
/// Optional inputs carry explicit defaults: missing keywords are an empty set,
/// missing flags are `false`, a missing vector is derived lazily from
/// `profile_text` by [`crate::embedding::EmbeddingAccessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Unique display name, the natural key of the store.
    #[serde(rename = "companyName")]
    pub identifier: String,

    /// Free-text description the embedding is derived from.
    #[serde(
        rename = "companyProfile",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_text: Option<String>,

    /// Cached embedding of `profile_text`.
    #[serde(rename = "vector", default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    #[serde(
        rename = "businessKeywords",
        default,
        deserialize_with = "de::keyword_set"
    )]
    pub business_keywords: BTreeSet<String>,

    #[serde(default, deserialize_with = "de::truthy")]
    pub gives: bool,

    #[serde(rename = "top10Customers", default, deserialize_with = "de::truthy")]
    pub top10_customers: bool,

    /// Last list written by propagation. Overwritten wholesale, never merged.
    #[serde(
        rename = "recommendations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cached_recommendations: Option<Vec<Recommendation>>,

    /// Pass-through attributes (country, category and partner references, ...).
    #[serde(flatten)]
    pub auxiliary: Map<String, Value>,
}

impl CompanyRecord {
    pub fn new(identifier: impl Into<String>, profile_text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            profile_text: Some(profile_text.into()),
            embedding: None,
            business_keywords: BTreeSet::new(),
            gives: false,
            top10_customers: false,
            cached_recommendations: None,
            auxiliary: Map::new(),
        }
    }

    /// A record with no description at all (embeds as the empty string).
    pub fn without_profile(identifier: impl Into<String>) -> Self {
        Self {
            profile_text: None,
            ..Self::new(identifier, "")
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.business_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_gives(mut self, gives: bool) -> Self {
        self.gives = gives;
        self
    }

    pub fn with_top10_customers(mut self, top10_customers: bool) -> Self {
        self.top10_customers = top10_customers;
        self
    }

    pub fn with_auxiliary(mut self, key: impl Into<String>, value: Value) -> Self {
        self.auxiliary.insert(key.into(), value);
        self
    }

    /// Text used for embedding; an absent description embeds as `""`.
    pub fn profile_text_or_empty(&self) -> &str {
        self.profile_text.as_deref().unwrap_or_default()
    }
}

/// A ranked candidate: its score plus the caller-safe projection of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub score: f32,
    #[serde(flatten)]
    pub company: CompanyView,
}

/// Caller-safe projection of a [`CompanyRecord`].
///
/// Carries neither the embedding nor the record's own cached list, and every
/// [`REFERENCE_FIELDS`] entry is already rendered as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_profile: Option<String>,
    #[serde(default)]
    pub business_keywords: BTreeSet<String>,
    #[serde(default)]
    pub gives: bool,
    #[serde(default)]
    pub top10_customers: bool,
    #[serde(flatten)]
    pub auxiliary: Map<String, Value>,
}

pub(crate) mod de {
    use std::collections::BTreeSet;

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are false.
    pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(is_truthy(&value))
    }

    pub fn is_truthy(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }
    }

    /// Keyword list that tolerates `null` and non-string scalars; duplicates collapse.
    pub fn keyword_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Option::<Vec<Value>>::deserialize(deserializer)?;
        Ok(values
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect())
    }
}
