use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::model::de;
use crate::store::{CompanyRecord, CompanyView, RESERVED_FIELDS, Recommendation};

use super::error::ServiceError;

/// Inbound company payload for registration and ad-hoc queries.
///
/// Unknown keys are kept and stored as auxiliary fields. Caller-supplied
/// `vector`, `recommendations` and `score` keys are discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(default)]
    pub company_name: Option<String>,

    #[serde(default)]
    pub company_profile: Option<String>,

    #[serde(default, deserialize_with = "de::keyword_set")]
    pub business_keywords: BTreeSet<String>,

    #[serde(default, deserialize_with = "de::truthy")]
    pub gives: bool,

    #[serde(default, deserialize_with = "de::truthy")]
    pub top10_customers: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompanyProfile {
    pub fn new(company_name: impl Into<String>, company_profile: impl Into<String>) -> Self {
        Self {
            company_name: Some(company_name.into()),
            company_profile: Some(company_profile.into()),
            ..Default::default()
        }
    }

    /// Non-blank company name.
    pub fn require_name(&self) -> Result<&str, ServiceError> {
        non_blank(self.company_name.as_deref()).ok_or(ServiceError::MissingField {
            field: "companyName",
        })
    }

    /// Non-blank profile text.
    pub fn require_profile(&self) -> Result<&str, ServiceError> {
        non_blank(self.company_profile.as_deref()).ok_or(ServiceError::MissingField {
            field: "companyProfile",
        })
    }

    /// Converts into a record, attaching `embedding` when already computed.
    pub fn into_record(self, embedding: Option<Vec<f32>>) -> CompanyRecord {
        let auxiliary = self
            .extra
            .into_iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .collect();

        CompanyRecord {
            identifier: non_blank(self.company_name.as_deref())
                .map(str::to_string)
                .unwrap_or_default(),
            profile_text: self.company_profile,
            embedding,
            business_keywords: self.business_keywords,
            gives: self.gives,
            top10_customers: self.top10_customers,
            cached_recommendations: None,
            auxiliary,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub company: CompanyView,
    /// Initial top-K against the companies stored before this one.
    pub recommendations: Vec<Recommendation>,
}
