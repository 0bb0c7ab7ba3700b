//! Typed view of the trademark search response.
//!
//! The upstream API returns an Elasticsearch-shaped envelope. Every section of
//! the payload is optional on the wire, so each field carries a serde default:
//! a response with missing hits or aggregations deserializes to empty
//! collections instead of failing.

use serde::{Deserialize, Serialize};

/// Top-level envelope returned by the search endpoint.
///
/// Created once per successful fetch and replaced wholesale by the next fetch.
/// Nothing in the crate mutates it after deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(default)]
    pub hits: HitsEnvelope,
    #[serde(default)]
    pub aggregations: Aggregations,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<TrademarkHit>,
}

/// One trademark record. `id` is unique within a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrademarkHit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: HitSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitSource {
    #[serde(default)]
    pub law_firm: String,
    /// Normalized law firm name; aggregation bucket keys use this form.
    #[serde(default)]
    pub law_firm_cleaned: String,
    #[serde(default)]
    pub current_owner: String,
    #[serde(default)]
    pub current_owner_cleaned: String,
    #[serde(default)]
    pub attorney_name: String,
    #[serde(default)]
    pub attorney_name_cleaned: String,
    #[serde(default)]
    pub status_type: String,
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub search_bar: SearchBar,
    /// Free-text mark description, absent on some records.
    #[serde(default)]
    pub mark_description_description: Option<Vec<String>>,
    #[serde(default)]
    pub class_codes: Vec<String>,
    /// 8-digit `YYYYMMDD` string, parsed lazily for display only.
    #[serde(default)]
    pub first_use_anywhere_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchBar {
    #[serde(default)]
    pub owner: String,
}

/// Server-side facet groups. Missing groups read as empty bucket lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Aggregations {
    #[serde(default)]
    pub current_owners: Option<FacetGroup>,
    #[serde(default)]
    pub law_firms: Option<FacetGroup>,
    #[serde(default)]
    pub attorneys: Option<FacetGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetGroup {
    #[serde(default)]
    pub buckets: Vec<FacetBucket>,
}

/// One distinct value of a facet dimension and its frequency in the full
/// (unfiltered) result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub doc_count: u64,
}

impl SearchResponse {
    pub fn hits(&self) -> &[TrademarkHit] {
        &self.body.hits.hits
    }

    /// Owner facet buckets, verbatim from the server aggregation.
    pub fn owners(&self) -> &[FacetBucket] {
        buckets(&self.body.aggregations.current_owners)
    }

    pub fn law_firms(&self) -> &[FacetBucket] {
        buckets(&self.body.aggregations.law_firms)
    }

    pub fn attorneys(&self) -> &[FacetBucket] {
        buckets(&self.body.aggregations.attorneys)
    }
}

fn buckets(group: &Option<FacetGroup>) -> &[FacetBucket] {
    group.as_ref().map(|g| g.buckets.as_slice()).unwrap_or(&[])
}

/// Closed classification of a hit's `status_type`.
///
/// Anything outside the three well-known codes lands in `Other`, which is what
/// the "Others" sidebar filter matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrademarkStatus {
    Registered,
    Pending,
    Abandoned,
    Other(String),
}

impl TrademarkStatus {
    pub fn classify(status_type: &str) -> Self {
        match status_type.trim().to_ascii_lowercase().as_str() {
            "registered" => Self::Registered,
            "pending" => Self::Pending,
            "abandoned" => Self::Abandoned,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for TrademarkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Pending => write!(f, "pending"),
            Self::Abandoned => write!(f, "abandoned"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_defaults() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.hits().is_empty());
        assert!(resp.owners().is_empty());
        assert!(resp.law_firms().is_empty());
        assert!(resp.attorneys().is_empty());
    }

    #[test]
    fn test_missing_aggregations_default_to_empty() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"body":{"hits":{"hits":[{"_id":"1","_source":{"status_type":"registered"}}]}}}"#,
        )
        .unwrap();
        assert_eq!(resp.hits().len(), 1);
        assert!(resp.owners().is_empty());
    }

    #[test]
    fn test_partial_hit_source_is_not_an_error() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"body":{"hits":{"hits":[{"_id":"42","_source":{
                "current_owner":"Acme Corp",
                "status_type":"pending",
                "class_codes":["009"]
            }}]}}}"#,
        )
        .unwrap();
        let hit = &resp.hits()[0];
        assert_eq!(hit.id, "42");
        assert_eq!(hit.source.current_owner, "Acme Corp");
        assert!(hit.source.law_firm.is_empty());
        assert!(hit.source.mark_description_description.is_none());
        assert!(hit.source.first_use_anywhere_date.is_none());
    }

    #[test]
    fn test_aggregation_buckets_parse() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"body":{"hits":{"hits":[]},"aggregations":{
                "current_owners":{"buckets":[{"key":"Acme Corp","doc_count":3}]},
                "law_firms":{"buckets":[]},
                "attorneys":{"buckets":[{"key":"J. Doe","doc_count":1}]}
            }}}"#,
        )
        .unwrap();
        assert_eq!(
            resp.owners(),
            &[FacetBucket {
                key: "Acme Corp".into(),
                doc_count: 3
            }]
        );
        assert!(resp.law_firms().is_empty());
        assert_eq!(resp.attorneys()[0].key, "J. Doe");
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            TrademarkStatus::classify("registered"),
            TrademarkStatus::Registered
        );
        assert_eq!(
            TrademarkStatus::classify("Registered"),
            TrademarkStatus::Registered
        );
        assert_eq!(
            TrademarkStatus::classify(" pending "),
            TrademarkStatus::Pending
        );
        assert_eq!(
            TrademarkStatus::classify("abandoned"),
            TrademarkStatus::Abandoned
        );
        assert_eq!(
            TrademarkStatus::classify("opposed"),
            TrademarkStatus::Other("opposed".into())
        );
        assert_eq!(TrademarkStatus::classify(""), TrademarkStatus::Other(String::new()));
    }
}
