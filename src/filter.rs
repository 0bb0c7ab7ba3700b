//! Result filtering over a fetched search response.
//!
//! [`filter_hits`] derives the visible hit list from the response and the
//! current [`FilterCriteria`]. It is pure: inputs are never mutated, output
//! preserves the source order, and applying the same criteria twice yields the
//! same result. Facet option lists are *not* produced here; they are read
//! verbatim from the response aggregations (see [`crate::model::types::SearchResponse`])
//! so checkboxes always offer the full universe of the original query.

use std::collections::BTreeSet;

use crate::model::types::{SearchResponse, TrademarkHit, TrademarkStatus};

/// The five fixed status buttons of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Registered,
    Pending,
    Abandoned,
    Others,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Registered,
        StatusFilter::Pending,
        StatusFilter::Abandoned,
        StatusFilter::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Registered => "Registered",
            Self::Pending => "Pending",
            Self::Abandoned => "Abandoned",
            Self::Others => "Others",
        }
    }

    /// Parse one of the five sidebar labels, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Cycle to the next status button.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Registered,
            Self::Registered => Self::Pending,
            Self::Pending => Self::Abandoned,
            Self::Abandoned => Self::Others,
            Self::Others => Self::All,
        }
    }

    /// Whether a classified status passes this filter. `Others` matches
    /// exactly the statuses outside the three well-known codes.
    pub fn matches(self, status: &TrademarkStatus) -> bool {
        match self {
            Self::All => true,
            Self::Registered => matches!(status, TrademarkStatus::Registered),
            Self::Pending => matches!(status, TrademarkStatus::Pending),
            Self::Abandoned => matches!(status, TrademarkStatus::Abandoned),
            Self::Others => matches!(status, TrademarkStatus::Other(_)),
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// User-chosen filter state. Ephemeral: lives for the session only.
///
/// An empty selection set or empty query means "dimension inactive", never
/// "match nothing". The default value passes every hit through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub status: StatusFilter,
    pub search_query: String,
    /// Normalized owner names, matched against `current_owner_cleaned`.
    pub selected_owners: BTreeSet<String>,
    pub selected_law_firms: BTreeSet<String>,
    pub selected_attorneys: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.status == StatusFilter::All
            && self.search_query.trim().is_empty()
            && self.selected_owners.is_empty()
            && self.selected_law_firms.is_empty()
            && self.selected_attorneys.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Compute the visible hit list.
///
/// Every stage is a conjunctive narrowing; the output is a stable subsequence
/// of the response's hit order. An absent response yields an empty list.
pub fn filter_hits<'a>(
    response: Option<&'a SearchResponse>,
    criteria: &FilterCriteria,
) -> Vec<&'a TrademarkHit> {
    let Some(response) = response else {
        return Vec::new();
    };

    let query = criteria.search_query.trim().to_lowercase();

    let visible: Vec<&TrademarkHit> = response
        .hits()
        .iter()
        .filter(|hit| query.is_empty() || matches_query(hit, &query))
        .filter(|hit| {
            criteria
                .status
                .matches(&TrademarkStatus::classify(&hit.source.status_type))
        })
        .filter(|hit| selection_allows(&criteria.selected_owners, &hit.source.current_owner_cleaned))
        .filter(|hit| selection_allows(&criteria.selected_law_firms, &hit.source.law_firm_cleaned))
        .filter(|hit| selection_allows(&criteria.selected_attorneys, &hit.source.attorney_name_cleaned))
        .collect();

    tracing::debug!(
        total = response.hits().len(),
        visible = visible.len(),
        status = %criteria.status,
        "filter_apply"
    );

    visible
}

/// Case-insensitive substring match across the text-searchable hit fields.
fn matches_query(hit: &TrademarkHit, query: &str) -> bool {
    let src = &hit.source;
    let fields = [
        &src.law_firm,
        &src.current_owner,
        &src.attorney_name,
        &src.registration_number,
        &src.search_bar.owner,
    ];
    if fields.iter().any(|f| f.to_lowercase().contains(query)) {
        return true;
    }
    src.mark_description_description
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .any(|d| d.to_lowercase().contains(query))
}

fn selection_allows(selected: &BTreeSet<String>, cleaned_value: &str) -> bool {
    selected.is_empty() || selected.contains(cleaned_value)
}
