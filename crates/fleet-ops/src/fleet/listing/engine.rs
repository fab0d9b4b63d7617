use chrono::NaiveDate;
use serde::Serialize;

use super::query::{Category, ListQuery};

/// A record kind the list views can search, filter and aggregate.
pub trait Listable {
    /// Fields the free-text search looks at (any match wins).
    fn search_fields(&self) -> Vec<&str>;
    fn status_label(&self) -> &str;
    /// Whether the record satisfies a categorical filter. Unsupported categories never match.
    fn matches_category(&self, category: Category, wanted: &str) -> bool;
    /// Date the range filter applies to.
    fn listed_on(&self) -> Option<NaiveDate>;
    /// Numeric field summed into [`ListAggregates::total`].
    fn measure(&self) -> f64;
    /// Numeric field averaged into [`ListAggregates::average`], if the kind has one.
    fn score(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAggregates {
    pub count: usize,
    pub total: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub aggregates: ListAggregates,
}

pub fn matches<T: Listable>(record: &T, query: &ListQuery) -> bool {
    if let Some(needle) = query.search_needle() {
        if !record
            .search_fields()
            .into_iter()
            .any(|field| contains_ignore_case(field, &needle))
        {
            return false;
        }
    }

    if let Some(status) = query.status_constraint() {
        if !record.status_label().eq_ignore_ascii_case(status) {
            return false;
        }
    }

    if !query
        .category_constraints()
        .all(|(category, wanted)| record.matches_category(category, wanted))
    {
        return false;
    }

    match query.date_range {
        Some(range) => record.listed_on().is_some_and(|date| range.contains(date)),
        None => true,
    }
}

/// Apply every active predicate and aggregate over what survives.
pub fn filter<T: Listable + Clone>(collection: &[T], query: &ListQuery) -> ListResult<T> {
    let items: Vec<T> = collection
        .iter()
        .filter(|record| matches(*record, query))
        .cloned()
        .collect();
    let aggregates = aggregate(&items);
    ListResult { items, aggregates }
}

/// Count, sum and mean over a slice; the mean of nothing is zero.
pub fn aggregate<T: Listable>(items: &[T]) -> ListAggregates {
    let total = items.iter().map(Listable::measure).sum();
    let scores: Vec<f64> = items.iter().filter_map(Listable::score).collect();
    let average = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    ListAggregates {
        count: items.len(),
        total,
        average,
    }
}

/// `needle` must already be lowercase.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub(crate) fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
