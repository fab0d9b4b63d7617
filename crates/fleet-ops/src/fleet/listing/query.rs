use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel the views use for "no constraint" in select filters.
pub const ANY: &str = "all";

/// Categorical filter dimensions. Each record kind answers the ones it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Cluster,
    PaymentMethod,
    ViolationType,
    FuelType,
    NotificationType,
}

/// Inclusive calendar-date window; an open `to` means "from onwards".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn from(from: NaiveDate) -> Self {
        Self { from, to: None }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to: Some(to) }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.to.map_or(true, |to| date <= to)
    }
}

/// Predicate state for one list view. Every option is independent and optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub text: Option<String>,
    pub status: Option<String>,
    pub categories: BTreeMap<Category, String>,
    pub date_range: Option<DateRange>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_category(mut self, category: Category, value: impl Into<String>) -> Self {
        self.categories.insert(category, value.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Lowercased search text, or `None` when the search box is effectively empty.
    pub(crate) fn search_needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }

    pub(crate) fn status_constraint(&self) -> Option<&str> {
        constraint(self.status.as_deref())
    }

    pub(crate) fn category_constraints(&self) -> impl Iterator<Item = (Category, &str)> + '_ {
        self.categories
            .iter()
            .filter_map(|(category, value)| constraint(Some(value)).map(|value| (*category, value)))
    }
}

fn constraint(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case(ANY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_and_blank_values_are_ignored() {
        let query = ListQuery::new()
            .with_status("All")
            .with_category(Category::Cluster, "  ")
            .with_category(Category::PaymentMethod, "upi")
            .with_text("   ");

        assert_eq!(query.status_constraint(), None);
        assert_eq!(query.search_needle(), None);
        let active: Vec<_> = query.category_constraints().collect();
        assert_eq!(active, vec![(Category::PaymentMethod, "upi")]);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid");
        let to = NaiveDate::from_ymd_opt(2024, 1, 20).expect("valid");
        let range = DateRange::between(from, to);

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(to.succ_opt().expect("valid")));
        assert!(DateRange::from(from).contains(NaiveDate::MAX));
    }

    #[test]
    fn query_deserializes_from_camel_case_json() {
        let query: ListQuery = serde_json::from_str(
            r#"{"text":"hr-26","categories":{"paymentMethod":"cash"},"dateRange":{"from":"2024-01-01"}}"#,
        )
        .expect("query parses");

        assert_eq!(query.search_needle().as_deref(), Some("hr-26"));
        assert_eq!(
            query.categories.get(&Category::PaymentMethod).map(String::as_str),
            Some("cash")
        );
        assert_eq!(query.date_range.and_then(|range| range.to), None);
    }
}
