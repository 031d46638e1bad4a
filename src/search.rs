// 🔍 Search Engine - linear filter over the catalog
// All predicates are optional and combined with AND; catalog order is kept.

use crate::catalog::{Car, Catalog};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Exact year match. `None` disables the filter (unlike `Some(0)`).
    pub year: Option<i32>,

    /// Case-insensitive substring of the car name
    pub name: Option<String>,

    /// Case-insensitive substring of the company
    pub company: Option<String>,
}

impl SearchQuery {
    /// Query with no predicates: matches everything
    pub fn new() -> Self {
        SearchQuery::default()
    }

    /// Builder pattern: add year filter
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Builder pattern: add name filter
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Builder pattern: add company filter
    pub fn with_company(mut self, company: &str) -> Self {
        self.company = Some(company.to_string());
        self
    }

    /// Build a query from raw form text.
    ///
    /// The year only applies when the text is all ASCII digits; anything else
    /// (blank, "abc", "-1") means no year filter.
    pub fn from_form(year: &str, name: &str, company: &str) -> Self {
        let year = year.trim();
        let year = if !year.is_empty() && year.bytes().all(|b| b.is_ascii_digit()) {
            year.parse::<i32>().ok()
        } else {
            None
        };

        SearchQuery {
            year,
            name: non_empty(name),
            company: non_empty(company),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.name.as_deref().map_or(true, str::is_empty)
            && self.company.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, car: &Car) -> bool {
        if let Some(year) = self.year {
            if car.year != year {
                return false;
            }
        }

        contains_ignore_case(&car.name, self.name.as_deref())
            && contains_ignore_case(&car.company, self.company.as_deref())
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Absent or empty needle always matches
fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

/// Every car matching `query`, in catalog order
pub fn search<'a>(catalog: &'a Catalog, query: &SearchQuery) -> Vec<&'a Car> {
    let results: Vec<&Car> = catalog.iter().filter(|car| query.matches(car)).collect();
    debug!(?query, matches = results.len(), "Catalog search");
    results
}

/// Collaborator form of `search` taking the three predicates directly
pub fn search_cars(
    catalog: &Catalog,
    year: Option<i32>,
    name: Option<&str>,
    company: Option<&str>,
) -> Vec<Car> {
    let query = SearchQuery {
        year,
        name: name.map(str::to_string),
        company: company.map(str::to_string),
    };
    search(catalog, &query).into_iter().cloned().collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_catalog() -> Catalog {
        Catalog::from(vec![
            Car::new("C001", 2022, "Sedan X", "Acme Rentals", 45.0),
            Car::new("C002", 2021, "Truck Y", "Budget Co", 60.0),
            Car::new("C003", 2022, "Compact Z", "Budget Co", 30.0),
            Car::new("C004", 2020, "Sedan Classic", "Acme Rentals", 25.0),
        ])
    }

    fn codes(cars: &[&Car]) -> Vec<String> {
        cars.iter().map(|c| c.code.clone()).collect()
    }

    #[test]
    fn test_year_filter_keeps_order() {
        let catalog = create_test_catalog();
        let results = search(&catalog, &SearchQuery::new().with_year(2022));
        assert_eq!(codes(&results), vec!["C001", "C003"]);
    }

    #[test]
    fn test_name_is_case_insensitive() {
        let catalog = create_test_catalog();
        let results = search(&catalog, &SearchQuery::new().with_name("sedan"));
        assert_eq!(codes(&results), vec!["C001", "C004"]);

        let results = search(&catalog, &SearchQuery::new().with_name("SEDAN x"));
        assert_eq!(codes(&results), vec!["C001"]);
    }

    #[test]
    fn test_company_substring() {
        let catalog = create_test_catalog();
        let results = search(&catalog, &SearchQuery::new().with_company("budget"));
        assert_eq!(codes(&results), vec!["C002", "C003"]);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let catalog = create_test_catalog();
        let query = SearchQuery::new().with_year(2022).with_company("acme");
        assert_eq!(codes(&search(&catalog, &query)), vec!["C001"]);
    }

    #[test]
    fn test_empty_filters_return_everything() {
        let catalog = create_test_catalog();
        let results = search_cars(&catalog, None, Some(""), Some(""));
        assert_eq!(results, catalog.cars().to_vec());
    }

    #[test]
    fn test_year_zero_is_a_real_filter() {
        let catalog = create_test_catalog();
        assert!(search(&catalog, &SearchQuery::new().with_year(0)).is_empty());
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let catalog = create_test_catalog();
        let results = search(&catalog, &SearchQuery::new().with_name("spaceship"));
        assert!(results.is_empty());
    }

    #[test]
    fn test_from_form_ignores_non_digit_year() {
        assert_eq!(SearchQuery::from_form("abc", "", "").year, None);
        assert_eq!(SearchQuery::from_form("-1", "", "").year, None);
        assert_eq!(SearchQuery::from_form("", "", "").year, None);
        assert_eq!(SearchQuery::from_form(" 2021 ", "", "").year, Some(2021));
    }

    #[test]
    fn test_from_form_blank_text_is_no_filter() {
        let query = SearchQuery::from_form("", "", "");
        assert!(query.is_empty());
        assert_eq!(query.name, None);
        assert_eq!(query.company, None);
    }
}
