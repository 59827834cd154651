//! Searching, filtering and sorting the directory.
//!
//! Everything in here is a pure function of its inputs. The collection is
//! never mutated; results are new vectors borrowing from it.

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{self, Vehicle, VehicleStatus, VehicleType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    UnknownLabel(#[from] data::Error),
    #[error("'{0}' is not a valid sort order. Use newest, oldest or make.")]
    UnknownSortKey(String),
    #[error("'{0}' is not a valid year.")]
    InvalidYear(String),
    #[error("'{0}' is not a valid tab.")]
    UnknownTab(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Newest,
    Oldest,
    Make,
}

impl SortKey {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Make => "make",
        }
    }

    fn compare(self, a: &Vehicle, b: &Vehicle) -> Ordering {
        match self {
            SortKey::Newest => b.registration_date.cmp(&a.registration_date),
            SortKey::Oldest => a.registration_date.cmp(&b.registration_date),
            SortKey::Make => a
                .make
                .to_lowercase()
                .cmp(&b.make.to_lowercase())
                .then_with(|| a.make.cmp(&b.make)),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "make" => Ok(SortKey::Make),
            _ => Err(QueryError::UnknownSortKey(s.into())),
        }
    }
}

/// The tab strip above the directory. `All` admits every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTab {
    #[default]
    All,
    Status(VehicleStatus),
}

impl StatusTab {
    pub const ALL: [StatusTab; 5] = [
        StatusTab::All,
        StatusTab::Status(VehicleStatus::Active),
        StatusTab::Status(VehicleStatus::Pending),
        StatusTab::Status(VehicleStatus::Expired),
        StatusTab::Status(VehicleStatus::Suspended),
    ];

    #[must_use]
    pub fn admits(self, vehicle: &Vehicle) -> bool {
        match self {
            StatusTab::All => true,
            StatusTab::Status(status) => vehicle.status == status,
        }
    }

    /// The lowercase key used in links, e.g. `pending`.
    #[must_use]
    pub fn key(self) -> String {
        match self {
            StatusTab::All => "all".into(),
            StatusTab::Status(status) => status.label().to_lowercase(),
        }
    }
}

impl FromStr for StatusTab {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusTab::All);
        }
        trimmed
            .parse::<VehicleStatus>()
            .map(StatusTab::Status)
            .map_err(|_| QueryError::UnknownTab(s.into()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub status: Option<VehicleStatus>,
    pub vehicle_type: Option<VehicleType>,
    pub year: Option<i32>,
    pub sort_by: Option<SortKey>,
}

impl SearchFilters {
    /// Builds filters from raw form values. Missing, empty and `all` values
    /// mean "no filter".
    pub fn parse(
        status: Option<&str>,
        vehicle_type: Option<&str>,
        year: Option<&str>,
        sort_by: Option<&str>,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            status: selected(status)
                .map(str::parse::<VehicleStatus>)
                .transpose()?,
            vehicle_type: selected(vehicle_type)
                .map(str::parse::<VehicleType>)
                .transpose()?,
            year: selected(year)
                .map(|y| y.parse::<i32>().map_err(|_| QueryError::InvalidYear(y.into())))
                .transpose()?,
            sort_by: selected(sort_by).map(str::parse::<SortKey>).transpose()?,
        })
    }

    fn admits(&self, vehicle: &Vehicle) -> bool {
        self.status.map_or(true, |status| vehicle.status == status)
            && self.vehicle_type.map_or(true, |t| vehicle.vehicle_type == t)
            && self.year.map_or(true, |year| vehicle.year == year)
    }
}

fn selected(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// One pass over the collection: text, filters and tab are all predicates
/// AND-ed together, then the optional sort is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleQuery {
    pub text: String,
    pub filters: SearchFilters,
    pub tab: StatusTab,
}

impl VehicleQuery {
    #[must_use]
    pub fn new(text: &str, filters: SearchFilters, tab: StatusTab) -> Self {
        Self {
            text: text.into(),
            filters,
            tab,
        }
    }

    #[must_use]
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.admits(vehicle, &self.text.trim().to_lowercase())
    }

    fn admits(&self, vehicle: &Vehicle, needle: &str) -> bool {
        matches_text(vehicle, needle) && self.filters.admits(vehicle) && self.tab.admits(vehicle)
    }

    #[must_use]
    pub fn run<'a>(&self, vehicles: &'a [Vehicle]) -> Vec<&'a Vehicle> {
        let needle = self.text.trim().to_lowercase();
        let mut results: Vec<&Vehicle> = vehicles
            .iter()
            .filter(|vehicle| self.admits(vehicle, &needle))
            .collect();

        if let Some(key) = self.filters.sort_by {
            // `sort_by` is stable, so ties keep their collection order.
            results.sort_by(|a, b| key.compare(a, b));
        }

        results
    }
}

/// `needle` must already be trimmed and lowercased.
fn matches_text(vehicle: &Vehicle, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    [
        vehicle.registration_number.as_str(),
        vehicle.make.as_str(),
        vehicle.model.as_str(),
        vehicle.vin.as_str(),
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(needle))
        || vehicle.owner.full_name().to_lowercase().contains(needle)
}

#[must_use]
pub fn search<'a>(
    vehicles: &'a [Vehicle],
    query: &str,
    filters: &SearchFilters,
) -> Vec<&'a Vehicle> {
    VehicleQuery::new(query, filters.clone(), StatusTab::All).run(vehicles)
}

#[must_use]
pub fn partition_by_status(vehicles: &[Vehicle], tab: StatusTab) -> Vec<&Vehicle> {
    vehicles.iter().filter(|vehicle| tab.admits(vehicle)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::seed::seed_vehicles;

    #[fixture]
    fn vehicles() -> Vec<Vehicle> {
        seed_vehicles()
    }

    fn ids(results: &[&Vehicle]) -> Vec<String> {
        results.iter().map(|v| v.id.clone()).collect()
    }

    #[rstest]
    fn empty_query_is_identity(vehicles: Vec<Vehicle>) {
        let results = search(&vehicles, "", &SearchFilters::default());
        assert_eq!(ids(&results), vec!["1", "2", "3", "4", "5"]);
    }

    #[rstest]
    fn empty_collection_yields_empty_result() {
        let results = search(&[], "tesla", &SearchFilters::default());
        assert!(results.is_empty());
    }

    #[rstest]
    #[case("tesla")]
    #[case("TOYOTA")]
    #[case("oNd")]
    #[case("a")]
    fn make_substring_is_always_included(vehicles: Vec<Vehicle>, #[case] query: &str) {
        let results = search(&vehicles, query, &SearchFilters::default());
        for vehicle in &vehicles {
            if vehicle.make.to_lowercase().contains(&query.to_lowercase()) {
                assert!(results.iter().any(|r| r.id == vehicle.id), "{} missing", vehicle.make);
            }
        }
    }

    #[rstest]
    #[case("abc-1234", "1")]
    #[case("model 3", "1")]
    #[case("WBAJA5C55", "2")]
    #[case("emily brown", "4")]
    #[case("williams", "5")]
    fn each_searchable_field_matches(
        vehicles: Vec<Vehicle>,
        #[case] query: &str,
        #[case] expected: &str,
    ) {
        let results = search(&vehicles, query, &SearchFilters::default());
        assert_eq!(ids(&results), vec![expected]);
    }

    #[rstest]
    fn colour_is_not_searchable(vehicles: Vec<Vehicle>) {
        let results = search(&vehicles, "Midnight", &SearchFilters::default());
        assert!(results.is_empty());
    }

    #[rstest]
    fn no_match_is_empty_not_error(vehicles: Vec<Vehicle>) {
        assert!(search(&vehicles, "zeppelin", &SearchFilters::default()).is_empty());
    }

    #[rstest]
    fn filters_are_anded_with_text(vehicles: Vec<Vehicle>) {
        let filters = SearchFilters {
            vehicle_type: Some(VehicleType::Suv),
            ..SearchFilters::default()
        };
        assert_eq!(ids(&search(&vehicles, "", &filters)), vec!["2", "5"]);
        assert_eq!(ids(&search(&vehicles, "bmw", &filters)), vec!["2"]);

        let filters = SearchFilters {
            status: Some(VehicleStatus::Active),
            vehicle_type: Some(VehicleType::Suv),
            ..SearchFilters::default()
        };
        assert_eq!(ids(&search(&vehicles, "audi", &filters)), Vec::<String>::new());
    }

    #[rstest]
    fn year_filter_is_exact(vehicles: Vec<Vehicle>) {
        let filters = SearchFilters {
            year: Some(2023),
            ..SearchFilters::default()
        };
        assert_eq!(ids(&search(&vehicles, "", &filters)), vec!["1", "4"]);
    }

    #[rstest]
    fn newest_and_oldest_are_reversed(vehicles: Vec<Vehicle>) {
        let newest = search(
            &vehicles,
            "",
            &SearchFilters {
                sort_by: Some(SortKey::Newest),
                ..SearchFilters::default()
            },
        );
        let mut oldest = search(
            &vehicles,
            "",
            &SearchFilters {
                sort_by: Some(SortKey::Oldest),
                ..SearchFilters::default()
            },
        );
        assert_eq!(ids(&newest), vec!["4", "1", "2", "5", "3"]);
        oldest.reverse();
        assert_eq!(ids(&newest), ids(&oldest));
    }

    #[rstest]
    fn make_sort_is_alphabetical(vehicles: Vec<Vehicle>) {
        let results = search(
            &vehicles,
            "",
            &SearchFilters {
                sort_by: Some(SortKey::Make),
                ..SearchFilters::default()
            },
        );
        let makes: Vec<&str> = results.iter().map(|v| v.make.as_str()).collect();
        assert_eq!(makes, vec!["Audi", "BMW", "Honda", "Tesla", "Toyota"]);
    }

    #[rstest]
    fn date_ties_keep_collection_order(mut vehicles: Vec<Vehicle>) {
        let same_day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        for vehicle in &mut vehicles {
            vehicle.registration_date = same_day;
        }
        let results = search(
            &vehicles,
            "",
            &SearchFilters {
                sort_by: Some(SortKey::Newest),
                ..SearchFilters::default()
            },
        );
        assert_eq!(ids(&results), vec!["1", "2", "3", "4", "5"]);
    }

    #[rstest]
    fn search_does_not_mutate_input(vehicles: Vec<Vehicle>) {
        let before = vehicles.clone();
        let _ = search(
            &vehicles,
            "",
            &SearchFilters {
                sort_by: Some(SortKey::Make),
                ..SearchFilters::default()
            },
        );
        assert_eq!(vehicles, before);
    }

    #[rstest]
    #[case("all", vec!["1", "2", "3", "4", "5"])]
    #[case("pending", vec!["4"])]
    #[case("Active", vec!["1", "2", "3"])]
    #[case("EXPIRED", vec!["5"])]
    #[case("suspended", vec![])]
    fn tabs_partition_by_status(
        vehicles: Vec<Vehicle>,
        #[case] tab: &str,
        #[case] expected: Vec<&str>,
    ) {
        let tab: StatusTab = tab.parse().unwrap();
        assert_eq!(ids(&partition_by_status(&vehicles, tab)), expected);
    }

    #[rstest]
    fn tab_composes_with_search(vehicles: Vec<Vehicle>) {
        let query = VehicleQuery::new(
            "o",
            SearchFilters::default(),
            StatusTab::Status(VehicleStatus::Active),
        );
        // Honda matches "o" but is pending, so only active records remain.
        assert_eq!(ids(&query.run(&vehicles)), vec!["1", "3"]);
    }

    #[rstest]
    fn contradicting_tab_and_status_filter_is_empty(vehicles: Vec<Vehicle>) {
        let query = VehicleQuery::new(
            "",
            SearchFilters {
                status: Some(VehicleStatus::Active),
                ..SearchFilters::default()
            },
            StatusTab::Status(VehicleStatus::Pending),
        );
        assert!(query.run(&vehicles).is_empty());
    }

    #[rstest]
    fn matches_agrees_with_run(vehicles: Vec<Vehicle>) {
        let query = VehicleQuery::new("  SMITH ", SearchFilters::default(), StatusTab::All);
        let matched: Vec<&str> = vehicles
            .iter()
            .filter(|v| query.matches(v))
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(matched, vec!["2"]);
        assert_eq!(ids(&query.run(&vehicles)), vec!["2"]);
    }

    #[rstest]
    fn parse_treats_all_and_empty_as_unset() {
        let filters = SearchFilters::parse(Some("all"), Some(""), None, Some("ALL")).unwrap();
        assert_eq!(filters, SearchFilters::default());
    }

    #[rstest]
    fn parse_reads_every_filter() {
        let filters =
            SearchFilters::parse(Some("pending"), Some("suv"), Some("2022"), Some("oldest"))
                .unwrap();
        assert_eq!(
            filters,
            SearchFilters {
                status: Some(VehicleStatus::Pending),
                vehicle_type: Some(VehicleType::Suv),
                year: Some(2022),
                sort_by: Some(SortKey::Oldest),
            }
        );
    }

    #[rstest]
    #[case(Some("bogus"), None, None, None)]
    #[case(None, Some("tank"), None, None)]
    #[case(None, None, Some("last year"), None)]
    #[case(None, None, None, Some("price"))]
    fn parse_rejects_unknown_values(
        #[case] status: Option<&str>,
        #[case] vehicle_type: Option<&str>,
        #[case] year: Option<&str>,
        #[case] sort_by: Option<&str>,
    ) {
        assert!(SearchFilters::parse(status, vehicle_type, year, sort_by).is_err());
    }

    #[rstest]
    fn unknown_tab_is_an_error() {
        assert_eq!(
            "archived".parse::<StatusTab>(),
            Err(QueryError::UnknownTab("archived".into()))
        );
    }
}
