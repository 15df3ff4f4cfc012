//! Parameter normalization
//!
//! Turns raw query parameters into a canonical `FilterSet`.

use std::collections::BTreeSet;

use super::types::{EntityQueryParams, FilterSet};

/// Drop absent (empty) scalar values
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Drop empty entries, keep caller order
fn present_list(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter(|v| !v.is_empty()).collect()
}

/// Drop empty entries, then sort and deduplicate
fn sorted_unique(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl FilterSet {
    /// Normalize raw parameters.
    ///
    /// Membership lists (typology, dataset, entity, prefix, reference) are
    /// sorted and deduplicated. Everything else keeps its value and order;
    /// empty strings count as absent.
    pub fn normalize(raw: EntityQueryParams) -> Self {
        Self {
            typology: sorted_unique(raw.typology),
            dataset: sorted_unique(raw.dataset),
            entity: sorted_unique(raw.entity),
            prefix: sorted_unique(raw.prefix),
            reference: sorted_unique(raw.reference),
            curie: present_list(raw.curie),
            entries: raw.entries,
            entry_start_date: present(raw.entry_start_date),
            entry_start_date_year: present(raw.entry_start_date_year),
            entry_start_date_month: present(raw.entry_start_date_month),
            entry_start_date_day: present(raw.entry_start_date_day),
            entry_start_date_match: raw.entry_start_date_match,
            entry_end_date: present(raw.entry_end_date),
            entry_end_date_year: present(raw.entry_end_date_year),
            entry_end_date_month: present(raw.entry_end_date_month),
            entry_end_date_day: present(raw.entry_end_date_day),
            entry_end_date_match: raw.entry_end_date_match,
            entry_entry_date: present(raw.entry_entry_date),
            entry_entry_date_year: present(raw.entry_entry_date_year),
            entry_entry_date_month: present(raw.entry_entry_date_month),
            entry_entry_date_day: present(raw.entry_entry_date_day),
            entry_entry_date_match: raw.entry_entry_date_match,
            longitude: present(raw.longitude),
            latitude: present(raw.latitude),
            geometry: present_list(raw.geometry),
            geometry_entity: present_list(raw.geometry_entity),
            geometry_reference: present_list(raw.geometry_reference),
            geometry_match: raw.geometry_match,
            next_entity: present(raw.next_entity),
            limit: raw.limit,
        }
    }
}

impl From<EntityQueryParams> for FilterSet {
    fn from(raw: EntityQueryParams) -> Self {
        Self::normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::entity::filters::types::{DateMatch, EntriesOption};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn membership_lists_sorted_and_deduplicated() {
        let raw = EntityQueryParams {
            dataset: strings(&["tree", "conservation-area", "tree"]),
            typology: strings(&["geography"]),
            reference: strings(&["b", "a", "", "b"]),
            limit: 10,
            ..Default::default()
        };
        let filters = FilterSet::normalize(raw);
        assert_eq!(filters.dataset, strings(&["conservation-area", "tree"]));
        assert_eq!(filters.typology, strings(&["geography"]));
        assert_eq!(filters.reference, strings(&["a", "b"]));
    }

    #[test]
    fn other_lists_keep_order() {
        let raw = EntityQueryParams {
            curie: strings(&["z:1", "a:2", ""]),
            geometry: strings(&["POINT(1 1)", "POINT(0 0)"]),
            limit: 10,
            ..Default::default()
        };
        let filters = FilterSet::normalize(raw);
        assert_eq!(filters.curie, strings(&["z:1", "a:2"]));
        assert_eq!(filters.geometry, strings(&["POINT(1 1)", "POINT(0 0)"]));
    }

    #[test]
    fn empty_scalars_become_absent() {
        let raw = EntityQueryParams {
            longitude: Some(String::new()),
            latitude: Some("51.5".into()),
            next_entity: Some(String::new()),
            entry_start_date_year: Some(String::new()),
            limit: 10,
            ..Default::default()
        };
        let filters = FilterSet::normalize(raw);
        assert_eq!(filters.longitude, None);
        assert_eq!(filters.latitude.as_deref(), Some("51.5"));
        assert_eq!(filters.next_entity, None);
        assert_eq!(filters.entry_start_date_year, None);
    }

    #[test]
    fn scalars_and_enums_pass_through() {
        let raw = EntityQueryParams {
            entries: Some(EntriesOption::Historical),
            entry_entry_date: Some("2022-03-04".into()),
            entry_entry_date_match: Some(DateMatch::Before),
            limit: 25,
            ..Default::default()
        };
        let filters = FilterSet::normalize(raw);
        assert_eq!(filters.entries, Some(EntriesOption::Historical));
        assert_eq!(filters.entry_entry_date.as_deref(), Some("2022-03-04"));
        assert_eq!(filters.entry_entry_date_match, Some(DateMatch::Before));
        assert_eq!(filters.limit, 25);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = EntityQueryParams {
            dataset: strings(&["b", "a"]),
            prefix: strings(&["x", "y", "x"]),
            limit: 10,
            ..Default::default()
        };
        let b = EntityQueryParams {
            dataset: strings(&["a", "b", "a"]),
            prefix: strings(&["y", "x"]),
            limit: 10,
            ..Default::default()
        };
        assert_eq!(FilterSet::from(a), FilterSet::from(b));
    }
}
