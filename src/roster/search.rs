//! Free-text search, filters and facets over a loaded roster slice.

use std::collections::BTreeSet;

use crate::models::Record;

fn matches_query(record: &Record, query: &str) -> bool {
    [
        Some(record.full_name.as_str()),
        Some(record.job_title.as_str()),
        record.department_name.as_deref(),
        Some(record.username.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(query))
}

/// Records whose name, title, department or username contains `query`
/// (case-insensitive). A blank query finds nothing.
pub fn search(records: &[Record], query: &str) -> Vec<Record> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| matches_query(record, &query))
        .cloned()
        .collect()
}

/// Browse filters. Unset fields do not filter; a blank query matches all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterFilter {
    pub query: Option<String>,
    pub department: Option<String>,
    pub level: Option<i32>,
}

impl RosterFilter {
    pub fn matches(&self, record: &Record) -> bool {
        let query_ok = match self.query.as_deref().map(|q| q.trim().to_lowercase()) {
            Some(query) if !query.is_empty() => matches_query(record, &query),
            _ => true,
        };
        let department_ok = self
            .department
            .as_deref()
            .map_or(true, |department| record.department_name.as_deref() == Some(department));
        let level_ok = self.level.map_or(true, |level| record.level == Some(level));

        query_ok && department_ok && level_ok
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// One page of results. Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(per_page);

    Page {
        items: items.iter().skip(start).take(per_page).cloned().collect(),
        page,
        total_pages: items.len().div_ceil(per_page),
        total_items: items.len(),
    }
}

/// Distinct department names, sorted.
pub fn departments(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.department_name.clone())
        .filter(|department| !department.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct levels, ascending.
pub fn levels(records: &[Record]) -> Vec<i32> {
    records
        .iter()
        .filter_map(|record| record.level)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Record> {
        vec![
            Record::new("jdoe", "Jane Doe", "Software Development Engineer")
                .with_department("Devices")
                .with_level(5),
            Record::new("rroe", "Rick Roe", "Director")
                .with_department("Retail")
                .with_level(7),
            Record::new("mlee", "Mina Lee", "Data Scientist")
                .with_department("Devices")
                .with_level(5),
            Record::new("tkim", "Tae Kim", "Recruiter"),
        ]
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.username.as_str()).collect()
    }

    #[test]
    fn search_matches_any_text_field_case_insensitively() {
        let records = roster();
        assert_eq!(names(&search(&records, "  DEVICES ")), vec!["jdoe", "mlee"]);
        assert_eq!(names(&search(&records, "rroe")), vec!["rroe"]);
        assert_eq!(names(&search(&records, "scien")), vec!["mlee"]);
        assert!(search(&records, "   ").is_empty());
        assert!(search(&records, "nobody").is_empty());
    }

    #[test]
    fn filters_combine() {
        let records = roster();
        let filter = RosterFilter {
            query: Some("engineer".into()),
            department: Some("Devices".into()),
            level: Some(5),
        };
        assert_eq!(names(&filter.apply(&records)), vec!["jdoe"]);

        let by_level = RosterFilter {
            level: Some(5),
            ..RosterFilter::default()
        };
        assert_eq!(names(&by_level.apply(&records)), vec!["jdoe", "mlee"]);
        assert_eq!(RosterFilter::default().apply(&records).len(), 4);
    }

    #[test]
    fn pagination_reports_totals() {
        let records = roster();
        let first = paginate(&records, 1, 3);
        assert_eq!(names(&first.items), vec!["jdoe", "rroe", "mlee"]);
        assert_eq!((first.total_pages, first.total_items), (2, 4));

        assert_eq!(names(&paginate(&records, 2, 3).items), vec!["tkim"]);
        assert!(paginate(&records, 9, 3).items.is_empty());
        assert_eq!(paginate(&records, 0, 0).items.len(), 1);
    }

    #[test]
    fn facets_are_distinct_and_sorted() {
        let records = roster();
        assert_eq!(departments(&records), vec!["Devices", "Retail"]);
        assert_eq!(levels(&records), vec![5, 7]);
    }
}
