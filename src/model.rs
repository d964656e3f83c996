use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Format of the capture timestamp stored on every [`ResultItem`].
pub const DATE_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// One page of the code search response. Missing fields default to empty
/// so a partially populated item still normalizes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<RawCodeItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCodeItem {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub repository: RawRepository,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRepository {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: RawOwner,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOwner {
    #[serde(default)]
    pub login: String,
}

/// A normalized match: one file in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub repository: String,
    pub owner: String,
    pub url: String,
    pub path: String,
    pub extension: String,
    pub description: Option<String>,
    pub date: String,
}

impl ResultItem {
    /// Normalize a raw API item, stamping it with the current local time.
    pub fn from_raw(raw: RawCodeItem) -> Self {
        let extension = file_extension(&raw.path).to_string();
        ResultItem {
            repository: raw.repository.full_name,
            owner: raw.repository.owner.login,
            url: raw.repository.html_url,
            path: raw.path,
            extension,
            description: raw.repository.description,
            date: Local::now().format(DATE_FORMAT).to_string(),
        }
    }
}

/// Text after the last `.` of the file name, or `""` when there is none.
pub fn file_extension(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx + 1..],
        None => "",
    }
}

/// Accumulated matches for one term.
///
/// `total_count` is the sum of the totals reported by every query that
/// contributed, so it can exceed `items.len()` when a query hit the ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(rename = "count")]
    pub total_count: u64,
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        ResultSet::default()
    }

    /// Append `other` after `self`, summing counts. No deduplication.
    pub fn merge(mut self, other: ResultSet) -> Self {
        self.total_count += other.total_count;
        self.items.extend(other.items);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct repository names in order of first appearance.
    pub fn repositories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.repository.as_str()) {
                seen.push(item.repository.as_str());
            }
        }
        seen
    }
}

/// Term identifier to the term's results; the unit that gets persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateReport(BTreeMap<String, ResultSet>);

impl AggregateReport {
    pub fn new() -> Self {
        AggregateReport::default()
    }

    pub fn insert(&mut self, term_id: impl Into<String>, results: ResultSet) {
        self.0.insert(term_id.into(), results);
    }

    pub fn get(&self, term_id: &str) -> Option<&ResultSet> {
        self.0.get(term_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResultSet)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.0.values().map(ResultSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(repo: &str, path: &str) -> ResultItem {
        ResultItem {
            repository: repo.to_string(),
            owner: repo.split('/').next().unwrap_or_default().to_string(),
            url: format!("https://github.com/{}", repo),
            path: path.to_string(),
            extension: file_extension(path).to_string(),
            description: None,
            date: "01/02/25 00:00:00".to_string(),
        }
    }

    #[test]
    fn extension_is_text_after_last_dot() {
        assert_eq!(file_extension("app/views/form.html.erb"), "erb");
        assert_eq!(file_extension("index.njk"), "njk");
        assert_eq!(file_extension("Makefile"), "");
        assert_eq!(file_extension("releases.v2/README"), "");
        assert_eq!(file_extension(".eslintrc"), "eslintrc");
    }

    #[test]
    fn normalizes_raw_item() {
        let raw: RawCodeItem = serde_json::from_value(json!({
            "name": "date.njk",
            "path": "src/components/date.njk",
            "repository": {
                "full_name": "ministryofjustice/prison-app",
                "html_url": "https://github.com/ministryofjustice/prison-app",
                "description": null,
                "owner": { "login": "ministryofjustice" }
            }
        }))
        .unwrap();

        let item = ResultItem::from_raw(raw);
        assert_eq!(item.repository, "ministryofjustice/prison-app");
        assert_eq!(item.owner, "ministryofjustice");
        assert_eq!(item.url, "https://github.com/ministryofjustice/prison-app");
        assert_eq!(item.path, "src/components/date.njk");
        assert_eq!(item.extension, "njk");
        assert_eq!(item.description, None);
        assert!(chrono::NaiveDateTime::parse_from_str(&item.date, DATE_FORMAT).is_ok());
    }

    #[test]
    fn sparse_page_still_parses() {
        let page: SearchPage = serde_json::from_value(json!({
            "total_count": 3,
            "items": [{ "path": "a.js" }]
        }))
        .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items[0].repository.full_name, "");
    }

    #[test]
    fn merge_sums_counts_and_keeps_order() {
        let first = ResultSet {
            total_count: 2,
            items: vec![item("a/one", "x.js")],
        };
        let second = ResultSet {
            total_count: 5,
            items: vec![item("b/two", "y.vue"), item("a/one", "x.js")],
        };

        let merged = first.merge(second);
        assert_eq!(merged.total_count, 7);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.items[1].repository, "b/two");
        assert_eq!(merged.repositories(), vec!["a/one", "b/two"]);
    }

    #[test]
    fn report_serializes_count_and_items() {
        let mut report = AggregateReport::new();
        report.insert(
            "moj-datepicker",
            ResultSet {
                total_count: 1,
                items: vec![item("a/one", "views/date.njk")],
            },
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["moj-datepicker"]["count"], 1);
        assert_eq!(value["moj-datepicker"]["items"][0]["extension"], "njk");
        assert_eq!(value["moj-datepicker"]["items"][0]["owner"], "a");
        assert!(value["moj-datepicker"]["items"][0]["description"].is_null());
    }
}
