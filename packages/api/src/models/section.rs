//! Criminal-code sections for the explorer and the offline guide.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

/// Category value that disables filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BnsSection {
    #[serde(default)]
    pub chapter: String,
    pub section: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cognizable: String,
    #[serde(default)]
    pub bailable: String,
    #[serde(default)]
    pub punishment: String,
    #[serde(default)]
    pub cases: Vec<String>,
    /// Offline guide grouping, such as `Arrest` or `Traffic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Read a JSON array of sections from `path`.
pub fn load_sections(path: &Path) -> Result<Vec<BnsSection>, RepositoryError> {
    let bytes = std::fs::read(path).map_err(store::StoreError::from)?;
    let sections: Vec<BnsSection> =
        serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Invalid(e.to_string()))?;
    tracing::debug!(count = sections.len(), path = %path.display(), "loaded sections");
    Ok(sections)
}

/// Case-insensitive match on section number, title or description.
/// A blank query keeps everything.
pub fn search_sections<'a>(sections: &'a [BnsSection], query: &str) -> Vec<&'a BnsSection> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return sections.iter().collect();
    }
    sections
        .iter()
        .filter(|s| {
            s.section.to_lowercase().contains(&query)
                || s.title.to_lowercase().contains(&query)
                || s.description.to_lowercase().contains(&query)
        })
        .collect()
}

pub fn filter_by_category<'a>(sections: &'a [BnsSection], category: &str) -> Vec<&'a BnsSection> {
    if category == ALL_CATEGORIES {
        return sections.iter().collect();
    }
    sections
        .iter()
        .filter(|s| s.category.as_deref() == Some(category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(number: &str, title: &str, category: Option<&str>) -> BnsSection {
        BnsSection {
            chapter: "VI".into(),
            section: number.into(),
            title: title.into(),
            description: format!("Provisions on {}", title.to_lowercase()),
            cognizable: "Cognizable".into(),
            bailable: "Non-bailable".into(),
            punishment: "Imprisonment".into(),
            cases: vec![],
            category: category.map(String::from),
        }
    }

    fn sample() -> Vec<BnsSection> {
        vec![
            section("103", "Murder", None),
            section("303", "Theft", Some("General")),
            section("35", "Arrest without warrant", Some("Arrest")),
        ]
    }

    #[test]
    fn test_blank_query_returns_everything() {
        let sections = sample();
        assert_eq!(search_sections(&sections, "  ").len(), 3);
    }

    #[test]
    fn test_search_matches_number_title_and_description() {
        let sections = sample();
        assert_eq!(search_sections(&sections, "303")[0].title, "Theft");
        assert_eq!(search_sections(&sections, "MURDER")[0].section, "103");
        assert_eq!(search_sections(&sections, "provisions on arrest").len(), 1);
        assert!(search_sections(&sections, "cybercrime").is_empty());
    }

    #[test]
    fn test_filter_by_category() {
        let sections = sample();
        assert_eq!(filter_by_category(&sections, ALL_CATEGORIES).len(), 3);
        let arrest = filter_by_category(&sections, "Arrest");
        assert_eq!(arrest.len(), 1);
        assert_eq!(arrest[0].section, "35");
        assert!(filter_by_category(&sections, "Traffic").is_empty());
    }

    #[test]
    fn test_load_sections_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bns.json");
        std::fs::write(
            &path,
            r#"[{"chapter":"XVII","section":"303","title":"Theft","description":"Whoever takes...",
                "cognizable":"Yes","bailable":"No","punishment":"3 years","cases":["State v. X"]}]"#,
        )
        .unwrap();

        let sections = load_sections(&path).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].cases, vec!["State v. X"]);
        assert_eq!(sections[0].category, None);
    }

    #[test]
    fn test_load_sections_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bns.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            load_sections(&path),
            Err(RepositoryError::Invalid(_))
        ));
    }
}
