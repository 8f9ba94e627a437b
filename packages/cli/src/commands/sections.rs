//! `sections`: search a local dataset of BNS sections.

use std::path::Path;

use api::models::{filter_by_category, load_sections, search_sections, BnsSection};

pub fn search(file: &Path, query: &str, category: &str) -> anyhow::Result<()> {
    let sections = load_sections(file)?;
    let matches = matching(&sections, query, category);
    if matches.is_empty() {
        println!("No sections found.");
    }
    for section in &matches {
        println!("{}", summary(section));
    }
    Ok(())
}

/// Sections matching both the text query and the category.
fn matching(sections: &[BnsSection], query: &str, category: &str) -> Vec<BnsSection> {
    let in_category: Vec<BnsSection> = filter_by_category(sections, category)
        .into_iter()
        .cloned()
        .collect();
    search_sections(&in_category, query)
        .into_iter()
        .cloned()
        .collect()
}

fn summary(section: &BnsSection) -> String {
    let mut out = format!("Section {}: {}", section.section, section.title);
    if !section.punishment.is_empty() {
        out.push_str(&format!("\n  Punishment: {}", section.punishment));
    }
    if !section.cognizable.is_empty() || !section.bailable.is_empty() {
        out.push_str(&format!(
            "\n  Cognizable: {} | Bailable: {}",
            section.cognizable, section.bailable
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(number: &str, title: &str, category: &str) -> BnsSection {
        BnsSection {
            chapter: "XVII".into(),
            section: number.into(),
            title: title.into(),
            description: String::new(),
            cognizable: "Yes".into(),
            bailable: "No".into(),
            punishment: "Up to 3 years".into(),
            cases: Vec::new(),
            category: Some(category.into()),
        }
    }

    #[test]
    fn test_query_and_category_combine() {
        let sections = vec![
            section("303", "Theft", "Property"),
            section("304", "Snatching", "Property"),
            section("115", "Voluntarily causing hurt", "Body"),
        ];
        let found = matching(&sections, "theft", "Property");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].section, "303");

        assert_eq!(matching(&sections, "", "Property").len(), 2);
        assert!(matching(&sections, "theft", "Body").is_empty());
        assert_eq!(matching(&sections, "", api::models::ALL_CATEGORIES).len(), 3);
    }

    #[test]
    fn test_summary_includes_punishment() {
        let text = summary(&section("303", "Theft", "Property"));
        assert!(text.starts_with("Section 303: Theft"));
        assert!(text.contains("Punishment: Up to 3 years"));
        assert!(text.contains("Cognizable: Yes | Bailable: No"));
    }
}
