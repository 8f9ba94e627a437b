//! Lawyer directory, forum and legal news types.

use serde::{Deserialize, Serialize};

fn default_specialization() -> String {
    "General Law".to_string()
}

fn default_location() -> String {
    "India".to_string()
}

/// A lawyer as listed in the directory, read from `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerProfile {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_specialization")]
    pub specialization: String,
    /// Years of practice.
    #[serde(default)]
    pub experience: u32,
    #[serde(default = "default_location")]
    pub location: String,
}

/// A question posted to the community forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub answers: Vec<ForumAnswer>,
}

/// A lawyer's answer to a forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumAnswer {
    #[serde(default)]
    pub lawyer_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub source: String,
    pub date: String,
}

impl NewsArticle {
    fn new(title: &str, description: &str, source: &str, date: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            source: source.to_string(),
            date: date.to_string(),
        }
    }
}

/// Built-in headlines shown when the news endpoint is unreachable.
pub fn default_news() -> Vec<NewsArticle> {
    vec![
        NewsArticle::new(
            "Supreme Court on BNS",
            "SC clarifies retrospective applicability of new criminal laws in pending cases.",
            "LiveLaw",
            "2 Hours ago",
        ),
        NewsArticle::new(
            "High Court Digitization",
            "Delhi High Court launches new e-filing portal for faster processing.",
            "Bar & Bench",
            "5 Hours ago",
        ),
        NewsArticle::new(
            "Data Privacy Act",
            "New amendments proposed to the Digital Personal Data Protection Act.",
            "The Hindu",
            "1 Day ago",
        ),
        NewsArticle::new(
            "Bail Reforms",
            "Govt issues new guidelines for bail in economic offenses under BNS.",
            "Times of India",
            "2 Days ago",
        ),
    ]
}
