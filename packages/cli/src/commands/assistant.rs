//! `ask` and `compare` against the LawSphere API.

use api::client::ChatResponse;
use api::{Language, LawApiClient, LawAssistant, Settings};

pub async fn ask(settings: &Settings, query: &str, hindi: bool) -> anyhow::Result<()> {
    let client = LawApiClient::from_settings(&settings.api)?;
    let language = if hindi {
        Language::Hindi
    } else {
        Language::English
    };
    let response = client.ask(query, language).await?;
    println!("{}", format_answer(&response, ui::NO_ANSWER));
    Ok(())
}

pub async fn compare(settings: &Settings, section1: &str, section2: &str) -> anyhow::Result<()> {
    let client = LawApiClient::from_settings(&settings.api)?;
    let response = client.compare(section1, section2).await?;
    println!("{}", format_answer(&response, ui::NO_COMPARISON));
    Ok(())
}

/// Answer text followed by the numbered sources it cites.
fn format_answer(response: &ChatResponse, fallback: &str) -> String {
    let mut out = response
        .formatted_answer
        .clone()
        .unwrap_or_else(|| fallback.to_string());
    if let Some(tags) = response.semantic_tags.as_ref().filter(|t| !t.is_empty()) {
        out.push_str(&format!("\n\nTags: {}", tags.join(", ")));
    }
    for source in response.retrieved_sources.iter().flatten() {
        out.push_str(&format!("\n[Source {}] {}", source.source_number, source.snippet));
    }
    out
}
