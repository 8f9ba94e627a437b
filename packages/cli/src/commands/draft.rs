//! `draft`: render a template to HTML.

use std::path::Path;

use api::models::{render_html, DraftInput, DraftTemplate};

const DATE_FORMAT: &str = "%d/%m/%Y";

pub fn input(
    sender: String,
    recipient: String,
    details: String,
    date: Option<String>,
) -> DraftInput {
    DraftInput {
        sender_name: sender,
        recipient_name: recipient,
        date: date.unwrap_or_else(|| chrono::Local::now().format(DATE_FORMAT).to_string()),
        subject: String::new(),
        content_details: details,
    }
}

pub fn render(template: DraftTemplate, input: &DraftInput, out: Option<&Path>) -> anyhow::Result<()> {
    let html = render_html(template, input);
    match out {
        Some(path) => {
            std::fs::write(path, html)?;
            tracing::info!(path = %path.display(), template = %template, "draft written");
            println!("{} saved to {}", template.title(), path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}
