//! # Legal document drafting
//!
//! Three fill-in templates render to a self-contained HTML document:
//!
//! | Template | Id | Recipient field | Details field |
//! |----------|----|-----------------|---------------|
//! | [`DraftTemplate::Fir`] | `fir` | Police Station Name | Incident Details |
//! | [`DraftTemplate::Bail`] | `bail` | Recipient / Court Name | Case Details / Notice Content |
//! | [`DraftTemplate::Notice`] | `notice` | Recipient / Court Name | Case Details / Notice Content |
//!
//! Every user-supplied value is HTML-escaped before it is placed in the markup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftTemplate {
    Fir,
    Bail,
    Notice,
}

impl DraftTemplate {
    pub const ALL: [DraftTemplate; 3] = [DraftTemplate::Fir, DraftTemplate::Bail, DraftTemplate::Notice];

    pub fn id(&self) -> &'static str {
        match self {
            DraftTemplate::Fir => "fir",
            DraftTemplate::Bail => "bail",
            DraftTemplate::Notice => "notice",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DraftTemplate::Fir => "FIR Generator",
            DraftTemplate::Bail => "Bail Application",
            DraftTemplate::Notice => "Legal Notice",
        }
    }

    pub fn sender_label(&self) -> &'static str {
        "Your Name / Complainant"
    }

    pub fn recipient_label(&self) -> &'static str {
        match self {
            DraftTemplate::Fir => "Police Station Name",
            _ => "Recipient / Court Name",
        }
    }

    pub fn details_label(&self) -> &'static str {
        match self {
            DraftTemplate::Fir => "Incident Details",
            _ => "Case Details / Notice Content",
        }
    }
}

impl fmt::Display for DraftTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DraftTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftTemplate::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template: {s}"))
    }
}

/// Values typed into the drafting form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInput {
    pub sender_name: String,
    pub recipient_name: String,
    pub date: String,
    #[serde(default)]
    pub subject: String,
    pub content_details: String,
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

fn body(template: DraftTemplate, input: &DraftInput) -> String {
    let sender = escape_html(&input.sender_name);
    let recipient = escape_html(&input.recipient_name);
    let date = escape_html(&input.date);
    let details = escape_html(&input.content_details);

    match template {
        DraftTemplate::Fir => format!(
            "<h1>First Information Report (FIR)</h1>
<p><b>Date:</b> {date}</p>
<p><b>To, The Station House Officer (SHO),</b><br>{recipient}</p>
<h2>Subject: Complaint regarding incident.</h2>
<div class='content'>
<p>Respected Sir/Madam,</p>
<p>I, <b>{sender}</b>, wish to report an incident that took place as described below:</p>
<p>{details}</p>
<p>I request you to kindly register an FIR and take necessary legal action against the culprits.</p>
</div>
<div class='signature'>
<p>Sincerely,</p>
<p>{sender}</p>
</div>"
        ),
        DraftTemplate::Bail => format!(
            "<h1>Application for Bail</h1>
<p><b>In The Court Of:</b> {recipient}</p>
<p><b>Date:</b> {date}</p>
<h2>In the matter of: {sender} (Applicant)</h2>
<div class='content'>
<p>Most Respectfully Sheweth:</p>
<p>1. That the applicant is innocent and has been falsely implicated in the case.</p>
<p>2. Details of the case/allegation: {details}</p>
<p>3. That the applicant undertakes to cooperate with the investigation and will attend the court hearings regularly.</p>
<p>It is therefore prayed that this Hon&#39;ble Court may be pleased to grant bail to the applicant.</p>
</div>
<div class='signature'>
<p>Counsel for Applicant</p>
</div>"
        ),
        DraftTemplate::Notice => format!(
            "<h1>Legal Notice</h1>
<p><b>Date:</b> {date}</p>
<p><b>From:</b> Advocate on behalf of {sender}</p>
<p><b>To:</b> {recipient}</p>
<h2>Subject: Legal Notice</h2>
<div class='content'>
<p>Sir/Madam,</p>
<p>Under instructions from my client <b>{sender}</b>, I hereby serve you this legal notice:</p>
<p>{details}</p>
<p>You are hereby called upon to comply with the demands of my client within 15 days of receipt of this notice, failing which appropriate legal action will be initiated against you.</p>
</div>
<div class='signature'>
<p>Advocate Signature</p>
</div>"
        ),
    }
}

/// Render `template` filled with `input` as a complete HTML document.
pub fn render_html(template: DraftTemplate, input: &DraftInput) -> String {
    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8'>
<title>{title}</title>
<style>
body {{ font-family: serif; margin: 40px; line-height: 1.5; }}
h1 {{ text-align: center; text-decoration: underline; }}
.content {{ margin-top: 20px; }}
.signature {{ margin-top: 50px; text-align: right; }}
</style>
</head>
<body>
{body}
</body>
</html>
",
        title = template.title(),
        body = body(template, input),
    )
}
