//! Editable document preview: layout mode and plain-text export.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::ResumeData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewLayout {
    #[default]
    Original,
    /// Condensed spacing aimed at a one-page fit. Read-only.
    OnePage,
}

impl PreviewLayout {
    pub fn allows_rewrite(&self) -> bool {
        matches!(self, PreviewLayout::Original)
    }
}

/// Renders the resume as plain text for download. Empty sections are omitted.
pub fn render_plain_text(resume: &ResumeData) -> String {
    let mut out = String::new();

    out.push_str(&resume.full_name.to_uppercase());
    out.push('\n');

    let contact = &resume.contact_info;
    let contact_line: Vec<&str> = [
        Some(contact.email.as_str()),
        Some(contact.phone.as_str()),
        contact.location.as_deref(),
        contact.linkedin.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect();
    if !contact_line.is_empty() {
        out.push_str(&contact_line.join(" | "));
        out.push('\n');
    }

    if !resume.summary.trim().is_empty() {
        section(&mut out, "PROFESSIONAL SUMMARY");
        out.push_str(resume.summary.trim());
        out.push('\n');
    }

    if !resume.skills.is_empty() {
        section(&mut out, "CORE COMPETENCIES");
        out.push_str(&resume.skills.join(", "));
        out.push('\n');
    }

    if !resume.experience.is_empty() {
        section(&mut out, "PROFESSIONAL EXPERIENCE");
        for (i, exp) in resume.experience.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{} | {}", exp.role, exp.dates);
            match exp.location.as_deref().filter(|l| !l.trim().is_empty()) {
                Some(location) => {
                    let _ = writeln!(out, "{} | {}", exp.company, location);
                }
                None => {
                    let _ = writeln!(out, "{}", exp.company);
                }
            }
            for bullet in &exp.description {
                let _ = writeln!(out, "- {bullet}");
            }
        }
    }

    if !resume.education.is_empty() {
        section(&mut out, "EDUCATION");
        for edu in &resume.education {
            let _ = writeln!(out, "{} | {}", edu.school, edu.dates);
            let _ = writeln!(out, "{}", edu.degree);
        }
    }

    out
}

fn section(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
}
