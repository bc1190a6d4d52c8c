//! Prompt construction for story generation.
//!
//! The system prompt fixes the voice for a [`WritingStyle`]; the user prompt
//! carries the biography. Blank fields are left out so the model is never
//! asked to write about empty sections.

use std::fmt::Write;

use memoir_core::{AutobiographyRecord, WritingStyle};

/// A system/user prompt pair ready for a chat-completions call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryPrompt {
    pub system: String,
    pub user: String,
}

const BASE_INSTRUCTIONS: &str = "You are a skilled biographer who writes first-person \
autobiographies from notes supplied by the subject. Write flowing prose in the first \
person, organised into paragraphs separated by blank lines. Use only the facts provided; \
do not invent names, dates or events. Do not include headings, lists or commentary about \
the task.";

/// Voice instructions for one style.
pub fn style_guidance(style: WritingStyle) -> &'static str {
    match style {
        WritingStyle::Emotional => {
            "Write warmly and heartfelt. Dwell on feelings, relationships and the meaning \
             the subject found in each chapter of life."
        }
        WritingStyle::Professional => {
            "Write in a polished, measured register suitable for a professional profile. \
             Emphasise accomplishments, growth and responsibility."
        }
        WritingStyle::Simple => {
            "Write in plain, clear language with short sentences that anyone can read easily."
        }
        WritingStyle::Poetic => {
            "Write lyrically, with vivid imagery and gentle rhythm, while keeping every \
             fact intact."
        }
    }
}

/// System prompt for `style`.
pub fn system_prompt(style: WritingStyle) -> String {
    format!("{}\n\n{}", BASE_INSTRUCTIONS, style_guidance(style))
}

/// Build the full prompt pair for `record` in `style`.
pub fn build_story_prompt(record: &AutobiographyRecord, style: WritingStyle) -> StoryPrompt {
    StoryPrompt {
        system: system_prompt(style),
        user: user_prompt(record, style),
    }
}

fn user_prompt(record: &AutobiographyRecord, style: WritingStyle) -> String {
    let mut out = String::new();
    let title = record.customization.title.trim();
    if title.is_empty() {
        let _ = writeln!(out, "Write my autobiography in a {} style.", style);
    } else {
        let _ = writeln!(
            out,
            "Write my autobiography, titled \"{}\", in a {} style.",
            title, style
        );
    }

    let info = &record.personal_info;
    let details = [
        ("Name", info.name.as_str()),
        ("Date of birth", info.dob.as_str()),
        ("Birthplace", info.birthplace.as_str()),
        ("Background", info.background.as_str()),
    ];
    if details.iter().any(|(_, v)| !v.trim().is_empty()) {
        out.push_str("\nAbout me:\n");
        for (label, value) in details {
            push_line(&mut out, label, value);
        }
    }

    for (heading, text) in record.narrative_sections() {
        let text = text.trim();
        if !text.is_empty() {
            let _ = write!(out, "\n{}:\n{}\n", heading, text);
        }
    }

    let events: Vec<_> = record
        .timeline
        .iter()
        .filter(|e| !(e.year.trim().is_empty() && e.title.trim().is_empty()))
        .collect();
    if !events.is_empty() {
        out.push_str("\nKey events:\n");
        for event in events {
            let _ = write!(out, "- ");
            if !event.year.trim().is_empty() {
                let _ = write!(out, "{}: ", event.year.trim());
            }
            let _ = write!(out, "{} ({})", event.title.trim(), event.category);
            if !event.description.trim().is_empty() {
                let _ = write!(out, " - {}", event.description.trim());
            }
            out.push('\n');
        }
    }

    out
}

fn push_line(out: &mut String, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        let _ = writeln!(out, "- {}: {}", label, value);
    }
}
