//! Prompt assembly for the morning briefing and the chat assistant
//!
//! Builders are pure functions over already-fetched data. The section
//! banners and truncation lengths are part of the prompt contract; change
//! them and the model output shifts.

use crate::graph::{CalendarEvent, EmailMessage};
use crate::store::memory::{MemoryBundle, TaskGroup};

pub const BRIEFING_SYSTEM_PROMPT: &str = r#"You are Oscar Vasquez's personal morning briefing assistant.
Oscar is the COO and Co-founder of Avila Real Estate Capital (AREC), a private credit
real estate fund focused on residential A&D and construction lending. Hard close for
Fund II is June 30, 2026 with a $1B AUM target.

Deliver a concise, intelligent morning briefing optimized for mobile Slack reading —
exactly like a trusted chief of staff would give. You have access to: today's calendar,
recent emails, Oscar's open task list, and institutional memory about Fund II, investors,
and relationships.

CRITICAL FORMATTING RULES FOR MOBILE:
- Use short, punchy paragraphs (2-3 sentences max each)
- Put a blank line between EVERY paragraph
- Use *bold* for names and times (Slack markdown)
- Start each major section with a bold label on its own line:
  *Schedule*
  *Email — Action Required*
  *Open Tasks*
  *Headline*
- Each action item gets its own short paragraph — NEVER combine two action items
- If a paragraph exceeds 3 sentences, split it immediately
- No walls of text — every sentence should feel scannable on mobile
- No emojis anywhere in the briefing

CONTENT RULES:
- Warm but efficient. No fluff. No filler phrases.
- For meetings: call out who the key people are and why the meeting matters
- For emails: surface only what needs attention or action. Skip automated/noise emails.
- For tasks: flag only what's time-sensitive or relevant to today's meetings
- End with *Headline* section: one bold sentence about the single most important thing today
- Target length: under 400 words total
- Write directly to Oscar in second person.
- Do NOT use markdown headers (#, ##). Only use the bold section markers above.

CRITICAL — NO INFERENCE OR HALLUCINATION:
- Only connect a meeting or person to a topic/deal if there is explicit evidence in the
  email, calendar invite, or memory files that they are related.
- Do NOT infer that a meeting is a good opportunity to discuss something just because
  the timing is convenient.
- A weekly check-in is just a weekly check-in — do not load it with agenda suggestions
  unless the calendar invite or recent emails explicitly reference those topics.
- If confidence in a connection is below 90%, omit it entirely. It is better to
  under-connect than to hallucinate relevance.
- Describe meetings factually: who, what time, what the meeting is for based only on
  what the invite says. Do not editorialize about what Oscar should discuss unless
  the source data explicitly supports it.
- Save recommendations and suggested actions strictly for the Email and Tasks sections
  where there is direct evidence of something requiring attention."#;

pub const CHAT_SYSTEM_PROMPT: &str = r#"You are Oscar Vasquez's personal AI chief of staff, accessible via Slack.
Oscar is COO of Avila Real Estate Capital (AREC), a private credit real estate fund.
Hard close for Fund II is June 30, 2026, $1B AUM target.

You have full access to Oscar's memory files: tasks, projects, people, company context.
Use this context to answer questions accurately.

Rules:
- Be concise. This is Slack — not email. Max 3-4 short paragraphs.
- Use *bold* for names, amounts, dates (Slack markdown).
- If adding a task, confirm what you added and which category.
- If updating a memory file, confirm what you updated.
- If answering a question, answer directly from the memory context.
  If you don't have enough context, say so clearly.
- Never make up facts about deals, investors, or people.
- Maintain conversational continuity using the chat history provided.
- End action confirmations with: "✓ Done" on its own line.

When the user wants you to take an action (add task, update memory), include special markers in your response:
- For tasks: [ACTION:TASK|category|task text]
- For memory updates: [ACTION:MEMORY|filepath|note text]

These markers will be stripped before posting to Slack."#;

const EVENT_ATTENDEES_SHOWN: usize = 4;
const EVENT_PREVIEW_CAP: usize = 150;
const EMAIL_PREVIEW_CAP: usize = 200;
const PEOPLE_BIO_CAP: usize = 300;
const COMPANY_CAP: usize = 800;

const CHAT_TASKS_PER_CATEGORY: usize = 8;
const CHAT_PEOPLE_SHOWN: usize = 8;
const CHAT_PEOPLE_BIO_CAP: usize = 250;
const CHAT_INBOX_CAP: usize = 10;
const CHAT_FUND_CAP: usize = 1200;
const CHAT_COMPANY_CAP: usize = 900;

fn cap(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn fmt_events(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "No calendar events today.".to_string();
    }
    let mut lines = Vec::new();
    for e in events {
        if e.is_all_day {
            lines.push(format!("- ALL DAY: {}", e.title));
            continue;
        }
        let mut att = String::new();
        if !e.attendees.is_empty() {
            let names: Vec<&str> = e
                .attendees
                .iter()
                .take(EVENT_ATTENDEES_SHOWN)
                .map(String::as_str)
                .collect();
            att = format!(" with {}", names.join(", "));
            if e.attendees.len() > EVENT_ATTENDEES_SHOWN {
                att.push_str(&format!(
                    " +{} others",
                    e.attendees.len() - EVENT_ATTENDEES_SHOWN
                ));
            }
        }
        let loc = if e.location.is_empty() {
            String::new()
        } else {
            format!(" @ {}", e.location)
        };
        lines.push(format!("- {} – {}: {}{}{}", e.start, e.end, e.title, att, loc));
        if !e.preview.trim().is_empty() {
            lines.push(format!("  {}", cap(&e.preview, EVENT_PREVIEW_CAP)));
        }
    }
    lines.join("\n")
}

fn fmt_emails(emails: &[EmailMessage]) -> String {
    if emails.is_empty() {
        return "No recent emails.".to_string();
    }
    let mut lines = Vec::new();
    for m in emails {
        let unread = if m.is_read { "" } else { "[UNREAD] " };
        let att = if m.has_attachments { " [attachment]" } else { "" };
        lines.push(format!(
            "- {}FROM: {} | {}{}",
            unread, m.from_name, m.subject, att
        ));
        if !m.preview.is_empty() {
            lines.push(format!("  {}", cap(&m.preview, EMAIL_PREVIEW_CAP)));
        }
    }
    lines.join("\n")
}

fn fmt_tasks(groups: &[TaskGroup], per_category: Option<usize>) -> String {
    if groups.is_empty() {
        return "No open tasks.".to_string();
    }
    let mut lines = Vec::new();
    for group in groups {
        if group.tasks.is_empty() {
            continue;
        }
        lines.push(format!("\n{}:", group.section));
        let shown = match per_category {
            Some(n) => &group.tasks[..group.tasks.len().min(n)],
            None => &group.tasks[..],
        };
        for task in shown {
            lines.push(format!("  - {}", task));
        }
    }
    lines.join("\n")
}

/// People context limited to names appearing among today's attendees.
fn fmt_people(people: &[(String, String)], events: &[CalendarEvent]) -> String {
    if events.is_empty() || people.is_empty() {
        return String::new();
    }
    let attendees_flat = events
        .iter()
        .flat_map(|e| e.attendees.iter())
        .map(|a| a.to_lowercase())
        .collect::<Vec<String>>()
        .join(" ");

    let relevant: Vec<&(String, String)> = people
        .iter()
        .filter(|(name, _)| {
            name.split_whitespace()
                .any(|part| attendees_flat.contains(&part.to_lowercase()))
        })
        .collect();

    if relevant.is_empty() {
        return String::new();
    }
    let mut lines = vec!["Relevant people in today's meetings:".to_string()];
    for (name, bio) in relevant {
        lines.push(format!("\n{}:\n{}", name, cap(bio, PEOPLE_BIO_CAP)));
    }
    lines.join("\n")
}

/// Assemble the morning briefing user prompt.
pub fn briefing_prompt(
    events: &[CalendarEvent],
    emails: &[EmailMessage],
    memory: &MemoryBundle,
) -> String {
    let now = chrono::Local::now();
    let today = now.format("%A, %B %-d, %Y");
    let time_now = now.format("%-I:%M %p");

    let inbox = if memory.inbox_items.is_empty() {
        "Empty.".to_string()
    } else {
        memory.inbox_items.join("\n")
    };

    format!(
        "Today is {}. Current time: {} Pacific.\n\n\
         === TODAY'S CALENDAR ===\n{}\n\n\
         === RECENT EMAILS (past 18 hours) ===\n{}\n\n\
         === OPEN TASKS ===\n{}\n\n\
         === INBOX CAPTURE QUEUE ===\n{}\n\n\
         === FUND II STATUS ===\n{}\n\n\
         === COMPANY CONTEXT ===\n{}\n\n\
         === PEOPLE CONTEXT ===\n{}\n\n\
         Please deliver Oscar's morning briefing for today.",
        today,
        time_now,
        fmt_events(events),
        fmt_emails(emails),
        fmt_tasks(&memory.open_tasks, None),
        inbox,
        memory.fund,
        cap(&memory.company, COMPANY_CAP),
        fmt_people(&memory.people, events),
    )
}

fn fmt_chat_people(people: &[(String, String)]) -> String {
    if people.is_empty() {
        return "No people notes.".to_string();
    }
    let mut lines = Vec::new();
    for (name, bio) in people.iter().take(CHAT_PEOPLE_SHOWN) {
        lines.push(format!("\n{}:\n{}", name, cap(bio, CHAT_PEOPLE_BIO_CAP)));
    }
    lines.join("\n")
}

/// Assemble the chat assistant context block wrapping one user message.
pub fn chat_context(user_message: &str, memory: &MemoryBundle) -> String {
    let inbox = if memory.inbox_items.is_empty() {
        "Empty".to_string()
    } else {
        memory
            .inbox_items
            .iter()
            .take(CHAT_INBOX_CAP)
            .cloned()
            .collect::<Vec<String>>()
            .join("\n")
    };

    format!(
        "=== CURRENT MEMORY CONTEXT ===\n\n\
         OPEN TASKS:\n{}\n\n\
         INBOX ITEMS:\n{}\n\n\
         FUND II STATUS:\n{}\n\n\
         COMPANY CONTEXT:\n{}\n\n\
         PEOPLE CONTEXT:\n{}\n\n\
         === USER MESSAGE ===\n{}",
        fmt_tasks(&memory.open_tasks, Some(CHAT_TASKS_PER_CATEGORY)),
        inbox,
        cap(&memory.fund, CHAT_FUND_CAP),
        cap(&memory.company, CHAT_COMPANY_CAP),
        fmt_chat_people(&memory.people),
        user_message,
    )
}
