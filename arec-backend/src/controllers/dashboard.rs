//! Server-rendered dashboard page.
//!
//! One GET / handler assembles the whole page from the stores and the
//! calendar. No template engine: escaped string assembly, a static
//! stylesheet, and a small script that posts to the /api mutation
//! endpoints and reloads.

use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Local};

use crate::config;
use crate::graph::{CalendarEvent, GraphAuth, GraphClient};
use crate::store::meetings::MeetingNote;
use crate::store::memory::{Investor, InvestorActivity};
use crate::store::tasks::Section;
use crate::AppState;

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, 'SF Pro Display', 'Segoe UI', sans-serif;
    background: #ffffff;
    color: #1f2937;
    line-height: 1.5;
    padding: 20px;
}

.header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 8px;
    padding-bottom: 12px;
    border-bottom: 1px solid #e5e7eb;
}

.header-left { font-size: 20px; font-weight: 600; }
.header-right { display: flex; align-items: center; gap: 16px; }
.current-date { font-size: 14px; color: #6b7280; }

.refresh-btn {
    background: #3b82f6;
    color: white;
    border: none;
    padding: 6px 16px;
    border-radius: 6px;
    cursor: pointer;
    font-size: 13px;
    font-weight: 500;
}
.refresh-btn:hover { background: #2563eb; }

.refresh-time { font-size: 12px; color: #9ca3af; margin-bottom: 16px; }

.dashboard {
    display: grid;
    grid-template-columns: repeat(4, 1fr);
    gap: 1px;
    background: #e5e7eb;
    border: 1px solid #e5e7eb;
}

.column {
    background: white;
    padding: 20px;
    min-height: 80vh;
    max-height: 85vh;
    overflow-y: auto;
}

.column-header {
    font-size: 11px;
    font-weight: 600;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #6b7280;
    margin-bottom: 16px;
    padding-bottom: 8px;
    border-bottom: 1px solid #f3f4f6;
}

/* Tasks */
.task-section { margin-bottom: 24px; }

.task-section-label {
    font-size: 10px;
    font-weight: 600;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #9ca3af;
    margin-bottom: 8px;
}

.task-section.personal .task-section-label,
.task-section.personal .task-row { opacity: 0.7; }

.section-divider { height: 1px; background: #d1d5db; margin: 24px 0; }

.task-row {
    display: flex;
    gap: 8px;
    padding: 8px 0;
    border-bottom: 1px solid #f9fafb;
    align-items: flex-start;
    transition: opacity 0.2s;
}
.task-row.completed { opacity: 0; pointer-events: none; }

.task-priority {
    display: inline-block;
    padding: 2px 6px;
    border-radius: 4px;
    font-size: 11px;
    font-weight: 600;
    font-family: 'SF Mono', Monaco, monospace;
    flex-shrink: 0;
    margin-top: 2px;
    cursor: pointer;
    transition: all 0.15s;
}
.task-priority:hover { transform: scale(1.1); box-shadow: 0 1px 3px rgba(0,0,0,0.15); }
.task-priority.hi { background: #fee2e2; color: #991b1b; }
.task-priority.med { background: #fef9c3; color: #854d0e; }
.task-priority.lo { background: #f1f5f9; color: #64748b; }

.task-checkbox {
    width: 16px;
    height: 16px;
    border: 1.5px solid #d1d5db;
    border-radius: 3px;
    flex-shrink: 0;
    margin-top: 2px;
    cursor: pointer;
    transition: all 0.15s;
}
.task-checkbox:hover { border-color: #3b82f6; background: #eff6ff; }

.task-text { flex: 1; font-size: 14px; color: #374151; line-height: 1.4; }
.task-row.their-action .task-text { color: #9ca3af; font-style: italic; }
.task-row.their-action .task-checkbox,
.task-row.their-action .task-priority { display: none; }

/* Add task form */
.add-task-bar {
    display: flex;
    gap: 6px;
    margin-bottom: 16px;
    padding-bottom: 16px;
    border-bottom: 1px solid #e5e7eb;
    flex-wrap: wrap;
}

.add-task-input {
    flex: 1;
    min-width: 120px;
    padding: 6px 10px;
    border: 1px solid #d1d5db;
    border-radius: 5px;
    font-size: 13px;
    font-family: inherit;
    outline: none;
    transition: border-color 0.15s;
}
.add-task-input:focus { border-color: #3b82f6; }

.add-task-select {
    padding: 6px 8px;
    border: 1px solid #d1d5db;
    border-radius: 5px;
    font-size: 12px;
    background: white;
    color: #374151;
    cursor: pointer;
}

.add-task-btn {
    padding: 6px 14px;
    background: #3b82f6;
    color: white;
    border: none;
    border-radius: 5px;
    font-size: 12px;
    font-weight: 500;
    cursor: pointer;
    transition: background 0.15s;
}
.add-task-btn:hover { background: #2563eb; }

/* Calendar */
.event-card {
    border: 1px solid #e5e7eb;
    border-radius: 6px;
    padding: 12px;
    margin-bottom: 10px;
}
.event-card.all-day { background: #f9fafb; border-style: dashed; }
.event-card.past { opacity: 0.5; }
.event-card.current { background: #eff6ff; border-color: #3b82f6; }

.event-time { font-weight: 600; font-size: 13px; color: #111827; margin-bottom: 4px; }
.event-title { font-size: 14px; color: #374151; margin-bottom: 6px; }
.event-attendees { font-size: 12px; color: #6b7280; }

.unavailable { color: #9ca3af; font-size: 14px; font-style: italic; }

/* Meetings */
.meeting-card {
    border: 1px solid #e5e7eb;
    border-radius: 6px;
    margin-bottom: 14px;
    overflow: hidden;
    transition: border-color 0.15s;
}
.meeting-card:hover { border-color: #d1d5db; }
.meeting-card-header { padding: 12px 14px 10px; cursor: pointer; user-select: none; }

.meeting-date-group {
    font-size: 10px;
    font-weight: 600;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #9ca3af;
    margin-bottom: 12px;
    margin-top: 8px;
}
.meeting-date-group:first-child { margin-top: 0; }

.meeting-title {
    font-size: 14px;
    font-weight: 600;
    color: #111827;
    margin-bottom: 4px;
    line-height: 1.3;
}
.meeting-meta { font-size: 12px; color: #6b7280; display: flex; gap: 8px; align-items: center; }
.meeting-attendee-count { font-size: 11px; color: #9ca3af; }

.meeting-expand-icon {
    float: right;
    font-size: 12px;
    color: #9ca3af;
    margin-top: 2px;
    transition: transform 0.2s;
}
.meeting-card.expanded .meeting-expand-icon { transform: rotate(90deg); }

.meeting-detail { display: none; padding: 0 14px 14px; border-top: 1px solid #f3f4f6; }
.meeting-card.expanded .meeting-detail { display: block; }

.meeting-summary-text {
    font-size: 13px;
    color: #374151;
    line-height: 1.6;
    margin-top: 10px;
    margin-bottom: 12px;
}
.meeting-summary-text p { margin-bottom: 8px; }

.meeting-section-label {
    font-size: 10px;
    font-weight: 600;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #9ca3af;
    margin-top: 12px;
    margin-bottom: 6px;
}

.meeting-decision,
.meeting-question {
    font-size: 13px;
    color: #374151;
    padding: 4px 0;
    padding-left: 12px;
    border-left: 2px solid #e5e7eb;
    margin-bottom: 4px;
    line-height: 1.4;
}

.meeting-action-item {
    font-size: 13px;
    color: #374151;
    padding: 4px 0;
    display: flex;
    gap: 6px;
    line-height: 1.4;
}
.meeting-action-check { color: #d1d5db; flex-shrink: 0; }
.meeting-action-check.done { color: #22c55e; }
.meeting-action-person { font-weight: 600; color: #111827; }

.meeting-source-link {
    display: inline-block;
    font-size: 11px;
    color: #6b7280;
    text-decoration: none;
    margin-top: 10px;
    padding: 3px 8px;
    background: #f9fafb;
    border-radius: 4px;
    transition: background 0.15s;
}
.meeting-source-link:hover { background: #f3f4f6; color: #374151; }

.meeting-archive-btn {
    display: inline-block;
    font-size: 11px;
    color: #6b7280;
    background: #f9fafb;
    border: 1px solid #e5e7eb;
    border-radius: 4px;
    padding: 3px 10px;
    margin-top: 10px;
    margin-left: 8px;
    cursor: pointer;
    transition: all 0.15s;
}
.meeting-archive-btn:hover { background: #dcfce7; border-color: #86efac; color: #166534; }

.no-meetings { color: #9ca3af; font-size: 14px; font-style: italic; }

/* Investors */
.investor-section { margin-bottom: 32px; }

.investor-section-title {
    font-size: 11px;
    font-weight: 600;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #6b7280;
    margin-bottom: 12px;
}

.investor-row {
    display: grid;
    grid-template-columns: 1fr auto;
    gap: 8px;
    padding: 8px 0;
    border-bottom: 1px solid #f9fafb;
    font-size: 13px;
}
.investor-name { font-weight: 500; color: #111827; }

.investor-status {
    display: inline-block;
    padding: 2px 8px;
    border-radius: 12px;
    font-size: 11px;
    font-weight: 500;
    white-space: nowrap;
}
.investor-status.committed { background: #dcfce7; color: #166534; }
.investor-status.hot-prospect { background: #ffedd5; color: #9a3412; }
.investor-status.prospect { background: #dbeafe; color: #1e40af; }
.investor-status.current { background: #f3e8ff; color: #6b21a8; }

.investor-notes { grid-column: 1 / -1; font-size: 12px; color: #6b7280; padding-left: 0; }

.activity-item {
    padding: 8px 0;
    border-bottom: 1px solid #f9fafb;
    font-size: 13px;
    color: #374151;
}

.activity-tag {
    display: inline-block;
    font-size: 10px;
    color: #9ca3af;
    background: #f9fafb;
    padding: 2px 6px;
    border-radius: 3px;
    margin-right: 6px;
    font-weight: 500;
}
"#;

const SCRIPT: &str = r#"
function completeTask(checkbox) {
    const taskRow = checkbox.closest('.task-row');
    const taskText = taskRow.getAttribute('data-task-text');

    fetch('/api/task/complete', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ task_text: taskText })
    })
    .then(response => response.json())
    .then(data => {
        if (data.ok) {
            taskRow.classList.add('completed');
            setTimeout(() => { taskRow.style.display = 'none'; }, 200);
        } else {
            alert('Failed to complete task: ' + data.error);
        }
    })
    .catch(error => { alert('Error completing task'); });
}

function addTask() {
    const input = document.getElementById('newTaskInput');
    const priority = document.getElementById('newTaskPriority').value;
    const section = document.getElementById('newTaskSection').value;
    const taskText = input.value.trim();

    if (!taskText) return;

    fetch('/api/task/add', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ task_text: taskText, priority: priority, section: section })
    })
    .then(response => response.json())
    .then(data => {
        if (data.ok) {
            input.value = '';
            location.reload();
        } else {
            alert('Failed to add task: ' + data.error);
        }
    })
    .catch(error => { alert('Error adding task'); });
}

function cyclePriority(event, pill) {
    event.stopPropagation();
    const taskRow = pill.closest('.task-row');
    const taskText = taskRow.getAttribute('data-task-text');
    const current = pill.getAttribute('data-priority');

    const cycle = { 'Hi': 'Med', 'Med': 'Lo', 'Lo': 'Hi' };
    const newPriority = cycle[current];

    fetch('/api/task/priority', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ task_text: taskText, priority: newPriority })
    })
    .then(response => response.json())
    .then(data => {
        if (data.ok) {
            pill.setAttribute('data-priority', newPriority);
            pill.textContent = newPriority;
            pill.className = 'task-priority ' + newPriority.toLowerCase();
        } else {
            alert('Failed to change priority: ' + data.error);
        }
    })
    .catch(error => { alert('Error changing priority'); });
}

function toggleMeeting(event, card) {
    if (event.target.tagName === 'A' || event.target.tagName === 'BUTTON') return;
    card.classList.toggle('expanded');
}

function archiveMeeting(event, btn) {
    event.stopPropagation();
    const filename = btn.getAttribute('data-filename');
    const card = btn.closest('.meeting-card');

    fetch('/api/meeting/archive', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ filename: filename })
    })
    .then(response => response.json())
    .then(data => {
        if (data.ok) {
            card.style.transition = 'opacity 0.3s';
            card.style.opacity = '0';
            setTimeout(() => { card.style.display = 'none'; }, 300);
        } else {
            alert('Failed to archive: ' + data.error);
        }
    })
    .catch(error => { alert('Error archiving meeting'); });
}
"#;

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// CSS class for an investor status pill, e.g. "Hot Prospect" to "hot-prospect".
fn status_class(status: &str) -> String {
    status
        .to_lowercase()
        .replace(' ', "-")
        .replace('→', "")
        .trim_matches(|c: char| c.is_whitespace() || c == '-')
        .to_string()
}

/// Mark timed events already started as past and the next upcoming one as
/// current. All-day events keep both flags false.
fn mark_past_current(events: &mut [CalendarEvent], now: DateTime<Local>) {
    let mut found_current = false;
    for event in events.iter_mut() {
        if event.is_all_day {
            continue;
        }
        if event.start_at < now {
            event.is_past = true;
        } else if !found_current {
            event.is_current = true;
            found_current = true;
        }
    }
}

struct CalendarData {
    ok: bool,
    events: Vec<CalendarEvent>,
}

async fn fetch_calendar(state: &AppState) -> CalendarData {
    let unavailable = CalendarData {
        ok: false,
        events: Vec::new(),
    };

    let (client_id, tenant_id, user_id) = match (
        state.config.azure_client_id.clone(),
        state.config.azure_tenant_id.clone(),
        state.config.ms_user_id.clone(),
    ) {
        (Some(c), Some(t), Some(u)) => (c, t, u),
        _ => return unavailable,
    };

    let auth = GraphAuth::new(client_id, tenant_id, config::token_cache_path());
    let graph = GraphClient::new(auth, user_id);

    match graph
        .get_todays_events(state.config.briefing.calendar_days_ahead)
        .await
    {
        Ok(mut events) => {
            mark_past_current(&mut events, Local::now());
            CalendarData { ok: true, events }
        }
        Err(e) => {
            log::warn!("[DASHBOARD] Calendar fetch failed: {}", e);
            unavailable
        }
    }
}

fn render_tasks_column(sections: &[Section]) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"column\">\n<div class=\"column-header\">Tasks</div>\n");

    html.push_str(concat!(
        "<div class=\"add-task-bar\">\n",
        "<input type=\"text\" class=\"add-task-input\" id=\"newTaskInput\" placeholder=\"New task...\" ",
        "onkeydown=\"if(event.key==='Enter') addTask()\">\n",
        "<select class=\"add-task-select\" id=\"newTaskPriority\">\n",
        "<option value=\"Hi\">Hi</option>\n",
        "<option value=\"Med\" selected>Med</option>\n",
        "<option value=\"Lo\">Lo</option>\n",
        "</select>\n",
        "<select class=\"add-task-select\" id=\"newTaskSection\">\n",
    ));
    for section in sections {
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            html_escape(&section.raw_name),
            html_escape(&section.name)
        ));
    }
    html.push_str(concat!(
        "</select>\n",
        "<button class=\"add-task-btn\" onclick=\"addTask()\">Add</button>\n",
        "</div>\n",
    ));

    for (i, section) in sections.iter().enumerate() {
        // One divider where the list crosses from work into personal
        if i > 0 && section.is_personal && !sections[i - 1].is_personal {
            html.push_str("<div class=\"section-divider\"></div>\n");
        }

        let personal = if section.is_personal { " personal" } else { "" };
        html.push_str(&format!("<div class=\"task-section{}\">\n", personal));
        html.push_str(&format!(
            "<div class=\"task-section-label\">{}</div>\n",
            html_escape(&section.name)
        ));

        for task in &section.tasks {
            let their = if task.their_action { " their-action" } else { "" };
            html.push_str(&format!(
                "<div class=\"task-row{}\" data-task-text=\"{}\">\n",
                their,
                html_escape(&task.raw)
            ));
            if !task.their_action {
                let label = task.priority.label();
                html.push_str(&format!(
                    "<span class=\"task-priority {}\" data-priority=\"{}\" onclick=\"cyclePriority(event, this)\">{}</span>\n",
                    label.to_lowercase(),
                    label,
                    label
                ));
                html.push_str("<div class=\"task-checkbox\" onclick=\"completeTask(this)\"></div>\n");
            }
            html.push_str(&format!(
                "<div class=\"task-text\">{}</div>\n</div>\n",
                html_escape(&task.text)
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    html
}

fn render_calendar_column(calendar: &CalendarData) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"column\">\n<div class=\"column-header\">Today</div>\n");

    if !calendar.ok {
        html.push_str("<div class=\"unavailable\">Calendar unavailable</div>\n</div>\n");
        return html;
    }

    for event in calendar.events.iter().filter(|e| e.is_all_day) {
        html.push_str(&format!(
            "<div class=\"event-card all-day\">\n<div class=\"event-time\">All Day</div>\n<div class=\"event-title\">{}</div>\n</div>\n",
            html_escape(&event.title)
        ));
    }

    for event in calendar.events.iter().filter(|e| !e.is_all_day) {
        let mut classes = String::from("event-card");
        if event.is_past {
            classes.push_str(" past");
        }
        if event.is_current {
            classes.push_str(" current");
        }

        html.push_str(&format!(
            "<div class=\"{}\">\n<div class=\"event-time\">{} – {}</div>\n<div class=\"event-title\">{}</div>\n",
            classes,
            html_escape(&event.start),
            html_escape(&event.end),
            html_escape(&event.title)
        ));

        if !event.organizer.is_empty() || !event.attendees.is_empty() {
            let mut who = String::new();
            if !event.organizer.is_empty() {
                who.push_str(&html_escape(&event.organizer));
            }
            if !event.attendees.is_empty() {
                if !event.organizer.is_empty() {
                    who.push_str(" · ");
                }
                let shown: Vec<String> = event
                    .attendees
                    .iter()
                    .take(3)
                    .map(|a| html_escape(a))
                    .collect();
                who.push_str(&shown.join(", "));
                if event.attendees.len() > 3 {
                    who.push_str(&format!(" +{} more", event.attendees.len() - 3));
                }
            }
            html.push_str(&format!("<div class=\"event-attendees\">{}</div>\n", who));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    html
}

fn render_meetings_column(meetings: &[MeetingNote]) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"column\">\n<div class=\"column-header\">Recent Meetings</div>\n");

    if meetings.is_empty() {
        html.push_str("<div class=\"no-meetings\">No meeting summaries found</div>\n</div>\n");
        return html;
    }

    let mut last_date = "";
    for meeting in meetings {
        if meeting.date != last_date {
            last_date = &meeting.date;
            html.push_str(&format!(
                "<div class=\"meeting-date-group\">{}</div>\n",
                html_escape(&meeting.date)
            ));
        }

        html.push_str("<div class=\"meeting-card\" onclick=\"toggleMeeting(event, this)\">\n");
        html.push_str("<div class=\"meeting-card-header\">\n<span class=\"meeting-expand-icon\">▶</span>\n");
        html.push_str(&format!(
            "<div class=\"meeting-title\">{}</div>\n",
            html_escape(&meeting.title)
        ));
        html.push_str("<div class=\"meeting-meta\">\n");
        if !meeting.attendees.is_empty() {
            html.push_str(&format!(
                "<span class=\"meeting-attendee-count\">{}</span>\n",
                html_escape(&meeting.attendees)
            ));
        }
        html.push_str("</div>\n</div>\n<div class=\"meeting-detail\">\n");

        if !meeting.summary.is_empty() {
            html.push_str("<div class=\"meeting-summary-text\">\n");
            for para in meeting.summary.split("\n\n") {
                let para = para.trim();
                if !para.is_empty() {
                    html.push_str(&format!("<p>{}</p>\n", html_escape(para)));
                }
            }
            html.push_str("</div>\n");
        }

        if !meeting.decisions.is_empty() {
            html.push_str("<div class=\"meeting-section-label\">Decisions</div>\n");
            for decision in &meeting.decisions {
                html.push_str(&format!(
                    "<div class=\"meeting-decision\">{}</div>\n",
                    html_escape(decision)
                ));
            }
        }

        if !meeting.action_items.is_empty() {
            html.push_str("<div class=\"meeting-section-label\">Action Items</div>\n");
            for item in &meeting.action_items {
                let (check_class, mark) = if item.done {
                    ("meeting-action-check done", "✓")
                } else {
                    ("meeting-action-check", "○")
                };
                let owner = if item.person.is_empty() {
                    String::new()
                } else {
                    format!(
                        "<span class=\"meeting-action-person\">{}</span> — ",
                        html_escape(&item.person)
                    )
                };
                html.push_str(&format!(
                    "<div class=\"meeting-action-item\">\n<span class=\"{}\">{}</span>\n<span>{}{}</span>\n</div>\n",
                    check_class,
                    mark,
                    owner,
                    html_escape(&item.text)
                ));
            }
        }

        if !meeting.open_questions.is_empty() {
            html.push_str("<div class=\"meeting-section-label\">Open Questions</div>\n");
            for question in &meeting.open_questions {
                html.push_str(&format!(
                    "<div class=\"meeting-question\">{}</div>\n",
                    html_escape(question)
                ));
            }
        }

        if !meeting.source_url.is_empty() {
            html.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\" class=\"meeting-source-link\">View in Notion →</a>\n",
                html_escape(&meeting.source_url)
            ));
        }
        html.push_str(&format!(
            "<button class=\"meeting-archive-btn\" data-filename=\"{}\" onclick=\"archiveMeeting(event, this)\">Archive ✓</button>\n",
            html_escape(&meeting.filename)
        ));
        html.push_str("</div>\n</div>\n");
    }

    html.push_str("</div>\n");
    html
}

fn render_investors_column(investors: &[Investor], activity: &[InvestorActivity]) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"column\">\n<div class=\"column-header\">Investors</div>\n");

    html.push_str("<div class=\"investor-section\">\n<div class=\"investor-section-title\">Investor Pipeline</div>\n");
    for investor in investors {
        html.push_str("<div class=\"investor-row\">\n");
        html.push_str(&format!(
            "<div class=\"investor-name\">{}</div>\n",
            html_escape(&investor.name)
        ));
        html.push_str(&format!(
            "<div class=\"investor-status {}\">{}</div>\n",
            html_escape(&status_class(&investor.status)),
            html_escape(&investor.status)
        ));
        if !investor.notes.is_empty() {
            html.push_str(&format!(
                "<div class=\"investor-notes\">{}</div>\n",
                html_escape(&investor.notes)
            ));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"investor-section\">\n<div class=\"investor-section-title\">Recent Activity</div>\n");
    for item in activity {
        html.push_str(&format!(
            "<div class=\"activity-item\">\n<span class=\"activity-tag\">{}</span>\n{}\n</div>\n",
            html_escape(&item.source),
            html_escape(&item.text)
        ));
    }
    html.push_str("</div>\n</div>\n");
    html
}

fn render_page(
    sections: &[Section],
    calendar: &CalendarData,
    meetings: &[MeetingNote],
    investors: &[Investor],
    activity: &[InvestorActivity],
) -> String {
    let now = Local::now();
    let current_date = now.format("%B %d, %Y").to_string();
    let refresh_time = now.format("%-I:%M %p").to_string();

    let mut html = String::with_capacity(64 * 1024);
    html.push_str(concat!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
        "<meta charset=\"UTF-8\">\n",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        "<title>AREC Dashboard</title>\n<style>",
    ));
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!(
        concat!(
            "<div class=\"header\">\n",
            "<div class=\"header-left\">AREC — Oscar Vasquez</div>\n",
            "<div class=\"header-right\">\n",
            "<div class=\"current-date\">{}</div>\n",
            "<button class=\"refresh-btn\" onclick=\"location.reload()\">Refresh</button>\n",
            "</div>\n</div>\n",
            "<div class=\"refresh-time\">Refreshed: {}</div>\n",
        ),
        current_date, refresh_time
    ));

    html.push_str("<div class=\"dashboard\">\n");
    html.push_str(&render_tasks_column(sections));
    html.push_str(&render_calendar_column(calendar));
    html.push_str(&render_meetings_column(meetings));
    html.push_str(&render_investors_column(investors, activity));
    html.push_str("</div>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

async fn dashboard_page(data: web::Data<AppState>) -> impl Responder {
    let sections = match data.tasks.sections() {
        Ok(sections) => sections,
        Err(e) => {
            log::warn!("[DASHBOARD] Task parse failed: {}", e);
            Vec::new()
        }
    };

    let investors = data.reader.investors();
    let names: Vec<String> = investors.iter().map(|i| i.name.clone()).collect();
    let activity = data.reader.recent_investor_activity(&names);

    let calendar = fetch_calendar(&data).await;

    let meetings = match data
        .meetings
        .load_recent(data.config.briefing.meeting_lookback_days)
    {
        Ok(meetings) => meetings,
        Err(e) => {
            log::warn!("[DASHBOARD] Meeting load failed: {}", e);
            Vec::new()
        }
    };

    let page = render_page(&sections, &calendar, &meetings, &investors, &activity);

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(dashboard_page)));
}
