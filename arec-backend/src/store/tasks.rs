//! Task file parsing and mutation
//!
//! The task file is plain markdown: `## ` headings open sections, `- [ ]` /
//! `- [x]` lines are open/closed tasks, and a bold bracketed tag right after
//! the checkbox (`- [ ] **[Hi]** ...`) carries the priority. A heading named
//! "Done" or "Waiting On" is a hard cutoff: nothing after it is parsed.
//!
//! Mutations identify a task by its raw text (the exact substring after the
//! checkbox marker) and rewrite only the matched line, so the rest of the
//! file survives byte-for-byte.

use super::StoreError;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Leading priority tag after emphasis stripping, abbreviation friendly
static PRIORITY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\[(Hi(?:gh)?|Med(?:ium)?|Lo(?:w)?)\]\s*").unwrap());

/// Priority tag anywhere in a line, tolerating `*` emphasis variance
static STRIP_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*{0,2}\[(Hi(?:gh)?|Med(?:ium)?|Lo(?:w)?)\]\*{0,2}\s*").unwrap()
});

const OPEN_MARKER: &str = "- [ ]";
const CLOSED_MARKER: &str = "- [x]";

/// Headings that end parsing; everything below them is ignored
const CUTOFF_HEADINGS: [&str; 2] = ["done", "waiting on"];

/// Markers for tasks owned by someone other than the user
const THEIR_ACTION_MARKERS: [&str; 2] = ["[THEIR ACTION]", "[TONY'S ACTION]"];

/// Heading substring used when the requested section is absent
const FALLBACK_SECTION_HINT: &str = "Operations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Hi,
    Med,
    Lo,
}

impl Priority {
    /// Parse an exact tag value ("Hi", "Med", "Lo"); anything else is rejected
    pub fn from_exact(value: &str) -> Option<Self> {
        match value {
            "Hi" => Some(Self::Hi),
            "Med" => Some(Self::Med),
            "Lo" => Some(Self::Lo),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hi => "Hi",
            Self::Med => "Med",
            Self::Lo => "Lo",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Hi => 0,
            Self::Med => 1,
            Self::Lo => 2,
        }
    }
}

/// One open checklist line
#[derive(Debug, Clone)]
pub struct Task {
    /// Display text with the priority tag and emphasis stripped
    pub text: String,
    /// Exact text after the checkbox marker; the mutation lookup key
    pub raw: String,
    pub priority: Priority,
    /// Task belongs to someone else; rendered without a complete control
    pub their_action: bool,
}

/// A heading-delimited group of tasks
#[derive(Debug, Clone)]
pub struct Section {
    /// Shortened display label
    pub name: String,
    /// Heading text as written; the mutation key for inserts
    pub raw_name: String,
    pub is_personal: bool,
    pub tasks: Vec<Task>,
}

/// Split a task line into priority and display text.
/// All emphasis characters are dropped first, then a leading bracketed tag is
/// matched; an unrecognized tag is left in the text and the priority defaults
/// to Lo.
pub fn extract_priority(task_raw: &str) -> (Priority, String) {
    let cleaned = task_raw.replace('*', "");
    let cleaned = cleaned.trim();
    if let Some(caps) = PRIORITY_TAG_RE.captures(cleaned) {
        let tag = caps
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_default();
        let priority = if tag.starts_with("hi") {
            Priority::Hi
        } else if tag.starts_with("med") {
            Priority::Med
        } else {
            Priority::Lo
        };
        let tag_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        return (priority, cleaned[tag_end..].to_string());
    }
    (Priority::Lo, cleaned.to_string())
}

/// Shorten a raw section heading to its display label
pub fn shorten_section(raw_name: &str) -> String {
    match raw_name {
        "Work — IR/Fundraising" => "IR / FUNDRAISING".to_string(),
        "Work — Operations" => "OPERATIONS".to_string(),
        "Work — Finance" => "FINANCE".to_string(),
        "Work — IT/Systems" => "IT / SYSTEMS".to_string(),
        "Personal — Home" => "HOME".to_string(),
        "Personal — Arboleda (Colombia property)" => "ARBOLEDA".to_string(),
        "Personal — Finance" => "PERSONAL FINANCE".to_string(),
        "Personal — Fitness" => "FITNESS".to_string(),
        "Personal — Photography" => "PHOTOGRAPHY".to_string(),
        other => other
            .strip_prefix("Work — ")
            .or_else(|| other.strip_prefix("Personal — "))
            .unwrap_or(other)
            .to_uppercase(),
    }
}

fn is_cutoff_heading(heading: &str) -> bool {
    let lowered = heading.to_lowercase();
    CUTOFF_HEADINGS.iter().any(|c| lowered == *c)
}

fn is_their_action(text: &str) -> bool {
    let upper = text.to_uppercase();
    THEIR_ACTION_MARKERS.iter().any(|m| upper.contains(m))
}

/// Parse the full task file text into ordered sections.
///
/// Sections appear in file order; tasks inside a section are sorted by
/// priority (Hi, Med, Lo) with file order preserved among equals. Sections
/// that collected no open tasks are dropped.
pub fn parse_sections(content: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<String> = None;
    let mut tasks: Vec<Task> = Vec::new();

    let mut flush = |current: &mut Option<String>, tasks: &mut Vec<Task>, out: &mut Vec<Section>| {
        if let Some(raw_name) = current.take() {
            if !tasks.is_empty() {
                let mut section_tasks = std::mem::take(tasks);
                section_tasks.sort_by_key(|t| t.priority.rank());
                out.push(Section {
                    name: shorten_section(&raw_name),
                    raw_name: raw_name.clone(),
                    is_personal: raw_name.to_lowercase().contains("personal"),
                    tasks: section_tasks,
                });
            }
        }
        tasks.clear();
    };

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            flush(&mut current, &mut tasks, &mut sections);
            let heading = heading.trim();
            if is_cutoff_heading(heading) {
                current = None;
                break;
            }
            current = Some(heading.to_string());
            continue;
        }

        let trimmed = line.trim();
        if current.is_some() {
            if let Some(rest) = trimmed.strip_prefix(OPEN_MARKER) {
                let raw = rest.trim().to_string();
                let (priority, text) = extract_priority(&raw);
                let their_action = is_their_action(&text);
                tasks.push(Task {
                    text,
                    raw,
                    priority,
                    their_action,
                });
            }
        }
    }

    flush(&mut current, &mut tasks, &mut sections);
    sections
}

/// Repository over the task and inbox files.
///
/// Every mutation re-reads the file, edits an in-memory line list, and
/// rewrites the whole file. A crash mid-write can corrupt the file; accepted
/// limitation for a single-writer tool.
pub struct TaskStore {
    tasks_path: PathBuf,
    inbox_path: PathBuf,
    memory_dir: PathBuf,
}

impl TaskStore {
    pub fn new(tasks_path: PathBuf, inbox_path: PathBuf, memory_dir: PathBuf) -> Self {
        Self {
            tasks_path,
            inbox_path,
            memory_dir,
        }
    }

    pub fn tasks_path(&self) -> &PathBuf {
        &self.tasks_path
    }

    /// Parse the current task file. Missing file yields no sections.
    pub fn sections(&self) -> Result<Vec<Section>, StoreError> {
        match std::fs::read_to_string(&self.tasks_path) {
            Ok(content) => Ok(parse_sections(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn read_for_mutation(&self) -> Result<String, StoreError> {
        match std::fs::read_to_string(&self.tasks_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound("Task file not found".to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn write_lines(&self, lines: Vec<String>) -> Result<(), StoreError> {
        std::fs::write(&self.tasks_path, lines.join("\n"))?;
        Ok(())
    }

    /// Mark the first open task whose raw text matches exactly as done.
    /// Only the checkbox marker on that line changes.
    pub fn complete(&self, raw_text: &str) -> Result<(), StoreError> {
        let content = self.read_for_mutation()?;
        let mut lines: Vec<String> = content.split('\n').map(String::from).collect();

        for line in lines.iter_mut() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix(OPEN_MARKER) {
                if rest.trim() == raw_text {
                    *line = line.replacen(OPEN_MARKER, CLOSED_MARKER, 1);
                    self.write_lines(lines)?;
                    log::info!("[STORE] Completed task: {}", raw_text);
                    return Ok(());
                }
            }
        }

        Err(StoreError::NotFound("Task not found".to_string()))
    }

    /// Insert a new open task line under a section heading.
    ///
    /// Insertion falls back in three tiers: the named section, any heading
    /// containing the fallback category, then the first heading in the file.
    /// A missing file is created with just the requested heading first.
    /// The priority is clamped to Med when it is not one of Hi/Med/Lo.
    pub fn add(&self, text: &str, priority: &str, section: &str) -> Result<(), StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::Invalid("No task text provided".to_string()));
        }
        let priority = Priority::from_exact(priority).unwrap_or(Priority::Med);

        if !self.tasks_path.exists() {
            if let Some(parent) = self.tasks_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.tasks_path, format!("## {}\n\n", section))?;
        }

        let content = std::fs::read_to_string(&self.tasks_path)?;
        let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
        let new_line = format!("- [ ] **[{}]** {}", priority.label(), text);

        let mut insert_at = lines
            .iter()
            .position(|l| l.strip_prefix("## ").map(str::trim) == Some(section));
        if insert_at.is_none() {
            insert_at = lines
                .iter()
                .position(|l| l.starts_with("## ") && l.contains(FALLBACK_SECTION_HINT));
        }
        if insert_at.is_none() {
            insert_at = lines.iter().position(|l| l.starts_with("## "));
        }

        match insert_at {
            Some(i) => {
                lines.insert(i + 1, new_line);
                self.write_lines(lines)?;
                log::info!("[STORE] Added task under {}: {}", section, text);
                Ok(())
            }
            None => Err(StoreError::NotFound("Could not find section".to_string())),
        }
    }

    /// Rewrite the first matching open task line with a new priority tag,
    /// preserving leading indentation. Unlike add, an unknown priority is
    /// rejected rather than clamped.
    pub fn reprioritize(&self, raw_text: &str, priority: &str) -> Result<(), StoreError> {
        let priority = Priority::from_exact(priority)
            .ok_or_else(|| StoreError::Invalid("Invalid priority".to_string()))?;

        let content = self.read_for_mutation()?;
        let mut lines: Vec<String> = content.split('\n').map(String::from).collect();

        for line in lines.iter_mut() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix(OPEN_MARKER) {
                if rest.trim() == raw_text {
                    let cleaned = STRIP_TAG_RE.replace_all(rest.trim(), "");
                    let cleaned = cleaned.trim().to_string();
                    let indent = &line[..line.len() - line.trim_start().len()];
                    *line = format!("{}- [ ] **[{}]** {}", indent, priority.label(), cleaned);
                    self.write_lines(lines)?;
                    log::info!("[STORE] Set priority {} on: {}", priority.label(), cleaned);
                    return Ok(());
                }
            }
        }

        Err(StoreError::NotFound("Task not found".to_string()))
    }

    /// Append a tagged capture line to the inbox file
    pub fn append_inbox(&self, message: &str, intent: &str) -> Result<(), StoreError> {
        let today = chrono::Local::now().format("%Y-%m-%d");
        let entry = format!("- [SLACK ASSISTANT {} {}]: {}\n", intent, today, message);
        if let Some(parent) = self.inbox_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        append_to_file(&self.inbox_path, &entry)?;
        Ok(())
    }

    /// Append a dated note section to a file under the memory directory
    pub fn append_memory_note(&self, file: &str, note: &str) -> Result<(), StoreError> {
        if file.contains("..") {
            return Err(StoreError::Invalid("Invalid memory file path".to_string()));
        }
        let path = self.memory_dir.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let today = chrono::Local::now().format("%Y-%m-%d");
        let entry = format!("\n## Note — {}\n{}\n", today, note);
        append_to_file(&path, &entry)?;
        Ok(())
    }
}

fn append_to_file(path: &PathBuf, entry: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(entry.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &std::path::Path) -> TaskStore {
        TaskStore::new(
            dir.join("TASKS.md"),
            dir.join("inbox.md"),
            dir.join("memory"),
        )
    }

    #[test]
    fn test_parse_sections_in_file_order() {
        let content = r#"# AREC Tasks

## Work — Finance
- [ ] **[Hi]** Review LPA draft
- [ ] Send wire instructions

## Personal — Home
- [ ] Call the plumber
"#;
        let sections = parse_sections(content);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].raw_name, "Work — Finance");
        assert_eq!(sections[0].name, "FINANCE");
        assert!(!sections[0].is_personal);
        assert_eq!(sections[1].raw_name, "Personal — Home");
        assert!(sections[1].is_personal);
        assert_eq!(sections[1].tasks.len(), 1);
    }

    #[test]
    fn test_parse_priority_tags() {
        let content = "## Work — Operations\n- [ ] **[Med]** Send wire instructions\n- [ ] [hi] Chase signature\n- [ ] **[Low]** File receipts\n";
        let sections = parse_sections(content);
        let tasks = &sections[0].tasks;
        assert_eq!(tasks[0].priority, Priority::Hi);
        assert_eq!(tasks[0].text, "Chase signature");
        assert_eq!(tasks[1].priority, Priority::Med);
        assert_eq!(tasks[1].text, "Send wire instructions");
        assert_eq!(tasks[2].priority, Priority::Lo);
    }

    #[test]
    fn test_parse_no_tag_defaults_lo() {
        let content = "## Work — Operations\n- [ ] Call the bank\n";
        let sections = parse_sections(content);
        assert_eq!(sections[0].tasks[0].priority, Priority::Lo);
        assert_eq!(sections[0].tasks[0].text, "Call the bank");
        assert_eq!(sections[0].tasks[0].raw, "Call the bank");
    }

    #[test]
    fn test_parse_malformed_tag_kept_in_text() {
        let content = "## Work — Operations\n- [ ] **[Urgent]** Wire the deposit\n";
        let sections = parse_sections(content);
        assert_eq!(sections[0].tasks[0].priority, Priority::Lo);
        assert_eq!(sections[0].tasks[0].text, "[Urgent] Wire the deposit");
    }

    #[test]
    fn test_parse_done_cutoff() {
        let content = r#"## Work — Finance
- [ ] Review LPA draft

## Work — Operations
- [ ] Book flights

## Done
- [x] Old thing

## Work — IT/Systems
- [ ] Should never appear
"#;
        let sections = parse_sections(content);
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.raw_name != "Work — IT/Systems"));
    }

    #[test]
    fn test_parse_waiting_on_cutoff_case_insensitive() {
        let content = "## Work — Finance\n- [ ] Task one\n\n## WAITING ON\n- [ ] Their reply\n";
        let sections = parse_sections(content);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn test_parse_stable_priority_sort() {
        let content = "## Work — Operations\n- [ ] **[Lo]** a\n- [ ] **[Hi]** b\n- [ ] c\n- [ ] **[Hi]** d\n";
        let tasks = &parse_sections(content)[0].tasks;
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_parse_drops_empty_sections() {
        let content = "## Work — Finance\n\n## Work — Operations\n- [ ] Only task\n";
        let sections = parse_sections(content);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].raw_name, "Work — Operations");
    }

    #[test]
    fn test_parse_their_action_marker() {
        let content = "## Work — Finance\n- [ ] [their action] Countersign docs\n- [ ] Own task\n";
        let tasks = &parse_sections(content)[0].tasks;
        assert!(tasks.iter().any(|t| t.their_action));
        assert!(tasks.iter().any(|t| !t.their_action));
    }

    #[test]
    fn test_shorten_section_known_and_fallback() {
        assert_eq!(shorten_section("Work — IR/Fundraising"), "IR / FUNDRAISING");
        assert_eq!(
            shorten_section("Personal — Arboleda (Colombia property)"),
            "ARBOLEDA"
        );
        assert_eq!(shorten_section("Work — Legal"), "LEGAL");
        assert_eq!(shorten_section("Errands"), "ERRANDS");
    }

    #[test]
    fn test_sections_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.sections().unwrap().is_empty());
    }

    #[test]
    fn test_complete_rewrites_exactly_one_line() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let original = "## Work — Finance\n- [ ] Call John about Fund II\n- [ ] Other task\n";
        std::fs::write(store.tasks_path(), original).unwrap();

        store.complete("Call John about Fund II").unwrap();

        let after = std::fs::read_to_string(store.tasks_path()).unwrap();
        assert_eq!(
            after,
            "## Work — Finance\n- [x] Call John about Fund II\n- [ ] Other task\n"
        );

        // No open match remains for the same text
        let err = store.complete("Call John about Fund II").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_complete_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let err = store.complete("Anything").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_add_inserts_after_named_section() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(
            store.tasks_path(),
            "## Work — Finance\n- [ ] Existing\n\n## Work — Operations\n",
        )
        .unwrap();

        store.add("Review LPA draft", "Hi", "Work — Finance").unwrap();

        let after = std::fs::read_to_string(store.tasks_path()).unwrap();
        let lines: Vec<&str> = after.split('\n').collect();
        assert_eq!(lines[0], "## Work — Finance");
        assert_eq!(lines[1], "- [ ] **[Hi]** Review LPA draft");
    }

    #[test]
    fn test_add_falls_back_to_operations_heading() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(
            store.tasks_path(),
            "## Work — Finance\n\n## Work — Operations\n",
        )
        .unwrap();

        store.add("Order badges", "Lo", "Work — Facilities").unwrap();

        let after = std::fs::read_to_string(store.tasks_path()).unwrap();
        let lines: Vec<&str> = after.split('\n').collect();
        assert_eq!(lines[2], "## Work — Operations");
        assert_eq!(lines[3], "- [ ] **[Lo]** Order badges");
    }

    #[test]
    fn test_add_falls_back_to_first_heading() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.tasks_path(), "intro text\n## Personal — Home\n").unwrap();

        store.add("Fix gate", "Med", "Work — Facilities").unwrap();

        let after = std::fs::read_to_string(store.tasks_path()).unwrap();
        assert!(after.contains("## Personal — Home\n- [ ] **[Med]** Fix gate"));
    }

    #[test]
    fn test_add_creates_missing_file_with_section() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.add("First task", "Hi", "Work — Finance").unwrap();

        let after = std::fs::read_to_string(store.tasks_path()).unwrap();
        assert!(after.starts_with("## Work — Finance\n- [ ] **[Hi]** First task"));
    }

    #[test]
    fn test_add_clamps_invalid_priority_to_med() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.tasks_path(), "## Work — Operations\n").unwrap();

        store.add("Ship decks", "URGENT", "Work — Operations").unwrap();

        let after = std::fs::read_to_string(store.tasks_path()).unwrap();
        assert!(after.contains("- [ ] **[Med]** Ship decks"));
    }

    #[test]
    fn test_add_without_any_heading_is_not_found() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.tasks_path(), "just some prose\nno headings here\n").unwrap();

        let err = store.add("Task", "Hi", "Work — Finance").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_add_rejects_empty_text() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let err = store.add("   ", "Hi", "Work — Finance").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_reprioritize_replaces_tag_and_keeps_indent() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(
            store.tasks_path(),
            "## Work — Finance\n  - [ ] **[Lo]** Send wire instructions\n",
        )
        .unwrap();

        store
            .reprioritize("**[Lo]** Send wire instructions", "Hi")
            .unwrap();

        let after = std::fs::read_to_string(store.tasks_path()).unwrap();
        assert!(after.contains("  - [ ] **[Hi]** Send wire instructions"));
    }

    #[test]
    fn test_reprioritize_rejects_unknown_priority() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.tasks_path(), "## W\n- [ ] Task\n").unwrap();

        let err = store.reprioritize("Task", "Critical").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_reprioritize_unmatched_text_is_not_found() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.tasks_path(), "## W\n- [ ] Task\n").unwrap();

        let err = store.reprioritize("Different task", "Hi").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_append_inbox_writes_tagged_line() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.append_inbox("remember the deck", "QUERY").unwrap();

        let inbox = std::fs::read_to_string(dir.path().join("inbox.md")).unwrap();
        assert!(inbox.starts_with("- [SLACK ASSISTANT QUERY "));
        assert!(inbox.trim_end().ends_with("]: remember the deck"));
    }

    #[test]
    fn test_append_memory_note_creates_dated_section() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store
            .append_memory_note("fund-ii.md", "Soft circle at $40M")
            .unwrap();

        let note = std::fs::read_to_string(dir.path().join("memory/fund-ii.md")).unwrap();
        assert!(note.contains("## Note — "));
        assert!(note.contains("Soft circle at $40M"));
    }

    #[test]
    fn test_append_memory_note_rejects_traversal() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let err = store.append_memory_note("../escape.md", "nope").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }
}
