//! Memory file aggregation
//!
//! Pulls the markdown memory files into one in-memory bundle for prompt
//! assembly. Missing files read as empty, every field carries a fixed
//! character cap, and nothing is cached. The investor table and activity
//! scans back the dashboard page and read the same files.

use super::tasks::parse_sections;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::config::MemoryConfig;

static TASK_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"- \[.\] ").unwrap());

const FUND_CAP: usize = 2000;
const COMPANY_CAP: usize = 1500;
const CONTEXT_CAP: usize = 1000;
const PERSON_BIO_CAP: usize = 400;
const INBOX_ITEM_CAP: usize = 10;
const ACTIVITY_CAP: usize = 8;

/// Shorthand markers rewritten before task text reaches a prompt
const TASK_SUBSTITUTIONS: [(&str, &str); 2] = [
    ("_(their action)_", "[THEIR ACTION]"),
    ("_(Tony action)_", "[TONY'S ACTION]"),
];

/// Open tasks under one heading, tag text preserved
#[derive(Debug, Clone)]
pub struct TaskGroup {
    pub section: String,
    pub tasks: Vec<String>,
}

/// Everything the prompt builders need, rebuilt on every call
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    pub open_tasks: Vec<TaskGroup>,
    pub inbox_items: Vec<String>,
    pub fund: String,
    pub company: String,
    pub claude_context: String,
    /// Person display name to truncated biography, filename order
    pub people: Vec<(String, String)>,
}

impl MemoryBundle {
    pub fn task_count(&self) -> usize {
        self.open_tasks.iter().map(|g| g.tasks.len()).sum()
    }
}

/// One row of the glossary investor table
#[derive(Debug, Clone)]
pub struct Investor {
    pub name: String,
    pub investor_type: String,
    pub status: String,
    pub notes: String,
}

/// An inbox or task line that mentions a known investor
#[derive(Debug, Clone)]
pub struct InvestorActivity {
    pub text: String,
    pub source: String,
}

fn cap(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn read_or_empty(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            log::warn!("[MEMORY] Could not read {}: {}", path.display(), e);
            String::new()
        }
    }
}

fn extract_open_tasks(tasks_md: &str) -> Vec<TaskGroup> {
    parse_sections(tasks_md)
        .into_iter()
        .map(|section| TaskGroup {
            section: section.raw_name,
            tasks: section
                .tasks
                .into_iter()
                .map(|t| {
                    let mut text = t.raw;
                    for (from, to) in TASK_SUBSTITUTIONS {
                        text = text.replace(from, to);
                    }
                    text
                })
                .collect(),
        })
        .collect()
}

fn extract_inbox_items(inbox_md: &str) -> Vec<String> {
    inbox_md
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| line.trim().to_string())
        .take(INBOX_ITEM_CAP)
        .collect()
}

fn load_people_files(people_dir: &Path) -> Vec<(String, String)> {
    let entries = match std::fs::read_dir(people_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<std::path::PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    files.sort();

    files
        .into_iter()
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            let name = title_case(&stem.replace('-', " "));
            let bio = cap(&read_or_empty(&path), PERSON_BIO_CAP);
            Some((name, bio))
        })
        .collect()
}

/// Read-only view over the memory directory
pub struct MemoryReader {
    cfg: MemoryConfig,
}

impl MemoryReader {
    pub fn new(cfg: MemoryConfig) -> Self {
        Self { cfg }
    }

    /// Assemble the full bundle from disk
    pub fn load_all(&self) -> MemoryBundle {
        MemoryBundle {
            open_tasks: extract_open_tasks(&read_or_empty(&self.cfg.tasks_path())),
            inbox_items: extract_inbox_items(&read_or_empty(&self.cfg.inbox_path())),
            fund: cap(&read_or_empty(&self.cfg.fund_path()), FUND_CAP),
            company: cap(&read_or_empty(&self.cfg.company_path()), COMPANY_CAP),
            claude_context: cap(&read_or_empty(&self.cfg.context_path()), CONTEXT_CAP),
            people: load_people_files(&self.cfg.people_path()),
        }
    }

    /// Parse the investor universe table out of the glossary file.
    /// Rows outside the `## Investor Universe` section, separator rows, the
    /// header row, and rows with fewer than four cells are all skipped.
    pub fn investors(&self) -> Vec<Investor> {
        let content = read_or_empty(&self.cfg.glossary_path());
        let mut investors = Vec::new();
        let mut in_table = false;

        for line in content.lines() {
            if line.contains("## Investor Universe") {
                in_table = true;
                continue;
            }
            if !in_table {
                continue;
            }
            if line.starts_with("##") && !line.contains("Investor Universe") {
                break;
            }
            if !line.starts_with('|') || line.starts_with("|---") {
                continue;
            }
            let cells: Vec<&str> = line.split('|').collect();
            if cells.len() < 3 {
                continue;
            }
            let parts: Vec<String> = cells[1..cells.len() - 1]
                .iter()
                .map(|p| p.trim().to_string())
                .collect();
            if parts.len() >= 4 && parts[0] != "Name" {
                investors.push(Investor {
                    name: parts[0].clone(),
                    investor_type: parts[1].clone(),
                    status: parts[2].clone(),
                    notes: parts[3].clone(),
                });
            }
        }

        investors
    }

    /// Scan the inbox and task files for lines mentioning any of the given
    /// investor names, capped to the most recent matches in file order.
    pub fn recent_investor_activity(&self, names: &[String]) -> Vec<InvestorActivity> {
        let mut activity = Vec::new();

        let inbox = read_or_empty(&self.cfg.inbox_path());
        for line in inbox.lines() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let lowered = line.to_lowercase();
            if names.iter().any(|n| lowered.contains(&n.to_lowercase())) {
                activity.push(InvestorActivity {
                    text: line.trim().to_string(),
                    source: "INBOX".to_string(),
                });
            }
        }

        let tasks = read_or_empty(&self.cfg.tasks_path());
        for line in tasks.lines() {
            let stripped = line.trim();
            if !stripped.starts_with("- [") {
                continue;
            }
            let task_text = TASK_MARKER_RE.replace_all(stripped, "").to_string();
            let lowered = task_text.to_lowercase();
            if names.iter().any(|n| lowered.contains(&n.to_lowercase())) {
                activity.push(InvestorActivity {
                    text: task_text,
                    source: "TASK".to_string(),
                });
            }
        }

        activity.truncate(ACTIVITY_CAP);
        activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn reader_in(dir: &std::path::Path) -> MemoryReader {
        MemoryReader::new(MemoryConfig::new(dir.to_path_buf()))
    }

    #[test]
    fn test_load_all_missing_files_is_empty_bundle() {
        let dir = tempdir().unwrap();
        let bundle = reader_in(dir.path()).load_all();
        assert!(bundle.open_tasks.is_empty());
        assert!(bundle.inbox_items.is_empty());
        assert!(bundle.fund.is_empty());
        assert!(bundle.people.is_empty());
        assert_eq!(bundle.task_count(), 0);
    }

    #[test]
    fn test_load_all_groups_tasks_and_rewrites_markers() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("TASKS.md"),
            "## Work — Finance\n- [ ] **[Hi]** Review LPA draft\n- [ ] _(their action)_ Countersign\n\n## Done\n- [x] Old\n",
        )
        .unwrap();

        let bundle = reader_in(dir.path()).load_all();
        assert_eq!(bundle.open_tasks.len(), 1);
        let group = &bundle.open_tasks[0];
        assert_eq!(group.section, "Work — Finance");
        assert_eq!(group.tasks[0], "**[Hi]** Review LPA draft");
        assert_eq!(group.tasks[1], "[THEIR ACTION] Countersign");
        assert_eq!(bundle.task_count(), 2);
    }

    #[test]
    fn test_inbox_items_skip_headers_and_cap() {
        let dir = tempdir().unwrap();
        let mut inbox = String::from("# Inbox\n\n");
        for i in 0..12 {
            inbox.push_str(&format!("- capture {}\n", i));
        }
        std::fs::write(dir.path().join("inbox.md"), inbox).unwrap();

        let bundle = reader_in(dir.path()).load_all();
        assert_eq!(bundle.inbox_items.len(), 10);
        assert_eq!(bundle.inbox_items[0], "- capture 0");
    }

    #[test]
    fn test_context_blobs_are_capped() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("memory")).unwrap();
        std::fs::write(dir.path().join("memory/fund-ii.md"), "x".repeat(2500)).unwrap();
        std::fs::write(dir.path().join("memory/company.md"), "y".repeat(1600)).unwrap();
        std::fs::write(dir.path().join("memory/claude-context.md"), "z".repeat(900)).unwrap();

        let bundle = reader_in(dir.path()).load_all();
        assert_eq!(bundle.fund.len(), 2000);
        assert_eq!(bundle.company.len(), 1500);
        assert_eq!(bundle.claude_context.len(), 900);
    }

    #[test]
    fn test_people_names_from_filenames() {
        let dir = tempdir().unwrap();
        let people = dir.path().join("memory/people");
        std::fs::create_dir_all(&people).unwrap();
        std::fs::write(people.join("maria-lopez.md"), "b".repeat(600)).unwrap();
        std::fs::write(people.join("bob.md"), "CFO at Meridian").unwrap();
        std::fs::write(people.join("notes.txt"), "not markdown").unwrap();

        let bundle = reader_in(dir.path()).load_all();
        assert_eq!(bundle.people.len(), 2);
        assert_eq!(bundle.people[0].0, "Bob");
        assert_eq!(bundle.people[1].0, "Maria Lopez");
        assert_eq!(bundle.people[1].1.len(), 400);
    }

    const GLOSSARY: &str = r#"# Glossary

## Investor Universe

| Name | Type | Status | Notes |
|---|---|---|---|
| Meridian Capital | Family Office | Committed | $5M in docs |
| Harbor Point | RIA | Soft circle | Wants Q3 call |
| Short Row | Fund |
| Acme Pension | Pension | Passed | Too small |

## Terms
- LPA: limited partnership agreement
"#;

    #[test]
    fn test_investors_parse_table_rows() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("memory")).unwrap();
        std::fs::write(dir.path().join("memory/glossary.md"), GLOSSARY).unwrap();

        let investors = reader_in(dir.path()).investors();
        assert_eq!(investors.len(), 3);
        assert_eq!(investors[0].name, "Meridian Capital");
        assert_eq!(investors[0].investor_type, "Family Office");
        assert_eq!(investors[1].status, "Soft circle");
        assert_eq!(investors[2].notes, "Too small");
    }

    #[test]
    fn test_investors_stop_at_next_section() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("memory")).unwrap();
        std::fs::write(
            dir.path().join("memory/glossary.md"),
            "## Investor Universe\n| A | B | C | D |\n## Terms\n| E | F | G | H |\n",
        )
        .unwrap();

        let investors = reader_in(dir.path()).investors();
        assert_eq!(investors.len(), 1);
        assert_eq!(investors[0].name, "A");
    }

    #[test]
    fn test_investors_missing_glossary_is_empty() {
        let dir = tempdir().unwrap();
        assert!(reader_in(dir.path()).investors().is_empty());
    }

    #[test]
    fn test_recent_activity_matches_and_caps() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("inbox.md"),
            "# Inbox\n- call with meridian capital went well\n- unrelated note\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("TASKS.md"),
            "## Work — IR/Fundraising\n- [ ] **[Hi]** Send Meridian Capital the data room\n- [x] Harbor Point intro\n- [ ] Buy stamps\n",
        )
        .unwrap();

        let names = vec!["Meridian Capital".to_string(), "Harbor Point".to_string()];
        let activity = reader_in(dir.path()).recent_investor_activity(&names);

        assert_eq!(activity.len(), 3);
        assert_eq!(activity[0].source, "INBOX");
        assert!(activity[0].text.contains("meridian"));
        assert_eq!(activity[1].source, "TASK");
        assert_eq!(activity[1].text, "**[Hi]** Send Meridian Capital the data room");
        assert_eq!(activity[2].text, "Harbor Point intro");
    }
}
