//! Meeting summary parsing, discovery, and archival
//!
//! Meeting files are named `YYYY-MM-DD*.md` and live in one directory. The
//! parser pulls the H1 title, the bold metadata labels, and four known `## `
//! sections; anything else in the file is ignored. Archival renames the file
//! into an archive subdirectory, which removes it from future loads.

use super::StoreError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap());

static SOURCE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((https?://[^)]+)\)").unwrap());

/// Bold owner name followed by an em-dash, en-dash, or hyphen separator
static OWNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*(.+?)\*\*\s*[—–-]\s*(.*)").unwrap());

/// One checkbox line from an Action Items section
#[derive(Debug, Clone)]
pub struct ActionItem {
    /// Owner name from the bold prefix, empty when the line has none
    pub person: String,
    pub text: String,
    pub done: bool,
}

/// One parsed meeting file
#[derive(Debug, Clone)]
pub struct MeetingNote {
    /// Source filename; the identity key for archival
    pub filename: String,
    pub title: String,
    pub date: String,
    pub source_url: String,
    pub attendees: String,
    pub summary: String,
    pub decisions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub open_questions: Vec<String>,
}

fn parse_action_line(item_text: &str, done: bool) -> ActionItem {
    if let Some(caps) = OWNER_RE.captures(item_text) {
        return ActionItem {
            person: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
            text: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            done,
        };
    }
    ActionItem {
        person: String::new(),
        text: item_text.to_string(),
        done,
    }
}

/// Parse one meeting file's text.
///
/// A file with none of the known sections still yields a record with empty
/// lists, never an error.
pub fn parse_meeting(content: &str, filename: &str) -> MeetingNote {
    let mut note = MeetingNote {
        filename: filename.to_string(),
        title: String::new(),
        date: String::new(),
        source_url: String::new(),
        attendees: String::new(),
        summary: String::new(),
        decisions: Vec::new(),
        action_items: Vec::new(),
        open_questions: Vec::new(),
    };

    for line in content.lines() {
        if line.starts_with("# ") && !line.starts_with("## ") {
            note.title = line[2..].trim().to_string();
            break;
        }
    }

    for line in content.lines() {
        let stripped = line.trim();
        if let Some(rest) = stripped.strip_prefix("**Date:**") {
            note.date = rest.trim().to_string();
        } else if stripped.starts_with("**Source:**") {
            if let Some(caps) = SOURCE_LINK_RE.captures(stripped) {
                note.source_url = caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
            }
        } else if let Some(rest) = stripped.strip_prefix("**Attendees:**") {
            note.attendees = rest.trim().to_string();
        }
    }

    let mut current: Option<String> = None;
    let mut buffer: Vec<String> = Vec::new();

    let mut save = |note: &mut MeetingNote, name: &str, lines: &[String]| match name {
        "Summary" => {
            note.summary = lines.join("\n").trim().to_string();
        }
        "Key Decisions" | "Open Questions" => {
            let items: Vec<String> = lines
                .iter()
                .map(|l| l.trim())
                .filter_map(|l| l.strip_prefix("- ").map(|s| s.to_string()))
                .collect();
            if name == "Key Decisions" {
                note.decisions = items;
            } else {
                note.open_questions = items;
            }
        }
        "Action Items" => {
            for l in lines {
                let stripped = l.trim();
                if let Some(rest) = stripped.strip_prefix("- [ ]") {
                    note.action_items.push(parse_action_line(rest.trim(), false));
                } else if let Some(rest) = stripped.strip_prefix("- [x]") {
                    note.action_items.push(parse_action_line(rest.trim(), true));
                }
            }
        }
        _ => {}
    };

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some(name) = current.take() {
                save(&mut note, &name, &buffer);
            }
            buffer.clear();
            current = Some(heading.trim().to_string());
            continue;
        }
        if current.is_some() {
            buffer.push(line.to_string());
        }
    }
    if let Some(name) = current.take() {
        save(&mut note, &name, &buffer);
    }

    note
}

/// Repository over the meeting summaries directory
pub struct MeetingStore {
    summaries_dir: PathBuf,
    archive_dir: PathBuf,
}

impl MeetingStore {
    pub fn new(summaries_dir: PathBuf, archive_dir: PathBuf) -> Self {
        Self {
            summaries_dir,
            archive_dir,
        }
    }

    /// Load parsed meetings from the lookback window, newest filename first.
    ///
    /// Files without a `YYYY-MM-DD` prefix, with unparseable dates, or older
    /// than the window are skipped silently. A missing directory yields an
    /// empty list.
    pub fn load_recent(&self, days_back: i64) -> Result<Vec<MeetingNote>, StoreError> {
        let entries = match std::fs::read_dir(&self.summaries_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut filenames: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .filter(|name| name.ends_with(".md"))
            .collect();
        filenames.sort_by(|a, b| b.cmp(a));

        let today = chrono::Local::now().date_naive();
        let mut meetings = Vec::new();

        for filename in filenames {
            let date_str = match DATE_PREFIX_RE.captures(&filename) {
                Some(caps) => caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                None => continue,
            };
            let file_date = match chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d") {
                Ok(d) => d,
                Err(_) => continue,
            };
            if (today - file_date).num_days() > days_back {
                continue;
            }

            match std::fs::read_to_string(self.summaries_dir.join(&filename)) {
                Ok(content) => meetings.push(parse_meeting(&content, &filename)),
                Err(e) => {
                    log::warn!("[MEETINGS] Skipping unreadable {}: {}", filename, e);
                    continue;
                }
            }
        }

        Ok(meetings)
    }

    /// Move a meeting file into the archive directory.
    /// Only the basename of the supplied filename is honored.
    pub fn archive(&self, filename: &str) -> Result<(), StoreError> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::Invalid("Invalid filename".to_string()))?;

        let source = self.summaries_dir.join(name);
        if !source.exists() {
            return Err(StoreError::NotFound("Meeting file not found".to_string()));
        }

        std::fs::create_dir_all(&self.archive_dir)?;
        std::fs::rename(&source, self.archive_dir.join(name))?;
        log::info!("[MEETINGS] Archived {}", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BOARD_SYNC: &str = r#"# Board Sync — Fund II

**Date:** January 15, 2024
**Source:** [Notion](https://notion.so/board-sync-2024-01-15)
**Attendees:** Oscar, Maria, Bob

## Summary
Walked the LP pipeline and the Q1 close plan.
Two commitments verbal, one in docs.

## Key Decisions
- Hold final close to June 30
- Bump the ops budget 5%

## Action Items
- [ ] **Maria** — send deck
- [x] **Bob** – update model
- [ ] **Ana** - book venue
- [ ] circulate minutes

## Open Questions
- Do we extend the GP commit?

## Parking Lot
- unrelated content
"#;

    #[test]
    fn test_parse_meeting_metadata_and_title() {
        let note = parse_meeting(BOARD_SYNC, "2024-01-15-board-sync.md");
        assert_eq!(note.title, "Board Sync — Fund II");
        assert_eq!(note.date, "January 15, 2024");
        assert_eq!(note.source_url, "https://notion.so/board-sync-2024-01-15");
        assert_eq!(note.attendees, "Oscar, Maria, Bob");
        assert_eq!(note.filename, "2024-01-15-board-sync.md");
    }

    #[test]
    fn test_parse_meeting_sections() {
        let note = parse_meeting(BOARD_SYNC, "2024-01-15-board-sync.md");
        assert!(note.summary.starts_with("Walked the LP pipeline"));
        assert_eq!(note.decisions.len(), 2);
        assert_eq!(note.decisions[0], "Hold final close to June 30");
        assert_eq!(note.open_questions, vec!["Do we extend the GP commit?"]);
    }

    #[test]
    fn test_parse_action_items_owner_variants() {
        let note = parse_meeting(BOARD_SYNC, "2024-01-15-board-sync.md");
        assert_eq!(note.action_items.len(), 4);

        let maria = &note.action_items[0];
        assert_eq!(maria.person, "Maria");
        assert_eq!(maria.text, "send deck");
        assert!(!maria.done);

        let bob = &note.action_items[1];
        assert_eq!(bob.person, "Bob");
        assert_eq!(bob.text, "update model");
        assert!(bob.done);

        let ana = &note.action_items[2];
        assert_eq!(ana.person, "Ana");
        assert_eq!(ana.text, "book venue");

        let ownerless = &note.action_items[3];
        assert_eq!(ownerless.person, "");
        assert_eq!(ownerless.text, "circulate minutes");
    }

    #[test]
    fn test_parse_meeting_without_sections_yields_empty_lists() {
        let note = parse_meeting("# Quick Chat\n\nJust notes, no structure.\n", "x.md");
        assert_eq!(note.title, "Quick Chat");
        assert!(note.summary.is_empty());
        assert!(note.decisions.is_empty());
        assert!(note.action_items.is_empty());
        assert!(note.open_questions.is_empty());
    }

    #[test]
    fn test_unrecognized_sections_are_dropped() {
        let note = parse_meeting(BOARD_SYNC, "2024-01-15-board-sync.md");
        assert!(!note.summary.contains("unrelated content"));
        assert!(!note.decisions.iter().any(|d| d.contains("unrelated")));
    }

    fn write_meeting(dir: &std::path::Path, name: &str) {
        std::fs::write(dir.join(name), format!("# {}\n\n## Summary\nnotes\n", name)).unwrap();
    }

    #[test]
    fn test_load_recent_filters_window_and_bad_names() {
        let dir = tempdir().unwrap();
        let store = MeetingStore::new(dir.path().to_path_buf(), dir.path().join("archive"));

        let today = chrono::Local::now().date_naive();
        let recent = format!("{}-client-sync.md", today.format("%Y-%m-%d"));
        let stale = format!(
            "{}-old-sync.md",
            (today - chrono::Duration::days(30)).format("%Y-%m-%d")
        );
        write_meeting(dir.path(), &recent);
        write_meeting(dir.path(), &stale);
        write_meeting(dir.path(), "untitled-notes.md");
        write_meeting(dir.path(), "2024-99-99-impossible.md");

        let meetings = store.load_recent(7).unwrap();
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].filename, recent);
    }

    #[test]
    fn test_load_recent_newest_first() {
        let dir = tempdir().unwrap();
        let store = MeetingStore::new(dir.path().to_path_buf(), dir.path().join("archive"));

        let today = chrono::Local::now().date_naive();
        let newer = format!("{}-b-sync.md", today.format("%Y-%m-%d"));
        let older = format!(
            "{}-a-sync.md",
            (today - chrono::Duration::days(2)).format("%Y-%m-%d")
        );
        write_meeting(dir.path(), &older);
        write_meeting(dir.path(), &newer);

        let meetings = store.load_recent(7).unwrap();
        assert_eq!(meetings.len(), 2);
        assert_eq!(meetings[0].filename, newer);
        assert_eq!(meetings[1].filename, older);
    }

    #[test]
    fn test_load_recent_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = MeetingStore::new(dir.path().join("none"), dir.path().join("archive"));
        assert!(store.load_recent(7).unwrap().is_empty());
    }

    #[test]
    fn test_archive_moves_and_excludes_from_loads() {
        let dir = tempdir().unwrap();
        let store = MeetingStore::new(dir.path().to_path_buf(), dir.path().join("archive"));

        let today = chrono::Local::now().date_naive();
        let name = format!("{}-board-sync.md", today.format("%Y-%m-%d"));
        write_meeting(dir.path(), &name);
        assert_eq!(store.load_recent(7).unwrap().len(), 1);

        store.archive(&name).unwrap();

        assert!(dir.path().join("archive").join(&name).exists());
        assert!(!dir.path().join(&name).exists());
        assert!(store.load_recent(7).unwrap().is_empty());
    }

    #[test]
    fn test_archive_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = MeetingStore::new(dir.path().to_path_buf(), dir.path().join("archive"));
        let err = store.archive("2024-01-01-gone.md").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_archive_strips_directory_components() {
        let dir = tempdir().unwrap();
        let store = MeetingStore::new(dir.path().to_path_buf(), dir.path().join("archive"));

        let today = chrono::Local::now().date_naive();
        let name = format!("{}-offsite.md", today.format("%Y-%m-%d"));
        write_meeting(dir.path(), &name);

        store.archive(&format!("../../{}", name)).unwrap();
        assert!(dir.path().join("archive").join(&name).exists());
    }
}
