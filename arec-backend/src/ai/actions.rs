//! Action markers embedded in assistant replies
//!
//! The chat system prompt asks the model to emit `[ACTION:TASK|category|text]`
//! and `[ACTION:MEMORY|filepath|note]` markers when the user wants a change.
//! Parsing turns those into typed actions and strips them from the reply
//! before it is posted.

use crate::store::TaskStore;
use regex::Regex;
use std::sync::LazyLock;

static TASK_ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ACTION:TASK\|([^\|]+)\|([^\]]+)\]").unwrap());

static MEMORY_ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ACTION:MEMORY\|([^\|]+)\|([^\]]+)\]").unwrap());

/// Tasks created through chat get a middle priority tag
const ACTION_TASK_PRIORITY: &str = "Med";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddTask { category: String, text: String },
    UpdateMemory { file: String, note: String },
}

/// Extract all action markers from a model reply.
/// Returns the actions in marker order (tasks first, then memory updates)
/// and the reply text with every marker removed and trimmed.
pub fn parse_actions(response: &str) -> (Vec<Action>, String) {
    let mut actions = Vec::new();

    for caps in TASK_ACTION_RE.captures_iter(response) {
        if let (Some(category), Some(text)) = (caps.get(1), caps.get(2)) {
            actions.push(Action::AddTask {
                category: category.as_str().trim().to_string(),
                text: text.as_str().trim().to_string(),
            });
        }
    }

    for caps in MEMORY_ACTION_RE.captures_iter(response) {
        if let (Some(file), Some(note)) = (caps.get(1), caps.get(2)) {
            actions.push(Action::UpdateMemory {
                file: file.as_str().trim().to_string(),
                note: note.as_str().trim().to_string(),
            });
        }
    }

    let cleaned = TASK_ACTION_RE.replace_all(response, "");
    let cleaned = MEMORY_ACTION_RE.replace_all(&cleaned, "");

    (actions, cleaned.trim().to_string())
}

/// Apply parsed actions against the task store. A failed action is logged to
/// the inbox as an ERROR capture and does not stop the remaining actions.
pub fn execute_actions(actions: &[Action], store: &TaskStore) {
    for action in actions {
        match action {
            Action::AddTask { category, text } => {
                if let Err(e) = store.add(text, ACTION_TASK_PRIORITY, category) {
                    log::error!("[ACTIONS] Task action failed: {}", e);
                    if let Err(e) =
                        store.append_inbox(&format!("ERROR appending task: {}", e), "ERROR")
                    {
                        log::error!("[ACTIONS] Could not record task error: {}", e);
                    }
                } else {
                    log::info!("[ACTIONS] Added task to {}: {}", category, text);
                }
            }
            Action::UpdateMemory { file, note } => {
                if let Err(e) = store.append_memory_note(file, note) {
                    log::error!("[ACTIONS] Memory action failed: {}", e);
                    if let Err(e) =
                        store.append_inbox(&format!("ERROR updating memory: {}", e), "ERROR")
                    {
                        log::error!("[ACTIONS] Could not record memory error: {}", e);
                    }
                } else {
                    log::info!("[ACTIONS] Appended note to {}", file);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_task_marker() {
        let response =
            "Added it.\n[ACTION:TASK|Work — Finance|Review LPA draft]\n✓ Done";
        let (actions, cleaned) = parse_actions(response);
        assert_eq!(
            actions,
            vec![Action::AddTask {
                category: "Work — Finance".to_string(),
                text: "Review LPA draft".to_string(),
            }]
        );
        assert_eq!(cleaned, "Added it.\n\n✓ Done");
    }

    #[test]
    fn test_parse_memory_marker() {
        let response = "Noted. [ACTION:MEMORY|fund-ii.md|Meridian soft circled $5M] ✓ Done";
        let (actions, cleaned) = parse_actions(response);
        assert_eq!(
            actions,
            vec![Action::UpdateMemory {
                file: "fund-ii.md".to_string(),
                note: "Meridian soft circled $5M".to_string(),
            }]
        );
        assert!(!cleaned.contains("ACTION"));
        assert!(cleaned.ends_with("✓ Done"));
    }

    #[test]
    fn test_parse_mixed_markers_tasks_first() {
        let response = "[ACTION:MEMORY|company.md|New hire]\n[ACTION:TASK|Work — Operations|Order laptop]";
        let (actions, cleaned) = parse_actions(response);
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], Action::AddTask { .. }));
        assert!(matches!(actions[1], Action::UpdateMemory { .. }));
        assert_eq!(cleaned, "");
    }

    #[test]
    fn test_parse_no_markers() {
        let (actions, cleaned) = parse_actions("  Just an answer.  ");
        assert!(actions.is_empty());
        assert_eq!(cleaned, "Just an answer.");
    }

    fn store_in(dir: &std::path::Path) -> TaskStore {
        TaskStore::new(
            dir.join("TASKS.md"),
            dir.join("inbox.md"),
            dir.join("memory"),
        )
    }

    #[test]
    fn test_execute_add_task_writes_tagged_line() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(dir.path().join("TASKS.md"), "## Work — Operations\n").unwrap();

        execute_actions(
            &[Action::AddTask {
                category: "Work — Operations".to_string(),
                text: "Order laptop".to_string(),
            }],
            &store,
        );

        let tasks = std::fs::read_to_string(dir.path().join("TASKS.md")).unwrap();
        assert!(tasks.contains("- [ ] **[Med]** Order laptop"));
    }

    #[test]
    fn test_execute_update_memory_appends_note() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        execute_actions(
            &[Action::UpdateMemory {
                file: "fund-ii.md".to_string(),
                note: "Meridian soft circled $5M".to_string(),
            }],
            &store,
        );

        let note = std::fs::read_to_string(dir.path().join("memory/fund-ii.md")).unwrap();
        assert!(note.contains("Meridian soft circled $5M"));
    }

    #[test]
    fn test_execute_failure_is_captured_in_inbox() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        // A file with no headings makes the add fail with section-not-found
        std::fs::write(dir.path().join("TASKS.md"), "no headings here\n").unwrap();

        execute_actions(
            &[Action::AddTask {
                category: "Work — Operations".to_string(),
                text: "Order laptop".to_string(),
            }],
            &store,
        );

        let inbox = std::fs::read_to_string(dir.path().join("inbox.md")).unwrap();
        assert!(inbox.contains("[SLACK ASSISTANT ERROR "));
        assert!(inbox.contains("ERROR appending task:"));
    }
}
