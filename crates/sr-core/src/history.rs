//! Outcome history: an append-only log of settled spins, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::selection::SelectionMethod;

/// One settled spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique entry id.
    pub id: Uuid,
    /// Text of the decision the spin settled on.
    pub decision_text: String,
    /// When the spin settled.
    pub timestamp: DateTime<Utc>,
    /// Face rolled for the spin's duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolled_face: Option<u32>,
    /// Spin duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// How the outcome was reached.
    pub method: SelectionMethod,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn new(decision_text: impl Into<String>, method: SelectionMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            decision_text: decision_text.into(),
            timestamp: Utc::now(),
            rolled_face: None,
            duration_secs: None,
            method,
        }
    }

    /// Attach the rolled face and its duration.
    pub fn with_roll(mut self, face: u32, duration_secs: f64) -> Self {
        self.rolled_face = Some(face);
        self.duration_secs = Some(duration_secs);
        self
    }

    fn roll_label(&self) -> Option<String> {
        match (self.rolled_face, self.duration_secs) {
            (Some(face), Some(secs)) => Some(format!("face {face}, {secs}s")),
            (Some(face), None) => Some(format!("face {face}")),
            _ => None,
        }
    }
}

/// One page of history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage<'a> {
    /// Entries on this page, newest first.
    pub entries: &'a [HistoryEntry],
    /// 1-based page number that was requested.
    pub page: usize,
    /// Number of pages at this page size.
    pub total_pages: usize,
    /// Number of entries in the whole log.
    pub total_entries: usize,
}

/// Log of settled spins. Entries are never edited once appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap stored entries, which are expected newest first.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    /// Record an entry as the newest.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The newest entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slice out one page. Pages are 1-based; pages past the end (and a
    /// page size of 0) come back empty.
    pub fn page(&self, page: usize, page_size: usize) -> HistoryPage<'_> {
        let total_entries = self.entries.len();
        let total_pages = if page_size == 0 {
            0
        } else {
            total_entries.div_ceil(page_size)
        };
        let entries = if page == 0 || page_size == 0 {
            &self.entries[..0]
        } else {
            let start = (page - 1).saturating_mul(page_size).min(total_entries);
            let end = start.saturating_add(page_size).min(total_entries);
            &self.entries[start..end]
        };
        HistoryPage {
            entries,
            page,
            total_pages,
            total_entries,
        }
    }

    /// Export the log as markdown.
    pub fn export_markdown(&self) -> String {
        let mut out = String::from("# Spin History\n\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "- **{}** ({})",
                entry.decision_text, entry.method
            ));
            if let Some(roll) = entry.roll_label() {
                out.push_str(&format!(" — {roll}"));
            }
            out.push_str(&format!(
                " — {}\n",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        out
    }

    /// Export the log as plain text.
    pub fn export_text(&self) -> String {
        let mut out = String::from("Spin History\n============\n\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "{}  {} [{}]",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.decision_text,
                entry.method
            ));
            if let Some(roll) = entry.roll_label() {
                out.push_str(&format!(" ({roll})"));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry::new(text, SelectionMethod::SoftWeight)
    }

    fn fixed(text: &str, method: SelectionMethod) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::nil(),
            decision_text: text.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            rolled_face: None,
            duration_secs: None,
            method,
        }
    }

    #[test]
    fn append_is_newest_first() {
        let mut h = History::new();
        h.append(entry("first"));
        h.append(entry("second"));
        assert_eq!(h.len(), 2);
        assert_eq!(h.latest().unwrap().decision_text, "second");
        assert_eq!(h.entries()[1].decision_text, "first");
    }

    #[test]
    fn clear_empties() {
        let mut h = History::new();
        h.append(entry("x"));
        h.clear();
        assert!(h.is_empty());
    }

    #[test]
    fn paging() {
        let mut h = History::new();
        for i in 0..7 {
            h.append(entry(&format!("e{i}")));
        }
        let p1 = h.page(1, 3);
        assert_eq!(p1.total_pages, 3);
        assert_eq!(p1.total_entries, 7);
        let texts: Vec<_> = p1.entries.iter().map(|e| e.decision_text.as_str()).collect();
        assert_eq!(texts, ["e6", "e5", "e4"]);

        let p3 = h.page(3, 3);
        assert_eq!(p3.entries.len(), 1);
        assert_eq!(p3.entries[0].decision_text, "e0");

        assert!(h.page(4, 3).entries.is_empty());
        assert!(h.page(0, 3).entries.is_empty());
        assert!(h.page(1, 0).entries.is_empty());
        assert_eq!(h.page(1, 0).total_pages, 0);
        assert_eq!(h.len(), 7);
    }

    #[test]
    fn serde_uses_method_names() {
        let e = entry("Pizza").with_roll(3, 7.0);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains(r#""method":"soft-weight""#));
        assert!(json.contains(r#""rolled_face":3"#));
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn roll_fields_are_optional() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000000","decision_text":"Tea",
            "timestamp":"2024-05-01T12:30:00Z","method":"none"}"#;
        let e: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.rolled_face, None);
        assert_eq!(e.method, SelectionMethod::None);
    }

    #[test]
    fn export_markdown_snapshot() {
        let mut h = History::new();
        h.append(fixed("Tea", SelectionMethod::HardPity).with_roll(2, 5.0));
        h.append(fixed("Pizza", SelectionMethod::ManualStop));
        insta::assert_snapshot!(h.export_markdown(), @r"
        # Spin History

        - **Pizza** (manual-stop) — 2024-05-01 12:30:00
        - **Tea** (hard-pity) — face 2, 5s — 2024-05-01 12:30:00
        ");
    }

    #[test]
    fn export_text_lists_entries() {
        let mut h = History::new();
        h.append(fixed("Tea", SelectionMethod::SoftWeight).with_roll(4, 8.0));
        let txt = h.export_text();
        assert!(txt.starts_with("Spin History"));
        assert!(txt.contains("2024-05-01 12:30:00  Tea [soft-weight] (face 4, 8s)"));
    }
}
