//! Append-only recovery log.
//!
//! Problems the store tolerates silently (an unreadable slot, a save that
//! did not land) are recorded here with the affected payload, so nothing a
//! user typed is lost without a trace. The log is markdown so it can be
//! read and repaired by hand; `tl recovery` shows and prunes it.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::io::kv::atomic_write;

/// Log size past which stale entries are dropped before appending (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Entries older than this many days are removed by a plain prune.
pub const PRUNE_AGE_DAYS: i64 = 30;

const LOG_FILE_NAME: &str = ".recovery.log";

const FILE_HEADER: &str = "\
<!-- tasklist recovery log: append-only
     Task data that could not be loaded or saved ends up here.
     View with: tl recovery
     Prune old entries: tl recovery --prune
     Safe to delete. -->

---
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryCategory {
    /// Stored payload could not be parsed and was discarded
    Parser,
    /// A save failed; the unsaved payload is in the body
    Write,
}

impl RecoveryCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryCategory::Parser => "parser",
            RecoveryCategory::Write => "write",
        }
    }
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecoveryCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "parser" => Ok(RecoveryCategory::Parser),
            "write" => Ok(RecoveryCategory::Write),
            _ => Err(()),
        }
    }
}

/// One logged incident: header line, `Key: value` fields, optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryEntry {
    #[serde(serialize_with = "ser_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    #[serde(serialize_with = "ser_fields")]
    pub fields: Vec<(String, String)>,
    pub body: String,
}

fn ser_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn ser_fields<S: Serializer>(fields: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(fields.iter().map(|(k, v)| (k, v)))
}

impl RecoveryEntry {
    /// Entry stamped now
    pub fn now(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// The markdown block this entry occupies in the log, `---` terminated.
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} {}: {}\n\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.category,
            self.description
        );
        for (key, value) in &self.fields {
            out += &format!("{key}: {value}\n");
        }
        if !self.body.is_empty() {
            let fence = fence_for(&self.body);
            out += &format!("\n{fence}text\n{}\n{fence}\n", self.body);
        }
        out += "\n---\n";
        out
    }

    /// Parse `<rfc3339> <category>: <description>` (without the `## `).
    fn parse_header(header: &str) -> Option<Self> {
        let (stamp, rest) = header.split_once(' ')?;
        let (category, description) = rest.split_once(": ")?;
        Some(RecoveryEntry {
            timestamp: DateTime::parse_from_rfc3339(stamp).ok()?.with_timezone(&Utc),
            category: category.parse().ok()?,
            description: description.to_string(),
            fields: Vec::new(),
            body: String::new(),
        })
    }
}

/// A backtick fence longer than any backtick run inside `body`.
fn fence_for(body: &str) -> String {
    let longest = body
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Parse every well-formed entry in `content`, oldest first, each with the
/// byte offset of its header line. Lines outside an entry (the file header,
/// hand edits) are skipped.
fn parse_log(content: &str) -> Vec<(usize, RecoveryEntry)> {
    let mut entries: Vec<(usize, RecoveryEntry)> = Vec::new();
    let mut open = false;
    // Closing fence and raw body text of the code block being read
    let mut body: Option<(&str, String)> = None;
    let mut offset = 0;

    for raw in content.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some((fence, text)) = body.as_mut() {
            if line == *fence {
                if let Some((_, entry)) = entries.last_mut() {
                    let text = std::mem::take(text);
                    entry.body = text.strip_suffix('\n').unwrap_or(&text).to_string();
                }
                body = None;
            } else {
                text.push_str(raw);
            }
            continue;
        }
        if let Some(header) = line.strip_prefix("## ") {
            match RecoveryEntry::parse_header(header) {
                Some(entry) => {
                    entries.push((start, entry));
                    open = true;
                }
                None => open = false,
            }
            continue;
        }
        if !open {
            continue;
        }
        if line == "---" {
            open = false;
        } else if line.starts_with("```") {
            let ticks = line.len() - line.trim_start_matches('`').len();
            body = Some((&line[..ticks], String::new()));
        } else if let Some((key, value)) = line.trim().split_once(": ")
            && let Some((_, entry)) = entries.last_mut()
        {
            entry.fields.push((key.to_string(), value.to_string()));
        }
    }
    entries
}

/// The recovery log file of one data directory.
#[derive(Debug, Clone)]
pub struct RecoveryLog {
    path: PathBuf,
}

impl RecoveryLog {
    pub fn in_dir(data_dir: &Path) -> Self {
        RecoveryLog {
            path: data_dir.join(LOG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry. Logging must never take the caller down, so a
    /// failure here is only reported on stderr.
    pub fn append(&self, entry: &RecoveryEntry) {
        if let Err(e) = self.try_append(entry) {
            eprintln!("warning: could not write to recovery log: {}", e);
        }
    }

    fn try_append(&self, entry: &RecoveryEntry) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let size = fs::metadata(&self.path).map_or(0, |m| m.len());
        if size > MAX_LOG_SIZE {
            self.retain_newer_than(Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS))?;
        }

        let fresh = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            file.write_all(FILE_HEADER.as_bytes())?;
        }
        file.write_all(entry.to_markdown().as_bytes())
    }

    /// Entries newest first, at most `limit` of them.
    pub fn entries(&self, limit: Option<usize>) -> Vec<RecoveryEntry> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        let mut entries: Vec<RecoveryEntry> =
            parse_log(&content).into_iter().map(|(_, e)| e).collect();
        entries.reverse();
        if let Some(n) = limit {
            entries.truncate(n);
        }
        entries
    }

    /// Drop entries older than `PRUNE_AGE_DAYS`, or every entry with `all`.
    /// Returns how many were removed.
    pub fn prune(&self, all: bool) -> io::Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let cutoff = if all {
            DateTime::<Utc>::MAX_UTC
        } else {
            Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS)
        };
        self.retain_newer_than(cutoff)
    }

    /// Rewrite the log keeping entries stamped at or after `cutoff`.
    /// Kept entries are copied as they appear in the file, byte for byte.
    fn retain_newer_than(&self, cutoff: DateTime<Utc>) -> io::Result<usize> {
        let content = fs::read_to_string(&self.path)?;
        let entries = parse_log(&content);
        let Some(&(first, _)) = entries.first() else {
            return Ok(0);
        };

        let mut out = String::from(&content[..first]);
        if out.is_empty() {
            out.push_str(FILE_HEADER);
        }
        let mut removed = 0;
        for (i, (start, entry)) in entries.iter().enumerate() {
            let end = entries.get(i + 1).map_or(content.len(), |(next, _)| *next);
            if entry.timestamp >= cutoff {
                out.push_str(&content[*start..end]);
            } else {
                removed += 1;
            }
        }
        if removed > 0 {
            atomic_write(&self.path, out.as_bytes())?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry_at(ts: DateTime<Utc>, desc: &str) -> RecoveryEntry {
        RecoveryEntry {
            timestamp: ts,
            category: RecoveryCategory::Parser,
            description: desc.to_string(),
            fields: vec![("Slot".to_string(), "todos".to_string())],
            body: "not json {{".to_string(),
        }
    }

    #[test]
    fn markdown_block_layout() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap();
        let md = entry_at(ts, "malformed task store").to_markdown();
        assert_eq!(
            md,
            "## 2025-05-14T09:30:00Z parser: malformed task store\n\n\
             Slot: todos\n\n\
             ```text\nnot json {{\n```\n\n---\n"
        );
    }

    #[test]
    fn appended_entries_read_back_newest_first() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        log.append(
            &RecoveryEntry::now(RecoveryCategory::Write, "save failed")
                .field("Slot", "todos")
                .field("Error", "disk full")
                .body("[\n  {}\n]"),
        );
        log.append(&RecoveryEntry::now(RecoveryCategory::Parser, "bad"));

        let entries = log.entries(None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, RecoveryCategory::Parser);
        assert_eq!(entries[0].body, "");
        assert_eq!(entries[1].description, "save failed");
        assert_eq!(
            entries[1].fields,
            vec![
                ("Slot".to_string(), "todos".to_string()),
                ("Error".to_string(), "disk full".to_string()),
            ]
        );
        assert_eq!(entries[1].body, "[\n  {}\n]");
    }

    #[test]
    fn header_written_once() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        log.append(&RecoveryEntry::now(RecoveryCategory::Parser, "a"));
        log.append(&RecoveryEntry::now(RecoveryCategory::Parser, "b"));
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("<!-- tasklist recovery log"));
        assert_eq!(content.matches("<!--").count(), 1);
    }

    #[test]
    fn limit_keeps_newest() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        for desc in ["one", "two", "three"] {
            log.append(&RecoveryEntry::now(RecoveryCategory::Parser, desc));
        }
        let descs: Vec<_> = log
            .entries(Some(2))
            .into_iter()
            .map(|e| e.description)
            .collect();
        assert_eq!(descs, ["three", "two"]);
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        assert!(log.entries(None).is_empty());
        assert_eq!(log.prune(false).unwrap(), 0);
    }

    #[test]
    fn prune_drops_old_entries_and_keeps_header() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        log.append(&entry_at(
            Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS + 5),
            "old",
        ));
        log.append(&entry_at(Utc::now(), "fresh"));

        assert_eq!(log.prune(false).unwrap(), 1);
        let entries = log.entries(None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "fresh");
        assert_eq!(entries[0].body, "not json {{");
        assert!(fs::read_to_string(log.path()).unwrap().starts_with("<!--"));
    }

    #[test]
    fn prune_all() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        log.append(&RecoveryEntry::now(RecoveryCategory::Parser, "x"));
        log.append(&RecoveryEntry::now(RecoveryCategory::Write, "y"));
        assert_eq!(log.prune(true).unwrap(), 2);
        assert!(log.entries(None).is_empty());
    }

    #[test]
    fn hand_edited_garbage_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        fs::write(
            log.path(),
            "random notes\n## not a header\nKey: ignored\n---\n\
             ## 2025-05-14T09:30:00Z write: save failed\n\nSlot: todos\n\n---\n",
        )
        .unwrap();
        let entries = log.entries(None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert_eq!(entries[0].fields.len(), 1);
    }

    #[test]
    fn payload_with_fences_and_crlf_survives_prune() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        let payload = "[\r\n  {\"id\":\"1\"}\r\n```\r\nSlot: fake\r\nlost tail\r\n]";
        log.append(&entry_at(
            Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS + 1),
            "old",
        ));
        log.append(&RecoveryEntry::now(RecoveryCategory::Write, "save failed").body(payload));
        let kept_block = fs::read_to_string(log.path())
            .unwrap()
            .split_once("## ")
            .map(|(_, rest)| rest.split_once("---\n").unwrap().1.to_string())
            .unwrap();

        assert_eq!(log.prune(false).unwrap(), 1);
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.ends_with(&kept_block), "{content}");

        let entries = log.entries(None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, payload);
        assert!(entries[0].fields.is_empty());
    }

    #[test]
    fn nothing_to_prune_leaves_file_alone() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::in_dir(tmp.path());
        log.append(&RecoveryEntry::now(RecoveryCategory::Parser, "fresh").body("a\r\nb"));
        let before = fs::read(log.path()).unwrap();
        assert_eq!(log.prune(false).unwrap(), 0);
        assert_eq!(fs::read(log.path()).unwrap(), before);
    }

    #[test]
    fn json_shape() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap();
        let json = serde_json::to_value(entry_at(ts, "bad")).unwrap();
        assert_eq!(json["category"], "parser");
        assert_eq!(json["timestamp"], "2025-05-14T09:30:00Z");
        assert_eq!(json["fields"]["Slot"], "todos");
        assert_eq!(json["body"], "not json {{");
    }
}
