//! Shared test fixtures: temp directories, mock HTTP replies and a
//! recording render sink.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ui::RenderSink;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("devmate-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }

    /// Create an empty child directory.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.child(relative);
        fs::create_dir_all(&path).expect("failed to create fixture directory");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Raw HTTP/1.1 response with a JSON body, for one-shot mock servers.
pub fn json_http_response(status_line: &str, extra_headers: &[&str], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n");
    for header in extra_headers {
        out.push_str(header);
        out.push_str("\r\n");
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ));
    out
}

/// Render sink that records every call as `kind: text`.
///
/// Clones share one log, so a test can keep a handle while the session owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    fn push(&self, kind: &str, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("{kind}: {text}"));
        }
    }
}

impl RenderSink for RecordingSink {
    fn prompt(&self, label: &str) {
        self.push("prompt", label);
    }
    fn assistant_message(&self, content: &str) {
        self.push("assistant", content);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn section(&self, title: &str) {
        self.push("section", title);
    }
    fn field(&self, key: &str, value: &str) {
        self.push("field", &format!("{key}={value}"));
    }
    fn detail(&self, text: &str) {
        self.push("detail", text);
    }
    fn approval_block(&self, text: &str) {
        self.push("approval", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
        assert!(fixture.mkdir("empty").is_dir());
    }

    #[test]
    fn json_http_response_sets_length() {
        let raw = json_http_response("429 Too Many Requests", &["Retry-After: 1"], "{}");
        assert!(raw.starts_with("HTTP/1.1 429"));
        assert!(raw.contains("Retry-After: 1\r\n"));
        assert!(raw.contains("Content-Length: 2\r\n"));
        assert!(raw.ends_with("\r\n\r\n{}"));
    }
}
