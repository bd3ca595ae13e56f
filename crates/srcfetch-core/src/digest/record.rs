//! Digest record format (`sha256sum`-compatible).
//!
//! A record holds one or more lines `<hex><space><space|*><file name>`.
//! Records synthesized from an inline digest use binary mode: `<hex> *<name>`.

/// One checksum line of a digest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    /// Lowercased hex digest.
    pub digest: String,
    pub file_name: String,
}

/// Content of a synthesized record for an inline digest.
pub fn record_line(digest: &str, name: &str) -> String {
    format!("{} *{}", digest, name)
}

/// Parses all well-formed checksum lines; blank lines, comments and
/// malformed lines are skipped, the same way `<type>sum -c` ignores them.
pub fn parse_record(content: &str) -> Vec<RecordEntry> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<RecordEntry> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }
    let (digest, rest) = line.split_once(' ')?;
    if digest.is_empty() || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    // Binary (`*`) and text (` `) mode hash the same bytes on Unix.
    let file_name = match rest.as_bytes().first() {
        Some(b'*') | Some(b' ') => &rest[1..],
        _ => return None,
    };
    if file_name.is_empty() {
        return None;
    }
    Some(RecordEntry {
        digest: digest.to_ascii_lowercase(),
        file_name: file_name.to_string(),
    })
}
