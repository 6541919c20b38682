//! Best-effort patch of the `plugins=(...)` line in `.zshrc`.
//!
//! The file is treated as plain lines: find the line, rewrite only that line,
//! write every line back. Nothing else in the file is interpreted.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::BootstrapError;
use crate::util::fs::write_atomic;
use crate::util::TextLines;

/// `plugins=(...)` on a single, uncommented line. Groups: prefix, entries, suffix.
static PLUGINS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*plugins=\()([^)]*)(\).*)$").expect("plugins line regex is valid")
});

/// The single-entry line oh-my-zsh's template ships with, in command position
/// (line start or after `;`, `&` or `|`). Group 1 is the form itself.
static DEFAULT_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[;&|])\s*(plugins=\(git\))").expect("default form regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Every name was already listed; nothing to write.
    Unchanged,
    /// New file contents with the names added.
    Patched(Vec<u8>),
    /// No line matched either pattern.
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePatch {
    Unchanged,
    Patched { line: String },
    /// Dry-run: the line that would be written.
    WouldPatch { line: String },
    NoMatch,
    Missing,
}

/// Entries listed on a `plugins=(...)` line, or `None` when the line does not match.
pub fn plugin_entries(line: &str) -> Option<Vec<&str>> {
    PLUGINS_LINE
        .captures(line)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().split_whitespace().collect())
}

/// Rewrite one line so it lists every name in `names`.
///
/// Existing entries keep their order; missing names are appended in the order
/// given. Returns `None` if the line is not a `plugins=(...)` line, and the line
/// unchanged if nothing is missing.
pub fn patch_plugins_line(line: &str, names: &[&str]) -> Option<String> {
    let caps = PLUGINS_LINE.captures(line)?;
    let existing: Vec<&str> = caps[2].split_whitespace().collect();
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| !existing.contains(n))
        .collect();
    if missing.is_empty() {
        return Some(line.to_string());
    }
    let mut entries = existing;
    for n in missing {
        if !entries.contains(&n) {
            entries.push(n);
        }
    }
    Some(format!("{}{}{}", &caps[1], entries.join(" "), &caps[3]))
}

/// Fallback for the template default: replace `plugins=(git)` where it starts a
/// command later in a non-comment line, outside quotes.
fn patch_default_form(line: &str, names: &[&str]) -> Option<String> {
    if line.trim_start().starts_with('#') {
        return None;
    }
    let form = DEFAULT_FORM
        .captures_iter(line)
        .filter_map(|c| c.get(1))
        .find(|m| !inside_quotes(&line[..m.start()]))?;
    let mut entries = vec!["git"];
    entries.extend(names.iter().copied().filter(|n| *n != "git"));
    Some(format!(
        "{}plugins=({}){}",
        &line[..form.start()],
        entries.join(" "),
        &line[form.end()..]
    ))
}

/// True when `prefix` leaves a single- or double-quoted string open.
fn inside_quotes(prefix: &str) -> bool {
    let (mut single, mut double) = (false, false);
    for c in prefix.chars() {
        match c {
            '\'' if !double => single = !single,
            '"' if !single => double = !double,
            _ => {}
        }
    }
    single || double
}

fn lists_all(line: &str, names: &[&str]) -> bool {
    plugin_entries(line)
        .map(|entries| names.iter().all(|n| entries.contains(n)))
        .unwrap_or(false)
}

/// Pure transform: add `names` to the first `plugins=(...)` line of `text`.
///
/// Works on raw bytes; lines that are not valid UTF-8 are carried through as-is.
pub fn patch_config_text(text: &[u8], names: &[&str]) -> Result<PatchOutcome, BootstrapError> {
    let mut lines = TextLines::parse(text);

    let primary = lines
        .text_lines()
        .find_map(|(i, l)| patch_plugins_line(l, names).map(|new| (i, l == new, new)));

    if let Some((i, unchanged, new)) = primary {
        if unchanged {
            return Ok(PatchOutcome::Unchanged);
        }
        if lists_all(&new, names) {
            lines.replace(i, new)?;
            return Ok(PatchOutcome::Patched(lines.build()));
        }
    }

    let fallback = lines
        .text_lines()
        .find_map(|(i, l)| patch_default_form(l, names).map(|new| (i, new)));
    match fallback {
        Some((i, new)) => {
            lines.replace(i, new)?;
            Ok(PatchOutcome::Patched(lines.build()))
        }
        None => Ok(PatchOutcome::NoMatch),
    }
}

/// Patch the config file at `path` in place. A missing file or a file with no
/// matching line is reported, never an error; the file is left untouched.
pub fn patch_config_file(
    path: &Path,
    names: &[&str],
    dry_run: bool,
) -> Result<FilePatch, BootstrapError> {
    if !path.exists() {
        return Ok(FilePatch::Missing);
    }
    let text = std::fs::read(path)?;
    match patch_config_text(&text, names)? {
        PatchOutcome::Unchanged => Ok(FilePatch::Unchanged),
        PatchOutcome::NoMatch => Ok(FilePatch::NoMatch),
        PatchOutcome::Patched(new_text) => {
            let line = first_plugins_line(&new_text).unwrap_or_default();
            if dry_run {
                return Ok(FilePatch::WouldPatch { line });
            }
            write_atomic(path, &new_text)?;
            Ok(FilePatch::Patched { line })
        }
    }
}

/// True when `path` has a `plugins=(...)` line that lists every name.
pub fn config_lists_plugins(path: &Path, names: &[&str]) -> bool {
    std::fs::read(path)
        .map(|text| {
            TextLines::parse(&text)
                .text_lines()
                .find(|(_, l)| plugin_entries(l).is_some())
                .map(|(_, l)| lists_all(l, names))
                .unwrap_or(false)
        })
        .unwrap_or(false)
}

fn first_plugins_line(text: &[u8]) -> Option<String> {
    TextLines::parse(text)
        .text_lines()
        .find(|(_, l)| plugin_entries(l).is_some())
        .map(|(_, l)| l.trim().to_string())
}
