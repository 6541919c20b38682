use std::io::{self, Write};
use std::path::Path;

/// Ensure a file exists by creating parent directories as needed.
pub fn ensure_file_exists(p: &Path) -> io::Result<()> {
    if !p.exists() {
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(p)?;
    }
    Ok(())
}

/// Replace `p` with `contents` via a temp file in the same directory and a rename.
/// Permissions of an existing file are carried over.
pub fn write_atomic(p: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match p.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".shellstrap-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = std::fs::metadata(p) {
        std::fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(p).map_err(|e| e.error)?;
    Ok(())
}

/// Append one line to `p`, creating the file (and parents) when absent.
/// A newline is inserted first if the existing content does not end with one.
pub fn append_line(p: &Path, line: &str) -> io::Result<()> {
    ensure_file_exists(p)?;
    let existing = std::fs::read(p)?;
    let mut f = std::fs::OpenOptions::new().append(true).open(p)?;
    if !existing.is_empty() && !existing.ends_with(b"\n") {
        f.write_all(b"\n")?;
    }
    f.write_all(line.as_bytes())?;
    f.write_all(b"\n")?;
    Ok(())
}
