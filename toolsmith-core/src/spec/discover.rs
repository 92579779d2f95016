use std::path::{Path, PathBuf};

const SPEC_FILE_NAMES: &[&str] = &["openapi.json", "openapi.yaml", "openapi.yml"];
const SPEC_FILE_SUFFIXES: &[&str] = &[".openapi.json", ".openapi.yaml", ".openapi.yml"];

/// True if `file_name` follows the description document naming convention.
pub fn is_spec_file_name(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    SPEC_FILE_NAMES.contains(&lower.as_str())
        || SPEC_FILE_SUFFIXES.iter().any(|s| lower.ends_with(s) && lower.len() > s.len())
}

/// Recursively collects spec files under `root` in filesystem order.
///
/// Unreadable subdirectories are skipped with a warning; only a failure to read
/// `root` itself is returned.
pub(crate) fn discover_spec_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let entries = std::fs::read_dir(root)?;
    walk(entries, &mut out);
    Ok(out)
}

fn walk(entries: std::fs::ReadDir, out: &mut Vec<PathBuf>) {
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            match std::fs::read_dir(&path) {
                Ok(sub) => walk(sub, out),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable directory")
                }
            }
        } else if file_type.is_file() {
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_spec_file_name);
            if matches {
                out.push(path);
            }
        }
    }
}
