use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied { files: usize },
    SourceMissing,
}

/// Copies a file or a directory tree from `src` to `dst`, creating parents.
/// A missing source is reported, not treated as an error.
pub fn copy_best_effort(src: &Path, dst: &Path) -> Result<CopyOutcome> {
    if !src.exists() {
        return Ok(CopyOutcome::SourceMissing);
    }

    if src.is_file() {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
        return Ok(CopyOutcome::Copied { files: 1 });
    }

    let mut files = 0;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(std::io::Error::other)?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }

    Ok(CopyOutcome::Copied { files })
}

/// Restricts a file, or every file under a directory, to owner read/write.
/// Returns the number of files touched.
#[cfg(unix)]
pub fn restrict_to_owner(path: &Path) -> Result<usize> {
    use std::os::unix::fs::PermissionsExt;

    if !path.exists() {
        return Ok(0);
    }

    let mut touched = 0;
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(std::io::Error::other)?;
        if entry.file_type().is_file() {
            fs::set_permissions(entry.path(), fs::Permissions::from_mode(0o600))?;
            touched += 1;
        }
    }

    Ok(touched)
}

#[cfg(not(unix))]
pub fn restrict_to_owner(_path: &Path) -> Result<usize> {
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_source_is_not_an_error() {
        let dir = tempdir().unwrap();
        let outcome =
            copy_best_effort(&dir.path().join("absent"), &dir.path().join("dst")).unwrap();
        assert_eq!(outcome, CopyOutcome::SourceMissing);
        assert!(!dir.path().join("dst").exists());
    }

    #[test]
    fn copies_single_file_into_new_parent() {
        let dir = tempdir().unwrap();
        let src = dir.path().join(".env");
        fs::write(&src, "API_KEY=abc").unwrap();

        let dst = dir.path().join("ws/.env");
        let outcome = copy_best_effort(&src, &dst).unwrap();

        assert_eq!(outcome, CopyOutcome::Copied { files: 1 });
        assert_eq!(fs::read_to_string(dst).unwrap(), "API_KEY=abc");
    }

    #[test]
    fn copies_nested_directory_tree() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("data");
        fs::create_dir_all(src.join("bars/daily")).unwrap();
        fs::write(src.join("symbols.csv"), "AAPL").unwrap();
        fs::write(src.join("bars/daily/aapl.csv"), "1,2,3").unwrap();

        let dst = dir.path().join("ws/data");
        let outcome = copy_best_effort(&src, &dst).unwrap();

        assert_eq!(outcome, CopyOutcome::Copied { files: 2 });
        assert!(dst.join("bars/daily/aapl.csv").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn restricts_every_file_in_a_key_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let keys = dir.path().join("keys");
        fs::create_dir_all(keys.join("ibkr")).unwrap();
        fs::write(keys.join("private.pem"), "k").unwrap();
        fs::write(keys.join("ibkr/session.key"), "k").unwrap();

        assert_eq!(restrict_to_owner(&keys).unwrap(), 2);

        for file in ["private.pem", "ibkr/session.key"] {
            let mode = fs::metadata(keys.join(file)).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{file}");
        }
    }
}
