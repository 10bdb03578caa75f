use std::{fs, io, path::Path};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::Document;

/// Name of the asset directory created next to published files.
pub const ASSETS_DIR: &str = "assets";

/// Stylesheet handed to the PDF engine.
pub const PDF_STYLESHEET: &str = "pdf.css";

/// Stylesheets and scripts shipped with the binary.
#[derive(rust_embed::RustEmbed)]
#[folder = "assets/"]
struct Bundle;

/// Empty `dir`, creating it if needed.
///
/// Only the contents are removed, so the directory itself is kept.
pub fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        debug!("clearing {}", dir.display());
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        debug!("creating {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Write the bundled assets into `dir`, returning how many were written.
pub fn copy_bundle(dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for name in Bundle::iter() {
        let Some(file) = Bundle::get(&name) else {
            continue;
        };
        let path = dir.join(&*name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, file.data.as_ref())?;
        count += 1;
    }
    debug!("copied {count} bundled assets to {}", dir.display());
    Ok(count)
}

/// Copy a document's own asset directory into `dir`.
///
/// Returns whether the document had assets to copy.
pub fn copy_document_assets(document: &Document, dir: &Path) -> io::Result<bool> {
    let Some(source) = document.assets().filter(|path| path.is_dir()) else {
        return Ok(false);
    };
    info!("copying {} to {}", source.display(), dir.display());
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dir.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_dir_clears_contents_and_keeps_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("assets");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("old.css"), "x").unwrap();
        fs::write(dir.join("nested/old.js"), "x").unwrap();

        reset_dir(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn reset_dir_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out/assets");

        reset_dir(&dir).unwrap();

        assert!(dir.is_dir());
    }

    #[test]
    fn bundle_includes_stylesheets() {
        let tmp = tempfile::tempdir().unwrap();

        let count = copy_bundle(tmp.path()).unwrap();

        assert!(count >= 3);
        assert!(tmp.path().join(PDF_STYLESHEET).is_file());
        assert!(tmp.path().join("sidebar.css").is_file());
    }

    #[test]
    fn document_assets_are_copied_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("reqs/assets");
        fs::create_dir_all(source.join("img")).unwrap();
        fs::write(source.join("img/logo.svg"), "<svg/>").unwrap();
        let document = Document::new("REQ", "Requirements").with_assets(&source);
        let dir = tmp.path().join("out/assets");

        assert!(copy_document_assets(&document, &dir).unwrap());
        assert_eq!(fs::read_to_string(dir.join("img/logo.svg")).unwrap(), "<svg/>");
    }

    #[test]
    fn documents_without_assets_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let document = Document::new("REQ", "Requirements");

        assert!(!copy_document_assets(&document, tmp.path()).unwrap());
    }
}
