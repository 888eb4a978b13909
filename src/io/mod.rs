use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::app::ExportFormat;

/// Create the output directory (and parents) if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_file() {
        bail!("output path is a file, not a directory: {}", dir.display());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))
}

/// File stems must stay inside the output directory.
pub fn validate_stem(stem: &str) -> Result<()> {
    if stem.trim().is_empty() {
        bail!("output name must not be empty");
    }
    if stem.contains(['/', '\\']) || stem == "." || stem == ".." {
        bail!("output name must be a plain file stem: {stem}");
    }
    Ok(())
}

pub fn output_path(dir: &Path, stem: &str, format: ExportFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn creates_nested_output_dirs() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("output").join("posters");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Existing directories are fine.
        ensure_output_dir(&nested).unwrap();
    }

    #[test]
    fn rejects_file_as_output_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, "x").unwrap();
        let err = ensure_output_dir(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn builds_paths_from_stem_and_format() {
        let path = output_path(Path::new("output"), "ai_tree_fan", ExportFormat::Newick);
        assert_eq!(path, Path::new("output").join("ai_tree_fan.nwk"));
        let path = output_path(Path::new("output"), "ai_tree_fan", ExportFormat::Svg);
        assert_eq!(path, Path::new("output").join("ai_tree_fan.svg"));
    }

    #[test]
    fn validates_stems() {
        assert!(validate_stem("ai_tree_radial").is_ok());
        assert!(validate_stem("").is_err());
        assert!(validate_stem("  ").is_err());
        assert!(validate_stem("../escape").is_err());
        assert!(validate_stem("..").is_err());
    }

    #[test]
    fn write_errors_name_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").join("tree.json");
        let err = write_text(&path, "{}").unwrap_err();
        assert!(err.to_string().contains("tree.json"));

        let ok = dir.path().join("tree.json");
        write_text(&ok, "{}").unwrap();
        assert_eq!(fs::read_to_string(&ok).unwrap(), "{}");
    }
}
