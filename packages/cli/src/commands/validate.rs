use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use screenwright_editor::{format, Document};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Screenplay file to check
    pub file: String,
}

/// Block count per element type tag, legacy tags included
pub fn type_counts(document: &Document) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for block in document.blocks() {
        *counts.entry(block.element_type.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn validate(args: ValidateArgs, cwd: &str) -> Result<()> {
    let path = PathBuf::from(cwd).join(&args.file);
    let document = format::load_from_disk(&path)
        .with_context(|| format!("{} is not a valid screenplay", path.display()))?;

    println!(
        "{} {} ({} blocks)",
        "✓".green(),
        args.file.bright_white(),
        document.len()
    );
    for (tag, count) in type_counts(&document) {
        println!("   {:<16} {}", tag, count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenwright_editor::{Block, ElementType};

    #[test]
    fn test_type_counts_include_legacy_tags() {
        let document = Document::from_blocks(vec![
            Block::new(ElementType::Character, "A"),
            Block::new(ElementType::Dialogue, "Hi."),
            Block::new(ElementType::Character, "B"),
            Block::new(ElementType::from("paragraph"), "old"),
        ]);

        let counts = type_counts(&document);
        assert_eq!(counts["character"], 2);
        assert_eq!(counts["dialogue"], 1);
        assert_eq!(counts["paragraph"], 1);
    }

    #[test]
    fn test_validate_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.screenplay"), "[]").unwrap();

        let result = validate(
            ValidateArgs {
                file: "bad.screenplay".to_string(),
            },
            &dir.path().display().to_string(),
        );
        assert!(result.is_err());
    }
}
