use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use screenwright_editor::{format, Document};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Screenplay name, used as the file stem
    pub name: String,

    /// Directory to write into
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// Seed the starter scene heading instead of an empty one
    #[arg(long)]
    pub starter: bool,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub fn new(args: NewArgs, cwd: &str) -> Result<()> {
    let dir = PathBuf::from(cwd).join(&args.dir);
    let path = format::file_path(&dir, &args.name);

    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let document = if args.starter {
        Document::starter()
    } else {
        Document::new()
    };

    std::fs::create_dir_all(&dir)?;
    let path = format::save_to_disk(&document, &dir, &args.name)?;
    println!("{} Created {}", "✓".green(), path.display());

    Ok(())
}
