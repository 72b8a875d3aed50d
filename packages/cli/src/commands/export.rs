use crate::config::{Config, ExportFormat};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use screenwright_editor::format;
use screenwright_export::{ExportPackage, TextRenderer};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Screenplay file to export
    pub file: String,

    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Output file (defaults to the configured outDir, then next to the input)
    #[arg(short, long)]
    pub output: Option<String>,
}

fn extension(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Json => "layout.json",
        ExportFormat::Text => "txt",
    }
}

/// Where an export lands when no `--output` is given
fn default_output(input: &Path, out_dir: Option<PathBuf>, format: ExportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "screenplay".to_string());
    let dir = out_dir
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}.{}", stem, extension(format)))
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let cwd_path = PathBuf::from(cwd);

    let input = cwd_path.join(&args.file);
    let document = format::load_from_disk(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let export_format = args.format.unwrap_or(config.export.format);
    let output = match args.output {
        Some(output) => cwd_path.join(output),
        None => default_output(
            &input,
            config.export.out_dir.as_ref().map(|dir| cwd_path.join(dir)),
            export_format,
        ),
    };
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let package = ExportPackage::new(&document, config.export.page.clone());
    match export_format {
        ExportFormat::Json => package.write_json(&output)?,
        ExportFormat::Text => package.write_text(&output, &TextRenderer::default())?,
    }

    tracing::info!(input = %input.display(), output = %output.display(), "exported screenplay");
    println!(
        "{} {} → {}",
        "✓".green(),
        args.file,
        output.display()
    );

    Ok(())
}
