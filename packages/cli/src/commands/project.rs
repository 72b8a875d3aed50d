use crate::commands::validate::type_counts;
use crate::config::Config;
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use screenwright_workspace::{DirectoryStore, ProjectId, ProjectLoader};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create an empty project
    Create {
        /// Project title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Import a screenplay file as a new project
    Import {
        /// Screenplay file
        file: String,
    },

    /// Print a project's title and content
    Show {
        id: ProjectId,

        /// Print the block text as well
        #[arg(long)]
        text: bool,
    },

    /// Change a project's title
    Rename { id: ProjectId, title: String },

    /// Remove a project from the store
    Delete { id: ProjectId },

    /// List stored projects, most recently updated first
    List,
}

pub async fn project(command: ProjectCommand, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = DirectoryStore::new(config.get_store_dir(cwd));
    let owner = config.owner.as_deref();

    match command {
        ProjectCommand::Create { title } => {
            let id = ProjectLoader::create(&store, title.as_deref(), owner).await?;
            println!("{} Created project {}", "✓".green(), id.to_string().bright_white());
        }
        ProjectCommand::Import { file } => {
            let path = PathBuf::from(cwd).join(&file);
            let id = ProjectLoader::import(&store, &path, owner).await?;
            println!(
                "{} Imported {} as {}",
                "✓".green(),
                file,
                id.to_string().bright_white()
            );
        }
        ProjectCommand::Show { id, text } => {
            let opened = ProjectLoader::open(&store, id).await?;
            println!("{} {}", opened.title.bright_white().bold(), id.to_string().dimmed());
            if opened.seeded {
                println!("   {}", "(no stored content, starter document)".dimmed());
            }
            for (tag, count) in type_counts(&opened.document) {
                println!("   {:<16} {}", tag, count);
            }
            if text {
                println!();
                for block in opened.document.blocks() {
                    println!("   {:<16} {}", block.element_type.as_str().dimmed(), block.text());
                }
            }
        }
        ProjectCommand::Rename { id, title } => {
            ProjectLoader::rename(&store, id, &title).await?;
            println!("{} Renamed {} to {}", "✓".green(), id, title.bright_white());
        }
        ProjectCommand::Delete { id } => {
            ProjectLoader::delete(&store, id).await?;
            println!("{} Deleted {}", "✓".green(), id);
        }
        ProjectCommand::List => {
            let records = store.list().await?;
            if records.is_empty() {
                println!("No projects in {}", store.root().display());
            }
            for record in records {
                println!(
                    "{}  {}  {}",
                    record.id,
                    record.updated_at.format("%Y-%m-%d %H:%M"),
                    record.title.bright_white()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenwright_editor::{format, Block, Document, ElementType};

    #[tokio::test]
    async fn test_import_rename_delete() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        let document = Document::from_blocks(vec![Block::new(ElementType::Transition, "CUT TO:")]);
        format::save_to_disk(&document, dir.path(), "cutaway").unwrap();

        project(
            ProjectCommand::Import {
                file: "cutaway.screenplay".to_string(),
            },
            &cwd,
        )
        .await
        .unwrap();

        let store = DirectoryStore::new(Config::default().get_store_dir(&cwd));
        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "cutaway");
        let id = records[0].id;

        project(
            ProjectCommand::Rename {
                id,
                title: "Cutaway".to_string(),
            },
            &cwd,
        )
        .await
        .unwrap();
        assert_eq!(ProjectLoader::open(&store, id).await.unwrap().title, "Cutaway");

        project(ProjectCommand::Show { id, text: true }, &cwd).await.unwrap();
        project(ProjectCommand::Delete { id }, &cwd).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_show_missing_project_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = project(
            ProjectCommand::Show {
                id: ProjectId::new(),
                text: false,
            },
            &dir.path().display().to_string(),
        )
        .await;
        assert!(result.is_err());
    }
}
