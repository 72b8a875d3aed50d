use crate::config::Config;
use crate::keys::parse_script;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use screenwright_editor::{format, Document, EditSession, Key, KeyHandling};
use screenwright_workspace::{AutoSaver, DirectoryStore, ProjectId, ProjectLoader, RemoteStore, SaveStatus};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Screenplay file to edit (created if missing)
    #[arg(required_unless_present = "project", conflicts_with = "project")]
    pub file: Option<String>,

    /// Edit a stored project instead of a file
    #[arg(short, long)]
    pub project: Option<ProjectId>,

    /// Key script, e.g. "JOHN<enter>Hello.<tab>"
    #[arg(short, long, required_unless_present = "keys_file")]
    pub keys: Option<String>,

    /// Read the key script from a file
    #[arg(long, conflicts_with = "keys")]
    pub keys_file: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Replay {
    pub consumed: usize,
    pub ignored: usize,
}

/// Feed keys to a session in order
pub fn replay(session: &mut EditSession, keys: Vec<Key>) -> Replay {
    let mut replay = Replay::default();
    for key in keys {
        match session.handle_key(key) {
            KeyHandling::Consumed => replay.consumed += 1,
            KeyHandling::Ignored => replay.ignored += 1,
        }
    }
    replay
}

fn print_summary(replay: &Replay, document: &Document) {
    println!(
        "  {} {} keys applied, {} ignored",
        "✓".green(),
        replay.consumed,
        replay.ignored
    );
    for block in document.blocks() {
        println!("   {:<16} {}", block.element_type.as_str().dimmed(), block.text());
    }
}

pub async fn compose(args: ComposeArgs, cwd: &str) -> Result<()> {
    let script = match (&args.keys, &args.keys_file) {
        (Some(keys), _) => keys.clone(),
        (None, Some(path)) => std::fs::read_to_string(PathBuf::from(cwd).join(path))
            .with_context(|| format!("Failed to read key script {}", path))?,
        (None, None) => String::new(),
    };
    let keys = parse_script(&script);

    match (args.project, args.file) {
        (Some(id), _) => compose_project(id, keys, cwd).await,
        (None, Some(file)) => compose_file(&file, keys, cwd),
        (None, None) => Ok(()),
    }
}

fn compose_file(file: &str, keys: Vec<Key>, cwd: &str) -> Result<()> {
    let path = PathBuf::from(cwd).join(file);
    let document = if path.exists() {
        format::load_from_disk(&path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Document::new()
    };

    let mut session = EditSession::new(document);
    let replay = replay(&mut session, keys);

    let dir = path.parent().map(PathBuf::from).unwrap_or_default();
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "screenplay".to_string());
    std::fs::create_dir_all(&dir)?;
    let saved = format::save_to_disk(session.document(), &dir, &name)?;

    println!("{} {}", "✍️".bright_blue(), saved.display());
    print_summary(&replay, session.document());
    Ok(())
}

async fn compose_project(id: ProjectId, keys: Vec<Key>, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store: Arc<dyn RemoteStore> = Arc::new(DirectoryStore::new(config.get_store_dir(cwd)));

    let opened = ProjectLoader::open(store.as_ref(), id).await?;
    println!("{} {} ({})", "✍️".bright_blue(), opened.title.bright_white(), id);

    let saver = Arc::new(AutoSaver::with_debounce(store, id, config.debounce()));
    let mut session = EditSession::new(opened.document);
    let scheduler = Arc::clone(&saver);
    session.on_change(move |doc| scheduler.schedule(doc.clone()));

    let replay = replay(&mut session, keys);
    saver.flush().await?;

    print_summary(&replay, session.document());
    match saver.status() {
        SaveStatus::Saved => println!("  {} Saved", "✓".green()),
        SaveStatus::Idle => println!("  {} No changes to save", "•".dimmed()),
        SaveStatus::Saving => println!("  {} Save still in flight", "…".yellow()),
        SaveStatus::Error(message) => println!("  {} {}", "✗".red(), message),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenwright_editor::ElementType;

    #[test]
    fn test_replay_counts_keys() {
        let mut session = EditSession::new(Document::starter());
        let replay = replay(&mut session, parse_script("<enter>ANA<f1>"));

        assert_eq!(replay, Replay { consumed: 4, ignored: 1 });
        assert_eq!(session.document().block(1).unwrap().text(), "ANA");
    }

    #[test]
    fn test_compose_file_creates_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        compose_file("scene.screenplay", parse_script("INT. BARN - DAY<enter>"), &cwd).unwrap();
        compose_file("scene.screenplay", parse_script("HAY"), &cwd).unwrap();

        let document = format::load_from_disk(&dir.path().join("scene.screenplay")).unwrap();
        assert_eq!(document.types(), vec![ElementType::SceneHeading, ElementType::Character]);
        assert_eq!(document.text(), "INT. BARN - DAY\nHAY");
    }

    #[tokio::test]
    async fn test_compose_project_flushes_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        let store = DirectoryStore::new(Config::default().get_store_dir(&cwd));
        let id = ProjectLoader::create(&store, Some("Barn"), None).await.unwrap();

        compose_project(id, parse_script("INT. BARN - NIGHT"), &cwd).await.unwrap();

        let opened = ProjectLoader::open(&store, id).await.unwrap();
        assert_eq!(opened.document.text(), "INT. BARN - NIGHT");
    }
}
