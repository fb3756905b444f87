use crate::core_cli::Cli;
use crate::core_ftpcommand::list::{DirectoryEntry, EntryKind};
use crate::session::{Credentials, Session};
use crate::Config;
use anyhow::{Context, Result};
use colored::Colorize;
use log::{error, info, warn};
use std::path::Path;

/// Runs one client session: connect, login, browse, transfer, quit.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments.
/// * `config` - The client configuration, URL overrides already applied.
/// * `remote_dir` - Directory to change into after login, if any.
pub async fn run(args: &Cli, config: Config, remote_dir: Option<String>) -> Result<()> {
    let credentials = Credentials::new(
        config.client.username.clone(),
        config.client.password.clone(),
    );
    let mut session = Session::new(config.client);

    let greeting = session
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {}", session.config().address()))?;
    println!("{}", greeting);

    let response = session
        .login(&credentials)
        .await
        .with_context(|| format!("Failed to log in as {}", credentials.username))?;
    println!("{}", response);

    if let Some(dir) = &remote_dir {
        session
            .cwd(dir)
            .await
            .with_context(|| format!("Failed to change directory to {}", dir))?;
    }

    let pwd = session.pwd().await.context("Failed to read working directory")?;
    println!("{}", pwd.bold());

    let entries = session.list().await.context("Failed to list directory")?;
    for entry in &entries {
        print_entry(entry);
    }

    for name in &args.downloads {
        let payload = session
            .download(name)
            .await
            .with_context(|| format!("Failed to download {}", name))?;
        save_download(&args.output_dir, name, &payload).await?;
    }

    for path in &args.uploads {
        let written = session
            .upload(path)
            .await
            .with_context(|| format!("Failed to upload {}", path.display()))?;
        println!("uploaded {} ({} bytes)", path.display(), written);
    }

    if let Some((mode, path)) = args.chmod_target()? {
        // Servers without SITE CHMOD refuse it; report and carry on.
        match session.chmod(&path, mode).await {
            Ok(response) => println!("{}", response),
            Err(e) => warn!("SITE CHMOD {:o} {} failed: {}", mode, path, e),
        }
    }

    match session.quit().await {
        Ok(response) => println!("{}", response),
        Err(e) => error!("Failed to quit cleanly: {}", e),
    }
    Ok(())
}

fn print_entry(entry: &DirectoryEntry) {
    let name = match entry.kind {
        EntryKind::Directory => entry.name.blue().bold(),
        EntryKind::Link => entry.name.cyan(),
        EntryKind::File => entry.name.normal(),
    };
    println!("{} {:>12} {}", entry.permissions, entry.modified, name);
}

/// Writes a downloaded payload under `output_dir`, keeping only the file name.
async fn save_download(output_dir: &Path, name: &str, payload: &[u8]) -> Result<()> {
    let file_name = Path::new(name)
        .file_name()
        .with_context(|| format!("Remote name has no file component: {}", name))?;
    let target = output_dir.join(file_name);

    tokio::fs::write(&target, payload)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!("Saved {} ({} bytes)", target.display(), payload.len());
    println!("downloaded {} ({} bytes)", target.display(), payload.len());
    Ok(())
}
