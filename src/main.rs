mod aggregate;
mod app;
mod cli;
mod config;
mod error;
mod event;
mod github;
mod logging;
mod presets;
mod report;
mod resolve;
#[cfg(test)]
mod test_utils;
mod ticker;
mod tui;
mod ui;

use aggregate::FetchOptions;
use clap::Parser;
use cli::{Cli, Commands, PresetCmd};
use config::{Config, Overrides};
use error::{Result, TallyError};
use github::client::GitHubClient;
use logging::LogTarget;
use presets::PresetStore;
use std::path::PathBuf;

/// Exit code when there is nothing to fetch.
const EXIT_NO_REPOS: i32 = 2;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = Config::load(Overrides::default());
            logging::init(&config.log_level, LogTarget::File(logging::default_log_file()))?;
            tui::run(config).await?;
            Ok(0)
        }
        Some(Commands::Fetch {
            repos,
            preset,
            token,
            no_traffic,
            json,
            out,
        }) => {
            let config = Config::load(Overrides { token, no_traffic });
            logging::init(&config.log_level, LogTarget::Stderr)?;
            fetch(config, repos, preset, json, out).await
        }
        Some(Commands::Preset { command }) => {
            let config = Config::load(Overrides::default());
            logging::init(&config.log_level, LogTarget::Stderr)?;
            preset_command(command)
        }
    }
}

async fn fetch(
    config: Config,
    repos: Vec<String>,
    preset: Option<String>,
    json: bool,
    out: Option<PathBuf>,
) -> Result<i32> {
    let store = PresetStore::load(&presets::default_path());
    let repos = if !repos.is_empty() {
        repos
    } else if let Some(name) = preset {
        store
            .get(&name)
            .ok_or_else(|| TallyError::Preset(format!("no preset named '{name}'")))?
            .to_vec()
    } else {
        store.active_repos().to_vec()
    };

    if repos.is_empty() {
        eprintln!(
            "No repositories to fetch. Pass owner/name arguments or create a preset with \
             `repotally preset save NAME REPOS...`."
        );
        return Ok(EXIT_NO_REPOS);
    }

    if config.token().is_none() {
        tracing::info!("no GitHub token configured, traffic is skipped and the rate limit is 60/hour");
    }

    let client = GitHubClient::new(config.token(), config.api_base_url.as_deref())?;
    let opts = FetchOptions::from_config(&config);
    let report = aggregate::collect(&client, &repos, &opts).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::text_table(&report));
    }

    let path = out.unwrap_or_else(|| config.export_path());
    report::export(&report, &path)?;
    eprintln!("Saved {}", path.display());
    Ok(0)
}

fn preset_command(cmd: PresetCmd) -> Result<i32> {
    let path = presets::default_path();
    let mut store = PresetStore::load(&path);

    match cmd {
        PresetCmd::List => {
            for name in store.names() {
                let marker = if name == store.active { "*" } else { " " };
                let count = store.get(name).map_or(0, |r| r.len());
                println!("{marker} {name} ({count} repos)");
            }
            return Ok(0);
        }
        PresetCmd::Show { name } => {
            let name = name.unwrap_or_else(|| store.active.clone());
            let repos = store
                .get(&name)
                .ok_or_else(|| TallyError::Preset(format!("no preset named '{name}'")))?;
            for repo in repos {
                println!("{repo}");
            }
            return Ok(0);
        }
        PresetCmd::Save { name, repos } => store.save_as(&name, repos)?,
        PresetCmd::Update { name, repos } => store.update(&name, repos)?,
        PresetCmd::Rename { old, new } => store.rename(&old, &new)?,
        PresetCmd::Delete { name } => store.delete(&name)?,
        PresetCmd::Use { name } => store.apply(&name)?,
        PresetCmd::Import { path: source } => store = PresetStore::import(&source)?,
    }

    store.save(&path)?;
    tracing::info!(path = %path.display(), active = %store.active, "presets saved");
    Ok(0)
}
