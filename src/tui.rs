use crate::aggregate::{self, FetchOptions};
use crate::app::{App, Command};
use crate::config::Config;
use crate::error::Result;
use crate::event::AppEvent;
use crate::github::{client::GitHubClient, RepoApi};
use crate::presets::{self, PresetStore};
use crate::report;
use crate::ticker;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use tokio::sync::mpsc;

pub async fn run(config: Config) -> Result<()> {
    let client = GitHubClient::new(config.token(), config.api_base_url.as_deref())?;
    let presets_path = presets::default_path();
    let presets = PresetStore::load(&presets_path);

    let cached = report::load(&config.export_path()).ok();
    let mut app = App::new(config, presets, presets_path);
    if let Some(report) = cached {
        app = app.with_cached_report(report);
    }

    // Install panic hook before entering raw mode so terminal is restored on panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let ticker_handle = tokio::spawn(ticker::start_ticker(tx.clone(), 1));

    let input_tx = tx.clone();
    let input_handle = tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            let app_event = match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                Event::Resize(_, _) => Some(AppEvent::Resize),
                _ => None,
            };
            if let Some(e) = app_event {
                if input_tx.send(e).is_err() {
                    break;
                }
            }
        }
    });

    if let Some(cmd) = app.start_fetch() {
        dispatch(cmd, &app.config, &client, &tx);
    }

    loop {
        terminal.draw(|f| app.render(f))?;

        let first = match rx.recv().await {
            Some(e) => e,
            None => break,
        };

        let mut pending = vec![first];
        while let Ok(more) = rx.try_recv() {
            pending.push(more);
        }
        for event in pending {
            if let Some(cmd) = app.handle_event(event) {
                dispatch(cmd, &app.config, &client, &tx);
            }
        }

        if app.should_quit {
            break;
        }
    }

    ticker_handle.abort();
    input_handle.abort();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn dispatch(
    cmd: Command,
    config: &Config,
    client: &GitHubClient,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match cmd {
        Command::Fetch(repos) => {
            let opts = FetchOptions::from_config(config);
            let client = client.clone();
            let tx = tx.clone();
            tracing::info!(repos = repos.len(), "refresh started");
            tokio::spawn(async move {
                let report = aggregate::collect(&client, &repos, &opts).await;
                let rate_limit = client.rate_limit().await;
                let _ = tx.send(AppEvent::FetchDone {
                    report: Box::new(report),
                    rate_limit,
                });
            });
        }
        Command::Open(url) => {
            if let Err(e) = open::that_detached(&url) {
                tracing::warn!(%url, error = %e, "could not open browser");
            }
        }
    }
}
