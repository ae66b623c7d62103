use crate::aggregate::types::Report;
use crate::config::Config;
use crate::event::AppEvent;
use crate::presets::PresetStore;
use crate::report;
use crate::ui::{
    detail_panel::DetailPanel,
    header_bar::HeaderBar,
    help_panel::HelpPanel,
    input::{self, Action},
    results_table::{self, SortKey},
    status_bar::StatusBar,
    theme,
    toast::{Notification, NotifyLevel, Toast},
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::TableState,
    Frame,
};
use std::path::PathBuf;
use std::time::Instant;

/// Side effects the event loop performs on the app's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch(Vec<String>),
    Open(String),
}

pub struct App {
    pub config: Config,
    pub presets: PresetStore,
    pub presets_path: PathBuf,

    pub report: Option<Report>,
    pub order: Vec<usize>,
    pub table_state: TableState,
    pub sort: SortKey,
    pub sort_reversed: bool,

    pub show_detail: bool,
    pub show_help: bool,
    pub fetching: bool,
    pub last_sync: String,
    pub rate_limit: Option<u32>,
    pub notifications: Vec<Notification>,

    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, presets: PresetStore, presets_path: PathBuf) -> Self {
        Self {
            config,
            presets,
            presets_path,
            report: None,
            order: Vec::new(),
            table_state: TableState::default(),
            sort: SortKey::default(),
            sort_reversed: false,
            show_detail: false,
            show_help: false,
            fetching: false,
            last_sync: "never".to_string(),
            rate_limit: None,
            notifications: Vec::new(),
            should_quit: false,
        }
    }

    /// Shows a previously exported report until the first refresh lands.
    pub fn with_cached_report(mut self, report: Report) -> Self {
        self.last_sync = format!("{} (cached)", report.generated_at.format("%Y-%m-%d %H:%M"));
        self.set_report(report);
        self
    }

    pub fn notify(&mut self, level: NotifyLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn selected_repo(&self) -> Option<&crate::aggregate::types::RepoSummary> {
        let report = self.report.as_ref()?;
        let idx = *self.order.get(self.table_state.selected()?)?;
        report.repos.get(idx)
    }

    fn set_report(&mut self, report: Report) {
        self.report = Some(report);
        self.resort();
    }

    fn resort(&mut self) {
        let selected_repo = self.selected_repo().map(|r| r.repo.clone());
        self.order = match &self.report {
            Some(r) => results_table::sorted_indices(&r.repos, self.sort, self.sort_reversed),
            None => Vec::new(),
        };

        let position = selected_repo.and_then(|name| {
            let repos = &self.report.as_ref()?.repos;
            self.order.iter().position(|&i| repos[i].repo == name)
        });
        let selected = if self.order.is_empty() {
            None
        } else {
            Some(position.unwrap_or(0))
        };
        self.table_state.select(selected);
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Option<Command> {
        match event {
            AppEvent::Key(key) => {
                let action = input::map_key(key);
                self.handle_action(action)
            }
            AppEvent::Resize => None,
            AppEvent::Tick => {
                let now = Instant::now();
                self.notifications.retain(|n| !n.expired(now));
                None
            }
            AppEvent::FetchDone { report, rate_limit } => {
                self.finish_fetch(*report, rate_limit);
                None
            }
        }
    }

    fn finish_fetch(&mut self, report: Report, rate_limit: Option<u32>) {
        self.fetching = false;
        self.rate_limit = rate_limit.or(self.rate_limit);
        self.last_sync = report.generated_at.format("%H:%M:%S").to_string();

        if !report.errors.is_empty() {
            let names: Vec<&str> = report.errors.iter().map(|e| e.repo.as_str()).collect();
            let msg = format!("{} failed: {}", names.len(), names.join(", "));
            self.notify(NotifyLevel::Error, msg);
        }
        let warned = report.repos.iter().filter(|r| !r.warnings().is_empty()).count();
        if warned > 0 {
            self.notify(
                NotifyLevel::Warn,
                format!("{warned} repo(s) with partial data, see detail (d)"),
            );
        }
        self.set_report(report);
    }

    pub fn handle_action(&mut self, action: Action) -> Option<Command> {
        if self.show_help && !matches!(action, Action::Quit | Action::None) {
            self.show_help = false;
            return None;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => {
                if let Some(sel) = self.table_state.selected() {
                    if sel + 1 < self.order.len() {
                        self.table_state.select(Some(sel + 1));
                    }
                }
            }
            Action::ScrollUp => {
                if let Some(sel) = self.table_state.selected() {
                    self.table_state.select(Some(sel.saturating_sub(1)));
                }
            }
            Action::Top => {
                if !self.order.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
            Action::Bottom => {
                if !self.order.is_empty() {
                    self.table_state.select(Some(self.order.len() - 1));
                }
            }
            Action::NextPreset | Action::PrevPreset => {
                let forward = action == Action::NextPreset;
                let name = self.presets.cycle(forward).to_string();
                self.persist_presets();
                self.notify(
                    NotifyLevel::Info,
                    format!("Preset: {name} \u{00b7} press r to refresh"),
                );
            }
            Action::ToggleDetail => self.show_detail = !self.show_detail,
            Action::CycleSort => {
                self.sort = self.sort.next();
                self.resort();
            }
            Action::ReverseSort => {
                self.sort_reversed = !self.sort_reversed;
                self.resort();
            }
            Action::Refresh => return self.start_fetch(),
            Action::Export => self.export(),
            Action::Help => self.show_help = true,
            Action::ClosePopup => {
                if self.show_detail {
                    self.show_detail = false;
                } else {
                    self.notifications.clear();
                }
            }
            Action::OpenInBrowser => {
                match self.selected_repo().map(|r| r.html_url.clone()) {
                    Some(url) if !url.is_empty() => return Some(Command::Open(url)),
                    _ => self.notify(NotifyLevel::Warn, "No repository selected"),
                }
            }
            Action::None => {}
        }
        None
    }

    pub fn start_fetch(&mut self) -> Option<Command> {
        if self.fetching {
            return None;
        }
        let repos = self.presets.active_repos().to_vec();
        if repos.is_empty() {
            self.notify(
                NotifyLevel::Warn,
                format!(
                    "Preset '{}' has no repos; add some with `repotally preset update`",
                    self.presets.active
                ),
            );
            return None;
        }
        self.fetching = true;
        Some(Command::Fetch(repos))
    }

    fn export(&mut self) {
        let Some(report) = &self.report else {
            self.notify(NotifyLevel::Warn, "Nothing to export, refresh first");
            return;
        };
        let path = self.config.export_path();
        match report::export(report, &path) {
            Ok(()) => self.notify(NotifyLevel::Info, format!("Saved {}", path.display())),
            Err(e) => self.notify(NotifyLevel::Error, format!("Export failed: {e}")),
        }
    }

    fn persist_presets(&mut self) {
        if let Err(e) = self.presets.save(&self.presets_path) {
            tracing::warn!(error = %e, "could not save presets");
            self.notify(NotifyLevel::Error, format!("Could not save presets: {e}"));
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(size);

        let names = self.presets.names();
        let header = HeaderBar {
            preset_names: &names,
            active_preset: &self.presets.active,
            repo_count: self.presets.active_repos().len(),
        };
        frame.render_widget(header, main_chunks[0]);

        let body = if self.show_detail {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(40), Constraint::Length(48)])
                .split(main_chunks[1])
        } else {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(1)])
                .split(main_chunks[1])
        };

        let empty = Vec::new();
        let repos = self.report.as_ref().map(|r| &r.repos).unwrap_or(&empty);
        let title = format!(" {} ", self.presets.active);
        let table = results_table::build(repos, &self.order, title, !self.show_detail);
        frame.render_stateful_widget(table, body[0], &mut self.table_state);

        if self.show_detail {
            let errors = self.report.as_ref().map(|r| r.errors.as_slice()).unwrap_or(&[]);
            let detail = DetailPanel {
                repo: self.selected_repo(),
                errors,
            };
            frame.render_widget(detail, body[1]);
        }

        let totals = match &self.report {
            Some(r) => format!(" Totals \u{00b7} {}", r.totals.one_line()),
            None => " No data yet, press r to fetch".to_string(),
        };
        frame.render_widget(
            Line::from(Span::styled(totals, Style::default().fg(theme::DIM_TEXT))),
            main_chunks[2],
        );

        let status = StatusBar {
            last_sync: &self.last_sync,
            rate_limit: self.rate_limit,
            fetching: self.fetching,
            sort_label: self.sort.label(),
            sort_reversed: self.sort_reversed,
            error_count: self.report.as_ref().map(|r| r.errors.len()).unwrap_or(0),
            authenticated: self.config.token().is_some(),
        };
        frame.render_widget(status, main_chunks[3]);

        if let Some(n) = self.notifications.last() {
            frame.render_widget(Toast { notification: n }, size);
        }

        if self.show_help {
            frame.render_widget(HelpPanel, size);
        }
    }
}
