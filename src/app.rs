use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::currency::{self, SUPPORTED};
use crate::signal::{SignalClient, SignalError, SignalResponse};
use crate::status::Status;
use crate::theme::Theme;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Base,
    Target,
    Check,
}

/// Which selector a dropdown panel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Base,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Result of one spawned check, delivered back to the event loop.
pub struct CheckOutcome {
    pub seq: u64,
    pub base: String,
    pub target: String,
    pub result: Result<SignalResponse, SignalError>,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    // Selected pair: single source of truth, indices into SUPPORTED
    pub base_idx: usize,
    pub target_idx: usize,

    // Dropdown state: at most one panel open at a time
    pub open_panel: Option<Selector>,
    pub panel_highlight: usize,

    // Current badge
    pub status: Status,

    // Transient status line (auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub theme: Theme,
    pub config: AppConfig,
    client: SignalClient,

    // In-flight checks: responses apply in completion order, last one wins
    pub in_flight: usize,
    next_seq: u64,
    last_applied_seq: u64,
    outcome_tx: mpsc::UnboundedSender<CheckOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<CheckOutcome>,
}

impl App {
    pub fn new(config: AppConfig, endpoint_override: Option<String>) -> Self {
        let endpoint = endpoint_override.unwrap_or_else(|| config.endpoint.clone());
        let theme = Theme::load(&config.colors);

        // Resolve configured codes; an unknown code is skipped silently
        let base_idx = currency::position(&config.base).unwrap_or(0);
        let target_idx = currency::position(&config.target).unwrap_or(1);

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            section: Section::Base,
            popup: Popup::None,

            base_idx,
            target_idx,

            open_panel: None,
            panel_highlight: 0,

            status: Status::default(),

            status_message: None,
            status_message_time: None,

            theme,
            config,
            client: SignalClient::new(endpoint),

            in_flight: 0,
            next_seq: 0,
            last_applied_seq: 0,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn base_code(&self) -> &'static str {
        SUPPORTED[self.base_idx].code
    }

    pub fn target_code(&self) -> &'static str {
        SUPPORTED[self.target_idx].code
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
            return;
        }

        if self.open_panel.is_some() {
            self.handle_panel_key(key);
            return;
        }

        match key.code {
            // Navigation between the three boxes
            KeyCode::Tab | KeyCode::Right => {
                self.section = match self.section {
                    Section::Base => Section::Target,
                    Section::Target => Section::Check,
                    Section::Check => Section::Base,
                };
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.section = match self.section {
                    Section::Base => Section::Check,
                    Section::Target => Section::Base,
                    Section::Check => Section::Target,
                };
            }

            KeyCode::Char(' ') | KeyCode::Enter => match self.section {
                Section::Base => self.open_dropdown(Selector::Base),
                Section::Target => self.open_dropdown(Selector::Target),
                Section::Check => self.start_check(),
            },

            // Check from anywhere
            KeyCode::Char('c') => self.start_check(),

            KeyCode::Char('?') => self.popup = Popup::Help,

            _ => {}
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        let panel = match self.open_panel {
            Some(p) => p,
            None => return,
        };

        match key.code {
            KeyCode::Esc => self.open_panel = None,
            KeyCode::Char('j') | KeyCode::Down => {
                self.panel_highlight = (self.panel_highlight + 1) % SUPPORTED.len();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.panel_highlight = self
                    .panel_highlight
                    .checked_sub(1)
                    .unwrap_or(SUPPORTED.len() - 1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.commit_option(panel, self.panel_highlight);
            }
            // Moving focus away closes the panel without changing the value
            KeyCode::Tab | KeyCode::Right => {
                self.open_panel = None;
                self.section = match panel {
                    Selector::Base => Section::Target,
                    Selector::Target => Section::Check,
                };
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return;
        }
        if self.popup == Popup::Help {
            self.popup = Popup::None;
            return;
        }

        let pos = Position::new(mouse.column, mouse.row);
        let layout = ui::layout(area);

        if let Some(panel) = self.open_panel {
            let trigger = match panel {
                Selector::Base => layout.base,
                Selector::Target => layout.target,
            };
            let panel_area = ui::panel_rect(trigger, area, SUPPORTED.len());

            if let Some(idx) = ui::panel_option_at(panel_area, pos) {
                if idx < SUPPORTED.len() {
                    self.commit_option(panel, idx);
                }
                return;
            }
            if trigger.contains(pos) {
                // Clicking the trigger of an open panel toggles it shut
                self.open_panel = None;
                return;
            }
            // Outside click closes; the click still acts on whatever it hit
            self.open_panel = None;
        }

        if layout.base.contains(pos) {
            self.section = Section::Base;
            self.open_dropdown(Selector::Base);
        } else if layout.target.contains(pos) {
            self.section = Section::Target;
            self.open_dropdown(Selector::Target);
        } else if layout.check.contains(pos) {
            self.section = Section::Check;
            self.start_check();
        }
    }

    /// Open a dropdown panel. Any other open panel closes first.
    fn open_dropdown(&mut self, selector: Selector) {
        self.panel_highlight = match selector {
            Selector::Base => self.base_idx,
            Selector::Target => self.target_idx,
        };
        self.open_panel = Some(selector);
    }

    /// Commit a dropdown option: write the value through to selector state,
    /// close the panel. The trigger display follows the selector state.
    fn commit_option(&mut self, selector: Selector, idx: usize) {
        match selector {
            Selector::Base => self.base_idx = idx,
            Selector::Target => self.target_idx = idx,
        }
        self.open_panel = None;

        self.config.base = self.base_code().to_string();
        self.config.target = self.target_code().to_string();
        if let Err(e) = self.config.save() {
            self.set_status_message(format!("Could not save config: {}", e));
        }
    }

    /// Kick off one check. Overlapping checks are allowed; whichever
    /// response lands last is the one displayed.
    pub fn start_check(&mut self) {
        let base = self.base_code().to_string();
        let target = self.target_code().to_string();

        if base == target {
            self.status = Status::same_pair();
            return;
        }

        self.status = Status::checking();

        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight += 1;

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch(&base, &target).await;
            // Receiver only drops when the app does
            let _ = tx.send(CheckOutcome {
                seq,
                base,
                target,
                result,
            });
        });
    }

    /// Drain finished checks and housekeep transient messages. Called once
    /// per event-loop iteration.
    pub fn tick(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);

            if outcome.seq < self.last_applied_seq {
                tracing::debug!(
                    "check #{} finished after #{}; displaying the late result",
                    outcome.seq,
                    self.last_applied_seq
                );
            }
            self.last_applied_seq = self.last_applied_seq.max(outcome.seq);

            self.status = match &outcome.result {
                Ok(resp) => Status::from_response(&outcome.base, &outcome.target, resp),
                Err(e) => Status::from_error(e),
            };
        }

        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Push an outcome into the queue, bypassing the network. Test seam.
    #[cfg(test)]
    fn push_outcome(&mut self, outcome: CheckOutcome) {
        self.outcome_tx.send(outcome).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalKind;
    use crossterm::event::{KeyModifiers, MouseEventKind};

    fn test_app() -> App {
        App::new(AppConfig::default(), Some("http://127.0.0.1:1".to_string()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn screen() -> Rect {
        Rect::new(0, 0, 100, 30)
    }

    fn green_response() -> SignalResponse {
        SignalResponse {
            signal: SignalKind::Green,
            label: "Great time to convert".to_string(),
            latest: Some(1.2345),
            p50: Some(1.2),
            p75: Some(1.25),
            days: Some(30),
        }
    }

    #[test]
    fn test_initial_trigger_follows_configured_value() {
        let config = AppConfig {
            base: "EUR".to_string(),
            target: "GBP".to_string(),
            ..AppConfig::default()
        };
        let app = App::new(config, None);
        assert_eq!(app.base_code(), "EUR");
        assert_eq!(SUPPORTED[app.base_idx].flag, "🇪🇺");
        assert_eq!(app.target_code(), "GBP");
        assert_eq!(app.open_panel, None);
    }

    #[test]
    fn test_unknown_configured_code_falls_back_silently() {
        let config = AppConfig {
            base: "DOGE".to_string(),
            ..AppConfig::default()
        };
        let app = App::new(config, None);
        assert_eq!(app.base_code(), "USD");
    }

    #[tokio::test]
    async fn test_same_pair_is_rejected_without_a_request() {
        let mut app = test_app();
        app.target_idx = app.base_idx;
        app.start_check();
        assert_eq!(app.status, Status::same_pair());
        assert_eq!(app.in_flight, 0);
    }

    #[tokio::test]
    async fn test_check_shows_interim_status_and_spawns_once() {
        let mut app = test_app();
        app.start_check();
        assert_eq!(app.status, Status::checking());
        assert_eq!(app.in_flight, 1);
    }

    #[test]
    fn test_last_completed_response_wins() {
        let mut app = test_app();
        app.push_outcome(CheckOutcome {
            seq: 2,
            base: "USD".to_string(),
            target: "EUR".to_string(),
            result: Ok(green_response()),
        });
        app.push_outcome(CheckOutcome {
            seq: 1,
            base: "USD".to_string(),
            target: "GBP".to_string(),
            result: Err(SignalError::Api("bad pair".to_string())),
        });
        app.tick();
        // The late completion (an older request) is what stays displayed
        assert_eq!(app.status.kind, SignalKind::Red);
        assert_eq!(app.status.details, "bad pair");
        assert_eq!(app.in_flight, 0);
    }

    #[test]
    fn test_opening_one_panel_closes_the_other() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.open_panel, Some(Selector::Base));

        // Click the target selector while the base panel is open
        let layout = ui::layout(screen());
        let target_click = click(layout.target.x + 1, layout.target.y + 1);
        app.handle_mouse(target_click, screen());
        assert_eq!(app.open_panel, Some(Selector::Target));
    }

    #[test]
    fn test_option_click_commits_value_and_closes() {
        let mut app = test_app();
        let layout = ui::layout(screen());

        app.handle_mouse(click(layout.base.x + 1, layout.base.y + 1), screen());
        assert_eq!(app.open_panel, Some(Selector::Base));

        // Third entry in the panel (GBP), one row past the panel border
        let panel = ui::panel_rect(layout.base, screen(), SUPPORTED.len());
        app.handle_mouse(click(panel.x + 2, panel.y + 1 + 2), screen());

        assert_eq!(app.open_panel, None);
        assert_eq!(app.base_code(), "GBP");
    }

    #[test]
    fn test_outside_click_closes_without_changing_value() {
        let mut app = test_app();
        let before = app.base_code();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.open_panel, Some(Selector::Base));

        // Click into the badge region, clear of the panel and all triggers
        app.handle_mouse(click(60, 20), screen());
        assert_eq!(app.open_panel, None);
        assert_eq!(app.base_code(), before);
    }

    #[test]
    fn test_keyboard_selection_updates_trigger() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.open_panel, None);
        assert_eq!(app.base_code(), "EUR");
    }

    #[test]
    fn test_escape_closes_panel_and_keeps_value() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.open_panel, None);
        assert_eq!(app.base_code(), "USD");
    }
}
