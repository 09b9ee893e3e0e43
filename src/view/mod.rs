//! TUI rendering and terminal management (impure shell)

pub mod constants;
pub mod host;
pub mod render;

pub use host::{CardView, TerminalHost};
pub use render::{StatusInfo, card_rect, render_cards, render_status, truncate_to_width};

use crate::config::keybindings::{KeyBindings, SORT_SLOTS};
use crate::config::ResolvedConfig;
use crate::grid::sort::parse_date_millis;
use crate::grid::{PassPhase, ReconciliationController, SortKind, SortSpec};
use crate::model::{GridError, KeyAction};
use crate::source::{field_text, item_key};
use constants::{FRAME_INTERVAL, IDLE_POLL_INTERVAL, STATUS_BAR_HEIGHT};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEvent},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
};
use serde_json::Value;
use std::io::{self, Stdout};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// A reconciliation pass failed while setting up the grid
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}

/// The grid controller as hosted by the terminal.
pub type TerminalGrid = ReconciliationController<Value, String, TerminalHost>;

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    grid: TerminalGrid,
    /// Dataset as loaded, restored by reset.
    dataset: Vec<Value>,
    /// Items removed by pop/shift, most recent last.
    removed: Vec<Value>,
    filter_field: String,
    /// Distinct values of the filter field in dataset order.
    filter_values: Vec<String>,
    filter_cursor: Option<usize>,
    sort_fields: Vec<SortSpec>,
    key_bindings: KeyBindings,
    last_error: Option<String>,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn start(dataset: Vec<Value>, config: &ResolvedConfig) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Self::new(terminal, dataset, config)
    }

    /// Run the main event loop
    ///
    /// Returns when user quits. Polls at frame rate while a pass is in flight and slowly
    /// otherwise.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let animating = self.grid.is_busy();
            self.tick(Instant::now());

            let timeout = if self.grid.is_busy() {
                FRAME_INTERVAL
            } else {
                IDLE_POLL_INTERVAL
            };

            let mut dirty = animating;
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Resize(width, _) => {
                        self.handle_resize(width);
                        dirty = true;
                    }
                    _ => {}
                }
            }

            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the app on `terminal` and start the first pass over `dataset`.
    pub fn new(
        terminal: Terminal<B>,
        dataset: Vec<Value>,
        config: &ResolvedConfig,
    ) -> Result<Self, TuiError> {
        let columns = match terminal.size() {
            Ok(size) if size.width > 0 => size.width,
            _ => 80,
        };
        let host = TerminalHost::new(
            columns,
            config.label_field.clone(),
            config.filter_field.clone(),
        );
        let key_field = config.key_field.clone();
        let mut grid = ReconciliationController::new(host, config.grid_options(), move |item| {
            item_key(item, &key_field)
        });
        grid.apply(dataset.clone())?;

        let sort_fields = if config.sort_fields.is_empty() {
            infer_sort_fields(&dataset)
        } else {
            config.sort_fields.clone()
        };

        Ok(Self {
            terminal,
            grid,
            filter_values: distinct_values(&dataset, &config.filter_field),
            dataset,
            removed: Vec::new(),
            filter_field: config.filter_field.clone(),
            filter_cursor: None,
            sort_fields,
            key_bindings: KeyBindings::default(),
            last_error: None,
        })
    }

    /// The hosted grid.
    pub fn grid(&self) -> &TerminalGrid {
        &self.grid
    }

    /// Terminal backend, for inspecting rendered buffers.
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    /// Sort fields bound to the digit keys.
    pub fn sort_fields(&self) -> &[SortSpec] {
        &self.sort_fields
    }

    /// Active filter value.
    pub fn active_filter(&self) -> Option<&str> {
        self.filter_cursor
            .and_then(|cursor| self.filter_values.get(cursor))
            .map(String::as_str)
    }

    /// Items removed by pop/shift and not yet put back.
    pub fn removed(&self) -> &[Value] {
        &self.removed
    }

    /// Message of the last failed request.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Finish the in-flight pass and any queued one immediately.
    pub fn settle(&mut self) -> Result<(), TuiError> {
        self.grid.settle(Instant::now())?;
        Ok(())
    }

    /// Hand the teardown of every card to the grid.
    pub fn dispose(&mut self) {
        self.grid.dispose();
    }

    fn tick(&mut self, now: Instant) {
        match self.grid.tick(now) {
            Ok(Some(ticket)) => debug!(pass = ticket.get(), "pass complete"),
            Ok(None) => {}
            Err(err) => self.record_error(err),
        }
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        debug!(?action, "key action");

        let result = match action {
            KeyAction::Quit => return true,
            KeyAction::SortBy(slot) => match self.sort_fields.get(slot).cloned() {
                Some(spec) => self.grid.sort_by(spec).map(drop),
                None => Ok(()),
            },
            KeyAction::Reverse => self.grid.reverse().map(drop),
            KeyAction::NextFilter => self.next_filter(),
            KeyAction::ClearFilter => {
                self.filter_cursor = None;
                self.grid.clear_filter().map(drop)
            }
            KeyAction::Pop => self.grid.pop().map(|item| self.removed.extend(item)),
            KeyAction::Shift => self.grid.shift().map(|item| self.removed.extend(item)),
            KeyAction::PushBack => match self.removed.pop() {
                Some(item) => self.grid.push([item]).map(drop),
                None => Ok(()),
            },
            KeyAction::UnshiftBack => match self.removed.pop() {
                Some(item) => self.grid.unshift([item]).map(drop),
                None => Ok(()),
            },
            KeyAction::Clear => self.grid.clear().map(drop),
            KeyAction::Reset => {
                self.removed.clear();
                self.grid.apply(self.dataset.clone()).map(drop)
            }
        };

        match result {
            Ok(()) => self.last_error = None,
            Err(err) => self.record_error(err),
        }
        false
    }

    /// The terminal is now `width` columns wide; relayout the grid.
    pub fn handle_resize(&mut self, width: u16) {
        debug!(width, "terminal resized");
        self.grid.host_mut().set_columns(width);
        if let Err(err) = self.grid.relayout() {
            self.record_error(err);
        }
    }

    fn next_filter(&mut self) -> Result<(), GridError> {
        if self.filter_values.is_empty() {
            return Ok(());
        }
        let next = match self.filter_cursor {
            None => Some(0),
            Some(cursor) if cursor + 1 < self.filter_values.len() => Some(cursor + 1),
            Some(_) => None,
        };
        self.filter_cursor = next;

        match self.active_filter() {
            Some(value) => {
                let field = self.filter_field.clone();
                let value = value.to_string();
                self.grid
                    .set_filter_fn(move |item| field_text(item, &field).as_deref() == Some(&*value))
                    .map(drop)
            }
            None => self.grid.clear_filter().map(drop),
        }
    }

    fn record_error(&mut self, err: GridError) {
        warn!(error = %err, "grid request failed");
        self.last_error = Some(err.to_string());
    }

    fn status_info(&self) -> StatusInfo {
        let direction = if self.grid.is_reversed() { " ↓" } else { "" };
        let sort = match self.grid.sort_spec() {
            Some(spec) => Some(format!("{spec}{direction}")),
            None if self.grid.is_reversed() => Some("source ↓".to_string()),
            None => None,
        };
        StatusInfo {
            items: self.grid.len(),
            columns: self.grid.geometry().map_or(0, |g| g.column_count),
            sort,
            filter: self.active_filter().map(str::to_string),
            phase: phase_label(self.grid.phase()),
            error: self.last_error.clone(),
        }
    }

    /// Render the current frame
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let status = self.status_info();
        let grid = &self.grid;
        self.terminal.draw(|frame| {
            let [body, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                    .areas(frame.area());
            render_cards(frame, body, grid.views().map(|handle| handle.view()));
            render_status(frame, status_area, &status);
        })?;
        Ok(())
    }
}

fn phase_label(phase: PassPhase) -> &'static str {
    match phase {
        PassPhase::Idle => "idle",
        PassPhase::Diffing => "diffing",
        PassPhase::Mutating => "mutating",
        PassPhase::LayingOut => "layout",
        PassPhase::Animating => "animating",
    }
}

/// Distinct values of `field`, first occurrence first.
fn distinct_values(dataset: &[Value], field: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in dataset.iter().filter_map(|item| field_text(item, field)) {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

/// Sortable scalar fields of the first item, with a kind guessed from its value.
fn infer_sort_fields(dataset: &[Value]) -> Vec<SortSpec> {
    let Some(Value::Object(first)) = dataset.first() else {
        return Vec::new();
    };
    first
        .iter()
        .filter_map(|(field, value)| {
            let kind = match value {
                Value::Number(_) => SortKind::Number,
                Value::String(text) if parse_date_millis(text).is_some() => SortKind::Date,
                Value::String(_) => SortKind::String,
                _ => return None,
            };
            Some(SortSpec::new(field.clone(), kind))
        })
        .take(SORT_SLOTS)
        .collect()
}

/// Initialize and run the TUI application over `dataset`
///
/// Handles terminal setup, runs the event loop, and ensures cleanup on exit.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_with_dataset(dataset: Vec<Value>, config: &ResolvedConfig) -> Result<(), TuiError> {
    let result = TuiApp::start(dataset, config).and_then(|mut app| {
        let outcome = app.run();
        app.dispose();
        outcome
    });

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
