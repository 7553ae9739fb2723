//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which renders the reminder form,
//! routes key presses to it, drains pending geolocation requests and shows
//! blocking alerts for submission outcomes.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::info;

use crate::{
    controller::{TaskFormController, TaskSink, SUCCESS_MESSAGE},
    geolocation::PendingPosition,
    parse::format_coordinates,
    task::{MAX_RADIUS, MIN_RADIUS},
    tui::{
        colors::{BRAND_BLUE, DARK_GREEN, DARK_RED, GOLD, SLATE},
        enums::{AlertKind, AppState, FieldKind},
        input::InputField,
        task_form::{
            TaskForm, LOCATION_GLOBAL_ORDER, NAME_GLOBAL_ORDER, NOTES_GLOBAL_ORDER, PRIORITY_GLOBAL_ORDER,
            RADIUS_GLOBAL_ORDER, REPEAT_GLOBAL_ORDER, TIME_GLOBAL_ORDER, TRIGGER_GLOBAL_ORDER,
            TYPE_GLOBAL_ORDER, USE_CURRENT_GLOBAL_ORDER,
        },
        utils::centered_rect,
    },
};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    form: TaskForm,
    sink: Box<dyn TaskSink>,
    pending: Option<PendingPosition>,
    alert: Option<(AlertKind, String)>,
    status_message: String,
}

impl App {
    pub fn new(controller: TaskFormController, sink: Box<dyn TaskSink>) -> Self {
        App {
            state: AppState::Form,
            form: TaskForm::new(controller),
            sink,
            pending: None,
            alert: None,
            status_message: String::new(),
        }
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn show_alert(&mut self, kind: AlertKind, msg: String) {
        self.alert = Some((kind, msg));
        self.state = AppState::Alert;
    }

    /// Start a current-location request, replacing any request still in flight.
    fn use_current_location(&mut self) {
        self.pending = self.form.use_current_location();
        if self.pending.is_some() {
            self.set_status_message("Locating...".to_string());
        }
    }

    /// Apply a finished geolocation request, if there is one.
    pub fn poll_geolocation(&mut self) {
        let Some(result) = self.pending.as_ref().and_then(PendingPosition::try_take) else {
            return;
        };
        self.pending = None;
        self.status_message.clear();
        self.form.apply_position(result);
    }

    fn submit(&mut self) {
        match self.form.submit(self.sink.as_mut()) {
            Ok(task) => {
                info!(id = %task.id, name = %task.name, "reminder submitted from form");
                self.show_alert(AlertKind::Info, SUCCESS_MESSAGE.to_string());
            }
            Err(e) => self.show_alert(AlertKind::Error, e.to_string()),
        }
    }

    /// Handle keyboard input on the form.
    ///
    /// Returns true if the application should quit.
    fn handle_form_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('g') if modifiers.contains(KeyModifiers::CONTROL) => self.use_current_location(),
            KeyCode::Esc => return true,
            KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Char('?') if self.form.current_kind() != FieldKind::Text => self.state = AppState::Help,
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Enter => {
                if self.form.current_field == USE_CURRENT_GLOBAL_ORDER {
                    self.use_current_location();
                } else {
                    self.submit();
                }
            }
            KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.form.handle_char(c)
            }
            _ => {}
        }
        false
    }

    fn handle_alert_input(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.alert = None;
            self.state = AppState::Form;
        }
    }

    /// Dispatch one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match self.state {
            AppState::Form => return self.handle_form_input(key, modifiers),
            AppState::Alert => self.handle_alert_input(key),
            AppState::Help => self.state = AppState::Form,
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn field_style(&self, field: usize) -> Style {
        if self.form.current_field == field {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        }
    }

    fn render_input(&self, f: &mut Frame, area: Rect, field: usize, title: &str, input: &InputField) {
        let widget = Paragraph::new(input.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(self.field_style(field)),
        );
        f.render_widget(widget, area);

        if input.active && self.state == AppState::Form {
            let x = area.x + 1 + input.cursor.min(area.width.saturating_sub(3) as usize) as u16;
            f.set_cursor_position((x, area.y + 1));
        }
    }

    fn render_selector(&self, f: &mut Frame, area: Rect, field: usize, title: &str, value: &str) {
        let widget = Paragraph::new(format!("< {} >", value)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(self.field_style(field)),
        );
        f.render_widget(widget, area);
    }

    /// Render the reminder form in two columns.
    fn render_form(&mut self, f: &mut Frame, area: Rect) {
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Name
                Constraint::Length(3), // Type
                Constraint::Length(3), // Location
                Constraint::Length(2), // Location error / selected coordinates
                Constraint::Length(3), // Use Current
                Constraint::Length(3), // Radius
                Constraint::Min(0),
            ])
            .split(main_chunks[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Trigger
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Time
                Constraint::Length(3), // Repeat
                Constraint::Length(3), // Notes
                Constraint::Min(1),    // Instructions
            ])
            .split(main_chunks[1]);

        // LEFT COLUMN - what and where
        self.render_input(f, left_chunks[0], NAME_GLOBAL_ORDER, "Task Name *", &self.form.name);
        self.render_selector(f, left_chunks[1], TYPE_GLOBAL_ORDER, "Task Type", &self.form.task_type().to_string());
        self.render_input(
            f,
            left_chunks[2],
            LOCATION_GLOBAL_ORDER,
            "Location * (latitude, longitude)",
            &self.form.location,
        );

        let mut info = Vec::new();
        if let Some(err) = self.form.controller.location_error() {
            info.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))));
        }
        if let Some(loc) = self.form.controller.location() {
            info.push(Line::from(Span::styled(
                format!("Selected coordinates: {}", format_coordinates(loc.latitude, loc.longitude)),
                Style::default().fg(SLATE),
            )));
        }
        f.render_widget(Paragraph::new(info), left_chunks[3]);

        let button_label = if self.pending.is_some() { "Locating..." } else { "[ Use Current ]" };
        let button_style = if self.form.current_field == USE_CURRENT_GLOBAL_ORDER {
            Style::default().bg(BRAND_BLUE).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(BRAND_BLUE)
        };
        let button = Paragraph::new(button_label)
            .alignment(Alignment::Center)
            .style(button_style)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.field_style(USE_CURRENT_GLOBAL_ORDER)),
            );
        f.render_widget(button, left_chunks[4]);

        let radius = self.form.radius();
        let ratio = f64::from(radius.saturating_sub(MIN_RADIUS)) / f64::from(MAX_RADIUS - MIN_RADIUS);
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Trigger Radius ({}m)", radius))
                    .border_style(self.field_style(RADIUS_GLOBAL_ORDER)),
            )
            .gauge_style(Style::default().fg(BRAND_BLUE))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{} m", radius));
        f.render_widget(gauge, left_chunks[5]);

        // RIGHT COLUMN - when and how
        self.render_selector(
            f,
            right_chunks[0],
            TRIGGER_GLOBAL_ORDER,
            "Notification Trigger",
            &self.form.trigger().to_string(),
        );
        self.render_selector(f, right_chunks[1], PRIORITY_GLOBAL_ORDER, "Priority", &self.form.priority().to_string());
        self.render_input(f, right_chunks[2], TIME_GLOBAL_ORDER, "Time (YYYY-MM-DD HH:MM)", &self.form.time);
        self.render_selector(f, right_chunks[3], REPEAT_GLOBAL_ORDER, "Repeat", self.form.repeat_kind().label());
        self.render_input(f, right_chunks[4], NOTES_GLOBAL_ORDER, "Notes", &self.form.notes);

        let instructions = vec![
            Line::from("Tab/↑↓: move between fields"),
            Line::from("←/→: change selection or radius"),
            Line::from("Ctrl+G or Enter on [Use Current]: locate"),
            Line::from("Enter: create task"),
            Line::from("F1: help   Esc: quit"),
        ];
        let instructions = Paragraph::new(instructions)
            .style(Style::default().fg(SLATE))
            .block(Block::default().borders(Borders::ALL).title("Keys"));
        f.render_widget(instructions, right_chunks[5]);
    }

    fn render_alert(&mut self, f: &mut Frame, area: Rect) {
        let Some((kind, msg)) = self.alert.as_ref() else {
            return;
        };
        let (title, bg) = match kind {
            AlertKind::Info => ("Success", DARK_GREEN),
            AlertKind::Error => ("Cannot create task", DARK_RED),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().bg(bg).fg(Color::White));

        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(msg.as_str(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Press Enter to continue"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Location Reminder Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Form Navigation:", bold)),
            Line::from("  Tab/↓, BackTab/↑   Move between fields"),
            Line::from("  ←/→                Change type, trigger, priority, repeat; radius ±10 m"),
            Line::from("  Enter              Create task (locate on [Use Current])"),
            Line::from("  Ctrl+G             Use current location"),
            Line::from("  Esc/Ctrl+C         Quit"),
            Line::from(""),
            Line::from(Span::styled("Location:", bold)),
            Line::from("  Type coordinates as latitude, longitude (e.g., 51.5074, -0.1278)"),
            Line::from("  Radius ranges from 10 m to 1000 m"),
            Line::from(""),
            Line::from(Span::styled("Time Formats:", bold)),
            Line::from("  YYYY-MM-DD HH:MM   e.g., 2024-12-25 09:30"),
            Line::from("  YYYY-MM-DDTHH:MM   e.g., 2024-12-25T09:30"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Form => "New Location Task | F1 for help".to_string(),
                AppState::Alert => "Alert".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(BRAND_BLUE).fg(Color::White))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::Form => self.render_form(f, chunks[0]),
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Alert => {
                self.render_form(f, chunks[0]);
                self.render_alert(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering, input and geolocation results until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
            self.poll_geolocation();
        }
        Ok(())
    }
}
