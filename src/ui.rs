use anyhow::Result;
use car_rental::{
    book_from_form_at, save_catalog, search, Car, Catalog, Receipt, RentalError, SearchQuery,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    Book,
    Receipt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Three labelled text inputs with one focused
#[derive(Debug, Clone)]
pub struct Form {
    pub labels: [&'static str; 3],
    pub values: [String; 3],
    pub focus: usize,
}

impl Form {
    fn new(labels: [&'static str; 3]) -> Self {
        Form {
            labels,
            values: Default::default(),
            focus: 0,
        }
    }

    fn push(&mut self, c: char) {
        self.values[self.focus].push(c);
    }

    fn backspace(&mut self) {
        self.values[self.focus].pop();
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.values.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + self.values.len() - 1) % self.values.len();
    }
}

pub struct App {
    pub catalog: Catalog,
    pub catalog_path: PathBuf,
    /// Catalog as last read from or written to disk
    saved: Catalog,
    pub results: Vec<Car>,
    pub state: TableState,
    pub mode: Mode,
    pub search_form: Form,
    pub booking_form: Form,
    pub receipt: Option<Receipt>,
    pub status: Option<(StatusKind, String)>,
}

impl App {
    pub fn new(catalog: Catalog, catalog_path: PathBuf) -> Self {
        let results = catalog.cars().to_vec();
        let mut state = TableState::default();
        if !results.is_empty() {
            state.select(Some(0));
        }

        Self {
            saved: catalog.clone(),
            catalog,
            catalog_path,
            results,
            state,
            mode: Mode::Browse,
            search_form: Form::new(["Year", "Name", "Company"]),
            booking_form: Form::new(["Car Code", "Legal Name", "Days"]),
            receipt: None,
            status: None,
        }
    }

    pub fn set_info(&mut self, message: String) {
        self.status = Some((StatusKind::Info, message));
    }

    pub fn set_error(&mut self, message: String) {
        self.status = Some((StatusKind::Error, message));
    }

    pub fn selected_car(&self) -> Option<&Car> {
        self.state.selected().and_then(|i| self.results.get(i))
    }

    pub fn run_search(&mut self) {
        let [year, name, company] = &self.search_form.values;
        let query = SearchQuery::from_form(year, name, company);

        self.results = search(&self.catalog, &query).into_iter().cloned().collect();
        if self.results.is_empty() {
            self.state.select(None);
            self.set_info("No matching cars found.".to_string());
        } else {
            self.state.select(Some(0));
            self.status = None;
        }
        self.mode = Mode::Browse;
    }

    pub fn clear_search(&mut self) {
        self.search_form = Form::new(self.search_form.labels);
        self.run_search();
    }

    /// Copy the highlighted car's code into the booking form and open it
    pub fn select_for_booking(&mut self) {
        if let Some(code) = self.selected_car().map(|c| c.code.clone()) {
            self.booking_form.values[0] = code;
            self.booking_form.focus = 1;
        }
        self.mode = Mode::Book;
    }

    pub fn submit_booking(&mut self) {
        let [code, name, days] = &self.booking_form.values;
        let result = book_from_form_at(&self.catalog, code, name, days, chrono::Local::now());

        match result {
            Ok(receipt) => {
                self.receipt = Some(receipt);
                self.status = None;
                self.mode = Mode::Receipt;
            }
            Err(err) => {
                self.set_error(format!("Invalid input: {}", err));
            }
        }
    }

    /// True when the in-memory catalog differs from what is on disk
    pub fn is_dirty(&self) -> bool {
        self.catalog != self.saved
    }

    /// Explicit save. Rewrites the file even when nothing changed, which
    /// drops rows the load report rejected.
    pub fn save(&mut self) {
        match save_catalog(&self.catalog_path, &self.catalog) {
            None => {
                self.saved = self.catalog.clone();
                self.set_info(format!(
                    "Saved {} cars to {}",
                    self.catalog.len(),
                    self.catalog_path.display()
                ));
            }
            Some(err) => self.set_error(err.to_string()),
        }
    }

    /// Exit-time save, skipped when the session changed nothing so that
    /// rows the loader rejected stay in the file.
    pub fn save_on_exit(&mut self) -> Option<RentalError> {
        if !self.is_dirty() {
            return None;
        }
        let err = save_catalog(&self.catalog_path, &self.catalog);
        if err.is_none() {
            self.saved = self.catalog.clone();
        }
        err
    }

    pub fn next(&mut self) {
        let len = self.results.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.results.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn active_form(&mut self) -> Option<&mut Form> {
        match self.mode {
            Mode::Search => Some(&mut self.search_form),
            Mode::Book => Some(&mut self.booking_form),
            _ => None,
        }
    }

    /// Returns false when the app should exit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match self.mode {
            Mode::Receipt => {
                self.receipt = None;
                self.mode = Mode::Browse;
            }
            Mode::Browse => match code {
                KeyCode::Char('q') | KeyCode::Esc => return false,
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Char('/') => self.mode = Mode::Search,
                KeyCode::Char('b') => self.mode = Mode::Book,
                KeyCode::Enter => self.select_for_booking(),
                KeyCode::Char('c') => self.clear_search(),
                KeyCode::Char('s') => self.save(),
                _ => {}
            },
            Mode::Search | Mode::Book => match code {
                KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Enter => {
                    if self.mode == Mode::Search {
                        self.run_search();
                    } else {
                        self.submit_booking();
                    }
                }
                _ => {
                    if let Some(form) = self.active_form() {
                        match code {
                            KeyCode::Tab | KeyCode::Down => form.next_field(),
                            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                            KeyCode::Backspace => form.backspace(),
                            KeyCode::Char(c) => form.push(c),
                            _ => {}
                        }
                    }
                }
            },
        }
        true
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key.code, key.modifiers) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Car table
            Constraint::Length(5), // Search + booking forms
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_table(f, chunks[1], app);

    let forms = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_form(f, forms[0], " Search ", &app.search_form, app.mode == Mode::Search);
    render_form(f, forms[1], " Book ", &app.booking_form, app.mode == Mode::Book);

    render_status_bar(f, chunks[3], app);

    if let Some(receipt) = &app.receipt {
        render_receipt(f, receipt);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            "Car Rental System",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Catalog: {}", app.catalog.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Shown: {}", app.results.len()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Code", "Year", "Name", "Company", "Rate"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.results.iter().map(|car| {
        Row::new(vec![
            Cell::from(car.code.clone()),
            Cell::from(car.year.to_string()),
            Cell::from(truncate(&car.name, 30)),
            Cell::from(truncate(&car.company, 24)),
            Cell::from(format!("{:.2}", car.rate)).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(32),
            Constraint::Length(26),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Cars "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_form(f: &mut Frame, area: Rect, title: &str, form: &Form, active: bool) {
    let lines: Vec<Line> = form
        .labels
        .iter()
        .zip(form.values.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            let label_style = if active && i == form.focus {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let cursor = if active && i == form.focus { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:>11}: ", label), label_style),
                Span::raw(format!("{}{}", value, cursor)),
            ])
        })
        .collect();

    let border = if active { Color::Yellow } else { Color::White };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    if let Some((kind, message)) = &app.status {
        let color = match kind {
            StatusKind::Info => Color::Green,
            StatusKind::Error => Color::Red,
        };
        spans.push(Span::styled(format!(" {} ", message), Style::default().fg(color)));
        spans.push(Span::raw("|"));
    }

    let keys: &[(&str, &str)] = match app.mode {
        Mode::Browse => &[
            ("/", "Search"),
            ("b", "Book"),
            ("Enter", "Book selected"),
            ("c", "Clear"),
            ("s", "Save"),
            ("q", "Quit"),
        ],
        Mode::Search | Mode::Book => &[("Tab", "Next field"), ("Enter", "Submit"), ("Esc", "Back")],
        Mode::Receipt => &[("any key", "Close")],
    };
    for (key, action) in keys {
        spans.push(Span::styled(format!(" {}", key), Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {} ", action)));
    }

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

fn render_receipt(f: &mut Frame, receipt: &Receipt) {
    let area = centered_rect(60, 60, f.size());
    let text: Vec<Line> = receipt
        .render()
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();

    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Receipt "),
        );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
