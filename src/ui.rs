use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gdp_dashboard::view::{self, TableView};
use gdp_dashboard::{AppData, CountryPerformance, Dashboard, ForecastDetail, Model};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState,
        Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

const PAGE_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Countries,
    Continents,
    ForecastDetail,
    Insights,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::Countries,
        Page::Continents,
        Page::ForecastDetail,
        Page::Insights,
    ];

    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::Countries,
            Page::Countries => Page::Continents,
            Page::Continents => Page::ForecastDetail,
            Page::ForecastDetail => Page::Insights,
            Page::Insights => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::Insights,
            Page::Countries => Page::Overview,
            Page::Continents => Page::Countries,
            Page::ForecastDetail => Page::Continents,
            Page::Insights => Page::ForecastDetail,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Overview",
            Page::Countries => "Countries",
            Page::Continents => "Continents",
            Page::ForecastDetail => "Forecast Detail",
            Page::Insights => "Insights",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App {
    pub dashboard: Dashboard,
    pub data: AppData,
    pub current_page: Page,
    pub view: TableView,
    pub visible: Vec<CountryPerformance>,
    pub state: TableState,
    pub continent_state: TableState,
    pub input_mode: InputMode,
    pub selected_country: Option<String>,
    pub detail_error: Option<String>,
    pub status_message: Option<String>,
    pub export_dir: PathBuf,
    continent_options: Vec<String>,
}

impl App {
    pub fn new(dashboard: Dashboard, export_dir: PathBuf) -> Self {
        let data = AppData::collect(&dashboard);
        let continent_options = view::continents(&data.country_performance);

        let mut continent_state = TableState::default();
        if !data.continent_stats.is_empty() {
            continent_state.select(Some(0));
        }

        let mut app = Self {
            dashboard,
            data,
            current_page: Page::Overview,
            view: TableView::default(),
            visible: Vec::new(),
            state: TableState::default(),
            continent_state,
            input_mode: InputMode::Normal,
            selected_country: None,
            detail_error: None,
            status_message: None,
            export_dir,
            continent_options,
        };
        app.apply_view();
        app
    }

    /// Recompute visible rows from the current filter/sort and reset the selection
    pub fn apply_view(&mut self) {
        self.visible = view::visible_rows(&self.data.country_performance, &self.view);
        if self.visible.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.view.filter.search.push(c);
        self.apply_view();
    }

    pub fn pop_search_char(&mut self) {
        self.view.filter.search.pop();
        self.apply_view();
    }

    pub fn cycle_continent_filter(&mut self) {
        self.view.filter.continent = view::cycle(&self.view.filter.continent, &self.continent_options);
        self.apply_view();
    }

    pub fn cycle_winner_filter(&mut self) {
        self.view.filter.winner = view::cycle(&self.view.filter.winner, &Model::ALL);
        self.apply_view();
    }

    pub fn cycle_sort(&mut self) {
        self.view.sort_by(self.view.sort.next());
        self.apply_view();
    }

    pub fn toggle_direction(&mut self) {
        self.view.direction = self.view.direction.toggle();
        self.apply_view();
    }

    pub fn clear_filter(&mut self) {
        self.view = TableView::default();
        self.status_message = None;
        self.apply_view();
    }

    pub fn selected_row(&self) -> Option<&CountryPerformance> {
        self.state.selected().and_then(|i| self.visible.get(i))
    }

    /// Load (or reuse) a country's forecast detail and switch to its page.
    /// Failures are kept for the error banner.
    pub fn open_detail(&mut self, country: &str) {
        match self.data.forecast_detail(&self.dashboard, country) {
            Ok(_) => self.detail_error = None,
            Err(e) => self.detail_error = Some(e.to_string()),
        }
        self.selected_country = Some(country.to_string());
        self.current_page = Page::ForecastDetail;
    }

    pub fn open_selected_detail(&mut self) {
        if let Some(country) = self.selected_row().map(|r| r.country.clone()) {
            self.open_detail(&country);
        }
    }

    /// Step through the country list from the detail page
    pub fn step_detail_country(&mut self, forward: bool) {
        let names: Vec<&str> = self.data.countries.iter().map(|c| c.country.as_str()).collect();
        if names.is_empty() {
            return;
        }
        let current = self
            .selected_country
            .as_deref()
            .and_then(|c| names.iter().position(|n| *n == c));
        let idx = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % names.len(),
            (Some(i), false) => (i + names.len() - 1) % names.len(),
        };
        let country = names[idx].to_string();
        self.open_detail(&country);
    }

    pub fn current_detail(&self) -> Option<&ForecastDetail> {
        if self.detail_error.is_some() {
            return None;
        }
        self.selected_country
            .as_deref()
            .and_then(|c| self.data.cached_detail(c))
    }

    /// Write the visible rows to a timestamped CSV in the export directory
    pub fn export_visible(&mut self) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.export_dir)
            .with_context(|| format!("Failed to create {}", self.export_dir.display()))?;
        let path = self.export_dir.join(view::export_file_name(Utc::now()));
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        view::export_csv(&self.visible, file)?;
        Ok(path)
    }

    fn active_table(&mut self) -> (&mut TableState, usize) {
        match self.current_page {
            Page::Continents => (&mut self.continent_state, self.data.continent_stats.len()),
            _ => (&mut self.state, self.visible.len()),
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = state.selected().map(|i| (i + PAGE_STEP).min(len - 1)).unwrap_or(0);
        state.select(Some(i));
    }

    pub fn first(&mut self) {
        let (state, len) = self.active_table();
        if len > 0 {
            state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        let (state, len) = self.active_table();
        if len > 0 {
            state.select(Some(len - 1));
        }
    }

    pub fn page_up(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = state.selected().map(|i| i.saturating_sub(PAGE_STEP)).unwrap_or(0);
        state.select(Some(i));
    }

    /// Apply a key press. Returns false when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.input_mode == InputMode::Search {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Backspace => self.pop_search_char(),
                KeyCode::Char(c) => self.push_search_char(c),
                _ => {}
            }
            return true;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.current_page = Page::ALL[idx];
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.first(),
            KeyCode::End => self.last(),
            KeyCode::Char('/') if self.current_page == Page::Countries => {
                self.input_mode = InputMode::Search;
            }
            KeyCode::Char('f') if self.current_page == Page::Countries => self.cycle_continent_filter(),
            KeyCode::Char('w') if self.current_page == Page::Countries => self.cycle_winner_filter(),
            KeyCode::Char('s') if self.current_page == Page::Countries => self.cycle_sort(),
            KeyCode::Char('r') if self.current_page == Page::Countries => self.toggle_direction(),
            KeyCode::Char('c') if self.current_page == Page::Countries => self.clear_filter(),
            KeyCode::Char('e') if self.current_page == Page::Countries => {
                self.status_message = Some(match self.export_visible() {
                    Ok(path) => format!("Exported {} rows to {}", self.visible.len(), path.display()),
                    Err(e) => format!("Export failed: {:#}", e),
                });
            }
            KeyCode::Enter if self.current_page == Page::Countries => self.open_selected_detail(),
            KeyCode::Char('n') if self.current_page == Page::ForecastDetail => {
                self.step_detail_country(true)
            }
            KeyCode::Char('p') if self.current_page == Page::ForecastDetail => {
                self.step_detail_country(false)
            }
            _ => {}
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

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Dashboard UI failed")
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn model_color(model: Model) -> Color {
    match model {
        Model::Arima => Color::Cyan,
        Model::Prophet => Color::Magenta,
    }
}

fn header_row(titles: &[&str]) -> Row<'static> {
    let cells: Vec<Cell> = titles
        .iter()
        .map(|h| Cell::from(h.to_string()).style(header_style()))
        .collect();
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Overview => render_overview(f, chunks[1], app),
        Page::Countries => render_countries(f, chunks[1], app),
        Page::Continents => render_continents(f, chunks[1], app),
        Page::ForecastDetail => render_forecast_detail(f, chunks[1], app),
        Page::Insights => render_insights(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Countries: {}", app.data.countries.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("ARIMA {}", app.data.wins_for(Model::Arima)),
        Style::default().fg(model_color(Model::Arima)),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Prophet {}", app.data.wins_for(Model::Prophet)),
        Style::default().fg(model_color(Model::Prophet)),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" GDP Forecast Dashboard "),
    );
    f.render_widget(header, area);
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let global = &app.data.global;
    let metric_rows = Model::ALL.iter().map(|model| {
        let metrics = global.for_model(*model);
        Row::new(vec![
            Cell::from(model.as_str()).style(Style::default().fg(model_color(*model))),
            Cell::from(format!("{:.2}", metrics.mae / 1e9)),
            Cell::from(format!("{:.2}", metrics.rmse / 1e9)),
            Cell::from(format!("{:.2}%", metrics.mape)),
            Cell::from(app.data.wins_for(*model).to_string()),
        ])
    });
    let metrics_table = Table::new(
        metric_rows,
        [
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["Model", "MAE (B)", "RMSE (B)", "MAPE", "Wins"]))
    .block(bordered(" Global Metrics "));
    f.render_widget(metrics_table, chunks[0]);

    let top_rows = app.data.top_countries.iter().enumerate().map(|(i, t)| {
        Row::new(vec![
            Cell::from(format!("{}", i + 1)),
            Cell::from(truncate(&t.country, 30)),
            Cell::from(truncate(&t.continent, 18)),
            Cell::from(format!("{:.3}", t.gdp)).style(Style::default().fg(Color::Green)),
        ])
    });
    let year = app
        .data
        .top_countries
        .first()
        .map(|t| t.year.clone())
        .unwrap_or_default();
    let title = format!(" Top Economies {} (trillions USD) ", year);
    let top_table = Table::new(
        top_rows,
        [
            Constraint::Length(4),
            Constraint::Length(32),
            Constraint::Length(20),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["#", "Country", "Continent", "GDP (T)"]))
    .block(bordered(&title));
    f.render_widget(top_table, chunks[1]);
}

fn render_countries(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let filter = &app.view.filter;
    let filter_line = Line::from(vec![
        Span::styled(" Search: ", Style::default().fg(Color::Cyan)),
        Span::styled(format!("{}_", filter.search), search_style),
        Span::raw("  |  "),
        Span::styled("Continent: ", Style::default().fg(Color::Cyan)),
        Span::raw(filter.continent.clone().unwrap_or_else(|| "All".to_string())),
        Span::raw("  |  "),
        Span::styled("Winner: ", Style::default().fg(Color::Cyan)),
        Span::raw(filter.winner.map(|m| m.to_string()).unwrap_or_else(|| "All".to_string())),
        Span::raw("  |  "),
        Span::styled("Sort: ", Style::default().fg(Color::Cyan)),
        Span::raw(format!("{} {}", app.view.sort.title(), app.view.direction.arrow())),
    ]);
    let filter_title = if filter.is_active() { " Filters (active) " } else { " Filters " };
    f.render_widget(Paragraph::new(filter_line).block(bordered(filter_title)), chunks[0]);

    let rows = app.visible.iter().map(|r| {
        let color = model_color(r.winner);
        Row::new(vec![
            Cell::from(truncate(&r.country, 28)),
            Cell::from(truncate(&r.continent, 16)),
            Cell::from(format!("{:.2}", r.arima_mae)),
            Cell::from(format!("{:.2}", r.arima_rmse)),
            Cell::from(format!("{:.2}", r.arima_mape)),
            Cell::from(format!("{:.2}", r.prophet_mae)),
            Cell::from(format!("{:.2}", r.prophet_rmse)),
            Cell::from(format!("{:.2}", r.prophet_mape)),
            Cell::from(r.winner.as_str()).style(Style::default().fg(color)),
        ])
    });

    let title = format!(
        " Country Performance ({} of {}) ",
        app.visible.len(),
        app.data.country_performance.len()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(18),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(9),
        ],
    )
    .header(header_row(&[
        "Country", "Continent", "ARIMA MAE", "ARIMA RMSE", "ARIMA %", "Proph MAE", "Proph RMSE",
        "Proph %", "Winner",
    ]))
    .block(bordered(&title))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);
}

fn render_continents(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let stats_rows = app.data.continent_stats.iter().map(|s| {
        Row::new(vec![
            Cell::from(truncate(&s.continent, 20)),
            Cell::from(s.total_countries.to_string()),
            Cell::from(s.arima_wins.to_string()).style(Style::default().fg(model_color(Model::Arima))),
            Cell::from(s.prophet_wins.to_string()).style(Style::default().fg(model_color(Model::Prophet))),
            Cell::from(format!("{:.2}%", s.avg_arima_mape)),
            Cell::from(format!("{:.2}%", s.avg_prophet_mape)),
        ])
    });
    let stats_table = Table::new(
        stats_rows,
        [
            Constraint::Length(22),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(16),
            Constraint::Length(18),
        ],
    )
    .header(header_row(&[
        "Continent", "Countries", "ARIMA wins", "Prophet wins", "Avg ARIMA MAPE", "Avg Prophet MAPE",
    ]))
    .block(bordered(" Continent Statistics "))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");
    f.render_stateful_widget(stats_table, chunks[0], &mut app.continent_state);

    let perf_rows = app.data.continent_performance.iter().map(|c| {
        Row::new(vec![
            Cell::from(truncate(&c.continent, 20)),
            Cell::from(format!("{:.2}", c.arima_mae / 1e9)),
            Cell::from(format!("{:.2}", c.arima_rmse / 1e9)),
            Cell::from(format!("{:.2}%", c.arima_mape)),
            Cell::from(format!("{:.2}", c.prophet_mae / 1e9)),
            Cell::from(format!("{:.2}", c.prophet_rmse / 1e9)),
            Cell::from(format!("{:.2}%", c.prophet_mape)),
        ])
    });
    let perf_table = Table::new(
        perf_rows,
        [
            Constraint::Length(22),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&[
        "Continent", "ARIMA MAE", "ARIMA RMSE", "ARIMA %", "Proph MAE", "Proph RMSE", "Proph %",
    ]))
    .block(bordered(" Continent Performance (billions) "));
    f.render_widget(perf_table, chunks[1]);
}

fn render_forecast_detail(f: &mut Frame, area: Rect, app: &App) {
    if let Some(error) = &app.detail_error {
        let country = app.selected_country.as_deref().unwrap_or("?");
        let banner = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}: {}", country, error),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        );
        f.render_widget(banner, area);
        return;
    }

    let Some(detail) = app.current_detail() else {
        let hint = Paragraph::new("  Select a country on the Countries page and press Enter (or n/p here)")
            .block(bordered(" Forecast Detail "));
        f.render_widget(hint, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(8)])
        .split(area);

    let actual: Vec<(f64, f64)> = detail
        .data
        .iter()
        .filter_map(|p| p.actual.map(|v| (p.year as f64, v)))
        .collect();
    let arima: Vec<(f64, f64)> = detail
        .data
        .iter()
        .filter_map(|p| p.forecast_arima.map(|v| (p.year as f64, v)))
        .collect();
    let prophet: Vec<(f64, f64)> = detail
        .data
        .iter()
        .filter_map(|p| p.forecast_prophet.map(|v| (p.year as f64, v)))
        .collect();

    let (x_min, x_max) = detail
        .data
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.year as f64), hi.max(p.year as f64)));
    let y_max = actual
        .iter()
        .chain(&arima)
        .chain(&prophet)
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max)
        * 1.1;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let datasets = vec![
        Dataset::default()
            .name("Actual")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::White))
            .data(&actual),
        Dataset::default()
            .name("ARIMA")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(model_color(Model::Arima)))
            .data(&arima),
        Dataset::default()
            .name("Prophet")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(model_color(Model::Prophet)))
            .data(&prophet),
    ];

    let title = format!(" {} ({}) - GDP, billions USD ", detail.country, detail.continent);
    let chart = Chart::new(datasets)
        .block(bordered(&title))
        .x_axis(
            Axis::default()
                .title("Year")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(format!("{}", x_min as i32)),
                    Span::raw(format!("{}", ((x_min + x_max) / 2.0) as i32)),
                    Span::raw(format!("{}", x_max as i32)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("GDP (B)")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );
    f.render_widget(chart, chunks[0]);

    let winner_rows = detail.winners.iter().map(|w| {
        Row::new(vec![
            Cell::from(w.year.to_string()),
            Cell::from(w.winner.as_str()).style(Style::default().fg(model_color(w.winner))),
            Cell::from(format!("{:.2}", w.arima_error)),
            Cell::from(format!("{:.2}", w.prophet_error)),
        ])
    });
    let title = format!(
        " Winners: ARIMA {} / Prophet {} of {} years ",
        detail.arima_wins, detail.prophet_wins, detail.total_forecast_years
    );
    let winners = Table::new(
        winner_rows,
        [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(16),
        ],
    )
    .header(header_row(&["Year", "Winner", "ARIMA err (B)", "Prophet err (B)"]))
    .block(bordered(&title));
    f.render_widget(winners, chunks[1]);
}

fn render_insights(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let mut lines = vec![Line::from("")];
    for insight in app.data.insights() {
        lines.push(Line::from(Span::styled(
            format!("  {}", insight.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("    {}", insight.detail)));
        lines.push(Line::from(""));
    }
    let insights = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered(" Key Findings "));
    f.render_widget(insights, chunks[0]);

    let rows = app.data.top_improvements.iter().map(|i| {
        Row::new(vec![
            Cell::from(truncate(&i.country, 28)),
            Cell::from(truncate(&i.continent, 16)),
            Cell::from(format!("{:.1}%", i.mae_improvement)).style(Style::default().fg(Color::Green)),
            Cell::from(
                i.rmse_improvement
                    .map(|v| format!("{:.1}%", v))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::from(format!("{:.2}", i.arima_mae)),
            Cell::from(format!("{:.2}", i.prophet_mae)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["Country", "Continent", "MAE gain", "RMSE gain", "ARIMA MAE", "Proph MAE"]))
    .block(bordered(" Top Improvements with Prophet "));
    f.render_widget(table, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if app.current_page == Page::Countries {
        let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
        status_spans.push(Span::styled(
            format!(" Row: {}/{} ", selected, app.visible.len()),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::raw("| "));
    }

    if let Some(message) = &app.status_message {
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" | "));
    }

    let keys: &[(&str, &str)] = match (app.input_mode, app.current_page) {
        (InputMode::Search, _) => &[("type", " to search, "), ("Enter/Esc", " done")],
        (_, Page::Countries) => &[
            ("/", " Search | "),
            ("f", " Continent | "),
            ("w", " Winner | "),
            ("s/r", " Sort | "),
            ("e", " Export | "),
            ("c", " Clear | "),
            ("Enter", " Detail | "),
            ("q", " Quit"),
        ],
        (_, Page::ForecastDetail) => &[("n/p", " Next/Prev country | "), ("Tab", " Page | "), ("q", " Quit")],
        _ => &[("Tab/1-5", " Page | "), ("↑/↓", " Nav | "), ("q", " Quit")],
    };
    for (key, label) in keys {
        let color = if *key == "q" { Color::Red } else { Color::Yellow };
        status_spans.push(Span::styled(*key, Style::default().fg(color)));
        status_spans.push(Span::raw(*label));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
