//! Ratatui dashboard over the fetched search response.
//!
//! One fetch happens before the terminal is set up; the dashboard then
//! operates on that single response for the session. Every criteria change
//! recomputes the full visible list through [`filter_hits`].

use anyhow::{Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs};
use std::collections::BTreeSet;
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use crate::export::{ExportFormat, ExportOptions, export_results};
use crate::filter::{FilterCriteria, StatusFilter, filter_hits};
use crate::model::types::{FacetBucket, SearchResponse, TrademarkHit, TrademarkStatus};
use crate::ui::format::{description_snippet, format_class_codes, format_first_use_date, status_line};

/// Terminal analogue of the original 1480px viewport breakpoint: at or above
/// this many columns the results render as table rows instead of cards.
const LIST_LAYOUT_MIN_WIDTH: u16 = 120;

const TICK_RATE_MS: u64 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Results,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputMode {
    Browse,
    /// Editing the free-text result query.
    Query,
    /// Editing the facet option search (narrows the option list only).
    FacetSearch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FacetTab {
    Owners,
    LawFirms,
    Attorneys,
}

impl FacetTab {
    const ALL: [FacetTab; 3] = [FacetTab::Owners, FacetTab::LawFirms, FacetTab::Attorneys];

    fn label(self) -> &'static str {
        match self {
            Self::Owners => "Owners",
            Self::LawFirms => "Law Firms",
            Self::Attorneys => "Attorneys",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Owners => 0,
            Self::LawFirms => 1,
            Self::Attorneys => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Owners => Self::LawFirms,
            Self::LawFirms => Self::Attorneys,
            Self::Attorneys => Self::Owners,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Owners => Self::Attorneys,
            Self::LawFirms => Self::Owners,
            Self::Attorneys => Self::LawFirms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutOverride {
    Auto,
    Grid,
    List,
}

impl LayoutOverride {
    fn cycle(self) -> Self {
        match self {
            Self::Auto => Self::Grid,
            Self::Grid => Self::List,
            Self::List => Self::Auto,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

/// Sidebar color for each status button.
pub fn status_color(status: StatusFilter) -> Color {
    match status {
        StatusFilter::All => Color::Blue,
        StatusFilter::Registered => Color::Green,
        StatusFilter::Pending => Color::Yellow,
        StatusFilter::Abandoned => Color::Red,
        StatusFilter::Others => Color::Gray,
    }
}

fn classified_color(status: &TrademarkStatus) -> Color {
    match status {
        TrademarkStatus::Registered => Color::Green,
        TrademarkStatus::Pending => Color::Yellow,
        TrademarkStatus::Abandoned => Color::Red,
        TrademarkStatus::Other(_) => Color::Gray,
    }
}

struct App {
    response: Option<SearchResponse>,
    fetch_error: Option<String>,
    criteria: FilterCriteria,
    /// Derived from `response` + `criteria`; never fed back into either.
    visible: Vec<TrademarkHit>,
    focus: Focus,
    input_mode: InputMode,
    facet_tab: FacetTab,
    facet_search: String,
    facet_cursor: usize,
    result_cursor: usize,
    layout: LayoutOverride,
    notice: Option<String>,
    should_quit: bool,
}

impl App {
    fn new(response: Option<SearchResponse>, fetch_error: Option<String>) -> Self {
        let mut app = Self {
            response,
            fetch_error,
            criteria: FilterCriteria::default(),
            visible: Vec::new(),
            focus: Focus::Results,
            input_mode: InputMode::Browse,
            facet_tab: FacetTab::Owners,
            facet_search: String::new(),
            facet_cursor: 0,
            result_cursor: 0,
            layout: LayoutOverride::Auto,
            notice: None,
            should_quit: false,
        };
        app.recompute();
        app
    }

    fn total_hits(&self) -> usize {
        self.response.as_ref().map(|r| r.hits().len()).unwrap_or(0)
    }

    /// Recompute the visible list from scratch and clamp the cursors.
    fn recompute(&mut self) {
        self.visible = filter_hits(self.response.as_ref(), &self.criteria)
            .into_iter()
            .cloned()
            .collect();
        if self.result_cursor >= self.visible.len() {
            self.result_cursor = self.visible.len().saturating_sub(1);
        }
        let options = self.facet_options().len();
        if self.facet_cursor >= options {
            self.facet_cursor = options.saturating_sub(1);
        }
    }

    /// Buckets for the active tab, verbatim from the server aggregation.
    fn facet_buckets(&self) -> &[FacetBucket] {
        let Some(response) = &self.response else {
            return &[];
        };
        match self.facet_tab {
            FacetTab::Owners => response.owners(),
            FacetTab::LawFirms => response.law_firms(),
            FacetTab::Attorneys => response.attorneys(),
        }
    }

    /// Options shown in the sidebar list. The facet search narrows what is
    /// displayed, not what is offered: clearing it restores the full universe.
    fn facet_options(&self) -> Vec<&FacetBucket> {
        let needle = self.facet_search.trim().to_lowercase();
        self.facet_buckets()
            .iter()
            .filter(|b| needle.is_empty() || b.key.to_lowercase().contains(&needle))
            .collect()
    }

    fn selected_set(&self) -> &BTreeSet<String> {
        match self.facet_tab {
            FacetTab::Owners => &self.criteria.selected_owners,
            FacetTab::LawFirms => &self.criteria.selected_law_firms,
            FacetTab::Attorneys => &self.criteria.selected_attorneys,
        }
    }

    fn selected_set_mut(&mut self) -> &mut BTreeSet<String> {
        match self.facet_tab {
            FacetTab::Owners => &mut self.criteria.selected_owners,
            FacetTab::LawFirms => &mut self.criteria.selected_law_firms,
            FacetTab::Attorneys => &mut self.criteria.selected_attorneys,
        }
    }

    fn toggle_current_facet(&mut self) {
        let key = self
            .facet_options()
            .get(self.facet_cursor)
            .map(|b| b.key.clone());
        let Some(key) = key else { return };
        let set = self.selected_set_mut();
        if !set.remove(&key) {
            set.insert(key);
        }
        self.recompute();
    }

    fn switch_tab(&mut self, tab: FacetTab) {
        self.facet_tab = tab;
        // Matches the sidebar behavior upstream: switching tabs resets the
        // facet search box.
        self.facet_search.clear();
        self.facet_cursor = 0;
    }

    fn move_cursor(&mut self, down: bool) {
        match self.focus {
            Focus::Results => step(&mut self.result_cursor, self.visible.len(), down),
            Focus::Sidebar => {
                let len = self.facet_options().len();
                step(&mut self.facet_cursor, len, down)
            }
        }
    }

    fn export_visible(&mut self) {
        let format = ExportFormat::Markdown;
        let options = ExportOptions {
            query: (!self.criteria.search_query.trim().is_empty())
                .then(|| self.criteria.search_query.clone()),
            ..Default::default()
        };
        let content = export_results(&self.visible, format, &options);
        let name = format!(
            "trademark-results-{}.{}",
            chrono::Local::now().format("%Y%m%d-%H%M%S"),
            format.extension()
        );
        match std::fs::write(&name, content) {
            Ok(()) => {
                tracing::info!(file = %name, hits = self.visible.len(), "tui_export");
                self.notice = Some(format!("exported {} hits to {name}", self.visible.len()));
            }
            Err(err) => self.notice = Some(format!("export failed: {err}")),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        self.notice = None;
        match self.input_mode {
            InputMode::Query => self.on_query_key(key),
            InputMode::FacetSearch => self.on_facet_search_key(key),
            InputMode::Browse => self.on_browse_key(key),
        }
    }

    fn on_query_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.input_mode = InputMode::Browse,
            KeyCode::Backspace => {
                self.criteria.search_query.pop();
                self.recompute();
            }
            KeyCode::Char(c) => {
                self.criteria.search_query.push(c);
                self.recompute();
            }
            _ => {}
        }
    }

    fn on_facet_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.input_mode = InputMode::Browse,
            KeyCode::Backspace => {
                self.facet_search.pop();
                self.facet_cursor = 0;
            }
            KeyCode::Char(c) => {
                self.facet_search.push(c);
                self.facet_cursor = 0;
            }
            _ => {}
        }
    }

    fn on_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Results => Focus::Sidebar,
                    Focus::Sidebar => Focus::Results,
                };
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Query,
            KeyCode::Char('f') => {
                self.focus = Focus::Sidebar;
                self.input_mode = InputMode::FacetSearch;
            }
            KeyCode::Char('s') => {
                self.criteria.status = self.criteria.status.next();
                self.recompute();
            }
            KeyCode::Char('[') => self.switch_tab(self.facet_tab.prev()),
            KeyCode::Char(']') => self.switch_tab(self.facet_tab.next()),
            KeyCode::Char('c') => {
                self.criteria.clear();
                self.facet_search.clear();
                self.recompute();
            }
            KeyCode::Char('v') => self.layout = self.layout.cycle(),
            KeyCode::Char('x') => self.export_visible(),
            KeyCode::Up => self.move_cursor(false),
            KeyCode::Down => self.move_cursor(true),
            KeyCode::Char(' ') | KeyCode::Enter if self.focus == Focus::Sidebar => {
                self.toggle_current_facet();
            }
            _ => {}
        }
    }

    fn list_layout(&self, width: u16) -> bool {
        match self.layout {
            LayoutOverride::Auto => width >= LIST_LAYOUT_MIN_WIDTH,
            LayoutOverride::Grid => false,
            LayoutOverride::List => true,
        }
    }
}

fn step(cursor: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *cursor = 0;
        return;
    }
    if down {
        *cursor = (*cursor + 1).min(len - 1);
    } else {
        *cursor = cursor.saturating_sub(1);
    }
}

/// Fail early when there is no terminal to draw on.
pub fn ensure_terminal() -> Result<()> {
    if !io::stdout().is_terminal() {
        bail!("TUI requires a terminal; use `tms search` for scripted output");
    }
    Ok(())
}

pub fn run_tui(response: Option<SearchResponse>, fetch_error: Option<String>) -> Result<()> {
    ensure_terminal()?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(response, fetch_error);
    let result = event_loop(&mut terminal, &mut app);

    teardown_terminal()?;
    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(TICK_RATE_MS);

    loop {
        terminal.draw(|f| draw(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, app, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(20)])
        .split(rows[1]);

    draw_sidebar(f, app, body[0]);
    draw_results(f, app, body[1]);
    draw_footer(f, app, rows[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Query;
    let query = app.criteria.search_query.as_str();

    let mut lines = vec![Line::from(vec![
        Span::styled("Trade", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
        Span::styled("mark", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            "ia",
            Style::default().fg(Color::Rgb(230, 103, 13)).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   {} of {} results",
            app.visible.len(),
            app.total_hits()
        )),
        Span::raw(format!(
            "   search: {}{}",
            query,
            if editing { "▌" } else { "" }
        )),
    ])];

    if let Some(err) = &app.fetch_error {
        lines.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    }

    let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(6)])
        .split(area);

    draw_status_buttons(f, app, chunks[0]);
    draw_facet_panel(f, app, chunks[1]);
}

fn draw_status_buttons(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = StatusFilter::ALL
        .into_iter()
        .map(|status| {
            let dot = Span::styled("● ", Style::default().fg(status_color(status)));
            let label = if status == app.criteria.status {
                Span::styled(status.label(), Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Span::raw(status.label())
            };
            Line::from(vec![dot, label])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title("Status (s)");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_facet_panel(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Sidebar;
    let border_style = if focused {
        Style::default().fg(Color::Blue)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Filter [ ]");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let tabs = Tabs::new(FacetTab::ALL.iter().map(|t| t.label()).collect::<Vec<_>>())
        .select(app.facet_tab.index())
        .highlight_style(Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, parts[0]);

    let editing = app.input_mode == InputMode::FacetSearch;
    let search = Paragraph::new(format!(
        "Search {}: {}{}",
        app.facet_tab.label(),
        app.facet_search,
        if editing { "▌" } else { "" }
    ));
    f.render_widget(search, parts[1]);

    let selected = app.selected_set();
    let items: Vec<ListItem> = app
        .facet_options()
        .iter()
        .map(|bucket| {
            let mark = if selected.contains(&bucket.key) {
                "[x]"
            } else {
                "[ ]"
            };
            ListItem::new(format!("{mark} {} ({})", bucket.key, bucket.doc_count))
        })
        .collect();

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.facet_cursor.min(items.len() - 1)));
    }
    let list = List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, parts[2], &mut state);
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Results;
    let border_style = if focused {
        Style::default().fg(Color::Blue)
    } else {
        Style::default()
    };
    let list_layout = app.list_layout(f.area().width);
    let title = format!(
        "Results · {} view (v: {})",
        if list_layout { "list" } else { "grid" },
        app.layout.label()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.visible.is_empty() {
        let empty = Paragraph::new("no matching trademarks")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    let (list_area, items) = if list_layout {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);
        let header = Paragraph::new(Line::from(Span::styled(
            format!(
                "{:<30} {:<12} {:<12} {:<30} {}",
                "Owner", "Status", "Reg. No.", "Law Firm", "Class / Description"
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        f.render_widget(header, parts[0]);
        let items: Vec<ListItem> = app.visible.iter().map(list_row).collect();
        (parts[1], items)
    } else {
        let items: Vec<ListItem> = app.visible.iter().map(grid_card).collect();
        (inner, items)
    };

    let mut state = ListState::default();
    state.select(Some(app.result_cursor.min(app.visible.len() - 1)));
    let list = List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, list_area, &mut state);
}

fn list_row(hit: &TrademarkHit) -> ListItem<'static> {
    let src = &hit.source;
    let status = TrademarkStatus::classify(&src.status_type);
    let detail = description_snippet(src)
        .map(|d| d.to_string())
        .unwrap_or_else(|| format_class_codes(&src.class_codes));

    ListItem::new(Line::from(vec![
        Span::raw(format!("{:<30.30} ", src.current_owner)),
        Span::styled(
            format!("{:<12.12} ", status.to_string()),
            Style::default().fg(classified_color(&status)),
        ),
        Span::raw(format!(
            "{:<12.12} {:<30.30} {}",
            src.registration_number, src.law_firm, detail
        )),
    ]))
}

fn grid_card(hit: &TrademarkHit) -> ListItem<'static> {
    let src = &hit.source;
    let status = TrademarkStatus::classify(&src.status_type);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                src.current_owner.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("● {}", status_line(src)),
                Style::default().fg(classified_color(&status)),
            ),
        ]),
        Line::from(format!(
            "{}  ·  reg {}  ·  {}",
            src.law_firm, src.registration_number, src.attorney_name
        )),
        Line::from(format!(
            "first use: {}",
            format_first_use_date(src.first_use_anywhere_date.as_deref())
        )),
    ];

    if !src.class_codes.is_empty() {
        lines.push(Line::from(Span::styled(
            format_class_codes(&src.class_codes),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(desc) = description_snippet(src) {
        lines.push(Line::from(Span::styled(
            desc.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    ListItem::new(lines)
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(notice) = &app.notice {
        notice.clone()
    } else {
        match app.input_mode {
            InputMode::Query => "typing filters results · enter/esc done".to_string(),
            InputMode::FacetSearch => "typing narrows facet options · enter/esc done".to_string(),
            InputMode::Browse => {
                "q quit · tab focus · / search · s status · [ ] facet tab · f facet search · \
                 space toggle · c clear · v layout · x export"
                    .to_string()
            }
        }
    };
    let footer = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}
