//! Ratatui front end for the travel search form.
//!
//! The event loop is synchronous; suggestion fetches run as tokio tasks
//! and come back over a channel tagged with the generation token captured
//! at request time, so a stale response can never clobber newer state.

use anyhow::Result;
use crossbeam_channel::{Sender, unbounded};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::default_data_dir;
use crate::history::{HistoryStore, JsonHistoryStore};
use crate::model::types::{DateRange, FormAction, SearchFormState, SuggestItem};
use crate::suggest::{CatalogSource, SuggestSource};
use crate::ui::autocomplete::{Autocomplete, FetchRequest, KeyOutcome};
use crate::ui::components::theme::ThemePalette;
use crate::ui::compose::ComposedList;
use crate::ui::form::{FormStep, SearchForm};
use crate::ui::layout::{ScrollLock, Viewport};

/// Completed fetch, ready to re-enter the control.
enum Fetched {
    Trending {
        token: u64,
        outcome: Result<Vec<SuggestItem>>,
    },
    Suggest {
        token: u64,
        outcome: Result<Vec<SuggestItem>>,
    },
}

fn start_fetch<S: SuggestSource>(
    handle: &tokio::runtime::Handle,
    source: &Arc<S>,
    tx: &Sender<Fetched>,
    req: FetchRequest,
) {
    let source = Arc::clone(source);
    let tx = tx.clone();
    match req {
        FetchRequest::Trending { token } => {
            handle.spawn(async move {
                let outcome = source.trending().await;
                let _ = tx.send(Fetched::Trending { token, outcome });
            });
        }
        FetchRequest::Suggest { token, query } => {
            handle.spawn(async move {
                let outcome = source.suggest(&query).await;
                let _ = tx.send(Fetched::Suggest { token, outcome });
            });
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct UiStatePersisted {
    theme: Option<String>,
}

fn state_path_for(data_dir: &Path) -> PathBuf {
    // Lightweight UI preferences only; history lives in its own file.
    data_dir.join("ui_state.json")
}

fn load_state(path: &Path) -> UiStatePersisted {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|body| serde_json::from_str(&body).ok())
        .unwrap_or_default()
}

fn save_state(path: &Path, state: &UiStatePersisted) {
    if let Ok(body) = serde_json::to_string_pretty(state) {
        let _ = std::fs::write(path, body);
    }
}

/// Screen regions recorded at draw time for mouse hit-testing.
#[derive(Default, Clone)]
struct HitMap {
    viewport: Viewport,
    destination: Rect,
    dates: Rect,
    guests: Rect,
    submit: Rect,
    browse: Rect,
    panel: Option<Rect>,
    /// Selectable rows of the open panel, with their flat indices.
    rows: Vec<(Rect, usize)>,
    sheet_close: Option<Rect>,
    sheet_body: Option<Rect>,
}

impl HitMap {
    fn reset_overlays(&mut self) {
        self.panel = None;
        self.rows.clear();
        self.sheet_close = None;
        self.sheet_body = None;
    }

    fn row_item_at(&self, col: u16, row: u16) -> Option<usize> {
        self.rows
            .iter()
            .find(|(rect, _)| rect.contains(Position::new(col, row)))
            .map(|(_, idx)| *idx)
    }
}

fn hit(rect: Rect, col: u16, row: u16) -> bool {
    rect.contains(Position::new(col, row))
}

pub fn footer_legend(open: bool) -> &'static str {
    if open {
        "↑/↓ move | Enter select | Esc close | Tab next field | Ctrl+U clear"
    } else {
        "Tab/Shift+Tab fields | Enter open/commit | F1 help | F2 theme | F10 quit"
    }
}

pub fn run_tui(
    data_dir_override: Option<PathBuf>,
    once: bool,
    latency: Option<Duration>,
) -> Result<()> {
    let data_dir = data_dir_override.unwrap_or_else(default_data_dir);
    let _ = std::fs::create_dir_all(&data_dir);
    let state_path = state_path_for(&data_dir);
    let persisted = load_state(&state_path);

    let handle = tokio::runtime::Handle::current();
    let source = Arc::new(match latency {
        Some(wait) => CatalogSource::with_latency(wait),
        None => CatalogSource::new(),
    });
    let browse = source.all();
    let store = JsonHistoryStore::open_default(&data_dir);

    let mut form = SearchForm::new();
    let mut control = Autocomplete::new(None, store);
    let (fetch_tx, fetch_rx) = unbounded::<Fetched>();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut theme_dark = !matches!(persisted.theme.as_deref(), Some("light"));
    let mut status = String::from("Pick a destination to begin (F1 help, F10 quit)");
    let mut show_help = false;
    let mut help_scroll: u16 = 0;
    let mut browse_offset: usize = 0;
    let mut browse_locked = false;
    let mut sheet_lock: Option<ScrollLock> = None;
    let mut date_draft: Option<DateRange> = None;
    let mut hits = HitMap::default();
    let mut needs_draw = true;
    let tick_rate = Duration::from_millis(30);

    let outcome = loop {
        while let Ok(done) = fetch_rx.try_recv() {
            let applied = match done {
                Fetched::Trending { token, outcome } => control.apply_trending(token, outcome),
                Fetched::Suggest { token, outcome } => control.apply_results(token, outcome),
            };
            if applied {
                needs_draw = true;
            }
        }

        if let Some(req) = control.tick(Instant::now()) {
            start_fetch(&handle, &source, &fetch_tx, req);
            needs_draw = true;
        }

        // The sheet exists only on narrow layouts; the background browse
        // list is locked for exactly its lifetime.
        let sheet_open = control.is_open() && hits.viewport.is_narrow();
        if sheet_open && sheet_lock.is_none() {
            sheet_lock = Some(ScrollLock::acquire(&mut browse_locked));
        } else if !sheet_open && let Some(lock) = sheet_lock.take() {
            lock.release(&mut browse_locked);
        }

        if needs_draw {
            let palette = if theme_dark {
                ThemePalette::dark()
            } else {
                ThemePalette::light()
            };
            let ctx = DrawCtx {
                form: &form,
                control: &control,
                date_draft,
                browse: &browse,
                browse_offset,
                palette,
                status: &status,
                show_help,
                help_scroll,
            };
            terminal.draw(|f| draw_app(f, &ctx, &mut hits))?;
            needs_draw = false;
            if once {
                break Ok(());
            }
        }

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                let now = Instant::now();
                needs_draw = true;

                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match key.code {
                    KeyCode::F(10) => break Ok(()),
                    KeyCode::F(2) => {
                        theme_dark = !theme_dark;
                        continue;
                    }
                    KeyCode::F(1) => {
                        show_help = !show_help;
                        continue;
                    }
                    _ => {}
                }
                if show_help {
                    match key.code {
                        KeyCode::Esc => show_help = false,
                        KeyCode::Down => help_scroll = help_scroll.saturating_add(1),
                        KeyCode::Up => help_scroll = help_scroll.saturating_sub(1),
                        _ => {}
                    }
                    continue;
                }

                if control.is_open() {
                    match key.code {
                        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            control.clear_query(now);
                        }
                        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                            let mut query = control.query().to_string();
                            query.push(c);
                            control.set_query(&query, now);
                        }
                        KeyCode::Backspace => {
                            let mut query = control.query().to_string();
                            query.pop();
                            control.set_query(&query, now);
                        }
                        code => match control.on_key(code) {
                            KeyOutcome::Selected(item) => {
                                status = format!("Destination set to {}", item.label);
                                form.complete_destination(item);
                                date_draft.get_or_insert_with(default_stay);
                            }
                            KeyOutcome::Closed => {
                                // Tab keeps its default focus movement.
                                if code == KeyCode::Tab {
                                    form.focus_next();
                                }
                            }
                            KeyOutcome::Handled | KeyOutcome::Ignored => {}
                        },
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Tab => {
                        form.focus_next();
                        continue;
                    }
                    KeyCode::BackTab => {
                        form.focus_prev();
                        continue;
                    }
                    _ => {}
                }

                match form.focus() {
                    FormStep::Destination => match key.code {
                        KeyCode::Enter | KeyCode::Down => {
                            if let Some(req) = control.open_via_focus() {
                                start_fetch(&handle, &source, &fetch_tx, req);
                            }
                        }
                        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                            if let Some(req) = control.open_via_focus() {
                                start_fetch(&handle, &source, &fetch_tx, req);
                            }
                            let mut query = control.query().to_string();
                            query.push(c);
                            control.set_query(&query, now);
                        }
                        KeyCode::Backspace => {
                            if let Some(req) = control.open_via_focus() {
                                start_fetch(&handle, &source, &fetch_tx, req);
                            }
                            let mut query = control.query().to_string();
                            query.pop();
                            control.set_query(&query, now);
                        }
                        _ => {}
                    },
                    FormStep::Dates => {
                        let draft = date_draft.get_or_insert_with(default_stay);
                        match key.code {
                            KeyCode::Left => *draft = shift_stay(*draft, -1),
                            KeyCode::Right => *draft = shift_stay(*draft, 1),
                            KeyCode::Up => *draft = extend_stay(*draft, 1),
                            KeyCode::Down => *draft = extend_stay(*draft, -1),
                            KeyCode::Enter => {
                                let picked = *draft;
                                form.apply(FormAction::SetDates(picked));
                                status = format!(
                                    "Stay {} → {} ({} nights)",
                                    picked.start,
                                    picked.end,
                                    picked.nights()
                                );
                            }
                            _ => {}
                        }
                    }
                    FormStep::Guests => match key.code {
                        KeyCode::Up | KeyCode::Char('+') => {
                            form.apply(FormAction::SetGuests(form.state().guests + 1));
                        }
                        KeyCode::Down | KeyCode::Char('-') => {
                            form.apply(FormAction::SetGuests(
                                form.state().guests.saturating_sub(1),
                            ));
                        }
                        KeyCode::Enter => form.focus_step(FormStep::Submit),
                        _ => {}
                    },
                    FormStep::Submit => {
                        if key.code == KeyCode::Enter {
                            do_submit(&form, &mut status);
                        }
                    }
                }
            }
            Event::Mouse(mouse) => {
                needs_draw = true;
                let (col, row) = (mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if show_help {
                            show_help = false;
                            continue;
                        }
                        if control.is_open() {
                            if let Some(idx) = hits.row_item_at(col, row) {
                                if let Some(item) = control.select_at(idx) {
                                    status = format!("Destination set to {}", item.label);
                                    form.complete_destination(item);
                                    date_draft.get_or_insert_with(default_stay);
                                }
                                continue;
                            }
                            if hits.viewport.is_narrow() {
                                let on_close = hits
                                    .sheet_close
                                    .map(|rect| hit(rect, col, row))
                                    .unwrap_or(false);
                                let on_body = hits
                                    .sheet_body
                                    .map(|rect| hit(rect, col, row))
                                    .unwrap_or(false);
                                // Close button or backdrop dismisses; the
                                // input and list keep the sheet up.
                                if on_close || !on_body {
                                    control.close();
                                }
                                continue;
                            }
                            let inside_panel = hits
                                .panel
                                .map(|rect| hit(rect, col, row))
                                .unwrap_or(false);
                            if inside_panel || hit(hits.destination, col, row) {
                                continue;
                            }
                            // Outside the control's root: close, then let
                            // the click land on whatever it hit.
                            control.close();
                        }
                        if hit(hits.destination, col, row) {
                            form.focus_step(FormStep::Destination);
                            if let Some(req) = control.open_via_focus() {
                                start_fetch(&handle, &source, &fetch_tx, req);
                            }
                        } else if hit(hits.dates, col, row) {
                            form.focus_step(FormStep::Dates);
                            date_draft.get_or_insert_with(default_stay);
                        } else if hit(hits.guests, col, row) {
                            // Each click adds a guest.
                            form.focus_step(FormStep::Guests);
                            form.apply(FormAction::SetGuests(form.state().guests + 1));
                        } else if hit(hits.submit, col, row) {
                            form.focus_step(FormStep::Submit);
                            do_submit(&form, &mut status);
                        }
                    }
                    MouseEventKind::Moved => {
                        if control.is_open()
                            && let Some(idx) = hits.row_item_at(col, row)
                        {
                            control.set_highlight(Some(idx));
                        }
                    }
                    MouseEventKind::ScrollDown => {
                        if !browse_locked && hit(hits.browse, col, row) {
                            let max = browse.len().saturating_sub(1);
                            browse_offset = (browse_offset + 1).min(max);
                        }
                    }
                    MouseEventKind::ScrollUp => {
                        if !browse_locked && hit(hits.browse, col, row) {
                            browse_offset = browse_offset.saturating_sub(1);
                        }
                    }
                    _ => {}
                }
            }
            Event::Resize(_, _) => needs_draw = true,
            _ => {}
        }
    };

    save_state(
        &state_path,
        &UiStatePersisted {
            theme: Some(if theme_dark { "dark" } else { "light" }.to_string()),
        },
    );
    teardown_terminal()?;
    outcome
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

fn do_submit(form: &SearchForm, status: &mut String) {
    let mut payload = None;
    if !form.submit(|state| payload = Some(state.clone())) {
        return;
    }
    if let Some(state) = payload {
        *status = submit_summary(&state);
        match serde_json::to_string(&state) {
            Ok(body) => tracing::info!(payload = %body, "search submitted"),
            Err(err) => tracing::warn!("failed to encode submission payload: {err}"),
        }
    }
}

fn submit_summary(state: &SearchFormState) -> String {
    let destination = state
        .destination
        .as_ref()
        .map_or("?", |item| item.label.as_str());
    let guests = state.guests;
    let plural = if guests == 1 { "" } else { "s" };
    match state.dates {
        Some(range) => format!(
            "Searching {destination} · {} → {} · {guests} guest{plural}",
            range.start, range.end
        ),
        None => format!("Searching {destination} · {guests} guest{plural}"),
    }
}

fn default_stay() -> DateRange {
    let start = chrono::Local::now().date_naive() + chrono::Duration::days(7);
    DateRange {
        start,
        end: start + chrono::Duration::days(7),
    }
}

fn shift_stay(range: DateRange, days: i64) -> DateRange {
    DateRange {
        start: range.start + chrono::Duration::days(days),
        end: range.end + chrono::Duration::days(days),
    }
}

fn extend_stay(range: DateRange, days: i64) -> DateRange {
    let end = (range.end + chrono::Duration::days(days)).max(range.start);
    DateRange {
        start: range.start,
        end,
    }
}

struct DrawCtx<'a, S: HistoryStore> {
    form: &'a SearchForm,
    control: &'a Autocomplete<S>,
    date_draft: Option<DateRange>,
    browse: &'a [SuggestItem],
    browse_offset: usize,
    palette: ThemePalette,
    status: &'a str,
    show_help: bool,
    help_scroll: u16,
}

fn draw_app<S: HistoryStore>(f: &mut Frame, ctx: &DrawCtx<'_, S>, hits: &mut HitMap) {
    let area = f.area();
    let viewport = Viewport::for_width(area.width);
    hits.viewport = viewport;
    hits.reset_overlays();

    f.render_widget(
        Block::default().style(Style::default().bg(ctx.palette.bg).fg(ctx.palette.fg)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(1), // header
                Constraint::Length(3), // form row
                Constraint::Min(0),    // browse list
                Constraint::Length(1), // footer
            ]
            .as_ref(),
        )
        .split(area);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("wander", ctx.palette.title()),
            Span::styled("  find your next stay", ctx.palette.hint_style()),
        ])),
        chunks[0],
    );

    draw_form_row(f, ctx, chunks[1], hits);
    draw_browse(f, ctx, chunks[2], hits);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(ctx.status.to_string(), Style::default().fg(ctx.palette.fg)),
            Span::styled(
                format!("  |  {}", footer_legend(ctx.control.is_open())),
                ctx.palette.hint_style(),
            ),
        ])),
        chunks[3],
    );

    if ctx.control.is_open() {
        match viewport {
            Viewport::Wide => draw_dropdown(f, ctx, hits),
            Viewport::Narrow => draw_sheet(f, ctx, area, hits),
        }
    }
    if ctx.show_help {
        draw_help(f, ctx, area);
    }
}

fn field_cell(
    f: &mut Frame,
    area: Rect,
    title: &str,
    content: Line<'_>,
    focused: bool,
    palette: ThemePalette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title.to_string(),
            if focused {
                palette.title()
            } else {
                palette.hint_style()
            },
        ))
        .border_style(if focused {
            palette.focused_border()
        } else {
            palette.idle_border()
        })
        .style(Style::default().bg(palette.surface));
    f.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_form_row<S: HistoryStore>(f: &mut Frame, ctx: &DrawCtx<'_, S>, area: Rect, hits: &mut HitMap) {
    let palette = ctx.palette;
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(35),
                Constraint::Percentage(27),
                Constraint::Percentage(16),
                Constraint::Percentage(22),
            ]
            .as_ref(),
        )
        .split(area);
    hits.destination = cells[0];
    hits.dates = cells[1];
    hits.guests = cells[2];
    hits.submit = cells[3];

    let focus = ctx.form.focus();
    let control = ctx.control;

    let mut destination_spans = Vec::new();
    if control.query().is_empty() {
        destination_spans.push(Span::styled("Destination?", palette.hint_style()));
    } else {
        destination_spans.push(Span::styled(
            control.query().to_string(),
            Style::default().fg(palette.fg),
        ));
        if control.is_open() {
            destination_spans.push(Span::styled("▏", palette.hint_style()));
        }
        if control.is_focused() {
            destination_spans.push(Span::styled("  ✕ Ctrl+U", palette.hint_style()));
        }
    }
    field_cell(
        f,
        cells[0],
        "Destination",
        Line::from(destination_spans),
        focus == FormStep::Destination || control.is_open(),
        palette,
    );

    let dates_line = match (ctx.form.state().dates, ctx.date_draft) {
        (Some(range), _) => Line::from(Span::styled(
            format!("{} → {}", range.start, range.end),
            Style::default().fg(palette.fg),
        )),
        (None, Some(draft)) if focus == FormStep::Dates => Line::from(vec![
            Span::styled(
                format!("{} → {}", draft.start, draft.end),
                Style::default().fg(palette.fg),
            ),
            Span::styled("  ←/→ ↑/↓ Enter", palette.hint_style()),
        ]),
        _ => Line::from(Span::styled("DATE", palette.hint_style())),
    };
    field_cell(f, cells[1], "Dates", dates_line, focus == FormStep::Dates, palette);

    let guests = ctx.form.state().guests;
    let guests_line = Line::from(Span::styled(
        format!("{guests} guest{}", if guests == 1 { "" } else { "s" }),
        Style::default().fg(palette.fg),
    ));
    field_cell(f, cells[2], "Guests", guests_line, focus == FormStep::Guests, palette);

    let submit_style = if ctx.form.is_valid() {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        palette.hint_style()
    };
    field_cell(
        f,
        cells[3],
        "",
        Line::from(Span::styled("SEARCH", submit_style)),
        focus == FormStep::Submit,
        palette,
    );
}

fn draw_browse<S: HistoryStore>(f: &mut Frame, ctx: &DrawCtx<'_, S>, area: Rect, hits: &mut HitMap) {
    hits.browse = area;
    let palette = ctx.palette;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled("Browse destinations", palette.hint_style()))
        .border_style(palette.idle_border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();
    for item in ctx.browse.iter().skip(ctx.browse_offset) {
        let mut spans = vec![Span::styled(
            format!("• {}", item.label),
            Style::default().fg(palette.fg),
        )];
        if let Some(count) = item.count {
            spans.push(Span::styled(
                format!("  {count} recent searches"),
                palette.hint_style(),
            ));
        }
        lines.push(Line::from(spans));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

/// Row classification inside the open panel; only items are selectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowKind {
    Header,
    Item(usize),
    Notice,
}

fn item_line(item: &SuggestItem, highlighted: bool, palette: ThemePalette) -> Line<'static> {
    let style = if highlighted {
        palette.highlight()
    } else {
        Style::default().fg(palette.fg)
    };
    let mut spans = vec![Span::styled(format!("  • {}", item.label), style)];
    if let Some(count) = item.count {
        spans.push(Span::styled(
            format!("  {count}"),
            if highlighted { style } else { palette.hint_style() },
        ));
    }
    Line::from(spans)
}

fn panel_rows(
    list: &ComposedList<'_>,
    loading: bool,
    highlight: Option<usize>,
    palette: ThemePalette,
) -> Vec<(Line<'static>, RowKind)> {
    let mut rows = Vec::new();
    if loading {
        rows.push((
            Line::from(Span::styled("Loading…".to_string(), palette.hint_style())),
            RowKind::Notice,
        ));
    }
    match list {
        ComposedList::Standby(groups) => {
            let mut flat = 0usize;
            for group in groups {
                rows.push((
                    Line::from(Span::styled(
                        format!("{} {}", group.glyph, group.title.to_uppercase()),
                        palette.group_header(),
                    )),
                    RowKind::Header,
                ));
                for item in group.items {
                    rows.push((item_line(item, highlight == Some(flat), palette), RowKind::Item(flat)));
                    flat += 1;
                }
            }
        }
        ComposedList::Results(items) => {
            if !loading {
                for (idx, item) in items.iter().enumerate() {
                    rows.push((item_line(item, highlight == Some(idx), palette), RowKind::Item(idx)));
                }
            }
        }
        ComposedList::NoResults { query } => {
            if !loading {
                rows.push((
                    Line::from(Span::styled(
                        format!("No results for “{query}”"),
                        palette.hint_style(),
                    )),
                    RowKind::Notice,
                ));
            }
        }
    }
    rows
}

fn render_rows(
    f: &mut Frame,
    rows: &[(Line<'static>, RowKind)],
    inner: Rect,
    highlight: Option<usize>,
    hits: &mut HitMap,
) {
    // Keep the highlighted row visible when the list outgrows the panel.
    let visible = inner.height as usize;
    let selected_row = highlight.and_then(|want| {
        rows.iter()
            .position(|(_, kind)| matches!(kind, RowKind::Item(idx) if *idx == want))
    });
    let offset = selected_row
        .map(|row| row.saturating_sub(visible.saturating_sub(1)))
        .unwrap_or(0);

    for (slot, (line, kind)) in rows.iter().skip(offset).take(visible).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + slot as u16,
            width: inner.width,
            height: 1,
        };
        if let RowKind::Item(flat) = kind {
            hits.rows.push((row_area, *flat));
        }
        f.render_widget(Paragraph::new(line.clone()), row_area);
    }
}

fn draw_dropdown<S: HistoryStore>(f: &mut Frame, ctx: &DrawCtx<'_, S>, hits: &mut HitMap) {
    let area = f.area();
    let anchor = hits.destination;
    if anchor.bottom() >= area.bottom() {
        return;
    }
    let list = ctx.control.composed();
    let rows = panel_rows(&list, ctx.control.is_loading(), ctx.control.highlight(), ctx.palette);
    let available = area.bottom() - anchor.bottom();
    let height = ((rows.len() as u16).saturating_add(2)).min(14).min(available);
    if height < 3 {
        return;
    }
    let width = anchor.width.max(40).min(area.width.saturating_sub(anchor.x));
    let panel = Rect {
        x: anchor.x,
        y: anchor.bottom(),
        width,
        height,
    };

    f.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ctx.palette.idle_border())
        .style(Style::default().bg(ctx.palette.surface));
    let inner = block.inner(panel);
    f.render_widget(block, panel);
    render_rows(f, &rows, inner, ctx.control.highlight(), hits);
    hits.panel = Some(panel);
}

fn draw_sheet<S: HistoryStore>(f: &mut Frame, ctx: &DrawCtx<'_, S>, area: Rect, hits: &mut HitMap) {
    let palette = ctx.palette;
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.idle_border())
        .style(Style::default().bg(palette.surface).fg(palette.fg));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // close button
                Constraint::Length(1), // title
                Constraint::Length(1), // input
                Constraint::Length(1), // divider
                Constraint::Min(0),    // list
            ]
            .as_ref(),
        )
        .split(inner);

    let close_label = "[✕ close]";
    f.render_widget(
        Paragraph::new(Span::styled(close_label, palette.hint_style())),
        chunks[0],
    );
    hits.sheet_close = Some(Rect {
        x: chunks[0].x,
        y: chunks[0].y,
        width: close_label.chars().count() as u16,
        height: 1,
    });

    f.render_widget(
        Paragraph::new(Span::styled("Destination", palette.title())),
        chunks[1],
    );

    let input_line = if ctx.control.query().is_empty() {
        Line::from(vec![
            Span::styled("⌖ ", palette.hint_style()),
            Span::styled("Where to?", palette.hint_style()),
        ])
    } else {
        Line::from(vec![
            Span::styled("⌖ ", palette.hint_style()),
            Span::styled(
                ctx.control.query().to_string(),
                Style::default().fg(palette.fg),
            ),
            Span::styled("▏", palette.hint_style()),
        ])
    };
    f.render_widget(Paragraph::new(input_line), chunks[2]);

    f.render_widget(
        Paragraph::new(Span::styled(
            "─".repeat(inner.width as usize),
            palette.idle_border(),
        )),
        chunks[3],
    );

    let list = ctx.control.composed();
    let rows = panel_rows(&list, ctx.control.is_loading(), ctx.control.highlight(), palette);
    render_rows(f, &rows, chunks[4], ctx.control.highlight(), hits);

    hits.panel = Some(area);
    hits.sheet_body = Some(inner);
}

fn help_lines(palette: ThemePalette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut section = |title: &str, items: &[&str]| {
        lines.push(Line::from(Span::styled(title.to_string(), palette.title())));
        for item in items {
            lines.push(Line::from(format!("  {item}")));
        }
        lines.push(Line::from(""));
    };

    section(
        "Destination",
        &[
            "focus and type to search; empty query shows history + trending",
            "↑/↓ move through the list; Enter selects (free text works too)",
            "Esc closes; Tab closes and moves on; Ctrl+U clears the text",
        ],
    );
    section(
        "Dates",
        &["←/→ shift the stay; ↑/↓ lengthen or shorten it; Enter confirms"],
    );
    section("Guests", &["↑/+ add a guest; ↓/- remove one (minimum 1)"]);
    section(
        "Search",
        &["SEARCH lights up once every step is set; Enter submits"],
    );
    section(
        "General",
        &[
            "F2 theme | F10 or Ctrl+C quit",
            "narrow terminals get a full-screen destination sheet",
        ],
    );
    lines
}

fn draw_help<S: HistoryStore>(f: &mut Frame, ctx: &DrawCtx<'_, S>, area: Rect) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(Span::styled("Help", ctx.palette.title()))
        .borders(Borders::ALL)
        .border_style(ctx.palette.focused_border())
        .style(Style::default().bg(ctx.palette.surface));
    f.render_widget(
        Paragraph::new(help_lines(ctx.palette))
            .block(block)
            .wrap(Wrap { trim: true })
            .scroll((ctx.help_scroll, 0)),
        popup,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::ui::autocomplete::FetchRequest;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn item(label: &str) -> SuggestItem {
        SuggestItem::new(format!("loc:{}", label.to_lowercase()), label).with_count(5)
    }

    fn open_with_trending(labels: &[&str]) -> Autocomplete<MemoryHistory> {
        let mut control = Autocomplete::new(None, MemoryHistory::new());
        let token = match control.open_via_focus() {
            Some(FetchRequest::Trending { token }) => token,
            other => panic!("expected trending fetch, got {other:?}"),
        };
        let items = labels.iter().map(|l| item(l)).collect();
        assert!(control.apply_trending(token, Ok(items)));
        control
    }

    fn ctx_for<'a>(
        form: &'a SearchForm,
        control: &'a Autocomplete<MemoryHistory>,
        browse: &'a [SuggestItem],
    ) -> DrawCtx<'a, MemoryHistory> {
        DrawCtx {
            form,
            control,
            date_draft: None,
            browse,
            browse_offset: 0,
            palette: ThemePalette::dark(),
            status: "ready",
            show_help: false,
            help_scroll: 0,
        }
    }

    #[test]
    fn ui_state_roundtrip_persists_theme() {
        let dir = TempDir::new().unwrap();
        let path = state_path_for(dir.path());

        save_state(
            &path,
            &UiStatePersisted {
                theme: Some("light".into()),
            },
        );
        let loaded = load_state(&path);
        assert_eq!(loaded.theme.as_deref(), Some("light"));

        // Missing file degrades to defaults.
        assert!(load_state(&dir.path().join("nope.json")).theme.is_none());
    }

    #[test]
    fn panel_rows_assign_flat_indices_across_groups() {
        let history = vec![item("Shiraz")];
        let trending = vec![item("Tehran"), item("Berlin")];
        let list = crate::ui::compose::compose(
            crate::ui::compose::DisplayMode::Standby,
            &history,
            &trending,
            &[],
            "",
        );
        let rows = panel_rows(&list, false, None, ThemePalette::dark());

        let kinds: Vec<RowKind> = rows.iter().map(|(_, kind)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Header,
                RowKind::Item(0),
                RowKind::Header,
                RowKind::Item(1),
                RowKind::Item(2),
            ]
        );
    }

    #[test]
    fn typing_results_hide_while_loading() {
        let results = vec![item("Berlin")];
        let list = crate::ui::compose::compose(
            crate::ui::compose::DisplayMode::Typing,
            &[],
            &[],
            &results,
            "ber",
        );
        let rows = panel_rows(&list, true, None, ThemePalette::dark());
        assert_eq!(rows.len(), 1, "only the loading notice shows");
        assert_eq!(rows[0].1, RowKind::Notice);
    }

    #[test]
    fn wide_layout_anchors_the_dropdown_under_the_field() {
        let control = open_with_trending(&["Tehran", "Berlin"]);
        let form = SearchForm::new();
        let browse: Vec<SuggestItem> = Vec::new();
        let ctx = ctx_for(&form, &control, &browse);

        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut hits = HitMap::default();
        terminal.draw(|f| draw_app(f, &ctx, &mut hits)).unwrap();

        assert_eq!(hits.viewport, Viewport::Wide);
        let panel = hits.panel.expect("dropdown rendered");
        assert_eq!(panel.y, hits.destination.bottom());
        assert_eq!(panel.x, hits.destination.x);
        assert!(hits.sheet_close.is_none());
        assert_eq!(hits.rows.len(), 2, "two selectable trending rows");
    }

    #[test]
    fn narrow_layout_renders_the_full_screen_sheet() {
        let control = open_with_trending(&["Tehran"]);
        let form = SearchForm::new();
        let browse: Vec<SuggestItem> = Vec::new();
        let ctx = ctx_for(&form, &control, &browse);

        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut hits = HitMap::default();
        terminal.draw(|f| draw_app(f, &ctx, &mut hits)).unwrap();

        assert_eq!(hits.viewport, Viewport::Narrow);
        let panel = hits.panel.expect("sheet rendered");
        assert_eq!(panel, Rect::new(0, 0, 60, 24), "sheet covers the screen");
        assert!(hits.sheet_close.is_some());
        assert_eq!(hits.rows.len(), 1);
    }

    #[test]
    fn closed_control_leaves_no_overlay_hit_regions() {
        let control = Autocomplete::new(None, MemoryHistory::new());
        let form = SearchForm::new();
        let browse: Vec<SuggestItem> = Vec::new();
        let ctx = ctx_for(&form, &control, &browse);

        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut hits = HitMap::default();
        terminal.draw(|f| draw_app(f, &ctx, &mut hits)).unwrap();

        assert!(hits.panel.is_none());
        assert!(hits.rows.is_empty());
    }

    #[test]
    fn stay_cannot_be_shrunk_past_its_start() {
        let range = DateRange {
            start: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
        };
        let shrunk = extend_stay(extend_stay(range, -1), -1);
        assert_eq!(shrunk.start, shrunk.end);

        let shifted = shift_stay(range, 3);
        assert_eq!(shifted.nights(), range.nights());
    }
}
