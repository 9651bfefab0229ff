use std::io::{self, Write};

use crate::connection::Connection;
use crate::filter::filter_indices;
use crate::input::InputBuffer;
use crate::layout::layout;
use crate::row::{Row, View};
use crate::settings::Settings;
use crate::store::{ConnectionStore, SettingsStore};
use crate::terminal::Terminal;

use ratatui::prelude::*;
use ratatui::widgets::{self, *};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const SEARCH_SYMBOL: &str = "/";

/// Space kept free to the right of the table.
pub const MARGIN_WIDTH: u16 = 3;
/// Rows reserved for chrome when the table fills the screen.
pub const MARGIN_HEIGHT: u16 = 5;
pub const MINIMUM_TABLE_WIDTH: u16 = 3;
/// Column spacing and borders that the column widths must leave room for.
pub const CONTENT_EXTRA_MARGIN: u16 = 12;
/// Tallest table in windowed mode.
pub const WINDOWED_MAX_HEIGHT: u16 = 8;

// border (2) + header (2) + filter line + help line
const CHROME_HEIGHT: u16 = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Chosen(Connection),
    Cancelled,
    /// Every row was deleted during the session.
    Exhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State {
    Browsing,
    Filtering,
    Terminated(Outcome),
}

#[derive(Clone, Copy)]
enum DeleteBy {
    Host,
    Name,
}

impl DeleteBy {
    fn key(self, connection: &Connection) -> &str {
        match self {
            DeleteBy::Host => &connection.host,
            DeleteBy::Name => &connection.name,
        }
    }
}

/// The interactive picker.
///
/// Holds the full row set, the rows visible under the current filter and the
/// cursor into them. Events are fed one at a time through
/// [`SelectBox::handle_event`]; drawing is separate so the state machine can
/// be driven without a terminal.
pub struct SelectBox {
    view: View,
    rows: Vec<Row>,
    visible: Vec<usize>,
    state: State,
    table_state: TableState,
    input_buffer: InputBuffer,
    settings: Settings,
    widths: Vec<u16>,
    table_width: u16,
    table_height: u16,
    window_height: u16,
    status: Option<String>,
}

impl SelectBox {
    pub fn new(view: View, rows: Vec<Row>, settings: Settings) -> Self {
        let visible: Vec<usize> = (0..rows.len()).collect();
        let selected = if visible.is_empty() { None } else { Some(0) };
        let mut select_box = Self {
            view,
            widths: view.columns().iter().map(|c| c.base).collect(),
            table_width: 0,
            table_height: 0,
            window_height: 0,
            visible,
            state: State::Browsing,
            table_state: TableState::default().with_selected(selected),
            input_buffer: InputBuffer::new(SEARCH_SYMBOL.to_string()),
            settings,
            status: None,
            rows,
        };
        select_box.apply_height();
        select_box
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            State::Terminated(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn query(&self) -> &str {
        self.input_buffer.value()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.visible.iter().map(|i| &self.rows[*i])
    }

    pub fn highlighted(&self) -> Option<&Row> {
        let cursor = self.table_state.selected()?;
        self.visible.get(cursor).map(|i| &self.rows[*i])
    }

    pub fn cursor(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn widths(&self) -> &[u16] {
        &self.widths
    }

    pub fn table_height(&self) -> u16 {
        self.table_height
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Lines the inline viewport needs to show the windowed table.
    pub fn windowed_viewport_height(&self) -> u16 {
        self.windowed_table_height() + CHROME_HEIGHT
    }

    /// Applies one terminal event. Returns the outcome once the session has
    /// terminated; later events are ignored.
    pub fn handle_event<S>(&mut self, event: Event, store: &mut S) -> Option<&Outcome>
    where
        S: ConnectionStore + SettingsStore + ?Sized,
    {
        if matches!(self.state, State::Terminated(_)) {
            return self.outcome();
        }

        match event {
            Event::Resize(width, height) => self.resize(width, height),
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.status = None;
                self.handle_key(key, store);
            }
            _ => {}
        }

        self.outcome()
    }

    /// Recomputes column widths and the table height for a terminal of the
    /// given size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.window_height = height.saturating_sub(MARGIN_HEIGHT);
        self.table_width = width.saturating_sub(MARGIN_WIDTH).max(MINIMUM_TABLE_WIDTH);
        let available = self.table_width.saturating_sub(CONTENT_EXTRA_MARGIN);
        self.widths = layout(available, self.view.columns());
        self.apply_height();
    }

    fn handle_key<S>(&mut self, key: KeyEvent, store: &mut S)
    where
        S: ConnectionStore + SettingsStore + ?Sized,
    {
        use KeyCode::*;

        let ctrl_c = key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            Up => return self.move_cursor(-1),
            Down => return self.move_cursor(1),
            PageUp => return self.move_cursor(-self.page()),
            PageDown => return self.move_cursor(self.page()),
            Home => return self.move_cursor(isize::MIN),
            End => return self.move_cursor(isize::MAX),
            Enter => {
                if let Some(row) = self.highlighted() {
                    let chosen = row.connection.clone();
                    log::debug!("chose {}", chosen.host);
                    self.state = State::Terminated(Outcome::Chosen(chosen));
                }
                return;
            }
            _ => {}
        }

        match self.state {
            State::Browsing => match key.code {
                Esc | Char('q') => self.state = State::Terminated(Outcome::Cancelled),
                _ if ctrl_c => self.state = State::Terminated(Outcome::Cancelled),
                Char('/') => {
                    self.input_buffer.clear();
                    self.state = State::Filtering;
                    self.refilter();
                }
                _ if !key.modifiers.is_empty() => {}
                Char('d') if self.view == View::History => self.delete(DeleteBy::Host, store),
                Char('r') if self.view == View::History => self.delete(DeleteBy::Name, store),
                Char('w') => self.toggle_fullscreen(store),
                _ => {}
            },
            State::Filtering => match key.code {
                Esc | Char('q') => self.leave_filter(),
                _ if ctrl_c => self.leave_filter(),
                Backspace => {
                    if self.input_buffer.pop() {
                        self.refilter();
                    }
                }
                Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                    self.input_buffer.push(c);
                    self.refilter();
                }
                _ => {}
            },
            State::Terminated(_) => {}
        }
    }

    fn leave_filter(&mut self) {
        self.input_buffer.clear();
        self.state = State::Browsing;
        self.refilter();
    }

    /// Rebuilds the visible set from the full set and puts the cursor on the
    /// first match.
    fn refilter(&mut self) {
        self.visible = filter_indices(&self.rows, self.input_buffer.value());
        let selected = if self.visible.is_empty() { None } else { Some(0) };
        self.table_state.select(selected);
    }

    fn page(&self) -> isize {
        isize::try_from(self.table_height.max(1)).unwrap_or(isize::MAX)
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.visible.is_empty() {
            self.table_state.select(None);
            return;
        }

        let last = self.visible.len() as isize - 1;
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = current.saturating_add(delta).clamp(0, last);
        self.table_state.select(Some(next as usize));
    }

    /// Removes every row sharing the highlighted row's host (or name) from
    /// the full set and asks the store to forget them.
    fn delete<S>(&mut self, by: DeleteBy, store: &mut S)
    where
        S: ConnectionStore + ?Sized,
    {
        let Some(row) = self.highlighted() else {
            return;
        };
        let target = by.key(&row.connection).to_string();
        if target.is_empty() {
            return;
        }

        let result = match by {
            DeleteBy::Host => store.remove_by_host(&target),
            DeleteBy::Name => store.remove_by_name(&target),
        };
        if let Err(err) = result {
            log::warn!("failed to update history after removing {target}: {err}");
            self.status = Some(format!("could not update history: {err}"));
        }

        let cursor = self.table_state.selected().unwrap_or(0);
        self.rows.retain(|row| by.key(&row.connection) != target);
        self.visible = filter_indices(&self.rows, self.input_buffer.value());

        if self.rows.is_empty() {
            self.table_state.select(None);
            self.state = State::Terminated(Outcome::Exhausted);
            return;
        }

        let selected = match self.visible.len() {
            0 => None,
            len => Some(cursor.min(len - 1)),
        };
        self.table_state.select(selected);
        self.apply_height();
    }

    fn toggle_fullscreen<S>(&mut self, store: &mut S)
    where
        S: SettingsStore + ?Sized,
    {
        let settings = self.settings.toggled_fullscreen();
        match store.save_settings(&settings) {
            Ok(()) => {
                self.settings = settings;
                self.apply_height();
            }
            Err(err) => {
                log::warn!("failed to save settings: {err}");
                self.status = Some(format!("could not save settings: {err}"));
            }
        }
    }

    fn windowed_table_height(&self) -> u16 {
        let rows = u16::try_from(self.rows.len()).unwrap_or(u16::MAX);
        WINDOWED_MAX_HEIGHT.min(rows.saturating_add(1))
    }

    fn apply_height(&mut self) {
        self.table_height = if self.settings.fullscreen {
            self.window_height
        } else {
            self.windowed_table_height()
        };
    }

    pub fn draw(&mut self, terminal: &mut Terminal<impl Write>) -> io::Result<()> {
        terminal.draw(|frame| {
            self.ui(frame);
        })?;
        Result::Ok(())
    }

    fn ui(&mut self, f: &mut Frame) {
        let columns = self.view.columns();

        let header = widgets::Row::new(columns.iter().map(|c| Cell::from(c.title)))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows: Vec<widgets::Row> = self
            .visible
            .iter()
            .map(|i| widgets::Row::new(self.rows[*i].cells().into_iter().map(Cell::from)))
            .collect();

        let table = Table::new(rows, self.widths.iter().map(|w| Constraint::Length(*w)))
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Indexed(229))
                    .bg(Color::Indexed(57)),
            )
            .highlight_spacing(HighlightSpacing::Always);

        let area = f.size();
        let table_area = Rect {
            width: self.table_width.clamp(1, area.width.max(1)),
            ..area
        };

        let recs = Layout::vertical([
            Constraint::Length(self.table_height + 4),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(table_area);

        StatefulWidget::render(table, recs[0], f.buffer_mut(), &mut self.table_state);

        if matches!(self.state, State::Filtering) {
            let input = Paragraph::new(self.input_buffer.display())
                .style(Style::default().fg(Color::Cyan));
            input.render(recs[1], f.buffer_mut());
            let cursor = u16::try_from(self.input_buffer.visual_cursor()).unwrap_or(u16::MAX);
            f.set_cursor(recs[1].x.saturating_add(cursor), recs[1].y);
        } else if let Some(status) = &self.status {
            Paragraph::new(status.as_str())
                .style(Style::default().fg(Color::Red))
                .render(recs[1], f.buffer_mut());
        }

        Paragraph::new(self.help_line()).render(recs[2], f.buffer_mut());
    }

    fn help_line(&self) -> Line<'static> {
        let mut blocks: Vec<(&str, &str)> = vec![("↑/↓", "move")];
        match self.state {
            State::Filtering => {
                blocks.push(("enter", "connect"));
                blocks.push(("esc", "stop filtering"));
            }
            _ => {
                blocks.push(("enter", "connect"));
                blocks.push(("/", "filter"));
                if self.view == View::History {
                    blocks.push(("d", "delete host"));
                    blocks.push(("r", "delete name"));
                }
                blocks.push(("w", "full/windowed"));
                blocks.push(("q/esc", "quit"));
            }
        }

        let key_style = Style::default().fg(Color::Gray);
        let desc_style = Style::default().fg(Color::DarkGray);
        let sep_style = Style::default().fg(Color::Indexed(237));

        let mut spans = vec![Span::raw("  ")];
        for (i, (key, desc)) in blocks.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", sep_style));
            }
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(desc.to_string(), desc_style));
        }
        Line::from(spans)
    }
}
