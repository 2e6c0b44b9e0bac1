//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * Every screen is a main area plus a one-line status bar at the bottom.
//! * The data screens share one convention: nothing fetched yet and a load
//!   still possible means spinner; a failure with nothing to show means an
//!   error line; a successful empty load says so explicitly.
//! * Colours and styles are defined inline.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Screen, GRID_COLUMNS};
use crate::store::{Snapshot, Status};

/// Height of one category cell, borders included.
const CELL_HEIGHT: u16 = 5;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    match app.screen.clone() {
        Screen::Categories => draw_categories(app, frame, main_area),
        Screen::Detail { category } => draw_tweets(app, frame, main_area, &category),
        Screen::Otp => draw_otp(app, frame, main_area),
    }
    draw_status_bar(app, frame, status_area);
}

// ---------------------------------------------------------------------------
// Shared placeholders
// ---------------------------------------------------------------------------

/// Render the placeholder for an empty cell.  Returns `false` when the cell
/// has data and the caller should draw it instead.
fn draw_placeholder<T>(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot<Vec<T>>,
    empty_text: &str,
) -> bool {
    if !snapshot.data.is_empty() {
        return false;
    }

    let lines = match &snapshot.status {
        Status::Idle | Status::Loading => vec![Line::from(vec![
            Span::styled(app.spinner.glyph(), Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::raw(app.spinner.label()),
        ])],
        Status::Failed(message) => vec![
            Line::styled("Could not load.", Style::default().fg(Color::Red)),
            Line::styled(message.clone(), Style::default().fg(Color::DarkGray)),
            Line::raw("Press r to retry."),
        ],
        Status::Loaded { .. } => vec![Line::styled(
            empty_text.to_string(),
            Style::default().fg(Color::DarkGray),
        )],
    };

    let height = lines.len() as u16;
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), middle);
    true
}

// ---------------------------------------------------------------------------
// Category grid
// ---------------------------------------------------------------------------

fn draw_categories(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Categories ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let snapshot = app.categories.borrow().clone();
    if draw_placeholder(app, frame, inner, &snapshot, "No categories.") {
        return;
    }

    let rows: Vec<&[String]> = snapshot.data.chunks(GRID_COLUMNS).collect();
    let visible_rows = (inner.height / CELL_HEIGHT).max(1) as usize;
    let cursor = app.grid_cursor();
    let selected_row = cursor / GRID_COLUMNS;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let row_areas = Layout::vertical(vec![Constraint::Length(CELL_HEIGHT); visible_rows]).split(inner);
    for (row_index, row_area) in (first_row..rows.len()).zip(row_areas.iter()) {
        let cell_areas =
            Layout::horizontal(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                .split(*row_area);

        for (column, name) in rows[row_index].iter().enumerate() {
            let selected = row_index * GRID_COLUMNS + column == cursor;
            draw_category_cell(frame, cell_areas[column], name, selected);
        }
    }
}

fn draw_category_cell(frame: &mut Frame, area: Rect, name: &str, selected: bool) {
    let (border, text) = if selected {
        (
            Style::default().fg(Color::Cyan),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::Gray))
    };

    let cell = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let inner = cell.inner(area);
    frame.render_widget(cell, area);

    // label sits on the bottom line of the cell
    let [_, label] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(
        Paragraph::new(Span::styled(name.to_string(), text)).alignment(Alignment::Center),
        label,
    );
}

// ---------------------------------------------------------------------------
// Tweet list
// ---------------------------------------------------------------------------

fn draw_tweets(app: &mut App, frame: &mut Frame, area: Rect, category: &str) {
    let block = Block::default()
        .title(format!(" {category} "))
        .borders(Borders::ALL);

    let snapshot = app.detail_snapshot();
    if snapshot.data.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        draw_placeholder(app, frame, inner, &snapshot, "No tweets in this category.");
        return;
    }

    // room for the highlight symbol and borders
    let width = area.width.saturating_sub(4).max(10) as usize;
    let items: Vec<ListItem> = snapshot
        .data
        .iter()
        .map(|tweet| {
            let text = tweet.as_ref().map(|t| t.display_text()).unwrap_or("(missing)");
            let mut lines: Vec<Line> = wrap(text, width).into_iter().map(Line::from).collect();
            lines.push(Line::styled(
                "─".repeat(width.min(40)),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Greedy word wrap measured in terminal columns.  Words wider than
/// `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for mut word in text.split_whitespace() {
        while word.width() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let (head, tail) = split_at_width(word, width);
            lines.push(head.to_string());
            word = tail;
        }
        if word.is_empty() {
            continue;
        }

        let word_width = word.width();
        if !current.is_empty() && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split `word` after the longest prefix that fits in `width` columns.
/// The prefix always holds at least one character.
fn split_at_width(word: &str, width: usize) -> (&str, &str) {
    let mut used = 0;
    for (index, c) in word.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            let at = if index == 0 { c.len_utf8() } else { index };
            return word.split_at(at);
        }
        used += w;
    }
    (word, "")
}

// ---------------------------------------------------------------------------
// Verification code
// ---------------------------------------------------------------------------

fn draw_otp(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Verification code ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, boxes_area, _, gauge_area, label_area, _] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    draw_otp_boxes(app, frame, boxes_area);

    let now = Instant::now();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(app.otp_timer.progress_at(now).clamp(0.0, 1.0))
        .label("");
    frame.render_widget(gauge, gauge_area);

    let label = if app.otp_timer.can_resend_at(now) {
        Line::from(vec![
            Span::styled("Didn't receive code? ", Style::default().fg(Color::Gray)),
            Span::styled("RESEND (r)", Style::default().fg(Color::Cyan)),
        ])
    } else {
        Line::from(vec![
            Span::styled("Code expires in ", Style::default().fg(Color::Gray)),
            Span::styled(app.otp_timer.label_at(now), Style::default().fg(Color::Cyan)),
        ])
    };
    frame.render_widget(Paragraph::new(label), label_area);
}

fn draw_otp_boxes(app: &App, frame: &mut Frame, area: Rect) {
    let length = app.otp.length();
    if length == 0 {
        return;
    }
    // one column of gap after each box
    let cells = Layout::horizontal(vec![Constraint::Length(6); length]).split(area);

    for (index, slot) in cells.iter().enumerate() {
        let cell = Rect {
            width: slot.width.saturating_sub(1),
            ..*slot
        };
        let digit = app.otp.digit(index);
        let highlighted = digit.is_some() || index == app.otp.active_index();
        let border = if highlighted {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let text = digit.map(String::from).unwrap_or_default();
        let widget = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border),
            );
        frame.render_widget(widget, cell);
    }
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

fn status_text(status: &Status) -> (String, Color) {
    match status {
        Status::Idle => ("idle".into(), Color::DarkGray),
        Status::Loading => ("loading".into(), Color::Yellow),
        Status::Loaded { at } => (
            format!("updated {}", at.with_timezone(&chrono::Local).format("%H:%M:%S")),
            Color::Green,
        ),
        Status::Failed(message) => (format!("error: {message}"), Color::Red),
    }
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let (status, count, help) = match app.screen {
        Screen::Categories => {
            let snapshot = app.categories.borrow();
            (
                Some(status_text(&snapshot.status)),
                format!("{} categories", snapshot.data.len()),
                "q: quit  ←↑↓→: move  Enter: open  r: refresh  o: code",
            )
        }
        Screen::Detail { .. } => {
            let snapshot = app.detail_snapshot();
            (
                Some(status_text(&snapshot.status)),
                format!("{} tweets", snapshot.data.len()),
                "Esc: back  ↑/↓: scroll  Home/End: jump  r: refresh",
            )
        }
        Screen::Otp => (
            None,
            format!("{}/{} digits", app.otp.code().len(), app.otp.length()),
            "Esc: back  0-9: type  Backspace: delete",
        ),
    };

    let mut spans = vec![Span::raw(" ")];
    if let Some((text, color)) = status {
        spans.push(Span::styled(text, Style::default().fg(color)));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(count, Style::default().fg(Color::Green)));
    spans.push(Span::raw("  "));
    spans.push(Span::raw(help));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::app::tests::make_app;
    use crate::source::{FetchError, Tweet};
    use crate::store::tests::FakeSource;

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();

        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    // -- placeholders --------------------------------------------------------

    #[test]
    fn empty_grid_shows_spinner() {
        let (_, mut app) = make_app(FakeSource::default());
        let text = render(&mut app);
        assert!(text.contains("Loading"));
        assert!(text.contains("0 categories"));
    }

    #[tokio::test]
    async fn failed_grid_shows_error_instead_of_spinner() {
        let (_, mut app) =
            make_app(FakeSource::with_categories(vec![Err(FetchError::EmptyBody)]));
        app.refresh_categories();
        app.categories.clone().wait_for(|s| !s.is_pending()).await.unwrap();

        let text = render(&mut app);
        assert!(!text.contains("Loading"));
        assert!(text.contains("Could not load."));
        assert!(text.contains("response body was empty"));
    }

    #[tokio::test]
    async fn empty_result_is_not_a_spinner() {
        let (_, mut app) = make_app(FakeSource::with_tweets("quiet", vec![]));
        app.open_detail("quiet".into());
        app.tweets.clone().wait_for(|s| !s.is_pending()).await.unwrap();

        let text = render(&mut app);
        assert!(text.contains("No tweets in this category."));
    }

    // -- data ----------------------------------------------------------------

    #[tokio::test]
    async fn grid_lists_categories() {
        let (_, mut app) = make_app(FakeSource::with_categories(vec![Ok(vec![
            "tech".into(),
            "sports".into(),
            "tech".into(),
        ])]));
        app.refresh_categories();
        app.categories.clone().wait_for(|s| !s.is_pending()).await.unwrap();

        let text = render(&mut app);
        assert!(text.contains("tech"));
        assert!(text.contains("sports"));
        assert!(text.contains("2 categories"));
    }

    #[tokio::test]
    async fn detail_lists_tweet_texts() {
        let (_, mut app) = make_app(FakeSource::with_tweets(
            "tech",
            vec![Tweet::new("hello", "tech"), Tweet::new("world", "tech")],
        ));
        app.open_detail("tech".into());
        app.tweets.clone().wait_for(|s| s.version == 1).await.unwrap();
        app.select_first();

        let text = render(&mut app);
        assert!(text.contains("hello"));
        assert!(text.contains("world"));
        assert!(text.contains("2 tweets"));
    }

    #[tokio::test]
    async fn grid_follows_a_shrinking_category_list() {
        let many: Vec<String> = (0..12).map(|i| format!("c{i}")).collect();
        let (_, mut app) = make_app(FakeSource::with_categories(vec![
            Ok(many),
            Ok(vec!["tech".into(), "sports".into()]),
        ]));
        app.refresh_categories();
        app.categories.clone().wait_for(|s| s.version == 1).await.unwrap();
        for _ in 0..20 {
            app.grid_down();
        }

        app.refresh_categories();
        app.categories.clone().wait_for(|s| s.version == 2).await.unwrap();

        let text = render(&mut app);
        assert!(text.contains("tech"));
        assert!(text.contains("sports"));
        assert!(text.contains("2 categories"));
    }

    #[tokio::test]
    async fn detail_never_shows_another_categorys_tweets() {
        let (source, mut app) = make_app(FakeSource::with_tweets(
            "tech",
            vec![Tweet::new("hello", "tech")],
        ));
        app.open_detail("tech".into());
        app.tweets.clone().wait_for(|s| s.version == 1).await.unwrap();
        assert!(render(&mut app).contains("hello"));

        let release = source.gate("sports");
        app.back();
        app.open_detail("sports".into());

        let text = render(&mut app);
        assert!(text.contains("sports"));
        assert!(!text.contains("hello"));
        assert!(text.contains("Loading"));

        release.send(Err(FetchError::EmptyBody)).unwrap();
        app.tweets
            .clone()
            .wait_for(|s| matches!(s.status, Status::Failed(_)))
            .await
            .unwrap();

        let text = render(&mut app);
        assert!(!text.contains("hello"));
        assert!(text.contains("Could not load."));
        assert!(text.contains("0 tweets"));
    }

    #[test]
    fn otp_screen_shows_countdown_and_digits() {
        let (_, mut app) = make_app(FakeSource::default());
        app.open_otp();
        app.otp_paste("42");

        let text = render(&mut app);
        assert!(text.contains("Code expires in"));
        assert!(text.contains("2/6 digits"));
    }

    // -- wrap ----------------------------------------------------------------

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn wrap_counts_wide_characters_as_two_columns() {
        assert_eq!(wrap("日本語テキスト", 6), vec!["日本語", "テキス", "ト"]);
        assert_eq!(wrap("hi 日本", 5), vec!["hi", "日本"]);
        for line in wrap("漢字 and 🎉🎉 mixed", 4) {
            assert!(line.width() <= 4, "{line:?} overflows");
        }
    }

    #[test]
    fn wrap_empty_text_yields_one_line() {
        assert_eq!(wrap("", 10), vec![""]);
    }
}
