//! Rendering with ratatui.
//!
//! [`render`] draws the current page and returns a [`HitMap`] of where
//! every clickable element landed, so mouse clicks can be resolved against
//! exactly what is on screen.

use std::ops::Range;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::controller::{Focusable, HandbookController};
use crate::document::{self, Inline};
use crate::storage::RecordStore;

/// Accent color for copy labels and the settling border.
const ACCENT: Color = Color::Cyan;
/// Color for disabled controls and secondary text.
const SECONDARY: Color = Color::DarkGray;
/// Color for copy fields.
const COPY: Color = Color::Yellow;
/// Color of the checkmark glyph.
const SUCCESS: Color = Color::Green;

const PREV_LABEL: &str = "◀ Prev";
const NEXT_LABEL: &str = "Next ▶";
const CHECKMARK: &str = " ✓";

/// Something a click can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// An element of the page body.
    Element(Focusable),
    /// The previous-page control.
    Previous,
    /// The next-page control.
    Next,
}

/// Screen areas of clickable targets from the last frame.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    areas: Vec<(Rect, Target)>,
}

impl HitMap {
    /// Record a target.
    pub fn push(&mut self, area: Rect, target: Target) {
        if area.width > 0 && area.height > 0 {
            self.areas.push((area, target));
        }
    }

    /// The innermost target at a cell. Later entries win.
    #[must_use]
    pub fn hit(&self, column: u16, row: u16) -> Option<Target> {
        self.areas
            .iter()
            .rev()
            .find(|(area, _)| area.contains(Position::new(column, row)))
            .map(|(_, target)| *target)
    }

    /// Number of recorded targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether no targets were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// Render the whole reader.
///
/// Drawing fits the active page's scroll offset to the screen, so the
/// controller is borrowed mutably.
pub fn render<S: RecordStore>(
    frame: &mut Frame,
    controller: &mut HandbookController<S>,
) -> HitMap {
    let mut hits = HitMap::default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Page
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, controller, chunks[0]);
    render_page(frame, controller, chunks[1], &mut hits);
    render_footer(frame, controller, chunks[2], &mut hits);

    hits
}

fn render_header<S: RecordStore>(frame: &mut Frame, controller: &HandbookController<S>, area: Rect) {
    let handbook = controller.handbook();
    let mut spans = Vec::new();
    if let Some(title) = &handbook.title {
        spans.push(Span::styled(
            title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    let checklist = controller.checklist();
    if !checklist.is_empty() {
        spans.push(Span::styled(
            format!("  {}/{} checked", checklist.checked_count(), checklist.len()),
            Style::default().fg(SECONDARY),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_page<S: RecordStore>(
    frame: &mut Frame,
    controller: &mut HandbookController<S>,
    area: Rect,
    hits: &mut HitMap,
) {
    let current = controller.current_page();
    let Some(page) = controller.handbook().page(current) else {
        return;
    };

    let border_color = if controller.is_settling() {
        ACCENT
    } else {
        SECONDARY
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    if let Some(title) = &page.title {
        block = block
            .title(format!(" {title} "))
            .title_style(Style::default().add_modifier(Modifier::BOLD));
    }
    let inner = block.inner(area);

    let mut rows = Vec::new();
    for body in &page.blocks {
        let (segments, entry) = body_segments(controller, body);
        rows.extend(
            wrap(&segments, usize::from(inner.width))
                .into_iter()
                .map(|segments| Row { segments, entry }),
        );
    }

    let height = usize::from(inner.height);
    let focused = focused_rows(&rows, controller.focus());
    let offset = controller.fit_scroll(rows.len(), height, focused);

    for (row, y) in rows.iter().skip(offset).take(height).zip(inner.y..) {
        record_hits(row, inner.x, y, inner.width, hits);
    }

    let more_above = offset > 0;
    let more_below = offset + height < rows.len();
    if more_above || more_below {
        let marker = match (more_above, more_below) {
            (true, true) => " ▲▼ ",
            (true, false) => " ▲ ",
            _ => " ▼ ",
        };
        let marker = Line::from(Span::styled(marker, Style::default().fg(ACCENT)));
        block = block.title_bottom(marker.alignment(Alignment::Right));
    }

    let lines: Vec<Line<'static>> = rows.iter().map(Row::line).collect();
    let scroll = u16::try_from(offset).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

/// A styled run of page text and the element it belongs to.
#[derive(Debug, Clone)]
struct Segment {
    text: String,
    style: Style,
    target: Option<Focusable>,
}

/// One screen row of the page body.
#[derive(Debug, Clone)]
struct Row {
    segments: Vec<Segment>,
    /// Checklist entry the row belongs to; the whole row toggles it.
    entry: Option<usize>,
}

impl Row {
    fn line(&self) -> Line<'static> {
        Line::from(
            self.segments
                .iter()
                .map(|segment| Span::styled(segment.text.clone(), segment.style))
                .collect::<Vec<_>>(),
        )
    }

    fn shows(&self, focus: Focusable) -> bool {
        match focus {
            Focusable::Entry(index) => self.entry == Some(index),
            Focusable::CopyField(_) => self.segments.iter().any(|s| s.target == Some(focus)),
        }
    }
}

/// Rows covered by the focused element.
fn focused_rows(rows: &[Row], focus: Option<Focusable>) -> Option<Range<usize>> {
    let focus = focus?;
    let start = rows.iter().position(|row| row.shows(focus))?;
    let len = rows[start..].iter().take_while(|row| row.shows(focus)).count();
    Some(start..start + len)
}

fn record_hits(row: &Row, x: u16, y: u16, width: u16, hits: &mut HitMap) {
    if let Some(index) = row.entry {
        hits.push(
            Rect::new(x, y, width, 1),
            Target::Element(Focusable::Entry(index)),
        );
    }
    let mut offset = 0;
    for segment in &row.segments {
        let len = segment.text.width();
        if let Some(target @ Focusable::CopyField(_)) = segment.target {
            if let Some(area) = span_area(x, y, width, offset, len) {
                hits.push(area, Target::Element(target));
            }
        }
        offset += len;
    }
}

/// Styled segments of one body block, and the entry it belongs to.
fn body_segments<S: RecordStore>(
    controller: &HandbookController<S>,
    body: &document::Block,
) -> (Vec<Segment>, Option<usize>) {
    let focus = controller.focus();
    let mut segments = Vec::new();

    let (inlines, base, entry) = match body {
        document::Block::Blank => return (segments, None),
        document::Block::Text(inlines) => (inlines, Style::default(), None),
        document::Block::Entry { index, label } => {
            let checked = controller.checklist().is_checked(*index);
            let mut style = if checked {
                Style::default()
                    .bg(ACCENT)
                    .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
            } else {
                Style::default()
            };
            if focus == Some(Focusable::Entry(*index)) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            segments.push(Segment {
                text: if checked { "[x] " } else { "[ ] " }.to_string(),
                style,
                target: None,
            });
            (label, style, Some(*index))
        }
    };

    for inline in inlines {
        segments.push(match inline {
            Inline::Plain(text) => Segment {
                text: text.clone(),
                style: base,
                target: None,
            },
            Inline::Copy { id, text } => {
                let mut style = base.remove_modifier(Modifier::REVERSED);
                let shown = if controller.is_showing_copied(*id) {
                    style = style.fg(ACCENT).add_modifier(Modifier::BOLD);
                    controller.settings().copied_label.clone()
                } else {
                    style = style.fg(COPY).add_modifier(Modifier::UNDERLINED);
                    text.clone()
                };
                if focus == Some(Focusable::CopyField(*id)) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Segment {
                    text: shown,
                    style,
                    target: Some(Focusable::CopyField(*id)),
                }
            }
        });
    }

    if let Some(index) = entry {
        if controller.has_checkmark(index) {
            segments.push(Segment {
                text: CHECKMARK.to_string(),
                style: Style::default().fg(SUCCESS),
                target: None,
            });
        }
    }
    (segments, entry)
}

/// Word-wrap segments into rows at most `width` cells wide.
///
/// Breaks fall after spaces; a word wider than a row is split by character.
/// Trailing spaces may run past the edge and are clipped when drawn.
fn wrap(segments: &[Segment], width: usize) -> Vec<Vec<Segment>> {
    let mut rows = vec![Vec::new()];
    if width == 0 {
        rows[0] = segments.to_vec();
        return rows;
    }

    let mut used = 0;
    for segment in segments {
        for word in segment.text.split_inclusive(' ') {
            if used > 0 && used + word.trim_end_matches(' ').width() > width {
                rows.push(Vec::new());
                used = 0;
            }

            let mut piece = String::new();
            for ch in word.chars() {
                let cells = ch.width().unwrap_or(0);
                if ch != ' ' && used > 0 && used + cells > width {
                    push_piece(&mut rows, &mut piece, segment);
                    rows.push(Vec::new());
                    used = 0;
                }
                piece.push(ch);
                used += cells;
            }
            push_piece(&mut rows, &mut piece, segment);
        }
    }
    rows
}

fn push_piece(rows: &mut [Vec<Segment>], piece: &mut String, like: &Segment) {
    if piece.is_empty() {
        return;
    }
    if let Some(row) = rows.last_mut() {
        row.push(Segment {
            text: std::mem::take(piece),
            style: like.style,
            target: like.target,
        });
    }
}

/// Area of a span starting `offset` cells into a line, clipped to `width`.
fn span_area(x: u16, y: u16, width: u16, offset: usize, len: usize) -> Option<Rect> {
    let offset = u16::try_from(offset).ok().filter(|o| *o < width)?;
    let len = u16::try_from(len).unwrap_or(u16::MAX).min(width - offset);
    Some(Rect::new(x + offset, y, len, 1))
}

fn render_footer<S: RecordStore>(
    frame: &mut Frame,
    controller: &HandbookController<S>,
    area: Rect,
    hits: &mut HitMap,
) {
    let nav = controller.nav_state();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(0),
            Constraint::Length(8),
        ])
        .split(area);

    let control = |disabled: bool| {
        if disabled {
            Style::default().fg(SECONDARY)
        } else {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        }
    };

    frame.render_widget(
        Paragraph::new(Span::styled(PREV_LABEL, control(nav.prev_disabled))),
        chunks[0],
    );
    if !nav.prev_disabled {
        hits.push(chunks[0], Target::Previous);
    }

    let mut middle = vec![Span::raw(format!("{} / {}", nav.current_number, nav.total))];
    if let Some(status) = controller.status() {
        middle.push(Span::styled(
            format!("  {status}"),
            Style::default().fg(SECONDARY),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(middle)).alignment(Alignment::Center),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(NEXT_LABEL, control(nav.next_disabled)))
            .alignment(Alignment::Right),
        chunks[2],
    );
    if !nav.next_disabled {
        hits.push(chunks[2], Target::Next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use ratatui::{backend::TestBackend, Terminal};

    use crate::checklist::ChecklistStore;
    use crate::controller::Settings;
    use crate::document::parse;
    use crate::platform::Capabilities;
    use crate::storage::Storage;

    const SOURCE: &str = "\
# Kansai
## Packing
- [ ] Passport
Gate `B12`
---
## Day one
Nothing to pack
";

    const LONG_PAGE: &str = "\
## Packing
Note 01
Note 02
Note 03
Note 04
Note 05
Note 06
Note 07
Note 08
Note 09
Note 10
Note 11
Note 12
- [ ] Passport
Boarding from gate `B12` after the lounge closes at nine
";

    fn open(storage: &Storage) -> HandbookController<&Storage> {
        open_source(storage, SOURCE)
    }

    fn open_source<'a>(storage: &'a Storage, source: &str) -> HandbookController<&'a Storage> {
        HandbookController::new(
            parse(source).unwrap(),
            ChecklistStore::new(storage, "/kansai.md"),
            Capabilities::unavailable(),
            Settings::default(),
            Instant::now(),
        )
        .unwrap()
    }

    fn draw(controller: &mut HandbookController<&Storage>) -> (String, HitMap) {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut hits = HitMap::default();
        terminal
            .draw(|frame| hits = render(frame, controller))
            .unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        (text, hits)
    }

    #[test]
    fn test_render_first_page() {
        let storage = Storage::open_in_memory().unwrap();
        let mut controller = open(&storage);

        let (text, _) = draw(&mut controller);
        assert!(text.contains("Kansai"));
        assert!(text.contains("Packing"));
        assert!(text.contains("[ ] Passport"));
        assert!(text.contains("1 / 2"));
        assert!(text.contains("Next"));
    }

    #[test]
    fn test_hit_map_covers_entries_and_controls() {
        let storage = Storage::open_in_memory().unwrap();
        let mut controller = open(&storage);

        let (_, hits) = draw(&mut controller);
        // Row 0 is the header, row 1 the top border.
        assert_eq!(hits.hit(3, 2), Some(Target::Element(Focusable::Entry(0))));
        // "Gate " is five cells wide.
        assert_eq!(
            hits.hit(1 + 5, 3),
            Some(Target::Element(Focusable::CopyField(0)))
        );
        assert_eq!(hits.hit(1, 3), None);
        assert_eq!(hits.hit(39, 9), Some(Target::Next));
        assert_eq!(hits.hit(0, 9), None);
    }

    #[test]
    fn test_checked_entry_shows_glyph() {
        let storage = Storage::open_in_memory().unwrap();
        let mut controller = open(&storage);
        controller.toggle_entry(0, Instant::now());

        let (text, _) = draw(&mut controller);
        assert!(text.contains("[x] Passport ✓"));
        assert!(text.contains("1/1 checked"));
    }

    #[test]
    fn test_long_page_follows_focus() {
        let storage = Storage::open_in_memory().unwrap();
        let mut controller = open_source(&storage, LONG_PAGE);

        // 40x10 leaves a 38x6 page body starting at row 2.
        let (text, hits) = draw(&mut controller);
        assert!(text.contains("Note 01"));
        assert!(!text.contains("Passport"));
        assert!(text.contains("▼"));
        assert!(hits.hit(3, 2).is_none());

        controller.move_focus(true);
        let (text, hits) = draw(&mut controller);
        assert_eq!(controller.scroll_offset(), 7);
        assert!(!text.contains("Note 01"));
        assert!(text.contains("Note 08"));
        assert!(text.contains("[ ] Passport"));
        assert_eq!(hits.hit(3, 7), Some(Target::Element(Focusable::Entry(0))));

        // The long line wraps after "the "; only its first row holds the
        // copy field, so one more row of scrolling is enough.
        controller.move_focus(true);
        let (text, hits) = draw(&mut controller);
        assert_eq!(controller.scroll_offset(), 8);
        assert!(text.contains("Boarding from gate B12 after the"));
        assert!(!text.contains("lounge"));
        assert_eq!(hits.hit(1 + 19, 7), Some(Target::Element(Focusable::CopyField(0))));
        assert_eq!(hits.hit(1 + 19, 6), Some(Target::Element(Focusable::Entry(0))));
    }

    #[test]
    fn test_scroll_keys_move_page_body() {
        let storage = Storage::open_in_memory().unwrap();
        let mut controller = open_source(&storage, LONG_PAGE);
        let now = Instant::now();
        draw(&mut controller);

        controller.handle(crate::input::Action::ScrollPages(1), now);
        let (text, _) = draw(&mut controller);
        assert_eq!(controller.scroll_offset(), 5);
        assert!(text.contains("Note 06"));
        assert!(text.contains("▲▼"));

        // Scrolling past the end stops at the last screen.
        controller.handle(crate::input::Action::ScrollLines(100), now);
        let (text, _) = draw(&mut controller);
        assert_eq!(controller.scroll_offset(), 9);
        assert!(text.contains("lounge closes at nine"));
        assert!(!text.contains("▼"));
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let segment = |text: &str| Segment {
            text: text.to_string(),
            style: Style::default(),
            target: None,
        };
        let texts = |rows: Vec<Vec<Segment>>| -> Vec<String> {
            rows.into_iter()
                .map(|row| row.into_iter().map(|s| s.text).collect())
                .collect()
        };

        assert_eq!(
            texts(wrap(&[segment("one two three")], 8)),
            vec!["one two ", "three"]
        );
        assert_eq!(texts(wrap(&[segment("abcdefghij")], 4)), vec!["abcd", "efgh", "ij"]);
        assert_eq!(texts(wrap(&[], 8)), vec![""]);
    }

    #[test]
    fn test_span_area_clips_to_width() {
        assert_eq!(span_area(1, 2, 10, 4, 3), Some(Rect::new(5, 2, 3, 1)));
        assert_eq!(span_area(1, 2, 10, 8, 5), Some(Rect::new(9, 2, 2, 1)));
        assert_eq!(span_area(1, 2, 10, 10, 5), None);
    }
}
