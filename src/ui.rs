use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Highlight, HighlightStyle, InputMode};

const BG: Color = Color::Rgb(9, 15, 25);
const TEXT: Color = Color::Rgb(226, 232, 240);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);

pub fn render(frame: &mut Frame, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    app.resize(usize::from(root[1].height));

    render_header(frame, root[0], app);
    render_body(frame, root[1], app);
    render_footer(frame, root[2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let width = usize::from(area.width);
    let title = compact_text(
        &format!(" {} ", app.document().full_path()),
        width.saturating_sub(2),
    );
    let title_width = title.chars().count();
    let left = width.saturating_sub(title_width) / 2;
    let right = width.saturating_sub(title_width + left);

    let rule = Style::default().fg(MUTED);
    let line = Line::from(vec![
        Span::styled("─".repeat(left), rule),
        Span::styled(
            title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("─".repeat(right), rule),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}

fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    let highlights = app.highlights();
    let lines = app
        .visible_lines()
        .map(|(index, text)| {
            let on_line = highlights
                .iter()
                .filter(|highlight| highlight.line == index)
                .collect::<Vec<_>>();
            styled_line(text, &on_line)
        })
        .collect::<Vec<_>>();

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(BG).fg(TEXT)),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    match app.mode() {
        InputMode::Normal => {
            let status = app.status();
            let (status_fg, status_bg) = if status.starts_with("bad pattern") {
                (Color::Black, ERROR)
            } else {
                (Color::White, PL_B)
            };
            push_powerline_segment(&mut spans, " nrm ", Color::White, PL_A, status_bg);
            push_powerline_segment(
                &mut spans,
                format!(
                    " :{} ",
                    compact_text(status, usize::from(area.width).saturating_sub(12))
                ),
                status_fg,
                status_bg,
                BG,
            );
            if let Some(pattern) = app.pattern() {
                spans.push(Span::styled(
                    format!(" /{pattern}"),
                    Style::default().fg(MUTED),
                ));
            }
            let position = position_label(app);
            let gap = usize::from(area.width)
                .saturating_sub(spans_width(&spans) + position.chars().count());
            if gap > 0 {
                spans.push(Span::raw(" ".repeat(gap)));
                spans.push(Span::styled(position, Style::default().fg(MUTED)));
            }
        }
        InputMode::Pattern => {
            push_powerline_segment(&mut spans, " srch ", Color::Black, WARN, PL_B);
            let prompt = format!(" /{} ", app.input());
            let cursor_x = spans_width(&spans) + prompt.chars().count() - 1;
            push_powerline_segment(&mut spans, prompt, Color::White, PL_B, BG);
            let x = area
                .x
                .saturating_add(u16::try_from(cursor_x).unwrap_or(u16::MAX))
                .min(area.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, area.y));
        }
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

/// Splits `text` at highlight boundaries; where highlights overlap the last
/// one wins.
fn styled_line(text: &str, highlights: &[&Highlight]) -> Line<'static> {
    if highlights.is_empty() {
        return Line::from(text.to_string());
    }

    let mut cuts = vec![0, text.len()];
    for highlight in highlights {
        cuts.push(highlight.columns.start.min(text.len()));
        cuts.push(highlight.columns.end.min(text.len()));
    }
    cuts.retain(|cut| text.is_char_boundary(*cut));
    cuts.sort_unstable();
    cuts.dedup();

    let spans = cuts
        .windows(2)
        .map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            let style = highlights
                .iter()
                .rev()
                .find(|highlight| {
                    highlight.columns.start <= start && end <= highlight.columns.end
                })
                .map(|highlight| highlight_style(highlight.style))
                .unwrap_or_default();
            Span::styled(text[start..end].to_string(), style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn highlight_style(style: HighlightStyle) -> Style {
    match style {
        HighlightStyle::Field => Style::default().fg(ACCENT),
        HighlightStyle::SelectedField => Style::default()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD),
        HighlightStyle::SearchMatch => Style::default().fg(Color::Black).bg(WARN),
    }
}

fn push_powerline_segment(
    spans: &mut Vec<Span<'static>>,
    content: impl Into<String>,
    fg: Color,
    bg: Color,
    next_bg: Color,
) {
    spans.push(Span::styled(
        content.into(),
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("", Style::default().fg(bg).bg(next_bg)));
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.chars().count()).sum()
}

/// Selected field, visible lines and how many levels deep the session is.
fn position_label(app: &App) -> String {
    let viewport = app.viewport();
    let render = app.render();
    let visible = viewport.visible(render);
    let fields = match app.document().field_count() {
        0 => "no fields".to_string(),
        count => format!("{}/{count} fields", viewport.selected() + 1),
    };
    let depth = match app.history_depth() {
        0 => String::new(),
        depth => format!("↑{depth} "),
    };
    format!(
        "{depth}{fields}  {}-{}/{} ",
        visible.start + 1,
        visible.end,
        render.total_height()
    )
}

fn compact_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    if max_chars <= 1 {
        return "…".to_string();
    }

    let mut out = value
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}
