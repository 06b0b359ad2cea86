//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use shelf_core::modal::Clock;
use shelf_core::{AnimationPhase, Book};

use super::app::App;
use super::layout::{screen_areas, GridLayout};
use crate::output::truncate;

/// Main UI rendering function
pub fn draw<C: Clock + Clone>(frame: &mut Frame, app: &App<C>) {
    let [header, grid, status] = screen_areas(frame.area());
    let backdrop = app.modal.is_visible();

    draw_header(frame, app, header);
    draw_grid(frame, app, grid, backdrop);
    draw_status_bar(frame, app, status);

    if backdrop {
        draw_modal(frame, app);
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(ref message) = app.error_message {
        draw_error_overlay(frame, message);
    }
}

/// Title line plus category/year badges
fn draw_header<C: Clock + Clone>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let selected = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let badge = |label: String, active: bool| {
        if active {
            Span::styled(format!(" {} ", label), selected)
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
        }
    };

    let title = Line::from(vec![
        Span::styled("Shelf", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {} books  ·  sort: {}", app.books.len(), app.filter.sort.label()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    let mut categories = vec![badge("All".to_string(), app.filter.category.is_none())];
    categories.extend(app.category_counts().into_iter().map(|(name, count)| {
        let active = app.filter.category.as_deref() == Some(name.as_str());
        badge(format!("{} ({})", name, count), active)
    }));

    let mut years = vec![badge("Any year".to_string(), app.filter.year.is_none())];
    years.extend(
        app.years()
            .iter()
            .map(|year| badge(year.to_string(), app.filter.year == Some(*year))),
    );

    let paragraph = Paragraph::new(vec![title, Line::from(categories), Line::from(years)])
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(paragraph, area);
}

/// Book cards in the visible rows
fn draw_grid<C: Clock + Clone>(frame: &mut Frame, app: &App<C>, area: Rect, backdrop: bool) {
    if app.books.is_empty() {
        let empty = Paragraph::new("No books match the current filters.")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(empty, area);
        return;
    }

    // The card under the modal has lifted out of the grid
    let lifted = app.modal.displayed_book().map(|b| &b.id);

    for (index, book) in app.books.iter().enumerate() {
        let Some(card) = app.layout.card_cells(index) else {
            continue;
        };
        if lifted == Some(&book.id) {
            let gap = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().add_modifier(Modifier::DIM));
            frame.render_widget(gap, card);
            continue;
        }
        draw_card(frame, book, card, index == app.selected, backdrop);
    }
}

fn draw_card(frame: &mut Frame, book: &Book, card: Rect, is_selected: bool, dim: bool) {
    let accent = accent_color(book);
    let mut border = Style::default().fg(accent);
    if is_selected {
        border = border.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if dim {
        border = border.add_modifier(Modifier::DIM);
    }

    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let cover = GridLayout::cover_cells(card);
    draw_cover_face(frame, book, cover, false, dim);

    let text_area = Rect::new(
        inner.x,
        cover.y + cover.height,
        inner.width,
        inner.height.saturating_sub(cover.height),
    );
    let width = usize::from(inner.width);
    let mut style = Style::default();
    if dim {
        style = style.add_modifier(Modifier::DIM);
    }
    let lines = vec![
        Line::from(Span::styled(
            truncate(&book.title, width),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate(&book.author, width),
            style.fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), text_area);
}

/// Cover region: image marker, or the colored placeholder with title/author
fn draw_cover_face(frame: &mut Frame, book: &Book, area: Rect, cover_failed: bool, dim: bool) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let mut style = Style::default().fg(Color::White).bg(accent_color(book));
    if dim {
        style = style.add_modifier(Modifier::DIM);
    }
    let width = usize::from(area.width.saturating_sub(2));

    let lines = match book.cover.as_deref() {
        Some(cover) if !cover_failed => vec![
            Line::from(""),
            Line::from("▣"),
            Line::from(truncate(cover_name(cover), width)),
        ],
        _ => vec![
            Line::from(""),
            Line::from(Span::styled(
                truncate(&book.title, width),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(truncate(&book.author, width)),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .style(style)
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// The detail panel at this frame's position
fn draw_modal<C: Clock + Clone>(frame: &mut Frame, app: &App<C>) {
    let Some(book) = app.modal.displayed_book() else {
        return;
    };
    let area = app.panel_area();
    if area.width < 3 || area.height < 3 {
        return;
    }

    let accent = accent_color(book);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // In flight the panel shows only the cover, like the card it came from
    if app.modal.phase() != AnimationPhase::Open {
        draw_cover_face(frame, book, inner, app.modal.cover_failed(), false);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    let fading = app.modal.is_transitioning();
    draw_cover_face(frame, book, chunks[0], app.modal.cover_failed(), fading);
    draw_details(frame, app, book, chunks[1], fading);
}

fn draw_details<C: Clock + Clone>(
    frame: &mut Frame,
    app: &App<C>,
    book: &Book,
    area: Rect,
    fading: bool,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let base = if fading {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    let heading = base.add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    if !book.category.is_empty() {
        lines.push(Line::from(Span::styled(
            book.category.to_uppercase(),
            base.fg(accent_color(book)),
        )));
    }
    lines.push(Line::from(Span::styled(book.title.clone(), heading)));

    let mut byline = book.author.clone();
    if let Some(year) = book.year() {
        if !byline.is_empty() {
            byline.push_str(" · ");
        }
        byline.push_str(&year.to_string());
    }
    if !byline.is_empty() {
        lines.push(Line::from(Span::styled(byline, base.fg(Color::Gray))));
    }

    for (title, body) in [("Notes", &book.notes), ("Summary", &book.summary)] {
        if let Some(text) = body {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(title, heading)));
            lines.push(Line::from(Span::styled(text.clone(), base)));
        }
    }

    if !book.quotes.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Quotes", heading)));
        for quote in &book.quotes {
            lines.push(Line::from(Span::styled(
                format!("“{}”", quote),
                base.add_modifier(Modifier::ITALIC),
            )));
        }
    }

    let links = book.external_links();
    if !links.is_empty() {
        lines.push(Line::from(""));
        for (label, _) in links {
            lines.push(Line::from(Span::styled(
                format!("↗ {}", label),
                base.fg(Color::Cyan),
            )));
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, sections[0]);

    let arrow = |label: &'static str, enabled: bool| {
        if enabled {
            Span::styled(label, Style::default().add_modifier(Modifier::BOLD))
        } else {
            Span::styled(label, Style::default().add_modifier(Modifier::DIM))
        }
    };
    let nav = Line::from(vec![
        arrow("← prev", app.modal.has_prev()),
        Span::raw("   "),
        arrow("next →", app.modal.has_next()),
    ]);
    frame.render_widget(Paragraph::new(nav), sections[1]);
}

/// Draw the status bar
fn draw_status_bar<C: Clock + Clone>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.modal.is_visible() {
        "esc:close  ←/→:prev/next  o:open link  ?:help".to_string()
    } else {
        "enter:open  r:random  c/C:category  y:year  s:sort  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered_popup(frame.area(), 50, 20);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Grid:"),
        Line::from("  h/j/k/l, arrows  Move selection"),
        Line::from("  Enter            Open book"),
        Line::from("  r                Random book"),
        Line::from("  c / C            Next / previous category"),
        Line::from("  y                Cycle year"),
        Line::from("  s                Cycle sort order"),
        Line::from("  q                Quit"),
        Line::from(""),
        Line::from("Book:"),
        Line::from("  Esc              Close"),
        Line::from("  ← / →            Previous / next book"),
        Line::from("  o                Open first link"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

fn draw_error_overlay(frame: &mut Frame, message: &str) {
    let popup_area = centered_popup(frame.area(), 60, 7);
    frame.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = area.x + area.width.saturating_sub(popup_width) / 2;
    let popup_y = area.y + area.height.saturating_sub(popup_height) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Book accent color from `#rrggbb`
fn accent_color(book: &Book) -> Color {
    parse_hex_color(&book.color).unwrap_or(Color::Magenta)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Last path segment of a cover path or URL
fn cover_name(cover: &str) -> &str {
    cover
        .rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(cover)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#6C5CE7"), Some(Color::Rgb(0x6c, 0x5c, 0xe7)));
        assert_eq!(parse_hex_color("6C5CE7"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_cover_name() {
        assert_eq!(cover_name("covers/dune.jpg"), "dune.jpg");
        assert_eq!(cover_name("https://example.com/img/"), "img");
        assert_eq!(cover_name("plain.png"), "plain.png");
    }

    #[test]
    fn test_centered_popup_fits_small_terminal() {
        let popup = centered_popup(Rect::new(0, 0, 30, 10), 50, 20);
        assert_eq!(popup, Rect::new(2, 2, 26, 6));
    }
}
