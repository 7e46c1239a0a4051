pub mod ring;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points},
        Paragraph, Widget,
    },
};

use crate::{app::App, clock::Clock, haptics::Feedback};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// Canvas extent; the progress ring has radius 1 and ripples grow to 2
const CANVAS_BOUND: f64 = 2.2;
const RING_RADIUS: f64 = 1.0;
const ARC_SAMPLES: usize = 360;

const TEAL: Color = Color::Rgb(65, 115, 109);

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let running = self.session.is_running();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // audio indicator
                Constraint::Min(3),    // ring
                Constraint::Length(1), // time left
                Constraint::Length(1), // duration selector
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ])
            .split(area);

        // nothing is loaded until a session starts
        if running {
            let audio = Paragraph::new(Span::styled(
                if self.is_audio_playing() {
                    "♪ sound on (m)"
                } else {
                    "♪ muted (m)"
                },
                dim_style,
            ))
            .alignment(Alignment::Right);
            audio.render(chunks[0], buf);
        }

        let ring_rect = ring::ring_area(chunks[1]);
        render_ring(self, ring_rect, buf);

        let label = match self.current_word() {
            Some(word) => word,
            None => "START",
        };
        let label_width = ring_rect.width.saturating_sub(4) as usize / 2;
        let label_rect = Rect {
            x: ring_rect.x,
            y: ring_rect.y + ring_rect.height / 2,
            width: ring_rect.width,
            height: ring_rect.height.min(1),
        };
        Paragraph::new(Span::styled(
            ring::fit_word(label, label_width.max(5)),
            bold_style.fg(Color::White),
        ))
        .alignment(Alignment::Center)
        .render(label_rect, buf);

        if running {
            let left = Paragraph::new(Span::styled(
                format!("{} left", ring::format_clock(self.session.remaining_secs())),
                dim_style,
            ))
            .alignment(Alignment::Center);
            left.render(chunks[2], buf);
        }

        let selector_style = if running { dim_style } else { bold_style };
        let selector = Paragraph::new(Line::from(vec![
            Span::styled("−  ", selector_style),
            Span::styled(
                format!("{:02}:{:02}", self.length.minutes(), 0),
                selector_style,
            ),
            Span::styled("  +", selector_style),
        ]))
        .alignment(Alignment::Center);
        selector.render(chunks[3], buf);

        let legend = Paragraph::new(Span::styled(
            if running {
                "(m)ute / (esc)ape"
            } else {
                "(space) start / (-/+) minutes / (esc)ape"
            },
            italic_style,
        ))
        .alignment(Alignment::Center);
        legend.render(chunks[5], buf);
    }
}

fn render_ring<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let rings = app.ripple.rings(app.now());
    let arc = if app.session.is_running() {
        ring::arc_points(app.session.progress(), RING_RADIUS, ARC_SAMPLES)
    } else {
        Vec::new()
    };
    let arc_color = match app.active_pulse() {
        Some(Feedback::Warning) => Color::Yellow,
        Some(Feedback::Success) => Color::LightGreen,
        None => Color::Green,
    };
    let base_color = match app.active_pulse() {
        Some(Feedback::Success) => Color::LightGreen,
        _ => TEAL,
    };

    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-CANVAS_BOUND, CANVAS_BOUND])
        .y_bounds([-CANVAS_BOUND, CANVAS_BOUND])
        .paint(|ctx| {
            for ripple in &rings {
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: RING_RADIUS * ripple.scale,
                    color: if ripple.opacity > 0.06 {
                        Color::Gray
                    } else {
                        Color::DarkGray
                    },
                });
            }
            ctx.layer();
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: RING_RADIUS,
                color: base_color,
            });
            ctx.draw(&Points {
                coords: &arc,
                color: arc_color,
            });
        })
        .render(area, buf);
}
