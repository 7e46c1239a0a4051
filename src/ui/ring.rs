use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Points along the progress arc, starting at twelve o'clock and running
/// clockwise for `progress` of a full turn.
pub fn arc_points(progress: f64, radius: f64, samples_per_turn: usize) -> Vec<(f64, f64)> {
    let progress = progress.clamp(0.0, 1.0);
    if progress <= 0.0 || samples_per_turn == 0 {
        return Vec::new();
    }

    let steps = ((samples_per_turn as f64) * progress).ceil() as usize;
    (0..=steps)
        .map(|i| {
            let t = progress * i as f64 / steps as f64;
            let angle = FRAC_PI_2 - TAU * t;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Largest centered area in which a canvas circle looks round, assuming
/// terminal cells are twice as tall as they are wide
pub fn ring_area(area: Rect) -> Rect {
    let mut height = area.height;
    let mut width = height.saturating_mul(2);
    if width > area.width {
        width = area.width;
        height = width / 2;
    }
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// `mm:ss`, rounding partial seconds up so the display reaches 00:00 only at the end
pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0).ceil() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Trim a word to fit `max_width` columns, marking the cut with an ellipsis
pub fn fit_word(word: &str, max_width: usize) -> String {
    if word.width() <= max_width {
        return word.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in word.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
