use crate::fonts::TextMeasure;

/// Marker appended to a word cut to fit its column.
pub const ELLIPSIS: &str = "...";

#[derive(Clone, Debug, PartialEq)]
pub struct Wrapped {
    /// Between 1 and `max_lines` lines.
    pub lines: Vec<String>,
    /// Set when content was cut: a word truncated, or lines beyond the cap dropped.
    pub overflow: bool,
}

/// Greedy word wrap of `text` into at most `max_lines` lines of `available_width_pt`.
///
/// Explicit newlines start a new paragraph. A word wider than the column gets a
/// line of its own, truncated with [`ELLIPSIS`].
pub fn wrap(
    text: &str,
    available_width_pt: f32,
    font: &dyn TextMeasure,
    font_size_pt: f32,
    max_lines: usize,
) -> Wrapped {
    let max_lines = max_lines.max(1);
    let space_w = font.text_width(" ", font_size_pt);
    let mut lines: Vec<String> = Vec::new();
    let mut overflow = false;

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in paragraph.split_whitespace() {
            let ww = font.text_width(word, font_size_pt);

            if ww > available_width_pt {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                lines.push(truncate_to_fit(word, available_width_pt, font, font_size_pt));
                overflow = true;
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_w = ww;
            } else if current_w + space_w + ww > available_width_pt {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_w = ww;
            } else {
                current.push(' ');
                current.push_str(word);
                current_w += space_w + ww;
            }
        }

        // A blank paragraph still occupies a line, except after a truncated word.
        if !current.is_empty() || paragraph.trim().is_empty() {
            lines.push(current);
        }
    }

    // Drop blank lines at the end; they only add height.
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        overflow = true;
    }

    Wrapped { lines, overflow }
}

/// Longest prefix of `word` that fits together with the ellipsis. In a column
/// too narrow for the whole ellipsis, only the dots that fit.
fn truncate_to_fit(word: &str, available_width_pt: f32, font: &dyn TextMeasure, font_size_pt: f32) -> String {
    let ellipsis_w = font.text_width(ELLIPSIS, font_size_pt);
    if ellipsis_w > available_width_pt {
        return fitting_prefix(ELLIPSIS, available_width_pt, font, font_size_pt);
    }
    let mut out = fitting_prefix(word, available_width_pt - ellipsis_w, font, font_size_pt);
    out.push_str(ELLIPSIS);
    out
}

fn fitting_prefix(text: &str, budget: f32, font: &dyn TextMeasure, font_size_pt: f32) -> String {
    let mut width = 0.0f32;
    let mut out = String::new();
    for c in text.chars() {
        let cw = font.advance_1000(c) * font_size_pt / 1000.0;
        if width + cw > budget {
            break;
        }
        width += cw;
        out.push(c);
    }
    out
}
