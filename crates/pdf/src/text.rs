//! Text preparation for the PDF builtin fonts.

/// Average glyph width as a fraction of the font size.
pub const PROPORTIONAL_WIDTH: f64 = 0.5;
pub const MONOSPACE_WIDTH: f64 = 0.6;

/// Map text onto what the builtin (WinAnsi) fonts can show.
///
/// Typographic punctuation becomes its ASCII form, other characters outside
/// Latin-1 become `?`, and emoji used as bullet decoration are dropped.
pub fn to_latin1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201F}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            '\t' => out.push_str("    "),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) <= 0xFF => out.push(c),
            // Pictographs and their joiners/selectors.
            c if (c as u32) >= 0x1F000 || matches!(c as u32, 0x200D | 0xFE0F | 0x2600..=0x27BF) => {}
            _ => out.push('?'),
        }
    }
    out
}

/// Greedy word wrap to at most `max_chars` per line. Words longer than a
/// line are split.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Hard wrap for code: indentation is kept and lines are cut at `max_chars`.
pub fn wrap_code(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = line.trim_end().chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
}

/// How many characters of a font fit in `width_pt`.
pub fn chars_per_line(width_pt: f64, font_size: f64, glyph_width: f64) -> usize {
    let per_char = font_size * glyph_width;
    if per_char <= 0.0 {
        return 1;
    }
    ((width_pt / per_char).floor() as usize).max(1)
}
