//! Label text helpers
//! Greek/subscript shortcuts, XML and LaTeX escaping, compact number formatting

use std::fmt::Write as _;


const GREEK_LETTER_NAMES: [&str; 24] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega",
];

/// Code point for the i-th Greek letter; skips the final-sigma slot after Rho
fn greek_letter(index: usize, upper: bool) -> Option<char> {
    let base: u32 = if upper { 0x391 } else { 0x3B1 };
    let skip = u32::from(index > 16);
    char::from_u32(base + index as u32 + skip)
}

fn match_greek_name(rest: &str) -> Option<(usize, char)> {
    GREEK_LETTER_NAMES.iter().enumerate().find_map(|(i, name)| {
        if rest.starts_with(name) {
            return greek_letter(i, true).map(|c| (name.len(), c));
        }
        let lower = name.to_ascii_lowercase();
        if rest.starts_with(&lower) {
            return greek_letter(i, false).map(|c| (lower.len(), c));
        }
        None
    })
}

/// Rewrite `\alpha`..`\omega`, `\Alpha`..`\Omega` and `_<digit>` to Unicode.
///
/// Names match case-sensitively; anything else passes through untouched, so the
/// transform is a no-op on its own output.
pub fn convert_latex_shortcuts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => {
                if let Some((len, letter)) = match_greek_name(&rest[1..]) {
                    out.push(letter);
                    rest = &rest[1 + len..];
                    continue;
                }
            }
            '_' => {
                if let Some(digit) = rest[1..].chars().next().and_then(|d| d.to_digit(10)) {
                    if let Some(sub) = char::from_u32(0x2080 + digit) {
                        out.push(sub);
                        rest = &rest[2..];
                        continue;
                    }
                }
            }
            _ => {}
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Escape text for SVG; characters outside printable ASCII become numeric references
pub fn text_to_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            ' '..='~' => out.push(c),
            _ => {
                let _ = write!(out, "&#{};", c as u32);
            }
        }
    }
    out
}

/// Characters that must be backslash-escaped inside TikZ math mode
const LATEX_SPECIALS: [char; 4] = ['%', '#', '&', '$'];

/// Label source as TikZ math-mode content.
///
/// Spaces survive as `\mbox{ }`, `%#&$` and unpaired braces are escaped, and
/// `\name` commands and already-escaped characters pass through.
pub fn text_to_latex(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let paired = paired_braces(&chars);
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => out.push_str("\\mbox{ }"),
            '\\' => match chars.get(i + 1) {
                Some(&next) if next.is_ascii_alphabetic() => out.push('\\'),
                Some(&next) if is_escaped_pair(next) => {
                    out.push('\\');
                    out.push(next);
                    i += 1;
                }
                _ => out.push_str("\\backslash{}"),
            },
            '{' | '}' if !paired[i] => {
                out.push('\\');
                out.push(c);
            }
            c if LATEX_SPECIALS.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
        i += 1;
    }

    out
}

fn is_escaped_pair(c: char) -> bool {
    LATEX_SPECIALS.contains(&c) || matches!(c, '{' | '}' | '_' | '\\')
}

/// Marks braces that close (or are closed by) a partner; escaped braces never pair
fn paired_braces(chars: &[char]) -> Vec<bool> {
    let mut paired = vec![false; chars.len()];
    let mut open = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' => open.push(i),
            '}' => {
                if let Some(start) = open.pop() {
                    paired[start] = true;
                    paired[i] = true;
                }
            }
            _ => {}
        }
        i += 1;
    }
    paired
}

/// True when the label has something besides spaces worth emitting
pub fn has_visible_text(text: &str) -> bool {
    text.chars().any(|c| c != ' ')
}

/// Fixed-point formatting with trailing zeros (and a trailing dot) removed
pub fn fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.*}", digits, value);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}
