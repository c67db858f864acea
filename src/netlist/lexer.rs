//! Line tokenizer for netlists.
//!
//! Netlists are line-oriented: each non-empty line is split on whitespace.
//! A line whose first non-blank character is `*` is a comment; `#` and `;`
//! start a comment that runs to the end of the line.

/// One non-empty netlist line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    /// Line number (1-indexed)
    pub number: usize,
    /// Whitespace-separated tokens, comments removed
    pub tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    /// The leading token, which selects the element kind or directive.
    pub fn head(&self) -> &'a str {
        self.tokens[0]
    }
}

/// Iterator over the non-empty lines of a netlist.
pub struct Lexer<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        loop {
            let (index, raw) = self.lines.next()?;
            let tokens: Vec<&str> = strip_comment(raw).split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            return Some(Line {
                number: index + 1,
                tokens,
            });
        }
    }
}

fn strip_comment(raw: &str) -> &str {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('*') {
        return "";
    }
    match trimmed.find(['#', ';']) {
        Some(pos) => &trimmed[..pos],
        None => trimmed,
    }
}

/// Parse a number string with an optional SPICE scale suffix.
///
/// Suffixes are case-insensitive: `f p n u m k meg g t`. Letters after the
/// suffix are a unit and are ignored, so `5V`, `1kOhm` and `10uF` read as
/// 5, 1000 and 1e-5. Anything else after the number, or a non-finite
/// value, is rejected.
pub fn parse_value(text: &str) -> Option<f64> {
    let lower = text.trim().to_ascii_lowercase();
    let split = numeric_prefix_len(&lower);
    if split == 0 {
        return None;
    }
    let (num_str, rest) = lower.split_at(split);

    let (multiplier, unit) = if let Some(unit) = rest.strip_prefix("meg") {
        (1e6, unit)
    } else {
        let mut chars = rest.chars();
        let mult = match chars.next() {
            Some('f') => 1e-15,
            Some('p') => 1e-12,
            Some('n') => 1e-9,
            Some('u') | Some('µ') => 1e-6,
            Some('m') => 1e-3,
            Some('k') => 1e3,
            Some('g') => 1e9,
            Some('t') => 1e12,
            _ => 1.0,
        };
        if mult != 1.0 {
            (mult, chars.as_str())
        } else {
            (1.0, rest)
        }
    };
    if !unit.chars().all(char::is_alphabetic) {
        return None;
    }

    num_str
        .parse::<f64>()
        .ok()
        .map(|v| v * multiplier)
        .filter(|v| v.is_finite())
}

/// Length of the leading `[sign] digits [. digits] [e [sign] digits]` run.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let mantissa_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    let mantissa = &text[mantissa_start..i];
    if mantissa.is_empty() || mantissa == "." {
        return 0;
    }

    // Exponent only when digits follow, so `1e` keeps `e` as a unit letter
    if i < bytes.len() && bytes[i] == b'e' {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        if bytes.get(j).map_or(false, u8::is_ascii_digit) {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Option<f64>, b: Option<f64>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => (x - y).abs() < x.abs() * 1e-10 + 1e-30,
            (None, None) => true,
            _ => false,
        }
    }

    #[test]
    fn test_parse_value() {
        assert!(approx_eq(parse_value("10k"), Some(10_000.0)));
        assert!(approx_eq(parse_value("100n"), Some(100e-9)));
        assert!(approx_eq(parse_value("4.7u"), Some(4.7e-6)));
        assert!(approx_eq(parse_value("1MEG"), Some(1_000_000.0)));
        assert!(approx_eq(parse_value("2m"), Some(2e-3)));
        assert!(approx_eq(parse_value("2M"), Some(2e-3)));
        assert!(approx_eq(parse_value("2.2"), Some(2.2)));
        assert!(approx_eq(parse_value("-5"), Some(-5.0)));
        assert!(approx_eq(parse_value("1e-9"), Some(1e-9)));
        assert!(approx_eq(parse_value("3f"), Some(3e-15)));
    }

    #[test]
    fn test_parse_value_ignores_trailing_unit() {
        assert!(approx_eq(parse_value("5V"), Some(5.0)));
        assert!(approx_eq(parse_value("1kOhm"), Some(1_000.0)));
        assert!(approx_eq(parse_value("10uF"), Some(10e-6)));
        assert!(approx_eq(parse_value("2megohm"), Some(2e6)));
        assert!(approx_eq(parse_value("1e3Hz"), Some(1e3)));
        assert!(approx_eq(parse_value(".5"), Some(0.5)));
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value("1.2.3"), None);
        assert_eq!(parse_value("1x2"), None);
        assert_eq!(parse_value("-"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("NaN"), None);
    }

    #[test]
    fn test_lexer_skips_comments_and_blanks() {
        let input = "* title comment\n\nR1 in out 10k\n   \n  * indented comment\nV1 in GND 5 # trailing\n";
        let lines: Vec<_> = Lexer::new(input).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 3);
        assert_eq!(lines[0].tokens, vec!["R1", "in", "out", "10k"]);
        assert_eq!(lines[1].number, 6);
        assert_eq!(lines[1].tokens, vec!["V1", "in", "GND", "5"]);
    }

    #[test]
    fn test_lexer_semicolon_comment() {
        let input = "R1 a b 1k ; inline comment style";
        let line = Lexer::new(input).next().unwrap();
        assert_eq!(line.head(), "R1");
        assert_eq!(line.tokens.len(), 4);
    }
}
