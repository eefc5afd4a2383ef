//! WinAnsi text encoding for content-stream string literals.

/// Accented Latin characters rendered with their WinAnsi code.
const ACCENTED: &[(char, u8)] = &[
    ('é', 0o351),
    ('è', 0o350),
    ('ê', 0o352),
    ('ë', 0o353),
    ('à', 0o340),
    ('â', 0o342),
    ('ä', 0o344),
    ('ù', 0o371),
    ('û', 0o373),
    ('ü', 0o374),
    ('ô', 0o364),
    ('ö', 0o366),
    ('î', 0o356),
    ('ï', 0o357),
    ('ç', 0o347),
    ('æ', 0o346),
    ('€', 0o200),
    ('°', 0o260),
    ('²', 0o262),
    ('³', 0o263),
    ('É', 0o311),
    ('È', 0o310),
    ('Ê', 0o312),
    ('À', 0o300),
    ('Ç', 0o307),
    ('Ô', 0o324),
    ('Ù', 0o331),
    ('Û', 0o333),
    ('Î', 0o316),
    ('Ï', 0o317),
];

/// Characters of WinAnsi codes 0x80..=0x9F. `None` for unassigned codes.
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('€'),
    None,
    Some('‚'),
    Some('ƒ'),
    Some('„'),
    Some('…'),
    Some('†'),
    Some('‡'),
    Some('ˆ'),
    Some('‰'),
    Some('Š'),
    Some('‹'),
    Some('Œ'),
    None,
    Some('Ž'),
    None,
    None,
    Some('‘'),
    Some('’'),
    Some('“'),
    Some('”'),
    Some('•'),
    Some('–'),
    Some('—'),
    Some('˜'),
    Some('™'),
    Some('š'),
    Some('›'),
    Some('œ'),
    None,
    Some('ž'),
    Some('Ÿ'),
];

/// One rendered unit of input text.
enum Glyph {
    /// Printable ASCII, written as is.
    Ascii(u8),
    /// A control or delimiter written with a backslash escape.
    Escaped(&'static str, char),
    /// A WinAnsi byte above 0x7F, written as an octal escape.
    High(u8, char),
    /// Expansion of a character WinAnsi cannot express.
    Expanded(&'static str),
    /// Placeholder for anything else.
    Unmapped,
}

fn classify(c: char) -> Glyph {
    match c {
        '(' => Glyph::Escaped("\\(", c),
        ')' => Glyph::Escaped("\\)", c),
        '\\' => Glyph::Escaped("\\\\", c),
        '\n' => Glyph::Escaped("\\n", c),
        '\r' => Glyph::Escaped("\\r", c),
        '\t' => Glyph::Escaped("\\t", c),
        'œ' => Glyph::Expanded("oe"),
        ' '..='~' => Glyph::Ascii(c as u8),
        _ => match ACCENTED.iter().find(|(ch, _)| *ch == c) {
            Some(&(ch, code)) => Glyph::High(code, ch),
            None => Glyph::Unmapped,
        },
    }
}

/// Encode `text` as the body of a PDF string literal (without parentheses).
///
/// Lossy: characters outside the supported table become `?`.
pub fn encode_win_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match classify(c) {
            Glyph::Ascii(b) => out.push(char::from(b)),
            Glyph::Escaped(esc, _) => out.push_str(esc),
            Glyph::High(code, _) => out.push_str(&format!("\\{code:03o}")),
            Glyph::Expanded(s) => out.push_str(s),
            Glyph::Unmapped => out.push('?'),
        }
    }
    out
}

/// The characters a viewer will actually draw for `text`, for measuring.
pub fn displayed(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match classify(c) {
            Glyph::Ascii(b) => out.push(char::from(b)),
            Glyph::Escaped(_, ch) | Glyph::High(_, ch) => out.push(ch),
            Glyph::Expanded(s) => out.push_str(s),
            Glyph::Unmapped => out.push('?'),
        }
    }
    out
}

/// The Unicode character behind a WinAnsi code, used to build `/Widths`.
/// Unassigned codes map to the C1 control of the same value.
pub fn win_ansi_char(code: u8) -> char {
    match code {
        0x80..=0x9F => WIN_ANSI_HIGH[usize::from(code - 0x80)].unwrap_or(char::from(code)),
        _ => char::from(code),
    }
}
