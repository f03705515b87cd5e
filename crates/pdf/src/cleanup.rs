use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Normalise the text of one extracted run.
///
/// NFC composition, ligature expansion, and removal of replacement and
/// control characters. Whitespace is kept as-is: span spacing is meaningful
/// downstream.
pub fn clean_span_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expanded)) => out.push_str(expanded),
            None if c == '\u{FFFD}' => {}
            None if c.is_control() && c != '\t' => {}
            None => out.push(c),
        }
    }
    out
}
