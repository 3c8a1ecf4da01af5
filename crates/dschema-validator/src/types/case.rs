//! Word splitting for the case transforms.
//!
//! A string is split into words at case changes, digits and separators:
//! `"XMLHttpRequest2go"` splits into `XML`, `Http`, `Request2`, `go`.
//! Acronym runs end before a capitalized word; characters that are not
//! ASCII letters or digits only separate words.

fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn run_len(bytes: &[u8], start: usize, class: fn(&u8) -> bool) -> usize {
    bytes[start..].iter().take_while(|c| class(c)).count()
}

/// Length of the word starting at `i`, if one starts there.
fn word_at(bytes: &[u8], i: usize) -> Option<usize> {
    let upper = run_len(bytes, i, u8::is_ascii_uppercase);

    // An acronym, ending at a word boundary or before a capitalized word.
    if upper >= 2 {
        match bytes.get(i + upper) {
            None => return Some(upper),
            Some(c) if !is_word_char(*c) => return Some(upper),
            Some(c) if c.is_ascii_lowercase() && upper > 2 => return Some(upper - 1),
            _ => {}
        }
    }

    // An optionally capitalized lowercase word with trailing digits.
    let head = usize::from(upper >= 1);
    let lower = run_len(bytes, i + head, u8::is_ascii_lowercase);
    if lower > 0 {
        let digits = run_len(bytes, i + head + lower, u8::is_ascii_digit);
        return Some(head + lower + digits);
    }

    if upper >= 1 {
        return Some(1);
    }
    let digits = run_len(bytes, i, u8::is_ascii_digit);
    (digits > 0).then_some(digits)
}

pub(crate) fn words(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut words = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match word_at(bytes, i) {
            Some(len) => {
                words.push(&s[i..i + len]);
                i += len;
            }
            None => i += 1,
        }
    }
    words
}

fn capitalize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `"foo bar-baz"` becomes `"foo-bar-baz"`.
pub(crate) fn kebab_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// `"foo bar-baz"` becomes `"FooBarBaz"`.
pub(crate) fn camel_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// `"foo bar-baz"` becomes `"fooBarBaz"`.
pub(crate) fn little_camel_case(s: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(s).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_ascii_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}
