//! Text normalization shared by the analyzer, the variation generator and the scorer.

/// Upper-case, trim and collapse internal whitespace.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop dots and spaces entirely ("A.J. INSTITUTE" -> "AJINSTITUTE").
pub fn compact(s: &str) -> String {
    s.chars().filter(|c| *c != '.' && !c.is_whitespace()).collect()
}

pub fn is_stopword(token: &str) -> bool {
    matches!(
        token,
        "AND" | "THE" | "FOR" | "OF" | "IN" | "AT" | "NEAR" | "WITH" | "&"
    )
}

/// Escape `%`, `_` and the escape char itself so a value can be embedded in a
/// `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '%' || c == '_' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn like_contains(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

/// Upper-case, dots turned into spaces, whitespace collapsed: the form
/// `like_wildcarded` patterns are matched against.
pub fn separator_spaced(s: &str) -> String {
    collapse_whitespace(&s.to_uppercase().replace('.', " "))
}

/// Separator-tolerant pattern over `separator_spaced` text. Between two multi-letter
/// tokens any text may appear; next to a single letter the gap is exactly one space,
/// so "A.J." matches "A J" and "A. J." but not "Government Medical College Jammu".
pub fn like_wildcarded(value: &str) -> String {
    let tokens: Vec<&str> = value
        .split(|c: char| c == '.' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let mut out = String::from("%");
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            let loose = tokens[i - 1].chars().count() > 1 && token.chars().count() > 1;
            out.push(if loose { '%' } else { ' ' });
        }
        out.push_str(&escape_like(token));
    }
    if !out.ends_with('%') {
        out.push('%');
    }
    out
}

/// First letter of every significant word: "All India Institute of Medical Sciences"
/// -> "AIIMS", "A.J. Institute" -> "AJI".
pub fn initials(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .filter(|w| !is_stopword(w))
        .filter_map(|w| w.chars().next())
        .collect()
}

/// Letters a name's initials must start with, for 3 to 8 letter alphabetic variants.
/// Two letters are too ambiguous to match on initials alone.
pub fn initials_needle(value: &str) -> Option<String> {
    let letters = compact(value).to_uppercase();
    let len = letters.chars().count();
    if !(3..=8).contains(&len) || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(letters)
}
