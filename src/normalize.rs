//! Syntactic normalization. Every formula is run through [`normalize`]
//! before it is parsed for storage or proof, so the KB and proof cache
//! only ever see canonical text.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BARE_IDENTIFIER: Regex = Regex::new(r"^[A-ZÄÖÜ][A-Za-z0-9ÄÖÜäöüß]*\.$").unwrap();
    static ref HYPHENATED_IDENT: Regex =
        Regex::new(r"[A-Za-zÄÖÜäöüß0-9]+(?:-[A-Za-zÄÖÜäöüß0-9]+)+").unwrap();
}

/// Driver-extensible synonym table: surface predicate spellings mapped
/// to their canonical name. Seeded empty; `normalize_with_synonyms` is
/// the entry point drivers use to supply their own table.
pub type SynonymTable = HashMap<String, String>;

/// Normalizes `input` using an empty synonym table.
pub fn normalize(input: &str) -> String {
    normalize_with_synonyms(input, &SynonymTable::new())
}

/// Runs the full normalization pipeline. Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize_with_synonyms(input: &str, synonyms: &SynonymTable) -> String {
    let before = input.to_string();

    // 1. Strip trailing whitespace; ensure a terminal period.
    let mut s = input.trim().to_string();
    if !s.ends_with('.') {
        s.push('.');
    }

    // 2. Map legacy tokens to canonical operators.
    s = s.replace(":-", "→").replace('~', "¬");

    // 3. Collapse double-negation prefixes pairwise.
    s = collapse_double_negation(&s);

    // 4. Remove hyphens inside identifier-like tokens.
    s = HYPHENATED_IDENT
        .replace_all(&s, |caps: &regex::Captures| caps[0].replace('-', ""))
        .into_owned();

    // 5. Apply the synonym table to predicate-name occurrences.
    for (surface, canonical) in synonyms {
        s = replace_predicate_name(&s, surface, canonical);
    }

    // 6. A bare capitalized identifier becomes a nullary predicate.
    if BARE_IDENTIFIER.is_match(&s) {
        let name = &s[..s.len() - 1];
        s = format!("{name}().");
    }

    if s != before {
        log::debug!("normalized formula: {before:?} -> {s:?}");
    }
    s
}

fn collapse_double_negation(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '¬' && chars.peek() == Some(&'¬') {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

fn replace_predicate_name(s: &str, surface: &str, canonical: &str) -> String {
    // Only replace when `surface` is followed by `(` (a predicate
    // application), so substring collisions with constants are avoided.
    let pattern = format!(r"\b{}(\()", regex::escape(surface));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(s, format!("{canonical}$1")).into_owned(),
        Err(_) => s.to_string(),
    }
}
