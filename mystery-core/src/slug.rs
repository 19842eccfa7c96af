//! Persona slug normalization.
//!
//! Slugs are the stable identifiers personas are addressed by (`elena`,
//! `tom`, `franz`). They are lowercase ASCII, with German umlauts and other
//! Latin diacritics folded:
//!
//! | input | folded |
//! |---|---|
//! | `ä` `ö` `ü` | `a` `o` `u` |
//! | `ß` | `ss` |
//! | `æ` `œ` | `ae` `oe` |
//! | `à á â ã å ā` … | `a` |
//! | `ç č ć` | `c` |
//! | `ø ō ó ò ô õ` | `o` |
//! | `ł` | `l` |
//!
//! Anything else outside `[a-z0-9_-]` is dropped; whitespace and common
//! separators become `-`.

/// Fold one lowercase character to its ASCII spelling.
///
/// Returns `None` for characters that have no ASCII spelling.
pub fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'ä' | 'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ö' | 'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' | 'ő' => "o",
        'ü' | 'ù' | 'ú' | 'û' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ç' | 'ć' | 'č' | 'ĉ' => "c",
        'ñ' | 'ń' | 'ň' => "n",
        'ś' | 'š' | 'ş' => "s",
        'ź' | 'ż' | 'ž' => "z",
        'ý' | 'ÿ' => "y",
        'ď' | 'đ' | 'ð' => "d",
        'ğ' => "g",
        'ł' | 'ľ' | 'ĺ' => "l",
        'ř' | 'ŕ' => "r",
        'ť' | 'ţ' => "t",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        _ => return None,
    };
    Some(folded)
}

/// Normalize free text (usually a name) into a slug.
///
/// ```
/// use mystery_core::slug::normalize_slug;
/// assert_eq!(normalize_slug("Jürgen Groß"), "jurgen-gross");
/// assert_eq!(normalize_slug("  Zoë "), "zoe");
/// ```
pub fn normalize_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            slug.push(c);
        } else if c == '-' || c.is_whitespace() || matches!(c, '.' | '/' | '\'' | '’') {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if let Some(folded) = fold_char(c) {
            slug.push_str(folded);
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// The conventional slug for a persona: the folded first name.
pub fn persona_slug_for(name: &str) -> String {
    let first = name
        .split_whitespace()
        .find(|part| !is_honorific(part))
        .unwrap_or(name);
    normalize_slug(first)
}

pub(crate) fn is_honorific(part: &str) -> bool {
    matches!(
        part.trim_end_matches('.').to_lowercase().as_str(),
        "dr" | "prof" | "mr" | "mrs" | "ms" | "herr" | "frau" | "sir" | "dame"
    )
}

/// Why a slug is not acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugProblem {
    Empty,
    InvalidCharacter(char),
}

impl std::fmt::Display for SlugProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlugProblem::Empty => write!(f, "slug is empty"),
            SlugProblem::InvalidCharacter(c) => {
                write!(f, "character {c:?} is outside [a-z0-9_-]")
            }
        }
    }
}

/// Check a slug's format.
pub fn check_slug(slug: &str) -> Result<(), SlugProblem> {
    if slug.is_empty() {
        return Err(SlugProblem::Empty);
    }
    match slug
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-'))
    {
        Some(c) => Err(SlugProblem::InvalidCharacter(c)),
        None => Ok(()),
    }
}

/// Whether `slug` is non-empty and only contains `[a-z0-9_-]`.
pub fn is_valid_slug(slug: &str) -> bool {
    check_slug(slug).is_ok()
}
