//! Prompt templates with a fixed placeholder set.
//!
//! A template body contains `{identifier}` tokens. The tokens a template may
//! use are fixed by a record type implementing [`Placeholders`], normally via
//! `#[derive(Placeholders)]`. Parsing rejects any token outside that set, so
//! a typo in a stored template is an error at load time instead of a
//! literal `{tyop}` in the rendered prompt.
//!
//! Braces that do not wrap an identifier (JSON examples, `{ }`) are literal
//! text. Substitution is a single pass: values are never re-scanned for
//! tokens.

use crate::render::RenderError;
use std::fmt;
use std::marker::PhantomData;

/// A record whose fields fill template placeholders.
pub trait Placeholders {
    /// Every token name, in declaration order.
    const PLACEHOLDERS: &'static [&'static str];

    /// Tokens whose value may be empty.
    const OPTIONAL: &'static [&'static str];

    /// The value for `name`, or `None` if `name` is not a placeholder.
    fn placeholder(&self, name: &str) -> Option<&str>;

    fn is_placeholder(name: &str) -> bool {
        Self::PLACEHOLDERS.contains(&name)
    }

    fn is_optional(name: &str) -> bool {
        Self::OPTIONAL.contains(&name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(&'static str),
}

/// A parsed template for records of type `P`.
pub struct PromptTemplate<P> {
    body: String,
    segments: Vec<Segment>,
    _record: PhantomData<fn(&P)>,
}

impl<P: Placeholders> PromptTemplate<P> {
    /// Parse `body`, checking every token against `P::PLACEHOLDERS`.
    pub fn parse(body: &str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = body;
        let mut offset = 0;

        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let ident_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let ident = &after[..ident_len];
            let starts_like_ident = ident
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

            if !starts_like_ident {
                text.push('{');
                offset += open + 1;
                rest = after;
                continue;
            }

            match after[ident_len..].chars().next() {
                Some('}') => {
                    let slot = P::PLACEHOLDERS
                        .iter()
                        .find(|name| **name == ident)
                        .copied()
                        .ok_or_else(|| RenderError::UnknownPlaceholder {
                            placeholder: ident.to_string(),
                            offset: offset + open,
                        })?;
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Slot(slot));
                    let consumed = open + 1 + ident_len + 1;
                    offset += consumed;
                    rest = &rest[consumed..];
                }
                None => {
                    return Err(RenderError::UnterminatedPlaceholder {
                        offset: offset + open,
                    })
                }
                Some(_) => {
                    text.push('{');
                    offset += open + 1;
                    rest = after;
                }
            }
        }

        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            body: body.to_string(),
            segments,
            _record: PhantomData,
        })
    }

    /// The unparsed template body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Tokens the template uses, in order of first appearance.
    pub fn used_placeholders(&self) -> Vec<&'static str> {
        let mut used = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(name) = segment {
                if !used.contains(name) {
                    used.push(*name);
                }
            }
        }
        used
    }

    /// Substitute every token with the record's value.
    ///
    /// A required placeholder with an empty value is a `MissingField` error.
    pub fn fill(&self, record: &P) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.body.len() * 2);
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(name) => {
                    let value = record.placeholder(name).unwrap_or_default();
                    if value.trim().is_empty() && !P::is_optional(name) {
                        return Err(RenderError::MissingField {
                            placeholder: name.to_string(),
                        });
                    }
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl<P> Clone for PromptTemplate<P> {
    fn clone(&self) -> Self {
        Self {
            body: self.body.clone(),
            segments: self.segments.clone(),
            _record: PhantomData,
        }
    }
}

impl<P> fmt::Debug for PromptTemplate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("body", &self.body)
            .finish()
    }
}
