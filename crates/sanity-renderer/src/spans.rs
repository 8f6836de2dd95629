//! Locating math spans in text.
//!
//! Four delimiter pairs are recognised, tried in this order at every
//! position: `$$…$$`, `$…$`, `\(…\)`, `\[…\]`. The first alternative that
//! matches wins, matches never overlap, and every span closes at the first
//! matching closing delimiter. An inline `$…$` span cannot contain a `$`.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

pub static MATH_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$[\s\S]*?\$\$|\$[^$]*?\$|\\\([\s\S]*?\\\)|\\\[[\s\S]*?\\\]").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `$$…$$`
    DoubleDollar,
    /// `$…$`
    Dollar,
    /// `\(…\)`
    Paren,
    /// `\[…\]`
    Bracket,
}

impl Delimiter {
    /// Classify a matched span by its opening delimiter.
    ///
    /// `$$` on its own is an empty inline span, not an unterminated display one.
    fn of(span: &str) -> Self {
        if span.starts_with("$$") && span.len() >= 4 {
            Delimiter::DoubleDollar
        } else if span.starts_with('$') {
            Delimiter::Dollar
        } else if span.starts_with(r"\(") {
            Delimiter::Paren
        } else {
            Delimiter::Bracket
        }
    }

    pub fn is_display(self) -> bool {
        matches!(self, Delimiter::DoubleDollar | Delimiter::Bracket)
    }

    /// Byte length of the opening (and closing) delimiter.
    pub fn width(self) -> usize {
        match self {
            Delimiter::Dollar => 1,
            Delimiter::DoubleDollar | Delimiter::Paren | Delimiter::Bracket => 2,
        }
    }
}

/// One delimited math expression found in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathSpan<'a> {
    /// Span including delimiters, as it appears in the text
    pub source: &'a str,
    /// Expression between the delimiters
    pub expr: &'a str,
    pub delimiter: Delimiter,
    start: usize,
}

impl<'a> MathSpan<'a> {
    fn from_match(m: regex::Match<'a>) -> Self {
        let source = m.as_str();
        let delimiter = Delimiter::of(source);
        let width = delimiter.width();
        Self {
            source,
            expr: &source[width..source.len() - width],
            delimiter,
            start: m.start(),
        }
    }

    pub fn is_display(&self) -> bool {
        self.delimiter.is_display()
    }

    /// Byte range of the whole span in the scanned text.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.source.len()
    }
}

/// Iterate over the math spans of `text`, left to right.
pub fn math_spans(text: &str) -> impl Iterator<Item = MathSpan<'_>> {
    MATH_SPAN_RE.find_iter(text).map(MathSpan::from_match)
}

pub(crate) fn find_iter(text: &str) -> regex::Matches<'static, '_> {
    MATH_SPAN_RE.find_iter(text)
}

pub(crate) fn span_of(m: regex::Match<'_>) -> MathSpan<'_> {
    MathSpan::from_match(m)
}
