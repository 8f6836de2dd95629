//! Text with embedded LaTeX, rendered to HTML.
//!
//! [`render_math`] works on plain text and yields fragments, so literal text
//! can be escaped by whoever inserts it. [`render_markdown_and_math`] renders
//! markdown first and then typesets the math spans found in the resulting
//! HTML.

use markdown_weaver::{Parser, html};
use markdown_weaver_escape::escape_html_body_text;

use crate::math::{self, MathFallback, MathResult};
use crate::spans::{self, MathSpan};

/// A piece of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a> {
    /// Text copied from the input. Not HTML-safe.
    Text(&'a str),
    /// Typeset math, ready to insert as HTML.
    Math {
        html: String,
        /// The delimited span this was rendered from
        source: &'a str,
        display: bool,
    },
}

impl Fragment<'_> {
    /// Append this fragment as HTML, escaping literal text.
    pub fn push_html(&self, out: &mut String) {
        match self {
            // Writing to a String can't fail
            Fragment::Text(text) => {
                let _ = escape_html_body_text(out, text);
            }
            Fragment::Math { html, .. } => out.push_str(html),
        }
    }

    /// The input text this fragment covers.
    pub fn source(&self) -> &str {
        match self {
            Fragment::Text(text) => text,
            Fragment::Math { source, .. } => source,
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self, Fragment::Math { .. })
    }
}

/// Lazily typesets the math spans of a text, one fragment at a time.
///
/// Returned by [`render_math`].
pub struct MathFragments<'a> {
    text: &'a str,
    matches: regex::Matches<'static, 'a>,
    /// End of the last emitted fragment
    last: usize,
    pending: Option<regex::Match<'a>>,
    fallback: MathFallback,
}

impl<'a> MathFragments<'a> {
    fn new(text: &'a str, fallback: MathFallback) -> Self {
        Self {
            text,
            matches: spans::find_iter(text),
            last: 0,
            pending: None,
            fallback,
        }
    }

    fn emit_span(&mut self, m: regex::Match<'a>) -> Fragment<'a> {
        self.last = m.end();
        let span = spans::span_of(m);
        match typeset_span(&span, span.expr, self.fallback) {
            Some(html) => Fragment::Math {
                html,
                source: span.source,
                display: span.is_display(),
            },
            None => Fragment::Text(span.source),
        }
    }
}

impl<'a> Iterator for MathFragments<'a> {
    type Item = Fragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(m) = self.pending.take() {
            return Some(self.emit_span(m));
        }
        match self.matches.next() {
            Some(m) if m.start() > self.last => {
                let text = &self.text[self.last..m.start()];
                self.last = m.start();
                self.pending = Some(m);
                Some(Fragment::Text(text))
            }
            Some(m) => Some(self.emit_span(m)),
            None if self.last < self.text.len() => {
                let rest = &self.text[self.last..];
                self.last = self.text.len();
                Some(Fragment::Text(rest))
            }
            None => None,
        }
    }
}

impl std::iter::FusedIterator for MathFragments<'_> {}

/// Typeset a span's expression, or `None` when the span should stay literal.
///
/// `expr` is passed separately so callers can decode it first.
fn typeset_span(span: &MathSpan<'_>, expr: &str, fallback: MathFallback) -> Option<String> {
    if expr.trim().is_empty() {
        return None;
    }
    match math::typeset(expr, span.is_display()) {
        MathResult::Success(html) => Some(html),
        MathResult::Error { html, message } => {
            tracing::debug!(source = span.source, %message, "math span failed to typeset");
            match fallback {
                MathFallback::Source => None,
                MathFallback::Annotated => Some(html),
            }
        }
    }
}

/// Split `text` into literal and typeset-math fragments.
///
/// The fragments' [`Fragment::source`]s concatenate back to `text`, so empty
/// input yields no fragments and text without delimiters a single one. Spans
/// that fail to typeset come back as [`Fragment::Text`] holding the delimited
/// source.
pub fn render_math(text: &str) -> MathFragments<'_> {
    render_math_with(text, MathFallback::default())
}

pub fn render_math_with(text: &str, fallback: MathFallback) -> MathFragments<'_> {
    MathFragments::new(text, fallback)
}

/// [`render_math`] collected into HTML, with literal text escaped.
pub fn render_math_html(text: &str) -> String {
    render_math_html_with(text, MathFallback::default())
}

pub fn render_math_html_with(text: &str, fallback: MathFallback) -> String {
    let mut out = String::with_capacity(text.len());
    for fragment in render_math_with(text, fallback) {
        fragment.push_html(&mut out);
    }
    out
}

pub fn default_md_options() -> markdown_weaver::Options {
    markdown_weaver::Options::ENABLE_FOOTNOTES
        | markdown_weaver::Options::ENABLE_TABLES
        | markdown_weaver::Options::ENABLE_GFM
        | markdown_weaver::Options::ENABLE_STRIKETHROUGH
}

/// Render markdown to HTML, then typeset the math spans in that HTML.
///
/// Every `**` is removed before the markdown pass, so bold markers never
/// become `<strong>`. Dollar math is left alone by the markdown parser and
/// picked up from the HTML afterwards; the HTML entities the writer produces
/// are decoded before typesetting.
pub fn render_markdown_and_math(text: &str) -> String {
    render_markdown_and_math_with(text, MathFallback::default())
}

pub fn render_markdown_and_math_with(text: &str, fallback: MathFallback) -> String {
    if text.is_empty() {
        return String::new();
    }
    let source = text.replace("**", "");
    let mut markup = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut markup, Parser::new_ext(&source, default_md_options()));

    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    for span in spans::math_spans(&markup) {
        let range = span.range();
        out.push_str(&markup[last..range.start]);
        let expr = decode_entities(span.expr);
        match typeset_span(&span, &expr, fallback) {
            Some(math) => out.push_str(&math),
            None => out.push_str(span.source),
        }
        last = range.end;
    }
    out.push_str(&markup[last..]);
    out
}

/// Undo the entity escaping the HTML writer applies to text. The typeset
/// result is escaped again by [`math::typeset`].
fn decode_entities(s: &str) -> std::borrow::Cow<'_, str> {
    if !s.contains('&') {
        return std::borrow::Cow::Borrowed(s);
    }
    std::borrow::Cow::Owned(
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources<'a>(fragments: &[Fragment<'a>]) -> String {
        fragments.iter().map(Fragment::source).collect()
    }

    #[test]
    fn text_without_delimiters_is_one_fragment() {
        let text = "A survey of sparse autoencoders";
        let fragments: Vec<_> = render_math(text).collect();
        assert_eq!(fragments, vec![Fragment::Text(text)]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert_eq!(render_math("").count(), 0);
        assert_eq!(render_math_html(""), "");
        assert_eq!(render_markdown_and_math(""), "");
    }

    #[test]
    fn inline_math_is_surrounded_by_text() {
        let text = "scales as $x^2$ overall";
        let fragments: Vec<_> = render_math(text).collect();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], Fragment::Text("scales as "));
        assert!(fragments[1].is_math());
        assert_eq!(fragments[1].source(), "$x^2$");
        assert_eq!(fragments[2], Fragment::Text(" overall"));
        assert_eq!(sources(&fragments), text);
    }

    #[test]
    fn adjacent_spans_have_no_empty_text_between() {
        let fragments: Vec<_> = render_math("$a$$$b$$").collect();
        assert_eq!(fragments.len(), 2);
        assert!(fragments.iter().all(Fragment::is_math));
        match &fragments[1] {
            Fragment::Math { display, .. } => assert!(*display),
            other => panic!("expected math, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_dollar_stays_verbatim() {
        let text = "price: $5 only";
        let fragments: Vec<_> = render_math(text).collect();
        assert_eq!(fragments, vec![Fragment::Text(text)]);
    }

    #[test]
    fn failed_math_keeps_delimited_source() {
        let text = r"see $\frac{a$ here";
        let fragments: Vec<_> = render_math(text).collect();
        assert_eq!(
            fragments,
            vec![
                Fragment::Text("see "),
                Fragment::Text(r"$\frac{a$"),
                Fragment::Text(" here"),
            ]
        );
        assert_eq!(render_math_html(text), r"see $\frac{a$ here");
    }

    #[test]
    fn annotated_fallback_marks_the_error() {
        let html = render_math_html_with(r"$\frac{a$", MathFallback::Annotated);
        assert!(html.contains("math-error"));
    }

    #[test]
    fn currency_dollars_pair_up() {
        let fragments: Vec<_> = render_math("cost is $5 and $x^2$ grows").collect();
        assert_eq!(fragments[0], Fragment::Text("cost is "));
        assert_eq!(fragments[1].source(), "$5 and $");
        assert_eq!(fragments[2], Fragment::Text("x^2$ grows"));
        assert_eq!(fragments.len(), 3);
    }

    #[test]
    fn literal_text_is_escaped_in_html() {
        let html = render_math_html("a < b & $x$");
        assert!(html.starts_with("a &lt; b &amp; "));
        assert!(html.contains("<math"));
    }

    #[test]
    fn plain_output_is_a_fixed_point() {
        let text = "Attention is all you need";
        let once = render_math_html(text);
        assert_eq!(once, text);
        assert_eq!(render_math_html(&once), once);
    }

    #[test]
    fn lone_double_dollar_is_kept() {
        assert_eq!(render_math_html("$$"), "$$");
    }

    #[test]
    fn markdown_strips_bold_markers() {
        let html = render_markdown_and_math("**bold** $x^2$");
        assert!(!html.contains("<strong>"));
        assert!(!html.contains("**"));
        assert!(html.starts_with("<p>bold "));
        assert_eq!(html.matches("<math").count(), 1);
    }

    #[test]
    fn markdown_structure_survives() {
        let html = render_markdown_and_math("1. Interpretability: $7/10$\n2. Surprisal");
        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>Interpretability: <span class=\"math math-inline\">"));
        assert!(html.contains("<li>Surprisal</li>"));
    }

    #[test]
    fn markdown_decodes_entities_before_typesetting() {
        let html = render_markdown_and_math("$a < b$");
        assert!(!html.contains('$'));
        assert!(!html.contains("math-error"));
        assert!(html.contains("<math"));
        assert!(html.contains("&lt;"));
        assert!(!html.contains("<<"));
    }

    #[test]
    fn markup_inside_math_text_is_escaped() {
        let title = r"Attack $\text{<img src=x onerror=alert(1)>}$ surface";
        let html = render_math_html(title);
        assert!(html.contains("<math"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));

        let html = render_markdown_and_math(title);
        assert!(html.contains("<math"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn comparison_in_title_is_escaped() {
        let html = render_math_html("when $a < b$ holds");
        assert!(html.starts_with("when <span class=\"math math-inline\">"));
        assert!(html.contains("&lt;"));
        assert!(!html.contains("<<"));
    }

    #[test]
    fn markdown_without_math_is_plain_html() {
        assert_eq!(
            render_markdown_and_math("just *text*"),
            "<p>just <em>text</em></p>\n"
        );
    }

    #[test]
    fn markdown_keeps_failed_math_source() {
        let html = render_markdown_and_math(r"$\frac{a$");
        assert_eq!(html, "<p>$\\frac{a$</p>\n");
    }
}
