//! LaTeX math rendering via pulldown-latex → MathML

use std::convert::Infallible;

use markdown_weaver_escape::{escape_html, escape_html_body_text};
use pulldown_latex::config::{DisplayMode, RenderConfig};
use pulldown_latex::event::{Content, Event};
use pulldown_latex::mathml::push_mathml;
use pulldown_latex::{Parser, Storage};

/// Result of attempting to render LaTeX math
pub enum MathResult {
    /// Successfully rendered MathML
    Success(String),
    /// Rendering failed - contains fallback HTML with source and error message
    Error { html: String, message: String },
}

impl MathResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MathResult::Success(_))
    }
}

/// What to emit in place of a math span that failed to typeset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MathFallback {
    /// Keep the delimited source text as it was written.
    #[default]
    Source,
    /// Emit a `math-error` span with the source and the error message.
    Annotated,
}

/// Typeset LaTeX to MathML wrapped in a `math` span.
///
/// `latex` comes without its delimiters. Text copied from the source into
/// the MathML (`\text{}`, operator names, `<` and friends) is escaped, so the
/// result is safe to insert into a page. The first parse error aborts.
pub fn typeset(latex: &str, display_mode: bool) -> MathResult {
    let storage = Storage::new();
    let events = match Parser::new(latex, &storage).collect::<Result<Vec<_>, _>>() {
        Ok(events) => events,
        Err(e) => return failure(latex, e.to_string(), display_mode),
    };

    let escaped: Vec<Option<String>> = events.iter().map(escaped_text).collect();
    let events = events
        .into_iter()
        .zip(&escaped)
        .map(|(event, escaped)| match (event, escaped) {
            (Event::Content(content), Some(text)) => Ok::<_, Infallible>(Event::Content(
                with_text(content, text),
            )),
            (event, _) => Ok(event),
        });

    let config = RenderConfig {
        display_mode: if display_mode {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };
    let mut mathml = String::new();
    match push_mathml(&mut mathml, events, config) {
        Ok(()) => MathResult::Success(wrap_mathml(&escape_operators(&mathml), display_mode)),
        Err(e) => failure(latex, e.to_string(), display_mode),
    }
}

fn failure(latex: &str, message: String, display_mode: bool) -> MathResult {
    MathResult::Error {
        html: format_error_html(latex, &message, display_mode),
        message,
    }
}

/// HTML-escaped copy of a text or operator-name event, if it needs one.
fn escaped_text(event: &Event<'_>) -> Option<String> {
    match event {
        Event::Content(Content::Text(text) | Content::Function(text))
            if text.contains(['<', '>', '&']) =>
        {
            let mut out = String::with_capacity(text.len() + 8);
            let _ = escape_html_body_text(&mut out, text);
            Some(out)
        }
        _ => None,
    }
}

fn with_text<'a>(content: Content<'a>, text: &'a str) -> Content<'a> {
    match content {
        Content::Text(_) => Content::Text(text),
        Content::Function(_) => Content::Function(text),
        other => other,
    }
}

/// Escape the `<`, `>` and `&` operator characters the writer copies verbatim.
///
/// Every tag the writer emits starts with `<` followed by a letter or `/`, and
/// its attribute values never contain `>`. Entities it writes (`&nbsp;`, and
/// the ones [`escaped_text`] produced) are kept.
fn escape_operators(mathml: &str) -> String {
    let mut out = String::with_capacity(mathml.len());
    let mut in_tag = false;
    for (i, c) in mathml.char_indices() {
        let rest = &mathml[i + c.len_utf8()..];
        match c {
            '>' if in_tag => {
                in_tag = false;
                out.push(c);
            }
            _ if in_tag => out.push(c),
            '<' if rest.starts_with(|n: char| n == '/' || n.is_ascii_alphabetic()) => {
                in_tag = true;
                out.push(c);
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if is_entity(rest) => out.push(c),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_entity(rest: &str) -> bool {
    let name = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
        .unwrap_or(rest.len());
    name > 0 && rest[name..].starts_with(';')
}

fn mode_class(display_mode: bool) -> &'static str {
    if display_mode {
        "math-display"
    } else {
        "math-inline"
    }
}

fn wrap_mathml(mathml: &str, display_mode: bool) -> String {
    let mode_class = mode_class(display_mode);
    format!(r#"<span class="math {mode_class}">{mathml}</span>"#)
}

fn format_error_html(latex: &str, error: &str, display_mode: bool) -> String {
    let mode_class = mode_class(display_mode);
    let mut escaped_latex = String::new();
    let mut escaped_error = String::new();
    // These won't fail writing to String
    let _ = escape_html(&mut escaped_latex, latex);
    let _ = escape_html(&mut escaped_error, error);
    format!(
        r#"<span class="math math-error {mode_class}" title="{escaped_error}"><code>{escaped_latex}</code></span>"#
    )
}
