//! HTML for the paper list and the tag list.
//!
//! Every piece of literal data is escaped on the way out; only typeset math
//! and rendered markdown are inserted as-is.

use markdown_weaver_escape::{escape_href, escape_html, escape_html_body_text};
use sanity_common::{PageData, Paper, PaperScore, TagCount};
use url::form_urlencoded::byte_serialize;

use crate::hybrid::{render_markdown_and_math, render_math_html};

/// Who the page is rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewContext<'a> {
    /// Logged-in user; tag controls are only shown when set.
    pub user: Option<&'a str>,
    /// Whether there are classifier words to inspect.
    pub inspect_available: bool,
}

impl<'a> ViewContext<'a> {
    pub fn from_page(data: &'a PageData) -> Self {
        Self {
            user: data.user.as_deref(),
            inspect_available: !data.words.is_empty(),
        }
    }

    pub fn logged_in(&self) -> bool {
        self.user.is_some()
    }
}

// Escaping into a String can't fail, so the results below are ignored.

fn text(out: &mut String, s: &str) {
    let _ = escape_html_body_text(&mut *out, s);
}

fn attr(out: &mut String, s: &str) {
    let _ = escape_html(&mut *out, s);
}

fn href(out: &mut String, s: &str) {
    let _ = escape_href(&mut *out, s);
}

fn query_component(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}

/// `/?rank=tags&tags=<tag>`
pub fn tag_url(tag: &str) -> String {
    format!("/?rank=tags&tags={}", query_component(tag))
}

/// `/?q=<author>`
pub fn author_url(author: &str) -> String {
    format!("/?q={}", query_component(author))
}

fn push_link(out: &mut String, url: &str, class: Option<&str>, new_tab: bool) {
    out.push_str("<a href=\"");
    href(out, url);
    out.push('"');
    if let Some(class) = class {
        out.push_str(" class=\"");
        attr(out, class);
        out.push('"');
    }
    if new_tab {
        out.push_str(" target=\"_blank\"");
    }
    out.push('>');
}

fn push_utag(out: &mut String, tag: &str) {
    out.push_str("<div class=\"rel_utag\">");
    push_link(out, &tag_url(tag), None, false);
    text(out, tag);
    out.push_str("</a></div>");
}

fn push_authors(out: &mut String, paper: &Paper) {
    out.push_str("<div class=\"rel_authors\">");
    for (i, author) in paper.author_names().enumerate() {
        out.push_str("<span>");
        if i > 0 {
            out.push_str(", ");
        }
        push_link(out, &author_url(author), Some("author_link"), false);
        text(out, author);
        out.push_str("</a></span>");
    }
    out.push_str("</div>");
}

fn push_score_span(out: &mut String, title: &str, body: &str) {
    out.push_str("<span class=\"rel_score_span\" title=\"");
    attr(out, title);
    out.push_str("\">");
    text(out, body);
    out.push_str("</span>");
}

fn push_scores(out: &mut String, time: &str, score: Option<&PaperScore>) {
    out.push_str("<div class=\"rel_scores\"><div>");
    push_score_span(out, "Publication Date", &format!("📅 {time}"));
    if let Some(score) = score {
        out.push_str("<span>");
        if score.is_notable() {
            push_score_span(out, "From Notable Author", "⭐");
        }
        push_score_span(
            out,
            "Interpretability Score",
            &format!("🔍 {}/10", score.interpretability),
        );
        push_score_span(
            out,
            "Understanding Score",
            &format!("💡 {}/10", score.understanding),
        );
        push_score_span(out, "Surprisal Score", &format!("✨ {}/10", score.surprisal));
        out.push_str("</span>");
    }
    out.push_str("</div></div>");
}

fn push_tag_controls(out: &mut String, paper: &Paper) {
    out.push_str("<div class=\"rel_utags\">");
    for (class, label) in [("rel_utag_add", "+"), ("rel_utag_sub", "-")] {
        out.push_str("<div class=\"rel_utag ");
        out.push_str(class);
        out.push_str("\" data-pid=\"");
        attr(out, &paper.id);
        out.push_str("\">");
        out.push_str(label);
        out.push_str("</div>");
    }
    for tag in &paper.utags {
        push_utag(out, tag);
    }
    out.push_str("</div>");
}

fn push_more_links(out: &mut String, id: &str) {
    out.push_str("<div class=\"rel_more\">");
    let links = [
        (format!("/?rank=pid&pid={}", query_component(id)), "similar", false),
        (
            format!("https://scholar.google.com/scholar?q=arXiv:{id}"),
            "scholar",
            true,
        ),
        (format!("https://arxiv.org/abs/{id}"), "arxiv", true),
    ];
    for (i, (url, label, new_tab)) in links.iter().enumerate() {
        if i > 0 {
            out.push_str("<span class=\"rel_more_separator\">·</span>");
        }
        push_link(out, url, None, *new_tab);
        out.push_str(label);
        out.push_str("</a>");
    }
    out.push_str("</div>");
}

/// Two decimals, rounding exact halves away from zero like JS `toFixed(2)`.
///
/// `{:.2}` rounds them to even instead. An f64 lies exactly halfway between
/// two hundredths only when it is an odd multiple of 1/8, and such values
/// survive the scaling by 100 exactly.
fn fixed2(x: f64) -> String {
    let eighths = x * 8.0;
    let x = if x == 0.0 {
        0.0
    } else if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        (x * 100.0).round() / 100.0
    } else {
        x
    };
    format!("{x:.2}")
}

/// One paper block.
pub fn render_paper(out: &mut String, paper: &Paper, ctx: &ViewContext<'_>) {
    out.push_str("<div class=\"rel_paper\">");

    out.push_str("<div class=\"rel_score\">");
    out.push_str(&fixed2(paper.weight));
    out.push_str("</div>");

    out.push_str("<div class=\"rel_title\">");
    push_link(
        out,
        &format!("https://www.alphaxiv.org/pdf/{}", paper.id),
        None,
        true,
    );
    out.push_str(&render_math_html(&paper.title));
    out.push_str("</a></div>");

    push_authors(out, paper);
    push_scores(out, &paper.time, paper.score.as_ref());

    if ctx.logged_in() {
        push_tag_controls(out, paper);
    }

    if !paper.thumb_url.is_empty() {
        out.push_str("<div class=\"rel_img\"><img src=\"");
        href(out, &paper.thumb_url);
        out.push_str("\" /></div>");
    }

    out.push_str("<div class=\"rel_abs\">");
    out.push_str(&render_math_html(&paper.summary));
    out.push_str("</div>");

    out.push_str("<div class=\"rel_scores\">");
    if let Some(result) = paper.scoring_result.as_deref().filter(|r| !r.is_empty()) {
        out.push_str("<div class=\"scoring_result\"><div>");
        out.push_str(&render_markdown_and_math(result));
        out.push_str("</div></div>");
    }
    out.push_str("</div>");

    push_more_links(out, &paper.id);
    out.push_str("</div>");
}

pub fn render_paper_list(papers: &[Paper], ctx: &ViewContext<'_>) -> String {
    let mut out = String::from("<div><div id=\"paperList\" class=\"rel_papers\">");
    for paper in papers {
        render_paper(&mut out, paper, ctx);
    }
    out.push_str("</div></div>");
    tracing::debug!(papers = papers.len(), bytes = out.len(), "rendered paper list");
    out
}

/// One tag chip with its paper count.
pub fn render_tag(out: &mut String, tag: &TagCount) {
    out.push_str(if tag.is_all() {
        "<div class=\"rel_utag rel_utag_all\">"
    } else {
        "<div class=\"rel_utag\">"
    });
    push_link(out, &tag_url(&tag.name), None, false);
    out.push_str(&tag.n.to_string());
    out.push(' ');
    text(out, &tag.name);
    out.push_str("</a></div>");
}

pub fn render_tag_list(tags: &[TagCount], ctx: &ViewContext<'_>) -> String {
    let mut out = String::from("<div><div class=\"rel_tag\">-</div><div id=\"tagList\" class=\"rel_utags\">");
    for tag in tags {
        render_tag(&mut out, tag);
    }
    out.push_str("</div>");
    if ctx.inspect_available {
        out.push_str("<div id=\"inspect_svm\">inspect</div>");
    }
    out.push_str("</div>");
    out
}

/// The paper list in `#wrap` and the tag list in `#tagwrap`.
pub fn render_page(data: &PageData) -> String {
    let ctx = ViewContext::from_page(data);
    let mut out = String::from("<div id=\"wrap\">");
    out.push_str(&render_paper_list(&data.papers, &ctx));
    out.push_str("</div>\n<div id=\"tagwrap\">");
    out.push_str(&render_tag_list(&data.tags, &ctx));
    out.push_str("</div>\n");
    out
}
