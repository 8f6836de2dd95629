//! Sanity renderer
//!
//! Turns paper records into HTML. Titles and abstracts may carry LaTeX between
//! `$…$`, `$$…$$`, `\(…\)` or `\[…\]`; score explanations are markdown with
//! LaTeX mixed in. Math is typeset to MathML, and a span that fails to
//! typeset is left as the text it was written as.
//!

pub mod hybrid;
pub mod math;
pub mod spans;
pub mod view;

pub use hybrid::{
    Fragment, MathFragments, default_md_options, render_markdown_and_math,
    render_markdown_and_math_with, render_math, render_math_html, render_math_html_with,
    render_math_with,
};
pub use math::{MathFallback, MathResult};
pub use spans::{Delimiter, MathSpan, math_spans};
pub use view::{ViewContext, render_page, render_paper_list, render_tag_list};
