use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use siteprobe_common::{ContentRecord, Heading, HeadingLevel, ProbeError, Result};

use crate::renderer::PageRenderer;

/// Containers probed for main content, in order. Every match of every
/// selector contributes, so nested containers can repeat text.
pub const CONTENT_SELECTORS: [&str; 6] = [
    "main",
    "article",
    "#content",
    "#main",
    ".main-content",
    "div[role=\"main\"]",
];

/// Subtrees that never produce visible text.
const INVISIBLE_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe", "object",
];

/// Elements that start and end on their own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary",
    "table", "tr", "ul",
];

/// Renders a page and normalizes it into a [`ContentRecord`].
pub struct PageExtractor {
    renderer: Arc<dyn PageRenderer>,
}

impl PageExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    /// Render `url` and extract its content. Fails only when the page as a
    /// whole could not be rendered; individual fields degrade to empty.
    pub async fn extract(&self, url: &str) -> Result<ContentRecord> {
        let html = self.renderer.render(url).await?;

        if html.trim().is_empty() {
            return Err(ProbeError::Extraction(format!(
                "{} returned an empty document for {url}",
                self.renderer.name()
            )));
        }

        let record = parse_document(&html);

        info!(
            url,
            renderer = self.renderer.name(),
            title = record.title.as_str(),
            content_chars = record.main_content.chars().count(),
            headings = record.headings.len(),
            "Extracted page content"
        );
        Ok(record)
    }
}

/// Extract a [`ContentRecord`] from rendered HTML.
pub fn parse_document(html: &str) -> ContentRecord {
    let document = Html::parse_document(html);

    ContentRecord {
        title: title(&document),
        meta_description: meta_description(&document),
        main_content: main_content(&document),
        headings: headings(&document),
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!(selector = css, error = %e, "Skipping unparseable selector");
            None
        }
    }
}

fn title(document: &Html) -> String {
    let Some(sel) = selector("title") else {
        return String::new();
    };
    document
        .select(&sel)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .unwrap_or_default()
}

fn meta_description(document: &Html) -> String {
    let Some(sel) = selector("meta[name=\"description\"]") else {
        return String::new();
    };
    document
        .select(&sel)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(str::to_string)
        .unwrap_or_default()
}

fn main_content(document: &Html) -> String {
    let mut matched = Vec::new();
    for css in CONTENT_SELECTORS {
        if let Some(sel) = selector(css) {
            matched.extend(document.select(&sel).filter(|el| !in_template(*el)));
        }
    }

    if matched.is_empty() {
        debug!("No content container matched, falling back to body");
        let Some(body_sel) = selector("body") else {
            return String::new();
        };
        matched.extend(document.select(&body_sel).take(1));
    }

    matched
        .into_iter()
        .map(rendered_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn headings(document: &Html) -> Vec<Heading> {
    let mut out = Vec::new();
    for level in HeadingLevel::ALL {
        let Some(sel) = selector(level.tag()) else {
            continue;
        };
        for element in document.select(&sel).filter(|el| !in_template(*el)) {
            let text = rendered_text(element);
            let text = text.trim();
            if !text.is_empty() {
                out.push(Heading {
                    level,
                    text: text.to_string(),
                });
            }
        }
    }
    out
}

/// Template content is inert markup, never part of the rendered page.
fn in_template(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == "template")
}

/// Text of a matched element as displayed in context: empty when any
/// ancestor hides it.
fn rendered_text(element: ElementRef<'_>) -> String {
    let hidden_by_ancestor = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| INVISIBLE_TAGS.contains(&a.value().name()) || is_hidden(a));
    if hidden_by_ancestor {
        return String::new();
    }
    visible_text(element)
}

/// Rendered text of an element, approximating what a browser shows: hidden
/// and non-content subtrees are skipped, block elements break lines, and
/// whitespace is collapsed.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if INVISIBLE_TAGS.contains(&name) || is_hidden(element) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    let block = BLOCK_TAGS.contains(&name);
    if block {
        out.push('\n');
    } else if name == "td" || name == "th" {
        out.push(' ');
    }

    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            collect_text(child_el, out);
        } else if let Some(text) = child.value().as_text() {
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
        }
    }

    if block {
        out.push('\n');
    }
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("hidden").is_some() {
        return true;
    }
    if el
        .attr("aria-hidden")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        return true;
    }
    if let Some(style) = el.attr("style") {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        return style.contains("display:none") || style.contains("visibility:hidden");
    }
    false
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
