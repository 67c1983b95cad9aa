use crate::autolink::Autolinks;
use crate::htmlrenderer;
use pulldown_cmark::*;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Converts a post body from Markdown to HTML.
///
/// The GitHub-flavored extensions are enabled (tables, strikethrough, task
/// lists, and bare-URL autolinks), every heading gets a unique `id`, single
/// newlines become `<br />`, and raw HTML is passed through as-is.
pub fn to_html(markdown: &str) -> Result<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events: Vec<Event> =
        Autolinks::new(Parser::new_ext(markdown, options)).collect();
    let heading_ids = heading_ids(&events);

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    htmlrenderer::push_html(&mut html, events.into_iter(), heading_ids)?;
    Ok(html)
}

/// Computes the ids for every heading in `events`, in document order.
fn heading_ids(events: &[Event]) -> VecDeque<String> {
    let mut ids = HeadingIds::default();
    let mut out = VecDeque::new();
    let mut text: Option<String> = None;
    for event in events {
        match event {
            Event::Start(Tag::Heading(_)) => text = Some(String::new()),
            Event::End(Tag::Heading(_)) => {
                if let Some(text) = text.take() {
                    out.push_back(ids.assign(&text));
                }
            }
            Event::Text(s) | Event::Code(s) => {
                if let Some(text) = text.as_mut() {
                    text.push_str(s);
                }
            }
            _ => {}
        }
    }
    out
}

/// Hands out heading ids that are unique within one document. The id is the
/// slug of the heading text; repeats get `-1`, `-2`, ... appended.
#[derive(Default)]
struct HeadingIds {
    seen: HashSet<String>,
}

impl HeadingIds {
    fn assign(&mut self, text: &str) -> String {
        let base = match slug::slugify(text) {
            slug if slug.is_empty() => String::from("heading"),
            slug => slug,
        };

        let mut id = base.clone();
        let mut suffix = 0;
        while !self.seen.insert(id.clone()) {
            suffix += 1;
            id = format!("{}-{}", base, suffix);
        }
        id
    }
}

/// The result of a markdown conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error converting markdown to HTML. Malformed markdown is not
/// an error; this only covers failures of the conversion itself.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when writing the HTML output fails.
    #[error("rendering HTML: {0}")]
    Io(#[from] std::io::Error),
}
