//! Turns bare URLs and e-mail addresses in Markdown text into links, the way
//! GitHub-flavored Markdown's extended autolinks do. `pulldown_cmark` only
//! recognizes the `<https://...>` form, so this runs as an adapter over its
//! event stream.
//!
//! Text inside code blocks, links, and image alt text is left alone.

use pulldown_cmark::{CowStr, Event, LinkType, Tag};
use regex::Regex;
use std::collections::VecDeque;
use std::iter::Peekable;
use std::sync::LazyLock;

static AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:https?://|www\.)[^\s<]*[^\s<?!.,:;*_~'")\]]|\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b"#,
    )
    .expect("autolink pattern is valid")
});

/// Wraps an event stream, expanding bare URLs in [`Event::Text`] into link
/// events.
pub struct Autolinks<'a, I: Iterator<Item = Event<'a>>> {
    inner: Peekable<I>,
    pending: VecDeque<Event<'a>>,

    /// How many links or images enclose the current position.
    link_depth: usize,
    in_code_block: bool,
}

impl<'a, I: Iterator<Item = Event<'a>>> Autolinks<'a, I> {
    pub fn new(inner: I) -> Self {
        Autolinks {
            inner: inner.peekable(),
            pending: VecDeque::new(),
            link_depth: 0,
            in_code_block: false,
        }
    }

    // The parser splits a run of text wherever emphasis could have started
    // (e.g. at `_`), which would cut URLs apart; glue the run back together.
    fn merge_text(&mut self, first: CowStr<'a>) -> CowStr<'a> {
        let mut merged: Option<String> = None;
        while let Some(Event::Text(_)) = self.inner.peek() {
            if let Some(Event::Text(next)) = self.inner.next() {
                merged
                    .get_or_insert_with(|| first.to_string())
                    .push_str(&next);
            }
        }
        match merged {
            Some(text) => CowStr::from(text),
            None => first,
        }
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Autolinks<'a, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let event = self.inner.next()?;
        match &event {
            Event::Start(Tag::Link(..)) | Event::Start(Tag::Image(..)) => {
                self.link_depth += 1
            }
            Event::End(Tag::Link(..)) | Event::End(Tag::Image(..)) => {
                self.link_depth = self.link_depth.saturating_sub(1)
            }
            Event::Start(Tag::CodeBlock(_)) => self.in_code_block = true,
            Event::End(Tag::CodeBlock(_)) => self.in_code_block = false,
            _ => {}
        }

        let linkable = self.link_depth == 0 && !self.in_code_block;
        match event {
            Event::Text(text) if linkable => {
                let text = self.merge_text(text);
                self.pending.extend(linkify(&text));
                self.pending.pop_front()
            }
            event => Some(event),
        }
    }
}

/// Splits `text` into text and link events. Returns a single text event when
/// `text` contains nothing to link.
fn linkify<'a>(text: &CowStr<'a>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut last = 0;
    for m in AUTOLINK.find_iter(text) {
        if m.start() > last {
            events.push(Event::Text(CowStr::from(
                text[last..m.start()].to_owned(),
            )));
        }
        let (link_type, dest) = link_target(m.as_str());
        let tag = Tag::Link(link_type, CowStr::from(dest), CowStr::Borrowed(""));
        events.push(Event::Start(tag.clone()));
        events.push(Event::Text(CowStr::from(m.as_str().to_owned())));
        events.push(Event::End(tag));
        last = m.end();
    }

    if last == 0 {
        return vec![Event::Text(text.clone())];
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_owned())));
    }
    events
}

fn link_target(matched: &str) -> (LinkType, String) {
    let lower = matched.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        (LinkType::Autolink, matched.to_owned())
    } else if lower.starts_with("www.") {
        (LinkType::Autolink, format!("http://{}", matched))
    } else {
        (LinkType::Email, matched.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pulldown_cmark::Parser;

    fn links(markdown: &str) -> Vec<(LinkType, String)> {
        Autolinks::new(Parser::new(markdown))
            .filter_map(|ev| match ev {
                Event::Start(Tag::Link(link_type, dest, _)) => {
                    Some((link_type, dest.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bare_urls() {
        assert_eq!(
            vec![
                (LinkType::Autolink, "https://example.com/a_b_c".to_owned()),
                (LinkType::Autolink, "http://www.rust-lang.org".to_owned()),
                (LinkType::Email, "me@example.org".to_owned()),
            ],
            links(
                "See https://example.com/a_b_c, www.rust-lang.org. Mail me@example.org"
            )
        );
    }

    #[test]
    fn test_trailing_punctuation_excluded() {
        assert_eq!(
            vec![(LinkType::Autolink, "https://example.com/x".to_owned())],
            links("(see https://example.com/x).")
        );
    }

    #[test]
    fn test_no_links_in_code_or_existing_links() {
        assert!(links("`https://example.com`").is_empty());
        assert!(links("```\nhttps://example.com\n```").is_empty());
        assert_eq!(
            vec![(LinkType::Inline, "/about".to_owned())],
            links("[https://example.com](/about)")
        );
    }

    #[test]
    fn test_surrounding_text_kept() {
        let text: String = Autolinks::new(Parser::new("go to https://a.io now"))
            .filter_map(|ev| match ev {
                Event::Text(t) => Some(t.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!("go to https://a.io now", text);
    }
}
