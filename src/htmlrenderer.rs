//! Implements a custom [`push_html`] on top of [`pulldown_cmark`]'s event
//! stream. [`pulldown_cmark::html::push_html`] can't attach `id` attributes to
//! headings and always renders soft breaks as plain newlines, so this renderer
//! takes precomputed heading ids and renders every soft break as a `<br />`.
//! Raw HTML events are written through untouched.

use pulldown_cmark::escape::{escape_href, escape_html, StrWrite};
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, LinkType, Tag};
use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::io;

struct Adaptor<'a, T> {
    formatter: &'a mut T,
    result: fmt::Result,
}

impl<T> Adaptor<'_, T> {
    fn handle_result(&mut self, result: fmt::Result) -> io::Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.result = result;
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}

impl<T: fmt::Write> StrWrite for Adaptor<'_, T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let result = self.formatter.write_str(s);
        self.handle_result(result)
    }

    fn write_fmt(&mut self, args: fmt::Arguments) -> io::Result<()> {
        let result = self.formatter.write_fmt(args);
        self.handle_result(result)
    }
}

struct EscapeHref<'a>(&'a str);

impl Display for EscapeHref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_href(&mut adaptor, self.0);
        adaptor.result
    }
}

struct EscapeHtml<'a>(&'a str);

impl Display for EscapeHtml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_html(&mut adaptor, self.0);
        adaptor.result
    }
}

/// Writes ` title="..."` unless the title is empty.
struct TitleAttr<'a>(&'a str);

impl Display for TitleAttr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.is_empty() {
            true => Ok(()),
            false => write!(f, r#" title="{}""#, EscapeHtml(self.0)),
        }
    }
}

enum TableState {
    Head,
    Body,
}

/// An image whose alt text is still being collected. Images nested inside the
/// alt text only contribute their own text.
struct PendingImage<'a> {
    dest: CowStr<'a>,
    title: CowStr<'a>,
    alt: String,
    depth: usize,
}

/// Renders markdown [`Event`]s into HTML. This is largely modeled after
/// [`pulldown_cmark`]'s private `HtmlWriter` struct.
struct HtmlRenderer<'a> {
    table_alignments: Vec<Alignment>,
    table_state: TableState,
    table_cell_index: usize,

    /// The ids for the document's headings, in document order.
    heading_ids: VecDeque<String>,

    image: Option<PendingImage<'a>>,
}

impl<'a> HtmlRenderer<'a> {
    fn new(heading_ids: VecDeque<String>) -> Self {
        HtmlRenderer {
            table_alignments: Vec::default(),
            table_state: TableState::Head,
            table_cell_index: usize::default(),
            heading_ids,
            image: None,
        }
    }

    fn on_event<W: StrWrite>(
        &mut self,
        w: &mut W,
        event: Event<'a>,
    ) -> io::Result<()> {
        if self.image.is_some() {
            return self.on_image_event(w, event);
        }

        match event {
            Event::Start(tag) => self.on_start(w, tag),
            Event::End(tag) => self.on_end(w, tag),
            Event::Code(code) => self.on_code(w, code),
            Event::FootnoteReference(name) => write!(
                w,
                r##"<sup class="footnote-reference"><a href="#{}">{}</a></sup>"##,
                EscapeHtml(&name),
                EscapeHtml(&name),
            ),
            Event::HardBreak => self.on_hard_break(w),
            Event::Html(html) => self.on_html(w, html),
            Event::Rule => self.on_rule(w),
            Event::SoftBreak => self.on_soft_break(w),
            Event::TaskListMarker(checked) => {
                self.on_task_list_marker(w, checked)
            }
            Event::Text(text) => self.on_text(w, text),
        }
    }

    fn on_image_event<W: StrWrite>(
        &mut self,
        w: &mut W,
        event: Event<'a>,
    ) -> io::Result<()> {
        let image = match self.image.as_mut() {
            Some(image) => image,
            None => return Ok(()),
        };
        match event {
            Event::Start(Tag::Image(..)) => image.depth += 1,
            Event::End(Tag::Image(..)) if image.depth > 0 => image.depth -= 1,
            Event::End(Tag::Image(..)) => {
                if let Some(image) = self.image.take() {
                    write!(
                        w,
                        r#"<img src="{}" alt="{}"{} />"#,
                        EscapeHref(&image.dest),
                        EscapeHtml(&image.alt),
                        TitleAttr(&image.title),
                    )?;
                }
            }
            Event::Text(text) | Event::Code(text) => image.alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => image.alt.push(' '),
            _ => {}
        }
        Ok(())
    }

    fn on_start<W: StrWrite>(
        &mut self,
        w: &mut W,
        tag: Tag<'a>,
    ) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("<blockquote>\n"),
            Tag::CodeBlock(kind) => match kind {
                CodeBlockKind::Fenced(info) => {
                    match info.split_whitespace().next() {
                        None => w.write_str("<pre><code>"),
                        Some(lang) => write!(
                            w,
                            r#"<pre><code class="language-{}">"#,
                            EscapeHtml(lang)
                        ),
                    }
                }
                CodeBlockKind::Indented => w.write_str("<pre><code>"),
            },
            Tag::Emphasis => w.write_str("<em>"),
            Tag::FootnoteDefinition(name) => {
                let name = EscapeHtml(&name);
                write!(
                    w,
                    r#"<div class="footnote-definition" id="{}"><sup class="footnote-definition-label">{}</sup>"#,
                    &name, &name,
                )
            }
            Tag::Heading(level) => match self.heading_ids.pop_front() {
                Some(id) => write!(w, r#"<h{} id="{}">"#, level, EscapeHtml(&id)),
                None => write!(w, "<h{}>", level),
            },
            Tag::Image(_link_type, dest, title) => {
                self.image = Some(PendingImage {
                    dest,
                    title,
                    alt: String::new(),
                    depth: 0,
                });
                Ok(())
            }
            Tag::Item => w.write_str("<li>"),
            Tag::Link(LinkType::Email, dest, title) => write!(
                w,
                r#"<a href="mailto:{}"{}>"#,
                EscapeHref(&dest),
                TitleAttr(&title),
            ),
            Tag::Link(_link_type, dest, title) => write!(
                w,
                r#"<a href="{}"{}>"#,
                EscapeHref(&dest),
                TitleAttr(&title),
            ),
            Tag::List(None) => w.write_str("<ul>\n"),
            Tag::List(Some(1)) => w.write_str("<ol>\n"),
            Tag::List(Some(start)) => write!(w, "<ol start=\"{}\">\n", start),
            Tag::Paragraph => w.write_str("<p>"),
            Tag::Strikethrough => w.write_str("<del>"),
            Tag::Strong => w.write_str("<strong>"),
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                w.write_str("<table>")
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                w.write_str("<thead><tr>")
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                w.write_str("<tr>")
            }
            Tag::TableCell => write!(
                w,
                "<{}{}>",
                match self.table_state {
                    TableState::Head => "th",
                    TableState::Body => "td",
                },
                match self.table_alignments.get(self.table_cell_index) {
                    Some(Alignment::Left) => r#" style="text-align: left""#,
                    Some(Alignment::Right) => r#" style="text-align: right""#,
                    Some(Alignment::Center) => r#" style="text-align: center""#,
                    _ => "",
                }
            ),
        }
    }

    fn on_end<W: StrWrite>(&mut self, w: &mut W, tag: Tag) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("</blockquote>\n"),
            Tag::CodeBlock(_) => w.write_str("</code></pre>\n"),
            Tag::Emphasis => w.write_str("</em>"),
            Tag::FootnoteDefinition(_) => w.write_str("</div>\n"),
            Tag::Heading(level) => write!(w, "</h{}>\n", level),
            Tag::Image(..) => Ok(()), // handled by on_image_event
            Tag::Item => w.write_str("</li>\n"),
            Tag::Link(..) => w.write_str("</a>"),
            Tag::List(Some(_)) => w.write_str("</ol>\n"),
            Tag::List(None) => w.write_str("</ul>\n"),
            Tag::Paragraph => w.write_str("</p>\n"),
            Tag::Strikethrough => w.write_str("</del>"),
            Tag::Strong => w.write_str("</strong>"),
            Tag::Table(_) => w.write_str("</tbody></table>\n"),
            Tag::TableHead => {
                self.table_state = TableState::Body;
                w.write_str("</tr></thead><tbody>")
            }
            Tag::TableRow => w.write_str("</tr>"),
            Tag::TableCell => {
                self.table_cell_index += 1;
                w.write_str(match self.table_state {
                    TableState::Head => "</th>",
                    TableState::Body => "</td>",
                })
            }
        }
    }

    fn on_text<W: StrWrite>(&mut self, w: &mut W, s: CowStr) -> io::Result<()> {
        escape_html(w, &s)
    }

    fn on_code<W: StrWrite>(&mut self, w: &mut W, s: CowStr) -> io::Result<()> {
        write!(w, "<code>{}</code>", EscapeHtml(&s))
    }

    fn on_html<W: StrWrite>(&mut self, w: &mut W, s: CowStr) -> io::Result<()> {
        w.write_str(&s)
    }

    // Every newline inside a paragraph is a line break.
    fn on_soft_break<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("<br />\n")
    }

    fn on_hard_break<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("<br />\n")
    }

    fn on_rule<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("<hr />\n")
    }

    fn on_task_list_marker<W: StrWrite>(
        &mut self,
        w: &mut W,
        checked: bool,
    ) -> io::Result<()> {
        write!(
            w,
            r#"<input disabled="" type="checkbox"{} /> "#,
            match checked {
                true => r#" checked="""#,
                false => "",
            }
        )
    }
}

/// Converts [`Event`]s into an HTML string much like
/// `pulldown_cmark::html::push_html` except that headings receive the ids in
/// `heading_ids` (in order) and soft breaks become `<br />`. See the module
/// description for more details.
pub fn push_html<'a, I>(
    out: &mut String,
    events: I,
    heading_ids: VecDeque<String>,
) -> io::Result<()>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut renderer = HtmlRenderer::new(heading_ids);
    for event in events {
        renderer.on_event(out, event)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pulldown_cmark::{Options, Parser};

    fn render(markdown: &str, ids: &[&str]) -> String {
        let mut out = String::new();
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        push_html(
            &mut out,
            Parser::new_ext(markdown, options),
            ids.iter().map(|id| id.to_string()).collect(),
        )
        .unwrap();
        out
    }

    #[test]
    fn test_heading_ids_in_order() {
        assert_eq!(
            "<h1 id=\"a\">One</h1>\n<h2 id=\"b\">Two</h2>\n",
            render("# One\n## Two", &["a", "b"])
        );
    }

    #[test]
    fn test_heading_without_id() {
        assert_eq!("<h3>Three</h3>\n", render("### Three", &[]));
    }

    #[test]
    fn test_soft_break_is_hard() {
        assert_eq!("<p>one<br />\ntwo</p>\n", render("one\ntwo", &[]));
    }

    #[test]
    fn test_image_alt_text() {
        assert_eq!(
            "<p><img src=\"/cat.png\" alt=\"a cat\" title=\"Cat\" /></p>\n",
            render("![a *cat*](/cat.png \"Cat\")", &[])
        );
    }

    #[test]
    fn test_raw_html_passthrough() {
        assert_eq!(
            "<div class=\"x\"><b>raw</b></div>\n",
            render("<div class=\"x\"><b>raw</b></div>\n", &[])
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!("<p>a &amp; b</p>\n", render("a & b", &[]));
    }

    #[test]
    fn test_code_block_language() {
        assert_eq!(
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n",
            render("```rust\nfn main() {}\n```", &[])
        );
    }

    #[test]
    fn test_task_list() {
        let html = render("- [x] done\n- [ ] todo", &[]);
        assert!(html.contains(r#"<input disabled="" type="checkbox" checked="" /> done"#));
        assert!(html.contains(r#"<input disabled="" type="checkbox" /> todo"#));
    }

    #[test]
    fn test_table_alignment() {
        let html = render("| a | b |\n|:--|--:|\n| 1 | 2 |", &[]);
        assert!(html.starts_with("<table><thead><tr>"));
        assert!(html.contains(r#"<th style="text-align: left">a</th>"#));
        assert!(html.contains(r#"<td style="text-align: right">2</td>"#));
        assert!(html.ends_with("</tbody></table>\n"));
    }
}
