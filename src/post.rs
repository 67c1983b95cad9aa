//! Defines the post types ([`FrontMatter`], [`PostPage`], [`IndexEntry`]) and
//! the [`Transformer`], which turns one Markdown source file into a rendered
//! post page on disk plus the [`IndexEntry`] that lists it on the index page.

use crate::write::{self, PageEmitter, TemplateKind};
use crate::{date, frontmatter, markdown};
use gtmpl_value::Value;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, info_span};

/// The extension given to rendered post files.
pub const HTML_EXTENSION: &str = "html";

/// The author of a post.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Author {
    #[serde(deserialize_with = "frontmatter::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "frontmatter::null_as_default")]
    pub url: String,
}

/// The metadata header of a post source file. Every field is optional and
/// unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "frontmatter::null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "frontmatter::null_as_default")]
    pub author: Author,

    /// The post date as written, expected to be `YYYY-MM-DD`.
    #[serde(deserialize_with = "frontmatter::null_as_default")]
    pub date: String,

    #[serde(
        rename = "readingTime",
        deserialize_with = "frontmatter::null_as_default"
    )]
    pub reading_time: String,

    #[serde(deserialize_with = "frontmatter::null_as_default")]
    pub excerpt: String,
}

/// The data handed to the post template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostPage {
    pub title: String,
    pub author: Author,

    /// The display date (see [`date::normalize`]).
    pub date: String,

    pub reading_time: String,

    /// The rendered body. This is trusted HTML and must not be escaped again.
    pub content: String,
}

/// One line of the index page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexEntry {
    pub title: String,
    pub author: Author,

    /// The raw front matter date, used for ordering.
    pub date: String,

    /// The display date.
    pub formatted_date: String,

    pub excerpt: String,

    /// The name of the rendered post file, relative to the posts output
    /// directory.
    pub file_name: String,
}

/// Returns the name of the rendered page for a source file: the source's base
/// name with its extension replaced by `.html`.
pub fn output_file_name(source: &Path) -> Result<String> {
    source
        .with_extension(HTML_EXTENSION)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::InvalidFileName(source.to_owned()))
}

/// Turns post source files into post pages and [`IndexEntry`]s.
pub struct Transformer<'a> {
    /// The directory in which post pages are written.
    output_directory: &'a Path,

    /// The chrono format for display dates.
    date_format: &'a str,

    emitter: &'a dyn PageEmitter,
}

impl<'a> Transformer<'a> {
    /// Constructs a new transformer. See fields on [`Transformer`] for
    /// argument descriptions.
    pub fn new(
        output_directory: &'a Path,
        date_format: &'a str,
        emitter: &'a dyn PageEmitter,
    ) -> Transformer<'a> {
        Transformer {
            output_directory,
            date_format,
            emitter,
        }
    }

    /// Reads the post at `source`, writes its page into the output directory,
    /// and returns its index entry. Every error is annotated with `source`.
    /// Nothing is written unless the post parses and renders.
    pub fn transform(&self, source: &Path) -> Result<IndexEntry> {
        let _span = info_span!("post", path = %source.display()).entered();
        match self._transform(source) {
            Ok(entry) => Ok(entry),
            Err(e) => Err(Error::Annotated {
                path: source.to_owned(),
                err: Box::new(e),
            }),
        }
    }

    fn _transform(&self, source: &Path) -> Result<IndexEntry> {
        let input = std::fs::read_to_string(source).map_err(Error::Read)?;
        let (front_matter, body): (FrontMatter, &str) =
            frontmatter::parse(&input)?;
        let content = markdown::to_html(body)?;
        let formatted_date = date::normalize(&front_matter.date, self.date_format);

        let file_name = output_file_name(source)?;
        let dest = self.output_directory.join(&file_name);
        let page = PostPage {
            title: front_matter.title.clone(),
            author: front_matter.author.clone(),
            date: formatted_date.clone(),
            reading_time: front_matter.reading_time,
            content,
        };
        self.emitter
            .emit(TemplateKind::Post, Value::from(&page), &dest)?;
        info!(path = %dest.display(), "generated post");

        Ok(IndexEntry {
            title: front_matter.title,
            author: front_matter.author,
            date: front_matter.date,
            formatted_date,
            excerpt: front_matter.excerpt,
            file_name,
        })
    }
}

/// Represents the result of a post transformation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error transforming a single post. These never stop a build;
/// the post is skipped.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the source file can't be read.
    #[error("reading source: {0}")]
    Read(#[source] std::io::Error),

    /// Returned when the front matter is missing or malformed.
    #[error("parsing front matter: {0}")]
    FrontMatter(#[from] frontmatter::Error),

    /// Returned when the body can't be converted to HTML.
    #[error("converting markdown: {0}")]
    Markdown(#[from] markdown::Error),

    /// Returned when the source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned when the post page can't be rendered or written.
    #[error("writing post page: {0}")]
    Write(#[from] write::Error),

    /// An error with the path of the post it came from.
    #[error("{}: {err}", .path.display())]
    Annotated {
        path: PathBuf,
        #[source]
        err: Box<Error>,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;

    /// Records emitted pages instead of rendering them.
    #[derive(Default)]
    struct Recorder {
        pages: RefCell<Vec<(TemplateKind, PathBuf)>>,
        fail: bool,
    }

    impl PageEmitter for Recorder {
        fn emit(&self, kind: TemplateKind, _data: Value, dest: &Path) -> write::Result<()> {
            if self.fail {
                return Err(write::Error::Template {
                    kind,
                    message: "boom".to_owned(),
                });
            }
            self.pages.borrow_mut().push((kind, dest.to_owned()));
            Ok(())
        }
    }

    fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const POST: &str = "---
title: 첫 글
author:
  name: Kim
  url: https://kim.dev
date: 2024-03-01
readingTime: 3 min
excerpt: Hello there
tags: [ignored]
---
# Hello World
";

    #[test]
    fn test_transform() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "first-post.md", POST);
        let recorder = Recorder::default();
        let transformer =
            Transformer::new(Path::new("/out"), date::DEFAULT_DISPLAY_FORMAT, &recorder);

        let entry = transformer.transform(&source)?;
        assert_eq!(
            IndexEntry {
                title: "첫 글".to_owned(),
                author: Author {
                    name: "Kim".to_owned(),
                    url: "https://kim.dev".to_owned(),
                },
                date: "2024-03-01".to_owned(),
                formatted_date: "2024년 3월 1일".to_owned(),
                excerpt: "Hello there".to_owned(),
                file_name: "first-post.html".to_owned(),
            },
            entry
        );
        assert_eq!(
            vec![(TemplateKind::Post, PathBuf::from("/out/first-post.html"))],
            *recorder.pages.borrow()
        );
        Ok(())
    }

    #[test]
    fn test_transform_bad_date_is_not_an_error() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let source =
            write_source(dir.path(), "odd.md", "---\ndate: not-a-date\n---\nbody");
        let recorder = Recorder::default();
        let transformer =
            Transformer::new(dir.path(), date::DEFAULT_DISPLAY_FORMAT, &recorder);

        let entry = transformer.transform(&source)?;
        assert_eq!("not-a-date", entry.date);
        assert_eq!("not-a-date", entry.formatted_date);
        Ok(())
    }

    #[test]
    fn test_transform_malformed_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "broken.md", "title: nope\n# Body");
        let recorder = Recorder::default();
        let transformer =
            Transformer::new(dir.path(), date::DEFAULT_DISPLAY_FORMAT, &recorder);

        match transformer.transform(&source) {
            Err(Error::Annotated { path, err }) => {
                assert_eq!(source, path);
                assert!(matches!(
                    *err,
                    Error::FrontMatter(frontmatter::Error::MissingStartFence)
                ));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(recorder.pages.borrow().is_empty());
    }

    #[test]
    fn test_transform_emit_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "post.md", POST);
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let transformer =
            Transformer::new(dir.path(), date::DEFAULT_DISPLAY_FORMAT, &recorder);

        let err = transformer.transform(&source).unwrap_err();
        assert!(err.to_string().contains("post.md"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_transform_missing_file() {
        let recorder = Recorder::default();
        let transformer =
            Transformer::new(Path::new("/out"), date::DEFAULT_DISPLAY_FORMAT, &recorder);
        let err = transformer
            .transform(Path::new("/nonexistent/post.md"))
            .unwrap_err();
        assert!(matches!(err, Error::Annotated { ref err, .. } if matches!(**err, Error::Read(_))));
    }

    #[test]
    fn test_front_matter_blank_values() -> frontmatter::Result<()> {
        let (front_matter, _): (FrontMatter, &str) = frontmatter::parse(
            "---\ntitle:\nauthor:\ndate:\nreadingTime:\nexcerpt:\n---\nbody",
        )?;
        assert_eq!(FrontMatter::default(), front_matter);

        let (front_matter, _): (FrontMatter, &str) =
            frontmatter::parse("---\ntitle: x\nauthor:\n  name:\n  url: https://kim.dev\n---\n")?;
        assert_eq!("x", front_matter.title);
        assert_eq!(
            Author {
                name: String::new(),
                url: "https://kim.dev".to_owned(),
            },
            front_matter.author
        );
        Ok(())
    }

    #[test]
    fn test_front_matter_comment_only() -> frontmatter::Result<()> {
        let (front_matter, body): (FrontMatter, &str) =
            frontmatter::parse("---\n# draft\n---\nbody")?;
        assert_eq!(FrontMatter::default(), front_matter);
        assert_eq!("body", body);
        Ok(())
    }

    #[test]
    fn test_output_file_name() -> Result<()> {
        assert_eq!("a.html", output_file_name(Path::new("posts/2024/a.md"))?);
        assert_eq!("a.b.html", output_file_name(Path::new("a.b.md"))?);
        Ok(())
    }
}
