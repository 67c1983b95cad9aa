//! Templating and writing HTML pages to disk. Templates are Go-style
//! [`gtmpl`] templates, parsed once at startup into [`Templates`] and shared
//! read-only by everything that renders pages.

use crate::config::Config;
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Names one of the site's templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Renders a single post from a [`crate::post::PostPage`].
    Post,

    /// Renders the blog index from the sorted list of
    /// [`crate::post::IndexEntry`]s.
    Index,

    /// Renders the static root page. It receives no data.
    Home,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            TemplateKind::Post => "post",
            TemplateKind::Index => "index",
            TemplateKind::Home => "home",
        })
    }
}

/// The parsed templates for a site.
pub struct Templates {
    post: Template,
    index: Template,
    home: Template,
}

impl Templates {
    /// Loads and parses the template files named in `config`.
    pub fn load(config: &Config) -> Result<Templates> {
        Ok(Templates {
            post: parse_template_file(&config.post_template)?,
            index: parse_template_file(&config.index_template)?,
            home: parse_template_file(&config.home_template)?,
        })
    }

    /// Parses templates from source text.
    pub fn parse(post: &str, index: &str, home: &str) -> Result<Templates> {
        Ok(Templates {
            post: parse_template(TemplateKind::Post.to_string(), post)?,
            index: parse_template(TemplateKind::Index.to_string(), index)?,
            home: parse_template(TemplateKind::Home.to_string(), home)?,
        })
    }

    fn get(&self, kind: TemplateKind) -> &Template {
        match kind {
            TemplateKind::Post => &self.post,
            TemplateKind::Index => &self.index,
            TemplateKind::Home => &self.home,
        }
    }
}

fn parse_template_file(path: &Path) -> Result<Template> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?;
    parse_template(path.display().to_string(), &contents)
}

fn parse_template(name: String, contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(contents)
        .map_err(|message| Error::ParseTemplate {
            name,
            message: message.to_string(),
        })?;
    Ok(template)
}

/// Renders a template with some data and writes the result to a file. This is
/// the only way the rest of the crate produces output pages.
pub trait PageEmitter {
    /// Renders `kind` with `data` and writes the result to `dest`. Pass
    /// [`Value::Nil`] for templates that take no data. If rendering fails,
    /// `dest` is not created.
    fn emit(&self, kind: TemplateKind, data: Value, dest: &Path) -> Result<()>;
}

/// The [`PageEmitter`] that renders with a set of parsed [`Templates`].
pub struct Writer<'a> {
    pub templates: &'a Templates,
}

impl PageEmitter for Writer<'_> {
    fn emit(&self, kind: TemplateKind, data: Value, dest: &Path) -> Result<()> {
        let context = Context::from(data).map_err(|message| Error::Template {
            kind,
            message: message.to_string(),
        })?;

        // Render fully before touching the file system so a failing template
        // never leaves a partial page behind.
        let mut rendered: Vec<u8> = Vec::new();
        self.templates
            .get(kind)
            .execute(&mut rendered, &context)
            .map_err(|message| Error::Template {
                kind,
                message: message.to_string(),
            })?;

        std::fs::write(dest, rendered).map_err(|err| Error::Io {
            path: dest.to_owned(),
            err,
        })?;
        debug!(template = %kind, path = %dest.display(), "wrote page");
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading templates or writing pages.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {err}", .path.display())]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("parsing template `{name}`: {message}")]
    ParseTemplate { name: String, message: String },

    /// An error during templating.
    #[error("executing {kind} template: {message}")]
    Template { kind: TemplateKind, message: String },

    /// An error writing the output file.
    #[error("writing `{}`: {err}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
}
