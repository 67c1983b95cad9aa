//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: loading templates, copying static
//! assets, rendering the root page, transforming every post
//! ([`crate::post`]), and rendering the blog index ([`crate::index`]).
//!
//! Only whole-build problems are returned as errors. A post that fails is
//! logged and left out of the site.

use crate::config::Config;
use crate::index::Index;
use crate::post::{self, Transformer};
use crate::write::{self, PageEmitter, TemplateKind, Templates, Writer};
use gtmpl_value::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// The extension of post source files.
const MARKDOWN_EXTENSION: &str = "md";

/// Summarizes a finished build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// The number of post pages written (and listed on the index page).
    pub posts: usize,

    /// The number of post sources that were skipped because of errors.
    pub skipped: usize,
}

/// Builds the site described by `config`.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    // Parse the templates up front; a broken template fails the whole build.
    let templates = Templates::load(config)?;
    let writer = Writer {
        templates: &templates,
    };

    if config.clean {
        rmdir(&config.posts_output_directory)?;
        rmdir(&config.static_output_directory)?;
    }
    create_dir_all(&config.posts_output_directory)?;

    copy_dir(
        &config.static_source_directory,
        &config.static_output_directory,
    )?;

    writer.emit(TemplateKind::Home, Value::Nil, &config.home_output_path)?;
    info!(path = %config.home_output_path.display(), "generated static page");

    let sources = discover_posts(&config.posts_source_directory)?;
    let (index, skipped) = transform_posts(
        &sources,
        &config.posts_output_directory,
        &config.date_format,
        &writer,
    );

    if index.is_empty() {
        warn!(
            path = %config.posts_source_directory.display(),
            "no posts were generated"
        );
    }
    let posts = index.write(&writer, &config.index_output_path)?.len();
    Ok(BuildReport { posts, skipped })
}

/// Transforms each source in order, collecting the successes into an
/// [`Index`]. Failures are logged and counted. Returns the index and the
/// number of skipped sources.
pub fn transform_posts(
    sources: &[PathBuf],
    output_directory: &Path,
    date_format: &str,
    emitter: &dyn PageEmitter,
) -> (Index, usize) {
    let transformer = Transformer::new(output_directory, date_format, emitter);
    let mut index = Index::default();
    let mut skipped = 0;

    // Sources in different directories can share a base name. The first one
    // that is generated successfully owns the output file.
    let mut owners: HashMap<String, &Path> = HashMap::new();

    for source in sources {
        let name = match post::output_file_name(source) {
            Ok(name) => name,
            Err(err) => {
                error!(path = %source.display(), "skipping post: {}", err);
                skipped += 1;
                continue;
            }
        };
        if let Some(owner) = owners.get(&name) {
            error!(
                path = %source.display(),
                "skipping post: `{}` is already generated from `{}`",
                name,
                owner.display(),
            );
            skipped += 1;
            continue;
        }

        match transformer.transform(source) {
            Ok(entry) => {
                owners.insert(name, source.as_path());
                index.push(entry);
            }
            Err(err) => {
                error!("skipping post: {}", err);
                skipped += 1;
            }
        }
    }

    (index, skipped)
}

/// Returns every `.md` file under `dir`, recursively. Entries are visited in
/// file name order within each directory, so the result is deterministic.
pub fn discover_posts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for result in WalkDir::new(dir).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result.map_err(|err| Error::Discover {
            path: dir.to_owned(),
            err,
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
        {
            debug!(path = %path.display(), "found post source");
            sources.push(path.to_owned());
        }
    }
    Ok(sources)
}

/// Copies the tree at `src` into `dst`, creating directories as needed.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let copy_error = |path: &Path, err: std::io::Error| Error::CopyAssets {
        path: path.to_owned(),
        err,
    };

    for result in WalkDir::new(src).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result.map_err(|err| Error::CopyAssets {
            path: src.to_owned(),
            err: err.into(),
        })?;
        // strip_prefix can't fail: every entry is under `src`
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| copy_error(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| copy_error(entry.path(), e))?;
        }
    }
    debug!(from = %src.display(), to = %dst.display(), "copied static assets");
    Ok(())
}

fn create_dir_all(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
        path: dir.to_owned(),
        err,
    })
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

/// The result of a build step.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Each of these stops the build.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for errors loading templates or writing the root and index
    /// pages.
    #[error(transparent)]
    Write(#[from] write::Error),

    /// Returned for I/O problems while cleaning output directories.
    #[error("cleaning directory `{}`: {err}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when an output directory can't be created.
    #[error("creating directory `{}`: {err}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when static assets can't be copied.
    #[error("copying static assets `{}`: {err}", .path.display())]
    CopyAssets {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the post sources can't be enumerated.
    #[error("reading post sources `{}`: {err}", .path.display())]
    Discover {
        path: PathBuf,
        #[source]
        err: walkdir::Error,
    },
}
