//! Site configuration. Every project uses the same conventional layout,
//! relative to the project root:
//!
//! ```text
//! posts/               Markdown sources (searched recursively)
//! public/              static assets, copied verbatim
//! templates/post.html  post page template
//! templates/blog.html  blog index template
//! templates/index.html root page template
//! dist/                output
//! ```
//!
//! An optional `quire.yaml` in the project root can move any of these
//! directories and change the display date format.

use crate::date;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The name of the optional project file.
pub const PROJECT_FILE: &str = "quire.yaml";

#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    posts_directory: Option<PathBuf>,
    static_directory: Option<PathBuf>,
    template_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    date_format: Option<String>,
    clean: Option<bool>,
}

/// The resolved paths and settings for one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Where post sources are read from.
    pub posts_source_directory: PathBuf,

    /// Where static assets are copied from.
    pub static_source_directory: PathBuf,

    /// The directory holding the three templates.
    pub template_directory: PathBuf,

    pub post_template: PathBuf,
    pub index_template: PathBuf,
    pub home_template: PathBuf,

    /// The root page, rendered from `home_template`.
    pub home_output_path: PathBuf,

    /// Where static assets are copied to.
    pub static_output_directory: PathBuf,

    /// The blog index page.
    pub index_output_path: PathBuf,

    /// Where post pages are written.
    pub posts_output_directory: PathBuf,

    /// The chrono format for display dates.
    pub date_format: String,

    /// Whether to delete the posts and static output directories before
    /// building, so that removed sources don't leave stale pages behind.
    pub clean: bool,
}

impl Config {
    /// Returns the conventional layout rooted at `root`.
    pub fn with_root(root: &Path) -> Config {
        Config::from_project(root, Project::default())
    }

    /// Loads the configuration for the project at `root`, reading
    /// [`PROJECT_FILE`] if it exists.
    pub fn from_directory(root: &Path) -> Result<Config> {
        let path = root.join(PROJECT_FILE);
        if !path.exists() {
            return Ok(Config::with_root(root));
        }

        let contents =
            std::fs::read_to_string(&path).map_err(|err| Error::Open {
                path: path.clone(),
                err,
            })?;
        let project: Project = match contents.trim().is_empty() {
            true => Project::default(),
            false => serde_yaml::from_str(&contents)
                .map_err(|err| Error::Parse { path, err })?,
        };
        let config = Config::from_project(root, project);
        if !date::is_valid_format(&config.date_format) {
            return Err(Error::DateFormat(config.date_format));
        }
        config.check_overlap()?;
        Ok(config)
    }

    /// Rejects layouts where a directory the build cleans or writes into is,
    /// contains, or sits inside one of the source directories. Cleaning would
    /// otherwise delete sources, and copying assets would copy into itself.
    fn check_overlap(&self) -> Result<()> {
        let outputs = [&self.posts_output_directory, &self.static_output_directory];
        let sources = [
            &self.posts_source_directory,
            &self.static_source_directory,
            &self.template_directory,
        ];
        for output in outputs {
            for source in sources {
                if source.starts_with(output) || output.starts_with(source) {
                    return Err(Error::Overlap {
                        output: output.clone(),
                        input: source.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn from_project(root: &Path, project: Project) -> Config {
        let resolve = |dir: Option<PathBuf>, default: &str| {
            root.join(dir.unwrap_or_else(|| PathBuf::from(default)))
        };
        let templates = resolve(project.template_directory, "templates");
        let output = resolve(project.output_directory, "dist");
        let blog = output.join("blog");

        Config {
            posts_source_directory: resolve(project.posts_directory, "posts"),
            static_source_directory: resolve(project.static_directory, "public"),
            post_template: templates.join("post.html"),
            index_template: templates.join("blog.html"),
            home_template: templates.join("index.html"),
            template_directory: templates,
            home_output_path: output.join("index.html"),
            static_output_directory: output.join("public"),
            index_output_path: blog.join("index.html"),
            posts_output_directory: blog.join("posts"),
            date_format: project
                .date_format
                .unwrap_or_else(|| date::DEFAULT_DISPLAY_FORMAT.to_owned()),
            clean: project.clean.unwrap_or(true),
        }
    }
}

/// Represents the result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project file.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the project file exists but can't be read.
    #[error("opening project file `{}`: {err}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the project file isn't valid.
    #[error("parsing project file `{}`: {err}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when `date_format` isn't a valid chrono format string.
    #[error("invalid date_format `{0}`")]
    DateFormat(String),

    /// Returned when an output directory overlaps a source directory.
    #[error(
        "output directory `{}` overlaps source directory `{}`",
        .output.display(),
        .input.display()
    )]
    Overlap { output: PathBuf, input: PathBuf },
}
