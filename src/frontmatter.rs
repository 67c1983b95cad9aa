//! Splits a post source file into its metadata header and its Markdown body.
//!
//! A header is delimited by fence lines. YAML headers are fenced by `---` and
//! TOML headers by `+++`; the opening fence must be the first line of the file
//! and the closing fence must use the same delimiter. Fence lines must stand on
//! their own, although trailing whitespace (including `\r`) is tolerated.
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 2024-03-01
//! ---
//! # Hello
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// The structured-data language of a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn fence(self) -> &'static str {
        match self {
            Format::Yaml => "---",
            Format::Toml => "+++",
        }
    }

    fn from_fence(line: &str) -> Option<Format> {
        match line.trim_end() {
            "---" => Some(Format::Yaml),
            "+++" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// A source document cut at its fences. Both halves borrow from the input.
#[derive(Debug, PartialEq, Eq)]
pub struct Split<'a> {
    pub format: Format,

    /// The text between the fences, not including the fence lines.
    pub header: &'a str,

    /// Everything after the closing fence line, unchanged.
    pub body: &'a str,
}

/// Locates the header fences in `input`.
pub fn split(input: &str) -> Result<Split<'_>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input.split_inclusive('\n');
    let format = lines
        .next()
        .and_then(Format::from_fence)
        .ok_or(Error::MissingStartFence)?;

    let header_start = input.find('\n').map_or(input.len(), |i| i + 1);
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == format.fence() {
            return Ok(Split {
                format,
                header: &input[header_start..offset],
                body: &input[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(Error::MissingEndFence(format.fence()))
}

/// Splits `input` and deserializes its header into `T`. Unknown header fields
/// are ignored and missing ones take their default value as long as `T` is
/// declared with `#[serde(default)]`. A header that holds no data (blank,
/// only comments, or a YAML null) yields `T::default()`.
pub fn parse<T: DeserializeOwned + Default>(input: &str) -> Result<(T, &str)> {
    let Split {
        format,
        header,
        body,
    } = split(input)?;

    if is_blank(header) {
        return Ok((T::default(), body));
    }

    let value = match format {
        Format::Yaml => serde_yaml::from_str::<Option<T>>(header)?.unwrap_or_default(),
        Format::Toml => toml::from_str(header)?,
    };
    Ok((value, body))
}

/// Reports whether `header` has nothing but whitespace and `#` comments.
/// Both YAML and TOML use `#` for line comments.
fn is_blank(header: &str) -> bool {
    header
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

/// Deserializes a field that may be written with no value (`title:`) as the
/// field type's default instead of failing or keeping YAML's `~`.
///
/// ```ignore
/// #[serde(deserialize_with = "frontmatter::null_as_default")]
/// pub title: String,
/// ```
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The result of a front matter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a malformed header.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the first line of the source is not a fence.
    #[error("post must begin with `---` or `+++`")]
    MissingStartFence,

    /// Returned when the opening fence has no matching closing fence.
    #[error("missing closing `{0}`")]
    MissingEndFence(&'static str),

    /// Returned when a YAML header can't be deserialized.
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Returned when a TOML header can't be deserialized.
    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),
}
