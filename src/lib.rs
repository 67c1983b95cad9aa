//! The library code for the `quire` static blog generator. A build is a single
//! pass from a source tree to an output tree:
//!
//! 1. Parsing each post source: its front matter ([`crate::frontmatter`]), its
//!    Markdown body ([`crate::markdown`]), and its date ([`crate::date`])
//! 2. Writing each post page and collecting an index entry for it
//!    ([`crate::post`])
//! 3. Sorting the entries newest first and writing the blog index
//!    ([`crate::index`])
//!
//! [`crate::build::build_site`] drives the whole thing, along with copying
//! static assets and rendering the root page. All pages are rendered through
//! Go-style templates ([`crate::write`]).
//!
//! Posts are independent of one another: a post that can't be parsed or
//! written is logged and skipped, and the rest of the site is still built.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod autolink;
pub mod build;
pub mod config;
pub mod date;
pub mod frontmatter;
pub mod htmlrenderer;
pub mod index;
pub mod markdown;
pub mod post;
pub mod value;
pub mod write;
