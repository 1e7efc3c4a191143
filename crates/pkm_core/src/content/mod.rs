//! Plain-text document content model.
//!
//! # Responsibility
//! - Parse the line-oriented `# Tags` / `# Links` / `# Backlinks` sections.
//! - Rewrite tag lines and link bullet lists without touching other lines.
//!
//! # Invariants
//! - A section heading must exist for its add/remove operation to succeed.
//! - Operations are not idempotent: adding twice appends twice.

pub mod text;

pub use text::{
    add_backlinks, add_links, add_tags, format_bullet, parse_bullet, remove_backlinks,
    remove_links, remove_tags, ContentError, ContentResult, BACKLINKS_HEADING, LINKS_HEADING,
    TAGS_HEADING,
};
