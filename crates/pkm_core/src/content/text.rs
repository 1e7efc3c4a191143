//! Section-aware rewriting of document content.
//!
//! Content is split on `\n`. The line after `# Tags` holds comma-separated
//! labels. The lines after `# Links` / `# Backlinks` that start with `- `
//! form a bullet run; each bullet reads `- (<label>)[<target>]`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TAGS_HEADING: &str = "# Tags";
pub const LINKS_HEADING: &str = "# Links";
pub const BACKLINKS_HEADING: &str = "# Backlinks";

const SECTION_HEADINGS: [&str; 3] = [TAGS_HEADING, LINKS_HEADING, BACKLINKS_HEADING];
const BULLET_PREFIX: &str = "- ";
const TAG_SEPARATOR: &str = ",";

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- \((.*?)\)\[(.*)\]$").expect("valid bullet regex"));

pub type ContentResult<T> = Result<T, ContentError>;

/// Failure of one content rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// A required section heading is missing.
    DocumentSyntax { heading: &'static str },
    /// The requested mutation cannot change anything.
    IneffectiveOperation(&'static str),
    /// An input value at `index` is the empty string.
    NilInput { index: usize },
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentSyntax { heading } => {
                write!(f, "document syntax error: missing `{heading}` heading")
            }
            Self::IneffectiveOperation(reason) => write!(f, "ineffective operation: {reason}"),
            Self::NilInput { index } => write!(f, "input value at index {index} is empty"),
        }
    }
}

impl Error for ContentError {}

/// Appends `tags` to the tag line below `# Tags`.
///
/// Existing labels are kept and no deduplication happens. When the heading is
/// the last line, or is directly followed by another section heading, a new
/// tag line is inserted.
pub fn add_tags<S: AsRef<str>>(content: &str, tags: &[S]) -> ContentResult<String> {
    let values = validate_input(content, tags)?;
    let mut lines = split_lines(content);
    let tag_line = find_heading(&lines, TAGS_HEADING)? + 1;
    let addition = values.join(TAG_SEPARATOR);

    let updated = match lines.get(tag_line) {
        Some(line) if !is_section_heading(line) => Some(if line.is_empty() {
            addition.clone()
        } else {
            format!("{line}{TAG_SEPARATOR}{addition}")
        }),
        _ => None,
    };
    match updated {
        Some(line) => lines[tag_line] = line,
        None => lines.insert(tag_line, addition),
    }

    Ok(lines.join("\n"))
}

/// Removes every label listed in `tags` from the tag line below `# Tags`.
///
/// Fails with [`ContentError::IneffectiveOperation`] when none of `tags` is
/// present on the tag line.
pub fn remove_tags<S: AsRef<str>>(content: &str, tags: &[S]) -> ContentResult<String> {
    let values = validate_input(content, tags)?;
    let mut lines = split_lines(content);
    let tag_line = find_heading(&lines, TAGS_HEADING)? + 1;

    let current = match lines.get(tag_line) {
        Some(line) if !is_section_heading(line) => line.as_str(),
        _ => return Err(ContentError::IneffectiveOperation("document has no tag line")),
    };

    let removal: HashSet<&str> = values.into_iter().collect();
    let labels: Vec<&str> = current.split(TAG_SEPARATOR).collect();
    let kept: Vec<&str> = labels
        .iter()
        .copied()
        .filter(|label| !removal.contains(label))
        .collect();
    if kept.len() == labels.len() {
        return Err(ContentError::IneffectiveOperation("none of the tags are present"));
    }

    let updated = kept.join(TAG_SEPARATOR);
    lines[tag_line] = updated;
    Ok(lines.join("\n"))
}

/// Inserts one `- (v)[v]` bullet per link after the `# Links` bullet run.
pub fn add_links<S: AsRef<str>>(content: &str, links: &[S]) -> ContentResult<String> {
    add_bullets(content, LINKS_HEADING, links)
}

/// Drops bullets targeting any of `links` from the `# Links` bullet run.
pub fn remove_links<S: AsRef<str>>(content: &str, links: &[S]) -> ContentResult<String> {
    remove_bullets(content, LINKS_HEADING, links)
}

/// Inserts one `- (v)[v]` bullet per backlink after the `# Backlinks` bullet run.
pub fn add_backlinks<S: AsRef<str>>(content: &str, backlinks: &[S]) -> ContentResult<String> {
    add_bullets(content, BACKLINKS_HEADING, backlinks)
}

/// Drops bullets targeting any of `backlinks` from the `# Backlinks` bullet run.
pub fn remove_backlinks<S: AsRef<str>>(content: &str, backlinks: &[S]) -> ContentResult<String> {
    remove_bullets(content, BACKLINKS_HEADING, backlinks)
}

/// Formats one link bullet line.
pub fn format_bullet(label: &str, target: &str) -> String {
    format!("{BULLET_PREFIX}({label})[{target}]")
}

/// Parses `- (<label>)[<target>]` into `(label, target)`.
pub fn parse_bullet(line: &str) -> Option<(&str, &str)> {
    let captures = BULLET_RE.captures(line)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

fn add_bullets<S: AsRef<str>>(
    content: &str,
    heading: &'static str,
    values: &[S],
) -> ContentResult<String> {
    let values = validate_input(content, values)?;
    let mut lines = split_lines(content);
    let heading_index = find_heading(&lines, heading)?;
    let (_, run_end) = bullet_run(&lines, heading_index);

    let bullets = values
        .into_iter()
        .map(|value| format_bullet(value, value))
        .collect::<Vec<_>>();
    lines.splice(run_end..run_end, bullets);

    Ok(lines.join("\n"))
}

fn remove_bullets<S: AsRef<str>>(
    content: &str,
    heading: &'static str,
    values: &[S],
) -> ContentResult<String> {
    let values = validate_input(content, values)?;
    let mut lines = split_lines(content);
    let heading_index = find_heading(&lines, heading)?;
    let (run_start, run_end) = bullet_run(&lines, heading_index);

    let removal: HashSet<&str> = values.into_iter().collect();
    let run = &lines[run_start..run_end];
    let kept = run
        .iter()
        .filter(|line| !parse_bullet(line).is_some_and(|(_, target)| removal.contains(target)))
        .cloned()
        .collect::<Vec<_>>();
    if kept.len() == run.len() {
        return Err(ContentError::IneffectiveOperation("none of the links are present"));
    }

    // An emptied run still occupies one blank line.
    if kept.is_empty() {
        lines.splice(run_start..run_end, std::iter::once(String::new()));
    } else {
        lines.splice(run_start..run_end, kept);
    }

    Ok(lines.join("\n"))
}

fn validate_input<'a, S: AsRef<str>>(
    content: &str,
    values: &'a [S],
) -> ContentResult<Vec<&'a str>> {
    if content.is_empty() {
        return Err(ContentError::IneffectiveOperation("document is empty"));
    }
    if values.is_empty() {
        return Err(ContentError::IneffectiveOperation("no values given"));
    }

    let mut validated = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(ContentError::NilInput { index });
        }
        validated.push(value);
    }
    Ok(validated)
}

fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(str::to_string).collect()
}

/// Returns the index of the first line equal to `heading`.
fn find_heading(lines: &[String], heading: &'static str) -> ContentResult<usize> {
    lines
        .iter()
        .position(|line| line == heading)
        .ok_or(ContentError::DocumentSyntax { heading })
}

/// Returns the half-open range of bullet lines right after `heading_index`.
fn bullet_run(lines: &[String], heading_index: usize) -> (usize, usize) {
    let start = heading_index + 1;
    let len = lines
        .get(start..)
        .unwrap_or_default()
        .iter()
        .take_while(|line| line.starts_with(BULLET_PREFIX))
        .count();
    (start, start + len)
}

fn is_section_heading(line: &str) -> bool {
    SECTION_HEADINGS.contains(&line)
}
