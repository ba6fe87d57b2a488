//! Minimal front-matter editing for Markdown documents.
//!
//! Only two things are ever done to a document: checking whether it already
//! carries a `slug` field and inserting one. Everything else in the document
//! is kept byte-for-byte.

/// Name of the injected metadata field.
pub const SLUG_FIELD: &str = "slug";

/// Front-matter delimiter line.
const DELIMITER: &str = "---";

/// Returns `true` if any line after the first one introduces the slug field.
#[must_use]
pub fn has_slug(text: &str) -> bool {
    text.split('\n')
        .skip(1)
        .any(|line| line.strip_prefix(SLUG_FIELD).is_some_and(|rest| rest.starts_with(':')))
}

/// Returns the value of the first slug field, without surrounding quotes.
#[must_use]
pub fn slug_value(text: &str) -> Option<&str> {
    text.split('\n')
        .skip(1)
        .find_map(|line| line.strip_prefix(SLUG_FIELD)?.strip_prefix(':'))
        .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|value| !value.is_empty())
}

/// Inserts `slug: "<id>"` into the document's front matter.
///
/// If the document opens with a `---` line, the field is placed on its own
/// line directly before the matching closing `---`. Otherwise a minimal
/// block holding only the field is prepended. Documents that already carry
/// a slug are returned unchanged. Quote characters in `id` are stripped.
#[must_use]
pub fn inject_slug(text: &str, id: &str) -> String {
    if has_slug(text) {
        return text.to_string();
    }

    let value: String = id.chars().filter(|c| *c != '"').collect();
    let field = format!("{SLUG_FIELD}: \"{value}\"");

    if let Some((close, newline)) = closing_delimiter(text) {
        let mut out = String::with_capacity(text.len() + field.len() + newline.len());
        out.push_str(&text[..close]);
        out.push_str(&field);
        out.push_str(newline);
        out.push_str(&text[close..]);
        return out;
    }

    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    format!("{DELIMITER}{newline}{field}{newline}{DELIMITER}{newline}{text}")
}

/// Locates the closing delimiter of a leading front-matter block.
///
/// Returns the byte offset where the closing line starts and the newline
/// sequence used by the opening line, or `None` if the document has no
/// complete block.
fn closing_delimiter(text: &str) -> Option<(usize, &'static str)> {
    let first_end = text.find('\n')?;
    let first_line = &text[..first_end];
    let newline = if first_line.ends_with('\r') { "\r\n" } else { "\n" };
    if first_line.trim_end() != DELIMITER {
        return None;
    }

    let mut pos = first_end + 1;
    while pos <= text.len() {
        let rest = &text[pos..];
        let line_len = rest.find('\n').unwrap_or(rest.len());
        if rest[..line_len].trim_end() == DELIMITER {
            return Some((pos, newline));
        }
        if line_len == rest.len() {
            break;
        }
        pos += line_len + 1;
    }
    None
}
