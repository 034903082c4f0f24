/// Sentinel line opening and closing the metadata block.
pub const SENTINEL: &str = "---";

/// Borrowed slices of a document split into front matter YAML and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatterSplit<'a> {
    pub yaml: &'a str,
    pub body: &'a str,
}

/// Splits raw markdown content into YAML front matter and body.
///
/// Returns `None` when the document is empty, does not open with the
/// sentinel line, never closes the block, or the block has no content.
/// Callers treat `None` as "not a metadata document" and skip the file.
pub fn split_front_matter(content: &str) -> Option<FrontMatterSplit<'_>> {
    let stripped = content.trim_start_matches('\u{feff}');
    if stripped.trim().is_empty() {
        return None;
    }

    let (first, rest) = next_line(stripped)?;
    if first.trim_end() != SENTINEL {
        return None;
    }

    let mut cursor = rest;
    let mut consumed = 0;
    while !cursor.is_empty() {
        let (line, tail) = next_line(cursor)?;
        if line.trim_end() == SENTINEL {
            let yaml = rest[..consumed].trim_end();
            if yaml.trim().is_empty() {
                return None;
            }
            return Some(FrontMatterSplit { yaml, body: tail });
        }
        consumed += cursor.len() - tail.len();
        cursor = tail;
    }

    None
}

/// Returns the first line (without its terminator) and everything after it.
fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(idx) => {
            let line = text[..idx].strip_suffix('\r').unwrap_or(&text[..idx]);
            Some((line, &text[idx + 1..]))
        }
        None => Some((text, "")),
    }
}
