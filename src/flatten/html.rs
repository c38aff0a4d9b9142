//! HTML stripping for field values.

use scraper::Html;

/// Removes markup from a field value, keeping its text.
///
/// Text nodes are trimmed, empty ones dropped, and the rest joined with a
/// single space, so `<div>a</div><div>b</div>` becomes `a b`. Values without a
/// `<` are returned unchanged (entities in plain text are not decoded).
///
/// Stripping repeats until the output stops changing, so decoded entities
/// that themselves look like markup are removed too and
/// `strip_html(strip_html(x)) == strip_html(x)`. A pass that changes the
/// text always shortens it, so the loop terminates.
pub fn strip_html(text: &str) -> String {
    let mut current = strip_once(text);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    if !text.contains('<') {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(text);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
