//! Rewriting media references in field text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::manifest::MediaMap;
use crate::error_handling::{ConversionStats, WarningType};

static SOUND_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[sound:([^\]]+)\]").expect("Failed to compile sound reference regex - this is a bug")
});

static IMG_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']?([^"'\s>]+)["']?[^>]*>"#)
        .expect("Failed to compile image reference regex - this is a bug")
});

/// Replaces `[sound:NAME]` and `<img src="NAME">` references with the
/// extracted file's link.
///
/// Must run before HTML stripping, which would otherwise remove `<img>` tags.
/// References to files that were not extracted are left untouched and counted
/// as unresolved.
pub fn resolve_media_refs<'a>(
    text: &'a str,
    media: &MediaMap,
    stats: &ConversionStats,
) -> Cow<'a, str> {
    if !text.contains("[sound:") && !text.to_ascii_lowercase().contains("<img") {
        return Cow::Borrowed(text);
    }

    let mut replace = |caps: &Captures| -> String {
        match media.link(&caps[1]) {
            Some(link) => link.to_string(),
            None => {
                stats.increment_warning(WarningType::UnresolvedMediaRef);
                caps[0].to_string()
            }
        }
    };

    let sounds = SOUND_REF.replace_all(text, &mut replace);
    let images = match IMG_REF.replace_all(&sounds, &mut replace) {
        Cow::Borrowed(_) => None,
        Cow::Owned(s) => Some(s),
    };
    match images {
        Some(s) => Cow::Owned(s),
        None => sounds,
    }
}
