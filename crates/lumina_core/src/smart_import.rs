//! crates/lumina_core/src/smart_import.rs
//!
//! Turns what the collaborators find (uploaded-file metadata, online search
//! candidates) into a pre-filled [`NewBook`] draft for the user to confirm.

use once_cell::sync::Lazy;
use regex::Regex;

use std::path::Path;
use tracing::debug;

use crate::domain::{Genre, NewBook};
use crate::ports::{DocumentMetadata, MetadataExtractor, PortResult, SearchCandidate};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

// More specific keys come first so that "non-fiction" is not read as "fiction".
const HINT_ORDER: [Genre; 10] = [
    Genre::NonFiction,
    Genre::SciFi,
    Genre::SelfHelp,
    Genre::Fiction,
    Genre::Fantasy,
    Genre::Mystery,
    Genre::Romance,
    Genre::Classic,
    Genre::Biography,
    Genre::Theology,
];

impl Genre {
    /// Maps a free-text category to a genre by substring match on the genre
    /// keys, defaulting to fiction.
    pub fn from_hint(hint: &str) -> Genre {
        let hint = hint.to_lowercase();
        HINT_ORDER
            .into_iter()
            .find(|genre| hint.contains(genre.as_str()))
            .unwrap_or_default()
    }
}

/// Removes markup and collapses the whitespace it leaves behind.
pub fn strip_html(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl From<DocumentMetadata> for NewBook {
    fn from(meta: DocumentMetadata) -> Self {
        NewBook {
            title: meta.title.unwrap_or_default(),
            author: meta.author.unwrap_or_default(),
            total_pages: meta.page_count.unwrap_or_default(),
            total_chapters: meta.chapter_titles.len() as u32,
            chapter_titles: meta.chapter_titles,
            ..Default::default()
        }
    }
}

impl From<SearchCandidate> for NewBook {
    fn from(candidate: SearchCandidate) -> Self {
        NewBook {
            title: candidate.title.unwrap_or_default(),
            author: candidate.authors.join(", "),
            cover: candidate
                .cover_url
                .map(|url| match url.strip_prefix("http://") {
                    Some(rest) => format!("https://{}", rest),
                    None => url,
                }),
            total_pages: candidate.page_count.unwrap_or_default(),
            genre: candidate
                .genre_hint
                .as_deref()
                .map(Genre::from_hint)
                .unwrap_or_default(),
            description: candidate
                .description
                .as_deref()
                .map(strip_html)
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Builds a draft from an uploaded document. When the extractor finds no
/// title, the file name without its extension is used instead.
pub async fn draft_from_upload(
    extractor: &dyn MetadataExtractor,
    file_name: &str,
    data: &[u8],
) -> PortResult<NewBook> {
    let mut draft: NewBook = extractor
        .extract(file_name, data)
        .await?
        .map(NewBook::from)
        .unwrap_or_default();
    if draft.title.trim().is_empty() {
        draft.title = Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file_name)
            .to_string();
    }
    debug!("Draft from '{}': {} chapters", file_name, draft.total_chapters);
    Ok(draft)
}
