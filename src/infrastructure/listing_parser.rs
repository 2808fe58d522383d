//! Identifier extraction from the monster listing markup.
//!
//! Listing rows carry a cell with `class="mvp"` whose anchor links to
//! `/database/monster/{id}/{slug}`. A plain substring scan is enough here;
//! the page structure is stable and we only need the hrefs.

use crate::application::ports::outbound::ListingParserPort;

const ROW_MARKER: &str = "class=\"mvp\"";
const HREF_ATTR: &str = "href=\"";

pub struct MvpRowParser;

impl ListingParserPort for MvpRowParser {
    fn extract_ids(&self, html: &str) -> Vec<String> {
        let mut ids = Vec::new();
        let mut from = 0;
        while let Some(pos) = html[from..].find(ROW_MARKER) {
            let marker = from + pos;
            from = marker + ROW_MARKER.len();
            if let Some(href) = first_href(&html[from..]) {
                if let Some(id) = monster_id_from_href(href) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }
}

/// The first href attribute value after the row marker.
fn first_href(s: &str) -> Option<&str> {
    let start = s.find(HREF_ATTR)? + HREF_ATTR.len();
    let end = s[start..].find('"')?;
    Some(&s[start..start + end])
}

/// `/database/monster/1039/baphomet` -> `1039` (second-to-last segment).
fn monster_id_from_href(href: &str) -> Option<&str> {
    let mut segments = href.trim_end_matches('/').rsplit('/');
    segments.next()?;
    let id = segments.next()?;
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}
