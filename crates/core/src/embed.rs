//! Document URL to embed URL translation.
//!
//! The embed viewer renders every page of a document inside one scroller,
//! which is what the load verifier and the print trigger work against.

use thiserror::Error;
use url::Url;

const EMBED_BASE: &str = "https://www.scribd.com/embeds";
const DOCUMENT_SEGMENT: &str = "document";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedUrlError {
    #[error("Please enter a URL")]
    Empty,
    #[error("Invalid Scribd URL. Must contain /document/ID")]
    Invalid { input: String },
}

/// Translates a document page URL into its embed URL.
///
/// `https://www.scribd.com/document/123456789/Some-Title` becomes
/// `https://www.scribd.com/embeds/123456789/content`. Inputs without a scheme
/// are accepted; anything without a `document/<digits>` path on a scribd host
/// is rejected.
pub fn to_embed_url(input: &str) -> Result<String, EmbedUrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(EmbedUrlError::Empty);
    }

    let invalid = || EmbedUrlError::Invalid {
        input: input.to_string(),
    };

    let url = parse_lenient(input).ok_or_else(invalid)?;
    if !is_scribd_host(&url) {
        return Err(invalid());
    }

    document_id(&url)
        .map(|id| format!("{}/{}/content", EMBED_BASE, id))
        .ok_or_else(invalid)
}

/// Whether a URL already points at an embed viewer page.
pub fn is_embed_url(url: &str) -> bool {
    url.contains("/embeds/") && url.contains("/content")
}

fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", input)).ok()
        }
        Err(_) => None,
    }
}

fn is_scribd_host(url: &Url) -> bool {
    url.host_str()
        .map(|h| h.to_ascii_lowercase())
        .is_some_and(|h| h == "scribd.com" || h.ends_with(".scribd.com"))
}

fn document_id(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments.windows(2).find_map(|pair| {
        if pair[0] != DOCUMENT_SEGMENT {
            return None;
        }
        // Leading digits only, so `/document/123abc` still yields `123`.
        let id: String = pair[1].chars().take_while(|c| c.is_ascii_digit()).collect();
        (!id.is_empty()).then_some(id)
    })
}
