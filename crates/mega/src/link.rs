//! Mega.nz public link parsing and validation

use std::sync::OnceLock;

use regex::Regex;

/// Matches public links of the form
/// `https://mega.nz/file/<id>#<key>` or `https://mega.nz/folder/<id>#<key>`.
fn link_regex() -> &'static Regex {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    LINK_RE.get_or_init(|| {
        Regex::new(r"https://mega\.nz/(file|folder)/[A-Za-z0-9_-]+#[A-Za-z0-9_-]+")
            .expect("link regex is valid")
    })
}

/// Kind of content a Mega link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Single file link
    File,
    /// Folder link, may expand to many files
    Folder,
}

/// A validated public Mega.nz link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MegaLink {
    url: String,
    kind: LinkKind,
}

impl MegaLink {
    /// Find the first well-formed public link in free-form message text
    ///
    /// Links embedded in surrounding text are accepted. Links missing the
    /// `#key` fragment, or in the legacy `#!` format, are rejected.
    pub fn find(text: &str) -> Option<MegaLink> {
        let m = link_regex().find(text.trim())?;
        let url = m.as_str().to_string();
        let kind = if url.contains("/folder/") {
            LinkKind::Folder
        } else {
            LinkKind::File
        };
        Some(MegaLink { url, kind })
    }

    /// The matched URL, exactly as it will be passed to megadl
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }
}

impl std::fmt::Display for MegaLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Check whether message text contains a public Mega.nz link
pub fn is_mega_link(text: &str) -> bool {
    link_regex().is_match(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_file_link() {
        let link = MegaLink::find("https://mega.nz/file/AbC123-_#dEf456-_").unwrap();
        assert_eq!(link.kind(), LinkKind::File);
        assert_eq!(link.as_str(), "https://mega.nz/file/AbC123-_#dEf456-_");
    }

    #[test]
    fn test_find_folder_link() {
        let link = MegaLink::find("https://mega.nz/folder/AbC123#dEf456").unwrap();
        assert_eq!(link.kind(), LinkKind::Folder);
    }

    #[test]
    fn test_find_embedded_in_text() {
        let text = "please grab https://mega.nz/file/AbC123#dEf456 for me";
        let link = MegaLink::find(text).unwrap();
        assert_eq!(link.as_str(), "https://mega.nz/file/AbC123#dEf456");
    }

    #[test]
    fn test_rejects_missing_key() {
        // No decryption key fragment
        assert!(MegaLink::find("https://mega.nz/file/AbC123").is_none());
        assert!(MegaLink::find("https://mega.nz/file/AbC123#").is_none());
    }

    #[test]
    fn test_rejects_other_shapes() {
        // Legacy format
        assert!(MegaLink::find("https://mega.nz/#!AbC123!dEf456").is_none());
        // Different host
        assert!(MegaLink::find("https://example.com/file/AbC123#dEf456").is_none());
        // Not a link at all
        assert!(MegaLink::find("hello world").is_none());
    }

    #[test]
    fn test_is_mega_link() {
        assert!(is_mega_link("  https://mega.nz/file/AbC123#dEf456  "));
        assert!(!is_mega_link("magnet:?xt=urn:btih:abc123"));
        assert!(!is_mega_link(""));
    }
}
