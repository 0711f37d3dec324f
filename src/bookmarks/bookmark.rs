//! Bookmark value type and its on-disk line format.

/// A named, located shortcut.
///
/// Identity is by URI; the label is an optional custom display name and the
/// icon is display-only state that never reaches the bookmarks file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    uri: String,
    label: Option<String>,
    icon: Option<String>,
}

impl Bookmark {
    /// Create a bookmark with no custom name.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: None,
            icon: None,
        }
    }

    /// Create a bookmark with a custom display name.
    pub fn with_label(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: Some(label.into()),
            icon: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Whether the user gave this bookmark a custom name. Bookmarks with a
    /// custom name serialize as `<uri> <label>` for compatibility with the
    /// old two-field format.
    pub fn has_custom_name(&self) -> bool {
        self.label.is_some()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    /// Name shown in the sidebar: the custom label if set, otherwise the
    /// last path segment of the URI.
    pub fn display_name(&self) -> &str {
        if let Some(label) = self.label.as_deref() {
            return label;
        }
        self.uri
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(&self.uri)
    }

    /// Structural match used by `contains`: same URI.
    pub fn same_uri(&self, other: &Bookmark) -> bool {
        self.uri == other.uri
    }

    /// Parse one line of the bookmarks file.
    ///
    /// The URI runs up to the first space; anything after it is a custom
    /// label (which may itself contain spaces). Empty lines and lines
    /// starting with a space are not bookmarks.
    pub fn parse_line(line: &str) -> Option<Bookmark> {
        if line.is_empty() || line.starts_with(' ') {
            return None;
        }
        match line.split_once(' ') {
            Some((uri, label)) => Some(Bookmark::with_label(uri, label)),
            None => Some(Bookmark::new(line)),
        }
    }

    /// Render this bookmark as one line (without trailing newline).
    pub fn to_line(&self) -> String {
        match &self.label {
            Some(label) => format!("{} {}", self.uri, label),
            None => self.uri.clone(),
        }
    }
}
