//! Windows that never trigger the document-focus command.

use crate::host::WindowRef;

/// Exclusion rules for the document-focus command.
///
/// A window is excluded when its document's language is in the language
/// list (compared case-insensitively) or its caption matches one of the
/// caption globs. The default excludes XAML documents and designer views
/// (captions containing `[Design]`).
#[derive(Clone, Debug)]
pub struct FocusExclusions {
    languages: Vec<String>,
    captions: Vec<glob::Pattern>,
}

impl Default for FocusExclusions {
    fn default() -> Self {
        FocusExclusionsBuilder::new()
            .language("XAML")
            .caption_containing("[Design]")
            .build()
    }
}

impl FocusExclusions {
    /// Exclusions that exclude nothing.
    pub fn none() -> Self {
        FocusExclusionsBuilder::new().build()
    }

    /// Start building a custom rule set.
    pub fn builder() -> FocusExclusionsBuilder {
        FocusExclusionsBuilder::new()
    }

    /// Returns true if focusing `window` must not run the command.
    pub fn excludes(&self, window: &WindowRef) -> bool {
        let language_match = window
            .document
            .as_ref()
            .and_then(|d| d.language.as_deref())
            .is_some_and(|lang| self.languages.iter().any(|l| l.eq_ignore_ascii_case(lang)));

        language_match || self.captions.iter().any(|p| p.matches(&window.caption))
    }
}

/// Builder for [`FocusExclusions`].
#[derive(Clone, Debug, Default)]
pub struct FocusExclusionsBuilder {
    languages: Vec<String>,
    captions: Vec<glob::Pattern>,
}

impl FocusExclusionsBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude documents in `language`.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    /// Exclude windows whose caption matches the glob `pattern`.
    ///
    /// Invalid patterns are ignored.
    pub fn caption(mut self, pattern: &str) -> Self {
        if let Ok(p) = glob::Pattern::new(pattern) {
            self.captions.push(p);
        } else {
            tracing::warn!(pattern, "ignoring invalid caption pattern");
        }
        self
    }

    /// Exclude windows whose caption contains `text` literally.
    pub fn caption_containing(self, text: &str) -> Self {
        let pattern = format!("*{}*", glob::Pattern::escape(text));
        self.caption(&pattern)
    }

    /// Build the rule set.
    pub fn build(self) -> FocusExclusions {
        FocusExclusions {
            languages: self.languages,
            captions: self.captions,
        }
    }
}
