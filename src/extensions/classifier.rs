//! Trust classification of script contexts.

use serde::{Deserialize, Serialize};

/// How much the extension system trusts a script context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    Unspecified,
    WebPage,
    ContentScript,
    BlessedExtension,
    UnblessedExtension,
}

/// Facts about a new context, gathered once at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationInput {
    pub is_content_script_group: bool,
    pub extension_known: bool,
    pub is_sandboxed_page: bool,
    pub extension_active_in_process: bool,
    pub bindings_allowed_for_url: bool,
    pub url_is_valid: bool,
}

/// Classify a context. Pure; the result is cached on the context entry
/// and never recomputed.
pub fn classify(input: ClassificationInput) -> Classification {
    if input.is_content_script_group {
        return if input.extension_known {
            Classification::ContentScript
        } else {
            Classification::Unspecified
        };
    }

    // Sandboxing beats activity: a sandboxed page of an active extension
    // is still a web page.
    if input.is_sandboxed_page {
        return Classification::WebPage;
    }

    if input.extension_active_in_process {
        return Classification::BlessedExtension;
    }

    if input.bindings_allowed_for_url {
        return if input.extension_known {
            Classification::UnblessedExtension
        } else {
            Classification::Unspecified
        };
    }

    if input.url_is_valid {
        Classification::WebPage
    } else {
        Classification::Unspecified
    }
}
