//! Donor name normalization.

use crate::errors::ValidationError;

/// Trims and collapses whitespace, then fixes casing on single-case names.
///
/// `"  ALICE   smith "` becomes `"Alice Smith"` only when every letter shares
/// a case; a mixed-case name such as `"McDonald"` is kept as typed.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(ValidationError::MissingName);
    }

    let has_lower = collapsed.chars().any(char::is_lowercase);
    let has_upper = collapsed.chars().any(char::is_uppercase);
    if has_lower && has_upper {
        return Ok(collapsed);
    }

    Ok(title_case(&collapsed))
}

/// Trimmed editor id; blank ids are a `MissingField("editorId")`.
pub fn require_editor_id(editor_id: &str) -> Result<String, ValidationError> {
    let editor_id = editor_id.trim();
    if editor_id.is_empty() {
        return Err(ValidationError::MissingField("editorId".to_string()));
    }
    Ok(editor_id.to_string())
}

fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = matches!(c, ' ' | '-' | '\'' | '.');
        }
    }
    out
}
