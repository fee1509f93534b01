//! Maps a user-supplied name, possibly partial, to a concrete document
//! identifier using the list of known maps, falling back to a synthesized
//! direct path when nothing matches.

/// What a command handler actually receives as its "name" argument.
///
/// Hosts sometimes invoke commands from UI interactions, in which case the
/// argument slot carries an event object rather than text; that case is an
/// explicit "no name supplied".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    Tokens(Vec<String>),
    /// An interaction-event placeholder. Never a name.
    Interaction,
}

/// Collapses free text, word tokens, or an interaction event into a single
/// trimmed identifier, or an explicit absence.
pub fn normalize_input(raw: &RawInput) -> Option<String> {
    let text = match raw {
        RawInput::Text(s) => s.clone(),
        RawInput::Tokens(tokens) => tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        RawInput::Interaction => return None,
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolves `term` against the known-maps list.
///
/// A known entry matches, case-insensitively, when `term` equals the full
/// identifier, its filename, or its filename without the `.json` suffix;
/// the first match in list order is returned verbatim. With no match,
/// `term` is treated as a direct path (appending `.json` when absent) —
/// a deliberate escape hatch for documents outside the discovered listing.
pub fn resolve(term: &str, known: &[String]) -> String {
    let needle = term.trim().to_ascii_lowercase();

    for entry in known {
        let entry_lower = entry.to_ascii_lowercase();
        if entry_lower == needle {
            return entry.clone();
        }
        let filename = entry_lower.rsplit('/').next().unwrap_or(&entry_lower);
        if filename == needle {
            return entry.clone();
        }
        if let Some(stem) = filename.strip_suffix(".json") {
            if stem == needle {
                return entry.clone();
            }
        }
    }

    if term.trim().to_ascii_lowercase().ends_with(".json") {
        term.trim().to_string()
    } else {
        format!("{}.json", term.trim())
    }
}
