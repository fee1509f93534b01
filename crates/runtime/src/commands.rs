//! The command surface handed to the host's command-registration facility,
//! and the shared raw-argument parser.
//!
//! Hosts pass a single raw argument string; inline `key=value` tokens
//! (values optionally double-quoted) are extracted anywhere in it and the
//! remaining tokens, joined by single spaces, form the primary name.

/// Registration data for one chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
}

/// Every command this extension registers with the host.
pub fn command_specs() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "showmap",
            aliases: &["map"],
            usage: "showmap [name]",
            description: "Load and render a map by name or direct path.",
        },
        CommandSpec {
            name: "showmap_sound",
            aliases: &[],
            usage: "showmap_sound [name] [sound=alt]",
            description: "Play a map's ambient sound, or an explicit override.",
        },
        CommandSpec {
            name: "stopsound",
            aliases: &[],
            usage: "stopsound",
            description: "Stop the ambient sound overlay.",
        },
        CommandSpec {
            name: "showmap_image",
            aliases: &[],
            usage: "showmap_image [name] [size=N]",
            description: "Show an image overlay, optionally sized as a percentage.",
        },
        CommandSpec {
            name: "stopimage",
            aliases: &[],
            usage: "stopimage",
            description: "Hide the image overlay.",
        },
        CommandSpec {
            name: "showmap_video",
            aliases: &[],
            usage: "showmap_video [name] [muted=0|1] [loop=0|1] [size=N]",
            description: "Play a video overlay.",
        },
        CommandSpec {
            name: "stopvideo",
            aliases: &[],
            usage: "stopvideo",
            description: "Stop the video overlay.",
        },
    ]
}

/// Resolves a typed command name (or alias) to its canonical name.
pub fn canonical_command(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    command_specs().into_iter().find_map(|spec| {
        if spec.name == lower || spec.aliases.contains(&lower.as_str()) {
            Some(spec.name)
        } else {
            None
        }
    })
}

/// What handlers always produce: either a success message or a reported
/// failure. No error ever escapes a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Ok(String),
    Reported(String),
}

impl CommandOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandOutcome::Ok(_))
    }

    pub fn message(&self) -> &str {
        match self {
            CommandOutcome::Ok(msg) | CommandOutcome::Reported(msg) => msg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedArgs {
    pub name: Option<String>,
    /// In appearance order; later duplicates win via [`option`](Self::option).
    pub options: Vec<(String, String)>,
}

impl ParsedArgs {
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `0`/`false` and `1`/`true`; anything else is treated as unset.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.option(key)? {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<u8> {
        self.option(key)?.parse().ok()
    }
}

pub fn parse_command_args(raw: &str) -> ParsedArgs {
    let mut name_tokens: Vec<String> = Vec::new();
    let mut options: Vec<(String, String)> = Vec::new();

    for token in tokenize(raw) {
        match split_key_value(&token) {
            Some((key, value)) => options.push((key, value)),
            None => name_tokens.push(strip_quotes(&token).to_string()),
        }
    }

    let name = if name_tokens.is_empty() {
        None
    } else {
        Some(name_tokens.join(" "))
    };
    ParsedArgs { name, options }
}

/// Splits on whitespace, keeping double-quoted runs intact.
fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in raw.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// `key=value` with an identifier-shaped key; the value may be quoted.
fn split_key_value(token: &str) -> Option<(String, String)> {
    let (key, value) = token.split_once('=')?;
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    Some((key.to_ascii_lowercase(), strip_quotes(value).to_string()))
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::{CommandOutcome, canonical_command, command_specs, parse_command_args};
    use pretty_assertions::assert_eq;

    #[test]
    fn name_tokens_and_options_interleave() {
        let parsed = parse_command_args("old size=50 town muted=0");
        assert_eq!(parsed.name.as_deref(), Some("old town"));
        assert_eq!(parsed.number("size"), Some(50));
        assert_eq!(parsed.flag("muted"), Some(false));
    }

    #[test]
    fn quoted_values_and_names_keep_their_spaces() {
        let parsed = parse_command_args(r#""old town" sound="forest ambience""#);
        assert_eq!(parsed.name.as_deref(), Some("old town"));
        assert_eq!(parsed.option("sound"), Some("forest ambience"));
    }

    #[test]
    fn later_duplicate_keys_win() {
        let parsed = parse_command_args("city size=20 size=80");
        assert_eq!(parsed.number("size"), Some(80));
    }

    #[test]
    fn tokens_without_identifier_keys_stay_in_the_name() {
        // An '=' inside a quoted name is not an option.
        let parsed = parse_command_args(r#""a=b" city"#);
        assert_eq!(parsed.name.as_deref(), Some("a=b city"));

        let parsed = parse_command_args("");
        assert_eq!(parsed.name, None);
        assert!(parsed.options.is_empty());
    }

    #[test]
    fn malformed_flag_values_read_as_unset() {
        let parsed = parse_command_args("clip muted=maybe size=huge");
        assert_eq!(parsed.flag("muted"), None);
        assert_eq!(parsed.number("size"), None);
    }

    #[test]
    fn every_registered_command_resolves_to_itself() {
        for spec in command_specs() {
            assert_eq!(canonical_command(spec.name), Some(spec.name));
            for alias in spec.aliases {
                assert_eq!(canonical_command(alias), Some(spec.name));
            }
        }
        assert_eq!(canonical_command("SHOWMAP"), Some("showmap"));
        assert_eq!(canonical_command("unknown"), None);
    }

    #[test]
    fn outcome_exposes_its_message_either_way() {
        assert!(CommandOutcome::Ok("done".into()).is_ok());
        assert_eq!(CommandOutcome::Reported("bad".into()).message(), "bad");
    }
}
