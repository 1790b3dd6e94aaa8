//! The closed inline command vocabulary.
//!
//! Every command the hub can embed in a message body has exactly one variant
//! here, carrying its own payload type, so a command whose data disagrees
//! with its name cannot be constructed.

use {
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
};

/// Payload of the mention family: the referenced user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionData {
    pub id: String,
}

/// Payload of "tag everyone": ids that must not be tagged, in marker order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEveryoneData {
    pub except: Vec<String>,
}

/// Payload of formatting commands: the raw captured span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatData {
    pub content: String,
}

/// A parsed inline command with its typed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
pub enum Command {
    Mention(MentionData),
    InvisibleMention(MentionData),
    TagEveryone(TagEveryoneData),
    Bold(FormatData),
    Italic(FormatData),
    Underscore(FormatData),
    Strike(FormatData),
    Paragraph(FormatData),
    ListItem(FormatData),
    Monospace(FormatData),
}

impl Command {
    pub fn name(&self) -> CommandName {
        match self {
            Self::Mention(_) => CommandName::Mention,
            Self::InvisibleMention(_) => CommandName::InvisibleMention,
            Self::TagEveryone(_) => CommandName::TagEveryone,
            Self::Bold(_) => CommandName::Bold,
            Self::Italic(_) => CommandName::Italic,
            Self::Underscore(_) => CommandName::Underscore,
            Self::Strike(_) => CommandName::Strike,
            Self::Paragraph(_) => CommandName::Paragraph,
            Self::ListItem(_) => CommandName::ListItem,
            Self::Monospace(_) => CommandName::Monospace,
        }
    }

    pub fn mention(id: impl Into<String>) -> Self {
        Self::Mention(MentionData { id: id.into() })
    }

    pub fn invisible_mention(id: impl Into<String>) -> Self {
        Self::InvisibleMention(MentionData { id: id.into() })
    }

    pub fn tag_everyone<I, S>(except: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::TagEveryone(TagEveryoneData {
            except: except.into_iter().map(Into::into).collect(),
        })
    }

    /// Build a formatting command. Returns `None` for names outside the
    /// formatting family.
    pub fn format(name: CommandName, content: impl Into<String>) -> Option<Self> {
        let data = FormatData {
            content: content.into(),
        };
        let command = match name {
            CommandName::Bold => Self::Bold(data),
            CommandName::Italic => Self::Italic(data),
            CommandName::Underscore => Self::Underscore(data),
            CommandName::Strike => Self::Strike(data),
            CommandName::Paragraph => Self::Paragraph(data),
            CommandName::ListItem => Self::ListItem(data),
            CommandName::Monospace => Self::Monospace(data),
            CommandName::Mention | CommandName::InvisibleMention | CommandName::TagEveryone => {
                return None;
            },
        };
        Some(command)
    }
}

/// Fieldless mirror of [`Command`], used for lookups and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandName {
    Mention,
    InvisibleMention,
    TagEveryone,
    Bold,
    Italic,
    Underscore,
    Strike,
    Paragraph,
    ListItem,
    Monospace,
}

impl CommandName {
    /// All variants, for iteration.
    pub const ALL: &'static [CommandName] = &[
        Self::Mention,
        Self::InvisibleMention,
        Self::TagEveryone,
        Self::Bold,
        Self::Italic,
        Self::Underscore,
        Self::Strike,
        Self::Paragraph,
        Self::ListItem,
        Self::Monospace,
    ];

    /// Marker name as written inside `{...}`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mention => "mention",
            Self::InvisibleMention => "invisiblemention",
            Self::TagEveryone => "tageveryone",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underscore => "underscore",
            Self::Strike => "strike",
            Self::Paragraph => "paragraph",
            Self::ListItem => "listitem",
            Self::Monospace => "monospace",
        }
    }

    /// Resolve a marker name, including accepted aliases.
    pub fn from_marker(name: &str) -> Option<Self> {
        match name {
            "stroke" => Some(Self::Strike),
            other => Self::ALL.iter().copied().find(|n| n.as_str() == other),
        }
    }

    /// Whether the data of this command is a raw content span.
    pub fn is_formatting(self) -> bool {
        !matches!(
            self,
            Self::Mention | Self::InvisibleMention | Self::TagEveryone
        )
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown inline command: {0}")]
pub struct UnknownCommandName(pub String);

impl FromStr for CommandName {
    type Err = UnknownCommandName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_marker(s).ok_or_else(|| UnknownCommandName(s.to_string()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_names_round_trip() {
        for &name in CommandName::ALL {
            assert_eq!(name.as_str().parse::<CommandName>().unwrap(), name);
        }
    }

    #[test]
    fn stroke_is_an_alias_for_strike() {
        assert_eq!(CommandName::from_marker("stroke"), Some(CommandName::Strike));
        assert_eq!(CommandName::Strike.to_string(), "strike");
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!("Bold".parse::<CommandName>().is_err());
        assert!("MENTION".parse::<CommandName>().is_err());
    }

    #[test]
    fn format_rejects_non_formatting_names() {
        assert!(Command::format(CommandName::Mention, "x").is_none());
        assert_eq!(
            Command::format(CommandName::Bold, "x").map(|c| c.name()),
            Some(CommandName::Bold)
        );
    }

    #[test]
    fn command_name_matches_variant() {
        assert_eq!(Command::mention("u1").name(), CommandName::Mention);
        assert_eq!(
            Command::tag_everyone(["a", "b"]).name(),
            CommandName::TagEveryone
        );
        assert!(!CommandName::InvisibleMention.is_formatting());
        assert!(CommandName::ListItem.is_formatting());
    }

    #[test]
    fn command_serializes_with_name_and_data() {
        let json = serde_json::to_value(Command::tag_everyone(["u2"])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "command": "tag_everyone", "data": { "except": ["u2"] } })
        );
    }
}
