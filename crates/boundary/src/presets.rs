//! Ready-made command registries for common markup flavours.
//!
//! Each preset returns a [`CommandRegistryBuilder`] with the mention and
//! formatting commands filled in. `tageveryone` needs to know who is in a
//! chat, so it is left to the caller; see [`TagEveryone`].

use {
    async_trait::async_trait,
    hublink_inline::{
        CommandHandler, CommandRegistry, CommandRegistryBuilder, Companion, FormatData,
        MentionData, Resolved, TagEveryoneData,
    },
    hublink_protocol::SendMessagePayload,
    std::{collections::HashMap, fmt, str::FromStr},
};

/// Markup a preset renders formatting commands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Markup {
    /// WhatsApp-style: `*bold*`, `_italic_`, `~strike~`, ```` ```mono``` ````.
    #[default]
    Markdown,
    /// Telegram-style HTML with escaped content.
    Html,
    /// Formatting dropped, content kept.
    Plain,
}

impl Markup {
    pub const ALL: [Self; 3] = [Self::Markdown, Self::Html, Self::Plain];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Plain => "plain",
        }
    }

    pub fn builder<C: Sync + 'static>(self) -> CommandRegistryBuilder<C> {
        match self {
            Self::Markdown => markdown(),
            Self::Html => html(),
            Self::Plain => plain(),
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Markup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown markup `{s}`"))
    }
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// Surrounds content with fixed markers, optionally escaping it first.
#[derive(Debug, Clone, Copy)]
pub struct Wrap {
    open: &'static str,
    close: &'static str,
    escape: fn(&str) -> String,
}

impl Wrap {
    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close,
            escape: str::to_string,
        }
    }

    pub const fn escaped(
        open: &'static str,
        close: &'static str,
        escape: fn(&str) -> String,
    ) -> Self {
        Self {
            open,
            close,
            escape,
        }
    }
}

#[async_trait]
impl<C: Sync> CommandHandler<FormatData, C> for Wrap {
    async fn handle(
        &self,
        companion: Companion,
        data: &FormatData,
        _context: &C,
    ) -> anyhow::Result<Resolved> {
        let text = format!("{}{}{}", self.open, (self.escape)(&data.content), self.close);
        Ok(Resolved::new(companion, text))
    }
}

/// Records the id as mentioned; renders `@id` unless invisible.
#[derive(Debug, Clone, Copy)]
pub struct AtMention {
    visible: bool,
}

impl AtMention {
    pub const fn visible() -> Self {
        Self { visible: true }
    }

    pub const fn invisible() -> Self {
        Self { visible: false }
    }
}

#[async_trait]
impl<C: Sync> CommandHandler<MentionData, C> for AtMention {
    async fn handle(
        &self,
        companion: Companion,
        data: &MentionData,
        _context: &C,
    ) -> anyhow::Result<Resolved> {
        let text = if self.visible {
            format!("@{}", data.id)
        } else {
            String::new()
        };
        Ok(Resolved::new(companion.with_mention(data.id.clone()), text))
    }
}

/// Envelope types that know which chat they address.
pub trait ChatContext {
    fn chat_id(&self) -> &str;
}

impl ChatContext for SendMessagePayload {
    fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

/// Looks up who is in a chat.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn members(&self, chat_id: &str) -> anyhow::Result<Vec<String>>;
}

/// Fixed chat membership, keyed by chat id.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    chats: HashMap<String, Vec<String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_chat(
        mut self,
        chat_id: impl Into<String>,
        members: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.chats
            .insert(chat_id.into(), members.into_iter().map(Into::into).collect());
        self
    }
}

#[async_trait]
impl ContactDirectory for StaticDirectory {
    async fn members(&self, chat_id: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.chats.get(chat_id).cloned().unwrap_or_default())
    }
}

/// Mentions every member of the addressed chat except the listed ids and
/// anyone an earlier command in the body already mentioned.
///
/// Each member is appended to the companion in directory order. The
/// replacement text is `@id` for each, space separated, or empty when
/// `invisible` is set.
pub struct TagEveryone<D> {
    directory: D,
    visible: bool,
}

impl<D: ContactDirectory> TagEveryone<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            visible: true,
        }
    }

    #[must_use]
    pub fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[async_trait]
impl<C, D> CommandHandler<TagEveryoneData, C> for TagEveryone<D>
where
    C: ChatContext + Sync,
    D: ContactDirectory,
{
    async fn handle(
        &self,
        companion: Companion,
        data: &TagEveryoneData,
        context: &C,
    ) -> anyhow::Result<Resolved> {
        let members: Vec<String> = self
            .directory
            .members(context.chat_id())
            .await?
            .into_iter()
            .filter(|id| !data.except.contains(id) && !companion.has_mentioned(id))
            .collect();
        let text = if self.visible {
            members
                .iter()
                .map(|id| format!("@{id}"))
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            String::new()
        };
        Ok(Resolved::new(companion.with_mentions(members), text))
    }
}

// ── Presets ─────────────────────────────────────────────────────────────────

fn mentions<C: Sync + 'static>() -> CommandRegistryBuilder<C> {
    CommandRegistry::builder()
        .mention(AtMention::visible())
        .invisible_mention(AtMention::invisible())
}

/// WhatsApp-flavoured markdown.
pub fn markdown<C: Sync + 'static>() -> CommandRegistryBuilder<C> {
    mentions()
        .bold(Wrap::new("*", "*"))
        .italic(Wrap::new("_", "_"))
        .underscore(Wrap::new("_", "_"))
        .strike(Wrap::new("~", "~"))
        .paragraph(Wrap::new("", "\n\n"))
        .list_item(Wrap::new("- ", "\n"))
        .monospace(Wrap::new("```", "```"))
}

/// Telegram-flavoured HTML.
pub fn html<C: Sync + 'static>() -> CommandRegistryBuilder<C> {
    mentions()
        .bold(Wrap::escaped("<b>", "</b>", escape_html))
        .italic(Wrap::escaped("<i>", "</i>", escape_html))
        .underscore(Wrap::escaped("<u>", "</u>", escape_html))
        .strike(Wrap::escaped("<s>", "</s>", escape_html))
        .paragraph(Wrap::escaped("", "\n\n", escape_html))
        .list_item(Wrap::escaped("• ", "\n", escape_html))
        .monospace(Wrap::escaped("<code>", "</code>", escape_html))
}

/// Formatting stripped to its content.
pub fn plain<C: Sync + 'static>() -> CommandRegistryBuilder<C> {
    mentions()
        .bold(Wrap::new("", ""))
        .italic(Wrap::new("", ""))
        .underscore(Wrap::new("", ""))
        .strike(Wrap::new("", ""))
        .paragraph(Wrap::new("", "\n\n"))
        .list_item(Wrap::new("- ", "\n"))
        .monospace(Wrap::new("", ""))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
