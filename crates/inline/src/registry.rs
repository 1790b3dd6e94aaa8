//! Command registry: one optional handler per vocabulary entry.
//!
//! A boundary fills in only the commands its platform can render and builds
//! the registry once; afterwards it is read-only and can be shared across
//! concurrent resolution runs.

use {
    crate::{
        command::{Command, CommandName, FormatData, MentionData, TagEveryoneData},
        companion::Companion,
    },
    async_trait::async_trait,
    std::{future::Future, sync::Arc},
};

/// What a handler hands back: the replacement companion and the text that
/// takes the command's place in the rendered output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub companion: Companion,
    pub text: String,
}

impl Resolved {
    pub fn new(companion: Companion, text: impl Into<String>) -> Self {
        Self {
            companion,
            text: text.into(),
        }
    }
}

/// Resolves one command variant whose payload type is `D`.
///
/// `context` is the inbound envelope the run was started with. A handler may
/// await arbitrary work; the engine does not move on until it returns.
#[async_trait]
pub trait CommandHandler<D, C>: Send + Sync {
    async fn handle(
        &self,
        companion: Companion,
        data: &D,
        context: &C,
    ) -> anyhow::Result<Resolved>;
}

/// Adapter turning an async closure into a [`CommandHandler`].
///
/// The closure receives owned copies of the payload and context.
pub struct FnHandler<F>(F);

/// Wrap `f` as a command handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler(f)
}

#[async_trait]
impl<D, C, F, Fut> CommandHandler<D, C> for FnHandler<F>
where
    D: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    F: Fn(Companion, D, C) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Resolved>> + Send,
{
    async fn handle(
        &self,
        companion: Companion,
        data: &D,
        context: &C,
    ) -> anyhow::Result<Resolved> {
        (self.0)(companion, data.clone(), context.clone()).await
    }
}

type Slot<D, C> = Option<Arc<dyn CommandHandler<D, C>>>;

/// Immutable mapping from command variant to its handler.
pub struct CommandRegistry<C> {
    mention: Slot<MentionData, C>,
    invisible_mention: Slot<MentionData, C>,
    tag_everyone: Slot<TagEveryoneData, C>,
    bold: Slot<FormatData, C>,
    italic: Slot<FormatData, C>,
    underscore: Slot<FormatData, C>,
    strike: Slot<FormatData, C>,
    paragraph: Slot<FormatData, C>,
    list_item: Slot<FormatData, C>,
    monospace: Slot<FormatData, C>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self {
            mention: None,
            invisible_mention: None,
            tag_everyone: None,
            bold: None,
            italic: None,
            underscore: None,
            strike: None,
            paragraph: None,
            list_item: None,
            monospace: None,
        }
    }
}

impl<C> std::fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("supported", &self.supported())
            .finish()
    }
}

impl<C> CommandRegistry<C> {
    /// A registry with no handlers; every command takes the unknown path.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> CommandRegistryBuilder<C> {
        CommandRegistryBuilder {
            registry: Self::default(),
        }
    }

    pub fn supports(&self, name: CommandName) -> bool {
        match name {
            CommandName::Mention => self.mention.is_some(),
            CommandName::InvisibleMention => self.invisible_mention.is_some(),
            CommandName::TagEveryone => self.tag_everyone.is_some(),
            other => self.format_slot(other).is_some_and(Option::is_some),
        }
    }

    /// Names with a registered handler, in vocabulary order.
    pub fn supported(&self) -> Vec<CommandName> {
        CommandName::ALL
            .iter()
            .copied()
            .filter(|&name| self.supports(name))
            .collect()
    }

    /// Bind `command` to its handler, if one is registered.
    pub fn handler<'a>(&'a self, command: &'a Command) -> Option<BoundHandler<'a, C>> {
        let bound = match command {
            Command::Mention(data) => BoundHandler::Mention(self.mention.as_deref()?, data),
            Command::InvisibleMention(data) => {
                BoundHandler::Mention(self.invisible_mention.as_deref()?, data)
            },
            Command::TagEveryone(data) => {
                BoundHandler::TagEveryone(self.tag_everyone.as_deref()?, data)
            },
            Command::Bold(data)
            | Command::Italic(data)
            | Command::Underscore(data)
            | Command::Strike(data)
            | Command::Paragraph(data)
            | Command::ListItem(data)
            | Command::Monospace(data) => {
                let handler = self.format_slot(command.name())?.as_deref()?;
                BoundHandler::Format(handler, data)
            },
        };
        Some(bound)
    }

    fn format_slot(&self, name: CommandName) -> Option<&Slot<FormatData, C>> {
        match name {
            CommandName::Bold => Some(&self.bold),
            CommandName::Italic => Some(&self.italic),
            CommandName::Underscore => Some(&self.underscore),
            CommandName::Strike => Some(&self.strike),
            CommandName::Paragraph => Some(&self.paragraph),
            CommandName::ListItem => Some(&self.list_item),
            CommandName::Monospace => Some(&self.monospace),
            CommandName::Mention | CommandName::InvisibleMention | CommandName::TagEveryone => {
                None
            },
        }
    }
}

/// A command paired with the handler that resolves it.
pub enum BoundHandler<'a, C> {
    Mention(&'a dyn CommandHandler<MentionData, C>, &'a MentionData),
    TagEveryone(&'a dyn CommandHandler<TagEveryoneData, C>, &'a TagEveryoneData),
    Format(&'a dyn CommandHandler<FormatData, C>, &'a FormatData),
}

impl<C: Sync> BoundHandler<'_, C> {
    pub async fn invoke(self, companion: Companion, context: &C) -> anyhow::Result<Resolved> {
        match self {
            Self::Mention(handler, data) => handler.handle(companion, data, context).await,
            Self::TagEveryone(handler, data) => handler.handle(companion, data, context).await,
            Self::Format(handler, data) => handler.handle(companion, data, context).await,
        }
    }
}

/// Collects handlers before freezing them into a [`CommandRegistry`].
pub struct CommandRegistryBuilder<C> {
    registry: CommandRegistry<C>,
}

impl<C> CommandRegistryBuilder<C> {
    pub fn mention(mut self, handler: impl CommandHandler<MentionData, C> + 'static) -> Self {
        self.registry.mention = Some(Arc::new(handler));
        self
    }

    pub fn invisible_mention(
        mut self,
        handler: impl CommandHandler<MentionData, C> + 'static,
    ) -> Self {
        self.registry.invisible_mention = Some(Arc::new(handler));
        self
    }

    pub fn tag_everyone(
        mut self,
        handler: impl CommandHandler<TagEveryoneData, C> + 'static,
    ) -> Self {
        self.registry.tag_everyone = Some(Arc::new(handler));
        self
    }

    pub fn bold(self, handler: impl CommandHandler<FormatData, C> + 'static) -> Self {
        self.formatting(CommandName::Bold, Arc::new(handler))
    }

    pub fn italic(self, handler: impl CommandHandler<FormatData, C> + 'static) -> Self {
        self.formatting(CommandName::Italic, Arc::new(handler))
    }

    pub fn underscore(self, handler: impl CommandHandler<FormatData, C> + 'static) -> Self {
        self.formatting(CommandName::Underscore, Arc::new(handler))
    }

    pub fn strike(self, handler: impl CommandHandler<FormatData, C> + 'static) -> Self {
        self.formatting(CommandName::Strike, Arc::new(handler))
    }

    pub fn paragraph(self, handler: impl CommandHandler<FormatData, C> + 'static) -> Self {
        self.formatting(CommandName::Paragraph, Arc::new(handler))
    }

    pub fn list_item(self, handler: impl CommandHandler<FormatData, C> + 'static) -> Self {
        self.formatting(CommandName::ListItem, Arc::new(handler))
    }

    pub fn monospace(self, handler: impl CommandHandler<FormatData, C> + 'static) -> Self {
        self.formatting(CommandName::Monospace, Arc::new(handler))
    }

    /// Register a shared handler for a formatting command by name.
    ///
    /// Names outside the formatting family are ignored.
    pub fn formatting(
        mut self,
        name: CommandName,
        handler: Arc<dyn CommandHandler<FormatData, C>>,
    ) -> Self {
        let slot = match name {
            CommandName::Bold => &mut self.registry.bold,
            CommandName::Italic => &mut self.registry.italic,
            CommandName::Underscore => &mut self.registry.underscore,
            CommandName::Strike => &mut self.registry.strike,
            CommandName::Paragraph => &mut self.registry.paragraph,
            CommandName::ListItem => &mut self.registry.list_item,
            CommandName::Monospace => &mut self.registry.monospace,
            CommandName::Mention | CommandName::InvisibleMention | CommandName::TagEveryone => {
                tracing::warn!(command = %name, "not a formatting command, handler ignored");
                return self;
            },
        };
        *slot = Some(handler);
        self
    }

    pub fn build(self) -> CommandRegistry<C> {
        self.registry
    }
}
