use {
    crate::{
        companion::Companion,
        error::{Error, Result},
        parser::parse,
        registry::{CommandRegistry, Resolved},
        token::{Token, TokenSequence},
    },
    std::sync::Arc,
    tracing::{debug, warn},
};

/// Drives resolution runs against one shared, read-only registry.
///
/// Cloning is cheap; every clone resolves against the same handlers.
pub struct InlineEngine<C> {
    registry: Arc<CommandRegistry<C>>,
}

impl<C> Clone for InlineEngine<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<C> std::fmt::Debug for InlineEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineEngine")
            .field("registry", &self.registry)
            .finish()
    }
}

impl<C: Sync> InlineEngine<C> {
    pub fn new(registry: CommandRegistry<C>) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn from_shared(registry: Arc<CommandRegistry<C>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry<C> {
        &self.registry
    }

    /// Resolve `tokens` left to right into rendered text and the final
    /// companion.
    ///
    /// Each command's handler runs to completion before the next token is
    /// looked at, and receives the companion produced by everything before
    /// it. Commands without a handler contribute nothing. The first handler
    /// error aborts the run.
    pub async fn resolve(&self, tokens: &TokenSequence, context: &C) -> Result<Resolved> {
        let mut companion = Companion::new();
        let mut text = String::new();
        let mut handled = 0usize;
        let mut skipped = 0usize;

        for token in tokens {
            let command = match token {
                Token::PlainText(plain) => {
                    text.push_str(plain);
                    continue;
                },
                Token::Command(command) => command,
            };

            let name = command.name();
            let Some(handler) = self.registry.handler(command) else {
                warn!(command = %name, "no handler registered for inline command, skipping");
                skipped += 1;
                continue;
            };

            let resolved = handler
                .invoke(companion, context)
                .await
                .map_err(|source| Error::handler(name, source))?;
            companion = resolved.companion;
            text.push_str(&resolved.text);
            handled += 1;
        }

        debug!(
            tokens = tokens.len(),
            handled,
            skipped,
            mentions = companion.mentions.len(),
            "inline commands resolved"
        );

        Ok(Resolved { companion, text })
    }

    /// Parse `body` and resolve it in one go.
    pub async fn render(&self, body: &str, context: &C) -> Result<Resolved> {
        let tokens = parse(body);
        self.resolve(&tokens, context).await
    }
}
