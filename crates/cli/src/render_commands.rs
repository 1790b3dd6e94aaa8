use {
    anyhow::Result,
    hublink_boundary::{Markup, StaticDirectory, TagEveryone},
    hublink_inline::{InlineEngine, Resolved},
    hublink_protocol::SendMessagePayload,
};

/// Render `body` offline the way a boundary using `markup` would.
///
/// `members` stands in for the chat's membership so `{tageveryone}` has
/// someone to mention.
pub async fn render(
    body: &str,
    markup: Markup,
    chat_id: &str,
    members: &[String],
) -> Result<Resolved> {
    let directory = StaticDirectory::new().with_chat(chat_id, members.iter().cloned());
    let registry = markup
        .builder::<SendMessagePayload>()
        .tag_everyone(TagEveryone::new(directory))
        .build();
    let engine = InlineEngine::new(registry);
    let context = SendMessagePayload::new(chat_id, body);
    Ok(engine.render(body, &context).await?)
}

pub async fn handle_render(
    body: &str,
    markup: Markup,
    chat_id: &str,
    members: &[String],
) -> Result<()> {
    let resolved = render(body, markup, chat_id, members).await?;
    println!("{}", resolved.text);
    if !resolved.companion.mentions.is_empty() {
        eprintln!("mentions: {}", resolved.companion.mentions.join(", "));
    }
    Ok(())
}
