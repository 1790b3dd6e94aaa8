//! A platform adapter that writes deliveries to stdout.

use {
    async_trait::async_trait,
    hublink_boundary::PlatformAdapter,
    hublink_inline::Resolved,
    hublink_protocol::{DeleteMessagePayload, ReactToMessagePayload, SendMessagePayload},
    tracing::info,
};

pub struct ConsoleAdapter;

/// One line per delivery: `[event chat] text`, followed by the mentioned ids
/// when there are any.
pub fn format_delivery(event: &str, chat_id: &str, text: &str, mentions: &[String]) -> String {
    let mut line = format!("[{event} {chat_id}] {text}");
    if !mentions.is_empty() {
        line.push_str(&format!(" (mentions: {})", mentions.join(", ")));
    }
    line
}

fn print_rendered(event: &str, payload: &SendMessagePayload, rendered: &Resolved) {
    info!(
        event,
        chat_id = %payload.chat_id,
        mentions = rendered.companion.mentions.len(),
        "delivering"
    );
    println!(
        "{}",
        format_delivery(
            event,
            &payload.chat_id,
            &rendered.text,
            &rendered.companion.mentions
        )
    );
}

#[async_trait]
impl PlatformAdapter for ConsoleAdapter {
    async fn reply_with_text(
        &self,
        payload: &SendMessagePayload,
        rendered: &Resolved,
    ) -> anyhow::Result<()> {
        print_rendered("reply", payload, rendered);
        Ok(())
    }

    async fn reply_with_sticker(
        &self,
        payload: &SendMessagePayload,
        rendered: &Resolved,
    ) -> anyhow::Result<()> {
        print_rendered("reply+sticker", payload, rendered);
        Ok(())
    }

    async fn reply_with_media(
        &self,
        payload: &SendMessagePayload,
        rendered: &Resolved,
    ) -> anyhow::Result<()> {
        print_rendered("reply+media", payload, rendered);
        Ok(())
    }

    async fn send_message(
        &self,
        payload: &SendMessagePayload,
        rendered: &Resolved,
    ) -> anyhow::Result<()> {
        print_rendered("send", payload, rendered);
        Ok(())
    }

    async fn send_message_with_sticker(
        &self,
        payload: &SendMessagePayload,
        rendered: &Resolved,
    ) -> anyhow::Result<()> {
        print_rendered("send+sticker", payload, rendered);
        Ok(())
    }

    async fn send_message_with_media(&self, payload: &SendMessagePayload) -> anyhow::Result<()> {
        let file = payload
            .media
            .as_ref()
            .and_then(|m| m.file_name.as_deref())
            .unwrap_or("unnamed");
        println!(
            "{}",
            format_delivery("send+media", &payload.chat_id, &payload.body, &[])
        );
        println!("  attachment: {file}");
        Ok(())
    }

    async fn react_message(&self, payload: &ReactToMessagePayload) -> anyhow::Result<()> {
        println!(
            "[react {}] {} on {}",
            payload.chat_id, payload.emote, payload.message_id
        );
        Ok(())
    }

    async fn delete_message(&self, payload: &DeleteMessagePayload) -> anyhow::Result<()> {
        println!("[delete {}] {}", payload.chat_id, payload.message_id);
        Ok(())
    }
}
