//! Tokenizer for inline command markup.
//!
//! Grammar: a command is `{name}` or `{name:argument}` where `name` is a
//! lowercase vocabulary entry (see [`CommandName::from_marker`]). Inside an
//! argument, `\}` stands for `}` and `\\` for `\`. A `{` that does not open a
//! well-formed command is kept as plain text and scanning resumes right after
//! it, so malformed markup is preserved verbatim.

use crate::{
    command::{Command, CommandName, MentionData, TagEveryoneData},
    token::{Token, TokenSequence},
};

const OPEN: char = '{';
const CLOSE: char = '}';
const ARG_SEPARATOR: char = ':';
const ESCAPE: char = '\\';
const LIST_SEPARATOR: char = ',';

/// Split a message body into plain text runs and inline commands.
///
/// Never fails: anything that cannot be read as a command stays plain text.
/// Adjacent plain runs are merged into a single token. Runs in linear time:
/// once an argument runs off the end of the body, no later `{` can close
/// either, so the remainder is taken as plain text.
pub fn parse(body: &str) -> TokenSequence {
    let mut tokens = Vec::new();
    let mut plain = String::new();
    let Some(last_close) = body.rfind(CLOSE) else {
        return plain_only(body);
    };
    let mut rest = body;

    while let Some(open) = rest.find(OPEN) {
        plain.push_str(&rest[..open]);
        let candidate = &rest[open..];
        if body.len() - candidate.len() > last_close {
            rest = candidate;
            break;
        }
        match scan_command(candidate) {
            Scan::Command(command, consumed) => {
                flush_plain(&mut tokens, &mut plain);
                tokens.push(Token::Command(command));
                rest = &candidate[consumed..];
            },
            Scan::Literal => {
                plain.push(OPEN);
                rest = &candidate[OPEN.len_utf8()..];
            },
            Scan::Unterminated => {
                rest = candidate;
                break;
            },
        }
    }

    plain.push_str(rest);
    flush_plain(&mut tokens, &mut plain);
    tokens.into()
}

fn plain_only(body: &str) -> TokenSequence {
    if body.is_empty() {
        TokenSequence::default()
    } else {
        vec![Token::plain(body)].into()
    }
}

fn flush_plain(tokens: &mut Vec<Token>, plain: &mut String) {
    if !plain.is_empty() {
        tokens.push(Token::PlainText(std::mem::take(plain)));
    }
}

/// Outcome of reading at one `{`.
enum Scan {
    /// A command and the number of bytes it spans, closing brace included.
    Command(Command, usize),
    /// Not a command; the `{` is plain text.
    Literal,
    /// An argument reached the end of input without a closing `}`.
    Unterminated,
}

/// Try to read one command at the start of `input` (which begins with `{`).
fn scan_command(input: &str) -> Scan {
    let Some(after_open) = input.strip_prefix(OPEN) else {
        return Scan::Literal;
    };
    let name_len = after_open
        .find(|c: char| !c.is_ascii_lowercase())
        .unwrap_or(after_open.len());
    if name_len == 0 {
        return Scan::Literal;
    }
    let Some(name) = CommandName::from_marker(&after_open[..name_len]) else {
        return Scan::Literal;
    };

    let (argument, consumed_after_name) = match after_open[name_len..].chars().next() {
        Some(CLOSE) => (None, CLOSE.len_utf8()),
        Some(ARG_SEPARATOR) => {
            let tail = &after_open[name_len + ARG_SEPARATOR.len_utf8()..];
            let Some((argument, used)) = scan_argument(tail) else {
                return Scan::Unterminated;
            };
            (Some(argument), ARG_SEPARATOR.len_utf8() + used)
        },
        _ => return Scan::Literal,
    };

    match build_command(name, argument) {
        Some(command) => {
            Scan::Command(command, OPEN.len_utf8() + name_len + consumed_after_name)
        },
        None => Scan::Literal,
    }
}

/// Read an argument up to the first unescaped `}`.
///
/// Returns the unescaped argument and the bytes consumed including the
/// closing brace, or `None` if the input ends first.
fn scan_argument(input: &str) -> Option<(String, usize)> {
    let mut argument = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            CLOSE => return Some((argument, idx + CLOSE.len_utf8())),
            ESCAPE => match chars.peek() {
                Some(&(_, next @ (CLOSE | ESCAPE))) => {
                    argument.push(next);
                    chars.next();
                },
                _ => argument.push(ESCAPE),
            },
            other => argument.push(other),
        }
    }

    None
}

fn build_command(name: CommandName, argument: Option<String>) -> Option<Command> {
    match name {
        CommandName::Mention | CommandName::InvisibleMention => {
            let id = argument?.trim().to_string();
            if id.is_empty() {
                return None;
            }
            let data = MentionData { id };
            Some(if name == CommandName::Mention {
                Command::Mention(data)
            } else {
                Command::InvisibleMention(data)
            })
        },
        CommandName::TagEveryone => {
            let except = argument
                .as_deref()
                .map(split_id_list)
                .unwrap_or_default();
            Some(Command::TagEveryone(TagEveryoneData { except }))
        },
        _ => Command::format(name, argument?),
    }
}

fn split_id_list(list: &str) -> Vec<String> {
    list.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
