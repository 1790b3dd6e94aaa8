//! Inline command markup for hub message bodies.
//!
//! The hub sends platform-independent bodies such as
//! `Hello {mention:42}, see {bold:this}`. A boundary tokenizes them with
//! [`parse`] and resolves the tokens through an [`InlineEngine`] built from
//! the [`CommandRegistry`] of commands its platform can render, collecting
//! mentioned ids in the [`Companion`] along the way.

pub mod command;
pub mod companion;
pub mod engine;
pub mod error;
pub mod parser;
pub mod registry;
pub mod token;

pub use {
    command::{Command, CommandName, FormatData, MentionData, TagEveryoneData},
    companion::Companion,
    engine::InlineEngine,
    error::{Error, Result},
    parser::parse,
    registry::{
        BoundHandler, CommandHandler, CommandRegistry, CommandRegistryBuilder, FnHandler,
        Resolved, handler_fn,
    },
    token::{Token, TokenSequence},
};
