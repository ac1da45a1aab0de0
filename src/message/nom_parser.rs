//! Nom-based IRC message parser.
//!
//! This module splits a single protocol line into borrowed slices
//! following the RFC 1459 grammar:
//!
//! ```text
//! message  := [ ":" prefix SP+ ] command params
//! command  := 1*letter | 3digit
//! params   := *( SP+ middle ) [ SP+ ":" trailing ]
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::{alpha1, char, space1},
    combinator::{eof, opt, peek},
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse message prefix (the part after `:` and before the first space),
/// together with the run of spaces that separates it from the command.
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        terminated(preceded(char(':'), take_while1(|c| c != ' ')), space1),
    )(input)
}

/// Parse the command: a run of ASCII letters or exactly three digits,
/// followed by a space or the end of the line.
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        terminated(
            alt((take_while_m_n(3, 3, |c: char| c.is_ascii_digit()), alpha1)),
            peek(alt((eof, tag(" ")))),
        ),
    )(input)
}

/// Split the parameter section into middle parameters and an optional
/// trailing parameter. Runs of spaces separate parameters; whitespace at
/// the very end of the line is ignored.
fn split_params(input: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = input;

    loop {
        let after_space = rest.trim_start_matches(' ');
        if after_space.len() == rest.len() || after_space.is_empty() {
            break;
        }
        rest = after_space;

        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// Parse a complete IRC line into its components.
pub fn parse_message(input: &str) -> ParseResult<&str, ParsedMessage<'_>> {
    let start = input.len();

    let (input, prefix) = context("parsing optional prefix", opt(parse_prefix))(input)?;
    let command_offset = start - input.len();

    let (input, command) = context("parsing required command", parse_command)(input)?;

    Ok((
        "",
        ParsedMessage {
            prefix,
            command,
            command_offset,
            params: split_params(input),
            all_params: input,
        },
    ))
}

/// A parsed IRC line with borrowed string slices.
///
/// This is the intermediate representation produced by the nom parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage<'a> {
    /// Raw prefix token (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command name or numeric.
    pub command: &'a str,
    /// Byte offset of the command within the line.
    pub command_offset: usize,
    /// Command parameters, including trailing.
    pub params: Vec<&'a str>,
    /// Everything after the command, unparsed.
    pub all_params: &'a str,
}

impl<'a> ParsedMessage<'a> {
    /// Parse a line into a `ParsedMessage`, reporting the innermost
    /// context and position on failure.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        if input.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        match parse_message(input) {
            Ok((_, msg)) => Ok(msg),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let mut context_info = "parsing message";
                let mut position = input.len();

                for (error_input, error_kind) in &e.errors {
                    position = input.len() - error_input.len();
                    if let VerboseErrorKind::Context(ctx) = error_kind {
                        context_info = ctx;
                        break;
                    }
                }

                Err(MessageParseError::ParseContext {
                    position,
                    context: context_info.to_string(),
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(MessageParseError::ParseContext {
                position: input.len(),
                context: "incomplete input".to_string(),
            }),
        }
    }
}
