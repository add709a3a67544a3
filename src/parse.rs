//! Tokenize path data into commands
//!
//! Accepts either SVG path text or an already tokenized command list and
//! produces commands carrying exactly one repetition of their arguments:
//! `M0 0 10 0 10 10` comes out as `M 0 0`, `L 10 0`, `L 10 10`.

use std::fmt;

use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::errors::{PathDataError, path_source};

#[derive(Parser)]
#[grammar = "path.pest"]
struct PathDataParser;

/// One path command letter with its numeric arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub letter: char,
    pub args: Vec<f64>,
}

impl PathCommand {
    pub fn new(letter: char, args: impl Into<Vec<f64>>) -> Self {
        Self {
            letter,
            args: args.into(),
        }
    }

    /// Number of arguments one repetition of `letter` consumes.
    pub fn arity(letter: char) -> Option<usize> {
        match letter.to_ascii_uppercase() {
            'Z' => Some(0),
            'H' | 'V' => Some(1),
            'M' | 'L' | 'T' => Some(2),
            'S' | 'Q' => Some(4),
            'C' => Some(6),
            'A' => Some(7),
            _ => None,
        }
    }

    pub fn is_relative(&self) -> bool {
        self.letter.is_ascii_lowercase()
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Path description as a host hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum PathInput {
    Text(String),
    Commands(Vec<PathCommand>),
}

impl From<&str> for PathInput {
    fn from(s: &str) -> Self {
        PathInput::Text(s.to_string())
    }
}

impl From<String> for PathInput {
    fn from(s: String) -> Self {
        PathInput::Text(s)
    }
}

impl From<Vec<PathCommand>> for PathInput {
    fn from(commands: Vec<PathCommand>) -> Self {
        PathInput::Commands(commands)
    }
}

/// A command as written, before repetition expansion.
struct RawCommand {
    letter: char,
    args: Vec<f64>,
    /// Byte range in the (possibly synthesized) source text
    span: (usize, usize),
}

/// Tokenize and validate path data.
///
/// The first command must be a move-to; every command must carry a whole
/// number of argument repetitions.
pub fn tokenize(input: &PathInput) -> Result<Vec<PathCommand>, PathDataError> {
    let (source, raw) = match input {
        PathInput::Text(text) => (text.clone(), lex_text(text)?),
        PathInput::Commands(commands) => synthesize_source(commands)?,
    };
    expand(&source, raw)
}

fn lex_text(text: &str) -> Result<Vec<RawCommand>, PathDataError> {
    if text.trim().is_empty() {
        return Err(PathDataError::Empty);
    }

    let pairs = PathDataParser::parse(Rule::path_data, text).map_err(|e| {
        let span = match e.location {
            InputLocation::Pos(pos) => (pos, usize::from(pos < text.len())),
            InputLocation::Span((start, end)) => (start, end - start),
        };
        PathDataError::Syntax {
            src: path_source(text),
            span: span.into(),
            expected: e.variant.message().into_owned(),
        }
    })?;

    let mut commands = Vec::new();
    for pair in pairs {
        if pair.as_rule() != Rule::path_data {
            continue;
        }
        for command in pair.into_inner() {
            if command.as_rule() == Rule::command {
                commands.push(lex_command(command, text)?);
            }
        }
    }
    Ok(commands)
}

fn lex_command(pair: Pair<Rule>, text: &str) -> Result<RawCommand, PathDataError> {
    let span = pair.as_span();
    let span = (span.start(), span.as_str().trim_end().len());
    let mut letter = ' ';
    let mut args = Vec::new();

    for body in pair.into_inner() {
        for part in body.into_inner() {
            match part.as_rule() {
                Rule::letter | Rule::arc_letter => {
                    letter = part.as_str().chars().next().unwrap_or(' ');
                }
                Rule::number => args.push(parse_number(part, text)?),
                Rule::arc_args => {
                    for value in part.into_inner() {
                        args.push(parse_number(value, text)?);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(RawCommand { letter, args, span })
}

fn parse_number(pair: Pair<Rule>, text: &str) -> Result<f64, PathDataError> {
    let span = pair.as_span();
    let value: f64 = pair.as_str().parse().map_err(|_| PathDataError::Syntax {
        src: path_source(text),
        span: (span.start(), span.end() - span.start()).into(),
        expected: "number".to_string(),
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PathDataError::NonFinite)
    }
}

/// Render pre-tokenized commands as text so diagnostics have something to point at.
fn synthesize_source(commands: &[PathCommand]) -> Result<(String, Vec<RawCommand>), PathDataError> {
    if commands.is_empty() {
        return Err(PathDataError::Empty);
    }

    let mut source = String::new();
    let mut raw = Vec::with_capacity(commands.len());
    for command in commands {
        if PathCommand::arity(command.letter).is_none() {
            return Err(PathDataError::UnknownCommand {
                command: command.letter,
            });
        }
        if command.args.iter().any(|a| !a.is_finite()) {
            return Err(PathDataError::NonFinite);
        }
        if !source.is_empty() {
            source.push(' ');
        }
        let start = source.len();
        source.push_str(&command.to_string());
        raw.push(RawCommand {
            letter: command.letter,
            args: command.args.clone(),
            span: (start, source.len() - start),
        });
    }
    Ok((source, raw))
}

fn expand(source: &str, raw: Vec<RawCommand>) -> Result<Vec<PathCommand>, PathDataError> {
    let first = raw.first().ok_or(PathDataError::Empty)?;
    if !matches!(first.letter, 'M' | 'm') {
        return Err(PathDataError::MissingMoveTo {
            found: first.letter,
            src: path_source(source),
            span: first.span.into(),
        });
    }

    let mut commands = Vec::with_capacity(raw.len());
    for cmd in raw {
        let arity = PathCommand::arity(cmd.letter).ok_or(PathDataError::UnknownCommand {
            command: cmd.letter,
        })?;

        let malformed = if arity == 0 {
            !cmd.args.is_empty()
        } else {
            cmd.args.is_empty() || cmd.args.len() % arity != 0
        };
        if malformed {
            return Err(PathDataError::Arity {
                command: cmd.letter,
                arity,
                got: cmd.args.len(),
                src: path_source(source),
                span: cmd.span.into(),
            });
        }

        if arity == 0 {
            commands.push(PathCommand::new(cmd.letter, Vec::new()));
            continue;
        }

        for (i, chunk) in cmd.args.chunks(arity).enumerate() {
            // Extra pairs after a move-to are implicit line-tos
            let letter = match (i, cmd.letter) {
                (0, l) => l,
                (_, 'M') => 'L',
                (_, 'm') => 'l',
                (_, l) => l,
            };
            if letter.eq_ignore_ascii_case(&'a') {
                for flag in [chunk[3], chunk[4]] {
                    if flag != 0.0 && flag != 1.0 {
                        return Err(PathDataError::ArcFlag { value: flag });
                    }
                }
            }
            commands.push(PathCommand::new(letter, chunk.to_vec()));
        }
    }
    Ok(commands)
}
