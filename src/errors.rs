//! Error types with diagnostics using miette
//!
//! Path data errors carry a source span so a host can show exactly where a
//! path description went wrong. None of these are fatal: a shape with bad
//! path data simply has no geometry.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Path Data Errors
// ============================================================================

/// Reasons a path description produced no geometry
#[derive(Error, Diagnostic, Debug)]
pub enum PathDataError {
    #[error("empty path data")]
    #[diagnostic(code(hitpath::path::empty))]
    Empty,

    #[error("invalid path syntax")]
    #[diagnostic(code(hitpath::path::syntax))]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{expected}")]
        span: SourceSpan,
        expected: String,
    },

    #[error("path must start with a move-to command, found `{found}`")]
    #[diagnostic(
        code(hitpath::path::missing_move_to),
        help("begin the path with `M x,y` or `m dx,dy`")
    )]
    MissingMoveTo {
        found: char,
        #[source_code]
        src: NamedSource<String>,
        #[label("first command")]
        span: SourceSpan,
    },

    #[error("command `{command}` takes {arity} numbers per repetition, got {got}")]
    #[diagnostic(code(hitpath::path::arity))]
    Arity {
        command: char,
        arity: usize,
        got: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("unknown path command `{command}`")]
    #[diagnostic(code(hitpath::path::unknown_command))]
    UnknownCommand { command: char },

    #[error("arc flag must be 0 or 1, got {value}")]
    #[diagnostic(code(hitpath::path::arc_flag))]
    ArcFlag { value: f64 },

    #[error("non-finite number in path data")]
    #[diagnostic(code(hitpath::path::non_finite))]
    NonFinite,
}

pub(crate) fn path_source(source: &str) -> NamedSource<String> {
    NamedSource::new("<path>", source.to_string())
}

// ============================================================================
// Attribute Errors
// ============================================================================

/// Errors from [`Shape::apply`](crate::Shape::apply)
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum AttrError {
    #[error("invalid {name}: {source}")]
    #[diagnostic(code(hitpath::attr::invalid_value))]
    InvalidValue {
        name: &'static str,
        value: f64,
        #[source]
        source: NumericError,
    },

    #[error("attribute `{name}` does not apply to a {kind} shape")]
    #[diagnostic(
        code(hitpath::attr::wrong_kind),
        help("path data belongs on paths, x/y/radius/symbol on markers")
    )]
    WrongKind {
        name: &'static str,
        kind: &'static str,
    },
}

impl AttrError {
    pub(crate) fn invalid(name: &'static str, value: f64, source: NumericError) -> Self {
        AttrError::InvalidValue { name, value, source }
    }
}

// ============================================================================
// Scene Errors
// ============================================================================

/// Errors from scene graph manipulation
#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("no node with id {0}")]
    #[diagnostic(code(hitpath::scene::unknown_node))]
    UnknownNode(usize),

    #[error("node {0} is a shape and cannot have children")]
    #[diagnostic(
        code(hitpath::scene::not_a_group),
        help("add children to a group node instead")
    )]
    NotAGroup(usize),

    #[error("node {0} is not a shape")]
    #[diagnostic(code(hitpath::scene::not_a_shape))]
    NotAShape(usize),

    #[error("the root group cannot be removed")]
    #[diagnostic(code(hitpath::scene::root))]
    RootNode,
}
