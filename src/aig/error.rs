use thiserror::Error;

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
#[derive(Debug, Error)]
pub enum AigError {
    /// A different node with the given id already exists.
    #[error("a different node with id={0} already exists")]
    DuplicateId(NodeId),

    /// The node with given id does not exist (never existed, or was merged/swept away).
    #[error("node with id={0} does not exist")]
    NodeDoesNotExist(NodeId),

    /// Invalid operation on a node which does not have such specified fanin.
    /// Outputs only have [`FaninId::Fanin0`], inputs and constants have none.
    ///
    /// [`FaninId::Fanin0`]: crate::FaninId::Fanin0
    #[error("node {0} has no such fanin")]
    NoFanin(NodeId),

    /// A mutation primitive was asked to break one of the graph invariants
    /// (removing a referenced gate, merging an input, ...). This should never happen.
    /// If this error is raised, the calling code is garbage.
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    /// The SAT solver gave up (it was interrupted or failed internally).
    #[error("sat solver failure: {0}")]
    Solver(#[from] varisat::solver::SolverError),

    /// Just forwarding a [`ParserError`].
    #[error("{0}")]
    ParserError(#[from] ParserError),

    /// Just forwarding a [`SimError`].
    #[error("{0}")]
    SimError(#[from] SimError),
}

/// Error returned when parsing from file failed.
///
/// Every variant carries the (1-based) line at which the problem was detected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError {
    /// Header is not `aag M I L O A`.
    #[error("line {line}: invalid header ({reason})")]
    InvalidHeader { line: usize, reason: String },

    /// Invalid token, something else was expected.
    #[error("line {line}: invalid token \"{token}\", expected {expected}")]
    InvalidToken {
        line: usize,
        token: String,
        expected: &'static str,
    },

    /// A literal which must be even (input or gate definition) is odd.
    #[error("line {line}: literal {literal} ({id}) cannot be inverted", id = .literal / 2)]
    CannotInvert { line: usize, literal: u64 },

    /// The literal is larger than `2 * M + 1`.
    #[error("line {line}: literal {literal} exceeds maximum valid id {max_id}")]
    LiteralOutOfRange { line: usize, literal: u64, max_id: u64 },

    /// A gate id is defined twice.
    #[error("line {line}: literal {literal} is redefined, previously defined as {kind} in line {previous_line}")]
    Redefinition {
        line: usize,
        literal: u64,
        kind: String,
        previous_line: usize,
    },

    /// Something tried to define the constant (literal 0 or 1).
    #[error("line {line}: cannot redefine const ({literal})")]
    RedefinedConst { line: usize, literal: u64 },

    /// The file ended before all declared definitions were read.
    #[error("line {line}: missing {what} definition")]
    MissingDefinition { line: usize, what: &'static str },

    /// Symbol index is out of bounds.
    #[error("line {line}: symbol index {index} is too big for {kind} (count is {count})")]
    SymbolOutOfRange {
        line: usize,
        kind: char,
        index: usize,
        count: usize,
    },

    /// The same input or output is given two names.
    #[error("line {line}: symbolic name for \"{kind}{index}\" is redefined")]
    RedefinedSymbol { line: usize, kind: char, index: usize },

    /// All features are not supported (latches in particular).
    #[error("line {line}: unsupported feature: {feature}")]
    UnsupportedFeature { line: usize, feature: String },

    /// An IO error occured (file doesn't exist, or doesn't have the right extension, ...).
    #[error("io error: {0}")]
    IoError(String),
}

/// Error returned when a simulation pattern file is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("line {line}: pattern ({pattern}) {reason}")]
    MalformedPattern {
        line: usize,
        pattern: String,
        reason: String,
    },

    #[error("io error: {0}")]
    IoError(String),
}
