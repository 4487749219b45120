//! Console commands.
//!
//! Administrative input is line-oriented and whitespace-tokenized. Only the
//! first token is significant.

/// Token that starts the server shutdown sequence.
pub const SHUTDOWN: &str = "/shutdown";

/// Token that makes a client leave.
pub const EXIT: &str = "/exit";

/// A console line, classified by its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/shutdown`
    Shutdown,
    /// `/exit`
    Exit,
    /// Anything else, carried verbatim.
    Text(&'a str),
}

impl<'a> Command<'a> {
    /// Classify one input line (without its line ending).
    pub fn parse(line: &'a str) -> Self {
        match line.split_whitespace().next() {
            Some(SHUTDOWN) => Self::Shutdown,
            Some(EXIT) => Self::Exit,
            _ => Self::Text(line),
        }
    }
}
