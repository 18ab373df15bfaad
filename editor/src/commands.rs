//! Line commands understood by the editor driver.

use std::fmt;

/// A parsed editor command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `new NAME [CODE]`
    New { name: String, code: Option<String> },
    /// `delete NAME`
    Delete { name: String },
    /// `rename OLD NEW`
    Rename { from: String, to: String },
    /// `duplicate NAME NEW`
    Duplicate { name: String, to: String },
    /// `code NAME CODE`
    Code { name: String, code: String },
    /// `font-size N`
    FontSize(f32),
    /// `dark on|off`
    DarkStyle(bool),
    Undo,
    Redo,
    /// `undo-until INDEX` (index into the undo history, oldest first)
    UndoUntil(usize),
    /// `redo-until INDEX` (index into the redo history, oldest first)
    RedoUntil(usize),
    UndoAll,
    History,
    /// `describe TEXT`: description of the next recorded step
    Describe(String),
    Disable,
    Enable,
    /// Starts over with an empty session and no history.
    Reset,
    Save,
    List,
}

/// Errors reported to the user for a single command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The first word is not a known command.
    Unknown(String),
    /// Wrong number or shape of arguments.
    Usage(&'static str),
    /// An argument could not be parsed.
    InvalidArgument(String),
    /// A double quote was never closed.
    UnterminatedQuote,
    /// No shader with that name.
    NoSuchShader(String),
    /// A shader with that name already exists.
    ShaderExists(String),
    /// A history index past the end of the list.
    NoSuchEntry(usize),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(word) => write!(f, "unknown command: {word}"),
            Self::Usage(usage) => write!(f, "usage: {usage}"),
            Self::InvalidArgument(arg) => write!(f, "invalid argument: {arg}"),
            Self::UnterminatedQuote => write!(f, "unterminated quote"),
            Self::NoSuchShader(name) => write!(f, "no such shader: {name}"),
            Self::ShaderExists(name) => write!(f, "shader already exists: {name}"),
            Self::NoSuchEntry(index) => write!(f, "no history entry {index}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Splits a line into words. Double quotes group words; `\n` inside quotes
/// becomes a newline.
fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if c == '"' {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') if chars.peek() == Some(&'n') => {
                        chars.next();
                        token.push('\n');
                    }
                    Some(c) => token.push(c),
                    None => return Err(CommandError::UnterminatedQuote),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }
    Ok(tokens)
}

fn parse_index(arg: &str) -> Result<usize, CommandError> {
    arg.parse()
        .map_err(|_| CommandError::InvalidArgument(arg.to_owned()))
}

/// Parses one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let tokens = tokenize(line)?;
    let Some((word, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match (word.as_str(), args) {
        ("new", [name]) => Command::New {
            name: name.clone(),
            code: None,
        },
        ("new", [name, code]) => Command::New {
            name: name.clone(),
            code: Some(code.clone()),
        },
        ("new", _) => return Err(CommandError::Usage("new NAME [CODE]")),
        ("delete", [name]) => Command::Delete { name: name.clone() },
        ("delete", _) => return Err(CommandError::Usage("delete NAME")),
        ("rename", [from, to]) => Command::Rename {
            from: from.clone(),
            to: to.clone(),
        },
        ("rename", _) => return Err(CommandError::Usage("rename OLD NEW")),
        ("duplicate", [name, to]) => Command::Duplicate {
            name: name.clone(),
            to: to.clone(),
        },
        ("duplicate", _) => return Err(CommandError::Usage("duplicate NAME NEW")),
        ("code", [name, code]) => Command::Code {
            name: name.clone(),
            code: code.clone(),
        },
        ("code", _) => return Err(CommandError::Usage("code NAME CODE")),
        ("font-size", [size]) => {
            let size: f32 = size
                .parse()
                .map_err(|_| CommandError::InvalidArgument(size.clone()))?;
            if !(size.is_finite() && size > 0.0) {
                return Err(CommandError::InvalidArgument(size.to_string()));
            }
            Command::FontSize(size)
        }
        ("font-size", _) => return Err(CommandError::Usage("font-size N")),
        ("dark", [flag]) => match flag.as_str() {
            "on" => Command::DarkStyle(true),
            "off" => Command::DarkStyle(false),
            _ => return Err(CommandError::InvalidArgument(flag.clone())),
        },
        ("dark", _) => return Err(CommandError::Usage("dark on|off")),
        ("undo", []) => Command::Undo,
        ("redo", []) => Command::Redo,
        ("undo-until", [index]) => Command::UndoUntil(parse_index(index)?),
        ("undo-until", _) => return Err(CommandError::Usage("undo-until INDEX")),
        ("redo-until", [index]) => Command::RedoUntil(parse_index(index)?),
        ("redo-until", _) => return Err(CommandError::Usage("redo-until INDEX")),
        ("undo-all", []) => Command::UndoAll,
        ("history", []) => Command::History,
        ("describe", [text]) => Command::Describe(text.clone()),
        ("describe", _) => return Err(CommandError::Usage("describe TEXT")),
        ("disable", []) => Command::Disable,
        ("enable", []) => Command::Enable,
        ("reset", []) => Command::Reset,
        ("save", []) => Command::Save,
        ("list", []) => Command::List,
        ("undo" | "redo" | "undo-all" | "history" | "disable" | "enable" | "reset" | "save"
        | "list", _) => return Err(CommandError::Usage("this command takes no arguments")),
        (other, _) => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(Some(command))
}
