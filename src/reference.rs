//! Reference header parsing (§6 input, §4.E consumer)
//!
//! The CLI that feeds a path to this parser is out of scope, but the parser
//! itself is in scope: the Calibrator depends on its output. A hand-written
//! scanner is used rather than pulling in a regex or parser-combinator crate,
//! since the grammar is a small, line-oriented set of macro invocations.

use std::collections::HashMap;

use crate::descriptor::{decode_dw0, decode_dw1, Direction, Mode, ResetDomain};
use crate::error::{Error, Result};

/// One pad's expected configuration, as read from a reference header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePad {
    /// Expected mode
    pub mode: Mode,
    /// Expected reset domain
    pub reset: ResetDomain,
    /// Expected GPIO-mode direction, if the macro form determines one
    /// (native-function macros do not have a meaningful direction)
    pub direction: Option<Direction>,
}

/// A parsed mapping from pad name to expected configuration
#[derive(Debug, Clone, Default)]
pub struct ReferenceHeader {
    pads: HashMap<String, ReferencePad>,
}

impl ReferenceHeader {
    /// Look up the expected configuration for `name`
    pub fn get(&self, name: &str) -> Option<&ReferencePad> {
        self.pads.get(name)
    }

    /// Number of pads carried by this reference
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    /// Whether this reference has no pads
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    /// Parse a coreboot-style GPIO configuration header.
    ///
    /// Recognizes `PAD_CFG_GPO`, `PAD_CFG_GPI*`, `PAD_CFG_NF`, and
    /// `_PAD_CFG_STRUCT` invocations; any other non-blank, non-comment
    /// statement is reported as [`Error::ReferenceParseError`] naming the
    /// 1-based line on which the statement started.
    pub fn parse(text: &str) -> Result<Self> {
        let mut pads = HashMap::new();
        for statement in logical_statements(text) {
            if let Some(pad) = parse_statement(&statement)? {
                pads.insert(pad.0, pad.1);
            }
        }
        Ok(Self { pads })
    }
}

/// One balanced `name(args...)` statement plus the 1-based source line it started on
struct Statement {
    line: usize,
    text: String,
}

/// Re-join the input into logical statements, tracking paren depth across
/// line breaks so a macro invocation with a wrapped argument list is still
/// treated as one statement.
fn logical_statements(text: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut start_line: Option<usize> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if depth == 0 && (trimmed.is_empty() || trimmed.starts_with("//")) {
            continue;
        }
        if start_line.is_none() {
            start_line = Some(line_no);
        }
        for ch in line.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(trimmed);

        if depth <= 0 && current.contains('(') {
            statements.push(Statement {
                line: start_line.unwrap(),
                text: std::mem::take(&mut current),
            });
            start_line = None;
            depth = 0;
        }
    }
    if !current.trim().is_empty() {
        statements.push(Statement {
            line: start_line.unwrap_or(1),
            text: current,
        });
    }
    statements
}

fn parse_statement(statement: &Statement) -> Result<Option<(String, ReferencePad)>> {
    let text = statement.text.trim().trim_end_matches(';').trim();
    let open = text.find('(').ok_or(Error::ReferenceParseError(statement.line))?;
    let close = text.rfind(')').ok_or(Error::ReferenceParseError(statement.line))?;
    if close < open {
        return Err(Error::ReferenceParseError(statement.line));
    }
    let name = text[..open].trim();
    let args: Vec<&str> = text[open + 1..close].split(',').map(str::trim).collect();

    let pad = if name == "PAD_CFG_GPO" {
        parse_gpo(&args, statement.line)?
    } else if name.starts_with("PAD_CFG_GPI") {
        parse_gpi(&args, statement.line)?
    } else if name == "PAD_CFG_NF" {
        parse_nf(&args, statement.line)?
    } else if name == "_PAD_CFG_STRUCT" {
        parse_struct(&args, statement.line)?
    } else {
        return Err(Error::ReferenceParseError(statement.line));
    };

    Ok(Some(pad))
}

fn pad_name(args: &[&str], line: usize) -> Result<String> {
    args.first()
        .map(|s| s.to_string())
        .ok_or(Error::ReferenceParseError(line))
}

fn parse_reset(token: &str, line: usize) -> Result<ResetDomain> {
    match token.trim() {
        "PWROK" => Ok(ResetDomain::PwrOk),
        "DEEP" => Ok(ResetDomain::Deep),
        "PLTRST" => Ok(ResetDomain::PltRst),
        "RSMRST" => Ok(ResetDomain::RsmRst),
        _ => Err(Error::ReferenceParseError(line)),
    }
}

fn parse_nf_token(token: &str, line: usize) -> Result<Mode> {
    match token.trim() {
        "NF1" => Ok(Mode::Nf1),
        "NF2" => Ok(Mode::Nf2),
        "NF3" => Ok(Mode::Nf3),
        "NF4" => Ok(Mode::Nf4),
        "NF5" => Ok(Mode::Nf5),
        "NF6" => Ok(Mode::Nf6),
        "NF7" => Ok(Mode::Nf7),
        _ => Err(Error::ReferenceParseError(line)),
    }
}

// PAD_CFG_GPO(name, val, rst)
fn parse_gpo(args: &[&str], line: usize) -> Result<(String, ReferencePad)> {
    let name = pad_name(args, line)?;
    let reset = parse_reset(args.get(2).ok_or(Error::ReferenceParseError(line))?, line)?;
    Ok((
        name,
        ReferencePad {
            mode: Mode::Gpio,
            reset,
            direction: Some(Direction::Output),
        },
    ))
}

// PAD_CFG_GPI*(name, pull, rst, ...)
fn parse_gpi(args: &[&str], line: usize) -> Result<(String, ReferencePad)> {
    let name = pad_name(args, line)?;
    let reset = parse_reset(args.get(2).ok_or(Error::ReferenceParseError(line))?, line)?;
    Ok((
        name,
        ReferencePad {
            mode: Mode::Gpio,
            reset,
            direction: Some(Direction::Input),
        },
    ))
}

// PAD_CFG_NF(name, pull, rst, func)
fn parse_nf(args: &[&str], line: usize) -> Result<(String, ReferencePad)> {
    let name = pad_name(args, line)?;
    let reset = parse_reset(args.get(2).ok_or(Error::ReferenceParseError(line))?, line)?;
    let mode = parse_nf_token(args.get(3).ok_or(Error::ReferenceParseError(line))?, line)?;
    Ok((
        name,
        ReferencePad {
            mode,
            reset,
            direction: None,
        },
    ))
}

// _PAD_CFG_STRUCT(name, dw0, dw1)
fn parse_struct(args: &[&str], line: usize) -> Result<(String, ReferencePad)> {
    let name = pad_name(args, line)?;
    let dw0 = parse_integer(args.get(1).ok_or(Error::ReferenceParseError(line))?, line)?;
    let dw1 = parse_integer(args.get(2).ok_or(Error::ReferenceParseError(line))?, line)?;

    let fields0 = decode_dw0(dw0);
    let _fields1 = decode_dw1(dw1);
    let mode = fields0.mode.ok_or(Error::ReferenceParseError(line))?;
    let direction = if mode == Mode::Gpio {
        Some(Direction::from_rx_tx(fields0.rx_tx))
    } else {
        None
    };

    Ok((
        name,
        ReferencePad {
            mode,
            reset: fields0.reset,
            direction,
        },
    ))
}

fn parse_integer(token: &str, line: usize) -> Result<u32> {
    let token = token.trim();
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|_| Error::ReferenceParseError(line))
    } else {
        token.parse::<u32>().map_err(|_| Error::ReferenceParseError(line))
    }
}
