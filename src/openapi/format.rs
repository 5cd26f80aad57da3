//! Source formatting for generated TypeScript.
//!
//! The printer already lays code out; this pass only normalizes whitespace
//! and refuses text whose brackets do not balance.

use std::path::Path;

use crate::error::{CodegenError, Result};

/// Final pass over every generated file body.
pub trait Formatter: Send + Sync {
    /// `path` only names the file in errors.
    fn format(&self, path: &Path, source: &str) -> Result<String>;
}

/// Whitespace normalizer with a bracket-balance check.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFormatter;

impl Formatter for SourceFormatter {
    fn format(&self, path: &Path, source: &str) -> Result<String> {
        check_brackets(source).map_err(|reason| CodegenError::Format {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(normalize_whitespace(source))
    }
}

fn normalize_whitespace(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = 0usize;

    for line in source.replace("\r\n", "\n").lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    if out.is_empty() {
        out.push('\n');
    }
    out
}

// ============================================================================
// Bracket balance
// ============================================================================

fn check_brackets(source: &str) -> std::result::Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            '\'' | '"' | '`' => {
                let start = line;
                let mut closed = false;
                while let Some(s) = chars.next() {
                    match s {
                        '\\' => {
                            if chars.next() == Some('\n') {
                                line += 1;
                            }
                        }
                        '\n' => {
                            line += 1;
                            if c != '`' {
                                break;
                            }
                        }
                        s if s == c => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(format!("unterminated string literal starting on line {start}"));
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for s in chars.by_ref() {
                    if s == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let start = line;
                chars.next();
                let mut closed = false;
                let mut prev = '\0';
                for s in chars.by_ref() {
                    if s == '\n' {
                        line += 1;
                    }
                    if prev == '*' && s == '/' {
                        closed = true;
                        break;
                    }
                    prev = s;
                }
                if !closed {
                    return Err(format!("unterminated comment starting on line {start}"));
                }
            }
            '(' | '[' | '{' => stack.push((c, line)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, opened)) => {
                        return Err(format!(
                            "'{c}' on line {line} does not close '{open}' from line {opened}"
                        ));
                    }
                    None => return Err(format!("unmatched '{c}' on line {line}")),
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, opened)) => Err(format!("unclosed '{open}' from line {opened}")),
        None => Ok(()),
    }
}
