//! Tcl list parsing and serialization.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::codec::quote::quote;
use crate::error::{Result, TclBridgeError};

/// One position in a parsed Tcl list: either a leaf string or a sublist.
///
/// Produced by [`parse_levels`]; has no identity beyond its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TclValue {
    /// A leaf element, exactly as it appeared minus its outer delimiters.
    Word(String),
    /// A parsed sublist.
    List(Vec<TclValue>),
}

impl TclValue {
    /// The leaf string, if this is a word.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// The sublist elements, if this is a list.
    pub fn as_list(&self) -> Option<&[TclValue]> {
        match self {
            Self::Word(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

impl From<&str> for TclValue {
    fn from(s: &str) -> Self {
        Self::Word(s.to_string())
    }
}

/// Parse one level of a Tcl list into its elements.
///
/// Elements are separated by runs of whitespace. Brace groups and quoted
/// elements lose only their outer delimiters; whatever nested list syntax
/// they contain stays opaque. Empty input parses to an empty vec; an
/// explicit `{}` parses to one empty-string element.
///
/// # Errors
///
/// Returns [`TclBridgeError::Parse`] on unbalanced braces, unterminated
/// quotes, or a closing delimiter not followed by whitespace.
pub fn parse(text: &str) -> Result<Vec<String>> {
    split_list(text)
}

/// Parse a Tcl list, recursing into elements up to `levels` deep.
///
/// `levels <= 1` behaves like [`parse`], wrapping each element in
/// [`TclValue::Word`]. At greater depth every element is re-parsed as a
/// list; an element that does not itself parse is kept as an opaque
/// `Word` leaf rather than failing the whole parse.
pub fn parse_levels(text: &str, levels: usize) -> Result<Vec<TclValue>> {
    let elements = split_list(text)?;
    if levels <= 1 {
        return Ok(elements.into_iter().map(TclValue::Word).collect());
    }
    Ok(elements
        .into_iter()
        .map(|elem| match parse_levels(&elem, levels - 1) {
            Ok(items) => TclValue::List(items),
            Err(_) => TclValue::Word(elem),
        })
        .collect())
}

/// Serialize elements into Tcl list syntax.
///
/// Each element is quoted minimally (see [`quote`](crate::codec::quote))
/// and elements are joined with single spaces, so
/// `parse(&serialize(xs))? == xs` for any elements free of raw newlines.
pub fn serialize<I, S>(elements: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    elements
        .into_iter()
        .map(|e| quote(e.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        c => c,
    }
}

fn split_list(text: &str) -> Result<Vec<String>> {
    let mut elements = Vec::new();
    let mut chars = text.char_indices().peekable();

    loop {
        while matches!(chars.peek(), Some((_, c)) if is_space(*c)) {
            chars.next();
        }
        let Some(&(start, c)) = chars.peek() else {
            break;
        };
        let element = match c {
            '{' => scan_braced(text, start, &mut chars)?,
            '"' => scan_quoted(&mut chars)?,
            _ => scan_bare(&mut chars),
        };
        elements.push(element);
    }

    Ok(elements)
}

/// Brace group: content is literal, nested braces must balance, no
/// backslash processing.
fn scan_braced(text: &str, start: usize, chars: &mut Peekable<CharIndices<'_>>) -> Result<String> {
    chars.next(); // opening brace
    let content_start = start + 1;
    let mut depth = 1usize;

    while let Some((idx, c)) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    expect_separator(chars, "braces")?;
                    return Ok(text[content_start..idx].to_string());
                }
            }
            _ => {}
        }
    }

    Err(TclBridgeError::Parse(
        "unbalanced open brace in list".into(),
    ))
}

/// Quoted element: backslash escapes are processed, an unescaped `"`
/// ends the element.
fn scan_quoted(chars: &mut Peekable<CharIndices<'_>>) -> Result<String> {
    chars.next(); // opening quote
    let mut out = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            '"' => {
                expect_separator(chars, "quotes")?;
                return Ok(out);
            }
            '\\' => match chars.next() {
                Some((_, e)) => out.push(unescape(e)),
                None => break,
            },
            c => out.push(c),
        }
    }

    Err(TclBridgeError::Parse(
        "unterminated quoted element in list".into(),
    ))
}

/// Bare token: maximal run of non-whitespace with backslash processing.
/// Never fails; a trailing lone backslash stays literal.
fn scan_bare(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut out = String::new();

    while let Some(&(_, c)) = chars.peek() {
        if is_space(c) {
            break;
        }
        chars.next();
        if c == '\\' {
            match chars.next() {
                Some((_, e)) => out.push(unescape(e)),
                None => {
                    out.push('\\');
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }

    out
}

fn expect_separator(chars: &mut Peekable<CharIndices<'_>>, what: &str) -> Result<()> {
    match chars.peek() {
        None => Ok(()),
        Some((_, c)) if is_space(*c) => Ok(()),
        Some((_, c)) => Err(TclBridgeError::Parse(format!(
            "list element in {what} followed by {c:?} instead of space"
        ))),
    }
}
