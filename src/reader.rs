//! Reader: splitting raw form text into sibling sub-expressions.
//!
//! There is no token stream. Given the text of a form, the reader walks it once
//! and hands back borrowed slices, one per sibling: either an atom (a maximal run
//! of characters that are neither whitespace nor brackets) or a complete
//! bracket-balanced sub-form, brackets included. Nested forms are left as text and
//! only split when the evaluator gets to them.
//!
//! Unbalanced input fails fast with [`Error::InvalidSubform`] instead of scanning
//! past the end of the text.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    error::ErrorKind,
    sequence::preceded,
};

use crate::Error;
use crate::ast::Value;
use crate::number::parse_number_exact;

pub(crate) const OPEN: char = '(';
pub(crate) const CLOSE: char = ')';

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && c != OPEN && c != CLOSE
}

/// Maximal run of non-space, non-bracket characters.
fn atom(input: &str) -> IResult<&str, &str> {
    take_while1(is_atom_char).parse(input)
}

/// A bracketed sub-form, matched by tracking nesting depth.
///
/// Running out of input before the depth returns to zero is a hard failure so
/// that `alt` does not go on to try other branches.
fn bracketed(input: &str) -> IResult<&str, &str> {
    let (_, _) = char(OPEN).parse(input)?;

    let mut depth = 0usize;
    for (idx, ch) in input.char_indices() {
        match ch {
            OPEN => depth += 1,
            CLOSE => {
                depth -= 1;
                if depth == 0 {
                    let end = idx + CLOSE.len_utf8();
                    return Ok((&input[end..], &input[..end]));
                }
            }
            _ => {}
        }
    }

    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        ErrorKind::Eof,
    )))
}

/// The next sibling, after any leading whitespace.
fn sibling(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, alt((bracketed, atom))).parse(input)
}

/// Convert a nom failure into a reader error with a short excerpt of the input.
fn subform_error(error: nom::Err<nom::error::Error<&str>>) -> Error {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let excerpt: String = e.input.chars().take(20).collect();
            match e.code {
                ErrorKind::Eof => Error::InvalidSubform(format!("unterminated form '{excerpt}'")),
                _ => Error::InvalidSubform(format!("not a valid sub-expression near '{excerpt}'")),
            }
        }
        nom::Err::Incomplete(_) => Error::InvalidSubform("incomplete input".into()),
    }
}

/// Split the inside of a form into its siblings, stopping at the form's closing
/// bracket.
///
/// `inner` is the text just after an opening bracket. Returns the siblings and
/// whatever follows the matching closing bracket.
pub fn split_siblings(inner: &str) -> Result<(Vec<&str>, &str), Error> {
    let mut siblings = Vec::new();
    let mut rest = inner;

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix(CLOSE) {
            return Ok((siblings, after));
        }
        if rest.is_empty() {
            return Err(Error::InvalidSubform(format!(
                "missing '{CLOSE}' to close '{OPEN}{}'",
                inner.trim_end()
            )));
        }

        let (remaining, next) = sibling(rest).map_err(subform_error)?;
        siblings.push(next);
        rest = remaining;
    }
}

/// Split a complete form such as `(f a (g b))` into `["f", "a", "(g b)"]`.
///
/// The text must be exactly one form: anything after the closing bracket other
/// than whitespace is rejected.
pub fn split_form(text: &str) -> Result<Vec<&str>, Error> {
    let text = text.trim();
    let Some(inner) = text.strip_prefix(OPEN) else {
        return Err(Error::InvalidSubform(format!("expected '{OPEN}' at '{text}'")));
    };

    let (siblings, rest) = split_siblings(inner)?;
    let rest = rest.trim();
    if !rest.is_empty() {
        return Err(Error::InvalidSubform(format!(
            "unexpected input after form: '{rest}'"
        )));
    }

    Ok(siblings)
}

/// Whether a sibling is an atom rather than a bracketed form.
pub fn is_atom(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_atom_char)
}

/// Turn quoted text into data without evaluating any of it.
///
/// Bracketed text becomes a list of converted elements, numerals become numbers,
/// and every other atom becomes a symbol.
pub fn datum(text: &str) -> Result<Value, Error> {
    let text = text.trim();
    if text.starts_with(OPEN) {
        let elements = split_form(text)?
            .into_iter()
            .map(datum)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::List(elements));
    }

    if !is_atom(text) {
        return Err(Error::InvalidSubform(format!("stray delimiter in '{text}'")));
    }

    Ok(match parse_number_exact(text) {
        Some(n) => Value::Number(n),
        None => Value::Symbol(text.to_owned()),
    })
}
