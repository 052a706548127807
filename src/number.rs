//! Numeric literal parsing.
//!
//! A numeral is an optional single leading space, an optional `-`, one or more
//! digits, an optional `.` followed by digits, and an optional `e`/`E` exponent
//! with its own optional sign. The pieces are recognized with nom and then folded
//! digit by digit into an `f64`; no string-to-float conversion is involved.

use nom::{
    IResult, Parser,
    character::complete::{char, digit1, one_of},
    combinator::opt,
    sequence::{pair, preceded},
};

/// The recognized pieces of a numeral, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Numeral<'a> {
    negative: bool,
    integer: &'a str,
    fraction: Option<&'a str>,
    exponent: Option<(bool, &'a str)>,
}

impl Numeral<'_> {
    fn value(&self) -> f64 {
        let mut magnitude = accumulate(self.integer);

        if let Some(fraction) = self.fraction {
            let scale = (0..fraction.len()).fold(1.0, |acc: f64, _| acc * 10.0);
            magnitude += accumulate(fraction) / scale;
        }

        if let Some((negative_exponent, digits)) = self.exponent {
            let exponent = accumulate(digits);
            let exponent = if negative_exponent { -exponent } else { exponent };
            magnitude *= 10f64.powf(exponent);
        }

        if self.negative { -magnitude } else { magnitude }
    }
}

/// Fold a run of ASCII digits into a float, most significant digit first.
fn accumulate(digits: &str) -> f64 {
    digits
        .bytes()
        .fold(0.0, |acc, digit| acc * 10.0 + f64::from(digit - b'0'))
}

fn exponent(input: &str) -> IResult<&str, (bool, &str)> {
    let (input, (sign, digits)) =
        preceded(one_of("eE"), pair(opt(one_of("+-")), digit1)).parse(input)?;
    Ok((input, (sign == Some('-'), digits)))
}

fn numeral(input: &str) -> IResult<&str, Numeral<'_>> {
    let (input, _) = opt(char(' ')).parse(input)?;
    let (input, sign) = opt(char('-')).parse(input)?;
    let (input, integer) = digit1.parse(input)?;
    let (input, fraction) = opt(preceded(char('.'), digit1)).parse(input)?;
    let (input, exponent) = opt(exponent).parse(input)?;

    Ok((
        input,
        Numeral {
            negative: sign.is_some(),
            integer,
            fraction,
            exponent,
        },
    ))
}

/// Parse a leading numeral, returning its value and the unconsumed remainder.
///
/// Returns `None` when the text does not start with a numeral, so the caller can
/// try other interpretations.
pub fn parse_number(input: &str) -> Option<(f64, &str)> {
    numeral(input)
        .ok()
        .map(|(rest, numeral)| (numeral.value(), rest))
}

/// Parse text that must be a numeral in its entirety.
pub fn parse_number_exact(input: &str) -> Option<f64> {
    match parse_number(input) {
        Some((value, "")) => Some(value),
        _ => None,
    }
}

/// Whether an atom starts the way a numeral would, even if it is not a valid one.
pub(crate) fn looks_numeric(atom: &str) -> bool {
    let mut chars = atom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() || c == '.' => true,
        Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit() || c == '.'),
        _ => false,
    }
}
