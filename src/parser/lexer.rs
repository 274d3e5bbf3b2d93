// Lexical helpers shared by the SQL parsers

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while1},
    character::complete::{char, multispace0},
    combinator::{opt, recognize},
    multi::many0,
    sequence::delimited,
    IResult,
};

/// Characters that end a bare SQL word
const WORD_BREAKS: &str = "(),'\"";

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// A bare word: identifiers, numbers, operators, qualified names
pub fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !WORD_BREAKS.contains(c))(input)
}

/// A single- or double-quoted literal, quotes included
pub fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(char('\''), opt(is_not("'")), char('\''))),
        recognize(delimited(char('"'), opt(is_not("\"")), char('"'))),
    ))(input)
}

/// A balanced parenthesized group, parentheses included. Commas inside do
/// not split select items.
pub fn paren_group(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('('),
        many0(alt((paren_group, quoted, is_not("()'\"")))),
        char(')'),
    ))(input)
}
