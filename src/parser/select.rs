// SELECT list parser
//
// Only the projection matters for axis detection, so everything after FROM is
// left unparsed.

use super::lexer::{paren_group, quoted, word, ws};
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt, recognize, verify},
    multi::{many1, separated_list1},
    sequence::{preceded, terminated},
    IResult,
};

/// One select item: any run of words, literals and parenthesized groups up to
/// a top-level comma or the FROM keyword. Returned trimmed.
fn select_item(input: &str) -> IResult<&str, String> {
    map(
        recognize(many1(alt((
            paren_group,
            quoted,
            multispace1,
            verify(word, |w: &str| !w.eq_ignore_ascii_case("from")),
        )))),
        |item: &str| item.trim().to_string(),
    )(input)
}

/// Parse `SELECT [DISTINCT] item, item, ... [FROM ...]`
pub fn parse_select_list(input: &str) -> IResult<&str, Vec<String>> {
    let (input, _) = ws(tag_no_case("select"))(input)?;
    let (input, _) = opt(terminated(tag_no_case("distinct"), multispace1))(input)?;
    let (input, items) = separated_list1(ws(char(',')), select_item)(input)?;
    let (input, _) = opt(preceded(multispace0, tag_no_case("from")))(input)?;
    Ok((input, items))
}

/// Select items of a query, or nothing if it does not parse
pub fn select_items(sql: &str) -> Vec<String> {
    match parse_select_list(sql) {
        Ok((_, items)) => items.into_iter().filter(|i| !i.is_empty()).collect(),
        Err(_) => Vec::new(),
    }
}
