//! Nom combinators for `go.mod` directive lines.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, rest},
};

/// A directive recognised on a single trimmed `go.mod` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `module <path>`
    Module(&'a str),

    /// `go <version>`
    Go(&'a str),
}

/// Parses `<keyword> <rest>`, returning the remainder verbatim.
///
/// Exactly one space separates the keyword from its value, so `gopher 1`
/// and `go` on its own are not directives.
fn keyword<'a>(keyword: &'static str, input: &'a str) -> IResult<&'a str, &'a str> {
    let (input, _) = tag(keyword)(input)?;
    let (input, _) = char(' ')(input)?;
    rest(input)
}

/// Parses: module github.com/example/project
fn module_directive(input: &str) -> IResult<&str, &str> {
    keyword("module", input)
}

/// Parses: go 1.24
fn go_directive(input: &str) -> IResult<&str, &str> {
    keyword("go", input)
}

/// Recognises a directive on an already trimmed line.
pub fn directive(line: &str) -> Option<Directive<'_>> {
    alt((
        map(module_directive, Directive::Module),
        map(go_directive, Directive::Go),
    ))
    .parse(line)
    .ok()
    .map(|(_, directive)| directive)
}
