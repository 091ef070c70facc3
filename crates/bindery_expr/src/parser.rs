//! Expression parser
//!
//! Precedence, lowest first:
//!
//! | level | operators |
//! |---|---|
//! | or | `or`, `\|\|` |
//! | and | `and`, `&&` |
//! | not | `not` |
//! | comparison | `==` `!=` `<` `<=` `>` `>=` (non-associative) |
//! | additive | `+` `-` |
//! | multiplicative | `*` `/` `%` |
//! | unary | `-` `!` |
//! | primary | literals, `Name(args...)`, `( expr )` |
//!
//! Bare identifiers are rejected: every name must be a call.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, satisfy},
    combinator::{all_consuming, cut, map, map_res, not, opt, peek, recognize, value},
    error::{context, ErrorKind, VerboseError, VerboseErrorKind},
    multi::{fold_many0, many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};
use thiserror::Error;

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// A rejected expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("column {column}: {message}")]
pub struct ParseError {
    /// Human-readable message with context
    pub message: String,
    /// Byte offset of the failure
    pub offset: usize,
    /// Column of the failure (1-indexed, in characters)
    pub column: usize,
    /// Input remaining at the failure point (truncated)
    pub fragment: String,
}

impl ParseError {
    fn from_verbose(input: &str, err: VerboseError<&str>) -> Self {
        let remaining = err.errors.first().map_or(input, |(frag, _)| *frag);
        let offset = input.len().saturating_sub(remaining.len());
        let column = input[..offset].chars().count() + 1;

        Self {
            message: format_verbose_error(&err),
            offset,
            column,
            fragment: remaining.chars().take(30).collect(),
        }
    }
}

fn format_verbose_error(err: &VerboseError<&str>) -> String {
    let mut parts = Vec::new();

    for (input, kind) in &err.errors {
        match kind {
            VerboseErrorKind::Context(ctx) => parts.push(format!("in {}", ctx)),
            VerboseErrorKind::Char(c) => {
                let preview: String = input.chars().take(20).collect();
                parts.push(format!("expected '{}' near \"{}\"", c, preview));
            }
            VerboseErrorKind::Nom(ErrorKind::Eof) if input.is_empty() => {
                parts.push("unexpected end of expression".to_string())
            }
            VerboseErrorKind::Nom(ErrorKind::Eof) => {
                let preview: String = input.chars().take(20).collect();
                parts.push(format!("unexpected \"{}\"", preview))
            }
            VerboseErrorKind::Nom(ek) => parts.push(format!("{:?}", ek)),
        }
    }

    if parts.is_empty() {
        "unknown parse error".to_string()
    } else {
        parts.join(", ")
    }
}

/// Parse a complete expression
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    all_consuming(ws(or_expr))(input)
        .finish()
        .map(|(_, expr)| expr)
        .map_err(|err| ParseError::from_verbose(input, err))
}

// ============================================================================
// Tokens
// ============================================================================

/// Surround a parser with optional whitespace
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Match a word that is not the prefix of a longer identifier
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, &'a str> {
    terminated(tag(word), not(peek(satisfy(is_ident_char))))
}

fn identifier(input: &str) -> ParseResult<&str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn number(input: &str) -> ParseResult<Literal> {
    alt((
        map_res(recognize(tuple((digit1, char('.'), digit1))), |t: &str| {
            t.parse::<f64>().map(Literal::Float)
        }),
        context(
            "integer literal",
            map_res(digit1, |t: &str| t.parse::<i64>().map(Literal::Int)),
        ),
    ))(input)
}

fn escape_sequence(input: &str) -> ParseResult<&str> {
    alt((
        value("\\", tag("\\")),
        value("\"", tag("\"")),
        value("'", tag("'")),
        value("\n", tag("n")),
        value("\t", tag("t")),
    ))(input)
}

fn quoted<'a>(
    quote: char,
    body_stop: &'static str,
) -> impl FnMut(&'a str) -> ParseResult<'a, String> {
    preceded(
        char(quote),
        cut(terminated(
            map(
                opt(escaped_transform(is_not(body_stop), '\\', escape_sequence)),
                Option::unwrap_or_default,
            ),
            char(quote),
        )),
    )
}

fn string(input: &str) -> ParseResult<Literal> {
    context(
        "string literal",
        map(alt((quoted('"', "\\\""), quoted('\'', "\\'"))), Literal::Str),
    )(input)
}

// ============================================================================
// Grammar
// ============================================================================

fn or_expr(input: &str) -> ParseResult<Expr> {
    let (input, first) = and_expr(input)?;
    fold_many0(
        preceded(ws(alt((keyword("or"), tag("||")))), cut(and_expr)),
        move || first.clone(),
        |lhs, rhs| Expr::binary(BinaryOp::Or, lhs, rhs),
    )(input)
}

fn and_expr(input: &str) -> ParseResult<Expr> {
    let (input, first) = not_expr(input)?;
    fold_many0(
        preceded(ws(alt((keyword("and"), tag("&&")))), cut(not_expr)),
        move || first.clone(),
        |lhs, rhs| Expr::binary(BinaryOp::And, lhs, rhs),
    )(input)
}

fn not_expr(input: &str) -> ParseResult<Expr> {
    alt((
        map(preceded(ws(keyword("not")), cut(not_expr)), |e| {
            Expr::unary(UnaryOp::Not, e)
        }),
        comparison,
    ))(input)
}

fn comparison_op(input: &str) -> ParseResult<BinaryOp> {
    ws(alt((
        value(BinaryOp::Eq, tag("==")),
        value(BinaryOp::Ne, tag("!=")),
        value(BinaryOp::Le, tag("<=")),
        value(BinaryOp::Ge, tag(">=")),
        value(BinaryOp::Lt, tag("<")),
        value(BinaryOp::Gt, tag(">")),
    )))(input)
}

fn comparison(input: &str) -> ParseResult<Expr> {
    let (input, lhs) = additive(input)?;
    let (input, rest) = opt(pair(comparison_op, cut(additive)))(input)?;
    let expr = match rest {
        Some((op, rhs)) => Expr::binary(op, lhs, rhs),
        None => lhs,
    };
    Ok((input, expr))
}

fn additive(input: &str) -> ParseResult<Expr> {
    let (input, first) = multiplicative(input)?;
    fold_many0(
        pair(
            ws(alt((
                value(BinaryOp::Add, char('+')),
                value(BinaryOp::Sub, char('-')),
            ))),
            cut(multiplicative),
        ),
        move || first.clone(),
        |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
    )(input)
}

fn multiplicative(input: &str) -> ParseResult<Expr> {
    let (input, first) = unary(input)?;
    fold_many0(
        pair(
            ws(alt((
                value(BinaryOp::Mul, char('*')),
                value(BinaryOp::Div, char('/')),
                value(BinaryOp::Rem, char('%')),
            ))),
            cut(unary),
        ),
        move || first.clone(),
        |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
    )(input)
}

fn unary(input: &str) -> ParseResult<Expr> {
    alt((
        map(preceded(ws(char('-')), cut(unary)), |e| {
            Expr::unary(UnaryOp::Neg, e)
        }),
        // `!` but not the start of `!=`
        map(
            preceded(ws(terminated(char('!'), not(peek(char('='))))), cut(unary)),
            |e| Expr::unary(UnaryOp::Not, e),
        ),
        primary,
    ))(input)
}

fn call(input: &str) -> ParseResult<Expr> {
    let (input, name) = identifier(input)?;
    let (input, args) = context(
        "method call",
        cut(delimited(
            ws(char('(')),
            separated_list0(ws(char(',')), or_expr),
            ws(char(')')),
        )),
    )(input)?;
    Ok((input, Expr::call(name, args)))
}

fn primary(input: &str) -> ParseResult<Expr> {
    ws(alt((
        delimited(char('('), ws(or_expr), cut(char(')'))),
        map(number, Expr::Literal),
        map(string, Expr::Literal),
        value(Expr::Literal(Literal::Bool(true)), keyword("true")),
        value(Expr::Literal(Literal::Bool(false)), keyword("false")),
        value(Expr::Literal(Literal::Null), keyword("null")),
        call,
    )))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call0(name: &str) -> Expr {
        Expr::call(name, vec![])
    }

    fn int(i: i64) -> Expr {
        Expr::Literal(Literal::Int(i))
    }

    #[test]
    fn test_parse_call_and_comparison() {
        let expr = parse("HasSomething() and 1 > 0").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::And,
                call0("HasSomething"),
                Expr::binary(BinaryOp::Gt, int(1), int(0)),
            )
        );
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3 == 7 || not false").unwrap();
        assert_eq!(expr.to_string(), "(((1 + (2 * 3)) == 7) or not false)");
    }

    #[test]
    fn test_left_associative() {
        let expr = parse("10 - 4 - 3").unwrap();
        assert_eq!(expr.to_string(), "((10 - 4) - 3)");
    }

    #[test]
    fn test_call_arguments() {
        let expr = parse("GetValue(3, 'a', Other())").unwrap();
        assert_eq!(
            expr,
            Expr::call(
                "GetValue",
                vec![
                    int(3),
                    Expr::Literal(Literal::Str("a".into())),
                    call0("Other"),
                ]
            )
        );
        assert_eq!(expr.method_calls(), vec!["Other", "GetValue"]);
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("2.5").unwrap(), Expr::Literal(Literal::Float(2.5)));
        assert_eq!(parse("\"\"").unwrap(), Expr::Literal(Literal::Str(String::new())));
        assert_eq!(
            parse(r#""say \"hi\"""#).unwrap(),
            Expr::Literal(Literal::Str("say \"hi\"".into()))
        );
        assert_eq!(parse(" null ").unwrap(), Expr::Literal(Literal::Null));
        assert_eq!(
            parse("-x()").unwrap(),
            Expr::unary(UnaryOp::Neg, call0("x"))
        );
    }

    #[test]
    fn test_keyword_prefixed_names_are_calls() {
        assert_eq!(parse("notify()").unwrap(), call0("notify"));
        assert_eq!(parse("trueish()").unwrap(), call0("trueish"));
        assert_eq!(
            parse("!a() != b()").unwrap(),
            Expr::binary(
                BinaryOp::Ne,
                Expr::unary(UnaryOp::Not, call0("a")),
                call0("b")
            )
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse("").is_err());
        assert!(parse("Foo").is_err());
        assert!(parse("Foo(").is_err());
        assert!(parse("1 +").is_err());
        assert!(parse("'open").is_err());
        assert!(parse("a() b()").is_err());
        assert!(parse("1 < 2 < 3").is_err());
        assert!(parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_error_position() {
        let err = parse("GetName() +").unwrap_err();
        assert!(err.column > 1);
        assert!(!err.message.is_empty());

        let err = parse("Ok() ???").unwrap_err();
        assert_eq!(err.column, 6);
        assert!(err.fragment.starts_with("???"));
    }
}
