use nom::{
    IResult,
    Parser,                                          // For .map() and .parse() on parsers
    branch::alt,                                     // For trying multiple token parsers
    bytes::complete::{tag, take_while1},             // Literal operators and identifier runs
    character::complete::{digit1, multispace0, one_of}, // Digits, whitespace, single-char tokens
};
use tracing::trace;

use crate::engine::token::{Token, TokenKind, TokenSource, lookup_ident};

/// Scans source text into tokens on demand.
#[derive(Debug)]
pub struct Lexer {
    input: String,
    position: usize,
}

impl Lexer {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            position: 0,
        }
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        let remaining = &self.input[self.position..];
        let trimmed = match multispace0::<&str, nom::error::Error<&str>>(remaining) {
            Ok((rest, _)) => rest,
            Err(_) => remaining,
        };
        let skipped = remaining.len() - trimmed.len();

        if trimmed.is_empty() {
            self.position = self.input.len();
            return Token::eof();
        }

        let (token, consumed) = match lex_token(trimmed) {
            Ok((rest, token)) => (token, trimmed.len() - rest.len()),
            Err(_) => {
                let illegal: String = trimmed.chars().take(1).collect();
                let len = illegal.len();
                (Token::new(TokenKind::Illegal, illegal), len)
            }
        };

        self.position += skipped + consumed;
        trace!(kind = %token.kind, literal = %token.literal, position = self.position, "Scanned token");
        token
    }
}

// `==` and `!=` must be tried before their single-character prefixes.
fn lex_token(input: &str) -> IResult<&str, Token> {
    alt((lex_two_char_operator, lex_single_char, lex_word, lex_integer)).parse(input)
}

fn lex_two_char_operator(input: &str) -> IResult<&str, Token> {
    alt((tag("=="), tag("!=")))
        .map(|op: &str| {
            let kind = if op == "==" {
                TokenKind::Eq
            } else {
                TokenKind::NotEq
            };
            Token::new(kind, op)
        })
        .parse(input)
}

fn lex_single_char(input: &str) -> IResult<&str, Token> {
    one_of("=+-!*/<>,;(){}")
        .map(|c: char| Token::new(single_char_kind(c), c.to_string()))
        .parse(input)
}

fn single_char_kind(c: char) -> TokenKind {
    match c {
        '=' => TokenKind::Assign,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '!' => TokenKind::Bang,
        '*' => TokenKind::Asterisk,
        '/' => TokenKind::Slash,
        '<' => TokenKind::Lt,
        '>' => TokenKind::Gt,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        _ => TokenKind::Illegal,
    }
}

// Identifiers are ASCII letters and underscores; digits are not allowed.
fn lex_word(input: &str) -> IResult<&str, Token> {
    take_while1(|c: char| c.is_ascii_alphabetic() || c == '_')
        .map(|word: &str| Token::new(lookup_ident(word), word))
        .parse(input)
}

fn lex_integer(input: &str) -> IResult<&str, Token> {
    digit1
        .map(|digits: &str| Token::new(TokenKind::Int, digits))
        .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    fn collect(input: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push((token.kind, token.literal));
            if done {
                break;
            }
        }
        tokens
    }

    #[test]
    fn test_single_char_tokens() {
        init_test_logging();
        let kinds: Vec<TokenKind> = collect("=+(){},;").into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Assign,
                TokenKind::Plus,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_program_tokens() {
        init_test_logging();
        let input = "let five = 5;
let add = fn(x, y) {
  x + y;
};
let result = add(five, 10);
!-/*5;
5 < 10 > 5;
if (5 < 10) {
    return true;
} else {
    return false;
}
10 == 10;
10 != 9;";
        let expected = vec![
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "five"),
            (TokenKind::Assign, "="),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "add"),
            (TokenKind::Assign, "="),
            (TokenKind::Function, "fn"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "x"),
            (TokenKind::Comma, ","),
            (TokenKind::Ident, "y"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Ident, "x"),
            (TokenKind::Plus, "+"),
            (TokenKind::Ident, "y"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "result"),
            (TokenKind::Assign, "="),
            (TokenKind::Ident, "add"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "five"),
            (TokenKind::Comma, ","),
            (TokenKind::Int, "10"),
            (TokenKind::RParen, ")"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Bang, "!"),
            (TokenKind::Minus, "-"),
            (TokenKind::Slash, "/"),
            (TokenKind::Asterisk, "*"),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Int, "5"),
            (TokenKind::Lt, "<"),
            (TokenKind::Int, "10"),
            (TokenKind::Gt, ">"),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::If, "if"),
            (TokenKind::LParen, "("),
            (TokenKind::Int, "5"),
            (TokenKind::Lt, "<"),
            (TokenKind::Int, "10"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::True, "true"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Else, "else"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::False, "false"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Int, "10"),
            (TokenKind::Eq, "=="),
            (TokenKind::Int, "10"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Int, "10"),
            (TokenKind::NotEq, "!="),
            (TokenKind::Int, "9"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Eof, ""),
        ];
        let expected: Vec<(TokenKind, String)> = expected
            .into_iter()
            .map(|(k, l)| (k, l.to_string()))
            .collect();
        assert_eq!(collect(input), expected);
    }

    #[test]
    fn test_illegal_character_is_skipped() {
        init_test_logging();
        assert_eq!(
            collect("5 @ x"),
            vec![
                (TokenKind::Int, "5".to_string()),
                (TokenKind::Illegal, "@".to_string()),
                (TokenKind::Ident, "x".to_string()),
                (TokenKind::Eof, "".to_string()),
            ]
        );
    }

    #[test]
    fn test_multibyte_illegal_character() {
        init_test_logging();
        assert_eq!(
            collect("é1"),
            vec![
                (TokenKind::Illegal, "é".to_string()),
                (TokenKind::Int, "1".to_string()),
                (TokenKind::Eof, "".to_string()),
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        init_test_logging();
        let mut lexer = Lexer::new("  \n\t");
        assert_eq!(lexer.next_token(), Token::eof());
        assert_eq!(lexer.next_token(), Token::eof());
    }

    #[test]
    fn test_identifier_stops_at_digit() {
        init_test_logging();
        assert_eq!(
            collect("foo_bar1"),
            vec![
                (TokenKind::Ident, "foo_bar".to_string()),
                (TokenKind::Int, "1".to_string()),
                (TokenKind::Eof, "".to_string()),
            ]
        );
    }
}
