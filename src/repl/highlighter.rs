use crate::engine::token::KEYWORDS;
use lazy_static::lazy_static;
use owo_colors::OwoColorize;
use regex::Regex;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow::{self, Borrowed, Owned};

lazy_static! {
    // One alternation so each lexeme is matched once, left to right.
    static ref LEXEME_RE: Regex = Regex::new(
        r"(?P<word>[A-Za-z_]+)|(?P<number>\d+)|(?P<operator>==|!=|[=+\-!*/<>])|(?P<delimiter>[(){},;])"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    Keyword,
    Boolean,
    Identifier,
    Number,
    Operator,
    Delimiter,
}

fn classify_word(word: &str) -> Lexeme {
    match word {
        "true" | "false" => Lexeme::Boolean,
        _ if KEYWORDS.contains(&word) => Lexeme::Keyword,
        _ => Lexeme::Identifier,
    }
}

fn paint(text: &str, lexeme: Lexeme) -> String {
    match lexeme {
        Lexeme::Keyword => text.cyan().bold().to_string(),
        Lexeme::Boolean => text.yellow().to_string(),
        Lexeme::Identifier => text.to_string(),
        Lexeme::Number => text.magenta().to_string(),
        Lexeme::Operator => text.red().to_string(),
        Lexeme::Delimiter => text.blue().to_string(),
    }
}

/// Colours a line of Monkey source. Anything the regex does not recognise
/// (whitespace, stray characters) is copied through untouched.
pub fn highlight_source(line: &str) -> String {
    let mut styled = String::with_capacity(line.len() * 2);
    let mut last_end = 0;

    for caps in LEXEME_RE.captures_iter(line) {
        let (m, lexeme) = if let Some(m) = caps.name("word") {
            (m, classify_word(m.as_str()))
        } else if let Some(m) = caps.name("number") {
            (m, Lexeme::Number)
        } else if let Some(m) = caps.name("operator") {
            (m, Lexeme::Operator)
        } else if let Some(m) = caps.name("delimiter") {
            (m, Lexeme::Delimiter)
        } else {
            continue;
        };
        styled.push_str(&line[last_end..m.start()]);
        styled.push_str(&paint(m.as_str(), lexeme));
        last_end = m.end();
    }
    styled.push_str(&line[last_end..]);
    styled
}

#[derive(Default)]
pub struct MonkeyHighlighter {
    matching_bracket_highlighter: MatchingBracketHighlighter,
}

impl Highlighter for MonkeyHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        // Cursor on a bracket: show the match instead of syntax colours.
        if let Owned(bracketed) = self.matching_bracket_highlighter.highlight(line, pos) {
            return Owned(bracketed);
        }
        if line.is_empty() {
            return Borrowed(line);
        }
        Owned(highlight_source(line))
    }

    // Every edit can change token colours, so always repaint.
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

#[derive(Helper, Completer, Hinter, Validator, Default)]
pub struct ReplHelper {
    highlighter: MonkeyHighlighter,
}

impl ReplHelper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}
