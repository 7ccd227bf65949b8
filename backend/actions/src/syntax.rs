//! Tokenizer and parser for action expressions.
//!
//! Action expressions are a restricted s-expression form:
//! `(goto (storyFragmentPane hello why-choose))`. There is no quoting and at
//! most two levels of nesting (a command and its argument tuples). A bare
//! `https://` link is also accepted.

use std::iter::Peekable;
use std::str::Chars;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Deepest list nesting an action may use: `(command (tuple ...))`.
pub const MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("empty action expression")]
    Empty,
    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("expression nested deeper than two levels")]
    TooDeep,
    #[error("expected a command word at the head of the expression")]
    MissingCommand,
    #[error("trailing input after the action expression")]
    TrailingInput,
}

/// A lexed term: a bare word or a parenthesized list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Word(String),
    List(Vec<Expr>),
}

/// One positional parameter of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Word(String),
    Tuple(Vec<String>),
}

impl Param {
    /// Words of the parameter; a single word is a one-word tuple.
    pub fn words(&self) -> Vec<&str> {
        match self {
            Param::Word(w) => vec![w.as_str()],
            Param::Tuple(ws) => ws.iter().map(String::as_str).collect(),
        }
    }
}

/// A parsed command with its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionExpr {
    pub command: String,
    pub params: Vec<Param>,
}

/// A parsed action payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    Call(ActionExpr),
    Link { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Word(String),
}

struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable() }
    }

    fn next_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
        let Some(c) = self.chars.next() else {
            return Ok(None);
        };
        match c {
            '(' => Ok(Some(Token::LParen)),
            ')' => Ok(Some(Token::RParen)),
            _ if !is_word_char(c) => Err(SyntaxError::UnexpectedChar(c)),
            _ => {
                let mut word = c.to_string();
                while let Some(&nc) = self.chars.peek() {
                    if !is_word_char(nc) {
                        break;
                    }
                    word.push(nc);
                    self.chars.next();
                }
                Ok(Some(Token::Word(word)))
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    !(c.is_whitespace() || c.is_control() || matches!(c, '(' | ')' | '"' | '\'' | '`'))
}

/// Tokenize an action expression into nested terms.
///
/// Surplus closing parentheses after the final complete expression are
/// ignored; any other imbalance is an error.
pub fn lex(input: &str) -> Result<Vec<Expr>, SyntaxError> {
    let mut tokens = Tokenizer::new(input);
    let mut stack: Vec<Vec<Expr>> = Vec::new();
    let mut results = Vec::new();
    let mut trailing_closers = 0usize;

    while let Some(token) = tokens.next_token()? {
        if trailing_closers > 0 && token != Token::RParen {
            return Err(SyntaxError::TrailingInput);
        }
        match token {
            Token::LParen => {
                if stack.len() == MAX_DEPTH {
                    return Err(SyntaxError::TooDeep);
                }
                stack.push(Vec::new());
            }
            Token::RParen => match stack.pop() {
                Some(list) => {
                    let expr = Expr::List(list);
                    match stack.last_mut() {
                        Some(parent) => parent.push(expr),
                        None => results.push(expr),
                    }
                }
                None if !results.is_empty() => trailing_closers += 1,
                None => return Err(SyntaxError::UnbalancedParenthesis),
            },
            Token::Word(word) => match stack.last_mut() {
                Some(list) => list.push(Expr::Word(word)),
                None => results.push(Expr::Word(word)),
            },
        }
    }

    if !stack.is_empty() {
        return Err(SyntaxError::UnbalancedParenthesis);
    }
    if results.is_empty() {
        return Err(SyntaxError::Empty);
    }
    if trailing_closers > 0 {
        debug!(count = trailing_closers, "Ignored surplus closing parentheses");
    }
    Ok(results)
}

/// Interpret lexed terms as a single action.
pub fn parse_action(exprs: &[Expr]) -> Result<Action, SyntaxError> {
    let [first, rest @ ..] = exprs else {
        return Err(SyntaxError::Empty);
    };
    if !rest.is_empty() {
        return Err(SyntaxError::TrailingInput);
    }
    match first {
        Expr::Word(url) => Ok(Action::Link { url: url.clone() }),
        Expr::List(items) => {
            let Some(Expr::Word(command)) = items.first() else {
                return Err(SyntaxError::MissingCommand);
            };
            let params = items[1..]
                .iter()
                .map(|item| match item {
                    Expr::Word(w) => Ok(Param::Word(w.clone())),
                    Expr::List(inner) => inner
                        .iter()
                        .map(|e| match e {
                            Expr::Word(w) => Ok(w.clone()),
                            Expr::List(_) => Err(SyntaxError::TooDeep),
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map(Param::Tuple),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Action::Call(ActionExpr {
                command: command.clone(),
                params,
            }))
        }
    }
}

/// Lex and parse in one step.
pub fn parse(input: &str) -> Result<Action, SyntaxError> {
    parse_action(&lex(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Expr {
        Expr::Word(s.to_string())
    }

    #[test]
    fn test_lex_goto() {
        let exprs = lex("(goto (storyFragmentPane hello why-choose))").unwrap();
        assert_eq!(
            exprs,
            vec![Expr::List(vec![
                word("goto"),
                Expr::List(vec![word("storyFragmentPane"), word("hello"), word("why-choose")]),
            ])]
        );
    }

    #[test]
    fn test_lex_tolerates_surplus_closers() {
        assert!(lex("(goto (bunny hello 42)))").is_ok());
    }

    #[test]
    fn test_lex_errors() {
        assert_eq!(lex(""), Err(SyntaxError::Empty));
        assert_eq!(lex("   "), Err(SyntaxError::Empty));
        assert_eq!(lex("(goto (home)"), Err(SyntaxError::UnbalancedParenthesis));
        assert_eq!(lex(")"), Err(SyntaxError::UnbalancedParenthesis));
        assert_eq!(lex("(a (b (c)))"), Err(SyntaxError::TooDeep));
        assert_eq!(lex("(goto \"home\")"), Err(SyntaxError::UnexpectedChar('"')));
        assert_eq!(lex("(goto (home))) x"), Err(SyntaxError::TrailingInput));
    }

    #[test]
    fn test_parse_call() {
        let action = parse("(goto (storyFragment hello))").unwrap();
        assert_eq!(
            action,
            Action::Call(ActionExpr {
                command: "goto".into(),
                params: vec![Param::Tuple(vec!["storyFragment".into(), "hello".into()])],
            })
        );
    }

    #[test]
    fn test_parse_bare_link() {
        let action = parse("https://example.com/page").unwrap();
        assert_eq!(action, Action::Link { url: "https://example.com/page".into() });
    }

    #[test]
    fn test_parse_rejects_headless_list() {
        assert_eq!(parse("((goto))"), Err(SyntaxError::MissingCommand));
        assert_eq!(parse("(goto) (home)"), Err(SyntaxError::TrailingInput));
    }

    #[test]
    fn test_param_words() {
        assert_eq!(Param::Word("x".into()).words(), vec!["x"]);
        assert_eq!(Param::Tuple(vec!["a".into(), "b".into()]).words(), vec!["a", "b"]);
    }
}
