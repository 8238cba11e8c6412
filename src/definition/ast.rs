//! Expression parser for KEGG module definitions (spec §3, §4.2).

use crate::{definition::token::Token, error::DefinitionError, ko::Ko};

/// A node in the parsed module expression tree.
///
/// `Optional` is not one of spec.md's two named combinators; it is the
/// chosen representation of a `-`/`--` marked subtree (spec §4.2). The
/// graph compiler unwraps it when compiling edges and uses it to collect
/// `optional_kos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Leaf(Ko),
    Seq(Vec<Expr>),
    Alt(Vec<Expr>),
    Optional(Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_spaces(&mut self) {
        while matches!(self.peek(), Some(Token::Space)) {
            self.pos += 1;
        }
    }

    // expr := seq
    fn parse_expr(&mut self) -> Result<Expr, DefinitionError> {
        self.parse_seq()
    }

    // seq := alt (SPACE alt)*
    fn parse_seq(&mut self) -> Result<Expr, DefinitionError> {
        let mut children = Vec::new();
        push_flattened_seq(&mut children, self.parse_alt()?);
        loop {
            if matches!(self.peek(), Some(Token::Space)) {
                self.pos += 1;
                // trailing space before a closing paren / end is not a
                // second sequential element.
                if matches!(self.peek(), Some(Token::RParen)) || self.peek().is_none() {
                    break;
                }
                let next = self.parse_alt()?;
                push_flattened_seq(&mut children, next);
            } else {
                break;
            }
        }
        Ok(flatten_unary_seq(children))
    }

    // alt := unary (COMMA unary)*
    fn parse_alt(&mut self) -> Result<Expr, DefinitionError> {
        let mut children = Vec::new();
        push_flattened_alt(&mut children, self.parse_unary()?);
        loop {
            if matches!(self.peek(), Some(Token::Comma)) {
                self.pos += 1;
                let next = self.parse_unary()?;
                push_flattened_alt(&mut children, next);
            } else {
                break;
            }
        }
        Ok(flatten_unary_alt(children))
    }

    // unary := MINUS? atom_or_group
    fn parse_unary(&mut self) -> Result<Expr, DefinitionError> {
        let mut optional = false;
        while matches!(self.peek(), Some(Token::Minus)) {
            optional = true;
            self.pos += 1;
        }
        let inner = self.parse_atom_or_group()?;
        if optional {
            Ok(Expr::Optional(Box::new(inner)))
        } else {
            Ok(inner)
        }
    }

    // atom_or_group := group | ATOM
    fn parse_atom_or_group(&mut self) -> Result<Expr, DefinitionError> {
        match self.peek() {
            Some(Token::LParen) => {
                self.pos += 1;
                self.eat_spaces();
                if matches!(self.peek(), Some(Token::RParen)) {
                    return Err(DefinitionError::EmptyGroup);
                }
                let inner = self.parse_expr()?;
                self.eat_spaces();
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(DefinitionError::UnbalancedParen),
                }
            }
            Some(Token::Atom(_)) => {
                let Some(Token::Atom(s)) = self.bump() else {
                    unreachable!()
                };
                let ko = Ko::new(s)?;
                Ok(Expr::Leaf(ko))
            }
            Some(Token::Comma) | Some(Token::RParen) | None => Err(DefinitionError::EmptyGroup),
            Some(_) => Err(DefinitionError::UnexpectedToken { position: self.pos }),
        }
    }
}

fn push_flattened_seq(children: &mut Vec<Expr>, next: Expr) {
    match next {
        Expr::Seq(inner) => children.extend(inner),
        other => children.push(other),
    }
}

fn push_flattened_alt(children: &mut Vec<Expr>, next: Expr) {
    match next {
        Expr::Alt(inner) => children.extend(inner),
        other => children.push(other),
    }
}

fn flatten_unary_seq(mut children: Vec<Expr>) -> Expr {
    if children.len() == 1 {
        children.pop().unwrap()
    } else {
        Expr::Seq(children)
    }
}

fn flatten_unary_alt(mut children: Vec<Expr>) -> Expr {
    if children.len() == 1 {
        children.pop().unwrap()
    } else {
        Expr::Alt(children)
    }
}

/// Strips leading/trailing `Space` tokens so the grammar above never has to
/// special-case whitespace at the string's edges.
fn trim_spaces(mut tokens: Vec<Token>) -> Vec<Token> {
    while matches!(tokens.first(), Some(Token::Space)) {
        tokens.remove(0);
    }
    while matches!(tokens.last(), Some(Token::Space)) {
        tokens.pop();
    }
    tokens
}

/// Parses a raw KEGG module definition string into its canonical expression
/// tree (spec §4.2).
pub fn parse(definition: &str) -> Result<Expr, DefinitionError> {
    let tokens = trim_spaces(crate::definition::token::tokenize(definition)?);
    if tokens.is_empty() {
        return Err(DefinitionError::EmptyGroup);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(DefinitionError::UnexpectedToken { position: parser.pos });
    }
    Ok(expr)
}
