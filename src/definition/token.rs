//! Lexer for KEGG module definition strings (spec §4.1).
//!
//! The grammar has exactly five token kinds, so this stays a hand-rolled
//! character scanner rather than pulling in a parser-combinator crate --
//! same call the teacher made for `Region::from_str`.

use crate::error::DefinitionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    Comma,
    Space,
    Minus,
    Atom(String),
}

/// Lexes a definition string into a flat token stream. Consecutive
/// whitespace collapses to one `Space` token; any character that is not
/// part of a KO atom, whitespace, `(`, `)`, `,`, or `-` is a `LexError`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, DefinitionError> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (offset, ch) = chars[i];
        match ch {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            c if c.is_whitespace() => {
                while i < chars.len() && chars[i].1.is_whitespace() {
                    i += 1;
                }
                tokens.push(Token::Space);
            }
            'K' if matches!(chars.get(i + 1), Some((_, d)) if d.is_ascii_digit()) => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].1.is_ascii_digit() {
                    i += 1;
                }
                let end = if i < chars.len() { chars[i].0 } else { input.len() };
                tokens.push(Token::Atom(input[chars[start].0..end].to_string()));
            }
            other => {
                return Err(DefinitionError::LexError { offset, ch: other });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_sequential() {
        let toks = tokenize("K00844 K01810").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Atom("K00844".into()),
                Token::Space,
                Token::Atom("K01810".into()),
            ]
        );
    }

    #[test]
    fn tokenizes_alternation() {
        let toks = tokenize("K00844,K01810").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Atom("K00844".into()),
                Token::Comma,
                Token::Atom("K01810".into()),
            ]
        );
    }

    #[test]
    fn collapses_whitespace() {
        let toks = tokenize("K00844   K01810").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Atom("K00844".into()),
                Token::Space,
                Token::Atom("K01810".into()),
            ]
        );
    }

    #[test]
    fn tokenizes_groups_and_minus() {
        let toks = tokenize("-(K00844,K01810)").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Minus,
                Token::LParen,
                Token::Atom("K00844".into()),
                Token::Comma,
                Token::Atom("K01810".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn rejects_unknown_character() {
        let err = tokenize("K00844 & K01810").unwrap_err();
        assert_eq!(
            err,
            DefinitionError::LexError {
                offset: 7,
                ch: '&'
            }
        );
    }
}
