use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Term(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Term(t) => f.write_str(t),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::Not => f.write_str("not"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn word(buf: &mut String, out: &mut Vec<Token>) {
    if buf.is_empty() { return; }
    let w = buf.to_lowercase();
    buf.clear();
    out.push(match w.as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        _ => Token::Term(w),
    });
}

/// Split a query into typed tokens. Parentheses are tokens of their own even
/// when glued to a word; keywords are matched case-insensitively and terms are
/// lowercased.
pub fn tokenize(query: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut buf = String::new();
    for ch in query.chars() {
        match ch {
            '(' | ')' => {
                word(&mut buf, &mut out);
                out.push(if ch == '(' { Token::LParen } else { Token::RParen });
            }
            c if c.is_whitespace() => word(&mut buf, &mut out),
            c => buf.push(c),
        }
    }
    word(&mut buf, &mut out);
    out
}

/// Render tokens back to query text, e.g. for error messages.
pub fn render(tokens: &[Token]) -> String {
    let mut s = String::new();
    for (i, t) in tokens.iter().enumerate() {
        let glue = i == 0
            || matches!(t, Token::RParen)
            || matches!(tokens[i - 1], Token::LParen);
        if !glue { s.push(' '); }
        s.push_str(&t.to_string());
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Token { Token::Term(s.into()) }

    #[test]
    fn splits_parens_from_words() {
        assert_eq!(
            tokenize("(cat AND dog)or NOT bird"),
            vec![Token::LParen, term("cat"), Token::And, term("dog"), Token::RParen, Token::Or, Token::Not, term("bird")]
        );
    }

    #[test]
    fn keywords_inside_words_are_terms() {
        assert_eq!(tokenize("android orchid"), vec![term("android"), term("orchid")]);
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(tokenize(" \t\n").is_empty());
    }

    #[test]
    fn render_round_trips_spacing() {
        assert_eq!(render(&tokenize("not ( cat or dog )")), "not (cat or dog)");
    }
}
