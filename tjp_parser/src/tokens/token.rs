//! TJP token model
//!
//! Identifiers stay plain `Id` tokens; keywords are recognised by the grammar
//! through literal symbols, never by the lexer. The lexer only decides the
//! token class.
use chrono::NaiveDateTime;
use std::fmt;

/// Token classes the grammar can reference with `$CLASS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Id,
    IdWithColon,
    AbsoluteId,
    RelativeId,
    String,
    Integer,
    Float,
    Date,
    Time,
}

impl TokenClass {
    pub const ALL: [TokenClass; 9] = [
        TokenClass::Id,
        TokenClass::IdWithColon,
        TokenClass::AbsoluteId,
        TokenClass::RelativeId,
        TokenClass::String,
        TokenClass::Integer,
        TokenClass::Float,
        TokenClass::Date,
        TokenClass::Time,
    ];

    /// Name used in grammar symbol specs (`$ID`, `$DATE`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Id => "ID",
            TokenClass::IdWithColon => "ID_WITH_COLON",
            TokenClass::AbsoluteId => "ABSOLUTE_ID",
            TokenClass::RelativeId => "RELATIVE_ID",
            TokenClass::String => "STRING",
            TokenClass::Integer => "INTEGER",
            TokenClass::Float => "FLOAT",
            TokenClass::Date => "DATE",
            TokenClass::Time => "TIME",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// Human wording for "expected ..." diagnostics
    pub fn description(&self) -> &'static str {
        match self {
            TokenClass::Id => "an identifier",
            TokenClass::IdWithColon => "an identifier followed by ':'",
            TokenClass::AbsoluteId => "a dotted identifier",
            TokenClass::RelativeId => "a relative identifier",
            TokenClass::String => "a string",
            TokenClass::Integer => "an integer",
            TokenClass::Float => "a floating point number",
            TokenClass::Date => "a date",
            TokenClass::Time => "a time of day",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Punctuation and operator characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuation {
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Comma,
    Minus,
    Plus,
    Tilde,
    Pipe,
    Ampersand,
    Equals,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl Punctuation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuation::LeftBrace => "{",
            Punctuation::RightBrace => "}",
            Punctuation::LeftParen => "(",
            Punctuation::RightParen => ")",
            Punctuation::Comma => ",",
            Punctuation::Minus => "-",
            Punctuation::Plus => "+",
            Punctuation::Tilde => "~",
            Punctuation::Pipe => "|",
            Punctuation::Ampersand => "&",
            Punctuation::Equals => "=",
            Punctuation::Greater => ">",
            Punctuation::Less => "<",
            Punctuation::GreaterOrEqual => ">=",
            Punctuation::LessOrEqual => "<=",
        }
    }

    /// Classify a single character, without looking at what follows
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '{' => Punctuation::LeftBrace,
            '}' => Punctuation::RightBrace,
            '(' => Punctuation::LeftParen,
            ')' => Punctuation::RightParen,
            ',' => Punctuation::Comma,
            '-' => Punctuation::Minus,
            '+' => Punctuation::Plus,
            '~' => Punctuation::Tilde,
            '|' => Punctuation::Pipe,
            '&' => Punctuation::Ampersand,
            '=' => Punctuation::Equals,
            '>' => Punctuation::Greater,
            '<' => Punctuation::Less,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Plain identifier, also used for every keyword
    Id(String),
    /// `name:` (payload without the colon)
    IdWithColon(String),
    /// `a.b.c`
    AbsoluteId(String),
    /// `!a` or `!!a.b` (payload keeps the bangs)
    RelativeId(String),
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDateTime),
    /// Seconds after midnight; `24:00` is allowed
    Time(u32),
    Punct(Punctuation),
    Comment(String),
    Eof,
}

impl Token {
    /// Class of a value-carrying token; `None` for punctuation, comments and EOF
    pub fn class(&self) -> Option<TokenClass> {
        match self {
            Token::Id(_) => Some(TokenClass::Id),
            Token::IdWithColon(_) => Some(TokenClass::IdWithColon),
            Token::AbsoluteId(_) => Some(TokenClass::AbsoluteId),
            Token::RelativeId(_) => Some(TokenClass::RelativeId),
            Token::String(_) => Some(TokenClass::String),
            Token::Integer(_) => Some(TokenClass::Integer),
            Token::Float(_) => Some(TokenClass::Float),
            Token::Date(_) => Some(TokenClass::Date),
            Token::Time(_) => Some(TokenClass::Time),
            Token::Punct(_) | Token::Comment(_) | Token::Eof => None,
        }
    }

    /// Text a literal grammar symbol is compared against
    pub fn literal_text(&self) -> Option<&str> {
        match self {
            Token::Id(s) => Some(s),
            Token::Punct(p) => Some(p.as_str()),
            _ => None,
        }
    }

    pub fn matches_literal(&self, literal: &str) -> bool {
        self.literal_text() == Some(literal)
    }

    pub fn is_significant(&self) -> bool {
        !matches!(self, Token::Comment(_))
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    /// Source-like rendering for diagnostics
    pub fn as_tjp_string(&self) -> String {
        match self {
            Token::Id(s) | Token::AbsoluteId(s) | Token::RelativeId(s) => s.clone(),
            Token::IdWithColon(s) => format!("{}:", s),
            Token::String(s) => format!("\"{}\"", s),
            Token::Integer(i) => i.to_string(),
            Token::Float(f) => f.to_string(),
            Token::Date(d) => d.format("%Y-%m-%d-%H:%M").to_string(),
            Token::Time(t) => format!("{}:{:02}", t / 3600, (t % 3600) / 60),
            Token::Punct(p) => p.as_str().to_string(),
            Token::Comment(_) => "<comment>".to_string(),
            Token::Eof => "<EOF>".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_tjp_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_class_names_round_trip() {
        for class in TokenClass::ALL {
            assert_eq!(TokenClass::from_name(class.as_str()), Some(class));
        }
        assert_eq!(TokenClass::from_name("NUMBER"), None);
    }

    #[test]
    fn test_literal_matching() {
        assert!(Token::Id("task".into()).matches_literal("task"));
        assert!(Token::Punct(Punctuation::RightBrace).matches_literal("}"));
        assert!(!Token::String("task".into()).matches_literal("task"));
        assert!(!Token::IdWithColon("task".into()).matches_literal("task"));
    }

    #[test]
    fn test_tjp_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(Token::Date(date).as_tjp_string(), "2024-01-15-09:30");
        assert_eq!(Token::Time(9 * 3600 + 5 * 60).as_tjp_string(), "9:05");
        assert_eq!(Token::String("Name".into()).as_tjp_string(), "\"Name\"");
        assert_eq!(Token::Eof.as_tjp_string(), "<EOF>");
    }

    #[test]
    fn test_comments_are_not_significant() {
        assert!(!Token::Comment("# x".into()).is_significant());
        assert!(Token::Eof.is_significant());
        assert_eq!(Token::Comment(String::new()).class(), None);
    }
}
