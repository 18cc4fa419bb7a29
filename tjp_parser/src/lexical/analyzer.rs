//! TJP lexical analyzer
//!
//! Turns source text into a [`TokenStream`]. Keywords are emitted as plain
//! identifiers; the grammar decides what they mean.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{Punctuation, SpannedToken, Token, TokenStream};
use crate::utils::{Position, SourceMap, Span};
use crate::{log_debug, log_error, log_success};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}'")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Unterminated string")]
    UnterminatedString { line: u32, column: u32 },

    #[error("Unterminated comment")]
    UnterminatedComment { line: u32, column: u32 },

    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String, line: u32, column: u32 },

    #[error("Invalid date or time '{text}'")]
    InvalidDate { text: String, line: u32, column: u32 },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, line: u32, column: u32 },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize, line: u32, column: u32 },

    #[error("Comment too long: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize, line: u32, column: u32 },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize, line: u32, column: u32 },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::InvalidDate { .. } => codes::lexical::INVALID_DATE,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Line and column where the offending lexeme starts
    pub fn line_column(&self) -> (u32, u32) {
        match self {
            LexerError::InvalidCharacter { line, column, .. }
            | LexerError::UnterminatedString { line, column }
            | LexerError::UnterminatedComment { line, column }
            | LexerError::InvalidNumber { line, column, .. }
            | LexerError::InvalidDate { line, column, .. }
            | LexerError::IdentifierTooLong { line, column, .. }
            | LexerError::StringTooLarge { line, column, .. }
            | LexerError::CommentTooLong { line, column, .. }
            | LexerError::TooManyTokens { line, column, .. } => (*line, *column),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub punctuation_tokens: usize,
    pub comment_count: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,
    /// Per token class counts, only filled with detailed metrics enabled
    pub class_counts: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        match token {
            Token::Id(_) | Token::IdWithColon(_) | Token::AbsoluteId(_) | Token::RelativeId(_) => {
                self.identifier_tokens += 1
            }
            Token::String(s) => {
                self.literal_tokens += 1;
                self.max_string_length = self.max_string_length.max(s.len());
            }
            Token::Integer(_) | Token::Float(_) | Token::Date(_) | Token::Time(_) => {
                self.literal_tokens += 1
            }
            Token::Punct(_) => self.punctuation_tokens += 1,
            Token::Comment(text) => {
                self.comment_count += 1;
                self.max_comment_length = self.max_comment_length.max(text.len());
            }
            Token::Eof => {}
        }

        if preferences.collect_detailed_metrics {
            if let Some(class) = token.class() {
                *self.class_counts.entry(class.to_string()).or_insert(0) += 1;
            }
        }
    }
}

/// Character cursor that keeps `Position` in step with the byte offset
struct Cursor<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos.offset;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
        &self.source[start..self.pos.offset]
    }

    fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }
}

fn is_id_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_id_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<TokenStream, LexerError> {
        let name = file_result.metadata.path.display().to_string();
        self.tokenize_str(&name, &file_result.source)
    }

    /// Tokenize `source`; `name` is used for diagnostics and the source map
    pub fn tokenize_str(&mut self, name: &str, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis",
            "file" => name,
            "bytes" => source.len(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let mut cursor = Cursor::new(source);
        let mut tokens: Vec<SpannedToken> = Vec::new();
        let mut counted = 0usize;

        loop {
            cursor.skip_whitespace();
            let start = cursor.pos;
            let Some(ch) = cursor.peek() else { break };

            let scanned = self.scan_token(&mut cursor, ch).and_then(|token| {
                if token.is_significant() || self.preferences.include_comments_in_counts {
                    counted += 1;
                    if counted > MAX_TOKEN_COUNT {
                        return Err(LexerError::TooManyTokens {
                            count: counted,
                            line: start.line,
                            column: start.column,
                        });
                    }
                }
                Ok(token)
            });

            let token = match scanned {
                Ok(token) => token,
                Err(error) => {
                    log_error!(error.error_code(), "Lexical analysis failed",
                        span = Span::new(start, cursor.pos),
                        "file" => name,
                        "line" => start.line,
                        "column" => start.column,
                        "tokens_processed" => counted
                    );
                    return Err(error);
                }
            };

            self.metrics.record_token(&token, &self.preferences);
            tokens.push(SpannedToken::new(token, Span::new(start, cursor.pos)));
        }

        let end = cursor.pos;
        tokens.push(SpannedToken::new(Token::Eof, Span::new(end, end)));

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
            "file" => name,
            "tokens" => self.metrics.total_tokens,
            "identifiers" => self.metrics.identifier_tokens,
            "literals" => self.metrics.literal_tokens,
            "comments" => self.metrics.comment_count
        );

        Ok(TokenStream::with_source_map(
            tokens,
            SourceMap::new(name, source.to_string()),
        ))
    }

    fn scan_token(&self, cursor: &mut Cursor<'_>, ch: char) -> Result<Token, LexerError> {
        let start = cursor.pos;
        match ch {
            '#' => self.scan_line_comment(cursor),
            '/' => match cursor.peek_nth(1) {
                Some('/') => self.scan_line_comment(cursor),
                Some('*') => self.scan_block_comment(cursor),
                _ => Err(invalid_character(ch, start)),
            },
            '"' | '\'' => self.scan_string(cursor, ch),
            '0'..='9' => self.scan_number(cursor),
            '!' => self.scan_relative_id(cursor),
            c if is_id_start(c) => self.scan_identifier(cursor),
            '>' | '<' => {
                cursor.bump();
                let token = match (ch, cursor.peek()) {
                    ('>', Some('=')) => Punctuation::GreaterOrEqual,
                    ('<', Some('=')) => Punctuation::LessOrEqual,
                    ('>', _) => return Ok(Token::Punct(Punctuation::Greater)),
                    _ => return Ok(Token::Punct(Punctuation::Less)),
                };
                cursor.bump();
                Ok(Token::Punct(token))
            }
            _ => match Punctuation::from_char(ch) {
                Some(punct) => {
                    cursor.bump();
                    Ok(Token::Punct(punct))
                }
                None => Err(invalid_character(ch, start)),
            },
        }
    }

    fn scan_line_comment(&self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        let text = cursor.eat_while(|c| c != '\n');
        self.check_comment(text, start)
    }

    fn scan_block_comment(&self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        let Some(close) = cursor.rest()[2..].find("*/") else {
            return Err(LexerError::UnterminatedComment {
                line: start.line,
                column: start.column,
            });
        };
        let text = &cursor.rest()[..close + 4];
        for _ in text.chars() {
            cursor.bump();
        }
        self.check_comment(text, start)
    }

    fn check_comment(&self, text: &str, start: Position) -> Result<Token, LexerError> {
        if text.len() > MAX_COMMENT_LENGTH {
            return Err(LexerError::CommentTooLong {
                length: text.len(),
                line: start.line,
                column: start.column,
            });
        }
        Ok(Token::Comment(text.to_string()))
    }

    fn scan_string(&self, cursor: &mut Cursor<'_>, quote: char) -> Result<Token, LexerError> {
        let start = cursor.pos;
        cursor.bump();
        let mut value = String::new();

        loop {
            let Some(ch) = cursor.bump() else {
                return Err(LexerError::UnterminatedString {
                    line: start.line,
                    column: start.column,
                });
            };
            match ch {
                c if c == quote => break,
                '\\' => match cursor.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(c) if c == quote || c == '\\' => value.push(c),
                    Some(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => {
                        return Err(LexerError::UnterminatedString {
                            line: start.line,
                            column: start.column,
                        })
                    }
                },
                c => value.push(c),
            }

            if value.len() > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge {
                    size: value.len(),
                    line: start.line,
                    column: start.column,
                });
            }
        }

        Ok(Token::String(value))
    }

    /// INTEGER, FLOAT, DATE (`YYYY-MM-DD[-HH:MM[:SS]]`) or TIME (`H:MM`)
    fn scan_number(&self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        let digits = cursor.eat_while(|c| c.is_ascii_digit());
        let next = cursor.peek();
        let after = cursor.peek_nth(1).map(|c| c.is_ascii_digit()).unwrap_or(false);

        match next {
            Some('-') if digits.len() == 4 && after => self.scan_date(cursor, start),
            Some(':') if after => {
                cursor.bump();
                let minutes = cursor.eat_while(|c| c.is_ascii_digit());
                let text = &cursor.source[start.offset..cursor.pos.offset];
                parse_time_of_day(digits, minutes).map(Token::Time).ok_or_else(|| {
                    LexerError::InvalidDate {
                        text: text.to_string(),
                        line: start.line,
                        column: start.column,
                    }
                })
            }
            Some('.') if after => {
                cursor.bump();
                cursor.eat_while(|c| c.is_ascii_digit());
                let text = &cursor.source[start.offset..cursor.pos.offset];
                text.parse::<f64>()
                    .map(Token::Float)
                    .map_err(|_| LexerError::InvalidNumber {
                        text: text.to_string(),
                        line: start.line,
                        column: start.column,
                    })
            }
            _ => digits
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| LexerError::InvalidNumber {
                    text: digits.to_string(),
                    line: start.line,
                    column: start.column,
                }),
        }
    }

    fn scan_date(&self, cursor: &mut Cursor<'_>, start: Position) -> Result<Token, LexerError> {
        let invalid = |cursor: &Cursor<'_>| LexerError::InvalidDate {
            text: cursor.source[start.offset..cursor.pos.offset].to_string(),
            line: start.line,
            column: start.column,
        };

        let mut parts = [0u32; 2];
        for part in parts.iter_mut() {
            if cursor.peek() != Some('-') {
                return Err(invalid(cursor));
            }
            cursor.bump();
            let digits = cursor.eat_while(|c| c.is_ascii_digit());
            *part = digits.parse().map_err(|_| invalid(cursor))?;
        }

        let year: i32 = cursor.source[start.offset..start.offset + 4]
            .parse()
            .map_err(|_| invalid(cursor))?;
        let date = NaiveDate::from_ymd_opt(year, parts[0], parts[1]).ok_or_else(|| invalid(cursor))?;

        // Optional `-HH:MM[:SS]`; a bare `-` after the date is left for the grammar
        let has_time = cursor.peek() == Some('-')
            && cursor.rest()[1..]
                .chars()
                .skip_while(|c| c.is_ascii_digit())
                .next()
                == Some(':')
            && cursor.peek_nth(1).map(|c| c.is_ascii_digit()).unwrap_or(false);

        let mut time = NaiveTime::MIN;
        if has_time {
            cursor.bump();
            let hours = cursor.eat_while(|c| c.is_ascii_digit());
            cursor.bump();
            let minutes = cursor.eat_while(|c| c.is_ascii_digit());
            let mut seconds = "0";
            if cursor.peek() == Some(':') && cursor.peek_nth(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
                cursor.bump();
                seconds = cursor.eat_while(|c| c.is_ascii_digit());
            }
            let (h, m, s) = match (hours.parse(), minutes.parse(), seconds.parse()) {
                (Ok(h), Ok(m), Ok(s)) => (h, m, s),
                _ => return Err(invalid(cursor)),
            };
            time = NaiveTime::from_hms_opt(h, m, s).ok_or_else(|| invalid(cursor))?;
        }

        Ok(Token::Date(date.and_time(time)))
    }

    fn scan_identifier(&self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        cursor.eat_while(is_id_continue);

        let mut dotted = false;
        while cursor.peek() == Some('.') && cursor.peek_nth(1).map(is_id_start).unwrap_or(false) {
            dotted = true;
            cursor.bump();
            cursor.eat_while(is_id_continue);
        }

        let text = &cursor.source[start.offset..cursor.pos.offset];
        self.check_identifier(text, start)?;

        if dotted {
            return Ok(Token::AbsoluteId(text.to_string()));
        }
        if cursor.peek() == Some(':') {
            cursor.bump();
            return Ok(Token::IdWithColon(text.to_string()));
        }
        Ok(Token::Id(text.to_string()))
    }

    /// `!id`, `!!id`, `!!parent.child`
    fn scan_relative_id(&self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        cursor.eat_while(|c| c == '!');
        if !cursor.peek().map(is_id_start).unwrap_or(false) {
            return Err(invalid_character('!', start));
        }
        cursor.eat_while(is_id_continue);
        while cursor.peek() == Some('.') && cursor.peek_nth(1).map(is_id_start).unwrap_or(false) {
            cursor.bump();
            cursor.eat_while(is_id_continue);
        }

        let text = &cursor.source[start.offset..cursor.pos.offset];
        self.check_identifier(text, start)?;
        Ok(Token::RelativeId(text.to_string()))
    }

    fn check_identifier(&self, text: &str, start: Position) -> Result<(), LexerError> {
        if text.len() > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length: text.len(),
                line: start.line,
                column: start.column,
            });
        }
        Ok(())
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_character(character: char, at: Position) -> LexerError {
    LexerError::InvalidCharacter {
        character,
        line: at.line,
        column: at.column,
    }
}

/// Seconds after midnight for `H:MM`; `24:00` is the end of the day
fn parse_time_of_day(hours: &str, minutes: &str) -> Option<u32> {
    if minutes.len() != 2 {
        return None;
    }
    let h: u32 = hours.parse().ok()?;
    let m: u32 = minutes.parse().ok()?;
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return None;
    }
    Some(h * 3600 + m * 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lex(source: &str) -> Vec<Token> {
        let stream = LexicalAnalyzer::new().tokenize_str("test.tjp", source).unwrap();
        stream.iter_significant().map(|t| t.value.clone()).collect()
    }

    fn date(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_project_header() {
        let tokens = lex("project p \"Project\" \"1.0\" 2024-01-01 - 2024-03-01-12:30 {}");
        assert_eq!(
            tokens,
            vec![
                Token::Id("project".into()),
                Token::Id("p".into()),
                Token::String("Project".into()),
                Token::String("1.0".into()),
                Token::Date(date(2024, 1, 1, 0, 0)),
                Token::Punct(Punctuation::Minus),
                Token::Date(date(2024, 3, 1, 12, 30)),
                Token::Punct(Punctuation::LeftBrace),
                Token::Punct(Punctuation::RightBrace),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_identifier_classes() {
        let tokens = lex("delayed:start plan.end.down !parent !!a.b");
        assert_eq!(
            tokens,
            vec![
                Token::IdWithColon("delayed".into()),
                Token::Id("start".into()),
                Token::AbsoluteId("plan.end.down".into()),
                Token::RelativeId("!parent".into()),
                Token::RelativeId("!!a.b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers_times_and_durations() {
        let tokens = lex("8 7.5 9:00 24:00 2w 5min");
        assert_eq!(
            tokens,
            vec![
                Token::Integer(8),
                Token::Float(7.5),
                Token::Time(9 * 3600),
                Token::Time(24 * 3600),
                Token::Integer(2),
                Token::Id("w".into()),
                Token::Integer(5),
                Token::Id("min".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = lex(">= <= > < = | & ~ ( ) ,");
        let puncts: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Punct(p) => Some(p.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(puncts, vec![">=", "<=", ">", "<", "=", "|", "&", "~", "(", ")", ","]);
    }

    #[test]
    fn test_comments_are_kept_but_insignificant() {
        let stream = LexicalAnalyzer::new()
            .tokenize_str("c.tjp", "# one\ntask // two\n/* three\n */ t")
            .unwrap();
        assert_eq!(stream.all_tokens().len(), 6);
        assert_eq!(stream.len(), 3);
    }

    #[test]
    fn test_string_escapes_and_quotes() {
        let tokens = lex(r#"'single' "say \"hi\"\n""#);
        assert_eq!(tokens[0], Token::String("single".into()));
        assert_eq!(tokens[1], Token::String("say \"hi\"\n".into()));
    }

    #[test]
    fn test_spans_track_lines() {
        let stream = LexicalAnalyzer::new()
            .tokenize_str("s.tjp", "task t \"T\" {\n  priority 500\n}")
            .unwrap();
        let priority = stream
            .iter_significant()
            .find(|t| t.value == Token::Id("priority".into()))
            .unwrap();
        assert_eq!(priority.span.start.line, 2);
        assert_eq!(priority.span.start.column, 3);
    }

    #[test]
    fn test_lexical_errors() {
        let mut lexer = LexicalAnalyzer::new();
        assert_matches!(
            lexer.tokenize_str("e.tjp", "task \"open"),
            Err(LexerError::UnterminatedString { line: 1, column: 6 })
        );
        assert_matches!(
            lexer.tokenize_str("e.tjp", "2024-02-30"),
            Err(LexerError::InvalidDate { .. })
        );
        assert_matches!(
            lexer.tokenize_str("e.tjp", "25:00"),
            Err(LexerError::InvalidDate { .. })
        );
        assert_matches!(
            lexer.tokenize_str("e.tjp", "/* never closed"),
            Err(LexerError::UnterminatedComment { .. })
        );
        assert_matches!(
            lexer.tokenize_str("e.tjp", "task @"),
            Err(LexerError::InvalidCharacter { character: '@', line: 1, column: 6 })
        );
    }

    #[test]
    fn test_metrics() {
        let mut lexer = LexicalAnalyzer::with_preferences(LexicalPreferences {
            collect_detailed_metrics: true,
            include_comments_in_counts: false,
        });
        lexer.tokenize_str("m.tjp", "task t \"T\" # c\n").unwrap();
        let metrics = lexer.metrics();
        assert_eq!(metrics.identifier_tokens, 2);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.comment_count, 1);
        assert_eq!(metrics.class_counts.get("ID"), Some(&2));
    }
}
