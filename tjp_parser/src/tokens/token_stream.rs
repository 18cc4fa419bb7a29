//! Span-accurate token stream for a single source file
//!
//! Comments stay in the stream for tooling; navigation only sees significant
//! tokens.

use crate::{
    tokens::token::*,
    utils::{Position, SourceMap, Span, Spanned},
};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens (including comments) with original spans
    all_tokens: Vec<SpannedToken>,
    /// Indices into all_tokens for significant tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let mut stream = Self {
            all_tokens: tokens,
            significant_indices: Vec::new(),
            position: 0,
            source_map: None,
        };
        stream.rebuild_significant_indices();
        stream
    }

    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    fn rebuild_significant_indices(&mut self) {
        self.significant_indices = self
            .all_tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.value.is_significant())
            .map(|(i, _)| i)
            .collect();

        crate::log_debug!("Token stream built",
            "total_tokens" => self.all_tokens.len(),
            "significant_tokens" => self.significant_indices.len()
        );

        self.position = 0;
    }

    /// Current significant token
    pub fn current(&self) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position)
            .and_then(|&original_index| self.all_tokens.get(original_index))
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    /// Token after the current one
    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&original_index| self.all_tokens.get(original_index))
    }

    /// Consume the current token and return it
    pub fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.current().cloned();
        if self.position < self.significant_indices.len() {
            self.position += 1;
        }
        token
    }

    pub fn is_at_end(&self) -> bool {
        self.current_token().map(Token::is_eof).unwrap_or(true)
    }

    /// Number of significant tokens, EOF included
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &SpannedToken> {
        self.significant_indices
            .iter()
            .map(|&i| &self.all_tokens[i])
    }

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_eof(&self) -> bool {
        self.significant_indices
            .last()
            .and_then(|&i| self.all_tokens.get(i))
            .map(|t| t.value.is_eof())
            .unwrap_or(false)
    }

    pub fn diagnostic(&self) -> String {
        let current_info = match self.current() {
            Some(current) => format!("'{}' at {}", current.value.as_tjp_string(), current.span),
            None => "<EOF>".to_string(),
        };

        format!(
            "TokenStream(pos: {}/{}, current: {})",
            self.position,
            self.significant_indices.len(),
            current_info
        )
    }
}

/// Builds a stream from (token, source text) pairs, computing spans as it goes
#[derive(Debug)]
pub struct TokenStreamBuilder {
    tokens: Vec<SpannedToken>,
    current_position: Position,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current_position: Position::start(),
        }
    }

    /// Add a token whose source text is `text`, followed by one space
    pub fn push_token(mut self, token: Token, text: &str) -> Self {
        let start = self.current_position;
        let end = start.advance_str(text);
        self.tokens.push(SpannedToken::new(token, Span::new(start, end)));
        self.current_position = end.advance(' ');
        self
    }

    pub fn push_token_with_span(mut self, token: Token, span: Span) -> Self {
        self.tokens.push(SpannedToken::new(token, span));
        self.current_position = span.end;
        self
    }

    /// Finish the stream, appending EOF if missing
    pub fn build(mut self) -> TokenStream {
        if !self.tokens.last().map(|t| t.value.is_eof()).unwrap_or(false) {
            let at = self.current_position;
            self.tokens
                .push(SpannedToken::new(Token::Eof, Span::new(at, at)));
        }
        TokenStream::new(self.tokens)
    }
}

impl Default for TokenStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> TokenStream {
        TokenStreamBuilder::new()
            .push_token(Token::Id("task".into()), "task")
            .push_token(Token::Comment("# note".into()), "# note")
            .push_token(Token::Id("t1".into()), "t1")
            .push_token(Token::String("T".into()), "\"T\"")
            .build()
    }

    #[test]
    fn test_comments_are_skipped() {
        let mut s = stream();
        assert_eq!(s.len(), 4);
        assert_eq!(s.all_tokens().len(), 5);
        assert_eq!(s.advance().unwrap().value, Token::Id("task".into()));
        assert_eq!(s.current_token(), Some(&Token::Id("t1".into())));
    }

    #[test]
    fn test_eof_and_positions() {
        let mut s = stream();
        assert!(s.has_eof());
        s.advance();
        s.advance();
        s.advance();
        assert!(s.is_at_end());
        assert_eq!(s.position(), 3);
        assert!(s.advance().unwrap().value.is_eof());
    }

    #[test]
    fn test_builder_spans_follow_text() {
        let s = stream();
        let spans: Vec<Span> = s.iter_significant().map(|t| t.span).collect();
        assert_eq!(spans[0].start.column, 1);
        assert_eq!(spans[0].end.column, 5);
        assert!(spans[1].start.offset > spans[0].end.offset);
    }

    #[test]
    fn test_diagnostic_names_current_token() {
        let s = stream();
        assert!(s.diagnostic().contains("'task'"));
    }
}
