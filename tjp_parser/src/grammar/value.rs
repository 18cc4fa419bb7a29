//! Values produced by pattern actions and the matched values they receive

use crate::grammar::GrammarError;
use crate::model::{
    Allocation, ColumnDefinition, Interval, LogicalExpression, Operand, Operation, SortCriterion,
    TimeInterval,
};
use crate::syntax::ParseError;
use crate::tokens::Token;
use crate::units::DurationUnit;
use crate::utils::SourceLocation;
use chrono::NaiveDateTime;

/// End of an interval: an absolute date or a length in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalEnd {
    Date(NaiveDateTime),
    Seconds(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDateTime),
    /// Seconds after midnight
    Time(u32),
    List(Vec<Value>),
    Pair(Box<Value>, Box<Value>),
    Unit(DurationUnit),
    Interval(Interval),
    IntervalEnd(IntervalEnd),
    WeekDays([bool; 7]),
    TimeInterval(TimeInterval),
    Allocation(Allocation),
    Column(ColumnDefinition),
    SortCriterion(SortCriterion),
    Operand(Operand),
    Operation(Operation),
    Expression(LogicalExpression),
}

impl Value {
    /// Value of a token matched by a token class symbol
    pub fn from_token(token: &Token) -> Option<Value> {
        Some(match token {
            Token::Id(s)
            | Token::IdWithColon(s)
            | Token::AbsoluteId(s)
            | Token::RelativeId(s)
            | Token::String(s) => Value::Str(s.clone()),
            Token::Integer(i) => Value::Int(*i),
            Token::Float(f) => Value::Float(*f),
            Token::Date(d) => Value::Date(*d),
            Token::Time(t) => Value::Time(*t),
            Token::Punct(p) => Value::Str(p.as_str().to_string()),
            Token::Comment(_) | Token::Eof => return None,
        })
    }

    pub fn pair(first: Value, second: Value) -> Value {
        Value::Pair(Box::new(first), Box::new(second))
    }

    /// Flatten into list items; a scalar becomes a one-element list
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            other => vec![other],
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "a string",
            Value::Int(_) => "an integer",
            Value::Float(_) => "a float",
            Value::Bool(_) => "a boolean",
            Value::Date(_) => "a date",
            Value::Time(_) => "a time",
            Value::List(_) => "a list",
            Value::Pair(..) => "a pair",
            Value::Unit(_) => "a duration unit",
            Value::Interval(_) => "an interval",
            Value::IntervalEnd(_) => "an interval end",
            Value::WeekDays(_) => "a list of weekdays",
            Value::TimeInterval(_) => "a time interval",
            Value::Allocation(_) => "an allocation",
            Value::Column(_) => "a column definition",
            Value::SortCriterion(_) => "a sorting criterium",
            Value::Operand(_) => "an operand",
            Value::Operation(_) => "an operation",
            Value::Expression(_) => "a logical expression",
        }
    }
}

/// Value of one pattern symbol, positionally aligned with the symbols
#[derive(Debug, Clone, PartialEq)]
pub enum MatchedValue {
    Literal(String),
    Token(Token),
    Rule(Option<Value>),
}

impl MatchedValue {
    pub fn to_value(&self) -> Option<Value> {
        match self {
            MatchedValue::Literal(text) => Some(Value::Str(text.clone())),
            MatchedValue::Token(token) => Value::from_token(token),
            MatchedValue::Rule(value) => value.clone(),
        }
    }
}

/// Matched values handed to an action, with the location the pattern started at
#[derive(Debug, Clone)]
pub struct Values {
    items: Vec<MatchedValue>,
    location: SourceLocation,
}

macro_rules! typed_getter {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $expected:literal, $($pat:pat => $out:expr),+) => {
        $(#[$doc])*
        pub fn $name(&self, index: usize) -> Result<$ty, ParseError> {
            match self.value(index) {
                $(Some($pat) => Ok($out),)+
                _ => Err(self.mismatch(index, $expected)),
            }
        }
    };
}

impl Values {
    pub fn new(items: Vec<MatchedValue>, location: SourceLocation) -> Self {
        Self { items, location }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Where the first symbol of the pattern matched
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn get(&self, index: usize) -> Option<&MatchedValue> {
        self.items.get(index)
    }

    pub fn value(&self, index: usize) -> Option<Value> {
        self.items.get(index).and_then(MatchedValue::to_value)
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.value(index).is_some()
    }

    pub fn required(&self, index: usize) -> Result<Value, ParseError> {
        self.value(index)
            .ok_or_else(|| self.mismatch(index, "present"))
    }

    /// List items of a list rule; an absent value is an empty list
    pub fn list(&self, index: usize) -> Vec<Value> {
        self.value(index).map(Value::into_list).unwrap_or_default()
    }

    typed_getter!(
        /// Identifier, string or keyword text
        string, String, "a string", Value::Str(s) => s
    );
    typed_getter!(int, i64, "an integer", Value::Int(i) => i);
    typed_getter!(
        /// INTEGER or FLOAT as `f64`
        number, f64, "a number", Value::Int(i) => i as f64, Value::Float(f) => f
    );
    typed_getter!(date, NaiveDateTime, "a date", Value::Date(d) => d);
    typed_getter!(time, u32, "a time", Value::Time(t) => t);
    typed_getter!(unit, DurationUnit, "a duration unit", Value::Unit(u) => u);
    typed_getter!(interval, Interval, "an interval", Value::Interval(i) => i);
    typed_getter!(operand, Operand, "an operand", Value::Operand(o) => o);
    typed_getter!(operation, Operation, "an operation", Value::Operation(o) => o);
    typed_getter!(expression, LogicalExpression, "a logical expression", Value::Expression(e) => e);

    fn mismatch(&self, index: usize, expected: &'static str) -> ParseError {
        ParseError::Grammar {
            error: GrammarError::value_mismatch(index, expected),
            location: self.location.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Punctuation;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn values(items: Vec<MatchedValue>) -> Values {
        Values::new(items, SourceLocation::start_of(Arc::from("test.tjp")))
    }

    #[test]
    fn test_positions_are_preserved() {
        let v = values(vec![
            MatchedValue::Literal("task".into()),
            MatchedValue::Token(Token::Id("t1".into())),
            MatchedValue::Rule(None),
            MatchedValue::Token(Token::Integer(7)),
        ]);
        assert_eq!(v.string(0).unwrap(), "task");
        assert_eq!(v.string(1).unwrap(), "t1");
        assert!(!v.is_present(2));
        assert_eq!(v.int(3).unwrap(), 7);
        assert_eq!(v.number(3).unwrap(), 7.0);
    }

    #[test]
    fn test_list_flattening() {
        let v = values(vec![
            MatchedValue::Rule(None),
            MatchedValue::Rule(Some(Value::Str("a".into()))),
            MatchedValue::Rule(Some(Value::List(vec![Value::Int(1), Value::Int(2)]))),
        ]);
        assert!(v.list(0).is_empty());
        assert_eq!(v.list(1), vec![Value::Str("a".into())]);
        assert_eq!(v.list(2).len(), 2);
    }

    #[test]
    fn test_mismatch_is_a_grammar_error() {
        let v = values(vec![MatchedValue::Token(Token::Punct(Punctuation::Comma))]);
        assert_eq!(v.string(0).unwrap(), ",");
        assert_matches!(
            v.date(0),
            Err(ParseError::Grammar {
                error: GrammarError::ValueMismatch { index: 0, .. },
                ..
            })
        );
        assert_matches!(v.required(5), Err(ParseError::Grammar { .. }));
    }
}
