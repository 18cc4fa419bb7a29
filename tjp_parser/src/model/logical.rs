//! Logical expressions used by report filters (`hidetask`, `rolluptask`, ...)

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Or,
    And,
    Greater,
    Less,
    Equal,
    GreaterOrEqual,
    LessOrEqual,
    Not,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "|" => Operator::Or,
            "&" => Operator::And,
            ">" => Operator::Greater,
            "<" => Operator::Less,
            "=" => Operator::Equal,
            ">=" => Operator::GreaterOrEqual,
            "<=" => Operator::LessOrEqual,
            "~" => Operator::Not,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Or => "|",
            Operator::And => "&",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Equal => "=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Not => "~",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    Operation(Box<Operation>),
    /// `<scenario>.<attribute>`
    Attribute { name: String, scenario_idx: usize },
    Flag(String),
    Date(NaiveDateTime),
    Integer(i64),
    String(String),
    /// Old-style function call; accepted but not evaluated
    Unsupported { function: String, arguments: usize },
}

/// One binary level: `operand [operator operand]`, or `~ operand`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub operand1: Operand,
    pub operator: Option<Operator>,
    pub operand2: Option<Operand>,
}

impl Operation {
    pub fn new(operand: Operand) -> Self {
        Self {
            operand1: operand,
            operator: None,
            operand2: None,
        }
    }

    pub fn binary(operand1: Operand, operator: Operator, operand2: Operand) -> Self {
        Self {
            operand1,
            operator: Some(operator),
            operand2: Some(operand2),
        }
    }

    pub fn negation(operand: Operand) -> Self {
        Self {
            operand1: operand,
            operator: Some(Operator::Not),
            operand2: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalExpression {
    pub operation: Operation,
    pub file: String,
    pub line: u32,
}

impl LogicalExpression {
    pub fn new(operation: Operation, file: impl Into<String>, line: u32) -> Self {
        Self {
            operation,
            file: file.into(),
            line,
        }
    }
}
