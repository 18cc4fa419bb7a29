//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const INVALID_DATE: Code = Code::new("E025");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E028");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const RULE_EXPECTED: Code = Code::new("E041");
    pub const TOKEN_CLASS_MISMATCH: Code = Code::new("E042");
    pub const UNKNOWN_ATTRIBUTE: Code = Code::new("E043");
    pub const MAX_PARSE_DEPTH: Code = Code::new("E044");
    pub const INCLUDE_FAILED: Code = Code::new("E045");
}

/// Semantic action error codes
pub mod semantic {
    use super::Code;

    pub const SEMANTIC_ERROR: Code = Code::new("E070");
    pub const EXTENSION_ERROR: Code = Code::new("E071");
}

/// Grammar definition defects
pub mod grammar {
    use super::Code;

    pub const DUPLICATE_RULE: Code = Code::new("E090");
    pub const UNDEFINED_RULE: Code = Code::new("E091");
    pub const AMBIGUOUS_ALTERNATIVES: Code = Code::new("E092");
    pub const LEFT_RECURSION: Code = Code::new("E093");
    pub const INVALID_SYMBOL: Code = Code::new("E094");
    pub const EMPTY_PATTERN: Code = Code::new("E095");
    pub const NO_PROGRESS: Code = Code::new("E096");
    pub const VALUE_MISMATCH: Code = Code::new("E097");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const AMBIGUOUS_MATCH: Code = Code::new("W001");
    pub const UNSUPPORTED_FUNCTION: Code = Code::new("W002");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");

    pub const GRAMMAR_BUILT: Code = Code::new("I030");

    pub const PARSE_COMPLETE: Code = Code::new("I040");
    pub const EXTENSION_APPLIED: Code = Code::new("I041");
    pub const INCLUDE_PROCESSED: Code = Code::new("I042");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn register(registry: &mut HashMap<&'static str, ErrorMetadata>, metadata: ErrorMetadata) {
    registry.insert(metadata.code, metadata);
}

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the input that triggered it",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check logging and configuration setup",
            ),
        );

        // File processing errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File not found at specified path",
                "Check file path and ensure file exists",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File does not have a .tjp or .tji extension",
                "Rename the file or disable the extension requirement",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File exceeds maximum size limit",
                "Split the project into included files or raise the limit",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File is empty when content expected",
                "Provide a file with content or check file integrity",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Permission denied accessing file",
                "Check file permissions and user access rights",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid UTF-8 encoding in file",
                "Convert file to UTF-8 encoding",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "I/O error during file operation",
                "Check disk space, permissions, and file system integrity",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid file path provided",
                "Provide a valid file path",
            ),
        );

        // Lexical analysis errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Invalid character found in source text",
                "Remove the character or quote it inside a string",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "String literal not properly terminated",
                "Add the closing quote to the string literal",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Low,
                false,
                true,
                "Number format is invalid",
                "Fix the number format",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::Low,
                false,
                true,
                "Identifier exceeds maximum allowed length",
                "Shorten the identifier",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "String literal exceeds maximum size limit",
                "Reduce string size or raise the limit",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E025",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Date or time literal is not a valid calendar value",
                "Use YYYY-MM-DD[-HH:MM[:SS]] with a real calendar date",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E026",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Comment exceeds maximum allowed length",
                "Reduce comment length or break into multiple comments",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E027",
                "Lexical",
                Severity::High,
                false,
                true,
                "File contains too many tokens",
                "Split the project into included files or raise the limit",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E028",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Block comment not terminated",
                "Close the comment with */",
            ),
        );

        // Syntax errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E040",
                "Syntax",
                Severity::Medium,
                false,
                true,
                "Unexpected token during parsing",
                "Check the token sequence against the TJP syntax",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E041",
                "Syntax",
                Severity::Medium,
                false,
                true,
                "A required rule found no matching alternative",
                "Insert the missing construct named in the message",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E042",
                "Syntax",
                Severity::Medium,
                false,
                true,
                "Token of the wrong class",
                "Provide a value of the expected kind",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E043",
                "Syntax",
                Severity::Medium,
                false,
                true,
                "Attribute keyword not known in this context",
                "Check spelling or declare the attribute with 'extend' first",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E044",
                "Syntax",
                Severity::High,
                false,
                true,
                "Maximum parse depth exceeded",
                "Reduce nesting depth or simplify structure",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E045",
                "Syntax",
                Severity::High,
                false,
                true,
                "Included file could not be processed",
                "Check the include path, nesting depth and recursion",
            ),
        );

        // Semantic errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E070",
                "Semantic",
                Severity::Medium,
                false,
                true,
                "Semantic check in a rule action failed",
                "Fix the value reported in the message",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E071",
                "Semantic",
                Severity::Medium,
                false,
                true,
                "User-defined attribute could not be declared",
                "Pick an unused capitalised attribute ID",
            ),
        );

        // Grammar defects
        for (code, description) in [
            ("E090", "Rule declared more than once"),
            ("E091", "Rule reference names an undeclared rule"),
            ("E092", "Alternatives of a rule share a first symbol"),
            ("E093", "Rule is left recursive"),
            ("E094", "Symbol specification is malformed"),
            ("E095", "Pattern has no symbols"),
            ("E096", "Repeatable rule matched without consuming input"),
            ("E097", "Rule action received a value of the wrong shape"),
        ] {
            register(
                &mut registry,
                ErrorMetadata::new(
                    code,
                    "Grammar",
                    Severity::Critical,
                    false,
                    true,
                    description,
                    "Fix the rule declarations in the registration list",
                ),
            );
        }

        // Warnings
        register(
            &mut registry,
            ErrorMetadata::new(
                "W001",
                "Warning",
                Severity::Low,
                true,
                false,
                "Several alternatives accept the next token; first declared one used",
                "Make the alternatives start with distinct symbols",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "W002",
                "Warning",
                Severity::Low,
                true,
                false,
                "Function call operand is accepted but has no effect",
                "Replace the function call with a flag or attribute operand",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_defects_halt() {
        assert!(requires_halt(grammar::AMBIGUOUS_ALTERNATIVES.as_str()));
        assert_eq!(get_category(grammar::NO_PROGRESS.as_str()), "Grammar");
        assert_eq!(get_severity(grammar::LEFT_RECURSION.as_str()), Severity::Critical);
    }

    #[test]
    fn test_warnings_are_recoverable() {
        assert!(is_recoverable(warnings::AMBIGUOUS_MATCH.as_str()));
        assert!(!requires_halt(warnings::UNSUPPORTED_FUNCTION.as_str()));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert!(get_error_metadata("X999").is_none());
    }

    #[test]
    fn test_syntax_codes_registered() {
        for code in [
            syntax::UNEXPECTED_TOKEN,
            syntax::RULE_EXPECTED,
            syntax::TOKEN_CLASS_MISMATCH,
            syntax::UNKNOWN_ATTRIBUTE,
            syntax::MAX_PARSE_DEPTH,
            syntax::INCLUDE_FAILED,
        ] {
            assert_eq!(get_category(code.as_str()), "Syntax");
        }
    }
}
