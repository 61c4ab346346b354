//! Error codes for the Drafter diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Document layout errors (indentation, quoting)
//! - `E1xx` - Document syntax errors (flow collections, keys)
//! - `E2xx` - Document structure errors (sections, parameters, steps)
//! - `E3xx` - Expression errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Layout Errors (E0xx)
    // =========================================================================
    /// Unterminated quoted scalar.
    ///
    /// A scalar was opened with `"` or `'` but the line ended first.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that cannot start a value here.
    E002,

    /// Invalid escape sequence.
    ///
    /// Double-quoted scalars accept `\n`, `\r`, `\t`, `\\`, `\"`, `\'` and `\0`.
    E003,

    /// Tab in indentation.
    ///
    /// Block structure is defined by spaces only.
    E004,

    /// Unexpected indentation.
    ///
    /// A line is indented deeper than its parent block allows, or does not
    /// line up with its siblings.
    E005,

    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// A flow collection or block entry contained something it should not.
    E100,

    /// Unclosed flow collection.
    ///
    /// A `[` or `{` was not closed before the end of the line.
    E101,

    /// Duplicate mapping key.
    ///
    /// The same key appears twice in one mapping.
    E102,

    /// Expected a mapping entry.
    ///
    /// A line inside a mapping block is not of the form `key: value`.
    E103,

    // =========================================================================
    // Structure Errors (E2xx)
    // =========================================================================
    /// Missing `sketch` section.
    ///
    /// Every document needs a `sketch` section, even an empty one.
    E200,

    /// Unknown section.
    ///
    /// Only `parameters`, `reference` and `sketch` are allowed at the top level.
    E201,

    /// Invalid parameter declaration.
    ///
    /// Parameters are a list of names, `name: default` entries, or
    /// `name: { default: value }` entries.
    E202,

    /// Invalid reference declaration.
    ///
    /// References are a list of single-key `name: expression` entries.
    E203,

    /// Invalid chain step.
    ///
    /// Each step is a single-key mapping naming a feature and its arguments.
    E204,

    /// Document root is not a mapping.
    E205,

    /// Shadowed name.
    ///
    /// A reference reuses the name of a parameter or an earlier reference.
    E206,

    // =========================================================================
    // Expression Errors (E3xx)
    // =========================================================================
    /// Unexpected character in an expression.
    E300,

    /// Unterminated string in an expression.
    E301,

    /// Unexpected token in an expression.
    E302,

    /// Incomplete expression.
    ///
    /// The expression ended where an operand or closing delimiter was expected.
    E303,

    /// Invalid number literal.
    E304,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Layout errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            // Syntax errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Structure errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            // Expression errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Layout errors
            ErrorCode::E001 => "unterminated quoted scalar",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "tab in indentation",
            ErrorCode::E005 => "unexpected indentation",
            // Syntax errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unclosed flow collection",
            ErrorCode::E102 => "duplicate mapping key",
            ErrorCode::E103 => "expected mapping entry",
            // Structure errors
            ErrorCode::E200 => "missing sketch section",
            ErrorCode::E201 => "unknown section",
            ErrorCode::E202 => "invalid parameter",
            ErrorCode::E203 => "invalid reference",
            ErrorCode::E204 => "invalid step",
            ErrorCode::E205 => "document is not a mapping",
            ErrorCode::E206 => "shadowed name",
            // Expression errors
            ErrorCode::E300 => "unexpected character in expression",
            ErrorCode::E301 => "unterminated string in expression",
            ErrorCode::E302 => "unexpected token in expression",
            ErrorCode::E303 => "incomplete expression",
            ErrorCode::E304 => "invalid number",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E004.description(), "tab in indentation");
        assert_eq!(ErrorCode::E200.description(), "missing sketch section");
        assert_eq!(ErrorCode::E303.description(), "incomplete expression");
    }
}
