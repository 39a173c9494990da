//! Stable identifiers for error kinds, rule kinds and operators.
//!
//! Error codes are short snake_case discriminators; they double as the serialized form of
//! [`crate::ErrorKind`].

// Error kinds
pub const CODE_RESOURCE_NOT_FOUND: &str = "resource_not_found";
pub const CODE_PROPERTY_MISMATCH: &str = "property_mismatch";
pub const CODE_CONFIGURATION_INVALID: &str = "configuration_invalid";
pub const CODE_UPSTREAM_API_FAILURE: &str = "upstream_api_failure";
pub const CODE_AUTHENTICATION_FAILURE: &str = "authentication_failure";
pub const CODE_PERMISSION_DENIED: &str = "permission_denied";
pub const CODE_NETWORK_FAILURE: &str = "network_failure";

// Rule kinds
pub const RULE_PROPERTY: &str = "property";
pub const RULE_EXISTS: &str = "exists";
pub const RULE_COUNT: &str = "count";
pub const RULE_CUSTOM: &str = "custom";

// Operators
pub const OP_EQ: &str = "eq";
pub const OP_NE: &str = "ne";
pub const OP_GT: &str = "gt";
pub const OP_LT: &str = "lt";
pub const OP_GE: &str = "ge";
pub const OP_LE: &str = "le";
pub const OP_CONTAINS: &str = "contains";
pub const OP_REGEX: &str = "regex";

// Tool-level
pub const TOOL_NAME: &str = "stepguard";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
