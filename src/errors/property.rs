use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyErrorKind {
    #[error("Property expression must have MemberAccess type. Not supported expression `{expression}`: {reason}")]
    ExpressionNotSupported { expression: String, reason: &'static str },
    #[error("Member {member} is not supported.")]
    MemberNotSupported { member: String },
    #[error("Value injected into property {property} must be of type {expected}")]
    TypeMismatch { property: &'static str, expected: &'static str },
}
