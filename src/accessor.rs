use alloc::string::{String, ToString as _};

use crate::errors::PropertyErrorKind;

/// Property accessor written as a closure over the service, e.g. `|calc| calc.value`.
///
/// Only a direct member access on the closure's own parameter is accepted,
/// optionally parenthesized and optionally followed by an `as` conversion.
/// Usually created with [`accessor!`](crate::accessor), which stringifies the closure tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyAccessor<'a> {
    expression: &'a str,
}

impl<'a> PropertyAccessor<'a> {
    #[inline]
    #[must_use]
    pub const fn new(expression: &'a str) -> Self {
        Self { expression }
    }

    #[inline]
    #[must_use]
    pub const fn expression(&self) -> &'a str {
        self.expression
    }

    /// Name of the accessed property
    ///
    /// # Errors
    /// - Returns [`PropertyErrorKind::ExpressionNotSupported`] if the expression isn't a one-parameter closure returning a member
    /// - Returns [`PropertyErrorKind::MemberNotSupported`] if the member is accessed on anything but the closure parameter
    pub fn property_name(&self) -> Result<&'a str, PropertyErrorKind> {
        let expression = self.expression.trim();

        let rest = expression
            .strip_prefix('|')
            .ok_or_else(|| self.not_supported("expected a closure"))?;
        let (parameter, body) = rest
            .split_once('|')
            .ok_or_else(|| self.not_supported("closure parameter list isn't closed"))?;
        let parameter = parameter.split_once(':').map_or(parameter, |(name, _)| name).trim();
        if !is_identifier(parameter) {
            return Err(self.not_supported("closure must take exactly one named parameter"));
        }

        let (member, conversion) = split_conversion(strip_parens(body.trim()));
        if conversion.is_some_and(str::is_empty) {
            return Err(self.not_supported("conversion has no target type"));
        }

        let (target, name) = strip_parens(member)
            .rsplit_once('.')
            .ok_or_else(|| self.not_supported("expression isn't a member access"))?;
        let name = name.trim();
        if !is_identifier(name) {
            return Err(self.not_supported("member must be a named property"));
        }
        if strip_parens(target.trim()) != parameter {
            return Err(PropertyErrorKind::MemberNotSupported { member: name.to_string() });
        }

        Ok(name)
    }

    fn not_supported(&self, reason: &'static str) -> PropertyErrorKind {
        PropertyErrorKind::ExpressionNotSupported {
            expression: String::from(self.expression),
            reason,
        }
    }
}

/// Creates a [`PropertyAccessor`] from closure tokens
///
/// # Examples
/// ```rust
/// use keyed_ioc::accessor;
///
/// let accessor = accessor!(|calc| calc.value as i64);
/// assert_eq!(accessor.property_name().unwrap(), "value");
/// ```
#[macro_export]
macro_rules! accessor {
    ($($expression:tt)+) => {
        $crate::PropertyAccessor::new(::core::stringify!($($expression)+))
    };
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}

/// Strips parentheses wrapping the whole expression
fn strip_parens(mut value: &str) -> &str {
    while let Some(inner) = value.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        let mut depth = 0usize;
        let balanced = inner.chars().all(|ch| {
            match ch {
                '(' => depth += 1,
                ')' if depth == 0 => return false,
                ')' => depth -= 1,
                _ => {}
            }
            true
        });
        if !balanced || depth != 0 {
            break;
        }
        value = inner.trim();
    }
    value
}

/// Splits `expr as Type` at the outermost `as`
fn split_conversion(value: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (index, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            'a' if depth == 0 && value[index..].starts_with("as") => {
                let before = value[..index].chars().next_back();
                let after = value[index + 2..].chars().next();
                if before.is_some_and(|ch| ch.is_whitespace() || ch == ')') && after.map_or(true, char::is_whitespace) {
                    return (value[..index].trim(), Some(value[index + 2..].trim()));
                }
            }
            _ => {}
        }
    }
    (value, None)
}
