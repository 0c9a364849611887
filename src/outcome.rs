//! The generation result type and its two combinators.
//!
//! `first_failure` stops at the first error (graph construction: one
//! structural fault makes everything after it meaningless). `all_failures`
//! runs every check and reports the union (task validation: independent
//! misconfigurations are independent facts).

use crate::diagnostic::Diagnostic;

/// Either a value or every message explaining why there is none.
pub type Outcome<T> = Result<T, Vec<Diagnostic>>;

/// Run `steps` in order, stopping at the first error.
pub fn first_failure<T, E, I>(steps: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut out = Vec::new();
    for step in steps {
        out.push(step?);
    }
    Ok(out)
}

/// Run every check in `checks` and collect all errors.
///
/// Succeeds only when no check failed; the error list preserves check order.
pub fn all_failures<T, I>(checks: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = Outcome<T>>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for check in checks {
        match check {
            Ok(v) => values.push(v),
            Err(mut errs) => errors.append(&mut errs),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}
