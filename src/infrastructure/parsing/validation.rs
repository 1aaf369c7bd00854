//! Accumulating validation
//!
//! A [`Validation`] is an ordinary `Result` whose error side is a non-empty,
//! ordered list of messages. Independent validations are combined without
//! short-circuiting: every failing input contributes all of its messages, in
//! argument order.

use std::fmt;

use crate::domain::NonEmptyVec;
use crate::infrastructure::parsing_error::ParsingError;

/// Ordered, non-empty list of validation messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

pub type Validation<T> = Result<T, ValidationErrors>;

impl ValidationErrors {
    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A failure always carries at least one message
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append every message of `other` after ours
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Wrap every message as a failure of `field`
    pub fn named(self, field: &str) -> Self {
        self.map_messages(|message| format!("Failed to decode {field}: {message}"))
    }

    /// Prepend `prefix` to every message
    pub fn prefixed(self, prefix: &str) -> Self {
        self.map_messages(|message| format!("{prefix}{message}"))
    }

    fn map_messages<F>(self, f: F) -> Self
    where
        F: FnMut(String) -> String,
    {
        Self(self.0.into_iter().map(f).collect())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation(\n{}\n)", self.0.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Successful validation
pub fn pure<T>(value: T) -> Validation<T> {
    Ok(value)
}

/// Failed validation with a single message
pub fn fail<T>(message: impl Into<String>) -> Validation<T> {
    Err(ValidationErrors::single(message))
}

/// Lift a single-error result into a validation named after `field`
pub fn named<T, E: fmt::Display>(field: &str, result: Result<T, E>) -> Validation<T> {
    result.map_err(|e| ValidationErrors::single(format!("Failed to decode {field}: {e}")))
}

/// Combine two independent validations, keeping the errors of both sides
pub fn combine<A, B>(a: Validation<A>, b: Validation<B>) -> Validation<(A, B)> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(mut e1), Err(e2)) => {
            e1.extend(e2);
            Err(e1)
        }
    }
}

/// Combine any number of independent validations of the same type
pub fn sequence<T, I>(results: I) -> Validation<Vec<T>>
where
    I: IntoIterator<Item = Validation<T>>,
{
    let mut values = Vec::new();
    let mut errors: Option<ValidationErrors> = None;

    for result in results {
        match (result, errors.as_mut()) {
            (Ok(value), None) => values.push(value),
            (Ok(_), Some(_)) => {}
            (Err(e), Some(acc)) => acc.extend(e),
            (Err(e), None) => errors = Some(e),
        }
    }

    match errors {
        Some(errors) => Err(errors),
        None => Ok(values),
    }
}

/// [`sequence`] over a non-empty list, preserving non-emptiness
pub fn sequence_non_empty<T>(results: NonEmptyVec<Validation<T>>) -> Validation<NonEmptyVec<T>> {
    let (head, tail) = results.split_first();
    combine(head, sequence(tail)).map(|(head, tail)| NonEmptyVec::new(head, tail))
}

/// Turn an accumulated failure into one fatal error at the top-level boundary
pub fn to_fatal<T>(result: Validation<T>) -> Result<T, ParsingError> {
    result.map_err(ParsingError::ValidationFailed)
}

/// Accumulating combination of a tuple of independent validations
pub trait CombineIndependent {
    type Output;

    fn combine(self) -> Validation<Self::Output>;
}

macro_rules! impl_combine_independent {
    ($($ty:ident => $value:ident),+) => {
        impl<$($ty),+> CombineIndependent for ($(Validation<$ty>,)+) {
            type Output = ($($ty,)+);

            fn combine(self) -> Validation<Self::Output> {
                let ($($value,)+) = self;
                let mut errors: Vec<String> = Vec::new();
                $(
                    let $value = match $value {
                        Ok(value) => Some(value),
                        Err(e) => {
                            errors.extend(e);
                            None
                        }
                    };
                )+
                match ($($value,)+) {
                    ($(Some($value),)+) => Ok(($($value,)+)),
                    _ => Err(ValidationErrors(errors)),
                }
            }
        }
    };
}

impl_combine_independent!(A => a, B => b);
impl_combine_independent!(A => a, B => b, C => c);
impl_combine_independent!(A => a, B => b, C => c, D => d);
impl_combine_independent!(A => a, B => b, C => c, D => d, E => e);
impl_combine_independent!(A => a, B => b, C => c, D => d, E => e, F => f);
