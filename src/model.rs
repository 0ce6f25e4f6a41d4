use thiserror::Error;

/// An individual, data-driven failure accumulated while matching declarations.
///
/// Failures do not interrupt a declaration chain; they collect on the binding state and
/// surface together through [`ValidationError`](crate::ValidationError) at the terminal
/// validate call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindFailure {
    /// An expected flag had no matching token.
    #[error("Flag '{0}' was expected and not found.")]
    MissingFlag(String),

    /// An expected option had no matching token at all.
    #[error("Option '{0}' was expected and not found.")]
    MissingOption(String),

    /// The option's name token was found as the final token, with no value to bind.
    #[error("Option '{0}' was found without a following value.")]
    OptionMissingValue(String),

    /// An expected positional parameter had no unconsumed token left to bind.
    #[error("No more tokens to consume.")]
    MissingParameter,

    /// Tokens were never claimed by any declaration nor explicitly chopped.
    /// Raised only at validation time.
    #[error("{0} tokens were not properly consumed.")]
    UnconsumedTokens(usize),
}

fn summarize(failures: &[BindFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

/// The aggregate failure produced by the validate family of calls.
///
/// Holds every individual [`BindFailure`] in the order it was recorded, so calling code
/// can assert on specific causes rather than a flattened message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Validation failed: [{}]", summarize(.failures))]
pub struct ValidationError {
    failures: Vec<BindFailure>,
}

impl ValidationError {
    pub(crate) fn new(failures: Vec<BindFailure>) -> Self {
        Self { failures }
    }

    /// The individual failures, in the order they were recorded.
    pub fn failures(&self) -> &[BindFailure] {
        &self.failures
    }
}

/// Raised immediately when a query falls outside the declared contract.
///
/// Unlike [`BindFailure`], these are not accumulated: an accessor returns its error at
/// the point of the illegal or unanswerable query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The flag was never the subject of an allow/expect call.
    #[error("You must explicitly Expect or Allow the flag '{0}'.")]
    UndeclaredFlag(String),

    /// The option was never the subject of an allow/expect call.
    #[error("You must explicitly Expect or Allow the option '{0}'.")]
    UndeclaredOption(String),

    /// The option was declared, but no value was bound to it.
    #[error("Option '{0}' was not found.")]
    UnboundOption(String),

    /// No positional parameter was bound at the index.
    #[error("No parameter present at index {0}.")]
    NoParameterAt(usize),

    /// No positional parameter was bound under the name.
    #[error("No parameter present with name '{0}'.")]
    NoParameterNamed(String),

    /// The option's bound value did not convert to the requested type.
    #[error("Option '{name}' cannot convert: {reason}.")]
    InconvertibleOption {
        /// The primary name of the option.
        name: String,
        /// The converter's own message.
        reason: String,
    },
}
