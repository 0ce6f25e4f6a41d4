use std::collections::HashMap;
use std::str::FromStr;

use crate::model::{AccessError, BindFailure, ValidationError};
use crate::tokens::TokenStore;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The binding state threaded through a declaration chain.
///
/// Load the raw tokens once, then declare what you expect of them; each declaration
/// consumes its matching tokens immediately and returns a new, independent `Bindings`.
/// The receiver of a declaration call is never altered, so intermediate states may be
/// retained, branched, and queried freely.
///
/// ### Example
/// ```
/// use argbind::Bindings;
///
/// let result = Bindings::load(["put", "--key", "value", "-v"])
///     .expect_param_named("action")
///     .expect_option("key", &[])
///     .allow_flag("verbose", &["v"])
///     .validate()
///     .unwrap();
///
/// assert_eq!(result.param_named("action").unwrap(), "put");
/// assert_eq!(result.option("key").unwrap(), "value");
/// assert!(result.flag("verbose").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Bindings {
    store: TokenStore,
    flags: HashMap<String, bool>,
    options: HashMap<String, Option<String>>,
    parameters: Vec<String>,
    named_parameters: HashMap<String, usize>,
    failures: Vec<BindFailure>,
}

impl Bindings {
    /// Load the raw token list into an initial binding state with no declarations made.
    ///
    /// ### Example
    /// ```
    /// use argbind::Bindings;
    ///
    /// let bindings = Bindings::load(["do", "something"]);
    /// assert!(!bindings.has_param_at(0));
    /// ```
    pub fn load<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            store: TokenStore::new(tokens.into_iter().map(T::into).collect()),
            flags: HashMap::default(),
            options: HashMap::default(),
            parameters: Vec::default(),
            named_parameters: HashMap::default(),
            failures: Vec::default(),
        }
    }

    fn get_flag(&self, name: &str, alts: &[&str]) -> (Self, bool) {
        let names: Vec<&str> = std::iter::once(name).chain(alts.iter().copied()).collect();
        let mut next = self.clone();
        let found = match self.store.claim_flag(&names) {
            Some(store) => {
                next.store = store;
                true
            }
            None => false,
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Matched flag '{name}' (found={found}).");
        }

        next.flags.insert(name.to_string(), found);
        (next, found)
    }

    fn get_option(&self, name: &str, alts: &[&str]) -> (Self, bool) {
        let names: Vec<&str> = std::iter::once(name).chain(alts.iter().copied()).collect();
        let mut next = self.clone();

        let found = match self.store.claim_option(&names) {
            Some((store, Some(value))) => {
                next.store = store;
                next.options.insert(name.to_string(), Some(value));
                true
            }
            Some((store, None)) => {
                // The name sat at the very end: found, but nothing left to bind.
                next.store = store;
                next.options.entry(name.to_string()).or_insert(None);
                next.failures
                    .push(BindFailure::OptionMissingValue(name.to_string()));
                true
            }
            None => {
                next.options.entry(name.to_string()).or_insert(None);
                false
            }
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Matched option '{name}' (found={found}).");
        }

        (next, found)
    }

    fn get_param(&self) -> (Self, Option<usize>) {
        match self.store.claim_next() {
            Some((store, value)) => {
                let mut next = self.clone();
                next.store = store;
                next.parameters.push(value);
                let index = next.parameters.len() - 1;

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Matched positional parameter (index={index}).");
                }

                (next, Some(index))
            }
            None => (self.clone(), None),
        }
    }

    /// Consume a single flag, if found.
    ///
    /// `name` matches a `--name` token, or `-n` for a single-character name; `alts` are
    /// alternate names tried in order after `name`, under the same dash rule. The flag
    /// is recorded (and later queried) under `name` only, whether or not it was found.
    #[must_use]
    pub fn allow_flag(&self, name: &str, alts: &[&str]) -> Self {
        self.get_flag(name, alts).0
    }

    /// Consume a single flag. Absence is a validation failure.
    #[must_use]
    pub fn expect_flag(&self, name: &str, alts: &[&str]) -> Self {
        let (mut next, found) = self.get_flag(name, alts);

        if !found {
            next.failures.push(BindFailure::MissingFlag(name.to_string()));
        }

        next
    }

    /// Consume a single option and the token following it as its value, if found.
    ///
    /// `name` and `alts` follow the same dash rule as flags; the binding is recorded
    /// under `name` only. An option name found as the very last token is still
    /// consumed, but records an [`BindFailure::OptionMissingValue`] failure instead of
    /// binding a value.
    #[must_use]
    pub fn allow_option(&self, name: &str, alts: &[&str]) -> Self {
        self.get_option(name, alts).0
    }

    /// Consume a single option and its value. Absence is a validation failure.
    #[must_use]
    pub fn expect_option(&self, name: &str, alts: &[&str]) -> Self {
        let (mut next, found) = self.get_option(name, alts);

        if !found {
            next.failures
                .push(BindFailure::MissingOption(name.to_string()));
        }

        next
    }

    /// Consume the next unconsumed token as a positional parameter, if one remains.
    #[must_use]
    pub fn allow_param(&self) -> Self {
        self.get_param().0
    }

    /// Consume the next unconsumed token as a positional parameter, giving it a lookup
    /// name. If no token remains, nothing is consumed and the name is not registered.
    #[must_use]
    pub fn allow_param_named(&self, name: &str) -> Self {
        let (mut next, index) = self.get_param();

        if let Some(index) = index {
            next.named_parameters.insert(name.to_string(), index);
        }

        next
    }

    /// Consume the next unconsumed token as a positional parameter.
    /// Exhaustion is a validation failure.
    #[must_use]
    pub fn expect_param(&self) -> Self {
        let (mut next, index) = self.get_param();

        if index.is_none() {
            next.failures.push(BindFailure::MissingParameter);
        }

        next
    }

    /// Consume the next unconsumed token as a positional parameter, giving it a lookup
    /// name. Exhaustion is a validation failure.
    #[must_use]
    pub fn expect_param_named(&self, name: &str) -> Self {
        let (mut next, index) = self.get_param();

        match index {
            Some(index) => {
                next.named_parameters.insert(name.to_string(), index);
            }
            None => {
                next.failures.push(BindFailure::MissingParameter);
            }
        }

        next
    }

    /// Discard all remaining unconsumed tokens, so they will not fail validation.
    ///
    /// Alternately, can be used to force the next expect declaration to fail.
    #[must_use]
    pub fn chop(&self) -> Self {
        let mut next = self.clone();
        next.store = next.store.chop();
        next
    }

    /// Discard all remaining unconsumed tokens and return them, in original
    /// left-to-right order.
    ///
    /// Typical use is handing a sub-command's tokens to a nested chain.
    pub fn chop_slice(&self) -> (Self, Vec<String>) {
        let mut next = self.clone();
        let (store, remainder) = next.store.chop_remainder();
        next.store = store;
        (next, remainder)
    }

    /// Discard all remaining unconsumed tokens and return them joined into a single
    /// string, separated by single spaces.
    pub fn chop_string(&self) -> (Self, String) {
        let (next, remainder) = self.chop_slice();
        (next, remainder.join(" "))
    }

    /// Finalize the chain.
    ///
    /// Validation fails if any expect declaration went unsatisfied, or if one or more
    /// tokens remain unconsumed; both conditions are checked independently and reported
    /// together through [`ValidationError::failures`]. The receiver is not altered.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let mut failures = self.failures.clone();
        let remaining = self.store.unconsumed();

        if remaining > 0 {
            failures.push(BindFailure::UnconsumedTokens(remaining));
        }

        if failures.is_empty() {
            Ok(self.clone())
        } else {
            Err(ValidationError::new(failures))
        }
    }

    /// Discard all remaining unconsumed tokens, then finalize the chain.
    pub fn chop_and_validate(&self) -> Result<Self, ValidationError> {
        self.chop().validate()
    }

    /// Whether the named flag was present.
    ///
    /// Declared-but-absent is a legitimate `Ok(false)`; querying a flag that was never
    /// declared is an [`AccessError::UndeclaredFlag`].
    pub fn flag(&self, name: &str) -> Result<bool, AccessError> {
        self.flags
            .get(name)
            .copied()
            .ok_or_else(|| AccessError::UndeclaredFlag(name.to_string()))
    }

    /// Whether the named flag was declared.
    ///
    /// NOTE: this does not check whether the flag was present in the tokens; only
    /// whether it was the subject of an allow/expect call.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// The value bound to the named option.
    ///
    /// Querying an undeclared option is an [`AccessError::UndeclaredOption`]; a
    /// declared option with no bound value is an [`AccessError::UnboundOption`].
    pub fn option(&self, name: &str) -> Result<&str, AccessError> {
        match self.options.get(name) {
            Some(Some(value)) => Ok(value.as_str()),
            Some(None) => Err(AccessError::UnboundOption(name.to_string())),
            None => Err(AccessError::UndeclaredOption(name.to_string())),
        }
    }

    /// Whether the named option was bound to a value.
    ///
    /// Use this before calling [`Bindings::option`] on an allowed (not expected) option.
    pub fn has_option(&self, name: &str) -> bool {
        matches!(self.options.get(name), Some(Some(_)))
    }

    /// The value bound to the named option, converted via [`std::str::FromStr`].
    ///
    /// ### Example
    /// ```
    /// use argbind::Bindings;
    ///
    /// let result = Bindings::load(["--retries", "3"])
    ///     .expect_option("retries", &[])
    ///     .validate()
    ///     .unwrap();
    ///
    /// assert_eq!(result.option_as::<u32>("retries").unwrap(), 3);
    /// ```
    pub fn option_as<T>(&self, name: &str) -> Result<T, AccessError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.option(name)?
            .parse()
            .map_err(|error: T::Err| AccessError::InconvertibleOption {
                name: name.to_string(),
                reason: error.to_string(),
            })
    }

    /// The positional parameter bound at the 0-based index.
    pub fn param_at(&self, index: usize) -> Result<&str, AccessError> {
        self.parameters
            .get(index)
            .map(String::as_str)
            .ok_or(AccessError::NoParameterAt(index))
    }

    /// Whether a positional parameter was bound at the 0-based index.
    pub fn has_param_at(&self, index: usize) -> bool {
        self.parameters.len() > index
    }

    /// The positional parameter bound under the caller-assigned name.
    pub fn param_named(&self, name: &str) -> Result<&str, AccessError> {
        self.named_parameters
            .get(name)
            .map(|index| self.parameters[*index].as_str())
            .ok_or_else(|| AccessError::NoParameterNamed(name.to_string()))
    }

    /// Whether a positional parameter was bound under the caller-assigned name.
    pub fn has_param_named(&self, name: &str) -> bool {
        self.named_parameters.contains_key(name)
    }
}

/// The consumption picture: the token row, a marker row (`X` under consumed tokens),
/// then each bound parameter and name assignment. Useful when debugging a chain.
impl std::fmt::Display for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (token, _)) in self.store.tokens().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{token}")?;
        }

        writeln!(f)?;

        for (i, (token, consumed)) in self.store.tokens().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            let filler = if consumed { "X" } else { " " };
            write!(f, "{}", filler.repeat(token.len()))?;
        }

        writeln!(f)?;

        for (index, value) in self.parameters.iter().enumerate() {
            writeln!(f, "{index} => {value}")?;
        }

        for (name, index) in &self.named_parameters {
            writeln!(f, "{name} => {index}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;
    use rstest::rstest;

    #[rstest]
    #[case(&["--test"][..], true)]
    #[case(&[][..], false)]
    fn allow_flag(#[case] tokens: &[&str], #[case] expected: bool) {
        let bindings = Bindings::load(tokens.iter().copied()).allow_flag("test", &[]);

        assert_eq!(bindings.flag("test").unwrap(), expected);
        assert!(bindings.has_flag("test"));
    }

    #[rstest]
    #[case(&["--verbose"][..])]
    #[case(&["-v"][..])]
    fn flag_alternate_names(#[case] tokens: &[&str]) {
        let bindings = Bindings::load(tokens.iter().copied()).expect_flag("verbose", &["v"]);

        assert!(bindings.flag("verbose").unwrap());
        // Only the primary name is queryable.
        assert!(!bindings.has_flag("v"));
    }

    #[test]
    fn expect_flag_missing_accumulates() {
        let bindings = Bindings::load(["leftover"]).expect_flag("verbose", &[]);

        // Declared, absent: a legitimate false, plus a pending failure.
        assert_eq!(bindings.flag("verbose").unwrap(), false);
        let error = bindings.chop_and_validate().unwrap_err();
        assert_eq!(
            error.failures(),
            &[BindFailure::MissingFlag("verbose".to_string())]
        );
    }

    #[test]
    fn allow_option_bound() {
        let bindings = Bindings::load(["--key", "value"]).allow_option("key", &[]);

        assert!(bindings.has_option("key"));
        assert_eq!(bindings.option("key").unwrap(), "value");
    }

    #[test]
    fn allow_option_absent() {
        let bindings = Bindings::load(Vec::<&str>::new()).allow_option("key", &[]);

        assert!(!bindings.has_option("key"));
        assert_matches!(
            bindings.option("key"),
            Err(AccessError::UnboundOption(name)) if name == "key"
        );
    }

    #[test]
    fn expect_option_missing_accumulates() {
        let bindings = Bindings::load(Vec::<&str>::new()).expect_option("key", &[]);

        let error = bindings.validate().unwrap_err();

        assert_eq!(
            error.failures(),
            &[BindFailure::MissingOption("key".to_string())]
        );
    }

    #[rstest]
    #[case(&["--key", "value"][..], "key", &[][..])]
    #[case(&["--id", "value"][..], "key", &["id"][..])]
    #[case(&["-k", "value"][..], "key", &["id", "k"][..])]
    fn option_alias_resolution(#[case] tokens: &[&str], #[case] name: &str, #[case] alts: &[&str]) {
        let result = Bindings::load(tokens.iter().copied())
            .expect_option(name, alts)
            .validate()
            .unwrap();

        assert_eq!(result.option(name).unwrap(), "value");
    }

    #[test]
    fn option_name_at_end_is_found_without_value() {
        let bindings = Bindings::load(["--key"]).expect_option("key", &[]);

        // The name token was consumed, so nothing is left over; the failure is specific.
        let error = bindings.validate().unwrap_err();
        assert_eq!(
            error.failures(),
            &[BindFailure::OptionMissingValue("key".to_string())]
        );
        assert!(!bindings.has_option("key"));
        assert_matches!(bindings.option("key"), Err(AccessError::UnboundOption(_)));
    }

    #[test]
    fn allow_option_at_end_also_records_failure() {
        let error = Bindings::load(["--key"])
            .allow_option("key", &[])
            .validate()
            .unwrap_err();

        assert_eq!(
            error.failures(),
            &[BindFailure::OptionMissingValue("key".to_string())]
        );
    }

    #[rstest]
    #[case("3", Ok(3))]
    #[case("-7", Ok(-7))]
    fn option_as_converts(#[case] value: &str, #[case] expected: Result<i32, ()>) {
        let result = Bindings::load(["--count", value])
            .expect_option("count", &[])
            .validate()
            .unwrap();

        assert_eq!(result.option_as::<i32>("count").ok(), expected.ok());
    }

    #[test]
    fn option_as_conversion_failure() {
        let result = Bindings::load(["--count", "blah"])
            .expect_option("count", &[])
            .validate()
            .unwrap();

        assert_matches!(
            result.option_as::<u32>("count"),
            Err(AccessError::InconvertibleOption { name, .. }) if name == "count"
        );
    }

    #[test]
    fn params_bind_left_to_right() {
        let result = Bindings::load(["a", "b", "c"])
            .expect_param()
            .expect_param_named("middle")
            .expect_param()
            .validate()
            .unwrap();

        assert_eq!(result.param_at(0).unwrap(), "a");
        assert_eq!(result.param_named("middle").unwrap(), "b");
        assert_eq!(result.param_at(2).unwrap(), "c");
    }

    #[test]
    fn params_skip_consumed_tokens() {
        // The flag in the middle is claimed first, so the params flow around it.
        let result = Bindings::load(["a", "--verbose", "b"])
            .expect_flag("verbose", &[])
            .expect_param()
            .expect_param()
            .validate()
            .unwrap();

        assert_eq!(result.param_at(0).unwrap(), "a");
        assert_eq!(result.param_at(1).unwrap(), "b");
    }

    #[test]
    fn expect_param_exhausted_accumulates() {
        let error = Bindings::load(Vec::<&str>::new())
            .expect_param()
            .expect_param_named("command")
            .validate()
            .unwrap_err();

        assert_eq!(
            error.failures(),
            &[BindFailure::MissingParameter, BindFailure::MissingParameter]
        );
    }

    #[test]
    fn allow_param_named_exhausted_registers_nothing() {
        let result = Bindings::load(Vec::<&str>::new())
            .allow_param_named("command")
            .validate()
            .unwrap();

        assert!(!result.has_param_at(0));
        assert!(!result.has_param_named("command"));
        assert_matches!(
            result.param_named("command"),
            Err(AccessError::NoParameterNamed(_))
        );
    }

    #[test]
    fn undeclared_queries_error() {
        let bindings = Bindings::load(["foo"]);

        assert_matches!(bindings.flag("moot"), Err(AccessError::UndeclaredFlag(_)));
        assert_matches!(
            bindings.option("moot"),
            Err(AccessError::UndeclaredOption(_))
        );
        assert_matches!(bindings.param_at(0), Err(AccessError::NoParameterAt(0)));
    }

    #[test]
    fn validate_reports_leftovers() {
        let error = Bindings::load(["a", "b"]).validate().unwrap_err();

        assert_eq!(error.failures(), &[BindFailure::UnconsumedTokens(2)]);
    }

    #[test]
    fn validate_reports_both_conditions() {
        // The leftover check runs even though an expectation already failed.
        let error = Bindings::load(["stray"]).expect_flag("verbose", &[]).validate().unwrap_err();

        assert_eq!(
            error.failures(),
            &[
                BindFailure::MissingFlag("verbose".to_string()),
                BindFailure::UnconsumedTokens(1),
            ]
        );
    }

    #[test]
    fn validate_does_not_mutate() {
        let bindings = Bindings::load(["stray"]);

        assert!(bindings.validate().is_err());
        assert!(bindings.chop_and_validate().is_ok());
        // Still errs: the receiver kept its unconsumed token both times.
        assert!(bindings.validate().is_err());
    }

    #[test]
    fn chop_discards_remainder() {
        let result = Bindings::load(["do", "something", "--carefully"])
            .expect_param()
            .chop()
            .validate()
            .unwrap();

        assert_eq!(result.param_at(0).unwrap(), "do");
        assert!(!result.has_param_at(1));
    }

    #[test]
    fn chop_slice_returns_remainder_in_order() {
        let (result, tail) = Bindings::load(["do", "something", "--carefully"])
            .expect_param()
            .chop_slice();

        assert_eq!(tail, vec!["something".to_string(), "--carefully".to_string()]);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn chop_string_joins_with_spaces() {
        let (result, tail) = Bindings::load(["do", "something", "--carefully"])
            .expect_param()
            .chop_string();

        assert_eq!(tail, "something --carefully");
        assert!(result.validate().is_ok());
    }

    #[test]
    fn declarations_leave_the_receiver_unchanged() {
        let original = Bindings::load(["foo", "bar"]);
        assert!(!original.has_param_named("fizzbuzz"));

        let derived = original.expect_param_named("fizzbuzz");

        assert!(!original.has_param_named("fizzbuzz"));
        assert!(derived.has_param_named("fizzbuzz"));
    }

    #[test]
    fn accessors_are_idempotent() {
        let result = Bindings::load(["--key", "value"])
            .expect_option("key", &[])
            .validate()
            .unwrap();

        assert_eq!(result.option("key").unwrap(), result.option("key").unwrap());
        assert_eq!(result.has_option("key"), result.has_option("key"));
    }

    #[test]
    fn display_renders_consumption_picture() {
        let bindings = Bindings::load(["do", "--carefully"])
            .expect_param_named("action")
            .expect_flag("carefully", &[]);

        let rendered = bindings.to_string();

        assert_contains!(rendered, "do, --carefully");
        assert_contains!(rendered, "0 => do");
        assert_contains!(rendered, "action => 0");
    }
}
