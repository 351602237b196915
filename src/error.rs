use std::sync::Arc;

/// Creates an ad hoc [`Error`] value from format args.
///
/// This is the most common way errors are manufactured inside this crate.
/// More structured kinds (parse anchors, unknown rule names and so on) have
/// dedicated constructors on `Error`.
macro_rules! err {
    ($($tt:tt)*) => {{
        crate::error::Error::adhoc(format_args!($($tt)*))
    }}
}

pub(crate) use err;

/// An error that can occur in this crate.
///
/// This crate follows the "One True God Error Type Pattern," where only one
/// error type exists for a variety of different operations: parsing tz
/// source, resolving zone transitions, encoding or validating TZif data and
/// reading release archives. Finer grained error types proved difficult in
/// the face of composition, since a single compile touches every stage.
///
/// Errors form a causal chain: a field-level failure is wrapped by the line
/// it occurred on, which is wrapped by the zone being compiled. The
/// [`core::fmt::Display`] impl prints the whole chain separated by `: `.
///
/// # Introspection is limited
///
/// Other than implementing the [`std::error::Error`] trait, the
/// [`core::fmt::Debug`] trait and the [`core::fmt::Display`] trait, this
/// error type currently provides limited introspection capabilities. Simple
/// predicates like [`Error::is_parse`] are provided, keyed on the broad
/// failure categories a caller might plausibly branch on.
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// This is in an `Arc` to make an `Error` cloneable. It also makes
    /// clones cheap, which matters because compiled artifacts for linked
    /// zone names share their target's data.
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

/// The underlying kind of an [`Error`].
#[derive(Debug)]
pub(crate) enum ErrorKind {
    /// An arbitrary message.
    Adhoc(String),
    /// Several errors reported together, e.g. every bad field of one rule
    /// line, or every zone that failed to compile.
    Joined(Vec<Error>),
    /// A line-anchored parse failure. This is always a context frame
    /// wrapping the underlying field error.
    Parse { line: u64, text: String },
    /// A zone line referenced a rule set that does not exist.
    UnknownRuleName { name: String },
    /// The source uses a construct outside the subset this crate compiles.
    UnsupportedRuleForm { reason: String },
    /// The resolver walked past its safety bound without reaching a fixed
    /// point. This indicates a bug in rule selection, not bad input.
    ResolverBound { year: i32 },
    /// A TZif structure violates the format's invariants.
    Encoder(String),
    /// An I/O failure from an upstream byte stream.
    Io(std::io::Error),
}

impl Error {
    /// Creates a new "ad hoc" error value.
    ///
    /// Callers should use the `err!` macro instead of this directly.
    #[inline(never)]
    #[cold]
    pub(crate) fn adhoc(message: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(message.to_string()))
    }

    /// Joins multiple errors into one, or returns `None` when `errs` is
    /// empty. A single error is returned unchanged.
    pub(crate) fn join(mut errs: Vec<Error>) -> Option<Error> {
        match errs.len() {
            0 => None,
            1 => errs.pop(),
            _ => Some(Error::from(ErrorKind::Joined(errs))),
        }
    }

    /// Creates a parse-anchor error for the given 1-based line number and
    /// the offending line text. Meant to be used as a `context` frame.
    #[inline(never)]
    #[cold]
    pub(crate) fn parse_line(line: u64, text: &str) -> Error {
        Error::from(ErrorKind::Parse { line, text: text.to_string() })
    }

    /// Creates an error for a zone referencing a nonexistent rule set.
    #[inline(never)]
    #[cold]
    pub(crate) fn unknown_rule_name(name: &str) -> Error {
        Error::from(ErrorKind::UnknownRuleName { name: name.to_string() })
    }

    /// Creates an error for a source construct outside the implemented
    /// subset.
    #[inline(never)]
    #[cold]
    pub(crate) fn unsupported(reason: impl Into<String>) -> Error {
        Error::from(ErrorKind::UnsupportedRuleForm { reason: reason.into() })
    }

    /// Creates an error signaling that the resolver hit its safety bound.
    #[inline(never)]
    #[cold]
    pub(crate) fn resolver_bound(year: i32) -> Error {
        Error::from(ErrorKind::ResolverBound { year })
    }

    /// Creates an error for a TZif invariant violation.
    #[inline(never)]
    #[cold]
    pub(crate) fn encoder(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Encoder(message.into()))
    }

    /// A convenience constructor for wrapping an I/O error.
    #[inline(never)]
    #[cold]
    pub(crate) fn io(err: std::io::Error) -> Error {
        Error::from(ErrorKind::Io(err))
    }

    /// Returns true when this error chain contains a line-anchored parse
    /// failure.
    pub fn is_parse(&self) -> bool {
        self.any_kind(|kind| matches!(*kind, ErrorKind::Parse { .. }))
    }

    /// Returns true when this error chain contains a reference to an
    /// unknown rule set name.
    pub fn is_unknown_rule_name(&self) -> bool {
        self.any_kind(|kind| matches!(*kind, ErrorKind::UnknownRuleName { .. }))
    }

    /// Returns true when this error chain contains a construct outside the
    /// subset of tz source this crate compiles.
    pub fn is_unsupported_rule_form(&self) -> bool {
        self.any_kind(|kind| {
            matches!(*kind, ErrorKind::UnsupportedRuleForm { .. })
        })
    }

    /// Returns true when this error chain contains a resolver safety-bound
    /// failure.
    pub fn is_resolver_bound(&self) -> bool {
        self.any_kind(|kind| matches!(*kind, ErrorKind::ResolverBound { .. }))
    }

    /// Returns true when this error chain contains a TZif invariant
    /// violation.
    pub fn is_encoder(&self) -> bool {
        self.any_kind(|kind| matches!(*kind, ErrorKind::Encoder(_)))
    }

    /// Returns true when this error chain contains an I/O failure.
    pub fn is_io(&self) -> bool {
        self.any_kind(|kind| matches!(*kind, ErrorKind::Io(_)))
    }

    /// Returns true if `predicate` matches any kind in this error chain,
    /// descending one level into joined errors.
    fn any_kind(&self, predicate: impl Fn(&ErrorKind) -> bool + Copy) -> bool {
        self.chain().any(|err| match *err.kind() {
            ErrorKind::Joined(ref errs) => errs
                .iter()
                .any(|err| err.chain().any(|err| predicate(err.kind()))),
            ref kind => predicate(kind),
        })
    }

    /// Contextualizes this error by wrapping it in `consequent`.
    ///
    /// This is equivalent to saying that "consequent is caused by self."
    pub(crate) fn context(self, consequent: Error) -> Error {
        let mut inner = Arc::try_unwrap(consequent.inner)
            .unwrap_or_else(|inner| ErrorInner {
                kind: ErrorKind::Adhoc(inner.kind.to_string()),
                cause: inner.cause.clone(),
            });
        assert!(inner.cause.is_none(), "cause of consequent must be `None`");
        inner.cause = Some(self);
        Error { inner: Arc::new(inner) }
    }

    /// Returns a chain of error values.
    ///
    /// This starts with the most recent error added to the chain. That is,
    /// the highest level context. The last error in the chain is always the
    /// "root" cause: the error closest to the point where something has
    /// gone wrong.
    ///
    /// The iterator returned is guaranteed to yield at least one error.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = Some(self);
        core::iter::from_fn(move || {
            let this = err?;
            err = this.inner.cause.as_ref();
            Some(this)
        })
    }

    /// Returns the kind of this error.
    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Arc::new(ErrorInner { kind, cause: None }) }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", self.kind())
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::Adhoc(ref message) => f.write_str(message),
            ErrorKind::Joined(ref errs) => {
                let mut it = errs.iter().peekable();
                while let Some(err) = it.next() {
                    core::fmt::Display::fmt(err, f)?;
                    if it.peek().is_some() {
                        f.write_str("; ")?;
                    }
                }
                Ok(())
            }
            ErrorKind::Parse { line, ref text } => {
                write!(f, "line {line}: {text:?}")
            }
            ErrorKind::UnknownRuleName { ref name } => {
                write!(f, "no rule lines found for rule name {name:?}")
            }
            ErrorKind::UnsupportedRuleForm { ref reason } => {
                write!(f, "unsupported rule form: {reason}")
            }
            ErrorKind::ResolverBound { year } => {
                write!(
                    f,
                    "resolver walked past year {year} without reaching a \
                     fixed point (this indicates a bug)",
                )
            }
            ErrorKind::Encoder(ref message) => {
                write!(f, "invalid TZif: {message}")
            }
            ErrorKind::Io(ref err) => core::fmt::Display::fmt(err, f),
        }
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize a `Result<T, Error>` without calling
/// `map_err` everywhere one wants to add context to an error.
///
/// This trick was borrowed from `anyhow`.
pub(crate) trait ErrorContext<T> {
    /// Contextualize the given consequent error with this (`self`) error as
    /// the cause.
    fn context(self, consequent: Error) -> Result<T, Error>;

    /// Like `context`, but hides error construction within a closure.
    ///
    /// This is useful when the creation of the consequent error is
    /// potentially "costly" (i.e., it allocates). The closure avoids paying
    /// the cost in the happy path.
    fn with_context(self, consequent: impl FnOnce() -> Error)
        -> Result<T, Error>;
}

impl<T> ErrorContext<T> for Result<T, Error> {
    fn context(self, consequent: Error) -> Result<T, Error> {
        self.map_err(|err| err.context(consequent))
    }

    fn with_context(
        self,
        consequent: impl FnOnce() -> Error,
    ) -> Result<T, Error> {
        self.map_err(|err| err.context(consequent()))
    }
}
