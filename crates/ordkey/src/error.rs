use core::fmt;

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `ordkey` can emit.
///
/// Every variant is local and fatal to the failing call: the generator
/// performs no retries or recovery. A returned error means the requested
/// insertion (or parse) must be treated as invalid by the owning sync layer,
/// typically as a data-integrity problem with a persisted key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A digit-stepping helper received a non-positive trailing digit.
    ///
    /// Trailing digits of persisted order keys are always `>= 1`, so this
    /// signals a corrupted upstream key rather than a transient failure.
    InvalidInputOrder,

    /// Both boundary keys were empty, leaving no sibling context to insert
    /// into.
    InvalidBoundaries,

    /// A segment that must hold an ordering digit failed to parse as a
    /// non-negative integer.
    ///
    /// This wraps the [`crate::MalformedSegmentError`] type emitted by the
    /// key parser.
    MalformedSegment(crate::MalformedSegmentError),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidInputOrder => write!(fmt, "Invalid input order"),
            Error::InvalidBoundaries => write!(fmt, "Invalid previous and next orders"),
            Error::MalformedSegment(e) => write!(fmt, "{e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::MalformedSegment(e) => Some(e),
            _ => None,
        }
    }
}
