/// The error type returned by every fallible operation in this crate.
///
/// Mirrors the status-code taxonomy of the library this crate's score map
/// is part of: `InvalidParam` for structural violations, `NotFound` for
/// selection-string tokens that don't name anything, `NoMemory` for
/// allocation failure, and `NotSupported` forwarded unchanged from callers
/// that hand the core an unsupported request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A structural invariant was violated: `start >= end`, an overlapping
  /// `add_range`, or a selection-string entry that doesn't match the
  /// grammar after every field has been classified.
  #[error("invalid parameter: {reason}")]
  InvalidParam {
    /// Human-readable description of what was invalid.
    reason: std::string::String,
  },
  /// Reserved for API parity with the status-code taxonomy this crate's
  /// score map mirrors. Field classification treats an unrecognized name
  /// as "not this field, try the next one" rather than raising this
  /// directly; only a token matching none of the four grammars fails,
  /// and it fails as [`Error::InvalidParam`].
  #[error("token does not match any known field: {token:?}")]
  NotFound {
    /// The offending token.
    token: std::string::String,
  },
  /// Allocation failed while growing a range list.
  #[error("out of memory")]
  NoMemory,
  /// Forwarded unchanged from a higher layer; the core never raises this
  /// itself.
  #[error("not supported: {reason}")]
  NotSupported {
    /// Human-readable description of what isn't supported.
    reason: std::string::String,
  },
  /// A single `#`-separated entry of a selection string failed to parse.
  ///
  /// Carries the entry's position and text so that a caller may choose to
  /// log the failure and continue with the remaining entries, per the
  /// parser's documented policy for mixed input.
  #[error("failed to parse entry {entry_index} ({entry:?}): {source}")]
  Parse {
    /// Zero-based index of the failing `#`-separated entry.
    entry_index: usize,
    /// The failing entry's source text.
    entry: std::string::String,
    /// The underlying classification failure.
    #[source]
    source: std::boxed::Box<Error>,
  },
}

impl Error {
  #[inline]
  pub(crate) fn invalid_param(reason: impl Into<std::string::String>) -> Self {
    Self::InvalidParam {
      reason: reason.into(),
    }
  }

  #[inline]
  pub(crate) fn parse(entry_index: usize, entry: impl Into<std::string::String>, source: Error) -> Self {
    Self::Parse {
      entry_index,
      entry: entry.into(),
      source: std::boxed::Box::new(source),
    }
  }
}

/// A specialized [`Result`] for this crate's fallible operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
