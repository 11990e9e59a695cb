use std::fmt;

/// Turns a `Result` into an `Option`, logging the error as a warning.
pub trait ResultOkLogExt<T, E> {
    /// Returns the success value, or logs `context` together with the error and
    /// returns `None`.
    fn ok_log(self, context: impl fmt::Display) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, context: impl fmt::Display) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::warn!("{context}: {err}");
                None
            }
        }
    }
}
