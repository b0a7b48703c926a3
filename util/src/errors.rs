//! Helpers for error handling

/// Expands a given error type to wrap a stringified version of a given error
///
/// To be used in a map_err() call
#[macro_export]
macro_rules! err_str {
    ($x:expr) => {
        |e| $x(e.to_string())
    };
}

/// Formats an error into a string with the given format string
///
/// The error is placed as the last format argument
#[macro_export]
macro_rules! raw_err_str {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        |e| format!($fmt $(, $($arg)*)?, e)
    }
}
