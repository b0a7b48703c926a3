//! Assertion macros that return an `eyre` error instead of panicking, so
//! scenario tests can chain them with `?`

/// Assert that a condition holds
#[macro_export]
macro_rules! assert_true_result {
    ($cond:expr) => {
        if $cond {
            Ok(())
        } else {
            Err(eyre::eyre!("assertion failed: `{}`", stringify!($cond)))
        }
    };
}

/// Assert that two values are equal; each side is evaluated once
#[macro_export]
macro_rules! assert_eq_result {
    ($left:expr, $right:expr) => {
        match (&$left, &$right) {
            (left, right) if *left == *right => Ok(()),
            (left, right) => Err(eyre::eyre!(
                "assertion failed: `{} == {}`\n  left: {left:?}\n right: {right:?}",
                stringify!($left),
                stringify!($right),
            )),
        }
    };
}

/// Assert that a value matches a pattern
#[macro_export]
macro_rules! assert_matches_result {
    ($value:expr, $pattern:pat) => {
        match &$value {
            $pattern => Ok(()),
            other => Err(eyre::eyre!(
                "assertion failed: `{}` matches `{}`, got {other:?}",
                stringify!($value),
                stringify!($pattern),
            )),
        }
    };
}
