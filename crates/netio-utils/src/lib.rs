//! Ambient assertion macros used across the `netio` workspace.
//!
//! In debug builds these panic just like their `std` counterparts. In
//! release builds they log via `tracing::error!` instead of aborting the
//! process, so a violated internal invariant degrades to a logged error
//! rather than taking down a long-running service.

#[macro_export]
macro_rules! safe_panic {
    ($($arg:tt)*) => (if cfg!(debug_assertions) { panic!($($arg)*); } else { tracing::error!($($arg)*) })
}

#[macro_export]
macro_rules! safe_assert {
    ($cond:expr $(,)?) => {
        #[cfg(debug_assertions)]
        {
            debug_assert!($cond);
        }
        #[cfg(not(debug_assertions))]
        {
            if !$cond {
                tracing::error!("ASSERT FAILED: {}", stringify!($cond));
            }
        }
    };

    ($cond:expr, $($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            debug_assert!($cond, $($arg)+);
        }
        #[cfg(not(debug_assertions))]
        {
            if !$cond {
                tracing::error!("ASSERT FAILED: {}", format!($($arg)+));
            }
        }
    };
}

#[macro_export]
macro_rules! safe_assert_eq {
    ($left:expr, $right:expr $(,)?) => {
        #[cfg(debug_assertions)]
        {
            debug_assert_eq!($left, $right);
        }
        #[cfg(not(debug_assertions))]
        {
            if !($left == $right) {
                tracing::error!(
                    "ASSERT FAILED: {} (left: `{:?}`, right: `{:?}`)",
                    stringify!($left == $right),
                    &$left,
                    &$right
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    #[should_panic]
    fn safe_assert_panics_in_debug() {
        safe_assert!(1 == 2, "one is not two");
    }

    #[test]
    fn safe_assert_passes_silently() {
        safe_assert!(1 == 1);
        safe_assert_eq!(2 + 2, 4);
    }
}
