/*!
Logging hooks for the compiler.

With the `logging` feature enabled, the macros below forward to the `log`
crate; without it they expand to an empty block. That keeps the resolver
and compiler free to narrate their zone walks without a `cfg` at every
call site. Only the levels this crate actually emits are defined.
*/

macro_rules! trace {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::trace!($($args)*);
    }};
}

macro_rules! debug {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::debug!($($args)*);
    }};
}

macro_rules! info {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::info!($($args)*);
    }};
}
