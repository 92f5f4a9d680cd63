//! Single-line diagnostics on stderr. The hosting engine owns real
//! logging; the rewriter only ever reports map-load events, map
//! problems, and accepted rewrites.

#[macro_export]
macro_rules! vase_message {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
    }};
}

#[macro_export]
macro_rules! vase_warning {
    ($($arg:tt)*) => {{
        eprintln!("warning: {}", format!($($arg)*));
    }};
}
