//! Logging macros that capture the call site
//!
//! ```ignore
//! log_info!(harness, "loaded {} items", items.len());
//! log_debug!(harness, filter: "net", "GET {}", url);
//! to_screen!(harness, details: "tap to dismiss", "Welcome back");
//! ```

/// Name of the enclosing function
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        let name = name.strip_suffix("::__here").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

/// [`CallSite`](crate::CallSite) of the macro invocation
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(::core::file!(), $crate::function_name!(), ::core::line!())
    };
}

/// Log at an explicit level, optionally tagged with a filter
#[macro_export]
macro_rules! log_at {
    ($harness:expr, $level:expr, filter: $filter:expr, $($arg:tt)+) => {
        $harness.log(
            $level,
            ::core::option::Option::Some(&::core::format_args!($($arg)+)),
            ::core::option::Option::Some($filter),
            &$crate::call_site!(),
        )
    };
    ($harness:expr, $level:expr, $($arg:tt)+) => {
        $harness.log(
            $level,
            ::core::option::Option::Some(&::core::format_args!($($arg)+)),
            ::core::option::Option::None,
            &$crate::call_site!(),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($harness:expr, $($arg:tt)+) => {
        $crate::log_at!($harness, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($harness:expr, $($arg:tt)+) => {
        $crate::log_at!($harness, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($harness:expr, $($arg:tt)+) => {
        $crate::log_at!($harness, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($harness:expr, $($arg:tt)+) => {
        $crate::log_at!($harness, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($harness:expr, $($arg:tt)+) => {
        $crate::log_at!($harness, $crate::LogLevel::Critical, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_todo {
    ($harness:expr, $($arg:tt)+) => {
        $crate::log_at!($harness, $crate::LogLevel::Todo, $($arg)+)
    };
}

/// Add a formatted message to the screen log
#[macro_export]
macro_rules! to_screen {
    ($harness:expr, details: $details:expr, $($arg:tt)+) => {
        $harness.to_screen(
            ::core::option::Option::Some(&::core::format_args!($($arg)+)),
            ::core::option::Option::Some(&$details),
        )
    };
    ($harness:expr, $($arg:tt)+) => {
        $harness.to_screen(
            ::core::option::Option::Some(&::core::format_args!($($arg)+)),
            ::core::option::Option::None,
        )
    };
}
