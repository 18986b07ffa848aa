// Formatted emission macros
//
// The leveled macros take a `Logger` (or reference to one) followed by
// `format!` arguments. The message is only rendered when the channel is
// active and the severity passes its level filter.

#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! panicf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panic(::std::format_args!($($arg)+))
    };
}

/// `access_infof!(logger, fields, "fmt", args...)`
#[macro_export]
macro_rules! access_infof {
    ($logger:expr, $fields:expr, $($arg:tt)+) => {
        $logger.access_info(::std::format_args!($($arg)+), $fields)
    };
}

/// `timestamped!("fmt", args...)` prints a timestamped line to stdout
#[macro_export]
macro_rules! timestamped {
    ($($arg:tt)+) => {
        $crate::console::timestamped(::std::format_args!($($arg)+))
    };
}
