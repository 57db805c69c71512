/// Logs through a [`crate::Context`], so its log callback sees the message.
macro_rules! ctx_log {
    ($ctx: expr, $level: expr, $($arg:tt)*) => {
        $ctx.log($level, format_args!($($arg)*))
    };
}
