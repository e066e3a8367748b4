//! Helper macros enforcing consistent Cartograph log fields.
//!
//! These macros keep the `endpoint` field present on every log emitted from the
//! probe and upstream layers so downstream parsing can rely on it.

/// Log an event for an endpoint plus any extra fields.
#[macro_export]
macro_rules! endpoint_event {
    ($level:ident, $target:expr, $event:expr, endpoint = $endpoint:expr $(, $field:ident = $value:expr )* $(,)?) => {
        tracing::$level!(
            target = $target,
            event = $event,
            endpoint = $endpoint,
            $($field = %$value,)*
        )
    };
}
