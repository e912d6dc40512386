///
/// Scalar Kind Registry
///
/// Single source of truth for scalar metadata.
///

// NOTE: Key is text on the wire; its format is a schema concern, not a kind one.
macro_rules! scalar_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (Bool, "bool", Bool, is_signed = false, is_wide_integer = false, is_message_backed = false),
            (Bytes, "bytes", Bytes, is_signed = false, is_wide_integer = false, is_message_backed = false),
            (Date, "date", Temporal, is_signed = false, is_wide_integer = false, is_message_backed = true),
            (Decimal, "decimal", Text, is_signed = true, is_wide_integer = false, is_message_backed = true),
            (Duration, "duration", Temporal, is_signed = true, is_wide_integer = false, is_message_backed = true),
            (Float32, "float32", Float, is_signed = true, is_wide_integer = false, is_message_backed = false),
            (Float64, "float64", Float, is_signed = true, is_wide_integer = false, is_message_backed = false),
            (Int32, "int32", Integer, is_signed = true, is_wide_integer = false, is_message_backed = false),
            (Int64, "int64", Integer, is_signed = true, is_wide_integer = true, is_message_backed = false),
            (Key, "key", Text, is_signed = false, is_wide_integer = false, is_message_backed = false),
            (String, "string", Text, is_signed = false, is_wide_integer = false, is_message_backed = false),
            (Timestamp, "timestamp", Temporal, is_signed = false, is_wide_integer = false, is_message_backed = true),
            (Uint32, "uint32", Integer, is_signed = false, is_wide_integer = false, is_message_backed = false),
            (Uint64, "uint64", Integer, is_signed = false, is_wide_integer = true, is_message_backed = false),
        }
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $( ($variant:ident, $label:literal, $family:ident, is_signed = $signed:expr, is_wide_integer = $wide:expr, is_message_backed = $backed:expr) ),* $(,)? ) => {
        match $kind {
            $(
                ScalarKind::$variant => ScalarMetadata {
                    label: $label,
                    family: ScalarFamily::$family,
                    is_signed: $signed,
                    is_wide_integer: $wide,
                    is_message_backed: $backed,
                },
            )*
        }
    };
}

macro_rules! scalar_kind_registry {
    ($macro:ident, $kind:expr) => {
        scalar_kind_registry_entries!($macro, @args $kind)
    };
}
