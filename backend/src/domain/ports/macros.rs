//! Helper macro for generating adapter-facing port error enums.
//!
//! Every port declares its failure modes as a small `thiserror` enum with
//! snake_case constructor helpers, so adapters can write
//! `LedgerStoreError::connection(message)` instead of spelling out struct
//! variants. The macro keeps those enums uniform across ports.

macro_rules! define_port_error {
    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),* },
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant { $($field : $ty),* });
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum ExampleStoreError {
            Connection { message: String } => "store unreachable: {message}",
            Window { offset: i64 } => "window starts at {offset}",
            Conflict { message: String, constraint: String } =>
                "conflict on {constraint}: {message}",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExampleStoreError::connection("refused");
        assert_eq!(err.to_string(), "store unreachable: refused");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = ExampleStoreError::window(4_i64);
        assert_eq!(err.to_string(), "window starts at 4");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExampleStoreError::conflict("duplicate", "invoice_number");
        assert_eq!(err.to_string(), "conflict on invoice_number: duplicate");
    }
}
