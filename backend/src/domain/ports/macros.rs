//! `define_port_error!` builds thiserror-backed error enums for driven ports.
//!
//! Every variant gets a snake_case constructor, so adapters write
//! `DailyRecordRepositoryError::connection("refused")` instead of spelling out
//! struct variants. String fields accept anything `Into<String>`.

macro_rules! define_port_error {
    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@collect $variant () () $( $field : $ty, )*);
    };

    (@collect $variant:ident ($($params:tt)*) ($($fields:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($fields)* }
            }
        }
    };

    (@collect $variant:ident ($($params:tt)*) ($($fields:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @collect
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($fields)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
