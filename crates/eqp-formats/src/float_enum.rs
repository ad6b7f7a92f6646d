//! Closed enums stored on disk as integral `f32` values.

/// Integral value held by an on-disk enum float, if any.
pub(crate) fn integral(raw: f32) -> Option<i32> {
    if raw.is_finite() && raw.fract() == 0.0 && raw >= i32::MIN as f32 && raw <= i32::MAX as f32 {
        Some(raw as i32)
    } else {
        None
    }
}

/// Declare an enum whose variants are stored as the floats `0.0`, `1.0`, ...
///
/// Decoding matches the exact integral value and reports anything else as
/// `MalformedEnumValue` naming the field and the raw float.
macro_rules! float_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($field:literal) {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            pub fn from_f32(raw: f32) -> Result<Self, $crate::FormatError> {
                match $crate::float_enum::integral(raw) {
                    $(Some($value) => Ok(Self::$variant),)+
                    _ => Err($crate::FormatError::MalformedEnumValue {
                        field: $field,
                        value: f64::from(raw),
                    }),
                }
            }

            pub fn to_f32(self) -> f32 {
                self as i32 as f32
            }

            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

pub(crate) use float_enum;
