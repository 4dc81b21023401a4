//! Lenient parsing of enum labels typed into the sheet
//!
//! Cells in a shared sheet are edited by hand, so labels arrive with mixed
//! case, stray emoji ("⏳ Recibido") and in either English or Spanish.

/// Fold a label to lowercase ASCII alphanumerics, dropping accents
pub(crate) fn fold(label: &str) -> String {
    label
        .chars()
        .filter_map(|c| match c {
            'á' | 'Á' | 'à' | 'À' => Some('a'),
            'é' | 'É' | 'è' | 'È' => Some('e'),
            'í' | 'Í' | 'ì' | 'Ì' => Some('i'),
            'ó' | 'Ó' | 'ò' | 'Ò' => Some('o'),
            'ú' | 'Ú' | 'ü' | 'Ü' => Some('u'),
            'ñ' | 'Ñ' => Some('n'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

/// Validation error for a label no variant accepts, listing the canonical
/// labels
pub(crate) fn unknown(
    kind: &str,
    raw: &str,
    labels: impl IntoIterator<Item = &'static str>,
) -> crate::Error {
    let labels: Vec<_> = labels.into_iter().collect();
    let expected = match labels.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => String::new(),
    };
    crate::Error::validation(format!("unknown {} '{}' (expected {})", kind, raw, expected))
}

/// Implements `Display`, `Serialize` and `Deserialize` for a label enum that
/// already has `label()` and `FromStr`.
macro_rules! label_enum_serde {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse::<Self>().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use label_enum_serde;
