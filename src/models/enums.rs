use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error for a string that does not name any variant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variants are ordered as declared, and serialize as their string form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// Ascending urgency. The derived `Ord` relies on this declaration order.
str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(PromptLanguage {
    Czech => "cs",
    English => "en",
});

impl Default for PromptLanguage {
    fn default() -> Self {
        Self::Czech
    }
}

impl Severity {
    /// Short risk label shown next to an interaction.
    pub fn label(&self, language: PromptLanguage) -> &'static str {
        match (language, self) {
            (PromptLanguage::Czech, Self::Low) => "Nízké riziko",
            (PromptLanguage::Czech, Self::Medium) => "Střední riziko",
            (PromptLanguage::Czech, Self::High) => "Vysoké riziko",
            (PromptLanguage::Czech, Self::Critical) => "Kritické riziko",
            (PromptLanguage::English, Self::Low) => "Low risk",
            (PromptLanguage::English, Self::Medium) => "Medium risk",
            (PromptLanguage::English, Self::High) => "High risk",
            (PromptLanguage::English, Self::Critical) => "Critical risk",
        }
    }

    /// True when the user should act within days rather than at the next visit.
    pub fn is_urgent(&self) -> bool {
        *self >= Self::High
    }
}
