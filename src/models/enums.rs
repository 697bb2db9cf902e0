use crate::models::ModelError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Sex {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(ReadingStatus {
    BelowRange => "below_range",
    InRange => "in_range",
    AboveRange => "above_range",
    NotMeasured => "not_measured",
    Unknown => "unknown",
});

str_enum!(ConfidenceTier {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(SuggestedAction {
    ReuseExisting => "reuse_existing",
    CreateNew => "create_new",
    ManualSelect => "manual_select",
});

str_enum!(ClientStatus {
    Active => "active",
    Archived => "archived",
});
