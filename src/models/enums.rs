use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde goes through the same strings, so catalog JSON and output JSON
/// agree with `as_str`. Declaration order is the `Ord` order.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub const ALL: &'static [$name] = &[$(Self::$variant),+];
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
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

// Ordinal: critical-low < low < normal < high < critical-high.
str_enum!(ResultStatus {
    CriticalLow => "critical-low",
    Low => "low",
    Normal => "normal",
    High => "high",
    CriticalHigh => "critical-high",
});

impl ResultStatus {
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Self::CriticalLow | Self::CriticalHigh)
    }

    pub fn is_below(&self) -> bool {
        matches!(self, Self::CriticalLow | Self::Low)
    }

    pub fn is_above(&self) -> bool {
        matches!(self, Self::High | Self::CriticalHigh)
    }
}

// Ordinal: routine < urgent < critical.
str_enum!(Urgency {
    Routine => "routine",
    Urgent => "urgent",
    Critical => "critical",
});

impl Default for Urgency {
    fn default() -> Self {
        Self::Routine
    }
}

/// Which abnormal side a clinical interpretation applies to.
str_enum!(Direction {
    Low => "low",
    High => "high",
    Both => "both",
});

impl Direction {
    /// Whether an interpretation with this direction applies to `status`.
    /// A normal status matches nothing.
    pub fn applies_to(&self, status: ResultStatus) -> bool {
        match self {
            Self::Low => status.is_below(),
            Self::High => status.is_above(),
            Self::Both => !status.is_normal(),
        }
    }
}

/// Demographic stratum a reference band is defined for.
str_enum!(Stratum {
    General => "general",
    Male => "male",
    Female => "female",
    Pregnancy => "pregnancy",
    Pediatric => "pediatric",
    Geriatric => "geriatric",
});

str_enum!(BiologicalSex {
    Male => "male",
    Female => "female",
    Unspecified => "unspecified",
});

str_enum!(TrendDirection {
    Rising => "rising",
    Falling => "falling",
    Stable => "stable",
});

str_enum!(LabCategory {
    Cbc => "cbc",
    Cmp => "cmp",
    Lft => "lft",
    Lipid => "lipid",
    Thyroid => "thyroid",
    Coagulation => "coagulation",
    Cardiac => "cardiac",
    Renal => "renal",
    Inflammatory => "inflammatory",
    Endocrine => "endocrine",
    TumorMarkers => "tumor-markers",
    Urinalysis => "urinalysis",
    BloodGas => "blood-gas",
    Autoimmune => "autoimmune",
    Infectious => "infectious",
    Nutritional => "nutritional",
    Specialty => "specialty",
});

str_enum!(BodySystem {
    Hematologic => "hematologic",
    Immune => "immune",
    Cardiovascular => "cardiovascular",
    Respiratory => "respiratory",
    Endocrine => "endocrine",
    Hepatic => "hepatic",
    Renal => "renal",
    Musculoskeletal => "musculoskeletal",
    Neurological => "neurological",
    Gastrointestinal => "gastrointestinal",
    Reproductive => "reproductive",
    Integumentary => "integumentary",
});

str_enum!(Specimen {
    WholeBlood => "whole-blood",
    Serum => "serum",
    Plasma => "plasma",
    Urine => "urine",
    ArterialBlood => "arterial-blood",
    Csf => "csf",
});
