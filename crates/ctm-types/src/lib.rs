//! Validated primitives shared by the trial matcher crates.
//!
//! Every type here can only be constructed through a checking constructor, so the core
//! pipeline never has to re-validate form input.

/// Errors that can occur when constructing validated primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// The criterion text was empty or contained only whitespace
    #[error("criterion text cannot be empty")]
    EmptyCriterion,
    /// Threshold outside 0..=100
    #[error("eligibility threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(i64),
    /// Age outside 0..=120
    #[error("patient age must be between 0 and {max}, got {0}", max = PatientAge::MAX)]
    AgeOutOfRange(i64),
    /// Performance score outside 0..=4
    #[error("performance status must be between 0 and {max}, got {0}", max = PerformanceScore::MAX)]
    PerformanceOutOfRange(i64),
    /// The input could not be read as a whole number
    #[error("expected a whole number, got {0:?}")]
    NotAnInteger(String),
}

/// A single eligibility criterion line.
///
/// The input is trimmed of leading and trailing whitespace during construction and must
/// contain at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CriterionText(String);

impl CriterionText {
    /// Creates a new `CriterionText`, trimming the input.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::EmptyCriterion` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyCriterion);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased copy used for case-insensitive phrase tests.
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for CriterionText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CriterionText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for CriterionText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for CriterionText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CriterionText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Implements checked construction and serde for a bounded integer newtype.
macro_rules! bounded_integer {
    ($name:ident, $inner:ty, $max:expr, $err:ident) => {
        impl $name {
            pub const MAX: $inner = $max;

            /// Validates that `value` lies within `0..=MAX`.
            pub fn new(value: i64) -> Result<Self, TypesError> {
                if (0..=i64::from(Self::MAX)).contains(&value) {
                    Ok(Self(value as $inner))
                } else {
                    Err(TypesError::$err(value))
                }
            }

            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| TypesError::NotAnInteger(s.to_owned()))?;
                Self::new(value)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_u64(u64::from(self.0))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = i64::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Eligibility threshold as an integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(u8);

bounded_integer!(Threshold, u8, 100, ThresholdOutOfRange);

impl Threshold {
    /// Whether a percentage score reaches this threshold (inclusive).
    pub fn admits(self, percentage: f64) -> bool {
        percentage >= f64::from(self.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(50)
    }
}

/// Patient age in whole years, `0..=120`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PatientAge(u32);

bounded_integer!(PatientAge, u32, 120, AgeOutOfRange);

/// ECOG-style performance status, `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PerformanceScore(u8);

bounded_integer!(PerformanceScore, u8, 4, PerformanceOutOfRange);
