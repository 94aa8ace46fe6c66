//! Trial eligibility criteria: splitting free text into sections and profiling each
//! section into an attribute record.

pub mod profiler;
pub mod splitter;

use serde::{Deserialize, Serialize};

pub use profiler::{generate_criteria_profile, CriteriaProfile};
pub use splitter::{split_criteria, EligibilityCriteria};

/// Which side of the eligibility statement a criterion belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Inclusion,
    Exclusion,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Inclusion, Category::Exclusion];

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Inclusion => "inclusion",
            Category::Exclusion => "exclusion",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
