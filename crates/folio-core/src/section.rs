//! Portfolio section enumeration.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Fixed set of portfolio sections a conversation can be scoped to.
///
/// The wire form is SCREAMING_SNAKE_CASE, matching the backend's routing
/// strings (`"PROJECTS"`, `"SKILLS"`, ...). Parsing is case-insensitive so
/// the lowercase keys of the portfolio payload resolve to the same variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PortfolioSection {
    About,
    Experience,
    Projects,
    CaseStudies,
    Skills,
    Certifications,
    Education,
}
