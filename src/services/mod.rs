//! Presentation-side logic layered over resolver and catalog output

pub mod plans;
pub mod ranking;

pub use plans::{assign_tiers, PlanSummary, PlanTiers, ValueRange};
pub use ranking::rank_by_technology;
