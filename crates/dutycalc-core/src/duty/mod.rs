pub mod compare;
pub mod engine;
pub mod fees;
pub mod outcome;

pub use compare::{compare_reciprocal_toggles, ToggleComparison};
pub use engine::{calculate_duty, DutyOptions, DutyRequest};
pub use outcome::{DutyCalculationResult, DutyComponent, FeeLine, Fees};
