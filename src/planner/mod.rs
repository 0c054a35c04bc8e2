pub mod daily;
pub mod filter;
pub mod plan;
pub mod preferences;
pub mod scoring;
pub mod slots;
pub mod tiebreak;
pub mod weekly;

pub use daily::{plan_day, DayContext, DayTally, PlannedDay, SlotOutcome};
pub use filter::filter_by_diet;
pub use plan::{DayPlan, Weekday, WeeklyPlan};
pub use preferences::{BudgetPeriod, DietaryPreference, PlanPreferences, PreferenceInput};
pub use slots::slot_template;
pub use tiebreak::{FirstTieBreak, RandomTieBreak, TieBreak};
pub use weekly::{assemble, generate};
