use chrono::NaiveDate;

use crate::{
    data_types::garmin::{BodyComposition, GarminActivity},
    errors::Result,
};

pub mod api;
pub mod auth;

/// The slice of a fitness-tracking account the collector reads.
pub trait FitnessAccount {
    fn login(&mut self) -> Result<()>;

    /// Most recent activities first.
    fn recent_activities(&mut self, count: usize) -> Result<Vec<GarminActivity>>;

    fn body_composition(&mut self, start: NaiveDate, end: NaiveDate) -> Result<BodyComposition>;
}
