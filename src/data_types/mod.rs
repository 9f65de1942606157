pub mod garmin;
pub mod goals;
pub mod record;
