pub mod chart;
pub mod dashboard;
pub mod inspect;

mod artifacts;
