pub mod accounts;
pub mod currencies;
pub mod dashboard;
pub mod expenses;
pub mod future;
pub mod positions;
pub mod setup;
pub mod ui;
pub mod watch;
