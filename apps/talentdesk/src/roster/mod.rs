// Roster views: paged candidate lists with search, filters and in-place updates.
// Every backend call goes through api_client; ordering is enforced per view.

pub mod controller;
pub mod hub;
mod mutations;

pub use controller::{QueryOutcome, RosterConfig, RosterController, RosterSnapshot, UpdateEffect};
pub use hub::RosterHub;
