//! Domain types for the fare line search.
//!
//! These are the validated types the search controller works with. They are
//! independent of the wire format; `api` converts its DTOs into them.

mod city;
mod city_id;
mod filter;
mod line;
mod lookup;

pub use city::{City, County, State};
pub use city_id::{CityId, InvalidCityId};
pub use filter::{FilterKey, MatchKind};
pub use line::{LineRecord, Price, ResultPage};
pub use lookup::LookupArguments;
