//! Calendar collaborators.
//!
//! The scheduler talks to the outside world only through
//! [`CalendarProvider`]: once to fetch busy time, then once per placed
//! segment to create an event.

pub mod google;
pub mod memory;
pub mod traits;

pub use google::GoogleCalendar;
pub use memory::{CreatedEvent, MemoryCalendar};
pub use traits::CalendarProvider;
