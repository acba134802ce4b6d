mod actor;
mod handle;
pub mod memory;
pub mod models;
pub mod provider;

pub use actor::{ReservationActor, ReservationActorHandle, ReservationCommand};
pub use handle::RoomCalendarHandle;
pub use memory::InMemoryCalendar;
pub use models::{CalendarEvent, ShowAs};
pub use provider::{CalendarProvider, ProviderResult};
