// Export components
pub mod room_calendar;

// Re-export the room calendar handle
pub use room_calendar::RoomCalendarHandle;
