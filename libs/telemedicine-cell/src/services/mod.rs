// libs/telemedicine-cell/src/services/mod.rs

pub mod appointments;
pub mod directory;
pub mod lifecycle;
pub mod rooms;
pub mod store;

pub use appointments::AppointmentRegistry;
pub use directory::PractitionerDirectory;
pub use lifecycle::SessionLifecycleService;
pub use rooms::RoomProviderClient;
pub use store::SessionStore;
