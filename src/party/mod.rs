pub mod lifecycle;
pub mod notifier;
pub mod record;
pub mod registry;

pub use lifecycle::{CancelReport, CompletionReport, CreateParty};
pub use notifier::{DepartureNotifier, ReminderWindow};
pub use record::{LocationRef, PartyLimits, PartyRecord, PartyStatus};
pub use registry::{PartyRegistry, SharedRegistry};
