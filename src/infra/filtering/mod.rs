// Implementations of the filtering ports: storage backends and staff roles.

pub mod json_filter_store;
pub mod sqlite_event_store;
pub mod sqlite_filter_store;
pub mod staff_roles;

pub use json_filter_store::JsonFilterStore;
pub use sqlite_event_store::SqliteFilterEventStore;
pub use sqlite_filter_store::SqliteFilterStore;
pub use staff_roles::ConfiguredStaffRoles;
