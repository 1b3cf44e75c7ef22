// Application services
// Orchestrate repositories and enforce the membership invariants

pub mod events;
pub mod scheme_resolver;
pub mod team_service;

pub use events::{BroadcastEventSink, TeamEventSink, TracingEventSink};
pub use scheme_resolver::SchemeResolver;
pub use team_service::{TeamJoin, TeamService, TeamStores, UpdateOptions};
