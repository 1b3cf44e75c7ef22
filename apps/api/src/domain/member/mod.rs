// Membership domain module
// A membership links one user to one team and records its scheme slots

#![allow(clippy::module_inception)]

pub mod member;
pub mod value_objects;

pub use member::TeamMember;
pub use value_objects::SchemeRoleFlags;
