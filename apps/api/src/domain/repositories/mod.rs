// Repository ports
// Traits the domain depends on; adapters live in infrastructure::repositories

pub mod member_repository;
pub mod role_repository;
pub mod scheme_repository;
pub mod team_repository;
pub mod user_repository;

pub use member_repository::{MemberRepository, SeatReservation};
pub use role_repository::RoleRepository;
pub use scheme_repository::SchemeRepository;
pub use team_repository::TeamRepository;
pub use user_repository::{User, UserRepository};
