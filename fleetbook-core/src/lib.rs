pub mod booking;
pub mod car;
pub mod tenant;
pub mod user;

pub use booking::{Booking, BookingError, BookingStatus, DateRange};
pub use car::Car;
pub use tenant::{Tenant, TenantMembership, TenantRole};
pub use user::User;
