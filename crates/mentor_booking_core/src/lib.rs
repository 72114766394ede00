pub mod actions;
pub mod domain;
pub mod identity;
pub mod memory;
pub mod notice;
pub mod ports;
pub mod student;
pub mod teacher;
pub mod view;

pub use actions::{ActionError, ActionResult, BookingActions, Outcome, SlotForm};
pub use domain::{
    Booking, BookingStatus, Identity, NewBooking, NewSlot, NewSubject, NewTestimonial, NewUser,
    Role, Slot, SlotStatus, Subject, Testimonial, User,
};
pub use identity::{AuthState, IdentityResolver, Resolution};
pub use memory::MemoryStore;
pub use notice::{Notice, NoticeKind, NOTICE_DISMISS_AFTER};
pub use ports::{
    AuthError, BookingFilter, DatabaseService, IdentityProvider, PortError, PortResult,
    SlotFilter, SubjectFilter, TestimonialFilter,
};
pub use student::{SlotAction, SlotListing, StudentDashboard, StudentView};
pub use teacher::{TeacherDashboard, TeacherStats, TeacherView};
pub use view::{route, View};
