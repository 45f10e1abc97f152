//! Services: the operations the boundary layer invokes.
//!
//! Each service owns an explicit handle to a [`NoteStore`](crate::store::NoteStore)
//! and is cheap to construct per request. Services load the target, run the
//! ownership guard, apply the change and return a view; they never know who
//! is on the other side of the wire.

mod checklist;
mod notes;
mod sharing;
mod users;

pub use checklist::ChecklistService;
pub use notes::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, NoteFilter, NoteService};
pub use sharing::SharingService;
pub use users::UserService;
