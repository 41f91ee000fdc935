pub mod clock;
pub mod error;
pub mod gesture;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TransitionError;
pub use gesture::GestureDetector;
pub use transition::{TrackTransitionController, SKIP_LIMIT};
