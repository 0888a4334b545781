pub mod clock;
pub mod session;

pub use clock::CountdownClock;
pub use session::{
    OfferSession, SessionConfig, SessionHandle, SessionOutcome, SessionSnapshot, SessionState,
};
