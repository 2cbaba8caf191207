//! Small helpers shared across runtime modules.

mod clock;

pub use clock::now;
