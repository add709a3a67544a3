//! Feature-gated logging.
//!
//! With the `tracing` feature the geometry code reports cache rebuilds and
//! rejected path data through `tracing`. Without it the macros below swallow
//! their arguments, so call sites never need their own `cfg`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __hitpath_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __hitpath_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{__hitpath_debug as debug, __hitpath_warn as warn};
