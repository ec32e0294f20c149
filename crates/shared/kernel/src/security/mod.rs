mod guard;

pub use guard::{GuardError, GuardErrorExt, PayloadGuard, excerpt};
