//! # LaserKit GRBL
//!
//! The GRBL laser driver: a stateful translator from job primitives to
//! the minimal G-code subset GRBL needs, orchestrated over the
//! acknowledged line protocol, with an emergency reset guard covering
//! every connection.

pub mod driver;
pub mod reset_guard;
pub mod translator;

pub use driver::GrblDriver;
pub use reset_guard::ResetGuard;
pub use translator::{Translator, TranslatorState};
