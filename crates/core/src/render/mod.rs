//! Pure presentation of analysis results.
//!
//! Nothing here holds state between calls: rendering the same input twice
//! yields the same output.

pub mod fields;
pub mod transcript;

pub use fields::*;
pub use transcript::*;
