mod error;
pub use error::*;
mod requirement;
pub use requirement::{Operator, Requirement};
mod labels;
mod selector;
pub use labels::Labels;
pub use selector::Selector;
mod parse;
pub use parse::parse;

/// Construct a `Requirement` from literals, panicking on invalid keys or values
#[macro_export]
macro_rules! requirement {
    ($key:literal = $value:literal) => {
        $crate::Requirement::equals($key, $value).unwrap()
    };
    ($key:literal != $value:literal) => {
        $crate::Requirement::not_equals($key, $value).unwrap()
    };
    (!$key:literal) => {
        $crate::Requirement::does_not_exist($key).unwrap()
    };
    ($key:literal) => {
        $crate::Requirement::exists($key).unwrap()
    };
}
