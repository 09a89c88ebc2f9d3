/// Primitive platform data types and NewType-patterns.
mod enums;
mod strings;
mod urls;

pub use enums::*;
pub use strings::*;
pub use urls::*;
