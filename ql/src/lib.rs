pub mod learn;
pub mod prelude;
pub mod util;
