pub mod batch;
pub mod gf;
pub mod keystream;
pub mod round;
pub mod schedule;
pub mod selectors;
pub mod state;
pub mod xof;

pub use batch::*;
pub use gf::*;
pub use keystream::*;
pub use round::*;
pub use schedule::*;
pub use selectors::*;
pub use state::*;
pub use xof::*;
