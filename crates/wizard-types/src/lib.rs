pub mod events;
pub mod intent;
pub mod solver;
pub mod wizard;

pub use events::*;
pub use intent::*;
pub use solver::*;
pub use wizard::*;
