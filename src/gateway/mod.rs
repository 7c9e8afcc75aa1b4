mod builder;
mod gateway;
pub use builder::*;
pub use gateway::*;
