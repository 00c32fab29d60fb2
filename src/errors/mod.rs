pub mod turn_error;

pub use turn_error::{TurnError, TurnResult};
