//! Console input: definitions, argv binding and pass-through rebinding

pub mod argv;
pub mod definition;
pub mod rebind;

pub use argv::{ArgvInput, InputBindError};
pub use definition::{InputArgument, InputDefinition, InputOption, OptionValue, ValueMode};
pub use rebind::{rebind, GlobalOptionSnapshot};
