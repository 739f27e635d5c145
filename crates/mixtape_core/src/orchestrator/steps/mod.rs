//! Pipeline step implementations.

pub mod assemble;
pub mod fetch;
pub mod parse;
pub mod trim;

pub use assemble::AssembleStep;
pub use fetch::FetchStep;
pub use parse::ParseSpecStep;
pub use trim::TrimStep;
