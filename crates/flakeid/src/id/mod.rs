mod flake;
mod layout;
#[cfg(test)]
mod tests;

pub use flake::*;
pub use layout::*;
