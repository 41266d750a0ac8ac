pub mod tokens;
pub use tokens::*;

pub mod disas;
pub mod info;
pub use info::*;

pub mod io;
pub use io::SmaliWrite;
