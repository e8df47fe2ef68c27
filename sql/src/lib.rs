//! Textual backend: compiles a query into query text plus a map of named
//! parameters, and runs it through a [`SqlSession`].

pub mod compiler;
pub mod fragment;
pub mod params;
pub mod session;
pub mod statement;

pub use compiler::{SqlCompiler, compile};
pub use fragment::{SQL, SQLChunk, Token};
pub use params::{Param, PlaceholderStyle, param_name};
pub use session::{SqlBackend, SqlSession};
pub use statement::Statement;
