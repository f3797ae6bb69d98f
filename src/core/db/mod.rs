/// Database Module
///
/// ## Architecture
///
/// The database layer is split into three concerns:
/// - **Driver seam** (`driver.rs`): the traits a database client implements
/// - **SQLite driver** (`sqlite.rs`): the bundled rusqlite-backed client
/// - **Connection wrapper** (`connection.rs`): error policy and benchmarking
///   around one owned driver connection
pub mod connection;
pub mod driver;
pub mod sqlite;

pub use connection::*;
pub use driver::*;
pub use sqlite::*;
