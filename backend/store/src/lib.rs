pub mod sqlite;

pub use sqlite::{SpammerRow, SpammerSummary, SqliteSpamStore};
