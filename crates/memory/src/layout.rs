//! Where memory and summary files live in the store.
//!
//! ```text
//! summary.md
//! memories/
//!   2024-05/
//!     2024-05-06_<session>.md
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::{ContentPath, SessionId};

/// Root directory of all memory files.
pub const MEMORIES_ROOT: &str = "memories";

/// Fixed path of the overview file.
pub const SUMMARY_FILE: &str = "summary.md";

const DAY_FORMAT: &str = "%Y-%m-%d";
/// Length of a `YYYY-MM-DD` day string.
const DAY_LEN: usize = 10;
const MONTH_FORMAT: &str = "%Y-%m";

/// The resolved location of one session's memory file for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTarget {
    /// Month directory, `memories/{YYYY-MM}`.
    pub dir: ContentPath,
    /// `{YYYY-MM-DD}_{session}.md`
    pub file_name: String,
    /// `dir` joined with `file_name`.
    pub path: ContentPath,
    /// `YYYY-MM-DD`, embedded in commit messages.
    pub day: String,
}

impl MemoryTarget {
    /// Computes the target for `session` on the UTC date of `now`.
    ///
    /// Returns `None` only if the session id cannot form a file name.
    pub fn at(now: DateTime<Utc>, session: &SessionId) -> Option<Self> {
        Self::on(now.date_naive(), session)
    }

    /// Computes the target for `session` on `date`.
    pub fn on(date: NaiveDate, session: &SessionId) -> Option<Self> {
        let day = date.format(DAY_FORMAT).to_string();
        let month = date.format(MONTH_FORMAT).to_string();
        let dir = ContentPath::new(format!("{MEMORIES_ROOT}/{month}"))?;
        let file_name = format!("{day}_{session}.md");
        let path = dir.join(&file_name)?;
        Some(Self {
            dir,
            file_name,
            path,
            day,
        })
    }

    /// Returns `true` if `name` is an older memory file of the same session,
    /// i.e. `{YYYY-MM-DD}_{session}.md` for a different date.
    pub fn is_superseded(&self, name: &str, session: &SessionId) -> bool {
        name != self.file_name && names_session_file(name, session)
    }
}

/// Returns `true` if `name` is `{YYYY-MM-DD}_{session}.md` for some date.
///
/// The date must be zero-padded, as [`MemoryTarget`] writes it. The date prefix is checked so that a session id which is a suffix of
/// another (`123` vs `session_123`) does not match the other's files.
pub fn names_session_file(name: &str, session: &SessionId) -> bool {
    let suffix = format!("_{session}.md");
    match name.strip_suffix(suffix.as_str()) {
        Some(prefix) => {
            prefix.len() == DAY_LEN && NaiveDate::parse_from_str(prefix, DAY_FORMAT).is_ok()
        }
        None => false,
    }
}

/// Path of the summary file.
pub fn summary_path() -> ContentPath {
    ContentPath::from_static(SUMMARY_FILE)
}
