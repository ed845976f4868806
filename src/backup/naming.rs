//! Backup file naming
//!
//! `<flattened path>_<YYYYMMDD-HHMMSS>_<8 hex>.bak`, where the flattened
//! path drops the leading `/` and turns the remaining `/` into `-`.

use chrono::{DateTime, TimeZone};
use rand::Rng;

/// Suffix of every backup file
pub const BACKUP_SUFFIX: &str = ".bak";

/// `/dcos-service-x/a/b` -> `dcos-service-x-a-b`
pub fn flatten_path(abs_path: &str) -> String {
    abs_path.trim_start_matches('/').replace('/', "-")
}

/// Backup file name for `abs_path` taken at `now`
pub fn backup_file_name<Tz, R>(abs_path: &str, now: &DateTime<Tz>, rng: &mut R) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    R: Rng + ?Sized,
{
    format!(
        "{}_{}_{:08x}{}",
        flatten_path(abs_path),
        now.format("%Y%m%d-%H%M%S"),
        rng.gen::<u32>(),
        BACKUP_SUFFIX
    )
}
