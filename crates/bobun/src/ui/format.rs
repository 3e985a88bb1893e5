//! Size and timing suffixes for build status lines.

use std::time::Duration;

/// Output size with decimal units, e.g. `812 B` or `14.2 kB`.
///
/// ```
/// use bobun::ui::format_size;
///
/// assert_eq!(format_size(812), "812 B");
/// assert_eq!(format_size(14_200), "14.2 kB");
/// ```
pub fn format_size(bytes: u64) -> String {
    match bytes {
        0..1_000 => format!("{bytes} B"),
        1_000..1_000_000 => format!("{:.1} kB", bytes as f64 / 1e3),
        _ => format!("{:.1} MB", bytes as f64 / 1e6),
    }
}

/// Build time the way `pretty-ms` prints it: `84ms`, `1.3s`, `2m 5s`.
///
/// ```
/// use std::time::Duration;
/// use bobun::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(84)), "84ms");
/// assert_eq!(format_duration(Duration::from_millis(1337)), "1.3s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1_000 {
        return format!("{ms}ms");
    }

    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
