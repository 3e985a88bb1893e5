//! License banner prepended to JavaScript outputs when enabled.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

use crate::manifest::PackageManifest;

/// Banner stamped with the current local time.
pub fn license_header(pkg: &PackageManifest) -> String {
    license_header_at(pkg, &Local::now())
}

/// `/*! ... */` comment listing version, license, author and build date.
///
/// Missing manifest fields are left out; the date line is always present.
/// The `!` keeps minifiers from stripping the comment.
pub fn license_header_at<Tz>(pkg: &PackageManifest, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut parts = Vec::new();

    if let Some(version) = &pkg.version {
        parts.push(format!("Version: {version}"));
    }
    if let Some(license) = &pkg.license {
        parts.push(format!("License: {license}"));
    }
    if let Some(author) = &pkg.author {
        parts.push(format!("Author: {author}"));
    }
    parts.push(format!("Date: {}", at.format("%Y-%m-%d %H:%M:%S")));

    format!("/*!\n * {}\n */\n", parts.join("\n * "))
}
