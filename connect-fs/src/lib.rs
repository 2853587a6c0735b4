//! Filesystem helpers for InterestConnect tools, built on `cap-std` and
//! `camino`.
//!
//! Every helper starts from an ambient directory handle (the filesystem root,
//! a Windows drive prefix, or the current directory) and works relative to
//! it, so callers never hand absolute paths to capability-based APIs.

#![forbid(unsafe_code)]

use std::io::{self, Read};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Create every missing directory above `path`.
///
/// Paths without a parent, or whose parent is the root, need nothing.
///
/// # Errors
/// Returns the I/O error raised while opening the base directory or creating
/// the missing components.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    let (base, relative) = anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Read a whole UTF-8 text file.
///
/// # Errors
/// Returns the I/O error raised while opening or reading the file, including
/// invalid UTF-8.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = dir_and_name(path)?;
    let mut file = dir.open(&name)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Report whether `path` names an existing regular file.
///
/// Missing files and missing parent directories report `false`.
///
/// # Errors
/// Returns other I/O errors, such as permission failures.
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let outcome = dir_and_name(path).and_then(|(dir, name)| dir.metadata(&name));
    match outcome {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Open the directory containing `path` and return it with the file name.
fn dir_and_name(path: &Utf8Path) -> io::Result<(Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("{path} has no file name")))?
        .to_owned();
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let (base, relative) = anchor(parent)?;
    let dir = if relative.as_str().is_empty() {
        base
    } else {
        base.open_dir(&relative)?
    };
    Ok((dir, name))
}

/// Split `dir` into an ambient base handle and the path below it.
fn anchor(dir: &Utf8Path) -> io::Result<(Dir, Utf8PathBuf)> {
    let mut components = dir.components();
    let base = match components.next() {
        Some(Utf8Component::Prefix(prefix)) => {
            // A drive prefix is followed by its root separator.
            let mut base = Utf8PathBuf::from(prefix.as_str());
            if let Some(Utf8Component::RootDir) = components.clone().next() {
                components.next();
                base.push(std::path::MAIN_SEPARATOR_STR);
            }
            base
        }
        Some(Utf8Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR),
        _ => {
            components = dir.components();
            Utf8PathBuf::from(".")
        }
    };
    let relative: Utf8PathBuf = components.collect();
    let handle = Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((handle, relative))
}
