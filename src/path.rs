//! File names in the operating system's native path encoding.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// A file path held in the platform's native encoding.
///
/// A `PlatformPath` is an owned value, immutable once constructed, and never
/// contains an embedded NUL character when built from user-supplied text.
/// Conversion to the narrow or wide form the OS APIs expect happens at the
/// system-call boundary, so the rest of the crate can treat paths as opaque
/// values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformPath {
    path: PathBuf,
}

impl PlatformPath {
    /// Construct a `PlatformPath` from UTF-8 text.
    ///
    /// Fails with [`Error::Invalid`] if `text` contains an embedded NUL
    /// character, which no OS filesystem API accepts.
    pub fn from_text(text: &str) -> Result<Self> {
        validate_segment(text)?;
        Ok(Self {
            path: PathBuf::from(text),
        })
    }

    /// Construct a `PlatformPath` from a path already in native form, such
    /// as one produced by the OS itself.
    pub fn from_native<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Append `child` to this path, producing a new path.
    ///
    /// The child segment is validated the same way as [`from_text`]. The
    /// platform's separator convention is respected; the result is not
    /// checked for existence and `.`/`..` segments are not normalized.
    ///
    /// [`from_text`]: Self::from_text
    pub fn join(&self, child: &str) -> Result<Self> {
        validate_segment(child)?;
        Ok(Self {
            path: self.path.join(child),
        })
    }

    /// Best-effort conversion back to UTF-8 text.
    ///
    /// This is lossless: if the native bytes do not form valid UTF-8 (which
    /// can happen for names handed to us by the OS, e.g. unpaired surrogates
    /// on Windows), this fails with [`Error::Invalid`] rather than silently
    /// substituting replacement characters.
    pub fn to_text(&self) -> Result<&str> {
        self.path
            .to_str()
            .ok_or_else(|| Error::Invalid(format!("Unrepresentable filename: {:?}", self.path)))
    }

    /// Borrow the native representation.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// The native path, NUL-terminated and widened, for Win32 calls.
    #[cfg(windows)]
    pub(crate) fn to_wide(&self) -> Vec<u16> {
        use std::os::windows::ffi::OsStrExt;
        self.path
            .as_os_str()
            .encode_wide()
            .chain(Some(0))
            .collect()
    }
}

impl fmt::Display for PlatformPath {
    /// Render the path for error messages.
    ///
    /// Unrepresentable names are rendered as a visible marker instead of a
    /// corrupted string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path.to_str() {
            Some(s) => f.write_str(s),
            None => write!(f, "<Unrepresentable filename: {:?}>", self.path),
        }
    }
}

impl AsRef<Path> for PlatformPath {
    #[inline]
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

fn validate_segment(text: &str) -> Result<()> {
    if text.contains('\0') {
        return Err(Error::Invalid(format!(
            "Embedded NUL char in file name: '{}'",
            text.replace('\0', "\\0")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::MAIN_SEPARATOR;

    #[test]
    fn round_trip() {
        for s in ["a", "a/b", "some file.txt", "héllo/wörld"] {
            let path = PlatformPath::from_text(s).unwrap();
            assert_eq!(path.to_text().unwrap(), s);
            assert_eq!(path.to_string(), s);
        }
    }

    #[test]
    fn embedded_nul_rejected() {
        assert!(matches!(
            PlatformPath::from_text("a\0b"),
            Err(Error::Invalid(_))
        ));
        let base = PlatformPath::from_text("dir").unwrap();
        assert!(matches!(base.join("a\0b"), Err(Error::Invalid(_))));
    }

    #[cfg(unix)]
    #[test]
    fn unrepresentable_native_name_fails_to_text_but_still_displays() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        // 0xff can't begin a UTF-8 sequence, but it's a legal filename byte.
        let path = PlatformPath::from_native(OsString::from_vec(vec![0x66, 0x6f, 0xff]));
        assert!(matches!(path.to_text(), Err(Error::Invalid(_))));
        assert!(path.to_string().contains("Unrepresentable filename"));
    }

    #[test]
    fn join_appends_with_native_separator() {
        let base = PlatformPath::from_text("dir").unwrap();
        let joined = base.join("child").unwrap();
        assert_eq!(
            joined.to_text().unwrap(),
            format!("dir{}child", MAIN_SEPARATOR)
        );
    }

    #[test]
    fn join_does_not_normalize() {
        let base = PlatformPath::from_text("dir").unwrap();
        let joined = base.join("..").unwrap();
        assert_eq!(
            joined.to_text().unwrap(),
            format!("dir{}..", MAIN_SEPARATOR)
        );
    }
}
