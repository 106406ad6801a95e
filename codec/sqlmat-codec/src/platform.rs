///
/// Origin platform of typed BLOBs.
///
/// Each typed BLOB records the platform name and byte order of the process
/// that wrote it. Readers compare it with their own to flag foreign blobs;
/// payloads are never converted.
///
/// Names follow the host environment's architecture strings (PCWIN64,
/// GLNXA64, MACI64, ...). Unknown targets fall back to `os-arch`, cut to
/// the 10 bytes the header has room for.
///

use std::fmt;

/// Longest platform name the header can store (one byte is the terminator).
pub const PLATFORM_NAME_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    pub const fn flag(self) -> u8 {
        match self {
            Endian::Little => b'L',
            Endian::Big => b'B',
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            b'L' => Some(Endian::Little),
            b'B' => Some(Endian::Big),
            _ => None,
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Little => f.write_str("little endian"),
            Endian::Big => f.write_str("big endian"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    name: String,
    endian: Endian,
}

impl Platform {
    /// Platform names longer than the header field are cut to fit.
    pub fn new(name: &str, endian: Endian) -> Self {
        Self {
            name: truncate_name(name),
            endian,
        }
    }

    pub fn current() -> Self {
        Self::new(&host_platform_name(), Endian::native())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.endian)
    }
}

fn host_platform_name() -> String {
    let name = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "x86_64") | ("windows", "aarch64") => "PCWIN64",
        ("windows", _) => "PCWIN",
        ("linux", "x86_64") => "GLNXA64",
        ("linux", "x86") => "GLNX86",
        ("macos", "x86_64") => "MACI64",
        ("macos", "aarch64") => "MACA64",
        ("macos", _) => "MACI",
        ("solaris", _) => "SOL64",
        (os, arch) => return format!("{}-{}", os, arch),
    };
    name.to_string()
}

fn truncate_name(name: &str) -> String {
    let mut end = name.len().min(PLATFORM_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endian_flags() {
        assert_eq!(Endian::Little.flag(), b'L');
        assert_eq!(Endian::Big.flag(), b'B');
        assert_eq!(Endian::from_flag(b'L'), Some(Endian::Little));
        assert_eq!(Endian::from_flag(b'B'), Some(Endian::Big));
        assert_eq!(Endian::from_flag(b'X'), None);
    }

    #[test]
    fn test_native_endian_matches_target() {
        let expected = if cfg!(target_endian = "little") {
            Endian::Little
        } else {
            Endian::Big
        };
        assert_eq!(Endian::native(), expected);
    }

    #[test]
    fn test_current_platform_fits_header() {
        let platform = Platform::current();
        assert!(!platform.name().is_empty());
        assert!(platform.name().len() <= PLATFORM_NAME_LEN);
        assert_eq!(platform.endian(), Endian::native());
    }

    #[test]
    fn test_long_names_are_truncated() {
        let platform = Platform::new("freebsd-riscv64", Endian::Little);
        assert_eq!(platform.name(), "freebsd-ri");
    }

    #[test]
    fn test_display() {
        let platform = Platform::new("GLNXA64", Endian::Little);
        assert_eq!(platform.to_string(), "GLNXA64, little endian");
    }
}
