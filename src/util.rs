//! Small helpers shared by the CLI binaries.

/// Parses an integer the way C's `strtoul(s, 0, 0)` does: a `0x`/`0X` prefix
/// selects base 16, a bare leading `0` selects base 8, anything else is
/// base 10. Grounded on `original_source/Tools/ROMFS/build_romfs.cpp`'s
/// `main` (`base = strtoul(argv[1], 0, 0)`), which lets a ROM base address
/// be written as `0x8000`, `040000`, or `32768` interchangeably.
pub fn parse_int_c_style(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(rest, 16).ok();
    }
    if s.len() > 1 && s.starts_with('0') {
        return u32::from_str_radix(&s[1..], 8).ok();
    }
    s.parse::<u32>().ok()
}
