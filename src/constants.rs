pub const DEFAULT_SEPARATOR: &str = ".";

pub const DEFAULT_SHORT_PATH_LIMIT: usize = 64;

/// Leading byte of a path segment that addresses an attribute child.
pub const ATTRIBUTE_MARKER: u8 = b'@';

#[inline]
pub fn is_bracket(byte: u8) -> bool {
    matches!(byte, b'[' | b']')
}

#[inline]
pub fn is_attribute_key(key: &str) -> bool {
    key.as_bytes().first() == Some(&ATTRIBUTE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_is_bracket() {
        assert!(is_bracket(b'['));
        assert!(is_bracket(b']'));
        assert!(!is_bracket(b'.'));
        assert!(!is_bracket(b'@'));
    }

    #[rstest::rstest]
    fn test_is_attribute_key() {
        assert!(is_attribute_key("@id"));
        assert!(is_attribute_key("@"));
        assert!(!is_attribute_key("id"));
        assert!(!is_attribute_key(""));
    }
}
