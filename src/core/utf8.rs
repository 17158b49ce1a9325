//! Offset helpers
//!
//! The engine works on UTF-8 byte offsets. Embedders that count in UTF-16
//! code units (browser text areas) convert at the boundary.

/// Clamp a byte offset to the text length and move it back to a char boundary
pub fn clamp_to_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Convert a UTF-16 code unit offset to a byte offset.
/// Offsets past the end map to `text.len()`; an offset in the middle of a
/// surrogate pair maps to the start of that char.
pub fn utf16_to_byte(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, c) in text.char_indices() {
        let next = units + c.len_utf16();
        if next > utf16_offset {
            return idx;
        }
        units = next;
    }
    text.len()
}

/// Convert a byte offset to a UTF-16 code unit offset
pub fn byte_to_utf16(text: &str, byte_offset: usize) -> usize {
    let end = clamp_to_boundary(text, byte_offset);
    text[..end].chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_to_boundary("abc", 10), 3);
        // 'é' is two bytes
        assert_eq!(clamp_to_boundary("é", 1), 0);
        assert_eq!(clamp_to_boundary("aé", 2), 1);
    }

    #[test]
    fn test_ascii_offsets_are_identical() {
        let text = "x^2 + y";
        for i in 0..=text.len() {
            assert_eq!(utf16_to_byte(text, i), i);
            assert_eq!(byte_to_utf16(text, i), i);
        }
    }

    #[test]
    fn test_multibyte_conversion() {
        // 'α' is 2 bytes / 1 unit, '𝔸' is 4 bytes / 2 units
        let text = "α𝔸b";
        assert_eq!(utf16_to_byte(text, 1), 2);
        assert_eq!(utf16_to_byte(text, 3), 6);
        assert_eq!(utf16_to_byte(text, 4), 7);
        assert_eq!(byte_to_utf16(text, 6), 3);
        assert_eq!(byte_to_utf16(text, 7), 4);
    }

    #[test]
    fn test_inside_surrogate_pair() {
        assert_eq!(utf16_to_byte("𝔸", 1), 0);
    }
}
