/// Number of stack or local slots a value occupies
pub trait Width {
    fn width(&self) -> usize;
}

/// Encode a string as UTF-16 code units, which is how the JVM indexes into strings
pub fn utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}
