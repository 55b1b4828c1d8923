use core::fmt;

/// Byte significance convention for multi-byte values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// Most significant byte first. The default for byte buffers.
    #[default]
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// The byte order of the target platform.
    pub const fn native() -> Self {
        #[cfg(target_endian = "big")]
        {
            ByteOrder::BigEndian
        }
        #[cfg(target_endian = "little")]
        {
            ByteOrder::LittleEndian
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::BigEndian => write!(f, "BIG_ENDIAN"),
            ByteOrder::LittleEndian => write!(f, "LITTLE_ENDIAN"),
        }
    }
}
