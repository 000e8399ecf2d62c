use std::fmt;

/// An 8-byte IEEE-754 double as stored in a record.
///
/// Legacy writers store NaNs with non-canonical payloads. `Xnum` keeps the raw bit pattern so a
/// record that decodes to NaN re-serializes byte-for-byte instead of as a canonical NaN.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Xnum {
    bits: u64,
}

impl Xnum {
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self::from_bits(u64::from_le_bytes(bytes))
    }

    pub fn new(value: f64) -> Self {
        Self::from_bits(value.to_bits())
    }

    pub const fn to_bits(self) -> u64 {
        self.bits
    }

    pub fn to_le_bytes(self) -> [u8; 8] {
        self.bits.to_le_bytes()
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.bits)
    }

    pub fn is_nan(self) -> bool {
        self.value().is_nan()
    }
}

impl From<f64> for Xnum {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Xnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            write!(f, "Xnum(NaN {:#018x})", self.bits)
        } else {
            write!(f, "Xnum({})", self.value())
        }
    }
}

impl fmt::Display for Xnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            write!(f, "NaN({:#018x})", self.bits)
        } else {
            write!(f, "{}", self.value())
        }
    }
}
