use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitset describing a calendar event, with the bit values used by the
/// hebcal family of libraries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventFlags(u32);

impl EventFlags {
    pub const CHAG: Self = Self(0x0000_0001);
    pub const LIGHT_CANDLES: Self = Self(0x0000_0002);
    pub const YOM_TOV_ENDS: Self = Self(0x0000_0004);
    pub const CHUL_ONLY: Self = Self(0x0000_0008);
    pub const IL_ONLY: Self = Self(0x0000_0010);
    pub const LIGHT_CANDLES_TZEIS: Self = Self(0x0000_0020);
    pub const CHANUKAH_CANDLES: Self = Self(0x0000_0040);
    pub const ROSH_CHODESH: Self = Self(0x0000_0080);
    pub const MINOR_FAST: Self = Self(0x0000_0100);
    pub const SPECIAL_SHABBAT: Self = Self(0x0000_0200);
    pub const OMER_COUNT: Self = Self(0x0000_1000);
    pub const MODERN_HOLIDAY: Self = Self(0x0000_2000);
    pub const MAJOR_FAST: Self = Self(0x0000_4000);
    pub const SHABBAT_MEVARCHIM: Self = Self(0x0000_8000);
    pub const MINOR_HOLIDAY: Self = Self(0x0008_0000);
    pub const EREV: Self = Self(0x0010_0000);
    pub const CHOL_HAMOED: Self = Self(0x0020_0000);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// True when any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for EventFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EventFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventFlags({:#x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_and_intersects() {
        let flags = EventFlags::CHAG | EventFlags::MAJOR_FAST;
        assert!(flags.contains(EventFlags::CHAG));
        assert!(flags.contains(EventFlags::CHAG | EventFlags::MAJOR_FAST));
        assert!(!flags.contains(EventFlags::CHAG | EventFlags::EREV));
        assert!(flags.intersects(EventFlags::EREV | EventFlags::MAJOR_FAST));
        assert!(!flags.contains(EventFlags::empty()));
    }
}
