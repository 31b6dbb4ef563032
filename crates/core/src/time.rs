/// Q32.32 fixed-point time duration in microseconds.
///
/// Storage: `u64` with 32 integer bits + 32 fractional bits.
/// Base unit: microseconds (1 second = 1,000,000 us).
/// Range: 0 to ~4294 seconds with sub-microsecond precision.
///
/// With the `serde` feature, durations are written as (fractional) seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Micros(u64);

impl Micros {
    const FRAC_BITS: u32 = 32;
    const MICROS_PER_SEC: u64 = 1_000_000;

    pub const ZERO: Micros = Micros(0);
    /// Longest representable duration, just under 4295 seconds.
    pub const MAX: Micros = Micros(u64::MAX);

    /// Create from whole seconds.
    pub const fn from_secs(secs: u32) -> Self {
        Self((secs as u64 * Self::MICROS_PER_SEC) << Self::FRAC_BITS)
    }

    /// Create from whole milliseconds.
    pub const fn from_millis(millis: u32) -> Self {
        Self((millis as u64 * 1_000) << Self::FRAC_BITS)
    }

    /// Create from whole microseconds.
    pub const fn from_micros(micros: u32) -> Self {
        Self((micros as u64) << Self::FRAC_BITS)
    }

    /// Create from fractional seconds, rounded down to whole microseconds.
    /// Negative and non-finite inputs clamp to zero, durations past the
    /// range clamp to [`Micros::MAX`].
    pub fn from_secs_f32(secs: f32) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self::checked_from_secs_f32(secs).unwrap_or(Self::MAX)
    }

    /// Like [`Micros::from_secs_f32`], but `None` for negative, non-finite
    /// or out-of-range input.
    pub fn checked_from_secs_f32(secs: f32) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        let micros = (secs as f64 * Self::MICROS_PER_SEC as f64) as u64;
        if micros > u32::MAX as u64 {
            return None;
        }
        Some(Self(micros << Self::FRAC_BITS))
    }

    /// Convert to tick count at the given tick rate.
    ///
    /// Formula: ticks = (micros * tick_hz) / MICROS_PER_SEC
    /// This uses 128-bit intermediate to avoid overflow.
    pub const fn to_ticks(self, tick_hz: u32) -> u64 {
        let numer = self.0 as u128 * tick_hz as u128;
        let denom = Self::MICROS_PER_SEC << Self::FRAC_BITS;
        (numer / denom as u128) as u64
    }

    /// Duration of `ticks` ticks at `tick_hz`.
    pub const fn from_ticks(ticks: u64, tick_hz: u32) -> Self {
        let numer = (ticks as u128 * Self::MICROS_PER_SEC as u128) << Self::FRAC_BITS;
        Self((numer / tick_hz as u128) as u64)
    }

    pub fn as_secs_f32(self) -> f32 {
        ((self.0 >> Self::FRAC_BITS) as f64 / Self::MICROS_PER_SEC as f64) as f32
    }

    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Scale by a ratio, e.g. cooldown multipliers. Non-positive factors yield zero.
    pub fn scale(self, factor: f32) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return Self::ZERO;
        }
        Self((self.0 as f64 * factor as f64) as u64)
    }

    /// Returns the raw Q32.32 value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl core::ops::Add for Micros {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::Sub for Micros {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl core::ops::Mul<u32> for Micros {
    type Output = Self;
    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * rhs as u64)
    }
}

impl core::ops::Div<u32> for Micros {
    type Output = Self;
    fn div(self, rhs: u32) -> Self {
        Self(self.0 / rhs as u64)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Micros {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.as_secs_f32())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Micros {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = <f32 as serde::Deserialize>::deserialize(deserializer)?;
        if secs < 0.0 {
            return Err(serde::de::Error::custom("duration must not be negative"));
        }
        Micros::checked_from_secs_f32(secs).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "duration of {} s exceeds the supported {:.0} s",
                secs,
                Micros::MAX.as_secs_f32()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micros_from_secs() {
        let m = Micros::from_secs(1);
        assert_eq!(m.0, 1_000_000 << 32);
    }

    #[test]
    fn micros_to_ticks() {
        assert_eq!(Micros::from_secs(1).to_ticks(60), 60);
        assert_eq!(Micros::from_secs(60).to_ticks(60), 3600);
        assert_eq!(Micros::from_millis(500).to_ticks(60), 30);
        assert_eq!(Micros::from_millis(50).to_ticks(60), 3);
    }

    #[test]
    fn from_ticks_inverts_to_ticks() {
        let m = Micros::from_ticks(90, 60);
        assert_eq!(m.to_ticks(60), 90);
        assert!((m.as_secs_f32() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn fractional_seconds() {
        assert_eq!(Micros::from_secs_f32(0.25), Micros::from_millis(250));
        assert_eq!(Micros::from_secs_f32(-3.0), Micros::ZERO);
        assert_eq!(Micros::from_secs_f32(f32::NAN), Micros::ZERO);
    }

    #[test]
    fn long_durations_do_not_wrap() {
        assert_eq!(Micros::checked_from_secs_f32(5000.0), None);
        assert_eq!(Micros::from_secs_f32(5000.0), Micros::MAX);
        assert!(Micros::from_secs_f32(5000.0) > Micros::from_secs(4000));
        assert_eq!(
            Micros::checked_from_secs_f32(4000.0),
            Some(Micros::from_secs(4000))
        );
    }

    #[test]
    fn scale_and_saturating_sub() {
        let m = Micros::from_secs(2);
        assert_eq!(m.scale(0.5).to_ticks(60), 60);
        assert_eq!(m.scale(-1.0), Micros::ZERO);
        assert_eq!(Micros::from_secs(1).saturating_sub(m), Micros::ZERO);
    }

    #[test]
    fn micros_arithmetic() {
        let a = Micros::from_secs(5);
        let b = Micros::from_secs(3);

        assert_eq!((a + b).to_ticks(60), 480);
        assert_eq!((a - b).to_ticks(60), 120);
        assert_eq!((a * 2).to_ticks(60), 600);
        assert_eq!((a / 5).to_ticks(60), 60);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_seconds() {
        let m: Micros = serde_json::from_str("1.5").unwrap();
        assert_eq!(m, Micros::from_millis(1500));
        assert_eq!(serde_json::to_string(&Micros::from_secs(2)).unwrap(), "2.0");
        assert!(serde_json::from_str::<Micros>("-1").is_err());
        assert!(serde_json::from_str::<Micros>("5000").is_err());
    }
}
