//! HTU21 user register (8 bits): measurement resolution, battery status,
//! on-chip heater and OTP reload.
//!
//! # Bit layout
//!
//! ```text
//! Bit  7, 0 : Measurement resolution (see `Resolution`)
//! Bit  6    : End of battery (read-only, set when VDD < 2.25 V)
//! Bits 3-5  : Reserved, must be written back unchanged
//! Bit  2    : On-chip heater enable
//! Bit  1    : Disable OTP reload
//! ```
//!
//! Power-on value is `0x02`: 12-bit RH / 14-bit T, heater off, OTP reload
//! disabled.


const RESOLUTION_HIGH_BIT: u8 = 1 << 7;
const RESOLUTION_LOW_BIT: u8 = 1 << 0;
const END_OF_BATTERY_BIT: u8 = 1 << 6;
const RESERVED_MASK: u8 = 0b0011_1000;
const HEATER_BIT: u8 = 1 << 2;
const DISABLE_OTP_RELOAD_BIT: u8 = 1 << 1;

/// Measurement resolution pairs (humidity bits / temperature bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 12-bit RH, 14-bit T (default).
    Rh12T14,
    /// 8-bit RH, 12-bit T.
    Rh8T12,
    /// 10-bit RH, 13-bit T.
    Rh10T13,
    /// 11-bit RH, 11-bit T.
    Rh11T11,
}

impl Resolution {
    /// Bits 7 and 0 of the register for this resolution.
    const fn bits(self) -> u8 {
        match self {
            Resolution::Rh12T14 => 0,
            Resolution::Rh8T12 => RESOLUTION_LOW_BIT,
            Resolution::Rh10T13 => RESOLUTION_HIGH_BIT,
            Resolution::Rh11T11 => RESOLUTION_HIGH_BIT | RESOLUTION_LOW_BIT,
        }
    }

    const fn from_bits(raw: u8) -> Self {
        match (raw & RESOLUTION_HIGH_BIT != 0, raw & RESOLUTION_LOW_BIT != 0) {
            (false, false) => Resolution::Rh12T14,
            (false, true) => Resolution::Rh8T12,
            (true, false) => Resolution::Rh10T13,
            (true, true) => Resolution::Rh11T11,
        }
    }
}

/// Typed wrapper around the raw register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UserRegister(u8);

impl Default for UserRegister {
    fn default() -> Self {
        Self(DISABLE_OTP_RELOAD_BIT)
    }
}

impl UserRegister {
    /// Build from the raw byte.
    #[inline]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Underlying byte.
    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn resolution(&self) -> Resolution {
        Resolution::from_bits(self.0)
    }

    /// Supply voltage dropped below 2.25 V.
    #[inline]
    pub const fn end_of_battery(&self) -> bool {
        self.0 & END_OF_BATTERY_BIT != 0
    }

    #[inline]
    pub const fn heater_enabled(&self) -> bool {
        self.0 & HEATER_BIT != 0
    }

    #[inline]
    pub const fn otp_reload_disabled(&self) -> bool {
        self.0 & DISABLE_OTP_RELOAD_BIT != 0
    }

    /// Copy with a different resolution.
    #[inline]
    pub const fn with_resolution(self, resolution: Resolution) -> Self {
        Self((self.0 & !(RESOLUTION_HIGH_BIT | RESOLUTION_LOW_BIT)) | resolution.bits())
    }

    /// Copy with the heater switched on or off.
    #[inline]
    pub const fn with_heater(self, enabled: bool) -> Self {
        if enabled {
            Self(self.0 | HEATER_BIT)
        } else {
            Self(self.0 & !HEATER_BIT)
        }
    }

    /// Copy with OTP reload disabled or enabled.
    #[inline]
    pub const fn with_otp_reload_disabled(self, disabled: bool) -> Self {
        if disabled {
            Self(self.0 | DISABLE_OTP_RELOAD_BIT)
        } else {
            Self(self.0 & !DISABLE_OTP_RELOAD_BIT)
        }
    }

    /// Value to write: writable bits from `self`, reserved bits and the
    /// read-only battery flag from `current`.
    #[inline]
    pub const fn merge_reserved(self, current: UserRegister) -> Self {
        let keep = RESERVED_MASK | END_OF_BATTERY_BIT;
        Self((self.0 & !keep) | (current.0 & keep))
    }
}
