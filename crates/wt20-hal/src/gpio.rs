// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fmt;

/// Logic level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PinLevel {
    #[default]
    Low,
    High,
}

impl PinLevel {
    /// The opposite level
    pub fn toggled(self) -> Self {
        match self {
            PinLevel::Low => PinLevel::High,
            PinLevel::High => PinLevel::Low,
        }
    }

    pub fn is_high(self) -> bool {
        self == PinLevel::High
    }
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinLevel::Low => f.write_str("low"),
            PinLevel::High => f.write_str("high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// GPIO errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PinError {
    /// Pin written before `configure_output`
    #[error("GPIO{0} is not configured as an output")]
    NotConfigured(u32),

    /// Pin is not driven by this output
    #[error("GPIO{0} is not handled by this output")]
    UnknownPin(u32),

    #[error("GPIO hardware error: {0}")]
    Hardware(String),
}

/// Digital output abstraction for embedded platforms
pub trait DigitalOutput {
    /// Put `pin` in push-pull output mode, driven low
    fn configure_output(&mut self, pin: u32) -> Result<(), PinError>;

    /// Drive `pin` to `level`
    fn set_level(&mut self, pin: u32, level: PinLevel) -> Result<(), PinError>;

    /// Level last driven on `pin`
    fn level(&self, pin: u32) -> Result<PinLevel, PinError>;

    /// Flip `pin`, returning the new level
    fn toggle(&mut self, pin: u32) -> Result<PinLevel, PinError> {
        let next = self.level(pin)?.toggled();
        self.set_level(pin, next)?;
        Ok(next)
    }
}

#[derive(Debug, Clone)]
struct PinRecord {
    direction: PinDirection,
    level: PinLevel,
    history: Vec<PinLevel>,
}

/// In-memory pin bank for hosts and tests
///
/// Records every level written to each pin.
#[derive(Debug, Clone, Default)]
pub struct MemoryPins {
    pins: HashMap<u32, PinRecord>,
}

impl MemoryPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self, pin: u32) -> Option<PinDirection> {
        self.pins.get(&pin).map(|record| record.direction)
    }

    /// Levels written to `pin`, oldest first
    pub fn history(&self, pin: u32) -> &[PinLevel] {
        self.pins
            .get(&pin)
            .map(|record| record.history.as_slice())
            .unwrap_or(&[])
    }

    fn output(&mut self, pin: u32) -> Result<&mut PinRecord, PinError> {
        match self.pins.get_mut(&pin) {
            Some(record) if record.direction == PinDirection::Output => Ok(record),
            _ => Err(PinError::NotConfigured(pin)),
        }
    }
}

impl DigitalOutput for MemoryPins {
    fn configure_output(&mut self, pin: u32) -> Result<(), PinError> {
        self.pins.insert(
            pin,
            PinRecord {
                direction: PinDirection::Output,
                level: PinLevel::Low,
                history: Vec::new(),
            },
        );
        Ok(())
    }

    fn set_level(&mut self, pin: u32, level: PinLevel) -> Result<(), PinError> {
        let record = self.output(pin)?;
        record.level = level;
        record.history.push(level);
        Ok(())
    }

    fn level(&self, pin: u32) -> Result<PinLevel, PinError> {
        match self.pins.get(&pin) {
            Some(record) if record.direction == PinDirection::Output => Ok(record.level),
            _ => Err(PinError::NotConfigured(pin)),
        }
    }
}

/// Any embedded-hal 1.0 output pin as a [`DigitalOutput`]
///
/// The driven level is tracked here, so `level` does not need a stateful pin.
#[cfg(feature = "embedded")]
pub struct EmbeddedOutput<P> {
    number: u32,
    pin: P,
    level: PinLevel,
    configured: bool,
}

#[cfg(feature = "embedded")]
impl<P: embedded_hal::digital::OutputPin> EmbeddedOutput<P> {
    pub fn new(number: u32, pin: P) -> Self {
        Self {
            number,
            pin,
            level: PinLevel::Low,
            configured: false,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn check(&self, pin: u32) -> Result<(), PinError> {
        if pin != self.number {
            Err(PinError::UnknownPin(pin))
        } else if !self.configured {
            Err(PinError::NotConfigured(pin))
        } else {
            Ok(())
        }
    }

    fn drive(&mut self, level: PinLevel) -> Result<(), PinError> {
        use embedded_hal::digital::Error;

        let result = match level {
            PinLevel::High => self.pin.set_high(),
            PinLevel::Low => self.pin.set_low(),
        };
        result.map_err(|e| PinError::Hardware(format!("{:?}", e.kind())))?;
        self.level = level;
        Ok(())
    }
}

#[cfg(feature = "embedded")]
impl<P: embedded_hal::digital::OutputPin> DigitalOutput for EmbeddedOutput<P> {
    fn configure_output(&mut self, pin: u32) -> Result<(), PinError> {
        if pin != self.number {
            return Err(PinError::UnknownPin(pin));
        }
        self.configured = true;
        self.drive(PinLevel::Low)
    }

    fn set_level(&mut self, pin: u32, level: PinLevel) -> Result<(), PinError> {
        self.check(pin)?;
        self.drive(level)
    }

    fn level(&self, pin: u32) -> Result<PinLevel, PinError> {
        self.check(pin)?;
        Ok(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_toggled() {
        assert_eq!(PinLevel::Low.toggled(), PinLevel::High);
        assert_eq!(PinLevel::High.toggled(), PinLevel::Low);
        assert_eq!(PinLevel::from(true), PinLevel::High);
    }

    #[test]
    fn test_memory_pins_require_configuration() {
        let mut pins = MemoryPins::new();
        assert_eq!(pins.set_level(2, PinLevel::High), Err(PinError::NotConfigured(2)));
        assert_eq!(pins.level(2), Err(PinError::NotConfigured(2)));

        pins.configure_output(2).unwrap();
        assert_eq!(pins.direction(2), Some(PinDirection::Output));
        assert_eq!(pins.level(2), Ok(PinLevel::Low));
    }

    #[test]
    fn test_memory_pins_toggle_history() {
        let mut pins = MemoryPins::new();
        pins.configure_output(2).unwrap();

        assert_eq!(pins.toggle(2), Ok(PinLevel::High));
        assert_eq!(pins.toggle(2), Ok(PinLevel::Low));
        assert_eq!(pins.toggle(2), Ok(PinLevel::High));
        assert_eq!(
            pins.history(2),
            &[PinLevel::High, PinLevel::Low, PinLevel::High]
        );
        assert!(pins.history(5).is_empty());
    }

    #[cfg(feature = "embedded")]
    mod embedded {
        use super::super::*;
        use std::convert::Infallible;

        #[derive(Default)]
        struct FakePin {
            high: bool,
            writes: usize,
        }

        impl embedded_hal::digital::ErrorType for FakePin {
            type Error = Infallible;
        }

        impl embedded_hal::digital::OutputPin for FakePin {
            fn set_low(&mut self) -> Result<(), Self::Error> {
                self.high = false;
                self.writes += 1;
                Ok(())
            }

            fn set_high(&mut self) -> Result<(), Self::Error> {
                self.high = true;
                self.writes += 1;
                Ok(())
            }
        }

        #[test]
        fn test_embedded_output_tracks_level() {
            let mut led = EmbeddedOutput::new(2, FakePin::default());
            assert_eq!(led.set_level(2, PinLevel::High), Err(PinError::NotConfigured(2)));
            assert_eq!(led.configure_output(4), Err(PinError::UnknownPin(4)));

            led.configure_output(2).unwrap();
            assert_eq!(led.toggle(2), Ok(PinLevel::High));
            assert!(led.pin.high);
            assert_eq!(led.pin.writes, 2);
        }
    }
}
