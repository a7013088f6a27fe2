//! Position indicator on any embedded-hal 1.0 PWM channel.
//!
//! The 0..=255 indicator level is mapped onto the channel's own duty
//! resolution with [`SetDutyCycle::set_duty_cycle_fraction`], so an LED on
//! an 8-bit timer and one on a 14-bit LEDC timer look the same.
//!
//! # Example
//!
//! ```ignore
//! use closure_emulator::hal::PwmIndicator;
//!
//! let channel = LedcDriver::new(peripherals.ledc.channel0, &timer, peripherals.pins.gpio8)?;
//! let indicator = PwmIndicator::new(channel);
//! ```

use embedded_hal::pwm::SetDutyCycle;

use crate::emulator::INDICATOR_MAX;
use crate::traits::PositionIndicator;

/// Indicator driving a PWM duty cycle.
pub struct PwmIndicator<P: SetDutyCycle> {
    channel: P,
    level: u8,
}

impl<P: SetDutyCycle> PwmIndicator<P> {
    /// Wrap a PWM channel. The output is left untouched until the first write.
    pub fn new(channel: P) -> Self {
        Self { channel, level: 0 }
    }

    /// Last level written successfully.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Release the channel.
    pub fn into_inner(self) -> P {
        self.channel
    }
}

impl<P: SetDutyCycle> PositionIndicator for PwmIndicator<P> {
    type Error = P::Error;

    fn set_level(&mut self, level: u8) -> Result<(), Self::Error> {
        self.channel
            .set_duty_cycle_fraction(u16::from(level), u16::from(INDICATOR_MAX))?;
        self.level = level;
        Ok(())
    }
}
