// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command tags carried in byte 0 of every WT20 frame
//!
//! | Tag | Command | Payload |
//! |-----|---------|---------|
//! | 0x00 | ToggleLed | ignored |
//! | 0x01 | SendPayload | opaque bytes |
//! | other | None | reserved, ignored by receivers |

use std::fmt;

/// Action a message requests from the receiving device
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Flip the receiver's LED
    ToggleLed = 0x00,
    /// Deliver the payload to the receiver's application
    SendPayload = 0x01,
    /// No action; every unrecognized tag decodes to this
    None = 0x02,
}

impl Command {
    /// Wire tag
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::ToggleLed => "toggle_led",
            Command::SendPayload => "send_payload",
            Command::None => "none",
        }
    }
}

impl From<u8> for Command {
    /// Unknown tags map to [`Command::None`] so newer senders never break older receivers
    fn from(tag: u8) -> Self {
        match tag {
            0x00 => Command::ToggleLed,
            0x01 => Command::SendPayload,
            _ => Command::None,
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.tag()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(Command::from(0), Command::ToggleLed);
        assert_eq!(Command::from(1), Command::SendPayload);
        assert_eq!(Command::ToggleLed.tag(), 0);
        assert_eq!(u8::from(Command::SendPayload), 1);
    }

    #[test]
    fn test_unknown_tags_are_none() {
        for tag in 2..=u8::MAX {
            assert_eq!(Command::from(tag), Command::None);
        }
    }
}
