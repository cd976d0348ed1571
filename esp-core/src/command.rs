//! Kommando-Typen: Bitstring-Record, Kanal-Maske und Validierungs-Fehler

use crate::types::{CHANNEL_COUNT, ChannelId};

/// Kommando wie es von einem Transport dekodiert wurde
///
/// Kurzlebig: wird sofort validiert und danach verworfen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord<'a> {
    /// Genau 10 Zeichen aus `{'0','1'}`, Index 0 = erster Kanal
    pub bits: &'a str,
    pub light1: bool,
    pub light2: bool,
}

impl<'a> CommandRecord<'a> {
    pub fn new(bits: &'a str, light1: bool, light2: bool) -> Self {
        Self {
            bits,
            light1,
            light2,
        }
    }

    /// Prüft den ganzen Record, liefert bei Erfolg ein ValidCommand
    pub fn validate(&self) -> Result<ValidCommand, CommandError> {
        Ok(ValidCommand {
            channels: ChannelMask::parse(self.bits)?,
            light1: self.light1,
            light2: self.light2,
        })
    }
}

/// Validiertes Kommando, kann zwischen Tasks verschickt werden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidCommand {
    pub channels: ChannelMask,
    pub light1: bool,
    pub light2: bool,
}

/// Fehler beim Anwenden eines Kommandos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Bitstring hat nicht genau CHANNEL_COUNT Zeichen
    WrongLength { len: usize },
    /// Zeichen an `index` ist weder '0' noch '1'
    InvalidCharacter { index: usize },
    /// Auto-Sequenz läuft, manuelle Kommandos sind gesperrt
    SequenceActive,
}

impl CommandError {
    /// HTTP-Statuscode für die Antwort des Transports
    pub const fn http_status(self) -> u16 {
        match self {
            CommandError::WrongLength { .. } | CommandError::InvalidCharacter { .. } => 400,
            CommandError::SequenceActive => 409,
        }
    }

    /// Kurze Fehlermeldung für Clients
    pub const fn message(self) -> &'static str {
        match self {
            CommandError::WrongLength { .. } => "Bitstring must be length 10",
            CommandError::InvalidCharacter { .. } => "Bitstring must contain only 0/1",
            CommandError::SequenceActive => "Mode=1, cannot accept setcmd",
        }
    }
}

/// Menge von Kanälen als Bitmaske (Bit i = Kanal i)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelMask(u16);

impl ChannelMask {
    const VALID_BITS: u16 = (1 << CHANNEL_COUNT) - 1;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::VALID_BITS)
    }

    /// Maske aus Rohbits, Bits oberhalb von CHANNEL_COUNT werden verworfen
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw & Self::VALID_BITS)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Parst einen Bitstring wie `"1000000001"`
    pub fn parse(bits: &str) -> Result<Self, CommandError> {
        let len = bits.chars().count();
        if len != CHANNEL_COUNT {
            return Err(CommandError::WrongLength { len });
        }

        let mut mask = Self::empty();
        for (index, ch) in bits.chars().enumerate() {
            match ch {
                '1' => mask.0 |= 1 << index,
                '0' => {}
                _ => return Err(CommandError::InvalidCharacter { index }),
            }
        }
        Ok(mask)
    }

    pub fn contains(self, channel: ChannelId) -> bool {
        self.0 & (1 << channel.index()) != 0
    }

    pub fn insert(&mut self, channel: ChannelId) {
        self.0 |= 1 << channel.index();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Bitstring-Darstellung (ASCII '0'/'1'), Index 0 zuerst
    pub fn to_bits(self) -> BitString {
        let mut bits = [b'0'; CHANNEL_COUNT];
        for channel in ChannelId::all() {
            if self.contains(channel) {
                bits[channel.index()] = b'1';
            }
        }
        BitString(bits)
    }
}

impl FromIterator<ChannelId> for ChannelMask {
    fn from_iter<I: IntoIterator<Item = ChannelId>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for channel in iter {
            mask.insert(channel);
        }
        mask
    }
}

/// Bitstring fester Länge, z.B. für Status-Antworten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitString([u8; CHANNEL_COUNT]);

impl BitString {
    pub fn as_str(&self) -> &str {
        // Enthält nur ASCII '0'/'1'
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelMask {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.to_bits().as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CommandError::WrongLength { len } => {
                defmt::write!(fmt, "WrongLength {{ len: {} }}", len)
            }
            CommandError::InvalidCharacter { index } => {
                defmt::write!(fmt, "InvalidCharacter {{ index: {} }}", index)
            }
            CommandError::SequenceActive => defmt::write!(fmt, "SequenceActive"),
        }
    }
}
