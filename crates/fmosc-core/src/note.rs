//! Note/frequency table.
//!
//! Maps a key on the supported keyboard (A0 through C7, 76 keys) to its
//! equal-tempered fundamental, referenced to A4 = 440 Hz.
//!
//! Keys can be addressed three ways, all resolving to the same [`Note`]:
//!
//! - key index, where `0` is A0 and `75` is C7
//! - MIDI note number (A0 = 21, A4 = 69, C7 = 96)
//! - symbolic name such as `"A4"`, `"C#3"`, `"Db3"`, `"C♯3"` or `"D♭3"`
//!
//! Enharmonic spellings are the same key: the table is keyed by pitch, not
//! by spelling.
//!
//! ```rust
//! use fmosc_core::note::{Note, frequency_of};
//!
//! assert_eq!(frequency_of("A4").unwrap(), 440.0);
//! assert_eq!(frequency_of("C#4").unwrap(), frequency_of("Db4").unwrap());
//! assert_eq!(Note::from_midi(69).unwrap(), "A4".parse::<Note>().unwrap());
//! ```

use core::fmt;
use core::str::FromStr;

use crate::error::{Result, SynthError};

/// Reference pitch in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// Number of keys in the supported span (A0..=C7).
pub const KEY_COUNT: usize = 76;

/// Key index of A4.
pub const A4_INDEX: i32 = 48;

/// Key index of the highest supported note (C7).
pub const MAX_INDEX: i32 = KEY_COUNT as i32 - 1;

/// MIDI note number of key index 0 (A0).
pub const MIDI_OFFSET: i32 = 21;

/// Pitch classes that sit on black keys (C = 0).
const BLACK_PITCH_CLASSES: [u8; 5] = [1, 3, 6, 8, 10];

/// Natural letter for each pitch class, used when spelling names.
const SHARP_LETTERS: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::C, Accidental::Sharp),
    (Letter::D, Accidental::Natural),
    (Letter::D, Accidental::Sharp),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::F, Accidental::Sharp),
    (Letter::G, Accidental::Natural),
    (Letter::G, Accidental::Sharp),
    (Letter::A, Accidental::Natural),
    (Letter::A, Accidental::Sharp),
    (Letter::B, Accidental::Natural),
];

const FLAT_LETTERS: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::D, Accidental::Flat),
    (Letter::D, Accidental::Natural),
    (Letter::E, Accidental::Flat),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::G, Accidental::Flat),
    (Letter::G, Accidental::Natural),
    (Letter::A, Accidental::Flat),
    (Letter::A, Accidental::Natural),
    (Letter::B, Accidental::Flat),
    (Letter::B, Accidental::Natural),
];

/// Natural note letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Letter {
    /// C
    C,
    /// D
    D,
    /// E
    E,
    /// F
    F,
    /// G
    G,
    /// A
    A,
    /// B
    B,
}

impl Letter {
    fn pitch_class(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// Accidental attached to a spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accidental {
    /// No accidental.
    Natural,
    /// Raised a semitone (`#` or `♯`).
    Sharp,
    /// Lowered a semitone (`b` or `♭`).
    Flat,
}

/// One spelling of a key, e.g. `C♯4` or `D♭4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteName {
    /// Natural letter.
    pub letter: Letter,
    /// Accidental.
    pub accidental: Accidental,
    /// Scientific pitch octave (C4 is middle C).
    pub octave: i32,
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.accidental {
            Accidental::Natural => "",
            Accidental::Sharp => "♯",
            Accidental::Flat => "♭",
        };
        write!(f, "{}{}{}", self.letter.as_char(), sign, self.octave)
    }
}

/// A key on the supported keyboard.
///
/// Always within A0..=C7; construction is the only place range is checked,
/// so [`Note::frequency`] is total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note(u8);

impl Note {
    /// Lowest supported key (A0).
    pub const LOWEST: Note = Note(0);
    /// Highest supported key (C7).
    pub const HIGHEST: Note = Note(MAX_INDEX as u8);
    /// Tuning reference (A4).
    pub const A4: Note = Note(A4_INDEX as u8);

    /// Key from index, 0 = A0.
    pub fn from_index(index: i32) -> Result<Self> {
        if (0..=MAX_INDEX).contains(&index) {
            Ok(Note(index as u8))
        } else {
            Err(SynthError::OutOfRange {
                note: index,
                min: 0,
                max: MAX_INDEX,
            })
        }
    }

    /// Key from MIDI note number (A0 = 21).
    pub fn from_midi(midi: u8) -> Result<Self> {
        Self::from_index(i32::from(midi) - MIDI_OFFSET)
    }

    /// Key index, 0 = A0.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// MIDI note number.
    pub fn midi(self) -> u8 {
        self.0 + MIDI_OFFSET as u8
    }

    /// Pitch class, C = 0 .. B = 11.
    pub fn pitch_class(self) -> u8 {
        self.midi() % 12
    }

    /// Scientific pitch octave.
    pub fn octave(self) -> i32 {
        i32::from(self.midi()) / 12 - 1
    }

    /// Whether this key is a black key on a piano keyboard.
    pub fn is_black(self) -> bool {
        BLACK_PITCH_CLASSES.contains(&self.pitch_class())
    }

    /// Equal-tempered fundamental in Hz.
    pub fn frequency(self) -> f32 {
        key_frequency(i32::from(self.0))
    }

    /// Sharp spelling (canonical).
    pub fn sharp_name(self) -> NoteName {
        let (letter, accidental) = SHARP_LETTERS[self.pitch_class() as usize];
        NoteName {
            letter,
            accidental,
            octave: self.octave(),
        }
    }

    /// Flat spelling. Equal to [`Note::sharp_name`] on white keys.
    pub fn flat_name(self) -> NoteName {
        let (letter, accidental) = FLAT_LETTERS[self.pitch_class() as usize];
        NoteName {
            letter,
            accidental,
            octave: self.octave(),
        }
    }

    /// Next key up, if any.
    pub fn next(self) -> Option<Self> {
        Self::from_index(i32::from(self.0) + 1).ok()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sharp_name())
    }
}

impl FromStr for Note {
    type Err = SynthError;

    /// Parse a spelling such as `A4`, `c#3`, `Db3`, `F♯5`, `B♭2`.
    ///
    /// At most one accidental is accepted. Keyboard labels of the form
    /// `"A♯0/B♭0"` are accepted when both halves spell the same key.
    /// Cross-octave spellings are handled by pitch arithmetic, so `B#3` is C4
    /// and `Cb4` is B3.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((first, second)) => {
                let note = parse_spelling(first)?;
                if parse_spelling(second)? == note {
                    Ok(note)
                } else {
                    Err(SynthError::invalid(
                        "note",
                        "spellings in a label must name the same key",
                    ))
                }
            }
            None => parse_spelling(s),
        }
    }
}

fn parse_spelling(s: &str) -> Result<Note> {
    let mut chars = s.trim().chars().peekable();

    let letter = chars
        .next()
        .and_then(Letter::from_char)
        .ok_or(SynthError::invalid("note", "expected a note letter A-G"))?;

    let offset = match chars.peek() {
        Some('#' | '♯') => 1,
        Some('b' | '♭') => -1,
        _ => 0,
    };
    if offset != 0 {
        chars.next();
    }

    let mut octave: i32 = 0;
    let mut negative = false;
    let mut digits = 0;
    if chars.peek() == Some(&'-') {
        negative = true;
        chars.next();
    }
    for c in chars {
        let digit = c
            .to_digit(10)
            .ok_or(SynthError::invalid("note", "octave must be a number"))?;
        octave = octave * 10 + digit as i32;
        digits += 1;
        if digits > 2 {
            return Err(SynthError::invalid("note", "octave out of range"));
        }
    }
    if digits == 0 {
        return Err(SynthError::invalid("note", "missing octave"));
    }
    if negative {
        octave = -octave;
    }

    let midi = 12 * (octave + 1) + letter.pitch_class() + offset;
    Note::from_index(midi - MIDI_OFFSET)
}

impl TryFrom<&str> for Note {
    type Error = SynthError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

/// Anything that resolves to a key: [`Note`], a key index, or a name.
pub trait IntoNote {
    /// Resolve to a key on the supported keyboard.
    fn into_note(self) -> Result<Note>;
}

impl IntoNote for Note {
    fn into_note(self) -> Result<Note> {
        Ok(self)
    }
}

impl IntoNote for i32 {
    fn into_note(self) -> Result<Note> {
        Note::from_index(self)
    }
}

impl IntoNote for usize {
    fn into_note(self) -> Result<Note> {
        let index = i32::try_from(self).unwrap_or(i32::MAX);
        Note::from_index(index)
    }
}

impl IntoNote for &str {
    fn into_note(self) -> Result<Note> {
        self.parse()
    }
}

/// A MIDI note number, for callers that speak MIDI rather than key indices.
///
/// ```rust
/// use fmosc_core::note::{Midi, frequency_of};
///
/// assert_eq!(frequency_of(Midi(69)).unwrap(), 440.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Midi(pub u8);

impl IntoNote for Midi {
    fn into_note(self) -> Result<Note> {
        Note::from_midi(self.0)
    }
}

/// Frequency of a key in Hz.
///
/// Fails with [`SynthError::OutOfRange`] outside A0..=C7 and with
/// [`SynthError::InvalidParameter`] for malformed names.
pub fn frequency_of(note: impl IntoNote) -> Result<f32> {
    note.into_note().map(Note::frequency)
}

/// Equal-tempered frequency of any MIDI note, unrestricted by the keyboard span.
pub fn midi_to_frequency(midi: f32) -> f32 {
    (f64::from(A4_FREQUENCY) * libm::exp2((f64::from(midi) - 69.0) / 12.0)) as f32
}

#[inline]
fn key_frequency(index: i32) -> f32 {
    // Computed in f64 so the f32 result is correctly rounded; exp2(0) is exact,
    // which keeps A4 at exactly 440.0.
    let semitones = f64::from(index - A4_INDEX);
    (f64::from(A4_FREQUENCY) * libm::exp2(semitones / 12.0)) as f32
}

/// One key of the keyboard table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyEntry {
    /// The key.
    pub note: Note,
    /// Fundamental in Hz.
    pub frequency: f32,
}

impl KeyEntry {
    /// Whether the key is black.
    pub fn is_black(&self) -> bool {
        self.note.is_black()
    }

    /// Spellings in canonical order: the sharp (or natural) spelling, then
    /// the flat spelling for black keys.
    pub fn spellings(&self) -> (NoteName, Option<NoteName>) {
        let sharp = self.note.sharp_name();
        let flat = self.note.flat_name();
        (sharp, (flat != sharp).then_some(flat))
    }

    /// Display label, `"A4"` for white keys and `"C♯4/D♭4"` for black keys.
    pub fn label(&self) -> KeyLabel {
        KeyLabel(self.note)
    }
}

/// Display adapter for [`KeyEntry::label`].
#[derive(Clone, Copy, Debug)]
pub struct KeyLabel(Note);

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sharp = self.0.sharp_name();
        let flat = self.0.flat_name();
        if sharp == flat {
            write!(f, "{sharp}")
        } else {
            write!(f, "{sharp}/{flat}")
        }
    }
}

/// The full keyboard, ascending by frequency.
///
/// ```rust
/// use fmosc_core::note::keyboard;
///
/// let keys: Vec<_> = keyboard().collect();
/// assert_eq!(keys.len(), 76);
/// assert_eq!(keys[0].label().to_string(), "A0");
/// assert_eq!(keys[1].label().to_string(), "A♯0/B♭0");
/// ```
pub fn keyboard() -> impl ExactSizeIterator<Item = KeyEntry> + DoubleEndedIterator + Clone {
    (0..KEY_COUNT as u8).map(|i| {
        let note = Note(i);
        KeyEntry {
            note,
            frequency: note.frequency(),
        }
    })
}
