//! Factory presets bundled with fmosc.
//!
//! Always available without external files. `init` matches a freshly built
//! voice: D3, modulator at twice the primary, no modulation, gain 0.8.

use crate::VoicePreset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "init",
    "bell",
    "electric_piano",
    "bass",
    "vibrato",
    "metallic",
];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("bell", BELL_PRESET),
    ("electric_piano", ELECTRIC_PIANO_PRESET),
    ("bass", BASS_PRESET),
    ("vibrato", VIBRATO_PRESET),
    ("metallic", METALLIC_PRESET),
];

const INIT_PRESET: &str = r#"
name = "Init"
description = "Plain sine on D3, modulator ready at ratio 2"
sample_rate = 48000

[voice]
note = "D3"
fm_ratio = 2.0
fm_amount = 0.0
gain = 0.8
"#;

const BELL_PRESET: &str = r#"
name = "Bell"
description = "Inharmonic bell from a non-integer ratio"
sample_rate = 48000

[voice]
note = "A4"
fm_ratio = 3.5
fm_amount = 600.0
gain = 0.6
"#;

const ELECTRIC_PIANO_PRESET: &str = r#"
name = "Electric Piano"
description = "Unison ratio with moderate depth"
sample_rate = 48000
smoothing_ms = 10.0

[voice]
note = "C4"
fm_ratio = 1.0
fm_amount = 180.0
gain = 0.7
"#;

const BASS_PRESET: &str = r#"
name = "Bass"
description = "Sub-octave modulator for a growling low end"
sample_rate = 48000

[voice]
note = "A1"
fm_ratio = 0.5
fm_amount = 40.0
gain = 0.8
"#;

const VIBRATO_PRESET: &str = r#"
name = "Vibrato"
description = "Slow fixed modulator as pitch vibrato"
sample_rate = 48000

[voice]
note = "E4"
fm_frequency = 5.5
fm_amount = 6.0
gain = 0.7
"#;

const METALLIC_PRESET: &str = r#"
name = "Metallic"
description = "Square modulator at an irrational ratio"
sample_rate = 48000
smoothing = "exponential"
modulator = "square"

[voice]
note = "G3"
fm_ratio = 1.414
fm_amount = 350.0
gain = 0.5
"#;

/// Get all factory presets.
///
/// ```rust
/// use fmosc_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<VoicePreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| VoicePreset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by identifier or display name, case-insensitive.
///
/// ```rust
/// use fmosc_config::get_factory_preset;
///
/// assert!(get_factory_preset("bell").is_some());
/// assert!(get_factory_preset("Electric Piano").is_some());
/// ```
pub fn get_factory_preset(name: &str) -> Option<VoicePreset> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == name_lower)
    {
        return VoicePreset::from_toml(toml).ok();
    }

    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| VoicePreset::from_toml(toml).ok())
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` matches a factory preset identifier or display name.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
