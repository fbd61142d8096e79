//! Preset management command.

use super::common::VoiceArgs;
use clap::{Args, Subcommand};
use fmosc_config::{
    factory_presets, paths::ensure_user_presets_dir, paths::list_user_presets,
    paths::preset_name_from_path, resolve_preset,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory and user presets
    List,

    /// Print a preset as TOML
    Show {
        /// Preset name or path
        name: String,
    },

    /// Save a voice (preset plus overrides) as a new preset file
    Save {
        /// Name of the new preset
        name: String,

        /// Write here instead of the user presets directory
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Description stored with the preset
        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        voice: VoiceArgs,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => {
            println!("Factory Presets:");
            for preset in factory_presets() {
                println!(
                    "  {:<16} {}",
                    preset.name,
                    preset.description.as_deref().unwrap_or("")
                );
            }

            let user = list_user_presets();
            println!();
            if user.is_empty() {
                println!("User Presets: none");
            } else {
                println!("User Presets:");
                for path in user {
                    let name = preset_name_from_path(&path).unwrap_or_default();
                    println!("  {:<16} {}", name, path.display());
                }
            }
        }

        PresetsCommand::Show { name } => {
            let preset = resolve_preset(&name)?;
            print!("{}", preset.to_toml()?);
        }

        PresetsCommand::Save {
            name,
            path,
            description,
            voice,
        } => {
            let mut preset = voice.build_preset()?;
            preset.name.clone_from(&name);
            if description.is_some() {
                preset.description = description;
            }

            let path = match path {
                Some(p) => p,
                None => ensure_user_presets_dir()?.join(format!("{name}.toml")),
            };
            preset.save(&path)?;
            println!("Saved preset '{}' to {}", name, path.display());
        }
    }

    Ok(())
}
