//! Keyboard note table.

use clap::Args;
use fmosc_core::{Note, keyboard};

#[derive(Args)]
pub struct NotesArgs {
    /// Show a single note, e.g. "A4" or "Db3"
    #[arg(value_name = "NOTE")]
    note: Option<String>,

    /// Only white keys
    #[arg(long, conflicts_with = "black")]
    white: bool,

    /// Only black keys
    #[arg(long)]
    black: bool,
}

pub fn run(args: NotesArgs) -> anyhow::Result<()> {
    if let Some(name) = args.note {
        let note: Note = name.parse()?;
        println!(
            "{} = {:.2} Hz (key {}, MIDI {})",
            note,
            note.frequency(),
            note.index(),
            note.midi()
        );
        return Ok(());
    }

    println!("{:>4}  {:>4}  {:<10} {:>10}", "Key", "MIDI", "Note", "Hz");
    println!("{}", "-".repeat(33));
    for key in keyboard() {
        if (args.white && key.is_black()) || (args.black && !key.is_black()) {
            continue;
        }
        println!(
            "{:>4}  {:>4}  {:<10} {:>10.2}",
            key.note.index(),
            key.note.midi(),
            key.label().to_string(),
            key.frequency
        );
    }
    Ok(())
}
