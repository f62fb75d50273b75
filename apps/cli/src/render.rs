use console::{Style, style};
use scenelens_core::{BlockView, PaletteColor, ResultSession, TranscriptSection, transcript_text};

fn field_style(color: PaletteColor) -> Style {
    Style::new().color256(color.ansi256).bold()
}

/// Scene list with the focused block marked, the way the desktop selector shows it.
pub fn print_scene_list(session: &ResultSession) {
    let focused = session.selection().current();
    for (index, title) in session.block_titles().iter().enumerate() {
        if Some(index) == focused {
            println!("{} {}", style("›").cyan().bold(), style(title).bold());
        } else {
            println!("  {}", style(title).dim());
        }
    }
}

pub fn print_block(view: &BlockView) {
    println!("\n{}\n", style(&view.title).bold().underlined());
    if view.fields.is_empty() {
        println!("{}", style("(no fields)").dim());
        return;
    }
    for field in &view.fields {
        println!(
            "{} {}",
            field_style(field.color).apply_to(format!("{}:", field.name)),
            field.value
        );
    }
}

pub fn print_transcripts(sections: &[TranscriptSection]) {
    if sections.is_empty() {
        return;
    }
    println!("\n{}\n", style("Transcripts").bold().underlined());
    print!("{}", transcript_text(sections));
}

pub fn divider() -> String {
    style("─".repeat(60)).dim().to_string()
}
