//! Console rendering of scripts for the `script` subcommand.

use colored::{Color, Colorize};
use podcastai_core::Script;

const SPEAKER_COLORS: [Color; 4] = [
    Color::BrightCyan,
    Color::BrightYellow,
    Color::BrightGreen,
    Color::BrightMagenta,
];

/// Print a script with one color per speaker.
pub fn print_script(script: &Script) {
    let speakers = script.speakers();

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", format!("  {}", script.title).bright_blue().bold());
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    for line in &script.lines {
        let index = speakers
            .iter()
            .position(|s| *s == line.speaker)
            .unwrap_or(0);
        let color = SPEAKER_COLORS[index % SPEAKER_COLORS.len()];

        println!("{} {}", "▶".color(color), line.speaker.color(color).bold());
        for wrapped in wrap_words(&line.line, 66) {
            println!("  {}", wrapped);
        }
        println!();
    }

    println!("{}", "─".repeat(70).dimmed());
    println!(
        "{}",
        format!("  {} lines, {} presenters", script.lines.len(), speakers.len()).dimmed()
    );
}

/// Greedy word wrap measured in characters. Words longer than `width` get their own line.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current_chars > 0 && current_chars + 1 + word_chars > width {
            lines.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if current_chars > 0 {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
