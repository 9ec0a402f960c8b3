use std::path::Path;

use colored::Colorize;

use super::read_notes;
use cardsmith::error::Result;
use cardsmith::segment::Segmenter;

pub fn cmd_segment(file: Option<&Path>, chunk_size: usize, overlap: usize) -> Result<()> {
    let text = read_notes(file)?;
    let segmenter = Segmenter::new(&text, chunk_size, overlap);

    println!(
        "{} {} words, chunk size {}, overlap {}",
        "Segmenting".green().bold(),
        segmenter.word_count(),
        chunk_size,
        overlap
    );

    let mut count = 0;
    for chunk in segmenter.chunks() {
        count += 1;
        let words = chunk.text.split(' ').count();
        let preview: String = chunk.text.chars().take(80).collect();
        println!(
            "  {:>3}. words {}..{}  {}",
            count,
            chunk.start_word_index,
            chunk.start_word_index + words,
            preview.dimmed()
        );
    }

    println!("{} {} chunk(s).", "Done!".green().bold(), count);
    Ok(())
}
