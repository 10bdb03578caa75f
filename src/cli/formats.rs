use reqpub::publish::Format;

use crate::cli::terminal::Colorize;

#[derive(Debug, Default, clap::Parser)]
pub struct Formats {}

impl Formats {
    pub fn run(self) {
        for format in Format::ALL {
            let note = match format {
                Format::Text => "plain text, wrapped",
                Format::Markdown => "Markdown",
                Format::Html => "HTML pages with index and traceability matrix",
                Format::Pdf => "a single PDF via an external converter",
            };
            println!("{:<6} {}", format.extension(), note.dim());
        }
    }
}
