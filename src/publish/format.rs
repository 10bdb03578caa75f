use std::{fmt, iter};

use tracing::debug;

use super::{html, markdown, markdown::Flavor, text, Error, Publishable, RenderContext};

/// A lazy, one-shot sequence of output lines.
pub type Lines<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// An output format, identified by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `.txt`
    Text,
    /// `.md`
    Markdown,
    /// `.html`
    Html,
    /// `.pdf`, rendered as PDF-flavoured Markdown before conversion.
    Pdf,
}

impl Format {
    /// Every supported format, in the order they are listed to users.
    pub const ALL: [Self; 4] = [Self::Text, Self::Markdown, Self::Html, Self::Pdf];

    /// The file extension, including the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => ".txt",
            Self::Markdown => ".md",
            Self::Html => ".html",
            Self::Pdf => ".pdf",
        }
    }

    /// Render items into lines of this format.
    ///
    /// HTML yields a single line holding the whole page or fragment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if an HTML page template fails.
    pub fn lines<'a>(
        self,
        obj: &Publishable<'a>,
        ctx: RenderContext<'a>,
    ) -> Result<Lines<'a>, Error> {
        debug!("yielding {obj} as lines of {self}");
        Ok(match self {
            Self::Text => Box::new(text::lines(obj.items(), ctx)),
            Self::Markdown => Box::new(markdown::lines(obj.items(), ctx, Flavor::Standard)),
            Self::Pdf => Box::new(markdown::lines(
                obj.items(),
                ctx,
                Flavor::Pdf {
                    document: ctx.document_number,
                },
            )),
            Self::Html => Box::new(iter::once(html::render(obj, ctx)?)),
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Confirm an extension is supported and return its format.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`], listing the supported extensions,
/// for anything other than `.txt`, `.md`, `.html` or `.pdf`.
pub fn check(ext: &str) -> Result<Format, Error> {
    let Some(format) = Format::ALL
        .into_iter()
        .find(|format| format.extension() == ext)
    else {
        let options = Format::ALL
            .iter()
            .map(|format| format.extension())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::UnsupportedFormat {
            ext: if ext.is_empty() { "None" } else { ext }.to_string(),
            options,
        });
    };

    debug!("found lines generator for: {ext}");
    Ok(format)
}
