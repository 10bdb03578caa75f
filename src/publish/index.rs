//! The `index.html` landing page and the `traceability.csv` export.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use html_escape::{encode_quoted_attribute, encode_text};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    domain::{LinkIndex, Settings, Tree},
    publish::{matrix::Matrix, Error, ASSETS_DIR, INDEX, PDF},
};

/// One entry in the client-side search data.
#[derive(Debug, Serialize)]
struct SearchEntry {
    link: String,
    text: String,
}

/// Everything the index page shows.
pub struct IndexPage<'a> {
    /// The tree that was published.
    pub tree: &'a Tree,
    /// Link lookups for the tree.
    pub index: &'a LinkIndex<'a>,
    /// Active settings.
    pub settings: &'a Settings,
    /// The traceability matrix.
    pub matrix: &'a Matrix<'a>,
}

impl IndexPage<'_> {
    /// Write `index.html` into `dir`, listing the HTML files found there.
    ///
    /// Nothing is written when the directory holds no other HTML files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, the index cannot be
    /// written, or the search data cannot be serialised.
    pub fn write(&self, dir: &Path) -> Result<bool, Error> {
        let mut prefixes: Vec<String> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_page = path.extension().is_some_and(|ext| ext == "html")
                && path.file_name().is_some_and(|name| name != INDEX);
            if let (true, Some(stem)) = (is_page, path.file_stem()) {
                prefixes.push(stem.to_string_lossy().into_owned());
            }
        }
        prefixes.sort();

        if prefixes.is_empty() {
            warn!("no files for {INDEX}");
            return Ok(false);
        }

        let path = dir.join(INDEX);
        info!("generating {}...", path.display());
        let link_to_pdf = dir.join(PDF).is_file();
        let lines = self.lines(&prefixes, link_to_pdf)?;
        write_lines(&path, lines)?;
        Ok(true)
    }

    fn lines(&self, prefixes: &[String], link_to_pdf: bool) -> Result<Vec<String>, Error> {
        let settings = self.settings;
        let baseurl = &settings.baseurl;
        let title = encode_text(&settings.title);

        let mut lines = vec![
            "<!DOCTYPE html>".to_string(),
            "<html lang=\"en\">".to_string(),
            "<head>".to_string(),
            "<meta charset=\"utf-8\">".to_string(),
            format!("<title>{}</title>", encode_text(&settings.full_title())),
            format!("<link rel=\"stylesheet\" href=\"{baseurl}{ASSETS_DIR}/general.css\">"),
            "</head>".to_string(),
            "<body>".to_string(),
            "<div class=\"index\">".to_string(),
            format!("<h1>{title}</h1>"),
        ];
        if !settings.version.is_empty() {
            lines.push(format!("<p>Version {}</p>", encode_text(&settings.version)));
        }

        lines.push("<h3>Documents</h3>".to_string());
        lines.push("<ul>".to_string());
        for prefix in prefixes {
            let name = self
                .tree
                .document(prefix)
                .map_or(prefix.as_str(), |document| document.name());
            lines.push(format!(
                "<li><a href=\"{prefix}.html\">{} ({prefix})</a></li>",
                encode_text(name)
            ));
        }
        lines.push("</ul>".to_string());
        if link_to_pdf {
            lines.push(format!("<p><a href=\"{PDF}\">Download as PDF</a></p>"));
        }

        lines.push("<h3>Search</h3>".to_string());
        lines.push(
            "<input type=\"search\" id=\"search\" placeholder=\"Search all items\" autocomplete=\"off\">"
                .to_string(),
        );
        lines.push("<ul id=\"search-results\"></ul>".to_string());
        lines.push("<script>".to_string());
        lines.push("const data = [".to_string());
        lines.extend(self.search_entries()?);
        lines.push("];".to_string());
        lines.push("</script>".to_string());
        lines.push(format!(
            "<script src=\"{baseurl}{ASSETS_DIR}/search.js\"></script>"
        ));

        lines.push("<h3>Tree Structure</h3>".to_string());
        lines.push(format!(
            "<pre><code>{}</code></pre>",
            encode_text(&self.tree.draw())
        ));

        lines.push("<h3>Traceability</h3>".to_string());
        lines.extend(self.matrix.html_lines());

        lines.push("</div>".to_string());
        lines.push("</body>".to_string());
        lines.push("</html>".to_string());
        Ok(lines)
    }

    /// One JSON object per item, each followed by a comma.
    fn search_entries(&self) -> Result<Vec<String>, Error> {
        self.tree
            .sorted_documents()
            .into_iter()
            .flat_map(|document| document.items())
            .map(|item| {
                let prefix = item.prefix();
                let uid = item.uid_str();
                let name = item.document.name();
                let title = encode_quoted_attribute(item.text()).replace('\n', "  ");
                let stakeholder = self
                    .index
                    .stakeholder(item)
                    .map(|stakeholder| stakeholder.uid())
                    .unwrap_or_default();
                let text = [uid, stakeholder, item.text()]
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                let entry = SearchEntry {
                    link: format!(
                        "<a href=\"{prefix}.html#{uid}\" title=\"{title}\">{} ({prefix}) - {uid}</a>",
                        encode_text(name)
                    ),
                    text,
                };
                // keep the script element closed only by its own end tag
                Ok(format!("{},", serde_json::to_string(&entry)?.replace("</", "<\\/")))
            })
            .collect()
    }
}

/// Write the traceability rows of `tree` as CSV.
///
/// The header holds the document prefixes in tree order; each row holds the
/// uid in each document's column, or an empty field.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_csv(path: &Path, tree: &Tree, index: &LinkIndex<'_>) -> io::Result<()> {
    info!("generating {}...", path.display());
    let header = tree
        .documents()
        .iter()
        .map(|document| csv_field(document.prefix()))
        .collect::<Vec<_>>()
        .join(",");
    let rows = tree.traceability(index).into_iter().map(|row| {
        row.iter()
            .map(|slot| slot.map_or_else(String::new, |item| csv_field(item.uid_str())))
            .collect::<Vec<_>>()
            .join(",")
    });
    write_lines(path, std::iter::once(header).chain(rows))
}

/// Quote a field if it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write each line followed by a newline.
pub fn write_lines(path: &Path, lines: impl IntoIterator<Item = String>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
