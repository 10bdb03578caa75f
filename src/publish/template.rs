use std::sync::LazyLock;

use minijinja::{context, Environment, Value};
use tracing::error;

use crate::publish::{Error, ASSETS_DIR};

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        ("sidebar.html", include_str!("../../templates/sidebar.html")),
        ("plain.html", include_str!("../../templates/plain.html")),
        ("pdf.html", include_str!("../../templates/pdf.html")),
    ] {
        if let Err(e) = env.add_template(name, source) {
            error!("invalid built-in template {name}: {e}");
        }
    }
    env
});

/// The values a document page template can use.
#[derive(Debug)]
pub struct Page<'a> {
    /// Title of the published set.
    pub title: &'a str,
    /// Version of the published set.
    pub version: &'a str,
    /// Prefix of the rendered document.
    pub prefix: &'a str,
    /// Name of the rendered document.
    pub name: &'a str,
    /// Prefix of the parent document, linked from the page.
    pub parent: Option<&'a str>,
    /// Rendered item HTML.
    pub body: String,
    /// Rendered table of contents HTML.
    pub toc: Option<String>,
    /// Prefix for asset URLs.
    pub baseurl: &'a str,
}

/// Render a document page with the named template.
///
/// # Errors
///
/// Returns [`Error::Template`] if no template has that name or rendering
/// fails.
pub fn render_page(template: &str, page: &Page<'_>) -> Result<String, Error> {
    render(
        &format!("{template}.html"),
        context! {
            title => page.title,
            version => page.version,
            prefix => page.prefix,
            name => page.name,
            parent => page.parent,
            body => Value::from_safe_string(page.body.clone()),
            toc => page.toc.clone().map(Value::from_safe_string),
            baseurl => page.baseurl,
            assets => ASSETS_DIR,
        },
    )
}

/// Wrap converted HTML into the standalone page handed to the PDF engine.
///
/// # Errors
///
/// Returns [`Error::Template`] if the built-in template fails to render.
pub fn render_pdf(title: &str, body: String) -> Result<String, Error> {
    render(
        "pdf.html",
        context! {
            title => title,
            body => Value::from_safe_string(body),
        },
    )
}

fn render(name: &str, ctx: Value) -> Result<String, Error> {
    TEMPLATES
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|source| {
            error!(template = name, "problem rendering the template: {source}");
            Error::Template {
                template: name.to_string(),
                source,
            }
        })
}
