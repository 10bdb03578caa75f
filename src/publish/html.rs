use crate::publish::{
    convert::markdown_to_html,
    markdown::{self, Flavor},
    template::{self, Page},
    Error, Publishable, RenderContext,
};

/// Render items as HTML.
///
/// Documents are rendered as full pages through the page template, with an
/// optional table of contents. Anything else becomes a bare HTML fragment.
pub fn render(obj: &Publishable<'_>, ctx: RenderContext<'_>) -> Result<String, Error> {
    let text = markdown::lines(obj.items(), ctx, Flavor::Html)
        .collect::<Vec<_>>()
        .join("\n");
    let body = markdown_to_html(&text, ctx.diagrams);

    let Some(document) = obj.document() else {
        return Ok(body);
    };

    let toc = ctx.toc.then(|| {
        let toc = markdown::table_of_contents(document.items(), ctx.settings, true);
        markdown_to_html(&toc, ctx.diagrams)
    });

    template::render_page(
        ctx.template,
        &Page {
            title: &ctx.settings.title,
            version: &ctx.settings.version,
            prefix: document.prefix(),
            name: document.name(),
            parent: document.parent(),
            body,
            toc,
            baseurl: &ctx.settings.baseurl,
        },
    )
}
