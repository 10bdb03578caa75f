use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use tracing::warn;

use crate::publish::uml::DiagramRenderer;

/// Fence languages treated as `PlantUML` diagrams.
const UML_LANGUAGES: [&str; 3] = ["plantuml", "puml", "uml"];

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
}

/// Convert Markdown to HTML.
///
/// Tables, footnotes, heading attributes (`{#id}`), strikethrough and
/// definition lists are enabled. Fenced `plantuml` blocks are replaced by
/// the diagram's SVG. A diagram that fails to render is logged and left as
/// a code block.
#[must_use]
pub fn markdown_to_html(markdown: &str, diagrams: &dyn DiagramRenderer) -> String {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut diagram: Option<(CowStr<'_>, String)> = None;

    for event in Parser::new_ext(markdown, options()) {
        match (diagram.as_mut(), event) {
            (None, Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))))
                if is_uml(&lang) =>
            {
                diagram = Some((lang, String::new()));
            }
            (Some((_, source)), Event::Text(text)) => source.push_str(&text),
            (Some(_), Event::End(TagEnd::CodeBlock)) => {
                if let Some((lang, source)) = diagram.take() {
                    events.extend(render_diagram(lang, source, diagrams));
                }
            }
            (_, event) => events.push(event),
        }
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

fn is_uml(lang: &str) -> bool {
    let lang = lang.split_whitespace().next().unwrap_or_default();
    UML_LANGUAGES.contains(&lang)
}

fn render_diagram<'a>(
    lang: CowStr<'a>,
    source: String,
    diagrams: &dyn DiagramRenderer,
) -> Vec<Event<'a>> {
    match diagrams.render_svg(&source) {
        Ok(svg) => vec![Event::Html(
            format!("<div class=\"uml\" title=\"UML diagram\">{svg}</div>\n").into(),
        )],
        Err(error) => {
            warn!("failed to render UML diagram: {error}");
            vec![
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))),
                Event::Text(source.into()),
                Event::End(TagEnd::CodeBlock),
            ]
        }
    }
}
