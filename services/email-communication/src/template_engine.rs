//! Email Template Engine
//!
//! Handlebars-based rendering of the match report email.

use gazette_models::{FileMatches, MatchResult, PublicationSegment, SectionPlacement};
use gazette_utils::GazetteResult;
use handlebars::Handlebars;
use serde::Serialize;

const WITHIN_SECTION_HEADING: &str = "Na Seção do Poder Legislativo";
const ELSEWHERE_HEADING: &str = "Em Outras Seções";

const SUBJECT_TEMPLATE: &str =
    "📰 Publicações da Assembleia Legislativa no Diário Oficial de {{{date}}}";

const BODY_HTML_TEMPLATE: &str = r#"<html>
  <head></head>
  <body>
    <p>Olá! 👋</p>
    <p>Seu robô 🤖 <b>encontrou as seguintes publicações</b> com o termo <i>'{{phrase}}'</i> no Diário Oficial de <b>{{date}}</b>.</p>
    <hr>
{{#each files}}
    <h2>DO ARQUIVO: <b>{{file_name}}</b></h2>
{{#each groups}}
{{#if heading}}
    <h3>{{heading}}:</h3>
{{/if}}
{{#each publications}}
    <p><b>PUBLICAÇÃO {{number}}:</b></p>
    <pre style='white-space: pre-wrap; word-wrap: break-word; background-color: {{../background}}; padding: 10px; border-radius: 5px;'>{{text}}</pre>
{{/each}}
{{/each}}
    <br>
{{/each}}
    <hr>
    <p>As páginas do Diário Oficial contendo estas publicações estão em anexo para consulta. ✅</p>
    <p>Atenciosamente,<br><b>Seu Robô 🤖</b></p>
  </body>
</html>
"#;

const BODY_TEXT_TEMPLATE: &str = r#"Olá!

Seu robô encontrou as seguintes publicações com o termo '{{{phrase}}}' no Diário Oficial de {{{date}}}.
{{#each files}}

==== DO ARQUIVO: {{{file_name}}} ====
{{#each groups}}
{{#if heading}}

-- {{{heading}}} --
{{/if}}
{{#each publications}}

PUBLICAÇÃO {{number}}:
{{{text}}}
{{/each}}
{{/each}}
{{/each}}

As páginas do Diário Oficial contendo estas publicações estão em anexo para consulta.

Atenciosamente,
Seu Robô
"#;

/// Template rendering result
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub body_html: String,
    pub body_text: String,
}

#[derive(Debug, Serialize)]
struct ReportContext<'a> {
    date: &'a str,
    phrase: &'a str,
    files: Vec<FileContext<'a>>,
}

#[derive(Debug, Serialize)]
struct FileContext<'a> {
    file_name: &'a str,
    groups: Vec<GroupContext<'a>>,
}

#[derive(Debug, Serialize)]
struct GroupContext<'a> {
    heading: Option<&'static str>,
    background: &'static str,
    publications: Vec<PublicationContext<'a>>,
}

#[derive(Debug, Serialize)]
struct PublicationContext<'a> {
    number: usize,
    text: &'a str,
}

fn group<'a>(
    heading: Option<&'static str>,
    background: &'static str,
    segments: &[&'a PublicationSegment],
) -> GroupContext<'a> {
    GroupContext {
        heading,
        background,
        publications: segments
            .iter()
            .enumerate()
            .map(|(i, s)| PublicationContext {
                number: i + 1,
                text: s.text.as_str(),
            })
            .collect(),
    }
}

/// Classified matches are grouped by placement, section first, with
/// numbering restarting in each group. Unclassified matches form one
/// unheaded group.
fn file_context(file: &FileMatches) -> FileContext<'_> {
    let classified = file.segments.iter().any(|s| s.placement.is_some());

    let groups = if classified {
        let within = file.in_placement(SectionPlacement::WithinSection);
        let elsewhere = file.in_placement(SectionPlacement::Elsewhere);
        [
            (WITHIN_SECTION_HEADING, "#f4f4f4", within),
            (ELSEWHERE_HEADING, "#f0f8ff", elsewhere),
        ]
        .into_iter()
        .filter(|(_, _, segments)| !segments.is_empty())
        .map(|(heading, background, segments)| group(Some(heading), background, &segments))
        .collect()
    } else {
        let all: Vec<&PublicationSegment> = file.segments.iter().collect();
        vec![group(None, "#f4f4f4", &all)]
    };

    FileContext {
        file_name: &file.file_name,
        groups,
    }
}

/// Template engine
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> GazetteResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_template_string("subject", SUBJECT_TEMPLATE)?;
        handlebars.register_template_string("body_html", BODY_HTML_TEMPLATE)?;
        handlebars.register_template_string("body_text", BODY_TEXT_TEMPLATE)?;

        Ok(Self { handlebars })
    }

    /// Render the report for one edition.
    pub fn render(&self, date_label: &str, phrase: &str, matches: &MatchResult) -> GazetteResult<RenderedEmail> {
        let context = ReportContext {
            date: date_label,
            phrase,
            files: matches.iter().map(file_context).collect(),
        };

        Ok(RenderedEmail {
            subject: self.handlebars.render("subject", &context)?,
            body_html: self.handlebars.render("body_html", &context)?,
            body_text: self.handlebars.render("body_text", &context)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, placement: Option<SectionPlacement>) -> PublicationSegment {
        PublicationSegment {
            span: 0..text.len(),
            text: text.to_string(),
            placement,
            source_file: "do20250102p03.pdf".to_string(),
        }
    }

    #[test]
    fn test_subject_carries_date() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine.render("02/01/2025", "Assembleia", &MatchResult::new()).unwrap();
        assert_eq!(
            rendered.subject,
            "📰 Publicações da Assembleia Legislativa no Diário Oficial de 02/01/2025"
        );
    }

    #[test]
    fn test_classified_groups_restart_numbering() {
        let mut matches = MatchResult::new();
        matches.insert(
            "do20250102p03.pdf",
            vec![
                segment("fora um", Some(SectionPlacement::Elsewhere)),
                segment("dentro um", Some(SectionPlacement::WithinSection)),
                segment("dentro dois", Some(SectionPlacement::WithinSection)),
            ],
        );

        let engine = TemplateEngine::new().unwrap();
        let text = engine.render("02/01/2025", "Assembleia", &matches).unwrap().body_text;

        let within = text.find("-- Na Seção do Poder Legislativo --").unwrap();
        let elsewhere = text.find("-- Em Outras Seções --").unwrap();
        assert!(within < elsewhere);
        assert!(text.find("dentro um").unwrap() > within);
        assert!(text.find("fora um").unwrap() > elsewhere);
        assert_eq!(text.matches("PUBLICAÇÃO 1:").count(), 2);
        assert_eq!(text.matches("PUBLICAÇÃO 2:").count(), 1);
    }

    #[test]
    fn test_unclassified_has_no_headings() {
        let mut matches = MatchResult::new();
        matches.insert("do20250102p01.pdf", vec![segment("a", None), segment("b", None)]);

        let engine = TemplateEngine::new().unwrap();
        let rendered = engine.render("02/01/2025", "Assembleia", &matches).unwrap();
        assert!(!rendered.body_html.contains("<h3>"));
        assert!(rendered.body_html.contains("DO ARQUIVO: <b>do20250102p01.pdf</b>"));
        assert!(rendered.body_html.contains("PUBLICAÇÃO 2:"));
    }

    #[test]
    fn test_html_escapes_publication_text() {
        let mut matches = MatchResult::new();
        matches.insert("f.pdf", vec![segment("Lei <b>nº</b> 1 & 2", None)]);

        let engine = TemplateEngine::new().unwrap();
        let rendered = engine.render("02/01/2025", "Assembleia", &matches).unwrap();
        assert!(rendered.body_html.contains("Lei &lt;b&gt;nº&lt;/b&gt; 1 &amp; 2"));
        assert!(rendered.body_text.contains("Lei <b>nº</b> 1 & 2"));
    }
}
