//! HTML output
//!
//! Writes one self-contained HTML document built with `maud`. Resource links
//! go through the configured [`UrlRewriter`].

use crate::engine::data::CellValue;
use crate::engine::resource::{ResourceManager, UrlRewriter};
use crate::engine::template::{ReportConfiguration, ReportContent, Template};
use crate::engine::OutputProcessor;
use crate::error::EngineError;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::io::Write;
use tracing::debug;

/// Streaming table processor producing a single HTML page.
pub struct HtmlOutputProcessor<'a> {
    configuration: ReportConfiguration,
    sink: &'a mut dyn Write,
    resources: ResourceManager,
    url_rewriter: Box<dyn UrlRewriter>,
}

impl<'a> HtmlOutputProcessor<'a> {
    pub fn new(
        configuration: ReportConfiguration,
        sink: &'a mut dyn Write,
        resources: ResourceManager,
        url_rewriter: Box<dyn UrlRewriter>,
    ) -> Self {
        Self {
            configuration,
            sink,
            resources,
            url_rewriter,
        }
    }

    fn style(&self) -> String {
        format!(
            "body{{font-family:Helvetica,Arial,sans-serif;font-size:{}pt;margin:{}pt}}\
             table{{border-collapse:collapse;width:100%}}\
             th{{text-align:left;border-bottom:1px solid #000}}\
             td,th{{padding:2pt 4pt}}td.num{{text-align:right}}\
             .footer{{margin-top:12pt;color:#555}}",
            self.configuration.font_size, self.configuration.margin
        )
    }

    fn cell(&self, value: &CellValue, link: bool) -> Markup {
        match value {
            CellValue::Text(target) if link && !target.is_empty() => {
                let href = self.url_rewriter.rewrite(&self.resources.resolve(target));
                html! { td { a href=(href) { (target) } } }
            }
            CellValue::Null => html! { td {} },
            other if other.is_numeric() => html! { td class="num" { (other.to_string()) } },
            other => html! { td { (other.to_string()) } },
        }
    }

    fn render(&self, content: &ReportContent) -> Markup {
        let logo = content.logo.as_deref().map(|logo| self.url_rewriter.rewrite(logo));
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (content.title) }
                    style { (PreEscaped(self.style())) }
                }
                body {
                    @if let Some(src) = logo {
                        img class="logo" src=(src) alt="";
                    }
                    @if !content.title.is_empty() {
                        h1 { (content.title) }
                    }
                    @if let Some(header) = &content.header {
                        p { (header) }
                    }
                    table {
                        thead {
                            tr {
                                @for column in &content.columns {
                                    th style=(format!("width:{:.1}%", column.width * 100.0)) {
                                        (column.header)
                                    }
                                }
                            }
                        }
                        tbody {
                            @for row in &content.table.rows {
                                tr {
                                    @for column in &content.columns {
                                        (self.cell(ReportContent::cell(row, column), column.link))
                                    }
                                }
                            }
                        }
                    }
                    @if let Some(footer) = &content.footer {
                        p class="footer" { (footer) }
                    }
                }
            }
        }
    }
}

impl OutputProcessor for HtmlOutputProcessor<'_> {
    fn process(&mut self, template: &Template) -> Result<(), EngineError> {
        let content = template.content()?;
        let document = self.render(&content).into_string();
        self.sink.write_all(document.as_bytes())?;
        debug!(rows = content.table.len(), bytes = document.len(), "HTML document written");
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.sink.flush()?;
        Ok(())
    }
}
