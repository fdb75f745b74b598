// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Template Rendering Module
//!
//! Handlebars rendering for page documents and redirect stubs.
//!
//! The renderer starts from the built-in templates compiled into the crate
//! and then lets a template directory override any of them. Files are
//! registered by stem: `page.hbs` becomes the `page` template, and files
//! whose stem starts with `_` are partials (`_head.hbs` is `{{> head}}`).
//!
//! Two helpers are always available:
//!
//! - `markdown`: renders Markdown to HTML, with raw HTML in the source
//!   shown as text;
//! - `urlencode`: percent-encodes a path segment. The built-in templates
//!   receive ready-made hrefs; this is for overrides that build their own
//!   links from slugs or tags.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::{
    Context, Handlebars, Helper, Output, RenderContext, RenderError,
    RenderErrorReason,
};
use log::{debug, info};
use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use crate::core::error::{Result, ToolHubError};
use crate::core::traits::TemplateRenderer;

/// Name of the template every page document is rendered with.
pub const PAGE_TEMPLATE: &str = "page";

/// Name of the redirect stub template.
pub const REDIRECT_TEMPLATE: &str = "redirect";

const TEMPLATE_EXTENSION: &str = "hbs";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (PAGE_TEMPLATE, include_str!("../templates/page.hbs")),
    (REDIRECT_TEMPLATE, include_str!("../templates/redirect.hbs")),
    ("_head", include_str!("../templates/_head.hbs")),
    ("_section", include_str!("../templates/_section.hbs")),
];

/// A custom template helper.
pub trait TemplateHelper: Send + Sync {
    /// Computes the helper output from its parameters.
    ///
    /// String results are written verbatim, without HTML escaping; other
    /// values are written as JSON.
    fn execute(
        &self,
        params: &[JsonValue],
        context: &JsonValue,
    ) -> Result<JsonValue>;

    /// Name the helper is registered under.
    fn name(&self) -> &str;
}

/// Handlebars renderer with built-in templates and helpers.
#[derive(Clone)]
pub struct HandlebarsRenderer {
    engine: Arc<RwLock<Handlebars<'static>>>,
    template_dir: Option<PathBuf>,
    templates: Arc<RwLock<BTreeSet<String>>>,
    strict_mode: bool,
}

impl fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlebarsRenderer")
            .field("template_dir", &self.template_dir)
            .field("templates", &*self.templates.read())
            .field("strict_mode", &self.strict_mode)
            .finish()
    }
}

impl HandlebarsRenderer {
    /// Creates a renderer from the built-in templates, overridden by the
    /// `.hbs` files in `template_dir` when given.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::html_escape);

        let renderer = Self {
            engine: Arc::new(RwLock::new(handlebars)),
            template_dir: template_dir.map(Path::to_path_buf),
            templates: Arc::new(RwLock::new(BTreeSet::new())),
            strict_mode: false,
        }
        .with_helper(helpers::MarkdownHelper)
        .with_helper(helpers::UrlEncodeHelper);

        for (name, source) in BUILTIN_TEMPLATES {
            renderer.register(name, source)?;
        }
        if let Some(dir) = &renderer.template_dir {
            renderer.load_templates(dir)?;
        }
        Ok(renderer)
    }

    /// Makes missing template variables an error instead of rendering
    /// them empty.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self.engine.write().set_strict_mode(strict);
        self
    }

    /// Registers a custom helper under [`TemplateHelper::name`].
    pub fn with_helper<H>(self, helper: H) -> Self
    where
        H: TemplateHelper + 'static,
    {
        let name = helper.name().to_string();
        let helper_fn = move |h: &Helper,
                              _: &Handlebars,
                              ctx: &Context,
                              _: &mut RenderContext,
                              out: &mut dyn Output|
              -> std::result::Result<(), RenderError> {
            let params: Vec<JsonValue> =
                h.params().iter().map(|p| p.value().clone()).collect();

            let result =
                helper.execute(&params, ctx.data()).map_err(|e| {
                    RenderError::from(RenderErrorReason::Other(
                        e.to_string(),
                    ))
                })?;
            match result {
                JsonValue::String(text) => out.write(&text)?,
                JsonValue::Null => {}
                other => out.write(&other.to_string())?,
            }
            Ok(())
        };

        self.engine
            .write()
            .register_helper(&name, Box::new(helper_fn));
        self
    }

    /// Registers a template, or a partial when `name` starts with `_`.
    pub fn register(&self, name: &str, source: &str) -> Result<()> {
        let mut engine = self.engine.write();
        match name.strip_prefix('_') {
            Some(partial) => engine.register_partial(partial, source),
            None => engine.register_template_string(name, source),
        }
        .map_err(|e| {
            ToolHubError::template_rendering(
                format!("failed to register template: {}", e),
                name,
                Some(Box::new(e)),
            )
        })?;
        _ = self.templates.write().insert(name.to_string());
        debug!("registered template '{}'", name);
        Ok(())
    }

    /// Names of every registered template and partial.
    pub fn template_names(&self) -> Vec<String> {
        self.templates.read().iter().cloned().collect()
    }

    fn load_templates(&self, dir: &Path) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| {
            ToolHubError::template_rendering(
                format!("failed to read template directory: {}", e),
                dir.display().to_string(),
                Some(Box::new(e)),
            )
        })?;

        let mut count = 0usize;
        for entry in entries {
            let path = entry
                .map_err(|e| ToolHubError::io_error(dir.to_path_buf(), e))?
                .path();
            if !path.is_file()
                || path.extension().and_then(|s| s.to_str())
                    != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    ToolHubError::template_rendering(
                        "invalid template file name",
                        path.display().to_string(),
                        None,
                    )
                })?;
            let source = fs::read_to_string(&path)
                .map_err(|e| ToolHubError::io_error(path.clone(), e))?;
            self.register(name, &source)?;
            count += 1;
        }

        info!("loaded {} template(s) from {}", count, dir.display());
        Ok(())
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template: &str, context: &JsonValue) -> Result<String> {
        self.validate(template)?;
        self.engine.read().render(template, context).map_err(|e| {
            ToolHubError::template_rendering(
                format!("template rendering failed: {}", e),
                template,
                Some(Box::new(e)),
            )
        })
    }

    fn validate(&self, template: &str) -> Result<()> {
        if self.engine.read().has_template(template) {
            Ok(())
        } else {
            Err(ToolHubError::template_rendering(
                format!("template '{}' not found", template),
                template,
                None,
            ))
        }
    }
}

/// Built-in helpers.
pub mod helpers {
    use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
    use serde_json::Value as JsonValue;

    use super::TemplateHelper;
    use crate::core::error::{Result, ToolHubError};

    const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

    /// Renders Markdown to HTML.
    ///
    /// Raw HTML in the source is emitted as escaped text and links with
    /// script-capable schemes are neutralised.
    pub fn markdown_to_html(source: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let events = Parser::new_ext(source, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            other => other,
        });

        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, events);
        output
    }

    /// Whether `url` is free of script-capable schemes.
    pub fn is_safe_url(url: &str) -> bool {
        let lowered = url.trim_start().to_ascii_lowercase();
        !UNSAFE_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme))
    }

    fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
        if is_safe_url(&url) {
            url
        } else {
            CowStr::Borrowed("#")
        }
    }

    fn string_param<'a>(params: &'a [JsonValue], helper: &str) -> Result<&'a str> {
        match params.first() {
            Some(JsonValue::String(text)) => Ok(text),
            Some(JsonValue::Null) => Ok(""),
            _ => Err(ToolHubError::template_rendering(
                format!("{} helper requires a string parameter", helper),
                helper,
                None,
            )),
        }
    }

    /// `{{markdown text}}`
    #[derive(Debug, Clone, Copy)]
    pub struct MarkdownHelper;

    impl TemplateHelper for MarkdownHelper {
        fn execute(
            &self,
            params: &[JsonValue],
            _context: &JsonValue,
        ) -> Result<JsonValue> {
            let source = string_param(params, self.name())?;
            Ok(JsonValue::String(markdown_to_html(source)))
        }

        fn name(&self) -> &str {
            "markdown"
        }
    }

    /// `{{urlencode segment}}`
    #[derive(Debug, Clone, Copy)]
    pub struct UrlEncodeHelper;

    impl TemplateHelper for UrlEncodeHelper {
        fn execute(
            &self,
            params: &[JsonValue],
            _context: &JsonValue,
        ) -> Result<JsonValue> {
            let segment = string_param(params, self.name())?;
            Ok(JsonValue::String(urlencoding::encode(segment).into_owned()))
        }

        fn name(&self) -> &str {
            "urlencode"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::helpers::markdown_to_html;
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_templates_are_registered() {
        let renderer = HandlebarsRenderer::new(None).unwrap();
        assert!(renderer.validate(PAGE_TEMPLATE).is_ok());
        assert!(renderer.validate(REDIRECT_TEMPLATE).is_ok());
        assert!(renderer.validate("missing").is_err());
        assert!(renderer.template_names().contains(&"_head".to_string()));
    }

    #[test]
    fn test_template_dir_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("redirect.hbs"),
            "to {{location}}{{> note}}",
        )
        .unwrap();
        fs::write(temp_dir.path().join("_note.hbs"), "!").unwrap();
        fs::write(temp_dir.path().join("readme.txt"), "ignored").unwrap();

        let renderer =
            HandlebarsRenderer::new(Some(temp_dir.path())).unwrap();
        let output = renderer
            .render(REDIRECT_TEMPLATE, &json!({"location": "/tools"}))
            .unwrap();
        assert_eq!(output, "to /tools!");
    }

    #[test]
    fn test_helpers_write_unquoted_output() {
        let renderer = HandlebarsRenderer::new(None).unwrap();
        renderer
            .register("snippet", "{{urlencode tag}}|{{markdown body}}")
            .unwrap();
        let output = renderer
            .render("snippet", &json!({"tag": "CRM Tools", "body": "**hi**"}))
            .unwrap();
        assert_eq!(output, "CRM%20Tools|<p><strong>hi</strong></p>\n");
    }

    #[test]
    fn test_values_are_html_escaped() {
        let renderer = HandlebarsRenderer::new(None).unwrap();
        renderer.register("snippet", "{{name}}").unwrap();
        let output = renderer
            .render("snippet", &json!({"name": "<b>x</b>"}))
            .unwrap();
        assert_eq!(output, "&lt;b&gt;x&lt;/b&gt;");
    }

    #[test]
    fn test_strict_mode_rejects_missing_values() {
        let renderer =
            HandlebarsRenderer::new(None).unwrap().with_strict_mode(true);
        renderer.register("snippet", "{{missing}}").unwrap();
        assert!(renderer.render("snippet", &json!({})).is_err());
    }

    #[test]
    fn test_invalid_template_is_reported() {
        let renderer = HandlebarsRenderer::new(None).unwrap();
        let err = renderer.register("broken", "{{#if}}").unwrap_err();
        assert!(matches!(err, ToolHubError::TemplateRendering { .. }));
    }

    #[test]
    fn test_markdown_neutralises_html_and_scripts() {
        let output = markdown_to_html(
            "<script>alert(1)</script>\n\n[x](javascript:alert(1)) *ok*",
        );
        assert!(!output.contains("<script>"));
        assert!(output.contains("&lt;script&gt;"));
        assert!(output.contains("href=\"#\""));
        assert!(output.contains("<em>ok</em>"));
    }
}
