//! Template rendering
//!
//! Templates are Jinja-style files rendered with tera. Every `*.jinja2`
//! file of a template directory is loaded together so templates may extend
//! or include their siblings. Rendering is strict: a variable the context
//! does not bind fails the render instead of producing an empty string.

pub mod device;

pub use device::device_descriptor;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use tera::{Context, Tera};

use crate::constants::TEMPLATE_EXTENSION;
use crate::error::{GenError, Result};
use crate::output;

/// All templates of one asset directory
pub struct TemplateSet {
    tera: Tera,
    dir: Utf8PathBuf,
}

impl TemplateSet {
    /// Load every `*.jinja2` file found directly under `dir`
    pub fn load<P: AsRef<Utf8Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GenError::MissingAsset(dir.to_path_buf()));
        }

        let tera = Tera::new(&format!("{}/*.{}", dir, TEMPLATE_EXTENSION)).map_err(|source| {
            GenError::Template {
                template: dir.to_string(),
                source,
            }
        })?;
        debug!(
            "Loaded {} template(s) from {}",
            tera.get_template_names().count(),
            dir
        );

        Ok(Self {
            tera,
            dir: dir.to_path_buf(),
        })
    }

    /// Render a loaded template; a name that was not loaded is a missing
    /// asset, an unbound variable a template error
    pub fn render(&self, template: &str, context: &Context) -> Result<String> {
        if !self.tera.get_template_names().any(|name| name == template) {
            return Err(GenError::MissingAsset(self.dir.join(template)));
        }

        self.tera
            .render(template, context)
            .map_err(|source| GenError::Template {
                template: template.to_string(),
                source,
            })
    }

    /// Render `template` and write the result to `target`
    pub fn render_to(&self, template: &str, context: &Context, target: &Utf8Path) -> Result<()> {
        let rendered = self.render(template, context)?;
        output::write_file(target, &rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn template_dir(files: &[(&str, &str)]) -> (tempfile::TempDir, Utf8PathBuf) {
        let temp_dir = tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
        (temp_dir, dir)
    }

    #[test]
    fn test_render_with_context() {
        let (_guard, dir) = template_dir(&[("greeting.jinja2", "port={{ PORT }}")]);
        let templates = TemplateSet::load(&dir).unwrap();

        let mut context = Context::new();
        context.insert("PORT", &5555);
        assert_eq!(templates.render("greeting.jinja2", &context).unwrap(), "port=5555");
    }

    #[test]
    fn test_undefined_variable_is_an_error() {
        let (_guard, dir) = template_dir(&[("conf.jinja2", "user={{ POSTGRES_USER }}")]);
        let templates = TemplateSet::load(&dir).unwrap();

        let err = templates.render("conf.jinja2", &Context::new()).unwrap_err();
        assert!(matches!(err, GenError::Template { ref template, .. } if template == "conf.jinja2"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_templates_can_extend_siblings() {
        let (_guard, dir) = template_dir(&[
            ("base.jinja2", "[{% block body %}{% endblock body %}]"),
            ("child.jinja2", "{% extends \"base.jinja2\" %}{% block body %}x{% endblock body %}"),
            ("notes.txt", "{{ not a template"),
        ]);
        let templates = TemplateSet::load(&dir).unwrap();
        assert_eq!(templates.render("child.jinja2", &Context::new()).unwrap(), "[x]");
    }

    #[test]
    fn test_only_top_level_templates_are_loaded() {
        let (_guard, dir) = template_dir(&[("top.jinja2", "top")]);
        std::fs::create_dir(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested/inner.jinja2"), "inner").unwrap();

        let templates = TemplateSet::load(&dir).unwrap();
        assert_eq!(templates.render("top.jinja2", &Context::new()).unwrap(), "top");
        assert!(matches!(
            templates.render("nested/inner.jinja2", &Context::new()),
            Err(GenError::MissingAsset(_))
        ));
    }

    #[test]
    fn test_broken_template_fails_to_load() {
        let (_guard, dir) = template_dir(&[("broken.jinja2", "{% if %}")]);
        let err = TemplateSet::load(&dir).err().unwrap();
        assert!(matches!(err, GenError::Template { ref template, .. } if template == dir.as_str()));
    }

    #[test]
    fn test_unknown_template_is_missing_asset() {
        let (_guard, dir) = template_dir(&[]);
        let templates = TemplateSet::load(&dir).unwrap();
        let err = templates.render("absent.jinja2", &Context::new()).unwrap_err();
        assert!(matches!(err, GenError::MissingAsset(_)));
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            TemplateSet::load("/nonexistent/templates"),
            Err(GenError::MissingAsset(_))
        ));
    }
}
