use anyhow::Context as _;
use tera::Tera;

/// Tera engine holding inline templates only.
///
/// Autoescaping is disabled: every template renders plain text for the model.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        Self { tera }
    }

    /// Build an engine with every `(name, source)` pair registered.
    pub fn with_templates(templates: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut engine = Self::new();
        for (name, source) in templates {
            engine.add_template(name, source)?;
        }
        Ok(engine)
    }

    pub fn add_template(&mut self, name: &str, source: &str) -> anyhow::Result<()> {
        self.tera
            .add_raw_template(name, source)
            .with_context(|| format!("invalid template `{name}`"))
    }

    pub fn render(&self, name: &str, context: &tera::Context) -> anyhow::Result<String> {
        self.tera
            .render(name, context)
            .with_context(|| format!("failed to render template `{name}`"))
    }
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self::new()
    }
}
