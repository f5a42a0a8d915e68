use std::{path::PathBuf, sync::Arc};

pub use minijinja::{Environment, Value};
pub use minijinja_embed;
use minijinja::path_loader;
use minijinja_autoreload::AutoReloader;

pub trait ProvidesTemplateEngine {
    fn template_engine(&self) -> &Arc<TemplateEngine>;
}

/// Page templates, either watched on disk or loaded once up front.
#[derive(Clone)]
pub enum TemplateEngine {
    /// Re-reads the template directory when a file changes.
    Watching(Arc<AutoReloader>),
    /// A fixed environment, e.g. templates compiled into the binary.
    Fixed(Arc<Environment<'static>>),
}

/// Environment settings shared by every page, however the templates are loaded.
fn prepare(env: &mut Environment<'static>) {
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    minijinja_contrib::add_to_environment(env);
}

impl TemplateEngine {
    pub fn watching(template_dir: PathBuf) -> Self {
        let reloader = AutoReloader::new(move |notifier| {
            let mut env = Environment::new();
            env.set_loader(path_loader(&template_dir));
            notifier.set_fast_reload(true);
            notifier.watch_path(&template_dir, true);
            prepare(&mut env);
            Ok(env)
        });
        Self::Watching(Arc::new(reloader))
    }

    pub fn fixed(mut env: Environment<'static>) -> Self {
        prepare(&mut env);
        Self::Fixed(Arc::new(env))
    }

    pub fn render(&self, name: &str, ctx: &Value) -> Result<String, minijinja::Error> {
        match self {
            Self::Watching(reloader) => {
                let env = reloader.acquire_env()?;
                let template = env.get_template(name)?;
                template.render(ctx)
            }
            Self::Fixed(env) => env.get_template(name)?.render(ctx),
        }
    }
}

/// Builds the engine for the calling crate's template directory.
///
/// Debug builds watch `$CARGO_MANIFEST_DIR/<dir>`; release builds use the
/// templates embedded by `minijinja_embed::embed_templates!` in the calling
/// crate's `build.rs`.
#[macro_export]
macro_rules! create_template_engine {
    ($relative_path:expr) => {{
        #[cfg(debug_assertions)]
        {
            $crate::utils::template_engine::TemplateEngine::watching(
                std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join($relative_path),
            )
        }
        #[cfg(not(debug_assertions))]
        {
            let mut env = $crate::utils::template_engine::Environment::new();
            $crate::utils::template_engine::minijinja_embed::load_templates!(&mut env);
            $crate::utils::template_engine::TemplateEngine::fixed(env)
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine_with(name: &'static str, source: &'static str) -> TemplateEngine {
        let mut env = Environment::new();
        env.add_template(name, source).expect("template");
        TemplateEngine::fixed(env)
    }

    #[test]
    fn fixed_engine_renders_context() {
        let engine = engine_with("hello.txt", "Hello {{ name }}");

        let out = engine
            .render("hello.txt", &Value::from_serialize(json!({ "name": "maps" })))
            .expect("render");

        assert_eq!(out, "Hello maps");
    }

    #[test]
    fn query_strings_are_urlencoded() {
        let engine = engine_with("link.html", "/search?q={{ q | urlencode }}&offset=10");

        let out = engine
            .render("link.html", &Value::from_serialize(json!({ "q": "maps & more" })))
            .expect("render");

        assert_eq!(out, "/search?q=maps%20%26%20more&offset=10");
    }

    #[test]
    fn unknown_templates_are_errors() {
        let engine = engine_with("hello.txt", "Hello");

        assert!(engine.render("missing.html", &Value::from(())).is_err());
    }
}
