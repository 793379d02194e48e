//! End-to-end rendering of view directories with the MiniJinja engine.

use std::collections::BTreeMap;
use std::path::Path;

use insta::assert_snapshot;
use serde::Serialize;
use serde_json::json;
use tempfile::TempDir;
use vellum::{Context, Error, FnEngine, Renderer, Scope, ViewConfig};

struct Views {
    dir: TempDir,
}

impl Views {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn add(&self, file: &str, source: &str) -> &Self {
        let path = self.dir.path().join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, source).unwrap();
        self
    }

    fn renderer(&self) -> Renderer {
        Renderer::new(ViewConfig::new(self.dir.path())).unwrap()
    }
}

// ============================================================================
// Views and layouts
// ============================================================================

#[test]
fn view_without_layout_renders_its_text() {
    let views = Views::new();
    views.add("home.html", "Hello there");

    let mut renderer = views.renderer();
    assert_eq!(renderer.render("home", &json!({})).unwrap(), "Hello there");
}

#[test]
fn child_output_reaches_layout_as_content() {
    let views = Views::new();
    views
        .add("child.html", "{{ layout('parent') }}C")
        .add("parent.html", "{{ render_block('content', '') }}");

    let mut renderer = views.renderer();
    assert_eq!(renderer.render("child", &json!({})).unwrap(), "C");
}

#[test]
fn layouts_chain_until_one_sets_none() {
    let views = Views::new();
    views
        .add(
            "pages/profile.html",
            "{{ layout('layouts.app') }}\
             {% set title %}Profile of {{ user.name }}{% endset %}{{ block('title', title) }}\
             <p>{{ user.name }}</p>",
        )
        .add(
            "layouts/app.html",
            "{{ layout('layouts.base') }}<main>{{ render_block('content') }}</main>",
        )
        .add(
            "layouts/base.html",
            "<title>{{ render_block('title', site) }}</title><body>{{ render_block('content') }}</body>",
        );

    let mut renderer = views.renderer();
    renderer.add_global("site", &"Example").unwrap();

    let html = renderer
        .render("pages.profile", &json!({"user": {"name": "Ada"}}))
        .unwrap();
    assert_snapshot!(html, @"<title>Profile of Ada</title><body><main><p>Ada</p></main></body>");
}

#[test]
fn layouts_see_globals_but_not_params() {
    let views = Views::new();
    views
        .add("page.html", "{{ layout('frame') }}{{ title }}")
        .add(
            "frame.html",
            "{{ title }}|{{ name | default('no name') }}|{{ render_block('content') }}",
        );

    let mut renderer = views.renderer();
    renderer.add_global("title", &"Site").unwrap();

    let html = renderer
        .render("page", &json!({"title": "Page", "name": "Ada"}))
        .unwrap();
    assert_eq!(html, "Site|no name|Page");
}

#[test]
fn child_block_overrides_layout_default() {
    let views = Views::new();
    views
        .add("page.html", "{{ layout('frame') }}{{ block('title', 'Child') }}body")
        .add(
            "frame.html",
            "{{ block('title', 'Layout') }}{{ render_block('title') }}:{{ render_block('content') }}",
        );

    let mut renderer = views.renderer();
    assert_eq!(renderer.render("page", &()).unwrap(), "Child:body");
}

#[test]
fn params_from_a_struct() {
    #[derive(Serialize)]
    struct Greeting<'a> {
        name: &'a str,
        count: u32,
    }

    let views = Views::new();
    views.add("greet.html", "{{ name }} x{{ count }}");

    let mut renderer = views.renderer();
    let html = renderer
        .render("greet", &Greeting { name: "Ada", count: 2 })
        .unwrap();
    assert_eq!(html, "Ada x2");
}

#[test]
fn html_views_escape_values_but_not_blocks() {
    let views = Views::new();
    views
        .add("page.html", "{{ layout('frame') }}<b>{{ text }}</b>")
        .add("frame.html", "{{ render_block('content') }}");

    let mut renderer = views.renderer();
    let html = renderer.render("page", &json!({"text": "<i>"})).unwrap();
    assert_eq!(html, "<b>&lt;i&gt;</b>");
}

#[test]
fn block_values_are_escaped_like_output() {
    let views = Views::new();
    views
        .add("page.html", "{{ layout('frame') }}{{ block('title', name) }}{{ name | esc }}")
        .add(
            "frame.html",
            "<title>{{ render_block('title') }}</title>{{ render_block('content') }}",
        );

    let mut renderer = views.renderer();
    let html = renderer
        .render("page", &json!({"name": "<script>x</script>"}))
        .unwrap();
    assert_eq!(
        html,
        "<title>&lt;script&gt;x&lt;/script&gt;</title>&lt;script&gt;x&lt;/script&gt;"
    );
    assert!(!html.contains("<script>"));
}

#[test]
fn safe_block_values_and_defaults() {
    let views = Views::new();
    views.add(
        "page.html",
        "{% set nav %}<nav>{{ name }}</nav>{% endset %}{{ block('nav', nav) }}\
         {{ render_block('nav') }}|{{ render_block('missing', name) }}",
    );

    let mut renderer = views.renderer();
    let html = renderer.render("page", &json!({"name": "<b>"})).unwrap();
    assert_eq!(html, "<nav>&lt;b&gt;</nav>|&lt;b&gt;");
}

#[test]
fn missing_view_is_reported() {
    let views = Views::new();
    let mut renderer = views.renderer();

    match renderer.render("user.missing", &()) {
        Err(Error::ViewNotFound { view, path }) => {
            assert_eq!(view, "user.missing");
            assert!(path.ends_with("user/missing.html"));
        }
        other => panic!("expected ViewNotFound, got {:?}", other),
    }
}

// ============================================================================
// Resolution and configuration
// ============================================================================

#[test]
fn custom_extension() {
    let views = Views::new();
    views.add("mail/welcome.tpl", "Welcome");

    let config = ViewConfig::new(views.dir.path()).with_extension("tpl");
    let mut renderer = Renderer::new(config).unwrap();
    assert_eq!(renderer.render("mail.welcome", &()).unwrap(), "Welcome");
}

#[test]
fn empty_extension_uses_bare_file_names() {
    let views = Views::new();
    views.add("mail/welcome", "Bare");

    let config = ViewConfig::new(views.dir.path()).with_extension(".");
    let mut renderer = Renderer::new(config).unwrap();
    assert_eq!(renderer.render("mail.welcome", &()).unwrap(), "Bare");
}

#[test]
fn renderer_from_yaml_config() {
    let views = Views::new();
    views
        .add("templates/home.jinja", "From YAML")
        .add("vellum.yaml", "view_dir: templates\nextension: .jinja\n");

    let config = ViewConfig::from_yaml_file(views.dir.path().join("vellum.yaml")).unwrap();
    let mut renderer = Renderer::new(config).unwrap();
    assert_eq!(renderer.render("home", &()).unwrap(), "From YAML");
}

#[test]
fn missing_view_directory_is_config_error() {
    let views = Views::new();
    let config = ViewConfig::new(views.dir.path().join("nope"));
    assert!(matches!(Renderer::new(config), Err(Error::Config { .. })));
}

// ============================================================================
// Globals
// ============================================================================

#[test]
fn duplicate_global_keeps_first_value() {
    let views = Views::new();
    views.add("n.html", "{{ n }}");

    let mut renderer = views.renderer();
    renderer.add_global("n", &1).unwrap();
    assert!(matches!(
        renderer.add_global("n", &2),
        Err(Error::DuplicateGlobal { .. })
    ));

    assert_eq!(renderer.render("n", &()).unwrap(), "1");
}

#[test]
fn bulk_globals() {
    let views = Views::new();
    views.add("site.html", "{{ name }} {{ year }}");

    let mut renderer = views.renderer();
    renderer
        .add_globals(&json!({"name": "Example", "year": 2024}))
        .unwrap();
    assert!(matches!(
        renderer.add_globals(&json!("not a map")),
        Err(Error::InvalidGlobalKey { .. })
    ));

    let numbered: BTreeMap<u32, &str> = [(1, "one")].into_iter().collect();
    assert!(matches!(
        renderer.add_globals(&numbered),
        Err(Error::InvalidGlobalKey { .. })
    ));
    assert!(!renderer.globals().contains("1"));

    assert_eq!(renderer.render("site", &()).unwrap(), "Example 2024");
}

// ============================================================================
// Blocks outside of a render
// ============================================================================

#[test]
fn content_block_is_reserved() {
    let mut renderer = Views::new().renderer();
    assert!(matches!(
        renderer.block("content", "x"),
        Err(Error::ReservedBlockName)
    ));
}

#[test]
fn first_block_definition_wins() {
    let mut renderer = Views::new().renderer();
    renderer.block("x", "1").unwrap();
    renderer.block("x", "2").unwrap();
    assert_eq!(renderer.render_block("x", ""), "1");
}

#[test]
fn nested_capture_is_rejected() {
    let mut renderer = Views::new().renderer();
    renderer.begin_block("a").unwrap();

    assert!(matches!(
        renderer.begin_block("b"),
        Err(Error::NestedBlock { .. })
    ));
    assert_eq!(renderer.capture().name(), Some("a"));
}

#[test]
fn end_without_begin_is_rejected() {
    let mut renderer = Views::new().renderer();
    assert!(matches!(renderer.end_block(), Err(Error::BlockNotOpen)));
    assert!(renderer.capture().is_idle());
}

#[test]
fn capture_through_renderer_scope() {
    let mut renderer = Views::new().renderer();
    renderer.begin_block("footer").unwrap();
    renderer.scope().write("(c) 2024");
    renderer.end_block().unwrap();

    assert_eq!(renderer.render_block("footer", ""), "(c) 2024");
    assert_eq!(renderer.buffer_depth(), 0);
}

#[test]
fn blocks_persist_until_cleared() {
    let views = Views::new();
    views
        .add("a.html", "{{ block('title', 'A') }}")
        .add("b.html", "{{ block('title', 'B') }}{{ render_block('title') }}");

    let mut renderer = views.renderer();
    renderer.render("a", &()).unwrap();
    assert_eq!(renderer.render("b", &()).unwrap(), "A");

    renderer.clear_blocks();
    assert_eq!(renderer.render("b", &()).unwrap(), "B");
}

// ============================================================================
// Failure
// ============================================================================

#[test]
fn failed_render_restores_buffer_depth() {
    let views = Views::new();
    views
        .add("broken.html", "{{ layout('frame') }}partial {{ no_such_function() }}")
        .add("home.html", "home");

    let mut renderer = views.renderer();
    let before = renderer.buffer_depth();
    assert!(matches!(
        renderer.render("broken", &()),
        Err(Error::Template(_))
    ));
    assert_eq!(renderer.buffer_depth(), before);

    // The failed view's layout choice does not leak into the next render.
    assert_eq!(renderer.render("home", &()).unwrap(), "home");
}

#[test]
fn failed_render_leaves_outer_frames_open() {
    let views = Views::new();
    views.add("broken.html", "{{ no_such_function() }}");

    let mut renderer = views.renderer();
    renderer.begin_block("outer").unwrap();
    renderer.scope().write("kept");
    assert_eq!(renderer.buffer_depth(), 1);

    assert!(renderer.render("broken", &()).is_err());
    assert_eq!(renderer.buffer_depth(), 1);

    renderer.end_block().unwrap();
    assert_eq!(renderer.render_block("outer", ""), "kept");
}

#[test]
fn reserved_block_from_template_is_reported_unchanged() {
    let views = Views::new();
    views.add("bad.html", "{{ block('content', 'x') }}");

    let mut renderer = views.renderer();
    assert!(matches!(
        renderer.render("bad", &()),
        Err(Error::ReservedBlockName)
    ));
    assert_eq!(renderer.buffer_depth(), 0);
}

#[derive(Debug, PartialEq)]
enum AppError {
    Quota(u32),
    View(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::View(err.to_string())
    }
}

#[test]
fn engine_errors_reach_the_caller_unchanged() {
    let views = Views::new();
    views.add("report.html", "").add("ok.html", "");

    let engine = FnEngine::<_, AppError>::new(|path: &Path, _: &Context, scope: &mut Scope<'_>| {
        if path.ends_with("report.html") {
            scope.begin_block("summary")?;
            scope.write("half a report");
            return Err(AppError::Quota(7));
        }
        scope.write("ok");
        Ok(())
    });
    let mut renderer = Renderer::with_engine(ViewConfig::new(views.dir.path()), engine).unwrap();

    assert_eq!(renderer.render("report", &()), Err(AppError::Quota(7)));
    assert_eq!(renderer.buffer_depth(), 0);
    assert!(renderer.capture().is_idle());

    assert!(matches!(renderer.render("gone", &()), Err(AppError::View(_))));
    assert_eq!(renderer.render("ok", &()).unwrap(), "ok");
}

#[test]
fn esc_escapes_every_special_character() {
    let renderer = Views::new().renderer();
    let escaped = renderer.esc("<a>&\"'");
    assert_eq!(escaped, "&lt;a&gt;&amp;&quot;&#039;");
    assert!(!escaped.contains(['<', '>', '"', '\'']));
}
