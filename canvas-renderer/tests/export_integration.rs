//! Integration tests for scene export (canvas-renderer).
//!
//! Builds scenes through the public editing API and checks the serialized
//! SVG document end to end.

use canvas_core::{
    Bounds, LayerKind, LayerPatch, LayerTemplate, Scene, ShapeKind, TextProperties,
};
use canvas_renderer::export::{ExportFormat, SceneExporter};
use canvas_renderer::svg::{render_document, SvgOptions};

fn text_patch(content: &str, family: &str) -> LayerPatch {
    LayerPatch {
        kind: Some(LayerKind::Text(TextProperties {
            content: content.to_string(),
            font_family: family.to_string(),
            ..TextProperties::default()
        })),
        ..LayerPatch::default()
    }
}

fn export_svg(scene: &Scene) -> String {
    let bytes = SceneExporter::with_defaults()
        .export(scene, ExportFormat::Svg)
        .expect("svg export");
    String::from_utf8(bytes).expect("utf8")
}

#[test]
fn test_text_content_is_escaped() {
    let mut scene = Scene::default();
    let id = scene.add_layer(LayerTemplate::Text);
    scene.update_layer(id, &text_patch("A & B <C>", "Inter"));
    scene.take_snapshot();

    let svg = export_svg(&scene);
    assert!(svg.contains("A &amp; B &lt;C&gt;"));
    assert!(!svg.contains("A & B"));
}

#[test]
fn test_font_imports_deduplicated() {
    let mut scene = Scene::default();
    for (content, family) in [("one", "Lato"), ("two", "Lato"), ("three", "Georgia")] {
        let id = scene.add_layer(LayerTemplate::Text);
        scene.update_layer(id, &text_patch(content, family));
    }
    scene.take_snapshot();

    let svg = export_svg(&scene);
    assert_eq!(svg.matches("@import").count(), 1);
    assert!(svg.contains(
        "<defs><style>@import url('https://fonts.googleapis.com/css2?family=Lato&amp;display=swap');</style></defs>"
    ));
}

#[test]
fn test_no_defs_without_web_fonts() {
    let mut scene = Scene::default();
    scene.add_layer(LayerTemplate::Shape(ShapeKind::Heart));
    assert!(!export_svg(&scene).contains("<defs>"));
}

#[test]
fn test_group_children_nested_in_group_wrapper() {
    let mut scene = Scene::default();
    let a = scene.add_layer(LayerTemplate::Shape(ShapeKind::Square));
    scene.update_layer(a, &LayerPatch::bounds(Bounds::new(100.0, 100.0, 50.0, 50.0)));
    let b = scene.add_layer(LayerTemplate::Shape(ShapeKind::Circle));
    scene.update_layer(b, &LayerPatch::bounds(Bounds::new(200.0, 100.0, 50.0, 50.0)));
    scene.set_selected_layers(&[a, b]);
    scene.group_selected_layers().expect("group");

    let svg = export_svg(&scene);
    // group box is (100, 100); children are group-local
    assert!(svg.contains(
        r#"<g transform="translate(100, 100) rotate(0, 75, 25)" opacity="1"><g><g transform="translate(0, 0)"#
    ));
    assert!(svg.contains(r#"<g transform="translate(100, 0) rotate(0, 25, 25)" opacity="1"><ellipse"#));
}

#[test]
fn test_hidden_layers_excluded() {
    let mut scene = Scene::default();
    let id = scene.add_layer(LayerTemplate::Shape(ShapeKind::Square));
    let before = export_svg(&scene);
    assert!(before.contains("<rect width=\"100\""));

    scene.toggle_layer_visibility(id);
    let after = export_svg(&scene);
    assert_eq!(after.matches("<rect").count(), 1, "only the background remains");
}

#[test]
fn test_render_document_uses_custom_import_template() {
    let mut scene = Scene::default();
    let id = scene.add_layer(LayerTemplate::Text);
    scene.update_layer(id, &text_patch("hi", "Open Sans"));

    let opts = SvgOptions {
        font_import_url: "https://fonts.example.com/{family}.css".to_string(),
        ..SvgOptions::default()
    };
    let svg = render_document(&scene.render_view(), &opts);
    assert!(svg.contains("@import url('https://fonts.example.com/Open+Sans.css');"));
}
