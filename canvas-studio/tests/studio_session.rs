//! Studio Session Integration Tests
//!
//! - Generated images flowing into a saved design
//! - Reopening from a file store in a new session
//! - Exporting the reopened design

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use canvas_core::{FileDesignStore, LayerKind};
use canvas_renderer::ExportFormat;
use canvas_studio::{
    GenerationError, GenerationRequest, ImageGenerator, NoticeLevel, Studio, Workflow,
};

struct SolidGenerator;

#[async_trait]
impl ImageGenerator for SolidGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        if request.prompt.is_empty() {
            return Err(GenerationError::Service("empty prompt".to_string()));
        }
        let img = image::RgbaImage::from_pixel(120, 60, image::Rgba([240, 200, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .map_err(|e| GenerationError::Service(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

fn session(dir: &std::path::Path) -> Studio {
    let store = FileDesignStore::new(dir).expect("store");
    Studio::new(Arc::new(store), Arc::new(SolidGenerator))
}

#[tokio::test]
async fn generated_image_survives_save_and_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut first = session(dir.path());
    let workflow = Workflow::Element {
        description: "a sun".to_string(),
        style: "flat".to_string(),
    };
    let id = first.run_workflow(&workflow, None).await.expect("generated");
    first.save("sunny").expect("save");

    let mut second = session(dir.path());
    second.open("sunny").expect("open");
    let layer = second.scene().layer(id).expect("image layer");
    match &layer.kind {
        LayerKind::Image(image) => assert!(image.src.starts_with("data:image/png;base64,")),
        other => panic!("expected image layer, got {}", other.type_name()),
    }
    assert!((layer.width - 120.0).abs() < f64::EPSILON);

    let svg = String::from_utf8(second.export(ExportFormat::Svg).expect("svg")).expect("utf8");
    assert!(svg.contains("<image width=\"120\" height=\"60\" href=\"data:image/png;base64,"));
}

#[tokio::test]
async fn brand_palette_is_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut studio = session(dir.path());
    let workflow = Workflow::BrandPalette {
        brand: "Marigold".to_string(),
        mood: "warm, cheerful".to_string(),
    };
    studio.run_workflow(&workflow, None).await.expect("palette");
    studio.save("brand").expect("save");

    let mut reopened = session(dir.path());
    reopened.open("brand").expect("open");
    assert_eq!(reopened.scene().brand_colors(), &["#f0c800".to_string()]);
}

#[test]
fn opening_damaged_design_reports_notice() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("broken.json"), "{ not json").expect("write");

    let mut studio = session(dir.path());
    assert!(studio.open("broken").is_err());
    assert!(studio.scene().is_empty());
    let notices = studio.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}
