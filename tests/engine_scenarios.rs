//! End-to-end engine scenarios against a synthetic backend.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};

use anyhow::Result;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use platekit::config::{ModuleConfig, ModuleConfigExtension, SubUnitConfig};
use platekit::engine::Engine;
use platekit::error::ErrorCode;
use platekit::geometry::{AffineMap, BoundingBox};
use platekit::image::{ImageFrame, PixelFormat};
use platekit::labels::DetectionLabel;
use platekit::results::{
    Detection, DetectionExtension, OcrHypothesis, PlateDimensions, TextLine, PLATE_TYPE_UNKNOWN,
};
use platekit::runtime::{
    BackendContext, BackendDetection, BackendError, BackendFactory, BackendResult, ModuleBackend,
};
use platekit::view::{load_view_config, write_view_config, CameraViewParams, ViewType};

/// Synthetic backend returning pre-programmed detections and readings.
#[derive(Clone, Default)]
struct MockBehavior {
    /// (confidence, rect) pairs emitted by the detector.
    detections: Vec<(f64, [f32; 4])>,
    /// (confidence, plate text) hypotheses emitted by OCR, in emission
    /// order; empty flags a false positive.
    readings: Vec<(f64, String)>,
}

fn reading(confidence: f64, text: &str) -> (f64, String) {
    (confidence, text.to_string())
}

struct MockBackend {
    behavior: MockBehavior,
    crops: bool,
}

impl ModuleBackend for MockBackend {
    fn detect(
        &mut self,
        image: &ImageFrame<'_>,
        _roi: &BoundingBox,
    ) -> BackendResult<Vec<BackendDetection>> {
        Ok(self
            .behavior
            .detections
            .iter()
            .map(|(confidence, [x, y, w, h])| {
                let position = BoundingBox::from_rect(*x, *y, *w, *h);
                let crop = self
                    .crops
                    .then(|| image.crop_gray(*x as u32, *y as u32, *w as u32, *h as u32));
                BackendDetection {
                    detection: Detection {
                        confidence: *confidence,
                        position,
                        label: DetectionLabel::LpEuOneLine,
                        crop,
                        affine_mapping: AffineMap::translation(*x as f64, *y as f64),
                    },
                    extension: DetectionExtension {
                        occlusion: 0.0,
                        truncated: 0,
                        cluster_id: 1,
                        cluster_confidence: 0.9,
                    },
                }
            })
            .collect())
    }

    fn recognize(
        &mut self,
        _image: &ImageFrame<'_>,
        _position: &BoundingBox,
        label: DetectionLabel,
    ) -> BackendResult<Vec<OcrHypothesis>> {
        if label == DetectionLabel::Adr {
            return Err(BackendError::LabelNotSupported(label));
        }
        if self.behavior.readings.is_empty() {
            return Ok(vec![OcrHypothesis {
                confidence: 0.05,
                text_lines: vec![],
                plate_type: PLATE_TYPE_UNKNOWN.to_string(),
                plate_type_confidence: 0.97,
                dimensions: PlateDimensions::default(),
                dimensions_confidence: 0.0,
                extension: None,
            }]);
        }
        Ok(self
            .behavior
            .readings
            .iter()
            .map(|(confidence, text)| OcrHypothesis {
                confidence: *confidence,
                text_lines: vec![TextLine {
                    line_confidence: *confidence,
                    characters: text.chars().collect(),
                    character_confidences: text.chars().map(|_| 0.95).collect(),
                }],
                plate_type: "CZ".to_string(),
                plate_type_confidence: 0.9,
                dimensions: PlateDimensions {
                    width_mm: 520,
                    height_mm: 110,
                },
                dimensions_confidence: 0.8,
                extension: None,
            })
            .collect())
    }
}

struct MockFactory {
    behavior: MockBehavior,
}

impl MockFactory {
    fn new(behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self { behavior })
    }
}

impl BackendFactory for MockFactory {
    fn open(&self, ctx: &BackendContext<'_>) -> BackendResult<Box<dyn ModuleBackend>> {
        Ok(Box::new(MockBackend {
            behavior: self.behavior.clone(),
            crops: ctx.descriptor.generate_crops,
        }))
    }
}

/// Factory whose backends share one persisted execution counter, the way
/// a module-side license file survives instance teardown.
struct CountedFactory {
    behavior: MockBehavior,
    remaining: Arc<AtomicU64>,
}

struct CountedBackend {
    inner: MockBackend,
    remaining: Arc<AtomicU64>,
}

impl ModuleBackend for CountedBackend {
    fn detect(
        &mut self,
        image: &ImageFrame<'_>,
        roi: &BoundingBox,
    ) -> BackendResult<Vec<BackendDetection>> {
        self.inner.detect(image, roi)
    }

    fn recognize(
        &mut self,
        image: &ImageFrame<'_>,
        position: &BoundingBox,
        label: DetectionLabel,
    ) -> BackendResult<Vec<OcrHypothesis>> {
        self.inner.recognize(image, position, label)
    }

    fn executions_left(&self) -> Option<u64> {
        Some(self.remaining.load(Ordering::SeqCst))
    }

    fn debit_execution(&mut self) {
        let _ = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            });
    }
}

impl BackendFactory for CountedFactory {
    fn open(&self, ctx: &BackendContext<'_>) -> BackendResult<Box<dyn ModuleBackend>> {
        Ok(Box::new(CountedBackend {
            inner: MockBackend {
                behavior: self.behavior.clone(),
                crops: ctx.descriptor.generate_crops,
            },
            remaining: self.remaining.clone(),
        }))
    }
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn write_module(root: &Path, dir: &str, body: &str) {
    let module_dir = root.join(dir);
    std::fs::create_dir_all(&module_dir).unwrap();
    std::fs::write(module_dir.join("module.toml"), body).unwrap();
}

fn eu_manifest(id: i32, name: &str, version: u32, subversion: u32, license: &str) -> String {
    format!(
        r#"
[module]
id = {id}
name = "{name}"
version = {version}
subversion = {subversion}
release_date = "2024-06-01"
runtime = "mock"

[detector]
kind = "frontal"
object = "lp"
generate_crops = true

[ocr]
regions = ["eu", "cz"]
recognition = "ceu3"
countries = "CZ,SK,A,D"
labels = [1000, 1001, 1002]
{license}
"#
    )
}

fn engine_with_one_module(tmp: &TempDir, behavior: MockBehavior, license: &str) -> Engine {
    init_tracing();
    write_module(tmp.path(), "anpr-eu", &eu_manifest(42, "anpr-eu", 7, 2, license));
    let mut engine = Engine::init(tmp.path()).unwrap();
    engine.register_backend("mock", MockFactory::new(behavior));
    engine
}

fn gray_image(width: u32, height: u32) -> Vec<u8> {
    vec![64u8; (width * height) as usize]
}

#[test]
fn empty_directory_initializes_with_zero_modules() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    let mut engine = Engine::init(tmp.path())?;
    assert_eq!(engine.num_modules(), 0);

    let data = gray_image(64, 64);
    let frame = ImageFrame::new(&data, 64, 64, PixelFormat::Gray8)?;
    let err = engine
        .run_det(0, &frame, &BoundingBox::full_frame(64, 64))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ModuleNotLoaded);
    assert_eq!(engine.last_error(), ErrorCode::ModuleNotLoaded);
    Ok(())
}

#[test]
fn version_resolution_within_a_module_family() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    write_module(tmp.path(), "fleet-v1", &eu_manifest(42, "fleet-v1", 1, 0, ""));
    write_module(tmp.path(), "fleet-v2", &eu_manifest(42, "fleet-v2", 2, 3, ""));

    let engine = Engine::init(tmp.path())?;
    assert_eq!(engine.num_modules(), 2);

    let latest = engine.module_index(42, 0, 0)?;
    let desc = engine.module_info(latest)?;
    assert_eq!((desc.version, desc.subversion), (2, 3));

    let v1 = engine.module_index(42, 1, 0)?;
    assert_eq!(engine.module_info(v1)?.version, 1);

    let err = engine.module_index(42, 9, 9).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ModuleNotFound);
    assert_eq!(engine.last_error(), ErrorCode::ModuleNotFound);
    assert_eq!(engine.last_error(), ErrorCode::Success);
    Ok(())
}

#[test]
fn view_config_roundtrip_and_load() -> Result<()> {
    let tmp = TempDir::new()?;
    let config_path = tmp.path().join("config_camera_view.ini");

    let params = CameraViewParams {
        view_type: ViewType::Frontal,
        min_horizontal_resolution: 115,
        max_horizontal_resolution: 260,
        density_ratio: 1.0,
    };
    write_view_config(&config_path, &params)?;
    let reloaded = load_view_config(Some(&config_path))?;
    assert_eq!(reloaded, params);

    let mut engine = engine_with_one_module(&tmp, MockBehavior::default(), "");
    let index = engine.module_index_by_name("anpr-eu")?;
    engine.load_module(index, Some(&reloaded), None)?;
    assert!(engine.is_loaded(index));
    Ok(())
}

#[test]
fn detection_and_ocr_on_full_frame() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![
            (0.72, [400.0, 600.0, 140.0, 32.0]),
            (0.95, [1500.0, 800.0, 120.0, 28.0]),
        ],
        readings: vec![reading(0.93, "1AB1234")],
    };
    let mut engine = engine_with_one_module(&tmp, behavior, "");
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(1920, 1080);
    let frame = ImageFrame::new(&data, 1920, 1080, PixelFormat::Gray8)?;
    let result = engine.run_det(index, &frame, &BoundingBox::full_frame(1920, 1080))?;

    assert_eq!(result.module_id, 42);
    assert_eq!(result.module_index, index);
    assert_eq!(result.num_detections(), 2);
    // Sorted best first.
    assert!(result.detections[0].confidence >= result.detections[1].confidence);
    for detection in &result.detections {
        assert!(detection.confidence >= 0.0);
        assert!(detection.position.within(1920, 1080));
        assert!(detection.crop.is_some());
    }
    assert_eq!(result.extensions.len(), result.num_detections());

    for detection in &result.detections {
        let ocr = engine.run_ocr(
            index,
            &frame,
            &detection.position,
            DetectionLabel::LpEuOneLine,
        )?;
        assert_eq!(ocr.module_id, 42);
        assert!(ocr.num_hypotheses() >= 1);
        let best = ocr.best().unwrap();
        assert_ne!(best.plate_type, PLATE_TYPE_UNKNOWN);
        let line = &best.text_lines[0];
        assert_eq!(line.len(), line.character_confidences.len());
        assert!(line
            .character_confidences
            .iter()
            .all(|c| (0.0..=1.0).contains(c)));
        assert_eq!(line.text(), "1AB1234");
    }
    Ok(())
}

#[test]
fn blank_patch_reads_as_false_positive() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![],
        readings: vec![],
    };
    let mut engine = engine_with_one_module(&tmp, behavior, "");
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(640, 480);
    let frame = ImageFrame::new(&data, 640, 480, PixelFormat::Gray8)?;
    let ocr = engine.run_ocr(
        index,
        &frame,
        &BoundingBox::from_rect(10.0, 10.0, 100.0, 30.0),
        DetectionLabel::LpEuOneLine,
    )?;
    assert!(ocr.best().unwrap().is_false_positive());
    Ok(())
}

#[test]
fn repeated_detection_calls() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![(0.9, [10.0, 10.0, 60.0, 14.0])],
        readings: vec![reading(0.9, "5T58829")],
    };
    let mut engine = engine_with_one_module(&tmp, behavior, "");
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(320, 240);
    let frame = ImageFrame::new(&data, 320, 240, PixelFormat::Gray8)?;
    let roi = BoundingBox::full_frame(320, 240);
    for _ in 0..1000 {
        let result = engine.run_det(index, &frame, &roi)?;
        assert_eq!(result.num_detections(), 1);
        // Result released here; each call is paired with a drop.
    }
    Ok(())
}

#[test]
fn invalid_directory_fails_init() {
    init_tracing();
    let err = Engine::init(Path::new("/nonexistent/modules")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DirectoryNotFound);
}

#[test]
fn descriptor_reference_is_stable() -> Result<()> {
    let tmp = TempDir::new()?;
    let engine = engine_with_one_module(&tmp, MockBehavior::default(), "");

    let first = engine.module_info(0)?;
    let second = engine.module_info(0)?;
    assert!(std::ptr::eq(first, second));
    assert!(engine.module_info(1).is_err());
    Ok(())
}

#[test]
fn quota_allows_exactly_n_detections() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![(0.9, [10.0, 10.0, 60.0, 14.0])],
        readings: vec![reading(0.9, "ABC123")],
    };
    let mut engine = engine_with_one_module(
        &tmp,
        behavior,
        "\n[license]\nvalid = true\nexecutions_left = 3\n",
    );
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(320, 240);
    let frame = ImageFrame::new(&data, 320, 240, PixelFormat::Gray8)?;
    let roi = BoundingBox::full_frame(320, 240);

    for _ in 0..3 {
        engine.run_det(index, &frame, &roi)?;
    }
    let err = engine.run_det(index, &frame, &roi).unwrap_err();
    assert_eq!(err.code(), ErrorCode::QuotaExhausted);
    assert!(!engine.module_info(index)?.is_active());

    // OCR is not metered by the execution counter.
    let ocr = engine.run_ocr(
        index,
        &frame,
        &BoundingBox::from_rect(10.0, 10.0, 60.0, 14.0),
        DetectionLabel::LpEuOneLine,
    );
    assert!(ocr.is_ok());
    Ok(())
}

#[test]
fn exhausted_quota_survives_free_and_reload() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![(0.9, [10.0, 10.0, 60.0, 14.0])],
        readings: vec![],
    };
    let mut engine = engine_with_one_module(
        &tmp,
        behavior,
        "\n[license]\nvalid = true\nexecutions_left = 1\n",
    );
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(320, 240);
    let frame = ImageFrame::new(&data, 320, 240, PixelFormat::Gray8)?;
    let roi = BoundingBox::full_frame(320, 240);

    engine.run_det(index, &frame, &roi)?;
    let err = engine.run_det(index, &frame, &roi).unwrap_err();
    assert_eq!(err.code(), ErrorCode::QuotaExhausted);

    // A free + reload pair must not mint a fresh quota.
    engine.free_module(index)?;
    let err = engine.load_module(index, None, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::QuotaExhausted);
    assert!(!engine.is_loaded(index));
    Ok(())
}

#[test]
fn persisted_counter_carries_across_reload() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    write_module(
        tmp.path(),
        "anpr-eu",
        &eu_manifest(
            42,
            "anpr-eu",
            7,
            2,
            "\n[license]\nvalid = true\nexecutions_left = 500\n",
        ),
    );
    let remaining = Arc::new(AtomicU64::new(2));
    let mut engine = Engine::init(tmp.path())?;
    engine.register_backend(
        "mock",
        Arc::new(CountedFactory {
            behavior: MockBehavior {
                detections: vec![(0.9, [10.0, 10.0, 60.0, 14.0])],
                readings: vec![],
            },
            remaining: remaining.clone(),
        }),
    );
    engine.load_module(0, None, None)?;

    let data = gray_image(320, 240);
    let frame = ImageFrame::new(&data, 320, 240, PixelFormat::Gray8)?;
    let roi = BoundingBox::full_frame(320, 240);
    engine.run_det(0, &frame, &roi)?;

    // The reloaded instance resumes from the module's own counter, not
    // the manifest value.
    engine.free_module(0)?;
    engine.load_module(0, None, None)?;
    engine.run_det(0, &frame, &roi)?;
    let err = engine.run_det(0, &frame, &roi).unwrap_err();
    assert_eq!(err.code(), ErrorCode::QuotaExhausted);
    assert_eq!(remaining.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn ocr_hypotheses_ranked_best_first() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![],
        readings: vec![
            reading(0.41, "4AB0441"),
            reading(0.88, "8AB0881"),
            reading(0.66, "6AB0661"),
        ],
    };
    let mut engine = engine_with_one_module(&tmp, behavior, "");
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(320, 240);
    let frame = ImageFrame::new(&data, 320, 240, PixelFormat::Gray8)?;
    let ocr = engine.run_ocr(
        index,
        &frame,
        &BoundingBox::from_rect(10.0, 10.0, 60.0, 14.0),
        DetectionLabel::LpEuOneLine,
    )?;

    assert_eq!(ocr.num_hypotheses(), 3);
    let best = ocr.best().unwrap();
    assert_eq!(best.confidence, 0.88);
    assert_eq!(best.text_lines[0].text(), "8AB0881");
    assert!(ocr
        .hypotheses
        .windows(2)
        .all(|pair| pair[0].confidence >= pair[1].confidence));
    Ok(())
}

#[test]
fn empty_clip_yields_zero_detections() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![(0.9, [10.0, 10.0, 60.0, 14.0])],
        readings: vec![],
    };
    let mut engine = engine_with_one_module(&tmp, behavior, "");
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(320, 240);
    let frame = ImageFrame::new(&data, 320, 240, PixelFormat::Gray8)?;
    // Region entirely outside the frame clips to nothing.
    let roi = BoundingBox::from_rect(-500.0, -500.0, 100.0, 100.0);
    let result = engine.run_det(index, &frame, &roi)?;
    assert_eq!(result.num_detections(), 0);
    Ok(())
}

#[test]
fn dispatch_against_unloaded_module_fails() -> Result<()> {
    let tmp = TempDir::new()?;
    let mut engine = engine_with_one_module(&tmp, MockBehavior::default(), "");
    let index = engine.module_index(42, 0, 0)?;

    let data = gray_image(64, 64);
    let frame = ImageFrame::new(&data, 64, 64, PixelFormat::Gray8)?;
    let err = engine
        .run_det(index, &frame, &BoundingBox::full_frame(64, 64))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ModuleNotLoaded);

    // Free on an unloaded index is a no-op returning success.
    engine.free_module(index)?;
    assert_eq!(engine.last_error(), ErrorCode::ModuleNotLoaded);
    assert_eq!(engine.last_error(), ErrorCode::Success);
    Ok(())
}

#[test]
fn disabled_sub_units_reject_dispatch() -> Result<()> {
    let tmp = TempDir::new()?;
    let mut engine = engine_with_one_module(&tmp, MockBehavior::default(), "");
    let index = engine.module_index(42, 0, 0)?;

    let config = ModuleConfig {
        extension: Some(ModuleConfigExtension {
            det: SubUnitConfig {
                disable: true,
                ..Default::default()
            },
            ocr: SubUnitConfig::default(),
        }),
        ..Default::default()
    };
    engine.load_module(index, None, Some(&config))?;

    let data = gray_image(64, 64);
    let frame = ImageFrame::new(&data, 64, 64, PixelFormat::Gray8)?;
    let err = engine
        .run_det(index, &frame, &BoundingBox::full_frame(64, 64))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SubUnitDisabled);

    // OCR stays available.
    let ocr = engine.run_ocr(
        index,
        &frame,
        &BoundingBox::from_rect(4.0, 4.0, 40.0, 12.0),
        DetectionLabel::LpEuOneLine,
    );
    assert!(ocr.is_ok());
    Ok(())
}

#[test]
fn unsupported_label_is_rejected() -> Result<()> {
    let tmp = TempDir::new()?;
    let behavior = MockBehavior {
        detections: vec![],
        readings: vec![reading(0.9, "X")],
    };
    let mut engine = engine_with_one_module(&tmp, behavior, "");
    let index = engine.module_index(42, 0, 0)?;
    engine.load_module(index, None, None)?;

    let data = gray_image(64, 64);
    let frame = ImageFrame::new(&data, 64, 64, PixelFormat::Gray8)?;
    // The manifest lists only LP labels; ADR is rejected before dispatch.
    let err = engine
        .run_ocr(
            index,
            &frame,
            &BoundingBox::from_rect(4.0, 4.0, 40.0, 12.0),
            DetectionLabel::Adr,
        )
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::LabelNotSupported);
    Ok(())
}

#[test]
fn reload_replaces_previous_instance() -> Result<()> {
    let tmp = TempDir::new()?;
    let mut engine = engine_with_one_module(&tmp, MockBehavior::default(), "");
    let index = engine.module_index(42, 0, 0)?;

    engine.load_module(index, None, None)?;
    assert!(engine.is_loaded(index));
    // Loading an already loaded index frees the previous instance first.
    engine.load_module(index, None, None)?;
    assert!(engine.is_loaded(index));

    engine.free_module(index)?;
    assert!(!engine.is_loaded(index));
    Ok(())
}

#[test]
fn invalid_license_blocks_load_and_clears_active_flag() -> Result<()> {
    let tmp = TempDir::new()?;
    let mut engine =
        engine_with_one_module(&tmp, MockBehavior::default(), "\n[license]\nvalid = false\n");
    let index = engine.module_index(42, 0, 0)?;

    let err = engine.load_module(index, None, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::LicenseInvalid);
    assert!(!engine.is_loaded(index));
    assert!(!engine.module_info(index)?.is_active());
    assert_eq!(engine.last_error(), ErrorCode::LicenseInvalid);
    Ok(())
}

#[test]
fn missing_backend_registration_fails_load() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    write_module(tmp.path(), "anpr-eu", &eu_manifest(42, "anpr-eu", 7, 2, ""));
    let mut engine = Engine::init(tmp.path())?;

    let err = engine.load_module(0, None, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ModuleLoadFailed);
    Ok(())
}

#[test]
fn crops_stripped_when_generation_disabled() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    write_module(
        tmp.path(),
        "no-crops",
        r#"
[module]
id = 5
name = "no-crops"
version = 1
subversion = 0
release_date = "2024-06-01"
runtime = "mock"

[detector]
kind = "generic"
object = "lp"
generate_crops = false
"#,
    );
    let mut engine = Engine::init(tmp.path())?;
    engine.register_backend(
        "mock",
        MockFactory::new(MockBehavior {
            detections: vec![(0.8, [5.0, 5.0, 30.0, 10.0])],
            readings: vec![],
        }),
    );
    engine.load_module(0, None, None)?;

    let data = gray_image(64, 64);
    let frame = ImageFrame::new(&data, 64, 64, PixelFormat::Gray8)?;
    let result = engine.run_det(0, &frame, &BoundingBox::full_frame(64, 64))?;
    assert_eq!(result.num_detections(), 1);
    assert!(result.detections[0].crop.is_none());
    Ok(())
}
