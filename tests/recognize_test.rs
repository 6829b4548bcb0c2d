use code_recognizer::{
    find_roi, CodeDecoder, CodeRecognizer, RecognizeError, RecognizeOptions, RecognizerConfig,
    Roi, SymbolType, TextEngine,
};
use image::{DynamicImage, GrayImage, Luma};
use pretty_assertions::assert_eq;
use rxing::{BarcodeFormat, Writer};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Decoder that never finds anything but remembers what it was given
#[derive(Default)]
struct RecordingDecoder {
    seen: Mutex<Vec<(u32, u32)>>,
}

impl CodeDecoder for RecordingDecoder {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn decode(&self, binary: &GrayImage) -> Result<Vec<String>, RecognizeError> {
        self.seen.lock().unwrap().push(binary.dimensions());
        Ok(Vec::new())
    }
}

struct FailingDecoder;

impl CodeDecoder for FailingDecoder {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn decode(&self, _binary: &GrayImage) -> Result<Vec<String>, RecognizeError> {
        Err(RecognizeError::DecodeError("timed out".to_string()))
    }
}

/// Text engine that spells out every pixel, so equal output means equal images
#[derive(Default)]
struct PixelEngine {
    calls: AtomicUsize,
}

impl TextEngine for PixelEngine {
    fn name(&self) -> &'static str {
        "pixels"
    }

    fn description(&self) -> &'static str {
        "lists luma values row by row"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, RecognizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gray = image.to_luma8();
        Ok(gray
            .rows()
            .map(|row| {
                row.map(|p| p.0[0].to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect())
    }
}

struct SilentEngine;

impl TextEngine for SilentEngine {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn description(&self) -> &'static str {
        "never recognizes anything"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<String>, RecognizeError> {
        Ok(Vec::new())
    }
}

fn recognizer_with(
    log_dir: &Path,
    decoder: Arc<dyn CodeDecoder>,
    text: Arc<dyn TextEngine>,
) -> CodeRecognizer {
    let config = RecognizerConfig::default().with_log_dir(log_dir);
    CodeRecognizer::with_collaborators(config, decoder.clone(), decoder, text)
}

fn blank_image() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 120, Luma([255])))
}

fn count_artifacts(log_dir: &Path) -> usize {
    let mut count = 0;
    for dir in std::fs::read_dir(log_dir).unwrap() {
        let dir = dir.unwrap().path();
        if dir.is_dir() {
            count += std::fs::read_dir(&dir)
                .unwrap()
                .filter(|f| {
                    f.as_ref()
                        .unwrap()
                        .file_name()
                        .to_string_lossy()
                        .contains("_code_failed_")
                })
                .count();
        }
    }
    count
}

fn render_qr(payload: &str, scale: u32, canvas: u32, offset: u32) -> DynamicImage {
    let code = qrcode::QrCode::new(payload.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let img = GrayImage::from_fn(canvas, canvas, |x, y| {
        let size = modules * scale;
        if x < offset || y < offset || x >= offset + size || y >= offset + size {
            return Luma([255]);
        }
        let mx = (x - offset) / scale;
        let my = (y - offset) / scale;
        match colors[(my * modules + mx) as usize] {
            qrcode::Color::Dark => Luma([0]),
            qrcode::Color::Light => Luma([255]),
        }
    });
    DynamicImage::ImageLuma8(img)
}

fn render_datamatrix(payload: &str, scale: u32, canvas: u32) -> DynamicImage {
    // Zero requested size gives one matrix cell per module, no margin
    let matrix = rxing::datamatrix::DataMatrixWriter
        .encode(payload, &BarcodeFormat::DATA_MATRIX, 0, 0)
        .unwrap();
    let (cols, rows) = (matrix.getWidth(), matrix.getHeight());
    let (left, top) = ((canvas - cols * scale) / 2, (canvas - rows * scale) / 2);

    let img = GrayImage::from_fn(canvas, canvas, |x, y| {
        if x < left || y < top || x >= left + cols * scale || y >= top + rows * scale {
            return Luma([255]);
        }
        if matrix.get((x - left) / scale, (y - top) / scale) {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    DynamicImage::ImageLuma8(img)
}

#[test]
fn test_blank_image_returns_empty_for_every_symbol_type() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = recognizer_with(
        tmp.path(),
        Arc::new(RecordingDecoder::default()),
        Arc::new(SilentEngine),
    );

    for symbol in [
        SymbolType::DataMatrix,
        SymbolType::Qr,
        SymbolType::CharacterString,
    ] {
        let result = recognizer
            .recognize(&blank_image(), symbol, &RecognizeOptions::default())
            .unwrap();
        assert!(result.is_empty(), "{} returned {:?}", symbol, result);
    }

    // Nothing is written unless asked for
    assert_eq!(count_artifacts(tmp.path()), 0);
}

#[test]
fn test_failure_saves_exactly_one_artifact_per_call() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = recognizer_with(
        tmp.path(),
        Arc::new(RecordingDecoder::default()),
        Arc::new(SilentEngine),
    );
    let options = RecognizeOptions::default().save_on_failure(true);

    let mut expected = 0;
    for symbol in [
        SymbolType::DataMatrix,
        SymbolType::Qr,
        SymbolType::CharacterString,
    ] {
        let result = recognizer.recognize(&blank_image(), symbol, &options).unwrap();
        assert!(result.is_empty());
        expected += 1;
        assert_eq!(count_artifacts(tmp.path()), expected);
    }
}

#[test]
fn test_decoder_failure_folds_into_empty_result() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = recognizer_with(tmp.path(), Arc::new(FailingDecoder), Arc::new(SilentEngine));

    let mut img = GrayImage::from_pixel(100, 100, Luma([255]));
    for y in 20..60 {
        for x in 20..60 {
            img.put_pixel(x, y, Luma([0]));
        }
    }
    let options = RecognizeOptions::default().save_on_failure(true);

    let result = recognizer
        .recognize(&DynamicImage::ImageLuma8(img), SymbolType::DataMatrix, &options)
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(count_artifacts(tmp.path()), 1);
}

#[test]
fn test_roi_capture_crops_before_decoding() {
    let tmp = tempfile::tempdir().unwrap();
    let decoder = Arc::new(RecordingDecoder::default());
    let recognizer = recognizer_with(tmp.path(), decoder.clone(), Arc::new(SilentEngine));

    // 600x600 with a 200x200 block; scaled by 1/2 the block is 100x100
    let mut img = GrayImage::from_pixel(600, 600, Luma([240]));
    for y in 100..300 {
        for x in 300..500 {
            img.put_pixel(x, y, Luma([10]));
        }
    }
    let img = DynamicImage::ImageLuma8(img);

    recognizer
        .recognize(&img, SymbolType::Qr, &RecognizeOptions::default())
        .unwrap();
    recognizer
        .recognize(&img, SymbolType::Qr, &RecognizeOptions::default().capture_roi(false))
        .unwrap();

    let seen = decoder.seen.lock().unwrap().clone();
    let quiet_zone = RecognizerConfig::default().quiet_zone;
    let (cropped_w, cropped_h) = seen[0];
    assert!((100..=102).contains(&(cropped_w - 2 * quiet_zone)), "{:?}", seen);
    assert!((100..=102).contains(&(cropped_h - 2 * quiet_zone)), "{:?}", seen);
    assert_eq!(seen[1], (300, 300));
}

#[test]
fn test_rotation_correction_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = Arc::new(PixelEngine::default());
    let recognizer = recognizer_with(
        tmp.path(),
        Arc::new(RecordingDecoder::default()),
        engine.clone(),
    );

    // Asymmetric 3x2 image so every rotation is distinguishable
    let upright = DynamicImage::ImageLuma8(GrayImage::from_fn(3, 2, |x, y| {
        Luma([(y * 3 + x) as u8 * 20])
    }));
    let expected = recognizer
        .recognize(&upright, SymbolType::CharacterString, &RecognizeOptions::default())
        .unwrap();

    // Rotating the upright image clockwise by R needs an R counter-clockwise fix
    let cases = [
        (90, upright.rotate90()),
        (180, upright.rotate180()),
        (270, upright.rotate270()),
    ];
    for (rotation, rotated) in cases {
        let result = recognizer
            .recognize(
                &rotated,
                SymbolType::CharacterString,
                &RecognizeOptions::default().rotation(rotation),
            )
            .unwrap();
        assert_eq!(result, expected, "rotation {}", rotation);
    }
    assert_eq!(engine.calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_invalid_rotation_is_rejected_without_side_effects() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = Arc::new(PixelEngine::default());
    let recognizer = recognizer_with(
        tmp.path(),
        Arc::new(RecordingDecoder::default()),
        engine.clone(),
    );
    let options = RecognizeOptions::default()
        .rotation(45)
        .save_on_failure(true);

    let err = recognizer
        .recognize(&blank_image(), SymbolType::CharacterString, &options)
        .unwrap_err();

    assert!(matches!(err, RecognizeError::InvalidArgument(_)));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn test_rotation_is_ignored_for_matrix_codes() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = recognizer_with(
        tmp.path(),
        Arc::new(RecordingDecoder::default()),
        Arc::new(SilentEngine),
    );

    let result = recognizer.recognize(
        &blank_image(),
        SymbolType::DataMatrix,
        &RecognizeOptions::default().rotation(45),
    );

    assert!(result.unwrap().is_empty());
}

#[test]
fn test_find_roi_picks_larger_square() {
    let mut img = GrayImage::from_pixel(200, 160, Luma([255]));
    for y in 10..30 {
        for x in 10..30 {
            img.put_pixel(x, y, Luma([0]));
        }
    }
    for y in 60..130 {
        for x in 90..170 {
            img.put_pixel(x, y, Luma([0]));
        }
    }

    assert_eq!(
        find_roi(&img).unwrap(),
        Roi {
            x: 90,
            y: 60,
            width: 80,
            height: 70
        }
    );
}

#[test]
fn test_concurrent_failures_produce_distinct_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = Arc::new(recognizer_with(
        tmp.path(),
        Arc::new(RecordingDecoder::default()),
        Arc::new(SilentEngine),
    ));
    let options = RecognizeOptions::default().save_on_failure(true);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let recognizer = recognizer.clone();
            thread::spawn(move || {
                recognizer
                    .recognize(&blank_image(), SymbolType::Qr, &options)
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_empty());
    }

    assert_eq!(count_artifacts(tmp.path()), 8);
}

#[test]
fn test_real_qr_code_decodes_with_and_without_roi() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = CodeRecognizer::new(RecognizerConfig::default().with_log_dir(tmp.path()));
    // 21 modules at 20px on a 600px canvas: 10px modules after rescaling
    let img = render_qr("SN-2024-0617", 20, 600, 90);

    let with_roi = recognizer
        .recognize(&img, SymbolType::Qr, &RecognizeOptions::default())
        .unwrap();
    let without_roi = recognizer
        .recognize(&img, SymbolType::Qr, &RecognizeOptions::default().capture_roi(false))
        .unwrap();

    assert_eq!(with_roi, vec!["SN-2024-0617".to_string()]);
    assert_eq!(without_roi, vec!["SN-2024-0617".to_string()]);
}

#[test]
fn test_real_datamatrix_decodes_with_and_without_roi() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = CodeRecognizer::new(RecognizerConfig::default().with_log_dir(tmp.path()));
    let img = render_datamatrix("SN20240617", 24, 600);

    let with_roi = recognizer
        .recognize(&img, SymbolType::DataMatrix, &RecognizeOptions::default())
        .unwrap();
    let without_roi = recognizer
        .recognize(
            &img,
            SymbolType::DataMatrix,
            &RecognizeOptions::default().capture_roi(false),
        )
        .unwrap();

    assert_eq!(with_roi, vec!["SN20240617".to_string()]);
    assert_eq!(without_roi, vec!["SN20240617".to_string()]);
}

#[test]
fn test_unwritable_log_dir_keeps_empty_result() {
    let tmp = tempfile::tempdir().unwrap();
    // A regular file where the log directory should be
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();
    let recognizer = recognizer_with(
        &blocker,
        Arc::new(RecordingDecoder::default()),
        Arc::new(SilentEngine),
    );
    let options = RecognizeOptions::default().save_on_failure(true);

    for symbol in [
        SymbolType::DataMatrix,
        SymbolType::Qr,
        SymbolType::CharacterString,
    ] {
        let result = recognizer.recognize(&blank_image(), symbol, &options);
        assert_eq!(result.unwrap(), Vec::<String>::new(), "{}", symbol);
    }
    assert!(blocker.is_file());
}

#[test]
fn test_unknown_symbol_tag_is_invalid_argument() {
    let err = "EAN13".parse::<SymbolType>().unwrap_err();
    assert!(matches!(err, RecognizeError::InvalidArgument(_)));
}
