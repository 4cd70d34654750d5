use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Layout hint passed to the recognizer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionMode {
    /// Uniform block of text
    Block,
    /// Single text line
    Line,
}

/// External text-recognition capability
///
/// Garbage or empty text is a normal `Ok` outcome; only transport or server
/// failures are errors.
pub trait TextRecognizer {
    fn recognize(&self, image: &DynamicImage, mode: RecognitionMode) -> Result<String, String>;
}

#[derive(Serialize)]
struct RecognizeRequest {
    image_base64: String,
    mode: RecognitionMode,
}

/// Single recognized text box with its corner points
#[derive(Deserialize, Clone, Debug)]
struct TextBox {
    #[serde(rename = "box")]
    bbox: Vec<Vec<f64>>,
    text: String,
    score: f64,
}

impl TextBox {
    /// Leftmost x-coordinate, for reading-order sorting
    fn left_x(&self) -> f64 {
        self.bbox
            .iter()
            .map(|p| p[0])
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(Deserialize)]
struct RecognizeResponse {
    boxes: Vec<TextBox>,
}

const MIN_BOX_SCORE: f64 = 0.3;

/// Blocking HTTP client for a local OCR server
///
/// Uploads the crop as a base64 PNG and joins the returned boxes into one
/// line of text in left-to-right order. The server process itself (model
/// loading, inference) is outside this crate.
#[derive(Clone)]
pub struct HttpOcrClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpOcrClient {
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:39835";

    /// Create a client for the given server URL
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Check if the server is up
    pub fn health_check(&self) -> Result<(), String> {
        let url = format!("{}/health", self.base_url);
        self.client
            .get(&url)
            .send()
            .map_err(|e| format!("OCR server health check failed: {}", e))?;
        Ok(())
    }

    /// Encode a crop as base64 PNG
    fn encode_image(image: &DynamicImage) -> Result<String, String> {
        let mut buffer = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                image::ImageFormat::Png,
            )
            .map_err(|e| format!("Failed to encode image: {}", e))?;
        Ok(general_purpose::STANDARD.encode(&buffer))
    }

    /// Drop low-confidence boxes and join the rest left to right
    fn join_boxes(boxes: Vec<TextBox>) -> String {
        let mut kept: Vec<TextBox> = boxes
            .into_iter()
            .filter(|b| b.score >= MIN_BOX_SCORE)
            .collect();

        kept.sort_by(|a, b| {
            a.left_x()
                .partial_cmp(&b.left_x())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        kept.iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TextRecognizer for HttpOcrClient {
    fn recognize(&self, image: &DynamicImage, mode: RecognitionMode) -> Result<String, String> {
        let image_base64 = Self::encode_image(image)?;
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&RecognizeRequest { image_base64, mode })
            .send()
            .map_err(|e| format!("OCR request failed: {}", e))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("OCR server error: {}", error_text));
        }

        let data: RecognizeResponse = response
            .json()
            .map_err(|e| format!("Failed to parse OCR response: {}", e))?;

        Ok(Self::join_boxes(data.boxes))
    }
}
