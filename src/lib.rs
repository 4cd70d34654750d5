pub mod models;
pub mod services;

pub use models::config::SearchTuning;
pub use models::detection::{
    BattleSequence, CutPoint, Detection, Direction, FrameClass, TextBoundary,
};
pub use models::profile::{
    Generation, GenerationProfile, PatternFamily, Platform, PreprocessingMode, ProfileRegistry,
};
pub use models::region::Region;
pub use models::trainer::{TrainerIdentity, TrainerPattern};
pub use services::boundary::BoundarySearch;
pub use services::cut_search::TransitionSearch;
pub use services::detector::{Analysis, BattleDetector};
pub use services::frame_source::{FrameSource, ImageSequenceSource};
pub use services::ocr::{HttpOcrClient, RecognitionMode, TextExtractor, TextRecognizer};
pub use services::transition::TransitionFrameScanner;
