//! Supported detector backends, recognition models, and named suites.
//!
//! The name sets mirror what the external verification capability accepts;
//! an unsupported name is a per-combination configuration error, never a
//! global abort.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendParseError {
    #[error("unsupported detector backend: {0}")]
    UnknownDetector(String),
    #[error("unsupported recognition model: {0}")]
    UnknownModel(String),
    #[error("unknown suite: {0} (expected full, quick, performance, speed or accuracy)")]
    UnknownSuite(String),
}

/// Face detection stage run before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorBackend {
    #[serde(rename = "opencv")]
    OpenCv,
    #[serde(rename = "ssd")]
    Ssd,
    #[serde(rename = "dlib")]
    Dlib,
    #[serde(rename = "mtcnn")]
    Mtcnn,
    #[serde(rename = "retinaface")]
    RetinaFace,
    #[serde(rename = "mediapipe")]
    MediaPipe,
    #[serde(rename = "yolov8")]
    YoloV8,
    #[serde(rename = "yunet")]
    YuNet,
}

impl DetectorBackend {
    pub const ALL: [DetectorBackend; 8] = [
        DetectorBackend::OpenCv,
        DetectorBackend::Ssd,
        DetectorBackend::Dlib,
        DetectorBackend::Mtcnn,
        DetectorBackend::RetinaFace,
        DetectorBackend::MediaPipe,
        DetectorBackend::YoloV8,
        DetectorBackend::YuNet,
    ];

    /// Canonical wire name as accepted by the verification capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorBackend::OpenCv => "opencv",
            DetectorBackend::Ssd => "ssd",
            DetectorBackend::Dlib => "dlib",
            DetectorBackend::Mtcnn => "mtcnn",
            DetectorBackend::RetinaFace => "retinaface",
            DetectorBackend::MediaPipe => "mediapipe",
            DetectorBackend::YoloV8 => "yolov8",
            DetectorBackend::YuNet => "yunet",
        }
    }
}

impl fmt::Display for DetectorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorBackend {
    type Err = BackendParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| BackendParseError::UnknownDetector(s.to_string()))
    }
}

/// Recognition stage producing the embedding/distance behind the match
/// decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecognitionModel {
    #[serde(rename = "VGG-Face")]
    VggFace,
    #[serde(rename = "Facenet")]
    Facenet,
    #[serde(rename = "Facenet512")]
    Facenet512,
    #[serde(rename = "OpenFace")]
    OpenFace,
    #[serde(rename = "DeepFace")]
    DeepFace,
    #[serde(rename = "DeepID")]
    DeepId,
    #[serde(rename = "ArcFace")]
    ArcFace,
    #[serde(rename = "Dlib")]
    Dlib,
    #[serde(rename = "SFace")]
    SFace,
}

impl RecognitionModel {
    pub const ALL: [RecognitionModel; 9] = [
        RecognitionModel::VggFace,
        RecognitionModel::Facenet,
        RecognitionModel::Facenet512,
        RecognitionModel::OpenFace,
        RecognitionModel::DeepFace,
        RecognitionModel::DeepId,
        RecognitionModel::ArcFace,
        RecognitionModel::Dlib,
        RecognitionModel::SFace,
    ];

    /// Canonical wire name as accepted by the verification capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionModel::VggFace => "VGG-Face",
            RecognitionModel::Facenet => "Facenet",
            RecognitionModel::Facenet512 => "Facenet512",
            RecognitionModel::OpenFace => "OpenFace",
            RecognitionModel::DeepFace => "DeepFace",
            RecognitionModel::DeepId => "DeepID",
            RecognitionModel::ArcFace => "ArcFace",
            RecognitionModel::Dlib => "Dlib",
            RecognitionModel::SFace => "SFace",
        }
    }
}

impl fmt::Display for RecognitionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecognitionModel {
    type Err = BackendParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| BackendParseError::UnknownModel(s.to_string()))
    }
}

/// Named benchmark suite: a preset subset of the detector × model grid.
///
/// `Quick` is the 3×3 popular subset; the rest trade coverage for focus on
/// speed or accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Full,
    Quick,
    Performance,
    Speed,
    Accuracy,
}

impl Suite {
    pub fn detectors(&self) -> &'static [DetectorBackend] {
        use DetectorBackend::*;
        match self {
            Suite::Full => &DetectorBackend::ALL,
            Suite::Quick => &[OpenCv, Mtcnn, RetinaFace],
            Suite::Performance => &[OpenCv, Mtcnn, RetinaFace, MediaPipe],
            Suite::Speed => &[OpenCv, MediaPipe],
            Suite::Accuracy => &[Mtcnn, RetinaFace],
        }
    }

    pub fn models(&self) -> &'static [RecognitionModel] {
        use RecognitionModel::*;
        match self {
            Suite::Full => &RecognitionModel::ALL,
            Suite::Quick => &[VggFace, Facenet, ArcFace],
            Suite::Performance => &[VggFace, Facenet, Facenet512, ArcFace],
            Suite::Speed => &[VggFace, OpenFace],
            Suite::Accuracy => &[Facenet512, ArcFace],
        }
    }
}

impl FromStr for Suite {
    type Err = BackendParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Suite::Full),
            "quick" => Ok(Suite::Quick),
            "performance" => Ok(Suite::Performance),
            "speed" => Ok(Suite::Speed),
            "accuracy" => Ok(Suite::Accuracy),
            other => Err(BackendParseError::UnknownSuite(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_roundtrip() {
        for detector in DetectorBackend::ALL {
            assert_eq!(detector.as_str().parse::<DetectorBackend>(), Ok(detector));
        }
    }

    #[test]
    fn test_model_roundtrip() {
        for model in RecognitionModel::ALL {
            assert_eq!(model.as_str().parse::<RecognitionModel>(), Ok(model));
        }
    }

    #[test]
    fn test_unknown_detector_rejected() {
        let err = "OpenCV".parse::<DetectorBackend>().unwrap_err();
        assert_eq!(err, BackendParseError::UnknownDetector("OpenCV".into()));
    }

    #[test]
    fn test_unknown_model_rejected() {
        // Wire names are case-sensitive: "vgg-face" is not a model.
        assert!("vgg-face".parse::<RecognitionModel>().is_err());
    }

    #[test]
    fn test_quick_suite_is_three_by_three() {
        assert_eq!(Suite::Quick.detectors().len(), 3);
        assert_eq!(Suite::Quick.models().len(), 3);
    }

    #[test]
    fn test_full_suite_covers_everything() {
        assert_eq!(Suite::Full.detectors(), &DetectorBackend::ALL);
        assert_eq!(Suite::Full.models(), &RecognitionModel::ALL);
    }

    #[test]
    fn test_suite_names_parse() {
        for (name, suite) in [
            ("full", Suite::Full),
            ("quick", Suite::Quick),
            ("performance", Suite::Performance),
            ("speed", Suite::Speed),
            ("accuracy", Suite::Accuracy),
        ] {
            assert_eq!(name.parse::<Suite>(), Ok(suite));
        }
        assert!("fast".parse::<Suite>().is_err());
    }

    #[test]
    fn test_wire_name_serde() {
        let json = serde_json::to_string(&RecognitionModel::VggFace).unwrap();
        assert_eq!(json, "\"VGG-Face\"");
        let back: RecognitionModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RecognitionModel::VggFace);
    }
}
