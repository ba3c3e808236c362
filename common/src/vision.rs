//! 画像ラベル（AWS Rekognition 出力）からの体型・顔型推定
//!
//! `aws rekognition detect-labels` / `detect-faces` の JSON をそのまま
//! デシリアライズし、ラベル名と顔のバウンディングボックスから
//! 簡易的なヒューリスティックで分類する。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================
// Rekognition の出力（PascalCase）
// ============================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsOutput {
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectFacesOutput {
    #[serde(default)]
    pub face_details: Vec<FaceDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Landmark {
    #[serde(rename = "Type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quality {
    pub brightness: Option<f64>,
    pub sharpness: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute<T> {
    pub value: T,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgeRange {
    pub low: u32,
    pub high: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Emotion {
    #[serde(rename = "Type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceDetail {
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    pub quality: Option<Quality>,
    pub eyes_open: Option<Attribute<bool>>,
    pub mouth_open: Option<Attribute<bool>>,
    pub smile: Option<Attribute<bool>>,
    pub eyeglasses: Option<Attribute<bool>>,
    pub sunglasses: Option<Attribute<bool>>,
    pub gender: Option<Attribute<String>>,
    pub age_range: Option<AgeRange>,
    #[serde(default)]
    pub emotions: Vec<Emotion>,
}

// ============================================
// 分類結果
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Athletic,
    Tall,
    Petite,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightProportion {
    Tall,
    Short,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyShape {
    Rectangle,
    Triangle,
    InvertedTriangle,
    Hourglass,
    Pear,
    Apple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinTone {
    Fair,
    Light,
    Medium,
    Tan,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceShape {
    Oval,
    Oblong,
    Round,
    Square,
    Heart,
    Triangle,
}

/// 全身写真の分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyAnalysis {
    pub body_type: BodyType,
    pub height_proportion: HeightProportion,
    pub body_shape: BodyShape,
    pub skin_tone: SkinTone,
    pub posture: String,
    pub fit_recommendations: Vec<String>,
    pub style_suggestions: Vec<String>,
    pub raw_labels: Vec<String>,
    pub face_count: usize,
}

/// 顔の特徴
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceFeatures {
    pub facial_features: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyes_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smile: Option<bool>,
    #[serde(default)]
    pub eyeglasses: bool,
    #[serde(default)]
    pub sunglasses: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
}

/// 顔写真の分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnalysis {
    pub face_shape: FaceShape,
    pub skin_tone: SkinTone,
    pub features: FaceFeatures,
    pub hairstyle_recommendations: Vec<String>,
    pub accessory_recommendations: Vec<String>,
    pub makeup_suggestions: Vec<String>,
    pub age_range: Option<String>,
    pub gender: Option<String>,
    pub emotions: Option<String>,
}

// ============================================
// 分析
// ============================================

/// 全身写真のラベルと顔情報から分析
pub fn analyze_body(labels: &[Label], faces: &[FaceDetail]) -> BodyAnalysis {
    let names: Vec<String> = labels.iter().map(|l| l.name.to_lowercase()).collect();
    let any = |needle: &str| names.iter().any(|n| n.contains(needle));

    let body_type = if any("athlete") || any("sport") {
        BodyType::Athletic
    } else if any("person") && any("tall") {
        BodyType::Tall
    } else if any("person") && any("short") {
        BodyType::Petite
    } else {
        BodyType::Average
    };

    let height_proportion = if any("tall") {
        HeightProportion::Tall
    } else if any("short") {
        HeightProportion::Short
    } else {
        match faces.first().and_then(|f| f.bounding_box) {
            Some(b) if b.width > 0.0 && b.height / b.width > 1.3 => HeightProportion::Tall,
            Some(b) if b.width > 0.0 && b.height / b.width < 0.9 => HeightProportion::Short,
            _ => HeightProportion::Average,
        }
    };

    // ラベルから体型シルエットは取れないので既定値
    let body_shape = BodyShape::Rectangle;

    let skin_tone = faces
        .first()
        .and_then(|f| f.quality)
        .map(|q| skin_tone_from_brightness(q.brightness))
        .unwrap_or(SkinTone::Medium);

    let posture = if any("standing") {
        "Standing posture detected"
    } else if any("sitting") {
        "Sitting posture detected"
    } else {
        "Neutral posture detected"
    };

    BodyAnalysis {
        body_type,
        height_proportion,
        body_shape,
        skin_tone,
        posture: posture.to_string(),
        fit_recommendations: fit_recommendations(body_type, body_shape),
        style_suggestions: style_suggestions(body_shape, height_proportion),
        raw_labels: labels.iter().map(|l| l.name.clone()).collect(),
        face_count: faces.len(),
    }
}

/// 顔写真の分析（先頭の顔のみ）
pub fn analyze_face(faces: &[FaceDetail]) -> Result<FaceAnalysis> {
    let face = faces.first().ok_or(Error::NoFaceDetected)?;

    let face_shape = face_shape(face);
    let skin_tone = face
        .quality
        .map(|q| skin_tone_from_brightness(q.brightness))
        .unwrap_or(SkinTone::Medium);
    let age_range = face.age_range.map(|a| format!("{}-{}", a.low, a.high));
    let gender = face.gender.as_ref().map(|g| g.value.clone());

    let features = FaceFeatures {
        facial_features: "Standard facial features detected".to_string(),
        eyes_open: face.eyes_open.as_ref().map(|a| a.value),
        mouth_open: face.mouth_open.as_ref().map(|a| a.value),
        smile: face.smile.as_ref().map(|a| a.value),
        eyeglasses: face.eyeglasses.as_ref().is_some_and(|a| a.value),
        sunglasses: face.sunglasses.as_ref().is_some_and(|a| a.value),
        gender: gender.clone(),
        age_range: age_range.clone(),
    };

    let emotions = if face.emotions.is_empty() {
        None
    } else {
        Some(face.emotions.iter().map(|e| e.kind.as_str()).collect::<Vec<_>>().join(", "))
    };

    Ok(FaceAnalysis {
        face_shape,
        skin_tone,
        hairstyle_recommendations: hairstyle_recommendations(face_shape),
        accessory_recommendations: accessory_recommendations(face_shape, &features),
        makeup_suggestions: makeup_suggestions(face_shape, skin_tone),
        features,
        age_range,
        gender,
        emotions,
    })
}

/// 明るさ（0〜1）から肌の色味を推定
///
/// Rekognition の Brightness は 0〜100 で返るので、1 を超える値は百分率とみなす。
pub fn skin_tone_from_brightness(brightness: Option<f64>) -> SkinTone {
    let mut b = brightness.unwrap_or(0.5);
    if b > 1.0 {
        b /= 100.0;
    }
    if b > 0.8 {
        SkinTone::Fair
    } else if b > 0.6 {
        SkinTone::Light
    } else if b > 0.4 {
        SkinTone::Medium
    } else if b > 0.2 {
        SkinTone::Tan
    } else {
        SkinTone::Dark
    }
}

fn face_shape(face: &FaceDetail) -> FaceShape {
    if face.landmarks.is_empty() {
        return FaceShape::Oval;
    }
    let Some(b) = face.bounding_box else {
        return FaceShape::Oval;
    };
    if b.width <= 0.0 {
        return FaceShape::Oval;
    }

    let aspect = b.height / b.width;
    if aspect > 1.4 {
        return FaceShape::Oblong;
    }
    if aspect < 0.9 {
        return FaceShape::Round;
    }
    if b.width > 0.5 {
        return FaceShape::Square;
    }

    let jaw: Vec<f64> = face
        .landmarks
        .iter()
        .filter(|l| l.kind.starts_with("jawline"))
        .map(|l| l.x)
        .collect();
    if !jaw.is_empty() {
        let min = jaw.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = jaw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let jaw_width = max - min;
        if jaw_width < b.width * 0.7 {
            return FaceShape::Heart;
        }
        if jaw_width > b.width * 0.9 {
            return FaceShape::Triangle;
        }
    }

    FaceShape::Oval
}

fn fit_recommendations(body_type: BodyType, body_shape: BodyShape) -> Vec<String> {
    let mut recs: Vec<&str> = match body_type {
        BodyType::Athletic => vec![
            "Fitted tops that highlight your athletic build",
            "Structured pieces that complement your physique",
        ],
        BodyType::Petite => vec![
            "High-waisted bottoms to create length",
            "Fitted styles that don't overwhelm your frame",
        ],
        BodyType::Tall => vec!["Longer hemlines and proportions", "Layered pieces to add dimension"],
        BodyType::Average => vec!["Well-fitted clothing that follows your natural silhouette"],
    };

    match body_shape {
        BodyShape::Hourglass => {
            recs.push("Belted styles to emphasize your waist");
            recs.push("Fitted tops that highlight your curves");
        }
        BodyShape::Rectangle => {
            recs.push("A-line dresses to create curves");
            recs.push("Peplum tops to add definition");
        }
        _ => {}
    }

    recs.into_iter().map(String::from).collect()
}

fn style_suggestions(body_shape: BodyShape, height: HeightProportion) -> Vec<String> {
    let mut suggestions = vec!["Experiment with different necklines to find what suits you"];

    if height == HeightProportion::Short {
        suggestions.push("Vertical lines can create a lengthening effect");
        suggestions.push("Monochromatic outfits can elongate your silhouette");
    }
    if matches!(body_shape, BodyShape::Hourglass | BodyShape::Pear) {
        suggestions.push("Belted styles can help define your waist");
        suggestions.push("A-line skirts work well for your body type");
    }
    suggestions.push("Consider your proportions when selecting patterns and textures");

    suggestions.into_iter().map(String::from).collect()
}

fn hairstyle_recommendations(shape: FaceShape) -> Vec<String> {
    let recs: [&str; 2] = match shape {
        FaceShape::Round => ["Long layers to elongate your face", "Side-swept bangs to add angles"],
        FaceShape::Square => ["Soft waves to soften your features", "Layered cuts to add movement"],
        FaceShape::Heart => ["Chin-length bobs to balance your face", "Side-parted styles"],
        FaceShape::Oblong => ["Volume at the sides to add width", "Bangs to shorten the face"],
        _ => [
            "Most hairstyles work well with your face shape",
            "Consider layered cuts for dimension",
        ],
    };
    recs.iter().map(|s| s.to_string()).collect()
}

fn accessory_recommendations(shape: FaceShape, features: &FaceFeatures) -> Vec<String> {
    let mut recs = Vec::new();
    match shape {
        FaceShape::Round | FaceShape::Square => recs.push("Oval or round glasses to soften angles"),
        FaceShape::Oblong => recs.push("Wider frames to add width"),
        _ => {}
    }
    recs.push("Drop earrings can elongate your face");
    recs.push("Consider your face shape when selecting accessories");
    if features.eyeglasses {
        recs.push("Your current glasses complement your face shape");
    }
    recs.into_iter().map(String::from).collect()
}

fn makeup_suggestions(shape: FaceShape, tone: SkinTone) -> Vec<String> {
    let mut suggestions = vec!["Choose foundation that matches your skin tone"];
    if shape == FaceShape::Round {
        suggestions.push("Contour along the jawline to add definition");
    }
    match tone {
        SkinTone::Fair | SkinTone::Light => suggestions.push("Soft, natural colors work well"),
        SkinTone::Tan | SkinTone::Dark => suggestions.push("Rich, warm tones complement your skin"),
        SkinTone::Medium => {}
    }
    suggestions.into_iter().map(String::from).collect()
}
