use geojson::JsonObject;
use log::warn;
use serde_json::Value as JsonValue;

/// Coarse category of every chart record; also the fallback finer category
pub const COARSE_CATEGORY: &str = "offshore_platform";

/// Chart layers mapped to the dataset class they feed
pub const LAYER_CLASSES: &[(&str, &str)] = &[("OFSPLF", "platform")];

/// Offshore platform property carrying the finer category code(s)
pub const CATEGORY_ATTRIBUTE: &str = "CATOFP";

/// CATOFP code table
const CATEGORY_CODES: &[(&str, &str)] = &[
    ("1", "oil derrick/rig"),
    ("2", "production platform"),
    ("3", "observation/research platform"),
    ("4", "articulated loading platform (ALP)"),
    ("5", "single anchor leg mooring (SALM)"),
    ("6", "mooring tower"),
    ("7", "artificial island"),
    (
        "8",
        "floating production, storage and off-loading vessel (FPSO)",
    ),
    ("9", "accommodation platform"),
    ("10", "navigation, communication and control buoy (NCCB)"),
];

/// Look up the finer category name for a CATOFP code
pub fn category_for_code(code: &str) -> Option<&'static str> {
    CATEGORY_CODES
        .iter()
        .find(|(c, _)| *c == code.trim())
        .map(|(_, name)| *name)
}

/// Finer categories accepted into the classification dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformClass {
    ProductionPlatform,
    OilDerrick,
    ObservationPlatform,
}

impl PlatformClass {
    pub const ALL: [PlatformClass; 3] = [
        PlatformClass::ProductionPlatform,
        PlatformClass::OilDerrick,
        PlatformClass::ObservationPlatform,
    ];

    pub fn from_finer_category(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|class| class.finer_category() == name)
    }

    pub fn finer_category(&self) -> &'static str {
        match self {
            PlatformClass::ProductionPlatform => "production platform",
            PlatformClass::OilDerrick => "oil derrick/rig",
            PlatformClass::ObservationPlatform => "observation/research platform",
        }
    }

    /// Numeric class id written to gt.txt and the PNG metadata
    pub fn label(&self) -> u8 {
        match self {
            PlatformClass::ProductionPlatform => 0,
            PlatformClass::OilDerrick => 1,
            PlatformClass::ObservationPlatform => 2,
        }
    }

    /// Only kept when the point also appears in the reference dataset
    pub fn requires_reference_match(&self) -> bool {
        matches!(self, PlatformClass::ProductionPlatform)
    }
}

/// Categories the matcher searches the reference dataset for
pub fn is_matched_category(name: &str) -> bool {
    name == COARSE_CATEGORY || PlatformClass::from_finer_category(name).is_some()
}

/// Determine the finer category of a chart feature from its CATOFP property
/// Absent, empty or unknown codes fall back to the coarse category
pub fn finer_category(properties: Option<&JsonObject>) -> String {
    let codes = properties
        .and_then(|props| props.get(CATEGORY_ATTRIBUTE))
        .map(category_codes)
        .unwrap_or_default();

    let Some(first) = codes.first() else {
        return COARSE_CATEGORY.to_string();
    };

    if codes.len() > 1 {
        warn!("More than 1 {}: {:?}", CATEGORY_ATTRIBUTE, codes);
    }

    match category_for_code(first) {
        Some(name) => name.to_string(),
        None => {
            warn!(
                "Unknown {} code {:?}, using {}",
                CATEGORY_ATTRIBUTE, first, COARSE_CATEGORY
            );
            COARSE_CATEGORY.to_string()
        }
    }
}

/// CATOFP can be exported as a string list, a single string or a number
fn category_codes(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => items.iter().flat_map(category_codes).collect(),
        JsonValue::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        JsonValue::Number(n) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

/// Dataset class of a chart layer, if the layer is known
pub fn class_for_layer(layer: &str) -> Option<&'static str> {
    LAYER_CLASSES
        .iter()
        .find(|(name, _)| *name == layer)
        .map(|(_, class)| *class)
}
