//! Fixed structure-control parameters sent with every upstream request.

use serde::{Deserialize, Serialize};

/// How strongly the control image constrains the generated output.
pub const CONTROL_STRENGTH: f32 = 0.35;

/// Edge-detection mode used to extract structure from the control image.
pub const STRUCTURE_TYPE: &str = "canny";

/// Format of the generated image.
pub const OUTPUT_FORMAT: &str = "png";

/// Structure-control parameters for one upstream request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureParams {
    /// Control strength in `0.0..=1.0`.
    pub control_strength: f32,
    /// Structure-detection mode.
    pub structure_type: String,
    /// Output image format.
    pub output_format: String,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            control_strength: CONTROL_STRENGTH,
            structure_type: STRUCTURE_TYPE.to_string(),
            output_format: OUTPUT_FORMAT.to_string(),
        }
    }
}

impl StructureParams {
    /// Multipart form fields, in upstream wire form.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("control_strength", self.control_strength.to_string()),
            ("structure_type", self.structure_type.clone()),
            ("output_format", self.output_format.clone()),
        ]
    }
}
