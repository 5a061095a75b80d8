use anyhow::Result;
use serde_json::json;

use super::{Capability, CapabilityId, OutputSchema};
use crate::models::{BodyScanInput, BodyScanOutput, Prompt};
use crate::services::validation::{Field, FieldRule, InputSchema};

pub fn capability() -> Result<Capability<BodyScanInput, BodyScanOutput>> {
    Ok(Capability {
        id: CapabilityId::BodyScan,
        input_schema: InputSchema::new(vec![
            Field::required("photoDataUri", FieldRule::DataUri),
            Field::required("heightFt", FieldRule::NumberRange { min: 3.0, max: 8.0 }),
            Field::optional("weightKg", FieldRule::NumberRange { min: 20.0, max: 300.0 }),
        ]),
        output_schema: OutputSchema::new(json!({
            "type": "object",
            "properties": {
                "bodyShape": { "type": "string" },
                "estimatedBmi": { "type": "number" },
                "estimatedBodyFatPercentage": { "type": "number" },
                "muscleDefinition": { "type": "string", "enum": ["low", "medium", "high"] },
                "fitnessCategory": { "type": "string" },
                "physiqueAnalysis": { "type": "string" },
                "improvementPlan": { "type": "array", "items": { "type": "string" } }
            },
            "required": [
                "bodyShape", "estimatedBmi", "estimatedBodyFatPercentage", "muscleDefinition",
                "fitnessCategory", "physiqueAnalysis", "improvementPlan"
            ]
        })),
        prompt_template: prompt,
        heading_rules: Vec::new(),
        sub_heading_rules: Vec::new(),
        output_check: None,
    })
}

fn prompt(input: &BodyScanInput) -> Prompt {
    let weight = input
        .weight_kg
        .map(|w| format!("{} kg", w))
        .unwrap_or_else(|| "Not Provided".to_string());

    Prompt::text(format!(
        "You are an expert AI fitness and physique analyst. Your tone must be positive, motivational, and encouraging.\n\
         Analyze the attached full-body photo and return a physique analysis.\n\
         \n\
         User-provided data (use if available):\n\
         - Height: {} ft\n\
         - Weight: {}\n\
         \n\
         Instructions:\n\
         1. Detect the body shape (Ectomorph, Mesomorph, Endomorph, or Rectangle, Triangle, Hourglass).\n\
         2. Estimate BMI (use the provided height and weight), body fat percentage, muscle definition \
         ('low', 'medium' or 'high') and a fitness category (Underweight, Normal, Overweight, Athletic, Obese).\n\
         3. Write a short (2-3 sentences), positive analysis of the current physique.\n\
         4. Give 3-5 actionable improvement points combining diet and workout advice.\n\
         5. Do not provide medical advice. If the user appears significantly underweight or obese, gently suggest \
         consulting a healthcare professional. If the image is not a full-body photo, explain this kindly in \
         'physiqueAnalysis' and return zero values for the other fields.",
        input.height_ft, weight
    ))
    .with_media(input.photo_data_uri.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_weight() {
        let capability = capability().unwrap();
        let prompt = capability.render_prompt(&BodyScanInput {
            photo_data_uri: "data:image/png;base64,AAAA".into(),
            height_ft: 5.5,
            weight_kg: None,
        });
        assert!(prompt.text.contains("Height: 5.5 ft"));
        assert!(prompt.text.contains("Weight: Not Provided"));
        assert_eq!(prompt.media.len(), 1);
    }

    #[test]
    fn test_weight_optional_but_ranged() {
        let capability = capability().unwrap();
        let photo = "data:image/png;base64,AAAA";
        assert!(capability
            .input_schema
            .validate(&json!({"photoDataUri": photo, "heightFt": 6}))
            .is_ok());

        let errs = capability
            .input_schema
            .validate(&json!({"photoDataUri": photo, "heightFt": 6, "weightKg": 5}))
            .unwrap_err();
        assert_eq!(errs[0].field, "weightKg");
    }
}
