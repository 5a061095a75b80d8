use anyhow::Result;
use serde_json::json;

use super::{Capability, CapabilityId, OutputSchema};
use crate::models::{FoodImageInput, FoodImageOutput, Prompt};
use crate::services::validation::{Field, FieldRule, InputSchema};

pub fn capability() -> Result<Capability<FoodImageInput, FoodImageOutput>> {
    let nutrient = json!({ "type": "number" });
    Ok(Capability {
        id: CapabilityId::FoodImage,
        input_schema: InputSchema::new(vec![Field::required("photoDataUri", FieldRule::DataUri)]),
        output_schema: OutputSchema::new(json!({
            "type": "object",
            "properties": {
                "foodItems": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "portionSize": { "type": "string" },
                            "calories": nutrient,
                            "protein": nutrient,
                            "fats": nutrient,
                            "carbohydrates": nutrient
                        },
                        "required": ["name", "portionSize", "calories", "protein", "fats", "carbohydrates"]
                    }
                },
                "totalCalories": nutrient,
                "totalProtein": nutrient,
                "totalFats": nutrient,
                "totalCarbohydrates": nutrient,
                "fitnessSummary": { "type": "string" }
            },
            "required": ["foodItems", "totalCalories", "totalProtein", "totalFats", "totalCarbohydrates", "fitnessSummary"]
        })),
        prompt_template: prompt,
        heading_rules: Vec::new(),
        sub_heading_rules: Vec::new(),
        output_check: None,
    })
}

fn prompt(input: &FoodImageInput) -> Prompt {
    Prompt::text(
        "You are a specialized nutrition analysis AI for fitness enthusiasts.\n\
         Analyze the attached image of a meal and return detailed nutritional information.\n\
         Focus on accuracy for meals commonly consumed by gym-goers (chicken, rice, salmon, protein shakes, oats, eggs, etc.).\n\
         \n\
         Instructions:\n\
         1. Identify each individual food item in the image.\n\
         2. Estimate the portion size of each item (e.g. \"1 cup\", \"150g\", \"1 chicken breast\").\n\
         3. Give estimated calories, protein, fats and carbohydrates (grams) for each item.\n\
         4. Sum the values into totals for the whole meal.\n\
         5. Write a brief, encouraging 1-2 sentence fitness summary of the meal.\n\
         6. If an item cannot be identified confidently, omit it. If no food is detected, return an empty list and zero totals.",
    )
    .with_media(input.photo_data_uri.clone())
}
