use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::nutrients::NutrientProfile;

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Vec<ProductData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product_name: Option<String>,
    pub nutriments: Option<Nutriments>,
}

/// Raw nutriment fields. Values arrive as numbers, as annotated strings
/// like `"< 0.1"` or `"12 g"`, or not at all, so everything stays a
/// [`Value`] until [`parse_nutrient`] gets a look at it.
#[derive(Debug, Default, Deserialize)]
pub struct Nutriments {
    #[serde(rename = "energy-kcal_100g")]
    pub energy_kcal_100g: Option<Value>,
    pub energy_100g: Option<Value>,
    pub proteins_100g: Option<Value>,
    pub proteins: Option<Value>,
    pub carbohydrates_100g: Option<Value>,
    pub carbohydrates: Option<Value>,
    pub fat_100g: Option<Value>,
    pub fat: Option<Value>,
    #[serde(rename = "saturated-fat_100g")]
    pub saturated_fat_100g: Option<Value>,
}

impl Nutriments {
    /// Per-100g profile, taking the first usable field in each fallback
    /// chain. A field that parses to zero is treated as missing so a later
    /// source can fill it in.
    #[must_use]
    pub fn to_profile(&self) -> NutrientProfile {
        NutrientProfile {
            calories: pick_nutrient(&[
                self.energy_kcal_100g.as_ref(),
                self.energy_100g.as_ref(),
            ]),
            protein: pick_nutrient(&[self.proteins_100g.as_ref(), self.proteins.as_ref()]),
            carbs: pick_nutrient(&[
                self.carbohydrates_100g.as_ref(),
                self.carbohydrates.as_ref(),
            ]),
            fat: pick_nutrient(&[
                self.fat_100g.as_ref(),
                self.fat.as_ref(),
                self.saturated_fat_100g.as_ref(),
            ]),
        }
    }
}

fn pick_nutrient(chain: &[Option<&Value>]) -> f64 {
    chain
        .iter()
        .copied()
        .flatten()
        .map(parse_nutrient)
        .find(|parsed| *parsed > 0.0)
        .unwrap_or(0.0)
}

/// Salvage a number from whatever a nutriment field holds. Numbers pass
/// through; strings are stripped down to digits and dots before parsing.
/// Anything unusable becomes zero rather than an error.
#[must_use]
pub fn parse_nutrient(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0)
}

/// One search result: a display name plus its per-100g reference profile,
/// ready for [`NutrientProfile::scaled_to`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCandidate {
    pub name: String,
    pub per_100g: NutrientProfile,
}

/// Convert an API product into a candidate. Products without a usable name
/// are dropped; missing nutriments just mean a zero profile.
#[must_use]
pub fn product_to_candidate(p: ProductData) -> Option<FoodCandidate> {
    let name = p.product_name.filter(|n| !n.trim().is_empty())?;
    let per_100g = p
        .nutriments
        .as_ref()
        .map(Nutriments::to_profile)
        .unwrap_or_default();
    Some(FoodCandidate { name, per_100g })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_product() -> ProductData {
        ProductData {
            product_name: Some("Nutella".to_string()),
            nutriments: Some(Nutriments {
                energy_kcal_100g: Some(json!(539.0)),
                proteins_100g: Some(json!(6.3)),
                carbohydrates_100g: Some(json!(57.5)),
                fat_100g: Some(json!(30.9)),
                ..Nutriments::default()
            }),
        }
    }

    #[test]
    fn test_parse_nutrient_number() {
        assert!((parse_nutrient(&json!(12.5)) - 12.5).abs() < f64::EPSILON);
        assert!((parse_nutrient(&json!(0)) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_nutrient_numeric_string() {
        assert!((parse_nutrient(&json!("12.5")) - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_nutrient_annotated_string() {
        assert!((parse_nutrient(&json!("< 0.1")) - 0.1).abs() < f64::EPSILON);
        assert!((parse_nutrient(&json!("12 g")) - 12.0).abs() < f64::EPSILON);
        // The strip keeps the dot, so "approx. 5" collapses to ".5"
        assert!((parse_nutrient(&json!("approx. 5")) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_nutrient_garbage_is_zero() {
        assert!((parse_nutrient(&json!("trace")) - 0.0).abs() < f64::EPSILON);
        assert!((parse_nutrient(&json!("")) - 0.0).abs() < f64::EPSILON);
        assert!((parse_nutrient(&json!(null)) - 0.0).abs() < f64::EPSILON);
        assert!((parse_nutrient(&json!(true)) - 0.0).abs() < f64::EPSILON);
        assert!((parse_nutrient(&json!([1, 2])) - 0.0).abs() < f64::EPSILON);
        assert!((parse_nutrient(&json!(-2.5)) - 0.0).abs() < f64::EPSILON);
        // Two dots survive the strip but do not parse
        assert!((parse_nutrient(&json!("1.2.3")) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_profile_prefers_kcal_field() {
        let nutriments = Nutriments {
            energy_kcal_100g: Some(json!(389.0)),
            energy_100g: Some(json!(1628.0)),
            ..Nutriments::default()
        };
        let profile = nutriments.to_profile();
        assert!((profile.calories - 389.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_profile_falls_back_along_each_chain() {
        let nutriments = Nutriments {
            energy_100g: Some(json!(250.0)),
            proteins: Some(json!("8.1")),
            carbohydrates: Some(json!(30.0)),
            saturated_fat_100g: Some(json!(2.5)),
            ..Nutriments::default()
        };
        let profile = nutriments.to_profile();
        assert!((profile.calories - 250.0).abs() < f64::EPSILON);
        assert!((profile.protein - 8.1).abs() < f64::EPSILON);
        assert!((profile.carbs - 30.0).abs() < f64::EPSILON);
        assert!((profile.fat - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_profile_zero_field_falls_through() {
        let nutriments = Nutriments {
            energy_kcal_100g: Some(json!(0)),
            energy_100g: Some(json!(250.0)),
            fat_100g: Some(json!("0 g")),
            fat: Some(json!(3.2)),
            ..Nutriments::default()
        };
        let profile = nutriments.to_profile();
        assert!((profile.calories - 250.0).abs() < f64::EPSILON);
        assert!((profile.fat - 3.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_profile_all_missing_is_zero() {
        let profile = Nutriments::default().to_profile();
        assert_eq!(profile, NutrientProfile::default());
    }

    #[test]
    fn test_product_to_candidate_complete() {
        let candidate = product_to_candidate(full_product()).unwrap();
        assert_eq!(candidate.name, "Nutella");
        assert!((candidate.per_100g.calories - 539.0).abs() < f64::EPSILON);
        assert!((candidate.per_100g.protein - 6.3).abs() < f64::EPSILON);
        assert!((candidate.per_100g.carbs - 57.5).abs() < f64::EPSILON);
        assert!((candidate.per_100g.fat - 30.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_product_to_candidate_missing_name() {
        let mut p = full_product();
        p.product_name = None;
        assert!(product_to_candidate(p).is_none());

        // Blank names should also drop the product
        let mut p2 = full_product();
        p2.product_name = Some("   ".to_string());
        assert!(product_to_candidate(p2).is_none());
    }

    #[test]
    fn test_product_to_candidate_missing_nutriments() {
        let p = ProductData {
            product_name: Some("Mystery Snack".to_string()),
            nutriments: None,
        };
        let candidate = product_to_candidate(p).unwrap();
        assert_eq!(candidate.name, "Mystery Snack");
        assert_eq!(candidate.per_100g, NutrientProfile::default());
    }

    #[test]
    fn test_search_response_parses_sparse_payload() {
        let raw = r#"{
            "products": [
                {"product_name": "Oats", "nutriments": {"energy-kcal_100g": 389, "proteins_100g": "16.9"}},
                {"nutriments": {"energy-kcal_100g": 100}},
                {"product_name": "Sugar"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        let candidates: Vec<FoodCandidate> = response
            .products
            .into_iter()
            .filter_map(product_to_candidate)
            .collect();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "Oats");
        assert!((candidates[0].per_100g.calories - 389.0).abs() < f64::EPSILON);
        assert!((candidates[0].per_100g.protein - 16.9).abs() < f64::EPSILON);
        assert_eq!(candidates[1].name, "Sugar");
    }
}
