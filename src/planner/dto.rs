use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub recipe_id: Uuid,
    /// Display copy; the recipe itself may since have been deleted.
    pub recipe_title: String,
}

/// At most one planned recipe per weekday. Serialized as an object keyed by
/// lower-case day name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealPlan {
    days: BTreeMap<Day, PlannedMeal>,
}

impl MealPlan {
    pub fn get(&self, day: Day) -> Option<&PlannedMeal> {
        self.days.get(&day)
    }

    pub fn set(&mut self, day: Day, meal: PlannedMeal) {
        self.days.insert(day, meal);
    }

    pub fn clear(&mut self, day: Day) {
        self.days.remove(&day);
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Distinct recipe ids in day order.
    pub fn recipe_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(self.days.len());
        for meal in self.days.values() {
            if !ids.contains(&meal.recipe_id) {
                ids.push(meal.recipe_id);
            }
        }
        ids
    }
}

/// Preferences folded into generation requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasteProfile {
    #[serde(default)]
    pub favorite_ingredients: Vec<String>,
    #[serde(default)]
    pub favorite_cuisines: Vec<String>,
    #[serde(default)]
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub excluded_ingredients: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(id: Uuid, title: &str) -> PlannedMeal {
        PlannedMeal {
            recipe_id: id,
            recipe_title: title.into(),
        }
    }

    #[test]
    fn recipe_ids_are_distinct_and_in_day_order() {
        let soup = Uuid::new_v4();
        let pie = Uuid::new_v4();

        let mut plan = MealPlan::default();
        plan.set(Day::Sunday, meal(soup, "Soup"));
        plan.set(Day::Wednesday, meal(pie, "Pie"));
        plan.set(Day::Monday, meal(soup, "Soup"));

        assert_eq!(plan.recipe_ids(), vec![soup, pie]);
        plan.clear(Day::Monday);
        assert_eq!(plan.recipe_ids(), vec![pie, soup]);
    }

    #[test]
    fn plan_serializes_by_day_name() {
        let id = Uuid::nil();
        let mut plan = MealPlan::default();
        plan.set(Day::Friday, meal(id, "Fish"));

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["friday"]["recipe_title"], "Fish");

        let back: MealPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back.get(Day::Friday).map(|m| m.recipe_id), Some(id));
        assert!(back.get(Day::Monday).is_none());

        let bad = serde_json::from_str::<MealPlan>(r#"{"funday": {"recipe_id": "00000000-0000-0000-0000-000000000000", "recipe_title": "x"}}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn taste_profile_fields_are_optional() {
        let profile: TasteProfile = serde_json::from_str(r#"{"dietary_preference": "vegan"}"#).unwrap();
        assert_eq!(profile.dietary_preference.as_deref(), Some("vegan"));
        assert!(profile.favorite_ingredients.is_empty());
    }
}
