//! Statistics over the location set

use serde::Serialize;

use crate::filter::color_at;
use crate::models::{Category, Condition, Location};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConditionCounts {
    pub baik: usize,
    pub rusak_ringan: usize,
    pub rusak_berat: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_locations: usize,
    pub total_categories: usize,
    /// Sorted by count, largest first
    pub category_counts: Vec<CategoryCount>,
    pub condition_counts: ConditionCounts,
}

pub fn compute(locations: &[Location], categories: &[Category]) -> Statistics {
    let mut category_counts: Vec<CategoryCount> = categories
        .iter()
        .enumerate()
        .map(|(index, cat)| CategoryCount {
            id: cat.id.clone(),
            name: cat.name.clone(),
            count: locations
                .iter()
                .filter(|l| l.category_id.as_deref() == Some(cat.id.as_str()))
                .count(),
            color: color_at(index),
        })
        .collect();
    // Stable: ties keep category order
    category_counts.sort_by(|a, b| b.count.cmp(&a.count));

    let mut condition_counts = ConditionCounts::default();
    for condition in locations.iter().filter_map(|l| l.condition) {
        match condition {
            Condition::Baik => condition_counts.baik += 1,
            Condition::RusakRingan => condition_counts.rusak_ringan += 1,
            Condition::RusakBerat => condition_counts.rusak_berat += 1,
        }
    }

    Statistics {
        total_locations: locations.len(),
        total_categories: categories.len(),
        category_counts,
        condition_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(category: Option<&str>, condition: Option<Condition>) -> Location {
        Location {
            id: uuid::Uuid::new_v4().to_string(),
            name: "x".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            description: None,
            category_id: category.map(String::from),
            subcategory_id: None,
            condition,
            address: None,
            dusun: None,
            contact: None,
            images: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn cat(id: &str) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_uppercase(),
            icon: None,
            subcategories: Vec::new(),
        }
    }

    #[test]
    fn test_counts_sorted_with_palette_colors() {
        let categories = vec![cat("a"), cat("b"), cat("c")];
        let locations = vec![
            loc(Some("b"), Some(Condition::Baik)),
            loc(Some("b"), Some(Condition::RusakBerat)),
            loc(Some("c"), None),
            loc(None, Some(Condition::Baik)),
        ];
        let stats = compute(&locations, &categories);

        assert_eq!(stats.total_locations, 4);
        assert_eq!(stats.total_categories, 3);
        let order: Vec<(&str, usize)> = stats
            .category_counts
            .iter()
            .map(|c| (c.id.as_str(), c.count))
            .collect();
        assert_eq!(order, vec![("b", 2), ("c", 1), ("a", 0)]);
        assert_eq!(stats.category_counts[0].color, "#f9a8d4");
        assert_eq!(
            stats.condition_counts,
            ConditionCounts {
                baik: 2,
                rusak_ringan: 0,
                rusak_berat: 1
            }
        );
    }

    #[test]
    fn test_ties_keep_category_order() {
        let categories = vec![cat("a"), cat("b")];
        let stats = compute(&[], &categories);
        let ids: Vec<&str> = stats.category_counts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
