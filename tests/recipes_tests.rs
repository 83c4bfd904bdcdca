//! # Recipe Collection Tests
//!
//! Loading the JSON recipe collection from disk and turning recipes into
//! ingredient lines.

use recipe_basket::ingredient_cleaner::IngredientCleaner;
use recipe_basket::recipes::{clean_recipe_title, extract_ingredients_block, RecipeBook};
use std::io::Write;
use tempfile::NamedTempFile;

const COLLECTION: &str = r#"[
    {
        "title": "豚の生姜焼き",
        "source": "delishkitchen",
        "cooking_time": "20分",
        "ingredients": [
            {"name": "豚ロース", "quantity": "200g"},
            {"name": "しょうゆ", "quantity": "大さじ1"},
            {"name": "しょうが(チューブ)", "quantity": "小さじ1"}
        ],
        "steps": ["①豚肉を焼く", "②タレを絡める"],
        "servings": {"value": 2, "unit": "人分"}
    },
    {
        "title": "Miso Soup",
        "cooking_time": 15,
        "ingredients": [{"name": "miso", "quantity": "2 tbsp"}, {"name": "tofu"}],
        "steps": [{"description": "Heat dashi"}, {"description": "Dissolve miso"}],
        "servings": {"raw_text": "Serves 4"}
    }
]"#;

fn write_collection(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write temp file");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_collection() {
        let file = write_collection(COLLECTION);
        let book = RecipeBook::load(file.path()).unwrap();

        assert_eq!(book.len(), 2);
        let titles: Vec<&str> = book.titles().collect();
        assert_eq!(titles, vec!["豚の生姜焼き", "Miso Soup"]);
    }

    #[test]
    fn test_find_exact_with_decorated_title() {
        let file = write_collection(COLLECTION);
        let book = RecipeBook::load(file.path()).unwrap();

        let recipe = book.find_exact("[Quick] Miso Soup - comforting and light").unwrap();
        assert_eq!(recipe.title, "Miso Soup");
        assert_eq!(recipe.serving_size().as_deref(), Some("Serves 4"));
        assert_eq!(recipe.total_time().as_deref(), Some("15"));
        assert_eq!(recipe.instructions(), vec!["1. Heat dashi", "2. Dissolve miso"]);

        assert!(book.find_exact("豚の生姜焼き https://example.com/recipe").is_some());
        assert!(book.find_exact("Curry").is_none());
        assert!(book.find_exact("   ").is_none());
    }

    #[test]
    fn test_recipe_lines_feed_the_cleaner() {
        let file = write_collection(COLLECTION);
        let book = RecipeBook::load(file.path()).unwrap();
        let recipe = book.find_exact("豚の生姜焼き").unwrap();

        let lines = recipe.ingredient_lines();
        assert_eq!(lines, vec!["豚ロース 200g", "しょうゆ 大さじ1", "しょうが(チューブ) 小さじ1"]);

        let terms: Vec<String> = IngredientCleaner::new()
            .clean_all(&lines)
            .into_iter()
            .map(|t| t.into_string())
            .collect();
        assert_eq!(terms, vec!["豚ロース", "しょうゆ", "チューブ", "しょうが"]);
        assert_eq!(recipe.serving_size().as_deref(), Some("2 人分"));
    }

    #[test]
    fn test_load_errors() {
        assert!(RecipeBook::load("/nonexistent/recipes.json").is_err());

        let file = write_collection("{ not json");
        let err = RecipeBook::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse recipe collection"));
    }

    #[test]
    fn test_clean_recipe_title() {
        assert_eq!(clean_recipe_title("  Teriyaki Chicken.  "), "Teriyaki Chicken");
        assert_eq!(clean_recipe_title("www.example.com Ramen"), "Ramen");
        // Square brackets stay on titles with Japanese text
        assert_eq!(clean_recipe_title("[定番] 肉じゃが"), "[定番] 肉じゃが");
    }

    #[test]
    fn test_ingredients_block_before_recipe_selection() {
        let markdown = "#### Ingredients\n- 鶏もも肉 300g\n- 塩 少々\n\n### Recipe Selection\nPick one";
        let block = extract_ingredients_block(markdown).unwrap();
        assert_eq!(block, "- 鶏もも肉 300g\n- 塩 少々");

        let terms: Vec<String> = IngredientCleaner::new()
            .clean_all(block.lines())
            .into_iter()
            .map(|t| t.into_string())
            .collect();
        assert_eq!(terms, vec!["鶏もも肉", "塩"]);
    }
}
