use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use recipe_basket::config::AppConfig;
use recipe_basket::localization::LocalizationManager;
use recipe_basket::recipes::{extract_ingredients_block, RecipeBook};
use recipe_basket::{
    Cart, FormattedProduct, HttpTranslator, IngredientResolver, PgCatalog, RecipeIngredients,
};

const USAGE: &str = "Usage: recipe-basket <recipe title> [language]\n       recipe-basket --markdown <file> [language]";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    init_tracing();

    info!("Starting recipe-basket");

    let args: Vec<String> = env::args().skip(1).collect();
    let config = AppConfig::from_env()?;
    let localization = LocalizationManager::new()?;

    let (ingredients, language) = match args.as_slice() {
        [flag, file, rest @ ..] if flag == "--markdown" => {
            let markdown = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {file}"))?;
            let block = extract_ingredients_block(&markdown).unwrap_or_default();
            let language = rest.first().cloned().unwrap_or_else(|| config.catalog_language.clone());
            (RecipeIngredients::Text(block), language)
        }
        [title, rest @ ..] if !title.starts_with("--") => {
            let language = rest.first().cloned().unwrap_or_else(|| config.catalog_language.clone());
            let book = RecipeBook::load(&config.recipes_path)?;
            let Some(recipe) = book.find_exact(title) else {
                println!(
                    "{}",
                    localization.get_message_with_args("recipe-not-found", &language, &[("title", title.as_str())])
                );
                return Ok(());
            };

            println!("# {}", recipe.title);
            if let Some(servings) = recipe.serving_size() {
                println!("({servings})");
            }
            for step in recipe.instructions() {
                println!("{step}");
            }
            println!();
            (RecipeIngredients::Lines(recipe.ingredient_lines()), language)
        }
        _ => anyhow::bail!(USAGE),
    };

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;
    let catalog = PgCatalog::connect(&database_url).await?;
    let backend = HttpTranslator::new(
        &config.translate_api_url,
        config.translate_api_key.clone(),
        config.translator.operation_timeout(),
    )?;
    let resolver = IngredientResolver::from_config(&config, Arc::new(catalog), Arc::new(backend));

    let products: Vec<FormattedProduct> = match resolver.resolve(ingredients, &language).await {
        Ok(products) => products,
        Err(e) => {
            error!("Resolution failed: {}", e);
            let message = e.to_string();
            println!(
                "{}",
                localization.get_message_with_args("products-catalog-error", &language, &[("error", message.as_str())])
            );
            return Err(e.into());
        }
    };

    if products.is_empty() {
        println!("{}", localization.format("products-none-found", &language, None));
        return Ok(());
    }

    let mut cart = Cart::new();
    for product in &products {
        println!(
            "{}",
            localization.get_message_with_args(
                "product-line",
                &language,
                &[
                    ("name", product.product_name.as_str()),
                    ("weight", product.weight.as_str()),
                    ("tax", product.tax.as_str()),
                ],
            )
        );
        cart.add(product, 1)?;
    }

    println!();
    for line in cart.summary(&localization, &language) {
        println!("{line}");
    }

    Ok(())
}
