use crate::models::{Category, NewCategory};
use crate::utils::error::AppResult;

use super::EventStore;

pub const DEFAULT_CATEGORIES: &[NewCategory] = &[
    NewCategory {
        name: "Tecnología",
        description: "Eventos relacionados con avances tecnológicos, informática, \
                      desarrollo de software, hardware y tendencias digitales.",
    },
    NewCategory {
        name: "Artes",
        description: "Eventos culturales y artísticos que incluyen música, pintura, \
                      escultura, literatura, teatro y otras formas de expresión artística.",
    },
    NewCategory {
        name: "Política",
        description: "Eventos relacionados con gobernanza, políticas públicas, \
                      elecciones y asuntos gubernamentales.",
    },
];

/// Populates the categories table on first start. Later runs leave it alone.
pub async fn seed_categories(store: &dyn EventStore) -> AppResult<Vec<Category>> {
    tracing::info!("Running category seeder");

    let categories = store.seed_categories(DEFAULT_CATEGORIES).await?;
    tracing::info!(count = categories.len(), "Categories available");
    for category in &categories {
        tracing::debug!(id = category.id, name = %category.name, "Category");
    }

    Ok(categories)
}
