mod catalog;
mod export;
mod persistence;

pub use catalog::Catalog;
pub use export::write_blend_csv;
pub use persistence::{load_blend, load_ingredients, load_recipes, save_blend};
