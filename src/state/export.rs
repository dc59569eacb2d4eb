use std::path::Path;

use crate::error::Result;
use crate::models::{Blend, Macros};

fn macro_fields(m: &Macros) -> [String; 4] {
    [
        format!("{:.1}", m.calories),
        format!("{:.1}", m.proteins),
        format!("{:.1}", m.fats),
        format!("{:.1}", m.carbs),
    ]
}

/// Write a blend to a CSV file, one row per ingredient plus a `TOTAL` row.
pub fn write_blend_csv<P: AsRef<Path>>(blend: &Blend, path: P) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "id", "name", "grams", "calories", "proteins", "fats", "carbs",
    ])?;

    for entry in &blend.ingredients {
        let [calories, proteins, fats, carbs] = macro_fields(&entry.nutrition);
        wtr.write_record([
            entry.ingredient_id.to_string(),
            entry.name.clone(),
            format!("{:.0}", entry.grams),
            calories,
            proteins,
            fats,
            carbs,
        ])?;
    }

    let [calories, proteins, fats, carbs] = macro_fields(&blend.total_nutrition);
    wtr.write_record([
        String::new(),
        "TOTAL".to_string(),
        format!("{:.1}", blend.total_weight),
        calories,
        proteins,
        fats,
        carbs,
    ])?;

    wtr.flush()?;
    Ok(())
}
