pub mod prompts;
pub mod render;

pub use prompts::{
    parse_amount, parse_amount_list, parse_name_list, prompt_ingredients, prompt_target,
    prompt_yes_no,
};
pub use render::{display_blend, display_ranked_recipes};
