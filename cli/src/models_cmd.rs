use bionel_linker::registry;
use owo_colors::OwoColorize;

/// Print the names accepted for `--model`, `--entity-type` and `--dictionary`
pub fn run_models() {
    println!("{}", "Entity types:".bright_blue());
    for entity_type in registry::ENTITY_TYPES {
        let model = registry::hybrid_model_for(entity_type).unwrap_or(registry::DENSE_MODEL);
        let dictionary = registry::dictionary_for_entity_type(entity_type).unwrap_or("-");
        println!(
            "  {:<10} {} {}",
            entity_type.bright_cyan(),
            model,
            format!("[{dictionary}]").bright_black()
        );
    }

    println!("\n{}", "Hybrid models:".bright_blue());
    for model in registry::HYBRID_MODELS {
        let dictionary = registry::dictionary_for_model(model).unwrap_or("-");
        println!(
            "  {} {}",
            registry::hybrid_model_repo(model),
            format!("[{dictionary}]").bright_black()
        );
    }

    println!("\n{}", "Dense models:".bright_blue());
    for model in registry::DENSE_MODELS {
        println!("  {model}");
    }

    println!("\n{}", "String matching:".bright_blue());
    for model in registry::STRING_MATCHING_MODELS {
        println!("  {model}");
    }

    println!("\n{}", "Dictionaries:".bright_blue());
    for dictionary in registry::DICTIONARIES {
        println!("  {dictionary}");
    }
}
