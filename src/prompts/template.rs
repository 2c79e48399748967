//! Prompt construction from a location, its address and nearby places.

use crate::location::Location;

/// Instructions prepended to every prompt sent to a model.
pub const PROMPT_PREFIX: &str = "You will be given data about a specific location randomly sampled from all human-populated locations on Earth.
You give your rating keeping in mind that it is relative to all other human-populated locations on Earth (from all continents, countries, etc.).
You provide ONLY your answer in the exact format \"My answer is X.X.\" where 'X.X' represents your rating for the given topic.


";

/// Placeholder replaced with the rating topic (e.g. "Population Density").
pub const TASK_PLACEHOLDER: &str = "<TASK>";

/// Builds a task-agnostic prompt template for `location`.
///
/// `address` is `None` when reverse geocoding found nothing; it renders as
/// `None` in the prompt so the model still sees the field. `nearby` is the
/// block produced by [`describe_nearby`](crate::location::describe_nearby).
pub fn build_prompt(location: Location, address: Option<&str>, nearby: &str) -> String {
    format!(
        "Coordinates: {location}\n\nAddress: \"{}\"\n\nNearby Places:\n\"\n{nearby}\"\n\n{TASK_PLACEHOLDER} (On a Scale from 0.0 to 9.9): ",
        address.unwrap_or("None"),
    )
}

/// Joins reverse-geocoding address components into one line.
///
/// Components whose key contains `-`, `number` or `code` (house numbers,
/// postcodes, ISO codes) are dropped. Order is preserved.
pub fn format_address<'a, I>(components: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    components
        .into_iter()
        .filter(|(key, _)| !(key.contains('-') || key.contains("number") || key.contains("code")))
        .map(|(_, value)| value)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns a stored template into the final prompt for `task`.
pub fn instantiate(template: &str, task: &str) -> String {
    format!(
        "{PROMPT_PREFIX}{}",
        template.trim().replace(TASK_PLACEHOLDER, task)
    )
}
