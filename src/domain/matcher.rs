/// Case-insensitive substring match of `pattern` inside the observed activity.
/// No activity never matches.
pub fn matches(observed_activity: Option<&str>, pattern: &str) -> bool {
    match observed_activity {
        Some(activity) => activity.to_lowercase().contains(&pattern.to_lowercase()),
        None => false,
    }
}
