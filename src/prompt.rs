//! Prompt construction for restyling requests.

/// Build the upstream prompt for a room restyle.
///
/// The description clause is appended only when it is non-empty after
/// trimming.
#[must_use]
pub fn build_prompt(style: &str, room: &str, description: &str) -> String {
    let mut prompt =
        format!("{style} style for a {room}, same layout, photorealistic, high quality");
    let description = description.trim();
    if !description.is_empty() {
        prompt.push_str(", ");
        prompt.push_str(description);
    }
    prompt
}
