//! Instance identifiers

use ulid::Ulid;

/// Generate a unique id of the form `<prefix><separator><ulid>`
///
/// The ULID part is lowercased so ids are safe to use as DOM ids.
pub fn generate_id(prefix: &str, separator: char) -> String {
    format!("{}{}{}", prefix, separator, Ulid::new().to_string().to_ascii_lowercase())
}
