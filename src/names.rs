/// Cluster object name for a logical reference inside a context.
///
/// Context length is hashed in front of both parts, so `("a/b", "c")` and
/// `("a", "b/c")` never meet on the same input.
pub fn generate_data_object_name(context: &str, name: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(context.len() as u64).to_le_bytes());
    hasher.update(context.as_bytes());
    hasher.update(name.as_bytes());
    hasher.finalize().to_hex().to_string()
}
