//! Image path splitting.

#[cfg(test)]
mod tests;

/// Splits a slash-separated image path into `(repository, image)`.
///
/// Only the last two segments are kept: the second-to-last becomes the
/// repository and the last the image name. Anything before them is dropped,
/// so `ns/repo/image` resolves to `("repo", "image")`. A single segment has
/// no repository.
///
/// # Examples
///
/// ```
/// use libtagscout::split_path;
///
/// assert_eq!(split_path("nginx"), (String::new(), "nginx".to_string()));
/// assert_eq!(split_path("library/nginx"), ("library".to_string(), "nginx".to_string()));
/// assert_eq!(split_path("org/team/app"), ("team".to_string(), "app".to_string()));
/// ```
pub fn split_path(path: &str) -> (String, String) {
    let segments: Vec<&str> = path.split('/').collect();

    match segments.as_slice() {
        [image] => (String::new(), image.to_string()),
        [.., repo, image] => (repo.to_string(), image.to_string()),
        // `split` always yields at least one segment
        [] => (path.to_string(), String::new()),
    }
}
