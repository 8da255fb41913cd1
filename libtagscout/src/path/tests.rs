use super::*;

fn pair(repo: &str, image: &str) -> (String, String) {
    (repo.to_string(), image.to_string())
}

#[test]
fn test_single_segment_has_no_repository() {
    assert_eq!(split_path("image"), pair("", "image"));
}

#[test]
fn test_two_segments() {
    assert_eq!(split_path("repo/image"), pair("repo", "image"));
}

#[test]
fn test_deeper_paths_keep_last_two_segments() {
    assert_eq!(split_path("ns/repo/image"), pair("repo", "image"));
    assert_eq!(
        split_path("gitlab-org/group/sub/project"),
        pair("sub", "project")
    );
}

#[test]
fn test_empty_path() {
    assert_eq!(split_path(""), pair("", ""));
}

#[test]
fn test_trailing_slash_yields_empty_image() {
    assert_eq!(split_path("repo/"), pair("repo", ""));
}

#[test]
fn test_leading_slash_yields_empty_repository() {
    assert_eq!(split_path("/image"), pair("", "image"));
}
