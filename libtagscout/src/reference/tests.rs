use super::*;
use std::str::FromStr;

#[test]
fn test_repository_ref_from_valid_string() {
    let reference = RepositoryRef::from_str("registry.example.com/library/nginx").unwrap();

    assert_eq!(reference.registry(), "registry.example.com");
    assert_eq!(reference.repository(), "library/nginx");
    assert_eq!(reference.to_string(), "registry.example.com/library/nginx");
}

#[test]
fn test_repository_ref_with_port() {
    let reference = RepositoryRef::from_str("127.0.0.1:5000/team/app").unwrap();

    assert_eq!(reference.registry(), "127.0.0.1:5000");
    assert_eq!(reference.repository(), "team/app");
}

#[test]
fn test_repository_ref_rejects_uppercase() {
    let reference = RepositoryRef::from_str("registry.example.com/library/NGINX");

    assert!(matches!(
        reference.unwrap_err(),
        ScoutError::Validation { .. }
    ));
}

#[test]
fn test_repository_ref_rejects_tag() {
    let reference = RepositoryRef::from_str("registry.example.com/library/nginx:1.21");

    assert!(matches!(
        reference.unwrap_err(),
        ScoutError::Validation { .. }
    ));
}

#[test]
fn test_repository_ref_rejects_digest() {
    let reference = RepositoryRef::from_str(
        "ghcr.io/user/repo@sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc",
    );

    assert!(reference.is_err());
}

#[test]
fn test_tagged_ref_accessors() {
    let reference = TaggedRef::from_str("ghcr.io/user/repo:latest").unwrap();

    assert_eq!(reference.registry(), "ghcr.io");
    assert_eq!(reference.repository(), "user/repo");
    assert_eq!(reference.tag(), "latest");
    assert_eq!(reference.to_string(), "ghcr.io/user/repo:latest");
}

#[test]
fn test_tagged_ref_with_port_and_tag() {
    let reference = TaggedRef::from_str("localhost:5000/library/nginx:1.21").unwrap();

    assert_eq!(reference.registry(), "localhost:5000");
    assert_eq!(reference.repository(), "library/nginx");
    assert_eq!(reference.tag(), "1.21");
}

#[test]
fn test_tagged_ref_rejects_invalid_tag_characters() {
    let reference = TaggedRef::from_str("ghcr.io/user/repo:1.0+build");

    assert!(reference.is_err());
}
