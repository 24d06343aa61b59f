#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use std::path::Path;

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::{PredicateBooleanExt, predicate};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PAGE_1: &str = r#"{
    "Search": [
        {"Title":"Batman Begins","Year":"2005","imdbID":"tt0372784","Type":"movie","Poster":"N/A"},
        {"Title":"Batman: The Animated Series","Year":"1992–1995","imdbID":"tt0103359","Type":"series","Poster":"N/A"}
    ],
    "totalResults":"57",
    "Response":"True"
}"#;

const DETAIL_BODY: &str = r#"{
    "Title":"Batman Begins","Year":"2005","Released":"15 Jun 2005","Runtime":"140 min",
    "Genre":"Action, Drama","Director":"Christopher Nolan","Actors":"Christian Bale, Michael Caine",
    "Plot":"After witnessing his parents' death...","Poster":"N/A","imdbRating":"8.2",
    "imdbID":"tt0372784","Type":"movie","Response":"True"
}"#;

fn write_config(dir: &Path, server: &MockServer) {
    let config = format!(
        "[omdb]\napi_key = \"test-key\"\nbase_url = \"{}/\"\n",
        server.uri()
    );
    std::fs::write(dir.join("config.toml"), config).unwrap();
}

fn dir_arg(dir: &Path) -> String {
    dir.to_str().unwrap().to_owned()
}

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("reelscout");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("favorites"))
        .stdout(predicate::str::contains("browse"));
}

#[test]
fn test_search_missing_query() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("reelscout");
    cmd.args(["search"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--query"));
}

#[test]
fn test_search_rejects_unknown_type() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("reelscout");
    cmd.args(["search", "--query", "batman", "--type", "game"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown type"));
}

#[test]
fn test_search_without_api_key_fails_fast() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("reelscout");
    cmd.env_remove("OMDB_API_KEY")
        .args(["--dir", &dir_arg(dir.path()), "search", "--query", "batman"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is missing"));
}

#[test]
fn test_details_without_api_key_fails_fast() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("reelscout");
    cmd.env_remove("OMDB_API_KEY")
        .args(["--dir", &dir_arg(dir.path()), "details", "--id", "tt0372784"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is missing"));
}

#[test]
fn test_favorites_list_empty() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("reelscout");
    cmd.args(["--dir", &dir_arg(dir.path()), "favorites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No favorites yet"));
}

#[test]
fn test_favorites_remove_unknown() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("reelscout");
    cmd.args(["--dir", &dir_arg(dir.path()), "favorites", "remove", "--id", "tt0000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is not a favorite"));
}

#[test]
fn test_theme_set_then_show() {
    // Arrange
    let tmp = tempfile::tempdir().unwrap();
    let dir = dir_arg(tmp.path());

    // Act
    cargo_bin_cmd!("reelscout")
        .args(["--dir", &dir, "theme", "set", "dark"])
        .assert()
        .success();

    // Assert
    cargo_bin_cmd!("reelscout")
        .args(["--dir", &dir, "theme", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: dark"));
}

#[test]
fn test_theme_defaults_to_config() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[ui]\ntheme = \"dark\"\n").unwrap();

    // Act & Assert
    cargo_bin_cmd!("reelscout")
        .args(["--dir", &dir_arg(dir.path()), "theme", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: light"));
}

#[test]
fn test_theme_set_rejects_unknown() {
    // Arrange & Act & Assert
    cargo_bin_cmd!("reelscout")
        .args(["theme", "set", "sepia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown theme"));
}

#[test]
fn test_completions_bash() {
    // Arrange & Act & Assert
    cargo_bin_cmd!("reelscout")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reelscout"));
}

#[tokio::test]
async fn test_search_against_mock_catalog() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("s", "batman"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SEARCH_PAGE_1, "application/json"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);
    let dir_path = dir_arg(dir.path());

    // Act
    let assert = tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("reelscout")
            .env_remove("OMDB_API_KEY")
            .args(["--dir", &dir_path, "search", "--query", "batman", "--type", "movie"])
            .assert()
    })
    .await
    .unwrap();

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains("tt0372784"))
        .stdout(predicate::str::contains("tt0103359").not())
        .stdout(predicate::str::contains("Page 1 of 6 (57 results)"));
}

#[tokio::test]
async fn test_search_rejection_exits_non_zero() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"Response":"False","Error":"Movie not found!"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);
    let dir_path = dir_arg(dir.path());

    // Act
    let assert = tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("reelscout")
            .env_remove("OMDB_API_KEY")
            .args(["--dir", &dir_path, "search", "--query", "zzqqzz"])
            .assert()
    })
    .await
    .unwrap();

    // Assert
    assert
        .failure()
        .stdout(predicate::str::contains("check the movie title spelling"))
        .stderr(predicate::str::contains("Movie not found!"));
}

#[tokio::test]
async fn test_favorites_add_then_list() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("i", "tt0372784"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(DETAIL_BODY, "application/json"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);
    let dir_path = dir_arg(dir.path());

    // Act
    let (add, list) = tokio::task::spawn_blocking(move || {
        let add = cargo_bin_cmd!("reelscout")
            .env_remove("OMDB_API_KEY")
            .args(["--dir", &dir_path, "favorites", "add", "--id", "tt0372784"])
            .assert();
        let list = cargo_bin_cmd!("reelscout")
            .args(["--dir", &dir_path, "favorites", "list"])
            .assert();
        (add, list)
    })
    .await
    .unwrap();

    // Assert
    add.success()
        .stdout(predicate::str::contains("Added tt0372784 (Batman Begins)"));
    list.success()
        .stdout(predicate::str::contains("Batman Begins"))
        .stdout(predicate::str::contains("Total: 1 favorites"));
}
