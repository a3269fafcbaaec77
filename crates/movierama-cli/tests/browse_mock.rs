//! Interactive listing driven through stdin against a mock API.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn signed_in_home() -> TempDir {
    let home = TempDir::new().unwrap();
    let session = json!({ "auth-token": "abc", "auth-user": "bob" });
    fs::write(home.path().join("session.json"), session.to_string()).unwrap();
    home
}

fn movies(likes: u64) -> serde_json::Value {
    json!({"movies": [{
        "id": 1, "title": "Heat", "description": "LA crime", "user_id": 2,
        "posted_by": "alice", "likes": likes, "hates": 0,
        "user_liked": false, "user_hated": false,
        "is_same_user": false, "time_ago": "1 hour ago"
    }]})
}

#[tokio::test]
async fn test_browse_resorts_and_votes() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = signed_in_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/movies"))
        .and(query_param("sort", "date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies(3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/movies"))
        .and(query_param("sort", "likes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies(3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/movies/1/action/like"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("movierama")
        .env("MOVIERAMA_HOME", home.path())
        .env("MOVIERAMA_API_URL", server.uri())
        .arg("browse")
        .write_stdin("sort likes\nlike 1\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as bob"))
        .stdout(predicate::str::contains("sorted by likes"))
        .stdout(predicate::str::contains("liked"));
}

#[tokio::test]
async fn test_browse_rejected_token_shows_login_hint() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = signed_in_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies(3)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/movies/1/action/hate"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("movierama")
        .env("MOVIERAMA_HOME", home.path())
        .env("MOVIERAMA_API_URL", server.uri())
        .arg("browse")
        .write_stdin("hate 1\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("token expired"))
        .stdout(predicate::str::contains("run `movierama login`"));
}

#[tokio::test]
async fn test_browse_go_opens_user_listing() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = signed_in_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/2/movies"))
        .and(query_param("sort", "date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"movies": []})))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("movierama")
        .env("MOVIERAMA_HOME", home.path())
        .env("MOVIERAMA_API_URL", server.uri())
        .arg("browse")
        .write_stdin("go /users/2/movies\ngo /login\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Movies by user 2"))
        .stdout(predicate::str::contains("No movies found."))
        .stdout(predicate::str::contains("is not a listing"));
}
