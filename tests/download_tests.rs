mod common;

use comicdl::archive::ArchiveWriter;
use comicdl::config::Config;
use comicdl::models::ComicSpec;
use comicdl::session::ComicSession;
use common::{comic_page, IMAGE_SELECTOR, NEXT_SELECTOR};
use std::fs;

fn test_config(base: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.storage.base_path = base.to_string_lossy().into_owned();
    config
}

fn test_spec(server: &mockito::Server) -> ComicSpec {
    ComicSpec::new(
        "test",
        &format!("{}/1.html", server.url()),
        NEXT_SELECTOR,
        IMAGE_SELECTOR,
    )
    .unwrap()
}

#[test]
fn download_saves_images_and_reruns_without_refetching() {
    let mut server = mockito::Server::new();
    let base = tempfile::tempdir().unwrap();

    let _page_one = server
        .mock("GET", "/1.html")
        .with_body(comic_page(Some("/img/one.jpg"), Some("/2.html")))
        .expect(2)
        .create();
    let _page_two = server
        .mock("GET", "/2.html")
        .with_body(comic_page(Some("/img/two.png"), Some("#")))
        .expect(2)
        .create();
    let image_one = server
        .mock("GET", "/img/one.jpg")
        .with_body("ONE")
        .expect(1)
        .create();
    let image_two = server
        .mock("GET", "/img/two.png")
        .with_body("TWO")
        .expect(1)
        .create();

    let session = ComicSession::new(test_spec(&server), test_config(base.path()));

    let outcome = session.download().unwrap();
    assert_eq!(outcome.pages.len(), 2);

    let destination = session.destination();
    assert_eq!(fs::read(destination.join("1.jpg")).unwrap(), b"ONE");
    assert_eq!(fs::read(destination.join("2.png")).unwrap(), b"TWO");

    // Second run resumes over the same destination: the pages are walked
    // again but no image is fetched twice.
    session.download().unwrap();
    image_one.assert();
    image_two.assert();
}

#[test]
fn failed_image_fetch_degrades_to_a_skip() {
    let mut server = mockito::Server::new();
    let base = tempfile::tempdir().unwrap();

    let _page_one = server
        .mock("GET", "/1.html")
        .with_body(comic_page(Some("/img/one.jpg"), Some("/2.html")))
        .create();
    let _page_two = server
        .mock("GET", "/2.html")
        .with_body(comic_page(Some("/img/two.png"), Some("#")))
        .create();
    let _missing = server.mock("GET", "/img/one.jpg").with_status(404).create();
    let _image_two = server.mock("GET", "/img/two.png").with_body("TWO").create();

    let session = ComicSession::new(test_spec(&server), test_config(base.path()));
    let outcome = session.download().unwrap();

    // The crawl itself kept going.
    assert_eq!(outcome.pages.len(), 2);
    let destination = session.destination();
    assert!(!destination.join("1.jpg").exists());
    assert!(destination.join("2.png").exists());
}

#[test]
fn images_inside_a_finalized_archive_are_not_refetched() {
    let mut server = mockito::Server::new();
    let base = tempfile::tempdir().unwrap();

    let _page = server
        .mock("GET", "/1.html")
        .with_body(comic_page(Some("/img/one.jpg"), Some("#")))
        .create();
    let image = server
        .mock("GET", "/img/one.jpg")
        .with_body("ONE")
        .expect(0)
        .create();

    // A previous run already produced test.cbz holding page 1.
    let mut writer = ArchiveWriter::create(&base.path().join("test.cbz")).unwrap();
    writer.append("1.jpg", b"ONE").unwrap();
    writer.finish().unwrap();

    let session = ComicSession::new(test_spec(&server), test_config(base.path()));
    session.download().unwrap();

    image.assert();
    assert!(!session.destination().join("1.jpg").exists());
}
