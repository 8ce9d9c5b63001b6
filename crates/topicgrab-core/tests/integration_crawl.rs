//! Integration test: local forum server, full crawl into a temp directory.
//!
//! Serves a GBK-encoded listing page and topic pages with images, runs the
//! crawler over it and checks the resulting folder tree.

mod common;

use common::site_server::{self, Route, SiteServer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use topicgrab_core::config::CrawlConfig;
use topicgrab_core::crawl::Crawler;
use topicgrab_core::listing::PageRange;

const LISTING_PAGE_1: &str = "/thread0806.php?fid=8";

fn gbk(html: &str) -> Vec<u8> {
    let (bytes, _, unmappable) = encoding_rs::GBK.encode(html);
    assert!(!unmappable, "fixture must be representable in GBK");
    bytes.into_owned()
}

fn listing_html(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<tr class="tr3 t_one tac"><td>.::</td><td class="tal"><h3><a href="{href}">{title}</a></h3></td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><head><meta charset="gbk"></head><body><table id="ajaxtable"><tbody id="tbody">{rows}</tbody></table></body></html>"#
    )
}

fn topic_html(images: &[String]) -> String {
    let imgs: String = images.iter().map(|i| i.as_str()).collect();
    format!(
        r#"<html><body><div class="nav"><img src="/logo.gif"></div><div class="tpc_content">{imgs}</div></body></html>"#
    )
}

fn image_body(tag: &str) -> Vec<u8> {
    format!("\u{FF}\u{D8}fake-image-{}", tag).into_bytes()
}

fn config_for(server: &SiteServer, out: &Path) -> CrawlConfig {
    let mut cfg = CrawlConfig::default();
    cfg.site.base_url = server.base.clone();
    cfg.output_dir = out.to_path_buf();
    cfg.topic_delay_ms = 0;
    cfg.http.timeout_secs = 5;
    cfg
}

/// Two marked topics (three images each) and one unmarked topic.
fn forum_routes(base: &str) -> HashMap<String, Route> {
    let mut routes = HashMap::new();
    routes.insert(
        LISTING_PAGE_1.to_string(),
        Route::html(gbk(&listing_html(&[
            ("[亞洲] first topic", "htm_data/8/101.html"),
            ("[歐美] not wanted", "htm_data/8/102.html"),
            ("[亚洲] second/topic", "/htm_data/8/103.html"),
        ]))),
    );
    for id in ["101", "102", "103"] {
        routes.insert(
            format!("/htm_data/8/{}.html", id),
            Route::html(gbk(&topic_html(&[
                format!(r#"<img ess-data="/img/{id}-1.jpg" src="/loading.gif">"#),
                format!(r#"<img src="/img/{id}-2">"#),
                format!(r#"<img data-link="{base}/img/{id}-3.png">"#),
            ]))),
        );
        routes.insert(format!("/img/{}-1.jpg", id), Route::image(image_body(&format!("{id}-1"))));
        routes.insert(format!("/img/{}-2", id), Route::image(image_body(&format!("{id}-2"))));
        routes.insert(format!("/img/{}-3.png", id), Route::image(image_body(&format!("{id}-3"))));
    }
    routes
}

fn subdirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn end_to_end_two_marked_topics_three_images_each() {
    let server = site_server::start_with(forum_routes);
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let crawler = Crawler::new(&config_for(&server, &out)).unwrap();
    let report = crawler.run(PageRange::new(1, 1).unwrap()).unwrap();

    let dirs = subdirs(&out);
    assert_eq!(dirs.len(), 2, "one folder per marked topic: {:?}", dirs);
    let names: Vec<String> = dirs
        .iter()
        .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"[亞洲] first topic".to_string()));
    assert!(names.contains(&"[亚洲] second_topic".to_string()));

    for dir in &dirs {
        assert_eq!(file_names(dir), vec!["001.jpg", "002.jpg", "003.png"]);
    }
    let first = out.join("[亞洲] first topic");
    assert_eq!(fs::read(first.join("001.jpg")).unwrap(), image_body("101-1"));
    assert_eq!(fs::read(first.join("002.jpg")).unwrap(), image_body("101-2"));
    assert_eq!(fs::read(first.join("003.png")).unwrap(), image_body("101-3"));

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.topics_found, 2);
    assert_eq!(report.images_saved, 6);
    assert_eq!(report.images_failed, 0);

    let requests = server.requests();
    assert!(!requests.iter().any(|r| r == "/htm_data/8/102.html"));
    assert!(!requests.iter().any(|r| r == "/loading.gif" || r == "/logo.gif"));
}

#[test]
fn failed_topic_fetch_creates_no_folder_and_crawl_continues() {
    let server = site_server::start_with(|base| {
        let mut routes = forum_routes(base);
        routes.insert("/htm_data/8/101.html".to_string(), Route::status(500));
        routes
    });
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let crawler = Crawler::new(&config_for(&server, &out)).unwrap();
    let report = crawler.run(PageRange::new(1, 1).unwrap()).unwrap();

    assert!(!out.join("[亞洲] first topic").exists());
    let second = out.join("[亚洲] second_topic");
    assert_eq!(file_names(&second), vec!["001.jpg", "002.jpg", "003.png"]);
    assert_eq!(report.topics_found, 2);
    assert_eq!(report.topics_skipped, 1);
    assert_eq!(report.images_saved, 3);
}

#[test]
fn failed_image_does_not_stop_siblings() {
    let server = site_server::start_with(|base| {
        let mut routes = forum_routes(base);
        routes.remove("/img/101-2");
        routes
    });
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let crawler = Crawler::new(&config_for(&server, &out)).unwrap();
    let report = crawler.run(PageRange::new(1, 1).unwrap()).unwrap();

    let first = out.join("[亞洲] first topic");
    assert_eq!(file_names(&first), vec!["001.jpg", "003.png"]);
    assert_eq!(report.images_saved, 5);
    assert_eq!(report.images_failed, 1);
}

#[test]
fn topic_without_images_gets_no_folder() {
    let server = site_server::start_with(|_| {
        let mut routes = HashMap::new();
        routes.insert(
            LISTING_PAGE_1.to_string(),
            Route::html(gbk(&listing_html(&[("[亞洲] empty", "htm_data/8/1.html")]))),
        );
        routes.insert(
            "/htm_data/8/1.html".to_string(),
            Route::html(gbk(&topic_html(&["<p>words only</p>".to_string()]))),
        );
        routes
    });
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let report = Crawler::new(&config_for(&server, &out))
        .unwrap()
        .run(PageRange::new(1, 1).unwrap())
        .unwrap();

    assert!(subdirs(&out).is_empty());
    assert_eq!(report.topics_skipped, 1);
}

#[test]
fn page_range_visits_each_listing_url_once() {
    let server = site_server::start_with(|_| HashMap::new());
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let report = Crawler::new(&config_for(&server, &out))
        .unwrap()
        .run(PageRange::new(1, 3).unwrap())
        .unwrap();

    assert_eq!(
        server.requests(),
        vec![
            "/thread0806.php?fid=8".to_string(),
            "/thread0806.php?fid=8&search=&page=2".to_string(),
            "/thread0806.php?fid=8&search=&page=3".to_string(),
        ]
    );
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.pages_failed, 3);
    assert!(subdirs(&out).is_empty());
}

#[test]
fn rerun_overwrites_existing_files() {
    let server = site_server::start_with(forum_routes);
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let crawler = Crawler::new(&config_for(&server, &out)).unwrap();

    crawler.run(PageRange::new(1, 1).unwrap()).unwrap();
    let first = out.join("[亞洲] first topic");
    fs::write(first.join("001.jpg"), b"stale").unwrap();
    crawler.run(PageRange::new(1, 1).unwrap()).unwrap();

    assert_eq!(file_names(&first), vec!["001.jpg", "002.jpg", "003.png"]);
    assert_eq!(fs::read(first.join("001.jpg")).unwrap(), image_body("101-1"));
}

#[test]
fn archive_is_written_after_crawl() {
    let server = site_server::start_with(forum_routes);
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let mut cfg = config_for(&server, &out);
    cfg.archive = true;

    let report = Crawler::new(&cfg)
        .unwrap()
        .run(PageRange::new(1, 1).unwrap())
        .unwrap();

    let archive_path = report.archive.expect("archive path reported");
    assert_eq!(archive_path.file_name().unwrap(), "out.zip");
    let archive = zip::ZipArchive::new(fs::File::open(&archive_path).unwrap()).unwrap();
    let files = archive
        .file_names()
        .filter(|n| !n.ends_with('/'))
        .count();
    assert_eq!(files, 6);
}

#[test]
fn titles_that_sanitize_alike_get_separate_folders() {
    let long_a = format!("[亞洲] {} part one", "x".repeat(80));
    let long_b = format!("[亞洲] {} part two", "x".repeat(80));
    let titles = [
        "[亞洲] a/b".to_string(),
        "[亞洲] a:b".to_string(),
        long_a,
        long_b,
    ];
    let server = site_server::start_with(|_| {
        let rows: Vec<(&str, String)> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), format!("htm_data/8/{}.html", i + 1)))
            .collect();
        let rows: Vec<(&str, &str)> = rows.iter().map(|(t, h)| (*t, h.as_str())).collect();
        let mut routes = HashMap::new();
        routes.insert(LISTING_PAGE_1.to_string(), Route::html(gbk(&listing_html(&rows))));
        for i in 1..=titles.len() {
            routes.insert(
                format!("/htm_data/8/{}.html", i),
                Route::html(gbk(&topic_html(&[format!(r#"<img src="/img/{i}.jpg">"#)]))),
            );
            routes.insert(format!("/img/{}.jpg", i), Route::image(image_body(&i.to_string())));
        }
        routes
    });
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let report = Crawler::new(&config_for(&server, &out))
        .unwrap()
        .run(PageRange::new(1, 1).unwrap())
        .unwrap();

    assert_eq!(report.images_saved, 4);
    let dirs = subdirs(&out);
    assert_eq!(dirs.len(), 4, "one folder per distinct title: {:?}", dirs);

    assert_eq!(fs::read(out.join("[亞洲] a_b/001.jpg")).unwrap(), image_body("1"));
    assert_eq!(fs::read(out.join("[亞洲] a_b (2)/001.jpg")).unwrap(), image_body("2"));
    let capped = format!("[亞洲] {}", "x".repeat(75));
    assert_eq!(fs::read(out.join(&capped).join("001.jpg")).unwrap(), image_body("3"));
    assert_eq!(
        fs::read(out.join(format!("{} (2)", capped)).join("001.jpg")).unwrap(),
        image_body("4")
    );
}
