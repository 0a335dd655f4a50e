//! Tests for the reqwest-backed fetcher and folder lister against a local server.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, Url};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use zipstreamer::{
    AllowList, Body, Fetch, FolderLister, HttpFetcher, PremiumizeLister, ZipStream, collect_members,
    estimate,
};

/// Canned responses keyed by request target (path and query).
type Routes = HashMap<String, (u16, &'static str, Vec<u8>)>;

/// Serve `routes` over HTTP/1.1, one response per connection.
async fn serve(routes: Routes) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, content_type, body) = routes
                    .get(&target)
                    .cloned()
                    .unwrap_or((404, "text/plain", b"not found".to_vec()));

                let header = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Ignores any proxy configured in the environment.
fn local_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

fn route(
    path: &str,
    status: u16,
    content_type: &'static str,
    body: &[u8],
) -> (String, (u16, &'static str, Vec<u8>)) {
    (path.to_string(), (status, content_type, body.to_vec()))
}

#[tokio::test]
async fn fetcher_streams_success_and_rejects_errors() {
    let payload = vec![7u8; 100_000];
    let addr = serve(HashMap::from([
        route("/ok.bin", 200, "application/octet-stream", &payload),
        route("/gone.bin", 410, "text/plain", b"gone"),
    ]))
    .await;

    let fetcher = HttpFetcher::with_client(local_client());

    let url = Url::parse(&format!("http://{addr}/ok.bin")).unwrap();
    let mut body = fetcher.fetch(&url).await.unwrap();
    let mut received = Vec::new();
    while let Some(chunk) = body.chunk().await.unwrap() {
        received.extend_from_slice(&chunk);
    }
    assert_eq!(received, payload);

    let url = Url::parse(&format!("http://{addr}/gone.bin")).unwrap();
    let err = fetcher.fetch(&url).await.err().unwrap();
    assert!(err.to_string().contains("410"), "{err}");
}

#[tokio::test]
async fn archive_over_http_matches_estimate() {
    let addr = serve(HashMap::from([
        route("/files/a.txt", 200, "text/plain", b"alpha"),
        route("/files/b.txt", 200, "text/plain", b"bravo!"),
        route("/files/missing.txt", 500, "text/plain", b"boom"),
    ]))
    .await;

    let guard = AllowList::new(format!("http://{addr}/files/"));
    let ok = [
        guard.member(&format!("http://{addr}/files/a.txt"), "a.txt").unwrap().with_size(5),
        guard.member(&format!("http://{addr}/files/b.txt"), "b.txt").unwrap().with_size(6),
    ];
    let fetcher = HttpFetcher::with_client(local_client());

    let mut out = Vec::new();
    ZipStream::new(&ok, &fetcher, &mut out)
        .stream_all_files()
        .await
        .unwrap();
    assert_eq!(out.len() as u64, estimate(&ok).total());

    let mut archive = zip::ZipArchive::new(Cursor::new(out)).unwrap();
    let mut content = String::new();
    archive
        .by_name("b.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "bravo!");

    let with_failure = [
        ok[0].clone(),
        guard
            .member(&format!("http://{addr}/files/missing.txt"), "missing.txt")
            .unwrap(),
    ];
    let mut out = Vec::new();
    let report = ZipStream::new(&with_failure, &fetcher, &mut out)
        .stream_all_files()
        .await
        .unwrap();
    assert_eq!(report.files, 1);
    assert_eq!(report.skipped, ["missing.txt"]);
}

#[tokio::test]
async fn premiumize_lister_walks_folders() {
    let root = br#"{"status":"success","name":"Movies","content":[
        {"id":"1","name":"a.mkv","type":"file","directlink":"https://cdn.test/a.mkv","size":10},
        {"id":"2","name":"Extras","type":"folder"}
    ]}"#;
    let extras = br#"{"status":"success","name":"Extras","content":[
        {"id":"3","name":"b.mkv","type":"file","directlink":"https://cdn.test/b.mkv","size":20}
    ]}"#;
    let denied = br#"{"status":"error","message":"customer_id and pin param missing or not logged in"}"#;

    let addr = serve(HashMap::from([
        route("/list?apikey=k&path=Movies", 200, "application/json", root),
        route("/list?apikey=k&path=Movies%2FExtras", 200, "application/json", extras),
        route("/list?apikey=k&path=Secret", 200, "application/json", denied),
    ]))
    .await;

    let lister = PremiumizeLister::with_client(local_client(), format!("http://{addr}/list"), "k");

    let listing = lister.list("Movies").await.unwrap();
    assert_eq!(listing.name, "Movies");
    assert_eq!(listing.entries.len(), 2);

    let err = lister.list("Secret").await.unwrap_err();
    assert!(err.to_string().contains("not logged in"), "{err}");

    let roots = ["Movies".to_string(), "Secret".to_string()];
    let members = collect_members(&lister, &roots, &AllowList::default()).await;
    let paths: Vec<_> = members.iter().map(|m| m.zip_path()).collect();
    assert_eq!(paths, ["Movies/a.mkv", "Movies/Extras/b.mkv"]);
    assert_eq!(estimate(&members).file_data, 30);
}
