//! End-to-end export tests against a local HTTP server.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pokethumb::{
    EditorState, ExportConfig, ExportOutcome, ExportPipeline, OutputFormat, CANVAS_HEIGHT,
    CANVAS_WIDTH,
};
use tiny_http::{Header, Response, Server};

type Handler = Box<dyn Fn(&str) -> Response<Cursor<Vec<u8>>> + Send + Sync>;

/// Start a local server that records every request path
fn start_server(handler: Handler) -> (String, Arc<Mutex<Vec<String>>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let url = request.url().to_string();
            log.lock().unwrap().push(url);
            let response = handler(request.url());
            let _ = request.respond(response);
        }
    });
    (base, requests)
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 0, 0, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn png_response() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(png_bytes())
        .with_header("Content-Type: image/png".parse::<Header>().unwrap())
}

fn temp_out_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pokethumb-it-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn pipeline(relay_base: String, out_dir: PathBuf) -> ExportPipeline {
    ExportPipeline::new(ExportConfig {
        relay_base,
        out_dir,
        timeout_ms: 5000,
    })
    .unwrap()
}

#[test]
fn cross_origin_image_is_inlined_via_the_relay() {
    let (base, requests) = start_server(Box::new(|url| {
        if url.starts_with("/relay") || url == "/img.png" {
            png_response()
        } else {
            Response::from_data(b"Not Found".to_vec()).with_status_code(404)
        }
    }));
    let relay_base = format!("{}/relay", base);
    let out = temp_out_dir("relay-success");

    let mut editor = EditorState::new(relay_base.clone());
    editor.set_image_ref(format!("{}/img.png", base));
    let displayed_before = editor.displayed_image().to_string();
    assert!(displayed_before.starts_with(&relay_base));

    let p = pipeline(relay_base, out.clone());
    let outcome = p.export(&mut editor, OutputFormat::Png).unwrap();

    let ExportOutcome::Written { path, .. } = outcome else {
        panic!("expected a written file");
    };
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "pokemon-thumbnail-classic-up.png"
    );
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));

    // The proxied candidate was tried first and satisfied the inline fetch;
    // the raw URL was never needed.
    let log = requests.lock().unwrap();
    assert!(log[0].starts_with("/relay?url="));
    assert!(!log.iter().any(|u| u == "/img.png"));

    // The displayed reference was swapped for capture, then restored
    assert_eq!(editor.displayed_image(), displayed_before);

    let _ = std::fs::remove_dir_all(out);
}

#[test]
fn inline_falls_back_to_the_raw_url_when_the_relay_fails() {
    let (base, requests) = start_server(Box::new(|url| {
        if url.starts_with("/relay") {
            Response::from_data(b"relay down".to_vec()).with_status_code(500)
        } else if url == "/img.png" {
            png_response()
        } else {
            Response::from_data(b"Not Found".to_vec()).with_status_code(404)
        }
    }));
    let relay_base = format!("{}/relay", base);
    let out = temp_out_dir("relay-fallback");

    let mut editor = EditorState::new(relay_base.clone());
    editor.set_image_ref(format!("{}/img.png", base));

    let p = pipeline(relay_base, out.clone());
    let outcome = p.export(&mut editor, OutputFormat::Png).unwrap();
    assert!(matches!(outcome, ExportOutcome::Written { .. }));

    let log = requests.lock().unwrap();
    assert!(log[0].starts_with("/relay?url="));
    assert_eq!(log[1], "/img.png");

    let _ = std::fs::remove_dir_all(out);
}

#[test]
fn export_proceeds_when_every_inline_candidate_fails() {
    let (base, _requests) = start_server(Box::new(|_| {
        Response::from_data(b"nope".to_vec()).with_status_code(500)
    }));
    let relay_base = format!("{}/relay", base);
    let out = temp_out_dir("inline-exhausted");

    let mut editor = EditorState::new(relay_base.clone());
    editor.set_image_ref(format!("{}/img.png", base));
    let displayed_before = editor.displayed_image().to_string();

    let p = pipeline(relay_base, out.clone());
    // Inlining is best-effort: the composition exports without the artwork
    let outcome = p.export(&mut editor, OutputFormat::Png).unwrap();
    assert!(matches!(outcome, ExportOutcome::Written { .. }));
    assert_eq!(editor.displayed_image(), displayed_before);

    let _ = std::fs::remove_dir_all(out);
}

#[test]
fn proxy_disabled_fetches_the_raw_url_directly() {
    let (base, requests) = start_server(Box::new(|url| {
        if url == "/img.png" {
            png_response()
        } else {
            Response::from_data(b"Not Found".to_vec()).with_status_code(404)
        }
    }));
    let relay_base = format!("{}/relay", base);
    let out = temp_out_dir("no-proxy");

    let mut editor = EditorState::new(relay_base.clone());
    editor.set_proxy_enabled(false);
    editor.set_image_ref(format!("{}/img.png", base));
    assert_eq!(editor.displayed_image(), format!("{}/img.png", base));

    let p = pipeline(relay_base, out.clone());
    let outcome = p.export(&mut editor, OutputFormat::Png).unwrap();
    assert!(matches!(outcome, ExportOutcome::Written { .. }));

    let log = requests.lock().unwrap();
    assert_eq!(log[0], "/img.png");
    assert!(!log.iter().any(|u| u.starts_with("/relay")));

    let _ = std::fs::remove_dir_all(out);
}

#[test]
fn jpeg_export_writes_a_jpeg_file() {
    let out = temp_out_dir("jpeg");
    let p = pipeline("http://127.0.0.1:9/relay".to_string(), out.clone());
    let mut editor = EditorState::new("http://127.0.0.1:9/relay");

    let outcome = p.export(&mut editor, OutputFormat::Jpeg).unwrap();
    let ExportOutcome::Written { path, .. } = outcome else {
        panic!("expected a written file");
    };
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "pokemon-thumbnail-classic-up.jpg"
    );
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);

    let _ = std::fs::remove_dir_all(out);
}
