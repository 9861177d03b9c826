use bookdrop::error::ParseError;
use bookdrop::multipart::UploadSession;

// raw bytes of a complete upload request the way a browser would send it
fn multipart_request(file_name: &str, content: &str, boundary: &str) -> Vec<u8> {
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"book\"; filename=\"{f}\"\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         {c}\r\n\
         --{b}--\r\n",
        b = boundary,
        f = file_name,
        c = content,
    );
    format!(
        "POST /upload HTTP/1.1\r\n\
         Host: 192.168.1.20:8080\r\n\
         Content-Type: multipart/form-data; boundary={b}\r\n\
         Content-Length: {l}\r\n\
         \r\n\
         {body}",
        b = boundary,
        l = body.len(),
        body = body,
    )
    .into_bytes()
}

fn feed(request: &[u8], chunk_size: usize) -> UploadSession {
    let mut session = UploadSession::new();
    for chunk in request.chunks(chunk_size) {
        session.push(chunk);
    }
    session
}

#[test]
fn test_round_trip() {
    let request = multipart_request("book.txt", "hello 世界", "----WebKitFormBoundaryAbC123");
    let session = feed(&request, request.len());

    assert!(session.is_complete());
    let file = session.finish().unwrap();
    assert_eq!(file.file_name, "book.txt");
    assert_eq!(file.content, "hello 世界");
}

#[test]
fn test_fragmentation_invariance() {
    let request = multipart_request("fragmented.txt", "once upon a time\nthere was a parser", "XyZ");

    let whole = feed(&request, request.len()).finish().unwrap();
    let bytewise = feed(&request, 1).finish().unwrap();
    let sevens = feed(&request, 7).finish().unwrap();

    assert_eq!(whole, bytewise);
    assert_eq!(whole, sevens);
    assert_eq!(whole.file_name, "fragmented.txt");
    assert_eq!(whole.content, "once upon a time\nthere was a parser");
}

#[test]
fn test_progress_monotonicity() {
    let request = multipart_request("steady.txt", &"x".repeat(500), "BBB");

    let mut session = UploadSession::new();
    let mut reported = Vec::new();
    for chunk in request.chunks(7) {
        session.push(chunk);
        let frame = session.progress();
        if let Some(total) = frame.total_bytes {
            assert!(frame.received_bytes <= total);
            reported.push(frame.received_bytes);
        } else {
            // progress is only meaningful once headers and length are known
            assert_eq!(frame.received_bytes, 0);
        }
    }

    assert!(reported.windows(2).all(|w| w[0] <= w[1]));
    let total = session.progress().total_bytes.unwrap();
    assert_eq!(*reported.last().unwrap(), total);
    assert!(session.is_complete());
}

#[test]
fn test_filename_can_arrive_late() {
    let request = multipart_request("late.txt", "content", "QQQ");

    let mut session = UploadSession::new();
    // only the request line so far; nothing derivable yet
    session.push(&request[..20]);
    assert!(session.file_name().is_none());
    assert_eq!(session.progress().received_bytes, 0);

    session.push(&request[20..]);
    assert_eq!(session.file_name(), Some("late.txt"));
    assert!(session.is_complete());
}

#[test]
fn test_missing_boundary_is_a_parse_error() {
    let body = "not really multipart at all";
    let request = format!(
        "POST /upload HTTP/1.1\r\n\
         Content-Type: multipart/form-data\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}",
        body.len(),
        body,
    );

    let session = feed(request.as_bytes(), 16);
    assert!(session.is_complete());
    assert_eq!(session.finish().unwrap_err(), ParseError::MissingBoundary);
}

#[test]
fn test_missing_filename_is_a_parse_error() {
    let boundary = "NoName";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"book\"\r\n\
         \r\n\
         anonymous bytes\r\n\
         --{b}--\r\n",
        b = boundary,
    );
    let request = format!(
        "POST /upload HTTP/1.1\r\n\
         Content-Type: multipart/form-data; boundary={b}\r\n\
         Content-Length: {l}\r\n\
         \r\n\
         {body}",
        b = boundary,
        l = body.len(),
        body = body,
    );

    let session = feed(request.as_bytes(), 32);
    assert_eq!(session.finish().unwrap_err(), ParseError::MissingFilename);
}

#[test]
fn test_truncated_upload_reports_missing_terminator() {
    let request = multipart_request("cut.txt", "this one gets cut off", "CUT");
    // drop the closing boundary marker entirely
    let truncated = &request[..request.len() - 12];

    let session = feed(truncated, 9);
    assert_eq!(session.finish().unwrap_err(), ParseError::MissingTerminator);
}

#[test]
fn test_non_utf8_content_is_unsupported_encoding() {
    let boundary = "BIN";
    let mut body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"book\"; filename=\"bad.txt\"\r\n\
         \r\n",
        b = boundary,
    )
    .into_bytes();
    body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let mut request = format!(
        "POST /upload HTTP/1.1\r\n\
         Content-Type: multipart/form-data; boundary={b}\r\n\
         Content-Length: {l}\r\n\
         \r\n",
        b = boundary,
        l = body.len(),
    )
    .into_bytes();
    request.extend_from_slice(&body);

    let session = feed(&request, 5);
    assert!(session.is_complete());
    assert_eq!(
        session.finish().unwrap_err(),
        ParseError::UnsupportedEncoding
    );
}
