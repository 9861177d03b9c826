//! Fixed response payloads. There are exactly four: the upload form, the CORS
//! preflight answer, the success page and the error page. Every one of them
//! closes the connection, which is what keeps the parser stateless across
//! requests.

// upload form with an XHR upload so the browser shows live progress.
// the page may be opened from a non-http origin, hence the permissive CORS.
const FORM_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Send a book</title>
<style>
body { font-family: -apple-system, sans-serif; max-width: 30em; margin: 3em auto; padding: 0 1em; }
#track { background: #eee; border-radius: 6px; height: 12px; margin-top: 1em; overflow: hidden; }
#bar { background: #4a90d9; height: 100%; width: 0; transition: width .1s; }
button { margin-top: 1em; padding: .4em 1.2em; }
</style>
</head>
<body>
<h1>Send a book</h1>
<p>Pick a plain-text file and it will appear on the device.</p>
<form id="form" enctype="multipart/form-data">
<input type="file" id="book" name="book" accept=".txt" required>
<button type="submit">Upload</button>
</form>
<div id="track"><div id="bar"></div></div>
<p id="status"></p>
<script>
document.getElementById('form').addEventListener('submit', function (ev) {
  ev.preventDefault();
  var file = document.getElementById('book').files[0];
  if (!file) { return; }
  var data = new FormData();
  data.append('book', file);
  var xhr = new XMLHttpRequest();
  xhr.open('POST', '/upload');
  xhr.upload.onprogress = function (e) {
    if (e.lengthComputable) {
      var pct = Math.round(e.loaded / e.total * 100);
      document.getElementById('bar').style.width = pct + '%';
      document.getElementById('status').textContent = pct + '%';
    }
  };
  xhr.onload = function () {
    document.open();
    document.write(xhr.responseText);
    document.close();
  };
  xhr.onerror = function () {
    document.getElementById('status').textContent = 'upload failed';
  };
  xhr.send(data);
});
</script>
</body>
</html>
"##;

// status line + headers + html body, one write, then the socket closes
fn html_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {len}\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        status = status,
        len = body.len(),
        body = body,
    )
}

/// `200 OK` upload form, served for any plain GET.
pub fn upload_form() -> String {
    html_response("200 OK", FORM_PAGE)
}

/// `204 No Content` CORS preflight answer. No body.
pub fn preflight() -> String {
    "HTTP/1.1 204 No Content\r\n\
     Access-Control-Allow-Origin: *\r\n\
     Access-Control-Allow-Methods: POST, GET, OPTIONS\r\n\
     Access-Control-Allow-Headers: Content-Type\r\n\
     Connection: close\r\n\
     \r\n"
        .to_string()
}

/// `200 OK` success page bearing the received filename, redirecting back to
/// the form after a short delay.
pub fn success_page(file_name: &str) -> String {
    let body = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <meta http-equiv=\"refresh\" content=\"3;url=/\"><title>Received</title></head>\
         <body style=\"font-family: sans-serif; text-align: center; margin-top: 4em;\">\
         <h1>Received {name}</h1><p>Taking you back to the form&hellip;</p>\
         </body></html>\n",
        name = file_name,
    );
    html_response("200 OK", &body)
}

/// `400 Bad Request` error page with a human-readable message and the same
/// delayed redirect.
pub fn error_page(message: &str) -> String {
    let body = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <meta http-equiv=\"refresh\" content=\"3;url=/\"><title>Upload failed</title></head>\
         <body style=\"font-family: sans-serif; text-align: center; margin-top: 4em;\">\
         <h1>Upload failed</h1><p>{message}</p>\
         </body></html>\n",
        message = message,
    );
    html_response("400 Bad Request", &body)
}
