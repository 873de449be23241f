//! Minimal HTTP/1.1 server for probe integration tests.
//!
//! Answers every connection according to a fixed [`Behavior`] and closes it.
//! Runs on a background thread until the process exits.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Respond to every request with this status.
    Status(u16),
    /// `/` redirects with 302 to `/landing`, which answers with `final_status`.
    Redirect { final_status: u16 },
    /// `/` redirects to itself forever.
    RedirectLoop,
    /// Read the request, then say nothing for this long.
    Stall(Duration),
}

/// Starts a server and returns its port on 127.0.0.1.
pub fn start(behavior: Behavior) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream, behavior));
        }
    });
    port
}

/// A port on 127.0.0.1 with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().unwrap().port()
}

fn handle(mut stream: TcpStream, behavior: Behavior) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let response = match behavior {
        Behavior::Status(status) => plain(status),
        Behavior::Redirect { final_status } => {
            if path == "/" {
                redirect("/landing")
            } else {
                plain(final_status)
            }
        }
        Behavior::RedirectLoop => redirect("/"),
        Behavior::Stall(duration) => {
            thread::sleep(duration);
            return;
        }
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn plain(status: u16) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status,
        reason(status)
    )
}

fn redirect(location: &str) -> String {
    format!(
        "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        location
    )
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
