//! Minimal HTTP/1.1 server answering canned JSON bodies per path.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Script = Arc<Mutex<HashMap<String, VecDeque<(u16, String)>>>>;

pub struct HttpStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl HttpStub {
    /// Serves `routes` as `(path, status, body)`. Several entries for one path
    /// are answered in order and the last one repeats. Unknown paths get 404.
    pub async fn serve(routes: &[(&str, u16, &str)]) -> Self {
        let mut table: HashMap<String, VecDeque<(u16, String)>> = HashMap::new();
        for (path, status, body) in routes {
            table
                .entry(path.to_string())
                .or_default()
                .push_back((*status, body.to_string()));
        }
        let script: Script = Arc::new(Mutex::new(table));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (script_task, requests_task) = (script.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(handle(socket, script_task.clone(), requests_task.clone()));
            }
        });

        Self { base_url, requests }
    }

    /// Request bodies received on `path`, in arrival order.
    pub fn bodies(&self, path: &str) -> Vec<serde_json::Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| serde_json::from_str(body).unwrap_or(serde_json::Value::Null))
            .collect()
    }
}

async fn handle(mut socket: TcpStream, script: Script, requests: Arc<Mutex<Vec<(String, String)>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    requests.lock().unwrap().push((path.clone(), body));

    let (status, payload) = {
        let mut table = script.lock().unwrap();
        match table.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or((404, "{}".into())),
            None => (404, "{}".into()),
        }
    };
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
