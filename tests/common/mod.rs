//! 测试辅助：记录消息的通知渠道、本地 Slack stub

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use wrapslack::{NotificationChannel, NotificationMessage, WrapError};

/// 只记录不发送的渠道
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: RefCell<Vec<NotificationMessage>>,
    pub fail_with: Option<String>,
}

impl RecordingChannel {
    pub fn failing(reason: &str) -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, message: &NotificationMessage) -> Result<(), WrapError> {
        if let Some(reason) = &self.fail_with {
            return Err(WrapError::Delivery(reason.clone()));
        }
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

/// stub 收到的请求
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// 只处理一个请求的 HTTP stub
pub struct SlackStub {
    pub api_url: String,
    requests: mpsc::Receiver<CapturedRequest>,
    handle: JoinHandle<()>,
}

impl SlackStub {
    /// 启动 stub，对唯一一个请求返回给定状态码和 body
    pub fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((k, v)) = line.split_once(':') {
                    let (k, v) = (k.trim().to_string(), v.trim().to_string());
                    if k.eq_ignore_ascii_case("content-length") {
                        content_length = v.parse().unwrap();
                    }
                    headers.push((k, v));
                }
            }

            let mut buf = vec![0u8; content_length];
            reader.read_exact(&mut buf).unwrap();

            tx.send(CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(buf).unwrap(),
            })
            .unwrap();

            let mut stream = stream;
            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        });

        Self {
            api_url: format!("http://{}/api", addr),
            requests: rx,
            handle,
        }
    }

    /// 等待并返回收到的请求
    pub fn finish(self) -> CapturedRequest {
        let request = self.requests.recv().unwrap();
        self.handle.join().unwrap();
        request
    }
}
