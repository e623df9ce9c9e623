//! JSON-RPC connection over a child process's stdio.
//!
//! Reading and writing happen on two background threads that talk to the connection over
//! channels, so nothing here blocks the caller except [`Connection::recv_timeout`].

use crate::error::ClientError;
use crate::transport::{read_message, write_message};
use serde_json::{Value, json};
use std::io::{BufReader, BufWriter, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
/// Something that arrived from the server side.
pub enum Inbound {
    /// A decoded JSON-RPC message.
    Message(Value),
    /// The reader or writer thread stopped; no further messages will arrive.
    Failed(String),
}

/// A JSON-RPC connection to one checker process.
pub struct Connection {
    child: Option<Child>,
    tx: mpsc::Sender<Value>,
    rx: mpsc::Receiver<Inbound>,
    next_id: u64,
}

impl Connection {
    /// Spawn `cmd` and connect to its stdio.
    ///
    /// `stdin` and `stdout` are overridden to be piped; configure `stderr` on `cmd` beforehand
    /// (a terminal front-end should send it to `Stdio::null()`).
    pub fn spawn(mut cmd: Command) -> Result<Self, ClientError> {
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped());
        let mut child = cmd.spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClientError::Closed("checker stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClientError::Closed("checker stdout unavailable".to_string()))?;

        let mut conn = Self::from_streams(stdout, stdin);
        conn.child = Some(child);
        Ok(conn)
    }

    /// Connect over an arbitrary reader/writer pair.
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (tx_out, rx_out) = mpsc::channel::<Value>();
        let (tx_in, rx_in) = mpsc::channel::<Inbound>();

        {
            let tx_in = tx_in.clone();
            thread::spawn(move || write_loop(writer, rx_out, tx_in));
        }
        thread::spawn(move || read_loop(reader, tx_in));

        Self::from_channels(tx_out, rx_in)
    }

    /// Connect over raw channels: `tx` receives every outgoing message, `rx` supplies inbound
    /// ones. Used to drive a checker in-process.
    pub fn from_channels(tx: mpsc::Sender<Value>, rx: mpsc::Receiver<Inbound>) -> Self {
        Self {
            child: None,
            tx,
            rx,
            next_id: 1,
        }
    }

    /// Send a notification.
    pub fn notify(&self, method: &str, params: Value) -> Result<(), ClientError> {
        self.send(json!({ "jsonrpc": "2.0", "method": method, "params": params }))
    }

    /// Send a request and return its id.
    pub fn request(&mut self, method: &str, params: Value) -> Result<u64, ClientError> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))?;
        Ok(id)
    }

    /// Answer a server-to-client request. `id` is echoed back unchanged (it may be a string).
    pub fn respond(&self, id: Value, result: Value) -> Result<(), ClientError> {
        self.send(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }

    fn send(&self, message: Value) -> Result<(), ClientError> {
        self.tx
            .send(message)
            .map_err(|_| ClientError::Closed("writer thread stopped".to_string()))
    }

    /// Next inbound message, if one has already arrived.
    pub fn try_recv(&self) -> Result<Option<Value>, ClientError> {
        match self.rx.try_recv() {
            Ok(Inbound::Message(msg)) => Ok(Some(msg)),
            Ok(Inbound::Failed(reason)) => Err(ClientError::Closed(reason)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(ClientError::Closed("reader thread stopped".to_string()))
            }
        }
    }

    /// Wait up to `timeout` for the next inbound message. `Ok(None)` means the time ran out.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Value>, ClientError> {
        match self.rx.recv_timeout(timeout) {
            Ok(Inbound::Message(msg)) => Ok(Some(msg)),
            Ok(Inbound::Failed(reason)) => Err(ClientError::Closed(reason)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(ClientError::Closed("reader thread stopped".to_string()))
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        // Give the process a moment to act on `exit` before killing it.
        let deadline = Instant::now() + Duration::from_millis(200);
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(%status, "checker exited");
                    return;
                }
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(_) => break,
            }
        }
        if let Err(err) = child.kill() {
            tracing::debug!(%err, "failed to kill checker");
        }
        let _ = child.wait();
    }
}

fn write_loop<W: Write>(writer: W, rx: mpsc::Receiver<Value>, tx_in: mpsc::Sender<Inbound>) {
    let mut writer = BufWriter::new(writer);
    for value in rx {
        if let Err(err) = write_message(&mut writer, &value) {
            let _ = tx_in.send(Inbound::Failed(err.to_string()));
            break;
        }
    }
}

fn read_loop<R: Read>(reader: R, tx: mpsc::Sender<Inbound>) {
    let mut reader = BufReader::new(reader);
    loop {
        match read_message(&mut reader) {
            Ok(Some(value)) => {
                if tx.send(Inbound::Message(value)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                let _ = tx.send(Inbound::Failed("checker closed its output".to_string()));
                break;
            }
            Err(err) => {
                let _ = tx.send(Inbound::Failed(err.to_string()));
                break;
            }
        }
    }
}
