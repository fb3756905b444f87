// Scripted FTP server used by the integration tests.
#![allow(dead_code)]

use rouilleftp::{ClientConfig, PassiveMode};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub struct FakeServer {
    listener: TcpListener,
    pub addr: SocketAddr,
}

impl FakeServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { listener, addr }
    }

    /// Client configuration pointing at this server.
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            username: "ftpuser".to_string(),
            password: "pass".to_string(),
            io_timeout_secs: 5,
            download_buffer_size: 256,
            upload_buffer_size: 256,
            passive_mode: PassiveMode::Extended,
        }
    }

    pub async fn accept(&self) -> ControlPeer {
        let (socket, _) = self.listener.accept().await.unwrap();
        ControlPeer {
            reader: BufReader::new(socket),
        }
    }
}

/// Server end of one control connection.
pub struct ControlPeer {
    reader: BufReader<TcpStream>,
}

impl ControlPeer {
    pub async fn reply(&mut self, line: &str) {
        let socket = self.reader.get_mut();
        socket.write_all(line.as_bytes()).await.unwrap();
        socket.write_all(b"\r\n").await.unwrap();
        socket.flush().await.unwrap();
    }

    /// Next command line without its terminator, `None` once the client hangs up.
    pub async fn read_command(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap_or(0);
        if n == 0 {
            return None;
        }
        assert!(line.ends_with("\r\n"), "command not CRLF terminated: {:?}", line);
        Some(line.trim_end_matches("\r\n").to_string())
    }

    pub async fn expect(&mut self, command: &str) {
        let received = self.read_command().await;
        assert_eq!(received.as_deref(), Some(command));
    }

    pub async fn expect_reply(&mut self, command: &str, reply: &str) {
        self.expect(command).await;
        self.reply(reply).await;
    }

    pub async fn greet(&mut self) {
        self.reply("220-Welcome to the fake server").await;
        self.reply("220 Service ready for new user.").await;
    }

    pub async fn login(&mut self) {
        self.expect_reply("USER ftpuser", "331 User name okay, need password.")
            .await;
        self.expect_reply("PASS pass", "230 User logged in, proceed.")
            .await;
    }

    /// Answers `EPSV` with a fresh listener for the data connection.
    pub async fn epsv(&mut self) -> TcpListener {
        self.expect("EPSV").await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        self.reply(&format!(
            "229 Entering Extended Passive Mode (|||{}|)",
            port
        ))
        .await;
        listener
    }

    /// Answers `PASV` with a fresh listener for the data connection.
    pub async fn pasv(&mut self) -> TcpListener {
        self.expect("PASV").await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        self.reply(&format!(
            "227 Entering Passive Mode (127,0,0,1,{},{}).",
            port / 256,
            port % 256
        ))
        .await;
        listener
    }

    /// Serves a `LIST` over the given passive listener.
    pub async fn serve_list(&mut self, listener: TcpListener, listing: &str) {
        self.serve_list_replying(listener, listing, "226 Transfer complete.")
            .await;
    }

    /// Like [`ControlPeer::serve_list`] with a chosen completion reply.
    pub async fn serve_list_replying(&mut self, listener: TcpListener, listing: &str, completion: &str) {
        self.expect_reply("LIST", "150 Opening ASCII mode data connection for file list.")
            .await;
        let mut data = accept_data(&listener).await;
        data.write_all(listing.as_bytes()).await.unwrap();
        drop(data);
        self.reply(completion).await;
    }

    /// Serves `TYPE I`, `SIZE`, `EPSV` and `RETR`, writing the payload in the
    /// given chunks.
    pub async fn serve_download(&mut self, name: &str, announced: usize, chunks: &[&[u8]]) {
        self.expect_reply("TYPE I", "200 Type set to I").await;
        self.expect_reply(&format!("SIZE {}", name), &format!("213 {}", announced))
            .await;
        let listener = self.epsv().await;
        self.expect_reply(&format!("RETR {}", name), "150 Opening data connection.")
            .await;

        let mut data = accept_data(&listener).await;
        for chunk in chunks {
            data.write_all(chunk).await.unwrap();
            data.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        drop(data);
    }

    /// Serves `TYPE I`, `EPSV` and `STOR`, returning what the client sent.
    pub async fn serve_upload(&mut self, name: &str) -> Vec<u8> {
        self.serve_upload_replying(name, "226 File transfer complete.")
            .await
    }

    /// Like [`ControlPeer::serve_upload`] with a chosen completion reply.
    pub async fn serve_upload_replying(&mut self, name: &str, completion: &str) -> Vec<u8> {
        let mut data = self.open_upload(name).await;
        let mut received = Vec::new();
        data.read_to_end(&mut received).await.unwrap();
        self.reply(completion).await;
        received
    }

    /// Runs `TYPE I`, `EPSV` and `STOR` and hands back the accepted data socket.
    pub async fn open_upload(&mut self, name: &str) -> TcpStream {
        self.expect_reply("TYPE I", "200 Type set to I").await;
        let listener = self.epsv().await;
        self.expect_reply(
            &format!("STOR {}", name),
            "150 Ok to send data.",
        )
        .await;
        accept_data(&listener).await
    }

    pub async fn quit(&mut self) {
        self.expect_reply("QUIT", "221 Service closing control connection.")
            .await;
    }

    /// Asserts the client sends nothing more and closes its end.
    pub async fn assert_client_closed(&mut self) {
        assert_eq!(self.read_command().await, None);
    }
}

pub async fn accept_data(listener: &TcpListener) -> TcpStream {
    let (stream, _) = tokio::time::timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("client never opened the data connection")
        .unwrap();
    stream
}
