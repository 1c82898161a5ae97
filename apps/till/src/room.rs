//! # Room-Account Posting
//!
//! Bills charged to a hotel room are pushed to the front-office server.
//! The local `Pending → Billed` change is only committed once the server
//! answers 200.
//!
//! ## Wire Shape
//! ```json
//! {
//!   "billInfo":  { "bill_no": 17, "bill_id": "RS17-26/27", ... },
//!   "roomNo":    204,
//!   "itemsInfo": [ { "item_code": "PNT", "quantity": 2, ... } ],
//!   "clientName": "Room Service"
//! }
//! ```

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RoomAccountConfig;
use crate::error::{Classify, Operation, TillError};
use crate::signing::RequestSigner;
use rasoi_core::{Bill, OrderLineItem};

/// Body posted to the room-account API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPosting {
    pub bill_info: Bill,
    pub room_no: u32,
    pub items_info: Vec<OrderLineItem>,
    pub client_name: String,
}

#[derive(Debug, Error)]
pub enum RoomError {
    /// The server answered with something other than 200.
    #[error("status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// No usable answer (connect, TLS, timeout, signing).
    #[error("{0}")]
    Transport(String),
}

impl Classify for RoomError {
    fn classify(self, operation: Operation) -> TillError {
        match self {
            RoomError::Rejected { status, body } => TillError::UpstreamRejected {
                operation,
                status: Some(status),
                message: body,
            },
            RoomError::Transport(message) => TillError::UpstreamRejected {
                operation,
                status: None,
                message,
            },
        }
    }
}

/// The front-office server as the till sees it.
#[allow(async_fn_in_trait)]
pub trait RoomAccountGateway {
    async fn post_bill(&self, posting: &RoomPosting) -> Result<(), RoomError>;
}

/// `reqwest` client for the room-account API.
#[derive(Debug, Clone)]
pub struct HttpRoomAccount {
    client: reqwest::Client,
    endpoint: String,
    api_path: String,
    signer: Option<RequestSigner>,
}

impl HttpRoomAccount {
    pub fn new(config: &RoomAccountConfig) -> Result<Self, RoomError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RoomError::Transport(e.to_string()))?;

        let signer = config.auth_enabled.then(|| {
            RequestSigner::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                config.region.clone(),
                config.service.clone(),
                config.signing_host(),
            )
        });

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            api_path: config.api_path.clone(),
            signer,
        })
    }
}

impl RoomAccountGateway for HttpRoomAccount {
    #[instrument(skip(self, posting), fields(endpoint = %self.endpoint, bill_id = %posting.bill_info.bill_id))]
    async fn post_bill(&self, posting: &RoomPosting) -> Result<(), RoomError> {
        let body = serde_json::to_vec(posting).map_err(|e| RoomError::Transport(e.to_string()))?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(signer) = &self.signer {
            let headers = signer
                .sign("POST", &self.api_path, Some("application/json"), &body, Utc::now())
                .map_err(|e| RoomError::Transport(e.to_string()))?;
            for (name, value) in headers {
                if name != "Content-Type" {
                    request = request.header(name, value);
                }
            }
        }

        let response = request.body(body).send().await.map_err(|e| {
            error!(error = %e, "Room-account request failed");
            RoomError::Transport(e.to_string())
        })?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(status = %status, error = %e, "Room-account response body unreadable");
                format!("<unreadable body: {}>", e)
            }
        };
        debug!(status = %status, body = %text, "Room-account response");

        if status == reqwest::StatusCode::OK {
            info!("Bill posted to room account");
            Ok(())
        } else {
            error!(status = %status, body = %text, "Room account rejected the bill");
            Err(RoomError::Rejected {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rasoi_core::{compute_breakdown, DiscountPercent, GstCategory, GstRate, Money, NewOrderLine};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn posting() -> RoomPosting {
        let line = NewOrderLine::new(
            "PNT",
            "Paneer Tikka",
            Money::from_rupees(100),
            2,
            GstCategory::General,
            GstRate::from_percent(5),
        )
        .unwrap();
        let items = vec![OrderLineItem::from_new("l-1", "o-1", &line)];
        let breakdown = compute_breakdown(&items, DiscountPercent::zero())
            .unwrap()
            .unwrap();
        let bill = Bill {
            bill_no: 17,
            bill_id: "RS17-26/27".to_string(),
            prefix: "RS".to_string(),
            suffix: "26/27".to_string(),
            order_id: "o-1".to_string(),
            bill_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            bill_time: chrono::NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            breakdown,
        };
        RoomPosting {
            bill_info: bill,
            room_no: 204,
            items_info: items,
            client_name: "Room Service".to_string(),
        }
    }

    /// One-shot HTTP server: reads a full request, answers with `response`,
    /// hands back what it received.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if received.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).to_string()
        });

        (url, handle)
    }

    #[test]
    fn test_posting_wire_shape() {
        let json = serde_json::to_value(posting()).unwrap();
        assert_eq!(json["roomNo"], 204);
        assert_eq!(json["clientName"], "Room Service");
        assert_eq!(json["billInfo"]["bill_id"], "RS17-26/27");
        assert_eq!(json["itemsInfo"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ok_response_is_success() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
        )
        .await;
        let config = RoomAccountConfig {
            server_url: url,
            auth_enabled: true,
            access_key: "AKID".to_string(),
            secret_key: "secret".to_string(),
            ..Default::default()
        };

        let gateway = HttpRoomAccount::new(&config).unwrap();
        gateway.post_bill(&posting()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/restaurant/processBill"));
        assert!(request.to_ascii_lowercase().contains("authorization: aws4-hmac-sha256"));
        assert!(request.contains("\"roomNo\":204"));
    }

    #[tokio::test]
    async fn test_non_200_keeps_status_and_body() {
        let (url, _server) = serve_once(
            "HTTP/1.1 409 Conflict\r\ncontent-length: 14\r\nconnection: close\r\n\r\nroom not found",
        )
        .await;
        let config = RoomAccountConfig {
            server_url: url,
            ..Default::default()
        };

        let gateway = HttpRoomAccount::new(&config).unwrap();
        let err = gateway.post_bill(&posting()).await.unwrap_err();
        match err {
            RoomError::Rejected { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "room not found");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_truncated_rejection_body_is_reported() {
        let (url, _server) = serve_once(
            "HTTP/1.1 502 Bad Gateway\r\ncontent-length: 64\r\nconnection: close\r\n\r\nupstream",
        )
        .await;
        let config = RoomAccountConfig {
            server_url: url,
            ..Default::default()
        };

        let gateway = HttpRoomAccount::new(&config).unwrap();
        let err = gateway.post_bill(&posting()).await.unwrap_err();
        match err {
            RoomError::Rejected { status, body } => {
                assert_eq!(status, 502);
                assert!(body.starts_with("<unreadable body:"), "{body}");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_maps_to_upstream_rejected() {
        let err = RoomError::Transport("connection refused".into()).classify(Operation::SubmitToRoom);
        assert!(matches!(err, TillError::UpstreamRejected { status: None, .. }));
    }
}
