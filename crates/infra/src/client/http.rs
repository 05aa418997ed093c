//! `RoomServiceClient` over the rooms service HTTP surface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use innkeep_core::RoomId;
use innkeep_observability::{CORRELATION_HEADER, RequestContext};
use innkeep_rooms::Room;

use super::{RemoteError, RoomServiceClient};

/// Default bound on one room call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Error body returned by the rooms service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    message: String,
}

/// Calls `PATCH {base_url}/cuartos/{id}/reservar` and `.../pagar`.
#[derive(Debug, Clone)]
pub struct HttpRoomClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRoomClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Failed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn transition_url(&self, room_id: RoomId, action: &str) -> String {
        format!("{}/cuartos/{}/{}", self.base_url, room_id, action)
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        room_id: RoomId,
        action: &str,
    ) -> Result<Room, RemoteError> {
        let url = self.transition_url(room_id, action);
        tracing::debug!(correlation_id = %ctx.correlation_id(), %url, "calling room service");

        let resp = self
            .client
            .patch(&url)
            .header(CORRELATION_HEADER, ctx.correlation_id().to_string())
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = resp.status();
        if status.is_success() {
            return match resp.json::<Room>().await {
                Ok(room) => Ok(room),
                Err(err) => {
                    tracing::warn!(
                        correlation_id = %ctx.correlation_id(),
                        room_id = %room_id,
                        error = %err,
                        "room service accepted the transition with an undecodable body; re-reading room"
                    );
                    self.fetch(ctx, room_id)
                        .await
                        .map_err(|reason| RemoteError::Unconfirmed(format!("{err}; re-read failed: {reason}")))
                }
            };
        }

        let (code, message) = match resp.json::<ErrorBody>().await {
            Ok(body) => (body.error, body.message),
            Err(_) => (String::new(), status.to_string()),
        };

        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound,
            StatusCode::BAD_REQUEST if code == "duplicate_transition" => {
                RemoteError::DuplicateTransition(message)
            }
            StatusCode::CONFLICT => RemoteError::TransitionNotAllowed(message),
            other => RemoteError::Failed(format!("room service answered {other}: {message}")),
        })
    }

    /// `GET {base_url}/cuartos/{id}`.
    async fn fetch(&self, ctx: &RequestContext, room_id: RoomId) -> Result<Room, String> {
        let url = format!("{}/cuartos/{}", self.base_url, room_id);
        let resp = self
            .client
            .get(&url)
            .header(CORRELATION_HEADER, ctx.correlation_id().to_string())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("room service answered {status}"));
        }
        resp.json::<Room>().await.map_err(|e| e.to_string())
    }

    fn send_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            RemoteError::Failed(err.to_string())
        }
    }
}

#[async_trait]
impl RoomServiceClient for HttpRoomClient {
    async fn reserve(&self, ctx: &RequestContext, room_id: RoomId) -> Result<Room, RemoteError> {
        self.transition(ctx, room_id, "reservar").await
    }

    async fn pay(&self, ctx: &RequestContext, room_id: RoomId) -> Result<Room, RemoteError> {
        self.transition(ctx, room_id, "pagar").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::{get, patch};
    use innkeep_rooms::{NewRoom, RoomStatus};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn reserved_room(id: RoomId) -> Room {
        let mut room = Room::create(id, NewRoom::new(Some("101".into()), Some(100.0), None).unwrap());
        room.status = RoomStatus::Reserved;
        room
    }

    fn client(base: &str) -> HttpRoomClient {
        HttpRoomClient::new(base, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn transition_url_uses_room_routes() {
        let client = HttpRoomClient::new("http://rooms:5001/", DEFAULT_CALL_TIMEOUT).unwrap();
        let id = RoomId::new();
        assert_eq!(
            client.transition_url(id, "reservar"),
            format!("http://rooms:5001/cuartos/{id}/reservar")
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_failure_not_a_panic() {
        let client = HttpRoomClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = client
            .reserve(&RequestContext::detached(), RoomId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Failed(_) | RemoteError::Timeout(_)));
    }

    #[tokio::test]
    async fn accepted_transition_with_garbage_body_is_re_read() {
        let id = RoomId::new();
        let room = reserved_room(id);
        let app = Router::new()
            .route("/cuartos/:id/reservar", patch(|| async { (HttpStatus::OK, "<html>ok</html>") }))
            .route("/cuartos/:id", get(move || async move { axum::Json(room) }));
        let base = serve(app).await;

        let got = client(&base).reserve(&RequestContext::detached(), id).await.unwrap();
        assert_eq!(got.id, id);
        assert_eq!(got.status, RoomStatus::Reserved);
    }

    #[tokio::test]
    async fn accepted_transition_that_cannot_be_re_read_is_unconfirmed() {
        let app = Router::new()
            .route("/cuartos/:id/pagar", patch(|| async { (HttpStatus::OK, "not json") }));
        let base = serve(app).await;

        let err = client(&base)
            .pay(&RequestContext::detached(), RoomId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Unconfirmed(_)));
    }

    #[tokio::test]
    async fn refusals_map_by_status_and_code() {
        let app = Router::new()
            .route(
                "/cuartos/:id/reservar",
                patch(|| async {
                    (
                        HttpStatus::BAD_REQUEST,
                        axum::Json(serde_json::json!({
                            "error": "duplicate_transition",
                            "message": "room is already Reserved"
                        })),
                    )
                }),
            )
            .route(
                "/cuartos/:id/pagar",
                patch(|| async {
                    (
                        HttpStatus::CONFLICT,
                        axum::Json(serde_json::json!({
                            "error": "transition_not_allowed",
                            "message": "room must be Reserved"
                        })),
                    )
                }),
            );
        let base = serve(app).await;
        let http = client(&base);
        let ctx = RequestContext::detached();

        assert_eq!(
            http.reserve(&ctx, RoomId::new()).await.unwrap_err(),
            RemoteError::DuplicateTransition("room is already Reserved".into())
        );
        assert_eq!(
            http.pay(&ctx, RoomId::new()).await.unwrap_err(),
            RemoteError::TransitionNotAllowed("room must be Reserved".into())
        );
    }
}
