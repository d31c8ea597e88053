use board_client::BoardClientError;
use gloo_net::http::Response;

pub fn transport(err: gloo_net::Error) -> BoardClientError {
    BoardClientError::Transport(err.to_string())
}

pub fn storage(err: gloo_storage::errors::StorageError) -> BoardClientError {
    BoardClientError::Storage(err.to_string())
}

/// Maps a non-2xx response, keeping the server's `{error, code}` body.
pub async fn from_response(response: Response) -> BoardClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    BoardClientError::from_status(status, &body)
}
