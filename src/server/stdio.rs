use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::error::{CivicError, Result};
use crate::server::mcp::{JsonRpcError, JsonRpcRequest, McpServer};

/// Serve line-delimited JSON-RPC until the reader hits EOF.
///
/// Only protocol messages are written to `writer`; diagnostics go through `tracing`.
pub async fn serve<R, W>(mut reader: R, mut writer: W, mcp_server: &McpServer) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let trimmed = buf.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_slice::<JsonRpcRequest>(trimmed) {
            Ok(request) => match mcp_server.handle_request(request).await {
                Some(response) => serde_json::to_string(&response),
                None => continue,
            },
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                serde_json::to_string(&json!({
                    "jsonrpc": "2.0",
                    "error": {
                        "code": JsonRpcError::PARSE_ERROR,
                        "message": "Parse error",
                        "data": e.to_string()
                    },
                    "id": null
                }))
            }
        }
        .map_err(|e| CivicError::SerializationError(e.to_string()))?;

        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    info!("Input closed, stopping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::Value;

    async fn run(input: &str) -> Vec<Value> {
        let server = McpServer::new(Config::default());
        server.initialize().await.unwrap();

        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, &server).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_per_request_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"initialize","params":{},"id":1}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"ping","id":"two"}"#,
            "\n"
        );

        let responses = run(input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], "two");
        assert!(responses[1]["result"].is_object());
    }

    #[tokio::test]
    async fn test_malformed_line_yields_parse_error() {
        let responses = run("{not json}\n").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["id"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_the_loop() {
        let server = McpServer::new(Config::default());
        server.initialize().await.unwrap();

        let mut input = Vec::new();
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":\"\xff\"}\n");
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":2}\n");

        let mut output = Vec::new();
        serve(input.as_slice(), &mut output, &server).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["id"], 2);
        assert!(responses[1]["result"].is_object());
    }
}
