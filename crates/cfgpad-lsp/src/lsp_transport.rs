//! JSON-RPC/LSP stdio framing.
//!
//! Every message is a JSON body preceded by HTTP-like headers:
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```
//!
//! Only `Content-Length` is interpreted; other headers (`Content-Type`) are skipped.

use crate::error::LspError;
use serde_json::Value;
use std::io::{BufRead, Write};

/// Encode `value` as a framed message.
pub fn encode_lsp_message(value: &Value) -> Result<Vec<u8>, LspError> {
    let body = serde_json::to_vec(value).map_err(|err| LspError::Protocol(err.to_string()))?;
    let mut framed = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
    framed.extend_from_slice(&body);
    Ok(framed)
}

/// Write a single framed message to `writer` and flush it.
pub fn write_lsp_message<W: Write>(writer: &mut W, value: &Value) -> Result<(), LspError> {
    writer.write_all(&encode_lsp_message(value)?)?;
    writer.flush()?;
    Ok(())
}

/// Read a single framed message from `reader`.
///
/// Returns `Ok(None)` on a clean EOF before any header byte.
pub fn read_lsp_message<R: BufRead>(reader: &mut R) -> Result<Option<Value>, LspError> {
    let Some(len) = read_content_length(reader)? else {
        return Ok(None);
    };

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;

    serde_json::from_slice(&body)
        .map(Some)
        .map_err(|err| LspError::Protocol(format!("invalid JSON body: {err}")))
}

fn read_content_length<R: BufRead>(reader: &mut R) -> Result<Option<usize>, LspError> {
    let mut content_length = None;
    let mut saw_header = false;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            if saw_header {
                return Err(LspError::Protocol("EOF inside message headers".to_string()));
            }
            return Ok(None);
        }
        saw_header = true;

        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }

        match header.split_once(':') {
            Some((name, value)) if name.trim().eq_ignore_ascii_case("Content-Length") => {
                let parsed = value.trim().parse::<usize>().map_err(|_| {
                    LspError::Protocol(format!("bad Content-Length `{}`", value.trim()))
                })?;
                content_length = Some(parsed);
            }
            Some(_) => {}
            None => {
                tracing::debug!("ignoring malformed LSP header line: {header}");
            }
        }
    }

    content_length
        .map(Some)
        .ok_or_else(|| LspError::Protocol("missing Content-Length header".to_string()))
}
