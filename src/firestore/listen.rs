use super::models::{ListenEvent, ListenRequest};
use super::FirestoreError;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream};
use reqwest_middleware::ClientWithMiddleware;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A live change stream for one listen target.
///
/// The listen endpoint answers with a single, long-lived chunked body that is
/// a JSON array of listen messages written incrementally. Chunk boundaries do
/// not line up with message boundaries, so the stream buffers bytes and
/// frames complete objects out of them as they arrive.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: BytesMut,
}

impl EventStream {
    pub(crate) fn new(
        inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    ) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
        }
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl Stream for EventStream {
    type Item = Result<ListenEvent, FirestoreError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(frame) = next_frame(&mut self.buffer) {
                match serde_json::from_slice::<ListenEvent>(&frame) {
                    Ok(event) => return Poll::Ready(Some(Ok(event))),
                    Err(e) => {
                        return Poll::Ready(Some(Err(FirestoreError::Serialization(e))));
                    }
                }
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    self.buffer.extend_from_slice(&chunk);
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(FirestoreError::Request(e))));
                }
                Poll::Ready(None) => {
                    if self.buffer.iter().any(|b| *b == b'{') {
                        return Poll::Ready(Some(Err(FirestoreError::Api(
                            "listen stream ended mid-message".into(),
                        ))));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Splits the next complete JSON object off the front of `buf`, discarding
/// the array punctuation (`[`, `,`, `]`) and whitespace the server writes
/// between messages. Returns `None` until a full object is buffered.
fn next_frame(buf: &mut BytesMut) -> Option<Bytes> {
    let start = buf
        .iter()
        .position(|&b| !matches!(b, b'[' | b']' | b',' | b' ' | b'\t' | b'\r' | b'\n'))?;
    let _ = buf.split_to(start);

    let end = object_end(buf)?;
    Some(buf.split_to(end).freeze())
}

/// Returns the byte length of the balanced JSON object at the start of
/// `buf`, accounting for braces inside string literals and escapes. `None`
/// until the closing brace is buffered, or if the buffer does not start an
/// object at all.
fn object_end(buf: &[u8]) -> Option<usize> {
    if buf.first() != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in buf.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

pub(crate) async fn listen_request(
    client: &ClientWithMiddleware,
    base_url: &str,
    request: &ListenRequest,
) -> Result<EventStream, FirestoreError> {
    // base_url ends in ".../documents"; the listen endpoint hangs off it.
    let url = format!("{base_url}:listen");

    let response = client.post(&url).json(request).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(FirestoreError::Api(format!(
            "listen failed {status}: {text}"
        )));
    }

    let body = stream::unfold(response, |mut resp| async move {
        match resp.chunk().await {
            Ok(Some(bytes)) => Some((Ok(bytes), resp)),
            Ok(None) => None,
            Err(e) => Some((Err(e), resp)),
        }
    });

    Ok(EventStream::new(Box::pin(body)))
}
