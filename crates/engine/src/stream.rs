use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use caregate_shared::events::{DONE_FRAME, StreamEvent};

/// Pacing delay between word fragments. Long answers multiply this, so it
/// has to stay small relative to the platform request deadline.
pub const CHUNK_DELAY: Duration = Duration::from_millis(50);

/// Writes protocol frames into the open response body. Frames arrive at the
/// client strictly in send order; a send to a disconnected client is
/// silently dropped, same as the rest of the request from that point on.
#[derive(Clone)]
pub struct StreamWriter {
    tx: mpsc::Sender<String>,
}

impl StreamWriter {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, event: StreamEvent) {
        let _ = self.tx.send(event.to_frame()).await;
    }

    pub async fn status(&self, status: &str, message: &str) {
        self.send(StreamEvent::status(status, message)).await;
    }

    pub async fn error(&self, error: &str, details: Option<String>) {
        self.send(StreamEvent::error(error, details)).await;
    }

    pub async fn done(&self) {
        let _ = self.tx.send(DONE_FRAME.to_string()).await;
    }
}

/// Re-frame an already-complete answer as a paced sequence of word-level
/// fragments, closing with the `[DONE]` sentinel. Each fragment keeps its
/// trailing space except the last, so concatenating the fragments
/// reproduces the answer byte for byte.
pub async fn stream_answer(writer: &StreamWriter, content: &str) {
    writer.status("streaming", "Streaming response...").await;

    let words: Vec<&str> = content.split(' ').collect();
    let last = words.len() - 1;

    for (i, word) in words.iter().enumerate() {
        let chunk = if i < last {
            format!("{} ", word)
        } else {
            (*word).to_string()
        };
        writer.send(StreamEvent::content(chunk)).await;
        sleep(CHUNK_DELAY).await;
    }

    writer.done().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn collect_frames(content: &str) -> Vec<String> {
        let (tx, mut rx) = mpsc::channel(256);
        let writer = StreamWriter::new(tx);
        stream_answer(&writer, content).await;
        drop(writer);

        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        frames
    }

    fn content_of(frame: &str) -> Option<String> {
        let payload: Value = serde_json::from_str(frame.strip_prefix("data: ")?.trim()).ok()?;
        Some(payload.get("content")?.as_str()?.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn two_word_answer_streams_as_two_fragments() {
        let frames = collect_frames("hi there").await;

        assert_eq!(frames.len(), 4);
        assert!(frames[0].contains(r#""status":"streaming""#));
        assert_eq!(content_of(&frames[1]).unwrap(), "hi ");
        assert_eq!(content_of(&frames[2]).unwrap(), "there");
        assert_eq!(frames[3], DONE_FRAME);
    }

    #[tokio::test(start_paused = true)]
    async fn fragments_concatenate_back_to_the_answer() {
        let content = "The quick brown  fox jumps over the lazy dog";
        let frames = collect_frames(content).await;

        let rebuilt: String = frames
            .iter()
            .filter_map(|f| content_of(f))
            .collect();
        assert_eq!(rebuilt, content);
    }

    #[tokio::test(start_paused = true)]
    async fn sentinel_is_always_the_final_frame() {
        let frames = collect_frames("a b c").await;
        assert_eq!(frames.last().map(String::as_str), Some(DONE_FRAME));
        assert_eq!(
            frames.iter().filter(|f| *f == DONE_FRAME).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_answer_still_opens_and_closes_the_stream() {
        let frames = collect_frames("").await;

        assert_eq!(frames.len(), 3);
        assert_eq!(content_of(&frames[1]).unwrap(), "");
        assert_eq!(frames[2], DONE_FRAME);
    }
}
