use crate::event::DATA_PREFIX;

const FRAME_DELIMITER: &str = "\n\n";

/// Incremental splitter for `text/event-stream` bodies.
///
/// Bytes may arrive split at any point, including inside a multi-byte UTF-8
/// sequence or inside the blank-line delimiter. Complete frames are returned as
/// soon as their delimiter has been seen; the trailing fragment stays buffered.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending_bytes: Vec<u8>,
    buffer: String,
}

impl FrameDecoder {
    /// Feed one chunk and drain every frame it completes.
    ///
    /// Only frames that start with `data:` are returned. Comments, `event:`
    /// lines and blank frames are dropped here.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut frames = Vec::new();
        while let Some(split) = self.buffer.find(FRAME_DELIMITER) {
            let frame = self.buffer[..split].trim().to_string();
            self.buffer.drain(0..split + FRAME_DELIMITER.len());

            if frame.starts_with(DATA_PREFIX) {
                frames.push(frame);
            } else if !frame.is_empty() {
                tracing::trace!(len = frame.len(), "dropping non-data frame");
            }
        }

        frames
    }

    /// Close the decoder, discarding any unterminated tail.
    ///
    /// Returns the number of bytes that were thrown away.
    pub fn finish(self) -> usize {
        let discarded = self.buffer.trim().len() + self.pending_bytes.len();
        if discarded > 0 {
            tracing::debug!(discarded, "discarding incomplete trailing frame");
        }
        discarded
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty() && self.pending_bytes.is_empty()
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending_bytes.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.pending_bytes[consumed..]) {
                Ok(valid) => {
                    push_without_cr(&mut self.buffer, valid);
                    consumed = self.pending_bytes.len();
                    break;
                }
                Err(error) => {
                    let valid_up_to = consumed + error.valid_up_to();
                    // `valid_up_to` always lands on a char boundary.
                    let prefix = &self.pending_bytes[consumed..valid_up_to];
                    if let Ok(valid) = std::str::from_utf8(prefix) {
                        push_without_cr(&mut self.buffer, valid);
                    }
                    match error.error_len() {
                        Some(invalid) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_up_to + invalid;
                        }
                        None => {
                            // Truncated sequence: wait for the next chunk.
                            consumed = valid_up_to;
                            break;
                        }
                    }
                }
            }
        }

        self.pending_bytes.drain(..consumed);
    }
}

fn push_without_cr(buffer: &mut String, text: &str) {
    buffer.extend(text.chars().filter(|ch| *ch != '\r'));
}
