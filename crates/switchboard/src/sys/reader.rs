use crate::events::{AppEvent, InputEvent};
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Forwards JSON-lines input to the consumer, then reports the end of input.
pub async fn run_reader<R>(reader: R, tx: Sender<AppEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut line_no = 0usize;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        };
        line_no += 1;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match serde_json::from_str::<InputEvent>(line) {
            Ok(event) => {
                if tx.send(AppEvent::Input(event)).await.is_err() {
                    return;
                }
            }
            Err(e) => log::warn!("Skipping input line {}: {}", line_no, e),
        }
    }

    let _ = tx.send(AppEvent::InputClosed).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reader_skips_bad_lines_and_closes() {
        let input = b"# trace\n{\"event\":\"up\"}\nnot json\n\n{\"event\":\"move\",\"x\":1,\"y\":2}\n";
        let (tx, rx) = async_channel::unbounded();

        run_reader(&input[..], tx).await;

        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }

        assert_eq!(received.len(), 3);
        assert!(matches!(received[0], AppEvent::Input(InputEvent::Up)));
        assert!(matches!(
            received[1],
            AppEvent::Input(InputEvent::Move { .. })
        ));
        assert!(matches!(received[2], AppEvent::InputClosed));
    }
}
