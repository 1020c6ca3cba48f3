use crate::events::AppEvent;
use async_channel::Sender;
use rotary::events::TimerRequest;
use std::path::PathBuf;
use tokio::io::AsyncRead;

pub type InputSource = Box<dyn AsyncRead + Unpin + Send>;

pub fn start_background_services(
    tx: Sender<AppEvent>,
    input: InputSource,
    watch: Option<PathBuf>,
) {
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            crate::sys::reader::run_reader(input, tx).await;
        });
    }

    if let Some(config_path) = watch {
        let tx = tx.clone();
        tokio::spawn(async move {
            crate::config::run_async_watcher(config_path, tx).await;
        });
    }
}

/// Arms a one-shot timer that posts back into the event loop.
pub fn schedule(tx: Sender<AppEvent>, request: TimerRequest) {
    tokio::spawn(async move {
        tokio::time::sleep(request.delay).await;
        if tx.send(AppEvent::Timer(request.timer)).await.is_err() {
            log::debug!("Event loop gone before {:?} fired", request.timer);
        }
    });
}
