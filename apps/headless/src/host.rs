//! Minimal host loop: forwards engine idle to the session while an export runs.

use std::future::Future;
use std::time::Duration;

use mapsketch_core::Notifier;
use mapsketch_renderer::SharedSession;

use crate::raster_engine::RasterEngine;

/// How often the host checks the engine, roughly one display frame.
const FRAME: Duration = Duration::from_millis(16);

/// Drive `fut` to completion, delivering an idle notification whenever a
/// capture is waiting and the engine has no repaint outstanding.
pub async fn with_idle_events<N, F>(session: &SharedSession<RasterEngine, N>, fut: F) -> F::Output
where
    N: Notifier,
    F: Future,
{
    tokio::pin!(fut);
    let mut frames = tokio::time::interval(FRAME);
    loop {
        tokio::select! {
            biased;
            out = &mut fut => return out,
            _ = frames.tick() => {
                let mut s = session.lock().unwrap_or_else(|poisoned| {
                    log::warn!("Delivering idle through a poisoned session lock");
                    poisoned.into_inner()
                });
                if s.has_pending_capture() && s.engine().is_idle() {
                    s.on_idle();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapsketch_core::NoticeLog;
    use mapsketch_renderer::capture::await_capture;
    use mapsketch_renderer::{DrawingEngine, EngineConfig, MapSession, Viewport};

    fn session() -> SharedSession<RasterEngine> {
        let config = EngineConfig {
            viewport: Viewport::new(40, 20),
            ..EngineConfig::default()
        };
        let engine = RasterEngine::initialize(&config).unwrap();
        MapSession::new(engine, NoticeLog::new()).shared()
    }

    #[tokio::test]
    async fn test_idle_delivers_pending_capture() {
        let session = session();
        let rx = session.lock().unwrap().request_capture().unwrap();

        let bitmap = with_idle_events(&session, await_capture(rx)).await.unwrap();

        assert_eq!((bitmap.width, bitmap.height), (40, 20));
    }

    #[tokio::test]
    async fn test_idle_still_delivered_after_poisoning() {
        let session = session();
        let rx = session.lock().unwrap().request_capture().unwrap();
        let holder = session.clone();
        let panicked = std::thread::spawn(move || {
            let _guard = holder.lock().unwrap();
            panic!("presentation thread died holding the session");
        })
        .join();
        assert!(panicked.is_err());
        assert!(session.is_poisoned());

        let captured = tokio::time::timeout(
            Duration::from_secs(1),
            with_idle_events(&session, await_capture(rx)),
        )
        .await
        .expect("idle was never delivered");

        assert!(captured.is_ok());
    }
}
