use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use biometrics::{Collector, Counter, Emitter, Moments, PlainTextEmitter};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

pub(crate) static PROXY_REQUESTS: Counter = Counter::new("chatrelay.proxy.requests");
pub(crate) static PROXY_BAD_REQUESTS: Counter = Counter::new("chatrelay.proxy.bad_requests");
pub(crate) static PROXY_UPSTREAM_ERRORS: Counter =
    Counter::new("chatrelay.proxy.upstream_errors");
pub(crate) static UPSTREAM_REQUEST_DURATION: Moments =
    Moments::new("chatrelay.upstream.request_duration_seconds");

pub(crate) static SESSION_SUBMITS: Counter = Counter::new("chatrelay.session.submits");
pub(crate) static SESSION_REJECTIONS: Counter = Counter::new("chatrelay.session.rejections");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("chatrelay.session.failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: &Collector) {
    collector.register_counter(&PROXY_REQUESTS);
    collector.register_counter(&PROXY_BAD_REQUESTS);
    collector.register_counter(&PROXY_UPSTREAM_ERRORS);
    collector.register_moments(&UPSTREAM_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMITS);
    collector.register_counter(&SESSION_REJECTIONS);
    collector.register_counter(&SESSION_FAILURES);
}

/// Write one reading of every sensor registered with `collector`.
pub fn emit_biometrics<EM>(collector: &Collector, emitter: &mut EM) -> Result<()>
where
    EM: Emitter<Error = std::io::Error>,
{
    collector
        .emit(emitter, now_millis())
        .map_err(|e| Error::io("failed to emit biometrics", e))
}

/// Append readings of `collector` to the file at `path` every `interval`.
///
/// The file is opened (and created if missing) before the task starts, so a
/// bad path fails here rather than inside the task.  The first reading is
/// written immediately.
pub fn spawn_biometrics_emitter(
    collector: Arc<Collector>,
    path: &Path,
    interval: Duration,
) -> Result<JoinHandle<()>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(format!("failed to open {}", path.display()), e))?;
    let mut emitter = PlainTextEmitter::new(file);
    let path = path.display().to_string();
    Ok(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = emit_biometrics(&collector, &mut emitter) {
                tracing::warn!(error = %err, path = %path, "biometrics emission failed");
            }
        }
    }))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use biometrics::Gauge;
    use biometrics::Histogram;

    use super::*;

    #[derive(Default)]
    struct Labels(Vec<&'static str>);

    impl Emitter for Labels {
        type Error = std::io::Error;

        fn emit_counter(&mut self, counter: &Counter, _: u64) -> std::io::Result<()> {
            self.0.push(biometrics::Sensor::label(counter));
            Ok(())
        }

        fn emit_gauge(&mut self, gauge: &Gauge, _: u64) -> std::io::Result<()> {
            self.0.push(biometrics::Sensor::label(gauge));
            Ok(())
        }

        fn emit_moments(&mut self, moments: &Moments, _: u64) -> std::io::Result<()> {
            self.0.push(biometrics::Sensor::label(moments));
            Ok(())
        }

        fn emit_histogram(&mut self, histogram: &Histogram, _: u64) -> std::io::Result<()> {
            self.0.push(biometrics::Sensor::label(histogram));
            Ok(())
        }
    }

    #[test]
    fn registered_sensors_are_emitted() {
        let collector = Collector::new();
        register_biometrics(&collector);

        let mut labels = Labels::default();
        emit_biometrics(&collector, &mut labels).unwrap();

        for label in [
            "chatrelay.proxy.requests",
            "chatrelay.proxy.bad_requests",
            "chatrelay.proxy.upstream_errors",
            "chatrelay.upstream.request_duration_seconds",
            "chatrelay.session.submits",
            "chatrelay.session.rejections",
            "chatrelay.session.failures",
        ] {
            assert!(labels.0.contains(&label), "{label} missing from {:?}", labels.0);
        }
    }

    #[tokio::test]
    async fn emitter_task_writes_readings_to_file() {
        let path = std::env::temp_dir().join(format!(
            "chatrelay-biometrics-{}-{}.txt",
            std::process::id(),
            now_millis()
        ));
        let collector = Arc::new(Collector::new());
        register_biometrics(&collector);
        PROXY_REQUESTS.click();

        let handle =
            spawn_biometrics_emitter(Arc::clone(&collector), &path, Duration::from_secs(3600))
                .unwrap();

        let mut contents = String::new();
        for _ in 0..100 {
            contents = std::fs::read_to_string(&path).unwrap();
            if contents.contains("chatrelay.session.failures") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        let _ = std::fs::remove_file(&path);

        assert!(contents.contains("chatrelay.proxy.requests "));
        assert!(contents.contains("chatrelay.upstream.request_duration_seconds "));
    }

    #[test]
    fn unwritable_path_fails_up_front() {
        let collector = Arc::new(Collector::new());
        let path = std::env::temp_dir()
            .join("chatrelay-no-such-dir")
            .join("nested")
            .join("metrics.txt");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();
        let err = spawn_biometrics_emitter(collector, &path, Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("chatrelay-no-such-dir"));
    }
}
