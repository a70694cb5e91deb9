use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use spamshot_core::{
    ExtractionResult, FileRef, ImageSource, OcrEngine, ProgressNotifier, ReceivedMessage,
    SpamStore, SpammerMessage, SpamshotError, Submitter,
};
use spamshot_scheduler::{Submission, SubmissionHandler};
use spamshot_understanding::Extractor;

use crate::progress;

/// Everything needed to process one submitted screenshot.
#[derive(Debug, Clone)]
pub struct ScreenshotRequest {
    pub submitter: Submitter,
    pub message: ReceivedMessage,
    pub file: FileRef,
}

/// A queued screenshot with its progress channel.
pub trait ScreenshotSubmission: Submission {
    fn request(&self) -> &ScreenshotRequest;
    fn progress(&self) -> &dyn ProgressNotifier;
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub result: ExtractionResult,
    pub file_path: PathBuf,
    /// Numbers that were not on file before this run.
    pub new_spammers: Vec<String>,
}

/// Download, recognize, extract, and persist one screenshot.
pub struct ScreenshotPipeline {
    source: Arc<dyn ImageSource>,
    ocr: Arc<dyn OcrEngine>,
    extractor: Extractor,
    store: Arc<dyn SpamStore>,
    media_dir: PathBuf,
}

impl ScreenshotPipeline {
    pub fn new(
        source: Arc<dyn ImageSource>,
        ocr: Arc<dyn OcrEngine>,
        extractor: Extractor,
        store: Arc<dyn SpamStore>,
        media_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            ocr,
            extractor,
            store,
            media_dir: media_dir.into(),
        }
    }

    /// Where the image for `request` is stored: `<media>/<user>.<file_id>.<ext>`.
    pub fn media_path(&self, request: &ScreenshotRequest, extension: &str) -> PathBuf {
        let name = [
            request.submitter.handle().as_str(),
            request.file.file_id.as_str(),
            extension,
        ]
        .join(".");
        self.media_dir.join(name)
    }

    pub async fn process(
        &self,
        request: &ScreenshotRequest,
        notifier: &dyn ProgressNotifier,
    ) -> Result<ScanReport, SpamshotError> {
        step(notifier, progress::DOWNLOADING).await;
        let image = self.source.fetch(&request.file).await?;
        let extension = request
            .file
            .extension
            .clone()
            .unwrap_or_else(|| image.extension.clone());
        let file_path = self.media_path(request, &extension);
        fs::create_dir_all(&self.media_dir)
            .await
            .map_err(|e| SpamshotError::Storage(format!("media dir: {e}")))?;
        fs::write(&file_path, &image.bytes)
            .await
            .map_err(|e| SpamshotError::Storage(format!("{}: {e}", file_path.display())))?;
        debug!(path = %file_path.display(), bytes = image.bytes.len(), "Image saved");

        step(notifier, progress::LOGGING_MESSAGE).await;
        self.store.log_message(&request.message).await?;

        step(notifier, progress::READING).await;
        let ocr = self.ocr.recognize(&file_path).await?;

        step(notifier, progress::PARSING).await;
        let result = match self.extractor.extract(&ocr.tokens) {
            Ok(result) => result,
            Err(err) => {
                remove_quietly(&file_path).await;
                return Err(err);
            }
        };

        step(notifier, progress::LOGGING_SPAMMERS).await;
        let mut new_spammers = Vec::new();
        for phone_number in &result.all_numbers {
            if !self.store.spammer_exists(phone_number).await? {
                step(notifier, &progress::logging_spammer(phone_number)).await;
                self.store.insert_spammer(phone_number).await?;
                new_spammers.push(phone_number.clone());
            }
            self.store
                .insert_spammer_message(&SpammerMessage {
                    spammer_id: phone_number.clone(),
                    user_id: request.submitter.user_id,
                    ocr_raw: ocr.raw.clone(),
                    ocr_text: result.cleaned_text.clone(),
                    file_id: request.file.file_id.clone(),
                    file_path: file_path.display().to_string(),
                    created_at: Utc::now(),
                })
                .await?;
        }

        step(notifier, &progress::summary(&result)).await;
        info!(
            user_id = request.submitter.user_id,
            numbers = result.all_numbers.len(),
            new = new_spammers.len(),
            "Screenshot processed"
        );

        Ok(ScanReport {
            result,
            file_path,
            new_spammers,
        })
    }
}

/// Progress edits are cosmetic; a failed edit never fails the run.
async fn step(notifier: &dyn ProgressNotifier, text: &str) {
    if let Err(e) = notifier.update(text).await {
        warn!(error = %e, "Progress update failed");
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove image");
    }
}

#[async_trait]
impl<S: ScreenshotSubmission> SubmissionHandler<S> for ScreenshotPipeline {
    async fn run(&self, submission: Arc<S>) -> Result<(), SpamshotError> {
        self.process(submission.request(), submission.progress())
            .await
            .map(|_| ())
    }

    async fn report_failure(&self, submission: &S, error: &SpamshotError) {
        step(submission.progress(), &error.user_message()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use spamshot_core::{FetchedImage, OcrOutput, OcrToken};
    use spamshot_scheduler::SubmissionQueue;
    use tokio::sync::mpsc;

    struct FakeSource;

    #[async_trait]
    impl ImageSource for FakeSource {
        async fn fetch(&self, file: &FileRef) -> Result<FetchedImage, SpamshotError> {
            if file.file_id == "expired" {
                return Err(SpamshotError::Download("file reference expired".into()));
            }
            Ok(FetchedImage {
                bytes: b"\x89PNG fake".to_vec(),
                extension: "jpg".into(),
            })
        }
    }

    /// Returns a fixed token table per file id.
    struct FakeOcr;

    fn words(text: &str, block_id: i64) -> Vec<OcrToken> {
        text.split(' ').map(|w| OcrToken::new(w, 91.0, block_id)).collect()
    }

    #[async_trait]
    impl OcrEngine for FakeOcr {
        fn name(&self) -> &str {
            "fake"
        }

        async fn recognize(&self, image_path: &Path) -> Result<OcrOutput, SpamshotError> {
            let name = image_path.display().to_string();
            if name.contains("broken") {
                return Err(SpamshotError::Ocr("corrupt image".into()));
            }
            let tokens = if name.contains("blank") {
                words("no numbers here at all", 1)
            } else {
                let mut tokens = words("09171234567 sent you a message", 1);
                tokens.extend(words("#$%&*()", 2));
                tokens.extend(words("call 0917 999 8888 now", 3));
                tokens
            };
            Ok(OcrOutput {
                raw: "tsv".into(),
                tokens,
            })
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        spammers: Mutex<HashSet<String>>,
        evidence: Mutex<Vec<SpammerMessage>>,
        messages: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl SpamStore for MemoryStore {
        async fn upsert_user(&self, _user: &Submitter) -> Result<(), SpamshotError> {
            Ok(())
        }

        async fn log_message(&self, message: &ReceivedMessage) -> Result<(), SpamshotError> {
            self.messages.lock().unwrap().push(message.message_id);
            Ok(())
        }

        async fn spammer_exists(&self, phone_number: &str) -> Result<bool, SpamshotError> {
            Ok(self.spammers.lock().unwrap().contains(phone_number))
        }

        async fn insert_spammer(&self, phone_number: &str) -> Result<(), SpamshotError> {
            self.spammers.lock().unwrap().insert(phone_number.to_string());
            Ok(())
        }

        async fn insert_spammer_message(&self, record: &SpammerMessage) -> Result<(), SpamshotError> {
            self.evidence.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        updates: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProgressNotifier for RecordingProgress {
        async fn update(&self, text: &str) -> Result<(), SpamshotError> {
            self.updates.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn request(file_id: &str) -> ScreenshotRequest {
        ScreenshotRequest {
            submitter: Submitter {
                user_id: 7,
                first_name: "Juan".into(),
                last_name: None,
                username: Some("juan".into()),
                raw: serde_json::json!({ "id": 7 }),
            },
            message: ReceivedMessage {
                message_id: 100,
                user_id: 7,
                raw: serde_json::json!({ "message_id": 100 }),
            },
            file: FileRef {
                file_id: file_id.into(),
                extension: None,
            },
        }
    }

    fn pipeline(store: Arc<MemoryStore>, media: &Path) -> ScreenshotPipeline {
        ScreenshotPipeline::new(
            Arc::new(FakeSource),
            Arc::new(FakeOcr),
            Extractor::default(),
            store,
            media,
        )
    }

    #[tokio::test]
    async fn processes_screenshot_end_to_end() {
        let media = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let notes = RecordingProgress::default();

        let report = pipeline(store.clone(), media.path())
            .process(&request("AgADspam"), &notes)
            .await
            .unwrap();

        assert_eq!(report.result.all_numbers, vec!["639171234567", "639179998888"]);
        assert_eq!(report.new_spammers.len(), 2);
        assert_eq!(report.file_path, media.path().join("juan.AgADspam.jpg"));
        assert!(report.file_path.exists());

        let evidence = store.evidence.lock().unwrap();
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[0].spammer_id, "639171234567");
        assert_eq!(evidence[1].ocr_text, "call 0917 999 8888 now");
        assert_eq!(*store.messages.lock().unwrap(), vec![100]);

        let updates = notes.updates.lock().unwrap();
        assert_eq!(
            updates[..5],
            [
                progress::DOWNLOADING,
                progress::LOGGING_MESSAGE,
                progress::READING,
                progress::PARSING,
                progress::LOGGING_SPAMMERS
            ]
        );
        assert_eq!(updates[5], "logging spammer (639171234567)...");
        assert!(updates.last().unwrap().starts_with("NUMBERS: 639171234567,639179998888"));
    }

    #[tokio::test]
    async fn known_spammers_are_not_reinserted() {
        let media = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        store.spammers.lock().unwrap().insert("639171234567".into());
        let notes = RecordingProgress::default();

        let report = pipeline(store.clone(), media.path())
            .process(&request("AgADagain"), &notes)
            .await
            .unwrap();

        assert_eq!(report.new_spammers, vec!["639179998888"]);
        assert_eq!(store.evidence.lock().unwrap().len(), 2);
        let updates = notes.updates.lock().unwrap();
        assert!(!updates.iter().any(|u| u == "logging spammer (639171234567)..."));
    }

    #[tokio::test]
    async fn missing_number_removes_the_image() {
        let media = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let notes = RecordingProgress::default();
        let pipeline = pipeline(store.clone(), media.path());

        let req = request("blank");
        let err = pipeline.process(&req, &notes).await.unwrap_err();
        assert!(matches!(err, SpamshotError::NoNumberFound));
        assert!(!pipeline.media_path(&req, "jpg").exists());
        assert!(store.evidence.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn collaborator_failures_surface_with_their_category() {
        let media = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let notes = RecordingProgress::default();
        let pipeline = pipeline(store, media.path());

        let err = pipeline.process(&request("expired"), &notes).await.unwrap_err();
        assert_eq!(err.category(), "DownloadError");

        let err = pipeline.process(&request("broken"), &notes).await.unwrap_err();
        assert_eq!(err.category(), "OcrError");
    }

    struct QueuedShot {
        request: ScreenshotRequest,
        progress: Arc<RecordingProgress>,
        done: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl Submission for QueuedShot {
        fn id(&self) -> String {
            self.request.file.file_id.clone()
        }

        async fn notify_position(&self, position: usize) {
            let _ = self.progress.update(&progress::queue_position(position)).await;
        }
    }

    impl ScreenshotSubmission for QueuedShot {
        fn request(&self) -> &ScreenshotRequest {
            &self.request
        }

        fn progress(&self) -> &dyn ProgressNotifier {
            self.progress.as_ref()
        }
    }

    /// Reports every finished submission on a channel.
    struct NotifyOnDone {
        inner: ScreenshotPipeline,
    }

    #[async_trait]
    impl SubmissionHandler<QueuedShot> for NotifyOnDone {
        async fn run(&self, submission: Arc<QueuedShot>) -> Result<(), SpamshotError> {
            let result =
                SubmissionHandler::<QueuedShot>::run(&self.inner, Arc::clone(&submission)).await;
            if result.is_ok() {
                let _ = submission.done.send(submission.id());
            }
            result
        }

        async fn report_failure(&self, submission: &QueuedShot, error: &SpamshotError) {
            SubmissionHandler::<QueuedShot>::report_failure(&self.inner, submission, error).await;
            let _ = submission.done.send(submission.id());
        }
    }

    #[tokio::test]
    async fn queue_reports_no_number_to_the_submitter() {
        let media = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let handler = NotifyOnDone {
            inner: pipeline(store, media.path()),
        };
        let queue = SubmissionQueue::new(
            Arc::new(handler) as Arc<dyn SubmissionHandler<QueuedShot>>,
            None,
        );
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let good = Arc::new(RecordingProgress::default());
        let blank = Arc::new(RecordingProgress::default());
        queue
            .submit(QueuedShot {
                request: request("AgADgood"),
                progress: good.clone(),
                done: done_tx.clone(),
            })
            .await;
        queue
            .submit(QueuedShot {
                request: request("blank"),
                progress: blank.clone(),
                done: done_tx,
            })
            .await;

        assert_eq!(done_rx.recv().await.unwrap(), "AgADgood");
        assert_eq!(done_rx.recv().await.unwrap(), "blank");

        assert!(good.updates.lock().unwrap().last().unwrap().starts_with("NUMBERS:"));
        assert_eq!(
            blank.updates.lock().unwrap().last().unwrap(),
            "can't find the phone number :/ try sending again (or send as file)"
        );
    }
}
